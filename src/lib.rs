//! Foreign-key aware ordering of a permissions schema for migration.
//!
//! The catalog of the source schema is read inside one snapshot, turned into
//! a table graph (an edge `a -> b` means `a` references `b`), and ordered so
//! that every table comes after the tables it references.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod output;
pub mod schema;

#[cfg(feature = "cli")]
pub mod cli;

pub use analysis::{ColumnLink, DanglingPolicy, NodeId, NodeMap, TableGraph, resolve_order};
pub use commands::{PlanReport, PlanResult};
pub use config::MigrateConfig;
pub use error::{MigrateError, Result};
pub use output::{LibraryOutputHandler, OutputHandler, OutputLevel, SilentOutputHandler};
pub use schema::{CatalogSnapshot, ForeignKey, SchemaInspector};

/// Library entry point: inspect the configured permissions database and
/// compute the table insertion order. Nothing is printed.
pub async fn plan_migration(config: &MigrateConfig) -> Result<PlanResult> {
    commands::execute_plan(config).await
}

/// Insertion order for `tables` given their foreign keys, dependencies first
pub fn resolve_insertion_order<S: AsRef<str>>(
    tables: &[S],
    foreign_keys: &[ForeignKey],
    policy: DanglingPolicy,
) -> Result<Vec<String>> {
    TableGraph::build(tables, foreign_keys, None, policy)?.insertion_order()
}
