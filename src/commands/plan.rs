use std::path::Path;
use std::time::{Duration, Instant};
use serde::Serialize;
use tokio_postgres::IsolationLevel;
use tracing::{debug, info, warn};
use crate::analysis::{DanglingPolicy, TableGraph};
use crate::config::MigrateConfig;
use crate::db::{check_connection, connect_with_retry};
use crate::error::{MigrateError, Result};
use crate::output::OutputHandler;
use crate::schema::{CatalogSnapshot, ForeignKey, SchemaInspector};

/// A table and the id it was assigned in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeEntry {
    pub id: usize,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeEntry {
    pub from: usize,
    pub to: usize,
    pub from_table: String,
    pub to_table: String,
    /// "from_column -> to_column" for each column pair behind the edge
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySummary {
    pub table: String,
    pub dependencies: usize,
}

/// Everything the plan step learned about the source schema
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub permissions_schema: String,
    pub source_schema: String,
    pub tables: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub nodes: Vec<NodeEntry>,
    pub edges: Vec<EdgeEntry>,
    pub dependencies: Vec<DependencySummary>,
    pub skipped_references: Vec<ForeignKey>,
    pub insertion_order: Vec<String>,
}

#[derive(Debug)]
pub struct PlanResult {
    pub report: PlanReport,
    pub graph: TableGraph,
    pub duration: Duration,
}

/// Build and order the table graph of an already captured catalog snapshot
pub fn plan_from_snapshot(
    snapshot: &CatalogSnapshot,
    permissions_schema: &str,
    policy: DanglingPolicy,
) -> Result<PlanResult> {
    let start_time = Instant::now();

    let graph = TableGraph::build(&snapshot.tables, &snapshot.foreign_keys, None, policy)?;
    let insertion_order = graph.insertion_order()?;

    let nodes = graph.node_map()
        .iter()
        .map(|(id, table)| NodeEntry { id: id.index(), table: table.to_string() })
        .collect();

    let edges = graph.edges()
        .into_iter()
        .map(|(from, to)| EdgeEntry {
            from: from.index(),
            to: to.index(),
            from_table: graph.table_name(from).unwrap_or_default().to_string(),
            to_table: graph.table_name(to).unwrap_or_default().to_string(),
            columns: graph.column_links(from, to)
                .iter()
                .map(|link| format!("{} -> {}", link.from_column, link.to_column))
                .collect(),
        })
        .collect();

    let dependencies = graph.node_map()
        .iter()
        .map(|(id, table)| DependencySummary {
            table: table.to_string(),
            dependencies: graph.dependency_count(id),
        })
        .collect();

    let report = PlanReport {
        permissions_schema: permissions_schema.to_string(),
        source_schema: snapshot.namespace.clone(),
        tables: snapshot.tables.clone(),
        foreign_keys: snapshot.foreign_keys.clone(),
        nodes,
        edges,
        dependencies,
        skipped_references: graph.skipped_references().to_vec(),
        insertion_order,
    };

    Ok(PlanResult {
        report,
        graph,
        duration: start_time.elapsed(),
    })
}

/// Inspect the permissions database and compute the table insertion order.
///
/// The destination is only checked for reachability; no rows are copied.
/// Inspection runs in one read-only repeatable-read transaction, rolled
/// back once the order is computed or has failed.
pub async fn execute_plan(config: &MigrateConfig) -> Result<PlanResult> {
    let start_time = Instant::now();
    let (permissions_url, destination_url) = config.require_urls()?;
    let timeout = config.connect_timeout();

    info!("Checking destination database");
    let _destination = check_connection(destination_url, timeout).await?;

    info!("Connecting to permissions database");
    let mut client = connect_with_retry(permissions_url, timeout).await?;

    let tx = client
        .build_transaction()
        .isolation_level(IsolationLevel::RepeatableRead)
        .read_only(true)
        .start()
        .await
        .map_err(|e| MigrateError::query("starting inspection transaction", e))?;

    let source_schema = config.source_schema();
    info!(schema = source_schema, "Inspecting schema");

    let result = match SchemaInspector::new(&tx).snapshot(source_schema).await {
        Ok(snapshot) => {
            debug!(
                "Snapshot has {} tables and {} foreign key columns",
                snapshot.tables.len(),
                snapshot.foreign_keys.len()
            );
            plan_from_snapshot(&snapshot, config.permissions_schema(), config.dangling_policy())
        }
        Err(e) => Err(e),
    };

    let rollback = tx.rollback()
        .await
        .map_err(|e| MigrateError::query("closing inspection transaction", e));

    let mut result = settle_inspection(result, rollback)?;
    result.duration = start_time.elapsed();

    if let Some(output_path) = &config.output_graph {
        write_graph(&result.graph, output_path)?;
        info!("Table graph written to: {}", output_path.display());
    }

    Ok(result)
}

/// The inspection outcome wins over a failed rollback; a rollback error is
/// only surfaced when the plan itself succeeded.
fn settle_inspection(result: Result<PlanResult>, rollback: Result<()>) -> Result<PlanResult> {
    match (result, rollback) {
        (Err(e), Err(rollback_err)) => {
            warn!("Could not roll back inspection transaction: {}", rollback_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(rollback_err)) => Err(rollback_err),
        (Ok(result), Ok(())) => Ok(result),
    }
}

/// Write the graph in Graphviz DOT format
pub fn write_graph(graph: &TableGraph, path: &Path) -> Result<()> {
    std::fs::write(path, graph.to_graphviz()).map_err(|e| MigrateError::FileWrite {
        path: path.to_path_buf(),
        message: "could not write table graph".to_string(),
        source: e,
    })
}

/// Render a plan through `output`
pub fn report_plan(report: &PlanReport, output: &dyn OutputHandler) {
    output.info(&format!("Permissions schema: {}", report.permissions_schema));

    output.heading(&format!("Tables in {}", report.source_schema));
    for table in &report.tables {
        output.item(table);
    }

    output.heading("Foreign keys");
    for fk in &report.foreign_keys {
        output.item(&fk.to_string());
    }

    output.heading("Table ids");
    for node in &report.nodes {
        output.item(&format!("{} -> {}", node.table, node.id));
    }

    output.heading("Edges");
    for edge in &report.edges {
        output.item(&format!(
            "{} -> {} ({} -> {})",
            edge.from, edge.to, edge.from_table, edge.to_table
        ));
    }

    output.heading("Dependencies");
    for summary in &report.dependencies {
        if summary.dependencies == 0 {
            output.item(&format!("{} has no dependencies", summary.table));
        } else {
            output.item(&format!("{} has {} dependencies", summary.table, summary.dependencies));
        }
    }

    for skipped in &report.skipped_references {
        output.warning(&format!("Skipped foreign key outside the inspected tables: {}", skipped));
    }

    output.heading("Insertion order");
    for (position, table) in report.insertion_order.iter().enumerate() {
        output.item(&format!("{}. {}", position + 1, table));
    }

    output.success(&format!("{} tables ordered", report.insertion_order.len()));
}
