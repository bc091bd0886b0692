pub mod graph;
pub mod order;

pub use graph::{TableGraph, NodeId, NodeMap, DanglingPolicy, ColumnLink};
pub use order::resolve_order;
