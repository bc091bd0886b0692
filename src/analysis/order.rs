use tracing::debug;
use crate::analysis::graph::{NodeId, TableGraph};
use crate::error::{MigrateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order the graph's nodes so that every table comes after the tables it
/// references.
///
/// Depth-first, with roots and neighbours taken in ascending id order, so
/// the result only depends on the graph. Fails with
/// `MigrateError::CyclicDependency` on the first cycle found; no partial
/// order is returned.
pub fn resolve_order(graph: &TableGraph) -> Result<Vec<NodeId>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut order = Vec::with_capacity(graph.node_count());

    for root in graph.node_ids() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }

        // Explicit stack so long reference chains cannot overflow the call stack
        marks[root.index()] = Mark::InProgress;
        let mut stack = vec![(root, graph.dependencies_of(root))];

        loop {
            let (node, next) = match stack.last_mut() {
                Some((node, deps)) => (*node, deps.next()),
                None => break,
            };

            match next {
                Some(dep) => match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::InProgress;
                        stack.push((dep, graph.dependencies_of(dep)));
                    }
                    Mark::InProgress => {
                        let path: Vec<NodeId> = stack.iter().map(|(id, _)| *id).collect();
                        return Err(cycle_error(graph, &path, dep));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[node.index()] = Mark::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }
    }

    debug!("Resolved insertion order for {} tables", order.len());
    Ok(order)
}

/// `path` is the current DFS stack and `closing` the in-progress node that
/// was reached again.
fn cycle_error(graph: &TableGraph, path: &[NodeId], closing: NodeId) -> MigrateError {
    let start = path.iter().position(|&id| id == closing).unwrap_or(0);
    let cycle: Vec<String> = path[start..]
        .iter()
        .chain(std::iter::once(&closing))
        .map(|&id| graph.table_name(id).unwrap_or("<unknown>").to_string())
        .collect();

    debug!("Cycle found: {}", cycle.join(" -> "));
    MigrateError::CyclicDependency { cycle }
}

impl TableGraph {
    /// Table names in a safe insertion order (dependencies first)
    pub fn insertion_order(&self) -> Result<Vec<String>> {
        let order = resolve_order(self)?;
        Ok(order.into_iter()
            .filter_map(|id| self.table_name(id).map(str::to_string))
            .collect())
    }

    /// Reverse of the insertion order, for emptying tables (dependents first)
    pub fn deletion_order(&self) -> Result<Vec<String>> {
        let mut order = self.insertion_order()?;
        order.reverse();
        Ok(order)
    }

    pub fn has_cycles(&self) -> bool {
        matches!(resolve_order(self), Err(MigrateError::CyclicDependency { .. }))
    }
}
