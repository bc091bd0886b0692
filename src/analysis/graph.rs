use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::error::{MigrateError, Result};
use crate::schema::ForeignKey;

/// Dense vertex identifier of a table, in `[0, node_count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bijection between table names and node ids.
///
/// The forward map resolves names while building; the back map is only
/// used to turn ids into names for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    ids: HashMap<String, NodeId>,
    names: Vec<String>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, assigning the next free id if it is new
    pub fn get_or_insert(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = NodeId(self.names.len());
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name to id
    pub fn forward(&self) -> &HashMap<String, NodeId> {
        &self.ids
    }

    /// Id to name, indexed by `NodeId::index`
    pub fn back(&self) -> &[String] {
        &self.names
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.names.iter().enumerate().map(|(i, name)| (NodeId(i), name.as_str()))
    }
}

/// What to do with a foreign key whose endpoint is not a known table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Fail the build with `MigrateError::DanglingReference`
    #[default]
    Error,
    /// Leave the edge out and record it in `TableGraph::skipped_references`
    Skip,
}

/// Column detail behind an edge. Kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLink {
    pub from_column: String,
    pub to_column: String,
    pub constraint: Option<String>,
}

/// Directed graph over tables where an edge `a -> b` means `a` references `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGraph {
    nodes: NodeMap,
    /// Out-neighbours (dependencies) per node, indexed by `NodeId`
    dependencies: Vec<BTreeSet<NodeId>>,
    links: BTreeMap<(NodeId, NodeId), Vec<ColumnLink>>,
    skipped: Vec<ForeignKey>,
}

impl TableGraph {
    /// Build the dependency graph of `tables` from their foreign keys.
    ///
    /// Ids continue from `seed` when one is given, so a graph can be rebuilt
    /// or extended without renumbering existing tables. New names get ids in
    /// the order they appear in `tables`.
    pub fn build<S: AsRef<str>>(
        tables: &[S],
        foreign_keys: &[ForeignKey],
        seed: Option<NodeMap>,
        policy: DanglingPolicy,
    ) -> Result<Self> {
        let mut nodes = seed.unwrap_or_default();
        for table in tables {
            nodes.get_or_insert(table.as_ref());
        }

        debug!(
            "Building table graph from {} tables and {} foreign key columns",
            nodes.len(),
            foreign_keys.len()
        );

        let mut graph = Self {
            dependencies: vec![BTreeSet::new(); nodes.len()],
            nodes,
            links: BTreeMap::new(),
            skipped: Vec::new(),
        };

        for fk in foreign_keys {
            let endpoints = graph.nodes.id(&fk.from_table).zip(graph.nodes.id(&fk.to_table));
            let Some((from, to)) = endpoints else {
                match policy {
                    DanglingPolicy::Error => {
                        return Err(MigrateError::DanglingReference {
                            from_table: fk.from_table.clone(),
                            from_column: fk.from_column.clone(),
                            to_table: fk.to_table.clone(),
                            to_column: fk.to_column.clone(),
                        });
                    }
                    DanglingPolicy::Skip => {
                        warn!(foreign_key = %fk, "Skipping foreign key to a table outside the inspected set");
                        graph.skipped.push(fk.clone());
                        continue;
                    }
                }
            };

            if graph.dependencies[from.index()].insert(to) {
                debug!("  Creating edge: {} ({}) -> {} ({})", fk.from_table, from, fk.to_table, to);
            }
            let link = ColumnLink {
                from_column: fk.from_column.clone(),
                to_column: fk.to_column.clone(),
                constraint: fk.constraint.clone(),
            };
            let links = graph.links.entry((from, to)).or_default();
            if !links.contains(&link) {
                links.push(link);
            }
        }

        Ok(graph)
    }

    pub fn node_map(&self) -> &NodeMap {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of distinct `(from, to)` pairs
    pub fn edge_count(&self) -> usize {
        self.dependencies.iter().map(BTreeSet::len).sum()
    }

    pub fn node_id(&self, table: &str) -> Option<NodeId> {
        self.nodes.id(table)
    }

    pub fn table_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.name(id)
    }

    /// All node ids in ascending order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.dependencies.len()).map(NodeId)
    }

    /// Tables `id` references. Empty for tables that depend on nothing.
    pub fn dependencies_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.dependencies.get(id.index()).into_iter().flatten().copied()
    }

    /// Tables that reference `id`
    pub fn dependents_of(&self, id: NodeId) -> Vec<NodeId> {
        self.dependencies.iter()
            .enumerate()
            .filter(|(_, deps)| deps.contains(&id))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn dependency_count(&self, id: NodeId) -> usize {
        self.dependencies.get(id.index()).map_or(0, BTreeSet::len)
    }

    pub fn has_dependencies(&self, id: NodeId) -> bool {
        self.dependency_count(id) > 0
    }

    /// Every `(from, to)` edge, sorted
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.node_ids()
            .flat_map(|from| self.dependencies_of(from).map(move |to| (from, to)))
            .collect()
    }

    /// Column pairs that produced the edge `from -> to`
    pub fn column_links(&self, from: NodeId, to: NodeId) -> &[ColumnLink] {
        self.links.get(&(from, to)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Foreign keys left out under `DanglingPolicy::Skip`
    pub fn skipped_references(&self) -> &[ForeignKey] {
        &self.skipped
    }

    /// Output the table graph in Graphviz DOT format
    pub fn to_graphviz(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph table_dependencies {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=rounded];\n\n");

        for (id, name) in self.nodes.iter() {
            // Tables without dependencies can be loaded first
            let color = if self.has_dependencies(id) { "lightyellow" } else { "lightcyan" };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor={}, style=\"filled,rounded\"];\n",
                name, name, color
            ));
        }

        output.push('\n');

        for (from, to) in self.edges() {
            let label = self.column_links(from, to)
                .iter()
                .map(|link| format!("{} -> {}", link.from_column, link.to_column))
                .collect::<Vec<_>>()
                .join("\\n");

            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.nodes.name(from).unwrap_or_default(),
                self.nodes.name(to).unwrap_or_default(),
                label
            ));
        }

        output.push_str("}\n");
        output
    }
}
