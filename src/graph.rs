//! Relation Graph - In-memory directed multigraph of tables
//!
//! Nodes are table names; each edge carries the relationship it came from so
//! a discovered path can recover the real field-level connections, not just
//! table adjacency. Built on demand from direct relationships; pure data,
//! no caching contract - callers must rebuild after relationships change.

use crate::relationship::Relationship;
use std::collections::{HashMap, HashSet};

/// Directed multigraph of tables connected by relationship edges.
#[derive(Debug, Default)]
pub struct RelationGraph {
    /// Outgoing edges keyed by source table name
    edges_from: HashMap<String, Vec<Relationship>>,
}

impl RelationGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a set of relationships.
    ///
    /// Pure function of its input; typically fed the direct relationships,
    /// but anything exposing source/target tables works.
    pub fn build(relationships: &[Relationship]) -> Self {
        let mut graph = Self::new();
        for rel in relationships {
            graph.add_relationship(rel.clone());
        }
        graph
    }

    /// Add one relationship edge.
    ///
    /// Relationships with an empty source or target table cannot participate
    /// in traversal; they are dropped here, not treated as errors.
    pub fn add_relationship(&mut self, rel: Relationship) {
        let from = &rel.source_table().name;
        let to = &rel.target_table().name;
        if from.is_empty() || to.is_empty() {
            tracing::debug!(name = rel.name(), "dropping edge without table endpoints");
            return;
        }
        self.edges_from.entry(from.clone()).or_default().push(rel);
    }

    /// Distinct table names that appear as a source of at least one edge
    pub fn source_tables(&self) -> impl Iterator<Item = &str> {
        self.edges_from.keys().map(String::as_str)
    }

    /// Outgoing edges from a table
    pub fn edges_from(&self, table: &str) -> &[Relationship] {
        self.edges_from.get(table).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut tables: HashSet<&str> = HashSet::new();
        let mut edges = 0;
        for (from, outgoing) in &self.edges_from {
            tables.insert(from.as_str());
            for rel in outgoing {
                tables.insert(rel.target_table().name.as_str());
            }
            edges += outgoing.len();
        }
        GraphStats {
            tables: tables.len(),
            edges,
        }
    }
}

/// Statistics about a relation graph
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphStats {
    pub tables: usize,
    pub edges: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Relation Graph Statistics:")?;
        writeln!(f, "  Tables: {}", self.tables)?;
        writeln!(f, "  Edges: {}", self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::{EntityRef, RelationshipBase};

    fn direct(from: &str, to: &str) -> Relationship {
        Relationship::direct(RelationshipBase::new(
            format!("{from}-{to}"),
            EntityRef::named(from),
            EntityRef::named(format!("{to}_id")),
            EntityRef::named(to),
            EntityRef::named("id"),
        ))
    }

    #[test]
    fn test_build_and_query_edges() {
        let graph = RelationGraph::build(&[direct("orders", "customers"), direct("orders", "products")]);

        let outgoing = graph.edges_from("orders");
        assert_eq!(outgoing.len(), 2);
        assert!(graph.edges_from("customers").is_empty());

        let stats = graph.stats();
        assert_eq!(stats.tables, 3);
        assert_eq!(stats.edges, 2);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        // Two different foreign keys between the same pair of tables
        let mut a = direct("orders", "users");
        let b = direct("orders", "users");
        if let Relationship::Direct(base) = &mut a {
            base.source_field = EntityRef::named("created_by");
        }
        let graph = RelationGraph::build(&[a, b]);
        assert_eq!(graph.edges_from("orders").len(), 2);
    }

    #[test]
    fn test_edges_without_target_are_dropped() {
        let mut rel = direct("orders", "customers");
        if let Relationship::Direct(base) = &mut rel {
            base.target_table = EntityRef::named("");
        }
        let graph = RelationGraph::build(&[rel, direct("orders", "products")]);
        assert_eq!(graph.edges_from("orders").len(), 1);
        assert_eq!(graph.stats().edges, 1);
    }
}
