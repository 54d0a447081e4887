//! Path Discovery - bounded simple-path enumeration over the relation graph
//!
//! Depth-first traversal from every distinct source table, recording a
//! candidate at every depth between one hop and the bound. The visited set is
//! copied per branch so sibling branches never interfere; within one branch a
//! table is never revisited (simple paths only).
//!
//! Exponential in branching factor but bounded by `max_hops`; fine at the
//! tens-to-low-hundreds table counts this catalog targets.

use crate::graph::RelationGraph;
use crate::relationship::{PathEdge, Relationship, TablePath};
use crate::Result;
use std::collections::HashSet;

/// Default hop bound: paths of 2 to 4 tables.
pub const DEFAULT_MAX_HOPS: usize = 3;

/// A discovered multi-hop connection between two tables.
///
/// Carries no name or description; naming is supplied externally before a
/// candidate becomes a persisted indirect relationship.
#[derive(Debug, Clone)]
pub struct PathCandidate {
    /// Ordered table names, starting table first
    pub tables: Vec<String>,
    /// The relationships traversed, one per hop
    pub edges: Vec<Relationship>,
}

impl PathCandidate {
    /// Number of hops in this candidate
    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    /// Flatten this candidate into a validated [`TablePath`], ready to be
    /// attached to an indirect relationship.
    pub fn to_table_path(&self) -> Result<TablePath> {
        let edges = self
            .edges
            .iter()
            .map(|rel| PathEdge {
                from_table: rel.source_table().name.clone(),
                from_field: rel.source_field().name.clone(),
                to_table: rel.target_table().name.clone(),
                to_field: rel.target_field().name.clone(),
            })
            .collect();
        TablePath::new(self.tables.clone(), edges)
    }
}

impl std::fmt::Display for PathCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tables.join(" -> "))
    }
}

/// Enumerate every simple path of 1 to `max_hops` hops in the graph.
///
/// A path and each of its shorter prefixes are recorded separately. Two
/// different relationships between the same pair of tables yield distinct
/// candidates; for a fixed graph and bound the result is exhaustive.
pub fn find_indirect_paths(graph: &RelationGraph, max_hops: usize) -> Vec<PathCandidate> {
    let mut candidates = Vec::new();
    if max_hops == 0 {
        return candidates;
    }
    for start in graph.source_tables() {
        let mut visited = HashSet::new();
        visited.insert(start.to_string());
        walk(
            graph,
            start,
            &mut vec![start.to_string()],
            &mut Vec::new(),
            &visited,
            max_hops,
            &mut candidates,
        );
    }
    candidates
}

#[allow(clippy::too_many_arguments)]
fn walk(
    graph: &RelationGraph,
    current: &str,
    path: &mut Vec<String>,
    edges: &mut Vec<Relationship>,
    visited: &HashSet<String>,
    max_hops: usize,
    candidates: &mut Vec<PathCandidate>,
) {
    for edge in graph.edges_from(current) {
        let next = &edge.target_table().name;
        if visited.contains(next) {
            continue;
        }
        path.push(next.clone());
        edges.push(edge.clone());
        candidates.push(PathCandidate {
            tables: path.clone(),
            edges: edges.clone(),
        });
        // path.len() counts tables; the bound allows max_hops + 1 of them
        if path.len() < max_hops + 1 {
            let mut branch_visited = visited.clone();
            branch_visited.insert(next.clone());
            walk(graph, next, path, edges, &branch_visited, max_hops, candidates);
        }
        path.pop();
        edges.pop();
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

    fn table_sequences(candidates: &[PathCandidate]) -> Vec<Vec<String>> {
        let mut seqs: Vec<Vec<String>> = candidates.iter().map(|c| c.tables.clone()).collect();
        seqs.sort();
        seqs
    }

    #[test]
    fn test_all_simple_paths_within_bound() {
        // A->B, B->C, C->D, A->D
        let graph = RelationGraph::build(&[
            direct("A", "B"),
            direct("B", "C"),
            direct("C", "D"),
            direct("A", "D"),
        ]);

        let candidates = find_indirect_paths(&graph, 3);
        let seqs = table_sequences(&candidates);

        let expected: Vec<Vec<String>> = vec![
            vec!["A", "B"],
            vec!["A", "B", "C"],
            vec!["A", "B", "C", "D"],
            vec!["A", "D"],
            vec!["B", "C"],
            vec!["B", "C", "D"],
            vec!["C", "D"],
        ]
        .into_iter()
        .map(|v| v.into_iter().map(String::from).collect())
        .collect();

        assert_eq!(seqs, expected);
    }

    #[test]
    fn test_hop_bound_is_respected() {
        let graph = RelationGraph::build(&[
            direct("A", "B"),
            direct("B", "C"),
            direct("C", "D"),
            direct("D", "E"),
        ]);

        let candidates = find_indirect_paths(&graph, 3);
        assert!(candidates.iter().all(|c| c.tables.len() <= 4));
        // The 4-hop chain A..E must be absent, its 3-hop prefix present
        let seqs = table_sequences(&candidates);
        assert!(seqs.contains(&vec!["A".into(), "B".into(), "C".into(), "D".into()]));
        assert!(!seqs.iter().any(|s| s.len() > 4));

        let short = find_indirect_paths(&graph, 1);
        assert!(short.iter().all(|c| c.tables.len() == 2));
        assert_eq!(short.len(), 4);
    }

    #[test]
    fn test_cycles_do_not_loop() {
        // A->B, B->A: each direction is a 1-hop path, nothing longer
        let graph = RelationGraph::build(&[direct("A", "B"), direct("B", "A")]);
        let seqs = table_sequences(&find_indirect_paths(&graph, 3));
        assert_eq!(
            seqs,
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["B".to_string(), "A".to_string()],
            ]
        );
    }

    #[test]
    fn test_sibling_branches_do_not_interfere() {
        // Diamond: A->B->D and A->C->D; the visited set of one branch must
        // not block D for the other
        let graph = RelationGraph::build(&[
            direct("A", "B"),
            direct("A", "C"),
            direct("B", "D"),
            direct("C", "D"),
        ]);
        let seqs = table_sequences(&find_indirect_paths(&graph, 3));
        assert!(seqs.contains(&vec!["A".into(), "B".into(), "D".into()]));
        assert!(seqs.contains(&vec!["A".into(), "C".into(), "D".into()]));
    }

    #[test]
    fn test_parallel_edges_yield_distinct_candidates() {
        let mut by_owner = direct("orders", "users");
        if let Relationship::Direct(base) = &mut by_owner {
            base.source_field = EntityRef::named("owner_id");
        }
        let graph = RelationGraph::build(&[direct("orders", "users"), by_owner]);

        let candidates = find_indirect_paths(&graph, 3);
        assert_eq!(candidates.len(), 2);
        let fields: Vec<&str> = candidates
            .iter()
            .map(|c| c.edges[0].source_field().name.as_str())
            .collect();
        assert!(fields.contains(&"users_id"));
        assert!(fields.contains(&"owner_id"));
    }

    #[test]
    fn test_candidate_to_table_path() {
        let graph = RelationGraph::build(&[direct("A", "B"), direct("B", "C")]);
        let candidates = find_indirect_paths(&graph, 3);
        let two_hop = candidates
            .iter()
            .find(|c| c.tables == vec!["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap();

        let path = two_hop.to_table_path().unwrap();
        assert_eq!(path.hops(), 2);
        assert_eq!(path.edges()[0].to_table, "B");
        assert_eq!(path.edges()[1].from_table, "B");
    }
}
