//! Cycle detection and removal.
//!
//! Colored depth-first search: a vertex turns grey when the search enters it
//! and black when every successor has been explored. Traversing an edge into
//! a grey vertex closes a cycle; that edge is the witness.
//!
//! Taxonomies extracted from collaboratively built resources are only
//! "almost" acyclic. [`EntityGraph::remove_cycles`] deletes witness edges
//! until none remain, which the hyponym-count fixpoint relies on.

use std::collections::HashMap;

use lexgraph_core::Entity;
use petgraph::stable_graph::NodeIndex;

use crate::types::EntityGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// Find one cycle-closing edge, restarting from every white vertex.
pub(crate) fn find_cycle_edge(graph: &EntityGraph) -> Option<(NodeIndex, NodeIndex)> {
    let mut colors: HashMap<NodeIndex, Color> = graph
        .graph
        .node_indices()
        .map(|idx| (idx, Color::White))
        .collect();

    for start in graph.graph.node_indices() {
        if colors.get(&start) != Some(&Color::White) {
            continue;
        }

        // Explicit stack of (vertex, successors, next successor position).
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        colors.insert(start, Color::Grey);
        stack.push((start, graph.successors(start), 0));

        while let Some(frame) = stack.last_mut() {
            let (node, successors, next) = frame;
            let node = *node;

            if *next >= successors.len() {
                colors.insert(node, Color::Black);
                stack.pop();
                continue;
            }

            let successor = successors[*next];
            *next += 1;

            match colors.get(&successor).copied().unwrap_or(Color::White) {
                Color::Grey => return Some((node, successor)),
                Color::White => {
                    colors.insert(successor, Color::Grey);
                    stack.push((successor, graph.successors(successor), 0));
                }
                Color::Black => {}
            }
        }
    }

    None
}

impl EntityGraph {
    /// Whether the directed graph contains at least one cycle.
    pub fn contains_cycle(&self) -> bool {
        find_cycle_edge(self).is_some()
    }

    /// One edge that closes a cycle, if any.
    pub fn cycle_witness(&self) -> Option<(&Entity, &Entity)> {
        find_cycle_edge(self).map(|(from, to)| (&self.graph[from], &self.graph[to]))
    }

    /// Delete cycle-closing edges until the graph is acyclic.
    ///
    /// Vertices are never removed. Returns the number of deleted edges; a
    /// second call on the same graph returns 0.
    pub fn remove_cycles(&mut self) -> usize {
        let mut removed = 0;
        while let Some((from, to)) = find_cycle_edge(self) {
            log::debug!(
                "Removing cycle edge {} -> {} from {}",
                self.graph[from],
                self.graph[to],
                self.id
            );
            self.remove_edge_between(from, to);
            removed += 1;
        }

        if removed > 0 {
            log::info!("Removed {removed} cycle edge(s) from {}", self.id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphId;

    fn e(id: &str) -> Entity {
        Entity::new(id)
    }

    fn graph_with_edges(edges: &[(&str, &str)]) -> EntityGraph {
        let mut graph = EntityGraph::new(GraphId::new("cycles", "1"));
        for (from, to) in edges {
            graph.add_edge(&e(from), &e(to));
        }
        graph
    }

    #[test]
    fn test_acyclic_graph() {
        let graph = graph_with_edges(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(!graph.contains_cycle());
        assert!(graph.cycle_witness().is_none());
    }

    #[test]
    fn test_empty_graph_has_no_cycle() {
        let graph = EntityGraph::new(GraphId::new("empty", "1"));
        assert!(!graph.contains_cycle());
    }

    #[test]
    fn test_two_node_cycle() {
        let mut graph = graph_with_edges(&[("root", "a"), ("a", "b"), ("b", "a")]);
        assert!(graph.contains_cycle());

        let (nodes, edges) = (graph.node_count(), graph.edge_count());
        let removed = graph.remove_cycles();

        assert_eq!(removed, 1);
        assert!(!graph.contains_cycle());
        assert_eq!(graph.node_count(), nodes);
        assert!(graph.edge_count() < edges);
    }

    #[test]
    fn test_three_node_cycle() {
        let mut graph = graph_with_edges(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        let witness = graph.cycle_witness().map(|(a, b)| (a.id().to_string(), b.id().to_string()));
        assert!(witness.is_some());

        assert_eq!(graph.remove_cycles(), 1);
        assert!(!graph.contains_cycle());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_multiple_disjoint_cycles() {
        let mut graph = graph_with_edges(&[("a", "b"), ("b", "a"), ("x", "y"), ("y", "z"), ("z", "x")]);
        assert_eq!(graph.remove_cycles(), 2);
        assert!(!graph.contains_cycle());
    }

    #[test]
    fn test_remove_cycles_is_idempotent() {
        let mut graph = graph_with_edges(&[("a", "b"), ("b", "a")]);
        graph.remove_cycles();
        let edges = graph.edge_count();

        assert_eq!(graph.remove_cycles(), 0);
        assert_eq!(graph.edge_count(), edges);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // Reaching a black vertex again is a cross edge, not a cycle.
        let graph = graph_with_edges(&[("top", "l"), ("top", "r"), ("l", "bottom"), ("r", "bottom")]);
        assert!(!graph.contains_cycle());
    }
}
