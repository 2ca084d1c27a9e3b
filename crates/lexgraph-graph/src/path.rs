//! Point-to-point shortest paths.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use lexgraph_core::Entity;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::types::EntityGraph;

/// Which view of the graph a path search walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Follow hypernym → hyponym edges only.
    Directed,
    /// Ignore edge direction.
    #[default]
    Undirected,
}

impl EntityGraph {
    /// Shortest path from `from` to `to`, both endpoints included.
    ///
    /// `from == to` yields `[from]` without consulting the graph. `None`
    /// means no path exists or an endpoint is not in the graph.
    pub fn shortest_path(&self, from: &Entity, to: &Entity, mode: PathMode) -> Option<Vec<Entity>> {
        if from.id() == to.id() {
            return Some(vec![from.clone()]);
        }
        let source = self.index_of(from.id())?;
        let target = self.index_of(to.id())?;

        let indices = self.dijkstra(source, target, mode)?;
        Some(
            indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect(),
        )
    }

    /// Number of edges on the shortest path; `f64::INFINITY` if there is none.
    pub fn shortest_path_length(&self, from: &Entity, to: &Entity, mode: PathMode) -> f64 {
        match self.shortest_path(from, to, mode) {
            Some(path) => (path.len() - 1) as f64,
            None => f64::INFINITY,
        }
    }

    /// Single-pair Dijkstra with unit edge weights.
    fn dijkstra(&self, source: NodeIndex, target: NodeIndex, mode: PathMode) -> Option<Vec<NodeIndex>> {
        let mut dist: HashMap<NodeIndex, usize> = HashMap::new();
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(source, 0);
        heap.push(Reverse((0usize, source)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == target {
                break;
            }
            if dist.get(&node).is_some_and(|&best| cost > best) {
                continue;
            }

            let neighbors = match mode {
                PathMode::Directed => self.successors(node),
                PathMode::Undirected => self.undirected_neighbors(node),
            };
            for next in neighbors {
                let candidate = cost + 1;
                if dist.get(&next).is_none_or(|&best| candidate < best) {
                    dist.insert(next, candidate);
                    previous.insert(next, node);
                    heap.push(Reverse((candidate, next)));
                }
            }
        }

        if !dist.contains_key(&target) {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(&prev) = previous.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}
