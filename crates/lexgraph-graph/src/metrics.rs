//! Structural graph parameters computed in one pass over the undirected view.
//!
//! The first access to any of diameter, average shortest path length,
//! eccentricity, clustering coefficient, or degree distribution runs
//! [`GraphParameters::compute`] and memoizes the result on the graph.
//!
//! The pass runs one breadth-first search per vertex. Each vertex is marked
//! as a finished source before its search starts, so every unordered pair
//! contributes its distance to the path-length sum exactly once. The sum is
//! kept in a [`BigUint`]; on graphs with hundreds of thousands of vertices it
//! outgrows any fixed-width integer.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use lexgraph_core::{Entity, Error, Result};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use petgraph::stable_graph::NodeIndex;

use crate::types::EntityGraph;

const UNREACHED: usize = usize::MAX;

/// Result of the amortized metrics pass.
///
/// Eccentricities and the degree distribution are either both absent (the
/// pass has not run) or both cover every vertex.
#[derive(Clone, Debug)]
pub struct GraphParameters {
    /// Longest shortest path, in edges.
    pub diameter: usize,
    /// Mean distance over all unordered vertex pairs.
    pub average_shortest_path_length: f64,
    /// Mean local clustering coefficient.
    pub clustering_coefficient: f64,
    /// Eccentricity per entity ID.
    pub eccentricities: HashMap<String, usize>,
    /// Number of vertices per undirected degree.
    pub degree_distribution: BTreeMap<usize, usize>,
    /// Sum of the distances of all connected unordered pairs.
    pub path_length_sum: BigUint,
}

impl GraphParameters {
    /// Run the metrics pass over `graph`.
    pub fn compute(graph: &EntityGraph) -> Self {
        let nodes: Vec<NodeIndex> = graph.graph.node_indices().collect();
        let n = nodes.len();
        let position: HashMap<NodeIndex, usize> =
            nodes.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();

        let adjacency: Vec<Vec<usize>> = nodes
            .iter()
            .map(|&idx| {
                graph
                    .undirected_neighbors(idx)
                    .into_iter()
                    .filter_map(|neighbor| position.get(&neighbor).copied())
                    .collect()
            })
            .collect();
        let adjacent: Vec<HashSet<usize>> = adjacency
            .iter()
            .map(|neighbors| neighbors.iter().copied().collect())
            .collect();

        let mut degree_distribution: BTreeMap<usize, usize> = BTreeMap::new();
        let mut eccentricities: HashMap<String, usize> = HashMap::with_capacity(n);
        let mut clustering_sum = 0.0;
        let mut path_length_sum = BigUint::zero();
        let mut diameter = 0;

        let mut was_source = vec![false; n];
        let mut distance = vec![UNREACHED; n];
        let mut queue = VecDeque::new();

        for source in 0..n {
            let neighbors = &adjacency[source];
            let degree = neighbors.len();
            *degree_distribution.entry(degree).or_insert(0) += 1;

            if degree > 1 {
                let linked = neighbors
                    .iter()
                    .flat_map(|&u| neighbors.iter().map(move |&w| (u, w)))
                    .filter(|&(u, w)| u != w && adjacent[u].contains(&w))
                    .count();
                clustering_sum += linked as f64 / (degree * (degree - 1)) as f64;
            }

            was_source[source] = true;
            distance.fill(UNREACHED);
            distance[source] = 0;
            queue.clear();
            queue.push_back(source);

            let mut eccentricity = 0;
            let mut source_sum: u64 = 0;
            while let Some(current) = queue.pop_front() {
                let next = distance[current] + 1;
                for &neighbor in &adjacency[current] {
                    if distance[neighbor] != UNREACHED {
                        continue;
                    }
                    distance[neighbor] = next;
                    eccentricity = eccentricity.max(next);
                    if !was_source[neighbor] {
                        source_sum += next as u64;
                        diameter = diameter.max(next);
                    }
                    queue.push_back(neighbor);
                }
            }

            path_length_sum += BigUint::from(source_sum);
            eccentricities.insert(graph.graph[nodes[source]].id().to_string(), eccentricity);
        }

        let average_shortest_path_length = if n <= 1 {
            0.0
        } else {
            let pairs = (n as f64) * ((n - 1) as f64) / 2.0;
            path_length_sum.to_f64().unwrap_or(f64::MAX) / pairs
        };
        let clustering_coefficient = if n == 0 {
            0.0
        } else {
            clustering_sum / n as f64
        };

        log::debug!(
            "Computed parameters of {}: diameter {diameter}, average path length {average_shortest_path_length:.4}",
            graph.id()
        );

        Self {
            diameter,
            average_shortest_path_length,
            clustering_coefficient,
            eccentricities,
            degree_distribution,
            path_length_sum,
        }
    }

    /// Smallest eccentricity, or `None` for an empty graph.
    pub fn radius(&self) -> Option<usize> {
        self.eccentricities.values().copied().min()
    }
}

impl EntityGraph {
    /// The memoized metrics pass.
    pub fn parameters(&self) -> &GraphParameters {
        self.parameters.get_or_init(|| GraphParameters::compute(self))
    }

    pub fn diameter(&self) -> usize {
        self.parameters().diameter
    }

    pub fn average_shortest_path_length(&self) -> f64 {
        self.parameters().average_shortest_path_length
    }

    pub fn clustering_coefficient(&self) -> f64 {
        self.parameters().clustering_coefficient
    }

    pub fn degree_distribution(&self) -> &BTreeMap<usize, usize> {
        &self.parameters().degree_distribution
    }

    /// Maximum distance from `entity` to any vertex it reaches.
    pub fn eccentricity(&self, entity: &Entity) -> Option<usize> {
        self.parameters().eccentricities.get(entity.id()).copied()
    }

    pub fn radius(&self) -> Option<usize> {
        self.parameters().radius()
    }

    /// Vertices whose eccentricity equals the radius, sorted by ID.
    pub fn center(&self) -> Vec<&Entity> {
        let params = self.parameters();
        let Some(radius) = params.radius() else {
            return Vec::new();
        };
        let mut center: Vec<&Entity> = self
            .entities()
            .filter(|entity| params.eccentricities.get(entity.id()) == Some(&radius))
            .collect();
        center.sort();
        center
    }

    /// Mean undirected degree, `2E / N`.
    pub fn average_degree(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return 0.0;
        }
        let degree_sum: usize = self
            .degree_distribution()
            .iter()
            .map(|(degree, count)| degree * count)
            .sum();
        degree_sum as f64 / n as f64
    }

    pub fn max_degree(&self) -> usize {
        self.degree_distribution()
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// PageRank is only offered by a ranking backend.
    pub fn page_rank(&self) -> Result<HashMap<String, f64>> {
        Err(Error::unsupported(format!(
            "page rank is not available on the adjacency backend of {}",
            self.id()
        )))
    }
}
