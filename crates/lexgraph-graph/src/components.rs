//! Connectivity analysis on the undirected view.
//!
//! Components are weakly connected: edge direction is ignored. The largest
//! connected component (LCC) is extracted into its own [`EntityGraph`] with
//! the `lcc` suffix, so it has its own cache entries.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use lexgraph_core::{Entity, Result};
use petgraph::stable_graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::NodeIndexable;

use crate::types::EntityGraph;

/// Suffix appended to the ID of an extracted largest connected component.
pub const LCC_SUFFIX: &str = "lcc";

impl EntityGraph {
    /// Vertex sets of all weakly connected components, largest first.
    ///
    /// Components of equal size keep the insertion order of their first
    /// vertex.
    pub(crate) fn component_indices(&self) -> Vec<BTreeSet<NodeIndex>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_bound());
        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                sets.union(from.index(), to.index());
            }
        }

        let mut order: Vec<usize> = Vec::new();
        let mut by_root: HashMap<usize, BTreeSet<NodeIndex>> = HashMap::new();
        for idx in self.graph.node_indices() {
            let root = sets.find(idx.index());
            by_root
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    BTreeSet::new()
                })
                .insert(idx);
        }

        let mut components: Vec<BTreeSet<NodeIndex>> = order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect();
        components.sort_by_key(|component| std::cmp::Reverse(component.len()));
        components
    }

    /// Weakly connected components as entity sets, largest first.
    pub fn connected_components(&self) -> Vec<BTreeSet<Entity>> {
        self.component_indices()
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .collect()
    }

    pub fn number_of_connected_components(&self) -> usize {
        self.component_indices().len()
    }

    /// Whether the graph has exactly one component. An empty graph is not
    /// connected.
    pub fn is_connected(&self) -> bool {
        self.number_of_connected_components() == 1
    }

    /// The largest connected component as its own graph.
    ///
    /// Returns this same graph when it has at most one component. Otherwise
    /// the component is loaded from the cache or extracted, made acyclic,
    /// and persisted under `<id>_lcc`. The result is memoized.
    pub fn largest_connected_component(self: &Arc<Self>) -> Result<Arc<EntityGraph>> {
        if let Some(lcc) = self.lcc.get() {
            return Ok(Arc::clone(lcc));
        }

        let components = self.component_indices();
        if components.len() <= 1 {
            return Ok(Arc::clone(self));
        }

        let lcc = self
            .lcc
            .get_or_try_init(|| self.extract_component(&components[0]).map(Arc::new))?;
        Ok(Arc::clone(lcc))
    }

    fn extract_component(&self, vertices: &BTreeSet<NodeIndex>) -> Result<EntityGraph> {
        let id = self.id.with_suffix(LCC_SUFFIX);

        let cached = match &self.cache {
            Some(cache) => cache.load_graph(&id)?,
            None => None,
        };

        let lcc = match cached {
            Some(graph) => {
                let graph = graph.with_options(self.options.clone());
                match &self.cache {
                    Some(cache) => graph.with_cache(cache.clone()),
                    None => graph,
                }
            }
            None => {
                let mut graph = self.restricted_to(vertices, id);
                graph.remove_cycles();
                if let Some(cache) = &self.cache {
                    cache.save_graph(&graph)?;
                }
                graph
            }
        };

        log::info!(
            "Largest connected component of {} has {} of {} vertices ({:.1}%)",
            self.id,
            lcc.node_count(),
            self.node_count(),
            lcc_ratio(lcc.node_count(), self.node_count()) * 100.0
        );
        Ok(lcc)
    }
}

/// Share of `total` vertices covered by an LCC of `lcc_size`.
pub(crate) fn lcc_ratio(lcc_size: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    lcc_size as f64 / total as f64
}
