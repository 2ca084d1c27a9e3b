//! Hyponym counts and intrinsic information content (IIC).
//!
//! The hyponym count of a vertex is the number of its children plus the
//! counts of those children, computed bottom-up over the acyclic largest
//! connected component with a FIFO worklist:
//!
//! 1. Seed the queue with every leaf.
//! 2. Pop a vertex. If all of its children are finalized, finalize it and
//!    enqueue its parents.
//! 3. Otherwise put it back and enqueue its unfinalized children.
//!
//! Vertices with several parents are counted once per path, so counts high
//! in the taxonomy are inflated; values above the vertex count are clipped
//! to `N - 1`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use lexgraph_core::{Entity, Error, Result, normalize_id};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::types::{EntityGraph, GraphId};

/// Vertices finalized between two progress log lines.
const PROGRESS_INTERVAL: usize = 50_000;

/// Hyponym count per entity ID of one graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyponymCounts {
    graph_id: GraphId,
    case_sensitive: bool,
    counts: HashMap<String, usize>,
}

impl HyponymCounts {
    /// Run the worklist fixpoint over an acyclic graph.
    pub fn compute(graph: &EntityGraph, case_sensitive: bool) -> Result<Self> {
        if let Some((from, to)) = graph.cycle_witness() {
            return Err(Error::consistency(format!(
                "hyponym counts need an acyclic graph, but {} has the cycle edge {from} -> {to}",
                graph.id()
            )));
        }

        let mut finalized: HashMap<NodeIndex, usize> = HashMap::with_capacity(graph.node_count());
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        let mut queued: HashSet<NodeIndex> = HashSet::new();

        for idx in graph.graph.node_indices().filter(|&idx| graph.is_leaf(idx)) {
            queue.push_back(idx);
            queued.insert(idx);
        }

        while let Some(node) = queue.pop_front() {
            queued.remove(&node);
            if finalized.contains_key(&node) {
                continue;
            }

            let children = graph.successors(node);
            let pending: Vec<NodeIndex> = children
                .iter()
                .copied()
                .filter(|child| !finalized.contains_key(child))
                .collect();

            if pending.is_empty() {
                let count = children.len() + children.iter().map(|c| finalized[c]).sum::<usize>();
                finalized.insert(node, count);
                if finalized.len().is_multiple_of(PROGRESS_INTERVAL) {
                    log::debug!("Finalized {} hyponym counts", finalized.len());
                }

                for parent in graph.predecessors(node) {
                    if !finalized.contains_key(&parent) && queued.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            } else {
                queue.push_back(node);
                queued.insert(node);
                for child in pending {
                    if queued.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        if finalized.len() != graph.node_count() {
            return Err(Error::consistency(format!(
                "hyponym fixpoint finalized {} of {} vertices of {}",
                finalized.len(),
                graph.node_count(),
                graph.id()
            )));
        }

        let mut counts: HashMap<String, usize> = HashMap::with_capacity(finalized.len());
        for (idx, count) in finalized {
            let key = normalize_id(graph.graph[idx].id(), case_sensitive);
            let slot = counts.entry(key).or_insert(0);
            *slot = (*slot).max(count);
        }

        let n = counts.len();
        let mut clipped = 0;
        for count in counts.values_mut() {
            if *count >= n {
                *count = n.saturating_sub(1);
                clipped += 1;
            }
        }
        if clipped > 0 {
            log::debug!("Clipped {clipped} inflated hyponym count(s) to {}", n.saturating_sub(1));
        }

        log::info!("Computed {n} hyponym counts for {}", graph.id());
        Ok(Self {
            graph_id: graph.id().clone(),
            case_sensitive,
            counts,
        })
    }

    pub fn graph_id(&self) -> &GraphId {
        &self.graph_id
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Hyponym count of the entity with this ID.
    pub fn get(&self, id: &str) -> Option<usize> {
        self.counts
            .get(&normalize_id(id, self.case_sensitive))
            .copied()
    }

    /// `1 - ln(count + 1) / ln(N)`, or 0.0 for unknown IDs.
    pub fn intrinsic_information_content(&self, id: &str) -> f64 {
        let n = self.counts.len();
        match self.get(id) {
            Some(count) if n > 1 => 1.0 - ((count + 1) as f64).ln() / (n as f64).ln(),
            _ => 0.0,
        }
    }

    /// All `(id, count)` pairs, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(id, &count)| (id.as_str(), count))
    }
}

impl EntityGraph {
    /// Hyponym counts over this graph's largest connected component.
    ///
    /// Loaded from the cache when present, otherwise computed and
    /// persisted. Memoized for the lifetime of the graph.
    pub fn hyponym_counts(self: &Arc<Self>) -> Result<Arc<HyponymCounts>> {
        let counts = self.hyponyms.get_or_try_init(|| {
            let lcc = self.largest_connected_component()?;
            if Arc::ptr_eq(&lcc, self) {
                self.load_or_compute_hyponym_counts().map(Arc::new)
            } else {
                lcc.hyponym_counts()
            }
        })?;
        Ok(Arc::clone(counts))
    }

    fn load_or_compute_hyponym_counts(&self) -> Result<HyponymCounts> {
        let case_sensitive = self.options.case_sensitive;
        if let Some(cache) = &self.cache {
            if let Some(counts) = cache.load_hyponym_counts(&self.id, case_sensitive)? {
                log::info!("Loaded {} hyponym counts for {} from cache", counts.len(), self.id);
                return Ok(counts);
            }
        }

        let counts = HyponymCounts::compute(self, case_sensitive)?;
        if let Some(cache) = &self.cache {
            cache.save_hyponym_counts(&counts)?;
        }
        Ok(counts)
    }

    /// Number of descendants of `entity`; `None` outside the LCC.
    pub fn hyponym_count(self: &Arc<Self>, entity: &Entity) -> Result<Option<usize>> {
        Ok(self.hyponym_counts()?.get(entity.id()))
    }

    /// Intrinsic information content of `entity`, in `[0, 1]`.
    pub fn intrinsic_information_content(self: &Arc<Self>, entity: &Entity) -> Result<f64> {
        Ok(self
            .hyponym_counts()?
            .intrinsic_information_content(entity.id()))
    }
}
