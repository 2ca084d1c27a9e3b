//! Get-or-create registry of built graphs.
//!
//! A [`GraphRegistry`] is an explicit value owned by the application (or a
//! test), not ambient global state. It guarantees at most one build per
//! [`GraphId`] even under concurrent callers: each ID has its own loading
//! lock, and the map is checked again after the lock is taken.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use lexgraph_core::{Entity, Error, LexicalResource, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::builder::GraphBuilder;
use crate::persistence::GraphCache;
use crate::types::{EntityGraph, GraphId, GraphOptions};

/// Graph implementation requested from the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    /// The in-process adjacency engine.
    #[default]
    Adjacency,
    /// A library-backed ranking/clustering engine. Not available in this
    /// build.
    Ranking,
}

/// Process-wide cache of built graphs keyed by [`GraphId`].
#[derive(Debug, Default)]
pub struct GraphRegistry {
    cache: Option<GraphCache>,
    options: GraphOptions,
    graphs: DashMap<GraphId, Arc<EntityGraph>>,
    /// Per-ID loading locks; cloned out so the map entry is not held while
    /// building.
    loading_locks: DashMap<GraphId, Arc<Mutex<()>>>,
}

impl GraphRegistry {
    /// Create a registry persisting graphs to `cache`, if given.
    pub fn new(cache: Option<GraphCache>) -> Self {
        Self {
            cache,
            ..Default::default()
        }
    }

    /// Engine options applied to every graph this registry builds.
    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Return the registered graph for this resource, loading or building
    /// it on first request.
    ///
    /// A `subset` requires a `suffix`. Requesting
    /// [`GraphBackend::Ranking`] fails with [`Error::Unsupported`].
    pub fn get_or_create<R: LexicalResource + ?Sized>(
        &self,
        resource: &R,
        backend: GraphBackend,
        subset: Option<&BTreeSet<Entity>>,
        suffix: Option<&str>,
    ) -> Result<Arc<EntityGraph>> {
        if backend == GraphBackend::Ranking {
            return Err(Error::unsupported(format!(
                "the ranking graph backend is not available for {}",
                resource.resource_name()
            )));
        }

        let mut builder = GraphBuilder::new(resource).with_options(self.options.clone());
        if let Some(subset) = subset {
            builder = builder.with_subset(subset);
        }
        if let Some(suffix) = suffix {
            builder = builder.with_suffix(suffix);
        }
        if let Some(cache) = &self.cache {
            builder = builder.with_cache(cache.clone());
        }
        let id = builder.graph_id()?;

        if let Some(graph) = self.get(&id) {
            return Ok(graph);
        }

        let lock = self.loading_lock(&id);
        let _guard = lock.lock();

        // Another caller may have finished while we waited.
        if let Some(graph) = self.get(&id) {
            log::debug!("Graph {id} was registered while waiting for its lock");
            return Ok(graph);
        }

        let graph = Arc::new(builder.build_or_load()?);
        self.graphs.insert(id.clone(), Arc::clone(&graph));
        log::info!("Registered graph {id}");
        Ok(graph)
    }

    pub fn get(&self, id: &GraphId) -> Option<Arc<EntityGraph>> {
        self.graphs.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &GraphId) -> bool {
        self.graphs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// IDs of all registered graphs, sorted.
    pub fn ids(&self) -> Vec<GraphId> {
        let mut ids: Vec<GraphId> = self.graphs.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Drop a graph from the registry. Its cache files are kept.
    ///
    /// The loading lock survives while a build for `id` still holds it, so a
    /// caller arriving mid-build waits for that build instead of starting
    /// another.
    pub fn evict(&self, id: &GraphId) -> Option<Arc<EntityGraph>> {
        self.loading_locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        self.graphs.remove(id).map(|(_, graph)| graph)
    }

    pub fn clear(&self) {
        self.graphs.clear();
        self.loading_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    fn loading_lock(&self, id: &GraphId) -> Arc<Mutex<()>> {
        self.loading_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
