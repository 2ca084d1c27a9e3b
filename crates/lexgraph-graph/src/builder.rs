//! GraphBuilder for constructing taxonomy graphs from a lexical resource.
//!
//! The builder walks the resource's entity iterator and queries both
//! directions of the hypernym relation for each entity: children become
//! `entity → child` edges and parents become `parent → entity` edges. This
//! compensates for resources whose parent and child links are not perfectly
//! symmetric.
//!
//! # Example
//!
//! ```rust,ignore
//! use lexgraph_graph::{GraphBuilder, GraphCache};
//!
//! let graph = GraphBuilder::new(&wordnet)
//!     .with_cache(GraphCache::new("/var/cache/lexgraph"))
//!     .build_or_load()?;
//! ```

use std::collections::BTreeSet;

use lexgraph_core::{Entity, Error, LexicalResource, Result};

use crate::persistence::GraphCache;
use crate::types::{EntityGraph, GraphId, GraphOptions};

/// Entities processed between two progress log lines.
const PROGRESS_INTERVAL: usize = 10_000;

/// Counters describing a finished build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Entities yielded by the resource (or subset).
    pub entities_processed: usize,
    /// Vertices in the resulting graph.
    pub vertex_count: usize,
    /// Edges in the resulting graph, after cycle removal.
    pub edge_count: usize,
    /// Self-loops reported by the resource and skipped.
    pub self_loops_skipped: usize,
    /// Edges leaving the subset that were skipped.
    pub external_edges_skipped: usize,
    /// Edges deleted to make the graph acyclic.
    pub cycle_edges_removed: usize,
}

/// Builder for an [`EntityGraph`] over one lexical resource.
pub struct GraphBuilder<'a, R: LexicalResource + ?Sized> {
    resource: &'a R,
    subset: Option<&'a BTreeSet<Entity>>,
    suffix: Option<String>,
    options: GraphOptions,
    cache: Option<GraphCache>,
}

impl<'a, R: LexicalResource + ?Sized> GraphBuilder<'a, R> {
    pub fn new(resource: &'a R) -> Self {
        Self {
            resource,
            subset: None,
            suffix: None,
            options: GraphOptions::default(),
            cache: None,
        }
    }

    /// Restrict the graph to these vertices and the edges among them.
    ///
    /// A subset graph must also be given a suffix so it gets its own
    /// cache entry.
    pub fn with_subset(mut self, subset: &'a BTreeSet<Entity>) -> Self {
        self.subset = Some(subset);
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: GraphCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The ID the built graph will carry.
    pub fn graph_id(&self) -> Result<GraphId> {
        let base = GraphId::for_resource(self.resource);
        match (&self.suffix, self.subset) {
            (Some(suffix), _) => Ok(base.with_suffix(suffix)),
            (None, None) => Ok(base),
            (None, Some(_)) => Err(Error::config(format!(
                "a subset graph of {base} needs a suffix to be cached separately"
            ))),
        }
    }

    /// Return the cached graph if present, otherwise build and persist it.
    pub fn build_or_load(self) -> Result<EntityGraph> {
        let id = self.graph_id()?;

        if let Some(cache) = &self.cache {
            if let Some(graph) = cache.load_graph(&id)? {
                return Ok(self.finish(graph));
            }
        }

        let (graph, _stats) = self.build()?;
        if let Some(cache) = graph.cache() {
            cache.save_graph(&graph)?;
        }
        Ok(graph)
    }

    /// Build the graph from the resource, ignoring any cached artifact.
    ///
    /// Cycles are removed before returning, so a graph persisted right
    /// afterwards loads back identical.
    pub fn build(self) -> Result<(EntityGraph, BuildStats)> {
        let id = self.graph_id()?;
        log::info!("Building graph {id} from resource {}", self.resource.resource_name());

        let mut graph = EntityGraph::new(id);
        let mut stats = BuildStats::default();

        let entities: Box<dyn Iterator<Item = Result<Entity>> + '_> = match self.subset {
            Some(subset) => Box::new(subset.iter().cloned().map(Ok)),
            None => self.resource.entities()?,
        };

        for entity in entities {
            let entity = entity?;
            self.add_relations(&mut graph, &entity, &mut stats)?;

            stats.entities_processed += 1;
            if stats.entities_processed.is_multiple_of(PROGRESS_INTERVAL) {
                log::debug!(
                    "Processed {} entities ({} vertices, {} edges)",
                    stats.entities_processed,
                    graph.node_count(),
                    graph.edge_count()
                );
            }
        }

        stats.cycle_edges_removed = graph.remove_cycles();
        stats.vertex_count = graph.node_count();
        stats.edge_count = graph.edge_count();

        log::info!(
            "Built graph {}: {} vertices, {} edges ({} cycle edges removed)",
            graph.id(),
            stats.vertex_count,
            stats.edge_count,
            stats.cycle_edges_removed
        );

        Ok((self.finish(graph), stats))
    }

    fn add_relations(
        &self,
        graph: &mut EntityGraph,
        entity: &Entity,
        stats: &mut BuildStats,
    ) -> Result<()> {
        graph.add_entity(entity.clone());

        for child in self.resource.children(entity)? {
            self.add_edge(graph, entity, &child, stats);
        }
        for parent in self.resource.parents(entity)? {
            self.add_edge(graph, &parent, entity, stats);
        }
        Ok(())
    }

    fn add_edge(
        &self,
        graph: &mut EntityGraph,
        source: &Entity,
        target: &Entity,
        stats: &mut BuildStats,
    ) {
        if source.id() == target.id() {
            stats.self_loops_skipped += 1;
            return;
        }
        if let Some(subset) = self.subset {
            if !subset.contains(source) || !subset.contains(target) {
                stats.external_edges_skipped += 1;
                return;
            }
        }
        graph.add_edge(source, target);
    }

    fn finish(&self, graph: EntityGraph) -> EntityGraph {
        let graph = graph.with_options(self.options.clone());
        match &self.cache {
            Some(cache) => graph.with_cache(cache.clone()),
            None => graph,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
