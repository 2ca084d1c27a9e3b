//! Core graph types: the Graph Store, its identifier, and engine options.
//!
//! [`EntityGraph`] keeps one authoritative edge set in a petgraph
//! `StableDiGraph`. The directed view (out/in adjacency) and the undirected
//! view are both read from that edge set, so removing an edge is reflected
//! in every view at once.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use lexgraph_core::{Entity, LexicalResource, file_stem};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

use crate::hyponym::HyponymCounts;
use crate::metrics::GraphParameters;
use crate::persistence::GraphCache;
use crate::root_path::RootPathIndex;

/// Default bound on the backward root-path search, in edges.
pub const DEFAULT_MAX_ROOT_PATH_DEPTH: usize = 18;

// ============================================================================
// GraphId
// ============================================================================

/// Stable cache and registry key: resource name, version, optional suffix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId {
    name: String,
    version: String,
    suffix: Option<String>,
}

impl GraphId {
    /// Create an ID for a full resource graph.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            suffix: None,
        }
    }

    /// Create the ID of a resource's full graph.
    pub fn for_resource<R: LexicalResource + ?Sized>(resource: &R) -> Self {
        Self::new(resource.resource_name(), resource.resource_version())
    }

    /// Derive an ID with an additional suffix (`subset`, `lcc`, ...).
    ///
    /// Suffixes accumulate: `wn_3.0_nouns` becomes `wn_3.0_nouns_lcc`.
    pub fn with_suffix(&self, suffix: impl AsRef<str>) -> Self {
        let suffix = suffix.as_ref();
        let suffix = match &self.suffix {
            Some(existing) => format!("{existing}_{suffix}"),
            None => suffix.to_string(),
        };
        Self {
            suffix: Some(suffix),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Deterministic file stem for cache artifacts.
    pub fn file_stem(&self) -> String {
        file_stem(&self.to_string())
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.version)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "_{suffix}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Options
// ============================================================================

/// How the LCS resolver picks among shared root-path nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LcsStrategy {
    /// Return the first node of the first entity's root path that also lies
    /// on the second entity's root path. Not guaranteed to be the node
    /// closest to both entities.
    #[default]
    FirstCommon,
    /// Return the shared node minimizing the sum of its offsets in both
    /// root paths. Ties go to the node nearer the first entity.
    MinimalCombinedLength,
}

/// Tunables of the graph engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Whether hyponym-count keys keep their case.
    pub case_sensitive: bool,
    /// LCS tie-break rule.
    pub lcs_strategy: LcsStrategy,
    /// Bound on the backward root-path search, in edges.
    pub max_root_path_depth: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            lcs_strategy: LcsStrategy::default(),
            max_root_path_depth: DEFAULT_MAX_ROOT_PATH_DEPTH,
        }
    }
}

// ============================================================================
// EntityGraph
// ============================================================================

/// In-memory taxonomy graph over [`Entity`] vertices.
///
/// Edges point from hypernym to hyponym. There are no parallel edges and no
/// self-loops. Derived results (metrics, LCC, hyponym counts, root-path
/// indexes) are computed lazily and memoized for the lifetime of the graph;
/// any structural mutation drops them.
#[derive(Debug)]
pub struct EntityGraph {
    pub(crate) id: GraphId,
    pub(crate) graph: StableDiGraph<Entity, ()>,
    pub(crate) node_indices: HashMap<String, NodeIndex>,
    pub(crate) options: GraphOptions,
    pub(crate) cache: Option<GraphCache>,
    pub(crate) parameters: OnceCell<GraphParameters>,
    pub(crate) lcc: OnceCell<Arc<EntityGraph>>,
    pub(crate) hyponyms: OnceCell<Arc<HyponymCounts>>,
    pub(crate) root_paths: Mutex<HashMap<String, Arc<RootPathIndex>>>,
}

impl EntityGraph {
    /// Create an empty graph.
    pub fn new(id: GraphId) -> Self {
        Self {
            id,
            graph: StableDiGraph::new(),
            node_indices: HashMap::new(),
            options: GraphOptions::default(),
            cache: None,
            parameters: OnceCell::new(),
            lcc: OnceCell::new(),
            hyponyms: OnceCell::new(),
            root_paths: Mutex::new(HashMap::new()),
        }
    }

    /// Use the given engine options.
    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    /// Persist derived artifacts (LCC, hyponym counts, root paths) here.
    pub fn with_cache(mut self, cache: GraphCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn id(&self) -> &GraphId {
        &self.id
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&GraphCache> {
        self.cache.as_ref()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Insert a vertex. Returns `false` if it was already present.
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        if self.node_indices.contains_key(entity.id()) {
            return false;
        }
        self.insert_vertex(entity);
        self.invalidate_derived();
        true
    }

    /// Insert the edge `source → target`, adding missing endpoints.
    ///
    /// Returns `false` for self-loops and for edges already present.
    pub fn add_edge(&mut self, source: &Entity, target: &Entity) -> bool {
        if source.id() == target.id() {
            return false;
        }
        let from = self.ensure_vertex(source);
        let to = self.ensure_vertex(target);
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        self.invalidate_derived();
        true
    }

    /// Remove the edge `source → target`. Returns `false` if absent.
    pub fn remove_edge(&mut self, source: &Entity, target: &Entity) -> bool {
        match (self.index_of(source.id()), self.index_of(target.id())) {
            (Some(from), Some(to)) => self.remove_edge_between(from, to),
            _ => false,
        }
    }

    pub(crate) fn remove_edge_between(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                self.invalidate_derived();
                true
            }
            None => false,
        }
    }

    fn ensure_vertex(&mut self, entity: &Entity) -> NodeIndex {
        match self.node_indices.get(entity.id()) {
            Some(&idx) => idx,
            None => self.insert_vertex(entity.clone()),
        }
    }

    fn insert_vertex(&mut self, entity: Entity) -> NodeIndex {
        let id = entity.id().to_string();
        let idx = self.graph.add_node(entity);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Drop every memoized result computed from the old structure.
    pub(crate) fn invalidate_derived(&mut self) {
        self.parameters.take();
        self.lcc.take();
        self.hyponyms.take();
        self.root_paths.get_mut().clear();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.node_indices.contains_key(entity.id())
    }

    pub fn contains_edge(&self, source: &Entity, target: &Entity) -> bool {
        match (self.index_of(source.id()), self.index_of(target.id())) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Look up a vertex by its canonical ID.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// All vertices, in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All edges as `(hypernym, hyponym)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Entity, &Entity)> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            self.graph
                .edge_endpoints(edge)
                .map(|(from, to)| (&self.graph[from], &self.graph[to]))
        })
    }

    /// Direct hyponyms (out-neighbors), sorted by ID.
    pub fn get_children(&self, entity: &Entity) -> Vec<&Entity> {
        self.entities_at(self.index_of(entity.id()).map(|idx| self.successors(idx)))
    }

    /// Direct hypernyms (in-neighbors), sorted by ID.
    pub fn get_parents(&self, entity: &Entity) -> Vec<&Entity> {
        self.entities_at(self.index_of(entity.id()).map(|idx| self.predecessors(idx)))
    }

    /// Neighbors in the undirected view, sorted by ID.
    pub fn get_neighbors(&self, entity: &Entity) -> Vec<&Entity> {
        self.entities_at(
            self.index_of(entity.id())
                .map(|idx| self.undirected_neighbors(idx)),
        )
    }

    /// Number of hyponyms; 0 for unknown entities.
    pub fn out_degree(&self, entity: &Entity) -> usize {
        self.index_of(entity.id())
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// Number of hypernyms; 0 for unknown entities.
    pub fn in_degree(&self, entity: &Entity) -> usize {
        self.index_of(entity.id())
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Degree in the undirected view; 0 for unknown entities.
    pub fn degree(&self, entity: &Entity) -> usize {
        self.index_of(entity.id())
            .map(|idx| self.undirected_neighbors(idx).len())
            .unwrap_or(0)
    }

    /// Vertices without hyponyms.
    pub fn leaves(&self) -> Vec<&Entity> {
        self.graph
            .node_indices()
            .filter(|&idx| self.is_leaf(idx))
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Vertices without hypernyms.
    pub fn roots(&self) -> Vec<&Entity> {
        self.graph
            .node_indices()
            .filter(|&idx| self.is_root(idx))
            .map(|idx| &self.graph[idx])
            .collect()
    }

    // ------------------------------------------------------------------------
    // Index-level helpers used by the algorithms
    // ------------------------------------------------------------------------

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    pub(crate) fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect()
    }

    pub(crate) fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect()
    }

    /// Distinct neighbors ignoring direction; `a → b` plus `b → a` is one neighbor.
    pub(crate) fn undirected_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_undirected(idx).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    pub(crate) fn is_leaf(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_none()
    }

    pub(crate) fn is_root(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none()
    }

    fn entities_at(&self, indices: Option<Vec<NodeIndex>>) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> = indices
            .unwrap_or_default()
            .into_iter()
            .map(|idx| &self.graph[idx])
            .collect();
        entities.sort();
        entities
    }

    /// Copy of this graph restricted to `vertices`, under a new ID.
    ///
    /// Options and cache location carry over; memoized results do not.
    pub(crate) fn restricted_to(&self, vertices: &BTreeSet<NodeIndex>, id: GraphId) -> EntityGraph {
        let mut restricted = EntityGraph::new(id).with_options(self.options.clone());
        restricted.cache = self.cache.clone();

        for &idx in vertices {
            restricted.insert_vertex(self.graph[idx].clone());
        }
        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                if vertices.contains(&from) && vertices.contains(&to) {
                    restricted.add_edge(&self.graph[from], &self.graph[to]);
                }
            }
        }
        restricted
    }
}
