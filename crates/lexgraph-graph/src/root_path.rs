//! Root paths, hierarchy depth, and lowest common subsumers.
//!
//! A root path lists the vertices from an entity up to the designated root,
//! both included. Paths are found by a bounded backward depth-first search
//! over incoming edges that abandons a branch once it is at least as long as
//! the best path found so far.
//!
//! The index is built leaves first. Every suffix of a discovered path is
//! memoized as the path of its own first vertex, and later searches stop as
//! soon as they reach a memoized vertex.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lexgraph_core::{Entity, Error, Result};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::components::lcc_ratio;
use crate::types::{EntityGraph, GraphId, LcsStrategy};

/// Below this share of all vertices, a depth taken from the LCC is flagged
/// as low confidence.
pub const LOW_CONFIDENCE_LCC_RATIO: f64 = 0.7;

// ============================================================================
// Search
// ============================================================================

/// Bounded backward search toward one root, sharing memoized paths.
struct RootPathSearch<'g> {
    graph: &'g EntityGraph,
    root: NodeIndex,
    max_depth: usize,
    known: HashMap<NodeIndex, Vec<NodeIndex>>,
    unreachable: HashSet<NodeIndex>,
}

impl<'g> RootPathSearch<'g> {
    fn new(graph: &'g EntityGraph, root: NodeIndex, max_depth: usize) -> Self {
        let mut known = HashMap::new();
        known.insert(root, vec![root]);
        Self {
            graph,
            root,
            max_depth,
            known,
            unreachable: HashSet::new(),
        }
    }

    /// Shortest path from `start` to the root within the depth bound.
    fn find(&mut self, start: NodeIndex) -> Option<Vec<NodeIndex>> {
        if let Some(path) = self.known.get(&start) {
            return Some(path.clone());
        }
        if self.unreachable.contains(&start) {
            return None;
        }

        let mut best: Option<Vec<NodeIndex>> = None;
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];

        while let Some((node, depth)) = stack.pop() {
            path.truncate(depth);
            path.push(node);

            if best.as_ref().is_some_and(|b| depth + 1 >= b.len()) {
                continue;
            }
            if node == self.root {
                best = Some(path.clone());
                continue;
            }
            if node != start {
                if let Some(tail) = self.known.get(&node) {
                    if depth + tail.len() - 1 <= self.max_depth {
                        let mut candidate = path[..depth].to_vec();
                        candidate.extend_from_slice(tail);
                        if best.as_ref().is_none_or(|b| candidate.len() < b.len()) {
                            best = Some(candidate);
                        }
                    }
                    continue;
                }
            }
            if depth >= self.max_depth {
                continue;
            }

            for parent in self.graph.predecessors(node).into_iter().rev() {
                if !path.contains(&parent) && !self.unreachable.contains(&parent) {
                    stack.push((parent, depth + 1));
                }
            }
        }

        match &best {
            Some(found) => self.remember(found),
            None => {
                self.unreachable.insert(start);
            }
        }
        best
    }

    /// Memoize every suffix of `path` unless a shorter one is known.
    fn remember(&mut self, path: &[NodeIndex]) {
        for offset in 0..path.len() {
            let suffix = &path[offset..];
            let shorter_known = self
                .known
                .get(&suffix[0])
                .is_some_and(|existing| existing.len() <= suffix.len());
            if !shorter_known {
                self.known.insert(suffix[0], suffix.to_vec());
            }
        }
    }
}

// ============================================================================
// RootPathIndex
// ============================================================================

/// Root path of every vertex that reaches the root within the depth bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootPathIndex {
    graph_id: GraphId,
    root: String,
    paths: HashMap<String, Vec<String>>,
}

impl RootPathIndex {
    /// Index every vertex of `graph` against `root`.
    pub fn build(graph: &EntityGraph, root: &Entity, max_depth: usize) -> Result<Self> {
        let root_idx = graph
            .index_of(root.id())
            .ok_or_else(|| Error::not_found(format!("root {root} is not a vertex of {}", graph.id())))?;

        let mut search = RootPathSearch::new(graph, root_idx, max_depth);
        let (leaves, inner): (Vec<NodeIndex>, Vec<NodeIndex>) = graph
            .graph
            .node_indices()
            .partition(|&idx| graph.is_leaf(idx));

        for idx in leaves.into_iter().chain(inner) {
            search.find(idx);
        }

        let paths: HashMap<String, Vec<String>> = search
            .known
            .into_iter()
            .map(|(idx, path)| {
                let ids = path.iter().map(|&p| graph.graph[p].id().to_string()).collect();
                (graph.graph[idx].id().to_string(), ids)
            })
            .collect();

        log::info!(
            "Indexed root paths of {} of {} vertices of {} (root {root})",
            paths.len(),
            graph.node_count(),
            graph.id()
        );

        Ok(Self {
            graph_id: graph.id().clone(),
            root: root.id().to_string(),
            paths,
        })
    }

    pub fn graph_id(&self) -> &GraphId {
        &self.graph_id
    }

    /// ID of the root every path ends in.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Root path of the entity with this ID.
    pub fn path(&self, id: &str) -> Option<&[String]> {
        self.paths
            .get(id)
            .map(Vec::as_slice)
            .filter(|path| !path.is_empty())
    }

    /// Longest root path, in edges.
    pub fn depth(&self) -> Option<usize> {
        self.paths.values().map(Vec::len).max().map(|len| len - 1)
    }

    /// Lowest common subsumer of two entity IDs.
    ///
    /// With [`LcsStrategy::FirstCommon`] the result is the first vertex of
    /// `a`'s root path that also lies on `b`'s, which is not necessarily the
    /// one closest to both.
    pub fn lcs(&self, a: &str, b: &str, strategy: LcsStrategy) -> Option<String> {
        if a == b {
            return Some(a.to_string());
        }
        let path_a = self.path(a)?;
        let path_b = self.path(b)?;

        if path_b.iter().any(|id| id == a) {
            return Some(a.to_string());
        }
        if path_a.iter().any(|id| id == b) {
            return Some(b.to_string());
        }

        match strategy {
            LcsStrategy::FirstCommon => {
                let on_b: HashSet<&str> = path_b.iter().map(String::as_str).collect();
                path_a.iter().find(|id| on_b.contains(id.as_str())).cloned()
            }
            LcsStrategy::MinimalCombinedLength => {
                let offsets_b: HashMap<&str, usize> = path_b
                    .iter()
                    .enumerate()
                    .map(|(offset, id)| (id.as_str(), offset))
                    .collect();
                path_a
                    .iter()
                    .enumerate()
                    .filter_map(|(offset_a, id)| {
                        offsets_b
                            .get(id.as_str())
                            .map(|offset_b| (offset_a + offset_b, offset_a, id))
                    })
                    .min_by_key(|&(combined, offset_a, _)| (combined, offset_a))
                    .map(|(_, _, id)| id.clone())
            }
        }
    }
}

// ============================================================================
// EntityGraph integration
// ============================================================================

impl EntityGraph {
    /// Shortest path from `entity` up to `root`, both included.
    ///
    /// `Ok(None)` when `entity` does not reach `root` within the configured
    /// depth bound or is not in the graph.
    pub fn path_to_root(&self, root: &Entity, entity: &Entity) -> Result<Option<Vec<Entity>>> {
        let root_idx = self
            .index_of(root.id())
            .ok_or_else(|| Error::not_found(format!("root {root} is not a vertex of {}", self.id)))?;
        let Some(start) = self.index_of(entity.id()) else {
            return Ok(None);
        };

        let mut search = RootPathSearch::new(self, root_idx, self.options.max_root_path_depth);
        Ok(search
            .find(start)
            .map(|path| path.into_iter().map(|idx| self.graph[idx].clone()).collect()))
    }

    /// The root-path index for `root`, from memory, the cache, or built.
    ///
    /// A cached index built for a different root is ignored and replaced.
    pub fn root_path_index(&self, root: &Entity) -> Result<Arc<RootPathIndex>> {
        let mut memo = self.root_paths.lock();
        if let Some(index) = memo.get(root.id()) {
            return Ok(Arc::clone(index));
        }

        let cached = match &self.cache {
            Some(cache) => cache
                .load_root_paths(&self.id)?
                .filter(|index| index.root() == root.id()),
            None => None,
        };

        let index = match cached {
            Some(index) => {
                log::info!("Loaded {} root paths of {} from cache", index.len(), self.id);
                index
            }
            None => {
                let index = RootPathIndex::build(self, root, self.options.max_root_path_depth)?;
                if let Some(cache) = &self.cache {
                    cache.save_root_paths(&index)?;
                }
                index
            }
        };

        let index = Arc::new(index);
        memo.insert(root.id().to_string(), Arc::clone(&index));
        Ok(index)
    }

    /// Lowest common subsumer of `a` and `b` below `root`.
    pub fn lcs(&self, root: &Entity, a: &Entity, b: &Entity) -> Result<Option<Entity>> {
        if a.id() == b.id() {
            return Ok(Some(a.clone()));
        }
        let index = self.root_path_index(root)?;
        Ok(index
            .lcs(a.id(), b.id(), self.options.lcs_strategy)
            .and_then(|id| self.entity(&id).cloned()))
    }

    /// Depth of the hierarchy in edges.
    ///
    /// Uses the single vertex without hypernyms when there is exactly one;
    /// otherwise `resource_root` if it is in the graph; otherwise the depth of
    /// the largest connected component. `Ok(None)` when none of these yields
    /// a root.
    pub fn depth(self: &Arc<Self>, resource_root: Option<&Entity>) -> Result<Option<usize>> {
        let roots = self.roots();
        if let [root] = roots.as_slice() {
            return Ok(self.root_path_index(root)?.depth());
        }

        if let Some(root) = resource_root.filter(|root| self.contains_entity(root)) {
            return Ok(self.root_path_index(root)?.depth());
        }

        let lcc = self.largest_connected_component()?;
        if Arc::ptr_eq(&lcc, self) {
            log::warn!(
                "Cannot determine depth of {}: {} vertices without hypernyms and no usable resource root",
                self.id,
                roots.len()
            );
            return Ok(None);
        }

        let ratio = lcc_ratio(lcc.node_count(), self.node_count());
        if ratio < LOW_CONFIDENCE_LCC_RATIO {
            log::warn!(
                "Depth of {} is taken from its largest connected component, which covers only {:.1}% of the vertices",
                self.id,
                ratio * 100.0
            );
        }
        lcc.depth(resource_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::GraphCache;
    use crate::types::GraphOptions;
    use tempfile::tempdir;

    fn e(id: &str) -> Entity {
        Entity::new(id)
    }

    fn ids(path: &[Entity]) -> Vec<&str> {
        path.iter().map(|e| e.id()).collect()
    }

    fn graph_with_edges(edges: &[(&str, &str)]) -> EntityGraph {
        let mut graph = EntityGraph::new(GraphId::new("roots", "1"));
        for (from, to) in edges {
            graph.add_edge(&e(from), &e(to));
        }
        graph
    }

    /// entity -> {object, abstraction}; object -> {animal, artifact};
    /// animal -> {dog, cat}; artifact -> tool; tool -> hammer;
    /// abstraction -> idea; dog also under pet; pet under animal.
    fn taxonomy() -> EntityGraph {
        graph_with_edges(&[
            ("entity", "object"),
            ("entity", "abstraction"),
            ("object", "animal"),
            ("object", "artifact"),
            ("animal", "dog"),
            ("animal", "cat"),
            ("animal", "pet"),
            ("pet", "dog"),
            ("artifact", "tool"),
            ("tool", "hammer"),
            ("abstraction", "idea"),
        ])
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    #[test]
    fn test_path_to_root_picks_shortest() {
        let graph = taxonomy();
        let path = graph.path_to_root(&e("entity"), &e("dog")).unwrap().unwrap();
        assert_eq!(ids(&path), ["dog", "animal", "object", "entity"]);
    }

    #[test]
    fn test_path_to_root_of_root() {
        let graph = taxonomy();
        let path = graph.path_to_root(&e("entity"), &e("entity")).unwrap().unwrap();
        assert_eq!(ids(&path), ["entity"]);
    }

    #[test]
    fn test_path_to_root_missing_root_is_error() {
        let graph = taxonomy();
        let result = graph.path_to_root(&e("nowhere"), &e("dog"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_path_to_root_without_route() {
        let mut graph = taxonomy();
        graph.add_edge(&e("island"), &e("castaway"));
        assert!(graph.path_to_root(&e("entity"), &e("castaway")).unwrap().is_none());
        assert!(graph.path_to_root(&e("entity"), &e("ghost")).unwrap().is_none());
    }

    #[test]
    fn test_depth_bound() {
        let graph = graph_with_edges(&[("r", "a"), ("a", "b"), ("b", "c"), ("c", "d")])
            .with_options(GraphOptions {
                max_root_path_depth: 2,
                ..Default::default()
            });

        assert!(graph.path_to_root(&e("r"), &e("b")).unwrap().is_some());
        assert!(graph.path_to_root(&e("r"), &e("d")).unwrap().is_none());
    }

    // ------------------------------------------------------------------------
    // Index
    // ------------------------------------------------------------------------

    #[test]
    fn test_index_paths_and_depth() {
        let graph = taxonomy();
        let index = RootPathIndex::build(&graph, &e("entity"), 18).unwrap();

        assert_eq!(index.len(), graph.node_count());
        assert_eq!(index.root(), "entity");
        assert_eq!(
            index.path("hammer").unwrap(),
            ["hammer", "tool", "artifact", "object", "entity"]
        );
        assert_eq!(index.path("dog").unwrap().len(), 4);
        assert_eq!(index.depth(), Some(4));
    }

    #[test]
    fn test_index_suffixes_are_shortest() {
        let graph = taxonomy();
        let index = RootPathIndex::build(&graph, &e("entity"), 18).unwrap();

        for (id, path) in &index.paths {
            assert_eq!(&path[0], id);
            assert_eq!(path.last().map(String::as_str), Some("entity"));
            for offset in 1..path.len() {
                assert_eq!(index.path(&path[offset]).unwrap(), &path[offset..]);
            }
        }
    }

    // ------------------------------------------------------------------------
    // LCS
    // ------------------------------------------------------------------------

    #[test]
    fn test_lcs_same_entity() {
        let graph = taxonomy();
        assert_eq!(graph.lcs(&e("entity"), &e("dog"), &e("dog")).unwrap(), Some(e("dog")));
    }

    #[test]
    fn test_lcs_ancestor_shortcut() {
        let graph = taxonomy();
        let root = e("entity");
        assert_eq!(graph.lcs(&root, &e("animal"), &e("dog")).unwrap(), Some(e("animal")));
        assert_eq!(graph.lcs(&root, &e("dog"), &e("animal")).unwrap(), Some(e("animal")));
        assert_eq!(graph.lcs(&root, &e("entity"), &e("idea")).unwrap(), Some(e("entity")));
    }

    #[test]
    fn test_lcs_siblings_and_cousins() {
        let graph = taxonomy();
        let root = e("entity");
        assert_eq!(graph.lcs(&root, &e("dog"), &e("cat")).unwrap(), Some(e("animal")));
        assert_eq!(graph.lcs(&root, &e("cat"), &e("hammer")).unwrap(), Some(e("object")));
        assert_eq!(graph.lcs(&root, &e("cat"), &e("idea")).unwrap(), Some(e("entity")));
    }

    #[test]
    fn test_lcs_unknown_entity() {
        let graph = taxonomy();
        assert_eq!(graph.lcs(&e("entity"), &e("dog"), &e("ghost")).unwrap(), None);
    }

    fn path(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_lcs_strategies_can_disagree() {
        let index = RootPathIndex {
            graph_id: GraphId::new("t", "1"),
            root: "r".to_string(),
            paths: HashMap::from([
                ("a".to_string(), path(&["a", "x", "y", "r"])),
                ("b".to_string(), path(&["b", "y", "q", "x", "r"])),
            ]),
        };

        // x comes first on a's path; y is 3 steps away in total, x is 4.
        assert_eq!(index.lcs("a", "b", LcsStrategy::FirstCommon), Some("x".to_string()));
        assert_eq!(
            index.lcs("a", "b", LcsStrategy::MinimalCombinedLength),
            Some("y".to_string())
        );
    }

    #[test]
    fn test_lcs_minimal_combined_length_tie() {
        let index = RootPathIndex {
            graph_id: GraphId::new("t", "1"),
            root: "r".to_string(),
            paths: HashMap::from([
                ("a".to_string(), path(&["a", "x", "y", "r"])),
                ("b".to_string(), path(&["b", "q", "w", "y", "x", "r"])),
            ]),
        };

        // x and y both sum to 5; the one nearer a wins.
        assert_eq!(
            index.lcs("a", "b", LcsStrategy::MinimalCombinedLength),
            Some("x".to_string())
        );
    }

    // ------------------------------------------------------------------------
    // Memo and cache
    // ------------------------------------------------------------------------

    #[test]
    fn test_index_is_memoized_per_root() {
        let graph = taxonomy();
        let first = graph.root_path_index(&e("entity")).unwrap();
        let second = graph.root_path_index(&e("entity")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = graph.root_path_index(&e("object")).unwrap();
        assert_eq!(other.root(), "object");
        assert!(other.path("idea").is_none());
    }

    #[test]
    fn test_index_cache_for_other_root_is_rebuilt() {
        let dir = tempdir().unwrap();
        let cache = GraphCache::new(dir.path());

        let graph = taxonomy().with_cache(cache.clone());
        graph.root_path_index(&e("object")).unwrap();
        assert!(cache.root_path_path(graph.id()).exists());

        let fresh = taxonomy().with_cache(cache.clone());
        let index = fresh.root_path_index(&e("entity")).unwrap();
        assert_eq!(index.root(), "entity");
        assert_eq!(cache.load_root_paths(graph.id()).unwrap().unwrap().root(), "entity");
    }

    // ------------------------------------------------------------------------
    // Depth fallback
    // ------------------------------------------------------------------------

    #[test]
    fn test_depth_with_single_root() {
        let graph = Arc::new(taxonomy());
        assert_eq!(graph.depth(None).unwrap(), Some(4));
    }

    #[test]
    fn test_depth_uses_resource_root() {
        let mut graph = taxonomy();
        graph.add_edge(&e("other_top"), &e("idea"));
        let graph = Arc::new(graph);

        assert_eq!(graph.depth(Some(&e("entity"))).unwrap(), Some(4));
    }

    #[test]
    fn test_depth_falls_back_to_lcc() {
        let mut graph = taxonomy();
        graph.add_edge(&e("island"), &e("castaway"));
        let graph = Arc::new(graph);

        assert_eq!(graph.depth(Some(&e("missing"))).unwrap(), Some(4));
        assert_eq!(graph.depth(None).unwrap(), Some(4));
    }

    #[test]
    fn test_depth_without_any_root() {
        let mut graph = taxonomy();
        graph.add_edge(&e("other_top"), &e("idea"));
        let graph = Arc::new(graph);

        assert_eq!(graph.depth(None).unwrap(), None);
    }
}
