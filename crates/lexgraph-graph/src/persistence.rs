//! Graph persistence and caching.
//!
//! Every [`GraphId`] owns up to three JSON artifacts in the cache directory:
//!
//! - `<id>.graph.json`: the serialized Graph Store
//! - `<id>.hyponyms-<cs|ci>.json`: hyponym counts, per case-sensitivity mode
//! - `<id>.rootpaths.json`: the root-path map
//!
//! Invalidating an ID also drops the artifacts of its `_lcc` derivative.
//!
//! Presence of a file is treated as validity; there is no checksum. A
//! resource revision that keeps its name and version must be invalidated
//! explicitly with [`GraphCache::invalidate`]. An artifact that exists but
//! cannot be read or decoded is a fatal [`Error::CacheIo`]; it never
//! triggers a silent rebuild.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lexgraph_core::{Entity, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::components::LCC_SUFFIX;
use crate::hyponym::HyponymCounts;
use crate::root_path::RootPathIndex;
use crate::types::{EntityGraph, GraphId};

// ============================================================================
// Serializable types
// ============================================================================

/// Serializable representation of a Graph Store.
///
/// The petgraph store is rebuilt on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializableGraph {
    /// All vertices.
    pub entities: Vec<Entity>,
    /// All edges as `(hypernym_id, hyponym_id)`.
    pub edges: Vec<(String, String)>,
    /// Optional metadata about the graph.
    pub metadata: Option<GraphMetadata>,
}

/// Metadata about a persisted graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was built (unix timestamp).
    pub built_at: String,
    /// Version of the builder.
    pub builder_version: String,
    /// Name of the source resource.
    pub resource_name: Option<String>,
    /// Version of the source resource.
    pub resource_version: Option<String>,
    /// Vertex count at save time.
    pub vertex_count: Option<usize>,
    /// Edge count at save time.
    pub edge_count: Option<usize>,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            built_at: timestamp_now(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
            resource_name: None,
            resource_version: None,
            vertex_count: None,
            edge_count: None,
        }
    }
}

impl GraphMetadata {
    /// Metadata describing `graph` as it is now.
    pub fn for_graph(graph: &EntityGraph) -> Self {
        Self {
            resource_name: Some(graph.id().name().to_string()),
            resource_version: Some(graph.id().version().to_string()),
            vertex_count: Some(graph.node_count()),
            edge_count: Some(graph.edge_count()),
            ..Default::default()
        }
    }
}

/// Simple unix timestamp.
fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save a graph to a JSON file.
pub fn save_graph(
    graph: &EntityGraph,
    path: impl AsRef<Path>,
    metadata: Option<GraphMetadata>,
) -> Result<()> {
    let serializable = SerializableGraph {
        entities: graph.entities().cloned().collect(),
        edges: graph
            .edges()
            .map(|(from, to)| (from.id().to_string(), to.id().to_string()))
            .collect(),
        metadata,
    };
    write_json(path.as_ref(), &serializable)
}

/// Load a graph from a JSON file under the given ID.
pub fn load_graph(path: impl AsRef<Path>, id: GraphId) -> Result<EntityGraph> {
    let serializable: SerializableGraph = read_json(path.as_ref())?;
    Ok(to_entity_graph(serializable, id))
}

/// Convert serializable format to an EntityGraph.
fn to_entity_graph(serializable: SerializableGraph, id: GraphId) -> EntityGraph {
    let mut graph = EntityGraph::new(id);

    for entity in serializable.entities {
        graph.add_entity(entity);
    }

    // Skip edges referencing missing vertices
    for (from, to) in &serializable.edges {
        if let (Some(source), Some(target)) = (graph.entity(from).cloned(), graph.entity(to).cloned())
        {
            graph.add_edge(&source, &target);
        }
    }

    graph
}

/// Serialize `value` to `path` through a temporary sibling file.
///
/// The rename keeps a half-written artifact from ever being mistaken for a
/// valid cache entry.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::cache_io(parent, e.to_string()))?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    let result = (|| -> Result<()> {
        let file = File::create(&tmp).map_err(|e| Error::cache_io(&tmp, e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)
            .map_err(|e| Error::cache_io(&tmp, format!("Failed to serialize: {e}")))?;
        writer
            .flush()
            .map_err(|e| Error::cache_io(&tmp, e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| Error::cache_io(path, e.to_string()))
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::cache_io(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::cache_io(path, format!("Failed to decode: {e}")))
}

// ============================================================================
// GraphCache
// ============================================================================

/// Directory of cache artifacts keyed by [`GraphId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphCache {
    dir: PathBuf,
}

impl GraphCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn graph_path(&self, id: &GraphId) -> PathBuf {
        self.dir.join(format!("{}.graph.json", id.file_stem()))
    }

    pub fn hyponym_path(&self, id: &GraphId, case_sensitive: bool) -> PathBuf {
        let tag = if case_sensitive { "cs" } else { "ci" };
        self.dir
            .join(format!("{}.hyponyms-{tag}.json", id.file_stem()))
    }

    pub fn root_path_path(&self, id: &GraphId) -> PathBuf {
        self.dir.join(format!("{}.rootpaths.json", id.file_stem()))
    }

    pub fn has_graph(&self, id: &GraphId) -> bool {
        self.graph_path(id).exists()
    }

    /// Persist a graph under its own ID.
    pub fn save_graph(&self, graph: &EntityGraph) -> Result<()> {
        let path = self.graph_path(graph.id());
        save_graph(graph, &path, Some(GraphMetadata::for_graph(graph)))?;
        log::info!(
            "Cached graph {} ({} vertices, {} edges) at {}",
            graph.id(),
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );
        Ok(())
    }

    /// Load a cached graph; `Ok(None)` when no artifact exists.
    pub fn load_graph(&self, id: &GraphId) -> Result<Option<EntityGraph>> {
        let path = self.graph_path(id);
        if !path.exists() {
            log::debug!("No cached graph for {id}");
            return Ok(None);
        }
        let graph = load_graph(&path, id.clone())?;
        log::info!(
            "Loaded graph {id} ({} vertices, {} edges) from cache",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Some(graph))
    }

    pub fn save_hyponym_counts(&self, counts: &HyponymCounts) -> Result<()> {
        let path = self.hyponym_path(counts.graph_id(), counts.case_sensitive());
        write_json(&path, counts)?;
        log::debug!("Cached {} hyponym counts at {}", counts.len(), path.display());
        Ok(())
    }

    pub fn load_hyponym_counts(
        &self,
        id: &GraphId,
        case_sensitive: bool,
    ) -> Result<Option<HyponymCounts>> {
        let path = self.hyponym_path(id, case_sensitive);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    pub fn save_root_paths(&self, index: &RootPathIndex) -> Result<()> {
        let path = self.root_path_path(index.graph_id());
        write_json(&path, index)?;
        log::debug!("Cached {} root paths at {}", index.len(), path.display());
        Ok(())
    }

    pub fn load_root_paths(&self, id: &GraphId) -> Result<Option<RootPathIndex>> {
        let path = self.root_path_path(id);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    /// Remove every artifact belonging to `id` and to its extracted largest
    /// connected component. Returns how many were removed.
    pub fn invalidate(&self, id: &GraphId) -> Result<usize> {
        let lcc = id.with_suffix(LCC_SUFFIX);
        let candidates: Vec<PathBuf> = [id, &lcc]
            .into_iter()
            .flat_map(|id| {
                [
                    self.graph_path(id),
                    self.hyponym_path(id, true),
                    self.hyponym_path(id, false),
                    self.root_path_path(id),
                ]
            })
            .collect();

        let mut removed = 0;
        for path in candidates.iter().filter(|p| p.exists()) {
            std::fs::remove_file(path).map_err(|e| Error::io_with_path(e, path))?;
            removed += 1;
        }
        log::info!("Invalidated {removed} cache artifact(s) for {id}");
        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn e(id: &str) -> Entity {
        Entity::new(id)
    }

    fn create_test_graph() -> EntityGraph {
        let mut graph = EntityGraph::new(GraphId::new("test", "1"));
        graph.add_edge(&e("a"), &e("b"));
        graph.add_edge(&e("a"), &e("c"));
        graph.add_edge(&e("b"), &e("d"));
        graph.add_entity(e("lonely").with_lexemes(["lonely", "alone"]));
        graph
    }

    fn edge_set(graph: &EntityGraph) -> Vec<(String, String)> {
        let mut edges: Vec<_> = graph
            .edges()
            .map(|(a, b)| (a.id().to_string(), b.id().to_string()))
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn test_save_and_load_graph() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let graph = create_test_graph();

        save_graph(&graph, &path, None).unwrap();
        let loaded = load_graph(&path, graph.id().clone()).unwrap();

        assert_eq!(loaded.node_count(), 5);
        assert_eq!(edge_set(&loaded), edge_set(&graph));
        assert_eq!(
            loaded.entity("lonely").unwrap().lexemes(),
            ["lonely".to_string(), "alone".to_string()]
        );
    }

    #[test]
    fn test_load_graph_skips_dangling_edges() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dangling.json");
        let json = r#"{
            "entities": [{"id": "a"}, {"id": "b"}],
            "edges": [["a", "b"], ["a", "missing"]],
            "metadata": null
        }"#;

        std::fs::write(&path, json).unwrap();

        let graph = load_graph(&path, GraphId::new("t", "1")).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_load_graph_invalid_json_is_cache_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_graph(&path, GraphId::new("t", "1"));
        assert!(matches!(result, Err(Error::CacheIo { .. })));
    }

    #[test]
    fn test_cache_paths_are_deterministic() {
        let cache = GraphCache::new("/cache");
        let id = GraphId::new("WordNet", "3.0");

        assert_eq!(cache.graph_path(&id), PathBuf::from("/cache/WordNet_3.0.graph.json"));
        assert_eq!(
            cache.hyponym_path(&id, true),
            PathBuf::from("/cache/WordNet_3.0.hyponyms-cs.json")
        );
        assert_eq!(
            cache.hyponym_path(&id, false),
            PathBuf::from("/cache/WordNet_3.0.hyponyms-ci.json")
        );
        assert_eq!(
            cache.root_path_path(&id.with_suffix("lcc")),
            PathBuf::from("/cache/WordNet_3.0_lcc.rootpaths.json")
        );
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempdir().unwrap();
        let cache = GraphCache::new(dir.path().join("nested"));
        let graph = create_test_graph();

        assert!(cache.load_graph(graph.id()).unwrap().is_none());
        cache.save_graph(&graph).unwrap();
        assert!(cache.has_graph(graph.id()));

        let loaded = cache.load_graph(graph.id()).unwrap().unwrap();
        assert_eq!(loaded.id(), graph.id());
        assert_eq!(edge_set(&loaded), edge_set(&graph));
    }

    #[test]
    fn test_cache_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let cache = GraphCache::new(dir.path());
        cache.save_graph(&create_test_graph()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["test_1.graph.json"]);
    }

    #[test]
    fn test_cache_invalidate() {
        let dir = tempdir().unwrap();
        let cache = GraphCache::new(dir.path());
        let graph = create_test_graph();
        cache.save_graph(&graph).unwrap();

        assert_eq!(cache.invalidate(graph.id()).unwrap(), 1);
        assert!(!cache.has_graph(graph.id()));
        assert_eq!(cache.invalidate(graph.id()).unwrap(), 0);
    }

    #[test]
    fn test_cache_invalidate_drops_lcc_artifacts() {
        let dir = tempdir().unwrap();
        let cache = GraphCache::new(dir.path());
        let graph = create_test_graph();
        let mut lcc = EntityGraph::new(graph.id().with_suffix(LCC_SUFFIX));
        lcc.add_edge(&e("a"), &e("b"));
        cache.save_graph(&graph).unwrap();
        cache.save_graph(&lcc).unwrap();

        assert_eq!(cache.invalidate(graph.id()).unwrap(), 2);
        assert!(!cache.has_graph(lcc.id()));
    }

    #[test]
    fn test_metadata_default() {
        let meta = GraphMetadata::default();
        assert!(!meta.built_at.is_empty());
        assert!(!meta.builder_version.is_empty());
        assert!(meta.resource_name.is_none());
    }

    #[test]
    fn test_metadata_for_graph() {
        let meta = GraphMetadata::for_graph(&create_test_graph());
        assert_eq!(meta.resource_name.as_deref(), Some("test"));
        assert_eq!(meta.vertex_count, Some(5));
        assert_eq!(meta.edge_count, Some(3));
    }
}
