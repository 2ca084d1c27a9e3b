//! Handler functions for graph CLI commands.
//!
//! Every handler loads a JSON taxonomy, gets its graph from a
//! [`GraphRegistry`] backed by the configured cache, and prints the result
//! of one engine operation.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use lexgraph_core::traits::ConfigProvider;
use lexgraph_core::{Entity, Error, LexicalResource, Result, TaxonomyResource};
use lexgraph_graph::{
    DegreeDirection, EntityGraph, GraphBackend, GraphBuilder, GraphCache, GraphOptions,
    GraphRegistry, LcsStrategy, PathMode, compute_stats, quick_summary, top_entities_by_degree,
};
use serde::Deserialize;
use serde::de::IntoDeserializer;

use crate::config::LexgraphConfig;

// ============================================================================
// Option types
// ============================================================================

/// Options for graph build operations.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Entity IDs to restrict the graph to; empty for the full resource.
    pub subset: Vec<String>,
    /// Graph ID suffix for a subset graph.
    pub suffix: Option<String>,
    /// If true, build without writing the cache.
    pub dry_run: bool,
}

/// Options for LCS queries.
#[derive(Debug, Clone)]
pub struct LcsOptions {
    pub a: String,
    pub b: String,
    /// Root entity; the taxonomy root when unset.
    pub root: Option<String>,
    /// Strategy name overriding the configured one.
    pub strategy: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// A loaded taxonomy together with the registry serving its graphs.
struct GraphSession {
    resource: TaxonomyResource,
    registry: GraphRegistry,
    cache: Option<GraphCache>,
}

impl GraphSession {
    fn open(config: &LexgraphConfig, taxonomy: Option<&str>) -> Result<Self> {
        Self::open_with(config, taxonomy, |_| ())
    }

    /// Open a session, letting `adjust` override the configured engine
    /// options.
    fn open_with(
        config: &LexgraphConfig,
        taxonomy: Option<&str>,
        adjust: impl FnOnce(&mut GraphOptions),
    ) -> Result<Self> {
        let path = resolve_taxonomy(config, taxonomy)?;
        let resource = TaxonomyResource::from_json_file(&path)?;

        let cache = if config.cache.enabled {
            Some(GraphCache::new(config.cache_path()?))
        } else {
            None
        };

        let mut options = config.graph_options();
        adjust(&mut options);
        let registry = GraphRegistry::new(cache.clone()).with_options(options);

        Ok(Self {
            resource,
            registry,
            cache,
        })
    }

    fn graph(&self) -> Result<Arc<EntityGraph>> {
        self.registry
            .get_or_create(&self.resource, GraphBackend::Adjacency, None, None)
    }

    /// `explicit` if given, otherwise the taxonomy's root.
    fn root(&self, explicit: Option<&str>) -> Result<Option<Entity>> {
        match explicit {
            Some(id) => Ok(Some(Entity::new(id))),
            None => self.resource.root(),
        }
    }
}

/// Resolve the taxonomy file from the flag or the `[resource]` section.
fn resolve_taxonomy(config: &LexgraphConfig, explicit: Option<&str>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => config.taxonomy_path().ok_or_else(|| {
            Error::config("No taxonomy given; pass --taxonomy or set resource.taxonomy")
        })?,
    };
    if !path.exists() {
        return Err(Error::not_found(format!(
            "taxonomy file {} does not exist",
            path.display()
        )));
    }
    Ok(path)
}

/// Parse an LCS strategy name (`first-common`, `minimal-combined-length`).
pub fn parse_lcs_strategy(name: &str) -> Result<LcsStrategy> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        name.into_deserializer();
    LcsStrategy::deserialize(deserializer)
        .map_err(|e| Error::config(format!("Unknown LCS strategy '{name}': {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// Rebuild a graph from the taxonomy, ignoring and replacing cached
/// artifacts.
pub fn handle_build(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    options: BuildOptions,
) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let subset: BTreeSet<Entity> = options.subset.iter().map(Entity::new).collect();

    let mut builder =
        GraphBuilder::new(&session.resource).with_options(session.registry.options().clone());
    if !subset.is_empty() {
        builder = builder.with_subset(&subset);
    }
    if let Some(suffix) = &options.suffix {
        builder = builder.with_suffix(suffix.clone());
    }
    let (graph, stats) = builder.build()?;

    println!("Graph {} built:", graph.id());
    println!("  Entities processed:     {}", stats.entities_processed);
    println!("  Vertices:               {}", stats.vertex_count);
    println!("  Edges:                  {}", stats.edge_count);
    println!("  Self-loops skipped:     {}", stats.self_loops_skipped);
    if !subset.is_empty() {
        println!("  External edges skipped: {}", stats.external_edges_skipped);
    }
    println!("  Cycle edges removed:    {}", stats.cycle_edges_removed);

    match (&session.cache, options.dry_run) {
        (_, true) => println!("\nDry run; cache not written."),
        (None, false) => println!("\nCache disabled; graph not saved."),
        (Some(cache), false) => {
            let removed = cache.invalidate(graph.id())?;
            if removed > 0 {
                log::info!("Dropped {removed} stale artifacts of {}", graph.id());
            }
            cache.save_graph(&graph)?;
            println!("\nGraph saved to: {}", cache.graph_path(graph.id()).display());
        }
    }

    Ok(())
}

/// Show graph parameters.
pub fn handle_stats(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    lcc: bool,
    json: bool,
    top: usize,
) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let mut graph = session.graph()?;
    if lcc {
        graph = graph.largest_connected_component()?;
    }
    log::debug!("Computing parameters of {} ({})", graph.id(), quick_summary(&graph));

    let mut stats = compute_stats(&graph);
    stats.depth = graph.depth(session.resource.root()?.as_ref())?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| Error::serialization(e.to_string()))?;
        println!("{out}");
    } else {
        print!("{}", stats.report());
        print!("{}", format_widest_entities(&graph, top));
    }
    Ok(())
}

/// Render the `limit` entities with the most direct hyponyms.
fn format_widest_entities(graph: &EntityGraph, limit: usize) -> String {
    let top = top_entities_by_degree(graph, limit, DegreeDirection::Out);
    if top.is_empty() {
        return String::new();
    }

    let mut out = format!("\nTop {} by hyponyms:\n", top.len());
    for (id, count) in top {
        out.push_str(&format!("  {id:<24} {count}\n"));
    }
    out
}

/// Shortest path between two entities.
pub fn handle_path(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    from: &str,
    to: &str,
    directed: bool,
) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let graph = session.graph()?;
    let mode = if directed {
        PathMode::Directed
    } else {
        PathMode::Undirected
    };
    let (from, to) = (Entity::new(from), Entity::new(to));

    match graph.shortest_path(&from, &to, mode) {
        Some(path) => {
            println!("Path from '{from}' to '{to}':");
            for (i, entity) in path.iter().enumerate() {
                println!("  {}. {entity}", i + 1);
            }
            println!("\nLength: {}", path.len() - 1);
        }
        None => println!("No path found from '{from}' to '{to}'."),
    }
    Ok(())
}

/// Hyponym count and IIC for each entity.
pub fn handle_iic(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    entities: &[String],
) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let graph = session.graph()?;

    for id in entities {
        let entity = Entity::new(id.as_str());
        match graph.hyponym_count(&entity)? {
            Some(count) => {
                let iic = graph.intrinsic_information_content(&entity)?;
                println!("{id}\thyponyms={count}\tiic={iic:.6}");
            }
            None => println!("{id}\t(not in the largest connected component)"),
        }
    }
    Ok(())
}

/// Lowest common subsumer of two entities.
pub fn handle_lcs(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    options: LcsOptions,
) -> Result<()> {
    let strategy = options
        .strategy
        .as_deref()
        .map(parse_lcs_strategy)
        .transpose()?;
    let session = GraphSession::open_with(config, taxonomy, |graph_options| {
        if let Some(strategy) = strategy {
            graph_options.lcs_strategy = strategy;
        }
    })?;
    let graph = session.graph()?;

    let root = session.root(options.root.as_deref())?.ok_or_else(|| {
        Error::config("The taxonomy defines no root; pass --root")
    })?;
    let (a, b) = (Entity::new(options.a), Entity::new(options.b));

    match graph.lcs(&root, &a, &b)? {
        Some(lcs) => println!("{lcs}"),
        None => println!("No common subsumer of '{a}' and '{b}' below '{root}'."),
    }
    Ok(())
}

/// Depth of the hierarchy.
pub fn handle_depth(
    config: &LexgraphConfig,
    taxonomy: Option<&str>,
    root: Option<&str>,
) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let graph = session.graph()?;
    let root = session.root(root)?;

    match graph.depth(root.as_ref())? {
        Some(depth) => println!("{depth}"),
        None => println!("Depth of {} could not be determined.", graph.id()),
    }
    Ok(())
}

/// Build the graph afresh and report the cycle edges that were removed.
pub fn handle_cycles(config: &LexgraphConfig, taxonomy: Option<&str>) -> Result<()> {
    let session = GraphSession::open(config, taxonomy)?;
    let (graph, stats) = GraphBuilder::new(&session.resource)
        .with_options(session.registry.options().clone())
        .build()?;

    if stats.cycle_edges_removed == 0 {
        println!("Graph {} is acyclic.", graph.id());
    } else {
        println!(
            "Graph {}: removed {} cycle edge(s); {}",
            graph.id(),
            stats.cycle_edges_removed,
            quick_summary(&graph)
        );
    }

    if let Some((source, target)) = graph.cycle_witness() {
        return Err(Error::consistency(format!(
            "cycle through {source} -> {target} survived removal"
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
