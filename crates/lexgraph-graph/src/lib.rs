//! Taxonomy graph engine for Lexgraph.
//!
//! This crate turns a [`LexicalResource`](lexgraph_core::LexicalResource)
//! into a petgraph-backed [`EntityGraph`] and computes metrics over it.
//!
//! # Key Abstractions
//!
//! - [`GraphBuilder`]: builds or loads a graph for one resource
//! - [`EntityGraph`]: the Graph Store, with all analyses as methods
//! - [`GraphCache`]: on-disk JSON artifacts keyed by [`GraphId`]
//! - [`GraphRegistry`]: at-most-one-build registry of shared graphs

#![doc = include_str!("../README.md")]

pub mod builder;
pub mod components;
pub mod cycles;
pub mod hyponym;
pub mod metrics;
pub mod path;
pub mod persistence;
pub mod registry;
pub mod root_path;
pub mod stats;
pub mod types;

pub use builder::{BuildStats, GraphBuilder};
pub use components::LCC_SUFFIX;
pub use hyponym::HyponymCounts;
pub use metrics::GraphParameters;
pub use path::PathMode;
pub use persistence::{GraphCache, GraphMetadata, SerializableGraph, load_graph, save_graph};
pub use registry::{GraphBackend, GraphRegistry};
pub use root_path::{LOW_CONFIDENCE_LCC_RATIO, RootPathIndex};
pub use stats::{DegreeDirection, GraphStats, compute_stats, quick_summary, top_entities_by_degree};
pub use types::{DEFAULT_MAX_ROOT_PATH_DEPTH, EntityGraph, GraphId, GraphOptions, LcsStrategy};
