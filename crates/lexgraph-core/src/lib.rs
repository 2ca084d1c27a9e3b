//! Lexgraph Core: shared types, the resource port, errors, and utilities.
//!
//! This crate provides the foundational types used across all Lexgraph crates.
//! It has no internal Lexgraph dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`entity`]: The immutable vertex key
//! - [`resource`]: The lexical-resource port and an in-memory taxonomy
//! - [`traits`]: Configuration abstraction
//! - [`util`]: ID and path utilities

#![doc = include_str!("../README.md")]

pub mod entity;
pub mod error;
pub mod resource;
pub mod traits;
pub mod util;

// Re-export key types at crate root for convenience
pub use entity::Entity;
pub use error::{Error, Result};
pub use resource::{EntityIter, LexicalResource, TaxonomyFile, TaxonomyResource};
pub use traits::ConfigProvider;

// Convenience re-exports from util
pub use util::ids::{file_stem, normalize_id};
