//! Error types for Lexgraph operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Lexgraph crates. Uses `thiserror` for derive macros.
//!
//! "No result" outcomes (no path between two entities, no root, no common
//! subsumer) are not errors; they are returned as `Option`s or as
//! `f64::INFINITY` by the graph engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in Lexgraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lexical resource failed to answer a query.
    #[error("Resource access failed: {0}")]
    ResourceAccess(String),

    /// The resource or graph backend does not implement an operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A cache artifact could not be read, written, or decoded.
    #[error("Cache I/O failure at {path}: {message}")]
    CacheIo { path: PathBuf, message: String },

    /// An internal invariant of the graph engine was violated.
    #[error("Consistency violation: {0}")]
    Consistency(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an I/O error that remembers the offending path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a resource access error.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceAccess(msg.into())
    }

    /// Create an unsupported-capability error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a cache I/O error.
    pub fn cache_io(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::CacheIo {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a consistency violation.
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether this error is a capability probe answer rather than a failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Whether this error must abort the current operation without fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CacheIo { .. } | Self::Consistency(_))
    }
}

/// Result type alias using Lexgraph's Error type.
pub type Result<T> = std::result::Result<T, Error>;
