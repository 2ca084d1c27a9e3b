//! Utility modules for IDs and paths.
//!
//! # Modules
//!
//! - [`ids`]: Entity ID normalization and cache file stems
//! - [`paths`]: Path resolution helpers (tilde expansion)

pub mod ids;
pub mod paths;
