//! Configuration for the Lexgraph CLI.
//!
//! Provides the [`LexgraphConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `LEXGRAPH_CONFIG` environment variable
//! 3. XDG default: `~/.config/lexgraph/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use lexgraph_core::traits::ConfigProvider;
use lexgraph_core::util::paths::expand_tilde;
use lexgraph_core::{Error, Result};
use lexgraph_graph::{DEFAULT_MAX_ROOT_PATH_DEPTH, GraphOptions, LcsStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Lexgraph CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexgraphConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base path for all project data.
    pub base_path: Option<String>,

    /// Artifact cache configuration.
    pub cache: CacheConfig,

    /// Graph engine tunables.
    pub graph: GraphConfig,

    /// Lexical resource configuration.
    pub resource: ResourceConfig,
}

/// Artifact cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (defaults to `<base_path>/cache`).
    pub dir: Option<String>,

    /// Whether graphs and derived artifacts are persisted.
    pub enabled: bool,
}

/// Graph engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Whether hyponym-count keys keep their case.
    pub case_sensitive: bool,

    /// How the LCS resolver picks among shared root-path nodes.
    pub lcs_strategy: LcsStrategy,

    /// Bound on the backward root-path search, in edges.
    pub max_root_path_depth: usize,
}

/// Lexical resource configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Path to a JSON taxonomy file.
    pub taxonomy: Option<String>,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for LexgraphConfig {
    fn default() -> Self {
        Self {
            project_name: "lexgraph".to_string(),
            base_path: None,
            cache: CacheConfig::default(),
            graph: GraphConfig::default(),
            resource: ResourceConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            enabled: true,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            lcs_strategy: LcsStrategy::default(),
            max_root_path_depth: DEFAULT_MAX_ROOT_PATH_DEPTH,
        }
    }
}

impl From<&GraphConfig> for GraphOptions {
    fn from(config: &GraphConfig) -> Self {
        GraphOptions {
            case_sensitive: config.case_sensitive,
            lcs_strategy: config.lcs_strategy,
            max_root_path_depth: config.max_root_path_depth,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl LexgraphConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `LEXGRAPH_CONFIG` env var
    /// 3. XDG default: `~/.config/lexgraph/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading configuration from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("LEXGRAPH");
        env_opts.add_section("cache");
        env_opts.add_section("graph");
        env_opts.add_section("resource");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("LEXGRAPH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lexgraph").join("config.toml"))
    }

    /// Engine options derived from the `[graph]` section.
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions::from(&self.graph)
    }

    /// Configured taxonomy file, if any.
    pub fn taxonomy_path(&self) -> Option<PathBuf> {
        self.resource.taxonomy.as_deref().map(expand_tilde)
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `LEXGRAPH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "LEXGRAPH", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for LexgraphConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(expand_tilde(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => Ok(self.base_path()?.join("cache")),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
