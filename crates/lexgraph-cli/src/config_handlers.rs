//! Handler functions for config CLI commands.
//!
//! Implements `lexgraph config {path,get,init,export}` and the TOML
//! dotted-key lookup they share.

use crate::cli::ConfigAction;
use crate::config::LexgraphConfig;
use lexgraph_core::{Error, Result};
use std::path::PathBuf;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because some
/// commands (path, init) work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Export { docker_env } => {
            let config = LexgraphConfig::load(config_path)?;
            cmd_config_export(&config, docker_env)
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    match LexgraphConfig::resolve_config_path(config_path) {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `lexgraph config init` to create it)");
            }
            Ok(())
        }
        None => Err(Error::config(
            "Could not determine config directory for this platform",
        )),
    }
}

fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<()> {
    let config = LexgraphConfig::load(config_path)?;
    println!("{}", lookup_config_value(&config, key)?);
    Ok(())
}

fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => LexgraphConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = LexgraphConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Config file created at {}", path.display());
    Ok(())
}

fn cmd_config_export(config: &LexgraphConfig, docker_env: bool) -> Result<()> {
    for (key, value) in config.to_env_vars()? {
        if docker_env {
            println!("--env {key}={value}");
        } else {
            println!("{key}={value}");
        }
    }
    Ok(())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Render the value at a dotted key of the resolved configuration.
fn lookup_config_value(config: &LexgraphConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Navigate a dotted key path in a TOML value tree.
fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Format a TOML value for display on stdout.
fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_default_config(dir: &std::path::Path) -> String {
        let path = dir.join("config.toml");
        std::fs::write(&path, LexgraphConfig::default().to_toml_string().unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    // ------------------------------------------------------------------------
    // cmd_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        assert!(cmd_config_path(Some("/explicit/config.toml")).is_ok());
    }

    // ------------------------------------------------------------------------
    // cmd_config_get tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_get_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(dir.path());

        assert!(cmd_config_get(Some(&path), "project_name").is_ok());
        assert!(cmd_config_get(Some(&path), "graph.max_root_path_depth").is_ok());
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(dir.path());

        let err = cmd_config_get(Some(&path), "graph.nonexistent").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_lookup_config_value() {
        let config = LexgraphConfig::default();
        assert_eq!(lookup_config_value(&config, "cache.enabled").unwrap(), "true");
        assert_eq!(
            lookup_config_value(&config, "graph.lcs_strategy").unwrap(),
            "first-common"
        );
        assert!(lookup_config_value(&config, "graph").unwrap().contains("case_sensitive"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_init tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lexgraph").join("config.toml");

        cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
        assert!(content.contains("[cache]"));
        assert!(content.contains("[graph]"));
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_cmd_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        cmd_config_init(Some(path.to_str().unwrap()), true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_export tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_export() {
        let config = LexgraphConfig::default();
        assert!(cmd_config_export(&config, false).is_ok());
        assert!(cmd_config_export(&config, true).is_ok());
    }

    // ------------------------------------------------------------------------
    // get_nested_value / format_toml_value tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("[graph]\nmax_root_path_depth = 18").unwrap();
        assert_eq!(
            get_nested_value(&val, "graph.max_root_path_depth"),
            Some(&toml::Value::Integer(18))
        );
        assert!(get_nested_value(&val, "graph.missing").is_none());
        assert!(get_nested_value(&val, "graph.max_root_path_depth.deeper").is_none());
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::String("x".into())), "x");
        assert_eq!(format_toml_value(&toml::Value::Integer(42)), "42");
        assert_eq!(format_toml_value(&toml::Value::Boolean(false)), "false");
    }
}
