//! CLI argument parsing and command definitions.
//!
//! `lexgraph` exposes the graph engine over a JSON taxonomy file
//! (`graph ...`), the configuration helpers (`config ...`), and `version`.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "lexgraph", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "LEXGRAPH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Print version information.
    Version,

    /// Graph operations.
    Graph(GraphCommand),

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "graph.lcs_strategy").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

/// Graph-specific subcommands.
#[derive(Parser, Debug)]
pub struct GraphCommand {
    /// JSON taxonomy file (defaults to `resource.taxonomy` from the config).
    #[arg(short, long, global = true)]
    pub taxonomy: Option<String>,

    /// Graph subcommand to execute.
    #[command(subcommand)]
    pub command: GraphSubcommand,
}

/// Available graph subcommands.
#[derive(Subcommand, Debug)]
pub enum GraphSubcommand {
    /// Rebuild the graph from the taxonomy and refresh the cache.
    Build {
        /// Restrict the graph to these entity IDs (comma-separated).
        #[arg(long, value_delimiter = ',')]
        subset: Vec<String>,

        /// Graph ID suffix for a subset graph.
        #[arg(long)]
        suffix: Option<String>,

        /// Show what would be built without writing the cache.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show graph parameters.
    Stats {
        /// Report on the largest connected component instead.
        #[arg(long)]
        lcc: bool,

        /// Print the parameters as JSON.
        #[arg(long)]
        json: bool,

        /// List this many entities with the most direct hyponyms.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Shortest path between two entities.
    Path {
        /// Source entity ID.
        from: String,

        /// Target entity ID.
        to: String,

        /// Follow edges from hypernym to hyponym only.
        #[arg(long)]
        directed: bool,
    },

    /// Hyponym count and intrinsic information content.
    Iic {
        /// Entity IDs.
        #[arg(required = true)]
        entities: Vec<String>,
    },

    /// Lowest common subsumer of two entities.
    Lcs {
        /// First entity ID.
        a: String,

        /// Second entity ID.
        b: String,

        /// Root entity (defaults to the taxonomy root).
        #[arg(short, long)]
        root: Option<String>,

        /// first-common or minimal-combined-length.
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Depth of the hierarchy.
    Depth {
        /// Root entity (defaults to the taxonomy root).
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Report cycle edges removed while building.
    Cycles,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["lexgraph"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["lexgraph", "--verbose", "--config", "/etc/lexgraph.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/etc/lexgraph.toml"));
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["lexgraph", "version"]);
        assert!(matches!(args.command, Some(BaseCommand::Version)));
    }

    // ------------------------------------------------------------------------
    // Graph command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_graph_build_subset() {
        let args = CliArgs::parse_from([
            "lexgraph",
            "graph",
            "build",
            "--subset",
            "a,b,c",
            "--suffix",
            "abc",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                taxonomy,
                command: GraphSubcommand::Build { subset, suffix, dry_run },
            })) => {
                assert!(taxonomy.is_none());
                assert_eq!(subset, ["a", "b", "c"]);
                assert_eq!(suffix.as_deref(), Some("abc"));
                assert!(!dry_run);
            }
            _ => panic!("Expected Graph Build command"),
        }
    }

    #[test]
    fn test_graph_taxonomy_is_global() {
        let args = CliArgs::parse_from(["lexgraph", "graph", "stats", "--taxonomy", "ukp.json"]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                taxonomy,
                command: GraphSubcommand::Stats { lcc, json, top },
            })) => {
                assert_eq!(taxonomy.as_deref(), Some("ukp.json"));
                assert!(!lcc);
                assert!(!json);
                assert_eq!(top, 5);
            }
            _ => panic!("Expected Graph Stats command"),
        }
    }

    #[test]
    fn test_graph_path_command() {
        let args = CliArgs::parse_from(["lexgraph", "graph", "path", "a", "b", "--directed"]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Path { from, to, directed },
                ..
            })) => {
                assert_eq!(from, "a");
                assert_eq!(to, "b");
                assert!(directed);
            }
            _ => panic!("Expected Graph Path command"),
        }
    }

    #[test]
    fn test_graph_iic_requires_entities() {
        assert!(CliArgs::try_parse_from(["lexgraph", "graph", "iic"]).is_err());

        let args = CliArgs::parse_from(["lexgraph", "graph", "iic", "a", "b"]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Iic { entities },
                ..
            })) => assert_eq!(entities, ["a", "b"]),
            _ => panic!("Expected Graph Iic command"),
        }
    }

    #[test]
    fn test_graph_lcs_command() {
        let args = CliArgs::parse_from([
            "lexgraph",
            "graph",
            "lcs",
            "Alice",
            "Bob",
            "--strategy",
            "minimal-combined-length",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Lcs { a, b, root, strategy },
                ..
            })) => {
                assert_eq!(a, "Alice");
                assert_eq!(b, "Bob");
                assert!(root.is_none());
                assert_eq!(strategy.as_deref(), Some("minimal-combined-length"));
            }
            _ => panic!("Expected Graph Lcs command"),
        }
    }

    #[test]
    fn test_graph_depth_and_cycles() {
        let args = CliArgs::parse_from(["lexgraph", "graph", "depth", "--root", "UKP"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Depth { root: Some(_) },
                ..
            }))
        ));

        let args = CliArgs::parse_from(["lexgraph", "graph", "cycles"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Cycles,
                ..
            }))
        ));
    }

    // ------------------------------------------------------------------------
    // Config command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_get_command() {
        let args = CliArgs::parse_from(["lexgraph", "config", "get", "cache.enabled"]);
        match args.command {
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Get { key },
            })) => assert_eq!(key, "cache.enabled"),
            _ => panic!("Expected Config Get command"),
        }
    }

    #[test]
    fn test_config_init_force() {
        let args = CliArgs::parse_from(["lexgraph", "config", "init", "--force"]);
        match args.command {
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Init { file, force },
            })) => {
                assert!(file.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_config_export_docker_env() {
        let args = CliArgs::parse_from(["lexgraph", "config", "export", "--docker-env"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Export { docker_env: true },
            }))
        ));
    }
}
