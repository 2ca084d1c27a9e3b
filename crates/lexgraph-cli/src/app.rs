//! The `lexgraph` application.
//!
//! Owns the loaded configuration, installs logging, and dispatches parsed
//! commands to the config and graph handlers.

use crate::cli::{BaseCommand, CliArgs, GraphCommand, GraphSubcommand};
use crate::config::LexgraphConfig;
use crate::graph_handlers::{BuildOptions, LcsOptions};
use crate::{config_handlers, graph_handlers};
use lexgraph_core::Result;
use tracing_subscriber::EnvFilter;

// ============================================================================
// LexgraphCli
// ============================================================================

/// CLI application over a [`LexgraphConfig`].
pub struct LexgraphCli {
    name: String,
    config: LexgraphConfig,
    version: String,
}

impl LexgraphCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = LexgraphConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    pub fn new(name: impl Into<String>, config: LexgraphConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &LexgraphConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity
    /// flags. Records emitted through the `log` facade by the library crates
    /// are forwarded to the same subscriber.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Graph(graph_cmd)) => self.handle_graph(graph_cmd),
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Dispatch graph subcommands to handlers.
    fn handle_graph(&self, command: GraphCommand) -> Result<()> {
        let config = &self.config;
        let taxonomy = command.taxonomy.as_deref();
        tracing::debug!(command = ?command.command, "Running graph command");

        match command.command {
            GraphSubcommand::Build {
                subset,
                suffix,
                dry_run,
            } => {
                let options = BuildOptions {
                    subset,
                    suffix,
                    dry_run,
                };
                graph_handlers::handle_build(config, taxonomy, options)
            }
            GraphSubcommand::Stats { lcc, json, top } => {
                graph_handlers::handle_stats(config, taxonomy, lcc, json, top)
            }
            GraphSubcommand::Path { from, to, directed } => {
                graph_handlers::handle_path(config, taxonomy, &from, &to, directed)
            }
            GraphSubcommand::Iic { entities } => {
                graph_handlers::handle_iic(config, taxonomy, &entities)
            }
            GraphSubcommand::Lcs {
                a,
                b,
                root,
                strategy,
            } => {
                let options = LcsOptions {
                    a,
                    b,
                    root,
                    strategy,
                };
                graph_handlers::handle_lcs(config, taxonomy, options)
            }
            GraphSubcommand::Depth { root } => {
                graph_handlers::handle_depth(config, taxonomy, root.as_deref())
            }
            GraphSubcommand::Cycles => graph_handlers::handle_cycles(config, taxonomy),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
