//! Command-line front-end for the Lexgraph graph engine.
//!
//! # Modules
//!
//! - [`cli`]: clap argument and subcommand types
//! - [`config`]: [`LexgraphConfig`] loading via confyg
//! - [`app`]: [`LexgraphCli`], logging setup and command dispatch
//! - [`graph_handlers`] / [`config_handlers`]: command implementations

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod graph_handlers;

pub use app::LexgraphCli;
pub use cli::{BaseCommand, CliArgs, ConfigAction, GraphSubcommand};
pub use config::LexgraphConfig;
