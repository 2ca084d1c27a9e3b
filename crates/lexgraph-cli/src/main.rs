//! `lexgraph` binary.

use std::process;

use clap::Parser;
use lexgraph_cli::{CliArgs, LexgraphCli};

fn main() {
    let args = CliArgs::parse();

    let cli = match LexgraphCli::from_args("lexgraph", &args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli.run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
