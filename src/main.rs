//! Monoship - monorepo application packager
//!
//! Command line entry point: parse arguments, dispatch to the command
//! implementations, forward their exit codes.

use clap::Parser;

use monoship::cli::{Cli, Commands};
use monoship::commands;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
