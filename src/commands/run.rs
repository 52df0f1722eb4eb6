//! Run command implementation
//!
//! Packages the entry point, then launches the bundled application with
//! node from the output directory, forwarding its exit code.

use console::style;

use crate::cli::RunArgs;
use crate::commands::build;
use crate::error::Result;
use crate::process;

/// Run the run command.
pub fn run(args: RunArgs) -> Result<i32> {
    let outcome = build::execute(&args.build)?;
    if outcome.exit_code != 0 {
        return Ok(outcome.exit_code);
    }

    let mut node_args = args.node_args.clone();
    node_args.push("main.js".to_string());
    node_args.extend(args.args.iter().cloned());

    println!(
        "{} node {}",
        style("Running").white().bold(),
        node_args.join(" ")
    );
    process::execute("node", &node_args, &outcome.output_directory)
}
