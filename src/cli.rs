//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Monoship - monorepo application packager
///
/// Package a monorepo Node.js entry point into a self-contained deployable
/// directory with an exact third-party dependency set.
#[derive(Parser, Debug)]
#[command(
    name = "monoship",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package a monorepo application entry point for deployment",
    long_about = "Monoship bundles the source graph of a single entry point inside a \
                  multi-package monorepo, computes the third-party packages the bundle \
                  needs from the surrounding package.json files, and ships the yarn.lock \
                  that makes installing them deterministic when one exists.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  monoship build packages/api/src/main.js\n    \
                  monoship build packages/api/src/main.js --out-dir dist/api\n    \
                  monoship run packages/api/src/main.js -- --port 3000\n    \
                  monoship build packages/api/src/main.js -m source-map-support"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package an application entry point
    Build(BuildArgs),

    /// Package and run an application entry point
    Run(RunArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments shared by the build and run commands
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build into a temporary directory:\n    monoship build packages/api/src/main.js\n\n\
                  Build into a fixed directory:\n    monoship build packages/api/src/main.js -d dist/api\n\n\
                  Skip the install step (CI artifact upload):\n    monoship build packages/api/src/main.js -n\n\n\
                  Force package installation:\n    monoship build packages/api/src/main.js -i\n\n\
                  Include a package the sources never import:\n    monoship build packages/api/src/main.js -m pg")]
pub struct BuildArgs {
    /// The application entry point source file
    pub main: PathBuf,

    /// Output directory (defaults to a temporary directory)
    #[arg(long = "out-dir", short = 'd', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Install packages into the output directory after building
    #[arg(long, short = 'i', conflicts_with = "no_packages_installation")]
    pub install_packages: bool,

    /// Do not install packages after building
    #[arg(long, short = 'n')]
    pub no_packages_installation: bool,

    /// Additional package to ship even if never imported (repeatable)
    #[arg(long = "extra-module", short = 'm', value_name = "PACKAGE")]
    pub extra_modules: Vec<String>,
}

impl BuildArgs {
    /// The install override the flags express, if any.
    pub fn install_override(&self) -> Option<bool> {
        if self.install_packages {
            Some(true)
        } else if self.no_packages_installation {
            Some(false)
        } else {
            None
        }
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Package and run:\n    monoship run packages/api/src/main.js\n\n\
                  Pass arguments to the program:\n    monoship run packages/api/src/main.js -- --port 3000\n\n\
                  Pass arguments to node (e.g. the inspector):\n    monoship run packages/api/src/main.js --node-arg=--inspect")]
pub struct RunArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Argument passed to the node process (repeatable)
    #[arg(long = "node-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub node_args: Vec<String>,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    monoship completions --shell bash > ~/.bash_completion.d/monoship\n\n\
                  Generate zsh completions:\n    monoship completions --shell zsh > ~/.zfunc/_monoship\n\n\
                  Generate fish completions:\n    monoship completions --shell fish > ~/.config/fish/completions/monoship.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
