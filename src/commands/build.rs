//! Build command implementation
//!
//! The packaging pipeline:
//! 1. Load configuration and detect the monorepo root
//! 2. Bundle the entry point's source graph, collecting every external
//!    package reference
//! 3. Resolve the collected dependencies in one pass
//! 4. On success, write the generated package.json, copy the identified
//!    lock artifact, and optionally install packages
//! 5. On failure, print every contributing declaration site and exit
//!    non-zero

use std::path::{Path, PathBuf};

use console::style;

use crate::bundler::{self, BundlerParams};
use crate::cli::BuildArgs;
use crate::collector::{DependencyCollector, ResolutionResult};
use crate::config::{self, ConfigOverrides};
use crate::display;
use crate::error::{MonoshipError, Result};
use crate::manifest::{LOCK_FILE, OutputManifest};
use crate::process;

/// What a finished build leaves behind, for the run command to chain on.
pub struct BuildOutcome {
    pub output_directory: PathBuf,
    pub exit_code: i32,
}

/// Run the build command.
pub fn run(args: BuildArgs) -> Result<i32> {
    Ok(execute(&args)?.exit_code)
}

/// Execute the packaging pipeline and report the outcome.
pub fn execute(args: &BuildArgs) -> Result<BuildOutcome> {
    let main_file =
        std::fs::canonicalize(&args.main).map_err(|_| MonoshipError::EntryFileNotFound {
            path: args.main.display().to_string(),
        })?;
    if !main_file.is_file() {
        return Err(MonoshipError::EntryFileNotFound {
            path: args.main.display().to_string(),
        });
    }

    let overrides = ConfigOverrides {
        output_directory: args.out_dir.clone().map(absolutize),
        install_packages: args.install_override(),
        extra_modules: args.extra_modules.clone(),
    };
    let config = config::load(&main_file, overrides)?;

    println!(
        "{} v{}",
        style("monoship").white().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Using monorepo root {}",
        style(config.monorepo_root.display()).green()
    );

    let output_directory = prepare_output_directory(config.output_directory.as_deref())?;
    println!(
        "Bundling {} into {}",
        style(main_file.display()).cyan(),
        style(output_directory.display()).green()
    );

    let mut collector = DependencyCollector::new(&config.monorepo_root);

    // Extra modules are attributed to the entry file's directory, before the
    // bundler contributes its own observations.
    let entry_dir = main_file.parent().unwrap_or(&config.monorepo_root);
    for module in &config.extra_modules {
        collector.collect_dependency(module, entry_dir);
    }

    bundler::bundle(
        &BundlerParams {
            monorepo_root: &config.monorepo_root,
            main_file: &main_file,
            output_directory: &output_directory,
        },
        &mut |package, context| collector.collect_dependency(package, context),
    )?;

    println!("Resolving dependencies");
    let result = collector.resolve_dependencies()?;
    let rendered = display::render(&result);
    print!("{}", rendered.output);

    let (dependencies, lockfile) = match &result {
        ResolutionResult::FullyDeterministic {
            dependencies,
            lockfile,
        }
        | ResolutionResult::MultipleLockfiles {
            dependencies,
            lockfile,
        } => (dependencies, Some(lockfile)),
        ResolutionResult::NoLockfiles { dependencies } => (dependencies, None),
        ResolutionResult::UndeclaredDependencies { .. }
        | ResolutionResult::VersionConflicts { .. } => {
            return Ok(BuildOutcome {
                output_directory,
                exit_code: rendered.exit_code,
            });
        }
    };

    println!("Writing package.json");
    let manifest = OutputManifest::new(
        dependencies
            .iter()
            .map(|d| (d.package_name.clone(), d.version.clone())),
    );
    manifest.write(&output_directory)?;

    if let Some(lockfile) = lockfile {
        println!("Copying {} from {}", LOCK_FILE, lockfile.display());
        let destination = output_directory.join(LOCK_FILE);
        std::fs::copy(lockfile, &destination).map_err(|e| MonoshipError::FileCopyFailed {
            from: lockfile.display().to_string(),
            to: destination.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    if config.install_packages {
        println!("Installing packages into {}", output_directory.display());
        process::execute_checked(process::YARN_COMMAND, &[], &output_directory)?;
    }

    println!(
        "{}",
        style(format!(
            "Successfully packaged the application in {}",
            output_directory.display()
        ))
        .green()
    );

    Ok(BuildOutcome {
        output_directory,
        exit_code: 0,
    })
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(path)
    }
}

fn prepare_output_directory(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(dir.to_path_buf())
        }
        // The bundle must outlive the process; keep the temp dir.
        None => Ok(tempfile::Builder::new()
            .prefix("monoship-")
            .tempdir()?
            .keep()),
    }
}
