//! Human-readable rendering of resolution results
//!
//! Failure variants list every contributing declaration site, in collection
//! order, so the offending manifests can be located without re-running the
//! build with extra diagnostics.

use std::fmt::Write;

use console::style;

use crate::collector::{ResolutionResult, ResolvedDependency};

/// A rendered resolution: the text to print and the exit code it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResolution {
    pub output: String,
    pub exit_code: i32,
}

/// Render a resolution result for the terminal.
pub fn render(result: &ResolutionResult) -> RenderedResolution {
    let mut output = String::new();
    let exit_code = match result {
        ResolutionResult::FullyDeterministic {
            dependencies,
            lockfile,
        } => {
            let _ = writeln!(
                output,
                "{}",
                style("Dependencies were resolved deterministically").green()
            );
            let _ = writeln!(
                output,
                "{} will be shipped with the bundle",
                style(lockfile.display()).cyan()
            );
            write_dependency_list(&mut output, dependencies);
            0
        }
        ResolutionResult::NoLockfiles { dependencies } => {
            let _ = writeln!(
                output,
                "{}",
                style("No yarn.lock covers the resolved dependencies: installs will not be deterministic")
                    .yellow()
            );
            write_dependency_list(&mut output, dependencies);
            0
        }
        ResolutionResult::MultipleLockfiles {
            dependencies,
            lockfile,
        } => {
            let _ = writeln!(
                output,
                "{}",
                style(
                    "Multiple yarn.lock files cover the resolved dependencies: installs will not be deterministic"
                )
                .yellow()
            );
            let _ = writeln!(
                output,
                "{} will be shipped as a best effort",
                style(lockfile.display()).cyan()
            );
            write_dependency_list(&mut output, dependencies);
            0
        }
        ResolutionResult::UndeclaredDependencies { undeclared } => {
            let _ = writeln!(
                output,
                "{}",
                style("Undeclared dependencies were referenced during bundling").red()
            );
            for entry in undeclared {
                let _ = writeln!(
                    output,
                    "  {} (required from {})",
                    style(&entry.dependency).red().bold(),
                    entry.context.display()
                );
            }
            let _ = writeln!(
                output,
                "Declare them in a package.json inside the monorepo and install them"
            );
            1
        }
        ResolutionResult::VersionConflicts { conflicts } => {
            let _ = writeln!(
                output,
                "{}",
                style("Conflicting dependency versions must be resolved").red()
            );
            for conflict in conflicts {
                let _ = writeln!(output, "  {}", style(&conflict.package_name).red().bold());
                for declared in &conflict.versions {
                    let _ = writeln!(
                        output,
                        "    {} (declared at {})",
                        declared.version,
                        declared.context.display()
                    );
                }
            }
            let _ = writeln!(
                output,
                "Align the declared ranges so a single version satisfies all of them"
            );
            1
        }
    };
    RenderedResolution { output, exit_code }
}

fn write_dependency_list(output: &mut String, dependencies: &[ResolvedDependency]) {
    for dependency in dependencies {
        let _ = writeln!(
            output,
            "  {} {}",
            dependency.package_name,
            style(&dependency.version).cyan()
        );
    }
}
