//! Dependency collection and resolution engine
//!
//! This module handles:
//! - Accumulating "package X was referenced from directory Y" observations
//!   while the bundler walks the entry point's module graph
//! - Locating the nearest ancestor manifest declaring each package
//! - Reconciling the version ranges declared across the monorepo
//! - Classifying how reproducible an install of the result will be
//!
//! Accumulation never touches the filesystem; all reads happen inside one
//! [`DependencyCollector::resolve_dependencies`] pass. Observation order is
//! preserved exactly as accumulated and every tie-break uses
//! first-collected order, never filesystem iteration order.

pub mod locate;
mod reconcile;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use locate::{ManifestCache, locate_declaration, locate_lock_artifact};
use reconcile::{Reconciled, reconcile};

/// One "package was referenced from here" record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub package_name: String,
    pub context: PathBuf,
}

/// A package name and its winning version specifier.
///
/// The version is the literal specifier text chosen during reconciliation,
/// not a synthesized concrete version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub package_name: String,
    pub version: String,
}

/// An observation no ancestor manifest declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndeclaredDependency {
    pub dependency: String,
    pub context: PathBuf,
}

/// One declaration site contributing to a version conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingVersion {
    pub version: String,
    pub context: PathBuf,
}

/// Every conflicting declaration site for one package, in collection order,
/// so the user can see each manifest involved without re-running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConflict {
    pub package_name: String,
    pub versions: Vec<ConflictingVersion>,
}

/// The single, final outcome of one collection pass.
///
/// Undeclared dependencies take priority over version conflicts, which take
/// priority over the reproducibility classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Every declaration involved in resolution is covered by the same lock
    /// artifact; installing the output reproduces the developer's
    /// environment.
    FullyDeterministic {
        dependencies: Vec<ResolvedDependency>,
        lockfile: PathBuf,
    },
    /// Resolution succeeded but no lock artifact covers any declaration;
    /// installs will float within the declared ranges.
    NoLockfiles {
        dependencies: Vec<ResolvedDependency>,
    },
    /// Resolution succeeded but several distinct lock artifacts cover the
    /// declarations; the one belonging to the earliest-collected winning
    /// declaration is shipped as a best effort.
    MultipleLockfiles {
        dependencies: Vec<ResolvedDependency>,
        lockfile: PathBuf,
    },
    /// At least one referenced package has no declaring manifest anywhere in
    /// its ancestor chain. Contexts are the original observations, not
    /// deduplicated.
    UndeclaredDependencies {
        undeclared: Vec<UndeclaredDependency>,
    },
    /// At least one package was declared with mutually unsatisfiable ranges.
    VersionConflicts { conflicts: Vec<PackageConflict> },
}

impl ResolutionResult {
    /// True for the variants a build can proceed from.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ResolutionResult::FullyDeterministic { .. }
                | ResolutionResult::NoLockfiles { .. }
                | ResolutionResult::MultipleLockfiles { .. }
        )
    }
}

/// Accumulates dependency observations during bundling and resolves them
/// once bundling is complete.
///
/// A collector is scoped to one build: accumulate with
/// [`collect_dependency`](Self::collect_dependency), then call
/// [`resolve_dependencies`](Self::resolve_dependencies) exactly once after
/// bundling finishes. Upward searches never leave the monorepo root the
/// collector was constructed with.
pub struct DependencyCollector {
    monorepo_root: PathBuf,
    observations: Vec<Observation>,
}

impl DependencyCollector {
    /// Create a collector bounded by `monorepo_root`.
    pub fn new(monorepo_root: impl Into<PathBuf>) -> Self {
        Self {
            monorepo_root: monorepo_root.into(),
            observations: Vec::new(),
        }
    }

    /// Record that `package_name` was referenced from `context`.
    ///
    /// Append-only and infallible; the filesystem is not read until
    /// resolution.
    pub fn collect_dependency(&mut self, package_name: &str, context: &Path) {
        self.observations.push(Observation {
            package_name: package_name.to_string(),
            context: context.to_path_buf(),
        });
    }

    /// Resolve every accumulated observation into a single classification.
    ///
    /// Idempotent: performs no mutation, so calling it again without
    /// intervening [`collect_dependency`](Self::collect_dependency) calls
    /// returns an identical result. Only filesystem faults are errors;
    /// undeclared packages and version conflicts are result variants.
    pub fn resolve_dependencies(&self) -> Result<ResolutionResult> {
        // Group observations by package name with an explicit ordered list,
        // so first-collected tie-breaking is a rule and not a side effect of
        // a container's iteration order.
        let mut package_order: Vec<&str> = Vec::new();
        let mut by_package: HashMap<&str, Vec<&Observation>> = HashMap::new();
        for observation in &self.observations {
            let entry = by_package
                .entry(observation.package_name.as_str())
                .or_default();
            if entry.is_empty() {
                package_order.push(observation.package_name.as_str());
            }
            entry.push(observation);
        }

        let mut cache = ManifestCache::default();
        let mut undeclared = Vec::new();
        let mut conflicts = Vec::new();
        let mut dependencies = Vec::new();
        // Declaring-manifest directories in collection order. Each package's
        // winning declaration precedes its other sites, so the first lock
        // artifact found below belongs to the earliest-collected winner.
        let mut declaration_dirs: Vec<PathBuf> = Vec::new();

        for package_name in &package_order {
            let observations = &by_package[*package_name];
            let mut declarations = Vec::with_capacity(observations.len());
            let mut missing = false;
            for observation in observations {
                match locate_declaration(
                    &mut cache,
                    &self.monorepo_root,
                    package_name,
                    &observation.context,
                )? {
                    Some(declaration) => declarations.push(declaration),
                    None => {
                        undeclared.push(UndeclaredDependency {
                            dependency: (*package_name).to_string(),
                            context: observation.context.clone(),
                        });
                        missing = true;
                    }
                }
            }
            // A gap in declarations is reported before any version conflict,
            // so packages that cannot ship are not reconciled at all.
            if missing || !undeclared.is_empty() {
                continue;
            }
            match reconcile(&declarations) {
                Reconciled::Agreed { version } => {
                    dependencies.push(ResolvedDependency {
                        package_name: (*package_name).to_string(),
                        version,
                    });
                    for declaration in &declarations {
                        if !declaration_dirs.contains(&declaration.manifest_dir) {
                            declaration_dirs.push(declaration.manifest_dir.clone());
                        }
                    }
                }
                Reconciled::Conflict { versions } => {
                    conflicts.push(PackageConflict {
                        package_name: (*package_name).to_string(),
                        versions,
                    });
                }
            }
        }

        if !undeclared.is_empty() {
            return Ok(ResolutionResult::UndeclaredDependencies { undeclared });
        }
        if !conflicts.is_empty() {
            return Ok(ResolutionResult::VersionConflicts { conflicts });
        }

        // Distinct lock artifacts, evaluated once per distinct
        // declaring-manifest directory and kept in collection order.
        let mut lockfiles: Vec<PathBuf> = Vec::new();
        for dir in &declaration_dirs {
            if let Some(lockfile) = locate_lock_artifact(&self.monorepo_root, dir) {
                if !lockfiles.contains(&lockfile) {
                    lockfiles.push(lockfile);
                }
            }
        }

        Ok(if lockfiles.is_empty() {
            ResolutionResult::NoLockfiles { dependencies }
        } else {
            let lockfile = lockfiles.swap_remove(0);
            if lockfiles.is_empty() {
                ResolutionResult::FullyDeterministic {
                    dependencies,
                    lockfile,
                }
            } else {
                ResolutionResult::MultipleLockfiles {
                    dependencies,
                    lockfile,
                }
            }
        })
    }
}
