//! Nearest-ancestor lookups for manifests and lock artifacts
//!
//! Both lookups are explicit bounded walks from a starting directory up to
//! the monorepo root inclusive, never above it. The directory tree is
//! read-only for the duration of one resolution pass, so manifest reads are
//! memoized per directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manifest::{LOCK_FILE, MANIFEST_FILE, PackageManifest};

/// A dependency declaration found in an ancestor manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Version specifier, verbatim from the declaring manifest.
    pub version: String,
    /// Directory of the declaring manifest.
    pub manifest_dir: PathBuf,
    /// The observation context this declaration was resolved from.
    pub context: PathBuf,
}

/// Memoizes manifest reads during one resolution pass.
#[derive(Default)]
pub struct ManifestCache {
    manifests: HashMap<PathBuf, Option<PackageManifest>>,
}

impl ManifestCache {
    /// The specifier `dir`'s manifest declares for `package_name`, if the
    /// directory holds a manifest that lists it among direct dependencies.
    fn declared_version(&mut self, dir: &Path, package_name: &str) -> Result<Option<String>> {
        if !self.manifests.contains_key(dir) {
            let loaded = if dir.join(MANIFEST_FILE).is_file() {
                Some(PackageManifest::load(dir)?)
            } else {
                None
            };
            self.manifests.insert(dir.to_path_buf(), loaded);
        }
        Ok(self.manifests[dir]
            .as_ref()
            .and_then(|m| m.declared_version(package_name))
            .map(str::to_string))
    }
}

/// Find the nearest ancestor manifest (from `context` up to `root`,
/// inclusive) that declares `package_name`.
///
/// A manifest that exists but does not list the package does not stop the
/// walk; monorepo packages inherit declarations made higher up.
pub fn locate_declaration(
    cache: &mut ManifestCache,
    root: &Path,
    package_name: &str,
    context: &Path,
) -> Result<Option<Declaration>> {
    let mut dir = context;
    loop {
        if let Some(version) = cache.declared_version(dir, package_name)? {
            return Ok(Some(Declaration {
                version,
                manifest_dir: dir.to_path_buf(),
                context: context.to_path_buf(),
            }));
        }
        if dir == root {
            return Ok(None);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return Ok(None),
        }
    }
}

/// Find the nearest ancestor lock artifact for `dir` (inclusive), bounded by
/// `root`. Independent of any manifest.
pub fn locate_lock_artifact(root: &Path, dir: &Path) -> Option<PathBuf> {
    let mut current = dir;
    loop {
        let candidate = current.join(LOCK_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if current == root {
            return None;
        }
        current = current.parent()?;
    }
}
