//! Build configuration loading
//!
//! Configuration comes from an optional `monoship.json` found by walking up
//! from the entry file's directory, merged with command-line overrides. When
//! the monorepo root is not configured explicitly it is detected the way the
//! surrounding ecosystem marks one: a `lerna.json`, then a `package.json`
//! with a workspaces declaration, then the topmost ancestor `package.json`.
//!
//! These walks are unbounded (the root is not known yet); the engine's own
//! searches are bounded by the root this module computes.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MonoshipError, Result};
use crate::manifest::{MANIFEST_FILE, PackageManifest};

/// Project configuration file name.
pub const CONFIG_FILE: &str = "monoship.json";

/// Raw `monoship.json` contents. Unknown keys are a validation error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigFile {
    pub monorepo_root_path: Option<String>,
    pub output_directory: Option<String>,
    pub install_packages: Option<bool>,
    #[serde(default)]
    pub extra_modules: Vec<String>,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub output_directory: Option<PathBuf>,
    pub install_packages: Option<bool>,
    pub extra_modules: Vec<String>,
}

/// Effective configuration for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoshipConfig {
    /// Upper bound for every manifest and lock-artifact search.
    pub monorepo_root: PathBuf,
    /// Where to write the bundle; a kept temp directory when absent.
    pub output_directory: Option<PathBuf>,
    /// Whether to run the package manager in the output directory.
    pub install_packages: bool,
    /// Packages to collect even if never imported.
    pub extra_modules: Vec<String>,
}

/// Load the effective configuration for building `main_file`.
pub fn load(main_file: &Path, overrides: ConfigOverrides) -> Result<MonoshipConfig> {
    let start_dir = main_file
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let (file, file_dir) = match find_dir_upwards(&start_dir, CONFIG_FILE) {
        Some(dir) => (read_config_file(&dir.join(CONFIG_FILE))?, Some(dir)),
        None => (ConfigFile::default(), None),
    };

    let monorepo_root = match (&file.monorepo_root_path, &file_dir) {
        // Relative roots are anchored at the configuration file.
        (Some(configured), Some(dir)) => dir.join(configured),
        _ => lookup_monorepo_root(&start_dir)?,
    };
    let monorepo_root = std::fs::canonicalize(&monorepo_root).unwrap_or(monorepo_root);

    let output_directory = overrides.output_directory.or_else(|| {
        match (&file.output_directory, &file_dir) {
            (Some(configured), Some(dir)) => Some(dir.join(configured)),
            _ => None,
        }
    });

    let mut extra_modules = file.extra_modules;
    extra_modules.extend(overrides.extra_modules);

    Ok(MonoshipConfig {
        monorepo_root,
        output_directory,
        install_packages: overrides
            .install_packages
            .or(file.install_packages)
            .unwrap_or(true),
        extra_modules,
    })
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| MonoshipError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| MonoshipError::ConfigInvalid {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Nearest ancestor directory (start inclusive) containing `file_name`.
fn find_dir_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(file_name).is_file() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Detect the monorepo root: lerna marker, then workspaces declaration, then
/// the topmost ancestor manifest.
fn lookup_monorepo_root(start_dir: &Path) -> Result<PathBuf> {
    if let Some(dir) = find_dir_upwards(start_dir, "lerna.json") {
        return Ok(dir);
    }

    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        if current.join(MANIFEST_FILE).is_file() && PackageManifest::load(current)?.has_workspaces()
        {
            return Ok(current.to_path_buf());
        }
        dir = current.parent();
    }

    let mut topmost = None;
    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        if current.join(MANIFEST_FILE).is_file() {
            topmost = Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    topmost.ok_or_else(|| MonoshipError::MonorepoRootNotFound {
        start: start_dir.display().to_string(),
    })
}
