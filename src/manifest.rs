//! Reading package manifests and generating the output manifest
//!
//! Monoship reads `package.json` files for two purposes: locating the
//! nearest ancestor declaration of a referenced package, and detecting the
//! monorepo root (lerna.json aside, a root manifest declares workspaces).
//! It writes exactly one manifest: the `package.json` of the packaged
//! application in the output directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MonoshipError, Result};

/// Per-package metadata file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Lock artifact file name. Treated as an opaque, path-identified artifact;
/// its contents are never parsed.
pub const LOCK_FILE: &str = "yarn.lock";

/// A parsed `package.json`, limited to the fields monoship reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,

    /// Direct dependencies only. Inherited declarations are found by walking
    /// ancestor manifests, not by merging dependency sections.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Yarn/npm workspaces declaration, either an array of globs or an
    /// object with a "packages" key.
    pub workspaces: Option<serde_json::Value>,
}

impl PackageManifest {
    /// Load the manifest contained in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content =
            std::fs::read_to_string(&path).map_err(|e| MonoshipError::ManifestReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| MonoshipError::ManifestParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// The version specifier this manifest declares for `package_name`
    /// among its direct dependencies, if any.
    pub fn declared_version(&self, package_name: &str) -> Option<&str> {
        self.dependencies.get(package_name).map(String::as_str)
    }

    /// True if this manifest declares workspaces.
    pub fn has_workspaces(&self) -> bool {
        match &self.workspaces {
            Some(serde_json::Value::Array(_)) => true,
            Some(serde_json::Value::Object(map)) => map.contains_key("packages"),
            _ => false,
        }
    }
}

/// The generated manifest for the packaged application.
///
/// Dependencies are held in a `BTreeMap` so serialization is always sorted
/// by key, independent of collection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputManifest {
    pub name: String,
    pub version: String,
    pub main: String,
    pub private: bool,
    pub dependencies: BTreeMap<String, String>,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl OutputManifest {
    /// Build the output manifest from the resolved dependency set.
    pub fn new(dependencies: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            name: "app".to_string(),
            version: "1.0.0".to_string(),
            main: "main.js".to_string(),
            private: true,
            dependencies: dependencies.into_iter().collect(),
            dev_dependencies: BTreeMap::new(),
        }
    }

    /// Write the manifest as pretty-printed JSON into `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let mut content =
            serde_json::to_string_pretty(self).map_err(|e| MonoshipError::FileWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        content.push('\n');
        std::fs::write(&path, content).map_err(|e| MonoshipError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_manifest_with_dependencies() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{ "name": "sub1", "dependencies": { "lodash": "^4.17.4" } }"#,
        )
        .unwrap();

        let manifest = PackageManifest::load(temp.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("sub1"));
        assert_eq!(manifest.declared_version("lodash"), Some("^4.17.4"));
        assert_eq!(manifest.declared_version("express"), None);
    }

    #[test]
    fn test_load_manifest_without_dependencies() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), r#"{ "name": "empty" }"#).unwrap();

        let manifest = PackageManifest::load(temp.path()).unwrap();
        assert!(manifest.dependencies.is_empty());
        assert!(!manifest.has_workspaces());
    }

    #[test]
    fn test_load_manifest_missing() {
        let temp = TempDir::new().unwrap();
        let result = PackageManifest::load(temp.path());
        assert!(matches!(
            result,
            Err(MonoshipError::ManifestReadFailed { .. })
        ));
    }

    #[test]
    fn test_load_manifest_malformed() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "{ not json").unwrap();

        let result = PackageManifest::load(temp.path());
        assert!(matches!(
            result,
            Err(MonoshipError::ManifestParseFailed { .. })
        ));
    }

    #[test]
    fn test_workspaces_array_and_object_forms() {
        let array: PackageManifest =
            serde_json::from_str(r#"{ "workspaces": ["packages/*"] }"#).unwrap();
        assert!(array.has_workspaces());

        let object: PackageManifest =
            serde_json::from_str(r#"{ "workspaces": { "packages": ["packages/*"] } }"#).unwrap();
        assert!(object.has_workspaces());

        let neither: PackageManifest = serde_json::from_str(r#"{ "workspaces": "oops" }"#).unwrap();
        assert!(!neither.has_workspaces());
    }

    #[test]
    fn test_output_manifest_sorted_by_key() {
        let manifest = OutputManifest::new(vec![
            ("zlib-sync".to_string(), "^1.0.0".to_string()),
            ("axios".to_string(), "0.18.0".to_string()),
            ("lodash".to_string(), "^4.17.4".to_string()),
        ]);

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let axios = json.find("axios").unwrap();
        let lodash = json.find("lodash").unwrap();
        let zlib = json.find("zlib-sync").unwrap();
        assert!(axios < lodash && lodash < zlib);
    }

    #[test]
    fn test_output_manifest_write() {
        let temp = TempDir::new().unwrap();
        let manifest = OutputManifest::new(vec![("lodash".to_string(), "4.17.5".to_string())]);
        manifest.write(temp.path()).unwrap();

        let written = std::fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["name"], "app");
        assert_eq!(parsed["version"], "1.0.0");
        assert_eq!(parsed["main"], "main.js");
        assert_eq!(parsed["private"], true);
        assert_eq!(parsed["dependencies"]["lodash"], "4.17.5");
        assert!(parsed["devDependencies"].as_object().unwrap().is_empty());
    }
}
