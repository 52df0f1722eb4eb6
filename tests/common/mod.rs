//! Common test utilities: builds throwaway monorepos on disk

use std::path::PathBuf;

use tempfile::TempDir;

/// A disposable monorepo for integration tests.
///
/// Built fluently: start with [`Monorepo::new`], add a root manifest,
/// packages and lock files, then point the collector or the CLI at it.
#[allow(dead_code)]
pub struct Monorepo {
    /// Temporary directory, removed on drop
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Canonicalized monorepo root
    pub root: PathBuf,
}

#[allow(dead_code)]
impl Monorepo {
    /// Create an empty monorepo
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = std::fs::canonicalize(temp.path()).expect("Failed to canonicalize temp path");
        Self { temp, root }
    }

    /// Add a root package.json with workspaces enabled and the given
    /// dependencies
    pub fn with_root_manifest(self, dependencies: &[(&str, &str)]) -> Self {
        let manifest = manifest_json("root", dependencies, true);
        self.write_file("package.json", &manifest);
        self
    }

    /// Add a lerna.json marker at the root
    pub fn with_lerna(self) -> Self {
        self.write_file("lerna.json", "{}\n");
        self
    }

    /// Add a yarn.lock at the root
    pub fn with_root_lock(self) -> Self {
        self.write_file("yarn.lock", "# yarn lockfile v1\n");
        self
    }

    /// Add a package under packages/ with its own manifest
    pub fn with_package(self, name: &str, dependencies: &[(&str, &str)]) -> Self {
        let manifest = manifest_json(name, dependencies, false);
        self.write_file(&format!("packages/{name}/package.json"), &manifest);
        self
    }

    /// Add a yarn.lock inside a package
    pub fn with_package_lock(self, name: &str) -> Self {
        self.write_file(
            &format!("packages/{name}/yarn.lock"),
            "# yarn lockfile v1\n",
        );
        self
    }

    /// Path of a package directory
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join("packages").join(name)
    }

    /// Write a file under the root, creating parent directories
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    /// Read a file under the root
    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("Failed to read file")
    }

    /// Check whether a file exists under the root
    pub fn file_exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }
}

impl Default for Monorepo {
    fn default() -> Self {
        Self::new()
    }
}

fn manifest_json(name: &str, dependencies: &[(&str, &str)], workspaces: bool) -> String {
    let deps: serde_json::Map<String, serde_json::Value> = dependencies
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::Value::String((*v).to_string())))
        .collect();
    let mut manifest = serde_json::json!({
        "name": name,
        "version": "1.0.0",
        "dependencies": deps,
    });
    if workspaces {
        manifest["workspaces"] = serde_json::json!(["packages/*"]);
    }
    let mut body = serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest");
    body.push('\n');
    body
}
