//! Source bundling: walking the entry point's static import graph
//!
//! Relative imports are resolved against the importing file and copied into
//! the output directory under their monorepo-relative paths; bare imports
//! are reduced to a package name and reported to the dependency collector
//! with the importing file's directory as context. Node built-ins are
//! skipped. No transpilation is performed and nothing is rewritten: the
//! output is the same plain JavaScript, rooted by a `main.js` shim that
//! requires the copied entry file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MonoshipError, Result};

/// Node built-in modules, never collected as third-party dependencies.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Extensions tried when resolving an extensionless relative import.
const EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "json"];

/// Everything the bundler needs for one pass.
pub struct BundlerParams<'a> {
    pub monorepo_root: &'a Path,
    /// Absolute path of the application entry point.
    pub main_file: &'a Path,
    pub output_directory: &'a Path,
}

/// Bundle the entry file's module graph into the output directory, invoking
/// `collect` once per external package reference.
pub fn bundle(params: &BundlerParams, collect: &mut dyn FnMut(&str, &Path)) -> Result<()> {
    let mut visited = HashSet::new();
    bundle_file(params, params.main_file, &mut visited, collect)?;
    write_entry_shim(params)
}

fn bundle_file(
    params: &BundlerParams,
    file: &Path,
    visited: &mut HashSet<PathBuf>,
    collect: &mut dyn FnMut(&str, &Path),
) -> Result<()> {
    if !visited.insert(file.to_path_buf()) {
        return Ok(());
    }

    copy_into_output(params, file)?;

    // JSON modules carry no imports of their own.
    if file.extension().is_some_and(|ext| ext == "json") {
        return Ok(());
    }

    let source = std::fs::read_to_string(file).map_err(|e| MonoshipError::FileReadFailed {
        path: file.display().to_string(),
        reason: e.to_string(),
    })?;
    let dir = file.parent().unwrap_or(params.monorepo_root);

    for specifier in extract_specifiers(&source) {
        if specifier.starts_with('.') {
            let resolved = resolve_relative(dir, &specifier).ok_or_else(|| {
                MonoshipError::UnresolvedImport {
                    specifier: specifier.clone(),
                    importer: file.display().to_string(),
                }
            })?;
            bundle_file(params, &resolved, visited, collect)?;
        } else if let Some(package) = package_name(&specifier) {
            collect(package, dir);
        }
    }

    Ok(())
}

fn copy_into_output(params: &BundlerParams, file: &Path) -> Result<()> {
    let relative = monorepo_relative(params, file)?;
    let destination = params.output_directory.join(relative);
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(file, &destination).map_err(|e| MonoshipError::FileCopyFailed {
        from: file.display().to_string(),
        to: destination.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn monorepo_relative<'f>(params: &BundlerParams, file: &'f Path) -> Result<&'f Path> {
    file.strip_prefix(params.monorepo_root)
        .map_err(|_| MonoshipError::SourceOutsideRoot {
            path: file.display().to_string(),
            root: params.monorepo_root.display().to_string(),
        })
}

/// Write the `main.js` shim the generated manifest points at.
fn write_entry_shim(params: &BundlerParams) -> Result<()> {
    let relative = monorepo_relative(params, params.main_file)?;
    let require_path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if require_path == "main.js" {
        // The entry already sits at the output root under the right name.
        return Ok(());
    }
    let shim = params.output_directory.join("main.js");
    std::fs::write(
        &shim,
        format!("module.exports = require('./{require_path}');\n"),
    )
    .map_err(|e| MonoshipError::FileWriteFailed {
        path: shim.display().to_string(),
        reason: e.to_string(),
    })
}

#[allow(clippy::unwrap_used)]
fn import_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?x)
            import\s+[\w$*{},\s]*?from\s*['"]([^'"]+)['"]
            | import\s*['"]([^'"]+)['"]
            | export\s+[\w$*{},\s]*?from\s*['"]([^'"]+)['"]
            | (?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)
            "#,
        )
        .unwrap()
    })
}

/// Static import specifiers of a source file, in order of appearance,
/// deduplicated.
pub fn extract_specifiers(source: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut specifiers = Vec::new();
    for captures in import_pattern().captures_iter(source) {
        let matched = captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4));
        if let Some(specifier) = matched {
            if seen.insert(specifier.as_str().to_string()) {
                specifiers.push(specifier.as_str().to_string());
            }
        }
    }
    specifiers
}

/// Reduce a bare import specifier to its package name.
///
/// Deep imports keep only the package segment (`lodash/fp` becomes
/// `lodash`, `@scope/pkg/util` becomes `@scope/pkg`). Returns `None` for
/// Node built-ins and specifier shapes monoship does not collect.
pub fn package_name(specifier: &str) -> Option<&str> {
    if specifier.starts_with("node:") || specifier.starts_with('/') || specifier.contains("://") {
        return None;
    }
    let name = if specifier.starts_with('@') {
        match specifier.match_indices('/').nth(1) {
            Some((index, _)) => &specifier[..index],
            None => specifier,
        }
    } else {
        specifier.split('/').next().unwrap_or(specifier)
    };
    if name.is_empty() || NODE_BUILTINS.contains(&name) {
        return None;
    }
    Some(name)
}

fn resolve_relative(dir: &Path, specifier: &str) -> Option<PathBuf> {
    let base = dir.join(specifier);
    if base.is_file() {
        return Some(base);
    }
    for ext in EXTENSIONS {
        let mut with_ext = base.clone().into_os_string();
        with_ext.push(format!(".{ext}"));
        let candidate = PathBuf::from(with_ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    if base.is_dir() {
        for ext in EXTENSIONS {
            let candidate = base.join(format!("index.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_specifiers_all_forms() {
        let source = r#"
            import fs from 'fs';
            import { join, resolve } from "path";
            import * as _ from 'lodash';
            import 'source-map-support/register';
            export { helper } from './helper';
            const express = require('express');
            const lazy = import('./lazy');
        "#;
        let specifiers = extract_specifiers(source);
        assert_eq!(
            specifiers,
            vec![
                "fs",
                "path",
                "lodash",
                "source-map-support/register",
                "./helper",
                "express",
                "./lazy",
            ]
        );
    }

    #[test]
    fn test_extract_specifiers_deduplicates() {
        let source = "const a = require('lodash');\nconst b = require('lodash');\n";
        assert_eq!(extract_specifiers(source), vec!["lodash"]);
    }

    #[test]
    fn test_package_name_plain_and_deep() {
        assert_eq!(package_name("lodash"), Some("lodash"));
        assert_eq!(package_name("lodash/fp"), Some("lodash"));
    }

    #[test]
    fn test_package_name_scoped() {
        assert_eq!(package_name("@babel/core"), Some("@babel/core"));
        assert_eq!(
            package_name("@scope/pkg/deep/module"),
            Some("@scope/pkg")
        );
    }

    #[test]
    fn test_package_name_skips_builtins() {
        assert_eq!(package_name("fs"), None);
        assert_eq!(package_name("node:path"), None);
        assert_eq!(package_name("path"), None);
    }

    #[test]
    fn test_resolve_relative_extension_fallbacks() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        std::fs::write(dir.join("util.js"), "").unwrap();
        std::fs::create_dir(dir.join("lib")).unwrap();
        std::fs::write(dir.join("lib/index.js"), "").unwrap();

        assert_eq!(
            resolve_relative(dir, "./util"),
            Some(dir.join("util.js"))
        );
        assert_eq!(
            resolve_relative(dir, "./util.js"),
            Some(dir.join("util.js"))
        );
        assert_eq!(
            resolve_relative(dir, "./lib"),
            Some(dir.join("lib/index.js"))
        );
        assert_eq!(resolve_relative(dir, "./missing"), None);
    }

    #[test]
    fn test_bundle_copies_graph_and_collects_packages() {
        let temp = TempDir::new().unwrap();
        let root = std::fs::canonicalize(temp.path()).unwrap();
        let app = root.join("packages/app");
        std::fs::create_dir_all(app.join("src")).unwrap();
        std::fs::write(
            app.join("src/main.js"),
            "import _ from 'lodash';\nimport { helper } from './helper';\n",
        )
        .unwrap();
        std::fs::write(
            app.join("src/helper.js"),
            "const express = require('express');\nexport const helper = 1;\n",
        )
        .unwrap();

        let out = root.join("out");
        std::fs::create_dir_all(&out).unwrap();

        let mut collected: Vec<(String, PathBuf)> = Vec::new();
        bundle(
            &BundlerParams {
                monorepo_root: &root,
                main_file: &app.join("src/main.js"),
                output_directory: &out,
            },
            &mut |package, context| collected.push((package.to_string(), context.to_path_buf())),
        )
        .unwrap();

        assert!(out.join("packages/app/src/main.js").is_file());
        assert!(out.join("packages/app/src/helper.js").is_file());
        let shim = std::fs::read_to_string(out.join("main.js")).unwrap();
        assert_eq!(
            shim,
            "module.exports = require('./packages/app/src/main.js');\n"
        );

        assert_eq!(
            collected,
            vec![
                ("lodash".to_string(), app.join("src")),
                ("express".to_string(), app.join("src")),
            ]
        );
    }

    #[test]
    fn test_bundle_unresolved_relative_import_fails() {
        let temp = TempDir::new().unwrap();
        let root = std::fs::canonicalize(temp.path()).unwrap();
        std::fs::write(root.join("main.js"), "require('./nope');\n").unwrap();
        let out = root.join("out");
        std::fs::create_dir_all(&out).unwrap();

        let result = bundle(
            &BundlerParams {
                monorepo_root: &root,
                main_file: &root.join("main.js"),
                output_directory: &out,
            },
            &mut |_, _| {},
        );
        assert!(matches!(
            result,
            Err(MonoshipError::UnresolvedImport { .. })
        ));
    }
}
