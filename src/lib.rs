//! Monoship - monorepo application packager
//!
//! Packages a single Node.js entry point inside a multi-package monorepo
//! into a self-contained deployable directory: the entry point's source
//! graph is copied, the exact third-party package set is computed from the
//! surrounding `package.json` files, and the `yarn.lock` that makes a plain
//! install deterministic is shipped alongside when one exists.
//!
//! The heart of the crate is [`collector`]: it accumulates "package X was
//! referenced from directory Y" observations during bundling and resolves
//! them in one pass into a five-way classification covering undeclared
//! packages, version conflicts and reproducibility.

pub mod bundler;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod manifest;
pub mod process;
