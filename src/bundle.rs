//! Bundling of component implementations.
//!
//! The analyzer hands every pattern's implementation to a [`Bundler`] once,
//! at the end of a run. The built-in [`ModuleMapBundler`] emits an ES module
//! that maps pattern ids to lazy imports.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::filesystem::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    /// Pattern id.
    pub id: String,
    /// Compiled implementation of the pattern.
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("implementation {path} for pattern {id} does not exist")]
    MissingImplementation { id: String, path: PathBuf },

    #[error("{0}")]
    Failed(String),
}

pub trait Bundler: Send + Sync {
    fn bundle(&self, fs: &dyn FileSystem, entries: &[BundleEntry]) -> Result<String, BundleError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleMapBundler;

impl Bundler for ModuleMapBundler {
    fn bundle(&self, fs: &dyn FileSystem, entries: &[BundleEntry]) -> Result<String, BundleError> {
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(entries.len());

        for entry in entries {
            if !fs.exists(&entry.path) {
                return Err(BundleError::MissingImplementation {
                    id: entry.id.clone(),
                    path: entry.path.clone(),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                continue;
            }
            lines.push(format!(
                "  {}: () => import({}),",
                quote(&entry.id),
                quote(&entry.path.to_string_lossy())
            ));
        }

        Ok(format!("export const components = {{\n{}\n}};\n", lines.join("\n")))
    }
}

/// JSON string literal, which is also a valid JS string literal.
fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
