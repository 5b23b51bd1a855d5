//! Read-only access to packages and their exports

use ahash::AHashMap;
use std::sync::Arc;
use thiserror::Error;

use super::object::{Package, UObject};
use crate::core::ObjectPath;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode package {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Content root not found: {0}")]
    MissingRoot(String),

    #[error("Invalid mount mapping {path}: {message}")]
    Mapping { path: String, message: String },
}

/// Resolves virtual paths to deserialized packages and objects.
///
/// Misses are `Ok(None)`; errors are reserved for I/O and decode failures.
pub trait AssetProvider: Send + Sync {
    /// Load a package by its virtual path (object part ignored)
    fn try_load_package(&self, path: &str) -> Result<Option<Arc<Package>>, ProviderError>;

    /// Every mounted package path
    fn virtual_paths(&self) -> Vec<String>;

    /// Load an object by `Package.Object` path.
    ///
    /// A path without an object part names the package's same-named export.
    fn load_object(&self, path: &str) -> Result<Option<Arc<UObject>>, ProviderError> {
        let path = ObjectPath::normalize(path);
        if path.is_empty() {
            return Ok(None);
        }
        let object_name = path.object_name().unwrap_or_else(|| path.base_name());
        let Some(package) = self.try_load_package(path.package())? else {
            return Ok(None);
        };
        Ok(package.export(object_name).cloned())
    }
}

/// Mounted package paths containing `term`, case-insensitive, at most `limit`
pub fn search_paths(provider: &dyn AssetProvider, term: &str, limit: usize) -> Vec<String> {
    let needle = term.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<String> = provider
        .virtual_paths()
        .into_iter()
        .filter(|path| path.to_ascii_lowercase().contains(&needle))
        .collect();
    hits.sort_by_key(|path| path.to_ascii_lowercase());
    hits.truncate(limit);
    hits
}

/// Packages held in memory, keyed case-insensitively by virtual path
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    packages: AHashMap<String, Arc<Package>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: Package) {
        self.packages
            .insert(package.path.to_ascii_lowercase(), Arc::new(package));
    }

    /// Add a package built from its exports
    pub fn add_package(&mut self, path: &str, exports: Vec<UObject>) {
        self.insert(Package::new(path, exports));
    }

    /// Add a package from its JSON document
    pub fn add_json(&mut self, path: &str, text: &str) -> Result<(), ProviderError> {
        let package = Package::from_json(path, text).map_err(|e| ProviderError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        self.insert(package);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl AssetProvider for MemoryProvider {
    fn try_load_package(&self, path: &str) -> Result<Option<Arc<Package>>, ProviderError> {
        let path = ObjectPath::normalize(path);
        Ok(self
            .packages
            .get(&path.package().to_ascii_lowercase())
            .cloned())
    }

    fn virtual_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.packages.values().map(|p| p.path.clone()).collect();
        paths.sort();
        paths
    }
}
