//! Per-run resolution context

use std::sync::Arc;

use crate::asset::{AssetProvider, ProviderError, UObject};
use crate::core::ResolverConfig;

/// Read-only view shared by every resolver in one run.
///
/// Holds no mutable state: visited sets and depth counters live in the
/// functions that need them, so independent runs can share a provider.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub provider: &'a dyn AssetProvider,
    pub config: &'a ResolverConfig,
}

impl<'a> ResolveContext<'a> {
    pub fn new(provider: &'a dyn AssetProvider, config: &'a ResolverConfig) -> Self {
        Self { provider, config }
    }

    pub fn load(&self, path: &str) -> Result<Option<Arc<UObject>>, ProviderError> {
        self.provider.load_object(path)
    }

    /// Load the object referenced by `property` on `owner`, if any
    pub fn follow(&self, owner: &UObject, property: &str) -> Result<Option<Arc<UObject>>, ProviderError> {
        match owner.properties.object_path(property) {
            Some(path) => self.load(path),
            None => Ok(None),
        }
    }

    /// Load every object referenced by an array property on `owner`
    pub fn follow_all(&self, owner: &UObject, property: &str) -> Result<Vec<Arc<UObject>>, ProviderError> {
        let mut objects = Vec::new();
        for entry in owner.properties.array(property).unwrap_or(&[]) {
            if let Some(path) = entry.as_object_path() {
                objects.extend(self.load(path)?);
            }
        }
        Ok(objects)
    }
}
