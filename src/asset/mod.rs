//! Asset layer: object model, providers and mesh helpers
//!
//! Everything above this module sees assets only through [`AssetProvider`],
//! so resolution runs unchanged against in-memory fixtures or a mounted
//! content root.

pub mod content_root;
pub mod mesh;
pub mod object;
pub mod provider;

pub use content_root::ContentRoot;
pub use mesh::{MeshAsset, MeshKind};
pub use object::{ComponentKind, Package, PropertyBag, PropertyValue, StructValue, UObject};
pub use provider::{search_paths, AssetProvider, MemoryProvider, ProviderError};
