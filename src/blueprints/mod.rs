//! Blueprint resolution
//!
//! Turns a raw class path into meshes: path resolution, component graph
//! flattening, primary mesh selection, anchors and damage variants.

pub mod anchor;
pub mod collect;
pub mod context;
pub mod graph;
pub mod path;
pub mod primary;
pub mod probe;
pub mod variant;

pub use anchor::{CargoAnchor, CargoAnchorResolver, MultiplexVariant};
pub use context::ResolveContext;
pub use graph::{asset_dependencies, ComponentGraphBuilder, ComponentSource, ResolvedComponent};
pub use path::{resolve_class, ClassDef};
pub use primary::{PrimaryMeshSelector, PrimarySelection, PrimarySource};
pub use probe::first_hit;
pub use variant::{select_variant, HpState};
