//! Scene assembly
//!
//! A [`SceneSpec`] names one root asset and any number of attachments.
//! [`SceneAssembler`] resolves it into a [`ResolvedScene`] the external
//! renderer consumes: meshes, world transforms and visual state.

pub mod assembler;
pub mod filters;
pub mod resolved;
pub mod spec;
pub mod visual;

pub use assembler::{attach_parent_world, single_root, SceneAssembler};
pub use filters::MaterialSlot;
pub use resolved::{AttachmentOrigin, ResolvedAttachment, ResolvedRoot, ResolvedScene};
pub use spec::{
    SceneAsset, SceneAssetProperties, SceneAttachment, SceneCamera, SceneFilters, SceneRender,
    SceneSpec, SceneStockpile, SceneTransformOffset,
};
pub use visual::{stockpile_options, StockpileOption, StockpileSelection, VisualProperties};
