//! Blueprint Scene - resolves game blueprint classes into renderable scenes
//!
//! Raw asset paths go in; flattened component graphs, primary meshes, cargo
//! anchors, damage variants, world lighting presets and fully placed scenes
//! come out. Asset access is behind [`asset::AssetProvider`], so everything
//! runs against in-memory packages as well as a mounted content root.

pub mod asset;
pub mod blueprints;
pub mod core;
pub mod lighting;
pub mod scene;
pub mod variants;
