//! Resolved scene output, serialized for the external renderer

use serde::Serialize;

use super::filters::MaterialSlot;
use super::spec::{SceneCamera, SceneRender};
use super::visual::{StockpileSelection, VisualProperties};
use crate::asset::MeshKind;
use crate::blueprints::PrimarySource;
use crate::core::Transform;
use crate::variants::OverlayMaskData;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedScene {
    pub root: ResolvedRoot,
    pub attachments: Vec<ResolvedAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<SceneCamera>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<SceneRender>,
}

impl ResolvedScene {
    pub fn attachments_of<'s>(&'s self, id: &'s str) -> impl Iterator<Item = &'s ResolvedAttachment> {
        self.attachments.iter().filter(move |attachment| attachment.id == id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoot {
    pub id: String,
    pub mesh_path: String,
    pub mesh_kind: MeshKind,
    pub primary_source: PrimarySource,
    /// Placement of the primary component in class space
    pub transform: Transform,
    pub visual: VisualProperties,
    pub source_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_path: Option<String>,
    #[serde(skip_serializing_if = "OverlayMaskData::is_empty")]
    pub overlay: OverlayMaskData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<MaterialSlot>,
}

/// How an attachment entered the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentOrigin {
    /// Listed in the scene description
    Explicit,
    /// Another mesh component of the root's class graph
    RootComponent,
    /// Well-known default-object slot of the root class
    DefaultSlot,
    /// Flag component export of the root class
    FlagComponent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAttachment {
    /// Scene asset id for explicit attachments, `root:component` otherwise
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub origin: AttachmentOrigin,
    pub mesh_path: String,
    pub mesh_kind: MeshKind,
    pub transform: Transform,
    pub visual: VisualProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stockpile: Option<StockpileSelection>,
    #[serde(skip_serializing_if = "OverlayMaskData::is_empty")]
    pub overlay: OverlayMaskData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<MaterialSlot>,
}
