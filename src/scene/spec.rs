//! Scene description input (camelCase JSON)

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::blueprints::HpState;
use crate::core::{ResolveError, Transform};

/// One root asset plus attachments, with camera and render hints for the renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    #[serde(default)]
    pub assets: Vec<SceneAsset>,
    #[serde(default)]
    pub camera: Option<SceneCamera>,
    #[serde(default)]
    pub render: Option<SceneRender>,
    #[serde(default)]
    pub filters: Option<SceneFilters>,
}

impl SceneSpec {
    /// Parse a scene; malformed JSON is an input error
    pub fn from_json(text: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(text).map_err(|e| ResolveError::Input(format!("malformed scene: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Assets without a parent reference; a blank `parentId` counts as none
    pub fn roots(&self) -> impl Iterator<Item = &SceneAsset> {
        self.assets.iter().filter(|asset| asset.parent_id().is_none())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAsset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub metadata_path: Option<String>,
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub properties: SceneAssetProperties,
    #[serde(default)]
    pub attach_to: Option<SceneAttachment>,
}

impl SceneAsset {
    /// Trimmed parent id, if the asset names one
    pub fn parent_id(&self) -> Option<&str> {
        self.attach_to
            .as_ref()
            .map(|attach| attach.parent_id.trim())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAttachment {
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub anchor: Option<String>,
    /// Named socket on the parent's mesh
    #[serde(default)]
    pub socket: Option<String>,
    #[serde(default)]
    pub offset: Option<SceneTransformOffset>,
}

/// Explicit offset: translation, Euler rotation (pitch, yaw, roll degrees), scale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTransformOffset {
    #[serde(default)]
    pub translation: Option<[f32; 3]>,
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub scale: Option<[f32; 3]>,
}

impl SceneTransformOffset {
    pub fn to_transform(&self) -> Transform {
        Transform::from_rotator(
            self.translation.map(Vec3::from).unwrap_or(Vec3::ZERO),
            self.rotation.unwrap_or([0.0; 3]),
            self.scale.map(Vec3::from).unwrap_or(Vec3::ONE),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAssetProperties {
    #[serde(default)]
    pub hp_state: Option<String>,
    #[serde(default)]
    pub color_variant: Option<usize>,
    #[serde(default)]
    pub color_material_index: Option<usize>,
    #[serde(default)]
    pub mud_level: Option<f32>,
    #[serde(default)]
    pub snow_level: Option<f32>,
    #[serde(default)]
    pub stockpile: Option<SceneStockpile>,
    /// `0|team0|colonial` or `1|team1|warden`
    #[serde(default)]
    pub team: Option<String>,
}

impl SceneAssetProperties {
    pub fn hp(&self) -> HpState {
        HpState::parse(self.hp_state.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneStockpile {
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneCamera {
    pub pitch: Option<f32>,
    pub yaw: Option<f32>,
    pub orbit: Option<f32>,
    pub angles: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub transparent: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRender {
    pub output: Option<String>,
}

/// Path and tag filters for implicit attachments, material visibility tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFilters {
    #[serde(default)]
    pub exclude_path_contains: Vec<String>,
    #[serde(default)]
    pub include_path_contains: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub show_materials: Vec<String>,
    #[serde(default)]
    pub hide_materials: Vec<String>,
}
