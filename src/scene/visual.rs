//! Per-asset visual properties and stockpile selection

use serde::Serialize;

use super::spec::SceneAssetProperties;
use crate::asset::{PropertyValue, ProviderError, UObject};
use crate::blueprints::{HpState, ResolveContext};
use crate::variants::OverlayMaskData;

/// Visual state handed to the renderer; explicit scene values win over
/// overlay-derived defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualProperties {
    pub hp_state: HpState,
    pub mud_level: f32,
    pub snow_level: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diffuse_override: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_material_index: Option<usize>,
}

impl VisualProperties {
    pub fn layered(
        properties: &SceneAssetProperties,
        overlay: &OverlayMaskData,
        diffuse_override: Option<[f32; 4]>,
    ) -> Self {
        let mud = properties.mud_level.or(overlay.mud_strength).unwrap_or(0.0);
        let snow = properties.snow_level.or(overlay.snow_strength).unwrap_or(0.0);
        Self {
            hp_state: properties.hp(),
            mud_level: mud.clamp(0.0, 1.0),
            snow_level: snow.clamp(0.0, 1.0),
            diffuse_override,
            color_material_index: properties.color_material_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockpileOption {
    pub item: String,
    pub amount: i64,
}

/// Requested stockpile contents plus what the class can hold
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockpileSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<StockpileOption>,
}

impl StockpileSelection {
    pub fn new(properties: &SceneAssetProperties, options: Vec<StockpileOption>) -> Option<Self> {
        let requested = properties.stockpile.as_ref();
        let selection = Self {
            item: requested
                .and_then(|s| s.item.clone())
                .filter(|item| !item.trim().is_empty()),
            quantity: requested.and_then(|s| s.quantity),
            options,
        };
        (selection != Self::default()).then_some(selection)
    }
}

/// Stockpile entries (`Item`, `Amount`) of the default object's stockpile component
pub fn stockpile_options(
    ctx: &ResolveContext<'_>,
    default_object: &UObject,
) -> Result<Vec<StockpileOption>, ProviderError> {
    let config = ctx.config;
    let component;
    let properties = match default_object.properties.get(&config.stockpile_component_property) {
        Some(PropertyValue::Struct(inline)) => &inline.properties,
        Some(_) => match ctx.follow(default_object, &config.stockpile_component_property)? {
            Some(loaded) => {
                component = loaded;
                &component.properties
            }
            None => return Ok(Vec::new()),
        },
        None => return Ok(Vec::new()),
    };

    let options: Vec<StockpileOption> = properties
        .array(&config.stockpile_entries_property)
        .unwrap_or(&[])
        .iter()
        .filter_map(PropertyValue::as_struct)
        .filter_map(|entry| {
            let item = entry.properties.get("Item")?;
            let item = item.as_object_path().or_else(|| item.as_text())?;
            Some(StockpileOption {
                item: item.to_string(),
                amount: entry.properties.int("Amount").unwrap_or(0),
            })
        })
        .collect();

    tracing::debug!(target: "scene", object = %default_object.path, options = options.len(), "Read stockpile options");
    Ok(options)
}
