//! Static color variants read straight off a default object

use serde::Serialize;

use crate::asset::UObject;
use crate::core::ResolverConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub index: usize,
    /// Linear RGBA
    pub color: [f32; 4],
    /// sRGB hex, `RRGGBB` when opaque else `RRGGBBAA`
    pub hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn linear_to_srgb(channel: f32) -> f32 {
    let c = channel.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// 8-bit sRGB color for a linear color; alpha stays linear
pub fn to_srgb8(color: [f32; 4]) -> [u8; 4] {
    let [r, g, b, a] = color;
    [
        quantize(linear_to_srgb(r)),
        quantize(linear_to_srgb(g)),
        quantize(linear_to_srgb(b)),
        quantize(a),
    ]
}

pub fn srgb_hex(color: [f32; 4]) -> String {
    let [r, g, b, a] = to_srgb8(color);
    if a == u8::MAX {
        format!("{r:02X}{g:02X}{b:02X}")
    } else {
        format!("{r:02X}{g:02X}{b:02X}{a:02X}")
    }
}

/// Read the color array and its optional name array, 1:1 by index.
///
/// Names are used only when the name array covers every color.
pub fn extract_color_variants(default_object: &UObject, config: &ResolverConfig) -> Vec<ColorVariant> {
    let colors: Vec<[f32; 4]> = default_object
        .properties
        .array(&config.color_array_property)
        .unwrap_or(&[])
        .iter()
        .filter_map(|value| value.as_linear_color())
        .collect();

    let names: Option<Vec<Option<String>>> = default_object
        .properties
        .array(&config.color_names_property)
        .filter(|names| names.len() >= colors.len())
        .map(|names| {
            names
                .iter()
                .map(|name| name.as_text().map(str::to_string))
                .collect()
        });

    let variants: Vec<ColorVariant> = colors
        .into_iter()
        .enumerate()
        .map(|(index, color)| ColorVariant {
            index,
            color,
            hex: srgb_hex(color),
            name: names
                .as_ref()
                .and_then(|names| names.get(index).cloned().flatten())
                .filter(|name| !name.trim().is_empty()),
        })
        .collect();

    tracing::debug!(target: "variants", object = %default_object.path, count = variants.len(), "Extracted color variants");
    variants
}
