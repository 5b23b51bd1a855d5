//! Property scans for cosmetic variants: weather overlays and paint colors

pub mod colors;
pub mod overlay;

pub use colors::{extract_color_variants, ColorVariant};
pub use overlay::{overlay_parameters_for, OverlayMaskData, OverlayParameter, OverlayScanner, OverlayValue};
