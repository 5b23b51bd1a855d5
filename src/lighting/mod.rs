//! World lighting data for the external renderer

pub mod preset;

pub use preset::{extract_lighting_preset, DirectionalLight, LightingPreset, SkyLight};
