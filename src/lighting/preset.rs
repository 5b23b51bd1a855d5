//! Static lighting preset of a world: directional lights and the first sky light
//! found among the persistent level's actors.

use glam::Vec3;
use serde::Serialize;
use std::sync::Arc;

use crate::asset::{ProviderError, UObject};
use crate::blueprints::{first_hit, ResolveContext};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalLight {
    /// Owning actor name
    pub name: String,
    pub location: Vec3,
    /// Pitch, yaw, roll in degrees
    pub rotation: [f32; 3],
    pub intensity: f32,
    pub use_temperature: bool,
    pub temperature: f32,
    /// Linear RGBA
    pub color: [f32; 4],
    pub used_as_atmosphere_sun: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_function_scale: Option<Vec3>,
    pub bloom_scale: f32,
}

impl DirectionalLight {
    fn from_component(name: &str, component: &UObject) -> Self {
        let props = &component.properties;
        let transform = props.relative_transform();
        Self {
            name: name.to_string(),
            location: transform.translation,
            rotation: transform.rotator(),
            intensity: props.float("Intensity").unwrap_or(1.0),
            use_temperature: props.boolean("bUseTemperature").unwrap_or(false),
            temperature: props.float("Temperature").unwrap_or(6500.0),
            color: props.linear_color("LightColor").unwrap_or(WHITE),
            used_as_atmosphere_sun: props.boolean("bUsedAsAtmosphereSunLight").unwrap_or(false),
            light_function: props.object_path("LightFunctionMaterial").map(str::to_string),
            light_function_scale: props.vector("LightFunctionScale"),
            bloom_scale: props.float("BloomScale").unwrap_or(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkyLight {
    pub name: String,
    pub location: Vec3,
    pub intensity: f32,
    pub lower_hemisphere_is_black: bool,
    pub sky_distance_threshold: f32,
    pub occlusion_max_distance: f32,
    pub occlusion_exponent: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion_tint: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cubemap: Option<String>,
}

impl SkyLight {
    fn from_component(name: &str, component: &UObject) -> Self {
        let props = &component.properties;
        Self {
            name: name.to_string(),
            location: props.vector("RelativeLocation").unwrap_or(Vec3::ZERO),
            intensity: props.float("Intensity").unwrap_or(1.0),
            lower_hemisphere_is_black: props.boolean("bLowerHemisphereIsBlack").unwrap_or(true),
            sky_distance_threshold: props.float("SkyDistanceThreshold").unwrap_or(150_000.0),
            occlusion_max_distance: props.float("OcclusionMaxDistance").unwrap_or(0.0),
            occlusion_exponent: props.float("OcclusionExponent").unwrap_or(1.0),
            occlusion_tint: props.linear_color("OcclusionTint"),
            cubemap: props.object_path("Cubemap").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingPreset {
    pub world_path: String,
    pub directional_lights: Vec<DirectionalLight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sky_light: Option<SkyLight>,
}

/// Light component of an actor, trying `properties` in order
fn light_component(
    ctx: &ResolveContext<'_>,
    actor: &UObject,
    properties: [&str; 2],
) -> Result<Option<Arc<UObject>>, ProviderError> {
    first_hit(properties, |property| ctx.follow(actor, property))
}

/// Read the lighting preset of the world at `world_path`.
///
/// `None` when the world or its persistent level is missing, or when the
/// level holds neither a directional nor a sky light.
pub fn extract_lighting_preset(
    ctx: &ResolveContext<'_>,
    world_path: &str,
) -> Result<Option<LightingPreset>, ProviderError> {
    let Some(world) = ctx.load(world_path)? else {
        tracing::debug!(target: "lighting", world = world_path, "World not found");
        return Ok(None);
    };
    let Some(level) = ctx.follow(&world, "PersistentLevel")? else {
        tracing::debug!(target: "lighting", world = %world.path, "World has no persistent level");
        return Ok(None);
    };

    let mut directional_lights = Vec::new();
    let mut sky_light = None;
    for actor in ctx.follow_all(&level, "Actors")? {
        if actor.class.eq_ignore_ascii_case("DirectionalLight") {
            if let Some(component) = light_component(ctx, &actor, ["RootComponent", "LightComponent"])? {
                directional_lights.push(DirectionalLight::from_component(&actor.name, &component));
            }
        } else if actor.class.eq_ignore_ascii_case("SkyLight") && sky_light.is_none() {
            if let Some(component) = light_component(ctx, &actor, ["LightComponent", "RootComponent"])? {
                sky_light = Some(SkyLight::from_component(&actor.name, &component));
            }
        }
    }

    if directional_lights.is_empty() && sky_light.is_none() {
        tracing::debug!(target: "lighting", world = %world.path, "No lights in persistent level");
        return Ok(None);
    }
    tracing::info!(
        target: "lighting",
        world = %world.path,
        directional = directional_lights.len(),
        sky = sky_light.is_some(),
        "Extracted lighting preset"
    );
    Ok(Some(LightingPreset {
        world_path: world_path.to_string(),
        directional_lights,
        sky_light,
    }))
}
