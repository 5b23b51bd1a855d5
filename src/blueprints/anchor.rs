//! Cargo anchors and multiplexed damage variants.
//!
//! An anchor is the relative transform of a named scene component on a
//! class. The cargo center is the base component's mesh bounds origin
//! carried through the base transform.

use glam::Vec3;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::sync::Arc;

use super::context::ResolveContext;
use super::graph::named_template;
use super::path::{resolve_class, ClassDef};
use super::probe::first_hit;
use crate::asset::mesh::{component_mesh, load_mesh_of_kind};
use crate::asset::{MeshAsset, MeshKind, PropertyBag, PropertyValue, ProviderError, UObject};
use crate::core::Transform;

/// One damage-threshold mesh stop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplexVariant {
    pub threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_path: Option<String>,
}

impl MultiplexVariant {
    /// Load the stop's static mesh
    pub fn load(&self, ctx: &ResolveContext<'_>) -> Result<Option<MeshAsset>, ProviderError> {
        match &self.mesh_path {
            Some(path) => load_mesh_of_kind(ctx.provider, path, MeshKind::Static),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoAnchor {
    pub class_path: String,
    pub base_component: String,
    pub transfer_component: String,
    pub base_transform: Transform,
    pub transfer_transform: Transform,
    pub mesh_origin: Vec3,
    pub cargo_center: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_mesh_path: Option<String>,
    pub multiplex_variants: Vec<MultiplexVariant>,
}

/// Locate a named scene component on `class` or one of its ancestors.
///
/// Lookup order per class: default-object property, construction tree and
/// override records, then package exports named `name` / `name_GEN_VARIABLE`.
pub fn find_component(
    ctx: &ResolveContext<'_>,
    class: &ClassDef,
    name: &str,
) -> Result<Option<Arc<UObject>>, ProviderError> {
    if let Some(component) = find_on_class(ctx, class, name)? {
        return Ok(Some(component));
    }
    first_hit(class.ancestors(ctx)?, |ancestor| find_on_class(ctx, &ancestor, name))
}

fn find_on_class(
    ctx: &ResolveContext<'_>,
    class: &ClassDef,
    name: &str,
) -> Result<Option<Arc<UObject>>, ProviderError> {
    if let Some(cdo) = &class.default_object {
        if let Some(component) = ctx.follow(cdo, name)? {
            return Ok(Some(component));
        }
    }
    if let Some(template) = named_template(ctx, class, name)? {
        return Ok(Some(template));
    }

    let Some(package) = class.package(ctx)? else {
        return Ok(None);
    };
    let generated = format!("{name}_GEN_VARIABLE");
    Ok(package
        .exports
        .iter()
        .find(|export| {
            export.name.eq_ignore_ascii_case(name) || export.name.eq_ignore_ascii_case(&generated)
        })
        .cloned())
}

/// Ordered (threshold, mesh) stops of the owner's multiplexed mesh, ascending
pub fn multiplex_variants(
    ctx: &ResolveContext<'_>,
    owner: &UObject,
) -> Result<Vec<MultiplexVariant>, ProviderError> {
    let property = &ctx.config.multiplex_property;
    let loaded;
    let multiplex: &PropertyBag = match owner.properties.get(property) {
        Some(PropertyValue::Struct(inline)) => &inline.properties,
        Some(value) => match value.as_object_path() {
            Some(path) => match ctx.load(path)? {
                Some(object) => {
                    loaded = object;
                    &loaded.properties
                }
                None => return Ok(Vec::new()),
            },
            None => return Ok(Vec::new()),
        },
        None => return Ok(Vec::new()),
    };

    let mut variants: Vec<MultiplexVariant> = multiplex
        .array("MeshStops")
        .unwrap_or(&[])
        .iter()
        .filter_map(PropertyValue::as_struct)
        .map(|stop| MultiplexVariant {
            threshold: stop.properties.float("Threshold").unwrap_or(0.0),
            mesh_path: stop.properties.object_path("StaticMesh").map(str::to_string),
        })
        .collect();
    variants.sort_by_key(|variant| OrderedFloat(variant.threshold));

    tracing::debug!(target: "cargo", owner = %owner.path, stops = variants.len(), "Read multiplexed mesh stops");
    Ok(variants)
}

/// Computes anchor transforms and cargo centers for classes
pub struct CargoAnchorResolver<'a> {
    ctx: ResolveContext<'a>,
}

impl<'a> CargoAnchorResolver<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self { ctx }
    }

    /// Anchor data for `class_path` using the configured default component names
    pub fn compute_default(&self, class_path: &str) -> Result<Option<CargoAnchor>, ProviderError> {
        let config = self.ctx.config;
        self.compute(class_path, &config.default_anchor, &config.default_transfer_component)
    }

    /// Anchor data for `class_path`; `None` when the class or either component is missing
    pub fn compute(
        &self,
        class_path: &str,
        base_component: &str,
        transfer_component: &str,
    ) -> Result<Option<CargoAnchor>, ProviderError> {
        let Some(class) = resolve_class(&self.ctx, class_path)? else {
            tracing::debug!(target: "cargo", class = class_path, "Class not found");
            return Ok(None);
        };
        self.compute_for_class(&class, base_component, transfer_component)
    }

    pub fn compute_for_class(
        &self,
        class: &ClassDef,
        base_component: &str,
        transfer_component: &str,
    ) -> Result<Option<CargoAnchor>, ProviderError> {
        let Some(base) = find_component(&self.ctx, class, base_component)? else {
            tracing::debug!(target: "cargo", class = %class.path, component = base_component, "Base component not found");
            return Ok(None);
        };
        let Some(transfer) = find_component(&self.ctx, class, transfer_component)? else {
            tracing::debug!(target: "cargo", class = %class.path, component = transfer_component, "Transfer component not found");
            return Ok(None);
        };

        let base_transform = base.properties.relative_transform();
        let transfer_transform = transfer.properties.relative_transform();

        let base_mesh = component_mesh(self.ctx.provider, &base, None)?;
        let mesh_origin = base_mesh
            .as_ref()
            .and_then(MeshAsset::bounds_origin)
            .unwrap_or(Vec3::ZERO);
        let cargo_center = base_transform.transform_point(mesh_origin);

        let multiplex_variants = match &class.default_object {
            Some(cdo) => multiplex_variants(&self.ctx, cdo)?,
            None => Vec::new(),
        };

        tracing::debug!(
            target: "cargo",
            class = %class.path,
            base = base_component,
            transfer = transfer_component,
            center = ?cargo_center,
            "Computed cargo anchor"
        );

        Ok(Some(CargoAnchor {
            class_path: class.path.clone(),
            base_component: base_component.to_string(),
            transfer_component: transfer_component.to_string(),
            base_transform,
            transfer_transform,
            mesh_origin,
            cargo_center,
            base_mesh_path: base_mesh.map(|mesh| mesh.path),
            multiplex_variants,
        }))
    }

    /// Relative transform of one named component, used for scene anchors
    pub fn anchor_transform(
        &self,
        class: &ClassDef,
        component: &str,
    ) -> Result<Option<Transform>, ProviderError> {
        Ok(find_component(&self.ctx, class, component)?
            .map(|component| component.properties.relative_transform()))
    }

    /// Mesh referenced by a named component, for anchor-based primary retries
    pub fn anchor_mesh(
        &self,
        class: &ClassDef,
        component: &str,
    ) -> Result<Option<MeshAsset>, ProviderError> {
        match find_component(&self.ctx, class, component)? {
            Some(component) => component_mesh(self.ctx.provider, &component, None),
            None => Ok(None),
        }
    }
}
