//! Mesh assets: loading, bounds, sockets and material overrides

use glam::{Quat, Vec3};
use serde::Serialize;
use std::sync::Arc;

use super::object::{ComponentKind, PropertyBag, PropertyValue, UObject};
use super::provider::{AssetProvider, ProviderError};
use crate::core::{ObjectPath, Transform};

/// Bounds properties in order of preference: computed, extended, imported
const BOUNDS_PROPERTIES: [&str; 3] = ["Bounds", "ExtendedBounds", "ImportedBounds"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Static,
    Skeletal,
}

/// A loaded static or skeletal mesh
#[derive(Debug, Clone, Serialize)]
pub struct MeshAsset {
    pub path: String,
    pub kind: MeshKind,
    #[serde(skip)]
    pub object: Arc<UObject>,
}

impl PartialEq for MeshAsset {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.path.eq_ignore_ascii_case(&other.path)
    }
}

impl MeshAsset {
    pub fn from_object(object: Arc<UObject>) -> Option<Self> {
        let kind = if object.is_skeletal_mesh() {
            MeshKind::Skeletal
        } else if object.is_static_mesh() {
            MeshKind::Static
        } else {
            return None;
        };
        Some(Self {
            path: object.path.clone(),
            kind,
            object,
        })
    }

    pub fn is_skeletal(&self) -> bool {
        self.kind == MeshKind::Skeletal
    }

    fn bounds(&self) -> Option<&PropertyBag> {
        BOUNDS_PROPERTIES
            .iter()
            .find_map(|name| self.object.properties.struct_value(name))
            .map(|s| &s.properties)
    }

    /// Bounding-sphere radius, zero when the mesh carries no bounds
    pub fn bounds_radius(&self) -> f32 {
        self.bounds()
            .and_then(|b| b.float("SphereRadius"))
            .unwrap_or(0.0)
    }

    /// Bounds origin in mesh-local space
    pub fn bounds_origin(&self) -> Option<Vec3> {
        self.bounds().map(|b| b.vector("Origin").unwrap_or(Vec3::ZERO))
    }

    /// Socket transform by case-insensitive name; sockets carry no scale
    pub fn socket(
        &self,
        provider: &dyn AssetProvider,
        name: &str,
    ) -> Result<Option<Transform>, ProviderError> {
        let Some(sockets) = self.object.properties.array("Sockets") else {
            return Ok(None);
        };

        for entry in sockets {
            let loaded;
            let props = match entry {
                PropertyValue::Struct(s) => &s.properties,
                other => match other.as_object_path() {
                    Some(path) => match provider.load_object(path)? {
                        Some(object) => {
                            loaded = object;
                            &loaded.properties
                        }
                        None => continue,
                    },
                    None => continue,
                },
            };

            if props
                .text("SocketName")
                .is_some_and(|socket| socket.eq_ignore_ascii_case(name))
            {
                return Ok(Some(Transform::new(
                    props.vector("RelativeLocation").unwrap_or(Vec3::ZERO),
                    props.rotation("RelativeRotation").unwrap_or(Quat::IDENTITY),
                    Vec3::ONE,
                )));
            }
        }
        Ok(None)
    }

    /// Names of every socket on the mesh, for listings
    pub fn socket_names(&self, provider: &dyn AssetProvider) -> Result<Vec<String>, ProviderError> {
        let mut names = Vec::new();
        for entry in self.object.properties.array("Sockets").unwrap_or(&[]) {
            let name = match entry {
                PropertyValue::Struct(s) => s.properties.text("SocketName").map(str::to_string),
                other => match other.as_object_path() {
                    Some(path) => provider
                        .load_object(path)?
                        .and_then(|o| o.properties.text("SocketName").map(str::to_string)),
                    None => None,
                },
            };
            names.extend(name);
        }
        Ok(names)
    }
}

/// Path candidates for a mesh reference: as given, then `Package.Base`
pub fn mesh_candidates(raw: &str) -> Vec<String> {
    let path = ObjectPath::normalize(raw);
    if path.is_empty() {
        return Vec::new();
    }
    let mut candidates = vec![path.as_str().to_string()];
    if !path.has_object_part() {
        candidates.push(path.to_object_path());
    }
    candidates
}

/// Load any mesh (skeletal or static) from a raw reference
pub fn load_mesh(provider: &dyn AssetProvider, raw: &str) -> Result<Option<MeshAsset>, ProviderError> {
    for candidate in mesh_candidates(raw) {
        if let Some(mesh) = provider.load_object(&candidate)?.and_then(MeshAsset::from_object) {
            return Ok(Some(mesh));
        }
    }
    Ok(None)
}

/// Load a mesh only if it is of the requested kind
pub fn load_mesh_of_kind(
    provider: &dyn AssetProvider,
    raw: &str,
    kind: MeshKind,
) -> Result<Option<MeshAsset>, ProviderError> {
    Ok(load_mesh(provider, raw)?.filter(|mesh| mesh.kind == kind))
}

/// Load a mesh trying skeletal before static, as socket lookups do
pub fn load_mesh_skeletal_first(
    provider: &dyn AssetProvider,
    raw: &str,
) -> Result<Option<MeshAsset>, ProviderError> {
    if let Some(mesh) = load_mesh_of_kind(provider, raw, MeshKind::Skeletal)? {
        return Ok(Some(mesh));
    }
    load_mesh_of_kind(provider, raw, MeshKind::Static)
}

/// Team preference parsed from a scene property: `0|team0|colonial`, `1|team1|warden`
pub fn parse_team(value: Option<&str>) -> Option<u8> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "0" | "team0" | "colonial" => Some(0),
        "1" | "team1" | "warden" => Some(1),
        _ => None,
    }
}

/// Mesh reference properties of a component, in lookup order
fn mesh_reference_properties(kind: ComponentKind, team: Option<u8>) -> Vec<&'static str> {
    match kind {
        ComponentKind::SkeletalMesh => vec!["SkeletalMesh", "SkinnedAsset"],
        ComponentKind::FlagMesh => {
            let mut names = vec!["StaticMesh"];
            match team {
                Some(0) => names.extend(["Team0Mesh", "Team1Mesh"]),
                Some(1) => names.extend(["Team1Mesh", "Team0Mesh"]),
                _ => names.extend(["Team0Mesh", "Team1Mesh"]),
            }
            names
        }
        _ => vec!["StaticMesh", "SkeletalMesh"],
    }
}

/// Mesh referenced by a component, following its `Template` archetype when unset
pub fn component_mesh(
    provider: &dyn AssetProvider,
    component: &UObject,
    team: Option<u8>,
) -> Result<Option<MeshAsset>, ProviderError> {
    let kind = component.component_kind();
    let template = template_of(provider, component)?;
    for owner in std::iter::once(component).chain(template.as_deref()) {
        for name in mesh_reference_properties(kind, team) {
            if let Some(path) = owner.properties.object_path(name) {
                if let Some(mesh) = load_mesh(provider, path)? {
                    return Ok(Some(mesh));
                }
                tracing::debug!(target: "provider", component = %component.name, property = name, path, "Mesh reference did not load");
            }
        }
    }
    Ok(None)
}

fn template_of(
    provider: &dyn AssetProvider,
    component: &UObject,
) -> Result<Option<Arc<UObject>>, ProviderError> {
    match component.properties.object_path("Template") {
        Some(path) => provider.load_object(path),
        None => Ok(None),
    }
}

/// Material override slots: `OverrideMaterials` preferred, `Materials` fallback.
/// Null slots are kept so indices line up with the mesh's sections.
pub fn material_overrides(component: &UObject) -> Option<Vec<Option<String>>> {
    ["OverrideMaterials", "Materials"].iter().find_map(|name| {
        let slots = component.properties.array(name)?;
        if slots.is_empty() {
            return None;
        }
        Some(
            slots
                .iter()
                .map(|slot| slot.as_object_path().map(str::to_string))
                .collect(),
        )
    })
}
