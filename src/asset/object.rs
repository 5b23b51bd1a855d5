//! Deserialized asset object model
//!
//! Packages are JSON documents holding a list of exports. Each export is a
//! [`UObject`] with a class name and an ordered property bag. Values are
//! externally tagged:
//!
//! ```json
//! { "name": "Body", "class": "StaticMeshComponent", "properties": {
//!     "StaticMesh": { "Object": "/Game/Meshes/Truck.Truck" },
//!     "RelativeLocation": { "Vector": [0.0, 0.0, 40.0] } } }
//! ```
//!
//! Object references without a `/` name an export of the same package and
//! are qualified when the package is built.

use glam::{Quat, Vec3};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::core::transform::rotator_to_quat;
use crate::core::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    Name(String),
    Str(String),
    Object(Option<String>),
    SoftObject(String),
    Vector([f32; 3]),
    /// Pitch, yaw, roll in degrees
    Rotator([f32; 3]),
    /// x, y, z, w
    Quat([f32; 4]),
    LinearColor([f32; 4]),
    /// r, g, b, a
    Color([u8; 4]),
    Struct(StructValue),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Referenced object path for hard and soft references; `None` for null or blank
    pub fn as_object_path(&self) -> Option<&str> {
        match self {
            PropertyValue::Object(Some(path)) | PropertyValue::SoftObject(path) => {
                let trimmed = path.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Double(v) => Some(*v as f32),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Float(v) => Some(*v as i64),
            PropertyValue::Double(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Name(s) | PropertyValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vector(v) => Some(Vec3::from(*v)),
            _ => None,
        }
    }

    /// Rotation from either a rotator or a quaternion value
    pub fn as_rotation(&self) -> Option<Quat> {
        match self {
            PropertyValue::Rotator(r) => Some(rotator_to_quat(*r)),
            PropertyValue::Quat([x, y, z, w]) => Some(Quat::from_xyzw(*x, *y, *z, *w)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_linear_color(&self) -> Option<[f32; 4]> {
        match self {
            PropertyValue::LinearColor(c) => Some(*c),
            PropertyValue::Color([r, g, b, a]) => Some([
                *r as f32 / 255.0,
                *g as f32 / 255.0,
                *b as f32 / 255.0,
                *a as f32 / 255.0,
            ]),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            PropertyValue::Struct(s) => Some(s),
            _ => None,
        }
    }
}

/// Nested struct value (bounds, transforms, stockpile entries, ...)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructValue {
    #[serde(rename = "type", default)]
    pub struct_type: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

/// Ordered property list with case-insensitive lookup by name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyBag(Vec<(String, PropertyValue)>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an existing property (matched case-insensitively) or append a new one
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PropertyValue)> {
        self.0.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn object_path(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_object_path)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(PropertyValue::as_f32)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropertyValue::as_i64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_text)
    }

    pub fn vector(&self, name: &str) -> Option<Vec3> {
        self.get(name).and_then(PropertyValue::as_vector)
    }

    pub fn rotation(&self, name: &str) -> Option<Quat> {
        self.get(name).and_then(PropertyValue::as_rotation)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    /// Linear RGBA; 8-bit colors are scaled to 0..1
    pub fn linear_color(&self, name: &str) -> Option<[f32; 4]> {
        self.get(name).and_then(PropertyValue::as_linear_color)
    }

    pub fn array(&self, name: &str) -> Option<&[PropertyValue]> {
        self.get(name).and_then(PropertyValue::as_array)
    }

    pub fn struct_value(&self, name: &str) -> Option<&StructValue> {
        self.get(name).and_then(PropertyValue::as_struct)
    }

    /// Relative transform stored as `RelativeLocation` / `RelativeRotation` / `RelativeScale3D`
    pub fn relative_transform(&self) -> Transform {
        Transform::new(
            self.vector("RelativeLocation").unwrap_or(Vec3::ZERO),
            self.rotation("RelativeRotation").unwrap_or(Quat::IDENTITY),
            self.vector("RelativeScale3D").unwrap_or(Vec3::ONE),
        )
    }

    /// Transform stored as `Translation` / `Rotation` / `Scale3D` (instance data)
    pub fn transform_fields(&self) -> Transform {
        Transform::new(
            self.vector("Translation").unwrap_or(Vec3::ZERO),
            self.rotation("Rotation").unwrap_or(Quat::IDENTITY),
            self.vector("Scale3D").unwrap_or(Vec3::ONE),
        )
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct PropertyBagVisitor;

impl<'de> Visitor<'de> for PropertyBagVisitor {
    type Value = PropertyBag;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of property names to tagged values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PropertyBag, A::Error> {
        let mut bag = PropertyBag(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((name, value)) = access.next_entry::<String, PropertyValue>()? {
            bag.insert(name, value);
        }
        Ok(bag)
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PropertyBagVisitor)
    }
}

/// What a component template is able to contribute to a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    StaticMesh,
    InstancedStaticMesh,
    SkeletalMesh,
    ChildActor,
    /// Static-mesh-like component carrying per-team mesh choices
    FlagMesh,
    /// Transform-only scene component
    Scene,
    Other,
}

impl ComponentKind {
    pub fn from_class(class: &str) -> Self {
        let class = class.to_ascii_lowercase();
        if class.contains("instancedstaticmeshcomponent") {
            ComponentKind::InstancedStaticMesh
        } else if class.contains("flagmeshcomponent") {
            ComponentKind::FlagMesh
        } else if class.ends_with("staticmeshcomponent") {
            ComponentKind::StaticMesh
        } else if class.ends_with("skeletalmeshcomponent") {
            ComponentKind::SkeletalMesh
        } else if class.ends_with("childactorcomponent") {
            ComponentKind::ChildActor
        } else if class.ends_with("component") {
            ComponentKind::Scene
        } else {
            ComponentKind::Other
        }
    }

    pub fn is_mesh_bearing(self) -> bool {
        matches!(
            self,
            ComponentKind::StaticMesh
                | ComponentKind::InstancedStaticMesh
                | ComponentKind::SkeletalMesh
                | ComponentKind::FlagMesh
        )
    }
}

/// One export of a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UObject {
    pub name: String,
    pub class: String,
    /// Full `Package.Object` path, filled in when the package is built
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl UObject {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            path: String::new(),
            properties: PropertyBag::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn is_static_mesh(&self) -> bool {
        self.class.eq_ignore_ascii_case("StaticMesh")
    }

    pub fn is_skeletal_mesh(&self) -> bool {
        self.class.eq_ignore_ascii_case("SkeletalMesh")
    }

    pub fn is_mesh(&self) -> bool {
        self.is_static_mesh() || self.is_skeletal_mesh()
    }

    /// Concrete generated class (`BlueprintGeneratedClass` and friends)
    pub fn is_generated_class(&self) -> bool {
        self.class.to_ascii_lowercase().ends_with("generatedclass")
    }

    /// Definition wrapper pointing at a separate generated class
    pub fn is_blueprint_wrapper(&self) -> bool {
        self.class.eq_ignore_ascii_case("Blueprint")
    }

    pub fn is_construction_node(&self) -> bool {
        self.class.eq_ignore_ascii_case("SCS_Node")
    }

    pub fn component_kind(&self) -> ComponentKind {
        ComponentKind::from_class(&self.class)
    }
}

/// Raw on-disk form of a package
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub path: Option<String>,
    pub exports: Vec<UObject>,
}

/// A loaded package: its virtual path plus shared exports
#[derive(Debug, Clone)]
pub struct Package {
    pub path: String,
    pub exports: Vec<Arc<UObject>>,
}

impl Package {
    /// Build a package, assigning export paths and qualifying same-package references
    pub fn new(path: impl Into<String>, exports: Vec<UObject>) -> Self {
        let path = path.into();
        let exports = exports
            .into_iter()
            .map(|mut export| {
                export.path = format!("{}.{}", path, export.name);
                for (_, value) in export.properties.iter_mut() {
                    qualify_local_refs(value, &path);
                }
                Arc::new(export)
            })
            .collect();
        Self { path, exports }
    }

    /// Parse a JSON package. The document's own `path` wins over `fallback_path`.
    pub fn from_json(fallback_path: &str, text: &str) -> Result<Self, serde_json::Error> {
        let document: PackageDocument = serde_json::from_str(text)?;
        let path = document
            .path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| fallback_path.to_string());
        Ok(Self::new(path, document.exports))
    }

    pub fn export(&self, name: &str) -> Option<&Arc<UObject>> {
        self.exports
            .iter()
            .find(|export| export.name.eq_ignore_ascii_case(name))
    }
}

fn qualify_local_refs(value: &mut PropertyValue, package: &str) {
    match value {
        PropertyValue::Object(Some(target)) | PropertyValue::SoftObject(target) => {
            let trimmed = target.trim();
            if !trimmed.is_empty() && !trimmed.contains('/') {
                *target = format!("{package}.{trimmed}");
            }
        }
        PropertyValue::Struct(s) => {
            for (_, nested) in s.properties.iter_mut() {
                qualify_local_refs(nested, package);
            }
        }
        PropertyValue::Array(items) => {
            for item in items {
                qualify_local_refs(item, package);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: &str = r#"{
        "exports": [
            { "name": "Body", "class": "StaticMeshComponent", "properties": {
                "StaticMesh": { "Object": "/Game/Meshes/Truck.Truck" },
                "AttachParent": { "Object": "Root" },
                "RelativeLocation": { "Vector": [0.0, 0.0, 40.0] },
                "OverrideMaterials": { "Array": [ { "Object": null }, { "Object": "/Game/M/Paint.Paint" } ] },
                "Zeta": { "Int": 1 },
                "Alpha": { "Int": 2 }
            } },
            { "name": "Root", "class": "SceneComponent" }
        ]
    }"#;

    #[test]
    fn test_package_from_json_assigns_paths() {
        let package = Package::from_json("/Game/Vehicles/Truck", PACKAGE).unwrap();
        assert_eq!(package.exports.len(), 2);
        assert_eq!(package.exports[0].path, "/Game/Vehicles/Truck.Body");
        assert!(package.export("root").is_some());
    }

    #[test]
    fn test_local_references_are_qualified() {
        let package = Package::from_json("/Game/Vehicles/Truck", PACKAGE).unwrap();
        let body = package.export("Body").unwrap();
        assert_eq!(
            body.properties.object_path("AttachParent"),
            Some("/Game/Vehicles/Truck.Root")
        );
        assert_eq!(
            body.properties.object_path("StaticMesh"),
            Some("/Game/Meshes/Truck.Truck")
        );
    }

    #[test]
    fn test_property_bag_keeps_document_order() {
        let package = Package::from_json("/Game/Vehicles/Truck", PACKAGE).unwrap();
        let names: Vec<&str> = package.exports[0].properties.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["StaticMesh", "AttachParent", "RelativeLocation", "OverrideMaterials", "Zeta", "Alpha"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let package = Package::from_json("/Game/Vehicles/Truck", PACKAGE).unwrap();
        let props = &package.exports[0].properties;
        assert_eq!(props.vector("relativelocation"), Some(Vec3::new(0.0, 0.0, 40.0)));
        assert_eq!(props.array("OVERRIDEMATERIALS").map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_relative_transform_defaults() {
        let transform = PropertyBag::new().relative_transform();
        assert_eq!(transform, Transform::IDENTITY);
    }

    #[test]
    fn test_component_kind_classification() {
        assert_eq!(
            ComponentKind::from_class("HierarchicalInstancedStaticMeshComponent"),
            ComponentKind::InstancedStaticMesh
        );
        assert_eq!(
            ComponentKind::from_class("TeamFlagMeshComponent"),
            ComponentKind::FlagMesh
        );
        assert_eq!(
            ComponentKind::from_class("StaticMeshComponent"),
            ComponentKind::StaticMesh
        );
        assert_eq!(
            ComponentKind::from_class("SkeletalMeshComponent"),
            ComponentKind::SkeletalMesh
        );
        assert_eq!(
            ComponentKind::from_class("ChildActorComponent"),
            ComponentKind::ChildActor
        );
        assert_eq!(ComponentKind::from_class("SceneComponent"), ComponentKind::Scene);
        assert!(!ComponentKind::Scene.is_mesh_bearing());
    }

    #[test]
    fn test_color_to_linear() {
        let value = PropertyValue::Color([255, 0, 51, 255]);
        assert_eq!(value.as_linear_color(), Some([1.0, 0.0, 0.2, 1.0]));
    }
}
