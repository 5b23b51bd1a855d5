//! Component graph flattening.
//!
//! A class contributes meshes from three independent producers whose
//! outputs are concatenated in this order:
//!
//! 1. the construction tree (`SimpleConstructionScript` root nodes, walked
//!    depth-first with `world = local ∘ parentWorld`),
//! 2. inherited component-override records, each placed by its own relative
//!    transform,
//! 3. child-actor template exports of the class package that neither of the
//!    first two reached.
//!
//! Child actors recurse into their nested class and re-parent its output
//! under the child-actor transform, prefixing names with `parent/`.
//! Instanced meshes emit one component per instance as `name[i]`.

use ahash::AHashSet;
use serde::Serialize;
use std::sync::Arc;

use super::context::ResolveContext;
use super::path::{resolve_class, ClassDef};
use crate::asset::mesh::{component_mesh, material_overrides};
use crate::asset::{ComponentKind, MeshAsset, ProviderError, UObject};
use crate::core::Transform;

const GEN_VARIABLE_SUFFIX: &str = "_GEN_VARIABLE";

/// Which producer emitted a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentSource {
    ConstructionTree,
    InheritedOverride,
    NestedTemplate,
}

/// Flattened mesh-bearing component in class space
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedComponent {
    pub name: String,
    pub mesh: MeshAsset,
    pub transform: Transform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_overrides: Option<Vec<Option<String>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub source: ComponentSource,
}

/// Flattens a class's component hierarchy into world-space meshes
pub struct ComponentGraphBuilder<'a> {
    ctx: ResolveContext<'a>,
    team: Option<u8>,
}

/// Objects already reached by one class build (nodes and templates)
type Seen = AHashSet<String>;

fn key(object: &UObject) -> String {
    object.path.to_ascii_lowercase()
}

/// Component name recorded by a construction node
pub fn node_name(node: &UObject) -> &str {
    ["InternalVariableName", "VariableName"]
        .iter()
        .filter_map(|prop| node.properties.text(prop))
        .find(|name| !name.trim().is_empty())
        .unwrap_or(&node.name)
}

/// Template export name without the generated-variable suffix
pub fn template_name(template: &UObject) -> &str {
    template
        .name
        .strip_suffix(GEN_VARIABLE_SUFFIX)
        .unwrap_or(&template.name)
}

fn component_tags(template: &UObject) -> Vec<String> {
    template
        .properties
        .array("ComponentTags")
        .unwrap_or(&[])
        .iter()
        .filter_map(|tag| tag.as_text())
        .filter(|tag| !tag.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl<'a> ComponentGraphBuilder<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self { ctx, team: None }
    }

    /// Prefer `Team0Mesh`/`Team1Mesh` on flag-like components
    pub fn with_team(mut self, team: Option<u8>) -> Self {
        self.team = team;
        self
    }

    /// Flatten `class` into a list of mesh components.
    ///
    /// Unresolvable nodes are skipped; only provider failures are errors.
    pub fn build(&self, class: &ClassDef) -> Result<Vec<ResolvedComponent>, ProviderError> {
        let mut class_stack = Vec::new();
        let components = self.build_class(class, 0, &mut class_stack)?;
        tracing::debug!(
            target: "blueprint",
            class = %class.path,
            components = components.len(),
            "Flattened component graph"
        );
        Ok(components)
    }

    fn build_class(
        &self,
        class: &ClassDef,
        depth: usize,
        class_stack: &mut Vec<String>,
    ) -> Result<Vec<ResolvedComponent>, ProviderError> {
        class_stack.push(class.path.to_ascii_lowercase());
        let mut seen = Seen::new();

        let result = (|| {
            let mut components = self.construction_tree(class, depth, class_stack, &mut seen)?;
            components.extend(self.inherited_overrides(class, depth, class_stack, &mut seen)?);
            components.extend(self.nested_templates(class, depth, class_stack, &mut seen)?);
            Ok(components)
        })();

        class_stack.pop();
        result
    }

    fn construction_tree(
        &self,
        class: &ClassDef,
        depth: usize,
        class_stack: &mut Vec<String>,
        seen: &mut Seen,
    ) -> Result<Vec<ResolvedComponent>, ProviderError> {
        let mut out = Vec::new();
        let Some(scs) = self.ctx.follow(&class.class, "SimpleConstructionScript")? else {
            tracing::debug!(target: "blueprint", class = %class.path, "No construction script");
            return Ok(out);
        };

        for root in self.ctx.follow_all(&scs, "RootNodes")? {
            self.walk_node(&root, Transform::IDENTITY, depth, class_stack, seen, &mut out)?;
        }
        Ok(out)
    }

    fn walk_node(
        &self,
        node: &UObject,
        parent_world: Transform,
        depth: usize,
        class_stack: &mut Vec<String>,
        seen: &mut Seen,
        out: &mut Vec<ResolvedComponent>,
    ) -> Result<(), ProviderError> {
        if depth > self.ctx.config.max_graph_depth {
            tracing::warn!(target: "blueprint", node = %node.path, depth, "Construction tree too deep, skipping");
            return Ok(());
        }
        if !seen.insert(key(node)) {
            tracing::warn!(target: "blueprint", node = %node.path, "Construction node revisited, skipping");
            return Ok(());
        }

        let name = node_name(node).to_string();
        let mut world = parent_world;
        match self.ctx.follow(node, "ComponentTemplate")? {
            Some(template) => {
                seen.insert(key(&template));
                world = template.properties.relative_transform().compose(&parent_world);
                self.emit_template(
                    &template,
                    &name,
                    world,
                    ComponentSource::ConstructionTree,
                    depth,
                    class_stack,
                    out,
                )?;
            }
            None => {
                tracing::debug!(target: "blueprint", node = %node.path, "Construction node has no template");
            }
        }

        for child in self.ctx.follow_all(node, "ChildNodes")? {
            self.walk_node(&child, world, depth + 1, class_stack, seen, out)?;
        }
        Ok(())
    }

    fn inherited_overrides(
        &self,
        class: &ClassDef,
        depth: usize,
        class_stack: &mut Vec<String>,
        seen: &mut Seen,
    ) -> Result<Vec<ResolvedComponent>, ProviderError> {
        let mut out = Vec::new();
        let Some(handler) = self.ctx.follow(&class.class, "InheritableComponentHandler")? else {
            return Ok(out);
        };

        for record in handler.properties.array("Records").unwrap_or(&[]) {
            let Some(record) = record.as_struct() else {
                continue;
            };
            let Some(template_path) = record.properties.object_path("ComponentTemplate") else {
                continue;
            };
            let Some(template) = self.ctx.load(template_path)? else {
                tracing::debug!(target: "blueprint", template = template_path, "Override template missing");
                continue;
            };
            if !seen.insert(key(&template)) {
                continue;
            }

            let name = record
                .properties
                .struct_value("ComponentKey")
                .and_then(|k| k.properties.text("SCSVariableName"))
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| template_name(&template))
                .to_string();
            let transform = template.properties.relative_transform();
            self.emit_template(
                &template,
                &name,
                transform,
                ComponentSource::InheritedOverride,
                depth,
                class_stack,
                &mut out,
            )?;
        }
        Ok(out)
    }

    fn nested_templates(
        &self,
        class: &ClassDef,
        depth: usize,
        class_stack: &mut Vec<String>,
        seen: &mut Seen,
    ) -> Result<Vec<ResolvedComponent>, ProviderError> {
        let mut out = Vec::new();
        let Some(package) = class.package(&self.ctx)? else {
            return Ok(out);
        };

        for export in &package.exports {
            if export.component_kind() != ComponentKind::ChildActor || !seen.insert(key(export)) {
                continue;
            }
            let container = export.properties.relative_transform();
            self.child_actor(
                export,
                template_name(export),
                container,
                ComponentSource::NestedTemplate,
                depth,
                class_stack,
                &mut out,
            )?;
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_template(
        &self,
        template: &UObject,
        name: &str,
        world: Transform,
        source: ComponentSource,
        depth: usize,
        class_stack: &mut Vec<String>,
        out: &mut Vec<ResolvedComponent>,
    ) -> Result<(), ProviderError> {
        let kind = template.component_kind();
        match kind {
            ComponentKind::ChildActor => {
                self.child_actor(template, name, world, source, depth, class_stack, out)
            }
            ComponentKind::InstancedStaticMesh => {
                let Some(mesh) = self.mesh_of(template, name)? else {
                    return Ok(());
                };
                let instances = template.properties.array("PerInstanceSMData").unwrap_or(&[]);
                if instances.is_empty() {
                    out.push(self.component(template, name.to_string(), mesh, world, source));
                    return Ok(());
                }
                for (i, instance) in instances.iter().enumerate() {
                    let local = instance
                        .as_struct()
                        .and_then(|s| s.properties.struct_value("TransformData"))
                        .map(|t| t.properties.transform_fields())
                        .unwrap_or(Transform::IDENTITY);
                    out.push(self.component(
                        template,
                        format!("{name}[{i}]"),
                        mesh.clone(),
                        local.compose(&world),
                        source,
                    ));
                }
                Ok(())
            }
            _ if kind.is_mesh_bearing() => {
                if let Some(mesh) = self.mesh_of(template, name)? {
                    out.push(self.component(template, name.to_string(), mesh, world, source));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn child_actor(
        &self,
        template: &UObject,
        name: &str,
        world: Transform,
        source: ComponentSource,
        depth: usize,
        class_stack: &mut Vec<String>,
        out: &mut Vec<ResolvedComponent>,
    ) -> Result<(), ProviderError> {
        if let Some(class_path) = template.properties.object_path("ChildActorClass") {
            match resolve_class(&self.ctx, class_path)? {
                Some(nested) if class_stack.contains(&nested.path.to_ascii_lowercase()) => {
                    tracing::warn!(target: "blueprint", component = name, class = %nested.path, "Child actor class cycle, skipping");
                    return Ok(());
                }
                Some(_) if depth + 1 > self.ctx.config.max_graph_depth => {
                    tracing::warn!(target: "blueprint", component = name, "Child actor nesting too deep, skipping");
                    return Ok(());
                }
                Some(nested) => {
                    for child in self.build_class(&nested, depth + 1, class_stack)? {
                        out.push(ResolvedComponent {
                            name: format!("{name}/{}", child.name),
                            transform: child.transform.compose(&world),
                            source,
                            ..child
                        });
                    }
                    return Ok(());
                }
                None => {
                    tracing::debug!(target: "blueprint", component = name, class = class_path, "Child actor class unresolved, inspecting template");
                }
            }
        }

        // Inline template: inspect its root component directly
        let Some(actor) = self.ctx.follow(template, "ChildActorTemplate")? else {
            return Ok(());
        };
        let Some(root) = self.ctx.follow(&actor, "RootComponent")? else {
            return Ok(());
        };
        let kind = root.component_kind();
        if kind.is_mesh_bearing() && kind != ComponentKind::InstancedStaticMesh {
            if let Some(mesh) = self.mesh_of(&root, name)? {
                out.push(self.component(&root, name.to_string(), mesh, world, source));
            }
        }
        Ok(())
    }

    fn mesh_of(&self, template: &UObject, name: &str) -> Result<Option<MeshAsset>, ProviderError> {
        let mesh = component_mesh(self.ctx.provider, template, self.team)?;
        if mesh.is_none() {
            tracing::debug!(target: "blueprint", component = name, class = %template.class, "Mesh component has no loadable mesh");
        }
        Ok(mesh)
    }

    fn component(
        &self,
        template: &UObject,
        name: String,
        mesh: MeshAsset,
        transform: Transform,
        source: ComponentSource,
    ) -> ResolvedComponent {
        ResolvedComponent {
            name,
            mesh,
            transform: transform.normalized(),
            material_overrides: material_overrides(template),
            tags: component_tags(template),
            source,
        }
    }
}

/// Every construction node of a class, breadth-first from the roots
pub fn construction_nodes(
    ctx: &ResolveContext<'_>,
    class: &ClassDef,
) -> Result<Vec<Arc<UObject>>, ProviderError> {
    let Some(scs) = ctx.follow(&class.class, "SimpleConstructionScript")? else {
        return Ok(Vec::new());
    };

    let mut seen = Seen::new();
    let mut nodes = Vec::new();
    let mut queue = ctx.follow_all(&scs, "RootNodes")?;
    queue.extend(ctx.follow_all(&scs, "AllNodes")?);

    while !queue.is_empty() {
        let node = queue.remove(0);
        if !seen.insert(key(&node)) {
            continue;
        }
        queue.extend(ctx.follow_all(&node, "ChildNodes")?);
        nodes.push(node);
    }
    Ok(nodes)
}

/// Component template registered under `variable` in the construction tree
/// or the inherited override records of `class`
pub fn named_template(
    ctx: &ResolveContext<'_>,
    class: &ClassDef,
    variable: &str,
) -> Result<Option<Arc<UObject>>, ProviderError> {
    for node in construction_nodes(ctx, class)? {
        if node_name(&node).eq_ignore_ascii_case(variable) {
            if let Some(template) = ctx.follow(&node, "ComponentTemplate")? {
                return Ok(Some(template));
            }
        }
    }

    let Some(handler) = ctx.follow(&class.class, "InheritableComponentHandler")? else {
        return Ok(None);
    };
    for record in handler.properties.array("Records").unwrap_or(&[]) {
        let Some(record) = record.as_struct() else {
            continue;
        };
        let matches = record
            .properties
            .struct_value("ComponentKey")
            .and_then(|k| k.properties.text("SCSVariableName"))
            .is_some_and(|n| n.eq_ignore_ascii_case(variable));
        if matches {
            if let Some(path) = record.properties.object_path("ComponentTemplate") {
                return ctx.load(path);
            }
        }
    }
    Ok(None)
}

/// Unique mesh paths of a flattened class, first occurrence wins
pub fn asset_dependencies(components: &[ResolvedComponent]) -> Vec<String> {
    let mut seen = AHashSet::new();
    components
        .iter()
        .filter(|component| seen.insert(component.mesh.path.to_ascii_lowercase()))
        .map(|component| component.mesh.path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::object::{PropertyBag, StructValue};
    use crate::asset::{MemoryProvider, PropertyValue};
    use crate::core::ResolverConfig;
    use glam::Vec3;

    fn obj_ref(path: &str) -> PropertyValue {
        PropertyValue::Object(Some(path.into()))
    }

    fn refs(paths: &[&str]) -> PropertyValue {
        PropertyValue::Array(paths.iter().map(|p| obj_ref(p)).collect())
    }

    fn location(x: f32, y: f32, z: f32) -> PropertyValue {
        PropertyValue::Vector([x, y, z])
    }

    fn node(name: &str, template: &str, children: &[&str]) -> UObject {
        UObject::new(name, "SCS_Node")
            .with("ComponentTemplate", obj_ref(template))
            .with("InternalVariableName", PropertyValue::Name(name.trim_end_matches("_Node").into()))
            .with("ChildNodes", refs(children))
    }

    fn meshes() -> Vec<UObject> {
        vec![
            UObject::new("SK_Truck", "SkeletalMesh"),
            UObject::new("Wheel", "StaticMesh"),
            UObject::new("Fence", "StaticMesh"),
            UObject::new("Turret", "StaticMesh"),
        ]
    }

    fn provider() -> MemoryProvider {
        let mut provider = MemoryProvider::new();
        provider.add_package("/Game/Meshes", meshes());

        provider.add_package(
            "/Game/Vehicles/BPTruck",
            vec![
                UObject::new("BPTruck_C", "BlueprintGeneratedClass")
                    .with("SimpleConstructionScript", obj_ref("SCS"))
                    .with("InheritableComponentHandler", obj_ref("ICH")),
                UObject::new("SCS", "SimpleConstructionScript")
                    .with("RootNodes", refs(&["Body_Node"])),
                node("Body_Node", "Body_GEN_VARIABLE", &["Wheel_Node", "Fences_Node"]),
                node("Wheel_Node", "Wheel_GEN_VARIABLE", &[]),
                node("Fences_Node", "Fences_GEN_VARIABLE", &[]),
                UObject::new("Body_GEN_VARIABLE", "SkeletalMeshComponent")
                    .with("SkeletalMesh", obj_ref("/Game/Meshes.SK_Truck"))
                    .with("RelativeLocation", location(0.0, 0.0, 100.0))
                    .with("ComponentTags", PropertyValue::Array(vec![PropertyValue::Name("Hull".into())])),
                UObject::new("Wheel_GEN_VARIABLE", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Wheel"))
                    .with("RelativeLocation", location(10.0, 0.0, 0.0))
                    .with("OverrideMaterials", PropertyValue::Array(vec![PropertyValue::Object(None)])),
                UObject::new("Fences_GEN_VARIABLE", "InstancedStaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Fence"))
                    .with(
                        "PerInstanceSMData",
                        PropertyValue::Array(vec![instance(1.0), instance(2.0)]),
                    ),
                UObject::new("ICH", "InheritableComponentHandler").with(
                    "Records",
                    PropertyValue::Array(vec![PropertyValue::Struct(StructValue {
                        struct_type: "ComponentOverrideRecord".into(),
                        properties: PropertyBag::new()
                            .with("ComponentTemplate", obj_ref("Mount_GEN_VARIABLE"))
                            .with(
                                "ComponentKey",
                                PropertyValue::Struct(StructValue {
                                    struct_type: "ComponentKey".into(),
                                    properties: PropertyBag::new()
                                        .with("SCSVariableName", PropertyValue::Name("Mount".into())),
                                }),
                            ),
                    })]),
                ),
                UObject::new("Mount_GEN_VARIABLE", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Turret"))
                    .with("RelativeLocation", location(0.0, 5.0, 0.0)),
                // Not referenced by the tree: picked up by the nested-template pass
                UObject::new("Gun_GEN_VARIABLE", "ChildActorComponent")
                    .with("ChildActorClass", obj_ref("/Game/Weapons/BPGun.BPGun_C"))
                    .with("RelativeLocation", location(0.0, 0.0, 300.0)),
            ],
        );

        provider.add_package(
            "/Game/Weapons/BPGun",
            vec![
                UObject::new("BPGun_C", "BlueprintGeneratedClass")
                    .with("SimpleConstructionScript", obj_ref("SCS")),
                UObject::new("SCS", "SimpleConstructionScript").with("RootNodes", refs(&["Barrel_Node"])),
                node("Barrel_Node", "Barrel_GEN_VARIABLE", &[]),
                UObject::new("Barrel_GEN_VARIABLE", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Turret"))
                    .with("RelativeLocation", location(0.0, 0.0, 10.0)),
            ],
        );
        provider
    }

    fn instance(x: f32) -> PropertyValue {
        PropertyValue::Struct(StructValue {
            struct_type: "InstancedStaticMeshInstanceData".into(),
            properties: PropertyBag::new().with(
                "TransformData",
                PropertyValue::Struct(StructValue {
                    struct_type: "Transform".into(),
                    properties: PropertyBag::new().with("Translation", location(x, 0.0, 0.0)),
                }),
            ),
        })
    }

    fn build(provider: &MemoryProvider, path: &str) -> Vec<ResolvedComponent> {
        let config = ResolverConfig::default();
        let ctx = ResolveContext::new(provider, &config);
        let class = resolve_class(&ctx, path).unwrap().unwrap();
        ComponentGraphBuilder::new(ctx).build(&class).unwrap()
    }

    fn find<'c>(components: &'c [ResolvedComponent], name: &str) -> &'c ResolvedComponent {
        components
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing component {name}"))
    }

    #[test]
    fn test_construction_tree_composes_parent_transforms() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        let body = find(&components, "Body");
        assert_eq!(body.transform.translation, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(body.tags, vec!["Hull".to_string()]);
        assert!(body.mesh.is_skeletal());

        let wheel = find(&components, "Wheel");
        assert_eq!(wheel.transform.translation, Vec3::new(10.0, 0.0, 100.0));
        assert_eq!(wheel.material_overrides, Some(vec![None]));
        assert_eq!(wheel.source, ComponentSource::ConstructionTree);
    }

    #[test]
    fn test_dependencies_are_unique() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        let dependencies = asset_dependencies(&components);
        assert!(dependencies.len() < components.len());
        let lowered: AHashSet<String> = dependencies.iter().map(|p| p.to_ascii_lowercase()).collect();
        assert_eq!(lowered.len(), dependencies.len());
    }

    #[test]
    fn test_instanced_mesh_emits_one_per_instance() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        assert_eq!(find(&components, "Fences[0]").transform.translation, Vec3::new(1.0, 0.0, 100.0));
        assert_eq!(find(&components, "Fences[1]").transform.translation, Vec3::new(2.0, 0.0, 100.0));
    }

    #[test]
    fn test_override_records_use_own_transform() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        let mount = find(&components, "Mount");
        assert_eq!(mount.source, ComponentSource::InheritedOverride);
        assert_eq!(mount.transform.translation, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_nested_template_reparents_child_class() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        let barrel = find(&components, "Gun/Barrel");
        assert_eq!(barrel.source, ComponentSource::NestedTemplate);
        assert_eq!(barrel.transform.translation, Vec3::new(0.0, 0.0, 310.0));
    }

    #[test]
    fn test_producers_concatenate_in_order() {
        let components = build(&provider(), "/Game/Vehicles/BPTruck");
        let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Body", "Wheel", "Fences[0]", "Fences[1]", "Mount", "Gun/Barrel"]
        );
    }

    #[test]
    fn test_self_referencing_node_terminates() {
        let mut provider = MemoryProvider::new();
        provider.add_package("/Game/Meshes", meshes());
        provider.add_package(
            "/Game/Loop/BPLoop",
            vec![
                UObject::new("BPLoop_C", "BlueprintGeneratedClass")
                    .with("SimpleConstructionScript", obj_ref("SCS")),
                UObject::new("SCS", "SimpleConstructionScript").with("RootNodes", refs(&["A_Node"])),
                node("A_Node", "A_GEN_VARIABLE", &["A_Node"]),
                UObject::new("A_GEN_VARIABLE", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Wheel")),
            ],
        );
        let components = build(&provider, "/Game/Loop/BPLoop");
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn test_child_actor_class_cycle_terminates() {
        let mut provider = MemoryProvider::new();
        provider.add_package("/Game/Meshes", meshes());
        provider.add_package(
            "/Game/Loop/BPSelf",
            vec![
                UObject::new("BPSelf_C", "BlueprintGeneratedClass")
                    .with("SimpleConstructionScript", obj_ref("SCS")),
                UObject::new("SCS", "SimpleConstructionScript")
                    .with("RootNodes", refs(&["Body_Node", "Child_Node"])),
                node("Body_Node", "Body_GEN_VARIABLE", &[]),
                node("Child_Node", "Child_GEN_VARIABLE", &[]),
                UObject::new("Body_GEN_VARIABLE", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Wheel")),
                UObject::new("Child_GEN_VARIABLE", "ChildActorComponent")
                    .with("ChildActorClass", obj_ref("/Game/Loop/BPSelf.BPSelf_C")),
            ],
        );
        let components = build(&provider, "/Game/Loop/BPSelf");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "Body");
    }

    #[test]
    fn test_unresolved_child_class_falls_back_to_template_root() {
        let mut provider = MemoryProvider::new();
        provider.add_package("/Game/Meshes", meshes());
        provider.add_package(
            "/Game/Props/BPCrate",
            vec![
                UObject::new("BPCrate_C", "BlueprintGeneratedClass")
                    .with("SimpleConstructionScript", obj_ref("SCS")),
                UObject::new("SCS", "SimpleConstructionScript").with("RootNodes", refs(&["Lid_Node"])),
                node("Lid_Node", "Lid_GEN_VARIABLE", &[]),
                UObject::new("Lid_GEN_VARIABLE", "ChildActorComponent")
                    .with("ChildActorClass", obj_ref("/Game/Missing/BPLid.BPLid_C"))
                    .with("ChildActorTemplate", obj_ref("LidActor"))
                    .with("RelativeLocation", location(0.0, 0.0, 20.0)),
                UObject::new("LidActor", "BPLid_C").with("RootComponent", obj_ref("LidRoot")),
                UObject::new("LidRoot", "StaticMeshComponent")
                    .with("StaticMesh", obj_ref("/Game/Meshes.Fence")),
            ],
        );
        let components = build(&provider, "/Game/Props/BPCrate");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "Lid");
        assert_eq!(components[0].transform.translation, Vec3::new(0.0, 0.0, 20.0));
    }

    #[test]
    fn test_named_template_lookup() {
        let provider = provider();
        let config = ResolverConfig::default();
        let ctx = ResolveContext::new(&provider, &config);
        let class = resolve_class(&ctx, "/Game/Vehicles/BPTruck").unwrap().unwrap();

        let wheel = named_template(&ctx, &class, "wheel").unwrap().unwrap();
        assert_eq!(wheel.name, "Wheel_GEN_VARIABLE");
        let mount = named_template(&ctx, &class, "Mount").unwrap().unwrap();
        assert_eq!(mount.name, "Mount_GEN_VARIABLE");
        assert!(named_template(&ctx, &class, "Nope").unwrap().is_none());
    }
}
