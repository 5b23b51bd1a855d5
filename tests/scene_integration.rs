//! Scene assembly integration tests
//!
//! Builds a small in-memory content set from inline JSON packages and
//! resolves scene descriptions against it end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use blueprint_scene::asset::{AssetProvider, MemoryProvider, Package, ProviderError};
use blueprint_scene::blueprints::{HpState, PrimarySource, ResolveContext};
use blueprint_scene::core::{ResolveError, ResolverConfig};
use blueprint_scene::scene::{AttachmentOrigin, ResolvedScene, SceneAssembler, SceneSpec};

const TRUCK_MESH: &str = r#"{
    "exports": [
        { "name": "SK_Truck", "class": "SkeletalMesh", "properties": {
            "Bounds": { "Struct": { "type": "BoxSphereBounds", "properties": {
                "Origin": { "Vector": [0.0, 0.0, 0.0] },
                "SphereRadius": { "Float": 300.0 }
            } } },
            "Sockets": { "Array": [
                { "Struct": { "type": "SkeletalMeshSocket", "properties": {
                    "SocketName": { "Name": "Flag" },
                    "RelativeLocation": { "Vector": [0.0, 0.0, 0.0] }
                } } },
                { "Struct": { "type": "SkeletalMeshSocket", "properties": {
                    "SocketName": { "Name": "Hitch" },
                    "RelativeLocation": { "Vector": [-200.0, 0.0, 10.0] }
                } } }
            ] }
        } }
    ]
}"#;

const FLAG_MESH: &str = r#"{
    "exports": [
        { "name": "SM_Flag", "class": "StaticMesh", "properties": {
            "Bounds": { "Struct": { "type": "BoxSphereBounds", "properties": {
                "SphereRadius": { "Float": 20.0 }
            } } }
        } }
    ]
}"#;

const WHEEL_MESH: &str = r#"{ "exports": [ { "name": "SM_Wheel", "class": "StaticMesh" } ] }"#;

const CRATE_MESH: &str = r#"{ "exports": [ { "name": "SM_Crate", "class": "StaticMesh" } ] }"#;

const MUD_MASK: &str = r#"{ "exports": [ { "name": "T_MudMask", "class": "Texture2D" } ] }"#;

/// Skeletal truck: `BaseMesh` sits 30 units up, the default object carries
/// mud settings two levels deep and an unrelated deep struct
const TRUCK: &str = r#"{
    "exports": [
        { "name": "BPTruck_C", "class": "BlueprintGeneratedClass", "properties": {
            "ClassDefaultObject": { "Object": "Default__BPTruck_C" },
            "SimpleConstructionScript": { "Object": "SCS" }
        } },
        { "name": "Default__BPTruck_C", "class": "BPTruck_C", "properties": {
            "MudSettings": { "Struct": { "type": "WeatherSettings", "properties": {
                "Params": { "Struct": { "type": "MaskParams", "properties": {
                    "MudStrength": { "Float": 0.6 },
                    "MudMask": { "Object": "/Game/Textures/T_MudMask.T_MudMask" }
                } } }
            } } },
            "Hull": { "Struct": { "type": "A", "properties": {
                "Frame": { "Struct": { "type": "B", "properties": {
                    "Panel": { "Struct": { "type": "C", "properties": {
                        "Rivets": { "Struct": { "type": "D", "properties": {
                            "Detail": { "Struct": { "type": "E", "properties": {
                                "SnowStrength": { "Float": 0.9 }
                            } } }
                        } } }
                    } } }
                } } }
            } } },
            "Colors": { "Array": [
                { "LinearColor": [1.0, 0.0, 0.0, 1.0] },
                { "LinearColor": [0.0, 0.0, 1.0, 1.0] }
            ] },
            "ColorNames": { "Array": [ { "Str": "Red" }, { "Str": "Blue" } ] }
        } },
        { "name": "SCS", "class": "SimpleConstructionScript", "properties": {
            "RootNodes": { "Array": [ { "Object": "BaseMesh_Node" } ] }
        } },
        { "name": "BaseMesh_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "BaseMesh" },
            "ComponentTemplate": { "Object": "BaseMesh_GEN_VARIABLE" }
        } },
        { "name": "BaseMesh_GEN_VARIABLE", "class": "SkeletalMeshComponent", "properties": {
            "SkeletalMesh": { "Object": "/Game/Meshes/Vehicles/SK_Truck.SK_Truck" },
            "RelativeLocation": { "Vector": [0.0, 0.0, 30.0] }
        } }
    ]
}"#;

/// Same hull with two wheels sharing one mesh, plus a hidden-tagged spare
const HALFTRACK: &str = r#"{
    "exports": [
        { "name": "BPHalftrack_C", "class": "BlueprintGeneratedClass", "properties": {
            "ClassDefaultObject": { "Object": "Default__BPHalftrack_C" },
            "SimpleConstructionScript": { "Object": "SCS" }
        } },
        { "name": "Default__BPHalftrack_C", "class": "BPHalftrack_C" },
        { "name": "SCS", "class": "SimpleConstructionScript", "properties": {
            "RootNodes": { "Array": [ { "Object": "BaseMesh_Node" } ] }
        } },
        { "name": "BaseMesh_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "BaseMesh" },
            "ComponentTemplate": { "Object": "BaseMesh_GEN_VARIABLE" },
            "ChildNodes": { "Array": [
                { "Object": "FrontWheel_Node" },
                { "Object": "RearWheel_Node" },
                { "Object": "Spare_Node" }
            ] }
        } },
        { "name": "FrontWheel_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "FrontWheel" },
            "ComponentTemplate": { "Object": "FrontWheel_GEN_VARIABLE" }
        } },
        { "name": "RearWheel_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "RearWheel" },
            "ComponentTemplate": { "Object": "RearWheel_GEN_VARIABLE" }
        } },
        { "name": "Spare_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "Spare" },
            "ComponentTemplate": { "Object": "Spare_GEN_VARIABLE" }
        } },
        { "name": "BaseMesh_GEN_VARIABLE", "class": "SkeletalMeshComponent", "properties": {
            "SkeletalMesh": { "Object": "/Game/Meshes/Vehicles/SK_Truck.SK_Truck" }
        } },
        { "name": "FrontWheel_GEN_VARIABLE", "class": "StaticMeshComponent", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Vehicles/SM_Wheel.SM_Wheel" },
            "RelativeLocation": { "Vector": [100.0, 0.0, 0.0] }
        } },
        { "name": "RearWheel_GEN_VARIABLE", "class": "StaticMeshComponent", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Vehicles/SM_Wheel.SM_Wheel" },
            "RelativeLocation": { "Vector": [-100.0, 0.0, 0.0] }
        } },
        { "name": "Spare_GEN_VARIABLE", "class": "StaticMeshComponent", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Props/SM_Crate.SM_Crate" },
            "ComponentTags": { "Array": [ { "Name": "Hidden" } ] }
        } }
    ]
}"#;

const FLAG: &str = r#"{
    "exports": [
        { "name": "BPFlag_C", "class": "BlueprintGeneratedClass", "properties": {
            "ClassDefaultObject": { "Object": "Default__BPFlag_C" },
            "SimpleConstructionScript": { "Object": "SCS" }
        } },
        { "name": "Default__BPFlag_C", "class": "BPFlag_C" },
        { "name": "SCS", "class": "SimpleConstructionScript", "properties": {
            "RootNodes": { "Array": [ { "Object": "FlagMesh_Node" } ] }
        } },
        { "name": "FlagMesh_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "FlagMesh" },
            "ComponentTemplate": { "Object": "FlagMesh_GEN_VARIABLE" }
        } },
        { "name": "FlagMesh_GEN_VARIABLE", "class": "StaticMeshComponent", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Props/SM_Flag.SM_Flag" }
        } }
    ]
}"#;

/// Trailer whose default object exposes stockpile entries
const TRAILER: &str = r#"{
    "exports": [
        { "name": "BPTrailer_C", "class": "BlueprintGeneratedClass", "properties": {
            "ClassDefaultObject": { "Object": "Default__BPTrailer_C" }
        } },
        { "name": "Default__BPTrailer_C", "class": "BPTrailer_C", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Props/SM_Crate.SM_Crate" },
            "ReplicatedGenericStockpileComponent": { "Object": "Stockpile" }
        } },
        { "name": "Stockpile", "class": "GenericStockpileComponent", "properties": {
            "Stockpile": { "Array": [
                { "Struct": { "type": "StockpileEntry", "properties": {
                    "Item": { "Object": "/Game/Items/Shells.Shells_C" },
                    "Amount": { "Int": 15 }
                } } }
            ] }
        } }
    ]
}"#;

/// Truck hull with a turret behind a default-object slot, a team flag
/// component and mud settings on the default object
const GUN_TRUCK: &str = r#"{
    "exports": [
        { "name": "BPGunTruck_C", "class": "BlueprintGeneratedClass", "properties": {
            "ClassDefaultObject": { "Object": "Default__BPGunTruck_C" },
            "SimpleConstructionScript": { "Object": "SCS" }
        } },
        { "name": "Default__BPGunTruck_C", "class": "BPGunTruck_C", "properties": {
            "GunMeshComponent": { "Object": "Turret" },
            "MudSettings": { "Struct": { "type": "WeatherSettings", "properties": {
                "MudStrength": { "Float": 0.4 }
            } } }
        } },
        { "name": "SCS", "class": "SimpleConstructionScript", "properties": {
            "RootNodes": { "Array": [ { "Object": "BaseMesh_Node" } ] }
        } },
        { "name": "BaseMesh_Node", "class": "SCS_Node", "properties": {
            "InternalVariableName": { "Name": "BaseMesh" },
            "ComponentTemplate": { "Object": "BaseMesh_GEN_VARIABLE" }
        } },
        { "name": "BaseMesh_GEN_VARIABLE", "class": "SkeletalMeshComponent", "properties": {
            "SkeletalMesh": { "Object": "/Game/Meshes/Vehicles/SK_Truck.SK_Truck" },
            "RelativeLocation": { "Vector": [0.0, 0.0, 30.0] }
        } },
        { "name": "Turret", "class": "StaticMeshComponent", "properties": {
            "StaticMesh": { "Object": "/Game/Meshes/Props/SM_Crate.SM_Crate" },
            "AttachParent": { "Object": "BaseMesh_GEN_VARIABLE" },
            "RelativeLocation": { "Vector": [0.0, 0.0, 50.0] },
            "OverrideMaterials": { "Array": [ { "Object": "/Game/Materials/M_Turret.M_Turret" } ] }
        } },
        { "name": "TeamFlag", "class": "FlagMeshComponent", "properties": {
            "Team0Mesh": { "Object": "/Game/Meshes/Props/SM_Flag.SM_Flag" },
            "RelativeLocation": { "Vector": [0.0, 0.0, 120.0] }
        } },
        { "name": "SpareFlag", "class": "FlagMeshComponent", "properties": {
            "Team0Mesh": { "Object": "/Game/Meshes/Props/SM_Flag.SM_Flag" },
            "RelativeLocation": { "Vector": [0.0, 40.0, 120.0] }
        } }
    ]
}"#;

fn provider() -> MemoryProvider {
    let mut provider = MemoryProvider::new();
    let packages = [
        ("/Game/Meshes/Vehicles/SK_Truck", TRUCK_MESH),
        ("/Game/Meshes/Vehicles/SM_Wheel", WHEEL_MESH),
        ("/Game/Meshes/Props/SM_Flag", FLAG_MESH),
        ("/Game/Meshes/Props/SM_Crate", CRATE_MESH),
        ("/Game/Textures/T_MudMask", MUD_MASK),
        ("/Game/Vehicles/BPTruck", TRUCK),
        ("/Game/Vehicles/BPHalftrack", HALFTRACK),
        ("/Game/Props/BPFlag", FLAG),
        ("/Game/Props/BPTrailer", TRAILER),
        ("/Game/Vehicles/BPGunTruck", GUN_TRUCK),
    ];
    for (path, json) in packages {
        provider.add_json(path, json).unwrap();
    }
    provider
}

/// Counts every package request before delegating
struct CountingProvider {
    inner: MemoryProvider,
    loads: AtomicUsize,
}

impl AssetProvider for CountingProvider {
    fn try_load_package(&self, path: &str) -> Result<Option<Arc<Package>>, ProviderError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.try_load_package(path)
    }

    fn virtual_paths(&self) -> Vec<String> {
        self.inner.virtual_paths()
    }
}

fn assemble(provider: &dyn AssetProvider, json: &str) -> Result<ResolvedScene, ResolveError> {
    let config = ResolverConfig::default();
    let ctx = ResolveContext::new(provider, &config);
    let scene = SceneSpec::from_json(json)?;
    SceneAssembler::new(ctx).assemble(&scene)
}

#[test]
fn test_flag_attached_at_socket_with_offset() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "flag", "path": "/Game/Props/BPFlag",
                  "attachTo": { "parentId": "truck", "anchor": "BaseMesh", "socket": "Flag",
                                "offset": { "translation": [0, 0, 50] } } }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(scene.root.mesh_path, "/Game/Meshes/Vehicles/SK_Truck.SK_Truck");
    assert_eq!(scene.root.primary_source, PrimarySource::ComponentGraph);
    assert_eq!(scene.attachments.len(), 1);

    let flag = &scene.attachments[0];
    assert_eq!(flag.id, "flag");
    assert_eq!(flag.origin, AttachmentOrigin::Explicit);
    assert_eq!(flag.mesh_path, "/Game/Meshes/Props/SM_Flag.SM_Flag");
    // Anchor BaseMesh sits at z = 30
    assert!((flag.transform.translation.z - 30.0 - 50.0).abs() < 1e-4);
}

#[test]
fn test_anchor_alias_and_blank_anchor_use_base_mesh() {
    let provider = provider();
    for anchor in [r#""CargoPlatform""#, r#""""#, "null"] {
        let json = format!(
            r#"{{
                "assets": [
                    {{ "id": "truck", "path": "/Game/Vehicles/BPTruck" }},
                    {{ "id": "flag", "path": "/Game/Props/BPFlag",
                      "attachTo": {{ "parentId": "truck", "anchor": {anchor} }} }}
                ]
            }}"#
        );
        let scene = assemble(&provider, &json).unwrap();
        assert_eq!(scene.attachments[0].transform.translation.z, 30.0, "anchor {anchor}");
    }
}

#[test]
fn test_socket_translation_is_added() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "trailer", "path": "/Game/Props/BPTrailer",
                  "attachTo": { "parentId": "truck", "socket": "hitch" } }
            ]
        }"#,
    )
    .unwrap();
    let trailer = &scene.attachments[0];
    assert_eq!(trailer.transform.translation.x, -200.0);
    assert_eq!(trailer.transform.translation.z, 40.0);
}

#[test]
fn test_zero_roots_rejected_before_any_load() {
    let provider = CountingProvider {
        inner: provider(),
        loads: AtomicUsize::new(0),
    };
    let result = assemble(
        &provider,
        r#"{ "assets": [ { "id": "flag", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "truck" } } ] }"#,
    );
    assert!(matches!(result, Err(ResolveError::Input(_))));
    assert_eq!(provider.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_two_roots_rejected_before_any_load() {
    let provider = CountingProvider {
        inner: provider(),
        loads: AtomicUsize::new(0),
    };
    let result = assemble(
        &provider,
        r#"{ "assets": [
            { "id": "a", "path": "/Game/Vehicles/BPTruck" },
            { "id": "b", "path": "/Game/Vehicles/BPHalftrack" }
        ] }"#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.subsystem(), "scene");
    assert_eq!(provider.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_parent_is_dropped() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "ghost", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "nobody" } },
                { "id": "flag", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "truck" } }
            ]
        }"#,
    )
    .unwrap();
    let ids: Vec<&str> = scene.attachments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["flag"]);
}

#[test]
fn test_nested_attachment_uses_parent_anchor_only() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "trailer", "path": "/Game/Props/BPTrailer",
                  "attachTo": { "parentId": "truck", "offset": { "translation": [0, 0, 100] } } },
                { "id": "flag", "path": "/Game/Props/BPFlag",
                  "attachTo": { "parentId": "trailer", "offset": { "translation": [5, 0, 0] } } }
            ]
        }"#,
    )
    .unwrap();
    let trailer = scene.attachments_of("trailer").next().unwrap();
    assert_eq!(trailer.transform.translation.z, 130.0);

    // The trailer has no BaseMesh anchor: identity, then the offset alone
    let flag = scene.attachments_of("flag").next().unwrap();
    assert_eq!(flag.parent_id.as_deref(), Some("trailer"));
    assert_eq!(flag.transform.translation, glam::Vec3::new(5.0, 0.0, 0.0));
}

#[test]
fn test_parent_listed_after_child_is_found() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "flag", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "trailer" } },
                { "id": "trailer", "path": "/Game/Props/BPTrailer", "attachTo": { "parentId": "truck" } }
            ]
        }"#,
    )
    .unwrap();
    let ids: Vec<&str> = scene.attachments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["flag", "trailer"]);
    assert_eq!(scene.attachments[0].parent_id.as_deref(), Some("trailer"));
}

#[test]
fn test_parent_cycle_is_dropped() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "a", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "b" } },
                { "id": "b", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "a" } },
                { "id": "flag", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "truck" } }
            ]
        }"#,
    )
    .unwrap();
    let ids: Vec<&str> = scene.attachments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["flag"]);
}

#[test]
fn test_blank_parent_reference_is_the_root() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{ "assets": [ { "id": "truck", "path": "/Game/Vehicles/BPTruck", "attachTo": { "parentId": "" } } ] }"#,
    )
    .unwrap();
    assert_eq!(scene.root.id, "truck");
    assert_eq!(scene.root.source_path, "/Game/Meshes/Vehicles/SK_Truck.SK_Truck");
    assert_eq!(scene.root.metadata_path.as_deref(), Some("/Game/Vehicles/BPTruck"));
}

#[test]
fn test_default_slot_and_flag_components_share_root_overlay() {
    let provider = provider();
    let scene = assemble(&provider, r#"{ "assets": [ { "id": "gt", "path": "/Game/Vehicles/BPGunTruck" } ] }"#)
        .unwrap();
    assert_eq!(scene.root.mesh_path, "/Game/Meshes/Vehicles/SK_Truck.SK_Truck");
    assert_eq!(scene.root.overlay.mud_strength, Some(0.4));
    assert!(scene.attachments.iter().all(|a| a.mesh_path != scene.root.mesh_path));

    let turret = scene
        .attachments
        .iter()
        .find(|a| a.origin == AttachmentOrigin::DefaultSlot)
        .unwrap();
    assert_eq!(turret.id, "gt:GunMeshComponent");
    assert_eq!(turret.mesh_path, "/Game/Meshes/Props/SM_Crate.SM_Crate");
    // Turret 50 above BaseMesh, which sits at 30
    assert_eq!(turret.transform.translation.z, 80.0);
    assert_eq!(turret.materials.len(), 1);
    assert_eq!(turret.materials[0].path.as_deref(), Some("/Game/Materials/M_Turret.M_Turret"));

    // Both flag components carry the same mesh; only the first is kept
    let flags: Vec<_> = scene
        .attachments
        .iter()
        .filter(|a| a.origin == AttachmentOrigin::FlagComponent)
        .collect();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].id, "gt:TeamFlag");
    assert_eq!(flags[0].transform.translation.z, 120.0);

    assert!(scene.attachments.iter().all(|a| a.overlay.mud_strength == Some(0.4)));
}

#[test]
fn test_unresolvable_root_is_not_found() {
    let provider = provider();
    let err = assemble(&provider, r#"{ "assets": [ { "id": "x", "path": "/Game/Nothing/BPNothing" } ] }"#)
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(_)));
    assert_eq!(err.subsystem(), "resolver");
}

#[test]
fn test_overlay_found_under_matching_ancestor_only() {
    let provider = provider();
    let scene = assemble(&provider, r#"{ "assets": [ { "id": "truck", "path": "/Game/Vehicles/BPTruck" } ] }"#)
        .unwrap();
    let overlay = &scene.root.overlay;
    assert_eq!(overlay.mud_strength, Some(0.6));
    assert_eq!(overlay.mud_mask.as_deref(), Some("/Game/Textures/T_MudMask.T_MudMask"));
    // Five levels under "Hull", which neither matches nor is traversable
    assert_eq!(overlay.snow_strength, None);
    assert_eq!(scene.root.visual.mud_level, 0.6);
    assert_eq!(scene.root.visual.snow_level, 0.0);
}

#[test]
fn test_root_visual_properties() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{ "assets": [ { "id": "truck", "path": "/Game/Vehicles/BPTruck",
              "properties": { "hpState": "critical", "mudLevel": 0.2, "colorVariant": 1 } } ] }"#,
    )
    .unwrap();
    let visual = &scene.root.visual;
    assert_eq!(visual.hp_state, HpState::Critical);
    assert_eq!(visual.mud_level, 0.2);
    assert_eq!(visual.diffuse_override, Some([0.0, 0.0, 1.0, 1.0]));
}

#[test]
fn test_implicit_components_keep_repeated_meshes() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [ { "id": "ht", "path": "/Game/Vehicles/BPHalftrack" } ],
            "filters": { "excludeTags": ["hidden"] }
        }"#,
    )
    .unwrap();
    let wheels: Vec<_> = scene
        .attachments
        .iter()
        .filter(|a| a.origin == AttachmentOrigin::RootComponent)
        .collect();
    assert_eq!(wheels.len(), 2);
    assert!(wheels.iter().all(|w| w.mesh_path.ends_with("SM_Wheel.SM_Wheel")));
    assert!(wheels.iter().all(|w| w.id.starts_with("ht:")));
    assert_ne!(wheels[0].transform.translation, wheels[1].transform.translation);
}

#[test]
fn test_stockpile_selection_on_attachment() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "trailer", "path": "/Game/Props/BPTrailer",
                  "properties": { "stockpile": { "item": "Shells", "quantity": 10 } },
                  "attachTo": { "parentId": "truck" } }
            ]
        }"#,
    )
    .unwrap();
    let trailer = scene.attachments_of("trailer").next().unwrap();
    let stockpile = trailer.stockpile.as_ref().unwrap();
    assert_eq!(stockpile.quantity, Some(10));
    assert_eq!(stockpile.options.len(), 1);
    assert_eq!(stockpile.options[0].amount, 15);
}

#[test]
fn test_resolved_scene_serializes_camel_case() {
    let provider = provider();
    let scene = assemble(
        &provider,
        r#"{
            "assets": [
                { "id": "truck", "path": "/Game/Vehicles/BPTruck" },
                { "id": "flag", "path": "/Game/Props/BPFlag", "attachTo": { "parentId": "truck" } }
            ],
            "render": { "output": "truck.png" }
        }"#,
    )
    .unwrap();
    let json = serde_json::to_value(&scene).unwrap();
    assert_eq!(json["root"]["meshPath"], "/Game/Meshes/Vehicles/SK_Truck.SK_Truck");
    assert_eq!(json["attachments"][0]["parentId"], "truck");
    assert_eq!(json["render"]["output"], "truck.png");
}
