//! Scene assembly: one root plus its implicit and explicit attachments.
//!
//! Explicit attachments are placed as
//! `combine(combine(combine(anchor, socket), offset), meshLocal)`, where the
//! anchor is a named component of the parent's class. Parents may appear
//! anywhere in the asset list.

use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

use super::resolved::{AttachmentOrigin, ResolvedAttachment, ResolvedRoot, ResolvedScene};
use super::spec::{SceneAsset, SceneAttachment, SceneAssetProperties, SceneFilters, SceneSpec};
use super::visual::{stockpile_options, StockpileSelection, VisualProperties};
use crate::asset::mesh::{
    component_mesh, load_mesh_of_kind, load_mesh_skeletal_first, material_overrides, parse_team,
};
use crate::asset::{MeshAsset, MeshKind, ProviderError, UObject};
use crate::blueprints::collect::collect_meshes;
use crate::blueprints::{
    first_hit, resolve_class, CargoAnchorResolver, ClassDef, ComponentGraphBuilder, HpState,
    PrimaryMeshSelector, PrimarySelection, ResolveContext,
};
use crate::core::types::contains_ignore_case;
use crate::core::{ObjectPath, ResolveError, Transform};
use crate::variants::{extract_color_variants, OverlayMaskData, OverlayScanner};

const TRANSFORM_EPSILON: f32 = 1e-3;

/// Class and meshes behind one scene asset
struct AssetParts {
    /// Metadata path when given, else the asset path
    path: String,
    class: Option<ClassDef>,
    meshes: Vec<AttachmentMesh>,
}

struct AttachmentMesh {
    mesh: MeshAsset,
    local: Transform,
    overrides: Option<Vec<Option<String>>>,
}

/// The single asset without a parent reference. Checked before any load.
pub fn single_root(scene: &SceneSpec) -> Result<&SceneAsset, ResolveError> {
    let mut roots = scene.roots();
    match (roots.next(), roots.next()) {
        (Some(root), None) if root.path.trim().is_empty() => Err(ResolveError::Input(format!(
            "root asset '{}' has no path",
            root.id
        ))),
        (Some(root), None) => Ok(root),
        (None, _) => Err(ResolveError::Input("scene has no root asset".into())),
        (Some(_), Some(_)) => Err(ResolveError::Input(format!(
            "scene has {} root assets, expected exactly one",
            scene.roots().count()
        ))),
    }
}

/// World transform of a component by walking its `AttachParent` chain.
///
/// A socket named by `AttachSocketName` on the parent's mesh is applied
/// before the parent's relative transform.
pub fn attach_parent_world(
    ctx: &ResolveContext<'_>,
    component: &Arc<UObject>,
    team: Option<u8>,
) -> Result<Transform, ProviderError> {
    let mut world = component.properties.relative_transform();
    let mut current = Arc::clone(component);
    let mut seen = AHashSet::new();
    seen.insert(current.path.to_ascii_lowercase());

    for _ in 0..ctx.config.max_attach_depth {
        let Some(parent) = ctx.follow(&current, "AttachParent")? else {
            break;
        };
        if !seen.insert(parent.path.to_ascii_lowercase()) {
            tracing::warn!(target: "scene", component = %component.path, "Attach parent cycle");
            break;
        }

        let socket_name = current
            .properties
            .text("AttachSocketName")
            .filter(|name| !name.trim().is_empty() && !name.eq_ignore_ascii_case("None"));
        if let Some(socket_name) = socket_name {
            if let Some(parent_mesh) = component_mesh(ctx.provider, &parent, team)? {
                if let Some(socket) = parent_mesh.socket(ctx.provider, socket_name)? {
                    world = world.compose(&socket);
                }
            }
        }
        world = world.compose(&parent.properties.relative_transform());
        current = parent;
    }
    Ok(world)
}

/// Whether following parent ids upward from `asset` revisits an asset
fn parent_chain_cycles<'a>(by_id: &AHashMap<&'a str, &'a SceneAsset>, asset: &'a SceneAsset) -> bool {
    let mut seen = AHashSet::new();
    let mut current = asset;
    loop {
        if !seen.insert(current.id.as_str()) {
            return true;
        }
        let Some(next) = current.parent_id().and_then(|id| by_id.get(id).copied()) else {
            return false;
        };
        current = next;
    }
}

/// Same mesh at the same placement only once; repeated meshes elsewhere stay
fn push_unique(out: &mut Vec<ResolvedAttachment>, attachment: ResolvedAttachment) {
    let duplicate = out.iter().any(|existing| {
        existing.mesh_path.eq_ignore_ascii_case(&attachment.mesh_path)
            && existing.transform.approx_eq(&attachment.transform, TRANSFORM_EPSILON)
    });
    if !duplicate {
        out.push(attachment);
    }
}

pub struct SceneAssembler<'a> {
    ctx: ResolveContext<'a>,
}

impl<'a> SceneAssembler<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn assemble(&self, scene: &SceneSpec) -> Result<ResolvedScene, ResolveError> {
        let root = single_root(scene)?;
        let filters = scene.filters.clone().unwrap_or_default();
        let team = parse_team(root.properties.team.as_deref());

        let selection = PrimaryMeshSelector::new(self.ctx)
            .with_team(team)
            .resolve(&root.path, root.metadata_path.as_deref())?;
        let cdo = selection
            .class
            .as_ref()
            .and_then(|class| class.default_object.as_ref());

        let overlay = self.overlay(cdo)?;
        let visual = VisualProperties::layered(
            &root.properties,
            &overlay,
            self.diffuse_override(cdo, &root.properties),
        );

        let primary_component = selection.components.iter().find(|c| c.mesh == selection.mesh);
        let resolved_root = ResolvedRoot {
            id: root.id.clone(),
            mesh_path: selection.mesh.path.clone(),
            mesh_kind: selection.mesh.kind,
            primary_source: selection.source,
            transform: primary_component.map_or(Transform::IDENTITY, |c| c.transform),
            visual: visual.clone(),
            source_path: selection.mesh.path.clone(),
            metadata_path: Some(root.metadata_path.clone().unwrap_or_else(|| root.path.clone())),
            class_path: selection.class.as_ref().map(|class| class.path.clone()),
            overlay: overlay.clone(),
            materials: primary_component
                .and_then(|c| c.material_overrides.as_deref())
                .map(|overrides| filters.material_slots(overrides))
                .unwrap_or_default(),
        };

        let mut attachments = Vec::new();
        self.implicit_attachments(root, &selection, &filters, &visual, &overlay, team, &mut attachments)?;
        let implicit = attachments.len();

        let mut by_id: AHashMap<&str, &SceneAsset> = AHashMap::new();
        for asset in &scene.assets {
            by_id.entry(asset.id.as_str()).or_insert(asset);
        }

        let mut parts: AHashMap<String, AssetParts> = AHashMap::new();
        let root_meshes = std::iter::once(selection.mesh.clone())
            .chain(selection.components.iter().map(|c| c.mesh.clone()))
            .map(|mesh| AttachmentMesh {
                mesh,
                local: Transform::IDENTITY,
                overrides: None,
            })
            .collect();
        parts.insert(
            root.id.clone(),
            AssetParts {
                path: root.metadata_path.clone().unwrap_or_else(|| root.path.clone()),
                class: selection.class.clone(),
                meshes: root_meshes,
            },
        );

        for asset in &scene.assets {
            let (Some(attach), Some(parent_id)) = (&asset.attach_to, asset.parent_id()) else {
                continue;
            };
            let Some(parent_asset) = by_id.get(parent_id).copied() else {
                tracing::warn!(target: "scene", id = %asset.id, parent = parent_id, "Unknown parent, dropping attachment");
                continue;
            };
            if parent_chain_cycles(&by_id, asset) {
                tracing::warn!(target: "scene", id = %asset.id, parent = parent_id, "Parent cycle, dropping attachment");
                continue;
            }

            self.ensure_parts(parent_asset, &mut parts)?;
            self.ensure_parts(asset, &mut parts)?;
            let (Some(parent), Some(own)) = (parts.get(&parent_asset.id), parts.get(&asset.id)) else {
                continue;
            };
            attachments.extend(self.explicit_attachment(asset, attach, parent_id, parent, own, &filters)?);
        }

        tracing::info!(
            target: "scene",
            root = %resolved_root.mesh_path,
            implicit,
            explicit = attachments.len() - implicit,
            "Assembled scene"
        );

        Ok(ResolvedScene {
            root: resolved_root,
            attachments,
            camera: scene.camera.clone(),
            render: scene.render.clone(),
        })
    }

    fn overlay(&self, cdo: Option<&Arc<UObject>>) -> Result<OverlayMaskData, ProviderError> {
        let Some(cdo) = cdo else {
            return Ok(OverlayMaskData::default());
        };
        let parameters = OverlayScanner::new(self.ctx).scan(cdo)?;
        OverlayMaskData::from_parameters(self.ctx.provider, &parameters)
    }

    fn diffuse_override(&self, cdo: Option<&Arc<UObject>>, properties: &SceneAssetProperties) -> Option<[f32; 4]> {
        let index = properties.color_variant?;
        let variants = extract_color_variants(cdo?, self.ctx.config);
        let color = variants.get(index).map(|variant| variant.color);
        if color.is_none() {
            tracing::debug!(target: "scene", index, available = variants.len(), "Color variant out of range");
        }
        color
    }

    #[allow(clippy::too_many_arguments)]
    fn implicit_attachments(
        &self,
        root: &SceneAsset,
        selection: &PrimarySelection,
        filters: &SceneFilters,
        visual: &VisualProperties,
        overlay: &OverlayMaskData,
        team: Option<u8>,
        out: &mut Vec<ResolvedAttachment>,
    ) -> Result<(), ProviderError> {
        let primary = &selection.mesh;
        let attachment = |origin: AttachmentOrigin,
                          name: &str,
                          mesh: MeshAsset,
                          transform: Transform,
                          overrides: Option<&[Option<String>]>| ResolvedAttachment {
            id: format!("{}:{}", root.id, name),
            parent_id: Some(root.id.clone()),
            origin,
            mesh_path: mesh.path,
            mesh_kind: mesh.kind,
            transform,
            visual: visual.clone(),
            stockpile: None,
            overlay: overlay.clone(),
            materials: overrides
                .map(|overrides| filters.material_slots(overrides))
                .unwrap_or_default(),
        };

        for component in &selection.components {
            if component.mesh == *primary {
                continue;
            }
            if !filters.keep_component(&component.mesh.path, &component.tags) {
                tracing::debug!(target: "scene", component = %component.name, "Filtered out");
                continue;
            }
            push_unique(
                out,
                attachment(
                    AttachmentOrigin::RootComponent,
                    component.name.as_str(),
                    component.mesh.clone(),
                    component.transform,
                    component.material_overrides.as_deref(),
                ),
            );
        }

        let Some(cdo) = selection
            .class
            .as_ref()
            .and_then(|class| class.default_object.as_ref())
        else {
            return Ok(());
        };

        for slot in &self.ctx.config.attachment_slots {
            let Some(target) = self.ctx.follow(cdo, slot)? else {
                continue;
            };
            let Some((mesh, transform, overrides)) = self.resolve_slot(&target, selection, team)? else {
                tracing::debug!(target: "scene", slot = %slot, "Slot has no mesh");
                continue;
            };
            if mesh == *primary || !filters.keep_component(&mesh.path, &[]) {
                continue;
            }
            push_unique(
                out,
                attachment(AttachmentOrigin::DefaultSlot, slot.as_str(), mesh, transform, overrides.as_deref()),
            );
        }

        let package_path = ObjectPath::normalize(&cdo.path).package().to_string();
        let Some(package) = self.ctx.provider.try_load_package(&package_path)? else {
            return Ok(());
        };
        let flag_class = &self.ctx.config.flag_component_class;
        for export in package
            .exports
            .iter()
            .filter(|export| contains_ignore_case(&export.class, flag_class))
        {
            let Some(mesh) = component_mesh(self.ctx.provider, export, team)? else {
                continue;
            };
            let present = out
                .iter()
                .any(|existing| existing.mesh_path.eq_ignore_ascii_case(&mesh.path));
            if mesh == *primary || present || !filters.keep_component(&mesh.path, &[]) {
                continue;
            }
            let transform = attach_parent_world(&self.ctx, export, team)?;
            let overrides = material_overrides(export);
            push_unique(
                out,
                attachment(AttachmentOrigin::FlagComponent, export.name.as_str(), mesh, transform, overrides.as_deref()),
            );
        }
        Ok(())
    }

    /// Mesh, placement and overrides behind a default-object slot
    #[allow(clippy::type_complexity)]
    fn resolve_slot(
        &self,
        target: &Arc<UObject>,
        selection: &PrimarySelection,
        team: Option<u8>,
    ) -> Result<Option<(MeshAsset, Transform, Option<Vec<Option<String>>>)>, ProviderError> {
        // Bare mesh: recover placement from a component referencing it
        if let Some(mesh) = MeshAsset::from_object(Arc::clone(target)) {
            let sibling = selection.components.iter().find(|c| c.mesh == mesh);
            return Ok(Some((
                mesh,
                sibling.map_or(Transform::IDENTITY, |c| c.transform),
                sibling.and_then(|c| c.material_overrides.clone()),
            )));
        }

        if !target.component_kind().is_mesh_bearing() {
            return Ok(None);
        }
        let Some(mesh) = component_mesh(self.ctx.provider, target, team)? else {
            return Ok(None);
        };
        let overrides = material_overrides(target).or_else(|| {
            selection
                .components
                .iter()
                .find(|c| c.mesh == mesh)
                .and_then(|c| c.material_overrides.clone())
        });
        let transform = attach_parent_world(&self.ctx, target, team)?;
        Ok(Some((mesh, transform, overrides)))
    }

    /// Resolve an asset's class and meshes once, on first use
    fn ensure_parts(
        &self,
        asset: &SceneAsset,
        parts: &mut AHashMap<String, AssetParts>,
    ) -> Result<(), ProviderError> {
        if parts.contains_key(&asset.id) {
            return Ok(());
        }
        let class = match resolve_class(&self.ctx, &asset.path)? {
            Some(class) => Some(class),
            None => match &asset.metadata_path {
                Some(metadata) => resolve_class(&self.ctx, metadata)?,
                None => None,
            },
        };
        let team = parse_team(asset.properties.team.as_deref());
        let meshes = self.attachment_meshes(asset, class.as_ref(), team)?;
        if meshes.is_empty() {
            tracing::warn!(target: "scene", id = %asset.id, path = %asset.path, "Attachment resolved to no meshes");
        }
        parts.insert(
            asset.id.clone(),
            AssetParts {
                path: asset.metadata_path.clone().unwrap_or_else(|| asset.path.clone()),
                class,
                meshes,
            },
        );
        Ok(())
    }

    fn explicit_attachment(
        &self,
        asset: &SceneAsset,
        attach: &SceneAttachment,
        parent_id: &str,
        parent: &AssetParts,
        own: &AssetParts,
        filters: &SceneFilters,
    ) -> Result<Vec<ResolvedAttachment>, ResolveError> {
        let anchor_name = self.ctx.config.normalize_anchor(attach.anchor.as_deref());
        let anchor = self.anchor_transform(parent, anchor_name)?;

        let socket = match attach.socket.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => self.socket_transform(parent, name)?,
            _ => Transform::IDENTITY,
        };
        let offset = attach
            .offset
            .as_ref()
            .map_or(Transform::IDENTITY, |offset| offset.to_transform());
        let base = Transform::combine(&Transform::combine(&anchor, &socket), &offset);

        let cdo = own.class.as_ref().and_then(|class| class.default_object.as_ref());

        let overlay = self.overlay(cdo)?;
        let visual = VisualProperties::layered(
            &asset.properties,
            &overlay,
            self.diffuse_override(cdo, &asset.properties),
        );
        let options = match cdo {
            Some(cdo) => stockpile_options(&self.ctx, cdo)?,
            None => Vec::new(),
        };
        let stockpile = StockpileSelection::new(&asset.properties, options);

        let resolved = own
            .meshes
            .iter()
            .map(|entry| ResolvedAttachment {
                id: asset.id.clone(),
                parent_id: Some(parent_id.to_string()),
                origin: AttachmentOrigin::Explicit,
                mesh_path: entry.mesh.path.clone(),
                mesh_kind: entry.mesh.kind,
                transform: Transform::combine(&base, &entry.local),
                visual: visual.clone(),
                stockpile: stockpile.clone(),
                overlay: overlay.clone(),
                materials: entry
                    .overrides
                    .as_deref()
                    .map(|overrides| filters.material_slots(overrides))
                    .unwrap_or_default(),
            })
            .collect();

        tracing::debug!(
            target: "scene",
            id = %asset.id,
            parent = parent_id,
            anchor = anchor_name,
            meshes = own.meshes.len(),
            "Placed attachment"
        );
        Ok(resolved)
    }

    fn anchor_transform(&self, parent: &AssetParts, anchor: &str) -> Result<Transform, ProviderError> {
        let resolved;
        let class = match &parent.class {
            Some(class) => Some(class),
            None => {
                resolved = resolve_class(&self.ctx, &parent.path)?;
                resolved.as_ref()
            }
        };
        let transform = match class {
            Some(class) => CargoAnchorResolver::new(self.ctx).anchor_transform(class, anchor)?,
            None => None,
        };
        Ok(transform.unwrap_or_else(|| {
            tracing::debug!(target: "scene", parent = %parent.path, anchor, "Anchor not found, using identity");
            Transform::IDENTITY
        }))
    }

    /// Socket on the parent's meshes, skeletal meshes first
    fn socket_transform(&self, parent: &AssetParts, socket: &str) -> Result<Transform, ProviderError> {
        let fallback;
        let owned = parent.meshes.iter().map(|entry| &entry.mesh);
        let mut meshes: Vec<&MeshAsset> = owned
            .clone()
            .filter(|mesh| mesh.is_skeletal())
            .chain(owned.filter(|mesh| !mesh.is_skeletal()))
            .collect();
        if meshes.is_empty() {
            fallback = load_mesh_skeletal_first(self.ctx.provider, &parent.path)?;
            meshes.extend(fallback.as_ref());
        }

        let found = first_hit(meshes, |mesh| mesh.socket(self.ctx.provider, socket))?;
        Ok(found.unwrap_or_else(|| {
            tracing::warn!(target: "scene", parent = %parent.path, socket, "Socket not found, using identity");
            Transform::IDENTITY
        }))
    }

    /// Graph components, then property-graph meshes, then a direct mesh load
    fn attachment_meshes(
        &self,
        asset: &SceneAsset,
        class: Option<&ClassDef>,
        team: Option<u8>,
    ) -> Result<Vec<AttachmentMesh>, ProviderError> {
        let mut meshes: Vec<AttachmentMesh> = Vec::new();
        let hp: HpState = asset.properties.hp();

        if let Some(class) = class {
            for component in ComponentGraphBuilder::new(self.ctx).with_team(team).build(class)? {
                let duplicate = meshes.iter().any(|m| {
                    m.mesh == component.mesh && m.local.approx_eq(&component.transform, TRANSFORM_EPSILON)
                });
                if !duplicate {
                    meshes.push(AttachmentMesh {
                        mesh: component.mesh,
                        local: component.transform,
                        overrides: component.material_overrides,
                    });
                }
            }

            if let Some(cdo) = &class.default_object {
                let mut roots = vec![Arc::clone(cdo)];
                for property in ["MeshComponent", "RootComponent"] {
                    roots.extend(self.ctx.follow(cdo, property)?);
                }
                for mesh in collect_meshes(&self.ctx, roots, hp, team)? {
                    if !meshes.iter().any(|m| m.mesh == mesh) {
                        meshes.push(AttachmentMesh {
                            mesh,
                            local: Transform::IDENTITY,
                            overrides: None,
                        });
                    }
                }
            }
        }

        if meshes.is_empty() {
            for kind in [MeshKind::Static, MeshKind::Skeletal] {
                if let Some(mesh) = load_mesh_of_kind(self.ctx.provider, &asset.path, kind)? {
                    meshes.push(AttachmentMesh {
                        mesh,
                        local: Transform::IDENTITY,
                        overrides: None,
                    });
                    break;
                }
            }
        }
        Ok(meshes)
    }
}
