//! Property-graph mesh collection.
//!
//! Walks a default object and the components it references through an
//! allow-listed set of properties, gathering every mesh it can reach.

use ahash::AHashSet;
use std::sync::Arc;

use super::anchor::multiplex_variants;
use super::context::ResolveContext;
use super::variant::{select_variant, HpState};
use crate::asset::mesh::{component_mesh, load_mesh_of_kind};
use crate::asset::{MeshAsset, MeshKind, ProviderError, UObject};

const DIRECT_MESH_PROPERTIES: [&str; 2] = ["StaticMesh", "PreviewStaticMesh"];

/// Meshes reachable from `roots`, deduplicated by path in discovery order.
///
/// Multiplexed objects contribute the stop chosen by `hp`.
pub fn collect_meshes(
    ctx: &ResolveContext<'_>,
    roots: Vec<Arc<UObject>>,
    hp: HpState,
    team: Option<u8>,
) -> Result<Vec<MeshAsset>, ProviderError> {
    let mut stack: Vec<(Arc<UObject>, usize)> = roots.into_iter().rev().map(|r| (r, 0)).collect();
    let mut visited = AHashSet::new();
    let mut meshes = Vec::new();
    let mut seen_paths = AHashSet::new();
    let mut push = |mesh: Option<MeshAsset>| {
        if let Some(mesh) = mesh {
            if seen_paths.insert(mesh.path.to_ascii_lowercase()) {
                meshes.push(mesh);
            }
        }
    };

    while let Some((object, depth)) = stack.pop() {
        let key = format!("{}:{}", object.class, object.path).to_ascii_lowercase();
        if !visited.insert(key) {
            continue;
        }

        let variants = multiplex_variants(ctx, &object)?;
        if let Some(variant) = select_variant(&variants, hp) {
            push(variant.load(ctx)?);
        }

        for property in DIRECT_MESH_PROPERTIES {
            if let Some(path) = object.properties.object_path(property) {
                push(load_mesh_of_kind(ctx.provider, path, MeshKind::Static)?);
            }
        }

        if object.component_kind().is_mesh_bearing() {
            push(component_mesh(ctx.provider, &object, team)?);
        }

        if depth >= ctx.config.max_graph_depth {
            tracing::warn!(target: "blueprint", object = %object.path, "Mesh collection depth bound reached");
            continue;
        }

        let mut next = Vec::new();
        for property in &ctx.config.mesh_traversal_properties {
            if object.properties.array(property).is_some() {
                next.extend(ctx.follow_all(&object, property)?);
            } else if let Some(target) = ctx.follow(&object, property)? {
                next.push(target);
            }
        }
        // Reverse so the first reference is visited first
        stack.extend(next.into_iter().rev().map(|target| (target, depth + 1)));
    }

    tracing::debug!(target: "blueprint", meshes = meshes.len(), "Collected meshes from property graph");
    Ok(meshes)
}

/// Largest mesh by bounding radius; ties keep the first found
pub fn largest_mesh(meshes: Vec<MeshAsset>) -> Option<MeshAsset> {
    meshes.into_iter().fold(None, |best, mesh| match best {
        Some(best) if best.bounds_radius() >= mesh.bounds_radius() => Some(best),
        _ => Some(mesh),
    })
}
