//! Primary mesh selection.
//!
//! Scores flattened components against the requested paths and falls back
//! through a fixed chain when the graph yields nothing:
//!
//! 1. direct mesh load of the requested path
//! 2. best-scoring component of the class graph
//! 3. well-known default-object properties (skeletal meshes)
//! 4. largest mesh reachable through the default-object property graph
//! 5. conventional mesh-path templates filled with the name token
//! 6. steps 2-5 on each super-class
//!
//! A winner that still looks auxiliary (lamp, headlight, tiny bounds) is
//! retried through the anchor candidate components.

use serde::Serialize;

use super::anchor::CargoAnchorResolver;
use super::collect::{collect_meshes, largest_mesh};
use super::context::ResolveContext;
use super::graph::{ComponentGraphBuilder, ResolvedComponent};
use super::path::{resolve_class, ClassDef};
use super::probe::first_hit;
use super::variant::HpState;
use crate::asset::mesh::{component_mesh, load_mesh};
use crate::asset::{MeshAsset, ProviderError};
use crate::core::config::ResolverConfig;
use crate::core::types::contains_ignore_case;
use crate::core::{ObjectPath, ResolveError};

/// Where the primary mesh came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimarySource {
    DirectMesh,
    ComponentGraph,
    ProbeProperty,
    PropertyGraph,
    PathTemplate,
    AnchorRetry,
}

#[derive(Debug, Clone)]
pub struct PrimarySelection {
    pub mesh: MeshAsset,
    pub source: PrimarySource,
    /// Class the mesh was resolved through, absent for direct mesh paths
    pub class: Option<ClassDef>,
    /// Flattened graph of the class that produced the selection
    pub components: Vec<ResolvedComponent>,
}

/// Basename before any `.`, with a leading `BP` stripped
pub fn root_token(path: &str) -> String {
    let path = ObjectPath::normalize(path);
    let base = path.base_name();
    let base = base.split('.').next().unwrap_or(base);
    match base.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("BP") && base.len() > 2 => base[2..].to_string(),
        _ => base.to_string(),
    }
}

/// Normalized root and metadata paths, without duplicates
pub fn desired_paths(root_path: &str, metadata_path: Option<&str>) -> Vec<String> {
    let mut desired: Vec<String> = Vec::new();
    for raw in std::iter::once(root_path).chain(metadata_path) {
        let path = ObjectPath::normalize(raw);
        if !path.is_empty() && !desired.iter().any(|d| d.eq_ignore_ascii_case(path.as_str())) {
            desired.push(path.as_str().to_string());
        }
    }
    desired
}

/// Score one candidate mesh. Pure: depends only on its arguments.
pub fn score_candidate(
    mesh_path: &str,
    bounds_radius: f32,
    is_skeletal: bool,
    desired: &[String],
    token: &str,
    config: &ResolverConfig,
) -> f32 {
    let weights = &config.scoring;
    let mut score = 0.0;

    for path in desired {
        if mesh_path.eq_ignore_ascii_case(path) {
            score += weights.exact_match;
            break;
        }
        if contains_ignore_case(mesh_path, path) {
            score += weights.substring_match;
        }
    }

    if contains_ignore_case(mesh_path, token) {
        score += weights.root_token;
    }
    if contains_ignore_case(mesh_path, &config.conventional_mesh_folder) {
        score += weights.mesh_folder;
    }

    let auxiliary_hits = config
        .auxiliary_keywords
        .iter()
        .filter(|keyword| contains_ignore_case(mesh_path, keyword))
        .count();
    score -= weights.auxiliary_penalty * auxiliary_hits as f32;

    if is_skeletal {
        score += weights.skeletal_bonus;
    }
    score + bounds_radius * weights.radius_factor
}

/// Highest-scoring component; ties keep the earlier one
pub fn select_primary<'c>(
    components: &'c [ResolvedComponent],
    desired: &[String],
    token: &str,
    config: &ResolverConfig,
) -> Option<&'c ResolvedComponent> {
    let mut best: Option<(&ResolvedComponent, f32)> = None;
    for component in components {
        let mesh = &component.mesh;
        let score = score_candidate(
            &mesh.path,
            mesh.bounds_radius(),
            mesh.is_skeletal(),
            desired,
            token,
            config,
        );
        tracing::debug!(target: "resolver", component = %component.name, mesh = %mesh.path, score, "Scored primary candidate");
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((component, score));
        }
    }
    best.map(|(component, _)| component)
}

/// Whether a chosen mesh should be retried through anchor components
pub fn looks_auxiliary(mesh: &MeshAsset, config: &ResolverConfig) -> bool {
    config
        .auxiliary_retry_keywords
        .iter()
        .any(|keyword| contains_ignore_case(&mesh.path, keyword))
        || mesh.bounds_radius() < config.auxiliary_radius_threshold
}

pub struct PrimaryMeshSelector<'a> {
    ctx: ResolveContext<'a>,
    team: Option<u8>,
}

impl<'a> PrimaryMeshSelector<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self { ctx, team: None }
    }

    pub fn with_team(mut self, team: Option<u8>) -> Self {
        self.team = team;
        self
    }

    /// Resolve the primary mesh for `root_path`.
    ///
    /// Exhausting every fallback is [`ResolveError::NotFound`].
    pub fn resolve(
        &self,
        root_path: &str,
        metadata_path: Option<&str>,
    ) -> Result<PrimarySelection, ResolveError> {
        if let Some(mesh) = load_mesh(self.ctx.provider, root_path)? {
            tracing::debug!(target: "resolver", path = root_path, mesh = %mesh.path, "Root path is a mesh");
            return Ok(PrimarySelection {
                mesh,
                source: PrimarySource::DirectMesh,
                class: None,
                components: Vec::new(),
            });
        }

        let desired = desired_paths(root_path, metadata_path);
        let token = root_token(root_path);

        let class = match resolve_class(&self.ctx, root_path)? {
            Some(class) => Some(class),
            None => match metadata_path {
                Some(metadata) => resolve_class(&self.ctx, metadata)?,
                None => None,
            },
        };

        let Some(class) = class else {
            return match self.template_guess(&token)? {
                Some(mesh) => Ok(PrimarySelection {
                    mesh,
                    source: PrimarySource::PathTemplate,
                    class: None,
                    components: Vec::new(),
                }),
                None => Err(ResolveError::NotFound(format!(
                    "no class or mesh found for '{root_path}'"
                ))),
            };
        };

        let Some(mut selection) = self.from_class_chain(&class, &desired, &token)? else {
            return Err(ResolveError::NotFound(format!(
                "no primary mesh found for '{root_path}' (class {})",
                class.path
            )));
        };

        if looks_auxiliary(&selection.mesh, self.ctx.config) {
            tracing::debug!(target: "resolver", mesh = %selection.mesh.path, "Primary looks auxiliary, retrying through anchors");
            if let Some((mesh, source)) = self.auxiliary_retry(&class, &token)? {
                selection.mesh = mesh;
                selection.source = source;
            }
        }

        tracing::debug!(
            target: "resolver",
            path = root_path,
            mesh = %selection.mesh.path,
            source = ?selection.source,
            "Selected primary mesh"
        );
        Ok(selection)
    }

    /// Graph selection, then the property fallbacks, on the class and each ancestor
    fn from_class_chain(
        &self,
        class: &ClassDef,
        desired: &[String],
        token: &str,
    ) -> Result<Option<PrimarySelection>, ProviderError> {
        let builder = ComponentGraphBuilder::new(self.ctx).with_team(self.team);
        let root_components = builder.build(class)?;

        if let Some(selection) = self.from_class(class, root_components.clone(), desired, token)? {
            return Ok(Some(selection));
        }

        for ancestor in class.ancestors(&self.ctx)? {
            tracing::debug!(target: "resolver", ancestor = %ancestor.path, "Trying super-class");
            let components = builder.build(&ancestor)?;
            let ancestor_token = root_token(&ancestor.path);
            if let Some(mut selection) = self.from_class(&ancestor, components, desired, &ancestor_token)? {
                if selection.components.is_empty() {
                    selection.components = root_components;
                }
                selection.class = Some(class.clone());
                return Ok(Some(selection));
            }
        }
        Ok(None)
    }

    fn from_class(
        &self,
        class: &ClassDef,
        components: Vec<ResolvedComponent>,
        desired: &[String],
        token: &str,
    ) -> Result<Option<PrimarySelection>, ProviderError> {
        let selection = |mesh: MeshAsset, source: PrimarySource, components: Vec<ResolvedComponent>| PrimarySelection {
            mesh,
            source,
            class: Some(class.clone()),
            components,
        };

        if let Some(best) = select_primary(&components, desired, token, self.ctx.config) {
            let mesh = best.mesh.clone();
            return Ok(Some(selection(mesh, PrimarySource::ComponentGraph, components)));
        }
        if let Some(mesh) = self.probe_properties(class)? {
            return Ok(Some(selection(mesh, PrimarySource::ProbeProperty, components)));
        }
        if let Some(cdo) = &class.default_object {
            let meshes = collect_meshes(&self.ctx, vec![cdo.clone()], HpState::Normal, self.team)?;
            if let Some(mesh) = largest_mesh(meshes) {
                return Ok(Some(selection(mesh, PrimarySource::PropertyGraph, components)));
            }
        }
        if let Some(mesh) = self.template_guess(token)? {
            return Ok(Some(selection(mesh, PrimarySource::PathTemplate, components)));
        }
        Ok(None)
    }

    /// Well-known default-object properties, following component indirection
    fn probe_properties(&self, class: &ClassDef) -> Result<Option<MeshAsset>, ProviderError> {
        let Some(cdo) = &class.default_object else {
            return Ok(None);
        };
        first_hit(&self.ctx.config.primary_probe_properties, |property| {
            let Some(target) = self.ctx.follow(cdo, property)? else {
                return Ok(None);
            };
            let mesh = match MeshAsset::from_object(target.clone()) {
                Some(mesh) => Some(mesh),
                None => component_mesh(self.ctx.provider, &target, self.team)?,
            };
            let mesh = mesh.filter(MeshAsset::is_skeletal);
            if let Some(mesh) = &mesh {
                tracing::debug!(target: "resolver", property = %property, mesh = %mesh.path, "Probe property hit");
            }
            Ok(mesh)
        })
    }

    /// Conventional mesh paths with the name token substituted
    fn template_guess(&self, token: &str) -> Result<Option<MeshAsset>, ProviderError> {
        if token.is_empty() {
            return Ok(None);
        }
        first_hit(&self.ctx.config.mesh_path_templates, |template| {
            let candidate = template.replace("{token}", token);
            let mesh = load_mesh(self.ctx.provider, &candidate)?;
            tracing::debug!(target: "resolver", candidate = %candidate, hit = mesh.is_some(), "Probed mesh path template");
            Ok(mesh)
        })
    }

    fn auxiliary_retry(
        &self,
        class: &ClassDef,
        token: &str,
    ) -> Result<Option<(MeshAsset, PrimarySource)>, ProviderError> {
        let config = self.ctx.config;
        let anchors = CargoAnchorResolver::new(self.ctx);
        let from_anchor = first_hit(&config.anchor_candidates, |anchor| -> Result<_, ProviderError> {
            Ok(anchors
                .anchor_mesh(class, anchor)?
                .filter(|mesh| !looks_auxiliary(mesh, config)))
        })?;
        if let Some(mesh) = from_anchor {
            return Ok(Some((mesh, PrimarySource::AnchorRetry)));
        }

        Ok(self
            .template_guess(token)?
            .filter(|mesh| !looks_auxiliary(mesh, config))
            .map(|mesh| (mesh, PrimarySource::PathTemplate)))
    }
}
