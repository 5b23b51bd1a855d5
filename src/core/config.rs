//! Resolver configuration with documented heuristic tables
//!
//! Every ordered probe list the resolver walks (property names, auxiliary
//! keywords, mesh path templates, traversal allow-lists) lives here so the
//! heuristics can be tuned from a TOML file without touching the code.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`ResolverConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Weights used when scoring primary-mesh candidates
///
/// Scores are additive. A candidate that exactly matches a desired path
/// (1000) always beats one that only shares the root token (400), and a
/// single auxiliary keyword (-600) is enough to sink an otherwise good match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Candidate path equals a desired path (case-insensitive)
    pub exact_match: f32,
    /// Desired path appears inside the candidate path, added per desired path
    pub substring_match: f32,
    /// Candidate path contains the root name token
    pub root_token: f32,
    /// Candidate lives under the conventional mesh folder
    pub mesh_folder: f32,
    /// Subtracted once per matched auxiliary keyword
    pub auxiliary_penalty: f32,
    /// Flat bonus for skeletal meshes
    pub skeletal_bonus: f32,
    /// Multiplier applied to the bounding-sphere radius of any mesh
    pub radius_factor: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_match: 1000.0,
            substring_match: 500.0,
            root_token: 400.0,
            mesh_folder: 200.0,
            auxiliary_penalty: 600.0,
            skeletal_bonus: 200.0,
            radius_factor: 0.5,
        }
    }
}

/// Alternate anchor name mapped onto a real component property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorAlias {
    pub name: String,
    pub target: String,
}

/// Configuration for every resolution subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    // === PATH RESOLUTION ===
    /// Suffix the engine appends to generated class exports
    pub generated_class_suffix: String,

    // === TRAVERSAL BOUNDS ===
    /// Maximum depth of the construction tree walk, child actors included
    ///
    /// Guards against malformed data where a node is its own ancestor.
    pub max_graph_depth: usize,

    /// Maximum number of AttachParent hops when placing a default-object component
    pub max_attach_depth: usize,

    /// Maximum recursion depth of the overlay property scan
    pub overlay_max_depth: usize,

    // === PRIMARY MESH SELECTION ===
    /// Default-object properties probed, in order, for a skeletal mesh
    pub primary_probe_properties: Vec<String>,

    /// Anchor component names tried when the chosen primary looks auxiliary
    pub anchor_candidates: Vec<String>,

    /// Keywords that mark a mesh path as an auxiliary part (penalized when scoring)
    pub auxiliary_keywords: Vec<String>,

    /// Keywords that make a chosen primary trigger the anchor retry
    pub auxiliary_retry_keywords: Vec<String>,

    /// A primary whose bounding radius is below this is treated as auxiliary
    pub auxiliary_radius_threshold: f32,

    /// Folder fragment that marks conventional vehicle meshes
    pub conventional_mesh_folder: String,

    /// Mesh path guesses; `{token}` is replaced with the root name token
    pub mesh_path_templates: Vec<String>,

    /// Properties followed when collecting meshes from a default object
    pub mesh_traversal_properties: Vec<String>,

    /// Scoring weights for primary candidates
    pub scoring: ScoringWeights,

    // === ANCHORS ===
    /// Anchor used when an attachment names none
    pub default_anchor: String,

    /// Component whose transform is read as the transfer location
    pub default_transfer_component: String,

    /// Alternate anchor names (matched case-insensitively)
    pub anchor_aliases: Vec<AnchorAlias>,

    /// Property holding the multiplexed (damage-state) mesh sub-object
    pub multiplex_property: String,

    // === SCENE ASSEMBLY ===
    /// Default-object slots scanned for turret, gun and flag meshes
    pub attachment_slots: Vec<String>,

    /// Class-name fragment identifying flag-like components
    pub flag_component_class: String,

    // === PROPERTY SCANS ===
    /// Property-name keywords that mark weather overlay parameters
    pub overlay_keywords: Vec<String>,

    /// Container properties the overlay scan may descend into without a keyword match
    pub overlay_traversal_properties: Vec<String>,

    /// Default-object array holding linear color variants
    pub color_array_property: String,

    /// Optional same-length array naming each color variant
    pub color_names_property: String,

    /// Default-object struct holding stockpile contents
    pub stockpile_component_property: String,

    /// Array inside the stockpile struct
    pub stockpile_entries_property: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            generated_class_suffix: "_C".into(),

            max_graph_depth: 64,
            max_attach_depth: 32,
            overlay_max_depth: 64,

            primary_probe_properties: strings(&[
                "MeshComponent",
                "VehicleMeshComponent",
                "VehicleMesh",
                "Mesh",
                "RootComponent",
                "BaseMesh",
            ]),
            anchor_candidates: strings(&[
                "BaseMesh",
                "VehicleMeshComponent",
                "VehicleMesh",
                "MeshComponent",
            ]),
            auxiliary_keywords: strings(&[
                "Headlight", "Lamp", "Mirror", "Wheel", "Tread", "Glass", "Door", "Handle", "Light",
            ]),
            auxiliary_retry_keywords: strings(&["Headlight", "Lamp"]),
            auxiliary_radius_threshold: 2.0,
            conventional_mesh_folder: "/Meshes/Vehicles/".into(),
            mesh_path_templates: strings(&[
                "/Game/Meshes/Vehicles/SK_{token}.SK_{token}",
                "/Game/Meshes/Vehicles/SM_{token}.SM_{token}",
                "/Game/Meshes/Vehicles/{token}.{token}",
            ]),
            mesh_traversal_properties: strings(&[
                "MeshComponent",
                "RootComponent",
                "AttachParent",
                "Template",
                "ChildActorTemplate",
                "ChildActor",
                "AttachChildren",
            ]),
            scoring: ScoringWeights::default(),

            default_anchor: "BaseMesh".into(),
            default_transfer_component: "TransferLocation".into(),
            anchor_aliases: vec![AnchorAlias {
                name: "CargoPlatform".into(),
                target: "BaseMesh".into(),
            }],
            multiplex_property: "MultiplexedStaticMesh".into(),

            attachment_slots: strings(&[
                "SkelMeshComponent",
                "SkeletalMeshComponent",
                "MeshComponent",
                "GunMeshComponent",
                "SkelMesh",
                "FlagMesh",
                "GunMesh",
                "PrimaryMesh",
            ]),
            flag_component_class: "FlagMeshComponent".into(),

            overlay_keywords: strings(&["mud", "snow", "ice", "frost", "dirt", "slush", "weather"]),
            overlay_traversal_properties: strings(&[
                "RootComponent",
                "MeshComponent",
                "StaticMeshComponent",
                "SkeletalMeshComponent",
                "StaticMesh",
                "SkeletalMesh",
                "Template",
                "Default",
                "ChildActorTemplate",
                "Materials",
                "Material",
                "MaterialOverrides",
                "ScalarParameterValues",
                "VectorParameterValues",
                "TextureParameterValues",
                "MaterialParameters",
                "ComponentTemplates",
                "SimpleConstructionScript",
                "AllNodes",
                "AllComponents",
                "RootNodes",
                "AttachChildren",
            ]),
            color_array_property: "Colors".into(),
            color_names_property: "ColorNames".into(),
            stockpile_component_property: "ReplicatedGenericStockpileComponent".into(),
            stockpile_entries_property: "Stockpile".into(),
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generated_class_suffix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "generated_class_suffix must not be empty".into(),
            ));
        }

        if self.max_graph_depth == 0 || self.max_attach_depth == 0 || self.overlay_max_depth == 0 {
            return Err(ConfigError::Invalid("Traversal depth bounds must be positive".into()));
        }

        let lists = [
            ("primary_probe_properties", &self.primary_probe_properties),
            ("anchor_candidates", &self.anchor_candidates),
            ("mesh_path_templates", &self.mesh_path_templates),
            ("overlay_keywords", &self.overlay_keywords),
        ];
        for (name, list) in lists {
            if list.iter().all(|entry| entry.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }

        if let Some(template) = self
            .mesh_path_templates
            .iter()
            .find(|template| !template.contains("{token}"))
        {
            return Err(ConfigError::Invalid(format!(
                "mesh path template '{template}' is missing the {{token}} placeholder"
            )));
        }

        if self.auxiliary_radius_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "auxiliary_radius_threshold ({}) must not be negative",
                self.auxiliary_radius_threshold
            )));
        }

        if self.default_anchor.trim().is_empty() {
            return Err(ConfigError::Invalid("default_anchor must not be empty".into()));
        }

        Ok(())
    }

    /// Map a requested anchor name onto the component property to read.
    ///
    /// Blank names fall back to the default anchor; aliases are matched
    /// case-insensitively.
    pub fn normalize_anchor<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        let name = match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return &self.default_anchor,
        };
        self.anchor_aliases
            .iter()
            .find(|alias| alias.name.eq_ignore_ascii_case(name))
            .map(|alias| alias.target.as_str())
            .unwrap_or(name)
    }
}
