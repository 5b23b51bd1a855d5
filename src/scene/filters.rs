//! Component and material filtering

use serde::Serialize;

use super::spec::SceneFilters;
use crate::core::types::contains_ignore_case;

fn token_contains(haystack: &str, token: &str) -> bool {
    !token.trim().is_empty() && contains_ignore_case(haystack, token)
}

fn any_token(haystack: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|token| token_contains(haystack, token))
}

fn any_tag(tags: &[String], wanted: &[String]) -> bool {
    wanted
        .iter()
        .filter(|tag| !tag.trim().is_empty())
        .any(|tag| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
}

/// Visibility of one material slot on an attachment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSlot {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub visible: bool,
}

impl SceneFilters {
    /// Include/exclude by mesh path substring, then by component tag
    pub fn keep_component(&self, mesh_path: &str, tags: &[String]) -> bool {
        if !self.include_path_contains.is_empty() && !any_token(mesh_path, &self.include_path_contains) {
            return false;
        }
        if any_token(mesh_path, &self.exclude_path_contains) {
            return false;
        }
        if !self.include_tags.is_empty() && !any_tag(tags, &self.include_tags) {
            return false;
        }
        !any_tag(tags, &self.exclude_tags)
    }

    /// `showMaterials` wins over `hideMaterials` when both are given
    pub fn material_visible(&self, material_path: Option<&str>) -> bool {
        let path = material_path.unwrap_or("");
        if !self.show_materials.is_empty() {
            return any_token(path, &self.show_materials);
        }
        !any_token(path, &self.hide_materials)
    }

    pub fn material_slots(&self, overrides: &[Option<String>]) -> Vec<MaterialSlot> {
        overrides
            .iter()
            .enumerate()
            .map(|(index, path)| MaterialSlot {
                index,
                path: path.clone(),
                visible: self.material_visible(path.as_deref()),
            })
            .collect()
    }
}
