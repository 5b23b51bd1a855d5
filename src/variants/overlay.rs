//! Weather overlay parameter scan.
//!
//! Walks a default object's property graph looking for mud/snow style
//! parameters. Descent is allowed through a fixed list of container
//! properties, or through any property whose name carries a weather
//! keyword; a keyword match makes every value beneath it a candidate leaf.

use ahash::AHashSet;
use serde::Serialize;
use std::sync::Arc;

use crate::asset::{AssetProvider, PropertyBag, PropertyValue, ProviderError, StructValue, UObject};
use crate::blueprints::{resolve_class, ResolveContext};
use crate::core::types::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum OverlayValue {
    Float(f32),
    Double(f64),
    Integer(i64),
    Boolean(bool),
    Color([f32; 4]),
    ObjectPath(String),
}

impl OverlayValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            OverlayValue::Float(v) => Some(*v),
            OverlayValue::Double(v) => Some(*v as f32),
            OverlayValue::Integer(v) => Some(*v as f32),
            _ => None,
        }
    }

    fn from_leaf(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(v) => Some(OverlayValue::Float(*v)),
            PropertyValue::Double(v) => Some(OverlayValue::Double(*v)),
            PropertyValue::Int(v) => Some(OverlayValue::Integer(*v)),
            PropertyValue::Bool(v) => Some(OverlayValue::Boolean(*v)),
            PropertyValue::LinearColor(_) | PropertyValue::Color(_) => {
                value.as_linear_color().map(OverlayValue::Color)
            }
            other => other
                .as_object_path()
                .map(|path| OverlayValue::ObjectPath(path.to_string())),
        }
    }
}

/// One matched leaf with its full property path (`Object.Prop.Sub[i]`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayParameter {
    pub path: String,
    pub property_name: String,
    pub value: OverlayValue,
}

/// Parameter name carried by material parameter structs
fn parameter_label(properties: &PropertyBag) -> Option<&str> {
    properties.text("ParameterName").or_else(|| {
        properties
            .struct_value("ParameterInfo")
            .and_then(|info| info.properties.text("Name"))
    })
}

pub struct OverlayScanner<'a> {
    ctx: ResolveContext<'a>,
    visited: AHashSet<usize>,
    found: Vec<OverlayParameter>,
}

impl<'a> OverlayScanner<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self {
            ctx,
            visited: AHashSet::new(),
            found: Vec::new(),
        }
    }

    /// Scan `root` and return every matched leaf in discovery order
    pub fn scan(mut self, root: &Arc<UObject>) -> Result<Vec<OverlayParameter>, ProviderError> {
        self.scan_object(root, root.name.clone(), false, 0)?;
        tracing::debug!(target: "overlay", object = %root.path, parameters = self.found.len(), "Overlay scan finished");
        Ok(self.found)
    }

    fn is_keyword(&self, name: &str) -> bool {
        self.ctx
            .config
            .overlay_keywords
            .iter()
            .any(|keyword| contains_ignore_case(name, keyword))
    }

    fn may_descend(&self, name: &str, matched: bool) -> bool {
        matched
            || self
                .ctx
                .config
                .overlay_traversal_properties
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }

    fn scan_object(
        &mut self,
        object: &Arc<UObject>,
        context: String,
        matched: bool,
        depth: usize,
    ) -> Result<(), ProviderError> {
        if depth > self.ctx.config.overlay_max_depth {
            return Ok(());
        }
        if !self.visited.insert(Arc::as_ptr(object) as usize) {
            return Ok(());
        }
        self.scan_bag(&object.properties, &context, matched, None, depth)
    }

    fn scan_bag(
        &mut self,
        properties: &PropertyBag,
        context: &str,
        matched: bool,
        label: Option<&str>,
        depth: usize,
    ) -> Result<(), ProviderError> {
        for (name, value) in properties.iter() {
            let path = format!("{context}.{name}");
            let matched = matched || self.is_keyword(name);
            self.scan_value(name, value, path, matched, label, depth)?;
        }
        Ok(())
    }

    fn scan_value(
        &mut self,
        name: &str,
        value: &PropertyValue,
        path: String,
        matched: bool,
        label: Option<&str>,
        depth: usize,
    ) -> Result<(), ProviderError> {
        if matched {
            if let Some(leaf) = OverlayValue::from_leaf(value) {
                self.found.push(OverlayParameter {
                    path: path.clone(),
                    property_name: label.unwrap_or(name).to_string(),
                    value: leaf,
                });
            }
        }
        if !self.may_descend(name, matched) {
            return Ok(());
        }

        match value {
            PropertyValue::Struct(inner) => self.scan_struct(inner, path, matched, depth + 1),
            PropertyValue::Array(items) => {
                if depth + 1 > self.ctx.config.overlay_max_depth {
                    return Ok(());
                }
                for (i, item) in items.iter().enumerate() {
                    self.scan_value(name, item, format!("{path}[{i}]"), matched, label, depth + 1)?;
                }
                Ok(())
            }
            other => match other.as_object_path() {
                Some(target) => match self.ctx.load(target)? {
                    Some(object) => self.scan_object(&object, path, matched, depth + 1),
                    None => Ok(()),
                },
                None => Ok(()),
            },
        }
    }

    fn scan_struct(
        &mut self,
        value: &StructValue,
        path: String,
        matched: bool,
        depth: usize,
    ) -> Result<(), ProviderError> {
        if depth > self.ctx.config.overlay_max_depth {
            return Ok(());
        }
        if !self.visited.insert(value as *const StructValue as usize) {
            return Ok(());
        }
        let label = parameter_label(&value.properties);
        let matched = matched || label.is_some_and(|label| self.is_keyword(label));
        self.scan_bag(&value.properties, &path, matched, label, depth)
    }
}

/// Overlay parameters of a class's default object; `None` when the class
/// or its default object cannot be found
pub fn overlay_parameters_for(
    ctx: &ResolveContext<'_>,
    class_path: &str,
) -> Result<Option<Vec<OverlayParameter>>, ProviderError> {
    let Some(class) = resolve_class(ctx, class_path)? else {
        tracing::debug!(target: "overlay", class = class_path, "Unable to resolve class");
        return Ok(None);
    };
    let Some(cdo) = class.default_object else {
        tracing::debug!(target: "overlay", class = %class.path, "Class has no default object");
        return Ok(None);
    };
    OverlayScanner::new(*ctx).scan(&cdo).map(Some)
}

/// Mud and snow overlay settings bucketed from scanned parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMaskData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mud_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mud_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mud_tightness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow_tightness: Option<f32>,
}

#[derive(Clone, Copy)]
enum Bucket {
    Mud,
    Snow,
}

impl OverlayMaskData {
    /// Bucket parameters into mud (`mud`, `dirt`) and snow (`snow`, `ice`).
    ///
    /// Names containing `tight` fill the tightness slot, other scalars the
    /// strength slot; object paths are mask textures and are kept only if
    /// they load. The first match per slot wins.
    pub fn from_parameters(
        provider: &dyn AssetProvider,
        parameters: &[OverlayParameter],
    ) -> Result<Self, ProviderError> {
        let mut data = Self::default();
        for parameter in parameters {
            let key = format!("{} {}", parameter.property_name, parameter.path).to_ascii_lowercase();
            let bucket = if key.contains("mud") || key.contains("dirt") {
                Bucket::Mud
            } else if key.contains("snow") || key.contains("ice") {
                Bucket::Snow
            } else {
                continue;
            };
            let (mask, strength, tightness) = match bucket {
                Bucket::Mud => (&mut data.mud_mask, &mut data.mud_strength, &mut data.mud_tightness),
                Bucket::Snow => (&mut data.snow_mask, &mut data.snow_strength, &mut data.snow_tightness),
            };

            match &parameter.value {
                OverlayValue::ObjectPath(path) => {
                    if mask.is_none() && provider.load_object(path)?.is_some() {
                        *mask = Some(path.clone());
                    }
                }
                value => {
                    let Some(scalar) = value.as_scalar() else {
                        continue;
                    };
                    let slot = if parameter.property_name.to_ascii_lowercase().contains("tight") {
                        tightness
                    } else {
                        strength
                    };
                    slot.get_or_insert(scalar);
                }
            }
        }
        Ok(data)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
