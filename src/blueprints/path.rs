//! Path resolution: raw path string to a concrete class definition.
//!
//! Candidates are generated from naming conventions, then tried in two
//! passes: a package-export scan (direct generated classes preferred over
//! definition wrappers), then direct object loads. A miss is `Ok(None)`.

use ahash::AHashSet;
use std::sync::Arc;

use super::context::ResolveContext;
use super::probe::first_hit;
use crate::asset::{Package, ProviderError, UObject};
use crate::core::ObjectPath;

/// A resolved class: generated class export plus its default object
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Canonical `Package.Class_C` path
    pub path: String,
    pub class: Arc<UObject>,
    pub default_object: Option<Arc<UObject>>,
}

impl ClassDef {
    /// Wrap a generated class export, loading its default object
    pub fn from_generated(
        ctx: &ResolveContext<'_>,
        class: Arc<UObject>,
    ) -> Result<Self, ProviderError> {
        let default_object = match ctx.follow(&class, "ClassDefaultObject")? {
            Some(cdo) => Some(cdo),
            // Engine naming: Default__<ClassName> in the same package
            None => ctx.load(&format!(
                "{}.Default__{}",
                ObjectPath::normalize(&class.path).package(),
                class.name
            ))?,
        };
        Ok(Self {
            path: class.path.clone(),
            class,
            default_object,
        })
    }

    /// Package path of the class
    pub fn package_path(&self) -> &str {
        match self.path.rfind('.') {
            Some(dot) if dot > self.path.rfind('/').unwrap_or(0) => &self.path[..dot],
            _ => &self.path,
        }
    }

    pub fn package(&self, ctx: &ResolveContext<'_>) -> Result<Option<Arc<Package>>, ProviderError> {
        ctx.provider.try_load_package(self.package_path())
    }

    /// Direct super-class, when it is itself a generated class
    pub fn super_class(&self, ctx: &ResolveContext<'_>) -> Result<Option<ClassDef>, ProviderError> {
        match ctx.follow(&self.class, "SuperStruct")? {
            Some(parent) if parent.is_generated_class() => Ok(Some(ClassDef::from_generated(ctx, parent)?)),
            _ => Ok(None),
        }
    }

    /// Super-class chain, nearest first, excluding `self`
    pub fn ancestors(&self, ctx: &ResolveContext<'_>) -> Result<Vec<ClassDef>, ProviderError> {
        let mut seen = AHashSet::new();
        seen.insert(self.path.to_ascii_lowercase());

        let mut chain = Vec::new();
        let mut current = self.super_class(ctx)?;
        while let Some(class) = current {
            if !seen.insert(class.path.to_ascii_lowercase()) {
                tracing::warn!(target: "blueprint", class = %class.path, "Super-class cycle detected");
                break;
            }
            current = class.super_class(ctx)?;
            chain.push(class);
        }
        Ok(chain)
    }
}

/// Naming-convention candidates for a normalized path.
///
/// `/Game/X` expands to `/Game/X`, `/Game/X.X`, `/Game/X.X_C`;
/// `/Game/X.Y` expands to `/Game/X.Y`, `/Game/X.Y_C`.
pub fn expand_candidates(path: &ObjectPath, class_suffix: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    push_unique(&mut candidates, path.as_str().to_string());
    let base = path.base_name();
    if base.is_empty() {
        return candidates;
    }

    match path.object_name() {
        None => {
            push_unique(&mut candidates, format!("{}.{}", path.as_str(), base));
            push_unique(&mut candidates, format!("{}.{}{}", path.as_str(), base, class_suffix));
        }
        Some(object) if !object.is_empty() => {
            push_unique(&mut candidates, format!("{}.{}{}", path.package(), object, class_suffix));
        }
        Some(_) => {}
    }
    candidates
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if !candidate.trim().is_empty() && !candidates.contains(&candidate) {
        candidates.push(candidate);
    }
}

/// Package paths implied by the candidates, deduplicated case-insensitively
pub fn package_candidates(path: &ObjectPath, candidates: &[String]) -> Vec<String> {
    let mut seen = AHashSet::new();
    std::iter::once(path.package().to_string())
        .chain(
            candidates
                .iter()
                .map(|c| ObjectPath::normalize(c).package().to_string()),
        )
        .filter(|p| !p.trim().is_empty() && seen.insert(p.to_ascii_lowercase()))
        .collect()
}

/// Generated class behind an export: itself, or a wrapper's `GeneratedClass`
fn generated_class_of(
    ctx: &ResolveContext<'_>,
    export: &Arc<UObject>,
) -> Result<Option<Arc<UObject>>, ProviderError> {
    if export.is_generated_class() {
        return Ok(Some(Arc::clone(export)));
    }
    if export.is_blueprint_wrapper() {
        return Ok(ctx
            .follow(export, "GeneratedClass")?
            .filter(|generated| generated.is_generated_class()));
    }
    Ok(None)
}

fn scan_package(ctx: &ResolveContext<'_>, package: &Package) -> Result<Option<Arc<UObject>>, ProviderError> {
    if let Some(direct) = package.exports.iter().find(|e| e.is_generated_class()) {
        return Ok(Some(Arc::clone(direct)));
    }
    first_hit(
        package.exports.iter().filter(|e| e.is_blueprint_wrapper()),
        |wrapper| generated_class_of(ctx, wrapper),
    )
}

/// Resolve a raw path to its class definition.
///
/// Every candidate is exhausted before giving up; absence is `Ok(None)`,
/// only provider I/O failures are errors.
pub fn resolve_class(ctx: &ResolveContext<'_>, raw: &str) -> Result<Option<ClassDef>, ProviderError> {
    let path = ObjectPath::normalize(raw);
    if path.is_empty() {
        return Ok(None);
    }

    let candidates = expand_candidates(&path, &ctx.config.generated_class_suffix);
    let packages = package_candidates(&path, &candidates);

    let from_packages = first_hit(&packages, |package_path| {
        match ctx.provider.try_load_package(package_path)? {
            Some(package) => scan_package(ctx, &package),
            None => Ok(None),
        }
    })?;

    let generated = match from_packages {
        Some(class) => Some(class),
        None => first_hit(&candidates, |candidate| match ctx.load(candidate)? {
            Some(object) => generated_class_of(ctx, &object),
            None => Ok(None),
        })?,
    };

    match generated {
        Some(class) => {
            tracing::debug!(target: "blueprint", requested = %raw, resolved = %class.path, "Resolved class");
            Ok(Some(ClassDef::from_generated(ctx, class)?))
        }
        None => {
            tracing::debug!(target: "blueprint", requested = %raw, candidates = ?candidates, "Unable to resolve class");
            Ok(None)
        }
    }
}
