//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized asset or class identifier.
///
/// Raw paths arrive in several decorated forms (`Class'/Game/X.X_C'`,
/// `"/Game/X"`, `Namespace: /Game/X`). `ObjectPath::normalize` strips the
/// quoting and namespace prefix so every lookup works on the same shape:
/// `/Root/Folder/Package[.Object]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Normalize a raw path string. Returns an empty path for blank input.
    pub fn normalize(raw: &str) -> Self {
        let mut trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        // Quoted reference: keep what sits between the outermost quotes
        let quote = if trimmed.contains('"') { '"' } else { '\'' };
        if let (Some(first), Some(last)) = (trimmed.find(quote), trimmed.rfind(quote)) {
            if last > first {
                trimmed = &trimmed[first + 1..last];
            }
        }

        // "Namespace: /Game/..." prefix
        if let Some(space) = trimmed.find(' ') {
            if space > 0 && trimmed[..space].ends_with(':') {
                trimmed = &trimmed[space + 1..];
            }
        }

        Self(trimmed.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the `.` separating package and object, if the path has an object part.
    fn object_dot(&self) -> Option<usize> {
        let slash = self.0.rfind('/');
        match self.0.rfind('.') {
            Some(dot) if slash.map_or(true, |s| dot > s) => Some(dot),
            _ => None,
        }
    }

    /// Package part of the path (`/Game/X.X_C` -> `/Game/X`).
    pub fn package(&self) -> &str {
        match self.object_dot() {
            Some(dot) => &self.0[..dot],
            None => &self.0,
        }
    }

    /// Object part of the path, if present (`/Game/X.X_C` -> `X_C`).
    pub fn object_name(&self) -> Option<&str> {
        self.object_dot().map(|dot| &self.0[dot + 1..])
    }

    /// Final path segment without the object part (`/Game/X.X_C` -> `X`).
    pub fn base_name(&self) -> &str {
        let package = self.package();
        match package.rfind('/') {
            Some(slash) => &package[slash + 1..],
            None => package,
        }
    }

    pub fn has_object_part(&self) -> bool {
        self.object_dot().is_some()
    }

    /// Full object path: the package's same-named export when no object part is given.
    pub fn to_object_path(&self) -> String {
        if self.has_object_part() || self.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{}", self.0, self.base_name())
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

/// Case-insensitive substring test used by every name heuristic.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
