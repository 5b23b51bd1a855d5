//! Loose-file content root
//!
//! A directory tree of `*.json` package documents mounted under virtual
//! prefixes. Without a mapping file the whole root is mounted at `/Game`.
//! With one, each entry of the JSON object `{ "<virtual prefix>": "<relative dir>" }`
//! becomes a mount. Packages are decoded on first access and cached.

use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::object::{Package, PackageDocument};
use super::provider::{AssetProvider, ProviderError};
use crate::core::ObjectPath;

const DEFAULT_MOUNT: &str = "/Game";
const PACKAGE_EXTENSION: &str = "json";

pub struct ContentRoot {
    root: PathBuf,
    game_version: String,
    /// Lowercased virtual package path -> (virtual path, file)
    index: AHashMap<String, (String, PathBuf)>,
    cache: RwLock<AHashMap<String, Arc<Package>>>,
}

impl ContentRoot {
    pub fn open(
        root: impl AsRef<Path>,
        mapping: Option<&Path>,
        game_version: &str,
        aes_key: Option<&str>,
    ) -> Result<Self, ProviderError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ProviderError::MissingRoot(root.display().to_string()));
        }

        if aes_key.is_some_and(|key| !key.trim().is_empty()) {
            tracing::info!(
                target: "provider",
                "AES key supplied; loose JSON packages are not encrypted so it is unused"
            );
        }

        let mounts = match mapping {
            Some(path) => read_mapping(path)?,
            None => vec![(DEFAULT_MOUNT.to_string(), PathBuf::new())],
        };

        let mut index = AHashMap::new();
        for (prefix, relative) in &mounts {
            let dir = root.join(relative);
            if !dir.is_dir() {
                tracing::warn!(target: "provider", prefix = %prefix, dir = %dir.display(), "Mount directory missing, skipping");
                continue;
            }
            index_directory(&dir, &dir, prefix, &mut index)?;
        }

        tracing::info!(
            target: "provider",
            root = %root.display(),
            game_version,
            packages = index.len(),
            "Mounted content root"
        );

        Ok(Self {
            root,
            game_version: game_version.to_string(),
            index,
            cache: RwLock::new(AHashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_version(&self) -> &str {
        &self.game_version
    }

    pub fn package_count(&self) -> usize {
        self.index.len()
    }
}

impl AssetProvider for ContentRoot {
    fn try_load_package(&self, path: &str) -> Result<Option<Arc<Package>>, ProviderError> {
        let path = ObjectPath::normalize(path);
        let key = path.package().to_ascii_lowercase();

        if let Some(package) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Ok(Some(Arc::clone(package)));
        }

        let Some((virtual_path, file)) = self.index.get(&key) else {
            return Ok(None);
        };

        let text = fs::read_to_string(file).map_err(|source| ProviderError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let document: PackageDocument =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode {
                path: virtual_path.clone(),
                message: e.to_string(),
            })?;
        let package = Arc::new(Package::new(virtual_path.clone(), document.exports));
        tracing::debug!(target: "provider", path = %virtual_path, exports = package.exports.len(), "Decoded package");

        // A concurrent decode may have landed first; keep its instance
        let cached = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(key)
            .or_insert(package)
            .clone();
        Ok(Some(cached))
    }

    fn virtual_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.index.values().map(|(v, _)| v.clone()).collect();
        paths.sort();
        paths
    }
}

fn read_mapping(path: &Path) -> Result<Vec<(String, PathBuf)>, ProviderError> {
    let text = fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let entries: BTreeMap<String, String> =
        serde_json::from_str(&text).map_err(|e| ProviderError::Mapping {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    if entries.is_empty() {
        return Err(ProviderError::Mapping {
            path: path.display().to_string(),
            message: "mapping declares no mounts".into(),
        });
    }

    let mut mounts = Vec::with_capacity(entries.len());
    for (prefix, dir) in entries {
        let prefix = prefix.trim().trim_end_matches('/');
        if !prefix.starts_with('/') {
            return Err(ProviderError::Mapping {
                path: path.display().to_string(),
                message: format!("virtual prefix '{prefix}' must start with '/'"),
            });
        }
        mounts.push((prefix.to_string(), PathBuf::from(dir)));
    }
    Ok(mounts)
}

fn index_directory(
    base: &Path,
    dir: &Path,
    prefix: &str,
    index: &mut AHashMap<String, (String, PathBuf)>,
) -> Result<(), ProviderError> {
    let io_err = |source| ProviderError::Io {
        path: dir.display().to_string(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if path.is_dir() {
            index_directory(base, &path, prefix, index)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(PACKAGE_EXTENSION) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative = relative.with_extension("");
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let virtual_path = format!("{}/{}", prefix, segments.join("/"));
        index.insert(virtual_path.to_ascii_lowercase(), (virtual_path, path));
    }
    Ok(())
}
