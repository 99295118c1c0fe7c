//! Flattened view of `obj/project.assets.json`.
//!
//! Only the first target listed under `targets` is indexed. Projects that
//! multi-target get the first framework's compile assets.

use crate::error::{RefscopeError, Result};
use crate::model::PackageId;
use indexmap::IndexMap;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    target: Option<String>,
    entries: IndexMap<String, Vec<String>>,
}

impl AssetIndex {
    pub fn build(assets_path: &Path) -> Result<Self> {
        let malformed = |reason: String| RefscopeError::MalformedAssetsFile {
            path: assets_path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(assets_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RefscopeError::MissingAssetsFile {
                path: assets_path.to_path_buf(),
            },
            ErrorKind::InvalidData => malformed(e.to_string()),
            _ => RefscopeError::Io(e),
        })?;

        let document: Value = serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?;
        let index = Self::from_document(&document).map_err(malformed)?;

        tracing::info!(
            "Indexed {} packages from {} (target: {})",
            index.len(),
            assets_path.display(),
            index.target().unwrap_or("<none>")
        );

        Ok(index)
    }

    pub fn from_document(document: &Value) -> std::result::Result<Self, String> {
        let targets = document
            .get("targets")
            .ok_or_else(|| "missing `targets` section".to_string())?
            .as_object()
            .ok_or_else(|| "`targets` is not an object".to_string())?;

        let Some((target, libraries)) = targets.iter().next() else {
            return Ok(Self::default());
        };

        if targets.len() > 1 {
            tracing::debug!(
                "Lock file lists {} targets, using the first ({})",
                targets.len(),
                target
            );
        }

        let libraries = libraries
            .as_object()
            .ok_or_else(|| format!("target `{}` is not an object", target))?;

        let mut entries = IndexMap::new();
        for (library, metadata) in libraries {
            let compile: Vec<String> = metadata
                .get("compile")
                .and_then(Value::as_object)
                .map(|c| c.keys().cloned().collect())
                .unwrap_or_default();

            if compile.is_empty() {
                continue;
            }
            entries.insert(library.clone(), compile);
        }

        Ok(Self {
            target: Some(target.clone()),
            entries,
        })
    }

    /// Name of the target the index was built from.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn get(&self, id: &PackageId) -> Option<&[String]> {
        self.entries.get(&id.asset_key()).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &PackageId) -> bool {
        self.entries.contains_key(&id.asset_key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
