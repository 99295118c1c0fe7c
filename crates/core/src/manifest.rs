//! Project manifest reader.
//!
//! Reads declared `PackageReference` items from a `*.csproj` file and the
//! package-cache root from the `obj/{name}.csproj.nuget.g.props` file written
//! by restore. Documents are parsed on every call and dropped afterwards.

use crate::error::{RefscopeError, Result};
use crate::model::{PackageId, ProjectInfo};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

const PACKAGE_ROOT_ELEMENT: &str = "NuGetPackageRoot";
const PACKAGE_REFERENCE_ELEMENT: &str = "PackageReference";

pub fn load_basic_info(file_path: &Path) -> ProjectInfo {
    ProjectInfo::from_path(file_path)
}

pub fn load_package_cache_root(info: &ProjectInfo) -> Result<PathBuf> {
    let path = info.props_path();
    let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RefscopeError::MissingCompanionFile { path: path.clone() },
        ErrorKind::InvalidData => RefscopeError::MalformedCompanionFile {
            path: path.clone(),
            reason: e.to_string(),
        },
        _ => RefscopeError::Io(e),
    })?;

    parse_package_cache_root(&content).map_err(|reason| RefscopeError::MalformedCompanionFile {
        path,
        reason,
    })
}

fn parse_package_cache_root(content: &str) -> std::result::Result<PathBuf, String> {
    let doc = roxmltree::Document::parse(content).map_err(|e| e.to_string())?;

    let root = doc
        .descendants()
        .find(|n| n.has_tag_name((MSBUILD_NAMESPACE, PACKAGE_ROOT_ELEMENT)))
        .ok_or_else(|| format!("no {} element", PACKAGE_ROOT_ELEMENT))?;

    let value = root.text().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(format!("{} element is empty", PACKAGE_ROOT_ELEMENT));
    }

    Ok(PathBuf::from(value))
}

/// Reads the manifest fresh and returns every well-formed package reference
/// in document order. Elements lacking a non-empty `Include` or `Version`
/// are skipped.
pub fn load_declared_references(file_path: &Path) -> Result<Vec<PackageId>> {
    let content = std::fs::read_to_string(file_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RefscopeError::MissingManifest {
            path: file_path.to_path_buf(),
        },
        ErrorKind::InvalidData => RefscopeError::MalformedManifest {
            path: file_path.to_path_buf(),
            reason: e.to_string(),
        },
        _ => RefscopeError::Io(e),
    })?;

    parse_declared_references(&content).map_err(|reason| RefscopeError::MalformedManifest {
        path: file_path.to_path_buf(),
        reason,
    })
}

fn parse_declared_references(content: &str) -> std::result::Result<Vec<PackageId>, String> {
    let doc = roxmltree::Document::parse(content).map_err(|e| e.to_string())?;

    let mut references = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == PACKAGE_REFERENCE_ELEMENT)
    {
        let name = node.attribute("Include").map(str::trim).unwrap_or_default();
        let version = node.attribute("Version").map(str::trim).unwrap_or_default();

        if name.is_empty() || version.is_empty() {
            tracing::debug!(
                "Skipping incomplete package reference (Include={:?}, Version={:?})",
                name,
                version
            );
            continue;
        }

        references.push(PackageId::new(name, version));
    }

    Ok(references)
}
