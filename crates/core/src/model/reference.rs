use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A declared package dependency: the `Include`/`Version` pair of a
/// `PackageReference` element.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Library key as it appears under a target in `project.assets.json`.
    pub fn asset_key(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Directory holding this package inside the package cache.
    pub fn install_dir(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(&self.name).join(&self.version)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// One compile-time artifact of a resolved package.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

impl PackageReference {
    /// Joins `cache_root/name/version/asset`. The asset path comes from the
    /// lock file with `/` separators; segments are joined one by one so the
    /// result uses the platform separator.
    pub fn locate(id: &PackageId, cache_root: &Path, asset: &str) -> Self {
        let mut path = id.install_dir(cache_root);
        for segment in asset.split(['/', '\\']).filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        Self {
            name: id.name.clone(),
            version: id.version.clone(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key_format() {
        let id = PackageId::new("Newtonsoft.Json", "13.0.1");
        assert_eq!(id.asset_key(), "Newtonsoft.Json/13.0.1");
    }

    #[test]
    fn test_locate_joins_cache_name_version_asset() {
        let id = PackageId::new("PackageA", "1.2.3");
        let reference = PackageReference::locate(&id, Path::new("/cache"), "lib/net6.0/PackageA.dll");

        let expected: PathBuf = ["/cache", "PackageA", "1.2.3", "lib", "net6.0", "PackageA.dll"]
            .iter()
            .collect();
        assert_eq!(reference.path, expected);
        assert_eq!(reference.name, "PackageA");
        assert_eq!(reference.version, "1.2.3");
    }

    #[test]
    fn test_locate_accepts_backslash_separators() {
        let id = PackageId::new("P", "1.0.0");
        let a = PackageReference::locate(&id, Path::new("/cache"), "lib\\net6.0\\P.dll");
        let b = PackageReference::locate(&id, Path::new("/cache"), "lib/net6.0/P.dll");
        assert_eq!(a.path, b.path);
    }
}
