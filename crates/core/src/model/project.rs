use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path facts about a project manifest.
///
/// All fields are derived from a single manifest path; the struct is replaced
/// whole whenever the manifest moves, never patched field by field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectInfo {
    /// Directory containing the manifest.
    pub root_directory: PathBuf,
    /// Manifest file stem, e.g. `App` for `App.csproj`.
    pub name: String,
    pub file_path: PathBuf,
    pub file_name: String,
}

impl ProjectInfo {
    /// Decomposes a manifest path. Never fails: components that cannot be
    /// derived are left empty.
    pub fn from_path(file_path: &Path) -> Self {
        let root_directory = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_name = file_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            root_directory,
            name,
            file_path: file_path.to_path_buf(),
            file_name,
        }
    }

    pub fn obj_dir(&self) -> PathBuf {
        self.root_directory.join("obj")
    }

    /// `obj/{name}.csproj.nuget.g.props`, written by restore.
    pub fn props_path(&self) -> PathBuf {
        self.obj_dir()
            .join(format!("{}.csproj.nuget.g.props", self.name))
    }

    /// `obj/project.assets.json`, the restore lock file.
    pub fn assets_path(&self) -> PathBuf {
        self.obj_dir().join("project.assets.json")
    }
}
