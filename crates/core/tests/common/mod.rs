#![allow(dead_code)]

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A restored project on disk: manifest, companion props and lock file.
pub struct ProjectFixture {
    pub dir: TempDir,
    pub manifest: PathBuf,
}

impl ProjectFixture {
    /// Creates `{name}.csproj` declaring `packages`, with restore output
    /// pointing at `cache_root` and a single-target lock file.
    pub fn new(name: &str, cache_root: &str, packages: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join(format!("{}.csproj", name));

        let fixture = Self { dir, manifest };
        fixture.write_manifest(packages);
        fixture.write_props(name, cache_root);
        fixture.write_assets(default_assets());
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_manifest(&self, packages: &[(&str, &str)]) {
        write_manifest_at(&self.manifest, packages);
    }

    pub fn write_props(&self, name: &str, cache_root: &str) {
        let obj = self.root().join("obj");
        fs::create_dir_all(&obj).unwrap();
        fs::write(
            obj.join(format!("{}.csproj.nuget.g.props", name)),
            format!(
                r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<Project ToolsVersion="14.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup Condition=" '$(ExcludeRestorePackageImports)' != 'true' ">
    <NuGetPackageRoot Condition=" '$(NuGetPackageRoot)' == '' ">{}</NuGetPackageRoot>
  </PropertyGroup>
</Project>"#,
                cache_root
            ),
        )
        .unwrap();
    }

    pub fn write_assets(&self, document: Value) {
        let obj = self.root().join("obj");
        fs::create_dir_all(&obj).unwrap();
        fs::write(
            obj.join("project.assets.json"),
            serde_json::to_string_pretty(&document).unwrap(),
        )
        .unwrap();
    }
}

pub fn write_manifest_at(path: &Path, packages: &[(&str, &str)]) {
    let items: String = packages
        .iter()
        .map(|(name, version)| {
            format!(
                "    <PackageReference Include=\"{}\" Version=\"{}\" />\n",
                name, version
            )
        })
        .collect();
    fs::write(
        path,
        format!(
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <ItemGroup>\n{}  </ItemGroup>\n</Project>\n",
            items
        ),
    )
    .unwrap();
}

pub fn default_assets() -> Value {
    json!({
        "version": 3,
        "targets": {
            "net6.0": {
                "PackageA/1.2.3": {
                    "type": "package",
                    "compile": { "lib/net6.0/PackageA.dll": {} },
                    "runtime": { "lib/net6.0/PackageA.dll": {} }
                },
                "PackageB/4.5.6": {
                    "type": "package",
                    "compile": {
                        "lib/net6.0/PackageB.dll": {},
                        "lib/net6.0/PackageB.Contracts.dll": {}
                    }
                },
                "Build.Tasks/1.0.0": {
                    "type": "package"
                }
            }
        }
    })
}

/// Expected artifact path, joined segment by segment.
pub fn artifact(cache_root: &str, segments: &[&str]) -> PathBuf {
    let mut path = PathBuf::from(cache_root);
    for segment in segments {
        path.push(segment);
    }
    path
}
