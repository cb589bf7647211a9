//! Bspkit.toml manifest parsing and schema.
//!
//! A manifest lives in the directory whose files it composes. It may declare
//! targets, a `[workspace]` of member manifests, and (in the root manifest)
//! the `[bsp]` backend configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::surface::{CompileRequirements, CompileSurface, Define, OptLevel, Surface};
use crate::core::target::{Target, TargetDep, TargetKind, Visibility};
use crate::util::fs::read_to_string;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Bspkit.toml";

/// Name of the backend used when `[bsp]` does not pick one.
pub const DEFAULT_BACKEND: &str = "default";

/// Workspace configuration from the [workspace] section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfig {
    /// Glob patterns for member directories.
    #[serde(default)]
    pub members: Vec<String>,

    /// Glob patterns for directories to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Board-support backend configuration from the [bsp] section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BspConfig {
    /// Which backend registers library targets
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Board identifier, informational
    #[serde(default)]
    pub board: Option<String>,

    /// Compiler flags applied privately to every registered target
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Defines applied privately to every registered target
    #[serde(default)]
    pub defines: Vec<Define>,
}

fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}

impl Default for BspConfig {
    fn default() -> Self {
        BspConfig {
            backend: default_backend(),
            board: None,
            cflags: Vec::new(),
            defines: Vec::new(),
        }
    }
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Package version (semver)
    #[serde(default = "default_version")]
    pub version: String,

    /// Package description
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl PackageMetadata {
    /// Parse the version string as semver.
    pub fn version(&self) -> Result<Version> {
        self.version
            .parse()
            .with_context(|| format!("invalid version: {}", self.version))
    }
}

/// The parsed Bspkit.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Package metadata
    pub package: Option<PackageMetadata>,

    /// Workspace configuration
    pub workspace: Option<WorkspaceConfig>,

    /// BSP backend configuration
    pub bsp: Option<BspConfig>,

    /// Declared targets, sorted by name
    pub targets: Vec<Target>,

    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    package: Option<PackageMetadata>,

    #[serde(default)]
    workspace: Option<WorkspaceConfig>,

    #[serde(default)]
    bsp: Option<BspConfig>,

    #[serde(default)]
    targets: BTreeMap<String, RawTarget>,
}

/// Raw target from TOML (before processing).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    #[serde(default)]
    kind: Option<TargetKind>,

    #[serde(default)]
    sources: Vec<String>,

    #[serde(default)]
    surface: Option<RawSurface>,

    #[serde(default)]
    opt_level: Option<OptLevel>,

    #[serde(default)]
    deps: Vec<RawTargetDep>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSurface {
    #[serde(default)]
    compile: Option<RawCompileSurface>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompileSurface {
    #[serde(default)]
    public: Option<CompileRequirements>,

    #[serde(default)]
    private: Option<CompileRequirements>,
}

/// Raw target dependency.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTargetDep {
    Simple(String),
    Detailed {
        name: String,
        #[serde(default)]
        compile: Option<Visibility>,
    },
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string(path).context("failed to read manifest")?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        if raw.package.is_none() && raw.workspace.is_none() && raw.targets.is_empty() {
            anyhow::bail!(
                "manifest at {} must have a [package] or [workspace] section, or declare targets",
                path.display()
            );
        }

        let mut targets = Vec::new();
        for (name, raw_target) in raw.targets {
            targets.push(
                Self::convert_target(name.clone(), raw_target)
                    .with_context(|| format!("invalid target `{}` in {}", name, path.display()))?,
            );
        }

        if let Some(ref pkg) = raw.package {
            pkg.version()?;
        }

        Ok(Manifest {
            package: raw.package,
            workspace: raw.workspace,
            bsp: raw.bsp,
            targets,
            manifest_dir,
        })
    }

    fn convert_target(name: String, raw: RawTarget) -> Result<Target> {
        let kind = raw.kind.unwrap_or_default();

        let compile = raw.surface.and_then(|s| s.compile).unwrap_or_default();
        let public = compile.public.unwrap_or_default();
        let private = compile.private.unwrap_or_default();

        let deps = raw
            .deps
            .into_iter()
            .map(|dep| match dep {
                RawTargetDep::Simple(name) => TargetDep::public(name),
                RawTargetDep::Detailed { name, compile } => TargetDep {
                    name,
                    compile: compile.unwrap_or_default(),
                },
            })
            .collect();

        let target = Target {
            name,
            kind,
            sources: raw.sources,
            surface: Surface {
                compile: CompileSurface { public, private },
            },
            opt_level: raw.opt_level,
            deps,
        };

        target.validate()?;

        Ok(target)
    }

    /// Get the package name if this manifest has a package section.
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// Check if this manifest has a workspace section.
    pub fn is_workspace(&self) -> bool {
        self.workspace.is_some()
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }
}

/// Generate a header-only library manifest, the shape of a peripheral
/// header collection: every header below the manifest, compiled without
/// optimization. The manifest's directory is published by the composer.
pub fn generate_header_library_manifest(name: &str) -> String {
    format!(
        r#"[targets.{name}]
kind = "header-only"
sources = ["**/*.h"]
opt_level = "0"
"#
    )
}
