//! Toolchain configuration files.
//!
//! Two locations are consulted:
//! - Global: `<config dir>/bspkit/toolchain.toml` - user-wide defaults
//! - Project: `.bspkit/toolchain.toml` - project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Toolchain configuration for compiler overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Toolchain settings for flag rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/arm-none-eabi-gcc)
    pub cc: Option<PathBuf>,

    /// Compiler family override: "gcc", "clang" or "msvc"
    pub family: Option<String>,
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration with fallback to defaults if the file
    /// is absent or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!(
                    "failed to load toolchain config from {}: {:#}",
                    path.display(),
                    e
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Check if any toolchain settings are configured.
    pub fn has_overrides(&self) -> bool {
        self.toolchain.cc.is_some() || self.toolchain.family.is_some()
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.family.is_some() {
            self.toolchain.family = other.toolchain.family;
        }
    }
}

/// Load merged toolchain configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.bspkit/toolchain.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_toolchain_config(global_path: Option<&Path>, project_path: &Path) -> ToolchainConfig {
    let mut config = ToolchainConfig::default();

    if let Some(global_path) = global_path {
        config.merge(ToolchainConfig::load_or_default(global_path));
    }

    config.merge(ToolchainConfig::load_or_default(project_path));

    config
}

/// Get the global bspkit config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "bspkit").map(|d| d.config_dir().to_path_buf())
}

/// Get the global toolchain config path.
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the project toolchain config path (.bspkit/toolchain.toml).
pub fn project_toolchain_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".bspkit").join("toolchain.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project/.bspkit/toolchain.toml");

        std::fs::write(
            &global,
            "[toolchain]\ncc = \"/usr/bin/gcc\"\nfamily = \"gcc\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[toolchain]\nfamily = \"clang\"\n").unwrap();

        let config = load_toolchain_config(Some(&global), &project);
        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/usr/bin/gcc")));
        assert_eq!(config.toolchain.family.as_deref(), Some("clang"));
        assert!(config.has_overrides());
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_toolchain_config(None, &tmp.path().join("nope.toml"));
        assert!(!config.has_overrides());
    }

    #[test]
    fn test_broken_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("toolchain.toml");
        std::fs::write(&path, "[toolchain\n").unwrap();
        assert!(!ToolchainConfig::load_or_default(&path).has_overrides());
    }
}
