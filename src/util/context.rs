//! Global context for bspkit operations.
//!
//! Provides centralized access to the working directory, manifest lookup,
//! toolchain configuration, and the output shell.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::workspace::find_manifest;
use crate::util::config::{
    global_toolchain_config_path, load_toolchain_config, project_toolchain_config_path,
    ToolchainConfig,
};
use crate::util::diagnostic::suggestions;
use crate::util::shell::Shell;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Explicit `--manifest-path`, bypassing the upward search
    manifest_path: Option<PathBuf>,

    shell: Shell,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            manifest_path: None,
            shell: Shell::default(),
        }
    }

    /// Use an explicit manifest instead of searching from the cwd.
    pub fn with_manifest_path(mut self, path: Option<PathBuf>) -> Self {
        self.manifest_path = path.map(|p| {
            if p.is_absolute() {
                p
            } else {
                self.cwd.join(p)
            }
        });
        self
    }

    /// Replace the output shell.
    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the output shell.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Locate the root manifest.
    ///
    /// An explicit `--manifest-path` wins; otherwise the search walks up
    /// from the working directory.
    pub fn find_manifest(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.manifest_path {
            if !path.is_file() {
                anyhow::bail!("manifest path `{}` does not exist", path.display());
            }
            return Ok(path.clone());
        }

        find_manifest(&self.cwd).ok_or_else(|| {
            anyhow::anyhow!(
                "could not find Bspkit.toml in {} or any parent directory\n{}",
                self.cwd.display(),
                suggestions::NO_MANIFEST
            )
        })
    }

    /// Load the merged toolchain configuration for a project.
    pub fn toolchain_config(&self, project_root: &Path) -> ToolchainConfig {
        let global = global_toolchain_config_path();
        load_toolchain_config(
            global.as_deref(),
            &project_toolchain_config_path(project_root),
        )
    }
}
