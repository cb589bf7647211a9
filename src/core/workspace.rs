//! Workspace - the root manifest and its member manifests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::{BspConfig, Manifest, MANIFEST_NAME};
use crate::core::target::Target;
use crate::util::fs::{normalize_path, relative_path};

/// Find the manifest file by walking up from `start`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

/// One manifest taking part in a configuration pass.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member directory, relative to the workspace root (`""` for the root)
    pub rel_dir: PathBuf,
    pub manifest: Manifest,
}

impl Member {
    /// Absolute directory of this member.
    pub fn dir(&self) -> &Path {
        &self.manifest.manifest_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir().join(MANIFEST_NAME)
    }

    pub fn targets(&self) -> &[Target] {
        &self.manifest.targets
    }
}

/// A workspace containing the root manifest and its members.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    root_manifest: Manifest,
    members: Vec<Member>,
}

impl Workspace {
    /// Load a workspace from the root manifest path.
    ///
    /// The root manifest is a member itself when it declares targets.
    /// `[workspace] members` globs are expanded relative to the root and
    /// sorted, so the member order does not depend on directory listing
    /// order.
    pub fn new(manifest_path: &Path) -> Result<Self> {
        let manifest_path = normalize_path(manifest_path);
        let root_manifest = Manifest::load(&manifest_path)?;
        let root = root_manifest.manifest_dir.clone();

        let mut members = Vec::new();
        if !root_manifest.targets.is_empty() {
            members.push(Member {
                rel_dir: PathBuf::new(),
                manifest: root_manifest.clone(),
            });
        }

        if let Some(ref ws) = root_manifest.workspace {
            for dir in expand_members(&root, &ws.members, &ws.exclude)? {
                if dir == root {
                    continue;
                }
                let member_manifest = dir.join(MANIFEST_NAME);
                if !member_manifest.is_file() {
                    anyhow::bail!(
                        "workspace member `{}` has no {}",
                        relative_path(&root, &dir).display(),
                        MANIFEST_NAME
                    );
                }

                let manifest = Manifest::load(&member_manifest)?;
                if manifest.bsp.is_some() {
                    tracing::warn!(
                        "[bsp] in member {} is ignored; configure the backend in the root manifest",
                        member_manifest.display()
                    );
                }
                members.push(Member {
                    rel_dir: relative_path(&root, &dir),
                    manifest,
                });
            }
        }

        tracing::debug!(
            "workspace at {} has {} member(s)",
            root.display(),
            members.len()
        );

        Ok(Workspace {
            root,
            root_manifest,
            members,
        })
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Members in configuration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// The BSP configuration from the root manifest.
    pub fn bsp_config(&self) -> BspConfig {
        self.root_manifest.bsp.clone().unwrap_or_default()
    }

    /// Directory holding bspkit's own state for this workspace.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".bspkit")
    }

    /// Path of the configure stamp.
    pub fn stamp_path(&self) -> PathBuf {
        self.state_dir().join("configure.json")
    }
}

fn expand_members(root: &Path, members: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let exclude: Vec<glob::Pattern> = exclude
        .iter()
        .map(|p| {
            glob::Pattern::new(p).with_context(|| format!("invalid workspace exclude: {}", p))
        })
        .collect::<Result<_>>()?;

    let mut dirs = Vec::new();
    for pattern in members {
        let full = root.join(pattern);
        let mut matched = false;
        for entry in glob::glob(&full.to_string_lossy())
            .with_context(|| format!("invalid workspace member pattern: {}", pattern))?
        {
            let path = entry.with_context(|| format!("failed to expand `{}`", pattern))?;
            if !path.is_dir() {
                continue;
            }
            matched = true;
            let rel = relative_path(root, &path);
            if exclude.iter().any(|p| p.matches_path(&rel)) {
                tracing::debug!("excluding workspace member {}", rel.display());
                continue;
            }
            dirs.push(normalize_path(&path));
        }
        if !matched {
            anyhow::bail!("workspace member pattern `{}` matched no directories", pattern);
        }
    }

    dirs.sort();
    dirs.dedup();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectFixture;

    #[test]
    fn test_single_manifest_workspace() {
        let fixture = ProjectFixture::peripherals().write();
        let ws = Workspace::new(&fixture.manifest_path()).unwrap();

        assert_eq!(ws.members().len(), 1);
        assert_eq!(ws.members()[0].rel_dir, PathBuf::new());
        assert!(ws.members()[0].manifest.target("_peripherals").is_some());
        assert!(ws.stamp_path().ends_with(".bspkit/configure.json"));
    }

    #[test]
    fn test_members_expanded_sorted_and_excluded() {
        let fixture = ProjectFixture::new()
            .file(
                "Bspkit.toml",
                "[workspace]\nmembers = [\"drivers/*\", \"peripherals\"]\nexclude = [\"drivers/legacy\"]\n",
            )
            .library("peripherals", "_peripherals")
            .library("drivers/uart", "uart")
            .library("drivers/gpio", "gpio")
            .library("drivers/legacy", "legacy")
            .write();

        let ws = Workspace::new(&fixture.manifest_path()).unwrap();
        let dirs: Vec<_> = ws.members().iter().map(|m| m.rel_dir.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("drivers/gpio"),
                PathBuf::from("drivers/uart"),
                PathBuf::from("peripherals"),
            ]
        );
        assert!(ws
            .members()
            .iter()
            .all(|m| m.manifest.target("legacy").is_none()));
    }

    #[test]
    fn test_member_without_manifest_fails() {
        let fixture = ProjectFixture::new()
            .file("Bspkit.toml", "[workspace]\nmembers = [\"empty\"]\n")
            .file("empty/readme.txt", "nothing here")
            .write();

        let err = Workspace::new(&fixture.manifest_path()).unwrap_err();
        assert!(err.to_string().contains("has no Bspkit.toml"));
    }

    #[test]
    fn test_member_pattern_matching_nothing_fails() {
        let fixture = ProjectFixture::new()
            .file("Bspkit.toml", "[workspace]\nmembers = [\"missing/*\"]\n")
            .write();

        let err = Workspace::new(&fixture.manifest_path()).unwrap_err();
        assert!(err.to_string().contains("matched no directories"));
    }

    #[test]
    fn test_find_manifest_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("x");
        std::fs::create_dir_all(&nested).unwrap();
        // the temp root carries no manifest; anything found must be above it
        if let Some(found) = find_manifest(&nested) {
            assert!(!found.starts_with(tmp.path()));
        }
    }
}
