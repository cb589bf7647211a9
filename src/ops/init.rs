//! Implementation of `bspkit init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{generate_header_library_manifest, Manifest, MANIFEST_NAME};
use crate::util::fs::{ensure_dir, write_string};

/// Options for `bspkit init`.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Target name; defaults to the directory name
    pub name: Option<String>,
}

/// Write a header-library manifest into `path`.
///
/// Returns the manifest path. Fails if a manifest is already there.
pub fn init(path: &Path, opts: &InitOptions) -> Result<PathBuf> {
    ensure_dir(path)?;

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    let name = match &opts.name {
        Some(name) => name.clone(),
        None => default_name(path)?,
    };

    let content = generate_header_library_manifest(&name);
    // reject names the manifest itself would reject
    Manifest::parse(&content, &manifest_path)
        .with_context(|| format!("`{}` is not a valid target name", name))?;

    write_string(&manifest_path, &content)?;
    tracing::debug!("wrote {}", manifest_path.display());

    Ok(manifest_path)
}

fn default_name(path: &Path) -> Result<String> {
    let dir = crate::util::fs::normalize_path(path);
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("cannot derive a target name from `{}`", path.display()))?;

    Ok(name.replace(['-', ' ', '.'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::TargetKind;
    use tempfile::TempDir;

    #[test]
    fn test_init_with_name() {
        let tmp = TempDir::new().unwrap();
        let path = init(
            tmp.path(),
            &InitOptions {
                name: Some("_peripherals".to_string()),
            },
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let target = manifest.target("_peripherals").unwrap();
        assert_eq!(target.kind, TargetKind::HeaderOnly);
    }

    #[test]
    fn test_init_derives_name_from_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("stm32-periph");
        let path = init(&dir, &InitOptions::default()).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert!(manifest.target("stm32_periph").is_some());
    }

    #[test]
    fn test_init_refuses_existing_manifest() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "[package]\nname = \"x\"\n").unwrap();

        let err = init(tmp.path(), &InitOptions::default()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_init_rejects_bad_name() {
        let tmp = TempDir::new().unwrap();
        let result = init(
            tmp.path(),
            &InitOptions {
                name: Some("has space".to_string()),
            },
        );
        assert!(result.is_err());
        assert!(!tmp.path().join(MANIFEST_NAME).exists());
    }
}
