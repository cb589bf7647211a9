//! Configure stamps for stale-glob detection.
//!
//! Source globs are evaluated once, at configure time. A header added or
//! removed afterwards does not change the registered target until the next
//! configure. The stamp records what each target saw so `bspkit status` can
//! point out targets whose glob result moved on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::sources::SourceSet;
use crate::util::fs::{read_to_string, write_string};

/// Stamp format version, bumped on incompatible changes.
pub const STAMP_VERSION: u32 = 1;

/// What one target saw at configure time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetStamp {
    /// Fingerprint of the source set
    pub fingerprint: String,
    /// The discovered files themselves, relative to `sources.root`
    pub sources: SourceSet,
}

/// The configure stamp of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureStamp {
    pub version: u32,
    /// Per-target stamps keyed by target name
    pub targets: BTreeMap<String, TargetStamp>,
}

impl Default for ConfigureStamp {
    fn default() -> Self {
        ConfigureStamp {
            version: STAMP_VERSION,
            targets: BTreeMap::new(),
        }
    }
}

/// A target whose source set changed since the last configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleTarget {
    pub name: String,
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ConfigureStamp {
    /// Record a target's discovered sources.
    pub fn record(&mut self, name: impl Into<String>, sources: &SourceSet) {
        self.targets.insert(
            name.into(),
            TargetStamp {
                fingerprint: sources.fingerprint(),
                sources: sources.clone(),
            },
        );
    }

    /// Load a stamp. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = read_to_string(path)?;
        let stamp: ConfigureStamp = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if stamp.version != STAMP_VERSION {
            tracing::debug!(
                "ignoring configure stamp version {} (expected {})",
                stamp.version,
                STAMP_VERSION
            );
            return Ok(None);
        }
        Ok(Some(stamp))
    }

    /// Save the stamp, creating its directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_string(path, &content)
    }

    /// Compare a fresh discovery of `name` against the stamp.
    ///
    /// Returns `None` when the target is unknown to the stamp or unchanged.
    pub fn compare(&self, name: &str, current: &SourceSet) -> Option<StaleTarget> {
        let stamped = self.targets.get(name)?;
        if stamped.fingerprint == current.fingerprint() {
            return None;
        }

        Some(StaleTarget {
            name: name.to_string(),
            added: current
                .difference(&stamped.sources)
                .map(Path::to_path_buf)
                .collect(),
            removed: stamped
                .sources
                .difference(current)
                .map(Path::to_path_buf)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".bspkit/configure.json");

        let mut stamp = ConfigureStamp::default();
        stamp.record("_peripherals", &SourceSet::from_files("/ws", ["a/foo.h"]));
        stamp.save(&path).unwrap();

        let loaded = ConfigureStamp::load(&path).unwrap().unwrap();
        assert_eq!(loaded, stamp);
    }

    #[test]
    fn test_missing_stamp_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(ConfigureStamp::load(&tmp.path().join("nope.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_compare_reports_added_and_removed() {
        let mut stamp = ConfigureStamp::default();
        stamp.record(
            "_peripherals",
            &SourceSet::from_files("/ws", ["a/foo.h", "b/c/bar.h"]),
        );

        let same = SourceSet::from_files("/ws", ["b/c/bar.h", "a/foo.h"]);
        assert!(stamp.compare("_peripherals", &same).is_none());

        let moved = SourceSet::from_files("/ws", ["a/foo.h", "d/new.h"]);
        let stale = stamp.compare("_peripherals", &moved).unwrap();
        assert_eq!(stale.added, vec![PathBuf::from("d/new.h")]);
        assert_eq!(stale.removed, vec![PathBuf::from("b/c/bar.h")]);

        assert!(stamp.compare("unknown", &moved).is_none());
    }
}
