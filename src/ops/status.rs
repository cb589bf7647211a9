//! Implementation of `bspkit status`.

use anyhow::Result;

use crate::builder::fingerprint::{ConfigureStamp, StaleTarget};
use crate::core::workspace::Workspace;
use crate::ops::configure::discover_workspace;

/// How the tree on disk compares to the last configure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Whether a configure stamp exists at all
    pub configured: bool,
    /// Targets whose glob now matches a different set of files
    pub stale: Vec<StaleTarget>,
    /// Targets declared since the last configure
    pub added_targets: Vec<String>,
    /// Targets in the stamp that are no longer declared
    pub removed_targets: Vec<String>,
}

impl StatusReport {
    /// True when configuring again would change nothing.
    pub fn is_fresh(&self) -> bool {
        self.configured
            && self.stale.is_empty()
            && self.added_targets.is_empty()
            && self.removed_targets.is_empty()
    }
}

/// Re-discover every target and compare against the stamp.
pub fn status(ws: &Workspace) -> Result<StatusReport> {
    let Some(stamp) = ConfigureStamp::load(&ws.stamp_path())? else {
        return Ok(StatusReport::default());
    };

    let discovered = discover_workspace(ws)?;
    let mut report = StatusReport {
        configured: true,
        ..Default::default()
    };

    for d in &discovered {
        let name = &d.target.name;
        if !stamp.targets.contains_key(name) {
            report.added_targets.push(name.clone());
        } else if let Some(stale) = stamp.compare(name, &d.sources) {
            tracing::debug!(
                "`{}`: {} added, {} removed",
                name,
                stale.added.len(),
                stale.removed.len()
            );
            report.stale.push(stale);
        }
    }

    report.removed_targets = stamp
        .targets
        .keys()
        .filter(|name| !discovered.iter().any(|d| &d.target.name == *name))
        .cloned()
        .collect();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::configure::{configure, ConfigureOptions};
    use crate::test_support::ProjectFixture;
    use std::path::PathBuf;

    fn stamped() -> (crate::test_support::WrittenFixture, Workspace) {
        let fixture = ProjectFixture::peripherals().write();
        let ws = Workspace::new(&fixture.manifest_path()).unwrap();
        configure(&ws, &ConfigureOptions { write_stamp: true }).unwrap();
        (fixture, ws)
    }

    #[test]
    fn test_unconfigured() {
        let fixture = ProjectFixture::peripherals().write();
        let ws = Workspace::new(&fixture.manifest_path()).unwrap();
        let report = status(&ws).unwrap();
        assert!(!report.configured);
        assert!(!report.is_fresh());
    }

    #[test]
    fn test_fresh_after_configure() {
        let (_fixture, ws) = stamped();
        assert!(status(&ws).unwrap().is_fresh());
    }

    #[test]
    fn test_new_header_makes_target_stale() {
        let (fixture, ws) = stamped();
        fixture.write_file("d/e/new.h", "");
        fixture.remove_file("a/foo.h");

        let report = status(&ws).unwrap();
        assert_eq!(report.stale.len(), 1);
        let stale = &report.stale[0];
        assert_eq!(stale.name, "_peripherals");
        assert_eq!(stale.added, vec![PathBuf::from("d/e/new.h")]);
        assert_eq!(stale.removed, vec![PathBuf::from("a/foo.h")]);
    }

    #[test]
    fn test_non_header_does_not_make_stale() {
        let (fixture, ws) = stamped();
        fixture.write_file("docs/readme.md", "");
        assert!(status(&ws).unwrap().is_fresh());
    }
}
