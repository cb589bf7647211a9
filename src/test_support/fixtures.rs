//! Test fixtures for common test scenarios.
//!
//! A [`ProjectFixture`] describes a project tree as a set of files and
//! writes it into a fresh temporary directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::{generate_header_library_manifest, MANIFEST_NAME};

/// Fixture for a project structure.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    /// Files (path relative to project root -> content).
    files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create an empty project fixture.
    pub fn new() -> Self {
        ProjectFixture::default()
    }

    /// The `_peripherals` header library: a root manifest composing every
    /// header below it, with two headers and one non-header file.
    pub fn peripherals() -> Self {
        ProjectFixture::new()
            .library("", "_peripherals")
            .file("a/foo.h", "#pragma once\n")
            .file("b/c/bar.h", "#pragma once\n")
            .file("notes.txt", "not a header\n")
    }

    /// Add or replace a file.
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Append to a file, creating it if needed.
    pub fn file_append(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.entry(path.into()).or_default().push_str(content);
        self
    }

    /// Add a header-only library manifest in `dir` (`""` for the root).
    pub fn library(self, dir: &str, name: &str) -> Self {
        let path = Path::new(dir).join(MANIFEST_NAME);
        self.file(path, generate_header_library_manifest(name))
    }

    /// Write the fixture into a new temporary directory.
    pub fn write(&self) -> WrittenFixture {
        let dir = TempDir::new().expect("failed to create temp dir");
        // canonical root so paths compare equal to what the workspace sees
        let root = dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize temp dir");

        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("failed to create fixture dir");
            }
            std::fs::write(&path, content).expect("failed to write fixture file");
        }

        WrittenFixture { _dir: dir, root }
    }
}

/// A fixture on disk. The directory is removed when this is dropped.
#[derive(Debug)]
pub struct WrittenFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl WrittenFixture {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the root manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_NAME)
    }

    /// Write or overwrite a file after the fact.
    pub fn write_file(&self, rel: impl AsRef<Path>, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(path, content).expect("failed to write fixture file");
    }

    pub fn remove_file(&self, rel: impl AsRef<Path>) {
        std::fs::remove_file(self.root.join(rel)).expect("failed to remove fixture file");
    }
}
