//! The discovered source set of a library target.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::hash::Fingerprint;

/// Header extensions accepted in a header-only library.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++", "inl", "ipp", "tpp"];

/// Check whether a path names a header file.
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HEADER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Files matched by a target's source patterns.
///
/// Paths are stored relative to `root` and kept sorted, so two discoveries
/// of the same tree compare equal regardless of directory walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    root: PathBuf,
    files: BTreeSet<PathBuf>,
}

impl SourceSet {
    /// Create an empty source set rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceSet {
            root: root.into(),
            files: BTreeSet::new(),
        }
    }

    /// Create a source set from relative paths.
    pub fn from_files(
        root: impl Into<PathBuf>,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        SourceSet {
            root: root.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Insert a path relative to the root.
    pub fn insert(&mut self, relative: impl Into<PathBuf>) -> bool {
        self.files.insert(relative.into())
    }

    /// The discovery root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Absolute paths in sorted order.
    pub fn absolute(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(move |f| self.root.join(f))
    }

    /// Check whether a relative path is part of the set.
    pub fn contains(&self, relative: &Path) -> bool {
        self.files.contains(relative)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files present here but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a SourceSet) -> impl Iterator<Item = &'a Path> {
        self.files.difference(&other.files).map(PathBuf::as_path)
    }

    /// Fingerprint of the member list. File contents are not hashed: the
    /// fingerprint only tracks which files the glob matched.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for file in &self.files {
            fp.update_path(file);
        }
        fp.finish_short()
    }
}
