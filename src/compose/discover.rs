//! Source discovery - recursive glob over a target's root directory.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use miette::Diagnostic;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::manifest::MANIFEST_NAME;
use crate::core::sources::{is_header, SourceSet};

/// Errors raised while discovering a target's sources.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoverError {
    #[error("source root `{}` does not exist", root.display())]
    #[diagnostic(
        code(bspkit::discover::missing_root),
        help("the manifest directory must exist at configure time")
    )]
    MissingRoot { root: PathBuf },

    #[error("source root `{}` is not a directory", root.display())]
    #[diagnostic(code(bspkit::discover::not_a_directory))]
    NotADirectory { root: PathBuf },

    #[error("invalid source pattern `{pattern}`")]
    #[diagnostic(code(bspkit::discover::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no files under `{}` match {}", root.display(), patterns.join(", "))]
    #[diagnostic(
        code(bspkit::discover::no_sources),
        help("an empty library is a configuration error; check the sources patterns")
    )]
    NoSources { root: PathBuf, patterns: Vec<String> },

    #[error("`{}` under `{}` is not a header", file.display(), root.display())]
    #[diagnostic(
        code(bspkit::discover::not_a_header),
        help("header-only targets may only match header files; narrow the pattern")
    )]
    NotAHeader { root: PathBuf, file: PathBuf },

    #[error("failed to walk `{}`", root.display())]
    #[diagnostic(code(bspkit::discover::walk))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Compiled include/exclude patterns. A leading `!` marks an exclude.
struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl PatternSet {
    fn compile(patterns: &[String]) -> Result<Self, DiscoverError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for raw in patterns {
            let (negated, text) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = Pattern::new(text).map_err(|source| DiscoverError::InvalidPattern {
                pattern: raw.clone(),
                source,
            })?;
            if negated {
                exclude.push(pattern);
            } else {
                include.push(pattern);
            }
        }
        Ok(PatternSet { include, exclude })
    }

    fn matches(&self, relative: &Path) -> bool {
        self.include
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }
}

/// Discover the files under `root` matching `patterns`.
///
/// Patterns are matched against paths relative to `root` with `/`
/// separators, so `**/*.h` matches headers at any depth including the
/// root itself. Hidden directories and nested directories that carry
/// their own manifest are not descended into. With `headers_only`, every
/// match must be a header file.
///
/// An empty result is an error: a library with no sources is never
/// silently registered.
pub fn discover_sources(
    root: &Path,
    patterns: &[String],
    headers_only: bool,
) -> Result<SourceSet, DiscoverError> {
    if !root.exists() {
        return Err(DiscoverError::MissingRoot {
            root: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory {
            root: root.to_path_buf(),
        });
    }

    let patterns_set = PatternSet::compile(patterns)?;
    let mut set = SourceSet::new(root);

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let nested_manifest = entry.path().join(MANIFEST_NAME).is_file();
            if nested_manifest {
                tracing::debug!("not descending into nested manifest {}", entry.path().display());
            }
            !hidden && !nested_manifest
        });

    for entry in walker {
        let entry = entry.map_err(|source| DiscoverError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        if !patterns_set.matches(&relative) {
            continue;
        }

        if headers_only && !is_header(&relative) {
            return Err(DiscoverError::NotAHeader {
                root: root.to_path_buf(),
                file: relative,
            });
        }

        set.insert(relative);
    }

    if set.is_empty() {
        return Err(DiscoverError::NoSources {
            root: root.to_path_buf(),
            patterns: patterns.to_vec(),
        });
    }

    tracing::debug!(
        "discovered {} file(s) under {}",
        set.len(),
        root.display()
    );
    Ok(set)
}
