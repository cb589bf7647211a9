//! Target definitions - what a manifest declares.
//!
//! A [`Target`] is the manifest-level declaration: a name, a kind, source
//! patterns, and a compile surface. It becomes a node of the build graph
//! once its sources are discovered and the BSP backend registers it.

use serde::{Deserialize, Serialize};

use crate::core::surface::{OptLevel, Surface};

/// The kind of target being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetKind {
    /// Header-only library (no compiled body of its own)
    #[default]
    #[serde(rename = "header-only", alias = "headeronly", alias = "interface")]
    HeaderOnly,

    /// Static library (.a / .lib)
    #[serde(rename = "staticlib", alias = "lib", alias = "static")]
    StaticLib,

    /// Executable image
    #[serde(rename = "exe", alias = "bin")]
    Exe,
}

impl TargetKind {
    /// Manifest spelling of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::HeaderOnly => "header-only",
            TargetKind::StaticLib => "staticlib",
            TargetKind::Exe => "exe",
        }
    }

    /// Check if this is a library (static or header-only).
    pub fn is_library(&self) -> bool {
        matches!(self, TargetKind::StaticLib | TargetKind::HeaderOnly)
    }

    /// Check if this is a header-only library.
    pub fn is_header_only(&self) -> bool {
        matches!(self, TargetKind::HeaderOnly)
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a dependency's public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Re-exported to whoever depends on the dependent
    #[default]
    Public,
    /// Seen by the dependent only
    Private,
}

/// A target-level dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDep {
    /// Name of the target depended upon
    pub name: String,

    /// Whether the dependency's public surface is re-exported
    #[serde(default)]
    pub compile: Visibility,
}

impl TargetDep {
    /// Create a public dependency on `name`.
    pub fn public(name: impl Into<String>) -> Self {
        TargetDep {
            name: name.into(),
            compile: Visibility::Public,
        }
    }

    /// Create a private dependency on `name`.
    pub fn private(name: impl Into<String>) -> Self {
        TargetDep {
            name: name.into(),
            compile: Visibility::Private,
        }
    }
}

/// C, C++ and assembly extensions that carry a compiled body.
const COMPILED_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx", ".c++", ".s", ".S", ".asm"];

/// A target as declared in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within the build graph
    pub name: String,

    /// What kind of artifact this is
    #[serde(default)]
    pub kind: TargetKind,

    /// Source file patterns (globs, relative to the manifest directory)
    #[serde(default)]
    pub sources: Vec<String>,

    /// Surface contract (compile requirements)
    #[serde(default)]
    pub surface: Surface,

    /// Optimization level for this target's own compilation units
    #[serde(default)]
    pub opt_level: Option<OptLevel>,

    /// Targets this one depends on
    #[serde(default)]
    pub deps: Vec<TargetDep>,
}

impl Target {
    /// Create a new target with the given name and kind.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Target {
            name: name.into(),
            kind,
            sources: Vec::new(),
            surface: Surface::default(),
            opt_level: None,
            deps: Vec::new(),
        }
    }

    /// Create a new header-only library target.
    pub fn header_only(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::HeaderOnly)
    }

    /// Create a new static library target.
    pub fn staticlib(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::StaticLib)
    }

    /// Create a new executable target.
    pub fn exe(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Exe)
    }

    /// Set source patterns.
    pub fn with_sources(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sources = patterns.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Set the private optimization level.
    pub fn with_opt_level(mut self, level: OptLevel) -> Self {
        self.opt_level = Some(level);
        self
    }

    /// Add a dependency.
    pub fn with_dep(mut self, dep: TargetDep) -> Self {
        self.deps.push(dep);
        self
    }

    /// Validate target configuration.
    ///
    /// Checks for:
    /// - A usable name
    /// - At least one source pattern
    /// - Header-only targets must not name compiled sources
    /// - No self-dependency
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            anyhow::bail!(
                "invalid target name `{}`\n\
                 hint: use ASCII letters, digits, `_`, `-` or `.`",
                self.name
            );
        }

        if self.sources.is_empty() {
            anyhow::bail!(
                "target `{}` has no source patterns\n\
                 hint: add sources = [\"**/*.h\"]",
                self.name
            );
        }

        if self.kind.is_header_only() {
            for pattern in &self.sources {
                if COMPILED_EXTENSIONS.iter().any(|ext| pattern.ends_with(ext)) {
                    anyhow::bail!(
                        "header-only target `{}` names compiled sources (`{}`)\n\
                         hint: match headers only, or change kind to staticlib",
                        self.name,
                        pattern
                    );
                }
            }
        }

        if self.deps.iter().any(|d| d.name == self.name) {
            anyhow::bail!("target `{}` depends on itself", self.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_spellings() {
        #[derive(Deserialize)]
        struct Holder {
            kind: TargetKind,
        }

        for (text, kind) in [
            ("header-only", TargetKind::HeaderOnly),
            ("interface", TargetKind::HeaderOnly),
            ("staticlib", TargetKind::StaticLib),
            ("lib", TargetKind::StaticLib),
            ("exe", TargetKind::Exe),
        ] {
            let h: Holder = toml::from_str(&format!("kind = \"{}\"", text)).unwrap();
            assert_eq!(h.kind, kind);
        }
        assert!(toml::from_str::<Holder>("kind = \"dll\"").is_err());
    }

    #[test]
    fn test_target_builder() {
        let target = Target::header_only("_peripherals")
            .with_sources(["**/*.h"])
            .with_opt_level(OptLevel::None)
            .with_dep(TargetDep::private("_core"));

        assert_eq!(target.kind, TargetKind::HeaderOnly);
        assert_eq!(target.sources, vec!["**/*.h"]);
        assert_eq!(target.opt_level, Some(OptLevel::None));
        assert_eq!(target.deps[0].compile, Visibility::Private);
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_header_only_rejects_compiled_patterns() {
        let target = Target::header_only("periph").with_sources(["**/*.c"]);
        let err = target.validate().unwrap_err().to_string();
        assert!(err.contains("names compiled sources"));

        let lib = Target::staticlib("periph").with_sources(["**/*.c"]);
        assert!(lib.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_sources_and_name() {
        assert!(Target::header_only("x").validate().is_err());
        assert!(Target::header_only("bad name")
            .with_sources(["*.h"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let target = Target::header_only("a")
            .with_sources(["*.h"])
            .with_dep(TargetDep::public("a"));
        assert!(target.validate().is_err());
    }
}
