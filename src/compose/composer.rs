//! The library composer.
//!
//! Composition is one synchronous pass per target:
//! 1. discover the source set,
//! 2. register the target through the BSP backend,
//! 3. publish the include path(s),
//! 4. apply the private compile options,
//! 5. record the declared dependencies for later linking.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::compose::bsp::{BspBackend, LibraryRequest};
use crate::compose::discover::{discover_sources, DiscoverError};
use crate::core::graph::{BuildGraph, GraphError, TargetId};
use crate::core::sources::SourceSet;
use crate::core::target::Target;
use crate::util::fs::resolve_against;

/// Errors raised while composing a target.
#[derive(Debug, Error, Diagnostic)]
pub enum ComposeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Discover(#[from] DiscoverError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// `[bsp] backend` names a backend this build does not provide.
    #[error("BSP backend `{name}` is not available")]
    #[diagnostic(
        code(bspkit::compose::backend_unavailable),
        help("the only built-in backend is `default`")
    )]
    BackendUnavailable { name: String },

    /// The backend returned something other than what was asked for.
    #[error("BSP backend `{backend}` violated its contract while registering `{target}`: {reason}")]
    #[diagnostic(code(bspkit::compose::contract_violation))]
    ContractViolation {
        backend: String,
        target: String,
        reason: String,
    },
}

/// Discover the sources of a declared target rooted at `root`.
pub fn discover_for(target: &Target, root: &Path) -> Result<SourceSet, DiscoverError> {
    discover_sources(root, &target.sources, target.kind.is_header_only())
}

/// Composes declared targets into a build graph through a backend.
pub struct LibraryComposer<'a> {
    graph: &'a mut BuildGraph,
    backend: &'a mut dyn BspBackend,
}

impl<'a> LibraryComposer<'a> {
    pub fn new(graph: &'a mut BuildGraph, backend: &'a mut dyn BspBackend) -> Self {
        LibraryComposer { graph, backend }
    }

    /// Discover, register, publish and apply options for one target.
    pub fn compose(&mut self, target: &Target, root: &Path) -> Result<TargetId, ComposeError> {
        let sources = discover_for(target, root)?;
        self.compose_discovered(target, sources)
    }

    /// Compose a target whose sources were discovered beforehand.
    pub fn compose_discovered(
        &mut self,
        target: &Target,
        sources: SourceSet,
    ) -> Result<TargetId, ComposeError> {
        let id = self.register(target, sources)?;
        self.publish_include_dirs(id, target);
        self.apply_compile_options(id, target);
        self.graph.target_mut(id).deps = target.deps.clone();
        Ok(id)
    }

    fn register(&mut self, target: &Target, sources: SourceSet) -> Result<TargetId, ComposeError> {
        let expected_len = sources.len();
        let request = LibraryRequest {
            name: &target.name,
            kind: target.kind,
            sources,
        };
        let id = self.backend.add_library(self.graph, request)?;

        let node = self.graph.target(id);
        let violation = if node.name != target.name {
            Some(format!("returned target `{}`", node.name))
        } else if node.sources.len() != expected_len {
            Some(format!(
                "registered {} source(s) instead of {}",
                node.sources.len(),
                expected_len
            ))
        } else {
            None
        };
        if let Some(reason) = violation {
            // leave the caller's graph as it was before the call
            self.graph.remove_target(id);
            return Err(ComposeError::ContractViolation {
                backend: self.backend.name().to_string(),
                target: target.name.clone(),
                reason,
            });
        }

        tracing::debug!(
            "registered `{}` ({}, {} source(s)) via `{}`",
            target.name,
            target.kind,
            expected_len,
            self.backend.name()
        );
        Ok(id)
    }

    /// Publish the target root (for libraries) and the declared public include
    /// dirs, together with the rest of the public requirements.
    fn publish_include_dirs(&mut self, id: TargetId, target: &Target) {
        let node = self.graph.target_mut(id);
        let root = node.root.clone();
        let declared = &target.surface.compile.public;
        let public = &mut node.surface.compile.public;

        if target.kind.is_library() && !public.include_dirs.contains(&root) {
            public.include_dirs.insert(0, root.clone());
        }
        for dir in &declared.include_dirs {
            let resolved = resolve_against(&root, dir);
            if !public.include_dirs.contains(&resolved) {
                public.include_dirs.push(resolved);
            }
        }
        public.defines.extend(declared.defines.iter().cloned());
        public.cflags.extend(declared.cflags.iter().cloned());
    }

    /// Attach the private requirements and optimization level.
    fn apply_compile_options(&mut self, id: TargetId, target: &Target) {
        let node = self.graph.target_mut(id);
        let root = node.root.clone();
        let declared = &target.surface.compile.private;
        let private = &mut node.surface.compile.private;

        let dirs: Vec<PathBuf> = declared
            .include_dirs
            .iter()
            .map(|d| resolve_against(&root, d))
            .collect();
        private.include_dirs.extend(dirs);
        private.defines.extend(declared.defines.iter().cloned());
        private.cflags.extend(declared.cflags.iter().cloned());

        node.opt_level = target.opt_level;
    }
}
