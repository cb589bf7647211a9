//! Board-support backends - the collaborator that turns a name and a
//! source set into a registered target.
//!
//! The composer never inserts into the build graph itself; it asks a
//! [`BspBackend`] to do so. Backends decide what "library" means for a
//! board. Tests substitute a recording backend.

use crate::compose::ComposeError;
use crate::core::graph::{BuildGraph, TargetId, TargetNode};
use crate::core::manifest::{BspConfig, DEFAULT_BACKEND};
use crate::core::sources::SourceSet;
use crate::core::surface::CompileRequirements;
use crate::core::target::TargetKind;

/// What the composer hands to a backend.
#[derive(Debug, Clone)]
pub struct LibraryRequest<'a> {
    pub name: &'a str,
    pub kind: TargetKind,
    pub sources: SourceSet,
}

/// A board-support backend.
pub trait BspBackend {
    /// Backend identifier, recorded on every target it registers.
    fn name(&self) -> &str;

    /// Register a target built from `request` and return its handle.
    fn add_library(
        &mut self,
        graph: &mut BuildGraph,
        request: LibraryRequest<'_>,
    ) -> Result<TargetId, ComposeError>;
}

/// The built-in backend.
///
/// Registers plain targets. Board-wide flags and defines from `[bsp]`
/// become private requirements of each target it registers; it never
/// adds anything to a target's public surface.
#[derive(Debug, Clone, Default)]
pub struct DefaultBsp {
    board: Option<String>,
    board_requirements: CompileRequirements,
}

impl DefaultBsp {
    pub fn new() -> Self {
        DefaultBsp::default()
    }

    /// Build the backend from the root manifest's `[bsp]` section.
    pub fn from_config(config: &BspConfig) -> Self {
        DefaultBsp {
            board: config.board.clone(),
            board_requirements: CompileRequirements {
                include_dirs: Vec::new(),
                defines: config.defines.clone(),
                cflags: config.cflags.clone(),
            },
        }
    }
}

impl BspBackend for DefaultBsp {
    fn name(&self) -> &str {
        DEFAULT_BACKEND
    }

    fn add_library(
        &mut self,
        graph: &mut BuildGraph,
        request: LibraryRequest<'_>,
    ) -> Result<TargetId, ComposeError> {
        let mut node = TargetNode::new(request.name, request.kind, request.sources);
        node.backend = self.name().to_string();
        node.surface.compile.private.merge(&self.board_requirements);

        let id = graph.add_target(node)?;
        tracing::debug!(
            "{} backend registered `{}`{}",
            DEFAULT_BACKEND,
            request.name,
            self.board
                .as_deref()
                .map(|b| format!(" for board {}", b))
                .unwrap_or_default()
        );
        Ok(id)
    }
}

/// Select the backend named in `[bsp] backend`.
pub fn backend_for(config: &BspConfig) -> Result<Box<dyn BspBackend>, ComposeError> {
    match config.backend.as_str() {
        DEFAULT_BACKEND => Ok(Box::new(DefaultBsp::from_config(config))),
        other => Err(ComposeError::BackendUnavailable {
            name: other.to_string(),
        }),
    }
}
