//! Test utilities and fakes for bspkit unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use bspkit::test_support::{ProjectFixture, RecordingBsp};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::peripherals().write();
//!     let mut bsp = RecordingBsp::new();
//!     // compose through `bsp`, then inspect `bsp.calls`
//! }
//! ```

pub mod fixtures;

use std::path::PathBuf;

pub use fixtures::*;

use crate::compose::{BspBackend, ComposeError, LibraryRequest};
use crate::core::graph::{BuildGraph, TargetId, TargetNode};
use crate::core::target::TargetKind;

/// A registration seen by [`RecordingBsp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub name: String,
    pub kind: TargetKind,
    /// Relative paths, sorted
    pub files: Vec<PathBuf>,
}

/// Backend fake that records every registration.
///
/// It registers plain targets like the default backend does. With
/// [`RecordingBsp::renaming`] it registers under a different name,
/// which breaks the backend contract.
#[derive(Debug, Clone, Default)]
pub struct RecordingBsp {
    pub calls: Vec<RecordedCall>,
    rename_to: Option<String>,
}

impl RecordingBsp {
    pub fn new() -> Self {
        RecordingBsp::default()
    }

    pub fn renaming(name: impl Into<String>) -> Self {
        RecordingBsp {
            calls: Vec::new(),
            rename_to: Some(name.into()),
        }
    }
}

impl BspBackend for RecordingBsp {
    fn name(&self) -> &str {
        "recording"
    }

    fn add_library(
        &mut self,
        graph: &mut BuildGraph,
        request: LibraryRequest<'_>,
    ) -> Result<TargetId, ComposeError> {
        self.calls.push(RecordedCall {
            name: request.name.to_string(),
            kind: request.kind,
            files: request.sources.iter().map(PathBuf::from).collect(),
        });

        let name = self.rename_to.as_deref().unwrap_or(request.name);
        let mut node = TargetNode::new(name, request.kind, request.sources);
        node.backend = self.name().to_string();
        Ok(graph.add_target(node)?)
    }
}
