//! Core data structures for bspkit.
//!
//! This module contains the foundational types used throughout bspkit:
//! - Targets and their surface contracts (public vs private requirements)
//! - Discovered source sets
//! - The build graph
//! - Manifests and workspaces

pub mod graph;
pub mod manifest;
pub mod sources;
pub mod surface;
pub mod target;
pub mod workspace;

pub use graph::{BuildGraph, GraphError, TargetId, TargetNode};
pub use manifest::{Manifest, MANIFEST_NAME};
pub use sources::SourceSet;
pub use surface::Surface;
pub use target::Target;
pub use workspace::{find_manifest, Workspace};
