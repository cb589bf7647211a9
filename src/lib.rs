//! bspkit - composes board-support libraries into a build graph
//!
//! A manifest declares library targets by a recursive source glob, the
//! include paths they publish, and the compile options they keep to
//! themselves. bspkit discovers the sources, registers each target through
//! a board-support backend, and reports the compile surface its dependents
//! receive.

pub mod builder;
pub mod compose;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and fakes for bspkit unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides project fixtures and a recording BSP backend.
#[cfg(test)]
pub mod test_support;

pub use compose::{BspBackend, LibraryComposer};
pub use core::{
    graph::BuildGraph, manifest::Manifest, sources::SourceSet, surface::Surface, target::Target,
    workspace::Workspace,
};
pub use util::context::GlobalContext;
