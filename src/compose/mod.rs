//! Library composition: discover a target's files, register it through a
//! BSP backend, publish its include paths and attach its compile options.

pub mod bsp;
pub mod composer;
pub mod discover;

pub use bsp::{backend_for, BspBackend, DefaultBsp, LibraryRequest};
pub use composer::{discover_for, ComposeError, LibraryComposer};
pub use discover::{discover_sources, DiscoverError};
