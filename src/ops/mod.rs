//! High-level operations.
//!
//! This module contains the implementation of bspkit commands.

pub mod configure;
pub mod init;
pub mod status;

pub use configure::{
    compose_workspace, configure, configure_with, discover_workspace, ConfigureOptions, Configured,
};
pub use init::{init, InitOptions};
pub use status::{status, StatusReport};
