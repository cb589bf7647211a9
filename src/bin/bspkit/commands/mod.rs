//! Command implementations

pub mod completions;
pub mod configure;
pub mod flags;
pub mod init;
pub mod sources;
pub mod status;
pub mod toolchain;
pub mod tree;

use anyhow::Result;

use bspkit::core::Workspace;
use bspkit::ops::configure::{configure, ConfigureOptions, Configured};
use bspkit::util::GlobalContext;

/// Load the workspace of the root manifest.
pub fn load_workspace(ctx: &GlobalContext) -> Result<Workspace> {
    let manifest_path = ctx.find_manifest()?;
    Workspace::new(&manifest_path)
}

/// Configure the workspace in memory, without touching the stamp.
pub fn configure_in_memory(ws: &Workspace) -> Result<Configured> {
    configure(ws, &ConfigureOptions::default())
}
