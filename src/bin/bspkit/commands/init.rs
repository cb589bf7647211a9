//! `bspkit init` command

use anyhow::Result;

use crate::cli::InitArgs;
use bspkit::ops::{init, InitOptions};
use bspkit::util::shell::Status;
use bspkit::util::GlobalContext;

pub fn execute(args: InitArgs, ctx: &GlobalContext) -> Result<()> {
    let path = match args.path {
        Some(p) if p.is_absolute() => p,
        Some(p) => ctx.cwd().join(p),
        None => ctx.cwd().to_path_buf(),
    };

    let manifest_path = init(&path, &InitOptions { name: args.name })?;

    ctx.shell().status(
        Status::Created,
        format!("header library manifest at {}", manifest_path.display()),
    );
    Ok(())
}
