//! `bspkit flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use crate::commands::{configure_in_memory, load_workspace};
use bspkit::builder::toolchain::toolchain_for;
use bspkit::builder::{detect_toolchain, resolve_compile_surface};
use bspkit::util::GlobalContext;

pub fn execute(args: FlagsArgs, ctx: &GlobalContext) -> Result<()> {
    let ws = load_workspace(ctx)?;
    let configured = configure_in_memory(&ws)?;
    let id = configured.find(&args.target)?;

    let toolchain = match args.toolchain {
        Some(family) => toolchain_for(family.into(), None),
        None => detect_toolchain(&ctx.toolchain_config(ws.root()))?,
    };
    let tc = toolchain.as_ref();
    let surface = resolve_compile_surface(&configured.graph, id);

    if args.plain {
        println!("{}", surface.to_flags(tc).join(" "));
        return Ok(());
    }

    // Print compile flags with provenance
    println!("# Compile flags for `{}` ({}):", args.target, tc.platform());

    if let Some(level) = surface.opt_level {
        println!("  {}    # from: {} (opt_level)", tc.opt_flag(level), args.target);
    }

    for item in &surface.include_dirs {
        println!("  {}    # from: {}", tc.include_flag(&item.value), item.provenance);
    }

    for item in &surface.defines {
        println!("  {}    # from: {}", tc.define_flag(&item.value), item.provenance);
    }

    for item in &surface.cflags {
        println!("  {}    # from: {}", item.value, item.provenance);
    }

    Ok(())
}
