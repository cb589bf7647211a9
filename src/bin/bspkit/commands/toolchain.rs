//! `bspkit toolchain` command

use anyhow::Result;

use crate::cli::{ToolchainArgs, ToolchainCommands};
use bspkit::builder::detect_toolchain;
use bspkit::util::config::{global_toolchain_config_path, project_toolchain_config_path};
use bspkit::util::GlobalContext;

pub fn execute(args: ToolchainArgs, ctx: &GlobalContext) -> Result<()> {
    match args.command {
        ToolchainCommands::Show => show(ctx),
    }
}

fn show(ctx: &GlobalContext) -> Result<()> {
    // Outside a project only the global config applies
    let root = match ctx.find_manifest() {
        Ok(path) => path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ctx.cwd().to_path_buf()),
        Err(_) => ctx.cwd().to_path_buf(),
    };

    let config = ctx.toolchain_config(&root);
    let toolchain = detect_toolchain(&config)?;

    println!("family:   {}", toolchain.platform());
    println!("compiler: {}", toolchain.compiler_path().display());

    let project = project_toolchain_config_path(&root);
    println!(
        "project config: {}{}",
        project.display(),
        if project.exists() { "" } else { " (not present)" }
    );
    match global_toolchain_config_path() {
        Some(global) => println!(
            "global config:  {}{}",
            global.display(),
            if global.exists() { "" } else { " (not present)" }
        ),
        None => println!("global config:  (no user config directory)"),
    }

    if config.has_overrides() {
        println!("overrides:      active");
    }
    Ok(())
}
