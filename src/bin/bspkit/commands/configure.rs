//! `bspkit configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::load_workspace;
use bspkit::builder::detect_toolchain;
use bspkit::ops::configure::compile_commands_path;
use bspkit::ops::{configure, ConfigureOptions};
use bspkit::util::shell::Status;
use bspkit::util::GlobalContext;

pub fn execute(args: ConfigureArgs, ctx: &GlobalContext) -> Result<()> {
    let ws = load_workspace(ctx)?;
    let shell = ctx.shell();

    shell.status(Status::Configuring, ws.root().display());
    let configured = configure(&ws, &ConfigureOptions { write_stamp: true })?;

    for &id in &configured.order {
        let node = configured.graph.target(id);
        shell.status(
            Status::Registered,
            format!("{} ({}, {} file(s))", node.name, node.kind, node.sources.len()),
        );
    }

    if args.plan || args.compile_commands {
        let toolchain = detect_toolchain(&ctx.toolchain_config(ws.root()))?;
        let plan = configured.plan(toolchain.as_ref(), &ws.state_dir().join("obj"))?;

        if args.compile_commands {
            let path = compile_commands_path(&ws);
            plan.write_compile_commands(&path)?;
            shell.status(
                Status::Created,
                format!("{} ({} entries)", path.display(), plan.compile_count()),
            );
        }
        if args.plan {
            println!("{}", plan.to_json()?);
        }
    }

    shell.status(
        Status::Finished,
        format!(
            "{} target(s) via `{}` backend",
            configured.graph.len(),
            ws.bsp_config().backend
        ),
    );
    Ok(())
}
