//! `bspkit sources` command

use anyhow::Result;

use crate::cli::SourcesArgs;
use crate::commands::{configure_in_memory, load_workspace};
use bspkit::util::GlobalContext;

pub fn execute(args: SourcesArgs, ctx: &GlobalContext) -> Result<()> {
    let ws = load_workspace(ctx)?;
    let configured = configure_in_memory(&ws)?;
    let node = configured.graph.target(configured.find(&args.target)?);

    if args.absolute {
        for path in node.sources.absolute() {
            println!("{}", path.display());
        }
    } else {
        for path in node.sources.iter() {
            println!("{}", path.display());
        }
    }
    Ok(())
}
