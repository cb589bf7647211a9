//! `bspkit status` command

use anyhow::Result;

use crate::commands::load_workspace;
use bspkit::ops::status;
use bspkit::util::diagnostic::{emit, suggestions, Diagnostic};
use bspkit::util::shell::Status;
use bspkit::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let ws = load_workspace(ctx)?;
    let shell = ctx.shell();
    let report = status(&ws)?;

    if !report.configured {
        emit(
            &Diagnostic::note("workspace has not been configured")
                .with_location(ws.root())
                .with_suggestion(suggestions::NOT_CONFIGURED),
            shell.use_color(),
        );
        return Ok(());
    }

    if report.is_fresh() {
        shell.status(Status::Finished, "every source set matches the last configure");
        return Ok(());
    }

    for stale in &report.stale {
        shell.status(Status::Stale, &stale.name);
        let mut diag = Diagnostic::warning(format!(
            "source set of `{}` changed since last configure",
            stale.name
        ));
        for path in &stale.added {
            diag = diag.with_context(format!("added: {}", path.display()));
        }
        for path in &stale.removed {
            diag = diag.with_context(format!("removed: {}", path.display()));
        }
        if !shell.is_quiet() {
            emit(&diag, shell.use_color());
        }
    }

    for name in &report.added_targets {
        shell.warn(format!("target `{}` was declared after the last configure", name));
    }
    for name in &report.removed_targets {
        shell.warn(format!("target `{}` is no longer declared", name));
    }

    anyhow::bail!(
        "configuration is out of date\n{}",
        suggestions::STALE_SOURCES
    )
}
