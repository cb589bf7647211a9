//! Implementation of `bspkit configure`.
//!
//! Configuration runs in two phases. Discovery walks every target's root in
//! parallel; registration then composes the targets one by one in member
//! order, then target-name order, so the resulting graph is the same no
//! matter which discovery finished first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::builder::fingerprint::ConfigureStamp;
use crate::builder::plan::ConfigurePlan;
use crate::builder::toolchain::Toolchain;
use crate::compose::{backend_for, discover_for, BspBackend, LibraryComposer};
use crate::core::graph::{BuildGraph, TargetId};
use crate::core::sources::SourceSet;
use crate::core::target::Target;
use crate::core::workspace::{Member, Workspace};

/// Options for the configure command.
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Record source fingerprints in `.bspkit/configure.json`
    pub write_stamp: bool,
}

/// One declared target with its freshly discovered sources.
#[derive(Debug)]
pub struct DiscoveredTarget<'ws> {
    pub member: &'ws Member,
    pub target: &'ws Target,
    pub sources: SourceSet,
}

/// Result of a configure pass.
#[derive(Debug)]
pub struct Configured {
    pub graph: BuildGraph,
    /// Targets, dependencies first
    pub order: Vec<TargetId>,
}

impl Configured {
    /// Look up a target by name, listing what exists when it doesn't.
    pub fn find(&self, name: &str) -> Result<TargetId> {
        self.graph.find(name).ok_or_else(|| {
            let mut names: Vec<_> = self
                .graph
                .ids()
                .map(|id| self.graph.target(id).name.clone())
                .collect();
            names.sort();
            anyhow::anyhow!(
                "unknown target `{}`\n\
                 available targets: {}\n\
                 {}",
                name,
                if names.is_empty() {
                    "(none)".to_string()
                } else {
                    names.join(", ")
                },
                crate::util::diagnostic::suggestions::TARGET_NOT_FOUND
            )
        })
    }

    /// Build the configure plan for a toolchain.
    pub fn plan(&self, toolchain: &dyn Toolchain, obj_dir: &Path) -> Result<ConfigurePlan> {
        ConfigurePlan::new(&self.graph, toolchain, obj_dir)
    }
}

/// Discover the sources of every target in the workspace.
///
/// Walks run in parallel; results come back in configuration order. The
/// first failure in that order is reported.
pub fn discover_workspace(ws: &Workspace) -> Result<Vec<DiscoveredTarget<'_>>> {
    let declared: Vec<(&Member, &Target)> = ws
        .members()
        .iter()
        .flat_map(|m| m.targets().iter().map(move |t| (m, t)))
        .collect();

    let results: Vec<_> = declared
        .par_iter()
        .map(|&(member, target)| (member, target, discover_for(target, member.dir())))
        .collect();

    results
        .into_iter()
        .map(|(member, target, sources)| {
            let sources = sources.with_context(|| {
                format!(
                    "failed to discover sources of `{}` in {}",
                    target.name,
                    member.dir().display()
                )
            })?;
            Ok(DiscoveredTarget {
                member,
                target,
                sources,
            })
        })
        .collect()
}

/// Compose already-discovered targets into a fresh graph through `backend`.
pub fn compose_workspace(
    discovered: &[DiscoveredTarget<'_>],
    backend: &mut dyn BspBackend,
) -> Result<Configured> {
    let mut graph = BuildGraph::new();
    {
        let mut composer = LibraryComposer::new(&mut graph, backend);
        for d in discovered {
            composer
                .compose_discovered(d.target, d.sources.clone())
                .with_context(|| {
                    format!(
                        "failed to compose target `{}` from {}",
                        d.target.name,
                        d.member.manifest_path().display()
                    )
                })?;
        }
    }

    graph.link_declared_deps()?;
    let order = graph.topo_order()?;

    Ok(Configured { graph, order })
}

/// Configure a workspace with the backend named in its `[bsp]` section.
pub fn configure(ws: &Workspace, opts: &ConfigureOptions) -> Result<Configured> {
    let bsp = ws.bsp_config();
    let mut backend = backend_for(&bsp)?;
    configure_with(ws, backend.as_mut(), opts)
}

/// Configure a workspace through an explicit backend.
pub fn configure_with(
    ws: &Workspace,
    backend: &mut dyn BspBackend,
    opts: &ConfigureOptions,
) -> Result<Configured> {
    if ws.members().is_empty() {
        anyhow::bail!(
            "workspace at {} declares no targets",
            ws.root().display()
        );
    }

    let discovered = discover_workspace(ws)?;
    let configured = compose_workspace(&discovered, backend)?;

    if opts.write_stamp {
        let mut stamp = ConfigureStamp::default();
        for d in &discovered {
            stamp.record(d.target.name.clone(), &d.sources);
        }
        stamp.save(&ws.stamp_path())?;
        tracing::debug!("wrote {}", ws.stamp_path().display());
    }

    tracing::debug!(
        "configured {} target(s) via `{}`",
        configured.graph.len(),
        backend.name()
    );
    Ok(configured)
}

/// Path of compile_commands.json inside the state dir.
pub fn compile_commands_path(ws: &Workspace) -> PathBuf {
    ws.state_dir().join("compile_commands.json")
}
