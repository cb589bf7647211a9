//! `bspkit tree` command

use std::collections::HashSet;

use anyhow::Result;

use crate::cli::TreeArgs;
use crate::commands::{configure_in_memory, load_workspace};
use bspkit::core::graph::{BuildGraph, TargetId};
use bspkit::core::target::Visibility;
use bspkit::util::GlobalContext;

pub fn execute(args: TreeArgs, ctx: &GlobalContext) -> Result<()> {
    let ws = load_workspace(ctx)?;
    let configured = configure_in_memory(&ws)?;
    let graph = &configured.graph;

    let roots = match args.target {
        Some(ref name) => vec![configured.find(name)?],
        None => {
            let mut roots: Vec<_> = graph
                .ids()
                .filter(|&id| graph.dependents(id).is_empty())
                .collect();
            roots.sort_by(|a, b| graph.target(*a).name.cmp(&graph.target(*b).name));
            roots
        }
    };

    let max_depth = args.depth.unwrap_or(usize::MAX);
    for root in roots {
        let mut seen = HashSet::new();
        let node = graph.target(root);
        println!("{} ({})", node.name, node.kind);
        print_children(graph, root, "", 1, max_depth, &mut seen);
    }

    Ok(())
}

fn print_children(
    graph: &BuildGraph,
    id: TargetId,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<TargetId>,
) {
    if depth > max_depth {
        return;
    }
    seen.insert(id);

    let deps = graph.dependencies(id);
    for (i, (dep, vis)) in deps.iter().enumerate() {
        let last = i + 1 == deps.len();
        let node = graph.target(*dep);
        let vis_marker = match vis {
            Visibility::Public => "",
            Visibility::Private => " [private]",
        };
        let dup_marker = if seen.contains(dep) { " (*)" } else { "" };

        println!(
            "{}{}{} ({}){}{}",
            prefix,
            if last { "└── " } else { "├── " },
            node.name,
            node.kind,
            vis_marker,
            dup_marker
        );

        // Don't recurse into targets already printed on this branch
        if dup_marker.is_empty() {
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            print_children(graph, *dep, &child_prefix, depth + 1, max_depth, seen);
        }
    }
}
