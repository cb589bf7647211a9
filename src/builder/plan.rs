//! Configure plan generation.
//!
//! A ConfigurePlan is the serializable view of a composed build graph: every
//! target in dependency order with its source set, its effective compile
//! surface, and one compile step per translation unit.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::surface_resolver::resolve_compile_surface;
use crate::builder::toolchain::Toolchain;
use crate::core::graph::BuildGraph;
use crate::core::sources::is_header;
use crate::core::target::TargetDep;
use crate::util::fs::write_string;

/// A complete configure plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurePlan {
    /// Toolchain family the flags are spelled for
    pub toolchain: String,

    /// Target names, dependencies first
    pub order: Vec<String>,

    pub targets: Vec<PlannedTarget>,
}

/// One target of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTarget {
    pub name: String,
    pub kind: String,
    pub root: PathBuf,
    /// Backend that registered the target
    pub backend: String,
    /// Discovered files, relative to `root`
    pub sources: Vec<PathBuf>,
    pub deps: Vec<TargetDep>,
    /// What dependents receive
    pub public_include_dirs: Vec<PathBuf>,
    /// Effective flags for the target's own translation units
    pub flags: Vec<String>,
    pub compile_steps: Vec<CompileStep>,
}

/// A single compilation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileStep {
    /// Source file
    pub source: PathBuf,

    /// Output object file
    pub output: PathBuf,

    /// Full command line, program first
    pub arguments: Vec<String>,
}

/// Entry in compile_commands.json.
#[derive(Debug, Clone, Serialize)]
struct CompileCommand {
    directory: String,
    file: String,
    arguments: Vec<String>,
    output: String,
}

impl ConfigurePlan {
    /// Build the plan of a linked graph.
    ///
    /// `obj_dir` is where object files would land; nothing is compiled.
    pub fn new(graph: &BuildGraph, toolchain: &dyn Toolchain, obj_dir: &Path) -> Result<Self> {
        let order = graph.topo_order()?;
        let mut targets = Vec::with_capacity(order.len());

        for &id in &order {
            let node = graph.target(id);
            let surface = resolve_compile_surface(graph, id);

            // Headers are compiled through their includers
            let compile_steps = if node.kind.is_header_only() {
                Vec::new()
            } else {
                node.sources
                    .iter()
                    .filter(|rel| !is_header(rel))
                    .map(|rel| {
                        let output =
                            object_path(obj_dir, &node.name, rel, toolchain.object_extension());
                        let spec = toolchain
                            .compile_command(&surface.compile_input(node.root.join(rel), output.clone()));
                        let mut arguments = Vec::with_capacity(spec.args.len() + 1);
                        arguments.push(spec.program.display().to_string());
                        arguments.extend(spec.args);
                        CompileStep {
                            source: node.root.join(rel),
                            output,
                            arguments,
                        }
                    })
                    .collect()
            };

            targets.push(PlannedTarget {
                name: node.name.clone(),
                kind: node.kind.to_string(),
                root: node.root.clone(),
                backend: node.backend.clone(),
                sources: node.sources.iter().map(Path::to_path_buf).collect(),
                deps: node.deps.clone(),
                public_include_dirs: node.surface.compile.public.include_dirs.clone(),
                flags: surface.to_flags(toolchain),
                compile_steps,
            });
        }

        Ok(ConfigurePlan {
            toolchain: toolchain.platform().to_string(),
            order: targets.iter().map(|t| t.name.clone()).collect(),
            targets,
        })
    }

    pub fn target(&self, name: &str) -> Option<&PlannedTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Number of compile steps across all targets.
    pub fn compile_count(&self) -> usize {
        self.targets.iter().map(|t| t.compile_steps.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write compile_commands.json for editor tooling.
    pub fn write_compile_commands(&self, path: &Path) -> Result<()> {
        let commands: Vec<CompileCommand> = self
            .targets
            .iter()
            .flat_map(|t| {
                t.compile_steps.iter().map(move |step| CompileCommand {
                    directory: t.root.display().to_string(),
                    file: step.source.display().to_string(),
                    arguments: step.arguments.clone(),
                    output: step.output.display().to_string(),
                })
            })
            .collect();

        write_string(path, &serde_json::to_string_pretty(&commands)?)
    }
}

/// `obj_dir/<target>/<rel>.<ext>`, keeping the source extension so that
/// `foo.c` and `foo.s` get distinct objects.
fn object_path(obj_dir: &Path, target: &str, rel: &Path, ext: &str) -> PathBuf {
    let mut name = rel.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    obj_dir.join(target).join(name)
}
