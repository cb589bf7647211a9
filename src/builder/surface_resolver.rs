//! Surface propagation algorithm.
//!
//! This module computes the effective compile surface of a registered target
//! by propagating public requirements from its dependencies.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::PathBuf;

use crate::builder::toolchain::{CompileInput, Toolchain};
use crate::core::graph::{BuildGraph, TargetId};
use crate::core::surface::{CompileRequirements, Define, OptLevel};
use crate::core::target::Visibility;

/// Indicates where a flag/setting originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// The target that contributed this value.
    pub target: String,
    /// Which surface section it came from.
    pub surface_kind: SurfaceKind,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.surface_kind)
    }
}

/// Indicates which surface section a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    CompilePublic,
    CompilePrivate,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::CompilePublic => write!(f, "surface.compile.public"),
            SurfaceKind::CompilePrivate => write!(f, "surface.compile.private"),
        }
    }
}

/// A value paired with its provenance information.
#[derive(Debug, Clone, PartialEq)]
pub struct WithProvenance<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> WithProvenance<T> {
    pub fn new(value: T, target: impl Into<String>, surface_kind: SurfaceKind) -> Self {
        WithProvenance {
            value,
            provenance: Provenance {
                target: target.into(),
                surface_kind,
            },
        }
    }
}

/// Resolved compile environment for one target, with provenance.
#[derive(Debug, Clone, Default)]
pub struct EffectiveCompileSurface {
    /// The target's own level; dependencies never contribute one.
    pub opt_level: Option<OptLevel>,
    pub include_dirs: Vec<WithProvenance<PathBuf>>,
    pub defines: Vec<WithProvenance<Define>>,
    pub cflags: Vec<WithProvenance<String>>,
}

impl EffectiveCompileSurface {
    /// Include directories without provenance.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.include_dirs.iter().map(|i| i.value.clone()).collect()
    }

    /// The compile input for one translation unit of this target.
    pub fn compile_input(&self, source: PathBuf, output: PathBuf) -> CompileInput {
        CompileInput {
            source,
            output,
            include_dirs: self.include_dirs(),
            defines: self.defines.iter().map(|d| d.value.clone()).collect(),
            cflags: self.cflags.iter().map(|c| c.value.clone()).collect(),
            opt_level: self.opt_level,
        }
    }

    /// Render as compiler flags (for actual compilation, without provenance).
    pub fn to_flags(&self, toolchain: &dyn Toolchain) -> Vec<String> {
        toolchain.compile_flags(&self.compile_input(PathBuf::new(), PathBuf::new()))
    }

    fn add(&mut self, reqs: &CompileRequirements, target: &str, kind: SurfaceKind) {
        for dir in &reqs.include_dirs {
            if !self.include_dirs.iter().any(|i| &i.value == dir) {
                self.include_dirs
                    .push(WithProvenance::new(dir.clone(), target, kind));
            }
        }
        for define in &reqs.defines {
            if !self.defines.iter().any(|d| &d.value == define) {
                self.defines
                    .push(WithProvenance::new(define.clone(), target, kind));
            }
        }
        for flag in &reqs.cflags {
            if !self.cflags.iter().any(|c| &c.value == flag) {
                self.cflags
                    .push(WithProvenance::new(flag.clone(), target, kind));
            }
        }
    }
}

/// Compute the effective compile surface of `id`.
///
/// Algorithm:
/// 1. Start with the target's private requirements and its own opt level
/// 2. Add the target's public requirements
/// 3. Add the public requirements of every direct dependency, whatever
///    the edge visibility
/// 4. Keep walking from each dependency only along its public edges
///
/// Private requirements and opt levels of dependencies are never included.
/// Duplicates keep their first-seen position.
pub fn resolve_compile_surface(graph: &BuildGraph, id: TargetId) -> EffectiveCompileSurface {
    let mut effective = EffectiveCompileSurface::default();
    let node = graph.target(id);

    effective.opt_level = node.opt_level;
    effective.add(&node.surface.compile.private, &node.name, SurfaceKind::CompilePrivate);
    effective.add(&node.surface.compile.public, &node.name, SurfaceKind::CompilePublic);

    let mut seen = HashSet::from([id]);
    let mut queue: VecDeque<TargetId> = graph
        .dependencies(id)
        .into_iter()
        .map(|(dep, _)| dep)
        .collect();

    while let Some(dep_id) = queue.pop_front() {
        if !seen.insert(dep_id) {
            continue;
        }
        let dep = graph.target(dep_id);
        effective.add(&dep.surface.compile.public, &dep.name, SurfaceKind::CompilePublic);

        for (next, vis) in graph.dependencies(dep_id) {
            if vis == Visibility::Public {
                queue.push_back(next);
            }
        }
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GccToolchain, ToolchainPlatform};
    use crate::core::graph::TargetNode;
    use crate::core::sources::SourceSet;
    use crate::core::target::TargetKind;

    fn add(graph: &mut BuildGraph, name: &str, public_inc: Option<&str>) -> TargetId {
        let root = format!("/ws/{}", name);
        let mut node = TargetNode::new(
            name,
            TargetKind::HeaderOnly,
            SourceSet::from_files(root, ["a.h"]),
        );
        if let Some(inc) = public_inc {
            node.surface.compile.public.include_dirs.push(PathBuf::from(inc));
        }
        graph.add_target(node).unwrap()
    }

    #[test]
    fn test_include_path_reaches_direct_and_transitive_dependents() {
        let mut graph = BuildGraph::new();
        let periph = add(&mut graph, "_peripherals", Some("/ws/periph"));
        let hal = add(&mut graph, "hal", Some("/ws/hal"));
        let app = add(&mut graph, "app", None);
        graph.add_dependency(hal, periph, Visibility::Public);
        graph.add_dependency(app, hal, Visibility::Private);

        let hal_surface = resolve_compile_surface(&graph, hal);
        assert_eq!(
            hal_surface.include_dirs(),
            vec![PathBuf::from("/ws/hal"), PathBuf::from("/ws/periph")]
        );

        // app -> hal is private, but hal -> _peripherals is public, so
        // app still sees the peripheral headers.
        let app_surface = resolve_compile_surface(&graph, app);
        assert_eq!(
            app_surface.include_dirs(),
            vec![PathBuf::from("/ws/hal"), PathBuf::from("/ws/periph")]
        );
        assert_eq!(
            app_surface.include_dirs[1].provenance,
            Provenance {
                target: "_peripherals".to_string(),
                surface_kind: SurfaceKind::CompilePublic,
            }
        );
    }

    #[test]
    fn test_private_edge_stops_propagation() {
        let mut graph = BuildGraph::new();
        let periph = add(&mut graph, "_peripherals", Some("/ws/periph"));
        let hal = add(&mut graph, "hal", Some("/ws/hal"));
        let app = add(&mut graph, "app", None);
        graph.add_dependency(hal, periph, Visibility::Private);
        graph.add_dependency(app, hal, Visibility::Public);

        assert!(resolve_compile_surface(&graph, hal)
            .include_dirs()
            .contains(&PathBuf::from("/ws/periph")));
        assert_eq!(
            resolve_compile_surface(&graph, app).include_dirs(),
            vec![PathBuf::from("/ws/hal")]
        );
    }

    #[test]
    fn test_opt_level_and_private_flags_stay_home() {
        let mut graph = BuildGraph::new();
        let periph = add(&mut graph, "_peripherals", Some("/ws/periph"));
        {
            let node = graph.target_mut(periph);
            node.opt_level = Some(OptLevel::None);
            node.surface.compile.private.cflags.push("-fno-inline".to_string());
            node.surface.compile.private.defines.push(Define::flag("PERIPH_INTERNAL"));
        }
        let app = add(&mut graph, "app", None);
        graph.target_mut(app).opt_level = Some(OptLevel::Size);
        graph.add_dependency(app, periph, Visibility::Public);

        let periph_surface = resolve_compile_surface(&graph, periph);
        assert_eq!(periph_surface.opt_level, Some(OptLevel::None));
        assert_eq!(periph_surface.cflags[0].value, "-fno-inline");
        assert_eq!(
            periph_surface.cflags[0].provenance.surface_kind,
            SurfaceKind::CompilePrivate
        );

        let app_surface = resolve_compile_surface(&graph, app);
        assert_eq!(app_surface.opt_level, Some(OptLevel::Size));
        assert!(app_surface.cflags.is_empty());
        assert!(app_surface.defines.is_empty());

        let tc = GccToolchain::new(PathBuf::from("gcc"), ToolchainPlatform::Gcc);
        assert_eq!(app_surface.to_flags(&tc), vec!["-Os", "-I/ws/periph"]);
    }

    #[test]
    fn test_diamond_deduplicates_and_cycles_terminate() {
        let mut graph = BuildGraph::new();
        let periph = add(&mut graph, "_peripherals", Some("/ws/periph"));
        let uart = add(&mut graph, "uart", None);
        let gpio = add(&mut graph, "gpio", None);
        let app = add(&mut graph, "app", None);
        graph.add_dependency(uart, periph, Visibility::Public);
        graph.add_dependency(gpio, periph, Visibility::Public);
        graph.add_dependency(app, uart, Visibility::Public);
        graph.add_dependency(app, gpio, Visibility::Public);
        graph.add_dependency(periph, app, Visibility::Public);

        let surface = resolve_compile_surface(&graph, app);
        assert_eq!(surface.include_dirs(), vec![PathBuf::from("/ws/periph")]);
    }
}
