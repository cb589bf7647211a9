//! BuildGraph - the registry of composed targets.
//!
//! A graph is an explicit value owned by whoever runs a configuration
//! pass. Two passes never share one, so tests can compose independent
//! graphs side by side.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::core::sources::SourceSet;
use crate::core::surface::{OptLevel, Surface};
use crate::core::target::{TargetDep, TargetKind, Visibility};

/// Errors raised while mutating or ordering the graph.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A second target tried to claim an existing name.
    #[error("target `{name}` is already registered (declared in {existing})")]
    #[diagnostic(
        code(bspkit::graph::duplicate_target),
        help("target names are unique across the whole workspace; rename one of them")
    )]
    DuplicateTarget { name: String, existing: String },

    /// A declared dependency does not name any registered target.
    #[error("target `{target}` depends on `{dep}`, which is not registered")]
    #[diagnostic(
        code(bspkit::graph::unknown_dependency),
        help("run `bspkit tree` to see available targets")
    )]
    UnknownDependency { target: String, dep: String },

    /// Dependencies form a cycle.
    #[error("dependency cycle detected at target `{name}`")]
    #[diagnostic(code(bspkit::graph::cycle))]
    Cycle { name: String },
}

/// Stable handle to a registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(NodeIndex);

impl TargetId {
    /// Position of the target in registration order.
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

/// A registered target.
#[derive(Debug, Clone)]
pub struct TargetNode {
    pub name: String,
    pub kind: TargetKind,
    /// Directory of the declaring manifest
    pub root: PathBuf,
    pub sources: SourceSet,
    pub surface: Surface,
    /// Private to this target; never propagated
    pub opt_level: Option<OptLevel>,
    /// Declared dependencies, turned into edges by [`BuildGraph::link_declared_deps`]
    pub deps: Vec<TargetDep>,
    /// Name of the BSP backend that registered this target
    pub backend: String,
}

impl TargetNode {
    /// Create a node with an empty surface.
    pub fn new(name: impl Into<String>, kind: TargetKind, sources: SourceSet) -> Self {
        TargetNode {
            name: name.into(),
            kind,
            root: sources.root().to_path_buf(),
            sources,
            surface: Surface::default(),
            opt_level: None,
            deps: Vec::new(),
            backend: String::new(),
        }
    }
}

/// The build graph.
///
/// Edges point from a dependent to its dependency and carry the
/// dependency's compile visibility.
#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    graph: DiGraph<TargetNode, Visibility>,
    by_name: HashMap<String, NodeIndex>,
}

impl BuildGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        BuildGraph::default()
    }

    /// Register a target.
    ///
    /// Fails if the name is taken; the existing target is left untouched.
    pub fn add_target(&mut self, node: TargetNode) -> Result<TargetId, GraphError> {
        if let Some(&existing) = self.by_name.get(&node.name) {
            return Err(GraphError::DuplicateTarget {
                name: node.name,
                existing: self.graph[existing].root.display().to_string(),
            });
        }

        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.by_name.insert(name, idx);
        tracing::debug!("registered target `{}` as {}", self.graph[idx].name, TargetId(idx));
        Ok(TargetId(idx))
    }

    /// Take a target back out of the graph, along with its edges.
    ///
    /// Ids handed out after `id` may be invalidated; the last registered
    /// target takes over the freed slot.
    pub fn remove_target(&mut self, id: TargetId) -> Option<TargetNode> {
        let node = self.graph.remove_node(id.0)?;
        self.by_name.remove(&node.name);
        if let Some(moved) = self.graph.node_weight(id.0) {
            self.by_name.insert(moved.name.clone(), id.0);
        }
        Some(node)
    }

    /// Add a dependency edge. Re-adding an existing edge updates its visibility.
    pub fn add_dependency(&mut self, dependent: TargetId, dependency: TargetId, vis: Visibility) {
        match self.graph.find_edge(dependent.0, dependency.0) {
            Some(edge) => self.graph[edge] = vis,
            None => {
                self.graph.add_edge(dependent.0, dependency.0, vis);
            }
        }
    }

    /// Turn every target's declared deps into edges.
    pub fn link_declared_deps(&mut self) -> Result<(), GraphError> {
        let mut edges = Vec::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            for dep in &node.deps {
                let to = self.by_name.get(&dep.name).copied().ok_or_else(|| {
                    GraphError::UnknownDependency {
                        target: node.name.clone(),
                        dep: dep.name.clone(),
                    }
                })?;
                edges.push((TargetId(idx), TargetId(to), dep.compile));
            }
        }

        for (from, to, vis) in edges {
            self.add_dependency(from, to, vis);
        }
        Ok(())
    }

    /// Look up a target by name.
    pub fn find(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied().map(TargetId)
    }

    /// Get a registered target.
    pub fn target(&self, id: TargetId) -> &TargetNode {
        &self.graph[id.0]
    }

    /// Get a registered target mutably.
    pub fn target_mut(&mut self, id: TargetId) -> &mut TargetNode {
        &mut self.graph[id.0]
    }

    /// All targets in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.graph.node_indices().map(TargetId)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies in the order they were added.
    pub fn dependencies(&self, id: TargetId) -> Vec<(TargetId, Visibility)> {
        let mut edges: Vec<_> = self
            .graph
            .edges(id.0)
            .map(|e| (e.id(), TargetId(e.target()), *e.weight()))
            .collect();
        edges.sort_by_key(|(edge, _, _)| *edge);
        edges.into_iter().map(|(_, to, vis)| (to, vis)).collect()
    }

    /// Targets that depend directly on `id`.
    pub fn dependents(&self, id: TargetId) -> Vec<TargetId> {
        let mut out: Vec<_> = self
            .graph
            .neighbors_directed(id.0, petgraph::Direction::Incoming)
            .map(TargetId)
            .collect();
        out.sort();
        out
    }

    /// Targets ordered dependencies-first.
    pub fn topo_order(&self) -> Result<Vec<TargetId>, GraphError> {
        let mut order = petgraph::algo::toposort(&self.graph, None).map_err(|cycle| {
            GraphError::Cycle {
                name: self.graph[cycle.node_id()].name.clone(),
            }
        })?;

        // toposort puts a dependent before its dependency; edges point that way.
        order.reverse();
        Ok(order.into_iter().map(TargetId).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> TargetNode {
        TargetNode::new(
            name,
            TargetKind::HeaderOnly,
            SourceSet::from_files(format!("/ws/{}", name), ["a.h"]),
        )
    }

    #[test]
    fn test_remove_target_keeps_name_index() {
        let mut graph = BuildGraph::new();
        let first = graph.add_target(node("first")).unwrap();
        graph.add_target(node("second")).unwrap();
        let third = graph.add_target(node("third")).unwrap();
        graph.add_dependency(third, first, Visibility::Public);

        let removed = graph.remove_target(first).unwrap();
        assert_eq!(removed.name, "first");
        assert_eq!(graph.len(), 2);
        assert!(graph.find("first").is_none());

        let third = graph.find("third").unwrap();
        assert_eq!(graph.target(third).name, "third");
        assert!(graph.dependencies(third).is_empty());
        let second = graph.find("second").unwrap();
        assert_eq!(graph.target(second).name, "second");
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut graph = BuildGraph::new();
        let first = graph.add_target(node("_peripherals")).unwrap();

        let mut second = node("_peripherals");
        second.root = PathBuf::from("/elsewhere");
        let err = graph.add_target(second).unwrap_err();

        assert!(matches!(err, GraphError::DuplicateTarget { .. }));
        assert!(err.to_string().contains("/ws/_peripherals"));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.target(first).root, PathBuf::from("/ws/_peripherals"));
    }

    #[test]
    fn test_independent_graphs_do_not_interfere() {
        let mut g1 = BuildGraph::new();
        let mut g2 = BuildGraph::new();
        g1.add_target(node("_peripherals")).unwrap();
        g2.add_target(node("_peripherals")).unwrap();
        assert_eq!(g1.len(), 1);
        assert_eq!(g2.len(), 1);
    }

    #[test]
    fn test_link_declared_deps_and_order() {
        let mut graph = BuildGraph::new();
        let mut app = node("app");
        app.deps = vec![TargetDep::public("hal"), TargetDep::private("board")];
        let mut hal = node("hal");
        hal.deps = vec![TargetDep::public("_peripherals")];

        let app_id = graph.add_target(app).unwrap();
        let hal_id = graph.add_target(hal).unwrap();
        let board_id = graph.add_target(node("board")).unwrap();
        let periph_id = graph.add_target(node("_peripherals")).unwrap();

        graph.link_declared_deps().unwrap();

        assert_eq!(
            graph.dependencies(app_id),
            vec![(hal_id, Visibility::Public), (board_id, Visibility::Private)]
        );
        assert_eq!(graph.dependents(periph_id), vec![hal_id]);

        let order = graph.topo_order().unwrap();
        let pos = |id| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(periph_id) < pos(hal_id));
        assert!(pos(hal_id) < pos(app_id));
        assert!(pos(board_id) < pos(app_id));
    }

    #[test]
    fn test_unknown_dependency() {
        let mut graph = BuildGraph::new();
        let mut app = node("app");
        app.deps = vec![TargetDep::public("missing")];
        graph.add_target(app).unwrap();

        let err = graph.link_declared_deps().unwrap_err();
        assert!(matches!(err, GraphError::UnknownDependency { ref dep, .. } if dep == "missing"));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = BuildGraph::new();
        let a = graph.add_target(node("a")).unwrap();
        let b = graph.add_target(node("b")).unwrap();
        graph.add_dependency(a, b, Visibility::Public);
        graph.add_dependency(b, a, Visibility::Public);

        assert!(matches!(graph.topo_order(), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn test_find_by_name() {
        let mut graph = BuildGraph::new();
        let id = graph.add_target(node("hal")).unwrap();
        assert_eq!(graph.find("hal"), Some(id));
        assert_eq!(graph.find("nope"), None);
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec![id]);
    }
}
