use crate::error::{GraphError, Result};
use crate::types::{DependencyEdge, ResolutionPhase};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File-level dependency graph. Nodes are files, edges point from a file to
/// the files it depends on and carry the phase that resolved them.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PathBuf, ResolutionPhase>,

    /// Path -> NodeIndex mapping, sorted by path
    nodes: BTreeMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (idempotent)
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.nodes.insert(path.to_path_buf(), idx);
        idx
    }

    /// Add an edge. Self-loops and duplicates are ignored; returns whether
    /// a new edge was stored.
    pub fn add_edge(&mut self, source: &Path, target: &Path, phase: ResolutionPhase) -> bool {
        if source == target {
            return false;
        }
        let from = self.add_file(source);
        let to = self.add_file(target);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, phase);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    /// Sorted files this file depends on
    pub fn dependencies(&self, path: &Path) -> Result<Vec<&Path>> {
        self.neighbors(path, Direction::Outgoing)
    }

    /// Sorted files depending on this file
    pub fn dependents(&self, path: &Path) -> Result<Vec<&Path>> {
        self.neighbors(path, Direction::Incoming)
    }

    fn neighbors(&self, path: &Path, direction: Direction) -> Result<Vec<&Path>> {
        let idx = self
            .nodes
            .get(path)
            .ok_or_else(|| GraphError::FileNotFound(path.to_path_buf()))?;

        let mut paths: Vec<&Path> = self
            .graph
            .neighbors_directed(*idx, direction)
            .map(|n| self.graph[n].as_path())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// All files in path order
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.nodes.keys().map(PathBuf::as_path)
    }

    /// All edges, sorted by (source, target)
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .edge_references()
            .map(|edge| DependencyEdge {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                phase: *edge.weight(),
            })
            .collect();
        edges.sort();
        edges
    }

    /// Path -> sorted dependency paths, one entry per file
    pub fn to_adjacency(&self) -> BTreeMap<PathBuf, Vec<PathBuf>> {
        self.nodes
            .iter()
            .map(|(path, &idx)| {
                let mut deps: Vec<PathBuf> = self
                    .graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .map(|n| self.graph[n].clone())
                    .collect();
                deps.sort();
                (path.clone(), deps)
            })
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edge counts per resolving phase
    pub fn phase_counts(&self) -> BTreeMap<ResolutionPhase, usize> {
        let mut counts = BTreeMap::new();
        for edge in self.graph.edge_references() {
            *counts.entry(*edge.weight()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_self_loops_and_duplicates_are_ignored() {
        let mut graph = DependencyGraph::new();
        let a = Path::new("A.java");
        let b = Path::new("B.java");

        assert!(!graph.add_edge(a, a, ResolutionPhase::SamePackage));
        assert!(graph.add_edge(a, b, ResolutionPhase::ExplicitImport));
        assert!(!graph.add_edge(a, b, ResolutionPhase::SuffixMatch));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies(a).unwrap(), vec![b]);
        assert_eq!(graph.dependents(b).unwrap(), vec![a]);
        assert!(graph.dependencies(a).unwrap().iter().all(|p| *p != a));
    }

    #[test]
    fn test_dependencies_are_sorted() {
        let mut graph = DependencyGraph::new();
        let main = Path::new("Main.java");
        for dep in ["z/Z.java", "a/A.java", "m/M.java"] {
            graph.add_edge(main, Path::new(dep), ResolutionPhase::SamePackage);
        }

        assert_eq!(
            graph.dependencies(main).unwrap(),
            vec![Path::new("a/A.java"), Path::new("m/M.java"), Path::new("z/Z.java")]
        );
    }

    #[test]
    fn test_isolated_file_has_empty_entry() {
        let mut graph = DependencyGraph::new();
        graph.add_file(Path::new("Alone.java"));

        let adjacency = graph.to_adjacency();
        assert_eq!(adjacency.len(), 1);
        assert!(adjacency[Path::new("Alone.java")].is_empty());
    }

    #[test]
    fn test_unknown_file_is_an_error() {
        let graph = DependencyGraph::new();
        assert!(matches!(
            graph.dependencies(Path::new("Nope.java")),
            Err(GraphError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_phase_counts() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(Path::new("A"), Path::new("B"), ResolutionPhase::WildcardImport);
        graph.add_edge(Path::new("A"), Path::new("C"), ResolutionPhase::WildcardImport);
        graph.add_edge(Path::new("B"), Path::new("C"), ResolutionPhase::SuffixMatch);

        let counts = graph.phase_counts();
        assert_eq!(counts[&ResolutionPhase::WildcardImport], 2);
        assert_eq!(counts[&ResolutionPhase::SuffixMatch], 1);
        assert_eq!(graph.edges().len(), 3);
    }
}
