use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Debug, Formatter},
};

use thiserror::Error;

/// A path through the dependency graph, used in error reports.
pub struct DepRoute<T> {
    route: Vec<T>,
}

impl<T> Debug for DepRoute<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self.route.len();
        if len == 0 {
            return write!(f, "[]");
        }
        for item in &self.route[..len - 1] {
            write!(f, "{item:?} -> ")?;
        }
        write!(f, "{:?}", self.route[len - 1])
    }
}

#[derive(Debug, Error)]
pub enum TopologyError<T>
where
    T: Debug,
{
    #[error("Cycle detected in dependency graph, from {:?}", .0)]
    CycleDetected(DepRoute<T>),
}

/// Directed dependency graph between registered slots.
///
/// Edges run from a dependency to the computes depending on it, so marking a
/// changed slot dirty is a walk over `dependents_of`.
#[derive(Debug, Default)]
pub struct Graph<Node>
where
    Node: Debug + PartialEq + Copy + Ord,
{
    edges: BTreeMap<Node, BTreeSet<Node>>,
}

impl<Node> Graph<Node>
where
    Node: Debug + PartialEq + Copy + Ord,
{
    pub fn new() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }

    pub fn route_to(&mut self, from: Node, to: Node) {
        self.edges.entry(from).or_default().insert(to);
    }

    /// Direct dependents of `node` (nodes to re-run when `node` changes).
    pub fn dependents_of(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.edges.get(&node).into_iter().flatten().copied()
    }

    /// Verifies the graph is acyclic; returns the offending route otherwise.
    pub fn topology_sort(&self) -> Result<(), TopologyError<Node>> {
        let mut visited = BTreeSet::new();
        for &start in self.edges.keys() {
            if visited.contains(&start) {
                continue;
            }
            let mut path = Vec::new();
            let mut on_path = BTreeSet::new();
            self.visit(start, &mut visited, &mut path, &mut on_path)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        node: Node,
        visited: &mut BTreeSet<Node>,
        path: &mut Vec<Node>,
        on_path: &mut BTreeSet<Node>,
    ) -> Result<(), TopologyError<Node>> {
        if on_path.contains(&node) {
            let pos = path.iter().position(|&n| n == node).unwrap_or(0);
            let mut route = path[pos..].to_vec();
            route.push(node);
            return Err(TopologyError::CycleDetected(DepRoute { route }));
        }
        if !visited.insert(node) {
            return Ok(());
        }
        path.push(node);
        on_path.insert(node);
        for next in self.dependents_of(node).collect::<Vec<_>>() {
            self.visit(next, visited, path, on_path)?;
        }
        path.pop();
        on_path.remove(&node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependents_follow_edges() {
        let mut graph = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(1, 3);
        let deps: Vec<i32> = graph.dependents_of(1).collect();
        assert_eq!(deps, vec![2, 3]);
        assert_eq!(graph.dependents_of(2).count(), 0);
    }

    #[test]
    fn acyclic_graph_sorts() {
        let mut graph = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(2, 3);
        graph.route_to(1, 3);
        assert!(graph.topology_sort().is_ok());
    }

    #[test]
    fn cycle_is_reported() {
        let mut graph = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(2, 3);
        graph.route_to(3, 1);
        let err = graph.topology_sort().expect_err("cycle must be detected");
        let TopologyError::CycleDetected(route) = err;
        let text = format!("{route:?}");
        assert!(text.contains("->"), "route should describe the cycle: {text}");
    }
}
