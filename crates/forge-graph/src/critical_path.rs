//! Critical path over dependency edges.
//!
//! # Overview
//!
//! The critical path is the *longest* dependency chain in the graph. Nodes on
//! it have **zero slack**: delaying any of them delays everything downstream.
//! Only `dependency` edges count; references and containment carry no
//! ordering.
//!
//! # Algorithm
//!
//! 1. Collapse strongly connected components so dependency cycles become one
//!    super-node whose members share a timing.
//! 2. **Forward pass** in topological order: `earliest_finish`.
//! 3. **Backward pass** in reverse topological order: `latest_finish`.
//! 4. **Slack** = `latest_start - earliest_start`.
//! 5. **Path reconstruction**: from the zero-slack sink with the greatest
//!    `earliest_finish`, walk back through zero-slack predecessors.
//!
//! [`annotate_critical_path`] copies the result onto a [`GraphData`] so the
//! renderer can highlight it.

use std::collections::{HashMap, HashSet};

use petgraph::{
    Direction,
    algo::{condensation, toposort},
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, instrument};

use crate::types::{CriticalPathMark, EdgeKind, GraphData};

/// Per-node timing in unit steps (each node takes one step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTiming {
    pub earliest_start: usize,
    pub earliest_finish: usize,
    pub latest_start: usize,
    pub latest_finish: usize,
    /// Zero on the critical path.
    pub slack: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CriticalPathResult {
    /// Node ids on one longest chain, sources first.
    pub critical_path: Vec<String>,
    /// Every node with zero slack; may exceed `critical_path` when several
    /// chains tie.
    pub critical_nodes: HashSet<String>,
    pub timings: HashMap<String, NodeTiming>,
}

impl CriticalPathResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.critical_path.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.critical_path.len()
    }
}

/// Compute the critical path of the dependency edges in `graph`.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.nodes.len()))]
pub fn compute_critical_path(graph: &GraphData) -> CriticalPathResult {
    let mut dag = DiGraph::<String, ()>::with_capacity(graph.nodes.len(), graph.edges.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        index
            .entry(node.id.as_str())
            .or_insert_with(|| dag.add_node(node.id.clone()));
    }
    for edge in graph.edges_of_kind(EdgeKind::Dependency) {
        if let (Some(&source), Some(&target)) =
            (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
        {
            dag.update_edge(source, target, ());
        }
    }

    if dag.node_count() == 0 {
        return CriticalPathResult::default();
    }

    let condensed: DiGraph<Vec<String>, ()> = condensation(dag, true).map(
        |_, members| {
            let mut sorted = members.clone();
            sorted.sort_unstable();
            sorted
        },
        |_, _| (),
    );

    // Condensation is acyclic; the fallback only guards the impossible case.
    let topo: Vec<NodeIndex> =
        toposort(&condensed, None).unwrap_or_else(|_| condensed.node_indices().collect());

    let mut earliest_finish: HashMap<NodeIndex, usize> = HashMap::with_capacity(topo.len());
    for &v in &topo {
        let start = condensed
            .edges_directed(v, Direction::Incoming)
            .map(|e| earliest_finish.get(&e.source()).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        earliest_finish.insert(v, start + 1);
    }

    let project_finish = earliest_finish.values().copied().max().unwrap_or(1);

    let mut latest_finish: HashMap<NodeIndex, usize> = HashMap::with_capacity(topo.len());
    for &v in topo.iter().rev() {
        let finish = condensed
            .edges_directed(v, Direction::Outgoing)
            .map(|e| {
                latest_finish
                    .get(&e.target())
                    .copied()
                    .unwrap_or(project_finish)
                    .saturating_sub(1)
            })
            .min()
            .unwrap_or(project_finish);
        latest_finish.insert(v, finish);
    }

    let mut result = CriticalPathResult::default();
    let mut node_slack: HashMap<NodeIndex, usize> = HashMap::with_capacity(topo.len());

    for &v in &topo {
        let ef = earliest_finish.get(&v).copied().unwrap_or(1);
        let lf = latest_finish.get(&v).copied().unwrap_or(project_finish);
        let es = ef.saturating_sub(1);
        let ls = lf.saturating_sub(1);
        let slack = ls.saturating_sub(es);
        node_slack.insert(v, slack);

        let timing = NodeTiming {
            earliest_start: es,
            earliest_finish: ef,
            latest_start: ls,
            latest_finish: lf,
            slack,
        };
        for member in &condensed[v] {
            result.timings.insert(member.clone(), timing.clone());
            if slack == 0 {
                result.critical_nodes.insert(member.clone());
            }
        }
    }

    result.critical_path = reconstruct(&condensed, &topo, &earliest_finish, &node_slack)
        .into_iter()
        .flat_map(|v| condensed[v].clone())
        .collect();

    debug!(length = result.critical_path.len(), "critical path computed");
    result
}

fn reconstruct(
    condensed: &DiGraph<Vec<String>, ()>,
    topo: &[NodeIndex],
    earliest_finish: &HashMap<NodeIndex, usize>,
    node_slack: &HashMap<NodeIndex, usize>,
) -> Vec<NodeIndex> {
    let is_critical = |v: NodeIndex| node_slack.get(&v).copied().unwrap_or(1) == 0;
    let finish = |v: NodeIndex| earliest_finish.get(&v).copied().unwrap_or(0);

    let Some(&sink) = topo
        .iter()
        .filter(|&&v| is_critical(v))
        .max_by_key(|&&v| finish(v))
    else {
        return Vec::new();
    };

    let mut path = vec![sink];
    let mut current = sink;
    while let Some(prev) = condensed
        .edges_directed(current, Direction::Incoming)
        .map(|e| e.source())
        .filter(|&v| is_critical(v))
        .max_by_key(|&v| finish(v))
    {
        current = prev;
        path.push(current);
    }

    path.reverse();
    path
}

/// Mark the critical path on `graph`.
///
/// Nodes on the reconstructed path get a [`CriticalPathMark`] with their
/// index; dependency edges joining consecutive path nodes get
/// `critical_path = true`. A path of a single node is not a chain and marks
/// nothing. Existing marks are cleared first.
#[must_use]
pub fn annotate_critical_path(mut graph: GraphData) -> GraphData {
    let result = compute_critical_path(&graph);

    for node in &mut graph.nodes {
        node.critical_path = None;
    }
    for edge in &mut graph.edges {
        edge.critical_path = false;
    }
    if result.len() < 2 {
        return graph;
    }

    let positions: HashMap<&str, usize> = result
        .critical_path
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let steps: HashSet<(&str, &str)> = result
        .critical_path
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();

    for node in &mut graph.nodes {
        if let Some(&position) = positions.get(node.id.as_str()) {
            node.critical_path = Some(CriticalPathMark { position });
        }
    }
    for edge in &mut graph.edges {
        if edge.kind == EdgeKind::Dependency
            && steps.contains(&(edge.source.as_str(), edge.target.as_str()))
        {
            edge.critical_path = true;
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build;
    use forge_core::{LinkIndex, Node};

    fn graph(nodes: &[Node]) -> GraphData {
        build(nodes, &LinkIndex::new(), None, None)
    }

    #[test]
    fn empty_graph_has_no_path() {
        let result = compute_critical_path(&GraphData::default());
        assert!(result.is_empty());
    }

    #[test]
    fn longest_chain_wins() {
        let g = graph(&[
            Node::task("a", "A"),
            Node::task("b", "B").with_dependencies(["a"]),
            Node::task("c", "C").with_dependencies(["b"]),
            Node::task("x", "X").with_dependencies(["a"]),
        ]);
        let result = compute_critical_path(&g);

        assert_eq!(result.critical_path, vec!["a", "b", "c"]);
        assert_eq!(result.timings["x"].slack, 1);
        assert_eq!(result.timings["c"].earliest_start, 2);
        assert!(!result.critical_nodes.contains("x"));
    }

    #[test]
    fn cycle_members_share_timing() {
        let g = graph(&[
            Node::task("a", "A").with_dependencies(["b"]),
            Node::task("b", "B").with_dependencies(["a"]),
            Node::task("c", "C").with_dependencies(["b"]),
        ]);
        let result = compute_critical_path(&g);

        assert_eq!(result.timings["a"], result.timings["b"]);
        assert_eq!(result.critical_path, vec!["a", "b", "c"]);
    }

    #[test]
    fn references_do_not_count() {
        let nodes = [Node::task("a", "A"), Node::task("b", "B")];
        let g = build(&nodes, &LinkIndex::from_links([("a", "b")]), None, None);
        let result = compute_critical_path(&g);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn annotation_marks_nodes_and_edges() {
        let g = graph(&[
            Node::task("a", "A"),
            Node::task("b", "B").with_dependencies(["a"]),
            Node::task("c", "C").with_dependencies(["a", "b"]),
        ]);
        let marked = annotate_critical_path(g);

        let mark = |id: &str| marked.node(id).and_then(|n| n.critical_path);
        assert_eq!(mark("a"), Some(CriticalPathMark { position: 0 }));
        assert_eq!(mark("c"), Some(CriticalPathMark { position: 2 }));

        let critical: Vec<&str> = marked
            .edges
            .iter()
            .filter(|e| e.critical_path)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(critical, vec!["dependency:a->b", "dependency:b->c"]);
    }

    #[test]
    fn single_node_path_marks_nothing() {
        let marked = annotate_critical_path(graph(&[Node::task("a", "A"), Node::task("b", "B")]));
        assert!(marked.nodes.iter().all(|n| n.critical_path.is_none()));
    }
}
