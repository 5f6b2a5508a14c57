//! Rank assignment over an acyclic edge set.
//!
//! Longest-path ranking puts every node one rank below its deepest
//! predecessor. It is fast but leaves sources hugging rank 0 even when their
//! only successor sits many ranks down. [`LayoutAlgorithm::Layered`] adds a
//! tightening pass: walking sinks-first, a node with more successors than
//! predecessors moves down to just above its nearest successor, shortening
//! more edges than it lengthens.

use forge_core::LayoutAlgorithm;
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};

/// Rank per node, normalized so the smallest rank is 0.
///
/// `edges` must be acyclic; every returned rank satisfies
/// `rank[source] < rank[target]`.
pub fn assign_ranks(
    node_count: usize,
    edges: &[(usize, usize)],
    algorithm: LayoutAlgorithm,
) -> Vec<usize> {
    let mut graph = DiGraph::<(), ()>::with_capacity(node_count, edges.len());
    for _ in 0..node_count {
        graph.add_node(());
    }
    for &(source, target) in edges {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }

    // Cycles are broken upstream; index order is only a fallback.
    let order: Vec<NodeIndex> =
        toposort(&graph, None).unwrap_or_else(|_| graph.node_indices().collect());

    let mut rank = vec![0usize; node_count];
    for &node in &order {
        rank[node.index()] = graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| rank[pred.index()] + 1)
            .max()
            .unwrap_or(0);
    }

    if algorithm == LayoutAlgorithm::Layered {
        for &node in order.iter().rev() {
            let outgoing = graph.neighbors_directed(node, Direction::Outgoing).count();
            let incoming = graph.neighbors_directed(node, Direction::Incoming).count();
            if outgoing == 0 || outgoing <= incoming {
                continue;
            }
            let limit = graph
                .neighbors_directed(node, Direction::Outgoing)
                .map(|succ| rank[succ.index()])
                .min()
                .map_or(0, |nearest| nearest.saturating_sub(1));
            if limit > rank[node.index()] {
                rank[node.index()] = limit;
            }
        }
    }

    let floor = rank.iter().copied().min().unwrap_or(0);
    for r in &mut rank {
        *r -= floor;
    }
    rank
}
