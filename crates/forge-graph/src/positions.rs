//! Moving positions between a [`GraphData`] and a [`NodePositions`] map.

use crate::types::{GraphData, NodePositions};

/// Current position of every node, keyed by id.
#[must_use]
pub fn extract_positions(graph: &GraphData) -> NodePositions {
    graph
        .nodes
        .iter()
        .map(|node| (node.id.clone(), node.position))
        .collect()
}

/// Overwrite node positions with any stored entry for the same id.
///
/// Nodes missing from `positions` keep what they had; entries for ids not in
/// the graph are ignored.
#[must_use]
pub fn apply_stored_positions(mut graph: GraphData, positions: &NodePositions) -> GraphData {
    for node in &mut graph.nodes {
        if let Some(position) = positions.get(&node.id) {
            node.position = *position;
        }
    }
    graph
}
