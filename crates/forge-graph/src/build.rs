//! Graph construction from a node snapshot and a link index.
//!
//! # Overview
//!
//! [`build`] turns the full node collection into one [`GraphNode`] per node
//! and three independent edge sets:
//!
//! | Kind          | Source of truth            | Direction           |
//! |---------------|----------------------------|---------------------|
//! | `dependency`  | a task's `depends_on` list | blocker -> blocked  |
//! | `reference`   | `LinkIndex::outgoing`      | linker -> linked    |
//! | `containment` | a node's `parent`          | container -> child  |
//!
//! ## Edge Direction
//!
//! An edge `A -> B` of kind `dependency` means "A **blocks** B": for a task
//! `B` with `depends_on = [A]` we insert `A -> B`.
//!
//! ## Precedence
//!
//! A reference between two nodes that already share a dependency edge (in
//! either direction) is dropped; the author treats the two as one
//! relationship. Containment edges are never deduplicated against the other
//! kinds.
//!
//! ## Dangling Ids
//!
//! Dependencies, references and parents that name a node outside the
//! collection produce no edge and no error.
//!
//! ## Self Relations
//!
//! A node that depends on, links to, or parents itself gets a self-loop of
//! the matching kind. Layout ignores self-loops for positioning.

use std::collections::HashSet;

use forge_core::config::GridConfig;
use forge_core::{LinkIndex, Node};
use tracing::{debug, instrument, trace};

use crate::grid::grid_position;
use crate::types::{EdgeKind, GraphData, GraphEdge, GraphNode, NodePositions};

/// Inputs to [`build_with_options`] besides the nodes and links.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions<'a> {
    /// Positions saved from a previous session, keyed by node id.
    pub stored_positions: Option<&'a NodePositions>,
    /// Node to flag as selected.
    pub selected_id: Option<&'a str>,
    pub grid: GridConfig,
}

/// Build the render graph with the default grid.
#[must_use]
pub fn build(
    nodes: &[Node],
    links: &LinkIndex,
    stored_positions: Option<&NodePositions>,
    selected_id: Option<&str>,
) -> GraphData {
    build_with_options(
        nodes,
        links,
        &BuildOptions {
            stored_positions,
            selected_id,
            grid: GridConfig::default(),
        },
    )
}

/// Build the render graph.
///
/// Output is a pure function of the inputs: node order follows `nodes`, and
/// edges are emitted dependency pass first, then reference, then containment.
#[must_use]
#[instrument(skip_all, fields(nodes = nodes.len(), links = links.link_count()))]
pub fn build_with_options(
    nodes: &[Node],
    links: &LinkIndex,
    options: &BuildOptions<'_>,
) -> GraphData {
    let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();

    let graph_nodes: Vec<GraphNode> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| to_graph_node(index, node, options))
        .collect();

    let dependency = dependency_edges(nodes, &known);
    let reference = reference_edges(links, &known, &dependency);
    let containment = containment_edges(nodes, &known);

    debug!(
        dependency = dependency.len(),
        reference = reference.len(),
        containment = containment.len(),
        "graph edges built"
    );

    let mut edges = dependency;
    edges.extend(reference);
    edges.extend(containment);

    GraphData {
        nodes: graph_nodes,
        edges,
    }
}

fn to_graph_node(index: usize, node: &Node, options: &BuildOptions<'_>) -> GraphNode {
    let position = options
        .stored_positions
        .and_then(|stored| stored.get(&node.id))
        .copied()
        .unwrap_or_else(|| grid_position(index, &options.grid));

    GraphNode {
        id: node.id.clone(),
        position,
        label: node.title.clone(),
        kind: node.kind(),
        status: node.status(),
        tags: node.tags.clone(),
        is_container: node.is_container(),
        parent_id: node.parent.clone(),
        selected: options.selected_id == Some(node.id.as_str()),
        critical_path: None,
    }
}

/// `D -> T` for every task `T` and every known `D` in its `depends_on`.
fn dependency_edges(nodes: &[Node], known: &HashSet<&str>) -> Vec<GraphEdge> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();

    for node in nodes {
        for dependency in node.depends_on() {
            if !known.contains(dependency.as_str()) {
                continue;
            }
            if seen.insert((dependency.as_str(), node.id.as_str())) {
                edges.push(GraphEdge::new(
                    EdgeKind::Dependency,
                    dependency.as_str(),
                    node.id.as_str(),
                ));
            }
        }
    }

    edges
}

/// One edge per link, unless a dependency already joins the pair.
fn reference_edges(
    links: &LinkIndex,
    known: &HashSet<&str>,
    dependency: &[GraphEdge],
) -> Vec<GraphEdge> {
    let blocked_pairs: HashSet<(&str, &str)> = dependency
        .iter()
        .flat_map(|edge| {
            [
                (edge.source.as_str(), edge.target.as_str()),
                (edge.target.as_str(), edge.source.as_str()),
            ]
        })
        .collect();

    links
        .links()
        .filter(|(source, target)| known.contains(source) && known.contains(target))
        .filter(|pair| {
            let suppressed = blocked_pairs.contains(pair);
            if suppressed {
                trace!(source = pair.0, target = pair.1, "reference suppressed by dependency");
            }
            !suppressed
        })
        .map(|(source, target)| GraphEdge::new(EdgeKind::Reference, source, target))
        .collect()
}

/// `parent -> child` for every node whose parent is in the collection.
fn containment_edges(nodes: &[Node], known: &HashSet<&str>) -> Vec<GraphEdge> {
    nodes
        .iter()
        .filter_map(|node| {
            let parent = node.parent.as_deref()?;
            known
                .contains(parent)
                .then(|| GraphEdge::new(EdgeKind::Containment, parent, node.id.as_str()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
