//! Layout entry points.
//!
//! # Overview
//!
//! Every entry point follows the same steps:
//!
//! 1. Build a [`LayoutRequest`]. Containment edges never become layout
//!    edges. The hierarchical variants express containment by nesting each
//!    child box inside its container; the flat variants lay every node out as
//!    a sibling.
//! 2. Hand the request to the caller's [`LayoutDelegate`].
//! 3. [`flatten`] the nested result: parent offsets accumulate top-down into
//!    one absolute top-left corner per node.
//! 4. Optionally [`center`] the drawing in a viewport. Centering only
//!    translates; it never changes the shape of the layout.
//!
//! Positions are the top-left corner of each node's box, the same convention
//! the grid defaults use.

use forge_core::AutoLayoutOptions;
use forge_graph::{EdgeKind, GraphData, NodePositions, Position};
use tracing::{debug, instrument};

use crate::delegate::{LayoutDelegate, LayoutEdge, LayoutNode, LayoutRequest, LayoutResult, Padding};
use crate::error::LayoutError;
use crate::nesting::build_nesting;

/// Width of a leaf node box.
pub const NODE_WIDTH: f64 = 200.0;
/// Height of a leaf node box.
pub const NODE_HEIGHT: f64 = 60.0;
/// Space a container reserves around its children. The top is taller than a
/// node so the container's own header stays clear.
pub const CONTAINER_PADDING: Padding = Padding {
    top: 80.0,
    right: 20.0,
    bottom: 20.0,
    left: 20.0,
};

/// Visible area a layout is centered in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(self) -> Result<Self, LayoutError> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(self)
        } else {
            Err(LayoutError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// A node's box in absolute coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub id: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned extent of a set of boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// `None` for an empty slice.
    #[must_use]
    pub fn of(boxes: &[LayoutBox]) -> Option<Self> {
        boxes
            .iter()
            .map(|b| Self {
                min_x: b.position.x,
                min_y: b.position.y,
                max_x: b.position.x + b.width,
                max_y: b.position.y + b.height,
            })
            .reduce(|a, b| Self {
                min_x: a.min_x.min(b.min_x),
                min_y: a.min_y.min(b.min_y),
                max_x: a.max_x.max(b.max_x),
                max_y: a.max_y.max(b.max_y),
            })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Lay out every node as a sibling, ignoring nesting.
///
/// # Errors
///
/// Whatever the delegate rejects (see [`LayoutDelegate::layout`]), or
/// [`LayoutError::MissingPlacement`] when it leaves a node unplaced.
#[instrument(skip_all, fields(nodes = graph.nodes.len(), direction = %options.direction))]
pub fn calculate_layout<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    options: &AutoLayoutOptions,
) -> Result<NodePositions, LayoutError> {
    let boxes = run(delegate, graph, flat_request(graph, options))?;
    Ok(to_positions(&boxes))
}

/// [`calculate_layout`], then [`center`] in `viewport`.
///
/// # Errors
///
/// As [`calculate_layout`], plus [`LayoutError::InvalidViewport`] for a
/// negative or non-finite viewport.
#[instrument(skip_all, fields(nodes = graph.nodes.len(), direction = %options.direction))]
pub fn calculate_centered_layout<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    options: &AutoLayoutOptions,
    viewport: Viewport,
) -> Result<NodePositions, LayoutError> {
    let viewport = viewport.validate()?;
    let boxes = run(delegate, graph, flat_request(graph, options))?;
    Ok(to_positions(&center(&boxes, viewport)))
}

/// Lay out with containment expressed as nesting.
///
/// # Errors
///
/// As [`calculate_layout`].
#[instrument(skip_all, fields(nodes = graph.nodes.len(), direction = %options.direction))]
pub fn calculate_hierarchical_layout<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    options: &AutoLayoutOptions,
) -> Result<NodePositions, LayoutError> {
    let boxes = run(delegate, graph, hierarchical_request(graph, options))?;
    Ok(to_positions(&boxes))
}

/// [`calculate_hierarchical_layout`], then [`center`] in `viewport`.
///
/// # Errors
///
/// As [`calculate_centered_layout`].
#[instrument(skip_all, fields(nodes = graph.nodes.len(), direction = %options.direction))]
pub fn calculate_centered_hierarchical_layout<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    options: &AutoLayoutOptions,
    viewport: Viewport,
) -> Result<NodePositions, LayoutError> {
    let viewport = viewport.validate()?;
    let boxes = run(delegate, graph, hierarchical_request(graph, options))?;
    Ok(to_positions(&center(&boxes, viewport)))
}

/// Like [`calculate_hierarchical_layout`] but keeps box sizes, which a
/// renderer needs to draw grown containers.
///
/// # Errors
///
/// As [`calculate_layout`].
pub fn calculate_hierarchical_boxes<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    options: &AutoLayoutOptions,
) -> Result<Vec<LayoutBox>, LayoutError> {
    run(delegate, graph, hierarchical_request(graph, options))
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Dependency and reference edges of `graph`, in graph order.
#[must_use]
pub fn layout_edges(graph: &GraphData) -> Vec<LayoutEdge> {
    graph
        .edges
        .iter()
        .filter(|edge| edge.kind != EdgeKind::Containment)
        .map(|edge| LayoutEdge::new(edge.id.clone(), edge.source.clone(), edge.target.clone()))
        .collect()
}

#[must_use]
pub fn flat_request(graph: &GraphData, options: &AutoLayoutOptions) -> LayoutRequest {
    LayoutRequest {
        nodes: graph
            .nodes
            .iter()
            .map(|node| LayoutNode::leaf(node.id.clone(), NODE_WIDTH, NODE_HEIGHT))
            .collect(),
        edges: layout_edges(graph),
        options: *options,
    }
}

#[must_use]
pub fn hierarchical_request(graph: &GraphData, options: &AutoLayoutOptions) -> LayoutRequest {
    LayoutRequest {
        nodes: build_nesting(graph),
        edges: layout_edges(graph),
        options: *options,
    }
}

/// Absolute boxes for a nested result, parents before children.
#[must_use]
pub fn flatten(result: &LayoutResult) -> Vec<LayoutBox> {
    let mut boxes = Vec::new();
    let mut stack: Vec<_> = result.nodes.iter().rev().map(|n| (n, 0.0, 0.0)).collect();
    while let Some((node, origin_x, origin_y)) = stack.pop() {
        let x = origin_x + node.x;
        let y = origin_y + node.y;
        boxes.push(LayoutBox {
            id: node.id.clone(),
            position: Position::new(x, y),
            width: node.width,
            height: node.height,
        });
        stack.extend(node.children.iter().rev().map(|child| (child, x, y)));
    }
    boxes
}

/// Translate `boxes` so their bounding box sits in the middle of `viewport`.
///
/// When the drawing is larger than the viewport on an axis, it is pinned to
/// 0 on that axis instead of going negative.
#[must_use]
pub fn center(boxes: &[LayoutBox], viewport: Viewport) -> Vec<LayoutBox> {
    let Some(bounds) = Bounds::of(boxes) else {
        return Vec::new();
    };
    let dx = ((viewport.width - bounds.width()) / 2.0).max(0.0) - bounds.min_x;
    let dy = ((viewport.height - bounds.height()) / 2.0).max(0.0) - bounds.min_y;
    boxes
        .iter()
        .map(|b| LayoutBox {
            position: Position::new(b.position.x + dx, b.position.y + dy),
            ..b.clone()
        })
        .collect()
}

fn run<D: LayoutDelegate + ?Sized>(
    delegate: &D,
    graph: &GraphData,
    request: LayoutRequest,
) -> Result<Vec<LayoutBox>, LayoutError> {
    let result = delegate.layout(&request)?;
    let boxes = flatten(&result);

    if boxes.len() < graph.nodes.len() {
        let placed: std::collections::HashSet<&str> =
            boxes.iter().map(|b| b.id.as_str()).collect();
        if let Some(missing) = graph.node_ids().find(|id| !placed.contains(id)) {
            return Err(LayoutError::MissingPlacement(missing.to_string()));
        }
    }

    debug!(
        placed = boxes.len(),
        width = result.width,
        height = result.height,
        "layout flattened"
    );
    Ok(boxes)
}

fn to_positions(boxes: &[LayoutBox]) -> NodePositions {
    boxes
        .iter()
        .map(|b| (b.id.clone(), b.position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::PlacedNode;
    use crate::layered::LayeredLayout;
    use forge_core::{LinkIndex, Node, NodeKind};
    use forge_graph::build;

    struct Fixed(LayoutResult);

    impl LayoutDelegate for Fixed {
        fn layout(&self, _request: &LayoutRequest) -> Result<LayoutResult, LayoutError> {
            Ok(self.0.clone())
        }
    }

    fn placed(id: &str, x: f64, y: f64, children: Vec<PlacedNode>) -> PlacedNode {
        PlacedNode {
            id: id.into(),
            x,
            y,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            children,
        }
    }

    fn boxed(id: &str, x: f64, y: f64) -> LayoutBox {
        LayoutBox {
            id: id.into(),
            position: Position::new(x, y),
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }

    #[test]
    fn flatten_accumulates_offsets() {
        let result = LayoutResult {
            nodes: vec![placed(
                "s",
                10.0,
                5.0,
                vec![placed("m", 20.0, 80.0, vec![placed("t", 20.0, 80.0, vec![])])],
            )],
            ..LayoutResult::default()
        };
        let boxes = flatten(&result);
        let ids: Vec<&str> = boxes.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["s", "m", "t"]);
        assert_eq!(boxes[2].position, Position::new(50.0, 165.0));
    }

    #[test]
    fn center_offsets_into_viewport() {
        let boxes = vec![boxed("a", 10.0, 10.0), boxed("b", 300.0, 200.0)];
        let centered = center(&boxes, Viewport::new(1000.0, 500.0));
        assert_eq!(centered[0].position, Position::new(255.0, 125.0));
        assert_eq!(centered[1].position, Position::new(545.0, 315.0));
    }

    #[test]
    fn center_never_goes_negative() {
        let boxes = vec![boxed("a", -40.0, 30.0), boxed("b", 900.0, 30.0)];
        let centered = center(&boxes, Viewport::new(100.0, 100.0));
        assert_eq!(centered[0].position, Position::new(0.0, 20.0));
        assert_eq!(centered[1].position, Position::new(940.0, 20.0));
    }

    #[test]
    fn center_of_nothing_is_nothing() {
        assert!(center(&[], Viewport::new(10.0, 10.0)).is_empty());
        assert_eq!(Bounds::of(&[]), None);
    }

    #[test]
    fn containment_edges_are_not_layout_edges() {
        let nodes = vec![
            Node::new("S", "S", NodeKind::Subsystem),
            Node::task("A", "A").with_parent("S"),
            Node::task("B", "B").with_parent("S").with_dependencies(["A"]),
        ];
        let graph = build(&nodes, &LinkIndex::new(), None, None);
        let edges: Vec<String> = layout_edges(&graph).into_iter().map(|e| e.id).collect();
        assert_eq!(edges, vec!["dependency:A->B"]);
    }

    #[test]
    fn missing_placement_is_reported() {
        let graph = build(&[Node::task("a", "A")], &LinkIndex::new(), None, None);
        let err = calculate_layout(
            &Fixed(LayoutResult::default()),
            &graph,
            &AutoLayoutOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::MissingPlacement("a".into()));
    }

    #[test]
    fn bad_viewport_is_rejected_before_layout() {
        let graph = GraphData::default();
        let err = calculate_centered_layout(
            &LayeredLayout::new(),
            &graph,
            &AutoLayoutOptions::default(),
            Viewport::new(f64::NAN, 10.0),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidViewport { .. }));
    }

    #[test]
    fn hierarchical_places_children_inside_container() {
        let nodes = vec![
            Node::new("S", "S", NodeKind::Subsystem),
            Node::task("A", "A").with_parent("S"),
            Node::task("B", "B").with_parent("S").with_dependencies(["A"]),
        ];
        let graph = build(&nodes, &LinkIndex::new(), None, None);
        let boxes = calculate_hierarchical_boxes(
            &LayeredLayout::new(),
            &graph,
            &AutoLayoutOptions::default(),
        )
        .unwrap();

        let find = |id: &str| boxes.iter().find(|b| b.id == id).unwrap();
        let s = find("S");
        for child in ["A", "B"] {
            let c = find(child);
            assert!(c.position.x >= s.position.x + CONTAINER_PADDING.left);
            assert!(c.position.y >= s.position.y + CONTAINER_PADDING.top);
            assert!(c.position.x + c.width <= s.position.x + s.width);
            assert!(c.position.y + c.height <= s.position.y + s.height);
        }
        assert!(find("A").position.y < find("B").position.y);
    }
}
