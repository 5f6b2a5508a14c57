//! Known-topology layout tests.
//!
//! Each test builds a small project through `forge_graph::build` and checks a
//! property the renderer relies on: dependency order, nesting, centering and
//! rejection of graphs that were not pre-filtered.

use forge_core::{AutoLayoutOptions, Direction, LayoutAlgorithm, LinkIndex, Node, NodeKind};
use forge_graph::{GraphData, NodePositions, Position, build, filter};
use forge_layout::{
    CONTAINER_PADDING, LayeredLayout, LayoutError, NODE_HEIGHT, NODE_WIDTH, Viewport,
    calculate_centered_hierarchical_layout, calculate_centered_layout,
    calculate_hierarchical_boxes, calculate_hierarchical_layout, calculate_layout,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn graph(nodes: &[Node]) -> GraphData {
    build(nodes, &LinkIndex::new(), None, None)
}

fn layout(graph: &GraphData) -> NodePositions {
    calculate_layout(&LayeredLayout::new(), graph, &AutoLayoutOptions::default()).unwrap()
}

fn chain() -> Vec<Node> {
    vec![
        Node::task("A", "A"),
        Node::task("B", "B").with_dependencies(["A"]),
        Node::task("C", "C").with_dependencies(["B"]),
    ]
}

fn span(positions: &NodePositions) -> (Position, Position) {
    let min_x = positions.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = positions.values().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = positions.values().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    (Position::new(min_x, min_y), Position::new(max_x, max_y))
}

/// Every node moved by the same offset (within float noise).
fn is_translation(a: &NodePositions, b: &NodePositions) -> bool {
    let Some((id, first)) = a.iter().next() else {
        return b.is_empty();
    };
    let dx = b[id].x - first.x;
    let dy = b[id].y - first.y;
    a.len() == b.len()
        && a.iter().all(|(id, p)| {
            b.get(id)
                .is_some_and(|q| (q.x - p.x - dx).abs() < 1e-6 && (q.y - p.y - dy).abs() < 1e-6)
        })
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

#[test]
fn chain_flows_downward() {
    init_tracing();
    let positions = layout(&graph(&chain()));
    assert!(positions["A"].y < positions["B"].y);
    assert!(positions["B"].y < positions["C"].y);
    assert!(positions["A"].y + NODE_HEIGHT <= positions["B"].y);
}

#[test]
fn shortcut_scenario_keeps_a_above_b_above_c() {
    let nodes = vec![
        Node::task("A", "A"),
        Node::task("B", "B").with_dependencies(["A"]),
        Node::task("C", "C").with_dependencies(["A", "B"]),
    ];
    let g = graph(&nodes);
    assert_eq!(g.edges.len(), 3);

    let positions = layout(&g);
    assert_eq!(positions.len(), 3);
    assert!(positions["A"].y < positions["B"].y);
    assert!(positions["B"].y < positions["C"].y);
}

#[test]
fn every_direction_orders_the_chain() {
    let g = graph(&chain());
    let run = |direction| {
        let options = AutoLayoutOptions::default().with_direction(direction);
        calculate_layout(&LayeredLayout::new(), &g, &options).unwrap()
    };

    let up = run(Direction::Up);
    assert!(up["A"].y > up["B"].y && up["B"].y > up["C"].y);
    let right = run(Direction::Right);
    assert!(right["A"].x < right["B"].x && right["B"].x < right["C"].x);
    let left = run(Direction::Left);
    assert!(left["A"].x > left["B"].x && left["B"].x > left["C"].x);
}

#[test]
fn longest_path_algorithm_also_respects_order() {
    let options = AutoLayoutOptions {
        algorithm: LayoutAlgorithm::LongestPath,
        ..AutoLayoutOptions::default()
    };
    let positions = calculate_layout(&LayeredLayout::new(), &graph(&chain()), &options).unwrap();
    assert!(positions["A"].y < positions["B"].y && positions["B"].y < positions["C"].y);
}

#[test]
fn references_take_part_in_ranking() {
    let nodes = vec![
        Node::new("N", "Note", NodeKind::Note),
        Node::new("D", "Decision", NodeKind::Decision),
    ];
    let g = build(&nodes, &LinkIndex::from_links([("N", "D")]), None, None);
    let positions = layout(&g);
    assert!(positions["N"].y < positions["D"].y);
}

// ---------------------------------------------------------------------------
// Robustness
// ---------------------------------------------------------------------------

#[test]
fn three_cycle_places_every_node() {
    init_tracing();
    let nodes = vec![
        Node::task("A", "A").with_dependencies(["C"]),
        Node::task("B", "B").with_dependencies(["A"]),
        Node::task("C", "C").with_dependencies(["B"]),
    ];
    let positions = layout(&graph(&nodes));
    assert_eq!(positions.len(), 3);
    assert!(positions.values().all(|p| p.is_finite()));

    let distinct: std::collections::HashSet<(u64, u64)> = positions
        .values()
        .map(|p| (p.x.to_bits(), p.y.to_bits()))
        .collect();
    assert_eq!(distinct.len(), 3);
}

#[test]
fn isolated_nodes_do_not_overlap() {
    let nodes: Vec<Node> = (0..7).map(|i| Node::task(format!("n{i}"), "x")).collect();
    let positions = layout(&graph(&nodes));
    let mut xs: Vec<f64> = positions.values().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] >= NODE_WIDTH);
    }
}

#[test]
fn empty_graph_lays_out_to_nothing() {
    let positions = layout(&GraphData::default());
    assert!(positions.is_empty());
}

#[test]
fn layout_is_deterministic() {
    let nodes = vec![
        Node::task("A", "A"),
        Node::task("B", "B").with_dependencies(["A"]),
        Node::task("C", "C").with_dependencies(["A"]),
        Node::task("D", "D").with_dependencies(["B", "C"]),
        Node::task("E", "E").with_dependencies(["A"]),
        Node::new("S", "S", NodeKind::Subsystem),
        Node::task("F", "F").with_parent("S").with_dependencies(["D"]),
    ];
    let g = graph(&nodes);
    let options = AutoLayoutOptions::default();
    let first = calculate_hierarchical_layout(&LayeredLayout::new(), &g, &options).unwrap();
    let second = calculate_hierarchical_layout(&LayeredLayout::new(), &g, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn dangling_edge_is_rejected_until_filtered() {
    let g = graph(&chain());
    let visible: std::collections::BTreeSet<String> =
        ["A", "B"].iter().map(|s| (*s).to_string()).collect();

    // Dropping a node by hand leaves its edges dangling.
    let mut broken = g.clone();
    broken.nodes.retain(|n| n.id != "C");
    let err = calculate_layout(&LayeredLayout::new(), &broken, &AutoLayoutOptions::default())
        .unwrap_err();
    assert!(matches!(err, LayoutError::UnknownEndpoint { ref node_id, .. } if node_id == "C"));
    assert_eq!(err.code().code(), "E2003");

    let positions = layout(&filter(&g, &visible));
    assert_eq!(positions.len(), 2);
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

fn nested_project() -> Vec<Node> {
    vec![
        Node::new("S", "Drive", NodeKind::Subsystem),
        Node::new("M", "Motor", NodeKind::Module).with_parent("S"),
        Node::task("T1", "Spec").with_parent("M"),
        Node::task("T2", "Build").with_parent("M").with_dependencies(["T1"]),
        Node::task("X", "Integrate").with_dependencies(["T2"]),
    ]
}

#[test]
fn children_sit_inside_their_container() {
    let g = graph(&nested_project());
    let boxes =
        calculate_hierarchical_boxes(&LayeredLayout::new(), &g, &AutoLayoutOptions::default())
            .unwrap();
    let find = |id: &str| boxes.iter().find(|b| b.id == id).unwrap();

    for (child, parent) in [("M", "S"), ("T1", "M"), ("T2", "M")] {
        let c = find(child);
        let p = find(parent);
        assert!(c.position.x >= p.position.x + CONTAINER_PADDING.left, "{child} in {parent}");
        assert!(c.position.y >= p.position.y + CONTAINER_PADDING.top, "{child} in {parent}");
        assert!(c.position.x + c.width <= p.position.x + p.width, "{child} in {parent}");
        assert!(c.position.y + c.height <= p.position.y + p.height, "{child} in {parent}");
    }

    // T2 -> X lifts to S -> X in the root frame.
    assert!(find("S").position.y + find("S").height <= find("X").position.y);
    assert!(find("T1").position.y < find("T2").position.y);
    assert!(find("S").width > NODE_WIDTH);
}

#[test]
fn containment_cycle_still_places_every_node() {
    init_tracing();
    let nodes = vec![
        Node::new("P", "P", NodeKind::Module).with_parent("Q"),
        Node::new("Q", "Q", NodeKind::Module).with_parent("P"),
        Node::task("R", "R").with_parent("P"),
        Node::task("Z", "Z"),
    ];
    let g = graph(&nodes);
    let positions =
        calculate_hierarchical_layout(&LayeredLayout::new(), &g, &AutoLayoutOptions::default())
            .unwrap();
    assert_eq!(positions.len(), 4);
    assert!(positions.values().all(|p| p.is_finite()));
}

#[test]
fn self_relations_reach_layout_and_are_ignored() {
    init_tracing();
    let nodes = vec![
        Node::new("N", "N", NodeKind::Note),
        Node::new("S", "S", NodeKind::Subsystem).with_parent("S"),
        Node::task("T", "T").with_dependencies(["T"]),
        Node::task("U", "U").with_parent("S"),
    ];
    let g = build(&nodes, &LinkIndex::from_links([("N", "N")]), None, None);
    assert_eq!(g.edges.iter().filter(|e| e.source == e.target).count(), 3);

    let flat = layout(&g);
    assert_eq!(flat.len(), 4);
    assert!(flat.values().all(|p| p.is_finite()));

    let nested =
        calculate_hierarchical_layout(&LayeredLayout::new(), &g, &AutoLayoutOptions::default())
            .unwrap();
    assert_eq!(nested.len(), 4);
    assert!(nested["U"].x >= nested["S"].x);
    assert!(nested["U"].y >= nested["S"].y + CONTAINER_PADDING.top);
}

#[test]
fn flat_layout_ignores_nesting() {
    let g = graph(&nested_project());
    let flat = layout(&g);
    assert_eq!(flat.len(), 5);
    // No containment edges reach the delegate, so S and M are free roots.
    assert!((flat["S"].y - 0.0).abs() < f64::EPSILON);
    assert!((flat["M"].y - 0.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Centering
// ---------------------------------------------------------------------------

#[test]
fn centering_only_translates() {
    let g = graph(&nested_project());
    let options = AutoLayoutOptions::default();
    let plain = calculate_hierarchical_layout(&LayeredLayout::new(), &g, &options).unwrap();
    let centered = calculate_centered_hierarchical_layout(
        &LayeredLayout::new(),
        &g,
        &options,
        Viewport::new(4000.0, 3000.0),
    )
    .unwrap();

    assert!(is_translation(&plain, &centered));
    let (min, _) = span(&centered);
    assert!(min.x > 0.0 && min.y > 0.0);
}

#[test]
fn centering_in_a_small_viewport_pins_to_origin() {
    let g = graph(&chain());
    let centered = calculate_centered_layout(
        &LayeredLayout::new(),
        &g,
        &AutoLayoutOptions::default(),
        Viewport::new(10.0, 10.0),
    )
    .unwrap();
    let (min, _) = span(&centered);
    assert_eq!(min, Position::new(0.0, 0.0));
}

#[test]
fn single_node_is_centered_exactly() {
    let g = graph(&[Node::task("A", "A")]);
    let centered = calculate_centered_layout(
        &LayeredLayout::new(),
        &g,
        &AutoLayoutOptions::default(),
        Viewport::new(1000.0, 600.0),
    )
    .unwrap();
    assert_eq!(centered["A"], Position::new(400.0, 270.0));
}
