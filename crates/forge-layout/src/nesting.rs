//! Containment nesting.
//!
//! Turns each node's `parent_id` into the box forest handed to a
//! [`LayoutDelegate`](crate::LayoutDelegate). The walk keeps an explicit
//! worklist and a visited set: a node is nested at most once, so a
//! containment cycle can neither loop nor duplicate nodes.
//!
//! Parents outside the graph, and self-parents, make a node a root. When some
//! nodes are still unplaced after every root has been walked, their parent
//! chains end in a containment cycle. The lowest-index node on each such
//! cycle is promoted to a root, and the rest of the cycle (plus anything
//! hanging off it) nests beneath it.

use std::collections::HashMap;

use forge_graph::GraphData;
use tracing::warn;

use crate::delegate::LayoutNode;
use crate::engine::{CONTAINER_PADDING, NODE_HEIGHT, NODE_WIDTH};

/// Nesting chosen over node indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NestingPlan {
    /// Top-level nodes; promoted cycle entries come last.
    pub roots: Vec<usize>,
    pub children: Vec<Vec<usize>>,
    /// Nodes made roots to break a containment cycle.
    pub promoted: Vec<usize>,
    /// Every node once, each after its parent.
    pub order: Vec<usize>,
}

/// Choose a nesting for nodes `0..parents.len()`.
#[must_use]
pub fn plan_nesting(parents: &[Option<usize>]) -> NestingPlan {
    let count = parents.len();
    let mut declared: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut plan = NestingPlan {
        children: vec![Vec::new(); count],
        order: Vec::with_capacity(count),
        ..NestingPlan::default()
    };

    for (node, parent) in parents.iter().enumerate() {
        match *parent {
            Some(parent) if parent != node && parent < count => declared[parent].push(node),
            _ => plan.roots.push(node),
        }
    }

    let mut visited = vec![false; count];
    for index in 0..plan.roots.len() {
        let root = plan.roots[index];
        claim(root, &declared, &mut visited, &mut plan);
    }
    let mut walked = vec![usize::MAX; count];
    for node in 0..count {
        if visited[node] {
            continue;
        }
        let entry = cycle_entry(node, parents, &mut walked);
        plan.promoted.push(entry);
        plan.roots.push(entry);
        claim(entry, &declared, &mut visited, &mut plan);
    }
    plan
}

/// Lowest index on the containment cycle reached by following parents up
/// from `start`. `walked` stamps nodes with the walk that visited them.
fn cycle_entry(start: usize, parents: &[Option<usize>], walked: &mut [usize]) -> usize {
    let parent_of = |node: usize| parents[node].filter(|&p| p < parents.len());

    let mut current = start;
    while walked[current] != start {
        walked[current] = start;
        match parent_of(current) {
            Some(parent) => current = parent,
            None => return current,
        }
    }

    // `current` was reached twice, so it lies on the cycle.
    let mut lowest = current;
    let mut member = parent_of(current);
    while let Some(node) = member {
        if node == current {
            break;
        }
        lowest = lowest.min(node);
        member = parent_of(node);
    }
    lowest
}

fn claim(start: usize, declared: &[Vec<usize>], visited: &mut [bool], plan: &mut NestingPlan) {
    visited[start] = true;
    plan.order.push(start);
    let mut worklist = vec![start];
    while let Some(node) = worklist.pop() {
        for &child in &declared[node] {
            if visited[child] {
                continue;
            }
            visited[child] = true;
            plan.children[node].push(child);
            plan.order.push(child);
            worklist.push(child);
        }
    }
}

/// Nested layout boxes for `graph`: leaves are `NODE_WIDTH` x `NODE_HEIGHT`,
/// nodes with at least one nested child get [`CONTAINER_PADDING`].
#[must_use]
pub fn build_nesting(graph: &GraphData) -> Vec<LayoutNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
    for (i, node) in graph.nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(i);
    }
    let parents: Vec<Option<usize>> = graph
        .nodes
        .iter()
        .map(|node| {
            node.parent_id
                .as_deref()
                .and_then(|parent| index.get(parent).copied())
        })
        .collect();

    let plan = plan_nesting(&parents);
    for &node in &plan.promoted {
        let node = &graph.nodes[node];
        warn!(
            node = %node.id,
            parent = node.parent_id.as_deref().unwrap_or_default(),
            "containment cycle broken, node promoted to root"
        );
    }

    let mut built: Vec<Option<LayoutNode>> = vec![None; graph.nodes.len()];
    for &node in plan.order.iter().rev() {
        let children: Vec<LayoutNode> = plan.children[node]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        let mut layout_node =
            LayoutNode::leaf(graph.nodes[node].id.clone(), NODE_WIDTH, NODE_HEIGHT);
        if !children.is_empty() {
            layout_node = layout_node.with_children(children, CONTAINER_PADDING);
        }
        built[node] = Some(layout_node);
    }

    plan.roots
        .iter()
        .filter_map(|&root| built[root].take())
        .collect()
}
