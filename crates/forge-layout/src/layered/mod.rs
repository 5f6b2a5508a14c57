//! Layered (Sugiyama-style) layout for compound graphs.
//!
//! # Pipeline
//!
//! A request is a forest of boxes. Every container's children form a
//! *frame*, and so do the roots. Frames are laid out bottom-up so a
//! container's size is known before its own frame is placed.
//!
//! Within a frame:
//!
//! 1. **Acyclic**: reverse DFS back edges ([`acyclic`]).
//! 2. **Rank**: longest path, optionally tightened ([`rank`]).
//! 3. **Normalize**: split long edges with dummies ([`layers`]).
//! 4. **Order**: barycenter sweeps with crossing counting ([`order`]).
//! 5. **Position**: isotonic refinement across ranks ([`position`]).
//!
//! # Cross-frame edges
//!
//! An edge between nodes in different frames is lifted to the lowest frame
//! holding both endpoints, where it joins the two ancestors that are members
//! of that frame. Edges between a container and its own descendant cannot
//! order anything and are dropped, as are self loops.

mod acyclic;
mod frame;
mod layers;
mod order;
mod position;
mod rank;

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::delegate::{
    LayoutDelegate, LayoutEdge, LayoutNode, LayoutRequest, LayoutResult, PlacedNode,
};
use crate::error::LayoutError;

use self::frame::layout_frame;

/// Sweeps of crossing reduction per frame.
pub const DEFAULT_SWEEPS: usize = 24;

/// The built-in [`LayoutDelegate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayeredLayout {
    sweeps: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl LayeredLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sweeps: DEFAULT_SWEEPS,
        }
    }

    /// Cap the crossing-reduction sweeps. Zero keeps the initial DFS order.
    #[must_use]
    pub const fn with_sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }
}

impl LayoutDelegate for LayeredLayout {
    #[instrument(skip_all, fields(roots = request.nodes.len(), edges = request.edges.len()))]
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResult, LayoutError> {
        let forest = Forest::new(&request.nodes)?;
        let mut frame_edges = forest.lift_edges(&request.edges)?;
        let slot_count = forest.slots.len();

        let mut sizes: Vec<(f64, f64)> = forest
            .slots
            .iter()
            .map(|slot| (slot.node.width, slot.node.height))
            .collect();
        let mut offsets = vec![(0.0, 0.0); slot_count];
        let mut frames = 0usize;

        // Slots are in preorder, so reverse order visits children first.
        for index in (0..slot_count).rev() {
            let slot = &forest.slots[index];
            if slot.children.is_empty() {
                continue;
            }
            let extents: Vec<(f64, f64)> = slot.children.iter().map(|&c| sizes[c]).collect();
            let edges = frame_edges.remove(&Some(index)).unwrap_or_default();
            let frame = layout_frame(&extents, &edges, &request.options, self.sweeps);
            frames += 1;

            let padding = slot.node.padding;
            for (&child, &(x, y)) in slot.children.iter().zip(&frame.positions) {
                offsets[child] = (x + padding.left, y + padding.top);
            }
            let (min_width, min_height) = sizes[index];
            sizes[index] = (
                min_width.max(frame.width + padding.horizontal()),
                min_height.max(frame.height + padding.vertical()),
            );
        }

        let extents: Vec<(f64, f64)> = forest.roots.iter().map(|&r| sizes[r]).collect();
        let edges = frame_edges.remove(&None).unwrap_or_default();
        let root_frame = layout_frame(&extents, &edges, &request.options, self.sweeps);
        for (&root, &position) in forest.roots.iter().zip(&root_frame.positions) {
            offsets[root] = position;
        }

        let nodes = forest.assemble(&sizes, &offsets);
        debug!(
            nodes = slot_count,
            frames = frames + 1,
            width = root_frame.width,
            height = root_frame.height,
            "layered layout complete"
        );

        Ok(LayoutResult {
            nodes,
            width: root_frame.width,
            height: root_frame.height,
        })
    }
}

// ---------------------------------------------------------------------------
// Flattened request
// ---------------------------------------------------------------------------

struct Slot<'a> {
    node: &'a LayoutNode,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index within the parent's children (or among the roots).
    local: usize,
}

/// The request's node tree flattened into preorder.
struct Forest<'a> {
    slots: Vec<Slot<'a>>,
    roots: Vec<usize>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Forest<'a> {
    fn new(nodes: &'a [LayoutNode]) -> Result<Self, LayoutError> {
        let mut forest = Self {
            slots: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        };

        let mut stack: Vec<(&'a LayoutNode, Option<usize>, usize)> = nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(local, node)| (node, None, local))
            .collect();

        while let Some((node, parent, local)) = stack.pop() {
            let slot = forest.slots.len();
            if forest.index.insert(node.id.as_str(), slot).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
            forest.slots.push(Slot {
                node,
                parent,
                children: Vec::with_capacity(node.children.len()),
                local,
            });
            match parent {
                Some(parent) => forest.slots[parent].children.push(slot),
                None => forest.roots.push(slot),
            }
            stack.extend(
                node.children
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(local, child)| (child, Some(slot), local)),
            );
        }

        Ok(forest)
    }

    fn slot_of(&self, edge: &LayoutEdge, id: &str) -> Result<usize, LayoutError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| LayoutError::UnknownEndpoint {
                edge_id: edge.id.clone(),
                node_id: id.to_string(),
            })
    }

    /// Root-first chain of slots ending at `slot`.
    fn ancestry(&self, slot: usize) -> Vec<usize> {
        let mut chain = vec![slot];
        let mut current = slot;
        while let Some(parent) = self.slots[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Frame-local edges keyed by owning container (`None` for the roots).
    fn lift_edges(
        &self,
        edges: &[LayoutEdge],
    ) -> Result<HashMap<Option<usize>, Vec<(usize, usize)>>, LayoutError> {
        let mut frames: HashMap<Option<usize>, Vec<(usize, usize)>> = HashMap::new();
        for edge in edges {
            let source = self.slot_of(edge, &edge.source)?;
            let target = self.slot_of(edge, &edge.target)?;
            if source == target {
                continue;
            }

            let source_chain = self.ancestry(source);
            let target_chain = self.ancestry(target);
            let shared = source_chain
                .iter()
                .zip(&target_chain)
                .take_while(|(a, b)| a == b)
                .count();
            let (Some(&from), Some(&to)) = (source_chain.get(shared), target_chain.get(shared))
            else {
                // One endpoint contains the other.
                continue;
            };

            let frame = shared.checked_sub(1).map(|depth| source_chain[depth]);
            frames
                .entry(frame)
                .or_default()
                .push((self.slots[from].local, self.slots[to].local));
        }
        Ok(frames)
    }

    /// Rebuild the nested result, children before parents.
    fn assemble(&self, sizes: &[(f64, f64)], offsets: &[(f64, f64)]) -> Vec<PlacedNode> {
        let mut built: Vec<Option<PlacedNode>> = vec![None; self.slots.len()];
        for index in (0..self.slots.len()).rev() {
            let slot = &self.slots[index];
            let children = slot
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            let (x, y) = offsets[index];
            let (width, height) = sizes[index];
            built[index] = Some(PlacedNode {
                id: slot.node.id.clone(),
                x,
                y,
                width,
                height,
                children,
            });
        }
        self.roots
            .iter()
            .filter_map(|&root| built[root].take())
            .collect()
    }
}
