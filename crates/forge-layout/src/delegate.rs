//! The seam between the engine and whatever computes coordinates.
//!
//! The engine turns a [`forge_graph::GraphData`] into a [`LayoutRequest`]: a
//! forest of sized boxes plus the edges that should order them. A
//! [`LayoutDelegate`] answers with a [`LayoutResult`] of the same shape.
//!
//! # Coordinates
//!
//! Every [`PlacedNode`] carries the top-left corner of its box *relative to
//! the top-left corner of its parent's box*. Roots are relative to the
//! layout origin. The engine resolves absolute positions.

use forge_core::AutoLayoutOptions;

use crate::error::LayoutError;

/// Space reserved inside a container box around its children.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const ZERO: Self = Self::uniform(0.0);

    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A box to place. Nodes with children are containers: the delegate grows
/// them to fit their laid-out children plus `padding`, never shrinking below
/// `width` x `height`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    #[must_use]
    pub fn leaf(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            padding: Padding::ZERO,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>, padding: Padding) -> Self {
        self.children = children;
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Directed ordering hint: `source` should sit on an earlier rank than
/// `target`. Endpoints may live at any nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl LayoutEdge {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub options: AutoLayoutOptions,
}

impl LayoutRequest {
    /// Total number of boxes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&LayoutNode> = self.nodes.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A placed box; `x`/`y` are relative to the parent box (see module docs).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub children: Vec<PlacedNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    pub nodes: Vec<PlacedNode>,
    /// Extent of the root frame.
    pub width: f64,
    pub height: f64,
}

/// Something that can place a [`LayoutRequest`].
///
/// Implementations must be deterministic: identical requests produce
/// identical results. Calls are synchronous; a host that runs layout off its
/// UI thread pairs each call with a [`crate::LayoutTicket`] to drop stale
/// answers.
pub trait LayoutDelegate {
    /// Place every node of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownEndpoint`] when an edge names a node not in
    /// the request, and [`LayoutError::DuplicateNode`] when an id is nested
    /// twice.
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResult, LayoutError>;
}

impl<T: LayoutDelegate + ?Sized> LayoutDelegate for &T {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResult, LayoutError> {
        (**self).layout(request)
    }
}
