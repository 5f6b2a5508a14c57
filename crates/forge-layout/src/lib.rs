#![forbid(unsafe_code)]
//! forge-layout library.
//!
//! Computes 2D positions for a [`forge_graph::GraphData`]: dependency and
//! reference edges flow in the configured [`forge_core::Direction`], and
//! containment is drawn as nesting rather than as edges.
//!
//! ```text
//! GraphData ──► LayoutRequest ──► LayoutDelegate ──► LayoutResult
//!                                                        │
//!                      NodePositions ◄── [center] ◄── flatten
//! ```
//!
//! [`LayeredLayout`] is the built-in delegate. Hosts construct one and pass it
//! by reference to the `calculate_*` entry points; it holds no state between
//! calls.
//!
//! # Conventions
//!
//! - **Errors**: [`LayoutError`], each variant mapped to a shared
//!   [`forge_core::ErrorCode`].
//! - **Logging**: `tracing` spans on every entry point; cycle breaking logs at
//!   `warn!`.

pub mod delegate;
pub mod engine;
pub mod error;
pub mod generation;
pub mod layered;
pub mod nesting;

pub use delegate::{
    LayoutDelegate, LayoutEdge, LayoutNode, LayoutRequest, LayoutResult, Padding, PlacedNode,
};
pub use engine::{
    Bounds, CONTAINER_PADDING, LayoutBox, NODE_HEIGHT, NODE_WIDTH, Viewport,
    calculate_centered_hierarchical_layout, calculate_centered_layout,
    calculate_hierarchical_boxes, calculate_hierarchical_layout, calculate_layout, center,
    flatten,
};
pub use error::LayoutError;
pub use generation::{LayoutGeneration, LayoutTicket};
pub use layered::LayeredLayout;
