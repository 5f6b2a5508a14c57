#![forbid(unsafe_code)]
//! forge-graph library.
//!
//! Turns a snapshot of forge nodes plus their link index into typed render
//! graphs: dependency, reference and containment edges, tag clusters, and
//! critical-path marks.
//!
//! ## Pipeline
//!
//! ```text
//! &[Node] + LinkIndex
//!        ↓  build::build()
//! GraphData (nodes with grid or stored positions, typed edges)
//!        ↓  cluster::filter() / cluster::build_with_clustering()
//! visible GraphData (+ ClusterNode stand-ins)
//!        ↓  critical_path::annotate_critical_path()   (optional)
//! GraphData handed to the layout engine and renderer
//! ```
//!
//! # Conventions
//!
//! - **Errors**: graph construction is infallible; dangling ids degrade to
//!   missing edges.
//! - **Logging**: `#[instrument]` spans on build, filter and critical path;
//!   edge and cluster counts at `debug!`, suppressed references at `trace!`.

pub mod build;
pub mod cluster;
pub mod critical_path;
pub mod grid;
pub mod positions;
pub mod types;

pub use build::{BuildOptions, build, build_with_options};
pub use cluster::{
    ClusterNode, ClusteredGraph, TagCluster, UNTAGGED, build_with_clustering,
    build_with_clustering_options, create_cluster_nodes, filter, group_by_tag,
};
pub use critical_path::{CriticalPathResult, annotate_critical_path, compute_critical_path};
pub use positions::{apply_stored_positions, extract_positions};
pub use types::{EdgeKind, GraphData, GraphEdge, GraphNode, NodePositions, Position};
