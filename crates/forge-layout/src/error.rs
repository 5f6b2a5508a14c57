use forge_core::ErrorCode;

/// Failures surfaced by a layout call.
///
/// None of these are retried internally. A host that receives one either
/// fixes its input (usually by running the graph through
/// `forge_graph::filter`) or keeps the default grid positions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// An edge names a node that is not part of the request.
    #[error("edge {edge_id} references unknown node {node_id}")]
    UnknownEndpoint { edge_id: String, node_id: String },

    /// The same node id was nested twice in one request.
    #[error("node {0} appears more than once in the layout request")]
    DuplicateNode(String),

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    /// The delegate returned without placing a requested node.
    #[error("layout result has no placement for node {0}")]
    MissingPlacement(String),
}

impl LayoutError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownEndpoint { .. } => ErrorCode::DanglingEdge,
            Self::DuplicateNode(_) => ErrorCode::DuplicateNode,
            Self::InvalidViewport { .. } => ErrorCode::InvalidViewport,
            Self::MissingPlacement(_) => ErrorCode::InternalUnexpected,
        }
    }
}
