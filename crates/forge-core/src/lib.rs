#![forbid(unsafe_code)]
//! forge-core library.
//!
//! Node model, reference index, configuration and error codes shared by the
//! graph builder and the layout engine.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for fallible I/O, typed errors elsewhere.
//! - **Logging**: config resolution logs environment overrides at `debug!`.

pub mod config;
pub mod error;
pub mod link_index;
pub mod model;

pub use config::{AutoLayoutOptions, Direction, GridConfig, LayoutAlgorithm, ProjectConfig};
pub use error::ErrorCode;
pub use link_index::LinkIndex;
pub use model::{Node, NodeBody, NodeKind, NodeStatus};
