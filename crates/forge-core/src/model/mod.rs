//! Typed project entities.
//!
//! A [`Node`] is a sum type over its kind-specific body ([`NodeBody`]).
//! Fields that only some kinds carry (status, dependencies) live in the
//! per-kind structs and are reached through the capability traits
//! [`HasStatus`], [`HasDependencies`] and [`HasParent`].

use std::fmt;

pub mod node;
pub mod status;

pub use node::{
    ComponentNode, DecisionNode, HasDependencies, HasParent, HasStatus, Node, NodeBody, NodeKind,
    TaskNode,
};
pub use status::{ComponentStatus, DecisionStatus, NodeStatus, TaskStatus};

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl ParseEnumError {
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        crate::error::ErrorCode::InvalidEnumValue
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
