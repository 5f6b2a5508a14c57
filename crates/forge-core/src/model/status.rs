use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, normalize};

/// Lifecycle of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
    Blocked,
}

/// Lifecycle of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    #[default]
    Pending,
    Selected,
}

/// Lifecycle of a component candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    #[default]
    Considering,
    Selected,
    Rejected,
}

/// Render-level status carried on a graph node.
///
/// Union of the per-kind status values so the renderer can style nodes
/// without knowing which kind produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Pending,
    InProgress,
    Complete,
    Blocked,
    Selected,
    Considering,
    Rejected,
}

impl NodeStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Blocked => "blocked",
            Self::Selected => "selected",
            Self::Considering => "considering",
            Self::Rejected => "rejected",
        }
    }
}

impl From<TaskStatus> for NodeStatus {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Pending => Self::Pending,
            TaskStatus::InProgress => Self::InProgress,
            TaskStatus::Complete => Self::Complete,
            TaskStatus::Blocked => Self::Blocked,
        }
    }
}

impl From<DecisionStatus> for NodeStatus {
    fn from(value: DecisionStatus) -> Self {
        match value {
            DecisionStatus::Pending => Self::Pending,
            DecisionStatus::Selected => Self::Selected,
        }
    }
}

impl From<ComponentStatus> for NodeStatus {
    fn from(value: ComponentStatus) -> Self {
        match value {
            ComponentStatus::Considering => Self::Considering,
            ComponentStatus::Selected => Self::Selected,
            ComponentStatus::Rejected => Self::Rejected,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseEnumError {
                expected: "task status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for DecisionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "selected" => Ok(Self::Selected),
            _ => Err(ParseEnumError {
                expected: "decision status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for ComponentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "considering" => Ok(Self::Considering),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                expected: "component status",
                got: s.to_string(),
            }),
        }
    }
}
