use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use super::status::{ComponentStatus, DecisionStatus, NodeStatus, TaskStatus};
use super::{ParseEnumError, normalize};

/// The seven kinds of forge node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Task,
    Decision,
    Component,
    Note,
    Subsystem,
    Assembly,
    Module,
}

impl NodeKind {
    pub const ALL: [Self; 7] = [
        Self::Task,
        Self::Decision,
        Self::Component,
        Self::Note,
        Self::Subsystem,
        Self::Assembly,
        Self::Module,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Decision => "decision",
            Self::Component => "component",
            Self::Note => "note",
            Self::Subsystem => "subsystem",
            Self::Assembly => "assembly",
            Self::Module => "module",
        }
    }

    /// Container kinds may hold other nodes through `parent`.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Subsystem | Self::Assembly | Self::Module)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "kind",
                got: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Kinds that move through a lifecycle.
pub trait HasStatus {
    fn status(&self) -> NodeStatus;
}

/// Kinds that can be blocked by other nodes.
pub trait HasDependencies {
    /// Ids this node depends on, in author order.
    fn depends_on(&self) -> &[String];
}

/// Anything that can be nested under a container.
pub trait HasParent {
    fn parent(&self) -> Option<&str>;
}

// ---------------------------------------------------------------------------
// Per-kind bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskNode {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl HasStatus for TaskNode {
    fn status(&self) -> NodeStatus {
        self.status.into()
    }
}

impl HasDependencies for TaskNode {
    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionNode {
    #[serde(default)]
    pub status: DecisionStatus,
}

impl HasStatus for DecisionNode {
    fn status(&self) -> NodeStatus {
        self.status.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentNode {
    #[serde(default)]
    pub status: ComponentStatus,
}

impl HasStatus for ComponentNode {
    fn status(&self) -> NodeStatus {
        self.status.into()
    }
}

/// Kind-specific part of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeBody {
    Task(TaskNode),
    Decision(DecisionNode),
    Component(ComponentNode),
    Note,
    Subsystem,
    Assembly,
    Module,
}

impl NodeBody {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Task(_) => NodeKind::Task,
            Self::Decision(_) => NodeKind::Decision,
            Self::Component(_) => NodeKind::Component,
            Self::Note => NodeKind::Note,
            Self::Subsystem => NodeKind::Subsystem,
            Self::Assembly => NodeKind::Assembly,
            Self::Module => NodeKind::Module,
        }
    }

    /// Empty body for `kind`, with initial statuses.
    #[must_use]
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Task => Self::Task(TaskNode::default()),
            NodeKind::Decision => Self::Decision(DecisionNode::default()),
            NodeKind::Component => Self::Component(ComponentNode::default()),
            NodeKind::Note => Self::Note,
            NodeKind::Subsystem => Self::Subsystem,
            NodeKind::Assembly => Self::Assembly,
            NodeKind::Module => Self::Module,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// An immutable snapshot of one project entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub content: String,
    /// Container this node is nested under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub body: NodeBody,
}

impl Node {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tags: BTreeSet::new(),
            content: String::new(),
            parent: None,
            body: NodeBody::empty(kind),
        }
    }

    #[must_use]
    pub fn task(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, NodeKind::Task)
    }

    /// Replace the dependency list. Has no effect on non-task kinds.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let NodeBody::Task(task) = &mut self.body {
            task.depends_on = ids.into_iter().map(Into::into).collect();
        }
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Status for kinds that have a lifecycle.
    #[must_use]
    pub fn status(&self) -> Option<NodeStatus> {
        self.status_capability().map(|s| s.status())
    }

    #[must_use]
    pub fn status_capability(&self) -> Option<&dyn HasStatus> {
        match &self.body {
            NodeBody::Task(task) => Some(task),
            NodeBody::Decision(decision) => Some(decision),
            NodeBody::Component(component) => Some(component),
            NodeBody::Note | NodeBody::Subsystem | NodeBody::Assembly | NodeBody::Module => None,
        }
    }

    #[must_use]
    pub fn dependency_capability(&self) -> Option<&dyn HasDependencies> {
        match &self.body {
            NodeBody::Task(task) => Some(task),
            NodeBody::Decision(_)
            | NodeBody::Component(_)
            | NodeBody::Note
            | NodeBody::Subsystem
            | NodeBody::Assembly
            | NodeBody::Module => None,
        }
    }

    /// Dependency ids; empty for kinds that cannot depend on anything.
    #[must_use]
    pub fn depends_on(&self) -> &[String] {
        match self.dependency_capability() {
            Some(deps) => deps.depends_on(),
            None => &[],
        }
    }
}

impl HasParent for Node {
    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_predicate() {
        let containers: Vec<NodeKind> = NodeKind::ALL
            .into_iter()
            .filter(|kind| kind.is_container())
            .collect();
        assert_eq!(
            containers,
            vec![NodeKind::Subsystem, NodeKind::Assembly, NodeKind::Module]
        );
    }

    #[test]
    fn kind_display_parse_roundtrips() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(NodeKind::from_str("epic").is_err());
        assert_eq!(NodeKind::from_str(" Module ").unwrap(), NodeKind::Module);
    }

    #[test]
    fn only_tasks_carry_dependencies() {
        let task = Node::task("b", "B").with_dependencies(["a"]);
        assert_eq!(task.depends_on(), ["a".to_string()]);

        let note = Node::new("n", "N", NodeKind::Note).with_dependencies(["a"]);
        assert!(note.depends_on().is_empty());
        assert!(note.dependency_capability().is_none());
    }

    #[test]
    fn status_only_for_lifecycle_kinds() {
        assert_eq!(
            Node::task("t", "T").status(),
            Some(NodeStatus::Pending)
        );
        assert_eq!(
            Node::new("c", "C", NodeKind::Component).status(),
            Some(NodeStatus::Considering)
        );
        assert_eq!(Node::new("m", "M", NodeKind::Module).status(), None);
        assert_eq!(Node::new("n", "N", NodeKind::Note).status(), None);
    }

    #[test]
    fn any_kind_may_have_parent() {
        let note = Node::new("n", "N", NodeKind::Note).with_parent("sys");
        assert_eq!(HasParent::parent(&note), Some("sys"));
        let module = Node::new("m", "M", NodeKind::Module).with_parent("sys");
        assert_eq!(HasParent::parent(&module), Some("sys"));
    }

    #[test]
    fn json_shape_is_flat() {
        let node = Node::task("b", "Build")
            .with_dependencies(["a"])
            .with_tags(["infra"]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "task");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["depends_on"][0], "a");
        assert!(json.get("parent").is_none());

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn json_accepts_minimal_container() {
        let node: Node =
            serde_json::from_str(r#"{"id":"s","title":"Power","kind":"subsystem"}"#).unwrap();
        assert!(node.is_container());
        assert!(node.tags.is_empty());
        assert!(node.content.is_empty());
    }
}
