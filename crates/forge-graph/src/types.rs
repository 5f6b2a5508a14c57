//! Render-model types produced by the graph builder.

use forge_core::model::{NodeKind, NodeStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A point in diagram space (top-left corner of a node).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Node id to position. The only artifact layout exports.
pub type NodePositions = BTreeMap<String, Position>;

/// Relationship carried by a [`GraphEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// `source` must complete before `target`.
    Dependency,
    /// `source` mentions `target` in its content.
    Reference,
    /// `source` is the container of `target`. Grouping only.
    Containment,
}

impl EdgeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Reference => "reference",
            Self::Containment => "containment",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable edge id derived from `(kind, source, target)`.
#[must_use]
pub fn edge_id(kind: EdgeKind, source: &str, target: &str) -> String {
    format!("{kind}:{source}->{target}")
}

/// Marks a node as lying on the reconstructed critical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathMark {
    /// Zero-based index along the path, sources first.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub position: Position,
    pub label: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub is_container: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_path: Option<CriticalPathMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default)]
    pub critical_path: bool,
}

impl GraphEdge {
    #[must_use]
    pub fn new(kind: EdgeKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(kind, &source, &target),
            source,
            target,
            kind,
            critical_path: false,
        }
    }

    /// `true` if this edge joins `a` and `b` in either direction.
    #[must_use]
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Nodes and typed edges ready for layout and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }

    #[must_use]
    pub fn edge_count_by_kind(&self, kind: EdgeKind) -> usize {
        self.edges_of_kind(kind).count()
    }

    /// BLAKE3 hash of the sorted edge set, for cache invalidation.
    ///
    /// Changes only when edges change; node positions and labels do not
    /// contribute.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut keys: Vec<(EdgeKind, &str, &str)> = self
            .edges
            .iter()
            .map(|edge| (edge.kind, edge.source.as_str(), edge.target.as_str()))
            .collect();
        keys.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (kind, source, target) in keys {
            hasher.update(kind.as_str().as_bytes());
            hasher.update(b"\x00");
            hasher.update(source.as_bytes());
            hasher.update(b"\x00");
            hasher.update(target.as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_id_encodes_kind_and_direction() {
        assert_eq!(edge_id(EdgeKind::Dependency, "a", "b"), "dependency:a->b");
        assert_ne!(
            edge_id(EdgeKind::Reference, "a", "b"),
            edge_id(EdgeKind::Reference, "b", "a")
        );
    }

    #[test]
    fn connects_ignores_direction() {
        let edge = GraphEdge::new(EdgeKind::Reference, "a", "b");
        assert!(edge.connects("b", "a"));
        assert!(!edge.connects("a", "c"));
    }

    #[test]
    fn content_hash_ignores_edge_order() {
        let a = GraphData {
            nodes: Vec::new(),
            edges: vec![
                GraphEdge::new(EdgeKind::Dependency, "a", "b"),
                GraphEdge::new(EdgeKind::Reference, "b", "c"),
            ],
        };
        let mut b = a.clone();
        b.edges.reverse();
        assert_eq!(a.content_hash(), b.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));

        let empty = GraphData::default();
        assert_ne!(a.content_hash(), empty.content_hash());
    }

    #[test]
    fn edge_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::Containment).unwrap(),
            "\"containment\""
        );
    }
}
