//! Tag clustering and visibility filtering.
//!
//! Tags do not partition the node set: a node tagged `{a, b}` is a member of
//! both clusters, and stays visible while at least one of them is expanded.
//! Untagged nodes share the reserved [`UNTAGGED`] cluster.
//!
//! Hidden nodes are represented only by their cluster pseudo-node. Edges
//! touching a hidden node are dropped, never re-routed to the cluster.

use std::collections::{BTreeMap, BTreeSet};

use forge_core::config::ClusteringConfig;
use forge_core::{LinkIndex, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::build::{BuildOptions, build_with_options};
use crate::types::GraphData;

/// Cluster key for nodes without tags.
pub const UNTAGGED: &str = "__untagged__";

/// Tag to member ids, in node order.
pub type TagGroups = BTreeMap<String, Vec<String>>;

/// One tag's membership and expansion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCluster {
    pub tag: String,
    pub member_ids: Vec<String>,
    pub expanded: bool,
}

/// Stand-in drawn for a collapsed tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub id: String,
    pub tag: String,
    pub label: String,
    pub member_count: usize,
    pub member_ids: Vec<String>,
}

/// Graph with clustering applied, plus the pseudo-nodes for collapsed tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteredGraph {
    pub graph: GraphData,
    pub clusters: Vec<ClusterNode>,
}

/// Stable pseudo-node id for a tag.
#[must_use]
pub fn cluster_id(tag: &str) -> String {
    format!("cluster:{tag}")
}

fn cluster_label(tag: &str) -> String {
    if tag == UNTAGGED {
        "Untagged".to_string()
    } else {
        format!("#{tag}")
    }
}

fn memberships(node: &Node) -> Vec<&str> {
    if node.tags.is_empty() {
        vec![UNTAGGED]
    } else {
        node.tags.iter().map(String::as_str).collect()
    }
}

/// Group node ids by tag.
#[must_use]
pub fn group_by_tag(nodes: &[Node]) -> TagGroups {
    let mut groups = TagGroups::new();
    for node in nodes {
        for tag in memberships(node) {
            groups
                .entry(tag.to_string())
                .or_default()
                .push(node.id.clone());
        }
    }
    groups
}

/// Membership and expansion state for every tag group.
#[must_use]
pub fn tag_clusters(groups: &TagGroups, expanded: &BTreeSet<String>) -> Vec<TagCluster> {
    groups
        .iter()
        .map(|(tag, members)| TagCluster {
            tag: tag.clone(),
            member_ids: members.clone(),
            expanded: expanded.contains(tag),
        })
        .collect()
}

/// One pseudo-node per collapsed tag. Expanded tags emit nothing.
#[must_use]
pub fn create_cluster_nodes(groups: &TagGroups, expanded: &BTreeSet<String>) -> Vec<ClusterNode> {
    tag_clusters(groups, expanded)
        .into_iter()
        .filter(|cluster| !cluster.expanded)
        .map(|cluster| ClusterNode {
            id: cluster_id(&cluster.tag),
            label: cluster_label(&cluster.tag),
            member_count: cluster.member_ids.len(),
            member_ids: cluster.member_ids,
            tag: cluster.tag,
        })
        .collect()
}

/// Keep nodes in `visible_ids` and edges whose both ends are visible.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.nodes.len(), visible = visible_ids.len()))]
pub fn filter(graph: &GraphData, visible_ids: &BTreeSet<String>) -> GraphData {
    let nodes = graph
        .nodes
        .iter()
        .filter(|node| visible_ids.contains(&node.id))
        .cloned()
        .collect();
    let edges = graph
        .edges
        .iter()
        .filter(|edge| visible_ids.contains(&edge.source) && visible_ids.contains(&edge.target))
        .cloned()
        .collect();
    GraphData { nodes, edges }
}

/// [`build_with_clustering_options`] with default build options.
#[must_use]
pub fn build_with_clustering(
    nodes: &[Node],
    links: &LinkIndex,
    clustering: &ClusteringConfig,
) -> ClusteredGraph {
    build_with_clustering_options(nodes, links, &BuildOptions::default(), clustering)
}

/// Build the graph, then hide every node whose tag groups are all collapsed.
///
/// With clustering disabled the result equals [`crate::build::build`] and has
/// no clusters.
#[must_use]
#[instrument(skip_all, fields(nodes = nodes.len(), enabled = clustering.enabled))]
pub fn build_with_clustering_options(
    nodes: &[Node],
    links: &LinkIndex,
    options: &BuildOptions<'_>,
    clustering: &ClusteringConfig,
) -> ClusteredGraph {
    let full = build_with_options(nodes, links, options);
    if !clustering.enabled {
        return ClusteredGraph {
            graph: full,
            clusters: Vec::new(),
        };
    }

    let expanded = &clustering.expanded;
    let groups = group_by_tag(nodes);
    let clusters = create_cluster_nodes(&groups, expanded);

    let visible: BTreeSet<String> = nodes
        .iter()
        .filter(|node| {
            memberships(node)
                .into_iter()
                .any(|tag| expanded.contains(tag))
        })
        .map(|node| node.id.clone())
        .collect();

    debug!(
        visible = visible.len(),
        hidden = nodes.len() - visible.len(),
        clusters = clusters.len(),
        "clustering applied"
    );

    ClusteredGraph {
        graph: filter(&full, &visible),
        clusters,
    }
}
