//! One frame: the roots of a request, or the children of a single container.
//!
//! Each connected component runs the layered pipeline on its own. Components
//! are then packed side by side across the rank axis, in order of their first
//! member, `node_spacing` apart.

use std::collections::HashSet;

use forge_core::AutoLayoutOptions;
use petgraph::unionfind::UnionFind;
use tracing::trace;

use super::acyclic::make_acyclic;
use super::layers::LayerGraph;
use super::order::order_layers;
use super::position::{Placement, place};
use super::rank::assign_ranks;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameLayout {
    /// Top-left corner per item, relative to the frame origin.
    pub positions: Vec<(f64, f64)>,
    pub width: f64,
    pub height: f64,
}

/// Place `sizes` (`(width, height)` per item) ordered by `edges`.
///
/// Self loops and repeated edges are ignored.
pub fn layout_frame(
    sizes: &[(f64, f64)],
    edges: &[(usize, usize)],
    options: &AutoLayoutOptions,
    sweeps: usize,
) -> FrameLayout {
    if sizes.is_empty() {
        return FrameLayout::default();
    }

    let horizontal = options.direction.is_horizontal();
    // (cross, along) per item.
    let extents: Vec<(f64, f64)> = sizes
        .iter()
        .map(|&(w, h)| if horizontal { (h, w) } else { (w, h) })
        .collect();

    let edges = distinct(edges.iter().copied().filter(|(s, t)| s != t));
    let (groups, group_edges) = components(sizes.len(), &edges);

    let placements: Vec<Placement> = groups
        .iter()
        .zip(&group_edges)
        .map(|(members, edges)| {
            let local_extents: Vec<(f64, f64)> = members.iter().map(|&m| extents[m]).collect();
            let acyclic = make_acyclic(members.len(), edges);
            if acyclic.reversed > 0 {
                trace!(reversed = acyclic.reversed, "cycle edges reversed");
            }
            let oriented = distinct(acyclic.edges.into_iter());
            let ranks = assign_ranks(members.len(), &oriented, options.algorithm);
            let graph = LayerGraph::build(&local_extents, &ranks, &oriented);
            let layers = order_layers(&graph, sweeps);
            place(&graph, &layers, options)
        })
        .collect();

    let along_extent = placements
        .iter()
        .map(|p| p.along_extent)
        .fold(0.0, f64::max);
    let gap = options.node_spacing.max(0.0);

    let mut positions = vec![(0.0, 0.0); sizes.len()];
    let mut offset = 0.0;
    for (index, (members, placement)) in groups.iter().zip(&placements).enumerate() {
        if index > 0 {
            offset += gap;
        }
        for (local, &node) in members.iter().enumerate() {
            let cross = offset + placement.cross[local];
            let mut along = placement.along[local];
            if options.direction.is_reversed() {
                along = along_extent - along - extents[node].1;
            }
            positions[node] = if horizontal { (along, cross) } else { (cross, along) };
        }
        offset += placement.cross_extent;
    }

    let (width, height) = if horizontal {
        (along_extent, offset)
    } else {
        (offset, along_extent)
    };
    FrameLayout {
        positions,
        width,
        height,
    }
}

fn distinct(edges: impl Iterator<Item = (usize, usize)>) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    edges.filter(|&edge| seen.insert(edge)).collect()
}

/// Member lists and component-local edges, components ordered by first
/// member.
fn components(
    node_count: usize,
    edges: &[(usize, usize)],
) -> (Vec<Vec<usize>>, Vec<Vec<(usize, usize)>>) {
    let mut sets = UnionFind::new(node_count);
    for &(source, target) in edges {
        sets.union(source, target);
    }
    let labels = sets.into_labeling();

    let mut group_of_label: Vec<Option<usize>> = vec![None; node_count];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut local = vec![0; node_count];
    for (node, &label) in labels.iter().enumerate() {
        let group = *group_of_label[label].get_or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        local[node] = groups[group].len();
        groups[group].push(node);
    }

    let mut group_edges = vec![Vec::new(); groups.len()];
    for &(source, target) in edges {
        if let Some(group) = group_of_label[labels[source]] {
            group_edges[group].push((local[source], local[target]));
        }
    }
    (groups, group_edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::Direction;

    const BOX: (f64, f64) = (200.0, 60.0);

    fn frame(count: usize, edges: &[(usize, usize)], direction: Direction) -> FrameLayout {
        let options = AutoLayoutOptions::default().with_direction(direction);
        layout_frame(&vec![BOX; count], edges, &options, 8)
    }

    #[test]
    fn empty_frame_has_no_extent() {
        assert_eq!(frame(0, &[], Direction::Down), FrameLayout::default());
    }

    #[test]
    fn components_pack_across_ranks() {
        let layout = frame(2, &[], Direction::Down);
        assert_eq!(layout.positions, vec![(0.0, 0.0), (250.0, 0.0)]);
        assert_eq!((layout.width, layout.height), (450.0, 60.0));
    }

    #[test]
    fn direction_orients_the_chain() {
        let down = frame(2, &[(0, 1)], Direction::Down);
        assert!(down.positions[0].1 < down.positions[1].1);

        let up = frame(2, &[(0, 1)], Direction::Up);
        assert!(up.positions[0].1 > up.positions[1].1);
        assert_eq!(up.positions[0], (0.0, 140.0));

        let right = frame(2, &[(0, 1)], Direction::Right);
        assert!(right.positions[0].0 < right.positions[1].0);
        assert_eq!((right.width, right.height), (480.0, 60.0));

        let left = frame(2, &[(0, 1)], Direction::Left);
        assert!(left.positions[0].0 > left.positions[1].0);
    }

    #[test]
    fn loops_and_repeats_are_ignored() {
        let plain = frame(2, &[(0, 1)], Direction::Down);
        let noisy = frame(2, &[(0, 0), (0, 1), (0, 1), (1, 1)], Direction::Down);
        assert_eq!(plain, noisy);
    }

    #[test]
    fn two_cycle_still_separates_ranks() {
        let layout = frame(2, &[(0, 1), (1, 0)], Direction::Down);
        assert!(layout.positions[0].1 < layout.positions[1].1);
    }

    #[test]
    fn components_are_grouped_by_first_member() {
        let (groups, edges) = components(4, &[(2, 0), (1, 3)]);
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(edges, vec![vec![(1, 0)], vec![(0, 1)]]);
    }
}
