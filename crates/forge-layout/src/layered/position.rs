//! Coordinate assignment.
//!
//! Ranks become bands along the rank axis, each as thick as its tallest
//! vertex and `level_spacing` apart. Across ranks, each vertex is pulled
//! toward the mean of its neighbours on the adjacent rank while keeping the
//! order chosen by crossing reduction and the minimum gap to its neighbours in
//! the rank. That fit is a weighted isotonic regression, solved exactly per
//! rank with pool-adjacent-violators.

use forge_core::AutoLayoutOptions;

use super::layers::LayerGraph;

const REFINE_PASSES: usize = 4;
/// Dummies pull harder so long edges run straight.
const DUMMY_WEIGHT: f64 = 2.0;
/// Vertices with nothing to align to give way first.
const FREE_WEIGHT: f64 = 0.5;

/// Leading-edge coordinates per vertex, normalized to start at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub cross: Vec<f64>,
    pub along: Vec<f64>,
    /// Extents cover real vertices only.
    pub cross_extent: f64,
    pub along_extent: f64,
}

pub fn place(graph: &LayerGraph, layers: &[Vec<usize>], options: &AutoLayoutOptions) -> Placement {
    let node_gap = options.node_spacing.max(0.0);
    let edge_gap = options.edge_spacing.max(0.0);
    let separation = |a: usize, b: usize| {
        let (va, vb) = (&graph.vertices[a], &graph.vertices[b]);
        let gap = if va.is_dummy() || vb.is_dummy() {
            edge_gap
        } else {
            node_gap
        };
        (va.cross + vb.cross) / 2.0 + gap
    };

    let mut center = vec![0.0; graph.len()];
    for layer in layers {
        let mut cursor = 0.0;
        for (slot, &v) in layer.iter().enumerate() {
            if slot > 0 {
                cursor += separation(layer[slot - 1], v);
            }
            center[v] = cursor;
        }
    }

    for _ in 0..REFINE_PASSES {
        for layer in layers.iter().skip(1) {
            align(graph, layer, &[&graph.up], &mut center, &separation);
        }
        for layer in layers.iter().rev().skip(1) {
            align(graph, layer, &[&graph.down], &mut center, &separation);
        }
    }
    for layer in layers {
        align(graph, layer, &[&graph.up, &graph.down], &mut center, &separation);
    }

    let real = || graph.vertices.iter().enumerate().filter(|(_, v)| !v.is_dummy());
    let shift = real()
        .map(|(i, v)| center[i] - v.cross / 2.0)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let cross: Vec<f64> = graph
        .vertices
        .iter()
        .zip(&center)
        .map(|(v, c)| c - v.cross / 2.0 - shift)
        .collect();
    let cross_extent = real()
        .map(|(i, v)| cross[i] + v.cross)
        .reduce(f64::max)
        .unwrap_or(0.0);

    let (along, along_extent) = place_ranks(graph, layers, options.level_spacing.max(0.0));

    Placement {
        cross,
        along,
        cross_extent,
        along_extent,
    }
}

fn place_ranks(graph: &LayerGraph, layers: &[Vec<usize>], level_gap: f64) -> (Vec<f64>, f64) {
    let thickness: Vec<f64> = layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| graph.vertices[v].along)
                .fold(0.0, f64::max)
        })
        .collect();

    let mut start = Vec::with_capacity(thickness.len());
    let mut cursor = 0.0;
    for (rank, &thick) in thickness.iter().enumerate() {
        if rank > 0 {
            cursor += level_gap;
        }
        start.push(cursor);
        cursor += thick;
    }

    let along = graph
        .vertices
        .iter()
        .map(|v| start[v.rank] + (thickness[v.rank] - v.along) / 2.0)
        .collect();
    (along, cursor)
}

/// Refit the centers of one rank against the given neighbour sides.
fn align(
    graph: &LayerGraph,
    layer: &[usize],
    sides: &[&Vec<Vec<usize>>],
    center: &mut [f64],
    separation: &impl Fn(usize, usize) -> f64,
) {
    let mut offsets = Vec::with_capacity(layer.len());
    let mut offset = 0.0;
    for (slot, &v) in layer.iter().enumerate() {
        if slot > 0 {
            offset += separation(layer[slot - 1], v);
        }
        offsets.push(offset);
    }

    let mut targets = Vec::with_capacity(layer.len());
    let mut weights = Vec::with_capacity(layer.len());
    for (&v, &offset) in layer.iter().zip(&offsets) {
        let (sum, count) = sides
            .iter()
            .flat_map(|side| side[v].iter())
            .fold((0.0, 0usize), |(sum, count), &u| (sum + center[u], count + 1));
        let desired = if count == 0 {
            center[v]
        } else {
            sum / count as f64
        };
        targets.push(desired - offset);
        weights.push(if graph.vertices[v].is_dummy() {
            DUMMY_WEIGHT
        } else if count == 0 {
            FREE_WEIGHT
        } else {
            1.0
        });
    }

    for ((&v, fitted), offset) in layer.iter().zip(isotonic(&targets, &weights)).zip(offsets) {
        center[v] = fitted + offset;
    }
}

/// Weighted least-squares non-decreasing fit (pool adjacent violators).
fn isotonic(targets: &[f64], weights: &[f64]) -> Vec<f64> {
    #[derive(Clone, Copy)]
    struct Block {
        mean: f64,
        weight: f64,
        len: usize,
    }

    let mut blocks: Vec<Block> = Vec::with_capacity(targets.len());
    for (&mean, &weight) in targets.iter().zip(weights) {
        let mut block = Block {
            mean,
            weight,
            len: 1,
        };
        while let Some(previous) = blocks.last().copied() {
            if previous.mean <= block.mean {
                break;
            }
            blocks.pop();
            let weight = previous.weight + block.weight;
            block = Block {
                mean: previous.mean.mul_add(previous.weight, block.mean * block.weight) / weight,
                weight,
                len: previous.len + block.len,
            };
        }
        blocks.push(block);
    }

    blocks
        .into_iter()
        .flat_map(|block| std::iter::repeat_n(block.mean, block.len))
        .collect()
}
