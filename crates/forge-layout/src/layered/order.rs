//! Crossing reduction.
//!
//! Layers start in depth-first order from the top rank, then alternate
//! downward and upward barycenter sweeps. Vertices with no neighbour on the
//! fixed side keep their slot. The ordering with the fewest crossings seen is
//! kept, so extra sweeps never make the result worse.

use super::layers::LayerGraph;

/// Order the vertices of each rank.
pub fn order_layers(graph: &LayerGraph, sweeps: usize) -> Vec<Vec<usize>> {
    let mut layers = initial_order(graph);
    let mut position = positions(graph, &layers);

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(graph, &layers);

    for sweep in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        if sweep % 2 == 0 {
            for rank in 1..layers.len() {
                reorder(&mut layers[rank], &graph.up, &mut position);
            }
        } else {
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                reorder(&mut layers[rank], &graph.down, &mut position);
            }
        }

        let crossings = count_crossings(graph, &layers);
        if crossings < best_crossings {
            best_crossings = crossings;
            best.clone_from(&layers);
        }
    }

    best
}

/// Depth-first from each unvisited vertex, ranks top to bottom, so connected
/// chains start out adjacent.
fn initial_order(graph: &LayerGraph) -> Vec<Vec<usize>> {
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); graph.rank_count];
    let mut starts: Vec<usize> = (0..graph.len()).collect();
    starts.sort_by_key(|&v| graph.vertices[v].rank);

    let mut visited = vec![false; graph.len()];
    let mut stack = Vec::new();
    for start in starts {
        stack.push(start);
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            layers[graph.vertices[v].rank].push(v);
            stack.extend(graph.down[v].iter().rev());
        }
    }
    layers
}

fn positions(graph: &LayerGraph, layers: &[Vec<usize>]) -> Vec<usize> {
    let mut position = vec![0; graph.len()];
    for layer in layers {
        for (slot, &v) in layer.iter().enumerate() {
            position[v] = slot;
        }
    }
    position
}

/// Sort `layer` by the mean position of each vertex's `neighbours`.
fn reorder(layer: &mut [usize], neighbours: &[Vec<usize>], position: &mut [usize]) {
    let barycenters: Vec<Option<f64>> = layer
        .iter()
        .map(|&v| {
            let adjacent = &neighbours[v];
            (!adjacent.is_empty()).then(|| {
                adjacent.iter().map(|&u| position[u] as f64).sum::<f64>() / adjacent.len() as f64
            })
        })
        .collect();

    let mut anchored: Vec<(f64, usize, usize)> = layer
        .iter()
        .zip(&barycenters)
        .enumerate()
        .filter_map(|(slot, (&v, barycenter))| barycenter.map(|b| (b, slot, v)))
        .collect();
    anchored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut sorted = anchored.into_iter().map(|(_, _, v)| v);
    for (vertex, barycenter) in layer.iter_mut().zip(&barycenters) {
        if barycenter.is_some() {
            if let Some(v) = sorted.next() {
                *vertex = v;
            }
        }
    }

    for (slot, &v) in layer.iter().enumerate() {
        position[v] = slot;
    }
}

/// Total crossings between every pair of adjacent ranks.
pub fn count_crossings(graph: &LayerGraph, layers: &[Vec<usize>]) -> usize {
    let position = positions(graph, layers);
    layers
        .windows(2)
        .map(|pair| bilayer_crossings(graph, &pair[0], pair[1].len(), &position))
        .sum()
}

/// Accumulator-tree count (Barth, Jünger, Mutzel) of crossings between
/// `north` and the rank below it.
fn bilayer_crossings(
    graph: &LayerGraph,
    north: &[usize],
    south_len: usize,
    position: &[usize],
) -> usize {
    if south_len == 0 {
        return 0;
    }

    let mut south_sequence = Vec::new();
    for &v in north {
        let mut targets: Vec<usize> = graph.down[v].iter().map(|&w| position[w]).collect();
        targets.sort_unstable();
        south_sequence.extend(targets);
    }

    let first_leaf = south_len.next_power_of_two() - 1;
    let mut tree = vec![0usize; 2 * first_leaf + 1];
    let mut crossings = 0;
    for target in south_sequence {
        let mut index = target + first_leaf;
        tree[index] += 1;
        while index > 0 {
            if index % 2 == 1 {
                crossings += tree[index + 1];
            }
            index = (index - 1) / 2;
            tree[index] += 1;
        }
    }
    crossings
}
