//! Proper layered graph: every edge joins adjacent ranks.
//!
//! Edges spanning more than one rank are split into chains through dummy
//! vertices, one per skipped rank. Dummies have no extent along the rank axis
//! and reserve an edge lane across it.

/// One vertex of a [`LayerGraph`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Index of the real node, `None` for a dummy.
    pub real: Option<usize>,
    pub rank: usize,
    /// Extent across ranks (width when ranks stack vertically).
    pub cross: f64,
    /// Extent along ranks.
    pub along: f64,
}

impl Vertex {
    pub const fn is_dummy(&self) -> bool {
        self.real.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerGraph {
    pub vertices: Vec<Vertex>,
    /// Neighbours on the previous rank.
    pub up: Vec<Vec<usize>>,
    /// Neighbours on the next rank.
    pub down: Vec<Vec<usize>>,
    pub rank_count: usize,
}

impl LayerGraph {
    /// Real vertices take indices `0..extents.len()`; dummies follow.
    ///
    /// `extents` holds `(cross, along)` per node and every edge must satisfy
    /// `ranks[source] < ranks[target]`.
    pub fn build(extents: &[(f64, f64)], ranks: &[usize], edges: &[(usize, usize)]) -> Self {
        let mut graph = Self {
            vertices: extents
                .iter()
                .zip(ranks)
                .enumerate()
                .map(|(index, (&(cross, along), &rank))| Vertex {
                    real: Some(index),
                    rank,
                    cross,
                    along,
                })
                .collect(),
            up: vec![Vec::new(); extents.len()],
            down: vec![Vec::new(); extents.len()],
            rank_count: ranks.iter().max().map_or(0, |&max| max + 1),
        };

        for &(source, target) in edges {
            let mut previous = source;
            for rank in ranks[source] + 1..ranks[target] {
                let dummy = graph.push_dummy(rank);
                graph.connect(previous, dummy);
                previous = dummy;
            }
            graph.connect(previous, target);
        }
        graph
    }

    fn push_dummy(&mut self, rank: usize) -> usize {
        self.vertices.push(Vertex {
            real: None,
            rank,
            cross: 0.0,
            along: 0.0,
        });
        self.up.push(Vec::new());
        self.down.push(Vec::new());
        self.vertices.len() - 1
    }

    fn connect(&mut self, upper: usize, lower: usize) {
        self.down[upper].push(lower);
        self.up[lower].push(upper);
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }
}
