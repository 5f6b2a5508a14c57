//! Default positions for nodes that have never been placed.

use forge_core::config::GridConfig;

use crate::types::Position;

/// Grid slot for the node at `index` in iteration order.
///
/// Slots fill row by row, `per_row` cells wide. Distinct indices always map to
/// distinct, non-overlapping cells.
#[must_use]
pub fn grid_position(index: usize, grid: &GridConfig) -> Position {
    let per_row = grid.per_row.max(1);
    let column = index % per_row;
    let row = index / per_row;
    Position::new(
        column as f64 * grid.cell_width,
        row as f64 * grid.cell_height,
    )
}
