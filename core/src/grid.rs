//! Lane grid geometry and occupancy.
//!
//! The grid is 7 columns by 3 rows. Ally units live in columns 0..=2, enemy
//! units in columns 4..=6, and column 3 is the midline. Each side numbers its
//! nine cells as slots: 1..=3 is the column touching the midline (top to
//! bottom), 4..=6 the next one out, 7..=9 the back column.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::state::QueuedMap;
use crate::token::Token;
use crate::types::{Cell, Side, Sides, Slot};

pub const GRID_COLS: i32 = 7;
pub const GRID_ROWS: i32 = 3;
pub const MIDLINE_COL: i32 = 3;
pub const SLOTS_PER_SIDE: Slot = 9;
/// Largest Manhattan distance between two cells
pub const MAX_DISTANCE: i32 = (GRID_COLS - 1) + (GRID_ROWS - 1);

/// Adjacency pattern used by summons to find placement cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NeighborPattern {
    /// Same column, rows above and below
    Vertical,
    /// Same row, columns in front and behind
    Row,
}

pub fn is_valid_slot(slot: Slot) -> bool {
    (1..=SLOTS_PER_SIDE).contains(&slot)
}

pub fn in_bounds(cell: Cell) -> bool {
    (0..GRID_COLS).contains(&cell.x) && (0..GRID_ROWS).contains(&cell.y)
}

/// Column rank away from the midline: 0 is front, 2 is back.
pub fn column_rank(slot: Slot) -> Option<u8> {
    is_valid_slot(slot).then(|| (slot - 1) / 3)
}

/// Row of a slot, 0..=2
pub fn slot_row(slot: Slot) -> Option<u8> {
    is_valid_slot(slot).then(|| (slot - 1) % 3)
}

fn slot_from_parts(rank: u8, row: u8) -> Slot {
    rank * 3 + row + 1
}

pub fn slot_to_cell(side: Side, slot: Slot) -> Option<Cell> {
    let rank = column_rank(slot)? as i32;
    let row = slot_row(slot)? as i32;
    let x = match side {
        Side::Ally => MIDLINE_COL - 1 - rank,
        Side::Enemy => MIDLINE_COL + 1 + rank,
    };
    Some(Cell::new(x, row))
}

pub fn side_of(cell: Cell) -> Option<Side> {
    if !in_bounds(cell) {
        return None;
    }
    if cell.x < MIDLINE_COL {
        Some(Side::Ally)
    } else if cell.x > MIDLINE_COL {
        Some(Side::Enemy)
    } else {
        None
    }
}

pub fn cell_to_slot(side: Side, cell: Cell) -> Option<Slot> {
    if side_of(cell) != Some(side) {
        return None;
    }
    let rank = match side {
        Side::Ally => MIDLINE_COL - 1 - cell.x,
        Side::Enemy => cell.x - MIDLINE_COL - 1,
    };
    Some(slot_from_parts(rank as u8, cell.y as u8))
}

pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// True if a live token stands on the cell or a queued entry of either side
/// targets it. Off-grid cells always count as reserved.
pub fn cell_reserved(tokens: &[Token], queued: &Sides<QueuedMap>, cell: Cell) -> bool {
    if !in_bounds(cell) {
        return true;
    }
    let occupied = tokens.iter().any(|t| t.alive && t.cell == cell);
    let pending = queued
        .ally
        .values()
        .chain(queued.enemy.values())
        .any(|q| q.cell == cell);
    occupied || pending
}

/// Slots sharing the column, one row above and below
pub fn vertical_neighbors(slot: Slot) -> Vec<Slot> {
    let (Some(rank), Some(row)) = (column_rank(slot), slot_row(slot)) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(2);
    if row > 0 {
        out.push(slot_from_parts(rank, row - 1));
    }
    if row < 2 {
        out.push(slot_from_parts(rank, row + 1));
    }
    out
}

/// Slots sharing the row in the adjacent columns. No wraparound.
pub fn row_neighbors(slot: Slot) -> Vec<Slot> {
    let (Some(rank), Some(row)) = (column_rank(slot), slot_row(slot)) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(2);
    if rank > 0 {
        out.push(slot_from_parts(rank - 1, row));
    }
    if rank < 2 {
        out.push(slot_from_parts(rank + 1, row));
    }
    out
}

pub fn neighbors(pattern: NeighborPattern, slot: Slot) -> Vec<Slot> {
    match pattern {
        NeighborPattern::Vertical => vertical_neighbors(slot),
        NeighborPattern::Row => row_neighbors(slot),
    }
}

/// Neighbor slots of `slot` on `side` whose cells are not reserved
pub fn free_neighbors(
    tokens: &[Token],
    queued: &Sides<QueuedMap>,
    side: Side,
    pattern: NeighborPattern,
    slot: Slot,
) -> Vec<Slot> {
    neighbors(pattern, slot)
        .into_iter()
        .filter(|s| {
            slot_to_cell(side, *s)
                .map(|cell| !cell_reserved(tokens, queued, cell))
                .unwrap_or(false)
        })
        .collect()
}
