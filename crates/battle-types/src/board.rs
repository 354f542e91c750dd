//! Board geometry — an 11x9 hex grid with row-parity-aware neighbor
//! offsets, castle/moat/wall topology as static index predicates.
//!
//! Values and formulas here are fixed by the battle arena's fixed board
//! size; there is exactly one board shape, so cell geometry is free
//! functions over `CellIndex` rather than a mutable `Board` aggregate
//! (the mutable occupancy/terrain state lives in `battle-engine::board`).

use serde::{Deserialize, Serialize};

use crate::ids::CellIndex;

pub const BOARD_WIDTH: u8 = 11;
pub const BOARD_HEIGHT: u8 = 9;
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_HEIGHT;

/// Gate cell; counts as moat only while the bridge is not passable.
pub const GATES_INDEX: CellIndex = CellIndex(49);

/// Fixed moat cell set (distilled spec §4.1).
pub const MOAT_INDEXES: [u8; 9] = [7, 18, 28, 39, 49, 61, 72, 84, 95];

/// Movement-point penalty for entering a moat cell.
pub const MOAT_PENALTY: u32 = u16::MAX as u32;

/// Direction enum — six hex neighbors plus CENTER (distilled spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    TopLeft,
    TopRight,
    Left,
    Right,
    BottomLeft,
    BottomRight,
    Center,
}

impl Direction {
    pub const ALL_NEIGHBORS: [Direction; 6] = [
        Direction::TopLeft,
        Direction::TopRight,
        Direction::Left,
        Direction::Right,
        Direction::BottomLeft,
        Direction::BottomRight,
    ];

    /// The direction one would face when looking back the way they came.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::TopLeft => Direction::BottomRight,
            Direction::TopRight => Direction::BottomLeft,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::BottomLeft => Direction::TopRight,
            Direction::BottomRight => Direction::TopLeft,
            Direction::Center => Direction::Center,
        }
    }
}

pub const fn is_valid_index(index: i32) -> bool {
    index >= 0 && index < BOARD_SIZE as i32
}

fn row_of(index: u8) -> u8 {
    index / BOARD_WIDTH
}

/// Neighbor in the given direction, or `None` if it would fall off the
/// board (or would wrap across a row edge).
///
/// Offsets are row-parity-aware: an odd row's TOP_LEFT/BOTTOM_LEFT shift
/// one further left than an even row's (distilled spec §4.1).
pub fn neighbor(index: CellIndex, dir: Direction) -> Option<CellIndex> {
    let idx = index.get() as i32;
    if !is_valid_index(idx) {
        return None;
    }
    let width = BOARD_WIDTH as i32;
    let odd_row = (idx / width) % 2 == 1;

    let raw = match dir {
        Direction::Center => idx,
        Direction::TopLeft => idx - if odd_row { width + 1 } else { width },
        Direction::TopRight => idx - if odd_row { width } else { width - 1 },
        Direction::Left => idx - 1,
        Direction::Right => idx + 1,
        Direction::BottomLeft => idx + if odd_row { width - 1 } else { width },
        Direction::BottomRight => idx + if odd_row { width } else { width + 1 },
    };

    if !is_valid_index(raw) {
        return None;
    }

    // Reject wraparound: LEFT/RIGHT and the diagonal moves must not cross
    // from one row edge to the far edge of the adjacent row.
    let from_row = row_of(index.get());
    let from_col = index.get() % BOARD_WIDTH;
    let to_row = row_of(raw as u8);
    let to_col = (raw as u8) % BOARD_WIDTH;

    let row_delta = match dir {
        Direction::Center => 0,
        Direction::Left | Direction::Right => 0,
        Direction::TopLeft | Direction::TopRight => -1,
        Direction::BottomLeft | Direction::BottomRight => 1,
    };
    if to_row as i32 != from_row as i32 + row_delta {
        return None;
    }
    let col_ok = match dir {
        Direction::Left => from_col > 0,
        Direction::Right => from_col + 1 < BOARD_WIDTH,
        _ => {
            let col_delta = to_col as i32 - from_col as i32;
            col_delta.abs() <= 1
        }
    };
    if !col_ok {
        return None;
    }

    Some(CellIndex(raw as u8))
}

/// All valid neighbors of a cell, in `ALL_NEIGHBORS` order.
pub fn neighbors(index: CellIndex) -> arrayvec::ArrayVec<CellIndex, 6> {
    let mut out = arrayvec::ArrayVec::new();
    for dir in Direction::ALL_NEIGHBORS {
        if let Some(n) = neighbor(index, dir) {
            out.push(n);
        }
    }
    out
}

pub fn are_adjacent(a: CellIndex, b: CellIndex) -> bool {
    neighbors(a).contains(&b)
}

/// Hex distance between two cells.
///
/// Converts row-major coordinates to an axial-like pair and takes the
/// Chebyshev distance when both deltas share sign, else Manhattan — the
/// same two-branch formula the arena's original board geometry used.
pub fn distance(a: CellIndex, b: CellIndex) -> u32 {
    let (x1, y1) = (
        (a.get() % BOARD_WIDTH) as i32,
        (a.get() / BOARD_WIDTH) as i32,
    );
    let (x2, y2) = (
        (b.get() % BOARD_WIDTH) as i32,
        (b.get() / BOARD_WIDTH) as i32,
    );

    let du = y2 - y1;
    let dv = (x2 + y2 / 2) - (x1 + y1 / 2);

    if (du >= 0 && dv >= 0) || (du < 0 && dv < 0) {
        du.unsigned_abs().max(dv.unsigned_abs())
    } else {
        du.unsigned_abs() + dv.unsigned_abs()
    }
}

pub fn is_moat_index(index: CellIndex) -> bool {
    MOAT_INDEXES.contains(&index.get())
}

/// Castle-interior cells (distilled spec §3, `isCastleIndex`).
pub fn is_castle_index(index: CellIndex) -> bool {
    let i = index.get();
    matches!(i, 8..=10)
        || (20..=21).contains(&i)
        || (29..=32).contains(&i)
        || (41..=43).contains(&i)
        || (51..=54).contains(&i)
        || (63..=65).contains(&i)
        || (73..=76).contains(&i)
        || (86..=87).contains(&i)
        || (96..=98).contains(&i)
}

/// Cells outside the castle walls (attacker's side of a siege map).
pub fn is_outside_walls_index(index: CellIndex) -> bool {
    let i = index.get();
    i <= 8
        || (11..=19).contains(&i)
        || (22..=29).contains(&i)
        || (33..=40).contains(&i)
        || (44..=50).contains(&i)
        || (55..=62).contains(&i)
        || (66..=73).contains(&i)
        || (77..=85).contains(&i)
        || (88..=96).contains(&i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_even_row() {
        // index 23: row 2 (even), col 1
        let n = neighbor(CellIndex(23), Direction::Right).unwrap();
        assert_eq!(n, CellIndex(24));
    }

    #[test]
    fn distance_is_symmetric() {
        for a in 0..BOARD_SIZE {
            for b in 0..BOARD_SIZE {
                assert_eq!(
                    distance(CellIndex(a), CellIndex(b)),
                    distance(CellIndex(b), CellIndex(a))
                );
            }
        }
    }

    #[test]
    fn distance_one_iff_neighbor() {
        let center = CellIndex(50);
        for i in 0..BOARD_SIZE {
            let cell = CellIndex(i);
            if cell == center {
                continue;
            }
            let is_neighbor = are_adjacent(center, cell);
            let dist1 = distance(center, cell) == 1;
            assert_eq!(is_neighbor, dist1, "cell {i}");
        }
    }

    #[test]
    fn moat_contains_gates() {
        assert!(is_moat_index(GATES_INDEX));
    }

    #[test]
    fn no_row_wraparound() {
        // col 0 has no LEFT neighbor, col 10 has no RIGHT neighbor
        for row in 0..BOARD_HEIGHT {
            let left_edge = CellIndex(row * BOARD_WIDTH);
            let right_edge = CellIndex(row * BOARD_WIDTH + BOARD_WIDTH - 1);
            assert!(neighbor(left_edge, Direction::Left).is_none());
            assert!(neighbor(right_edge, Direction::Right).is_none());
        }
    }
}
