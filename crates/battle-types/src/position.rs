//! `Position` — the cell(s) a unit occupies.
//!
//! Narrow units occupy a single cell (`tail == None`). Wide units occupy
//! two adjacent cells; `reflected` says which side the tail sits on
//! relative to the unit's facing. The actual placement logic
//! (`Position::for_unit`, reachability) lives in `battle-engine` since it
//! needs board occupancy and the pathfinder — this type is the pure value.

use serde::{Deserialize, Serialize};

use crate::board;
use crate::ids::CellIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub head: CellIndex,
    pub tail: Option<CellIndex>,
}

impl Position {
    pub const fn narrow(head: CellIndex) -> Self {
        Self { head, tail: None }
    }

    pub const fn wide(head: CellIndex, tail: CellIndex) -> Self {
        Self {
            head,
            tail: Some(tail),
        }
    }

    pub fn is_wide(&self) -> bool {
        self.tail.is_some()
    }

    /// Every cell this position occupies, head first.
    pub fn cells(&self) -> arrayvec::ArrayVec<CellIndex, 2> {
        let mut out = arrayvec::ArrayVec::new();
        out.push(self.head);
        if let Some(t) = self.tail {
            out.push(t);
        }
        out
    }

    pub fn contains(&self, cell: CellIndex) -> bool {
        self.head == cell || self.tail == Some(cell)
    }

    /// A key suitable for use in sorted maps: `(head, tail)` with `tail`
    /// absent sorting before any present tail at the same head.
    pub fn sort_key(&self) -> (u8, i16) {
        (self.head.get(), self.tail.map_or(-1, |t| t.get() as i16))
    }

    /// True iff head/tail (when present) are valid and mutually adjacent —
    /// the structural half of the position invariant (distilled spec §3).
    pub fn is_structurally_valid(&self) -> bool {
        match self.tail {
            None => true,
            Some(tail) => board::are_adjacent(self.head, tail),
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_position_has_no_tail() {
        let p = Position::narrow(CellIndex(10));
        assert!(!p.is_wide());
        assert_eq!(p.cells().len(), 1);
    }

    #[test]
    fn wide_position_structural_validity() {
        let valid = Position::wide(CellIndex(45), CellIndex(44));
        assert!(valid.is_structurally_valid());

        let invalid = Position::wide(CellIndex(45), CellIndex(0));
        assert!(!invalid.is_structurally_valid());
    }

    #[test]
    fn ordering_is_total_by_head_then_tail() {
        let a = Position::narrow(CellIndex(5));
        let b = Position::wide(CellIndex(5), CellIndex(4));
        let c = Position::narrow(CellIndex(6));
        assert!(a < b);
        assert!(b < c);
    }
}
