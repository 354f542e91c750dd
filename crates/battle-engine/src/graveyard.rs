//! Per-cell stacks of fallen units (distilled spec §3, §4.8). Queried by
//! resurrection spells and summarized into a raw dead count for the
//! necromancy handoff at battle end.

use std::collections::HashMap;

use battle_types::ids::{CellIndex, UnitKindId, UnitUid};
use battle_types::unit::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallenUnit {
    pub uid: UnitUid,
    pub kind: UnitKindId,
    pub side: Side,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graveyard {
    stacks: HashMap<u8, Vec<FallenUnit>>,
}

impl Graveyard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bury(&mut self, cell: CellIndex, fallen: FallenUnit) {
        self.stacks.entry(cell.get()).or_default().push(fallen);
    }

    pub fn at(&self, cell: CellIndex) -> &[FallenUnit] {
        self.stacks.get(&cell.get()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_fallen(&self, cell: CellIndex) -> Option<&FallenUnit> {
        self.at(cell).last()
    }

    pub fn last_fallen_of_side(&self, cell: CellIndex, side: Side) -> Option<&FallenUnit> {
        self.at(cell).iter().rev().find(|f| f.side == side)
    }

    /// The stack a resurrection spell cast by `caster_side` may target at
    /// `cell`: the most recently buried stack belonging to that side
    /// (distilled spec §4.6, §4.8).
    pub fn last_resurrectable(&self, cell: CellIndex, caster_side: Side) -> Option<&FallenUnit> {
        self.last_fallen_of_side(cell, caster_side)
    }

    pub fn remove_last_resurrectable(&mut self, cell: CellIndex, caster_side: Side) -> Option<FallenUnit> {
        let stack = self.stacks.get_mut(&cell.get())?;
        let pos = stack.iter().rposition(|f| f.side == caster_side)?;
        Some(stack.remove(pos))
    }

    pub fn total_dead_of_side(&self, side: Side) -> u32 {
        self.stacks
            .values()
            .flat_map(|stack| stack.iter())
            .filter(|f| f.side == side)
            .map(|f| f.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_unit_buried_under_both_cells_is_queryable_independently() {
        let mut grave = Graveyard::new();
        let fallen = FallenUnit {
            uid: UnitUid(1),
            kind: UnitKindId(0),
            side: Side::Attacker,
            count: 5,
        };
        grave.bury(CellIndex(10), fallen);
        grave.bury(CellIndex(11), fallen);
        assert_eq!(grave.last_fallen(CellIndex(10)).unwrap().uid, UnitUid(1));
        assert_eq!(grave.last_fallen(CellIndex(11)).unwrap().uid, UnitUid(1));
    }

    #[test]
    fn last_resurrectable_only_matches_caster_side() {
        let mut grave = Graveyard::new();
        grave.bury(
            CellIndex(5),
            FallenUnit {
                uid: UnitUid(1),
                kind: UnitKindId(0),
                side: Side::Attacker,
                count: 3,
            },
        );
        grave.bury(
            CellIndex(5),
            FallenUnit {
                uid: UnitUid(2),
                kind: UnitKindId(0),
                side: Side::Defender,
                count: 4,
            },
        );
        assert_eq!(
            grave.last_resurrectable(CellIndex(5), Side::Attacker).unwrap().uid,
            UnitUid(1)
        );
    }

    #[test]
    fn total_dead_sums_across_cells() {
        let mut grave = Graveyard::new();
        grave.bury(
            CellIndex(1),
            FallenUnit {
                uid: UnitUid(1),
                kind: UnitKindId(0),
                side: Side::Defender,
                count: 3,
            },
        );
        grave.bury(
            CellIndex(2),
            FallenUnit {
                uid: UnitUid(2),
                kind: UnitKindId(0),
                side: Side::Defender,
                count: 7,
            },
        );
        assert_eq!(grave.total_dead_of_side(Side::Defender), 10);
    }
}
