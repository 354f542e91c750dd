//! Mutable board state: per-cell occupancy and siege-structure condition.
//! `battle_types::board` is the pure geometry; this module is the
//! arena-owned value store keyed by `CellIndex`/`UnitUid` that distilled
//! spec §9's "Pointer graphs" redesign note asks for — units do not own
//! cells, cells do not own units, only `Option<UnitUid>` back-references.

use std::collections::HashMap;

use battle_types::board::{self, BOARD_SIZE, GATES_INDEX};
use battle_types::ids::CellIndex;
use battle_types::unit::Unit;
use serde::{Deserialize, Serialize};

/// What a cell's `object` slot holds (distilled spec §3's small numeric
/// condition codes, given names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellObject {
    Empty,
    Obstacle,
    /// Wall segment condition counter: 3/2 (fortified) or 2..0.
    Wall(u8),
    /// Archer/central/bridge-flank tower condition: 2 (intact) → 1 (destroyed-top).
    Tower(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BridgeState {
    pub destroyed: bool,
    pub down: bool,
}

impl BridgeState {
    pub fn intact() -> Self {
        Self {
            destroyed: false,
            down: false,
        }
    }

    /// A destroyed bridge is permanently down and its cell permanently
    /// moat-like (distilled spec §4.7).
    pub fn set_destroyed(&mut self) {
        self.destroyed = true;
        self.down = true;
    }

    pub fn is_passable(&self) -> bool {
        !self.down
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    occupants: Vec<Option<battle_types::ids::UnitUid>>,
    objects: Vec<CellObject>,
    pub bridge: BridgeState,
    pub has_castle: bool,
    units: HashMap<battle_types::ids::UnitUid, Unit>,
}

impl Board {
    pub fn new(has_castle: bool) -> Self {
        Self {
            occupants: vec![None; BOARD_SIZE as usize],
            objects: vec![CellObject::Empty; BOARD_SIZE as usize],
            bridge: BridgeState::intact(),
            has_castle,
            units: HashMap::new(),
        }
    }

    pub fn occupant_at(&self, cell: CellIndex) -> Option<battle_types::ids::UnitUid> {
        self.occupants[cell.get() as usize]
    }

    pub fn object_at(&self, cell: CellIndex) -> CellObject {
        self.objects[cell.get() as usize]
    }

    pub fn set_object(&mut self, cell: CellIndex, object: CellObject) {
        self.objects[cell.get() as usize] = object;
    }

    /// True iff the moat predicate holds for this cell *and* it is
    /// currently impassable-as-moat: the gates cell only counts while the
    /// bridge is not passable (distilled spec §4.1).
    pub fn is_effective_moat(&self, cell: CellIndex) -> bool {
        if cell == GATES_INDEX {
            return !self.bridge.is_passable();
        }
        board::is_moat_index(cell)
    }

    pub fn is_blocked(&self, cell: CellIndex, ignoring: Option<battle_types::ids::UnitUid>) -> bool {
        match self.occupant_at(cell) {
            Some(uid) => Some(uid) != ignoring,
            None => false,
        }
    }

    pub fn unit(&self, uid: battle_types::ids::UnitUid) -> Option<&Unit> {
        self.units.get(&uid)
    }

    pub fn unit_mut(&mut self, uid: battle_types::ids::UnitUid) -> Option<&mut Unit> {
        self.units.get_mut(&uid)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    pub fn alive_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.is_alive())
    }

    /// Place a freshly constructed unit on the board, wiring its footprint
    /// into `occupants`.
    pub fn insert_unit(&mut self, unit: Unit) {
        for cell in unit.position.cells() {
            self.occupants[cell.get() as usize] = Some(unit.uid);
        }
        self.units.insert(unit.uid, unit);
    }

    pub fn remove_unit(&mut self, uid: battle_types::ids::UnitUid) -> Option<Unit> {
        if let Some(unit) = self.units.get(&uid) {
            for cell in unit.position.cells() {
                if self.occupants[cell.get() as usize] == Some(uid) {
                    self.occupants[cell.get() as usize] = None;
                }
            }
        }
        self.units.remove(&uid)
    }

    /// Re-home a unit's footprint after it moves; caller has already
    /// validated the destination is free.
    pub fn relocate_unit(&mut self, uid: battle_types::ids::UnitUid, new_position: battle_types::position::Position) {
        if let Some(unit) = self.units.get(&uid) {
            for cell in unit.position.cells() {
                if self.occupants[cell.get() as usize] == Some(uid) {
                    self.occupants[cell.get() as usize] = None;
                }
            }
        }
        for cell in new_position.cells() {
            self.occupants[cell.get() as usize] = Some(uid);
        }
        if let Some(unit) = self.units.get_mut(&uid) {
            unit.position = new_position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_types::board::Direction;
    use battle_types::position::Position;
    use battle_types::unit::{Side, UnitAbilities, UnitModes, UnitStats};

    fn dummy_unit(uid: u32, cell: u8) -> Unit {
        Unit {
            uid: battle_types::ids::UnitUid(uid),
            kind: battle_types::ids::UnitKindId(0),
            army_color: Side::Attacker,
            current_color: Side::Attacker,
            stats: UnitStats {
                attack: 1,
                defense: 1,
                damage_min: 1,
                damage_max: 1,
                hit_points_per_fighter: 1,
                speed: 1,
                max_shots: 0,
                abilities: UnitAbilities::empty(),
                affinity: None,
                weakness: None,
                built_in_spell: None,
                magic_resistance_percent: 0,
                cost_per_fighter: 1,
            },
            count: 1,
            initial_count: 1,
            max_count: 1,
            hit_points: 1,
            dead_count: 0,
            shots_left: 0,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(cell)),
            facing: Direction::Right,
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        }
    }

    #[test]
    fn insert_and_remove_clears_occupancy() {
        let mut board = Board::new(false);
        board.insert_unit(dummy_unit(1, 10));
        assert_eq!(board.occupant_at(CellIndex(10)), Some(battle_types::ids::UnitUid(1)));
        board.remove_unit(battle_types::ids::UnitUid(1));
        assert_eq!(board.occupant_at(CellIndex(10)), None);
    }

    #[test]
    fn gates_counts_as_moat_only_while_impassable() {
        let mut board = Board::new(true);
        assert!(!board.is_effective_moat(GATES_INDEX));
        board.bridge.set_destroyed();
        assert!(board.is_effective_moat(GATES_INDEX));
    }
}
