//! Morale (distilled spec §4.5, §4.4): good morale grants a unit a second
//! action this turn, bad morale forces it to skip. The roll itself is the
//! host's concern (fed in as `act_again`); this command only applies the
//! resulting state change.

use battle_types::error::{CommandError, MoveError};
use battle_types::ids::UnitUid;
use battle_types::result::CommandOutcome;
use battle_types::unit::UnitModes;

use crate::arena::Arena;

pub fn execute(arena: &mut Arena, unit: UnitUid, act_again: bool) -> Result<CommandOutcome, CommandError> {
    let u = arena
        .board
        .unit_mut(unit)
        .ok_or(MoveError::UnknownUnit(unit))
        .map_err(CommandError::Move)?;

    if act_again {
        u.set_mode(UnitModes::MORALE_GOOD, None);
        u.clear_mode(UnitModes::MOVED);
    } else {
        u.set_mode(UnitModes::MORALE_BAD, None);
        u.set_mode(UnitModes::MOVED, None);
    }

    Ok(CommandOutcome::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaConfig, ControlMode};
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::board::Direction;
    use battle_types::ids::{BattleId, CellIndex, UnitKindId};
    use battle_types::position::Position;
    use battle_types::unit::{Side, Unit, UnitAbilities, UnitStats};

    fn sample_arena_with_unit() -> (Arena, UnitUid) {
        let mut arena = Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: false,
                fortified: false,
                attacker_control: ControlMode::Human,
                defender_control: ControlMode::Ai,
                seed: 2,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        );
        let unit = Unit {
            uid: UnitUid(1),
            kind: UnitKindId(0),
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
            position: Position::narrow(CellIndex(10)),
            facing: Direction::Right,
            modes: UnitModes::MOVED,
            durations: Vec::new(),
            linked_unit: None,
        };
        arena.board.insert_unit(unit);
        (arena, UnitUid(1))
    }

    #[test]
    fn good_morale_clears_moved_flag() {
        let (mut arena, uid) = sample_arena_with_unit();
        execute(&mut arena, uid, true).unwrap();
        let u = arena.board.unit(uid).unwrap();
        assert!(!u.modes.contains(UnitModes::MOVED));
        assert!(u.modes.contains(UnitModes::MORALE_GOOD));
    }

    #[test]
    fn bad_morale_forces_moved() {
        let (mut arena, uid) = sample_arena_with_unit();
        execute(&mut arena, uid, false).unwrap();
        let u = arena.board.unit(uid).unwrap();
        assert!(u.modes.contains(UnitModes::MOVED));
        assert!(u.modes.contains(UnitModes::MORALE_BAD));
    }
}
