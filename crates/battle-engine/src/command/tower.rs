//! Defender's battlement towers (distilled spec §4.5, §4.7): fire
//! automatically at the attacker's most threatening unit. Recorded as a
//! `Command` like any other action so the log/replay stream captures it,
//! even though no player chooses the target.
//!
//! The distilled spec names the towers but does not give them unit-style
//! attack/defense stats, only a condition counter; a small fixed damage
//! roll stands in for that, grounded in fheroes2's own flat tower-damage
//! behavior.

use battle_types::error::CommandError;
use battle_types::ids::UnitUid;
use battle_types::result::CommandOutcome;
use battle_types::unit::Side;

use crate::arena::Arena;
use crate::damage::attack_defense_multiplier;
use crate::siege::DefenseStructure;

const TOWER_BASE_ATTACK: i32 = 5;
const TOWER_DAMAGE_MIN: u32 = 3;
const TOWER_DAMAGE_MAX: u32 = 5;

pub fn execute(arena: &mut Arena, tower_index: u8, target: UnitUid) -> Result<CommandOutcome, CommandError> {
    if arena.towers_fired_this_turn {
        return Err(CommandError::NotThisUnitsTurn(target));
    }
    let is_tower_cell = arena.structure_cells.iter().any(|&(s, _)| {
        matches!(
            s,
            DefenseStructure::ArcherTower(i) if i == tower_index
        ) || (tower_index == 255 && s == DefenseStructure::CentralTower)
    });
    if !is_tower_cell {
        return Err(CommandError::NotThisUnitsTurn(target));
    }

    let Some(defender) = arena.board.unit(target) else {
        return Err(CommandError::NotThisUnitsTurn(target));
    };
    if !defender.is_alive() || defender.current_color != Side::Attacker {
        return Err(CommandError::NotThisUnitsTurn(target));
    }

    arena.towers_fired_this_turn = true;

    let roll = arena.rng.next_range(TOWER_DAMAGE_MIN, TOWER_DAMAGE_MAX) as f64;
    let defense = arena.board.unit(target).map(|u| u.stats.defense).unwrap_or(0);
    let damage = (roll * attack_defense_multiplier(TOWER_BASE_ATTACK, defense)).floor().max(0.0) as u64;

    let mut outcome = CommandOutcome::default();
    let Some(unit) = arena.board.unit_mut(target) else {
        return Ok(outcome);
    };
    let before = unit.hit_points;
    unit.hit_points = unit.hit_points.saturating_sub(damage);
    let dealt = before - unit.hit_points;
    let before_count = unit.count;
    unit.recompute_count();
    let killed = before_count - unit.count;

    outcome.push(battle_types::effect::Effect::Damage {
        source: None,
        target,
        amount: dealt,
        killed_count: killed,
    });

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaConfig, ControlMode};
    use crate::board::CellObject;
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::board::Direction;
    use battle_types::ids::{BattleId, CellIndex, UnitKindId};
    use battle_types::position::Position;
    use battle_types::unit::{Unit, UnitAbilities, UnitModes, UnitStats};

    fn castle_arena() -> Arena {
        Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: true,
                fortified: false,
                attacker_control: ControlMode::Human,
                defender_control: ControlMode::Ai,
                seed: 3,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        )
    }

    fn attacker_unit(uid: u32, cell: u8) -> Unit {
        Unit {
            uid: UnitUid(uid),
            kind: UnitKindId(0),
            army_color: Side::Attacker,
            current_color: Side::Attacker,
            stats: UnitStats {
                attack: 3,
                defense: 3,
                damage_min: 1,
                damage_max: 2,
                hit_points_per_fighter: 10,
                speed: 4,
                max_shots: 0,
                abilities: UnitAbilities::empty(),
                affinity: None,
                weakness: None,
                built_in_spell: None,
                magic_resistance_percent: 0,
                cost_per_fighter: 10,
            },
            count: 5,
            initial_count: 5,
            max_count: 5,
            hit_points: 50,
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
    fn fires_once_per_turn() {
        let mut arena = castle_arena();
        let free_cell = (0..battle_types::board::BOARD_SIZE)
            .map(CellIndex)
            .find(|&c| arena.board.occupant_at(c).is_none() && !matches!(arena.board.object_at(c), CellObject::Wall(_)))
            .unwrap();
        arena.board.insert_unit(attacker_unit(9, free_cell.get()));

        assert!(execute(&mut arena, 255, UnitUid(9)).is_ok());
        assert!(execute(&mut arena, 255, UnitUid(9)).is_err());
    }
}
