//! Catapult (distilled spec §4.5, §4.7): the attacker's siege weapon
//! fires once per subturn at a pre-rolled wall/tower/bridge target,
//! subtracting damage clamped to the structure's remaining condition.

use battle_types::error::CommandError;
use battle_types::ids::CellIndex;
use battle_types::result::CommandOutcome;

use crate::arena::Arena;
use crate::siege;

pub fn execute(arena: &mut Arena, target_cell: CellIndex) -> Result<CommandOutcome, CommandError> {
    if !arena.config.has_castle {
        return Err(CommandError::InvalidCatapultTarget(target_cell));
    }
    if arena.catapult_shots_fired_this_turn {
        return Err(CommandError::InvalidCatapultTarget(target_cell));
    }
    let Some(&(structure, cell)) = arena
        .structure_cells
        .iter()
        .find(|&&(_, cell)| cell == target_cell)
    else {
        return Err(CommandError::InvalidCatapultTarget(target_cell));
    };

    let mut outcome = CommandOutcome::default();
    arena.catapult_shots_fired_this_turn = true;

    let roll = arena.rng.next_range(1, 3);
    let (destroyed, _) = siege::apply_hit(&mut arena.board, structure, cell, roll);

    outcome.push(battle_types::effect::Effect::CatapultHit {
        cell,
        structure: to_effect_structure(structure),
        destroyed,
    });
    if structure == siege::DefenseStructure::Bridge {
        outcome.push(battle_types::effect::Effect::BridgeStateChanged {
            passable: arena.board.bridge.is_passable(),
        });
    }

    Ok(outcome)
}

fn to_effect_structure(s: siege::DefenseStructure) -> battle_types::effect::SiegeStructure {
    use battle_types::effect::SiegeStructure as ES;
    match s {
        siege::DefenseStructure::Wall(i) => ES::Wall(i),
        siege::DefenseStructure::ArcherTower(i) => ES::Tower(i),
        siege::DefenseStructure::CentralTower => ES::Tower(255),
        siege::DefenseStructure::BridgeTower(i) => ES::Tower(100 + i),
        siege::DefenseStructure::Bridge => ES::Bridge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaConfig, ControlMode};
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::ids::BattleId;

    fn castle_arena() -> Arena {
        Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: true,
                fortified: false,
                attacker_control: ControlMode::Human,
                defender_control: ControlMode::Ai,
                seed: 7,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        )
    }

    #[test]
    fn rejects_non_structure_cell() {
        let mut arena = castle_arena();
        let result = execute(&mut arena, CellIndex(0));
        assert!(result.is_err());
    }

    #[test]
    fn only_one_shot_per_turn() {
        let mut arena = castle_arena();
        let target = arena.structure_cells[0].1;
        assert!(execute(&mut arena, target).is_ok());
        assert!(execute(&mut arena, target).is_err());
    }
}
