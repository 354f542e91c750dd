//! Retreat and Surrender (distilled spec §4.5, §4.8): attacker-only exits
//! from a battle that do not run through the usual per-unit turn flow.

use battle_types::error::CommandError;
use battle_types::effect::Effect;
use battle_types::result::{BattleOutcome, CommandOutcome};
use battle_types::unit::Side;

use crate::arena::Arena;

/// Retreat forfeits the fight but preserves the army; unavailable once the
/// attacker has no hero on the field or the battle already has a castle
/// siege underway with the bridge down (distilled spec §4.8).
pub fn retreat(arena: &mut Arena) -> Result<CommandOutcome, CommandError> {
    if arena.is_over() {
        return Err(CommandError::BattleAlreadyOver);
    }
    if arena.config.has_castle && arena.board.bridge.down && !arena.board.bridge.destroyed {
        return Err(CommandError::RetreatNotAvailable);
    }

    let mut outcome = CommandOutcome::default();
    arena.outcome = Some(BattleOutcome::Retreat(Side::Attacker));
    outcome.push(Effect::Retreated { side: Side::Attacker });
    Ok(outcome)
}

/// Surrender buys peace by paying the defender a sum proportional to the
/// attacker's remaining army cost; affordability is the caller's (hero
/// gold) concern, this only checks the army is non-empty (distilled spec
/// §4.8).
pub fn surrender(arena: &mut Arena) -> Result<CommandOutcome, CommandError> {
    if arena.is_over() {
        return Err(CommandError::BattleAlreadyOver);
    }
    let has_army = arena.board.alive_units().any(|u| u.army_color == Side::Attacker && !u.is_tower());
    if !has_army {
        return Err(CommandError::RetreatNotAvailable);
    }

    let mut outcome = CommandOutcome::default();
    arena.outcome = Some(BattleOutcome::Surrender(Side::Attacker));
    outcome.push(Effect::Surrendered { side: Side::Attacker });
    Ok(outcome)
}

/// Total recruitment cost of the attacker's surviving army, used by a host
/// to compute the gold price of a surrender offer (distilled spec §4.8).
pub fn surrender_cost(arena: &Arena, difficulty_ratio: f64) -> u64 {
    let base: u64 = arena
        .board
        .alive_units()
        .filter(|u| u.army_color == Side::Attacker && !u.is_tower())
        .map(|u| u.count as u64 * u.stats.cost_per_fighter as u64)
        .sum();
    (base as f64 * difficulty_ratio).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaConfig, ControlMode};
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::ids::BattleId;

    fn open_field_arena() -> Arena {
        Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: false,
                fortified: false,
                attacker_control: ControlMode::Human,
                defender_control: ControlMode::Ai,
                seed: 1,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        )
    }

    #[test]
    fn retreat_ends_battle_with_attacker_as_retreating_side() {
        let mut arena = open_field_arena();
        let result = retreat(&mut arena).unwrap();
        assert!(arena.is_over());
        assert!(matches!(result.effects[0], Effect::Retreated { side: Side::Attacker }));
    }

    #[test]
    fn surrender_without_army_is_rejected() {
        let mut arena = open_field_arena();
        assert!(surrender(&mut arena).is_err());
    }
}
