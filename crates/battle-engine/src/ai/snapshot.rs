//! The per-battle-start snapshot the planner scores tactics against
//! (distilled spec §4.9): own/enemy strength, shooter subtotal, and a
//! retreat-worthiness flag keyed off the commanding hero.

use battle_types::unit::Side;

use crate::arena::Arena;

/// Hero facts the planner needs but that live outside the battle core
/// proper (distilled spec §4.9: "commanding hero has level > 2 or
/// carries artifacts"). The host supplies this; `battle-engine` never
/// constructs one itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeroContext {
    pub level: u32,
    pub has_artifacts: bool,
    pub spell_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactics {
    Offensive,
    Defensive,
    CautiousOffensive,
}

#[derive(Debug, Clone, Copy)]
pub struct BattleSnapshot {
    pub side: Side,
    pub own_strength: f64,
    pub enemy_strength: f64,
    pub own_shooter_strength: f64,
    pub enemy_shooter_strength: f64,
    pub retreat_worthy: bool,
    pub tactics: Tactics,
}

fn unit_strength(arena: &Arena, side: Side) -> f64 {
    arena
        .board
        .alive_units()
        .filter(|u| u.current_color == side && !u.is_tower())
        .map(|u| {
            let avg_damage = (u.stats.damage_min + u.stats.damage_max) as f64 / 2.0;
            u.count as f64 * (u.stats.attack + u.stats.defense) as f64 * avg_damage.max(1.0)
        })
        .sum()
}

fn shooter_strength(arena: &Arena, side: Side) -> f64 {
    let raw: f64 = arena
        .board
        .alive_units()
        .filter(|u| u.current_color == side && u.is_shooter() && !u.is_tower())
        .map(|u| u.count as f64 * u.shots_left.min(u.stats.max_shots) as f64 * u.stats.damage_max as f64)
        .sum();
    if side == Side::Defender && arena.config.has_castle {
        raw * arena.statics.castle_wall_shooter_multiplier
    } else {
        raw
    }
}

/// Builds the snapshot for `side`. `hero` is `None` for a side with no
/// hero present (e.g. a garrison-only defender), in which case retreat is
/// never considered worthwhile.
pub fn build(arena: &Arena, side: Side, hero: Option<HeroContext>) -> BattleSnapshot {
    let own_strength = unit_strength(arena, side);
    let enemy_strength = unit_strength(arena, side.opposite());
    let own_shooter_strength = shooter_strength(arena, side);
    let enemy_shooter_strength = shooter_strength(arena, side.opposite());

    let retreat_worthy = hero.map(|h| h.level > 2 || h.has_artifacts).unwrap_or(false);

    let tactics = if enemy_shooter_strength < own_strength * 0.2 {
        Tactics::CautiousOffensive
    } else if own_shooter_strength >= enemy_shooter_strength * 0.8 {
        Tactics::Defensive
    } else {
        Tactics::Offensive
    };

    BattleSnapshot {
        side,
        own_strength,
        enemy_strength,
        own_shooter_strength,
        enemy_shooter_strength,
        retreat_worthy,
        tactics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{ArenaConfig, ControlMode};
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::ids::BattleId;

    #[test]
    fn empty_board_has_zero_strength_both_sides() {
        let arena = Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: false,
                fortified: false,
                attacker_control: ControlMode::Ai,
                defender_control: ControlMode::Ai,
                seed: 1,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        );
        let snap = build(&arena, Side::Attacker, None);
        assert_eq!(snap.own_strength, 0.0);
        assert!(!snap.retreat_worthy);
    }

    #[test]
    fn hero_level_above_two_is_retreat_worthy() {
        let arena = Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: false,
                fortified: false,
                attacker_control: ControlMode::Ai,
                defender_control: ControlMode::Ai,
                seed: 1,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        );
        let hero = HeroContext {
            level: 5,
            has_artifacts: false,
            spell_points: 10,
        };
        let snap = build(&arena, Side::Attacker, Some(hero));
        assert!(snap.retreat_worthy);
    }
}
