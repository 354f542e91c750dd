//! Damage formula (distilled spec §4.6). A single pure function taking an
//! explicit `DamageContext` rather than reaching into global state — the
//! "single source of truth" validation-function style the teacher uses
//! for its own rules checks, applied here to arithmetic instead.

use battle_types::rng::BattleRng;
use battle_types::unit::{Element, Unit, UnitAbilities, UnitModes};

#[derive(Debug, Clone, Copy, Default)]
pub struct DamageModifiers {
    pub attacker_in_melee_but_is_shooter: bool,
    pub shot_crosses_wall: bool,
    pub shield_active_on_defender: bool,
    pub defender_is_tower: bool,
    pub blind_retaliation: bool,
    pub blind_reduction_percent: u8,
}

/// Base roll before modifiers: uniform over `[min, max]`, pinned to `max`
/// under Bless and `min` under Curse (distilled spec §4.6, §8 property 5).
pub fn roll_base_damage(attacker: &Unit, rng: &mut BattleRng) -> u32 {
    if attacker.modes.contains(UnitModes::BLESS) {
        attacker.stats.damage_max
    } else if attacker.modes.contains(UnitModes::CURSE) {
        attacker.stats.damage_min
    } else {
        rng.next_range(attacker.stats.damage_min, attacker.stats.damage_max)
    }
}

/// Attack/defense differential multiplier (distilled spec §4.6).
pub fn attack_defense_multiplier(attack: i32, defense: i32) -> f64 {
    let delta = attack - defense;
    if delta > 0 {
        1.0 + 0.1 * delta.min(20) as f64
    } else {
        1.0 + 0.05 * delta.max(-16) as f64
    }
}

/// Full per-target damage for one hit of `count` attacking fighters,
/// folding in every modifier named in distilled spec §4.6. `luck` is
/// `Some(true)` for LuckGood (double), `Some(false)` for LuckBad (halve).
pub fn compute_damage(
    attacker: &Unit,
    defender: &Unit,
    base_roll: u32,
    modifiers: DamageModifiers,
    luck: Option<bool>,
) -> u64 {
    let mut damage = base_roll as f64 * attacker.count as f64;

    damage *= attack_defense_multiplier(attacker.stats.attack, defender.stats.defense);

    if !modifiers.defender_is_tower {
        if modifiers.attacker_in_melee_but_is_shooter
            && !attacker.stats.abilities.contains(UnitAbilities::NO_MELEE_PENALTY)
        {
            damage *= 0.5;
        }
        if modifiers.shot_crosses_wall {
            damage *= 0.5;
        }
        if modifiers.shield_active_on_defender {
            damage *= 0.5;
        }
    }

    if modifiers.blind_retaliation {
        damage *= (100 - modifiers.blind_reduction_percent.min(100)) as f64 / 100.0;
    }

    if defender.modes.contains(UnitModes::STONE) {
        damage *= 0.5;
    }

    if ability_bonus_applies(attacker, defender) {
        damage *= 2.0;
    }

    match luck {
        Some(true) => damage *= 2.0,
        Some(false) => damage *= 0.5,
        None => {}
    }

    damage.floor().max(0.0) as u64
}

fn ability_bonus_applies(attacker: &Unit, defender: &Unit) -> bool {
    let elemental = match (attacker.stats.affinity, defender.stats.weakness) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    let undead_bane = attacker.stats.abilities.contains(UnitAbilities::UNDEAD_BANE)
        && defender.stats.abilities.contains(UnitAbilities::UNDEAD);
    elemental || undead_bane
}

pub fn affinity_matches(affinity: Option<Element>, weakness: Option<Element>) -> bool {
    matches!((affinity, weakness), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_types::board::Direction;
    use battle_types::ids::{CellIndex, UnitKindId, UnitUid};
    use battle_types::position::Position;
    use battle_types::unit::{Side, UnitStats};

    fn unit(attack: i32, defense: i32, count: u32) -> Unit {
        Unit {
            uid: UnitUid(1),
            kind: UnitKindId(0),
            army_color: Side::Attacker,
            current_color: Side::Attacker,
            stats: UnitStats {
                attack,
                defense,
                damage_min: 5,
                damage_max: 5,
                hit_points_per_fighter: 10,
                speed: 5,
                max_shots: 0,
                abilities: UnitAbilities::empty(),
                affinity: None,
                weakness: None,
                built_in_spell: None,
                magic_resistance_percent: 0,
                cost_per_fighter: 10,
            },
            count,
            initial_count: count,
            max_count: count,
            hit_points: count as u64 * 10,
            dead_count: 0,
            shots_left: 0,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(0)),
            facing: Direction::Right,
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        }
    }

    #[test]
    fn bless_pins_to_max_damage() {
        let mut attacker = unit(5, 5, 1);
        attacker.modes.insert(UnitModes::BLESS);
        let mut rng = BattleRng::new(1);
        assert_eq!(roll_base_damage(&attacker, &mut rng), attacker.stats.damage_max);
    }

    #[test]
    fn curse_pins_to_min_damage() {
        let mut attacker = unit(5, 5, 1);
        attacker.modes.insert(UnitModes::CURSE);
        let mut rng = BattleRng::new(1);
        assert_eq!(roll_base_damage(&attacker, &mut rng), attacker.stats.damage_min);
    }

    #[test]
    fn blind_retaliation_worked_example() {
        let attacker = unit(0, 0, 20);
        let defender = unit(0, 0, 1);
        let modifiers = DamageModifiers {
            blind_retaliation: true,
            blind_reduction_percent: 50,
            ..Default::default()
        };
        let damage = compute_damage(&attacker, &defender, 10, modifiers, None);
        assert_eq!(damage, 100);
    }

    #[test]
    fn positive_differential_increases_damage() {
        let m = attack_defense_multiplier(10, 0);
        assert!((m - 2.0).abs() < 1e-9);
    }

    #[test]
    fn negative_differential_floors_at_minus_sixteen() {
        let m = attack_defense_multiplier(0, 100);
        assert!((m - (1.0 - 0.05 * 16.0)).abs() < 1e-9);
    }
}
