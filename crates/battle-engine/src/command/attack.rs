//! Attack (distilled spec §4.5, §4.6): melee/ranged validation, target-set
//! resolution for two-cell/sweep/cloud attackers, retaliation,
//! double-attack, and the attacker's built-in single-target spell.

use battle_types::board::{self as geo, Direction};
use battle_types::command::AttackFrom;
use battle_types::effect::Effect;
use battle_types::error::{AttackError, CommandError};
use battle_types::ids::UnitUid;
use battle_types::position::Position;
use battle_types::result::CommandOutcome;
use battle_types::unit::{UnitAbilities, UnitModes};

use crate::arena::Arena;
use crate::damage::{compute_damage, roll_base_damage, DamageModifiers};
use crate::observer::BattleObserver;
use crate::siege::wall_blocks;

fn direction_between(a: battle_types::ids::CellIndex, b: battle_types::ids::CellIndex) -> Option<Direction> {
    Direction::ALL_NEIGHBORS
        .into_iter()
        .find(|&d| geo::neighbor(a, d) == Some(b))
}

pub fn execute(
    arena: &mut Arena,
    attacker_uid: UnitUid,
    defender_uid: UnitUid,
    from: AttackFrom,
    mut observer: Option<&mut dyn BattleObserver>,
) -> Result<CommandOutcome, CommandError> {
    validate(arena, attacker_uid, defender_uid, from)?;

    let mut outcome = CommandOutcome::default();

    if let AttackFrom::Melee(dst) = from {
        let current = arena.board.unit(attacker_uid).unwrap().position;
        if dst != current {
            arena.board.relocate_unit(attacker_uid, dst);
            outcome.push(Effect::UnitMoved {
                unit: attacker_uid,
                from: current,
                to: dst,
            });
        }
    }

    face_each_other(arena, attacker_uid, defender_uid);

    if let Some(obs) = observer.as_deref_mut() {
        obs.on_pre_attack(attacker_uid, defender_uid);
    }

    strike(arena, attacker_uid, defender_uid, &mut outcome);

    let attacker_alive = arena.board.unit(attacker_uid).map(|u| u.is_alive()).unwrap_or(false);
    let defender_alive = arena.board.unit(defender_uid).map(|u| u.is_alive()).unwrap_or(false);

    let is_melee = matches!(from, AttackFrom::Melee(_));
    if is_melee && attacker_alive && defender_alive {
        maybe_retaliate(arena, attacker_uid, defender_uid, &mut outcome);
    }

    let attacker_alive = arena.board.unit(attacker_uid).map(|u| u.is_alive()).unwrap_or(false);
    if attacker_alive {
        let has_double = arena
            .board
            .unit(attacker_uid)
            .map(|u| u.stats.abilities.contains(UnitAbilities::DOUBLE_ATTACK))
            .unwrap_or(false);
        let defender_alive = arena.board.unit(defender_uid).map(|u| u.is_alive()).unwrap_or(false);
        let immobilized = arena
            .board
            .unit(attacker_uid)
            .map(|u| u.modes.intersects(UnitModes::PARALYZE | UnitModes::STONE))
            .unwrap_or(true);
        if has_double && defender_alive && !immobilized {
            strike(arena, attacker_uid, defender_uid, &mut outcome);
        }
    }

    maybe_cast_built_in_spell(arena, attacker_uid, defender_uid, &mut outcome);

    post_attack(arena, attacker_uid, is_melee);

    if let Some(obs) = observer {
        obs.on_post_attack(attacker_uid, defender_uid);
        for effect in &outcome.effects {
            obs.on_effect(effect);
        }
    }

    Ok(outcome)
}

fn validate(
    arena: &Arena,
    attacker_uid: UnitUid,
    defender_uid: UnitUid,
    from: AttackFrom,
) -> Result<(), CommandError> {
    let attacker = arena
        .board
        .unit(attacker_uid)
        .ok_or(AttackError::UnknownAttacker(attacker_uid))
        .map_err(CommandError::Attack)?;
    let defender = arena
        .board
        .unit(defender_uid)
        .ok_or(AttackError::UnknownTarget(defender_uid))
        .map_err(CommandError::Attack)?;

    if !attacker.is_alive() {
        return Err(CommandError::Attack(AttackError::UnknownAttacker(attacker_uid)));
    }
    if !defender.is_alive() {
        return Err(CommandError::Attack(AttackError::UnknownTarget(defender_uid)));
    }
    if attacker.modes.contains(UnitModes::MOVED) {
        return Err(CommandError::Attack(AttackError::AlreadyActed(attacker_uid)));
    }
    if attacker.current_color == defender.current_color {
        return Err(CommandError::Attack(AttackError::NotAnEnemy(defender_uid)));
    }

    match from {
        AttackFrom::Ranged => {
            if !attacker.can_shoot() {
                return Err(CommandError::Attack(AttackError::NoShotsLeft(attacker_uid)));
            }
            if attacker.modes.contains(UnitModes::BLIND) {
                return Err(CommandError::Attack(AttackError::Blinded(attacker_uid)));
            }
        }
        AttackFrom::Melee(dst) => {
            if !dst.is_structurally_valid() {
                return Err(CommandError::Attack(AttackError::OutOfMeleeRange(attacker_uid)));
            }
            let adjacent_to_defender = defender
                .position
                .cells()
                .iter()
                .any(|&dc| dst.cells().iter().any(|&ac| geo::are_adjacent(ac, dc)));
            if !adjacent_to_defender {
                return Err(CommandError::Attack(AttackError::OutOfMeleeRange(attacker_uid)));
            }
            for cell in dst.cells() {
                if arena.board.is_blocked(cell, Some(attacker_uid)) {
                    return Err(CommandError::Attack(AttackError::OutOfMeleeRange(attacker_uid)));
                }
            }
        }
    }
    Ok(())
}

fn face_each_other(arena: &mut Arena, attacker_uid: UnitUid, defender_uid: UnitUid) {
    let attacker_head = arena.board.unit(attacker_uid).map(|u| u.position.head);
    let defender_head = arena.board.unit(defender_uid).map(|u| u.position.head);
    if let (Some(a), Some(d)) = (attacker_head, defender_head) {
        if let Some(dir) = direction_between(a, d) {
            if let Some(u) = arena.board.unit_mut(attacker_uid) {
                u.facing = dir;
            }
        }
        if let Some(dir) = direction_between(d, a) {
            if let Some(u) = arena.board.unit_mut(defender_uid) {
                u.facing = dir;
            }
        }
    }
}

/// The full target set for one strike, per the attacker's abilities
/// (distilled spec §4.5 resolution step).
fn target_set(arena: &Arena, attacker_uid: UnitUid, defender_uid: UnitUid, is_melee: bool) -> Vec<UnitUid> {
    let Some(attacker) = arena.board.unit(attacker_uid) else {
        return vec![];
    };
    let Some(defender) = arena.board.unit(defender_uid) else {
        return vec![];
    };

    if attacker.stats.abilities.contains(UnitAbilities::CLOUD_ATTACK) && !is_melee {
        let mut targets = vec![defender_uid];
        for cell in geo::neighbors(defender.position.head) {
            if let Some(uid) = arena.board.occupant_at(cell) {
                if uid != attacker_uid && !targets.contains(&uid) {
                    targets.push(uid);
                }
            }
        }
        return targets;
    }

    if attacker.stats.abilities.contains(UnitAbilities::ALL_AROUND_ATTACK) {
        let mut targets = Vec::new();
        for cell in geo::neighbors(attacker.position.head) {
            if let Some(uid) = arena.board.occupant_at(cell) {
                if let Some(u) = arena.board.unit(uid) {
                    if u.current_color != attacker.current_color {
                        targets.push(uid);
                    }
                }
            }
        }
        if targets.is_empty() {
            targets.push(defender_uid);
        }
        return targets;
    }

    if attacker.stats.abilities.contains(UnitAbilities::TWO_HEX_ATTACK) {
        let mut targets = vec![defender_uid];
        if let Some(attacker_cell) = attacker
            .position
            .cells()
            .into_iter()
            .find(|&c| geo::are_adjacent(c, defender.position.head))
        {
            if let Some(dir) = direction_between(attacker_cell, defender.position.head) {
                if let Some(behind) = geo::neighbor(defender.position.head, dir) {
                    if let Some(uid) = arena.board.occupant_at(behind) {
                        if uid != attacker_uid {
                            targets.push(uid);
                        }
                    }
                }
            }
        }
        return targets;
    }

    vec![defender_uid]
}

fn strike(arena: &mut Arena, attacker_uid: UnitUid, primary_target: UnitUid, outcome: &mut CommandOutcome) {
    let is_melee = matches!(
        arena.board.unit(attacker_uid).map(|u| u.is_shooter()),
        Some(false)
    ) || !arena
        .board
        .unit(attacker_uid)
        .map(|u| u.can_shoot())
        .unwrap_or(false);

    let targets = target_set(arena, attacker_uid, primary_target, is_melee);
    let luck = roll_luck(arena, attacker_uid);

    for target_uid in targets {
        let Some(attacker) = arena.board.unit(attacker_uid) else {
            continue;
        };
        let Some(defender) = arena.board.unit(target_uid) else {
            continue;
        };
        if attacker.current_color == defender.current_color {
            continue;
        }

        let base = roll_base_damage(attacker, &mut arena.rng);
        let modifiers = DamageModifiers {
            attacker_in_melee_but_is_shooter: attacker.is_shooter() && is_melee,
            shot_crosses_wall: !is_melee && shot_crosses_wall(arena, attacker, defender),
            shield_active_on_defender: defender.modes.contains(UnitModes::SHIELD) && !attacker.is_tower(),
            defender_is_tower: defender.is_tower(),
            blind_retaliation: false,
            blind_reduction_percent: arena.statics.blind_damage_reduction_percent,
        };
        let damage = compute_damage(attacker, defender, base, modifiers, luck);

        apply_damage(arena, attacker_uid, target_uid, damage, outcome);
    }
}

fn shot_crosses_wall(
    arena: &Arena,
    attacker: &battle_types::unit::Unit,
    defender: &battle_types::unit::Unit,
) -> bool {
    if !arena.config.has_castle {
        return false;
    }
    let a_outside = geo::is_outside_walls_index(attacker.position.head);
    let d_outside = geo::is_outside_walls_index(defender.position.head);
    if a_outside == d_outside {
        return false;
    }
    arena.structure_cells.iter().any(|&(s, cell)| {
        matches!(s, crate::siege::DefenseStructure::Wall(_))
            && matches!(arena.board.object_at(cell), crate::board::CellObject::Wall(c) if wall_blocks(c))
    })
}

fn roll_luck(arena: &mut Arena, attacker_uid: UnitUid) -> Option<bool> {
    let unit = arena.board.unit(attacker_uid)?;
    if unit.modes.contains(UnitModes::LUCK_GOOD) {
        Some(true)
    } else if unit.modes.contains(UnitModes::LUCK_BAD) {
        Some(false)
    } else {
        None
    }
}

fn apply_damage(
    arena: &mut Arena,
    attacker_uid: UnitUid,
    target_uid: UnitUid,
    damage: u64,
    outcome: &mut CommandOutcome,
) {
    let Some(defender) = arena.board.unit_mut(target_uid) else {
        return;
    };
    let before = defender.hit_points;
    defender.hit_points = defender.hit_points.saturating_sub(damage);
    let dealt = before - defender.hit_points;
    let before_count = defender.count;
    defender.recompute_count();
    let killed = before_count - defender.count;

    outcome.push(Effect::Damage {
        source: Some(attacker_uid),
        target: target_uid,
        amount: dealt,
        killed_count: killed,
    });
}

fn maybe_retaliate(arena: &mut Arena, attacker_uid: UnitUid, defender_uid: UnitUid, outcome: &mut CommandOutcome) {
    let can_retaliate = arena
        .board
        .unit(defender_uid)
        .map(|d| {
            d.is_alive()
                && !d.modes.contains(UnitModes::RETALIATED)
                && !d.is_tower()
                && !d.modes.contains(UnitModes::MIRROR_IMAGE)
        })
        .unwrap_or(false);
    let ignores = arena
        .board
        .unit(attacker_uid)
        .map(|a| a.stats.abilities.contains(UnitAbilities::IGNORES_RETALIATION))
        .unwrap_or(false);
    if !can_retaliate || ignores {
        return;
    }

    let attacker_blinded = arena
        .board
        .unit(attacker_uid)
        .map(|a| a.modes.contains(UnitModes::BLIND))
        .unwrap_or(false);
    let luck = roll_luck(arena, defender_uid);

    let base = {
        let defender = arena.board.unit(defender_uid).unwrap();
        roll_base_damage(defender, &mut arena.rng)
    };

    let Some(defender) = arena.board.unit(defender_uid) else { return };
    let Some(attacker) = arena.board.unit(attacker_uid) else { return };

    let modifiers = DamageModifiers {
        attacker_in_melee_but_is_shooter: false,
        shot_crosses_wall: false,
        shield_active_on_defender: attacker.modes.contains(UnitModes::SHIELD) && !defender.is_tower(),
        defender_is_tower: attacker.is_tower(),
        blind_retaliation: attacker_blinded,
        blind_reduction_percent: arena.statics.blind_damage_reduction_percent,
    };
    let damage = compute_damage(defender, attacker, base, modifiers, luck);

    apply_damage(arena, defender_uid, attacker_uid, damage, outcome);
    outcome.push(Effect::Retaliation {
        attacker: defender_uid,
        defender: attacker_uid,
    });

    let unlimited = arena
        .board
        .unit(defender_uid)
        .map(|d| d.stats.abilities.contains(UnitAbilities::UNLIMITED_RETALIATION))
        .unwrap_or(false);
    if !unlimited {
        if let Some(d) = arena.board.unit_mut(defender_uid) {
            d.set_mode(UnitModes::RETALIATED, None);
        }
    }
}

fn maybe_cast_built_in_spell(arena: &mut Arena, attacker_uid: UnitUid, defender_uid: UnitUid, outcome: &mut CommandOutcome) {
    let Some(attacker) = arena.board.unit(attacker_uid) else {
        return;
    };
    let Some((spell_id, chance)) = attacker.stats.built_in_spell else {
        return;
    };
    if !arena.rng.roll_chance(chance) {
        return;
    }
    if let Err(_err) = crate::command::spellcast_builtin(arena, spell_id, defender_uid, outcome) {
        tracing::trace!(spell = %spell_id, "built-in spell fizzled");
    }
}

fn post_attack(arena: &mut Arena, attacker_uid: UnitUid, is_melee: bool) {
    let Some(attacker) = arena.board.unit_mut(attacker_uid) else {
        return;
    };
    if !is_melee {
        attacker.shots_left = attacker.shots_left.saturating_sub(1);
    }
    attacker.clear_mode(UnitModes::LUCK_GOOD);
    attacker.clear_mode(UnitModes::LUCK_BAD);
    attacker.clear_mode(UnitModes::MORALE_GOOD);
    attacker.clear_mode(UnitModes::MORALE_BAD);
    if attacker.modes.contains(UnitModes::HYPNOTIZE) {
        attacker.clear_mode(UnitModes::HYPNOTIZE);
        attacker.current_color = attacker.army_color;
    }
    if attacker.modes.contains(UnitModes::BERSERKER) {
        attacker.clear_mode(UnitModes::BERSERKER);
        attacker.current_color = attacker.army_color;
    }
    attacker.set_mode(UnitModes::MOVED, None);
}
