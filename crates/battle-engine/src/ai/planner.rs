//! Per-unit AI planner (distilled spec §4.9): given one unit whose turn
//! it is, decide what `Command` to issue. Each step below is tried in
//! order and the first one that produces a command wins, mirroring the
//! fallback chain the distilled spec lays out (berserk → shoot →
//! melee-attack → reposition → skip).

use battle_types::board::{self as geo, Direction};
use battle_types::command::{AttackFrom, Command};
use battle_types::ids::UnitUid;
use battle_types::position::Position;
use battle_types::unit::{Unit, UnitModes};

use crate::arena::Arena;

use super::snapshot::{BattleSnapshot, Tactics};

/// Raw damage-dealing potential of `attacker` against `defender`, used to
/// rank targets and candidate attack positions (distilled spec §4.9
/// "threat" primitive). Not the actual roll — `battle-engine::damage`
/// owns that — just a comparable score.
pub fn threat(attacker: &Unit, defender: &Unit) -> f64 {
    let avg_damage = (attacker.stats.damage_min + attacker.stats.damage_max) as f64 / 2.0;
    let multiplier = crate::damage::attack_defense_multiplier(attacker.stats.attack, defender.stats.defense);
    attacker.count as f64 * avg_damage * multiplier
}

/// Should this side quit the fight before acting further (distilled spec
/// §4.9, §4.8)? A losing, retreat-worthy side facing overwhelming enemy
/// strength gives up rather than feeding units in one at a time.
pub fn should_retreat(snapshot: &BattleSnapshot) -> bool {
    snapshot.retreat_worthy && snapshot.enemy_strength > snapshot.own_strength * 3.0
}

fn berserk_attack(arena: &Arena, uid: UnitUid) -> Option<Command> {
    let unit = arena.board.unit(uid)?;
    let mut best: Option<(UnitUid, u32)> = None;
    for enemy in arena.board.alive_units().filter(|u| u.current_color != unit.current_color) {
        let d = geo::distance(unit.position.head, enemy.position.head);
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((enemy.uid, d));
        }
    }
    let (target_uid, _) = best?;
    if unit.can_shoot() {
        return Some(Command::Attack {
            unit: uid,
            target: target_uid,
            from: AttackFrom::Ranged,
        });
    }
    let from = adjacent_reachable_position(arena, uid, target_uid)?;
    Some(Command::Attack {
        unit: uid,
        target: target_uid,
        from: AttackFrom::Melee(from),
    })
}

/// The best enemy to shoot at this turn: highest threat we can deal back,
/// i.e. the enemy stack our damage output hurts the most.
fn best_shot_target(arena: &Arena, uid: UnitUid) -> Option<UnitUid> {
    let unit = arena.board.unit(uid)?;
    arena
        .board
        .alive_units()
        .filter(|e| e.current_color != unit.current_color)
        .map(|e| (e.uid, threat(unit, e)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(u, _)| u)
}

fn adjacent_reachable_position(arena: &Arena, uid: UnitUid, target_uid: UnitUid) -> Option<Position> {
    let unit = arena.board.unit(uid)?;
    let target = arena.board.unit(target_uid)?;
    let mut finder = crate::pathfinder::Pathfinder::new();
    finder.ensure_built(&arena.board, unit);

    let mut candidates: Vec<Position> = Vec::new();
    for cell in target.position.cells() {
        for dir in Direction::ALL_NEIGHBORS {
            let Some(neighbor) = geo::neighbor(cell, dir) else {
                continue;
            };
            candidates.push(Position::narrow(neighbor));
        }
    }
    candidates
        .into_iter()
        .filter(|p| finder.is_reachable_this_turn(*p))
        .min_by_key(|p| geo::distance(unit.position.head, p.head))
}

/// Candidate melee attack positions for `uid` against every reachable
/// enemy: each reachable adjacent cell paired with the enemy it would let
/// us hit and the threat score of that matchup (distilled spec §4.9
/// "evaluate_potential_attack_positions" primitive).
fn evaluate_potential_attack_positions(arena: &Arena, uid: UnitUid) -> Vec<(Position, UnitUid, f64)> {
    let Some(unit) = arena.board.unit(uid) else {
        return Vec::new();
    };
    let mut finder = crate::pathfinder::Pathfinder::new();
    finder.ensure_built(&arena.board, unit);

    let mut out = Vec::new();
    for enemy in arena.board.alive_units().filter(|e| e.current_color != unit.current_color) {
        for cell in enemy.position.cells() {
            for dir in Direction::ALL_NEIGHBORS {
                let Some(neighbor) = geo::neighbor(cell, dir) else {
                    continue;
                };
                let pos = Position::narrow(neighbor);
                if finder.is_reachable_this_turn(pos) {
                    out.push((pos, enemy.uid, threat(unit, enemy)));
                }
            }
        }
    }
    out
}

/// The attack position/target pair scoring best for `uid`'s tactics
/// (distilled spec §4.9 "optimal_attack_vector" primitive): offensive
/// tactics simply chase the highest-threat matchup; defensive tactics
/// additionally prefer staying close to our own shooters, trading some
/// damage output for keeping the firing line covered.
fn optimal_attack_vector(arena: &Arena, uid: UnitUid, snapshot: &BattleSnapshot) -> Option<(Position, UnitUid)> {
    let unit = arena.board.unit(uid)?;
    let candidates = evaluate_potential_attack_positions(arena, uid);
    if candidates.is_empty() {
        return None;
    }

    let score = |pos: Position, raw_threat: f64| -> f64 {
        match snapshot.tactics {
            Tactics::Defensive => {
                let cover = arena
                    .board
                    .alive_units()
                    .filter(|u| u.current_color == unit.current_color && u.is_shooter())
                    .map(|u| geo::distance(pos.head, u.position.head))
                    .min()
                    .unwrap_or(0) as f64;
                raw_threat - cover * 2.0
            }
            Tactics::Offensive | Tactics::CautiousOffensive => raw_threat,
        }
    };

    candidates
        .into_iter()
        .map(|(pos, target, raw_threat)| (pos, target, score(pos, raw_threat)))
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(pos, target, _)| (pos, target))
}

/// When nothing is in reach this turn, step toward whichever enemy we
/// could threaten soonest rather than standing still.
fn advance_toward_enemy(arena: &Arena, uid: UnitUid) -> Option<Position> {
    let unit = arena.board.unit(uid)?;
    let mut finder = crate::pathfinder::Pathfinder::new();
    finder.ensure_built(&arena.board, unit);

    let nearest_enemy = arena
        .board
        .alive_units()
        .filter(|e| e.current_color != unit.current_color)
        .min_by_key(|e| geo::distance(unit.position.head, e.position.head))?;

    finder.closest_reachable_position(Position::narrow(nearest_enemy.position.head))
}

/// Decide this unit's command for the current turn (distilled spec
/// §4.9's per-unit plan, steps 1-6 collapsed into an ordered fallback).
/// Hero spellcasting (step 3) is outside this crate's scope: the host
/// owns the hero and decides whether to interrupt a unit's turn with a
/// spell before calling this.
pub fn plan_unit_turn(arena: &Arena, uid: UnitUid, snapshot: &BattleSnapshot) -> Command {
    let Some(unit) = arena.board.unit(uid) else {
        return Command::Skip { unit: uid };
    };
    if !unit.is_alive() {
        return Command::Skip { unit: uid };
    }

    if unit.modes.contains(UnitModes::BERSERKER) {
        if let Some(cmd) = berserk_attack(arena, uid) {
            return cmd;
        }
        return Command::Skip { unit: uid };
    }

    if unit.can_shoot() {
        if let Some(target) = best_shot_target(arena, uid) {
            return Command::Attack {
                unit: uid,
                target,
                from: AttackFrom::Ranged,
            };
        }
    }

    if let Some((position, target)) = optimal_attack_vector(arena, uid, snapshot) {
        return Command::Attack {
            unit: uid,
            target,
            from: AttackFrom::Melee(position),
        };
    }

    if let Some(target) = advance_toward_enemy(arena, uid) {
        return Command::Move { unit: uid, target };
    }

    Command::Skip { unit: uid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, ArenaConfig, ControlMode};
    use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
    use battle_types::board::Direction as Dir;
    use battle_types::ids::{BattleId, CellIndex, UnitKindId};
    use battle_types::unit::{Side, UnitAbilities, UnitStats};

    fn melee_unit(uid: u32, side: Side, cell: u8) -> Unit {
        Unit {
            uid: UnitUid(uid),
            kind: UnitKindId(0),
            army_color: side,
            current_color: side,
            stats: UnitStats {
                attack: 4,
                defense: 2,
                damage_min: 2,
                damage_max: 4,
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
            count: 6,
            initial_count: 6,
            max_count: 6,
            hit_points: 60,
            dead_count: 0,
            shots_left: 0,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(cell)),
            facing: Dir::Right,
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        }
    }

    fn open_field_arena() -> Arena {
        Arena::new(
            BattleId(1),
            ArenaConfig {
                has_castle: false,
                fortified: false,
                attacker_control: ControlMode::Ai,
                defender_control: ControlMode::Human,
                seed: 7,
            },
            BattleStatics::default(),
            UnitCatalog::standard(),
            SpellCatalog::standard(),
        )
    }

    #[test]
    fn adjacent_enemy_produces_melee_attack() {
        let mut arena = open_field_arena();
        let a = melee_unit(1, Side::Attacker, 20);
        let neighbor = geo::neighbor(a.position.head, Dir::Right).unwrap();
        let d = melee_unit(2, Side::Defender, neighbor.get());
        arena.board.insert_unit(a);
        arena.board.insert_unit(d);

        let snapshot = super::super::snapshot::build(&arena, Side::Attacker, None);
        let cmd = plan_unit_turn(&arena, UnitUid(1), &snapshot);
        assert!(matches!(
            cmd,
            Command::Attack {
                target: UnitUid(2),
                from: AttackFrom::Melee(_),
                ..
            }
        ));
    }

    #[test]
    fn no_enemies_on_board_skips() {
        let mut arena = open_field_arena();
        let a = melee_unit(1, Side::Attacker, 20);
        arena.board.insert_unit(a);
        let snapshot = super::super::snapshot::build(&arena, Side::Attacker, None);
        let cmd = plan_unit_turn(&arena, UnitUid(1), &snapshot);
        assert!(matches!(cmd, Command::Skip { unit: UnitUid(1) }));
    }
}
