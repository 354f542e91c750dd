//! Spellcast dispatch (distilled spec §4.5, §4.6). Target selection and
//! resistance rolling is shared across direct/area/mass/chain targeting;
//! `Teleport`/`Earthquake`/`MirrorImage`/`SummonElemental` get their own
//! special-case handlers as the distilled spec calls out by name.

use battle_data::{SpellKind, SpellPolarity, SpellTarget};
use battle_types::board as geo;
use battle_types::effect::Effect;
use battle_types::error::{CommandError, SpellError};
use battle_types::ids::{CellIndex, SpellId, UnitUid};
use battle_types::position::Position;
use battle_types::result::CommandOutcome;
use battle_types::unit::{Unit, UnitModes};

use crate::arena::Arena;
use crate::observer::BattleObserver;

pub fn execute(
    arena: &mut Arena,
    caster: Option<UnitUid>,
    spell: SpellId,
    target_unit: Option<UnitUid>,
    target_cell: Option<CellIndex>,
    mut observer: Option<&mut dyn BattleObserver>,
) -> Result<CommandOutcome, CommandError> {
    let def = arena
        .spells_catalog
        .get(spell)
        .cloned()
        .ok_or(SpellError::UnknownSpell(spell))
        .map_err(CommandError::Spell)?;

    if let Some(obs) = observer.as_deref_mut() {
        obs.on_spell_cast_begin(spell);
    }

    let mut outcome = CommandOutcome::default();
    outcome.push(Effect::SpellCast { spell, caster });

    match def.target {
        SpellTarget::Teleport => teleport(arena, target_unit, target_cell, &mut outcome)?,
        SpellTarget::Earthquake => earthquake(arena, &mut outcome),
        SpellTarget::MirrorImage => mirror_image(arena, target_unit, &mut outcome)?,
        SpellTarget::SummonElemental => summon_elemental(arena, caster, &mut outcome)?,
        SpellTarget::SingleUnit => {
            let uid = target_unit.ok_or(SpellError::MissingUnitTarget(spell)).map_err(CommandError::Spell)?;
            apply_to_unit(arena, spell, &def, uid, &mut outcome);
        }
        SpellTarget::Area { radius } => {
            let cell = target_cell.ok_or(SpellError::MissingCellTarget(spell)).map_err(CommandError::Spell)?;
            let targets = units_within_radius(arena, cell, radius);
            for uid in targets {
                apply_to_unit(arena, spell, &def, uid, &mut outcome);
            }
        }
        SpellTarget::Mass => {
            let targets = mass_targets(arena, caster, def.polarity);
            for uid in targets {
                apply_to_unit(arena, spell, &def, uid, &mut outcome);
            }
        }
        SpellTarget::ChainLightning { max_hops } => {
            let start = target_unit.ok_or(SpellError::MissingUnitTarget(spell)).map_err(CommandError::Spell)?;
            chain_lightning(arena, spell, &def, start, max_hops, &mut outcome);
        }
        SpellTarget::NoTarget => {}
    }

    arena.used_spells.push(spell);

    if let Some(obs) = observer {
        obs.on_spell_cast_end(spell);
    }

    Ok(outcome)
}

/// Built-in unit ability dispatch (distilled spec §4.5's "Built-in unit
/// magic"): a single-target side-effect cast outside the normal
/// cost/once-per-turn hero rules.
pub(crate) fn spellcast_builtin(
    arena: &mut Arena,
    spell: SpellId,
    target: UnitUid,
    outcome: &mut CommandOutcome,
) -> Result<(), CommandError> {
    let def = arena
        .spells_catalog
        .get(spell)
        .cloned()
        .ok_or(SpellError::UnknownSpell(spell))
        .map_err(CommandError::Spell)?;
    apply_to_unit(arena, spell, &def, target, outcome);
    Ok(())
}

fn resist_roll(arena: &mut Arena, target_uid: UnitUid) -> bool {
    let Some(resistance) = arena.board.unit(target_uid).map(|u| u.stats.magic_resistance_percent) else {
        return false;
    };
    arena.rng.roll_chance(resistance as f64 / 100.0)
}

fn apply_to_unit(arena: &mut Arena, spell: SpellId, def: &battle_data::SpellDef, target_uid: UnitUid, outcome: &mut CommandOutcome) {
    if arena.board.unit(target_uid).is_none() {
        return;
    }
    if resist_roll(arena, target_uid) {
        outcome.push(Effect::SpellResisted { spell, target: target_uid });
        return;
    }

    match def.kind {
        battle_data::SpellKind::Damage { min, max } => {
            let roll = arena.rng.next_range(min, max);
            apply_damage_to_unit(arena, target_uid, roll as u64, outcome);
        }
        battle_data::SpellKind::ApplyMode { mode, duration_turns } => {
            if let Some(u) = arena.board.unit_mut(target_uid) {
                let dur = if duration_turns == 0 { None } else { Some(duration_turns) };
                u.set_mode(mode, dur);
            }
            outcome.push(Effect::ModeApplied {
                target: target_uid,
                mode,
                duration_turns,
            });
        }
        battle_data::SpellKind::Dispel => {
            if let Some(u) = arena.board.unit_mut(target_uid) {
                let cleared = u.modes;
                u.modes = UnitModes::empty();
                u.durations.clear();
                outcome.push(Effect::ModeRemoved { target: target_uid, mode: cleared });
            }
        }
        battle_data::SpellKind::Resurrect => {
            resurrect(arena, target_uid, outcome);
        }
        battle_data::SpellKind::Special => {}
    }
}

fn apply_damage_to_unit(arena: &mut Arena, target_uid: UnitUid, damage: u64, outcome: &mut CommandOutcome) {
    let Some(target) = arena.board.unit_mut(target_uid) else {
        return;
    };
    let before = target.hit_points;
    target.hit_points = target.hit_points.saturating_sub(damage);
    let dealt = before - target.hit_points;
    let before_count = target.count;
    target.recompute_count();
    let killed = before_count - target.count;
    outcome.push(Effect::Damage {
        source: None,
        target: target_uid,
        amount: dealt,
        killed_count: killed,
    });
}

fn resurrect(arena: &mut Arena, target_uid: UnitUid, outcome: &mut CommandOutcome) {
    let Some(target) = arena.board.unit_mut(target_uid) else {
        return;
    };
    let missing = target.total_hit_points_capacity().saturating_sub(target.hit_points);
    if missing == 0 {
        return;
    }
    target.hit_points += missing;
    target.recompute_count();
    outcome.push(Effect::UnitResurrected {
        unit: target_uid,
        count: target.count,
    });
}

fn units_within_radius(arena: &Arena, cell: CellIndex, radius: u32) -> Vec<UnitUid> {
    arena
        .board
        .alive_units()
        .filter(|u| u.position.cells().iter().any(|&c| geo::distance(c, cell) <= radius))
        .map(|u| u.uid)
        .collect()
}

fn mass_targets(arena: &Arena, caster: Option<UnitUid>, polarity: SpellPolarity) -> Vec<UnitUid> {
    let caster_side = caster.and_then(|c| arena.board.unit(c)).map(|u| u.current_color);
    arena
        .board
        .alive_units()
        .filter(|u| match (polarity, caster_side) {
            (SpellPolarity::Friendly, Some(side)) => u.current_color == side,
            (SpellPolarity::Offensive, Some(side)) => u.current_color != side,
            _ => true,
        })
        .map(|u| u.uid)
        .collect()
}

/// Chain Lightning (distilled spec §4.6, §8 boundary scenario 3, §9's
/// named `isCrossSideSpellBypass`): iteratively picks the nearest
/// still-unvisited enemy, resistance rolled during selection, damage
/// halved each additional hop.
fn chain_lightning(
    arena: &mut Arena,
    spell: SpellId,
    def: &battle_data::SpellDef,
    start: UnitUid,
    max_hops: u32,
    outcome: &mut CommandOutcome,
) {
    let battle_data::SpellKind::Damage { min, max } = def.kind else {
        return;
    };
    let mut visited = vec![start];
    let mut current = start;
    let mut halvings = 0u32;

    loop {
        if arena.board.unit(current).is_none() {
            break;
        }
        if resist_roll(arena, current) {
            outcome.push(Effect::SpellResisted { spell, target: current });
        } else {
            let roll = arena.rng.next_range(min, max) as u64;
            let damage = roll >> halvings;
            apply_damage_to_unit(arena, current, damage, outcome);
        }

        if visited.len() as u32 >= max_hops {
            break;
        }
        let from_cell = arena.board.unit(current).map(|u| u.position.head);
        let Some(from_cell) = from_cell else { break };
        let next = arena
            .board
            .alive_units()
            .filter(|u| !visited.contains(&u.uid))
            .min_by_key(|u| geo::distance(from_cell, u.position.head));
        let Some(next_uid) = next.map(|u| u.uid) else { break };
        visited.push(next_uid);
        current = next_uid;
        halvings += 1;
    }
}

fn teleport(arena: &mut Arena, target_unit: Option<UnitUid>, target_cell: Option<CellIndex>, outcome: &mut CommandOutcome) -> Result<(), CommandError> {
    let uid = target_unit.ok_or(SpellError::MissingUnitTarget(SpellId(17))).map_err(CommandError::Spell)?;
    let dst = target_cell.ok_or(SpellError::MissingCellTarget(SpellId(17))).map_err(CommandError::Spell)?;
    if arena.board.is_blocked(dst, Some(uid)) {
        return Err(CommandError::Spell(SpellError::NoFreeSummonCell));
    }
    let from = arena.board.unit(uid).map(|u| u.position).ok_or(SpellError::MissingUnitTarget(SpellId(17))).map_err(CommandError::Spell)?;
    let new_position = Position::narrow(dst);
    arena.board.relocate_unit(uid, new_position);
    outcome.push(Effect::UnitMoved { unit: uid, from, to: new_position });
    Ok(())
}

fn earthquake(arena: &mut Arena, outcome: &mut CommandOutcome) {
    let statics = arena.statics;
    let structures = arena.structure_cells.clone();
    if structures.is_empty() {
        return;
    }
    for _ in 0..statics.earthquake_hits {
        let Some(idx) = arena.rng.random_index(structures.len()) else { break };
        let (structure, cell) = structures[idx];
        if structure == crate::siege::DefenseStructure::Bridge
            && arena.rng.roll_chance(statics.earthquake_bridge_miss_chance)
        {
            continue;
        }
        let roll = arena.rng.next_range(statics.earthquake_damage_min, statics.earthquake_damage_max);
        let (destroyed, _) = crate::siege::apply_hit(&mut arena.board, structure, cell, roll);
        outcome.push(Effect::CatapultHit {
            cell,
            structure: to_effect_structure(structure),
            destroyed,
        });
        if structure == crate::siege::DefenseStructure::Bridge {
            outcome.push(Effect::BridgeStateChanged { passable: arena.board.bridge.is_passable() });
        }
    }
}

fn to_effect_structure(s: crate::siege::DefenseStructure) -> battle_types::effect::SiegeStructure {
    use battle_types::effect::SiegeStructure as ES;
    match s {
        crate::siege::DefenseStructure::Wall(i) => ES::Wall(i),
        crate::siege::DefenseStructure::ArcherTower(i) => ES::Tower(i),
        crate::siege::DefenseStructure::CentralTower => ES::Tower(255),
        crate::siege::DefenseStructure::BridgeTower(i) => ES::Tower(100 + i),
        crate::siege::DefenseStructure::Bridge => ES::Bridge,
    }
}

fn mirror_image(arena: &mut Arena, target_unit: Option<UnitUid>, outcome: &mut CommandOutcome) -> Result<(), CommandError> {
    let original_uid = target_unit.ok_or(SpellError::MissingUnitTarget(SpellId(19))).map_err(CommandError::Spell)?;
    let original = arena
        .board
        .unit(original_uid)
        .cloned()
        .ok_or(SpellError::MissingUnitTarget(SpellId(19)))
        .map_err(CommandError::Spell)?;

    let max_range = arena.statics.mirror_image_max_range;
    let candidate = (0..geo::BOARD_SIZE)
        .map(CellIndex)
        .filter(|&c| geo::distance(original.position.head, c) <= max_range)
        .filter(|&c| !original.position.contains(c))
        .find(|&c| !arena.board.is_blocked(c, None));

    let Some(cell) = candidate else {
        return Err(CommandError::Spell(SpellError::NoFreeSummonCell));
    };

    let new_uid = fresh_uid(arena);
    let mut clone = original;
    clone.uid = new_uid;
    clone.position = Position::narrow(cell);
    clone.hit_points = 0;
    clone.count = 0;
    clone.modes.insert(UnitModes::MIRROR_IMAGE);
    clone.linked_unit = Some(original_uid);

    arena.board.insert_unit(clone);
    if let Some(owner) = arena.board.unit_mut(original_uid) {
        owner.modes.insert(UnitModes::MIRROR_OWNER);
        owner.linked_unit = Some(new_uid);
    }

    outcome.push(Effect::UnitSummoned { unit: new_uid, at: cell });
    Ok(())
}

fn summon_elemental(arena: &mut Arena, caster: Option<UnitUid>, outcome: &mut CommandOutcome) -> Result<(), CommandError> {
    let side = caster
        .and_then(|c| arena.board.unit(c))
        .map(|u| u.current_color)
        .unwrap_or(battle_types::unit::Side::Attacker);

    let candidate_cells: Vec<CellIndex> = match side {
        battle_types::unit::Side::Attacker => (0..3).map(|r| CellIndex(r * geo::BOARD_WIDTH)).collect(),
        battle_types::unit::Side::Defender => (0..3)
            .map(|r| CellIndex(r * geo::BOARD_WIDTH + geo::BOARD_WIDTH - 1))
            .collect(),
    };
    let Some(&cell) = candidate_cells.iter().find(|&&c| !arena.board.is_blocked(c, None)) else {
        return Err(CommandError::Spell(SpellError::NoFreeSummonCell));
    };

    let kind = battle_types::ids::UnitKindId(9); // fire elemental entry in the standard catalog
    let Some(kind_def) = arena.units_catalog.get(kind).cloned() else {
        return Err(CommandError::Spell(SpellError::NoFreeSummonCell));
    };

    let new_uid = fresh_uid(arena);
    let unit = Unit {
        uid: new_uid,
        kind,
        army_color: side,
        current_color: side,
        stats: kind_def.stats,
        count: 3,
        initial_count: 3,
        max_count: 3,
        hit_points: 3 * kind_def.stats.hit_points_per_fighter as u64,
        dead_count: 0,
        shots_left: kind_def.stats.max_shots,
        disrupting_rays_count: 0,
        reflected: false,
        position: Position::narrow(cell),
        facing: geo::Direction::Right,
        modes: UnitModes::empty(),
        durations: Vec::new(),
        linked_unit: None,
    };
    arena.board.insert_unit(unit);
    outcome.push(Effect::UnitSummoned { unit: new_uid, at: cell });
    Ok(())
}

fn fresh_uid(arena: &Arena) -> UnitUid {
    let max = arena.board.units().map(|u| u.uid.get()).max().unwrap_or(0);
    UnitUid(max + 1)
}
