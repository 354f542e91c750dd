//! Headless battle driver: runs N battles between two rosters at a given
//! seed and prints the terminal result of each, for manual verification
//! and scripted regression of the battle core.

use std::env;

use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
use battle_engine::ai;
use battle_engine::siege::DefenseStructure;
use battle_engine::{Arena, ArenaConfig, ControlMode};
use battle_types::board::{BOARD_SIZE, BOARD_WIDTH};
use battle_types::command::Command;
use battle_types::ids::{BattleId, CellIndex, UnitKindId, UnitUid};
use battle_types::position::Position;
use battle_types::result::BattleOutcome;
use battle_types::unit::{Side, Unit, UnitModes};

const MAX_TURNS: u32 = 300;

struct CliArgs {
    seed: u32,
    battles: u32,
    has_castle: bool,
    fortified: bool,
    attacker_roster: Vec<(UnitKindId, u32)>,
    defender_roster: Vec<(UnitKindId, u32)>,
}

fn default_roster() -> Vec<(UnitKindId, u32)> {
    vec![(UnitKindId(0), 20), (UnitKindId(1), 10), (UnitKindId(3), 5)]
}

fn parse_roster(spec: &str) -> Vec<(UnitKindId, u32)> {
    spec.split(',')
        .filter_map(|entry| {
            let (kind, count) = entry.split_once(':')?;
            let kind: u16 = kind.trim().parse().ok()?;
            let count: u32 = count.trim().parse().ok()?;
            Some((UnitKindId(kind), count))
        })
        .collect()
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = env::args().collect();
    let mut seed = 42u32;
    let mut battles = 1u32;
    let mut has_castle = false;
    let mut fortified = false;
    let mut attacker_roster = None;
    let mut defender_roster = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    seed = v.parse().unwrap_or(seed);
                }
            }
            "--battles" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    battles = v.parse().unwrap_or(battles);
                }
            }
            "--castle" => has_castle = true,
            "--fortified" => {
                has_castle = true;
                fortified = true;
            }
            "--attacker" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    attacker_roster = Some(parse_roster(v));
                }
            }
            "--defender" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    defender_roster = Some(parse_roster(v));
                }
            }
            _ => {}
        }
        i += 1;
    }

    CliArgs {
        seed,
        battles,
        has_castle,
        fortified,
        attacker_roster: attacker_roster.unwrap_or_else(default_roster),
        defender_roster: defender_roster.unwrap_or_else(default_roster),
    }
}

fn spawn_side(arena: &mut Arena, roster: &[(UnitKindId, u32)], side: Side, next_uid: &mut u32) {
    let column = match side {
        Side::Attacker => 0u8,
        Side::Defender => BOARD_WIDTH - 1,
    };
    for (row, (kind_id, count)) in roster.iter().enumerate() {
        let Some(def) = arena.units_catalog.get(*kind_id).cloned() else {
            continue;
        };
        let cell = (row as u8 + 1) * BOARD_WIDTH + column;
        if cell as u16 >= BOARD_SIZE as u16 {
            continue;
        }
        let uid = UnitUid(*next_uid);
        *next_uid += 1;
        let hit_points = *count as u64 * def.stats.hit_points_per_fighter as u64;
        let unit = Unit {
            uid,
            kind: *kind_id,
            army_color: side,
            current_color: side,
            stats: def.stats,
            count: *count,
            initial_count: *count,
            max_count: *count,
            hit_points,
            dead_count: 0,
            shots_left: def.stats.max_shots,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(cell)),
            facing: if side == Side::Attacker {
                battle_types::board::Direction::Right
            } else {
                battle_types::board::Direction::Left
            },
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        };
        arena.board.insert_unit(unit);
    }
}

/// Defender towers fire automatically at the attacker's strongest alive
/// unit once per turn; the catapult answers in kind for the attacker.
fn run_siege_subsystems(arena: &mut Arena) {
    if !arena.config.has_castle {
        return;
    }
    if let Some(target) = arena
        .board
        .alive_units()
        .filter(|u| u.current_color == Side::Attacker)
        .max_by_key(|u| u.count)
        .map(|u| u.uid)
    {
        let tower_indices: Vec<u8> = arena
            .structure_cells
            .iter()
            .filter_map(|&(s, _)| match s {
                DefenseStructure::ArcherTower(i) => Some(i),
                DefenseStructure::CentralTower => Some(255),
                _ => None,
            })
            .collect();
        for tower_index in tower_indices {
            let _ = arena.apply_command(
                Command::Tower {
                    tower_index,
                    target,
                },
                None,
            );
        }
    }

    if let Some(&(_, cell)) = arena.structure_cells.first() {
        let _ = arena.apply_command(Command::Catapult { target_cell: cell }, None);
    }
}

fn run_battle(args: &CliArgs, seed: u32, catalog: &UnitCatalog, spells: &SpellCatalog) -> BattleOutcome {
    let config = ArenaConfig {
        has_castle: args.has_castle,
        fortified: args.fortified,
        attacker_control: ControlMode::Ai,
        defender_control: ControlMode::Ai,
        seed,
    };
    let mut arena = Arena::new(BattleId(seed as u64), config, BattleStatics::default(), catalog.clone(), spells.clone());

    let mut next_uid = 1u32;
    spawn_side(&mut arena, &args.attacker_roster, Side::Attacker, &mut next_uid);
    spawn_side(&mut arena, &args.defender_roster, Side::Defender, &mut next_uid);

    while !arena.is_over() && arena.turn < MAX_TURNS {
        arena.begin_turn();
        run_siege_subsystems(&mut arena);

        loop {
            if arena.is_over() {
                break;
            }
            let pending = arena.pending_actors();
            let Some(uid) = pending.into_iter().next() else {
                break;
            };
            let Some(side) = arena.board.unit(uid).map(|u| u.current_color) else {
                continue;
            };
            let snapshot = ai::build_snapshot(&arena, side, None);
            if ai::should_end_battle(&snapshot, &arena) {
                let outcome = if side == Side::Attacker {
                    BattleOutcome::Retreat(Side::Attacker)
                } else {
                    BattleOutcome::Surrender(Side::Defender)
                };
                arena.outcome = Some(outcome);
                break;
            }

            let cmd = ai::plan_unit_turn(&arena, uid, &snapshot);
            if let Err(err) = arena.apply_command(cmd, None) {
                tracing::warn!(unit = %uid, error = %err, "planner command rejected, skipping unit");
                let _ = arena.apply_command(Command::Skip { unit: uid }, None);
            }
            if arena.is_over() {
                break;
            }
        }
    }

    arena.outcome.unwrap_or(BattleOutcome::Draw)
}

fn describe(outcome: &BattleOutcome) -> String {
    match outcome {
        BattleOutcome::Victory(side) => format!("Victory: {side:?}"),
        BattleOutcome::Retreat(side) => format!("Retreat: {side:?}"),
        BattleOutcome::Surrender(side) => format!("Surrender: {side:?}"),
        BattleOutcome::Draw => "Draw".to_string(),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = parse_args();
    let catalog = UnitCatalog::standard();
    let spells = SpellCatalog::standard();

    println!("battle-cli: {} battle(s), base seed {}", args.battles, args.seed);

    let mut attacker_wins = 0u32;
    let mut defender_wins = 0u32;
    let mut other = 0u32;

    for i in 0..args.battles {
        let seed = args.seed.wrapping_add(i);
        let outcome = run_battle(&args, seed, &catalog, &spells);
        println!("  battle {} (seed {}): {}", i + 1, seed, describe(&outcome));
        match outcome {
            BattleOutcome::Victory(Side::Attacker) => attacker_wins += 1,
            BattleOutcome::Victory(Side::Defender) => defender_wins += 1,
            _ => other += 1,
        }
    }

    println!(
        "\nsummary: attacker {attacker_wins}, defender {defender_wins}, other {other} (of {})",
        args.battles
    );
}
