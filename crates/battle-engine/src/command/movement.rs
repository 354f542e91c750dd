//! Move and Skip (distilled spec §4.5 "Move(uid, dst)").

use battle_types::board::GATES_INDEX;
use battle_types::error::{CommandError, MoveError};
use battle_types::ids::UnitUid;
use battle_types::position::Position;
use battle_types::result::CommandOutcome;
use battle_types::unit::UnitModes;
use battle_types::effect::Effect;

use crate::arena::Arena;
use crate::observer::BattleObserver;
use crate::pathfinder::Pathfinder;

pub fn execute(
    arena: &mut Arena,
    uid: UnitUid,
    target: Position,
    observer: Option<&mut dyn BattleObserver>,
) -> Result<CommandOutcome, CommandError> {
    let unit = arena
        .board
        .unit(uid)
        .ok_or(MoveError::UnknownUnit(uid))
        .map_err(CommandError::Move)?;
    if !unit.is_alive() {
        return Err(CommandError::Move(MoveError::UnknownUnit(uid)));
    }
    if unit.modes.contains(UnitModes::MOVED) {
        return Err(CommandError::Move(MoveError::AlreadyActed(uid)));
    }
    if unit.stats.speed == 0 {
        return Err(CommandError::Move(MoveError::NoMovementLeft(uid)));
    }
    if !target.is_structurally_valid() {
        return Err(CommandError::Move(MoveError::InvalidPosition));
    }
    for cell in target.cells() {
        if arena.board.is_blocked(cell, Some(uid)) {
            return Err(CommandError::Move(MoveError::CellOccupied(cell)));
        }
    }

    let mut pathfinder = Pathfinder::new();
    pathfinder.ensure_built(&arena.board, unit);
    if !unit.is_flying() && !pathfinder.is_reachable_this_turn(target) {
        return Err(CommandError::Move(MoveError::Unreachable(target.head)));
    }

    let from = unit.position;
    let mut outcome = CommandOutcome::default();

    arena.board.relocate_unit(uid, target);
    if let Some(u) = arena.board.unit_mut(uid) {
        u.set_mode(UnitModes::MOVED, None);
    }
    outcome.push(Effect::UnitMoved { unit: uid, from, to: target });

    update_bridge_on_move(arena, from, target);

    if let Some(obs) = observer {
        for cell in target.cells() {
            obs.on_move_step(uid, cell);
        }
    }

    Ok(outcome)
}

fn update_bridge_on_move(arena: &mut Arena, from: Position, to: Position) {
    if arena.board.bridge.destroyed {
        return;
    }
    let entering_gate = to.contains(GATES_INDEX) && !from.contains(GATES_INDEX);
    let leaving_gate = from.contains(GATES_INDEX) && !to.contains(GATES_INDEX);
    if entering_gate {
        arena.board.bridge.down = true;
    } else if leaving_gate && !arena.board.is_blocked(GATES_INDEX, None) {
        arena.board.bridge.down = false;
    }
}

pub fn skip(arena: &mut Arena, uid: UnitUid) -> Result<CommandOutcome, CommandError> {
    let unit = arena
        .board
        .unit_mut(uid)
        .ok_or(MoveError::UnknownUnit(uid))
        .map_err(CommandError::Move)?;
    unit.set_mode(UnitModes::MOVED, None);
    unit.set_mode(UnitModes::SKIP, None);
    Ok(CommandOutcome::default())
}
