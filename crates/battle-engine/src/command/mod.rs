//! Command dispatch: the single `execute` entry point every `Command`
//! variant funnels through. Each submodule owns one variant's
//! validate-then-apply pair; `execute` only routes and aggregates
//! (distilled spec §4.5).

mod attack;
mod catapult;
mod morale;
mod movement;
mod retreat;
mod spellcast;
mod tower;

use battle_types::command::Command;
use battle_types::error::CommandError;
use battle_types::result::CommandOutcome;

pub(crate) use spellcast::spellcast_builtin;

use crate::arena::Arena;
use crate::observer::BattleObserver;

pub fn execute(
    arena: &mut Arena,
    cmd: &Command,
    observer: Option<&mut dyn BattleObserver>,
) -> Result<CommandOutcome, CommandError> {
    match cmd {
        Command::Move { unit, target } => movement::execute(arena, *unit, *target, observer),
        Command::Attack { unit, target, from } => attack::execute(arena, *unit, *target, *from, observer),
        Command::Spellcast {
            caster,
            spell,
            target_unit,
            target_cell,
        } => spellcast::execute(arena, *caster, *spell, *target_unit, *target_cell, observer),
        Command::Morale { unit, act_again } => morale::execute(arena, *unit, *act_again),
        Command::Catapult { target_cell } => catapult::execute(arena, *target_cell),
        Command::Tower { tower_index, target } => tower::execute(arena, *tower_index, *target),
        Command::Retreat => retreat::retreat(arena),
        Command::Surrender => retreat::surrender(arena),
        Command::Skip { unit } => movement::skip(arena, *unit),
        Command::ToggleAutoCombat => Ok(CommandOutcome::default()),
        Command::QuickCombat => Ok(CommandOutcome::default()),
    }
}
