//! Typed validation/execution errors (distilled spec §7), grounded in the
//! pack's thiserror usage (`trilltino-XFChess/crates/chess_engine`): one
//! small enum per concern, aggregated into `CommandError` at the dispatch
//! boundary so callers can match on either the specific cause or the
//! coarse `kind()` classification the distilled spec asks for.

use thiserror::Error;

use crate::ids::{CellIndex, SpellId, UnitUid};

/// The three-way classification the distilled spec's error-handling
/// section names: whether a command was simply inapplicable, whether it
/// reveals a broken engine invariant, or whether some finite resource
/// (moves, shots, charges) ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    LogicAssertion,
    ResourceExhausted,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("unit {0} is not on the board")]
    UnknownUnit(UnitUid),
    #[error("unit {0} has already acted this turn")]
    AlreadyActed(UnitUid),
    #[error("cell {0} is occupied")]
    CellOccupied(CellIndex),
    #[error("no path from current position to {0}")]
    Unreachable(CellIndex),
    #[error("unit {0} has no movement points left")]
    NoMovementLeft(UnitUid),
    #[error("target position is not structurally valid")]
    InvalidPosition,
}

impl MoveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MoveError::NoMovementLeft(_) => ErrorKind::ResourceExhausted,
            MoveError::InvalidPosition => ErrorKind::LogicAssertion,
            _ => ErrorKind::Invalid,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttackError {
    #[error("attacker {0} is not on the board")]
    UnknownAttacker(UnitUid),
    #[error("target {0} is not on the board")]
    UnknownTarget(UnitUid),
    #[error("attacker {0} has already acted this turn")]
    AlreadyActed(UnitUid),
    #[error("target {0} is not a valid enemy of the attacker")]
    NotAnEnemy(UnitUid),
    #[error("attacker {0} cannot reach melee range of the target")]
    OutOfMeleeRange(UnitUid),
    #[error("attacker {0} has no shots left")]
    NoShotsLeft(UnitUid),
    #[error("attacker {0} is blinded")]
    Blinded(UnitUid),
    #[error("a ranged unit cannot fire through an intervening castle wall")]
    BlockedByWall,
}

impl AttackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttackError::NoShotsLeft(_) => ErrorKind::ResourceExhausted,
            _ => ErrorKind::Invalid,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpellError {
    #[error("spell {0} is unknown")]
    UnknownSpell(SpellId),
    #[error("not enough spell points to cast {0}")]
    NotEnoughSpellPoints(SpellId),
    #[error("spell {0} has already been cast this turn")]
    AlreadyCastThisTurn(SpellId),
    #[error("spell {0} requires a unit target")]
    MissingUnitTarget(SpellId),
    #[error("spell {0} requires a cell target")]
    MissingCellTarget(SpellId),
    #[error("target resisted the spell")]
    Resisted,
    #[error("target is immune to {0}")]
    Immune(SpellId),
    #[error("no valid summon cell is free")]
    NoFreeSummonCell,
}

impl SpellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpellError::NotEnoughSpellPoints(_) => ErrorKind::ResourceExhausted,
            SpellError::Resisted | SpellError::Immune(_) => ErrorKind::LogicAssertion,
            _ => ErrorKind::Invalid,
        }
    }
}

/// The dispatch-level aggregate every `execute_*` function ultimately
/// returns through (distilled spec §6: "validate-before-apply, no partial
/// effects").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Attack(#[from] AttackError),
    #[error(transparent)]
    Spell(#[from] SpellError),
    #[error("it is not unit {0}'s turn to act")]
    NotThisUnitsTurn(UnitUid),
    #[error("the battle has already ended")]
    BattleAlreadyOver,
    #[error("catapult target cell {0} is not a valid siege target")]
    InvalidCatapultTarget(CellIndex),
    #[error("only the attacker may retreat or surrender")]
    RetreatNotAvailable,
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Move(e) => e.kind(),
            CommandError::Attack(e) => e.kind(),
            CommandError::Spell(e) => e.kind(),
            CommandError::BattleAlreadyOver => ErrorKind::LogicAssertion,
            _ => ErrorKind::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_exhausted_classification() {
        let e = MoveError::NoMovementLeft(UnitUid(1));
        assert_eq!(e.kind(), ErrorKind::ResourceExhausted);
    }

    #[test]
    fn command_error_wraps_and_preserves_kind() {
        let inner = AttackError::NoShotsLeft(UnitUid(2));
        let wrapped: CommandError = inner.clone().into();
        assert_eq!(wrapped.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(wrapped.to_string(), inner.to_string());
    }
}
