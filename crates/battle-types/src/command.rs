//! The closed command set (distilled spec §4.5). Every player- or
//! AI-issued action funnels through one of these variants; `battle-engine`
//! validates-then-applies with no partial effects.

use serde::{Deserialize, Serialize};

use crate::ids::{CellIndex, SpellId, UnitUid};
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackFrom {
    /// Melee: attacker must end up adjacent to the target.
    Melee(Position),
    /// Ranged: attacker stays where it is and shoots.
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Move `unit` along a path ending at `target`.
    Move { unit: UnitUid, target: Position },

    /// `unit` attacks `target`, optionally repositioning first for melee.
    Attack {
        unit: UnitUid,
        target: UnitUid,
        from: AttackFrom,
    },

    /// Cast a spell. `caster` is `None` for a hero-cast spell not bound to
    /// any unit on the board (the usual case); `Some` for a unit's
    /// built-in spell firing outside the normal attack hook (rare, kept
    /// for symmetry with the dispatch table).
    Spellcast {
        caster: Option<UnitUid>,
        spell: SpellId,
        target_unit: Option<UnitUid>,
        target_cell: Option<CellIndex>,
    },

    /// Acknowledge a good-morale extra action, or a bad-morale forced skip.
    Morale { unit: UnitUid, act_again: bool },

    /// Attacker's catapult fires at a pre-rolled wall/tower/bridge target.
    Catapult { target_cell: CellIndex },

    /// Defender's battlement towers fire automatically; this command
    /// records the outcome for replay rather than being player-issued.
    Tower { tower_index: u8, target: UnitUid },

    Retreat,
    Surrender,

    /// Pass this unit's turn without acting.
    Skip { unit: UnitUid },

    ToggleAutoCombat,
    QuickCombat,
}

impl Command {
    /// Stable byte encoding folded into the RNG stream so replay parity
    /// holds regardless of which subsystem produced the command
    /// (distilled spec §4.4, §6).
    pub fn fold_key(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn acting_unit(&self) -> Option<UnitUid> {
        match self {
            Command::Move { unit, .. } => Some(*unit),
            Command::Attack { unit, .. } => Some(*unit),
            Command::Spellcast { caster, .. } => *caster,
            Command::Morale { unit, .. } => Some(*unit),
            Command::Skip { unit } => Some(*unit),
            Command::Tower { target, .. } => Some(*target),
            Command::Catapult { .. }
            | Command::Retreat
            | Command::Surrender
            | Command::ToggleAutoCombat
            | Command::QuickCombat => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CellIndex;

    #[test]
    fn fold_key_is_stable_for_identical_commands() {
        let a = Command::Move {
            unit: UnitUid(3),
            target: Position::narrow(CellIndex(12)),
        };
        let b = Command::Move {
            unit: UnitUid(3),
            target: Position::narrow(CellIndex(12)),
        };
        assert_eq!(a.fold_key(), b.fold_key());
    }

    #[test]
    fn fold_key_differs_for_different_commands() {
        let a = Command::Skip {
            unit: UnitUid(1),
        };
        let b = Command::Skip {
            unit: UnitUid(2),
        };
        assert_ne!(a.fold_key(), b.fold_key());
    }

    #[test]
    fn acting_unit_matches_variant() {
        let c = Command::Retreat;
        assert_eq!(c.acting_unit(), None);
        let c = Command::Skip { unit: UnitUid(9) };
        assert_eq!(c.acting_unit(), Some(UnitUid(9)));
    }
}
