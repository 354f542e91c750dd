//! Command application results and battle-ending outcomes.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::unit::Side;

/// Everything a single successfully-applied command produced, in order.
/// `battle-engine::command::execute` returns this on success; callers fold
/// `effects` into their own log and/or forward them to an observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub effects: Vec<Effect>,
}

impl CommandOutcome {
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn extend(&mut self, other: CommandOutcome) {
        self.effects.extend(other.effects);
    }
}

/// How a finished battle ended (distilled spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory(Side),
    Retreat(Side),
    Surrender(Side),
    /// Both sides wiped in the same resolution step (e.g. mutual Berserk).
    Draw,
}

impl BattleOutcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            BattleOutcome::Victory(side) => Some(side),
            BattleOutcome::Retreat(side) | BattleOutcome::Surrender(side) => {
                Some(side.opposite())
            }
            BattleOutcome::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retreat_winner_is_the_other_side() {
        let outcome = BattleOutcome::Retreat(Side::Attacker);
        assert_eq!(outcome.winner(), Some(Side::Defender));
    }

    #[test]
    fn draw_has_no_winner() {
        assert_eq!(BattleOutcome::Draw.winner(), None);
    }
}
