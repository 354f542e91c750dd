//! Resolved effects — the fine-grained record of what a command actually
//! did, emitted for the replay log and for any attached observer
//! (distilled spec §6's visual-effects hook). One `Command` application
//! produces zero or more `Effect`s; the log is the authoritative replay
//! trace, the observer is a best-effort side channel for presentation.

use serde::{Deserialize, Serialize};

use crate::ids::{CellIndex, SpellId, UnitUid};
use crate::position::Position;
use crate::unit::UnitModes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiegeStructure {
    Wall(u8),
    Tower(u8),
    Bridge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    UnitMoved {
        unit: UnitUid,
        from: Position,
        to: Position,
    },
    Damage {
        source: Option<UnitUid>,
        target: UnitUid,
        amount: u64,
        killed_count: u32,
    },
    Retaliation {
        attacker: UnitUid,
        defender: UnitUid,
    },
    ModeApplied {
        target: UnitUid,
        mode: UnitModes,
        duration_turns: u16,
    },
    ModeRemoved {
        target: UnitUid,
        mode: UnitModes,
    },
    UnitResurrected {
        unit: UnitUid,
        count: u32,
    },
    UnitSummoned {
        unit: UnitUid,
        at: CellIndex,
    },
    UnitRemoved {
        unit: UnitUid,
    },
    MoraleTriggered {
        unit: UnitUid,
        good: bool,
    },
    LuckTriggered {
        unit: UnitUid,
        good: bool,
    },
    SpellResisted {
        spell: SpellId,
        target: UnitUid,
    },
    SpellCast {
        spell: SpellId,
        caster: Option<UnitUid>,
    },
    CatapultHit {
        cell: CellIndex,
        structure: SiegeStructure,
        destroyed: bool,
    },
    BridgeStateChanged {
        passable: bool,
    },
    Retreated {
        side: crate::unit::Side,
    },
    Surrendered {
        side: crate::unit::Side,
    },
}
