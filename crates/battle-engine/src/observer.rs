//! The visual-effects hook (distilled spec §6): invoked at fixed
//! checkpoints (pre/post attack, spell parts 1/2, move path, bridge
//! transitions). Modeled as `Option<&mut dyn BattleObserver>` rather than
//! a registered callback table — in headless mode the option is `None`
//! and the arena drives bridge/tower state machines directly, at zero
//! cost, matching the teacher's direct-struct-plus-free-functions style
//! over a trait-object registry.

use battle_types::effect::Effect;
use battle_types::ids::UnitUid;

pub trait BattleObserver {
    fn on_pre_attack(&mut self, _attacker: UnitUid, _defender: UnitUid) {}
    fn on_post_attack(&mut self, _attacker: UnitUid, _defender: UnitUid) {}
    fn on_spell_cast_begin(&mut self, _spell: battle_types::ids::SpellId) {}
    fn on_spell_cast_end(&mut self, _spell: battle_types::ids::SpellId) {}
    fn on_move_step(&mut self, _unit: UnitUid, _cell: battle_types::ids::CellIndex) {}
    fn on_bridge_state_changed(&mut self, _passable: bool) {}
    fn on_effect(&mut self, _effect: &Effect) {}
}

/// A no-op observer for headless/test runs, so call sites can take
/// `&mut dyn BattleObserver` unconditionally when no host is attached.
#[derive(Debug, Default)]
pub struct NullObserver;

impl BattleObserver for NullObserver {}
