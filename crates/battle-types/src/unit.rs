//! Unit stats, dynamic state, and mode/duration tracking.
//!
//! Mode durations follow the teacher's packed-bitflags-plus-sidecar-vector
//! pattern (`mk-types::state::PlayerFlags` for the booleans, ModifierDuration
//! style vectors for the countdowns): a single bitmask says *which* modes
//! are active, while a small vector pairs the timed ones with their
//! remaining duration so decrementing at turn start is one pass over a
//! handful of entries rather than a branch per possible mode.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::ids::{SpellId, UnitKindId, UnitUid};
use crate::position::Position;

/// Which original army a unit was fielded by — distinct from
/// `current_color`, which can diverge under Hypnotize/Berserker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Elemental affinity/weakness axis used by ability damage bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Ice,
    Undead,
}

bitflags! {
    /// Fixed abilities a unit kind is born with (distilled spec §3, §4.5, §4.6).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UnitAbilities: u32 {
        const FLYING                 = 1 << 0;
        const DOUBLE_ATTACK          = 1 << 1;
        const UNLIMITED_RETALIATION  = 1 << 2;
        /// Attacks the defender's cell and the cell directly behind it.
        const TWO_HEX_ATTACK         = 1 << 3;
        /// Sweep: melee attack hits every adjacent enemy at once.
        const ALL_AROUND_ATTACK      = 1 << 4;
        /// Cloud shooter: a ranged shot hits every cell adjacent to the target too.
        const CLOUD_ATTACK           = 1 << 5;
        const UNDEAD                 = 1 << 6;
        /// Double damage against `UNDEAD` defenders.
        const UNDEAD_BANE            = 1 << 7;
        /// Ranged unit is not halved in damage when fighting in melee.
        const NO_MELEE_PENALTY       = 1 << 8;
        const IGNORES_RETALIATION    = 1 << 9;
    }
}

/// A unit kind's resolved combat stats (kind + commander bonuses already
/// folded in by `battle-data`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub attack: i32,
    pub defense: i32,
    pub damage_min: u32,
    pub damage_max: u32,
    pub hit_points_per_fighter: u32,
    pub speed: u32,
    pub max_shots: u32,
    pub abilities: UnitAbilities,
    pub affinity: Option<Element>,
    pub weakness: Option<Element>,
    /// Built-in single-target side-effect spell cast on attack: (spell, probability).
    pub built_in_spell: Option<(SpellId, f64)>,
    /// Spell-family resistance, 0..=100, keyed by a small fixed set of families.
    pub magic_resistance_percent: u8,
    /// Recruitment/maintenance cost, used by the surrender-affordability check.
    pub cost_per_fighter: u32,
}

bitflags! {
    /// Dynamic mode flags (distilled spec §3). Timed ones additionally get
    /// an entry in `Unit::durations`; the untimed ones (`TOWER`,
    /// `MIRROR_OWNER`/`MIRROR_IMAGE` linkage, and the per-turn transients)
    /// are cleared directly by the arena rather than decremented.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UnitModes: u32 {
        const BLESS          = 1 << 0;
        const CURSE          = 1 << 1;
        const HASTE          = 1 << 2;
        const SLOW           = 1 << 3;
        const BLOODLUST      = 1 << 4;
        const SHIELD         = 1 << 5;
        const STONE_SKIN     = 1 << 6;
        const STEEL_SKIN     = 1 << 7;
        const BLIND          = 1 << 8;
        const PARALYZE       = 1 << 9;
        const STONE          = 1 << 10;
        const DRAGON_SLAYER  = 1 << 11;
        const ANTI_MAGIC     = 1 << 12;
        const BERSERKER      = 1 << 13;
        const HYPNOTIZE      = 1 << 14;
        const MIRROR_OWNER   = 1 << 15;
        const MIRROR_IMAGE   = 1 << 16;
        const TOWER          = 1 << 17;

        // Transient, reset every turn (distilled spec §4.4 step 1).
        const MOVED          = 1 << 18;
        const SKIP           = 1 << 19;
        const RETALIATED     = 1 << 20;
        const MORALE_GOOD    = 1 << 21;
        const MORALE_BAD     = 1 << 22;
        const LUCK_GOOD      = 1 << 23;
        const LUCK_BAD       = 1 << 24;
    }
}

impl UnitModes {
    /// Flags cleared at the start of every unit's new turn.
    pub const TRANSIENT: UnitModes = UnitModes::from_bits_truncate(
        UnitModes::MOVED.bits()
            | UnitModes::SKIP.bits()
            | UnitModes::RETALIATED.bits()
            | UnitModes::MORALE_GOOD.bits()
            | UnitModes::MORALE_BAD.bits()
            | UnitModes::LUCK_GOOD.bits()
            | UnitModes::LUCK_BAD.bits(),
    );

    /// Modes that carry a countdown in `Unit::durations` when finite.
    pub const TIMED: UnitModes = UnitModes::from_bits_truncate(
        UnitModes::BLESS.bits()
            | UnitModes::CURSE.bits()
            | UnitModes::HASTE.bits()
            | UnitModes::SLOW.bits()
            | UnitModes::BLOODLUST.bits()
            | UnitModes::SHIELD.bits()
            | UnitModes::STONE_SKIN.bits()
            | UnitModes::STEEL_SKIN.bits()
            | UnitModes::BLIND.bits()
            | UnitModes::PARALYZE.bits()
            | UnitModes::STONE.bits()
            | UnitModes::DRAGON_SLAYER.bits()
            | UnitModes::ANTI_MAGIC.bits()
            | UnitModes::HYPNOTIZE.bits(),
    );
}

/// A single timed mode's remaining duration. `turns_left == 0` means
/// permanent-until-dispelled (distilled spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDuration {
    pub mode: UnitModes,
    pub turns_left: u16,
}

/// A single fighting unit (a "stack"), live on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub uid: UnitUid,
    pub kind: UnitKindId,
    pub army_color: Side,
    pub current_color: Side,
    pub stats: UnitStats,

    pub count: u32,
    pub initial_count: u32,
    pub max_count: u32,
    pub hit_points: u64,
    pub dead_count: u32,
    pub shots_left: u32,
    pub disrupting_rays_count: u32,
    pub reflected: bool,
    pub position: Position,
    pub facing: Direction,

    pub modes: UnitModes,
    pub durations: Vec<ModeDuration>,

    /// Set when this unit is a Mirror Image or has one; the two share fate.
    pub linked_unit: Option<UnitUid>,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.count > 0 && self.hit_points > 0
    }

    pub fn is_wide(&self) -> bool {
        self.position.is_wide()
    }

    pub fn is_flying(&self) -> bool {
        self.stats.abilities.contains(UnitAbilities::FLYING)
    }

    pub fn is_tower(&self) -> bool {
        self.modes.contains(UnitModes::TOWER)
    }

    pub fn is_shooter(&self) -> bool {
        self.stats.max_shots > 0
    }

    pub fn can_shoot(&self) -> bool {
        self.is_shooter() && self.shots_left > 0 && !self.modes.contains(UnitModes::BLIND)
    }

    /// Count recomputed from remaining HP: `ceil(hp / per_fighter_hp)`
    /// (distilled spec §3 invariant), used after damage/healing.
    pub fn recompute_count(&mut self) {
        if self.hit_points == 0 {
            self.count = 0;
            return;
        }
        let per = self.stats.hit_points_per_fighter.max(1) as u64;
        self.count = ((self.hit_points + per - 1) / per) as u32;
    }

    pub fn total_hit_points_capacity(&self) -> u64 {
        self.max_count as u64 * self.stats.hit_points_per_fighter as u64
    }

    pub fn set_mode(&mut self, mode: UnitModes, duration_turns: Option<u16>) {
        self.modes.insert(mode);
        if UnitModes::TIMED.intersects(mode) {
            self.durations.retain(|d| !mode.intersects(d.mode));
            self.durations.push(ModeDuration {
                mode,
                turns_left: duration_turns.unwrap_or(0),
            });
        }
    }

    pub fn clear_mode(&mut self, mode: UnitModes) {
        self.modes.remove(mode);
        self.durations.retain(|d| !mode.intersects(d.mode));
    }

    /// Decrement every timed mode by one turn, removing any that expire.
    /// Called once per owner's new turn (distilled spec §4.4 step 1).
    pub fn tick_durations(&mut self) {
        let mut expired = UnitModes::empty();
        self.durations.retain_mut(|d| {
            if d.turns_left == 0 {
                return true; // permanent until dispelled
            }
            d.turns_left -= 1;
            if d.turns_left == 0 {
                expired.insert(d.mode);
                false
            } else {
                true
            }
        });
        self.modes.remove(expired);
    }

    pub fn reset_turn_flags(&mut self) {
        self.modes.remove(UnitModes::TRANSIENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CellIndex;

    fn sample_unit() -> Unit {
        Unit {
            uid: UnitUid(1),
            kind: UnitKindId(0),
            army_color: Side::Attacker,
            current_color: Side::Attacker,
            stats: UnitStats {
                attack: 5,
                defense: 5,
                damage_min: 2,
                damage_max: 3,
                hit_points_per_fighter: 10,
                speed: 5,
                max_shots: 0,
                abilities: UnitAbilities::empty(),
                affinity: None,
                weakness: None,
                built_in_spell: None,
                magic_resistance_percent: 0,
                cost_per_fighter: 50,
            },
            count: 10,
            initial_count: 10,
            max_count: 10,
            hit_points: 100,
            dead_count: 0,
            shots_left: 0,
            disrupting_rays_count: 0,
            reflected: false,
            position: Position::narrow(CellIndex(10)),
            facing: Direction::Right,
            modes: UnitModes::empty(),
            durations: Vec::new(),
            linked_unit: None,
        }
    }

    #[test]
    fn recompute_count_rounds_up() {
        let mut u = sample_unit();
        u.hit_points = 91;
        u.recompute_count();
        assert_eq!(u.count, 10);
        u.hit_points = 90;
        u.recompute_count();
        assert_eq!(u.count, 9);
    }

    #[test]
    fn tick_durations_expires_at_zero() {
        let mut u = sample_unit();
        u.set_mode(UnitModes::BLESS, Some(1));
        assert!(u.modes.contains(UnitModes::BLESS));
        u.tick_durations();
        assert!(!u.modes.contains(UnitModes::BLESS));
        assert!(u.durations.is_empty());
    }

    #[test]
    fn permanent_mode_never_expires() {
        let mut u = sample_unit();
        u.set_mode(UnitModes::CURSE, Some(0));
        for _ in 0..50 {
            u.tick_durations();
        }
        assert!(u.modes.contains(UnitModes::CURSE));
    }

    #[test]
    fn reset_turn_flags_clears_only_transient() {
        let mut u = sample_unit();
        u.set_mode(UnitModes::HASTE, Some(3));
        u.modes.insert(UnitModes::MOVED);
        u.reset_turn_flags();
        assert!(!u.modes.contains(UnitModes::MOVED));
        assert!(u.modes.contains(UnitModes::HASTE));
    }
}
