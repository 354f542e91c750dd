//! The Arena: sole mutator of Board/Units/Bridge/Towers/Catapult/Graveyard
//! (distilled spec §5). Orchestrates turn order, dispatches commands, and
//! runs the per-side automatic subsystems. Passed by reference through
//! every call rather than reached for as a singleton (distilled spec §9's
//! "Global singletons" redesign note).

use battle_data::{BattleStatics, SpellCatalog, UnitCatalog};
use battle_types::command::Command;
use battle_types::error::CommandError;
use battle_types::ids::{BattleId, UnitUid};
use battle_types::result::{BattleOutcome, CommandOutcome};
use battle_types::rng::BattleRng;
use battle_types::unit::{Side, UnitModes};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::command;
use crate::graveyard::Graveyard;
use crate::log::CommandLog;
use crate::observer::BattleObserver;
use crate::siege;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    Human,
    Ai,
    AutoCombat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub has_castle: bool,
    pub fortified: bool,
    pub attacker_control: ControlMode,
    pub defender_control: ControlMode,
    pub seed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    pub attacker_xp: u64,
    pub defender_xp: u64,
    pub necromancy_dead_count: u32,
    pub used_spells: Vec<battle_types::ids::SpellId>,
}

pub struct Arena {
    pub id: BattleId,
    pub board: Board,
    pub graveyard: Graveyard,
    pub rng: BattleRng,
    pub statics: BattleStatics,
    pub units_catalog: UnitCatalog,
    pub spells_catalog: SpellCatalog,
    pub config: ArenaConfig,
    pub log: CommandLog,
    pub turn: u32,
    pub turns_since_death: u32,
    pub outcome: Option<BattleOutcome>,
    pub used_spells: Vec<battle_types::ids::SpellId>,
    pub structure_cells: Vec<(siege::DefenseStructure, battle_types::ids::CellIndex)>,
    pub(crate) catapult_shots_fired_this_turn: bool,
    pub(crate) towers_fired_this_turn: bool,
}

impl Arena {
    pub fn new(
        id: BattleId,
        config: ArenaConfig,
        statics: BattleStatics,
        units_catalog: UnitCatalog,
        spells_catalog: SpellCatalog,
    ) -> Self {
        let mut board = Board::new(config.has_castle);
        let structure_cells = if config.has_castle {
            siege::initialize_structures(&mut board, config.fortified)
        } else {
            Vec::new()
        };
        Self {
            id,
            board,
            graveyard: Graveyard::new(),
            rng: BattleRng::new(config.seed),
            statics,
            units_catalog,
            spells_catalog,
            config,
            log: CommandLog::new(),
            turn: 0,
            turns_since_death: 0,
            outcome: None,
            used_spells: Vec::new(),
            structure_cells,
            catapult_shots_fired_this_turn: false,
            towers_fired_this_turn: false,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn control_of(&self, side: Side) -> ControlMode {
        match side {
            Side::Attacker => self.config.attacker_control,
            Side::Defender => self.config.defender_control,
        }
    }

    /// Apply one command end-to-end: validate, execute, remove the dead,
    /// fold the command into the RNG stream, append to the log, and check
    /// for battle termination. No partial effects on failure (distilled
    /// spec §4.5, §5).
    pub fn apply_command(
        &mut self,
        cmd: Command,
        observer: Option<&mut dyn BattleObserver>,
    ) -> Result<CommandOutcome, CommandError> {
        if self.is_over() {
            return Err(CommandError::BattleAlreadyOver);
        }

        let outcome = command::execute(self, &cmd, observer)?;

        self.rng.fold_bytes(&cmd.fold_key());
        self.log.record(self.id, self.turn, &cmd);
        self.reap_dead();
        self.check_termination();

        Ok(outcome)
    }

    /// Remove dead units from the board into the graveyard (distilled
    /// spec §4.4 step: "Remove dead units from the board").
    fn reap_dead(&mut self) {
        let dead: Vec<UnitUid> = self.board.units().filter(|u| !u.is_alive()).map(|u| u.uid).collect();
        for uid in dead {
            self.kill_unit(uid);
        }
    }

    pub(crate) fn kill_unit(&mut self, uid: UnitUid) {
        let Some(unit) = self.board.remove_unit(uid) else {
            return;
        };
        self.turns_since_death = 0;

        let is_tower = unit.modes.contains(UnitModes::TOWER);
        let is_mirror_image = unit.modes.contains(UnitModes::MIRROR_IMAGE);
        let is_mirror_owner = unit.modes.contains(UnitModes::MIRROR_OWNER);

        if !is_tower && !is_mirror_image {
            for cell in unit.position.cells() {
                self.graveyard.bury(
                    cell,
                    crate::graveyard::FallenUnit {
                        uid: unit.uid,
                        kind: unit.kind,
                        side: unit.army_color,
                        count: unit.initial_count,
                    },
                );
            }
        }

        if let Some(linked) = unit.linked_unit {
            if is_mirror_owner || is_mirror_image {
                if let Some(other) = self.board.unit_mut(linked) {
                    other.clear_mode(UnitModes::MIRROR_OWNER);
                    other.clear_mode(UnitModes::MIRROR_IMAGE);
                }
                self.board.remove_unit(linked);
            }
        }
    }

    fn check_termination(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let attacker_alive = self.board.alive_units().any(|u| u.army_color == Side::Attacker);
        let defender_alive = self.board.alive_units().any(|u| u.army_color == Side::Defender);
        if !attacker_alive && !defender_alive {
            self.outcome = Some(BattleOutcome::Draw);
        } else if !attacker_alive {
            self.outcome = Some(BattleOutcome::Victory(Side::Defender));
        } else if !defender_alive {
            self.outcome = Some(BattleOutcome::Victory(Side::Attacker));
        }
    }

    /// Build the unit speed-order queue for a fresh battle turn
    /// (distilled spec §4.4 step 2).
    fn build_turn_order(&self) -> Vec<UnitUid> {
        let mut candidates: Vec<&battle_types::unit::Unit> = self
            .board
            .alive_units()
            .filter(|u| u.stats.speed > 0 && !u.is_tower())
            .collect();
        candidates.sort_by(|a, b| b.stats.speed.cmp(&a.stats.speed).then(a.uid.get().cmp(&b.uid.get())));
        candidates.into_iter().map(|u| u.uid).collect()
    }

    /// Advance the whole-battle turn counter: reset transient flags,
    /// decrement durations, then hand units off one at a time via
    /// `next_actor` for a command-source loop to drive (distilled spec
    /// §4.4).
    pub fn begin_turn(&mut self) {
        self.turn += 1;
        for unit in self.board.units_mut() {
            unit.reset_turn_flags();
            unit.tick_durations();
        }
        self.catapult_shots_fired_this_turn = false;
        self.towers_fired_this_turn = false;
        self.turns_since_death += 1;
        tracing::info!(battle_id = %self.id, turn = self.turn, "turn begins");
    }

    /// Units still owed an action this turn, in speed order.
    pub fn pending_actors(&self) -> Vec<UnitUid> {
        self.build_turn_order()
            .into_iter()
            .filter(|&uid| {
                self.board
                    .unit(uid)
                    .map(|u| u.is_alive() && !u.modes.contains(UnitModes::MOVED))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn control_mode_for_unit(&self, uid: UnitUid) -> Option<ControlMode> {
        self.board.unit(uid).map(|u| self.control_of(u.current_color))
    }

    pub fn side_has_stalled(&self) -> bool {
        self.turns_since_death >= self.statics.stall_limit_turns
    }
}
