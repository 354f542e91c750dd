//! The replay log: every successfully applied command, in order, for
//! replay/log/network mirroring (distilled spec §6). Structured logging
//! itself goes through `tracing`; this module only owns the in-memory
//! trace the host can pull for persistence.

use battle_types::command::Command;
use battle_types::ids::BattleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedCommand {
    pub turn: u32,
    pub command: Command,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandLog {
    entries: Vec<LoggedCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, battle_id: BattleId, turn: u32, command: &Command) {
        tracing::debug!(battle_id = %battle_id, turn, command = ?command, "command applied");
        self.entries.push(LoggedCommand {
            turn,
            command: command.clone(),
        });
    }

    pub fn entries(&self) -> &[LoggedCommand] {
        &self.entries
    }
}
