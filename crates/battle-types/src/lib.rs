//! Core types for the tactical battle core — board geometry, positions,
//! units, commands, and the deterministic RNG. Zero mutable logic lives
//! here; `battle-engine` owns every state transition.

pub mod board;
pub mod command;
pub mod effect;
pub mod error;
pub mod ids;
pub mod position;
pub mod result;
pub mod rng;
pub mod unit;
