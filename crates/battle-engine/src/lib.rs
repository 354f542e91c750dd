//! The battle core: mutable board state, geometry-aware pathfinding,
//! command validation/execution, the turn loop, and the AI planner.
//! `battle-types` defines the vocabulary; this crate is where it moves.

pub mod ai;
pub mod arena;
pub mod board;
pub mod command;
pub mod damage;
pub mod graveyard;
pub mod log;
pub mod observer;
pub mod pathfinder;
pub mod siege;

pub use arena::{Arena, ArenaConfig, BattleResult, ControlMode};
pub use observer::{BattleObserver, NullObserver};
