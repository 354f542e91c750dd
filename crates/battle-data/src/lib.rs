//! Static game-balance data: the tunable constants table, the unit-kind
//! catalog, and the spell catalog. Nothing here mutates during a battle;
//! `battle-engine` reads these tables to resolve a `UnitKindId`/`SpellId`
//! into the behavior-bearing structs `battle-types` defines.

pub mod spells;
pub mod statics;
pub mod units;

pub use spells::{SpellCatalog, SpellDef, SpellKind, SpellPolarity, SpellTarget};
pub use statics::BattleStatics;
pub use units::{UnitCatalog, UnitKindDef};
