//! Newtype identifiers.
//!
//! Unlike `mk-types`'s string-backed ids (cards/skills looked up by name in
//! a static catalog), battle-core identifiers are dense and engine-assigned,
//! so each one wraps a small integer instead of a `Box<str>`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(v: $repr) -> Self {
                Self(v)
            }
        }
    };
}

define_id!(
    /// Identifies a battle instance, for log correlation across concurrent games.
    BattleId(u64)
);

define_id!(
    /// Unique within a single battle; never reused once assigned.
    UnitUid(u32)
);

define_id!(
    /// Row-major index 0..99 over the 11x9 hex board.
    CellIndex(u8)
);

define_id!(
    /// Index into `battle-data`'s spell catalog.
    SpellId(u16)
);

define_id!(
    /// Index into `battle-data`'s unit-kind catalog.
    UnitKindId(u16)
);
