//! Unit-kind catalog — the static side of a `Unit` (distilled spec §3).
//! `battle-engine` resolves a `UnitKindId` through this table once at
//! spawn time and folds in any commander bonus to produce the `UnitStats`
//! snapshot a live `Unit` carries.

use battle_types::ids::{SpellId, UnitKindId};
use battle_types::unit::{Element, UnitAbilities, UnitStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitKindDef {
    pub id: UnitKindId,
    pub name: &'static str,
    pub is_wide: bool,
    pub stats: UnitStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCatalog {
    kinds: Vec<UnitKindDef>,
}

impl UnitCatalog {
    pub fn get(&self, id: UnitKindId) -> Option<&UnitKindDef> {
        self.kinds.iter().find(|k| k.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitKindDef> {
        self.kinds.iter()
    }

    /// The built-in roster covering every ability the engine needs test
    /// coverage for: a plain walker, a shooter, a flyer, a two-cell
    /// attacker, a sweep attacker, a cloud shooter, an undead unit, and an
    /// undead-bane unit.
    pub fn standard() -> Self {
        let kinds = vec![
            UnitKindDef {
                id: UnitKindId(0),
                name: "Peasant",
                is_wide: false,
                stats: base_stats(2, 2, 1, 2, 5, 4, 0, UnitAbilities::empty()),
            },
            UnitKindDef {
                id: UnitKindId(1),
                name: "Archer",
                is_wide: false,
                stats: UnitStats {
                    max_shots: 12,
                    ..base_stats(5, 3, 2, 3, 10, 5, 12, UnitAbilities::empty())
                },
            },
            UnitKindDef {
                id: UnitKindId(2),
                name: "Griffin",
                is_wide: false,
                stats: base_stats(
                    6,
                    5,
                    3,
                    6,
                    25,
                    8,
                    0,
                    UnitAbilities::FLYING | UnitAbilities::DOUBLE_ATTACK,
                ),
            },
            UnitKindDef {
                id: UnitKindId(3),
                name: "Cavalry",
                is_wide: true,
                stats: base_stats(8, 6, 4, 8, 30, 7, 0, UnitAbilities::empty()),
            },
            UnitKindDef {
                id: UnitKindId(4),
                name: "Hydra",
                is_wide: false,
                stats: base_stats(
                    9,
                    9,
                    6,
                    12,
                    75,
                    5,
                    0,
                    UnitAbilities::ALL_AROUND_ATTACK | UnitAbilities::UNLIMITED_RETALIATION,
                ),
            },
            UnitKindDef {
                id: UnitKindId(5),
                name: "Siege Lancer",
                is_wide: false,
                stats: base_stats(7, 5, 3, 5, 20, 6, 0, UnitAbilities::TWO_HEX_ATTACK),
            },
            UnitKindDef {
                id: UnitKindId(6),
                name: "Mist Lobber",
                is_wide: false,
                stats: UnitStats {
                    max_shots: 8,
                    ..base_stats(
                        4,
                        4,
                        3,
                        4,
                        12,
                        4,
                        8,
                        UnitAbilities::CLOUD_ATTACK | UnitAbilities::NO_MELEE_PENALTY,
                    )
                },
            },
            UnitKindDef {
                id: UnitKindId(7),
                name: "Skeleton",
                is_wide: false,
                stats: base_stats(4, 4, 1, 3, 6, 4, 0, UnitAbilities::UNDEAD),
            },
            UnitKindDef {
                id: UnitKindId(8),
                name: "Paladin",
                is_wide: false,
                stats: base_stats(10, 9, 5, 9, 35, 6, 0, UnitAbilities::UNDEAD_BANE),
            },
            UnitKindDef {
                id: UnitKindId(9),
                name: "Fire Elemental",
                is_wide: false,
                stats: UnitStats {
                    affinity: Some(Element::Fire),
                    weakness: Some(Element::Ice),
                    ..base_stats(7, 7, 4, 6, 20, 6, 0, UnitAbilities::empty())
                },
            },
            UnitKindDef {
                id: UnitKindId(10),
                name: "Genie",
                is_wide: false,
                stats: UnitStats {
                    built_in_spell: Some((SpellId(4), 0.2)),
                    ..base_stats(8, 8, 3, 5, 18, 6, 0, UnitAbilities::empty())
                },
            },
        ];
        Self { kinds }
    }
}

fn base_stats(
    attack: i32,
    defense: i32,
    damage_min: u32,
    damage_max: u32,
    hit_points_per_fighter: u32,
    speed: u32,
    max_shots: u32,
    abilities: UnitAbilities,
) -> UnitStats {
    UnitStats {
        attack,
        defense,
        damage_min,
        damage_max,
        hit_points_per_fighter,
        speed,
        max_shots,
        abilities,
        affinity: None,
        weakness: None,
        built_in_spell: None,
        magic_resistance_percent: 0,
        cost_per_fighter: 10 + hit_points_per_fighter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_unique_ids() {
        let catalog = UnitCatalog::standard();
        let mut ids: Vec<_> = catalog.iter().map(|k| k.id.get()).collect();
        ids.sort_unstable();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[test]
    fn lookup_returns_matching_kind() {
        let catalog = UnitCatalog::standard();
        let griffin = catalog.get(UnitKindId(2)).unwrap();
        assert_eq!(griffin.name, "Griffin");
        assert!(griffin.stats.abilities.contains(UnitAbilities::FLYING));
    }
}
