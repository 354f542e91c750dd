//! Spell catalog — static definitions the spell engine (`battle-engine`)
//! dispatches on. Targeting shape and polarity are data; damage/mode
//! payload resolution against a live board is the engine's job.

use battle_types::ids::SpellId;
use battle_types::unit::UnitModes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellPolarity {
    Friendly,
    Offensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellTarget {
    SingleUnit,
    /// All valid units within a fixed radius of the targeted cell.
    Area { radius: u32 },
    /// Every unit on the board matching the spell's polarity.
    Mass,
    ChainLightning { max_hops: u32 },
    Teleport,
    Earthquake,
    MirrorImage,
    SummonElemental,
    /// No board target; acts on castle defense structures directly.
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpellKind {
    Damage { min: u32, max: u32 },
    ApplyMode { mode: UnitModes, duration_turns: u16 },
    Dispel,
    Resurrect,
    Special,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellDef {
    pub id: SpellId,
    pub name: &'static str,
    pub cost: u32,
    pub polarity: SpellPolarity,
    pub target: SpellTarget,
    pub kind: SpellKind,
    /// The distilled spec §9 Open Question: Chain Lightning bypasses the
    /// normal friend/foe target filter. Named per the spec's own
    /// requested predicate rather than special-cased inline.
    pub cross_side_bypass: bool,
}

pub fn is_cross_side_spell_bypass(def: &SpellDef) -> bool {
    def.cross_side_bypass
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalog {
    spells: Vec<SpellDef>,
}

impl SpellCatalog {
    pub fn get(&self, id: SpellId) -> Option<&SpellDef> {
        self.spells.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellDef> {
        self.spells.iter()
    }

    pub fn standard() -> Self {
        let spells = vec![
            SpellDef {
                id: SpellId(0),
                name: "Bless",
                cost: 2,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::BLESS,
                    duration_turns: 3,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(1),
                name: "Curse",
                cost: 2,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::CURSE,
                    duration_turns: 3,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(2),
                name: "Haste",
                cost: 2,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::HASTE,
                    duration_turns: 3,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(3),
                name: "Slow",
                cost: 2,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::SLOW,
                    duration_turns: 3,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(4),
                name: "Blind",
                cost: 3,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::BLIND,
                    duration_turns: 2,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(5),
                name: "Paralyze",
                cost: 3,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::PARALYZE,
                    duration_turns: 1,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(6),
                name: "Stone",
                cost: 4,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::STONE,
                    duration_turns: 2,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(7),
                name: "Berserker",
                cost: 4,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::BERSERKER,
                    duration_turns: 0,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(8),
                name: "Hypnotize",
                cost: 5,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::ApplyMode {
                    mode: UnitModes::HYPNOTIZE,
                    duration_turns: 0,
                },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(9),
                name: "Dispel",
                cost: 3,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::Dispel,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(10),
                name: "Mass Dispel",
                cost: 6,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::Mass,
                kind: SpellKind::Dispel,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(11),
                name: "Resurrect",
                cost: 4,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::Resurrect,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(12),
                name: "Lightning Bolt",
                cost: 3,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::SingleUnit,
                kind: SpellKind::Damage { min: 10, max: 20 },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(13),
                name: "Chain Lightning",
                cost: 5,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::ChainLightning { max_hops: 4 },
                kind: SpellKind::Damage { min: 10, max: 20 },
                cross_side_bypass: true,
            },
            SpellDef {
                id: SpellId(14),
                name: "Fireball",
                cost: 5,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::Area { radius: 1 },
                kind: SpellKind::Damage { min: 15, max: 25 },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(15),
                name: "Meteor Shower",
                cost: 6,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::Area { radius: 2 },
                kind: SpellKind::Damage { min: 10, max: 18 },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(16),
                name: "Cold Ring",
                cost: 5,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::Area { radius: 1 },
                kind: SpellKind::Damage { min: 12, max: 20 },
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(17),
                name: "Teleport",
                cost: 4,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::Teleport,
                kind: SpellKind::Special,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(18),
                name: "Earthquake",
                cost: 5,
                polarity: SpellPolarity::Offensive,
                target: SpellTarget::Earthquake,
                kind: SpellKind::Special,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(19),
                name: "Mirror Image",
                cost: 4,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::MirrorImage,
                kind: SpellKind::Special,
                cross_side_bypass: false,
            },
            SpellDef {
                id: SpellId(20),
                name: "Summon Fire Elemental",
                cost: 6,
                polarity: SpellPolarity::Friendly,
                target: SpellTarget::SummonElemental,
                kind: SpellKind::Special,
                cross_side_bypass: false,
            },
        ];
        Self { spells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_lightning_is_marked_as_bypass() {
        let catalog = SpellCatalog::standard();
        let chain = catalog.get(SpellId(13)).unwrap();
        assert!(is_cross_side_spell_bypass(chain));
    }

    #[test]
    fn standard_catalog_has_unique_ids() {
        let catalog = SpellCatalog::standard();
        let mut ids: Vec<_> = catalog.iter().map(|s| s.id.get()).collect();
        ids.sort_unstable();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }
}
