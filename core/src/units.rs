//! Starter roster.
//!
//! One archetype per ultimate type, a summoner minion, and a leader for each
//! side. Hosts without their own data tables play with this catalog.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::catalog::{Archetype, Catalog, OnSpawn, Rank, Ultimate, UnitClass};
use crate::grid::NeighborPattern;
use crate::log;
use crate::passives::{Passive, PassiveEffect, PassiveTrigger};
use crate::types::{ArchetypeId, DamageType, Stats};

pub const VANGUARD: ArchetypeId = ArchetypeId(1);
pub const BULWARK: ArchetypeId = ArchetypeId(2);
pub const EMBER_MAGE: ArchetypeId = ArchetypeId(3);
pub const LONGBOW: ArchetypeId = ArchetypeId(4);
pub const NIGHTBLADE: ArchetypeId = ArchetypeId(5);
pub const DREAMWEAVER: ArchetypeId = ArchetypeId(6);
pub const LIFEBINDER: ArchetypeId = ArchetypeId(7);
pub const MENDER: ArchetypeId = ArchetypeId(8);
pub const BONECALLER: ArchetypeId = ArchetypeId(9);
pub const SKELETON: ArchetypeId = ArchetypeId(20);
pub const WARLORD: ArchetypeId = ArchetypeId(30);
pub const LICH_KING: ArchetypeId = ArchetypeId(31);

fn with_passives(mut meta: Archetype, passives: &[(PassiveTrigger, PassiveEffect)]) -> Archetype {
    for (trigger, effect) in passives {
        match Passive::new(*trigger, effect.clone()) {
            Ok(passive) => meta = meta.with_passive(passive),
            Err(e) => log::error(&format!("{}: {}", meta.name, e)),
        }
    }
    meta
}

pub fn starter_archetypes() -> Vec<Archetype> {
    vec![
        Archetype::new(
            VANGUARD.0,
            "Vanguard",
            UnitClass::Warrior,
            3,
            Stats::new(120, 18, 4).with_defense(1500, 500),
        )
        .with_art("vanguard", "#c0392b")
        .with_ultimate(Ultimate::Haste {
            allies: 2,
            extra_attacks: 1,
            turns: 2,
        }),
        with_passives(
            Archetype::new(
                BULWARK.0,
                "Bulwark",
                UnitClass::Guardian,
                4,
                Stats::new(170, 10, 4).with_defense(3000, 1500),
            )
            .with_art("bulwark", "#7f8c8d")
            .with_on_spawn(OnSpawn::Shield { amount: 20 })
            .with_ultimate(Ultimate::SelfBuff {
                hp_cost: 1000,
                reduction: 4000,
                turns: 2,
            }),
            &[(PassiveTrigger::OnTurnStart, PassiveEffect::GainRage { amount: 5 })],
        ),
        Archetype::new(
            EMBER_MAGE.0,
            "Ember Mage",
            UnitClass::Mage,
            4,
            Stats::new(80, 6, 22).with_defense(500, 2000),
        )
        .with_basic_damage(DamageType::Arcane)
        .with_art("ember_mage", "#e67e22")
        .with_ultimate(Ultimate::Drain { scale: 6000 }),
        Archetype::new(
            LONGBOW.0,
            "Longbow",
            UnitClass::Archer,
            3,
            Stats::new(85, 20, 4).with_defense(800, 800),
        )
        .with_art("longbow", "#27ae60")
        .with_ultimate(Ultimate::StrikeLaneMid {
            hits: 2,
            scale: 7000,
            dtype: DamageType::Physical,
            leader_bonus: 2500,
            penetration: 3000,
            tag_as_basic: false,
        }),
        with_passives(
            Archetype::new(
                NIGHTBLADE.0,
                "Nightblade",
                UnitClass::Assassin,
                5,
                Stats::new(90, 24, 6).with_defense(800, 800),
            )
            .with_rank(Rank::Elite)
            .with_art("nightblade", "#2c3e50")
            .with_on_spawn(OnSpawn::FullRage)
            .with_ultimate(Ultimate::StrikeLaneMid {
                hits: 1,
                scale: 15000,
                dtype: DamageType::Physical,
                leader_bonus: 0,
                penetration: 5000,
                tag_as_basic: true,
            }),
            &[
                (PassiveTrigger::OnBasicHit, PassiveEffect::PoisonOnHit { per_turn: 4, turns: 2 }),
                (PassiveTrigger::OnKill, PassiveEffect::GainRage { amount: 50 }),
            ],
        ),
        Archetype::new(
            DREAMWEAVER.0,
            "Dreamweaver",
            UnitClass::Support,
            3,
            Stats::new(75, 6, 14).with_defense(300, 2500),
        )
        .with_basic_damage(DamageType::Arcane)
        .with_art("dreamweaver", "#8e44ad")
        .with_ultimate(Ultimate::Sleep { targets: 2, turns: 1 }),
        Archetype::new(
            LIFEBINDER.0,
            "Lifebinder",
            UnitClass::Support,
            5,
            Stats::new(85, 6, 12).with_defense(300, 2000),
        )
        .with_basic_damage(DamageType::Arcane)
        .with_art("lifebinder", "#f1c40f")
        .with_ultimate(Ultimate::Revive {
            count: 1,
            hp_ratio: 5000,
            rage: 0,
            lock_skills_turns: 1,
        }),
        with_passives(
            Archetype::new(
                MENDER.0,
                "Mender",
                UnitClass::Support,
                3,
                Stats::new(80, 8, 12).with_defense(500, 1500),
            )
            .with_art("mender", "#1abc9c")
            .with_ultimate(Ultimate::EqualizeHp {
                count: 3,
                include_leader: true,
            }),
            &[(PassiveTrigger::OnSpawn, PassiveEffect::Shield { amount: 10 })],
        ),
        Archetype::new(
            BONECALLER.0,
            "Bonecaller",
            UnitClass::Summoner,
            4,
            Stats::new(90, 12, 16).with_defense(500, 1500),
        )
        .with_basic_damage(DamageType::Arcane)
        .with_art("bonecaller", "#95a5a6")
        .with_ultimate(Ultimate::Summon {
            minion: SKELETON,
            count: 2,
            limit: 2,
            pattern: NeighborPattern::Vertical,
            hp_ratio: 4000,
            attack_ratio: 6000,
            ttl_turns: 3,
        }),
        with_passives(
            Archetype::new(
                SKELETON.0,
                "Skeleton",
                UnitClass::Warrior,
                0,
                Stats::new(30, 8, 0),
            )
            .with_art("skeleton", "#bdc3c7"),
            &[(PassiveTrigger::OnBasicHit, PassiveEffect::BonusDamage { flat: 2 })],
        ),
        with_passives(
            Archetype::new(
                WARLORD.0,
                "Warlord",
                UnitClass::Warrior,
                0,
                Stats::new(300, 22, 6).with_defense(2000, 1000),
            )
            .with_rank(Rank::Leader)
            .with_art("warlord", "#d35400")
            .with_on_spawn(OnSpawn::FullRage)
            .with_ultimate(Ultimate::Haste {
                allies: 3,
                extra_attacks: 1,
                turns: 1,
            }),
            &[(PassiveTrigger::OnBasicHit, PassiveEffect::Lifesteal { amount: 2000 })],
        ),
        with_passives(
            Archetype::new(
                LICH_KING.0,
                "Lich King",
                UnitClass::Mage,
                0,
                Stats::new(260, 8, 24).with_defense(1000, 2500),
            )
            .with_rank(Rank::Leader)
            .with_basic_damage(DamageType::Arcane)
            .with_art("lich_king", "#34495e")
            .with_ultimate(Ultimate::Drain { scale: 5000 }),
            &[(PassiveTrigger::OnBasicHit, PassiveEffect::DamageMultiplier { amount: 1000 })],
        ),
    ]
}

pub fn starter_catalog() -> Catalog {
    Catalog::new(starter_archetypes())
}

/// Archetypes a player or the AI may draft: everything except leaders and
/// summon-only minions
pub fn starter_pool(catalog: &Catalog) -> Vec<ArchetypeId> {
    catalog
        .iter()
        .filter(|meta| !meta.is_leader() && meta.cost > 0)
        .map(|meta| meta.id)
        .collect()
}
