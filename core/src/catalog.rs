//! Archetype catalog: classes, ranks, stats and kits.
//!
//! The catalog is static input data. It is built once, never mutated by the
//! simulation, and looked up by [`ArchetypeId`].

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::NeighborPattern;
use crate::passives::Passive;
use crate::types::{apply_bps, ArchetypeId, Bps, DamageType, Stats};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum UnitClass {
    Warrior,
    Guardian,
    Mage,
    Archer,
    Assassin,
    Support,
    Summoner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    Common,
    Elite,
    Leader,
}

impl Rank {
    /// (hp, power) scaling applied to base stats
    fn scaling(self) -> (Bps, Bps) {
        match self {
            Rank::Common => (10_000, 10_000),
            Rank::Elite => (11_500, 11_500),
            Rank::Leader => (15_000, 10_000),
        }
    }
}

/// Effect applied once when a unit enters the board
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OnSpawn {
    /// Arrive with a full meter. Leaders never get this.
    FullRage,
    /// Arrive behind a shield
    Shield { amount: i32 },
}

/// Ultimate ability descriptor, one variant per resolver branch
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Ultimate {
    #[serde(rename_all = "camelCase")]
    Summon {
        minion: ArchetypeId,
        count: u8,
        limit: u8,
        pattern: NeighborPattern,
        hp_ratio: Bps,
        attack_ratio: Bps,
        ttl_turns: u8,
    },
    #[serde(rename_all = "camelCase")]
    Drain { scale: Bps },
    #[serde(rename_all = "camelCase")]
    StrikeLaneMid {
        hits: u8,
        scale: Bps,
        dtype: DamageType,
        leader_bonus: Bps,
        penetration: Bps,
        tag_as_basic: bool,
    },
    #[serde(rename_all = "camelCase")]
    SelfBuff {
        hp_cost: Bps,
        reduction: Bps,
        turns: u8,
    },
    #[serde(rename_all = "camelCase")]
    Sleep { targets: u8, turns: u8 },
    #[serde(rename_all = "camelCase")]
    Revive {
        count: u8,
        hp_ratio: Bps,
        rage: i32,
        lock_skills_turns: u8,
    },
    #[serde(rename_all = "camelCase")]
    EqualizeHp { count: u8, include_leader: bool },
    #[serde(rename_all = "camelCase")]
    Haste {
        allies: u8,
        extra_attacks: u8,
        turns: u8,
    },
}

/// Fieldless ultimate identifier for logs, timings and traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UltimateKind {
    Summon,
    Drain,
    StrikeLaneMid,
    SelfBuff,
    Sleep,
    Revive,
    EqualizeHp,
    Haste,
}

impl UltimateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UltimateKind::Summon => "summon",
            UltimateKind::Drain => "drain",
            UltimateKind::StrikeLaneMid => "strikeLaneMid",
            UltimateKind::SelfBuff => "selfBuff",
            UltimateKind::Sleep => "sleep",
            UltimateKind::Revive => "revive",
            UltimateKind::EqualizeHp => "equalizeHP",
            UltimateKind::Haste => "haste",
        }
    }
}

impl Ultimate {
    pub fn kind(&self) -> UltimateKind {
        match self {
            Ultimate::Summon { .. } => UltimateKind::Summon,
            Ultimate::Drain { .. } => UltimateKind::Drain,
            Ultimate::StrikeLaneMid { .. } => UltimateKind::StrikeLaneMid,
            Ultimate::SelfBuff { .. } => UltimateKind::SelfBuff,
            Ultimate::Sleep { .. } => UltimateKind::Sleep,
            Ultimate::Revive { .. } => UltimateKind::Revive,
            Ultimate::EqualizeHp { .. } => UltimateKind::EqualizeHp,
            Ultimate::Haste { .. } => UltimateKind::Haste,
        }
    }
}

/// Abilities attached to an archetype
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub on_spawn: Option<OnSpawn>,
    pub ultimate: Option<Ultimate>,
    pub passives: Vec<Passive>,
}

/// Kit properties the AI scores against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitTraits {
    pub has_instant: bool,
    pub has_def_buff: bool,
    pub has_revive: bool,
}

impl KitTraits {
    pub fn of(kit: &Kit) -> Self {
        let ult = kit.ultimate.as_ref();
        Self {
            has_instant: matches!(
                ult,
                Some(
                    Ultimate::Drain { .. } | Ultimate::StrikeLaneMid { .. } | Ultimate::Sleep { .. }
                )
            ) || matches!(kit.on_spawn, Some(OnSpawn::FullRage)),
            has_def_buff: matches!(
                ult,
                Some(Ultimate::SelfBuff { .. } | Ultimate::EqualizeHp { .. })
            ),
            has_revive: matches!(ult, Some(Ultimate::Revive { .. })),
        }
    }
}

/// Immutable archetype record
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub id: ArchetypeId,
    pub name: String,
    pub art_key: String,
    pub class: UnitClass,
    pub rank: Rank,
    pub cost: i32,
    pub base: Stats,
    pub basic_damage: DamageType,
    pub color: String,
    pub kit: Kit,
}

impl Archetype {
    pub fn new(id: u32, name: &str, class: UnitClass, cost: i32, base: Stats) -> Self {
        Self {
            id: ArchetypeId(id),
            name: String::from(name),
            art_key: String::from(name),
            class,
            rank: Rank::Common,
            cost,
            base,
            basic_damage: DamageType::Physical,
            color: String::from("#9aa5b1"),
            kit: Kit::default(),
        }
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_basic_damage(mut self, dtype: DamageType) -> Self {
        self.basic_damage = dtype;
        self
    }

    pub fn with_art(mut self, art_key: &str, color: &str) -> Self {
        self.art_key = String::from(art_key);
        self.color = String::from(color);
        self
    }

    pub fn with_ultimate(mut self, ultimate: Ultimate) -> Self {
        self.kit.ultimate = Some(ultimate);
        self
    }

    pub fn with_on_spawn(mut self, on_spawn: OnSpawn) -> Self {
        self.kit.on_spawn = Some(on_spawn);
        self
    }

    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.kit.passives.push(passive);
        self
    }

    pub fn is_leader(&self) -> bool {
        self.rank == Rank::Leader
    }

    pub fn traits(&self) -> KitTraits {
        KitTraits::of(&self.kit)
    }

    /// Base stats scaled by rank tier
    pub fn derived_stats(&self) -> Stats {
        let (hp_scale, power_scale) = self.rank.scaling();
        let mut stats = self.base.clone();
        stats.hp_max = apply_bps(stats.hp_max, hp_scale).max(1);
        stats.attack = apply_bps(stats.attack, power_scale);
        stats.will = apply_bps(stats.will, power_scale);
        stats
    }
}

/// Archetype lookup by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct Catalog {
    archetypes: BTreeMap<ArchetypeId, Archetype>,
}

impl Catalog {
    pub fn new(archetypes: Vec<Archetype>) -> Self {
        Self {
            archetypes: archetypes.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(&id)
    }

    pub fn require(&self, id: ArchetypeId) -> EngineResult<&Archetype> {
        self.get(id).ok_or(EngineError::UnknownArchetype { id })
    }

    pub fn ids(&self) -> impl Iterator<Item = ArchetypeId> + '_ {
        self.archetypes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.values()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
