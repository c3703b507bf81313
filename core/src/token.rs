use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::catalog::Archetype;
use crate::status::{self, StatusEffect};
use crate::types::{ArchetypeId, Cell, InstanceId, Side, Stats, RAGE_MAX};

/// Link from a summoned minion to its caster
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinionLink {
    pub owner: InstanceId,
    /// Turns left before the minion is removed
    pub ttl: u8,
}

/// A unit instance on the grid
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub archetype: ArchetypeId,
    pub instance: InstanceId,
    /// Birth order across the whole match
    pub serial: u32,
    pub name: String,
    pub art_key: String,
    pub side: Side,
    pub cell: Cell,
    pub stats: Stats,
    pub hp: i32,
    pub rage: i32,
    pub alive: bool,
    pub died_at: Option<u64>,
    pub leader: bool,
    pub minion: Option<MinionLink>,
    pub statuses: Vec<StatusEffect>,
    /// Set between the start and end of this unit's own turn
    #[serde(default)]
    pub acting: bool,
}

impl Token {
    pub fn from_archetype(
        meta: &Archetype,
        instance: InstanceId,
        serial: u32,
        side: Side,
        cell: Cell,
    ) -> Self {
        let stats = meta.derived_stats();
        Self {
            archetype: meta.id,
            instance,
            serial,
            name: meta.name.clone(),
            art_key: meta.art_key.clone(),
            side,
            cell,
            hp: stats.hp_max,
            stats,
            rage: 0,
            alive: true,
            died_at: None,
            leader: meta.is_leader(),
            minion: None,
            statuses: Vec::new(),
            acting: false,
        }
    }

    pub fn hp_max(&self) -> i32 {
        self.stats.hp_max
    }

    pub fn is_minion(&self) -> bool {
        self.minion.is_some()
    }

    /// Unused hp headroom
    pub fn missing_hp(&self) -> i32 {
        (self.stats.hp_max - self.hp).max(0)
    }

    pub fn gain_rage(&mut self, amount: i32) {
        if self.alive {
            self.rage = (self.rage + amount).clamp(0, RAGE_MAX);
        }
    }

    pub fn rage_full(&self) -> bool {
        self.rage >= RAGE_MAX
    }

    /// Lower hp, clamped at zero. Returns the hp actually removed.
    pub fn lose_hp(&mut self, amount: i32) -> i32 {
        let lost = amount.clamp(0, self.hp);
        self.hp -= lost;
        lost
    }

    /// Raise hp, clamped at max. Returns the hp actually restored.
    pub fn gain_hp(&mut self, amount: i32) -> i32 {
        let healed = amount.clamp(0, self.missing_hp());
        self.hp += healed;
        healed
    }

    /// Transition to dead. Only the first call records the death time.
    pub fn mark_dead(&mut self, now: u64) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = 0;
        self.alive = false;
        self.died_at = Some(now);
        self.rage = 0;
        status::clear_on_death(self);
        true
    }

    /// Bring a fallen unit back with the given hp
    pub fn revive(&mut self, hp: i32, rage: i32) {
        self.alive = true;
        self.died_at = None;
        self.hp = hp.clamp(1, self.stats.hp_max.max(1));
        self.rage = rage.clamp(0, RAGE_MAX);
    }
}
