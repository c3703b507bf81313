//! Tunable engine parameters.
//!
//! Every struct deserializes with `#[serde(default)]`, so hosts may supply a
//! partial JSON document and inherit the rest.

use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::catalog::{UltimateKind, UnitClass};
use crate::types::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// How long a dead unit lingers before its cell frees up
    pub vanish_ms: u64,
    /// Melee animation length; a basic attack holds the scheduler this long
    pub melee_ms: u64,
    /// Cap on follow-up attacks within one turn step
    pub follow_up_cap: u8,
    pub rage_per_attack: i32,
    pub rage_on_damaged: i32,
    pub timings: UltimateTimings,
    pub ai: AiConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vanish_ms: 900,
            melee_ms: 420,
            follow_up_cap: 2,
            rage_per_attack: 25,
            rage_on_damaged: 10,
            timings: UltimateTimings::default(),
            ai: AiConfig::default(),
        }
    }
}

/// Animation time each ultimate branch holds the scheduler for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UltimateTimings {
    pub summon_ms: u64,
    pub drain_ms: u64,
    pub strike_ms: u64,
    pub self_buff_ms: u64,
    pub sleep_ms: u64,
    pub revive_ms: u64,
    pub equalize_ms: u64,
    pub haste_ms: u64,
}

impl Default for UltimateTimings {
    fn default() -> Self {
        Self {
            summon_ms: 650,
            drain_ms: 800,
            strike_ms: 700,
            self_buff_ms: 500,
            sleep_ms: 600,
            revive_ms: 900,
            equalize_ms: 600,
            haste_ms: 500,
        }
    }
}

impl UltimateTimings {
    pub fn for_kind(&self, kind: UltimateKind) -> u64 {
        match kind {
            UltimateKind::Summon => self.summon_ms,
            UltimateKind::Drain => self.drain_ms,
            UltimateKind::StrikeLaneMid => self.strike_ms,
            UltimateKind::SelfBuff => self.self_buff_ms,
            UltimateKind::Sleep => self.sleep_ms,
            UltimateKind::Revive => self.revive_ms,
            UltimateKind::EqualizeHp => self.equalize_ms,
            UltimateKind::Haste => self.haste_ms,
        }
    }
}

/// Weights of the AI's placement sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiWeights {
    pub pressure: f64,
    pub safety: f64,
    pub eta: f64,
    pub summon: f64,
    pub instant: f64,
    pub defense: f64,
    pub revive: f64,
}

impl Default for AiWeights {
    fn default() -> Self {
        Self {
            pressure: 0.42,
            safety: 0.20,
            eta: 0.16,
            summon: 0.08,
            instant: 0.06,
            defense: 0.04,
            revive: 0.04,
        }
    }
}

/// Front/back column multiplier for a class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBias {
    pub class: UnitClass,
    pub front: f64,
    pub back: f64,
}

impl RoleBias {
    pub const fn new(class: UnitClass, front: f64, back: f64) -> Self {
        Self { class, front, back }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    pub side: Side,
    pub think_interval_ms: u64,
    pub hand_size: usize,
    pub start_cost: i32,
    pub cost_per_cycle: i32,
    pub cost_cap: i32,
    pub weights: AiWeights,
    /// Multiplier when exactly two same-side units share the row
    pub crowd_penalty: f64,
    /// Multiplier when three or more same-side units share the row
    pub heavy_crowd_penalty: f64,
    pub top_k: usize,
    /// Free pattern slots a summoner card needs to be placeable
    pub min_summon_free: usize,
    pub role_bias: Vec<RoleBias>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            side: Side::Enemy,
            think_interval_ms: 600,
            hand_size: 4,
            start_cost: 5,
            cost_per_cycle: 2,
            cost_cap: 10,
            weights: AiWeights::default(),
            crowd_penalty: 0.85,
            heavy_crowd_penalty: 0.70,
            top_k: 5,
            min_summon_free: 1,
            role_bias: vec![
                RoleBias::new(UnitClass::Warrior, 1.15, 0.85),
                RoleBias::new(UnitClass::Guardian, 1.25, 0.75),
                RoleBias::new(UnitClass::Assassin, 1.10, 0.90),
                RoleBias::new(UnitClass::Mage, 0.85, 1.15),
                RoleBias::new(UnitClass::Archer, 0.80, 1.20),
                RoleBias::new(UnitClass::Support, 0.80, 1.20),
                RoleBias::new(UnitClass::Summoner, 0.90, 1.10),
            ],
        }
    }
}

impl AiConfig {
    /// Role multiplier for a class at a column rank (0 front .. 2 back)
    pub fn role_multiplier(&self, class: UnitClass, column_rank: u8) -> f64 {
        let Some(bias) = self.role_bias.iter().find(|b| b.class == class) else {
            return 1.0;
        };
        match column_rank {
            0 => bias.front,
            2 => bias.back,
            _ => (bias.front + bias.back) / 2.0,
        }
    }
}
