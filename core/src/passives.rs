//! Passive trigger registry.
//!
//! A passive is a closed `(trigger, effect)` pair. Invalid pairs are rejected
//! when the passive is built (or deserialized), so firing never has to guess.

use alloc::format;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode, Input};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::combat::{self, DamageOutcome};
use crate::error::{EngineError, EngineResult};
use crate::log;
use crate::state::Simulation;
use crate::status::{self, StatusEffect, StatusKind};
use crate::types::{apply_bps, mul_bps, Bps, InstanceId, BPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassiveTrigger {
    OnBasicHit,
    OnSpawn,
    OnTurnStart,
    OnKill,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PassiveEffect {
    /// Flat damage added to the hit's base
    BonusDamage { flat: i32 },
    /// Multiplies the hit's base by `1 + amount`
    DamageMultiplier { amount: Bps },
    /// Heals the attacker for a fraction of damage dealt
    Lifesteal { amount: Bps },
    /// Poisons the target after the hit lands
    #[serde(rename_all = "camelCase")]
    PoisonOnHit { per_turn: i32, turns: u8 },
    GainRage { amount: i32 },
    Shield { amount: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassiveEffectTag {
    BonusDamage,
    DamageMultiplier,
    Lifesteal,
    PoisonOnHit,
    GainRage,
    Shield,
}

impl PassiveEffect {
    pub fn tag(&self) -> PassiveEffectTag {
        match self {
            PassiveEffect::BonusDamage { .. } => PassiveEffectTag::BonusDamage,
            PassiveEffect::DamageMultiplier { .. } => PassiveEffectTag::DamageMultiplier,
            PassiveEffect::Lifesteal { .. } => PassiveEffectTag::Lifesteal,
            PassiveEffect::PoisonOnHit { .. } => PassiveEffectTag::PoisonOnHit,
            PassiveEffect::GainRage { .. } => PassiveEffectTag::GainRage,
            PassiveEffect::Shield { .. } => PassiveEffectTag::Shield,
        }
    }
}

fn is_valid(trigger: PassiveTrigger, effect: &PassiveEffect) -> bool {
    match effect {
        PassiveEffect::BonusDamage { .. }
        | PassiveEffect::DamageMultiplier { .. }
        | PassiveEffect::Lifesteal { .. }
        | PassiveEffect::PoisonOnHit { .. } => trigger == PassiveTrigger::OnBasicHit,
        PassiveEffect::Shield { .. } => trigger != PassiveTrigger::OnBasicHit,
        PassiveEffect::GainRage { .. } => true,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPassive {
    trigger: PassiveTrigger,
    effect: PassiveEffect,
}

/// A validated passive ability
#[derive(Debug, Clone, PartialEq, Eq, Encode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPassive")]
pub struct Passive {
    trigger: PassiveTrigger,
    effect: PassiveEffect,
}

impl Passive {
    pub fn new(trigger: PassiveTrigger, effect: PassiveEffect) -> EngineResult<Self> {
        if !is_valid(trigger, &effect) {
            return Err(EngineError::InvalidPassive {
                trigger,
                effect: effect.tag(),
            });
        }
        Ok(Self { trigger, effect })
    }

    pub fn trigger(&self) -> PassiveTrigger {
        self.trigger
    }

    pub fn effect(&self) -> &PassiveEffect {
        &self.effect
    }
}

impl Decode for Passive {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let trigger = PassiveTrigger::decode(input)?;
        let effect = PassiveEffect::decode(input)?;
        Passive::new(trigger, effect).map_err(|_| "invalid passive trigger/effect pair".into())
    }
}

impl TryFrom<RawPassive> for Passive {
    type Error = EngineError;

    fn try_from(raw: RawPassive) -> Result<Self, Self::Error> {
        Passive::new(raw.trigger, raw.effect)
    }
}

/// Callback queued by a passive to run once the hit is finalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterHit {
    Lifesteal { amount: Bps },
    Poison { per_turn: i32, turns: u8 },
}

impl AfterHit {
    pub fn apply(
        &self,
        sim: &mut Simulation,
        attacker: InstanceId,
        target: InstanceId,
        outcome: &DamageOutcome,
    ) -> EngineResult<()> {
        match self {
            AfterHit::Lifesteal { amount } => {
                if sim.token(attacker).is_none() {
                    return Err(EngineError::UnknownUnit { instance: attacker });
                }
                let heal = apply_bps(outcome.dealt, *amount);
                if heal > 0 {
                    combat::heal(sim, attacker, heal);
                }
                Ok(())
            }
            AfterHit::Poison { per_turn, turns } => {
                let token = sim
                    .token_mut(target)
                    .ok_or(EngineError::UnknownUnit { instance: target })?;
                status::add(
                    token,
                    StatusEffect::timed(
                        StatusKind::Poison {
                            per_turn: *per_turn,
                            stacks: 1,
                        },
                        *turns,
                    )
                    .from_source(attacker),
                );
                Ok(())
            }
        }
    }
}

/// Mutable context a basic hit carries through its passives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitContext {
    pub flat: i32,
    pub mul: Bps,
    pub after_hit: Vec<AfterHit>,
}

impl Default for HitContext {
    fn default() -> Self {
        Self {
            flat: 0,
            mul: BPS,
            after_hit: Vec::new(),
        }
    }
}

impl HitContext {
    /// Base value after flat and multiplicative passive modifiers
    pub fn modify(&self, base: i32) -> i32 {
        apply_bps(base.saturating_add(self.flat), self.mul).max(0)
    }
}

/// Fire every passive of `unit` bound to `trigger`. Returns how many fired.
pub fn fire(
    sim: &mut Simulation,
    unit: InstanceId,
    trigger: PassiveTrigger,
    ctx: &mut HitContext,
) -> usize {
    let Some(archetype) = sim.token(unit).map(|t| t.archetype) else {
        return 0;
    };
    let passives: Vec<Passive> = match sim.catalog.get(archetype) {
        Some(meta) => meta
            .kit
            .passives
            .iter()
            .filter(|p| p.trigger == trigger)
            .cloned()
            .collect(),
        None => return 0,
    };

    let mut fired = 0;
    for passive in passives {
        match (passive.trigger, passive.effect) {
            (PassiveTrigger::OnBasicHit, PassiveEffect::BonusDamage { flat }) => {
                ctx.flat = ctx.flat.saturating_add(flat);
            }
            (PassiveTrigger::OnBasicHit, PassiveEffect::DamageMultiplier { amount }) => {
                ctx.mul = mul_bps(ctx.mul, BPS + amount);
            }
            (PassiveTrigger::OnBasicHit, PassiveEffect::Lifesteal { amount }) => {
                ctx.after_hit.push(AfterHit::Lifesteal { amount });
            }
            (PassiveTrigger::OnBasicHit, PassiveEffect::PoisonOnHit { per_turn, turns }) => {
                ctx.after_hit.push(AfterHit::Poison { per_turn, turns });
            }
            (_, PassiveEffect::GainRage { amount }) => {
                if let Some(token) = sim.token_mut(unit) {
                    token.gain_rage(amount);
                }
            }
            (PassiveTrigger::OnBasicHit, PassiveEffect::Shield { .. }) => {
                log::warn("shield passive bound to basic hit; skipped");
                continue;
            }
            (_, PassiveEffect::Shield { amount }) => {
                if let Some(token) = sim.token_mut(unit) {
                    combat::grant_shield(token, amount);
                }
            }
            (other, effect) => {
                log::warn(&format!(
                    "passive {:?} cannot fire on {:?}; skipped",
                    effect.tag(),
                    other
                ));
                continue;
            }
        }
        fired += 1;
    }
    fired
}
