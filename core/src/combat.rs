//! Combat resolution: target acquisition, the damage pipeline, heals and
//! shields, and basic-attack orchestration.
//!
//! All arithmetic is integer and floored. Status hooks run inside the
//! pipeline; passive modifiers arrive through a [`HitContext`] the caller
//! filled before the hit.

use alloc::format;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::grid::{self, slot_to_cell};
use crate::hooks::VisualEvent;
use crate::limits::MAX_FOLLOW_UP_ATTACKS;
use crate::log;
use crate::passives::{self, HitContext, PassiveTrigger};
use crate::state::Simulation;
use crate::status::{self, AfterDamage, DamageContext, ShieldAbsorb, StatusEffect, StatusKind};
use crate::token::Token;
use crate::types::{apply_bps, AttackType, Bps, DamageType, InstanceId, BPS};

// ==========================================
// TARGETING
// ==========================================

/// Pick the unit `attacker` should hit.
///
/// Row lanes first, nearest the midline first; then the Manhattan-nearest
/// living opponent. Status redirection (taunt, sleep) has the final word.
pub fn pick_target(sim: &Simulation, attacker: InstanceId) -> Option<InstanceId> {
    let actor = sim.token(attacker)?;
    let defender = actor.side.opponent();
    let pool: Vec<&Token> = sim.living(defender).collect();
    let pool_ids: Vec<InstanceId> = pool.iter().map(|t| t.instance).collect();

    let row = actor.cell.y as u8;
    let in_row = (0..3u8)
        .filter_map(|rank| slot_to_cell(defender, rank * 3 + row + 1))
        .find_map(|cell| pool.iter().find(|t| t.cell == cell).map(|t| t.instance));

    let default = in_row.or_else(|| {
        pool.iter()
            .min_by_key(|t| {
                (
                    grid::manhattan(actor.cell, t.cell),
                    sim.slot_of(t).unwrap_or(u8::MAX),
                    t.serial,
                )
            })
            .map(|t| t.instance)
    });

    status::resolve_target(actor, &pool_ids, AttackType::Basic, default)
}

// ==========================================
// DAMAGE PIPELINE
// ==========================================

/// What kind of hit to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRequest {
    pub dtype: DamageType,
    pub attack_type: AttackType,
    /// Replaces the attacker's power stat as the base value
    pub base_override: Option<i32>,
    pub scale: Bps,
    /// Ability-level defense penetration
    pub penetration: Bps,
}

impl DamageRequest {
    pub fn basic(dtype: DamageType) -> Self {
        Self {
            dtype,
            attack_type: AttackType::Basic,
            base_override: None,
            scale: BPS,
            penetration: 0,
        }
    }

    pub fn ability(dtype: DamageType) -> Self {
        Self {
            attack_type: AttackType::Ability,
            ..Self::basic(dtype)
        }
    }

    pub fn with_scale(mut self, scale: Bps) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_penetration(mut self, penetration: Bps) -> Self {
        self.penetration = penetration;
        self
    }

    pub fn with_base(mut self, base: i32) -> Self {
        self.base_override = Some(base);
        self
    }
}

/// Result of one resolved hit
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    /// Damage after passive and outgoing modifiers, before defense
    pub raw: i32,
    /// Damage after defense and incoming modifiers, before shields
    pub mitigated: i32,
    pub absorbed: i32,
    /// Hp actually removed
    pub dealt: i32,
    pub killed: bool,
}

/// Hp-side result of [`commit_damage`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Committed {
    pub absorbed: i32,
    pub dealt: i32,
    pub killed: bool,
}

/// Run the full damage pipeline from `attacker` to `target`.
pub fn resolve_damage(
    sim: &mut Simulation,
    attacker: InstanceId,
    target: InstanceId,
    req: &DamageRequest,
    hit: &HitContext,
) -> DamageOutcome {
    let (raw, mitigated) = {
        let (Some(a), Some(t)) = (sim.token(attacker), sim.token(target)) else {
            return DamageOutcome::default();
        };
        if !t.alive {
            return DamageOutcome::default();
        }

        let power = req.base_override.unwrap_or_else(|| a.stats.power(req.dtype));
        let base = hit.modify(apply_bps(power, req.scale));
        let mods = status::before_damage(
            a,
            t,
            &DamageContext {
                dtype: req.dtype,
                base,
                attack_type: req.attack_type,
            },
        );

        let mut raw = apply_bps(mods.base, mods.out_mul).max(0);
        if base > 0 {
            raw = raw.max(1);
        }

        let mut mitigated = raw;
        if !mods.ignore_all {
            let defense = t.stats.defense(req.dtype).clamp(0, BPS);
            let pen = req.penetration.max(mods.def_pen).clamp(0, BPS);
            let effective = apply_bps(defense, BPS - pen).clamp(0, BPS);
            mitigated = apply_bps(apply_bps(raw, BPS - effective), mods.in_mul).max(0);
        }
        if raw > 0 {
            mitigated = mitigated.max(1);
        }
        (raw, mitigated)
    };

    let committed = commit(sim, Some(attacker), target, mitigated, req.dtype, true);

    status::after_damage(
        sim,
        attacker,
        target,
        &AfterDamage {
            dealt: committed.dealt,
            absorbed: committed.absorbed,
            dtype: req.dtype,
        },
    );

    let killed = committed.killed || sim.token(target).map(|t| !t.alive).unwrap_or(false);

    sim.fire_visual(VisualEvent::Hit {
        target,
        dealt: committed.dealt,
        absorbed: committed.absorbed,
    });

    DamageOutcome {
        raw,
        mitigated,
        absorbed: committed.absorbed,
        dealt: committed.dealt,
        killed,
    }
}

/// Shield absorption plus hp loss. Used by damage over time and reflect.
pub fn commit_damage(
    sim: &mut Simulation,
    source: Option<InstanceId>,
    target: InstanceId,
    amount: i32,
    dtype: DamageType,
) -> Committed {
    commit(sim, source, target, amount, dtype, true)
}

/// Hp loss that bypasses shields. Used by execute.
pub fn commit_damage_unshielded(
    sim: &mut Simulation,
    source: Option<InstanceId>,
    target: InstanceId,
    amount: i32,
    dtype: DamageType,
) -> Committed {
    commit(sim, source, target, amount, dtype, false)
}

fn commit(
    sim: &mut Simulation,
    source: Option<InstanceId>,
    target: InstanceId,
    amount: i32,
    dtype: DamageType,
    shielded: bool,
) -> Committed {
    let now = sim.now;
    let rage_on_damaged = sim.config.rage_on_damaged;
    let Some(token) = sim.token_mut(target) else {
        return Committed::default();
    };
    if !token.alive || amount <= 0 {
        return Committed::default();
    }

    let ShieldAbsorb { absorbed, remain } = if shielded {
        status::absorb_shield(token, amount, dtype)
    } else {
        ShieldAbsorb {
            absorbed: 0,
            remain: amount,
        }
    };

    let mut dealt = token.lose_hp(remain);
    let mut killed = false;
    if token.hp == 0 && dealt > 0 {
        if status::intercept_lethal(token) {
            token.hp = 1;
            dealt -= 1;
            log::debug("combat", &format!("unit {} refused to fall", target.0));
        } else {
            killed = token.mark_dead(now);
        }
    }
    if dealt > 0 {
        token.gain_rage(rage_on_damaged);
    }

    if killed {
        let who = source.map(|s| s.0 as i64).unwrap_or(-1);
        log::action("death", &format!("unit {} killed by {}", target.0, who));
        sim.fire_visual(VisualEvent::Death { instance: target });
    }

    Committed {
        absorbed,
        dealt,
        killed,
    }
}

// ==========================================
// HEAL / SHIELD
// ==========================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealOutcome {
    pub healed: i32,
    pub overheal: i32,
}

/// Restore hp up to the unit's headroom. The excess is reported, not applied.
pub fn heal(sim: &mut Simulation, target: InstanceId, amount: i32) -> HealOutcome {
    let amount = amount.max(0);
    let healed = match sim.token_mut(target) {
        Some(token) if token.alive => token.gain_hp(amount),
        _ => 0,
    };
    HealOutcome {
        healed,
        overheal: amount - healed,
    }
}

/// Add to an existing shield, or attach a new permanent one.
pub fn grant_shield(token: &mut Token, amount: i32) {
    if amount <= 0 {
        return;
    }
    status::add(token, StatusEffect::permanent(StatusKind::Shield { amount }));
}

// ==========================================
// BASIC ATTACKS
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackReport {
    pub target: InstanceId,
    pub outcome: DamageOutcome,
}

/// One basic attack: target, passives, melee timing, damage, after-hit.
pub fn basic_attack(sim: &mut Simulation, actor: InstanceId) -> Option<AttackReport> {
    let alive = sim.token(actor).map(|t| t.alive).unwrap_or(false);
    if !alive {
        return None;
    }
    let Some(target) = pick_target(sim, actor) else {
        log::debug("combat", &format!("unit {} has no target", actor.0));
        return None;
    };

    let mut ctx = HitContext::default();
    passives::fire(sim, actor, PassiveTrigger::OnBasicHit, &mut ctx);

    let melee_ms = sim.config.melee_ms;
    sim.fire_visual(VisualEvent::Melee {
        attacker: actor,
        target,
        duration_ms: melee_ms,
    });
    let now = sim.now;
    sim.turn.extend_busy(now, melee_ms);

    let dtype = basic_damage_type(sim, actor);
    let outcome = resolve_damage(sim, actor, target, &DamageRequest::basic(dtype), &ctx);
    log::action(
        "basic_attack",
        &format!(
            "{} -> {}: raw={} dealt={} absorbed={} killed={}",
            actor.0, target.0, outcome.raw, outcome.dealt, outcome.absorbed, outcome.killed
        ),
    );

    run_after_hit(sim, actor, target, &ctx, &outcome);

    if outcome.killed {
        passives::fire(sim, actor, PassiveTrigger::OnKill, &mut HitContext::default());
    }

    let rage = sim.config.rage_per_attack;
    if let Some(token) = sim.token_mut(actor) {
        token.gain_rage(rage);
    }

    Some(AttackReport { target, outcome })
}

/// Run collected after-hit callbacks. A failing callback is logged and the
/// rest still run.
pub fn run_after_hit(
    sim: &mut Simulation,
    attacker: InstanceId,
    target: InstanceId,
    ctx: &HitContext,
    outcome: &DamageOutcome,
) {
    for callback in &ctx.after_hit {
        if let Err(e) = callback.apply(sim, attacker, target, outcome) {
            log::warn(&format!("after-hit callback {:?} failed: {}", callback, e));
        }
    }
}

/// Repeat the basic attack within the same turn. Stops if the actor dies or
/// runs out of targets. Returns the number of attacks made.
pub fn follow_up_attacks(sim: &mut Simulation, actor: InstanceId, count: u8) -> u8 {
    let cap = sim.config.follow_up_cap.min(MAX_FOLLOW_UP_ATTACKS);
    let mut made = 0;
    for _ in 0..count.min(cap) {
        if !sim.token(actor).map(|t| t.alive).unwrap_or(false) {
            break;
        }
        if basic_attack(sim, actor).is_none() {
            break;
        }
        made += 1;
    }
    made
}

fn basic_damage_type(sim: &Simulation, unit: InstanceId) -> DamageType {
    sim.token(unit)
        .and_then(|t| sim.catalog.get(t.archetype))
        .map(|meta| meta.basic_damage)
        .unwrap_or(DamageType::Physical)
}
