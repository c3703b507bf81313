//! Ultimate resolver.
//!
//! One branch per [`Ultimate`] variant. Each branch holds the scheduler busy
//! for its configured animation time. Summon clears the caster's meter
//! itself; the scheduler clears it for every other variant.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::catalog::{Ultimate, UltimateKind, UnitClass};
use crate::chain::{self, ImmediateDescriptor};
use crate::combat::{self, DamageRequest};
use crate::error::{EngineError, EngineResult};
use crate::grid::{self, NeighborPattern};
use crate::hooks::VisualEvent;
use crate::limits::{MAX_MINIONS_PER_CASTER, MAX_STRIKE_HITS};
use crate::log;
use crate::passives::{self, HitContext, PassiveTrigger};
use crate::state::Simulation;
use crate::status::{self, PurgeScope, StatusEffect, StatusKind};
use crate::token::{MinionLink, Token};
use crate::types::{
    apply_bps, mul_bps, ArchetypeId, AttackType, Bps, DamageType, InstanceId, Side, BPS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UltimateOutcome {
    /// `None` when the caster has no ultimate
    pub kind: Option<UltimateKind>,
    pub busy_ms: u64,
    /// Units the ultimate touched
    pub affected: Vec<InstanceId>,
}

/// Cast `caster`'s ultimate.
pub fn cast(sim: &mut Simulation, caster: InstanceId) -> UltimateOutcome {
    let ultimate = sim
        .token(caster)
        .and_then(|t| sim.catalog.get(t.archetype))
        .and_then(|meta| meta.kit.ultimate.clone());

    let Some(ultimate) = ultimate else {
        if let Some(token) = sim.token_mut(caster) {
            token.rage = 0;
        }
        log::debug("ultimate", &format!("unit {} has no ultimate; meter drained", caster.0));
        return UltimateOutcome {
            kind: None,
            busy_ms: 0,
            affected: Vec::new(),
        };
    };

    let kind = ultimate.kind();
    let busy_ms = sim.config.timings.for_kind(kind);
    log::action("ultimate", &format!("unit {} casts {}", caster.0, kind.as_str()));
    sim.fire_visual(VisualEvent::Ultimate {
        caster,
        kind: kind.as_str().into(),
        duration_ms: busy_ms,
    });
    let now = sim.now;
    sim.turn.extend_busy(now, busy_ms);

    let affected = match ultimate {
        Ultimate::Summon {
            minion,
            count,
            limit,
            pattern,
            hp_ratio,
            attack_ratio,
            ttl_turns,
        } => {
            let plan = SummonPlan {
                minion,
                count,
                limit,
                pattern,
                hp_ratio,
                attack_ratio,
                ttl_turns,
            };
            let spawned = summon(sim, caster, &plan).unwrap_or_else(|e| {
                log::warn(&format!("summon by unit {} rejected: {}", caster.0, e));
                Vec::new()
            });
            if let Some(token) = sim.token_mut(caster) {
                token.rage = 0;
            }
            spawned
        }
        Ultimate::Drain { scale } => drain(sim, caster, scale),
        Ultimate::StrikeLaneMid {
            hits,
            scale,
            dtype,
            leader_bonus,
            penetration,
            tag_as_basic,
        } => strike_lane(
            sim,
            caster,
            &LaneStrike {
                hits,
                scale,
                dtype,
                leader_bonus,
                penetration,
                tag_as_basic,
            },
        ),
        Ultimate::SelfBuff {
            hp_cost,
            reduction,
            turns,
        } => self_buff(sim, caster, hp_cost, reduction, turns),
        Ultimate::Sleep { targets, turns } => sleep(sim, caster, targets, turns),
        Ultimate::Revive {
            count,
            hp_ratio,
            rage,
            lock_skills_turns,
        } => revive(sim, caster, count, hp_ratio, rage, lock_skills_turns),
        Ultimate::EqualizeHp {
            count,
            include_leader,
        } => equalize_hp(sim, caster, count, include_leader),
        Ultimate::Haste {
            allies,
            extra_attacks,
            turns,
        } => haste(sim, caster, allies, extra_attacks, turns),
    };

    UltimateOutcome {
        kind: Some(kind),
        busy_ms,
        affected,
    }
}

/// Living units of `side` ordered by distance from `from`, then slot, then
/// birth order
fn nearest(sim: &Simulation, side: Side, from: &Token) -> Vec<InstanceId> {
    let mut pool: Vec<&Token> = sim.living(side).filter(|t| t.instance != from.instance).collect();
    pool.sort_by_key(|t| {
        (
            grid::manhattan(from.cell, t.cell),
            sim.slot_of(t).unwrap_or(u8::MAX),
            t.serial,
        )
    });
    pool.into_iter().map(|t| t.instance).collect()
}

// ==========================================
// SUMMON
// ==========================================

struct SummonPlan {
    minion: ArchetypeId,
    count: u8,
    limit: u8,
    pattern: NeighborPattern,
    hp_ratio: Bps,
    attack_ratio: Bps,
    ttl_turns: u8,
}

fn summon(
    sim: &mut Simulation,
    caster: InstanceId,
    plan: &SummonPlan,
) -> EngineResult<Vec<InstanceId>> {
    let token = sim.token(caster).ok_or(EngineError::UnknownUnit { instance: caster })?;
    let meta = sim.catalog.require(token.archetype)?;
    if meta.class != UnitClass::Summoner {
        return Err(EngineError::NotASummoner {
            archetype: token.archetype,
        });
    }
    sim.catalog.require(plan.minion)?;

    let side = token.side;
    let slot = sim.slot_of(token).ok_or(EngineError::InvalidCell {
        x: token.cell.x,
        y: token.cell.y,
    })?;
    let hp = apply_bps(token.hp, plan.hp_ratio).max(1);
    let attack = apply_bps(token.stats.attack, plan.attack_ratio).max(1);

    let limit = plan.limit.min(MAX_MINIONS_PER_CASTER) as usize;
    let free = grid::free_neighbors(&sim.tokens, &sim.queued, side, plan.pattern, slot);
    let to_spawn = free.len().min(plan.count as usize).min(limit);
    if to_spawn == 0 {
        log::debug("ultimate", &format!("unit {} has no room to summon", caster.0));
        return Ok(Vec::new());
    }

    let mut existing: Vec<(u32, InstanceId)> = sim
        .tokens
        .iter()
        .filter(|t| t.alive && t.minion.as_ref().map(|m| m.owner) == Some(caster))
        .map(|t| (t.serial, t.instance))
        .collect();
    existing.sort();
    let overflow = (existing.len() + to_spawn).saturating_sub(limit);
    for (_, old) in existing.into_iter().take(overflow) {
        log::debug("ultimate", &format!("evicting minion {} of unit {}", old.0, caster.0));
        sim.remove_token(old);
    }

    let mut spawned = Vec::with_capacity(to_spawn);
    for slot in free.into_iter().take(to_spawn) {
        let desc = ImmediateDescriptor {
            archetype: plan.minion,
            side,
            slot,
            hp: Some(hp),
            attack: Some(attack),
            minion: Some(MinionLink {
                owner: caster,
                ttl: plan.ttl_turns,
            }),
        };
        match chain::enqueue_immediate(sim, desc) {
            Ok(id) => spawned.push(id),
            Err(e) => log::warn(&format!("minion at slot {} not placed: {}", slot, e)),
        }
    }
    Ok(spawned)
}

// ==========================================
// DAMAGE BRANCHES
// ==========================================

fn drain(sim: &mut Simulation, caster: InstanceId, scale: Bps) -> Vec<InstanceId> {
    let Some(side) = sim.token(caster).map(|t| t.side) else {
        return Vec::new();
    };
    let foes = sim.living_ids(side.opponent());
    let req = DamageRequest::ability(DamageType::Arcane).with_scale(scale);
    let mut total = 0i32;
    for foe in &foes {
        let outcome = combat::resolve_damage(sim, caster, *foe, &req, &HitContext::default());
        total = total.saturating_add(outcome.dealt);
    }

    let healed = combat::heal(sim, caster, total);
    if healed.overheal > 0 {
        if let Some(token) = sim.token_mut(caster) {
            combat::grant_shield(token, healed.overheal);
        }
    }
    log::debug(
        "ultimate",
        &format!("drain dealt {}, healed {}, shielded {}", total, healed.healed, healed.overheal),
    );
    foes
}

struct LaneStrike {
    hits: u8,
    scale: Bps,
    dtype: DamageType,
    leader_bonus: Bps,
    penetration: Bps,
    tag_as_basic: bool,
}

fn strike_lane(sim: &mut Simulation, caster: InstanceId, strike: &LaneStrike) -> Vec<InstanceId> {
    let Some(primary) = combat::pick_target(sim, caster) else {
        return Vec::new();
    };
    let Some((side, column)) = sim
        .token(caster)
        .zip(sim.token(primary))
        .map(|(c, p)| (c.side, p.cell.x))
    else {
        return Vec::new();
    };

    let mut lane: Vec<&Token> =
        sim.living(side.opponent()).filter(|t| t.cell.x == column).collect();
    lane.sort_by_key(|t| (sim.slot_of(t).unwrap_or(u8::MAX), t.serial));
    let lane: Vec<(InstanceId, bool)> = lane.iter().map(|t| (t.instance, t.leader)).collect();

    let hits = strike.hits.min(MAX_STRIKE_HITS);
    for (foe, leader) in &lane {
        let scale = if *leader {
            mul_bps(strike.scale, BPS + strike.leader_bonus)
        } else {
            strike.scale
        };
        let mut req = DamageRequest::ability(strike.dtype)
            .with_scale(scale)
            .with_penetration(strike.penetration);
        if strike.tag_as_basic {
            req.attack_type = AttackType::Basic;
        }

        for _ in 0..hits {
            let caster_alive = sim.token(caster).map(|t| t.alive).unwrap_or(false);
            let foe_alive = sim.token(*foe).map(|t| t.alive).unwrap_or(false);
            if !caster_alive || !foe_alive {
                break;
            }
            let mut ctx = HitContext::default();
            if strike.tag_as_basic {
                passives::fire(sim, caster, PassiveTrigger::OnBasicHit, &mut ctx);
            }
            let outcome = combat::resolve_damage(sim, caster, *foe, &req, &ctx);
            combat::run_after_hit(sim, caster, *foe, &ctx, &outcome);
        }
    }
    lane.into_iter().map(|(id, _)| id).collect()
}

// ==========================================
// SUPPORT BRANCHES
// ==========================================

fn self_buff(
    sim: &mut Simulation,
    caster: InstanceId,
    hp_cost: Bps,
    reduction: Bps,
    turns: u8,
) -> Vec<InstanceId> {
    let Some(token) = sim.token_mut(caster) else {
        return Vec::new();
    };
    let cost = apply_bps(token.hp_max(), hp_cost).min(token.hp - 1).max(0);
    token.lose_hp(cost);
    status::add(
        token,
        StatusEffect::timed(StatusKind::DamageReduction { amount: reduction }, turns)
            .from_source(caster),
    );
    vec![caster]
}

fn sleep(sim: &mut Simulation, caster: InstanceId, targets: u8, turns: u8) -> Vec<InstanceId> {
    let Some(token) = sim.token(caster) else {
        return Vec::new();
    };
    let chosen: Vec<InstanceId> = nearest(sim, token.side.opponent(), token)
        .into_iter()
        .take(targets as usize)
        .collect();
    for id in &chosen {
        if let Some(foe) = sim.token_mut(*id) {
            status::add(foe, StatusEffect::timed(StatusKind::Sleep, turns).from_source(caster));
        }
    }
    chosen
}

fn revive(
    sim: &mut Simulation,
    caster: InstanceId,
    count: u8,
    hp_ratio: Bps,
    rage: i32,
    lock_skills_turns: u8,
) -> Vec<InstanceId> {
    let Some(side) = sim.token(caster).map(|t| t.side) else {
        return Vec::new();
    };
    let mut fallen: Vec<&Token> = sim
        .tokens
        .iter()
        .filter(|t| t.side == side && !t.alive && t.died_at.is_some() && !t.is_minion())
        .filter(|t| !sim.cell_reserved(t.cell))
        .collect();
    fallen.sort_by(|a, b| b.died_at.cmp(&a.died_at).then(b.serial.cmp(&a.serial)));
    let chosen: Vec<InstanceId> = fallen.iter().take(count as usize).map(|t| t.instance).collect();

    for id in &chosen {
        let Some(token) = sim.token_mut(*id) else {
            continue;
        };
        status::purge(token, PurgeScope::All);
        let hp = apply_bps(token.hp_max(), hp_ratio).max(1);
        token.revive(hp, rage);
        if lock_skills_turns > 0 {
            let lock = StatusEffect::timed(StatusKind::Silence, lock_skills_turns);
            status::add(token, lock.from_source(caster));
        }
        log::action("revive", &format!("unit {} back at {} hp", id.0, hp));
    }
    chosen
}

fn equalize_hp(
    sim: &mut Simulation,
    caster: InstanceId,
    count: u8,
    include_leader: bool,
) -> Vec<InstanceId> {
    let Some(side) = sim.token(caster).map(|t| t.side) else {
        return Vec::new();
    };
    let mut pool: Vec<&Token> = sim.living(side).filter(|t| !t.leader).collect();
    // a.hp / a.max < b.hp / b.max, without division
    pool.sort_by(|a, b| {
        let lhs = a.hp as i64 * b.hp_max() as i64;
        let rhs = b.hp as i64 * a.hp_max() as i64;
        lhs.cmp(&rhs).then(a.serial.cmp(&b.serial))
    });
    let mut chosen: Vec<&Token> = pool.into_iter().take(count as usize).collect();
    if include_leader {
        if let Some(leader) = sim.living(side).find(|t| t.leader) {
            chosen.push(leader);
        }
    }

    let Some(best) = chosen
        .iter()
        .max_by(|a, b| (a.hp as i64 * b.hp_max() as i64).cmp(&(b.hp as i64 * a.hp_max() as i64)))
        .map(|t| (t.hp as i64, t.hp_max().max(1) as i64))
    else {
        return Vec::new();
    };

    let plan: Vec<(InstanceId, i32)> = chosen
        .iter()
        .map(|t| {
            let target = (t.hp_max() as i64 * best.0 / best.1) as i32;
            (t.instance, target - t.hp)
        })
        .collect();
    for (id, amount) in &plan {
        if *amount > 0 {
            combat::heal(sim, *id, *amount);
        }
    }
    plan.into_iter().map(|(id, _)| id).collect()
}

fn haste(
    sim: &mut Simulation,
    caster: InstanceId,
    allies: u8,
    extra_attacks: u8,
    turns: u8,
) -> Vec<InstanceId> {
    let Some(token) = sim.token(caster) else {
        return Vec::new();
    };
    let mut chosen = vec![caster];
    chosen.extend(nearest(sim, token.side, token).into_iter().take(allies as usize));
    for id in &chosen {
        if let Some(ally) = sim.token_mut(*id) {
            status::add(
                ally,
                StatusEffect::timed(StatusKind::Haste { extra_attacks }, turns).from_source(caster),
            );
        }
    }
    chosen
}
