//! Status effect engine
//!
//! Buffs and debuffs live on the unit they affect. Combat and ultimates query
//! this module through a small set of hooks: [`before_damage`],
//! [`after_damage`], [`absorb_shield`] and [`resolve_target`]. Duration
//! bookkeeping happens once per owning unit's turn, driven by the scheduler.

use alloc::format;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::combat;
use crate::limits::MAX_STATUS_STACKS;
use crate::log;
use crate::state::Simulation;
use crate::token::Token;
use crate::types::{apply_bps, mul_bps, AttackType, Bps, DamageType, InstanceId, BPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    Buff,
    Debuff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", content = "turns", rename_all = "camelCase")]
pub enum StatusDuration {
    Turns(u8),
    Permanent,
}

/// How a new application merges with an existing status of the same tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    /// Replace the amount, keep the longer duration
    Refresh,
    /// Sum the amounts
    Additive,
    /// Add stacks up to `max`, refresh the duration
    Stack { max: u8 },
    /// Ignore re-application while present
    Unique,
}

/// Fieldless status identifier used for lookups
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum StatusTag {
    Shield,
    DamageReduction,
    Vulnerable,
    Empower,
    Piercing,
    TrueStrike,
    Reflect,
    Poison,
    Execute,
    Undying,
    Sleep,
    Silence,
    Haste,
    Taunt,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatusKind {
    /// Absorbs incoming damage before hp
    Shield { amount: i32 },
    /// Reduces incoming damage by a fraction
    DamageReduction { amount: Bps },
    /// Increases incoming damage by a fraction
    Vulnerable { amount: Bps },
    /// Increases outgoing damage by a fraction
    Empower { amount: Bps },
    /// Ignores a fraction of the defender's mitigation
    Piercing { amount: Bps },
    /// Outgoing damage skips mitigation entirely
    TrueStrike,
    /// Returns a fraction of damage taken to the attacker
    Reflect { amount: Bps },
    /// Damage over time at the owner's turn start
    #[serde(rename_all = "camelCase")]
    Poison { per_turn: i32, stacks: u8 },
    /// Kills targets left below a hp fraction
    Execute { threshold: Bps },
    /// Survive one lethal hit at 1 hp
    Undying,
    /// Cannot act
    Sleep,
    /// Cannot cast the ultimate
    Silence,
    /// Extra follow-up attacks each turn
    #[serde(rename_all = "camelCase")]
    Haste { extra_attacks: u8 },
    /// Basic attacks must target `source`
    Taunt { source: InstanceId },
}

impl StatusKind {
    pub fn tag(&self) -> StatusTag {
        match self {
            StatusKind::Shield { .. } => StatusTag::Shield,
            StatusKind::DamageReduction { .. } => StatusTag::DamageReduction,
            StatusKind::Vulnerable { .. } => StatusTag::Vulnerable,
            StatusKind::Empower { .. } => StatusTag::Empower,
            StatusKind::Piercing { .. } => StatusTag::Piercing,
            StatusKind::TrueStrike => StatusTag::TrueStrike,
            StatusKind::Reflect { .. } => StatusTag::Reflect,
            StatusKind::Poison { .. } => StatusTag::Poison,
            StatusKind::Execute { .. } => StatusTag::Execute,
            StatusKind::Undying => StatusTag::Undying,
            StatusKind::Sleep => StatusTag::Sleep,
            StatusKind::Silence => StatusTag::Silence,
            StatusKind::Haste { .. } => StatusTag::Haste,
            StatusKind::Taunt { .. } => StatusTag::Taunt,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            StatusKind::Vulnerable { .. }
            | StatusKind::Poison { .. }
            | StatusKind::Sleep
            | StatusKind::Silence
            | StatusKind::Taunt { .. } => Polarity::Debuff,
            _ => Polarity::Buff,
        }
    }

    pub fn stacking(&self) -> Stacking {
        match self {
            StatusKind::Shield { .. } => Stacking::Additive,
            StatusKind::Poison { .. } => Stacking::Stack {
                max: MAX_STATUS_STACKS,
            },
            StatusKind::TrueStrike | StatusKind::Undying => Stacking::Unique,
            _ => Stacking::Refresh,
        }
    }
}

/// A status attached to a unit
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: StatusDuration,
    pub purgeable: bool,
    pub source: Option<InstanceId>,
    /// Applied during the owner's own turn; skips that turn's countdown
    #[serde(default)]
    pub held: bool,
}

impl StatusEffect {
    pub fn timed(kind: StatusKind, turns: u8) -> Self {
        Self {
            kind,
            duration: StatusDuration::Turns(turns),
            purgeable: true,
            source: None,
            held: false,
        }
    }

    pub fn permanent(kind: StatusKind) -> Self {
        Self {
            kind,
            duration: StatusDuration::Permanent,
            purgeable: true,
            source: None,
            held: false,
        }
    }

    pub fn unpurgeable(mut self) -> Self {
        self.purgeable = false;
        self
    }

    pub fn from_source(mut self, source: InstanceId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn tag(&self) -> StatusTag {
        self.kind.tag()
    }

    pub fn polarity(&self) -> Polarity {
        self.kind.polarity()
    }
}

/// Which statuses a purge removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
    All,
    PurgeableOnly,
}

// ==========================================
// LOOKUP / ATTACH / PURGE
// ==========================================

pub fn get(token: &Token, tag: StatusTag) -> Option<&StatusEffect> {
    token.statuses.iter().find(|s| s.tag() == tag)
}

pub fn has(token: &Token, tag: StatusTag) -> bool {
    get(token, tag).is_some()
}

fn longer(a: StatusDuration, b: StatusDuration) -> StatusDuration {
    match (a, b) {
        (StatusDuration::Permanent, _) | (_, StatusDuration::Permanent) => {
            StatusDuration::Permanent
        }
        (StatusDuration::Turns(x), StatusDuration::Turns(y)) => StatusDuration::Turns(x.max(y)),
    }
}

/// Attach a status, merging with an existing one per its stacking rule.
/// Dead units accept nothing.
pub fn add(token: &mut Token, mut effect: StatusEffect) {
    if !token.alive {
        return;
    }
    let acting = token.acting;
    let tag = effect.tag();
    let Some(index) = token.statuses.iter().position(|s| s.tag() == tag) else {
        effect.held = acting;
        token.statuses.push(effect);
        return;
    };
    let existing = &mut token.statuses[index];

    match effect.kind.stacking() {
        Stacking::Unique => return,
        Stacking::Refresh => {
            existing.duration = longer(existing.duration, effect.duration);
            existing.kind = effect.kind;
            existing.source = effect.source.or(existing.source);
        }
        Stacking::Additive => {
            if let (StatusKind::Shield { amount: have }, StatusKind::Shield { amount: extra }) =
                (&mut existing.kind, &effect.kind)
            {
                *have = have.saturating_add(*extra);
            }
            existing.duration = longer(existing.duration, effect.duration);
        }
        Stacking::Stack { max } => {
            if let (
                StatusKind::Poison { per_turn, stacks },
                StatusKind::Poison {
                    per_turn: new_per_turn,
                    stacks: new_stacks,
                },
            ) = (&mut existing.kind, &effect.kind)
            {
                *stacks = stacks.saturating_add(*new_stacks).min(max);
                *per_turn = (*per_turn).max(*new_per_turn);
            }
            existing.duration = longer(existing.duration, effect.duration);
        }
    }
    existing.held |= acting;
}

/// Remove statuses. Returns how many were removed.
pub fn purge(token: &mut Token, scope: PurgeScope) -> usize {
    let before = token.statuses.len();
    match scope {
        PurgeScope::All => token.statuses.clear(),
        PurgeScope::PurgeableOnly => token.statuses.retain(|s| !s.purgeable),
    }
    before - token.statuses.len()
}

pub fn remove(token: &mut Token, tag: StatusTag) -> bool {
    let before = token.statuses.len();
    token.statuses.retain(|s| s.tag() != tag);
    before != token.statuses.len()
}

pub fn clear_on_death(token: &mut Token) {
    token.statuses.clear();
    token.acting = false;
}

// ==========================================
// QUERIES USED BY THE SCHEDULER
// ==========================================

pub fn is_incapacitated(token: &Token) -> bool {
    has(token, StatusTag::Sleep)
}

pub fn is_silenced(token: &Token) -> bool {
    has(token, StatusTag::Silence)
}

pub fn extra_attacks(token: &Token) -> u8 {
    match get(token, StatusTag::Haste).map(|s| &s.kind) {
        Some(StatusKind::Haste { extra_attacks }) => *extra_attacks,
        _ => 0,
    }
}

pub fn shield_amount(token: &Token) -> i32 {
    match get(token, StatusTag::Shield).map(|s| &s.kind) {
        Some(StatusKind::Shield { amount }) => *amount,
        _ => 0,
    }
}

// ==========================================
// COMBAT HOOKS
// ==========================================

/// Damage context handed to [`before_damage`]
#[derive(Debug, Clone, Copy)]
pub struct DamageContext {
    pub dtype: DamageType,
    pub base: i32,
    pub attack_type: AttackType,
}

/// Aggregated modifiers from both sides' statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageMods {
    pub base: i32,
    pub out_mul: Bps,
    pub in_mul: Bps,
    pub def_pen: Bps,
    pub ignore_all: bool,
}

pub fn before_damage(attacker: &Token, target: &Token, ctx: &DamageContext) -> DamageMods {
    let mut mods = DamageMods {
        base: ctx.base,
        out_mul: BPS,
        in_mul: BPS,
        def_pen: 0,
        ignore_all: false,
    };

    for status in &attacker.statuses {
        match status.kind {
            StatusKind::Empower { amount } => mods.out_mul = mul_bps(mods.out_mul, BPS + amount),
            StatusKind::Piercing { amount } => mods.def_pen = mods.def_pen.max(amount),
            StatusKind::TrueStrike => mods.ignore_all = true,
            _ => {}
        }
    }

    for status in &target.statuses {
        match status.kind {
            StatusKind::DamageReduction { amount } => {
                mods.in_mul = mul_bps(mods.in_mul, (BPS - amount).max(0))
            }
            StatusKind::Vulnerable { amount } => mods.in_mul = mul_bps(mods.in_mul, BPS + amount),
            _ => {}
        }
    }

    mods
}

/// Finalized hit handed to [`after_damage`]
#[derive(Debug, Clone, Copy)]
pub struct AfterDamage {
    pub dealt: i32,
    pub absorbed: i32,
    pub dtype: DamageType,
}

/// Post-hit reactions: reflect on the target, execute on the attacker.
pub fn after_damage(
    sim: &mut Simulation,
    attacker: InstanceId,
    target: InstanceId,
    ctx: &AfterDamage,
) {
    let reflect = sim.token(target).and_then(|t| match get(t, StatusTag::Reflect).map(|s| &s.kind) {
        Some(StatusKind::Reflect { amount }) => Some(*amount),
        _ => None,
    });
    if let Some(amount) = reflect {
        let reflected = apply_bps(ctx.dealt, amount);
        if reflected > 0 {
            log::debug("status", &format!("reflect {} to unit {}", reflected, attacker.0));
            combat::commit_damage(sim, Some(target), attacker, reflected, ctx.dtype);
        }
    }

    let threshold = sim
        .token(attacker)
        .and_then(|t| match get(t, StatusTag::Execute).map(|s| &s.kind) {
            Some(StatusKind::Execute { threshold }) => Some(*threshold),
            _ => None,
        });
    if let Some(threshold) = threshold {
        let execute_hp = sim.token(target).and_then(|t| {
            let below = (t.hp as i64) * (BPS as i64) < (t.hp_max() as i64) * (threshold as i64);
            (t.alive && below).then_some(t.hp)
        });
        if let Some(hp) = execute_hp {
            log::debug("status", &format!("execute unit {} at {} hp", target.0, hp));
            combat::commit_damage_unshielded(sim, Some(attacker), target, hp, ctx.dtype);
        }
    }
}

/// Shield consumption result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldAbsorb {
    pub absorbed: i32,
    pub remain: i32,
}

/// Let the target's shield soak damage first. An emptied shield is removed.
pub fn absorb_shield(target: &mut Token, incoming: i32, _dtype: DamageType) -> ShieldAbsorb {
    let incoming = incoming.max(0);
    let Some(index) = target.statuses.iter().position(|s| s.tag() == StatusTag::Shield) else {
        return ShieldAbsorb {
            absorbed: 0,
            remain: incoming,
        };
    };

    let mut depleted = false;
    let mut absorbed = 0;
    if let StatusKind::Shield { amount } = &mut target.statuses[index].kind {
        absorbed = (*amount).max(0).min(incoming);
        *amount -= absorbed;
        depleted = *amount <= 0;
    }
    if depleted {
        target.statuses.remove(index);
    }

    ShieldAbsorb {
        absorbed,
        remain: incoming - absorbed,
    }
}

/// Lethal-damage hook. Consumes `Undying` and reports whether death was prevented.
pub fn intercept_lethal(target: &mut Token) -> bool {
    remove(target, StatusTag::Undying)
}

/// Apply taunt-style redirection. `None` means the actor skips this action.
pub fn resolve_target(
    actor: &Token,
    pool: &[InstanceId],
    _attack_type: AttackType,
    default: Option<InstanceId>,
) -> Option<InstanceId> {
    if is_incapacitated(actor) {
        return None;
    }
    if let Some(StatusKind::Taunt { source }) = get(actor, StatusTag::Taunt).map(|s| &s.kind) {
        if pool.contains(source) {
            return Some(*source);
        }
    }
    default
}

// ==========================================
// TURN BOUNDARIES
// ==========================================

/// Damage-over-time ticks at the start of the owner's turn
pub fn on_turn_start(sim: &mut Simulation, unit: InstanceId) {
    let poison = sim.token(unit).and_then(|t| match get(t, StatusTag::Poison) {
        Some(StatusEffect {
            kind: StatusKind::Poison { per_turn, stacks },
            source,
            ..
        }) => Some((per_turn.saturating_mul(*stacks as i32), *source)),
        _ => None,
    });
    if let Some((amount, source)) = poison {
        if amount > 0 {
            log::debug("status", &format!("poison ticks {} on unit {}", amount, unit.0));
            combat::commit_damage(sim, source, unit, amount, DamageType::Arcane);
        }
    }
}

/// Decrement timed statuses once and drop the expired ones. Statuses the
/// unit gained during this turn are only released, so `Turns(n)` always
/// covers `n` of the owner's later turns.
pub fn on_turn_end(token: &mut Token) {
    token.acting = false;
    for status in token.statuses.iter_mut() {
        if status.held {
            status.held = false;
            continue;
        }
        if let StatusDuration::Turns(turns) = &mut status.duration {
            *turns = turns.saturating_sub(1);
        }
    }
    token
        .statuses
        .retain(|s| !matches!(s.duration, StatusDuration::Turns(0)));
}
