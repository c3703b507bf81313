//! Turn scheduler.
//!
//! Each side takes a pass over its slots in ascending order, one unit per
//! step. When no unit is left past the pointer the phase flips; a full
//! ally-then-enemy round is one cycle. Animation time is data: actions push
//! `busy_until` forward and the scheduler simply declines to step until the
//! clock has passed it.

use alloc::format;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::catalog::UltimateKind;
use crate::chain;
use crate::combat;
use crate::log;
use crate::passives::{self, HitContext, PassiveTrigger};
use crate::state::Simulation;
use crate::status;
use crate::types::{InstanceId, Side, Sides, Slot};
use crate::ultimate;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    pub phase: Side,
    /// Last slot each side processed in its current pass; 0 before the first
    pub last_slot: Sides<Slot>,
    pub cycle: u32,
    /// Phase flips since the start of the match
    pub pass: u32,
    pub busy_until: u64,
    pub winner: Option<Side>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            phase: Side::Ally,
            last_slot: Sides::new(0, 0),
            cycle: 1,
            pass: 0,
            busy_until: 0,
            winner: None,
        }
    }
}

impl TurnState {
    pub fn last_slot(&self, side: Side) -> Slot {
        *self.last_slot.get(side)
    }

    /// Hold the scheduler until at least `now + ms`. Never shortens.
    pub fn extend_busy(&mut self, now: u64, ms: u64) {
        self.busy_until = self.busy_until.max(now.saturating_add(ms));
    }

    pub fn is_busy(&self, now: u64) -> bool {
        now < self.busy_until
    }

    fn advance_phase(&mut self) {
        match self.phase {
            Side::Ally => {
                self.phase = Side::Enemy;
                self.last_slot.enemy = 0;
            }
            Side::Enemy => {
                self.phase = Side::Ally;
                self.cycle += 1;
                self.last_slot.ally = 0;
            }
        }
        self.pass += 1;
    }
}

/// Why a unit's turn produced no action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipCause {
    Died,
    Incapacitated,
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionKind {
    #[serde(rename_all = "camelCase")]
    Basic { target: InstanceId, follow_ups: u8 },
    Ultimate { kind: Option<UltimateKind> },
    Skipped { cause: SkipCause },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepOutcome {
    Finished { winner: Side },
    Busy { until: u64 },
    Acted {
        instance: InstanceId,
        slot: Slot,
        action: ActionKind,
    },
    PhaseAdvanced { phase: Side, cycle: u32 },
}

/// Cycle in which a placement at `slot` on `side` would resolve
pub fn eligible_cycle(turn: &TurnState, side: Side, slot: Slot) -> u32 {
    if side == turn.phase && slot > turn.last_slot(side) {
        turn.cycle
    } else if side == Side::Enemy && turn.phase == Side::Ally {
        turn.cycle
    } else {
        turn.cycle + 1
    }
}

/// Advance the simulation by at most one unit action or one phase flip.
pub fn step(sim: &mut Simulation) -> StepOutcome {
    if let Some(winner) = sim.turn.winner {
        return StepOutcome::Finished { winner };
    }
    if sim.turn.is_busy(sim.now) {
        return StepOutcome::Busy {
            until: sim.turn.busy_until,
        };
    }

    chain::resolve_due_queued(sim);
    chain::process_action_chain(sim);

    let side = sim.turn.phase;
    let pointer = sim.turn.last_slot(side);
    let next = sim
        .living(side)
        .filter_map(|t| sim.slot_of(t).map(|slot| (slot, t.instance)))
        .filter(|(slot, _)| *slot > pointer)
        .min_by_key(|(slot, _)| *slot);

    let Some((slot, actor)) = next else {
        sim.turn.advance_phase();
        log::info(&format!(
            "phase -> {} (cycle {}, pass {})",
            sim.turn.phase.as_str(),
            sim.turn.cycle,
            sim.turn.pass
        ));
        return StepOutcome::PhaseAdvanced {
            phase: sim.turn.phase,
            cycle: sim.turn.cycle,
        };
    };

    *sim.turn.last_slot.get_mut(side) = slot;
    let action = take_turn(sim, actor);
    log::turn_summary(
        side.as_str(),
        sim.turn.cycle,
        slot,
        sim.turn.busy_until,
        sim.tokens.iter().filter(|t| t.alive).count(),
    );

    if let Some(winner) = check_leaders(sim) {
        sim.turn.winner = Some(winner);
        log::info(&format!("{} wins", winner.as_str()));
    }

    StepOutcome::Acted {
        instance: actor,
        slot,
        action,
    }
}

fn take_turn(sim: &mut Simulation, actor: InstanceId) -> ActionKind {
    if let Some(token) = sim.token_mut(actor) {
        token.acting = true;
    }
    passives::fire(sim, actor, PassiveTrigger::OnTurnStart, &mut HitContext::default());
    status::on_turn_start(sim, actor);

    let Some(token) = sim.token(actor) else {
        return ActionKind::Skipped {
            cause: SkipCause::Died,
        };
    };
    if !token.alive {
        return ActionKind::Skipped {
            cause: SkipCause::Died,
        };
    }

    let action = if status::is_incapacitated(token) {
        log::debug("turn", &format!("unit {} is asleep", actor.0));
        ActionKind::Skipped {
            cause: SkipCause::Incapacitated,
        }
    } else if token.rage_full() && !status::is_silenced(token) {
        let outcome = ultimate::cast(sim, actor);
        if outcome.kind != Some(UltimateKind::Summon) {
            if let Some(token) = sim.token_mut(actor) {
                token.rage = 0;
            }
        }
        ActionKind::Ultimate { kind: outcome.kind }
    } else {
        match combat::basic_attack(sim, actor) {
            Some(report) => {
                let extra = sim.token(actor).map(status::extra_attacks).unwrap_or(0);
                let follow_ups = if extra > 0 {
                    combat::follow_up_attacks(sim, actor, extra)
                } else {
                    0
                };
                ActionKind::Basic {
                    target: report.target,
                    follow_ups,
                }
            }
            None => ActionKind::Skipped {
                cause: SkipCause::NoTarget,
            },
        }
    };

    end_turn(sim, actor);
    action
}

/// Tick the actor's statuses and minion lifetime
fn end_turn(sim: &mut Simulation, actor: InstanceId) {
    let Some(token) = sim.token_mut(actor) else {
        return;
    };
    status::on_turn_end(token);
    let expired = match token.minion.as_mut() {
        Some(link) => {
            link.ttl = link.ttl.saturating_sub(1);
            link.ttl == 0
        }
        None => false,
    };
    if expired {
        log::debug("turn", &format!("minion {} expired", actor.0));
        sim.remove_token(actor);
    }
}

/// A side whose leader has fallen loses. Sides without a leader never lose
/// this way.
fn check_leaders(sim: &Simulation) -> Option<Side> {
    [Side::Ally, Side::Enemy].into_iter().find_map(|side| {
        sim.leader(side)
            .filter(|leader| !leader.alive)
            .map(|_| side.opponent())
    })
}
