//! Heuristic placement AI.
//!
//! On each think tick the director scores every (playable card, open slot)
//! pair, walks the ranking, and queues the first candidate that is not
//! blocked. Every tick that gets past the throttle rebuilds the
//! [`DecisionTrace`], including ticks that end in a skip.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{Archetype, Ultimate};
use crate::config::{AiConfig, AiWeights};
use crate::error::{EngineError, EngineResult};
use crate::grid::{self, column_rank, is_valid_slot, slot_to_cell, MAX_DISTANCE, SLOTS_PER_SIDE};
use crate::log;
use crate::rng::{SimRng, XorShiftRng};
use crate::scheduler::eligible_cycle;
use crate::state::{QueuedEntry, Simulation};
use crate::types::{ArchetypeId, Side, Slot};

/// Why a candidate could not be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockReason {
    SlotQueued,
    CellReserved,
    OffGrid,
    /// A summoner card without enough free pattern slots around it
    SummonBlocked,
}

/// Why a think tick placed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    NoPlayableCard,
    NoOpenSlot,
    NoEvaluation,
    AllCandidatesBlocked,
}

/// Per-term values in 0..=1, or their weighted contributions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTerms {
    pub pressure: f64,
    pub safety: f64,
    pub eta: f64,
    pub summon: f64,
    pub instant: f64,
    pub defense: f64,
    pub revive: f64,
}

impl ScoreTerms {
    fn weighted(&self, w: &AiWeights) -> Self {
        Self {
            pressure: self.pressure * w.pressure,
            safety: self.safety * w.safety,
            eta: self.eta * w.eta,
            summon: self.summon * w.summon,
            instant: self.instant * w.instant,
            defense: self.defense * w.defense,
            revive: self.revive * w.revive,
        }
    }

    fn sum(&self) -> f64 {
        self.pressure
            + self.safety
            + self.eta
            + self.summon
            + self.instant
            + self.defense
            + self.revive
    }
}

/// One scored (card, slot) pair as recorded in the trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub archetype: ArchetypeId,
    pub name: String,
    pub slot: Slot,
    pub cost: i32,
    pub terms: ScoreTerms,
    pub contributions: ScoreTerms,
    pub crowd_mul: f64,
    pub role_mul: f64,
    pub score: f64,
    pub blocked: Option<BlockReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTrace {
    pub reason: String,
    pub at: u64,
    pub weights: AiWeights,
    pub cost: i32,
    pub chosen: Option<CandidateSummary>,
    pub considered: Vec<CandidateSummary>,
    pub skip: Option<SkipReason>,
}

/// AI state: budget, hand and the latest trace
#[derive(Debug, Clone)]
pub struct AiDirector {
    pub config: AiConfig,
    pub cost: i32,
    pub hand: Vec<ArchetypeId>,
    pub summon_count: u32,
    pool: Vec<ArchetypeId>,
    used: BTreeSet<ArchetypeId>,
    last_think: Option<u64>,
    last_cycle: u32,
    rng: XorShiftRng,
    trace: Option<DecisionTrace>,
}

impl AiDirector {
    pub fn new(config: AiConfig, pool: Vec<ArchetypeId>, seed: u64) -> Self {
        let mut director = Self {
            cost: config.start_cost,
            config,
            hand: Vec::new(),
            summon_count: 0,
            pool,
            used: BTreeSet::new(),
            last_think: None,
            last_cycle: 1,
            rng: XorShiftRng::seed_from_u64(seed),
            trace: None,
        };
        director.refill_hand();
        director
    }

    pub fn side(&self) -> Side {
        self.config.side
    }

    pub fn trace(&self) -> Option<&DecisionTrace> {
        self.trace.as_ref()
    }

    /// Cards neither used nor in hand
    pub fn unused(&self) -> Vec<ArchetypeId> {
        self.pool
            .iter()
            .copied()
            .filter(|id| !self.used.contains(id) && !self.hand.contains(id))
            .collect()
    }

    fn refill_hand(&mut self) {
        while self.hand.len() < self.config.hand_size {
            let unused = self.unused();
            let Some(index) = self.rng.pick(unused.len()) else {
                break;
            };
            self.hand.push(unused[index]);
        }
    }

    fn regen(&mut self, cycle: u32) {
        if cycle <= self.last_cycle {
            return;
        }
        let gained = self.config.cost_per_cycle.saturating_mul((cycle - self.last_cycle) as i32);
        self.cost = self.cost.saturating_add(gained).min(self.config.cost_cap);
        self.last_cycle = cycle;
        log::debug("ai", &format!("cycle {}: cost now {}", cycle, self.cost));
    }

    fn spend(&mut self, amount: i32) -> EngineResult<()> {
        if amount > self.cost {
            return Err(EngineError::NotEnoughCost {
                have: self.cost,
                need: amount,
            });
        }
        self.cost -= amount;
        Ok(())
    }

    /// One throttled decision tick. Returns the queued entry if one was placed.
    pub fn think(&mut self, sim: &mut Simulation) -> Option<QueuedEntry> {
        if let Some(last) = self.last_think {
            if sim.now < last.saturating_add(self.config.think_interval_ms) {
                return None;
            }
        }
        self.last_think = Some(sim.now);
        if sim.turn.winner.is_some() {
            return None;
        }
        self.regen(sim.turn.cycle);

        let side = self.side();
        let playable: Vec<&Archetype> = self
            .hand
            .iter()
            .filter_map(|id| sim.catalog.get(*id))
            .filter(|meta| meta.cost <= self.cost)
            .collect();
        if playable.is_empty() {
            return self.skip(sim, SkipReason::NoPlayableCard, Vec::new());
        }

        let open: Vec<Slot> = (1..=SLOTS_PER_SIDE)
            .filter(|slot| {
                !sim.queued.get(side).contains_key(slot)
                    && slot_to_cell(side, *slot)
                        .map(|cell| !sim.cell_reserved(cell))
                        .unwrap_or(false)
            })
            .collect();
        if open.is_empty() {
            return self.skip(sim, SkipReason::NoOpenSlot, Vec::new());
        }

        let mut candidates: Vec<CandidateSummary> = playable
            .iter()
            .flat_map(|meta| open.iter().filter_map(|slot| self.evaluate(sim, meta, *slot)))
            .collect();
        if candidates.is_empty() {
            return self.skip(sim, SkipReason::NoEvaluation, Vec::new());
        }
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        for index in 0..candidates.len() {
            let (archetype, slot) = (candidates[index].archetype, candidates[index].slot);
            if let Some(reason) = candidate_blocked(sim, &self.config, side, archetype, slot) {
                candidates[index].blocked = Some(reason);
                continue;
            }
            let pick = candidates[index].clone();
            match self.commit(sim, &pick) {
                Ok(entry) => {
                    candidates.truncate(self.config.top_k);
                    log::action(
                        "ai_place",
                        &format!(
                            "{} at {} slot {} (score {:.3})",
                            pick.name,
                            side.as_str(),
                            pick.slot,
                            pick.score
                        ),
                    );
                    self.trace = Some(DecisionTrace {
                        reason: String::from("placed"),
                        at: sim.now,
                        weights: self.config.weights,
                        cost: self.cost,
                        chosen: Some(pick),
                        considered: candidates,
                        skip: None,
                    });
                    return Some(entry);
                }
                Err(e) => {
                    log::warn(&format!(
                        "ai commit of {} at slot {} failed: {}",
                        pick.name, pick.slot, e
                    ));
                    candidates[index].blocked = Some(BlockReason::CellReserved);
                }
            }
        }

        self.skip(sim, SkipReason::AllCandidatesBlocked, candidates)
    }

    fn commit(
        &mut self,
        sim: &mut Simulation,
        pick: &CandidateSummary,
    ) -> EngineResult<QueuedEntry> {
        if pick.cost > self.cost {
            return Err(EngineError::NotEnoughCost {
                have: self.cost,
                need: pick.cost,
            });
        }
        let entry = sim.enqueue_spawn(self.side(), pick.slot, pick.archetype)?;
        self.spend(pick.cost)?;
        self.summon_count += 1;
        self.used.insert(pick.archetype);
        if let Some(pos) = self.hand.iter().position(|id| *id == pick.archetype) {
            self.hand.remove(pos);
        }
        self.refill_hand();
        Ok(entry)
    }

    fn skip(
        &mut self,
        sim: &Simulation,
        reason: SkipReason,
        mut considered: Vec<CandidateSummary>,
    ) -> Option<QueuedEntry> {
        log::debug("ai", &format!("skip: {:?} (cost {})", reason, self.cost));
        considered.truncate(self.config.top_k);
        self.trace = Some(DecisionTrace {
            reason: String::from("skipped"),
            at: sim.now,
            weights: self.config.weights,
            cost: self.cost,
            chosen: None,
            considered,
            skip: Some(reason),
        });
        None
    }

    /// Score one placement. `None` when the slot is off-grid.
    pub fn evaluate(
        &self,
        sim: &Simulation,
        meta: &Archetype,
        slot: Slot,
    ) -> Option<CandidateSummary> {
        let side = self.side();
        let cell = slot_to_cell(side, slot)?;
        let rank = column_rank(slot)?;

        let pressure = match sim.leader(side.opponent()).filter(|l| l.alive) {
            Some(leader) => 1.0 - grid::manhattan(cell, leader.cell) as f64 / MAX_DISTANCE as f64,
            None => 1.0 - rank as f64 / 3.0,
        }
        .clamp(0.0, 1.0);

        let foes_in_row = sim.living(side.opponent()).filter(|t| t.cell.y == cell.y).count();
        let safety = (1.0 - foes_in_row.min(3) as f64 / 3.0).clamp(0.0, 1.0);

        let eta = if eligible_cycle(&sim.turn, side, slot) == sim.turn.cycle {
            1.0
        } else {
            0.5
        };

        let summon = summon_feasibility(sim, side, meta, slot);
        let traits = meta.traits();
        let terms = ScoreTerms {
            pressure,
            safety,
            eta,
            summon,
            instant: if traits.has_instant { eta } else { 0.0 },
            defense: if traits.has_def_buff { 1.0 - safety } else { 0.0 },
            revive: if traits.has_revive { safety } else { 0.0 },
        };
        let contributions = terms.weighted(&self.config.weights);

        let crowd = sim.living(side).filter(|t| t.cell.y == cell.y).count()
            + sim.queued.get(side).values().filter(|q| q.cell.y == cell.y).count();
        let crowd_mul = if crowd >= 3 {
            self.config.heavy_crowd_penalty
        } else if crowd == 2 {
            self.config.crowd_penalty
        } else {
            1.0
        };
        let role_mul = self.config.role_multiplier(meta.class, rank);

        Some(CandidateSummary {
            archetype: meta.id,
            name: meta.name.clone(),
            slot,
            cost: meta.cost,
            terms,
            contributions,
            crowd_mul,
            role_mul,
            score: contributions.sum() * crowd_mul * role_mul,
            blocked: None,
        })
    }
}

/// Share of a summoner's required pattern slots that are free, 0..=1.
/// Cards without a summon ultimate score 0.
pub fn summon_feasibility(sim: &Simulation, side: Side, meta: &Archetype, slot: Slot) -> f64 {
    let Some(Ultimate::Summon { count, pattern, .. }) = &meta.kit.ultimate else {
        return 0.0;
    };
    let need = (*count as usize).min(grid::neighbors(*pattern, slot).len());
    if need == 0 {
        return 0.0;
    }
    let free = grid::free_neighbors(&sim.tokens, &sim.queued, side, *pattern, slot).len();
    (free.min(need) as f64 / need as f64).clamp(0.0, 1.0)
}

/// Reason a placement cannot be committed right now, if any
pub fn candidate_blocked(
    sim: &Simulation,
    config: &AiConfig,
    side: Side,
    archetype: ArchetypeId,
    slot: Slot,
) -> Option<BlockReason> {
    if !is_valid_slot(slot) {
        return Some(BlockReason::OffGrid);
    }
    let Some(cell) = slot_to_cell(side, slot) else {
        return Some(BlockReason::OffGrid);
    };
    if sim.queued.get(side).contains_key(&slot) {
        return Some(BlockReason::SlotQueued);
    }
    if sim.cell_reserved(cell) {
        return Some(BlockReason::CellReserved);
    }
    let ultimate = sim.catalog.get(archetype).and_then(|m| m.kit.ultimate.as_ref());
    if let Some(Ultimate::Summon { pattern, .. }) = ultimate {
        let free = grid::free_neighbors(&sim.tokens, &sim.queued, side, *pattern, slot).len();
        if free < config.min_summon_free {
            return Some(BlockReason::SummonBlocked);
        }
    }
    None
}
