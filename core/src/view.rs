//! View types for renderer and HUD serialization
//!
//! Plain data snapshots of the simulation. Collaborators read these and never
//! touch the scheduler's internals.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::ai::DecisionTrace;
use crate::scheduler::TurnState;
use crate::state::{QueuedEntry, Simulation};
use crate::status::StatusTag;
use crate::token::Token;
use crate::types::{ArchetypeId, InstanceId, Side, Sides, Slot, Stats};

/// View of one token on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub instance: InstanceId,
    pub archetype: ArchetypeId,
    pub name: String,
    pub art_key: String,
    pub side: Side,
    pub slot: Option<Slot>,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub rage: i32,
    pub stats: Stats,
    pub alive: bool,
    pub leader: bool,
    pub minion: bool,
    pub statuses: Vec<StatusTag>,
}

impl TokenView {
    fn from_token(sim: &Simulation, token: &Token) -> Self {
        Self {
            instance: token.instance,
            archetype: token.archetype,
            name: token.name.clone(),
            art_key: token.art_key.clone(),
            side: token.side,
            slot: sim.slot_of(token),
            x: token.cell.x,
            y: token.cell.y,
            hp: token.hp,
            rage: token.rage,
            stats: token.stats.clone(),
            alive: token.alive,
            leader: token.leader,
            minion: token.is_minion(),
            statuses: token.statuses.iter().map(|s| s.tag()).collect(),
        }
    }
}

/// The complete snapshot handed to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationView {
    pub now: u64,
    pub turn: TurnState,
    /// Living tokens and the dead ones still fading out
    pub tokens: Vec<TokenView>,
    pub queued: Sides<Vec<QueuedEntry>>,
    pub trace: Option<DecisionTrace>,
}

impl SimulationView {
    pub fn from_sim(sim: &Simulation, trace: Option<&DecisionTrace>) -> Self {
        Self {
            now: sim.now,
            turn: sim.turn.clone(),
            tokens: sim.tokens.iter().map(|t| TokenView::from_token(sim, t)).collect(),
            queued: Sides::new(
                sim.queued.ally.values().cloned().collect(),
                sim.queued.enemy.values().cloned().collect(),
            ),
            trace: trace.cloned(),
        }
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &TokenView> {
        self.tokens.iter().filter(move |t| t.alive && t.side == side)
    }
}
