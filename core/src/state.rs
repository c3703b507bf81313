//! The owned simulation context.
//!
//! Every engine component takes `&mut Simulation` instead of reaching into
//! shared globals. The scheduler owns `turn`, combat and the status engine
//! own token hp and statuses, and the chain owns `chain`.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::chain::PendingImmediate;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::grid::{self, cell_to_slot, is_valid_slot, slot_to_cell};
use crate::hooks::{NoVisuals, VisualEvent, VisualHooks};
use crate::log;
use crate::scheduler::{self, TurnState};
use crate::token::Token;
use crate::types::{ArchetypeId, Cell, InstanceId, Side, Sides, Slot};

/// A placement waiting for its cycle to come round
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEntry {
    pub side: Side,
    pub slot: Slot,
    pub cell: Cell,
    pub archetype: ArchetypeId,
    pub name: String,
    /// Cycle in which the entry may resolve
    pub cycle: u32,
    pub color: String,
}

/// Queued entries of one side, keyed by slot
pub type QueuedMap = BTreeMap<Slot, QueuedEntry>;

pub struct Simulation {
    pub catalog: Catalog,
    pub config: EngineConfig,
    /// Live tokens plus dead ones still inside their vanish window
    pub tokens: Vec<Token>,
    pub queued: Sides<QueuedMap>,
    pub turn: TurnState,
    pub chain: Vec<PendingImmediate>,
    /// Clock reading of the current tick, in ms
    pub now: u64,
    next_instance: u32,
    next_serial: u32,
    visuals: Box<dyn VisualHooks>,
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("tokens", &self.tokens.len())
            .field("queued", &(self.queued.ally.len(), self.queued.enemy.len()))
            .field("turn", &self.turn)
            .field("chain", &self.chain.len())
            .field("now", &self.now)
            .finish()
    }
}

impl Simulation {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            tokens: Vec::new(),
            queued: Sides::default(),
            turn: TurnState::default(),
            chain: Vec::new(),
            now: 0,
            next_instance: 1,
            next_serial: 1,
            visuals: Box::new(NoVisuals),
        }
    }

    pub fn with_visuals(mut self, visuals: Box<dyn VisualHooks>) -> Self {
        self.visuals = visuals;
        self
    }

    pub fn set_visuals(&mut self, visuals: Box<dyn VisualHooks>) {
        self.visuals = visuals;
    }

    /// Fire a cosmetic event. Failures are logged and never reach gameplay.
    pub fn fire_visual(&mut self, event: VisualEvent) {
        if let Err(e) = self.visuals.trigger(&event) {
            log::warn(&format!("visual hook failed: {}", e.reason));
        }
    }

    pub fn token(&self, id: InstanceId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.instance == id)
    }

    pub fn token_mut(&mut self, id: InstanceId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.instance == id)
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.alive && t.side == side)
    }

    pub fn living_ids(&self, side: Side) -> Vec<InstanceId> {
        self.living(side).map(|t| t.instance).collect()
    }

    pub fn token_at(&self, cell: Cell) -> Option<&Token> {
        self.tokens.iter().find(|t| t.alive && t.cell == cell)
    }

    pub fn slot_of(&self, token: &Token) -> Option<Slot> {
        cell_to_slot(token.side, token.cell)
    }

    /// The side's leader, living or fallen
    pub fn leader(&self, side: Side) -> Option<&Token> {
        self.tokens.iter().find(|t| t.leader && t.side == side)
    }

    pub fn cell_reserved(&self, cell: Cell) -> bool {
        grid::cell_reserved(&self.tokens, &self.queued, cell)
    }

    /// Put a fresh token on the board. The cell must belong to `side` and be
    /// free. Spawn visuals and on-spawn effects are left to the chain.
    pub fn spawn_token(
        &mut self,
        archetype: ArchetypeId,
        side: Side,
        cell: Cell,
    ) -> EngineResult<InstanceId> {
        let slot = cell_to_slot(side, cell).ok_or(EngineError::InvalidCell {
            x: cell.x,
            y: cell.y,
        })?;
        if self.cell_reserved(cell) {
            return Err(EngineError::CellReserved { side, slot });
        }
        let meta = self.catalog.require(archetype)?;

        let instance = InstanceId(self.next_instance);
        let token = Token::from_archetype(meta, instance, self.next_serial, side, cell);
        self.next_instance += 1;
        self.next_serial += 1;

        log::action(
            "spawn",
            &format!(
                "{} #{} ({}) at {} slot {}",
                token.name,
                instance.0,
                side.as_str(),
                cell.x,
                slot
            ),
        );
        self.tokens.push(token);
        Ok(instance)
    }

    /// Reserve a slot for a future spawn.
    pub fn enqueue_spawn(
        &mut self,
        side: Side,
        slot: Slot,
        archetype: ArchetypeId,
    ) -> EngineResult<QueuedEntry> {
        if !is_valid_slot(slot) {
            return Err(EngineError::InvalidSlot { slot });
        }
        let cell = slot_to_cell(side, slot).ok_or(EngineError::InvalidSlot { slot })?;
        if self.queued.get(side).contains_key(&slot) {
            return Err(EngineError::SlotQueued { side, slot });
        }
        if self.cell_reserved(cell) {
            return Err(EngineError::CellReserved { side, slot });
        }
        let meta = self.catalog.require(archetype)?;

        let entry = QueuedEntry {
            side,
            slot,
            cell,
            archetype,
            name: meta.name.clone(),
            cycle: scheduler::eligible_cycle(&self.turn, side, slot),
            color: meta.color.clone(),
        };
        log::action(
            "enqueue",
            &format!("{} ({}) slot {} for cycle {}", entry.name, side.as_str(), slot, entry.cycle),
        );
        self.queued.get_mut(side).insert(slot, entry.clone());
        Ok(entry)
    }

    /// Drop dead tokens whose vanish window has passed. Returns how many.
    pub fn purge_vanished(&mut self) -> usize {
        let now = self.now;
        let vanish_ms = self.config.vanish_ms;
        let before = self.tokens.len();
        self.tokens.retain(|t| match t.died_at {
            Some(at) if !t.alive => now < at.saturating_add(vanish_ms),
            _ => true,
        });
        let purged = before - self.tokens.len();
        if purged > 0 {
            log::debug("state", &format!("purged {} vanished tokens", purged));
        }
        purged
    }

    /// Remove a token outright, along with any pending chain entry for it
    pub fn remove_token(&mut self, id: InstanceId) -> Option<Token> {
        let index = self.tokens.iter().position(|t| t.instance == id)?;
        self.chain.retain(|p| p.instance != id);
        Some(self.tokens.remove(index))
    }
}
