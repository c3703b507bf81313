//! Top-level driver.
//!
//! [`Engine`] pairs the simulation with the optional AI director and runs the
//! per-tick order: read the clock, purge vanished tokens, let the AI think,
//! then take one scheduler step.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use crate::ai::{AiDirector, DecisionTrace};
use crate::catalog::Catalog;
use crate::chain::{self, ImmediateDescriptor};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::hooks::{Clock, VisualHooks};
use crate::log;
use crate::scheduler::{self, StepOutcome};
use crate::state::{QueuedEntry, Simulation};
use crate::types::{ArchetypeId, InstanceId, Side, Slot};
use crate::view::SimulationView;

#[derive(Debug)]
pub struct Engine {
    pub sim: Simulation,
    pub ai: Option<AiDirector>,
}

impl Engine {
    /// Engine with an AI drafting from `pool` on the configured side
    pub fn new(catalog: Catalog, config: EngineConfig, pool: Vec<ArchetypeId>, seed: u64) -> Self {
        let ai = AiDirector::new(config.ai.clone(), pool, seed);
        log::info(&format!(
            "engine ready: {} archetypes, ai on {} side",
            catalog.len(),
            ai.side().as_str()
        ));
        Self {
            sim: Simulation::new(catalog, config),
            ai: Some(ai),
        }
    }

    /// Engine where both sides are placed by hand
    pub fn without_ai(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            sim: Simulation::new(catalog, config),
            ai: None,
        }
    }

    pub fn with_visuals(mut self, visuals: Box<dyn VisualHooks>) -> Self {
        self.sim.set_visuals(visuals);
        self
    }

    /// Run one tick against `clock`.
    pub fn tick(&mut self, clock: &dyn Clock) -> StepOutcome {
        self.sim.now = self.sim.now.max(clock.now());
        self.sim.purge_vanished();
        if let Some(ai) = self.ai.as_mut() {
            ai.think(&mut self.sim);
        }
        scheduler::step(&mut self.sim)
    }

    /// Queue a placement; it resolves on its eligible cycle
    pub fn place(
        &mut self,
        side: Side,
        slot: Slot,
        archetype: ArchetypeId,
    ) -> EngineResult<QueuedEntry> {
        self.sim.enqueue_spawn(side, slot, archetype)
    }

    /// Put a unit on the board right away, e.g. the leaders before the match
    pub fn deploy(
        &mut self,
        side: Side,
        slot: Slot,
        archetype: ArchetypeId,
    ) -> EngineResult<InstanceId> {
        chain::enqueue_immediate(&mut self.sim, ImmediateDescriptor::unit(archetype, side, slot))
    }

    pub fn trace(&self) -> Option<&DecisionTrace> {
        self.ai.as_ref().and_then(|ai| ai.trace())
    }

    pub fn view(&self) -> SimulationView {
        SimulationView::from_sim(&self.sim, self.trace())
    }
}
