mod chain;
mod config;
mod scheduler;
mod status;

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::catalog::{Archetype, Catalog, UnitClass};
use crate::config::EngineConfig;
use crate::grid::slot_to_cell;
use crate::hooks::{VisualError, VisualEvent, VisualHooks};
use crate::state::Simulation;
use crate::types::*;
use crate::units::starter_archetypes;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

/// 100 hp, 30 attack, 20 will, no defenses
pub const DUMMY: ArchetypeId = ArchetypeId(100);
/// 100 hp, 10 attack, 10% armor
pub const ARMORED: ArchetypeId = ArchetypeId(101);
/// 50 hp, no offense at all
pub const HARMLESS: ArchetypeId = ArchetypeId(102);
/// 1000 hp punching bag
pub const SANDBAG: ArchetypeId = ArchetypeId(103);

pub fn test_archetypes() -> Vec<Archetype> {
    let mut all = starter_archetypes();
    all.push(Archetype::new(DUMMY.0, "Dummy", UnitClass::Warrior, 2, Stats::new(100, 30, 20)));
    all.push(Archetype::new(
        ARMORED.0,
        "Armored",
        UnitClass::Guardian,
        5,
        Stats::new(100, 10, 0).with_defense(1000, 0),
    ));
    all.push(Archetype::new(HARMLESS.0, "Harmless", UnitClass::Support, 1, Stats::new(50, 0, 0)));
    all.push(Archetype::new(SANDBAG.0, "Sandbag", UnitClass::Guardian, 1, Stats::new(1000, 0, 0)));
    all
}

pub fn test_catalog() -> Catalog {
    Catalog::new(test_archetypes())
}

/// Simulation over the test catalog plus `extra` archetypes
pub fn sim_with(extra: Vec<Archetype>) -> Simulation {
    let mut all = test_archetypes();
    all.extend(extra);
    Simulation::new(Catalog::new(all), EngineConfig::default())
}

/// Place a token directly, bypassing queue and chain
pub fn spawn_at(
    sim: &mut Simulation,
    archetype: ArchetypeId,
    side: Side,
    slot: Slot,
) -> InstanceId {
    let cell = slot_to_cell(side, slot).expect("valid slot");
    sim.spawn_token(archetype, side, cell).expect("spawn succeeds")
}

pub fn hp(sim: &Simulation, id: InstanceId) -> i32 {
    sim.token(id).expect("token exists").hp
}

/// Visual hooks that remember every event
#[derive(Clone, Default)]
pub struct RecordingVisuals {
    pub events: Rc<RefCell<Vec<VisualEvent>>>,
}

impl VisualHooks for RecordingVisuals {
    fn trigger(&mut self, event: &VisualEvent) -> Result<(), VisualError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Visual hooks that always fail
pub struct FailingVisuals;

impl VisualHooks for FailingVisuals {
    fn trigger(&mut self, _event: &VisualEvent) -> Result<(), VisualError> {
        Err(VisualError::new("renderer offline"))
    }
}

pub fn recorded(sim_visuals: &RecordingVisuals) -> Vec<VisualEvent> {
    sim_visuals.events.borrow().clone()
}
