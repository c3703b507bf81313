//! Sandbox mode for scripted matches
//!
//! Both sides are set up by hand and the match runs headless to completion
//! (or a step cap). The renderer replays the returned outcomes and events.

use std::boxed::Box;
use std::format;
use std::vec::Vec;

use gridlane_core::config::EngineConfig;
use gridlane_core::engine::Engine;
use gridlane_core::hooks::{ManualClock, VisualEvent};
use gridlane_core::log;
use gridlane_core::scheduler::StepOutcome;
use gridlane_core::types::{ArchetypeId, Side, Slot};
use gridlane_core::units::starter_catalog;
use gridlane_core::view::SimulationView;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::engine::{to_js, VisualBuffer};

/// One unit placed before the match starts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxUnit {
    pub archetype: u32,
    pub slot: Slot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxOutput {
    pub outcomes: Vec<StepOutcome>,
    pub events: Vec<VisualEvent>,
    pub winner: Option<Side>,
    pub final_view: SimulationView,
}

/// Run a scripted match between two hand-placed boards
#[wasm_bindgen]
pub fn run_sandbox_match(
    ally_units_js: JsValue,
    enemy_units_js: JsValue,
    max_steps: u32,
) -> JsValue {
    log::action("run_sandbox_match", "Running scripted match");

    let ally: Vec<SandboxUnit> =
        serde_wasm_bindgen::from_value(ally_units_js).unwrap_or_default();
    let enemy: Vec<SandboxUnit> =
        serde_wasm_bindgen::from_value(enemy_units_js).unwrap_or_default();

    let visuals = VisualBuffer::default();
    let mut engine = Engine::without_ai(starter_catalog(), EngineConfig::default())
        .with_visuals(Box::new(visuals.clone()));
    for (side, units) in [(Side::Ally, &ally), (Side::Enemy, &enemy)] {
        for unit in units.iter() {
            if let Err(e) = engine.deploy(side, unit.slot, ArchetypeId(unit.archetype)) {
                log::warn(&format!("sandbox unit skipped: {}", e));
            }
        }
    }

    let clock = ManualClock::new(0);
    let mut outcomes = Vec::new();
    let mut events = Vec::new();
    for _ in 0..max_steps {
        clock.set(engine.sim.now.max(engine.sim.turn.busy_until));
        let outcome = engine.tick(&clock);
        events.extend(visuals.drain());
        let finished = matches!(outcome, StepOutcome::Finished { .. });
        outcomes.push(outcome);
        if finished {
            break;
        }
    }

    let output = SandboxOutput {
        outcomes,
        events,
        winner: engine.sim.turn.winner,
        final_view: engine.view(),
    };
    to_js("run_sandbox_match", &output)
}
