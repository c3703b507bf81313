//! Simulation handle for browser WASM builds
//!
//! The renderer owns the clock. Every animation frame it calls `tick(now)`,
//! then drains the buffered visual events and plays them back.

use std::boxed::Box;
use std::cell::RefCell;
use std::format;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use gridlane_core::config::EngineConfig;
use gridlane_core::engine::Engine;
use gridlane_core::hooks::{ManualClock, VisualError, VisualEvent, VisualHooks};
use gridlane_core::log;
use gridlane_core::scheduler::StepOutcome;
use gridlane_core::types::{ArchetypeId, Side, Slot};
use gridlane_core::units::{starter_catalog, starter_pool, LICH_KING, WARLORD};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Middle of the back column
const LEADER_SLOT: Slot = 8;

/// Visual hooks that hold events until the renderer drains them
#[derive(Clone, Default)]
pub(crate) struct VisualBuffer {
    events: Rc<RefCell<Vec<VisualEvent>>>,
}

impl VisualBuffer {
    pub(crate) fn drain(&self) -> Vec<VisualEvent> {
        match self.events.try_borrow_mut() {
            Ok(mut events) => events.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl VisualHooks for VisualBuffer {
    fn trigger(&mut self, event: &VisualEvent) -> Result<(), VisualError> {
        let mut events = self
            .events
            .try_borrow_mut()
            .map_err(|_| VisualError::new("visual buffer is being drained"))?;
        events.push(event.clone());
        Ok(())
    }
}

pub(crate) fn to_js<T: Serialize>(label: &str, value: &T) -> JsValue {
    match serde_wasm_bindgen::to_value(value) {
        Ok(val) => val,
        Err(e) => {
            log::error(&format!("{} serialization failed: {:?}", label, e));
            JsValue::NULL
        }
    }
}

pub(crate) fn parse_side(side: &str) -> Result<Side, String> {
    match side {
        "ally" => Ok(Side::Ally),
        "enemy" => Ok(Side::Enemy),
        other => Err(format!("Unknown side '{}'", other)),
    }
}

/// A running match exposed to JavaScript
#[wasm_bindgen]
pub struct SimulationHandle {
    engine: Engine,
    clock: ManualClock,
    visuals: VisualBuffer,
    last_outcome: Option<StepOutcome>,
}

#[wasm_bindgen]
impl SimulationHandle {
    /// Create a match over the starter catalog. `config_js` may be a partial
    /// config object, or null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, config_js: JsValue) -> Result<SimulationHandle, String> {
        log::info("=== GRIDLANE ENGINE INITIALIZED ===");
        let config: EngineConfig = if config_js.is_null() || config_js.is_undefined() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config_js)
                .map_err(|e| format!("Failed to parse config: {:?}", e))?
        };

        let catalog = starter_catalog();
        let pool = starter_pool(&catalog);
        let visuals = VisualBuffer::default();
        let engine =
            Engine::new(catalog, config, pool, seed).with_visuals(Box::new(visuals.clone()));

        Ok(Self {
            engine,
            clock: ManualClock::new(0),
            visuals,
            last_outcome: None,
        })
    }

    /// Put both leaders on their back column before the first tick
    #[wasm_bindgen]
    pub fn deploy_leaders(&mut self) -> Result<(), String> {
        log::action("deploy_leaders", "placing both leaders");
        for (side, leader) in [(Side::Ally, WARLORD), (Side::Enemy, LICH_KING)] {
            self.engine
                .deploy(side, LEADER_SLOT, leader)
                .map_err(|e| format!("Leader deployment failed: {}", e))?;
        }
        Ok(())
    }

    /// Queue a card for `side` at `slot`. Returns the queued entry.
    #[wasm_bindgen]
    pub fn place(&mut self, side: &str, slot: u8, archetype: u32) -> Result<JsValue, String> {
        log::action("place", &format!("side={}, slot={}, archetype={}", side, slot, archetype));
        let side = parse_side(side)?;
        let entry = self
            .engine
            .place(side, slot, ArchetypeId(archetype))
            .map_err(|e| format!("Placement rejected: {}", e))?;
        Ok(to_js("place", &entry))
    }

    /// Advance to `now` (host milliseconds) and run one tick
    #[wasm_bindgen]
    pub fn tick(&mut self, now: u64) -> JsValue {
        self.clock.set(now);
        let outcome = self.engine.tick(&self.clock);
        self.last_outcome = Some(outcome);
        to_js("tick", &outcome)
    }

    #[wasm_bindgen]
    pub fn is_finished(&self) -> bool {
        self.engine.sim.turn.winner.is_some()
    }

    #[wasm_bindgen]
    pub fn view(&self) -> JsValue {
        log::debug("view", "Serializing simulation to view");
        to_js("view", &self.engine.view())
    }

    /// Latest AI decision trace, or null before the AI has thought
    #[wasm_bindgen]
    pub fn decision_trace(&self) -> JsValue {
        match self.engine.trace() {
            Some(trace) => to_js("decision_trace", trace),
            None => JsValue::NULL,
        }
    }

    /// Visual events fired since the last drain, oldest first
    #[wasm_bindgen]
    pub fn drain_visuals(&mut self) -> JsValue {
        let events = self.visuals.drain();
        to_js("drain_visuals", &events)
    }

    #[wasm_bindgen]
    pub fn last_outcome(&self) -> JsValue {
        match &self.last_outcome {
            Some(outcome) => to_js("last_outcome", outcome),
            None => JsValue::NULL,
        }
    }
}

/// The starter catalog as JSON
#[wasm_bindgen]
pub fn starter_catalog_json() -> JsValue {
    let catalog = starter_catalog();
    let archetypes: Vec<_> = catalog.iter().collect();
    to_js("starter_catalog", &archetypes)
}
