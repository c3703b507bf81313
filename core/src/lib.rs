#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ai;
pub mod catalog;
pub mod chain;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod hooks;
pub mod limits;
pub mod log;
pub mod passives;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod token;
pub mod types;
pub mod ultimate;
pub mod units;
pub mod view;

#[cfg(test)]
mod tests;

pub use ai::{AiDirector, BlockReason, CandidateSummary, DecisionTrace, ScoreTerms, SkipReason};
pub use catalog::{
    Archetype, Catalog, Kit, KitTraits, OnSpawn, Rank, Ultimate, UltimateKind, UnitClass,
};
pub use config::{AiConfig, AiWeights, EngineConfig, RoleBias, UltimateTimings};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use hooks::{Clock, ManualClock, NoVisuals, VisualError, VisualEvent, VisualHooks};
pub use scheduler::{ActionKind, SkipCause, StepOutcome, TurnState};
pub use state::{QueuedEntry, Simulation};
pub use token::Token;
pub use types::*;
pub use view::{SimulationView, TokenView};

#[cfg(feature = "std")]
pub use hooks::SystemClock;
