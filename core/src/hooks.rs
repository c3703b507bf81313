//! Collaborator hooks: the present-time clock and fire-and-forget visuals.
//!
//! The engine never depends on a renderer. It reads time through [`Clock`] and
//! announces cosmetic moments through [`VisualHooks`]; a failing hook is
//! logged and otherwise ignored.

use alloc::string::String;
use core::cell::Cell as StdCell;

use serde::{Deserialize, Serialize};

use crate::types::{Cell, InstanceId, Side};

/// Monotonic millisecond clock
pub trait Clock {
    fn now(&self) -> u64;
}

/// Clock advanced by hand. Used by tests and by hosts that feed frame time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: StdCell<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: StdCell::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}

/// Wall clock measured from construction
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Cosmetic moments the renderer may animate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisualEvent {
    #[serde(rename_all = "camelCase")]
    Spawn {
        instance: InstanceId,
        side: Side,
        cell: Cell,
        art_key: String,
    },
    #[serde(rename_all = "camelCase")]
    Melee {
        attacker: InstanceId,
        target: InstanceId,
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Hit {
        target: InstanceId,
        dealt: i32,
        absorbed: i32,
    },
    #[serde(rename_all = "camelCase")]
    Ultimate {
        caster: InstanceId,
        kind: String,
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Death { instance: InstanceId },
}

/// Failure reported by a visual hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualError {
    pub reason: String,
}

impl VisualError {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: String::from(reason),
        }
    }
}

/// Best-effort visual trigger surface
pub trait VisualHooks {
    fn trigger(&mut self, event: &VisualEvent) -> Result<(), VisualError>;
}

/// Hooks used when no renderer is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVisuals;

impl VisualHooks for NoVisuals {
    fn trigger(&mut self, _event: &VisualEvent) -> Result<(), VisualError> {
        Ok(())
    }
}
