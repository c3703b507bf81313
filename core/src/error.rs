//! Error types for engine operations
//!
//! Errors are closed enums rather than strings so they stay `no_std` friendly
//! and can be encoded alongside the rest of the simulation state.

use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::passives::{PassiveEffectTag, PassiveTrigger};
use crate::types::{ArchetypeId, InstanceId, Side, Slot};

/// Errors that can occur while driving the simulation
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineError {
    /// Slot index outside 1..=9
    InvalidSlot { slot: Slot },
    /// Coordinates outside the lane grid
    InvalidCell { x: i32, y: i32 },
    /// Cell is occupied by a live unit or reserved by a queued entry
    CellReserved { side: Side, slot: Slot },
    /// A queued entry already targets this slot
    SlotQueued { side: Side, slot: Slot },
    /// Archetype not present in the catalog
    UnknownArchetype { id: ArchetypeId },
    /// Unit instance no longer exists
    UnknownUnit { instance: InstanceId },
    /// Passive effect cannot be bound to this trigger
    InvalidPassive {
        trigger: PassiveTrigger,
        effect: PassiveEffectTag,
    },
    /// Not enough cost to place the card
    NotEnoughCost { have: i32, need: i32 },
    /// Summon ultimate declared on a non-summoner class
    NotASummoner { archetype: ArchetypeId },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidSlot { slot } => write!(f, "invalid slot {}", slot),
            EngineError::InvalidCell { x, y } => write!(f, "invalid cell ({}, {})", x, y),
            EngineError::CellReserved { side, slot } => {
                write!(f, "{} slot {} is reserved", side.as_str(), slot)
            }
            EngineError::SlotQueued { side, slot } => {
                write!(f, "{} slot {} already has a queued entry", side.as_str(), slot)
            }
            EngineError::UnknownArchetype { id } => write!(f, "unknown archetype {}", id.0),
            EngineError::UnknownUnit { instance } => write!(f, "unknown unit {}", instance.0),
            EngineError::InvalidPassive { trigger, effect } => {
                write!(f, "passive {:?} cannot fire on {:?}", effect, trigger)
            }
            EngineError::NotEnoughCost { have, need } => {
                write!(f, "not enough cost: have {}, need {}", have, need)
            }
            EngineError::NotASummoner { archetype } => {
                write!(f, "archetype {} cannot summon", archetype.0)
            }
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
