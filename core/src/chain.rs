//! Immediate-action chain.
//!
//! Units created mid-pass (summoned minions, resolved queue entries) are put
//! on the board at once so their cell is reserved, then announced here on the
//! next scheduler step. Whether they act this pass falls out of the slot walk:
//! the scheduler only visits slots past its pointer, so a unit injected behind
//! the pointer waits for its side's next pass.

use alloc::format;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::catalog::OnSpawn;
use crate::combat;
use crate::error::{EngineError, EngineResult};
use crate::grid::slot_to_cell;
use crate::hooks::VisualEvent;
use crate::limits::MAX_CHAIN_FLUSH_PER_STEP;
use crate::log;
use crate::passives::{self, HitContext, PassiveTrigger};
use crate::state::Simulation;
use crate::token::MinionLink;
use crate::types::{ArchetypeId, InstanceId, Side, Slot, RAGE_MAX};

/// What to materialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmediateDescriptor {
    pub archetype: ArchetypeId,
    pub side: Side,
    pub slot: Slot,
    /// Overrides derived hp (and hp max)
    pub hp: Option<i32>,
    /// Overrides derived attack
    pub attack: Option<i32>,
    pub minion: Option<MinionLink>,
}

impl ImmediateDescriptor {
    pub fn unit(archetype: ArchetypeId, side: Side, slot: Slot) -> Self {
        Self {
            archetype,
            side,
            slot,
            hp: None,
            attack: None,
            minion: None,
        }
    }
}

/// A materialized unit not yet announced
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingImmediate {
    pub instance: InstanceId,
    pub side: Side,
    pub slot: Slot,
}

/// A unit announced by [`process_action_chain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainJoin {
    pub instance: InstanceId,
    pub slot: Slot,
    /// Still ahead of its side's pointer in the active pass
    pub joins_current_pass: bool,
}

/// Materialize a token now and register it with the chain.
pub fn enqueue_immediate(
    sim: &mut Simulation,
    desc: ImmediateDescriptor,
) -> EngineResult<InstanceId> {
    let cell =
        slot_to_cell(desc.side, desc.slot).ok_or(EngineError::InvalidSlot { slot: desc.slot })?;
    let instance = sim.spawn_token(desc.archetype, desc.side, cell)?;

    if let Some(token) = sim.token_mut(instance) {
        if let Some(hp) = desc.hp {
            token.stats.hp_max = hp.max(1);
            token.hp = token.stats.hp_max;
        }
        if let Some(attack) = desc.attack {
            token.stats.attack = attack.max(1);
        }
        token.minion = desc.minion;
    }

    sim.chain.push(PendingImmediate {
        instance,
        side: desc.side,
        slot: desc.slot,
    });
    Ok(instance)
}

/// Turn queued entries of the active side that are due into live tokens.
/// An entry whose cell got taken in the meantime is superseded and dropped.
pub fn resolve_due_queued(sim: &mut Simulation) -> usize {
    let side = sim.turn.phase;
    let cycle = sim.turn.cycle;
    let pointer = sim.turn.last_slot(side);
    let due: Vec<Slot> = sim
        .queued
        .get(side)
        .values()
        .filter(|q| q.cycle <= cycle && q.slot > pointer)
        .map(|q| q.slot)
        .collect();

    let mut resolved = 0;
    for slot in due {
        let Some(entry) = sim.queued.get_mut(side).remove(&slot) else {
            continue;
        };
        match enqueue_immediate(sim, ImmediateDescriptor::unit(entry.archetype, side, slot)) {
            Ok(_) => resolved += 1,
            Err(e) => log::warn(&format!(
                "queued {} ({} slot {}) superseded: {}",
                entry.name,
                side.as_str(),
                slot,
                e
            )),
        }
    }
    resolved
}

/// Announce pending units: spawn visual, on-spawn kit effect, `OnSpawn`
/// passives. At most [`MAX_CHAIN_FLUSH_PER_STEP`] entries are flushed.
pub fn process_action_chain(sim: &mut Simulation) -> Vec<ChainJoin> {
    let take = sim.chain.len().min(MAX_CHAIN_FLUSH_PER_STEP);
    let pending: Vec<PendingImmediate> = sim.chain.drain(..take).collect();
    let mut joins = Vec::with_capacity(pending.len());

    for entry in pending {
        let Some(token) = sim.token(entry.instance) else {
            continue;
        };
        if !token.alive {
            continue;
        }
        let event = VisualEvent::Spawn {
            instance: token.instance,
            side: token.side,
            cell: token.cell,
            art_key: token.art_key.clone(),
        };
        let on_spawn = sim
            .catalog
            .get(token.archetype)
            .and_then(|meta| meta.kit.on_spawn.clone());

        sim.fire_visual(event);
        apply_on_spawn(sim, entry.instance, on_spawn);
        passives::fire(sim, entry.instance, PassiveTrigger::OnSpawn, &mut HitContext::default());

        let joins_current_pass =
            entry.side == sim.turn.phase && entry.slot > sim.turn.last_slot(entry.side);
        log::debug(
            "chain",
            &format!(
                "unit {} at slot {} joins current pass: {}",
                entry.instance.0, entry.slot, joins_current_pass
            ),
        );
        joins.push(ChainJoin {
            instance: entry.instance,
            slot: entry.slot,
            joins_current_pass,
        });
    }
    joins
}

fn apply_on_spawn(sim: &mut Simulation, unit: InstanceId, effect: Option<OnSpawn>) {
    let Some(token) = sim.token_mut(unit) else {
        return;
    };
    match effect {
        Some(OnSpawn::FullRage) if !token.leader => token.gain_rage(RAGE_MAX),
        Some(OnSpawn::Shield { amount }) => combat::grant_shield(token, amount),
        _ => {}
    }
}
