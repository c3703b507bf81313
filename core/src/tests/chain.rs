use alloc::boxed::Box;

use crate::chain::{self, ImmediateDescriptor};
use crate::grid::slot_to_cell;
use crate::hooks::VisualEvent;
use crate::scheduler::{self, ActionKind, StepOutcome};
use crate::state::Simulation;
use crate::status;
use crate::tests::*;
use crate::token::Token;
use crate::types::*;
use crate::units::{BULWARK, MENDER, NIGHTBLADE, WARLORD};

fn enqueue(sim: &mut Simulation, archetype: ArchetypeId, side: Side, slot: Slot) -> InstanceId {
    chain::enqueue_immediate(sim, ImmediateDescriptor::unit(archetype, side, slot))
        .expect("cell is free")
}

#[test]
fn test_enqueue_immediate_reserves_cell_at_once() {
    let mut sim = sim_with(vec![]);
    let cell = slot_to_cell(Side::Ally, 4).unwrap();
    let id = enqueue(&mut sim, DUMMY, Side::Ally, 4);

    assert!(sim.cell_reserved(cell));
    assert_eq!(sim.chain.len(), 1);
    assert_eq!(sim.chain[0].instance, id);

    let again = chain::enqueue_immediate(&mut sim, ImmediateDescriptor::unit(DUMMY, Side::Ally, 4));
    assert_eq!(
        again,
        Err(crate::error::EngineError::CellReserved {
            side: Side::Ally,
            slot: 4
        })
    );
}

#[test]
fn test_descriptor_overrides_stats() {
    let mut sim = sim_with(vec![]);
    let mut desc = ImmediateDescriptor::unit(DUMMY, Side::Enemy, 2);
    desc.hp = Some(12);
    desc.attack = Some(0);
    let id = chain::enqueue_immediate(&mut sim, desc).unwrap();

    let token = sim.token(id).unwrap();
    assert_eq!(token.hp, 12);
    assert_eq!(token.hp_max(), 12);
    assert_eq!(token.stats.attack, 1, "inherited stats floor at 1");
}

#[test]
fn test_chain_applies_on_spawn_effects() {
    let visuals = RecordingVisuals::default();
    let mut sim = sim_with(vec![]).with_visuals(Box::new(visuals.clone()));
    let blade = enqueue(&mut sim, NIGHTBLADE, Side::Ally, 1);
    let leader = enqueue(&mut sim, WARLORD, Side::Ally, 8);
    let wall = enqueue(&mut sim, BULWARK, Side::Ally, 2);
    let medic = enqueue(&mut sim, MENDER, Side::Ally, 3);

    let joins = chain::process_action_chain(&mut sim);
    assert_eq!(joins.len(), 4);
    assert!(sim.chain.is_empty());

    assert_eq!(sim.token(blade).unwrap().rage, RAGE_MAX, "full rage on spawn");
    assert_eq!(sim.token(leader).unwrap().rage, 0, "leaders never get full rage on spawn");
    assert_eq!(status::shield_amount(sim.token(wall).unwrap()), 20);
    assert_eq!(status::shield_amount(sim.token(medic).unwrap()), 10, "OnSpawn passive shield");

    let spawns = recorded(&visuals)
        .into_iter()
        .filter(|e| matches!(e, VisualEvent::Spawn { .. }))
        .count();
    assert_eq!(spawns, 4);
}

#[test]
fn test_join_depends_on_pointer_and_phase() {
    let mut sim = sim_with(vec![]);
    sim.turn.last_slot.ally = 2;

    let ahead = enqueue(&mut sim, DUMMY, Side::Ally, 5);
    let behind = enqueue(&mut sim, DUMMY, Side::Ally, 1);
    let other = enqueue(&mut sim, DUMMY, Side::Enemy, 9);

    let joins = chain::process_action_chain(&mut sim);
    let joined = |id: InstanceId| {
        joins.iter().find(|j| j.instance == id).unwrap().joins_current_pass
    };
    assert!(joined(ahead));
    assert!(!joined(behind));
    assert!(!joined(other));
}

#[test]
fn test_injected_unit_never_acts_retroactively() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let first = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let last = spawn_at(&mut sim, DUMMY, Side::Ally, 6);

    let outcome = scheduler::step(&mut sim);
    assert!(matches!(outcome, StepOutcome::Acted { instance, slot: 1, .. } if instance == first));

    // pointer is at 1: a unit injected at slot 4 still gets its turn, one at
    // slot 1 does not
    let late = enqueue(&mut sim, DUMMY, Side::Ally, 4);
    sim.now = sim.turn.busy_until;
    let outcome = scheduler::step(&mut sim);
    assert!(matches!(outcome, StepOutcome::Acted { instance, slot: 4, .. } if instance == late));

    let behind = enqueue(&mut sim, DUMMY, Side::Ally, 2);
    sim.now = sim.turn.busy_until;
    let outcome = scheduler::step(&mut sim);
    assert!(matches!(outcome, StepOutcome::Acted { instance, slot: 6, .. } if instance == last));

    sim.now = sim.turn.busy_until;
    let outcome = scheduler::step(&mut sim);
    assert_eq!(
        outcome,
        StepOutcome::PhaseAdvanced {
            phase: Side::Enemy,
            cycle: 1
        },
        "slot 2 was passed over for this pass"
    );
    assert!(sim.token(behind).unwrap().alive);
}

#[test]
fn test_due_queue_entries_resolve_and_superseded_ones_drop() {
    let mut sim = sim_with(vec![]);
    sim.enqueue_spawn(Side::Ally, 3, DUMMY).unwrap();
    sim.enqueue_spawn(Side::Ally, 5, DUMMY).unwrap();

    // something lands on slot 5 behind the queue's back
    let cell = slot_to_cell(Side::Ally, 5).unwrap();
    let meta = sim.catalog.get(SANDBAG).unwrap().clone();
    sim.tokens.push(Token::from_archetype(&meta, InstanceId(999), 999, Side::Ally, cell));

    let resolved = chain::resolve_due_queued(&mut sim);
    assert_eq!(resolved, 1);
    assert!(sim.queued.ally.is_empty(), "superseded entry is dropped");
    assert_eq!(sim.chain.len(), 1);
    let spawned = sim.token(sim.chain[0].instance).unwrap();
    assert_eq!(sim.slot_of(spawned), Some(3));
}

#[test]
fn test_spawned_unit_acts_in_its_pass() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    sim.enqueue_spawn(Side::Ally, 2, DUMMY).unwrap();

    match scheduler::step(&mut sim) {
        StepOutcome::Acted { slot, action, .. } => {
            assert_eq!(slot, 2);
            assert!(matches!(action, ActionKind::Basic { .. }));
        }
        other => panic!("expected the queued unit to act, got {:?}", other),
    }
    assert!(sim.queued.ally.is_empty());
}
