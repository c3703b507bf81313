use crate::catalog::{Archetype, Ultimate, UltimateKind, UnitClass};
use crate::chain::{self, ImmediateDescriptor};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::hooks::ManualClock;
use crate::scheduler::*;
use crate::state::Simulation;
use crate::status::{self, StatusEffect, StatusKind, StatusTag};
use crate::tests::*;
use crate::token::MinionLink;
use crate::types::*;
use crate::units::{BONECALLER, BULWARK, LICH_KING, SKELETON, VANGUARD, WARLORD};

/// Jump the clock to the end of the current animation
fn settle(sim: &mut Simulation) {
    sim.now = sim.now.max(sim.turn.busy_until);
}

fn acted_slot(outcome: StepOutcome) -> Slot {
    match outcome {
        StepOutcome::Acted { slot, .. } => slot,
        other => panic!("expected an action, got {:?}", other),
    }
}

#[test]
fn test_eligible_cycle() {
    let mut turn = TurnState::default();
    assert_eq!(eligible_cycle(&turn, Side::Ally, 3), 1);
    assert_eq!(eligible_cycle(&turn, Side::Enemy, 3), 1, "enemy pass still to come");

    turn.last_slot.ally = 5;
    assert_eq!(eligible_cycle(&turn, Side::Ally, 3), 2, "slot already passed");
    assert_eq!(eligible_cycle(&turn, Side::Ally, 6), 1);

    turn.phase = Side::Enemy;
    turn.last_slot.enemy = 4;
    assert_eq!(eligible_cycle(&turn, Side::Enemy, 2), 2);
    assert_eq!(eligible_cycle(&turn, Side::Enemy, 7), 1);
    assert_eq!(eligible_cycle(&turn, Side::Ally, 9), 2);
}

#[test]
fn test_units_act_in_slot_order() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    spawn_at(&mut sim, DUMMY, Side::Ally, 5);
    spawn_at(&mut sim, DUMMY, Side::Ally, 2);
    spawn_at(&mut sim, DUMMY, Side::Ally, 8);

    let mut order = Vec::new();
    for _ in 0..3 {
        settle(&mut sim);
        order.push(acted_slot(step(&mut sim)));
    }
    assert_eq!(order, vec![2, 5, 8]);
    assert_eq!(sim.turn.last_slot.ally, 8);
}

#[test]
fn test_step_waits_while_busy() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    spawn_at(&mut sim, DUMMY, Side::Ally, 2);

    acted_slot(step(&mut sim));
    assert_eq!(step(&mut sim), StepOutcome::Busy { until: 420 });
    sim.now = 419;
    assert_eq!(step(&mut sim), StepOutcome::Busy { until: 420 });
    sim.now = 420;
    assert_eq!(acted_slot(step(&mut sim)), 2);
}

#[test]
fn test_phase_flips_and_cycle_advances() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Ally, 1);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);

    acted_slot(step(&mut sim));
    settle(&mut sim);
    assert_eq!(
        step(&mut sim),
        StepOutcome::PhaseAdvanced {
            phase: Side::Enemy,
            cycle: 1
        }
    );
    assert_eq!(sim.turn.pass, 1);

    acted_slot(step(&mut sim));
    settle(&mut sim);
    assert_eq!(
        step(&mut sim),
        StepOutcome::PhaseAdvanced {
            phase: Side::Ally,
            cycle: 2
        }
    );
    assert_eq!(sim.turn.pass, 2);
    assert_eq!(sim.turn.last_slot.ally, 0, "pointer resets for the new pass");
}

#[test]
fn test_full_rage_casts_and_resets_meter() {
    let mut sim = sim_with(vec![]);
    let wall = spawn_at(&mut sim, BULWARK, Side::Ally, 1);
    sim.token_mut(wall).unwrap().rage = RAGE_MAX;

    let outcome = step(&mut sim);
    assert_eq!(
        outcome,
        StepOutcome::Acted {
            instance: wall,
            slot: 1,
            action: ActionKind::Ultimate {
                kind: Some(UltimateKind::SelfBuff)
            },
        }
    );
    assert_eq!(sim.token(wall).unwrap().rage, 0);
    assert_eq!(sim.turn.busy_until, 500);
}

#[test]
fn test_self_haste_lasts_into_next_turn() {
    let mut sim = sim_with(vec![]);
    let bag = spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let warlord = spawn_at(&mut sim, WARLORD, Side::Ally, 1);
    sim.token_mut(warlord).unwrap().rage = RAGE_MAX;

    assert_eq!(
        step(&mut sim),
        StepOutcome::Acted {
            instance: warlord,
            slot: 1,
            action: ActionKind::Ultimate {
                kind: Some(UltimateKind::Haste)
            },
        }
    );
    assert_eq!(status::extra_attacks(sim.token(warlord).unwrap()), 1);

    for _ in 0..3 {
        settle(&mut sim);
        step(&mut sim);
    }
    settle(&mut sim);
    assert_eq!(
        step(&mut sim),
        StepOutcome::Acted {
            instance: warlord,
            slot: 1,
            action: ActionKind::Basic {
                target: bag,
                follow_ups: 1
            },
        }
    );
    assert!(!status::has(sim.token(warlord).unwrap(), StatusTag::Haste), "spent after one turn");
}

#[test]
fn test_one_turn_self_buff_covers_enemy_phase() {
    let guard = Archetype::new(210, "Guard", UnitClass::Guardian, 1, Stats::new(200, 10, 0))
        .with_ultimate(Ultimate::SelfBuff {
            hp_cost: 0,
            reduction: 5_000,
            turns: 1,
        });
    let mut sim = sim_with(vec![guard]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let guard = spawn_at(&mut sim, ArchetypeId(210), Side::Ally, 1);
    sim.token_mut(guard).unwrap().rage = RAGE_MAX;

    acted_slot(step(&mut sim));
    settle(&mut sim);
    assert_eq!(
        step(&mut sim),
        StepOutcome::PhaseAdvanced {
            phase: Side::Enemy,
            cycle: 1
        }
    );
    settle(&mut sim);
    acted_slot(step(&mut sim));
    assert!(status::has(sim.token(guard).unwrap(), StatusTag::DamageReduction));

    settle(&mut sim);
    step(&mut sim);
    settle(&mut sim);
    assert_eq!(acted_slot(step(&mut sim)), 1);
    assert!(!status::has(sim.token(guard).unwrap(), StatusTag::DamageReduction));
}

#[test]
fn test_silence_forces_basic_attack() {
    let mut sim = sim_with(vec![]);
    let target = spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let vanguard = spawn_at(&mut sim, VANGUARD, Side::Ally, 1);
    let token = sim.token_mut(vanguard).unwrap();
    token.rage = RAGE_MAX;
    status::add(token, StatusEffect::timed(StatusKind::Silence, 1));

    let outcome = step(&mut sim);
    assert_eq!(
        outcome,
        StepOutcome::Acted {
            instance: vanguard,
            slot: 1,
            action: ActionKind::Basic { target, follow_ups: 0 },
        }
    );
    let token = sim.token(vanguard).unwrap();
    assert_eq!(token.rage, RAGE_MAX, "meter is kept for later");
    assert!(!status::has(token, StatusTag::Silence), "silence ran out at turn end");
}

#[test]
fn test_sleeping_unit_loses_its_turn() {
    let mut sim = sim_with(vec![]);
    let target = spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let sleeper = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    status::add(sim.token_mut(sleeper).unwrap(), StatusEffect::timed(StatusKind::Sleep, 1));

    let outcome = step(&mut sim);
    assert_eq!(
        outcome,
        StepOutcome::Acted {
            instance: sleeper,
            slot: 1,
            action: ActionKind::Skipped {
                cause: SkipCause::Incapacitated
            },
        }
    );
    assert_eq!(hp(&sim, target), 1000);
    assert!(!status::is_incapacitated(sim.token(sleeper).unwrap()));
}

#[test]
fn test_poison_can_kill_before_acting() {
    let mut sim = sim_with(vec![]);
    let target = spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let victim = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(victim).unwrap();
    token.hp = 3;
    status::add(
        token,
        StatusEffect::timed(
            StatusKind::Poison {
                per_turn: 4,
                stacks: 1,
            },
            2,
        ),
    );

    let outcome = step(&mut sim);
    assert_eq!(
        outcome,
        StepOutcome::Acted {
            instance: victim,
            slot: 1,
            action: ActionKind::Skipped { cause: SkipCause::Died },
        }
    );
    assert!(!sim.token(victim).unwrap().alive);
    assert_eq!(hp(&sim, target), 1000);
}

#[test]
fn test_no_target_is_skipped() {
    let mut sim = sim_with(vec![]);
    let lonely = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    assert_eq!(
        step(&mut sim),
        StepOutcome::Acted {
            instance: lonely,
            slot: 1,
            action: ActionKind::Skipped {
                cause: SkipCause::NoTarget
            },
        }
    );
}

#[test]
fn test_leader_death_ends_match() {
    let mut sim = sim_with(vec![]);
    let lich = spawn_at(&mut sim, LICH_KING, Side::Enemy, 1);
    spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    sim.token_mut(lich).unwrap().hp = 5;

    acted_slot(step(&mut sim));
    assert!(!sim.token(lich).unwrap().alive);
    assert_eq!(sim.turn.winner, Some(Side::Ally));
    assert_eq!(step(&mut sim), StepOutcome::Finished { winner: Side::Ally });

    settle(&mut sim);
    assert_eq!(step(&mut sim), StepOutcome::Finished { winner: Side::Ally });
}

#[test]
fn test_minion_expires_after_its_turns() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    let owner = spawn_at(&mut sim, BONECALLER, Side::Ally, 5);
    let mut desc = ImmediateDescriptor::unit(SKELETON, Side::Ally, 1);
    desc.minion = Some(MinionLink { owner, ttl: 1 });
    let minion = chain::enqueue_immediate(&mut sim, desc).unwrap();

    let outcome = step(&mut sim);
    assert!(matches!(outcome, StepOutcome::Acted { instance, slot: 1, .. } if instance == minion));
    assert!(sim.token(minion).is_none(), "minion removed once its ttl runs out");
    assert!(!sim.cell_reserved(crate::grid::slot_to_cell(Side::Ally, 1).unwrap()));
}

#[test]
fn test_queued_entry_waits_for_its_cycle() {
    let mut sim = sim_with(vec![]);
    spawn_at(&mut sim, SANDBAG, Side::Enemy, 1);
    spawn_at(&mut sim, DUMMY, Side::Ally, 5);

    assert_eq!(acted_slot(step(&mut sim)), 5);
    let entry = sim.enqueue_spawn(Side::Ally, 3, DUMMY).unwrap();
    assert_eq!(entry.cycle, 2);

    settle(&mut sim);
    assert!(matches!(step(&mut sim), StepOutcome::PhaseAdvanced { phase: Side::Enemy, .. }));
    assert!(sim.queued.ally.contains_key(&3));

    acted_slot(step(&mut sim));
    settle(&mut sim);
    assert_eq!(
        step(&mut sim),
        StepOutcome::PhaseAdvanced {
            phase: Side::Ally,
            cycle: 2
        }
    );

    assert_eq!(acted_slot(step(&mut sim)), 3);
    assert!(sim.queued.ally.is_empty());
}

#[test]
fn test_engine_tick_drives_clock_and_purge() {
    let clock = ManualClock::new(0);
    let mut engine = Engine::without_ai(test_catalog(), EngineConfig::default());
    engine.deploy(Side::Ally, 1, DUMMY).unwrap();
    let victim = engine.deploy(Side::Enemy, 1, HARMLESS).unwrap();

    assert!(matches!(engine.tick(&clock), StepOutcome::Acted { slot: 1, .. }));
    assert_eq!(hp(&engine.sim, victim), 20);
    assert_eq!(engine.tick(&clock), StepOutcome::Busy { until: 420 });

    clock.set(420);
    assert!(matches!(engine.tick(&clock), StepOutcome::PhaseAdvanced { phase: Side::Enemy, .. }));
    assert!(matches!(engine.tick(&clock), StepOutcome::Acted { .. }));

    clock.set(840);
    assert!(matches!(
        engine.tick(&clock),
        StepOutcome::PhaseAdvanced {
            phase: Side::Ally,
            cycle: 2
        }
    ));
    assert!(matches!(engine.tick(&clock), StepOutcome::Acted { .. }));
    assert_eq!(engine.sim.token(victim).unwrap().died_at, Some(840));

    clock.set(1_739);
    engine.tick(&clock);
    assert!(engine.sim.token(victim).is_some(), "still vanishing");

    clock.set(1_740);
    engine.tick(&clock);
    assert!(engine.sim.token(victim).is_none());

    clock.set(100);
    engine.tick(&clock);
    assert_eq!(engine.sim.now, 1_740, "time never runs backwards");
    assert_eq!(engine.view().tokens.len(), 1);
}
