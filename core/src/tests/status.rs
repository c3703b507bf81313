use crate::combat::{self, DamageRequest};
use crate::passives::HitContext;
use crate::status::*;
use crate::tests::*;
use crate::types::*;

#[test]
fn test_refresh_keeps_longer_duration_and_new_amount() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();

    add(token, StatusEffect::timed(StatusKind::DamageReduction { amount: 2_000 }, 3));
    add(token, StatusEffect::timed(StatusKind::DamageReduction { amount: 4_000 }, 1));

    assert_eq!(token.statuses.len(), 1);
    let effect = get(token, StatusTag::DamageReduction).unwrap();
    assert_eq!(effect.kind, StatusKind::DamageReduction { amount: 4_000 });
    assert_eq!(effect.duration, StatusDuration::Turns(3));
}

#[test]
fn test_poison_stacks_up_to_cap() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();

    for _ in 0..8 {
        add(
            token,
            StatusEffect::timed(
                StatusKind::Poison {
                    per_turn: 2,
                    stacks: 1,
                },
                2,
            ),
        );
    }
    assert_eq!(
        get(token, StatusTag::Poison).unwrap().kind,
        StatusKind::Poison {
            per_turn: 2,
            stacks: 5
        }
    );
}

#[test]
fn test_unique_statuses_ignore_reapplication() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();

    add(token, StatusEffect::timed(StatusKind::Undying, 1));
    add(token, StatusEffect::permanent(StatusKind::Undying));
    assert_eq!(token.statuses.len(), 1);
    assert_eq!(get(token, StatusTag::Undying).unwrap().duration, StatusDuration::Turns(1));
}

#[test]
fn test_dead_units_take_no_statuses() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();
    add(token, StatusEffect::timed(StatusKind::Silence, 2));
    token.mark_dead(0);
    assert!(token.statuses.is_empty(), "death clears statuses");

    add(token, StatusEffect::timed(StatusKind::Silence, 2));
    assert!(token.statuses.is_empty());
}

#[test]
fn test_purge_scopes() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();
    add(token, StatusEffect::timed(StatusKind::Silence, 2));
    add(token, StatusEffect::permanent(StatusKind::TrueStrike).unpurgeable());
    add(token, StatusEffect::timed(StatusKind::Empower { amount: 1_000 }, 2));

    assert_eq!(purge(token, PurgeScope::PurgeableOnly), 2);
    assert!(has(token, StatusTag::TrueStrike));
    assert_eq!(purge(token, PurgeScope::All), 1);
    assert!(token.statuses.is_empty());
}

#[test]
fn test_turn_end_decrements_and_expires() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();
    add(token, StatusEffect::timed(StatusKind::Sleep, 1));
    add(token, StatusEffect::timed(StatusKind::Haste { extra_attacks: 1 }, 2));
    add(token, StatusEffect::permanent(StatusKind::Reflect { amount: 1_000 }));

    on_turn_end(token);
    assert!(!has(token, StatusTag::Sleep), "one-turn status expires");
    assert_eq!(get(token, StatusTag::Haste).unwrap().duration, StatusDuration::Turns(1));

    on_turn_end(token);
    assert!(!has(token, StatusTag::Haste));
    assert!(has(token, StatusTag::Reflect), "permanent statuses never expire");
}

#[test]
fn test_status_gained_on_own_turn_survives_that_turn_end() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();
    add(token, StatusEffect::timed(StatusKind::Vulnerable { amount: 1_000 }, 1));

    token.acting = true;
    add(token, StatusEffect::timed(StatusKind::Haste { extra_attacks: 1 }, 1));
    add(token, StatusEffect::timed(StatusKind::Vulnerable { amount: 2_000 }, 1));
    assert!(get(token, StatusTag::Haste).unwrap().held);

    on_turn_end(token);
    assert!(!token.acting);
    assert_eq!(get(token, StatusTag::Haste).unwrap().duration, StatusDuration::Turns(1));
    assert!(!get(token, StatusTag::Haste).unwrap().held);
    assert!(has(token, StatusTag::Vulnerable), "refreshed on its own turn");

    on_turn_end(token);
    assert!(!has(token, StatusTag::Haste));
    assert!(!has(token, StatusTag::Vulnerable));
}

#[test]
fn test_before_damage_aggregates_both_sides() {
    let mut sim = sim_with(vec![]);
    let attacker = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let target = spawn_at(&mut sim, DUMMY, Side::Enemy, 1);
    add(
        sim.token_mut(attacker).unwrap(),
        StatusEffect::timed(StatusKind::Empower { amount: 5_000 }, 2),
    );
    add(
        sim.token_mut(attacker).unwrap(),
        StatusEffect::timed(StatusKind::Piercing { amount: 2_000 }, 2),
    );
    add(
        sim.token_mut(target).unwrap(),
        StatusEffect::timed(StatusKind::DamageReduction { amount: 3_000 }, 2),
    );
    add(
        sim.token_mut(target).unwrap(),
        StatusEffect::timed(StatusKind::Vulnerable { amount: 1_000 }, 2),
    );

    let mods = before_damage(
        sim.token(attacker).unwrap(),
        sim.token(target).unwrap(),
        &DamageContext {
            dtype: DamageType::Physical,
            base: 30,
            attack_type: AttackType::Basic,
        },
    );
    assert_eq!(mods.base, 30);
    assert_eq!(mods.out_mul, 15_000);
    assert_eq!(mods.in_mul, 7_700, "0.7 * 1.1");
    assert_eq!(mods.def_pen, 2_000);
    assert!(!mods.ignore_all);
}

#[test]
fn test_true_strike_ignores_mitigation() {
    let mut sim = sim_with(vec![]);
    let attacker = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let target = spawn_at(&mut sim, ARMORED, Side::Enemy, 1);
    add(
        sim.token_mut(target).unwrap(),
        StatusEffect::timed(StatusKind::DamageReduction { amount: 5_000 }, 2),
    );
    add(sim.token_mut(attacker).unwrap(), StatusEffect::timed(StatusKind::TrueStrike, 1));

    let outcome = combat::resolve_damage(
        &mut sim,
        attacker,
        target,
        &DamageRequest::basic(DamageType::Physical),
        &HitContext::default(),
    );
    assert_eq!(outcome.dealt, 30);
}

#[test]
fn test_shield_absorb_bounds() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, SANDBAG, Side::Ally, 1);
    for (shield, incoming) in [(10, 4), (10, 10), (10, 25), (0, 7), (5, 0)] {
        let token = sim.token_mut(unit).unwrap();
        remove(token, StatusTag::Shield);
        combat::grant_shield(token, shield);

        let result = absorb_shield(token, incoming, DamageType::Physical);
        assert!(result.absorbed <= shield.min(incoming));
        assert_eq!(result.remain, incoming - result.absorbed);
        assert_eq!(shield_amount(token), shield - result.absorbed);
    }
}

#[test]
fn test_poison_ticks_at_turn_start() {
    let mut sim = sim_with(vec![]);
    let source = spawn_at(&mut sim, DUMMY, Side::Enemy, 1);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    add(
        sim.token_mut(unit).unwrap(),
        StatusEffect::timed(
            StatusKind::Poison {
                per_turn: 4,
                stacks: 2,
            },
            2,
        )
        .from_source(source),
    );

    on_turn_start(&mut sim, unit);
    assert_eq!(hp(&sim, unit), 92);
}

#[test]
fn test_scheduler_queries() {
    let mut sim = sim_with(vec![]);
    let unit = spawn_at(&mut sim, DUMMY, Side::Ally, 1);
    let token = sim.token_mut(unit).unwrap();
    assert!(!is_incapacitated(token));
    assert!(!is_silenced(token));
    assert_eq!(extra_attacks(token), 0);

    add(token, StatusEffect::timed(StatusKind::Sleep, 1));
    add(token, StatusEffect::timed(StatusKind::Silence, 1));
    add(token, StatusEffect::timed(StatusKind::Haste { extra_attacks: 2 }, 1));
    assert!(is_incapacitated(token));
    assert!(is_silenced(token));
    assert_eq!(extra_attacks(token), 2);
    assert_eq!(get(token, StatusTag::Sleep).unwrap().polarity(), Polarity::Debuff);
    assert_eq!(get(token, StatusTag::Haste).unwrap().polarity(), Polarity::Buff);
}
