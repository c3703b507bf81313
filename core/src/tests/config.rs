use parity_scale_codec::{Decode, Encode};

use crate::catalog::{UltimateKind, UnitClass};
use crate::config::*;
use crate::error::EngineError;
use crate::passives::{Passive, PassiveEffect, PassiveEffectTag, PassiveTrigger};
use crate::types::Side;

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.vanish_ms, 900);
    assert_eq!(config.melee_ms, 420);
    assert_eq!(config.follow_up_cap, 2);
    assert_eq!(config.timings.for_kind(UltimateKind::Revive), 900);
    assert_eq!(config.ai.side, Side::Enemy);
    assert_eq!(config.ai.think_interval_ms, 600);
    assert_eq!(config.ai.top_k, 5);

    let w = config.ai.weights;
    let total = w.pressure + w.safety + w.eta + w.summon + w.instant + w.defense + w.revive;
    assert!((total - 1.0).abs() < 1e-9, "weights sum to one");
}

#[test]
fn test_partial_json_inherits_defaults() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"meleeMs":300,"ai":{"handSize":3}}"#).unwrap();
    assert_eq!(config.melee_ms, 300);
    assert_eq!(config.vanish_ms, 900);
    assert_eq!(config.ai.hand_size, 3);
    assert_eq!(config.ai.start_cost, 5);
    assert_eq!(config.ai.role_bias.len(), 7);
    assert_eq!(config.timings, UltimateTimings::default());
}

#[test]
fn test_config_round_trips_through_json() {
    let mut config = EngineConfig::default();
    config.ai.side = Side::Ally;
    config.timings.summon_ms = 1;
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"thinkIntervalMs\":600"));
    let back: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_role_multiplier() {
    let ai = AiConfig::default();
    assert_eq!(ai.role_multiplier(UnitClass::Guardian, 0), 1.25);
    assert_eq!(ai.role_multiplier(UnitClass::Guardian, 2), 0.75);
    assert_eq!(ai.role_multiplier(UnitClass::Guardian, 1), 1.0);

    let bare = AiConfig {
        role_bias: Vec::new(),
        ..AiConfig::default()
    };
    assert_eq!(bare.role_multiplier(UnitClass::Mage, 0), 1.0, "unlisted class is neutral");
}

#[test]
fn test_passive_pairs_are_validated() {
    assert_eq!(
        Passive::new(PassiveTrigger::OnBasicHit, PassiveEffect::Shield { amount: 5 }),
        Err(EngineError::InvalidPassive {
            trigger: PassiveTrigger::OnBasicHit,
            effect: PassiveEffectTag::Shield,
        })
    );
    let lifesteal = PassiveEffect::Lifesteal { amount: 1000 };
    assert!(Passive::new(PassiveTrigger::OnKill, lifesteal).is_err());
    assert!(Passive::new(PassiveTrigger::OnKill, PassiveEffect::GainRage { amount: 10 }).is_ok());

    let bad = r#"{"trigger":"onBasicHit","effect":{"type":"shield","amount":5}}"#;
    assert!(serde_json::from_str::<Passive>(bad).is_err());

    let good: Passive =
        serde_json::from_str(
            r#"{"trigger":"onBasicHit","effect":{"type":"poisonOnHit","perTurn":3,"turns":2}}"#,
        )
        .unwrap();
    assert_eq!(good.trigger(), PassiveTrigger::OnBasicHit);
    assert_eq!(good.effect(), &PassiveEffect::PoisonOnHit { per_turn: 3, turns: 2 });
}

#[test]
fn test_scale_decode_validates_passive_pairs() {
    let passive =
        Passive::new(PassiveTrigger::OnSpawn, PassiveEffect::Shield { amount: 8 }).unwrap();
    let bytes = passive.encode();
    assert_eq!(Passive::decode(&mut &bytes[..]).ok(), Some(passive));

    let forged = (PassiveTrigger::OnBasicHit, PassiveEffect::Shield { amount: 5 }).encode();
    assert!(Passive::decode(&mut &forged[..]).is_err());
}
