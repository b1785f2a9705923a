//! Resource ledger behaviour through the engine surface.
//!
//! INVARIANT: 0 <= value <= cap for every resource after every call,
//! and a rejected call leaves the ledger untouched.

use outpost_core::{
    config::GameConfig,
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    storage::MemoryStorage,
    types::ResourceMap,
};

fn engine() -> GameEngine {
    GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, 11)
}

fn assert_within_caps(engine: &GameEngine) {
    for (id, entry) in engine.state().ledger.iter() {
        assert!(
            entry.value <= entry.cap,
            "{id} holds {} over its cap of {}",
            entry.value, entry.cap
        );
    }
}

#[test]
fn credit_is_clamped_to_cap() {
    let mut engine = engine();
    assert!(engine.consume_resource("food", 2));
    assert_eq!(engine.state().ledger.value("food"), Some(48));

    assert!(engine.add_resource("food", 10));
    assert_eq!(engine.state().ledger.value("food"), Some(50), "credit must stop at the cap");
    assert_within_caps(&engine);
}

#[test]
fn short_debit_fails_without_mutation() {
    let mut engine = engine();
    let before = engine.state().ledger.clone();

    assert!(!engine.consume_resource("wood", 1), "wood starts at 0");
    assert!(!engine.consume_resource("food", 51), "food cannot go negative");
    assert_eq!(engine.state().ledger, before, "rejected debits must not change the ledger");
}

#[test]
fn unknown_resource_is_rejected_and_logged() {
    let mut engine = engine();
    assert!(!engine.add_resource("unobtainium", 5));
    assert!(!engine.state().ledger.contains("unobtainium"));
    assert!(
        engine.state().event_log.contains("unobtainium"),
        "the rejection should reach the display log"
    );
}

#[test]
fn starting_holdings_match_templates() {
    let config = GameConfig::builtin();
    let engine = engine();
    for (id, cap) in &config.resource_caps {
        let entry = engine.state().ledger.entry(id).expect("every capped resource has an entry");
        assert_eq!(entry.cap, *cap, "{id} cap");
        assert_eq!(entry.value, config.initial_resources.get(id).copied().unwrap_or(0), "{id} value");
    }
}

#[test]
fn requirement_checks_are_non_destructive_and_atomic() {
    let engine = engine();
    let ledger = &engine.state().ledger;
    let affordable: ResourceMap = [("food".to_string(), 10), ("water".to_string(), 10)].into();
    let too_much: ResourceMap = [("food".to_string(), 10), ("wood".to_string(), 1)].into();
    assert!(ledger.has_enough(&affordable));
    assert!(!ledger.has_enough(&too_much));

    let mut ledger = ledger.clone();
    assert!(ledger.consume_all(&too_much).is_err());
    assert_eq!(ledger.value("food"), Some(50), "a failed batch takes nothing");
    ledger.consume_all(&affordable).unwrap();
    assert_eq!(ledger.value("food"), Some(40));

    ledger.set_cap("food", 25).unwrap();
    assert_eq!(ledger.value("food"), Some(25), "a lowered cap clamps the holding");
    assert_eq!(engine.state().ledger.value("food"), Some(50), "the engine's ledger was never touched");
}
