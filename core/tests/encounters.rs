//! Random events and merchant visits.

use outpost_core::{
    config::GameConfig,
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    error::GameError,
    event::GameEvent,
    merchant_subsystem,
    random_event_subsystem,
    rng::SubsystemRng,
    snapshot::Snapshot,
    storage::MemoryStorage,
};

fn setup() -> (GameConfig, Snapshot, SubsystemRng) {
    let config = GameConfig::builtin();
    let state = Snapshot::new_game(&config, 17);
    (config, state, SubsystemRng::new(17, 4, 1))
}

#[test]
fn resolving_without_a_pending_event_fails() {
    let (config, mut state, mut rng) = setup();
    assert!(matches!(
        random_event_subsystem::resolve(&mut state, &config, 0, &mut rng),
        Err(GameError::NoPendingEvent)
    ));
}

#[test]
fn resolving_applies_the_option_and_clears_the_event() {
    let (config, mut state, mut rng) = setup();
    state.pending_event = Some("wild_harvest".into());

    assert!(matches!(
        random_event_subsystem::resolve(&mut state, &config, 7, &mut rng),
        Err(GameError::EventOptionUnavailable { index: 7, .. })
    ));
    assert!(state.pending_event.is_some(), "a bad choice keeps the event waiting");

    let events = random_event_subsystem::resolve(&mut state, &config, 2, &mut rng).unwrap();

    assert!(state.pending_event.is_none());
    assert!((2..=6).contains(&state.ledger.value("herb").unwrap()));
    assert_eq!(
        events.last(),
        Some(&GameEvent::RandomEventResolved { event: "wild_harvest".into(), option: 2 })
    );
}

#[test]
fn option_conditions_gate_the_choice() {
    let (config, mut state, mut rng) = setup();
    state.pending_event = Some("passing_trader".into());

    assert!(matches!(
        random_event_subsystem::resolve(&mut state, &config, 1, &mut rng),
        Err(GameError::EventOptionUnavailable { .. })
    ), "trading wood needs 8 wood");

    random_event_subsystem::resolve(&mut state, &config, 0, &mut rng).unwrap();
    assert_eq!(state.ledger.value("food"), Some(45));
    assert_eq!(state.ledger.value("herb"), Some(3));
}

#[test]
fn merchants_follow_their_visit_schedule() {
    let (config, mut state, _) = setup();
    let trader = config.merchant("wandering_trader").unwrap();
    assert!(!trader.availability.is_present(4));
    assert!(trader.availability.arrives_on(5));
    assert!(trader.availability.is_present(12));
    assert!(!trader.availability.is_present(13));

    state.clock.day = 5;
    let present = merchant_subsystem::present(&state, &config);
    assert!(present.iter().any(|m| m.id == "wandering_trader"));

    state.clock.day = 4;
    assert!(merchant_subsystem::present(&state, &config).iter().all(|m| m.id != "wandering_trader"));
    assert!(matches!(
        merchant_subsystem::buy(&mut state, &config, "wandering_trader", "rare_herb"),
        Err(GameError::MerchantUnavailable { .. })
    ));
    assert!(matches!(
        merchant_subsystem::buy(&mut state, &config, "nobody", "rare_herb"),
        Err(GameError::UnknownMerchant { .. })
    ));
}

#[test]
fn buying_spends_the_price_and_depletes_stock() {
    let (config, mut state, _) = setup();
    state.clock.day = 5;
    state.ledger.add("herb", 20).unwrap();

    let events = merchant_subsystem::buy(&mut state, &config, "wandering_trader", "rare_herb").unwrap();

    assert!(events.contains(&GameEvent::TradeCompleted {
        merchant: "wandering_trader".into(),
        item:     "rare_herb".into(),
    }));
    assert_eq!(state.ledger.value("food"), Some(40));
    assert_eq!(state.ledger.value("herb"), Some(10));
    assert_eq!(state.ledger.value("rare_herb"), Some(3));
    assert_eq!(state.merchant_stock["wandering_trader"]["rare_herb"], 4);

    state.merchant_stock.get_mut("wandering_trader").unwrap().insert("rare_herb".into(), 0);
    assert!(matches!(
        merchant_subsystem::buy(&mut state, &config, "wandering_trader", "rare_herb"),
        Err(GameError::OutOfStock { .. })
    ));
}

#[test]
fn selling_gives_one_unit_for_the_price() {
    let (config, mut state, _) = setup();
    state.clock.day = 5;
    state.ledger.consume("water", 10).unwrap();

    merchant_subsystem::sell(&mut state, &config, "wandering_trader", "sell_food").unwrap();

    assert_eq!(state.ledger.value("food"), Some(49));
    assert_eq!(state.ledger.value("water"), Some(41));
}

#[test]
fn no_trader_has_arrived_on_the_first_morning() {
    let engine = GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, 17);
    assert_eq!(engine.state().clock.day, 1);
    assert!(engine.merchants_present().iter().all(|m| m.id != "wandering_trader"));
}
