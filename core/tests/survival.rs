//! The hourly loop: clock control, daily upkeep, the healthy-day
//! streak, and survival achievements.

use outpost_core::{
    clock::ClockSpeed,
    config::GameConfig,
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    event::GameEvent,
    rng::SubsystemRng,
    skills::EffectValue,
    snapshot::Snapshot,
    storage::{KvStorage, MemoryStorage},
    subsystem::{GameSubsystem, TickContext},
    types::GameTime,
    upkeep_subsystem::{daily_need, UpkeepSubsystem},
};

fn engine(seed: u64) -> GameEngine {
    GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, seed)
}

/// Minutes from the 08:00 start to midnight of day 2.
const TO_MIDNIGHT: u64 = 16 * 60;

#[test]
fn every_hour_boundary_is_reported_in_order() {
    let mut engine = engine(1);
    let events = engine.advance_minutes(150).unwrap();

    let hours: Vec<GameTime> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::HourPassed { at } => Some(*at),
            _ => None,
        })
        .collect();
    assert_eq!(hours, vec![GameTime::new(1, 9, 0), GameTime::new(1, 10, 0)]);
    assert_eq!(engine.state().clock.now(), GameTime::new(1, 10, 30));
}

#[test]
fn paused_clock_does_not_move() {
    let mut engine = engine(1);
    engine.pause();
    assert!(engine.advance_minutes(600).unwrap().is_empty());
    assert!(engine.advance_real_seconds(600.0).unwrap().is_empty());
    assert_eq!(engine.state().clock.now(), GameTime::new(1, 8, 0));

    engine.resume();
    engine.set_speed(ClockSpeed::Turbo);
    engine.advance_real_seconds(2.0).unwrap();
    assert_eq!(engine.state().clock.now(), GameTime::new(1, 9, 0), "turbo is 30 game minutes per second");
}

#[test]
fn a_new_day_charges_upkeep_and_saves() {
    let mut engine = engine(2);
    let events = engine.advance_minutes(TO_MIDNIGHT).unwrap();

    assert!(events.contains(&GameEvent::DayStarted { day: 2 }));
    assert!(events.iter().any(|e| matches!(e, GameEvent::GameSaved { .. })), "a new day is a save point");
    assert!(engine.storage().get(DEFAULT_SAVE_KEY).unwrap().is_some());

    let state = engine.state();
    assert_eq!(state.player.days_survived, 1);
    assert!(state.ledger.value("food").unwrap() < 50, "food was eaten");
    assert!(state.ledger.value("water").unwrap() < 50, "water was drunk");
    assert!(state.achievements.contains("first_day"));
}

#[test]
fn running_out_of_supplies_hurts_and_breaks_the_streak() {
    let mut engine = engine(3);
    engine.consume_resource("food", 50);
    engine.consume_resource("water", 50);

    let events = engine.advance_minutes(TO_MIDNIGHT).unwrap();

    assert!(events.iter().any(|e| matches!(e, GameEvent::Starved { .. })));
    let state = engine.state();
    assert!(state.player.health <= 90, "starvation costs 10 health, got {}", state.player.health);
    assert!(state.player.health >= 1);
    assert_eq!(state.player.healthy_days, 0);
}

#[test]
fn well_fed_days_extend_the_streak() {
    let mut engine = engine(4);
    engine.advance_minutes(TO_MIDNIGHT).unwrap();
    engine.advance_minutes(24 * 60).unwrap();

    let state = engine.state();
    assert_eq!(state.player.days_survived, 2);
    if state.player.health >= 80 {
        assert_eq!(state.player.healthy_days, 2);
    }
}

#[test]
fn energy_recovers_every_hour_up_to_the_cap() {
    let mut engine = engine(5);
    engine.gather("gather_food").unwrap();
    assert_eq!(engine.state().player.energy, 90);

    engine.advance_minutes(5 * 60).unwrap();
    assert_eq!(engine.state().player.energy, 95);

    engine.advance_minutes(24 * 60).unwrap();
    assert_eq!(engine.state().player.energy, engine.state().player.max_energy);
}

#[test]
fn daily_need_scales_with_weather_and_skills() {
    assert_eq!(daily_need(3, 1.0, 0.0), 3);
    assert_eq!(daily_need(3, 1.5, 0.0), 5, "4.5 rounds up");
    assert_eq!(daily_need(3, 1.0, -0.3), 2);
    assert_eq!(daily_need(3, 1.2, -2.0), 0, "modifiers never make upkeep negative");
}

#[test]
fn hardiness_lowers_upkeep_and_speeds_healing() {
    let config = GameConfig::builtin();
    let mut state = Snapshot::new_game(&config, 5);
    state.skill_effects.insert("all_survival_stats".into(), EffectValue::Number(0.5));
    state.player.health = state.player.max_health / 2;

    let ctx = TickContext::new(GameTime::new(2, 0, 0), &config);
    UpkeepSubsystem::new().update(&ctx, &mut state, &[], &mut SubsystemRng::new(5, 1, 0)).unwrap();

    assert_eq!(state.ledger.value("food"), Some(48), "3 food at half need rounds to 2");
    assert_eq!(state.ledger.value("water"), Some(48));
    assert_eq!(state.player.health, state.player.max_health, "half of max health healed overnight");
}
