//! Timed activities: scheduling, FIFO completion, payment, and cancel.

use outpost_core::{
    activity::ActivityCategory,
    activity_subsystem::{self, discounted},
    config::GameConfig,
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    error::GameError,
    event::GameEvent,
    rng::SubsystemRng,
    skills::EffectValue,
    snapshot::Snapshot,
    storage::MemoryStorage,
    types::{GameTime, ResourceMap},
};

fn engine() -> GameEngine {
    GameEngine::build(GameConfig::builtin(), Box::new(MemoryStorage::new()), DEFAULT_SAVE_KEY, 21)
}

fn completions(events: &[GameEvent]) -> Vec<(String, GameTime)> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ActivityCompleted { target, at, .. } => Some((target.clone(), *at)),
            _ => None,
        })
        .collect()
}

#[test]
fn queued_activities_complete_in_fifo_order() {
    let mut engine = engine();
    let started = engine.gather("gather_food").unwrap();
    let queued = engine.gather("gather_water").unwrap();

    assert!(matches!(
        started.last(),
        Some(GameEvent::ActivityStarted { completes_at, .. }) if *completes_at == GameTime::new(1, 9, 0)
    ));
    assert!(matches!(queued.last(), Some(GameEvent::ActivityQueued { .. })));
    assert_eq!(engine.state().player.energy, 80, "energy is paid up front for both");

    let first = engine.advance_minutes(60).unwrap();
    assert_eq!(completions(&first), vec![("gather_food".to_string(), GameTime::new(1, 9, 0))]);

    let second = engine.advance_minutes(60).unwrap();
    assert_eq!(
        completions(&second),
        vec![("gather_water".to_string(), GameTime::new(1, 10, 0))],
        "the successor starts when its predecessor finishes"
    );
    assert!(engine.state().activities.is_idle());
}

#[test]
fn a_long_advance_completes_everything_due() {
    let mut engine = engine();
    engine.gather("gather_food").unwrap();
    engine.gather("gather_water").unwrap();
    engine.gather("gather_food").unwrap();

    let events = engine.advance_minutes(5 * 60).unwrap();
    let done: Vec<String> = completions(&events).into_iter().map(|(t, _)| t).collect();
    assert_eq!(done, vec!["gather_food", "gather_water", "gather_food"]);
}

#[test]
fn completion_grants_skill_and_player_exp() {
    let mut engine = engine();
    engine.gather("gather_water").unwrap();
    engine.consume_resource("water", 30);
    let events = engine.advance_minutes(60).unwrap();

    assert!(
        events.iter().any(|e| matches!(e, GameEvent::ResourceGained { resource, .. } if resource == "water")),
        "gathered water should land in the ledger"
    );
    let state = engine.state();
    assert_eq!(state.skills["gathering"].exp, 10);
    assert!(state.player.progress.exp >= 10, "the survivor shares the activity exp");
}

#[test]
fn cancel_discards_the_queue_without_refund() {
    let mut engine = engine();
    engine.gather("gather_wood").unwrap();
    assert_eq!(engine.state().ledger.value("food"), Some(45));
    assert_eq!(engine.state().ledger.value("water"), Some(45));

    let events = engine.cancel(ActivityCategory::Gathering);

    assert_eq!(events, vec![GameEvent::ActivityCancelled {
        category:  ActivityCategory::Gathering,
        discarded: 1,
    }]);
    assert_eq!(engine.state().ledger.value("food"), Some(45), "inputs are forfeited");
    let later = engine.advance_minutes(180).unwrap();
    assert!(completions(&later).is_empty(), "a cancelled activity never completes");
    assert!(engine.cancel(ActivityCategory::Gathering).is_empty(), "nothing left to cancel");
}

#[test]
fn requirements_are_checked_before_payment() {
    let mut engine = engine();
    let before = engine.state().ledger.clone();

    assert!(matches!(engine.craft("craft_simple_tool"), Err(GameError::RequirementsNotMet { .. })));
    assert!(matches!(engine.explore("hills"), Err(GameError::RequirementsNotMet { .. })));
    assert!(matches!(engine.gather("gather_gold"), Err(GameError::UnknownRecipe { .. })));
    assert!(matches!(engine.gather("craft_fuel"), Err(GameError::UnknownRecipe { .. })), "crafting is not gathering");
    assert!(matches!(engine.craft("gather_food"), Err(GameError::UnknownRecipe { .. })), "gathering is not crafting");
    assert!(matches!(engine.explore("moon"), Err(GameError::UnknownRegion { .. })));
    assert!(matches!(
        engine.research("basic_crafting"),
        Err(GameError::InsufficientResource { .. })
    ));

    assert_eq!(engine.state().ledger, before);
    assert_eq!(engine.state().player.energy, 100);
    assert!(engine.state().activities.is_idle());
}

#[test]
fn research_unlocks_dependent_recipes() {
    let mut engine = engine();
    engine.add_resource("tech_fragment", 1);
    engine.research("basic_crafting").unwrap();
    assert!(matches!(
        engine.research("basic_crafting"),
        Err(GameError::RequirementsNotMet { .. })
    ));

    let events = engine.advance_minutes(60).unwrap();

    assert!(events.contains(&GameEvent::TechnologyResearched { id: "basic_crafting".into() }));
    engine.add_resource("wood", 5);
    engine.add_resource("stone", 3);
    engine.add_resource("metal", 2);
    engine.craft("craft_simple_tool").expect("recipe is unlocked now");
}

#[test]
fn storage_building_raises_caps() {
    let mut engine = engine();
    engine.add_resource("wood", 15);
    engine.add_resource("stone", 5);

    engine.build_structure("storage").unwrap();
    assert!(matches!(
        engine.build_structure("storage"),
        Err(GameError::RequirementsNotMet { .. })
    ), "the same level cannot be queued twice");

    let events = engine.advance_minutes(600).unwrap();

    assert!(events.contains(&GameEvent::BuildingUpgraded { building: "storage".into(), level: 1 }));
    assert_eq!(engine.state().building_level("storage"), 1);
    assert_eq!(engine.state().ledger.cap("food"), Some(60), "50 x 1.2");
    assert_eq!(engine.state().ledger.cap("herb"), Some(36), "30 x 1.2");
}

// ── Skill-tree effects on activities ─────────────────────────────────

/// A fresh game with every skill at level 5 and the given tree effects.
fn veteran(effects: &[(&str, f64)]) -> (GameConfig, Snapshot) {
    let config = GameConfig::builtin();
    let mut state = Snapshot::new_game(&config, 21);
    for skill in state.skills.values_mut() {
        skill.level = 5;
    }
    for (key, value) in effects {
        state.skill_effects.insert(key.to_string(), EffectValue::Number(*value));
    }
    (config, state)
}

fn next_morning() -> GameTime {
    GameTime::new(2, 0, 0)
}

#[test]
fn savings_round_down_per_input() {
    let cost: ResourceMap = [("tech_fragment".to_string(), 1), ("wood".to_string(), 10)].into();
    assert_eq!(discounted(&cost, 0.0), cost);
    let eased = discounted(&cost, 0.15);
    assert_eq!(eased["tech_fragment"], 1, "0.15 of one unit saves nothing");
    assert_eq!(eased["wood"], 9);
    assert!(discounted(&cost, 3.0).values().all(|n| *n == 0));
}

#[test]
fn resource_saving_discounts_crafting_inputs() {
    let (config, mut state) = veteran(&[("resource_saving", 0.3)]);
    state.ledger.add("wood", 20).unwrap();

    activity_subsystem::start_recipe(&mut state, &config, ActivityCategory::Crafting, "craft_fuel").unwrap();

    assert_eq!(state.ledger.value("wood"), Some(14), "8 wood less a 2.4 saving rounded down");
    assert_eq!(state.ledger.value("water"), Some(43), "10 water less 3");
}

#[test]
fn crafting_quality_adds_an_extra_unit() {
    let (config, mut state) = veteran(&[("crafting_quality", 1.0)]);
    state.ledger.add("wood", 8).unwrap();
    activity_subsystem::start_recipe(&mut state, &config, ActivityCategory::Crafting, "craft_fuel").unwrap();

    activity_subsystem::complete_due(&mut state, &config, next_morning(), &mut SubsystemRng::new(21, 2, 0));

    assert_eq!(state.ledger.value("fuel"), Some(3));
}

#[test]
fn rare_herb_chance_pays_out_on_herb_gathering() {
    let (config, mut state) = veteran(&[("rare_herb_chance", 1.0)]);
    activity_subsystem::start_recipe(&mut state, &config, ActivityCategory::Gathering, "gather_herb").unwrap();

    let events =
        activity_subsystem::complete_due(&mut state, &config, next_morning(), &mut SubsystemRng::new(21, 2, 0));

    assert!(events.contains(&GameEvent::ResourceGained { resource: "rare_herb".into(), amount: 1 }));
    assert_eq!(state.ledger.value("rare_herb"), Some(1));
}
