//! Weather tables and transitions.

use outpost_core::{
    config::GameConfig,
    rng::SubsystemRng,
    skills::EffectValue,
    snapshot::Snapshot,
    types::GameTime,
    weather::{probability_table, roll_transition, transition_table, Season, WeatherMultipliers, WeatherState},
};

fn share(table: &[(String, f64)], id: &str) -> f64 {
    table.iter().find(|(t, _)| t == id).map(|(_, w)| *w).unwrap_or(0.0)
}

#[test]
fn every_season_table_is_a_distribution() {
    let config = GameConfig::builtin();
    for season in Season::ALL {
        let table = probability_table(&config.weather_types, season);
        let total: f64 = table.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9, "{season:?} sums to {total}");
        assert!(table.iter().all(|(_, w)| *w >= 0.0));
    }
}

#[test]
fn explicit_zero_modifier_rules_a_type_out() {
    let config = GameConfig::builtin();
    let summer = probability_table(&config.weather_types, Season::Summer);
    let winter = probability_table(&config.weather_types, Season::Winter);

    assert_eq!(share(&summer, "blizzard"), 0.0);
    assert_eq!(share(&winter, "heatwave"), 0.0);
    assert!(share(&winter, "blizzard") > share(&summer, "blizzard"));
}

#[test]
fn current_weather_is_damped_before_the_draw() {
    let config = GameConfig::builtin();
    let plain = probability_table(&config.weather_types, Season::Spring);
    let damped = transition_table(&config.weather_types, Season::Spring, Some("clear"));

    assert!(share(&damped, "clear") < share(&plain, "clear"));
    assert!(share(&damped, "rainy") > share(&plain, "rainy"));
    let total: f64 = damped.iter().map(|(_, w)| w).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn transition_schedules_within_the_duration_window() {
    let config = GameConfig::builtin();
    let mut rng = SubsystemRng::new(12, 0, 1);
    let start = GameTime::new(1, 9, 0);
    let mut state = WeatherState::new(GameTime::new(1, 8, 0));
    assert!(state.is_due(start));

    for _ in 0..50 {
        let t = roll_transition(&mut state, &config.weather_types, start, 30, &mut rng);
        let def = config.weather_type(&t.to).expect("only table types are drawn");

        assert!(
            (def.duration.min..=def.duration.max).contains(&t.duration_hours),
            "{} lasted {}h",
            t.to, t.duration_hours
        );
        assert_eq!(t.next_change, start.plus_hours(t.duration_hours));
        assert_eq!(state.multipliers, def.effects, "multipliers come from the new type");
        assert_eq!(state.hours_remaining(start), t.duration_hours);
        assert!(!state.is_due(start));
    }
}

#[test]
fn data_files_mirror_the_builtin_tables() {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let loaded = GameConfig::load(data_dir).unwrap();
    let builtin = GameConfig::builtin();

    assert_eq!(loaded.buff_library, builtin.buff_library);
    assert_eq!(loaded.dice_profiles, builtin.dice_profiles);
    assert_eq!(loaded.dice_achievements, builtin.dice_achievements);
    let ids = |c: &GameConfig| c.weather_types.iter().map(|w| w.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&loaded), ids(&builtin));
}

#[test]
fn missing_data_dir_keeps_the_builtin_tables() {
    let loaded = GameConfig::load("/nonexistent/outpost-data").unwrap();
    assert_eq!(loaded.weather_types.len(), GameConfig::builtin().weather_types.len());
}

#[test]
fn weather_resistance_pulls_multipliers_toward_neutral() {
    let harsh = WeatherMultipliers {
        gathering_efficiency:   0.5,
        energy_consumption:     1.5,
        water_consumption:      2.0,
        food_consumption:       1.0,
        exploration_efficiency: 0.8,
    };
    assert_eq!(harsh.resisted(0.0), harsh);
    assert_eq!(harsh.resisted(5.0), WeatherMultipliers::default(), "full resistance is neutral weather");

    let config = GameConfig::builtin();
    let mut state = Snapshot::new_game(&config, 9);
    state.weather.multipliers = harsh;
    state.skill_effects.insert("weather_resistance".into(), EffectValue::Number(0.3));

    let felt = state.weather_multipliers();
    assert!((felt.gathering_efficiency - 0.65).abs() < 1e-9);
    assert!((felt.water_consumption - 1.7).abs() < 1e-9);
    assert_eq!(felt.food_consumption, 1.0);
    assert_eq!(state.weather.multipliers, harsh, "the stored weather is untouched");
}
