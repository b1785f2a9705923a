//! Weather cycle — season-weighted transitions with duration windows.
//!
//! The weather-type table in `GameConfig` is the only source of weather
//! probabilities, season modifiers, durations, effect multipliers, and
//! special events.
//!
//! Transition algorithm (run when the clock reaches `next_change`):
//!   1. season from the day number
//!   2. weight = base probability x season modifier (missing = 1.0)
//!   3. normalize to 1
//!   4. halve the current type's weight, re-normalize
//!   5. cumulative-sum draw; fall through to FALLBACK_WEATHER
//!   6. duration uniform in [min, max] hours, next change with day rollover
//!   7. caller logs only when the type changed
//!   8. multipliers reset to neutral, then re-derived from the new type

use crate::{
    effect::{Condition, Effect},
    rng::SubsystemRng,
    types::{Day, GameTime},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returned when the cumulative draw falls through on rounding loss.
pub const FALLBACK_WEATHER: &str = "clear";

/// Weight factor applied to the active type before drawing its successor.
pub const REPEAT_DAMPING: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// floor(((day - 1) mod (season_length * 4)) / season_length)
    pub fn for_day(day: Day, season_length: u32) -> Season {
        let len = season_length.max(1);
        let index = (day.saturating_sub(1) % (len * 4)) / len;
        Season::ALL[index as usize]
    }
}

/// Live numeric effect multipliers. 1.0 is neutral.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherMultipliers {
    pub gathering_efficiency:   f64,
    pub energy_consumption:     f64,
    pub water_consumption:      f64,
    pub food_consumption:       f64,
    pub exploration_efficiency: f64,
}

impl Default for WeatherMultipliers {
    fn default() -> Self {
        Self {
            gathering_efficiency:   1.0,
            energy_consumption:     1.0,
            water_consumption:      1.0,
            food_consumption:       1.0,
            exploration_efficiency: 1.0,
        }
    }
}

impl WeatherMultipliers {
    /// Every multiplier pulled toward 1.0 by `resistance`, clamped to 0..=1.
    pub fn resisted(&self, resistance: f64) -> Self {
        let r = resistance.clamp(0.0, 1.0);
        if r == 0.0 {
            return *self;
        }
        let pull = |m: f64| 1.0 + (m - 1.0) * (1.0 - r);
        Self {
            gathering_efficiency:   pull(self.gathering_efficiency),
            energy_consumption:     pull(self.energy_consumption),
            water_consumption:      pull(self.water_consumption),
            food_consumption:       pull(self.food_consumption),
            exploration_efficiency: pull(self.exploration_efficiency),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourRange {
    pub min: u32,
    pub max: u32,
}

/// A special event tied to one weather type, sampled on every check
/// while that type is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherEventDef {
    pub id:          String,
    pub name:        String,
    pub probability: f64,
    #[serde(default)]
    pub condition:   Condition,
    pub effect:      Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherTypeDef {
    pub id:               String,
    pub name:             String,
    pub probability:      f64,
    pub duration:         HourRange,
    pub effects:          WeatherMultipliers,
    #[serde(default)]
    pub season_modifiers: BTreeMap<Season, f64>,
    #[serde(default)]
    pub events:           Vec<WeatherEventDef>,
}

impl WeatherTypeDef {
    pub fn season_modifier(&self, season: Season) -> f64 {
        self.season_modifiers.get(&season).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherState {
    pub current:        String,
    pub duration_hours: u32,
    pub next_change:    GameTime,
    pub multipliers:    WeatherMultipliers,
}

impl WeatherState {
    /// Clear skies until the next hour boundary, so the first check rolls.
    pub fn new(start: GameTime) -> Self {
        Self {
            current:        FALLBACK_WEATHER.to_string(),
            duration_hours: 0,
            next_change:    GameTime::new(start.day, start.hour, 0).plus_hours(1),
            multipliers:    WeatherMultipliers::default(),
        }
    }

    /// (day, hour) has reached or passed the stored change point.
    pub fn is_due(&self, at: GameTime) -> bool {
        (at.day, at.hour) >= (self.next_change.day, self.next_change.hour)
    }

    /// Hours left before the next change, as seen from `at`.
    pub fn hours_remaining(&self, at: GameTime) -> u32 {
        let now = at.day as i64 * 24 + at.hour as i64;
        let next = self.next_change.day as i64 * 24 + self.next_change.hour as i64;
        (next - now).max(0) as u32
    }
}

/// Normalized probability table for a season, in table order.
/// An all-zero table falls back to uniform weights.
pub fn probability_table(types: &[WeatherTypeDef], season: Season) -> Vec<(String, f64)> {
    let weights: Vec<(String, f64)> = types
        .iter()
        .map(|t| (t.id.clone(), (t.probability * t.season_modifier(season)).max(0.0)))
        .collect();
    normalize(weights)
}

fn normalize(mut weights: Vec<(String, f64)>) -> Vec<(String, f64)> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total > 0.0 {
        for (_, w) in weights.iter_mut() {
            *w /= total;
        }
    } else if !weights.is_empty() {
        let uniform = 1.0 / weights.len() as f64;
        for (_, w) in weights.iter_mut() {
            *w = uniform;
        }
    }
    weights
}

/// The season table with the current type damped and re-normalized.
pub fn transition_table(
    types:   &[WeatherTypeDef],
    season:  Season,
    current: Option<&str>,
) -> Vec<(String, f64)> {
    let mut table = probability_table(types, season);
    if let Some(current) = current {
        if let Some(entry) = table.iter_mut().find(|(id, w)| id == current && *w > 0.0) {
            entry.1 *= REPEAT_DAMPING;
            table = normalize(table);
        }
    }
    table
}

/// Cumulative-sum sampling: the first type whose cumulative weight
/// exceeds `draw` wins. Falls back to FALLBACK_WEATHER on rounding loss.
pub fn pick_from_table(table: &[(String, f64)], draw: f64) -> String {
    let mut cumulative = 0.0;
    for (id, weight) in table {
        cumulative += weight;
        if draw < cumulative {
            return id.clone();
        }
    }
    FALLBACK_WEATHER.to_string()
}

pub fn select_weather(
    types:   &[WeatherTypeDef],
    season:  Season,
    current: Option<&str>,
    rng:     &mut SubsystemRng,
) -> String {
    let table = transition_table(types, season, current);
    pick_from_table(&table, rng.next_f64())
}

/// Result of one transition roll.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from:           String,
    pub to:             String,
    pub duration_hours: u32,
    pub next_change:    GameTime,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Roll the next weather type and schedule its end. Multipliers are
/// reset to neutral and then re-derived from the new type's effects.
pub fn roll_transition(
    state:         &mut WeatherState,
    types:         &[WeatherTypeDef],
    at:            GameTime,
    season_length: u32,
    rng:           &mut SubsystemRng,
) -> Transition {
    let season = Season::for_day(at.day, season_length);
    let from = state.current.clone();
    let to = select_weather(types, season, Some(&from), rng);

    let duration_hours = types
        .iter()
        .find(|t| t.id == to)
        .map(|t| rng.range_inclusive(t.duration.min, t.duration.max))
        .unwrap_or(6)
        .max(1);
    let next_change = GameTime::new(at.day, at.hour, 0).plus_hours(duration_hours);

    state.current = to.clone();
    state.duration_hours = duration_hours;
    state.next_change = next_change;
    state.multipliers = WeatherMultipliers::default();
    if let Some(def) = types.iter().find(|t| t.id == to) {
        state.multipliers = def.effects;
    }

    Transition { from, to, duration_hours, next_change }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_cycle_every_four_lengths() {
        assert_eq!(Season::for_day(1, 30), Season::Spring);
        assert_eq!(Season::for_day(30, 30), Season::Spring);
        assert_eq!(Season::for_day(31, 30), Season::Summer);
        assert_eq!(Season::for_day(61, 30), Season::Autumn);
        assert_eq!(Season::for_day(91, 30), Season::Winter);
        assert_eq!(Season::for_day(121, 30), Season::Spring);
    }

    #[test]
    fn draw_past_total_falls_back() {
        let table = vec![("rainy".to_string(), 0.4), ("foggy".to_string(), 0.6 - 1e-12)];
        assert_eq!(pick_from_table(&table, 0.999_999_999_999_9), FALLBACK_WEATHER);
        assert_eq!(pick_from_table(&table, 0.1), "rainy");
    }

    #[test]
    fn next_change_rolls_over_midnight() {
        let t = GameTime::new(3, 22, 0).plus_hours(5);
        assert_eq!(t, GameTime::new(4, 3, 0));
    }
}
