//! Snapshot: the complete persisted game state.
//!
//! The engine owns exactly one snapshot. Everything here is serialized
//! into the save blob except the display log, which is rebuilt empty on
//! load. A fresh game deep-copies every template out of `GameConfig`.

use crate::{
    activity::ActivityQueues,
    clock::WorldClock,
    config::{BuildingEffects, GameConfig},
    dice::DiceState,
    event::{EventLog, GameEvent},
    ledger::ResourceLedger,
    rng::{RngBank, SubsystemSlot},
    skills::{self, EffectValue, Skill, SkillBook},
    weather::{WeatherMultipliers, WeatherState},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const HEALTH_PER_LEVEL: u32 = 10;
pub const ENERGY_PER_LEVEL: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerVitals {
    pub health:            u32,
    pub max_health:        u32,
    pub energy:            u32,
    pub max_energy:        u32,
    /// Survivor level and experience.
    pub progress:          Skill,
    #[serde(default)]
    pub days_survived:     u32,
    #[serde(default)]
    pub exploration_count: u32,
    #[serde(default)]
    pub healthy_days:      u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildingRecord {
    pub id:    String,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Missing in saves written before versioning existed.
    #[serde(default)]
    pub format_version: u32,
    pub session_id:     String,
    pub rng:            RngBank,
    pub player:         PlayerVitals,
    pub ledger:         ResourceLedger,
    pub skills:         SkillBook,
    #[serde(default)]
    pub tree_levels:    BTreeMap<String, u32>,
    #[serde(default)]
    pub skill_effects:  BTreeMap<String, EffectValue>,
    pub clock:          WorldClock,
    pub weather:        WeatherState,
    #[serde(default)]
    pub buildings:      Vec<BuildingRecord>,
    #[serde(default)]
    pub researched:     BTreeSet<String>,
    #[serde(default)]
    pub activities:     ActivityQueues,
    #[serde(default)]
    pub achievements:   BTreeSet<String>,
    #[serde(default)]
    pub pending_event:  Option<String>,
    /// merchant id → item id → units left this visit.
    #[serde(default)]
    pub merchant_stock: BTreeMap<String, BTreeMap<String, u32>>,
    pub dice:           DiceState,
    #[serde(skip)]
    pub event_log:      EventLog,
}

impl Snapshot {
    /// A fresh game. Templates are cloned, never shared.
    pub fn new_game(config: &GameConfig, seed: u64) -> Self {
        let mut rng = RngBank::new(seed);
        let mut session_rng = rng.for_subsystem(SubsystemSlot::Session);
        let mut bytes = [0u8; 16];
        for chunk in bytes.chunks_mut(8) {
            chunk.copy_from_slice(&session_rng.next_u64().to_le_bytes());
        }
        let session_id = uuid::Builder::from_random_bytes(bytes).into_uuid().to_string();

        let clock = WorldClock::new();
        let weather = WeatherState::new(clock.now());
        let rules = &config.rules;

        Self {
            format_version: crate::repair::SAVE_FORMAT_VERSION,
            session_id,
            rng,
            player: PlayerVitals {
                health:            rules.start_health,
                max_health:        rules.start_health,
                energy:            rules.start_energy,
                max_energy:        rules.start_energy,
                progress:          Skill::new("survivor"),
                days_survived:     0,
                exploration_count: 0,
                healthy_days:      0,
            },
            ledger: ResourceLedger::from_templates(&config.initial_resources, &config.resource_caps),
            skills: config.skills.iter().map(|s| (s.clone(), Skill::new(s))).collect(),
            tree_levels: BTreeMap::new(),
            skill_effects: BTreeMap::new(),
            clock,
            weather,
            buildings: Vec::new(),
            researched: config
                .technologies
                .iter()
                .filter(|t| t.innate)
                .map(|t| t.id.clone())
                .collect(),
            activities: ActivityQueues::default(),
            achievements: BTreeSet::new(),
            pending_event: None,
            merchant_stock: BTreeMap::new(),
            dice: DiceState::new(&rules.starting_dice),
            event_log: EventLog::default(),
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.event_log.push(self.clock.now(), message);
    }

    /// 0 when the building has not been built.
    pub fn building_level(&self, id: &str) -> u32 {
        self.buildings.iter().find(|b| b.id == id).map(|b| b.level).unwrap_or(0)
    }

    /// Effects of every building at its current level.
    pub fn building_effects<'a>(&self, config: &'a GameConfig) -> Vec<&'a BuildingEffects> {
        self.buildings
            .iter()
            .filter_map(|b| config.building(&b.id).and_then(|def| def.level(b.level)))
            .map(|level| &level.effects)
            .collect()
    }

    /// Numeric skill-tree effect, 0.0 when absent or a flag.
    pub fn effect(&self, key: &str) -> f64 {
        self.skill_effects.get(key).and_then(EffectValue::as_number).unwrap_or(0.0)
    }

    /// Current weather multipliers as the survivor feels them.
    pub fn weather_multipliers(&self) -> WeatherMultipliers {
        self.weather.multipliers.resisted(self.effect("weather_resistance"))
    }

    pub fn gain_resource(&mut self, resource: &str, amount: u32) -> Vec<GameEvent> {
        match self.ledger.add(resource, amount) {
            Ok(0) => Vec::new(),
            Ok(credited) => vec![GameEvent::ResourceGained { resource: resource.to_string(), amount: credited }],
            Err(e) => {
                self.log(format!("Could not add {resource}: {e}"));
                vec![GameEvent::ResourceRejected { resource: resource.to_string(), reason: e.to_string() }]
            }
        }
    }

    pub fn spend_resource(&mut self, resource: &str, amount: u32) -> Vec<GameEvent> {
        match self.ledger.consume(resource, amount) {
            Ok(()) => vec![GameEvent::ResourceSpent { resource: resource.to_string(), amount }],
            Err(e) => {
                self.log(format!("Could not spend {resource}: {e}"));
                vec![GameEvent::ResourceRejected { resource: resource.to_string(), reason: e.to_string() }]
            }
        }
    }

    /// Health never drops below 1.
    pub fn damage(&mut self, amount: u32) -> GameEvent {
        let before = self.player.health;
        self.player.health = before.saturating_sub(amount).max(1);
        let delta = self.player.health as i64 - before as i64;
        self.log(format!("Lost {} health", -delta));
        GameEvent::HealthChanged { delta, health: self.player.health }
    }

    pub fn heal(&mut self, amount: u32) -> GameEvent {
        let before = self.player.health;
        self.player.health = before.saturating_add(amount).min(self.player.max_health);
        let delta = self.player.health as i64 - before as i64;
        self.log(format!("Recovered {delta} health"));
        GameEvent::HealthChanged { delta, health: self.player.health }
    }

    pub fn recover_energy(&mut self, amount: u32) {
        self.player.energy = self.player.energy.saturating_add(amount).min(self.player.max_energy);
    }

    /// One `SkillLevelUp` per level gained. Unknown skills are logged.
    pub fn grant_skill_exp(&mut self, skill: &str, amount: u64) -> Vec<GameEvent> {
        match skills::add_experience(&mut self.skills, skill, amount) {
            Ok(gained) => {
                let level = self.skills.get(skill).map(|s| s.level).unwrap_or(1);
                let first = level + 1 - gained;
                (first..=level)
                    .map(|l| {
                        self.log(format!("{skill} reached level {l}"));
                        GameEvent::SkillLevelUp { skill: skill.to_string(), level: l }
                    })
                    .collect()
            }
            Err(e) => {
                self.log(e.to_string());
                Vec::new()
            }
        }
    }

    /// Survivor levels raise max health and max energy.
    pub fn grant_player_exp(&mut self, amount: u64) -> Vec<GameEvent> {
        let gained = self.player.progress.add_experience(amount);
        let level = self.player.progress.level;
        let mut out = Vec::new();
        for l in (level + 1 - gained)..=level {
            self.player.max_health += HEALTH_PER_LEVEL;
            self.player.max_energy += ENERGY_PER_LEVEL;
            self.log(format!("Survivor level {l}"));
            out.push(GameEvent::PlayerLevelUp { level: l });
        }
        if gained > 0 {
            log::info!("survivor reached level {level}");
        }
        out
    }
}
