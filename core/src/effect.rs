//! Data-driven conditions and effects for content tables.
//!
//! Events, achievements, weather events, and merchant trades carry
//! conditions and effects as tagged enums. This module is the small
//! interpreter that evaluates them against the live snapshot.

use crate::{
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    types::ResourceId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    MinDay { day: u32 },
    DaysSurvivedAtLeast { days: u32 },
    ResourceAtLeast { resource: ResourceId, amount: u32 },
    ResourceBelow { resource: ResourceId, amount: u32 },
    ResourceSumAtLeast { resources: Vec<ResourceId>, amount: u32 },
    SkillLevelAtLeast { skill: String, level: u32 },
    PlayerLevelAtLeast { level: u32 },
    BuildingCountAtLeast { count: usize },
    BuildingLevelAtLeast { building: String, level: u32 },
    ExplorationCountAtLeast { count: u32 },
    ResearchedCountAtLeast { count: usize },
    HealthyDaysAtLeast { days: u32 },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn holds(&self, state: &Snapshot) -> bool {
        match self {
            Condition::Always => true,
            Condition::MinDay { day } => state.clock.day >= *day,
            Condition::DaysSurvivedAtLeast { days } => state.player.days_survived >= *days,
            Condition::ResourceAtLeast { resource, amount } => {
                state.ledger.value(resource).is_some_and(|v| v >= *amount)
            }
            Condition::ResourceBelow { resource, amount } => {
                state.ledger.value(resource).unwrap_or(0) < *amount
            }
            Condition::ResourceSumAtLeast { resources, amount } => {
                let sum: u64 = resources
                    .iter()
                    .map(|r| state.ledger.value(r).unwrap_or(0) as u64)
                    .sum();
                sum >= *amount as u64
            }
            Condition::SkillLevelAtLeast { skill, level } => {
                state.skills.get(skill).is_some_and(|s| s.level >= *level)
            }
            Condition::PlayerLevelAtLeast { level } => state.player.progress.level >= *level,
            Condition::BuildingCountAtLeast { count } => state.buildings.len() >= *count,
            Condition::BuildingLevelAtLeast { building, level } => {
                state.building_level(building) >= *level
            }
            Condition::ExplorationCountAtLeast { count } => {
                state.player.exploration_count >= *count
            }
            Condition::ResearchedCountAtLeast { count } => state.researched.len() >= *count,
            Condition::HealthyDaysAtLeast { days } => state.player.healthy_days >= *days,
            Condition::All { conditions } => conditions.iter().all(|c| c.holds(state)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.holds(state)),
            Condition::Not { condition } => !condition.holds(state),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    #[default]
    Nothing,
    AddResource { resource: ResourceId, min: u32, max: u32 },
    ConsumeResource { resource: ResourceId, amount: u32 },
    /// Lose floor(holding x fraction).
    ConsumeFraction { resource: ResourceId, fraction: f64 },
    /// Health loss in [min, max]; health never drops below 1.
    Damage { min: u32, max: u32 },
    Heal { amount: u32 },
    AddSkillExp { skill: String, amount: u64 },
    AddPlayerExp { min: u64, max: u64 },
    /// Grant a fraction of the player's current level threshold.
    AddPlayerExpFraction { fraction: f64 },
    RaiseMaxHealth { amount: u32 },
    RaiseMaxEnergy { amount: u32 },
    GainRandomResource { resources: Vec<ResourceId>, min: u32, max: u32 },
    /// Lose [min, max] of one random resource, only if the holding covers it.
    LoseRandomResource { resources: Vec<ResourceId>, min: u32, max: u32 },
    Sequence { effects: Vec<Effect> },
    OneOf { effects: Vec<Effect> },
    Chance { probability: f64, then: Box<Effect>, #[serde(default)] otherwise: Box<Effect> },
    IfElse { condition: Condition, then: Box<Effect>, #[serde(default)] otherwise: Box<Effect> },
    Log { message: String },
}

impl Effect {
    /// Apply to the snapshot. Ledger failures are logged, never raised.
    pub fn apply(&self, state: &mut Snapshot, rng: &mut SubsystemRng) -> Vec<GameEvent> {
        let mut out = Vec::new();
        match self {
            Effect::Nothing => {}
            Effect::AddResource { resource, min, max } => {
                let amount = rng.range_inclusive(*min, *max);
                out.extend(state.gain_resource(resource, amount));
            }
            Effect::ConsumeResource { resource, amount } => {
                out.extend(state.spend_resource(resource, *amount));
            }
            Effect::ConsumeFraction { resource, fraction } => {
                let held = state.ledger.value(resource).unwrap_or(0);
                let amount = (held as f64 * fraction.clamp(0.0, 1.0)).floor() as u32;
                if amount > 0 {
                    out.extend(state.spend_resource(resource, amount));
                }
            }
            Effect::Damage { min, max } => {
                let amount = rng.range_inclusive(*min, *max);
                out.push(state.damage(amount));
            }
            Effect::Heal { amount } => {
                out.push(state.heal(*amount));
            }
            Effect::AddSkillExp { skill, amount } => {
                out.extend(state.grant_skill_exp(skill, *amount));
            }
            Effect::AddPlayerExp { min, max } => {
                let (lo, hi) = if min <= max { (*min, *max) } else { (*max, *min) };
                let amount = lo + rng.next_u64_below(hi - lo + 1);
                out.extend(state.grant_player_exp(amount));
            }
            Effect::AddPlayerExpFraction { fraction } => {
                let amount =
                    (state.player.progress.exp_to_next_level as f64 * fraction).floor() as u64;
                out.extend(state.grant_player_exp(amount));
            }
            Effect::RaiseMaxHealth { amount } => {
                state.player.max_health += amount;
                state.log(format!("Max health +{amount}"));
            }
            Effect::RaiseMaxEnergy { amount } => {
                state.player.max_energy += amount;
                state.log(format!("Max energy +{amount}"));
            }
            Effect::GainRandomResource { resources, min, max } => {
                if !resources.is_empty() {
                    let pick = &resources[rng.next_u64_below(resources.len() as u64) as usize];
                    let amount = rng.range_inclusive(*min, *max);
                    out.extend(state.gain_resource(pick, amount));
                }
            }
            Effect::LoseRandomResource { resources, min, max } => {
                if !resources.is_empty() {
                    let pick = &resources[rng.next_u64_below(resources.len() as u64) as usize];
                    let amount = rng.range_inclusive(*min, *max);
                    if state.ledger.value(pick).unwrap_or(0) >= amount {
                        out.extend(state.spend_resource(pick, amount));
                    }
                }
            }
            Effect::Sequence { effects } => {
                for e in effects {
                    out.extend(e.apply(state, rng));
                }
            }
            Effect::OneOf { effects } => {
                if !effects.is_empty() {
                    let i = rng.next_u64_below(effects.len() as u64) as usize;
                    out.extend(effects[i].apply(state, rng));
                }
            }
            Effect::Chance { probability, then, otherwise } => {
                if rng.chance(*probability) {
                    out.extend(then.apply(state, rng));
                } else {
                    out.extend(otherwise.apply(state, rng));
                }
            }
            Effect::IfElse { condition, then, otherwise } => {
                if condition.holds(state) {
                    out.extend(then.apply(state, rng));
                } else {
                    out.extend(otherwise.apply(state, rng));
                }
            }
            Effect::Log { message } => state.log(message.clone()),
        }
        out
    }
}
