//! Starting and completing timed activities.
//!
//! Starting an activity checks its requirements, pays energy and inputs
//! up front, and schedules it. Completion hands out outputs and
//! experience. Both sides read the content tables in `GameConfig`.

use crate::{
    activity::{ActivityCategory, ActivityTarget, Completion, Placement},
    config::{GameConfig, RecipeDef, RegionDef},
    error::{GameError, GameResult},
    event::GameEvent,
    rng::{SubsystemRng, SubsystemSlot},
    snapshot::{BuildingRecord, Snapshot},
    subsystem::{GameSubsystem, TickContext},
    types::{GameTime, ResourceMap},
};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ActivitySubsystem;

impl ActivitySubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl GameSubsystem for ActivitySubsystem {
    fn name(&self) -> &'static str { "activity" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        rng:        &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        Ok(complete_due(state, ctx.config, ctx.at, rng))
    }
}

// ── Requirements and payment ───────────────────────────────────────

fn check_skills(state: &Snapshot, id: &str, levels: &BTreeMap<String, u32>) -> GameResult<()> {
    for (skill, level) in levels {
        let have = state.skills.get(skill).map(|s| s.level).unwrap_or(0);
        if have < *level {
            return Err(GameError::RequirementsNotMet {
                id:     id.to_string(),
                detail: format!("{skill} level {have} < {level}"),
            });
        }
    }
    Ok(())
}

fn is_queued(state: &Snapshot, category: ActivityCategory, target: &ActivityTarget) -> bool {
    state.activities.queue(category).is_some_and(|q| {
        q.active.iter().any(|a| &a.target == target) || q.pending.iter().any(|p| &p.target == target)
    })
}

/// Energy after weather and skill-tree modifiers.
fn energy_cost(state: &Snapshot, category: ActivityCategory, base: u32) -> u32 {
    let mut factor = state.weather_multipliers().energy_consumption * (1.0 + state.effect("energy_consumption"));
    if category == ActivityCategory::Gathering {
        factor *= 1.0 + state.effect("gathering_energy_cost");
    }
    (base as f64 * factor.max(0.0)).round() as u32
}

/// Minutes after building and skill-tree speed modifiers. Never below 1.
pub fn scaled_duration(state: &Snapshot, config: &GameConfig, category: ActivityCategory, base: u64) -> u64 {
    let speed = match category {
        ActivityCategory::Crafting => {
            let workshop: f64 = state
                .building_effects(config)
                .iter()
                .filter_map(|e| e.crafting_speed)
                .product();
            workshop * (1.0 + state.effect("crafting_speed"))
        }
        ActivityCategory::Researching => {
            1.0 + state.effect("research_speed") + state.effect("all_research_bonus")
        }
        _ => 1.0,
    };
    ((base as f64 / speed.max(0.1)).round() as u64).max(1)
}

/// `cost` less a skill-tree saving fraction; each saving rounds down.
pub fn discounted(cost: &ResourceMap, saving: f64) -> ResourceMap {
    if saving <= 0.0 {
        return cost.clone();
    }
    let saving = saving.min(1.0);
    cost.iter()
        .map(|(r, n)| (r.clone(), n - (*n as f64 * saving).floor() as u32))
        .collect()
}

/// Energy first, then every input; nothing is taken unless all of it is there.
fn pay(state: &mut Snapshot, cost: &ResourceMap, energy: u32) -> GameResult<Vec<GameEvent>> {
    if state.player.energy < energy {
        return Err(GameError::InsufficientEnergy { needed: energy, available: state.player.energy });
    }
    state.ledger.consume_all(cost)?;
    state.player.energy -= energy;
    Ok(cost
        .iter()
        .map(|(r, n)| GameEvent::ResourceSpent { resource: r.clone(), amount: *n })
        .collect())
}

fn schedule(
    state:    &mut Snapshot,
    category: ActivityCategory,
    target:   ActivityTarget,
    minutes:  u64,
) -> GameEvent {
    let label = target.label();
    let now = state.clock.now();
    match state.activities.enqueue(category, target, minutes, now) {
        Placement::Started { completes_at } => {
            state.log(format!("Started {label} ({minutes} min)"));
            GameEvent::ActivityStarted { category, target: label, completes_at }
        }
        Placement::Queued { position } => {
            state.log(format!("Queued {label} at position {position}"));
            GameEvent::ActivityQueued { category, target: label }
        }
    }
}

// ── Starting activities ────────────────────────────────────────────

/// Gather or craft by recipe id.
/// Queue a recipe. It must belong to `category`; a crafting recipe is
/// unknown to gathering and the other way round.
pub fn start_recipe(
    state:    &mut Snapshot,
    config:   &GameConfig,
    category: ActivityCategory,
    id:       &str,
) -> GameResult<Vec<GameEvent>> {
    let recipe = config
        .recipe(id)
        .filter(|r| r.category == category)
        .ok_or_else(|| GameError::UnknownRecipe { id: id.to_string() })?;
    if let Some(tech) = &recipe.technology {
        if !state.researched.contains(tech) {
            return Err(GameError::RequirementsNotMet {
                id:     id.to_string(),
                detail: format!("technology {tech} not researched"),
            });
        }
    }
    check_skills(state, id, &recipe.skill_levels)?;

    let energy = energy_cost(state, recipe.category, recipe.energy);
    let inputs = match category {
        ActivityCategory::Crafting => discounted(&recipe.inputs, state.effect("resource_saving")),
        _ => recipe.inputs.clone(),
    };
    let mut events = pay(state, &inputs, energy)?;
    let minutes = scaled_duration(state, config, recipe.category, recipe.duration_minutes);
    events.push(schedule(state, recipe.category, ActivityTarget::Recipe { id: id.to_string() }, minutes));
    Ok(events)
}

pub fn start_exploration(state: &mut Snapshot, config: &GameConfig, region: &str) -> GameResult<Vec<GameEvent>> {
    let def = config
        .region(region)
        .ok_or_else(|| GameError::UnknownRegion { id: region.to_string() })?;
    check_skills(state, region, &def.skill_levels)?;

    let category = ActivityCategory::Exploring;
    let energy = energy_cost(state, category, def.energy);
    let mut events = pay(state, &def.cost, energy)?;
    let minutes = scaled_duration(state, config, category, def.duration_minutes);
    events.push(schedule(state, category, ActivityTarget::Explore { region: region.to_string() }, minutes));
    Ok(events)
}

/// Queue the next level of a building.
pub fn start_build(state: &mut Snapshot, config: &GameConfig, building: &str) -> GameResult<Vec<GameEvent>> {
    let def = config
        .building(building)
        .ok_or_else(|| GameError::UnknownBuilding { id: building.to_string() })?;
    let category = ActivityCategory::Building;
    let next = state.building_level(building) + 1;
    let target = ActivityTarget::Build { building: building.to_string(), level: next };
    if is_queued(state, category, &target) {
        return Err(GameError::RequirementsNotMet {
            id:     building.to_string(),
            detail: "already under construction".into(),
        });
    }
    let level = def.level(next).ok_or_else(|| GameError::MaxLevelReached {
        id:        building.to_string(),
        max_level: def.max_level(),
    })?;
    check_skills(state, building, &level.skill_levels)?;

    let mut events = pay(state, &level.cost, 0)?;
    let minutes = scaled_duration(state, config, category, level.duration_minutes);
    events.push(schedule(state, category, target, minutes));
    Ok(events)
}

pub fn start_research(state: &mut Snapshot, config: &GameConfig, technology: &str) -> GameResult<Vec<GameEvent>> {
    let def = config
        .technology(technology)
        .ok_or_else(|| GameError::UnknownTechnology { id: technology.to_string() })?;
    let category = ActivityCategory::Researching;
    let target = ActivityTarget::Research { technology: technology.to_string() };
    let unmet = |detail: String| GameError::RequirementsNotMet { id: technology.to_string(), detail };

    if state.researched.contains(technology) {
        return Err(unmet("already researched".into()));
    }
    if is_queued(state, category, &target) {
        return Err(unmet("already being researched".into()));
    }
    if let Some(missing) = def.requires.iter().find(|r| !state.researched.contains(*r)) {
        return Err(unmet(format!("requires {missing}")));
    }

    let cost = discounted(&def.cost, state.effect("research_resource_saving"));
    let mut events = pay(state, &cost, 0)?;
    let minutes = scaled_duration(state, config, category, def.duration_minutes);
    events.push(schedule(state, category, target, minutes));
    Ok(events)
}

/// Drop everything queued in a category. Inputs are not refunded.
pub fn cancel(state: &mut Snapshot, category: ActivityCategory) -> Vec<GameEvent> {
    let discarded = state.activities.cancel(category);
    if discarded == 0 {
        return Vec::new();
    }
    state.log(format!("Cancelled {discarded} {category:?} activities"));
    vec![GameEvent::ActivityCancelled { category, discarded }]
}

// ── Completion ─────────────────────────────────────────────────────

/// Complete everything due at `at`, oldest first.
pub fn complete_due(state: &mut Snapshot, config: &GameConfig, at: GameTime, rng: &mut SubsystemRng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for completion in state.activities.take_due(at) {
        events.extend(complete(state, config, completion, rng));
    }
    events
}

fn complete(state: &mut Snapshot, config: &GameConfig, done: Completion, rng: &mut SubsystemRng) -> Vec<GameEvent> {
    let category = done.category;
    let label = done.activity.target.label();
    state.log(format!("Finished {label}"));
    let mut events = vec![GameEvent::ActivityCompleted {
        category,
        target: label.clone(),
        at:     done.activity.completes_at,
    }];

    match done.activity.target {
        ActivityTarget::Recipe { id } => match config.recipe(&id) {
            Some(recipe) => events.extend(finish_recipe(state, recipe, rng)),
            None => state.log(format!("Recipe {id} no longer exists")),
        },
        ActivityTarget::Explore { region } => match config.region(&region) {
            Some(def) => {
                let mut explore_rng = state.rng.for_subsystem(SubsystemSlot::Exploration);
                events.extend(finish_exploration(state, config, def, &mut explore_rng));
            }
            None => state.log(format!("Region {region} no longer exists")),
        },
        ActivityTarget::Build { building, level } => {
            events.extend(finish_build(state, config, &building, level));
        }
        ActivityTarget::Research { technology } => {
            state.researched.insert(technology.clone());
            state.log(format!("Researched {technology}"));
            let exp = config.technology(&technology).map(|t| t.exp).unwrap_or(0);
            events.push(GameEvent::TechnologyResearched { id: technology });
            events.extend(grant_exp(state, category, exp));
        }
    }
    log::debug!("completed {category:?} {label}");
    events
}

fn grant_exp(state: &mut Snapshot, category: ActivityCategory, exp: u64) -> Vec<GameEvent> {
    if exp == 0 {
        return Vec::new();
    }
    let mut events = state.grant_skill_exp(category.skill(), exp);
    events.extend(state.grant_player_exp(exp));
    events
}

fn finish_recipe(state: &mut Snapshot, recipe: &RecipeDef, rng: &mut SubsystemRng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let gathering = recipe.category == ActivityCategory::Gathering;
    let efficiency = state.weather_multipliers().gathering_efficiency
        * (1.0 + state.effect("gathering_efficiency"))
        * (1.0 + state.effect("gathering_yield"));

    for output in &recipe.outputs {
        let mut amount = rng.range_inclusive(output.min, output.max);
        if gathering && output.is_ranged() {
            amount = (amount as f64 * efficiency).floor() as u32;
        }
        if !gathering && rng.chance(state.effect("extra_crafting_output") + state.effect("crafting_quality")) {
            amount += 1;
        }
        events.extend(state.gain_resource(&output.resource, amount));
    }
    let herbs = recipe.outputs.iter().any(|o| o.resource == "herb");
    let rare = state.effect("rare_herb_chance");
    if gathering && herbs && rare > 0.0 && rng.chance(rare) {
        events.extend(state.gain_resource("rare_herb", 1));
    }
    events.extend(grant_exp(state, recipe.category, recipe.exp));
    events
}

fn finish_exploration(
    state:  &mut Snapshot,
    config: &GameConfig,
    region: &RegionDef,
    rng:    &mut SubsystemRng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let efficiency = state.weather_multipliers().exploration_efficiency;
    for found in &region.resources {
        let amount = (rng.range_inclusive(found.min, found.max) as f64 * efficiency).floor() as u32;
        if amount > 0 {
            events.extend(state.gain_resource(&found.resource, amount));
        }
    }
    state.player.exploration_count += 1;

    let rules = &config.rules;
    if rng.chance(region.difficulty as f64 * rules.danger_per_difficulty) {
        state.log(format!("Ran into danger in the {}", region.name));
        let amount = rng.range_inclusive(rules.danger_damage_min, rules.danger_damage_max);
        events.push(state.damage(amount));
    }
    events.extend(grant_exp(state, ActivityCategory::Exploring, region.exp));
    events
}

fn finish_build(state: &mut Snapshot, config: &GameConfig, building: &str, level: u32) -> Vec<GameEvent> {
    let previous = state.building_level(building);
    match state.buildings.iter_mut().find(|b| b.id == building) {
        Some(record) => record.level = level,
        None => state.buildings.push(BuildingRecord { id: building.to_string(), level }),
    }

    let health_bonus = |lvl: u32| {
        config
            .building(building)
            .and_then(|d| d.level(lvl))
            .map(|l| l.effects.max_health)
            .unwrap_or(0)
    };
    let gained = health_bonus(level).saturating_sub(health_bonus(previous));
    state.player.max_health += gained;
    apply_storage(state, config);

    state.log(format!("{building} upgraded to level {level}"));
    let mut events = vec![GameEvent::BuildingUpgraded { building: building.to_string(), level }];
    events.extend(grant_exp(state, ActivityCategory::Building, 10 * level as u64));
    events
}

/// Rescale caps from the templates by the best storage multiplier built.
pub fn apply_storage(state: &mut Snapshot, config: &GameConfig) {
    let multiplier = state
        .building_effects(config)
        .iter()
        .filter_map(|e| e.storage_multiplier)
        .fold(1.0_f64, f64::max);
    state.ledger.apply_storage_multiplier(&config.resource_caps, multiplier);
}
