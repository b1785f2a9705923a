use crate::{
    config::SurvivalRules,
    error::GameResult,
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    subsystem::{GameSubsystem, TickContext},
};

/// Hourly energy recovery; at each new day, food and water upkeep,
/// the healthy-day streak, and building output.
#[derive(Debug, Default)]
pub struct UpkeepSubsystem;

impl UpkeepSubsystem {
    pub fn new() -> Self {
        Self
    }
}

/// Daily need after weather and skill-tree consumption modifiers.
pub fn daily_need(base: u32, weather: f64, skill_effect: f64) -> u32 {
    (base as f64 * weather * (1.0 + skill_effect).max(0.0)).round() as u32
}

fn pay_upkeep(state: &mut Snapshot, resource: &str, need: u32, events: &mut Vec<GameEvent>) -> u32 {
    let have = state.ledger.value(resource).unwrap_or(0);
    let paid = have.min(need);
    if paid > 0 {
        events.extend(state.spend_resource(resource, paid));
    }
    need - paid
}

fn end_of_day(state: &mut Snapshot, rules: &SurvivalRules, events: &mut Vec<GameEvent>) {
    state.player.days_survived += 1;

    let m = state.weather_multipliers();
    let hardiness = state.effect("all_survival_stats");
    let food = daily_need(rules.daily_food, m.food_consumption, state.effect("food_consumption") - hardiness);
    let water = daily_need(rules.daily_water, m.water_consumption, state.effect("water_consumption") - hardiness);
    let food_short = pay_upkeep(state, "food", food, events);
    let water_short = pay_upkeep(state, "water", water, events);

    if food_short > 0 || water_short > 0 {
        state.log(format!("Not enough to eat and drink (food -{food_short}, water -{water_short})"));
        events.push(GameEvent::Starved { food_short, water_short });
        events.push(state.damage(rules.starvation_damage));
        state.player.healthy_days = 0;
        return;
    }

    let healthy = state.player.health as f64 >= state.player.max_health as f64 * rules.healthy_threshold;
    if healthy {
        state.player.healthy_days += 1;
    } else {
        state.player.healthy_days = 0;
    }

    let recovery = state.effect("health_recovery") + hardiness;
    let healing = (state.player.max_health as f64 * recovery).floor() as u32;
    if healing > 0 && state.player.health < state.player.max_health {
        events.push(state.heal(healing));
    }
}

impl GameSubsystem for UpkeepSubsystem {
    fn name(&self) -> &'static str { "upkeep" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        _rng:       &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        let effects = state.building_effects(ctx.config);

        let recovery = ctx.config.rules.base_energy_recovery
            + effects.iter().map(|e| e.energy_recovery).sum::<u32>();
        state.recover_energy(recovery);

        if ctx.new_day {
            let output: Vec<(String, u32)> = effects
                .iter()
                .flat_map(|e| e.daily_output.iter().map(|(r, n)| (r.clone(), *n)))
                .collect();
            end_of_day(state, &ctx.config.rules, &mut events);
            for (resource, amount) in output {
                events.extend(state.gain_resource(&resource, amount));
            }
            log::debug!(
                "day {} upkeep: health={} food={:?} water={:?}",
                ctx.at.day,
                state.player.health,
                state.ledger.value("food"),
                state.ledger.value("water")
            );
        }
        Ok(events)
    }
}
