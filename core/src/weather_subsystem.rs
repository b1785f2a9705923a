use crate::{
    error::GameResult,
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    subsystem::{GameSubsystem, TickContext},
    weather,
};

/// Rolls weather transitions when due, then samples the special events
/// of whichever type is active.
#[derive(Debug, Default)]
pub struct WeatherSubsystem;

impl WeatherSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl GameSubsystem for WeatherSubsystem {
    fn name(&self) -> &'static str { "weather" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        rng:        &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        let types = &ctx.config.weather_types;

        if state.weather.is_due(ctx.at) {
            let t = weather::roll_transition(
                &mut state.weather,
                types,
                ctx.at,
                ctx.config.rules.season_length,
                rng,
            );
            log::debug!("weather {} -> {} for {}h", t.from, t.to, t.duration_hours);
            if t.changed() {
                let name = ctx.config.weather_type(&t.to).map(|w| w.name.as_str()).unwrap_or(t.to.as_str());
                state.log(format!("The weather turns {name} for {} hours", t.duration_hours));
                events.push(GameEvent::WeatherChanged {
                    from:           t.from,
                    to:             t.to,
                    duration_hours: t.duration_hours,
                });
            }
        }

        let Some(active) = ctx.config.weather_type(&state.weather.current) else {
            return Ok(events);
        };
        for special in &active.events {
            if !rng.chance(special.probability) || !special.condition.holds(state) {
                continue;
            }
            state.log(format!("{}!", special.name));
            events.extend(special.effect.apply(state, rng));
            events.push(GameEvent::WeatherEventFired {
                weather: active.id.clone(),
                event:   special.id.clone(),
            });
        }
        Ok(events)
    }
}
