use crate::{
    config::GameConfig,
    error::{GameError, GameResult},
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    subsystem::{GameSubsystem, TickContext},
};

/// At each new day, maybe draws one eligible event by weight. At most
/// one event waits for a decision at a time.
#[derive(Debug, Default)]
pub struct RandomEventSubsystem;

impl RandomEventSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl GameSubsystem for RandomEventSubsystem {
    fn name(&self) -> &'static str { "random_event" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        rng:        &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        if !ctx.new_day || state.pending_event.is_some() {
            return Ok(Vec::new());
        }
        if !rng.chance(ctx.config.rules.event_chance_per_day) {
            return Ok(Vec::new());
        }

        let eligible: Vec<_> = ctx
            .config
            .events
            .iter()
            .filter(|e| ctx.at.day >= e.min_day && e.condition.holds(state))
            .collect();
        let weights: Vec<f64> = eligible.iter().map(|e| e.weight).collect();
        let Some(index) = rng.weighted_index(&weights) else {
            return Ok(Vec::new());
        };

        let event = eligible[index];
        state.pending_event = Some(event.id.clone());
        state.log(event.title.clone());
        log::debug!("day {} event {}", ctx.at.day, event.id);
        Ok(vec![GameEvent::RandomEventTriggered { event: event.id.clone() }])
    }
}

/// Apply the chosen option of the pending event and clear it.
pub fn resolve(
    state:  &mut Snapshot,
    config: &GameConfig,
    option: usize,
    rng:    &mut SubsystemRng,
) -> GameResult<Vec<GameEvent>> {
    let id = state.pending_event.clone().ok_or(GameError::NoPendingEvent)?;
    let Some(def) = config.event(&id) else {
        state.pending_event = None;
        return Err(GameError::NoPendingEvent);
    };
    let chosen = def
        .options
        .get(option)
        .filter(|o| o.condition.holds(state))
        .ok_or_else(|| GameError::EventOptionUnavailable { event: id.clone(), index: option })?;

    state.pending_event = None;
    state.log(chosen.label.clone());
    let mut events = chosen.effect.apply(state, rng);
    events.push(GameEvent::RandomEventResolved { event: id, option });
    Ok(events)
}
