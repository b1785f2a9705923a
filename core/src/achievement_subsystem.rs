use crate::{
    error::GameResult,
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    subsystem::{GameSubsystem, TickContext},
};

/// Unlocks survival achievements once each and pays their exp reward.
#[derive(Debug, Default)]
pub struct AchievementSubsystem;

impl AchievementSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl GameSubsystem for AchievementSubsystem {
    fn name(&self) -> &'static str { "achievement" }

    fn update(
        &mut self,
        ctx:        &TickContext<'_>,
        state:      &mut Snapshot,
        _events_in: &[GameEvent],
        _rng:       &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        for def in &ctx.config.achievements {
            if state.achievements.contains(&def.id) || !def.condition.holds(state) {
                continue;
            }
            state.achievements.insert(def.id.clone());
            state.log(format!("Achievement unlocked: {}", def.name));
            log::info!("achievement {} unlocked", def.id);
            events.push(GameEvent::AchievementUnlocked { id: def.id.clone() });
            events.extend(state.grant_player_exp(def.reward_exp));
        }
        Ok(events)
    }
}
