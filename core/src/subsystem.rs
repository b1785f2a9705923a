//! Subsystem trait and registry.
//!
//! RULE: Every hourly phase implements GameSubsystem.
//! The engine calls update() on each registered subsystem in
//! registration order, once per hour boundary crossed.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    config::GameConfig,
    error::GameResult,
    event::GameEvent,
    rng::SubsystemRng,
    snapshot::Snapshot,
    types::GameTime,
};

/// What every phase sees about the boundary being processed.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub at:      GameTime,
    /// True when `at` is 00:00 of a new day.
    pub new_day: bool,
    pub config:  &'a GameConfig,
}

impl<'a> TickContext<'a> {
    pub fn new(at: GameTime, config: &'a GameConfig) -> Self {
        Self { at, new_day: at.hour == 0 && at.minute == 0, config }
    }
}

/// The contract every subsystem must fulfill.
pub trait GameSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per hour boundary by the engine.
    ///
    /// - `ctx`:       the boundary time and content tables
    /// - `state`:     the live snapshot
    /// - `events_in`: events emitted by earlier subsystems at this boundary
    /// - `rng`:       this subsystem's deterministic stream for this call
    fn update(
        &mut self,
        ctx:       &TickContext<'_>,
        state:     &mut Snapshot,
        events_in: &[GameEvent],
        rng:       &mut SubsystemRng,
    ) -> GameResult<Vec<GameEvent>>;
}
