//! The game engine: owns the snapshot and every way of changing it.
//!
//! EXECUTION ORDER per hour boundary (fixed, never reordered):
//!   1. Activity subsystem     (due completions, FIFO per category)
//!   2. Weather subsystem      (transition when due, special events)
//!   3. Upkeep subsystem       (energy; daily food/water and streak)
//!   4. Merchant subsystem     (arrivals and restock at a new day)
//!   5. Random event subsystem (at most one pending event)
//!   6. Achievement subsystem  (unlock checks)
//! Activities that finish between boundaries are completed at the end
//! of the advance.
//!
//! RULES:
//!   - All randomness flows through the snapshot's RngBank.
//!   - Saves are fire-and-forget: a failed save is logged and the
//!     in-memory snapshot stays authoritative.
//!   - A load that fails for any reason keeps the current game.

use crate::{
    achievement_subsystem::AchievementSubsystem,
    activity::ActivityCategory,
    activity_subsystem::{self, ActivitySubsystem},
    buffs::{BaseScorer, BuffId, StandardScorer},
    clock::ClockSpeed,
    codec,
    config::{GameConfig, MerchantDef},
    dice::{DrawOutcome, RoundOutcome, ShowOutcome},
    error::{GameError, GameResult},
    event::GameEvent,
    merchant_subsystem::{self, MerchantSubsystem},
    random_event_subsystem::{self, RandomEventSubsystem},
    repair,
    rng::SubsystemSlot,
    skills::{self, EffectValue, TreeLearner},
    snapshot::Snapshot,
    storage::KvStorage,
    subsystem::{GameSubsystem, TickContext},
    types::GameTime,
    upkeep_subsystem::UpkeepSubsystem,
    weather_subsystem::WeatherSubsystem,
};

/// Storage key used when none is given.
pub const DEFAULT_SAVE_KEY: &str = "outpost_save";

pub struct GameEngine {
    pub config:  GameConfig,
    state:       Snapshot,
    storage:     Box<dyn KvStorage>,
    save_key:    String,
    scorer:      Box<dyn BaseScorer>,
    subsystems:  Vec<(SubsystemSlot, Box<dyn GameSubsystem>)>,
}

impl GameEngine {
    /// A fresh game with no subsystems registered.
    pub fn new(config: GameConfig, storage: Box<dyn KvStorage>, save_key: &str, seed: u64) -> Self {
        let state = Snapshot::new_game(&config, seed);
        Self {
            config,
            state,
            storage,
            save_key: save_key.to_string(),
            scorer: Box::new(StandardScorer),
            subsystems: Vec::new(),
        }
    }

    /// Build a fully wired engine with every subsystem registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: GameConfig, storage: Box<dyn KvStorage>, save_key: &str, seed: u64) -> Self {
        let mut engine = GameEngine::new(config, storage, save_key, seed);

        // EXECUTION ORDER: fixed, documented, never reordered.
        engine.register(SubsystemSlot::Activity, Box::new(ActivitySubsystem::new()));
        engine.register(SubsystemSlot::Weather, Box::new(WeatherSubsystem::new()));
        engine.register(SubsystemSlot::Upkeep, Box::new(UpkeepSubsystem::new()));
        engine.register(SubsystemSlot::Merchant, Box::new(MerchantSubsystem::new()));
        engine.register(SubsystemSlot::RandomEvent, Box::new(RandomEventSubsystem::new()));
        engine.register(SubsystemSlot::Achievement, Box::new(AchievementSubsystem::new()));

        let session_id = engine.state.session_id.clone();
        engine.state.log("A new survivor arrives at the outpost");
        log::debug!("new game {session_id} (seed {seed})");
        engine
    }

    /// Resume the save under `save_key`, or start fresh when there is no
    /// usable save.
    pub fn open(config: GameConfig, storage: Box<dyn KvStorage>, save_key: &str, seed: u64) -> Self {
        let mut engine = GameEngine::build(config, storage, save_key, seed);
        if engine.load().is_none() {
            log::info!("no usable save under {save_key}; starting a new game");
        }
        engine
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn GameSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    /// Swap the base scoring rule used by dice shows.
    pub fn set_scorer(&mut self, scorer: Box<dyn BaseScorer>) {
        self.scorer = scorer;
    }

    pub fn state(&self) -> &Snapshot {
        &self.state
    }

    pub fn storage(&self) -> &dyn KvStorage {
        self.storage.as_ref()
    }

    pub fn into_storage(self) -> Box<dyn KvStorage> {
        self.storage
    }

    // ── Persistence ────────────────────────────────────────────

    /// Encode and store the snapshot. Failures are logged, never raised.
    pub fn save(&mut self) -> GameEvent {
        let stored = codec::seal(&self.save_key, &self.state)
            .and_then(|blob| self.storage.set(&self.save_key, &blob).map(|_| blob.len()));
        match stored {
            Ok(bytes) => {
                log::info!("saved {} ({bytes} bytes)", self.save_key);
                GameEvent::GameSaved { bytes }
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                self.state.log(format!("Save failed: {e}"));
                GameEvent::SaveFailed { reason: e.to_string() }
            }
        }
    }

    /// Replace the snapshot with the stored one, repaired. Returns None
    /// and keeps the current game when nothing usable is stored.
    pub fn load(&mut self) -> Option<GameEvent> {
        let stored = match self.storage.get(&self.save_key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("could not read {}: {e}", self.save_key);
                return None;
            }
        };
        let mut state = match codec::unseal(&self.save_key, &stored) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("discarding save {}: {e}", self.save_key);
                self.state.log("The save could not be read; starting over");
                return None;
            }
        };
        let report = repair::repair_snapshot(&mut state, &self.config);
        self.state = state;
        self.state.log("Welcome back");
        log::info!("loaded {} at {}", self.save_key, self.state.clock.now());
        Some(GameEvent::GameLoaded { repaired: report.lines() })
    }

    /// Start over: a fresh snapshot and no stored save.
    pub fn reset(&mut self, seed: u64) -> GameEvent {
        if let Err(e) = self.storage.remove(&self.save_key) {
            log::warn!("could not clear {}: {e}", self.save_key);
        }
        self.state = Snapshot::new_game(&self.config, seed);
        self.state.log("A new survivor arrives at the outpost");
        GameEvent::NewGameStarted { session_id: self.state.session_id.clone() }
    }

    /// Saves after anything that counts as a natural save point.
    fn save_if_milestone(&mut self, events: &mut Vec<GameEvent>) {
        let milestone = events.iter().any(|e| {
            matches!(
                e,
                GameEvent::DayStarted { .. }
                    | GameEvent::PlayerLevelUp { .. }
                    | GameEvent::SkillLevelUp { .. }
            )
        });
        if milestone {
            let saved = self.save();
            events.push(saved);
        }
    }

    // ── Time ───────────────────────────────────────────────────

    pub fn pause(&mut self) {
        self.state.clock.pause();
    }

    pub fn resume(&mut self) {
        self.state.clock.resume();
    }

    pub fn set_speed(&mut self, speed: ClockSpeed) {
        self.state.clock.set_speed(speed);
    }

    /// Advance by real seconds at the clock's speed.
    pub fn advance_real_seconds(&mut self, seconds: f64) -> GameResult<Vec<GameEvent>> {
        let crossed = self.state.clock.advance_real_seconds(seconds);
        self.process(crossed)
    }

    /// Advance by game minutes. Returns everything that happened.
    pub fn advance_minutes(&mut self, minutes: u64) -> GameResult<Vec<GameEvent>> {
        let crossed = self.state.clock.advance_minutes(minutes);
        self.process(crossed)
    }

    fn process(&mut self, crossed: Vec<GameTime>) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        for at in crossed {
            let ctx = TickContext::new(at, &self.config);
            let mut boundary = vec![GameEvent::HourPassed { at }];
            if ctx.new_day {
                boundary.push(GameEvent::DayStarted { day: at.day });
                log::debug!("day {} begins", at.day);
            }
            for (slot, subsystem) in &mut self.subsystems {
                let mut rng = self.state.rng.for_subsystem(*slot);
                let produced = subsystem.update(&ctx, &mut self.state, &boundary, &mut rng)?;
                boundary.extend(produced);
            }
            events.extend(boundary);
        }

        let now = self.state.clock.now();
        if self.state.activities.has_due(now) {
            let mut rng = self.state.rng.for_subsystem(SubsystemSlot::Activity);
            events.extend(activity_subsystem::complete_due(&mut self.state, &self.config, now, &mut rng));
        }

        self.save_if_milestone(&mut events);
        Ok(events)
    }

    // ── Resources and skills ───────────────────────────────────

    /// Credit a resource. False (with a log line) when it is unknown.
    pub fn add_resource(&mut self, resource: &str, amount: u32) -> bool {
        match self.state.ledger.add(resource, amount) {
            Ok(_) => true,
            Err(e) => {
                self.state.log(e.to_string());
                false
            }
        }
    }

    /// Debit a resource. False (with a log line) when unknown or short.
    pub fn consume_resource(&mut self, resource: &str, amount: u32) -> bool {
        match self.state.ledger.consume(resource, amount) {
            Ok(()) => true,
            Err(e) => {
                self.state.log(e.to_string());
                false
            }
        }
    }

    pub fn add_skill_exp(&mut self, skill: &str, amount: u64) -> GameResult<Vec<GameEvent>> {
        if !self.state.skills.contains_key(skill) {
            return Err(GameError::UnknownSkill { skill: skill.to_string() });
        }
        let mut events = self.state.grant_skill_exp(skill, amount);
        self.save_if_milestone(&mut events);
        Ok(events)
    }

    pub fn add_player_exp(&mut self, amount: u64) -> Vec<GameEvent> {
        let mut events = self.state.grant_player_exp(amount);
        self.save_if_milestone(&mut events);
        events
    }

    /// Learn one level of a skill-tree skill with survivor exp.
    pub fn learn_tree_skill(&mut self, id: &str) -> GameResult<GameEvent> {
        let state = &mut self.state;
        let level = TreeLearner {
            skills:      &state.skills,
            player:      &mut state.player.progress,
            tree_levels: &mut state.tree_levels,
            effects:     &mut state.skill_effects,
        }
        .learn(&self.config.skill_tree, id)?;
        state.log(format!("Learned {id} level {level}"));

        // max_health is a fraction of the current maximum, granted once per level.
        let boost = skills::find_tree_skill(&self.config.skill_tree, id)
            .and_then(|def| def.effects.get("max_health"))
            .and_then(EffectValue::as_number)
            .unwrap_or(0.0);
        let gain = (state.player.max_health as f64 * boost).round() as u32;
        if gain > 0 {
            state.player.max_health += gain;
            state.player.health += gain;
            log::info!("max health +{gain} from {id}");
        }
        Ok(GameEvent::TreeSkillLearned { id: id.to_string(), level })
    }

    // ── Activities ─────────────────────────────────────────────

    pub fn gather(&mut self, recipe: &str) -> GameResult<Vec<GameEvent>> {
        activity_subsystem::start_recipe(&mut self.state, &self.config, ActivityCategory::Gathering, recipe)
    }

    pub fn craft(&mut self, recipe: &str) -> GameResult<Vec<GameEvent>> {
        activity_subsystem::start_recipe(&mut self.state, &self.config, ActivityCategory::Crafting, recipe)
    }

    pub fn explore(&mut self, region: &str) -> GameResult<Vec<GameEvent>> {
        activity_subsystem::start_exploration(&mut self.state, &self.config, region)
    }

    pub fn build_structure(&mut self, building: &str) -> GameResult<Vec<GameEvent>> {
        activity_subsystem::start_build(&mut self.state, &self.config, building)
    }

    pub fn research(&mut self, technology: &str) -> GameResult<Vec<GameEvent>> {
        activity_subsystem::start_research(&mut self.state, &self.config, technology)
    }

    pub fn cancel(&mut self, category: ActivityCategory) -> Vec<GameEvent> {
        activity_subsystem::cancel(&mut self.state, category)
    }

    // ── Events and merchants ───────────────────────────────────

    pub fn pending_event(&self) -> Option<&str> {
        self.state.pending_event.as_deref()
    }

    pub fn resolve_event(&mut self, option: usize) -> GameResult<Vec<GameEvent>> {
        let mut rng = self.state.rng.for_subsystem(SubsystemSlot::RandomEvent);
        random_event_subsystem::resolve(&mut self.state, &self.config, option, &mut rng)
    }

    pub fn merchants_present(&self) -> Vec<&MerchantDef> {
        merchant_subsystem::present(&self.state, &self.config)
    }

    pub fn buy(&mut self, merchant: &str, item: &str) -> GameResult<Vec<GameEvent>> {
        merchant_subsystem::buy(&mut self.state, &self.config, merchant, item)
    }

    pub fn sell(&mut self, merchant: &str, offer: &str) -> GameResult<Vec<GameEvent>> {
        merchant_subsystem::sell(&mut self.state, &self.config, merchant, offer)
    }

    pub fn special_trade(&mut self, merchant: &str, trade: &str) -> GameResult<Vec<GameEvent>> {
        let mut rng = self.state.rng.for_subsystem(SubsystemSlot::Merchant);
        merchant_subsystem::special_trade(&mut self.state, &self.config, merchant, trade, &mut rng)
    }

    // ── Dice game ──────────────────────────────────────────────

    pub fn start_dice_run(&mut self, buffs: &[BuffId]) -> GameResult<GameEvent> {
        self.state.dice.start_run(&self.config, buffs)?;
        self.state.log(format!("Dice run started with {} buffs", buffs.len()));
        Ok(GameEvent::DiceRunStarted { buffs: buffs.to_vec() })
    }

    pub fn acquire_buff(&mut self, buff: BuffId) -> GameResult<()> {
        self.state.dice.acquire_buff(&self.config, buff)
    }

    pub fn draw_dice(&mut self) -> GameResult<(DrawOutcome, GameEvent)> {
        let mut rng = self.state.rng.for_subsystem(SubsystemSlot::Dice);
        let outcome = self.state.dice.draw(&self.config, &mut rng)?;
        let event = GameEvent::DiceDrawn { faces: outcome.faces.clone(), bonus: outcome.bonus };
        Ok((outcome, event))
    }

    pub fn show_dice(&mut self, hand_indices: &[usize]) -> GameResult<(ShowOutcome, Vec<GameEvent>)> {
        let outcome = self.state.dice.show(&self.config, self.scorer.as_ref(), hand_indices)?;
        let mut events = vec![GameEvent::DiceShown {
            faces:  outcome.faces.clone(),
            points: outcome.breakdown.total,
        }];
        events.extend(self.dice_unlock_events(&outcome.unlocked));
        Ok((outcome, events))
    }

    pub fn end_dice_round(&mut self) -> GameResult<(RoundOutcome, Vec<GameEvent>)> {
        let outcome = self.state.dice.end_round(&self.config)?;
        self.state.log(format!("Round {} scored {}", outcome.round, outcome.round_score));
        let mut events = vec![GameEvent::RoundEnded { round: outcome.round, score: outcome.round_score }];
        if outcome.finished {
            self.state.log(format!("Dice run finished with {}", outcome.total_score));
            events.push(GameEvent::DiceRunFinished { total: outcome.total_score });
        }
        events.extend(self.dice_unlock_events(&outcome.unlocked));
        Ok((outcome, events))
    }

    fn dice_unlock_events(&mut self, unlocked: &[(u32, u32)]) -> Vec<GameEvent> {
        unlocked
            .iter()
            .map(|(id, profile)| {
                self.state.log(format!("Dice achievement {id}: new die {profile}"));
                GameEvent::DiceAchievementUnlocked { id: *id, profile: *profile }
            })
            .collect()
    }
}
