//! Game events and the display event log.
//!
//! Every mutation the engine performs is reported as a `GameEvent`.
//! The event log holds short player-facing lines; it lives on the
//! snapshot but is never persisted.

use crate::{
    activity::ActivityCategory,
    types::{Day, GameTime, ResourceId},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of lines kept in the display log.
pub const EVENT_LOG_CAPACITY: usize = 200;

/// Every event emitted during play.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Clock ──────────────────────────────────────
    HourPassed {
        at: GameTime,
    },
    DayStarted {
        day: Day,
    },

    // ── Ledger ─────────────────────────────────────
    ResourceGained {
        resource: ResourceId,
        amount:   u32,
    },
    ResourceSpent {
        resource: ResourceId,
        amount:   u32,
    },
    ResourceRejected {
        resource: ResourceId,
        reason:   String,
    },

    // ── Vitals ─────────────────────────────────────
    HealthChanged {
        delta:  i64,
        health: u32,
    },
    Starved {
        food_short:  u32,
        water_short: u32,
    },

    // ── Progression ────────────────────────────────
    SkillLevelUp {
        skill: String,
        level: u32,
    },
    PlayerLevelUp {
        level: u32,
    },
    TreeSkillLearned {
        id:    String,
        level: u32,
    },
    AchievementUnlocked {
        id: String,
    },

    // ── Weather ────────────────────────────────────
    WeatherChanged {
        from:           String,
        to:             String,
        duration_hours: u32,
    },
    WeatherEventFired {
        weather: String,
        event:   String,
    },

    // ── Activities ─────────────────────────────────
    ActivityQueued {
        category: ActivityCategory,
        target:   String,
    },
    ActivityStarted {
        category:     ActivityCategory,
        target:       String,
        completes_at: GameTime,
    },
    ActivityCompleted {
        category: ActivityCategory,
        target:   String,
        at:       GameTime,
    },
    ActivityCancelled {
        category:  ActivityCategory,
        discarded: usize,
    },
    BuildingUpgraded {
        building: String,
        level:    u32,
    },
    TechnologyResearched {
        id: String,
    },

    // ── Encounters ─────────────────────────────────
    RandomEventTriggered {
        event: String,
    },
    RandomEventResolved {
        event:  String,
        option: usize,
    },
    MerchantArrived {
        merchant: String,
    },
    TradeCompleted {
        merchant: String,
        item:     String,
    },

    // ── Dice game ──────────────────────────────────
    DiceRunStarted {
        buffs: Vec<u32>,
    },
    DiceDrawn {
        faces: Vec<u8>,
        bonus: u64,
    },
    DiceShown {
        faces:  Vec<u8>,
        points: u64,
    },
    RoundEnded {
        round: u32,
        score: u64,
    },
    DiceRunFinished {
        total: u64,
    },
    DiceAchievementUnlocked {
        id:      u32,
        profile: u32,
    },

    // ── Persistence ────────────────────────────────
    NewGameStarted {
        session_id: String,
    },
    GameSaved {
        bytes: usize,
    },
    SaveFailed {
        reason: String,
    },
    GameLoaded {
        repaired: Vec<String>,
    },
}

/// One line of the player-facing log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at:      GameTime,
    pub message: String,
}

/// Bounded, oldest-first display log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn push(&mut self, at: GameTime, message: impl Into<String>) {
        if self.entries.len() == EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { at, message: message.into() });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// True if any line contains `needle`. Used by tooling and tests.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }
}
