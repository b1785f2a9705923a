//! Shared primitive types used across the entire game core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An in-game day number. Day 1 is the first day of a new game.
pub type Day = u32;

/// Stable identifier for a resource (`"food"`, `"wood"`, ...).
pub type ResourceId = String;

/// Stable identifier for any content row (recipe, region, building, ...).
pub type ContentId = String;

/// A resource requirement or yield table, keyed by resource id.
/// BTreeMap keeps iteration order stable, which keeps RNG draws reproducible.
pub type ResourceMap = BTreeMap<ResourceId, u32>;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;

/// A point on the world clock. Field order makes the derived `Ord`
/// compare day, then hour, then minute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameTime {
    pub day:    Day,
    pub hour:   u32,
    pub minute: u32,
}

impl GameTime {
    pub fn new(day: Day, hour: u32, minute: u32) -> Self {
        Self { day, hour, minute }
    }

    /// Total minutes since day 1, 00:00.
    pub fn total_minutes(&self) -> u64 {
        (self.day.saturating_sub(1) as u64 * HOURS_PER_DAY as u64 + self.hour as u64)
            * MINUTES_PER_HOUR as u64
            + self.minute as u64
    }

    pub fn from_total_minutes(total: u64) -> Self {
        let minute = (total % MINUTES_PER_HOUR as u64) as u32;
        let hours = total / MINUTES_PER_HOUR as u64;
        let hour = (hours % HOURS_PER_DAY as u64) as u32;
        let day = (hours / HOURS_PER_DAY as u64) as u32 + 1;
        Self { day, hour, minute }
    }

    pub fn plus_minutes(&self, minutes: u64) -> Self {
        Self::from_total_minutes(self.total_minutes() + minutes)
    }

    /// Add whole hours with day rollover at 24; minutes are dropped.
    pub fn plus_hours(&self, hours: u32) -> Self {
        let total = self.hour + hours;
        Self {
            day:    self.day + total / HOURS_PER_DAY,
            hour:   total % HOURS_PER_DAY,
            minute: 0,
        }
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} {:02}:{:02}", self.day, self.hour, self.minute)
    }
}
