//! World clock — owns day/hour/minute state, speed control, and pause.

use crate::types::{Day, GameTime, MINUTES_PER_HOUR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldClock {
    pub day:    Day,
    pub hour:   u32,
    pub minute: u32,
    pub speed:  ClockSpeed,
    pub paused: bool,
    /// Fractional game minutes carried between real-time advances.
    #[serde(default)]
    carry:      f64,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldClock {
    /// Day 1, 08:00.
    pub fn new() -> Self {
        Self {
            day:    1,
            hour:   8,
            minute: 0,
            speed:  ClockSpeed::Normal,
            paused: false,
            carry:  0.0,
        }
    }

    pub fn now(&self) -> GameTime {
        GameTime::new(self.day, self.hour, self.minute)
    }

    /// Convert real seconds to game minutes at the current speed and advance.
    /// Returns the hour boundaries crossed. A paused clock does not move.
    pub fn advance_real_seconds(&mut self, seconds: f64) -> Vec<GameTime> {
        if self.paused || seconds <= 0.0 {
            return Vec::new();
        }
        let minutes = seconds * self.speed.game_minutes_per_real_second() + self.carry;
        let whole = minutes.floor();
        self.carry = minutes - whole;
        self.advance_minutes(whole as u64)
    }

    /// Advance by whole game minutes with carried arithmetic
    /// (minute → hour → day). Returns every hour boundary crossed, in order.
    pub fn advance_minutes(&mut self, minutes: u64) -> Vec<GameTime> {
        if self.paused || minutes == 0 {
            return Vec::new();
        }
        let start = self.now().total_minutes();
        let end = start + minutes;
        let per_hour = MINUTES_PER_HOUR as u64;

        let mut crossed = Vec::new();
        let mut boundary = (start / per_hour + 1) * per_hour;
        while boundary <= end {
            crossed.push(GameTime::from_total_minutes(boundary));
            boundary += per_hour;
        }

        let t = GameTime::from_total_minutes(end);
        self.day = t.day;
        self.hour = t.hour;
        self.minute = t.minute;
        crossed
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: ClockSpeed) {
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClockSpeed {
    Normal,  // 1 game minute per real second
    Fast,    // 5 game minutes per real second
    Turbo,   // 30 game minutes per real second
}

impl ClockSpeed {
    pub fn game_minutes_per_real_second(&self) -> f64 {
        match self {
            ClockSpeed::Normal => 1.0,
            ClockSpeed::Fast   => 5.0,
            ClockSpeed::Turbo  => 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_carry_into_hours_and_days() {
        let mut clock = WorldClock::new(); // day 1 08:00
        let crossed = clock.advance_minutes(16 * 60 + 30);
        assert_eq!(clock.now(), GameTime::new(2, 0, 30));
        assert_eq!(crossed.len(), 16);
        assert_eq!(crossed.first(), Some(&GameTime::new(1, 9, 0)));
        assert_eq!(crossed.last(), Some(&GameTime::new(2, 0, 0)));
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = WorldClock::new();
        clock.pause();
        assert!(clock.advance_minutes(120).is_empty());
        assert_eq!(clock.now(), GameTime::new(1, 8, 0));
    }

    #[test]
    fn real_seconds_respect_speed_and_carry() {
        let mut clock = WorldClock::new();
        clock.set_speed(ClockSpeed::Fast);
        clock.advance_real_seconds(0.5); // 2.5 minutes
        clock.advance_real_seconds(0.5); // 2.5 more
        assert_eq!(clock.now(), GameTime::new(1, 8, 5));
    }
}
