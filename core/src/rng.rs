//! Deterministic random number generation.
//!
//! RULE: Nothing in the game core may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the master seed stored in the snapshot.
//!
//! Each draw site gets its own stream, seeded from
//! (master_seed, subsystem slot, bank cursor). The cursor is persisted
//! with the snapshot, so a loaded game continues the same sequence
//! it would have produced without the save/load round-trip.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed, a stable subsystem
    /// index, and a draw cursor. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64, cursor: u64) -> Self {
        let derived_seed = master_seed
            ^ subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ cursor.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [min, max]. Swapped bounds are tolerated.
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        lo + self.next_u64_below((hi - lo) as u64 + 1) as u32
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an index by weight. Returns None when no weight is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.next_f64() * total;
        let mut last_positive = None;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            if roll < *w {
                return Some(i);
            }
            roll -= w;
        }
        last_positive
    }
}

/// Stream factory for one save. Persisted inside the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngBank {
    master_seed: u64,
    cursor:      u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed, cursor: 0 }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a fresh stream for `slot` and advance the cursor.
    pub fn for_subsystem(&mut self, slot: SubsystemSlot) -> SubsystemRng {
        self.cursor += 1;
        SubsystemRng::new(self.master_seed, slot as u64, self.cursor).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Weather = 0,
    Upkeep = 1,
    Activity = 2,
    Exploration = 3,
    RandomEvent = 4,
    Dice = 5,
    Merchant = 6,
    Achievement = 7,
    Session = 8,
    // Add new subsystems here, append only.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Upkeep => "upkeep",
            Self::Activity => "activity",
            Self::Exploration => "exploration",
            Self::RandomEvent => "random_event",
            Self::Dice => "dice",
            Self::Merchant => "merchant",
            Self::Achievement => "achievement",
            Self::Session => "session",
        }
    }
}
