//! Activity queues — timed gathering, crafting, exploring, building,
//! and researching, modeled as scheduled completions on the world clock.
//!
//! RULES:
//!   - One active slot and one FIFO pending queue per category.
//!   - Inputs are paid when an activity is enqueued.
//!   - A due activity completes before the next pending entry starts;
//!     the successor starts at its predecessor's completion time.
//!   - Cancelling a category discards active + pending with no refund.

use crate::types::GameTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Declaration order is the processing order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Gathering,
    Crafting,
    Exploring,
    Building,
    Researching,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 5] = [
        ActivityCategory::Gathering,
        ActivityCategory::Crafting,
        ActivityCategory::Exploring,
        ActivityCategory::Building,
        ActivityCategory::Researching,
    ];

    /// Leveled skill that gains experience from this category.
    pub fn skill(&self) -> &'static str {
        match self {
            ActivityCategory::Gathering   => "gathering",
            ActivityCategory::Crafting    => "crafting",
            ActivityCategory::Exploring   => "survival",
            ActivityCategory::Building    => "crafting",
            ActivityCategory::Researching => "research",
        }
    }
}

/// What an activity produces when it completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityTarget {
    Recipe { id: String },
    Explore { region: String },
    Build { building: String, level: u32 },
    Research { technology: String },
}

impl ActivityTarget {
    pub fn label(&self) -> String {
        match self {
            ActivityTarget::Recipe { id } => id.clone(),
            ActivityTarget::Explore { region } => region.clone(),
            ActivityTarget::Build { building, level } => format!("{building}@{level}"),
            ActivityTarget::Research { technology } => technology.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingActivity {
    pub target:           ActivityTarget,
    pub duration_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledActivity {
    pub target:       ActivityTarget,
    pub started_at:   GameTime,
    pub completes_at: GameTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryQueue {
    pub active:  Option<ScheduledActivity>,
    pub pending: VecDeque<PendingActivity>,
}

impl CategoryQueue {
    pub fn len(&self) -> usize {
        self.active.iter().count() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }
}

/// How `enqueue` placed the activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Started { completes_at: GameTime },
    Queued { position: usize },
}

/// A completion handed back to the engine for its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub category: ActivityCategory,
    pub activity: ScheduledActivity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityQueues {
    queues: BTreeMap<ActivityCategory, CategoryQueue>,
}

impl ActivityQueues {
    pub fn queue(&self, category: ActivityCategory) -> Option<&CategoryQueue> {
        self.queues.get(&category)
    }

    pub fn is_idle(&self) -> bool {
        self.queues.values().all(CategoryQueue::is_empty)
    }

    /// True when some active entry completes at or before `now`.
    pub fn has_due(&self, now: GameTime) -> bool {
        self.queues
            .values()
            .any(|q| q.active.as_ref().is_some_and(|a| a.completes_at <= now))
    }

    pub fn enqueue(
        &mut self,
        category:         ActivityCategory,
        target:           ActivityTarget,
        duration_minutes: u64,
        now:              GameTime,
    ) -> Placement {
        let queue = self.queues.entry(category).or_default();
        if queue.active.is_none() {
            let completes_at = now.plus_minutes(duration_minutes);
            queue.active = Some(ScheduledActivity { target, started_at: now, completes_at });
            Placement::Started { completes_at }
        } else {
            queue.pending.push_back(PendingActivity { target, duration_minutes });
            Placement::Queued { position: queue.pending.len() }
        }
    }

    /// Pop every activity due at `now`, starting successors as each one
    /// finishes. Completions come back ordered by completion time, with
    /// category order breaking ties.
    pub fn take_due(&mut self, now: GameTime) -> Vec<Completion> {
        let mut done = Vec::new();
        for category in ActivityCategory::ALL {
            let Some(queue) = self.queues.get_mut(&category) else {
                continue;
            };
            while let Some(active) = queue.active.take() {
                if active.completes_at > now {
                    queue.active = Some(active);
                    break;
                }
                let finished_at = active.completes_at;
                done.push(Completion { category, activity: active });
                if let Some(next) = queue.pending.pop_front() {
                    queue.active = Some(ScheduledActivity {
                        completes_at: finished_at.plus_minutes(next.duration_minutes),
                        started_at:   finished_at,
                        target:       next.target,
                    });
                }
            }
        }
        done.sort_by_key(|c| (c.activity.completes_at, c.category));
        done
    }

    /// Discard everything in a category. Returns how many entries were dropped.
    pub fn cancel(&mut self, category: ActivityCategory) -> usize {
        match self.queues.get_mut(&category) {
            Some(queue) => {
                let dropped = queue.len();
                *queue = CategoryQueue::default();
                dropped
            }
            None => 0,
        }
    }
}
