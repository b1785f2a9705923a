//! Resource ledger — bounded counters with per-resource caps.
//!
//! INVARIANT: after any ledger operation, 0 <= value <= cap for every entry.
//! Failed operations never mutate anything.

use crate::{
    error::{GameError, GameResult},
    types::{ResourceId, ResourceMap},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceEntry {
    pub value: u32,
    pub cap:   u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceLedger {
    entries: BTreeMap<ResourceId, ResourceEntry>,
}

impl ResourceLedger {
    /// Build a ledger from template values and caps. Every capped resource
    /// gets an entry; initial values above the cap are clamped.
    pub fn from_templates(initial: &ResourceMap, caps: &ResourceMap) -> Self {
        let entries = caps
            .iter()
            .map(|(id, cap)| {
                let value = initial.get(id).copied().unwrap_or(0).min(*cap);
                (id.clone(), ResourceEntry { value, cap: *cap })
            })
            .collect();
        Self { entries }
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.entries.contains_key(resource)
    }

    pub fn value(&self, resource: &str) -> Option<u32> {
        self.entries.get(resource).map(|e| e.value)
    }

    pub fn cap(&self, resource: &str) -> Option<u32> {
        self.entries.get(resource).map(|e| e.cap)
    }

    pub fn entry(&self, resource: &str) -> Option<&ResourceEntry> {
        self.entries.get(resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &ResourceEntry)> {
        self.entries.iter()
    }

    /// Credit `amount`, clamped to the cap. Returns the amount actually credited.
    pub fn add(&mut self, resource: &str, amount: u32) -> GameResult<u32> {
        let entry = self.entry_mut(resource)?;
        let before = entry.value;
        entry.value = entry.value.saturating_add(amount).min(entry.cap);
        Ok(entry.value - before)
    }

    /// Debit `amount`. Fails without mutation when the holding is short.
    pub fn consume(&mut self, resource: &str, amount: u32) -> GameResult<()> {
        let entry = self.entry_mut(resource)?;
        if entry.value < amount {
            return Err(GameError::InsufficientResource {
                resource:  resource.to_string(),
                needed:    amount,
                available: entry.value,
            });
        }
        entry.value -= amount;
        Ok(())
    }

    /// Non-destructive check of every requirement.
    /// Unknown resources count as not enough.
    pub fn has_enough(&self, requirements: &ResourceMap) -> bool {
        requirements
            .iter()
            .all(|(id, amount)| self.value(id).is_some_and(|v| v >= *amount))
    }

    /// Consume every requirement or nothing at all.
    pub fn consume_all(&mut self, requirements: &ResourceMap) -> GameResult<()> {
        for (id, amount) in requirements {
            let available = self.value(id).ok_or_else(|| GameError::UnknownResource {
                resource: id.clone(),
            })?;
            if available < *amount {
                return Err(GameError::InsufficientResource {
                    resource:  id.clone(),
                    needed:    *amount,
                    available,
                });
            }
        }
        for (id, amount) in requirements {
            self.consume(id, *amount)?;
        }
        Ok(())
    }

    /// Set a cap. Lowering a cap clamps the holding down to match.
    pub fn set_cap(&mut self, resource: &str, cap: u32) -> GameResult<()> {
        let entry = self.entry_mut(resource)?;
        entry.cap = cap;
        entry.value = entry.value.min(cap);
        Ok(())
    }

    /// Rescale every cap from its template value by `multiplier` (floored).
    /// Resources missing from the template keep their current cap.
    pub fn apply_storage_multiplier(&mut self, base_caps: &ResourceMap, multiplier: f64) {
        for (id, entry) in self.entries.iter_mut() {
            if let Some(base) = base_caps.get(id) {
                entry.cap = (*base as f64 * multiplier).floor() as u32;
                entry.value = entry.value.min(entry.cap);
            }
        }
    }

    /// Insert a resource that is missing from this ledger. Existing
    /// entries are left alone. Returns true if an entry was added.
    pub fn insert_missing(&mut self, resource: &str, value: u32, cap: u32) -> bool {
        if self.entries.contains_key(resource) {
            return false;
        }
        self.entries.insert(
            resource.to_string(),
            ResourceEntry { value: value.min(cap), cap },
        );
        true
    }

    /// Clamp every holding to its cap. Returns the ids that were clamped.
    pub fn clamp_all(&mut self) -> Vec<ResourceId> {
        let mut clamped = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            if entry.value > entry.cap {
                entry.value = entry.cap;
                clamped.push(id.clone());
            }
        }
        clamped
    }

    fn entry_mut(&mut self, resource: &str) -> GameResult<&mut ResourceEntry> {
        self.entries
            .get_mut(resource)
            .ok_or_else(|| GameError::UnknownResource { resource: resource.to_string() })
    }
}
