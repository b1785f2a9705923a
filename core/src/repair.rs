//! Versioned repair pass, run once on every load.
//!
//! RULES (applied in this order):
//!   1. backfill_templates        — resources and skills missing from the
//!                                  save get fresh template values
//!   2. normalize_skills          — level >= 1, threshold > 0, overflow
//!                                  exp rolled into levels
//!   3. repair_skill_effects      — numeric effects bounded by
//!                                  per_level x max_level of their owner
//!   4. clamp_resources           — value <= cap everywhere
//!   5. stamp SAVE_FORMAT_VERSION
//!
//! Every rule is deterministic and idempotent.

use crate::{
    config::GameConfig,
    skills::{self, EffectValue, Skill, SkillTree},
    snapshot::Snapshot,
};
use std::collections::BTreeMap;

/// Version 0: no version field. Version 1 added skill-tree effects,
/// version 2 added dice achievements and merchant stock.
pub const SAVE_FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub from_version:      u32,
    pub backfilled:        Vec<String>,
    pub normalized_skills: Vec<String>,
    pub clamped_effects:   Vec<String>,
    pub clamped_resources: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.backfilled.is_empty()
            && self.normalized_skills.is_empty()
            && self.clamped_effects.is_empty()
            && self.clamped_resources.is_empty()
    }

    /// One line per repaired item, for the load event.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.extend(self.backfilled.iter().map(|k| format!("backfilled {k}")));
        lines.extend(self.normalized_skills.iter().map(|k| format!("normalized {k}")));
        lines.extend(self.clamped_effects.iter().map(|k| format!("clamped effect {k}")));
        lines.extend(self.clamped_resources.iter().map(|k| format!("clamped resource {k}")));
        lines
    }
}

pub fn repair_snapshot(state: &mut Snapshot, config: &GameConfig) -> RepairReport {
    let report = RepairReport {
        from_version:      state.format_version,
        backfilled:        backfill_templates(state, config),
        normalized_skills: normalize_skills(state),
        clamped_effects:   repair_skill_effects(&mut state.skill_effects, &config.skill_tree),
        clamped_resources: clamp_resources(state),
    };
    state.format_version = SAVE_FORMAT_VERSION;
    if !report.is_clean() {
        log::info!(
            "repaired save from v{}: {}",
            report.from_version,
            report.lines().join(", ")
        );
    }
    report
}

pub fn backfill_templates(state: &mut Snapshot, config: &GameConfig) -> Vec<String> {
    let mut added = Vec::new();
    for (id, cap) in &config.resource_caps {
        let value = config.initial_resources.get(id).copied().unwrap_or(0);
        if state.ledger.insert_missing(id, value, *cap) {
            added.push(id.clone());
        }
    }
    for name in &config.skills {
        if !state.skills.contains_key(name) {
            state.skills.insert(name.clone(), Skill::new(name));
            added.push(name.clone());
        }
    }
    added
}

pub fn normalize_skills(state: &mut Snapshot) -> Vec<String> {
    let mut changed: Vec<String> = state
        .skills
        .iter_mut()
        .filter_map(|(id, skill)| skill.normalize().then(|| id.clone()))
        .collect();
    if state.player.progress.normalize() {
        changed.push("survivor".to_string());
    }
    changed
}

/// Clamp every numeric effect to the bound of the tree skill that owns
/// it. Flags and unowned keys are left alone. Returns the clamped keys.
pub fn repair_skill_effects(effects: &mut BTreeMap<String, EffectValue>, tree: &SkillTree) -> Vec<String> {
    let mut clamped = Vec::new();
    for (key, value) in effects.iter_mut() {
        let EffectValue::Number(current) = *value else {
            continue;
        };
        let Some(owner) = skills::owner_of_effect(tree, key) else {
            continue;
        };
        let Some(per_level) = owner.effects.get(key).and_then(EffectValue::as_number) else {
            continue;
        };
        let bound = per_level * owner.max_level as f64;
        let legal = if per_level >= 0.0 { current.min(bound) } else { current.max(bound) };
        if legal != current {
            *value = EffectValue::Number(legal);
            clamped.push(key.clone());
        }
    }
    clamped
}

pub fn clamp_resources(state: &mut Snapshot) -> Vec<String> {
    state.ledger.clamp_all()
}
