//! Skill progression and skill-tree learning.
//!
//! A `Skill` is a leveled experience tracker. Granting experience rolls
//! overflow into levels: while exp >= threshold, subtract the threshold,
//! gain a level, and grow the threshold by 1.5x. One large grant can
//! therefore jump several levels. There is no level cap.
//!
//! The skill tree is a set of branches (gathering, crafting, survival,
//! research), each holding tree skills with a max level and per-level
//! effect magnitudes. Learning a tree skill adds its per-level effects to
//! the snapshot's effect table; `repair` clamps that table on every load.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Threshold used when a skill has to be rebuilt from scratch.
pub const BASE_EXP_TO_NEXT_LEVEL: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub name:  String,
    pub level: u32,
    pub exp:   u64,
    pub exp_to_next_level: u64,
}

impl Skill {
    pub fn new(name: &str) -> Self {
        Self {
            name:  name.to_string(),
            level: 1,
            exp:   0,
            exp_to_next_level: BASE_EXP_TO_NEXT_LEVEL,
        }
    }

    /// Add experience and roll overflow into levels.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u64) -> u32 {
        self.exp = self.exp.saturating_add(amount);
        self.roll_over()
    }

    /// Consume whole thresholds while exp covers them.
    pub fn roll_over(&mut self) -> u32 {
        let mut gained = 0;
        while self.exp >= self.exp_to_next_level {
            self.exp -= self.exp_to_next_level;
            self.level += 1;
            self.exp_to_next_level = next_threshold(self.exp_to_next_level);
            gained += 1;
        }
        gained
    }

    /// Restore the skill invariants after a load:
    /// level >= 1, threshold > 0, exp < threshold.
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();
        if self.level == 0 {
            self.level = 1;
        }
        if self.exp_to_next_level == 0 {
            self.exp_to_next_level = BASE_EXP_TO_NEXT_LEVEL;
        }
        self.roll_over();
        *self != before
    }
}

/// floor(threshold * 1.5), never below 1.
pub fn next_threshold(threshold: u64) -> u64 {
    (threshold.saturating_mul(3) / 2).max(1)
}

/// All leveled skills, keyed by skill id.
pub type SkillBook = BTreeMap<String, Skill>;

/// Grant experience to a named skill. Returns the levels gained.
pub fn add_experience(book: &mut SkillBook, skill: &str, amount: u64) -> GameResult<u32> {
    let entry = book
        .get_mut(skill)
        .ok_or_else(|| GameError::UnknownSkill { skill: skill.to_string() })?;
    let gained = entry.add_experience(amount);
    if gained > 0 {
        log::info!("skill {skill} reached level {}", entry.level);
    }
    Ok(gained)
}

// ── Skill tree ────────────────────────────────────────────────────────

/// A skill-tree effect magnitude: numeric (additive per level) or a flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EffectValue {
    Flag(bool),
    Number(f64),
}

impl EffectValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EffectValue::Number(n) => Some(*n),
            EffectValue::Flag(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeRequirements {
    /// Minimum levels of leveled skills, e.g. `gathering: 3`.
    #[serde(default)]
    pub skill_levels: BTreeMap<String, u32>,
    /// Minimum levels of other tree skills, e.g. `efficient_gathering: 3`.
    #[serde(default)]
    pub tree_skills: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeSkillDef {
    pub id:        String,
    pub name:      String,
    pub max_level: u32,
    /// Magnitude granted per level learned.
    pub effects:   BTreeMap<String, EffectValue>,
    pub cost_exp:  u64,
    #[serde(default)]
    pub requires:  TreeRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillBranch {
    pub name:   String,
    pub skills: Vec<TreeSkillDef>,
}

/// Branch id → branch. Branch ids match leveled skill ids.
pub type SkillTree = BTreeMap<String, SkillBranch>;

pub fn find_tree_skill<'a>(tree: &'a SkillTree, id: &str) -> Option<&'a TreeSkillDef> {
    tree.values().flat_map(|b| b.skills.iter()).find(|s| s.id == id)
}

/// The tree skill whose per-level effects contain `effect_key`.
pub fn owner_of_effect<'a>(tree: &'a SkillTree, effect_key: &str) -> Option<&'a TreeSkillDef> {
    tree.values()
        .flat_map(|b| b.skills.iter())
        .find(|s| s.effects.contains_key(effect_key))
}

/// Mutable view of everything learning a tree skill touches.
pub struct TreeLearner<'a> {
    pub skills:      &'a SkillBook,
    pub player:      &'a mut Skill,
    pub tree_levels: &'a mut BTreeMap<String, u32>,
    pub effects:     &'a mut BTreeMap<String, EffectValue>,
}

impl TreeLearner<'_> {
    /// Learn one level of a tree skill, paying its exp cost from the
    /// player's current experience. Returns the new tree-skill level.
    pub fn learn(&mut self, tree: &SkillTree, id: &str) -> GameResult<u32> {
        let def = find_tree_skill(tree, id)
            .ok_or_else(|| GameError::UnknownTreeSkill { id: id.to_string() })?;

        let current = self.tree_levels.get(id).copied().unwrap_or(0);
        if current >= def.max_level {
            return Err(GameError::MaxLevelReached { id: id.to_string(), max_level: def.max_level });
        }

        for (skill, level) in &def.requires.skill_levels {
            let have = self.skills.get(skill).map(|s| s.level).unwrap_or(0);
            if have < *level {
                return Err(GameError::RequirementsNotMet {
                    id:     id.to_string(),
                    detail: format!("{skill} level {have} < {level}"),
                });
            }
        }
        for (other, level) in &def.requires.tree_skills {
            let have = self.tree_levels.get(other).copied().unwrap_or(0);
            if have < *level {
                return Err(GameError::RequirementsNotMet {
                    id:     id.to_string(),
                    detail: format!("{other} level {have} < {level}"),
                });
            }
        }

        if self.player.exp < def.cost_exp {
            return Err(GameError::InsufficientExperience {
                needed:    def.cost_exp,
                available: self.player.exp,
            });
        }
        self.player.exp -= def.cost_exp;

        let new_level = current + 1;
        self.tree_levels.insert(id.to_string(), new_level);

        for (key, per_level) in &def.effects {
            let next = match (per_level, self.effects.get(key)) {
                (EffectValue::Flag(_), _) => EffectValue::Flag(true),
                (EffectValue::Number(step), Some(EffectValue::Number(have))) => {
                    EffectValue::Number(have + step)
                }
                (EffectValue::Number(step), _) => EffectValue::Number(*step),
            };
            self.effects.insert(key.clone(), next);
        }

        log::info!("learned tree skill {id} level {new_level}");
        Ok(new_level)
    }
}
