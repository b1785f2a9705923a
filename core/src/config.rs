use crate::{
    activity::ActivityCategory,
    buffs::BuffDef,
    content,
    dice::{DiceAchievementDef, DiceProfile},
    effect::{Condition, Effect},
    skills::SkillTree,
    types::{Day, ResourceId, ResourceMap},
    weather::WeatherTypeDef,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// A resource output rolled uniformly in [min, max].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Yield {
    pub resource: ResourceId,
    pub min:      u32,
    pub max:      u32,
}

impl Yield {
    pub fn fixed(resource: &str, amount: u32) -> Self {
        Self { resource: resource.into(), min: amount, max: amount }
    }

    pub fn is_ranged(&self) -> bool {
        self.min != self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDef {
    pub id:               String,
    pub name:             String,
    /// Gathering or Crafting.
    pub category:         ActivityCategory,
    #[serde(default)]
    pub inputs:           ResourceMap,
    #[serde(default)]
    pub energy:           u32,
    pub outputs:          Vec<Yield>,
    pub duration_minutes: u64,
    #[serde(default)]
    pub skill_levels:     BTreeMap<String, u32>,
    #[serde(default)]
    pub technology:       Option<String>,
    pub exp:              u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionDef {
    pub id:               String,
    pub name:             String,
    pub difficulty:       u32,
    pub energy:           u32,
    #[serde(default)]
    pub cost:             ResourceMap,
    pub resources:        Vec<Yield>,
    pub duration_minutes: u64,
    #[serde(default)]
    pub skill_levels:     BTreeMap<String, u32>,
    pub exp:              u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildingEffects {
    #[serde(default)]
    pub energy_recovery:    u32,
    #[serde(default)]
    pub max_health:         u32,
    #[serde(default)]
    pub storage_multiplier: Option<f64>,
    /// Duration divisor for crafting activities.
    #[serde(default)]
    pub crafting_speed:     Option<f64>,
    /// Resources produced at the start of every day.
    #[serde(default)]
    pub daily_output:       ResourceMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingLevel {
    pub cost:             ResourceMap,
    pub duration_minutes: u64,
    #[serde(default)]
    pub skill_levels:     BTreeMap<String, u32>,
    pub effects:          BuildingEffects,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingDef {
    pub id:     String,
    pub name:   String,
    /// Index 0 is level 1.
    pub levels: Vec<BuildingLevel>,
}

impl BuildingDef {
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn level(&self, level: u32) -> Option<&BuildingLevel> {
        level.checked_sub(1).and_then(|i| self.levels.get(i as usize))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechDef {
    pub id:               String,
    pub name:             String,
    #[serde(default)]
    pub cost:             ResourceMap,
    pub duration_minutes: u64,
    #[serde(default)]
    pub requires:         Vec<String>,
    pub exp:              u64,
    /// Researched from day one.
    #[serde(default)]
    pub innate:           bool,
}

// ── Merchants ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub min_day:   Day,
    pub frequency: u32,
    pub duration:  u32,
}

impl Availability {
    pub fn is_present(&self, day: Day) -> bool {
        day >= self.min_day && (day - self.min_day) % self.frequency.max(1) < self.duration
    }

    /// True on the first day of each visit.
    pub fn arrives_on(&self, day: Day) -> bool {
        day >= self.min_day && (day - self.min_day) % self.frequency.max(1) == 0
    }
}

/// Something the merchant sells: pay `price`, receive `amount` of `resource`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantItem {
    pub id:       String,
    pub resource: ResourceId,
    pub amount:   u32,
    pub price:    ResourceMap,
    pub stock:    u32,
}

/// Something the merchant buys: give one `resource`, receive `price`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellOffer {
    pub id:       String,
    pub resource: ResourceId,
    pub price:    ResourceMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialTrade {
    pub id:     String,
    pub name:   String,
    pub inputs: ResourceMap,
    pub reward: Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantDef {
    pub id:           String,
    pub name:         String,
    pub availability: Availability,
    #[serde(default)]
    pub items:        Vec<MerchantItem>,
    #[serde(default)]
    pub buys:         Vec<SellOffer>,
    #[serde(default)]
    pub special:      Vec<SpecialTrade>,
}

// ── Events and achievements ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventOption {
    pub label:     String,
    #[serde(default)]
    pub condition: Condition,
    pub effect:    Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDef {
    pub id:        String,
    pub title:     String,
    pub weight:    f64,
    pub min_day:   Day,
    #[serde(default)]
    pub condition: Condition,
    pub options:   Vec<EventOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementDef {
    pub id:         String,
    pub name:       String,
    pub condition:  Condition,
    pub reward_exp: u64,
}

/// Numeric rules of the survival loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurvivalRules {
    pub season_length:         u32,
    pub start_health:          u32,
    pub start_energy:          u32,
    pub daily_food:            u32,
    pub daily_water:           u32,
    pub starvation_damage:     u32,
    /// Fraction of max health that keeps the healthy-day streak going.
    pub healthy_threshold:     f64,
    pub base_energy_recovery:  u32,
    pub event_chance_per_day:  f64,
    /// Danger chance per point of region difficulty.
    pub danger_per_difficulty: f64,
    pub danger_damage_min:     u32,
    pub danger_damage_max:     u32,
    /// Round whose end settles final buffs and closes the run.
    pub final_round:           u32,
    pub starting_dice:         Vec<u32>,
}

impl Default for SurvivalRules {
    fn default() -> Self {
        Self {
            season_length:         30,
            start_health:          100,
            start_energy:          100,
            daily_food:            3,
            daily_water:           3,
            starvation_damage:     10,
            healthy_threshold:     0.8,
            base_energy_recovery:  1,
            event_chance_per_day:  0.3,
            danger_per_difficulty: 0.05,
            danger_damage_min:     5,
            danger_damage_max:     15,
            final_round:           5,
            starting_dice:         vec![1; 6],
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherTypesFile {
    weather_types: Vec<WeatherTypeDef>,
}

#[derive(Debug, Deserialize)]
struct BuffLibraryFile {
    buffs: Vec<BuffDef>,
}

#[derive(Debug, Deserialize)]
struct DiceProfilesFile {
    profiles:     Vec<DiceProfile>,
    #[serde(default)]
    achievements: Option<Vec<DiceAchievementDef>>,
}

/// Every static table the game reads. Immutable once built; a fresh
/// snapshot deep-copies the templates it needs.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub initial_resources: ResourceMap,
    pub resource_caps:     ResourceMap,
    pub skills:            Vec<String>,
    pub skill_tree:        SkillTree,
    pub weather_types:     Vec<WeatherTypeDef>,
    pub buff_library:      Vec<BuffDef>,
    pub dice_profiles:     Vec<DiceProfile>,
    pub dice_achievements: Vec<DiceAchievementDef>,
    pub achievements:      Vec<AchievementDef>,
    pub events:            Vec<EventDef>,
    pub regions:           Vec<RegionDef>,
    pub merchants:         Vec<MerchantDef>,
    pub recipes:           Vec<RecipeDef>,
    pub technologies:      Vec<TechDef>,
    pub buildings:         Vec<BuildingDef>,
    pub rules:             SurvivalRules,
}

impl GameConfig {
    /// Built-in tables. Used by tests and whenever no data directory is given.
    pub fn builtin() -> Self {
        Self {
            initial_resources: content::initial_resources(),
            resource_caps:     content::resource_caps(),
            skills:            content::skill_names(),
            skill_tree:        content::skill_tree(),
            weather_types:     content::weather_types(),
            buff_library:      content::buff_library(),
            dice_profiles:     content::dice_profiles(),
            dice_achievements: content::dice_achievements(),
            achievements:      content::achievements(),
            events:            content::events(),
            regions:           content::regions(),
            merchants:         content::merchants(),
            recipes:           content::recipes(),
            technologies:      content::technologies(),
            buildings:         content::buildings(),
            rules:             SurvivalRules::default(),
        }
    }

    /// Built-in tables with JSON overrides from `data_dir`.
    /// A missing file keeps the built-in table; a malformed one is an error.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let mut config = Self::builtin();

        if let Some(content) = read_optional(data_dir, "weather_types.json")? {
            let file: WeatherTypesFile = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse weather_types.json: {e}"))?;
            config.weather_types = file.weather_types;
        }

        if let Some(content) = read_optional(data_dir, "buff_library.json")? {
            let file: BuffLibraryFile = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse buff_library.json: {e}"))?;
            config.buff_library = file.buffs;
        }

        if let Some(content) = read_optional(data_dir, "dice_profiles.json")? {
            let file: DiceProfilesFile = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse dice_profiles.json: {e}"))?;
            config.dice_profiles = file.profiles;
            if let Some(achievements) = file.achievements {
                config.dice_achievements = achievements;
            }
        }

        log::debug!(
            "config loaded from {data_dir}: {} weather types, {} buffs, {} dice profiles",
            config.weather_types.len(),
            config.buff_library.len(),
            config.dice_profiles.len()
        );
        Ok(config)
    }

    pub fn recipe(&self, id: &str) -> Option<&RecipeDef> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn region(&self, id: &str) -> Option<&RegionDef> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn building(&self, id: &str) -> Option<&BuildingDef> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn technology(&self, id: &str) -> Option<&TechDef> {
        self.technologies.iter().find(|t| t.id == id)
    }

    pub fn merchant(&self, id: &str) -> Option<&MerchantDef> {
        self.merchants.iter().find(|m| m.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn weather_type(&self, id: &str) -> Option<&WeatherTypeDef> {
        self.weather_types.iter().find(|w| w.id == id)
    }
}

fn read_optional(data_dir: &str, file: &str) -> anyhow::Result<Option<String>> {
    let path = Path::new(data_dir).join(file);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    Ok(Some(content))
}
