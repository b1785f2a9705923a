//! Built-in content tables.
//!
//! Everything here is static game data. `GameConfig::builtin()` assembles
//! it; `GameConfig::load()` replaces individual tables from JSON.

use crate::{
    activity::ActivityCategory,
    buffs::{BuffDef, BuffEffect, ComboMode, CounterSource, Parity},
    config::{
        AchievementDef, Availability, BuildingDef, BuildingEffects, BuildingLevel, EventDef,
        EventOption, MerchantDef, MerchantItem, RecipeDef, RegionDef, SellOffer, SpecialTrade,
        TechDef, Yield,
    },
    dice::{DiceAchievementCondition, DiceAchievementDef, DiceProfile},
    effect::{Condition, Effect},
    skills::{EffectValue, SkillBranch, SkillTree, TreeRequirements, TreeSkillDef},
    types::ResourceMap,
    weather::{HourRange, Season, WeatherEventDef, WeatherMultipliers, WeatherTypeDef},
};
use std::collections::BTreeMap;

fn res(pairs: &[(&str, u32)]) -> ResourceMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn levels(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ── Resources and skills ───────────────────────────────────────────

pub fn resource_caps() -> ResourceMap {
    res(&[
        ("food", 50),
        ("water", 50),
        ("wood", 50),
        ("stone", 50),
        ("metal", 50),
        ("herb", 30),
        ("rare_herb", 30),
        ("medicine", 20),
        ("tools", 10),
        ("parts", 10),
        ("advanced_parts", 10),
        ("electronic_components", 10),
        ("crystal", 10),
        ("fuel", 20),
        ("ancient_relic", 5),
        ("tech_fragment", 5),
    ])
}

pub fn initial_resources() -> ResourceMap {
    let mut initial: ResourceMap = resource_caps().keys().map(|k| (k.clone(), 0)).collect();
    initial.insert("food".into(), 50);
    initial.insert("water".into(), 50);
    initial.insert("medicine".into(), 1);
    initial
}

pub fn skill_names() -> Vec<String> {
    ids(&["gathering", "crafting", "combat", "survival", "research"])
}

fn tree_skill(
    id:        &str,
    name:      &str,
    max_level: u32,
    effects:   &[(&str, EffectValue)],
    cost_exp:  u64,
    skill_req: &[(&str, u32)],
    tree_req:  &[(&str, u32)],
) -> TreeSkillDef {
    TreeSkillDef {
        id:        id.into(),
        name:      name.into(),
        max_level,
        effects:   effects.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        cost_exp,
        requires:  TreeRequirements {
            skill_levels: levels(skill_req),
            tree_skills:  levels(tree_req),
        },
    }
}

/// tool_durability, breakthrough_chance and the two unlock flags are
/// recorded on the survivor; no rule reads them.
pub fn skill_tree() -> SkillTree {
    use EffectValue::{Flag, Number};
    let mut tree = SkillTree::new();

    tree.insert("gathering".into(), SkillBranch {
        name:   "Gathering".into(),
        skills: vec![
            tree_skill("efficient_gathering", "Efficient Gathering", 3,
                &[("gathering_efficiency", Number(0.15))], 200, &[], &[]),
            tree_skill("conservation", "Conservation", 2,
                &[("gathering_energy_cost", Number(-0.1))], 400,
                &[("gathering", 3)], &[("efficient_gathering", 3)]),
            tree_skill("rare_herb_finding", "Rare Herb Finding", 2,
                &[("rare_herb_chance", Number(0.15))], 500,
                &[("gathering", 4)], &[("conservation", 2)]),
            tree_skill("master_gatherer", "Master Gatherer", 1,
                &[("gathering_yield", Number(0.25))], 1000,
                &[("gathering", 5)],
                &[("efficient_gathering", 3), ("conservation", 2), ("rare_herb_finding", 2)]),
        ],
    });

    tree.insert("crafting".into(), SkillBranch {
        name:   "Crafting".into(),
        skills: vec![
            tree_skill("efficient_crafting", "Efficient Crafting", 3,
                &[("crafting_speed", Number(0.15))], 200, &[], &[]),
            tree_skill("resource_saving", "Resource Saving", 3,
                &[("resource_saving", Number(0.1))], 300,
                &[("crafting", 2)], &[("efficient_crafting", 3)]),
            tree_skill("quality_crafting", "Quality Crafting", 2,
                &[("extra_crafting_output", Number(0.15))], 450,
                &[("crafting", 3)], &[("efficient_crafting", 3), ("resource_saving", 3)]),
            tree_skill("tool_specialist", "Tool Specialist", 2,
                &[("tool_durability", Number(0.2))], 500,
                &[("crafting", 4)],
                &[("efficient_crafting", 3), ("resource_saving", 3), ("quality_crafting", 2)]),
            tree_skill("master_craftsman", "Master Craftsman", 1,
                &[("unlock_advanced_recipes", Flag(true)), ("crafting_quality", Number(0.3))], 1000,
                &[("crafting", 5)],
                &[("efficient_crafting", 3), ("resource_saving", 3), ("quality_crafting", 2),
                  ("tool_specialist", 2)]),
        ],
    });

    tree.insert("survival".into(), SkillBranch {
        name:   "Survival".into(),
        skills: vec![
            tree_skill("efficient_metabolism", "Efficient Metabolism", 3,
                &[("food_consumption", Number(-0.1)), ("water_consumption", Number(-0.1))],
                200, &[], &[]),
            tree_skill("weather_adaptation", "Weather Adaptation", 2,
                &[("weather_resistance", Number(0.15))], 300,
                &[("survival", 2)], &[("efficient_metabolism", 3)]),
            tree_skill("energy_conservation", "Energy Conservation", 2,
                &[("energy_consumption", Number(-0.1))], 400,
                &[("survival", 3)], &[("efficient_metabolism", 3), ("weather_adaptation", 2)]),
            tree_skill("natural_healing", "Natural Healing", 2,
                &[("health_recovery", Number(0.2))], 500,
                &[("survival", 4)],
                &[("efficient_metabolism", 3), ("weather_adaptation", 2), ("energy_conservation", 2)]),
            tree_skill("survival_expert", "Survival Expert", 1,
                &[("max_health", Number(0.15)), ("all_survival_stats", Number(0.1))], 1000,
                &[("survival", 5)],
                &[("efficient_metabolism", 3), ("weather_adaptation", 2), ("energy_conservation", 2),
                  ("natural_healing", 2)]),
        ],
    });

    tree.insert("research".into(), SkillBranch {
        name:   "Research".into(),
        skills: vec![
            tree_skill("quick_learning", "Quick Learning", 3,
                &[("research_speed", Number(0.15))], 200, &[], &[]),
            tree_skill("resource_recycling", "Resource Recycling", 2,
                &[("research_resource_saving", Number(0.15))], 450,
                &[("research", 3)], &[("quick_learning", 3)]),
            tree_skill("advanced_theory", "Advanced Theory", 1,
                &[("unlock_advanced_tech", Flag(true))], 600,
                &[("research", 4)], &[("quick_learning", 3), ("resource_recycling", 2)]),
            tree_skill("scientific_genius", "Scientific Genius", 1,
                &[("all_research_bonus", Number(0.25)), ("breakthrough_chance", Number(0.1))], 1000,
                &[("research", 5)],
                &[("quick_learning", 3), ("resource_recycling", 2), ("advanced_theory", 1)]),
        ],
    });

    tree
}

// ── Weather ────────────────────────────────────────────────────────

fn multipliers(gather: f64, energy: f64, water: f64, food: f64, explore: f64) -> WeatherMultipliers {
    WeatherMultipliers {
        gathering_efficiency:   gather,
        energy_consumption:     energy,
        water_consumption:      water,
        food_consumption:       food,
        exploration_efficiency: explore,
    }
}

fn seasons(spring: f64, summer: f64, autumn: f64, winter: f64) -> BTreeMap<Season, f64> {
    BTreeMap::from([
        (Season::Spring, spring),
        (Season::Summer, summer),
        (Season::Autumn, autumn),
        (Season::Winter, winter),
    ])
}

fn weather(
    id:          &str,
    name:        &str,
    probability: f64,
    hours:       (u32, u32),
    effects:     WeatherMultipliers,
    modifiers:   BTreeMap<Season, f64>,
    events:      Vec<WeatherEventDef>,
) -> WeatherTypeDef {
    WeatherTypeDef {
        id: id.into(),
        name: name.into(),
        probability,
        duration: HourRange { min: hours.0, max: hours.1 },
        effects,
        season_modifiers: modifiers,
        events,
    }
}

fn weather_event(id: &str, name: &str, probability: f64, condition: Condition, effect: Effect) -> WeatherEventDef {
    WeatherEventDef { id: id.into(), name: name.into(), probability, condition, effect }
}

pub fn weather_types() -> Vec<WeatherTypeDef> {
    vec![
        weather("clear", "Clear", 0.25, (4, 12),
            multipliers(1.1, 1.0, 1.1, 1.0, 1.1), seasons(1.0, 1.5, 1.0, 0.5), vec![]),
        weather("cloudy", "Cloudy", 0.2, (3, 10),
            multipliers(1.0, 1.0, 0.9, 1.0, 1.0), seasons(1.2, 1.0, 1.2, 1.0), vec![]),
        weather("rainy", "Rainy", 0.15, (2, 8),
            multipliers(0.8, 1.2, 0.7, 1.1, 0.7), seasons(1.5, 1.0, 1.2, 0.3), vec![]),
        weather("foggy", "Foggy", 0.1, (2, 6),
            multipliers(0.7, 1.1, 1.0, 1.0, 0.5), seasons(1.2, 0.5, 1.5, 1.2), vec![]),
        weather("windy", "Windy", 0.12, (3, 7),
            multipliers(0.8, 1.3, 1.2, 1.1, 0.7), seasons(1.3, 0.8, 1.5, 1.0), vec![]),
        weather("stormy", "Thunderstorm", 0.08, (1, 5),
            multipliers(0.5, 1.5, 0.5, 1.2, 0.3), seasons(1.0, 1.5, 1.0, 0.2),
            vec![weather_event("lightning_strike", "Lightning Strike", 0.05,
                Condition::Always, Effect::Damage { min: 5, max: 14 })]),
        weather("heatwave", "Heatwave", 0.07, (2, 4),
            multipliers(0.7, 1.4, 1.8, 1.1, 0.6), seasons(0.2, 2.0, 0.3, 0.0),
            vec![weather_event("dehydration", "Dehydration", 0.1,
                Condition::ResourceBelow { resource: "water".into(), amount: 5 },
                Effect::Damage { min: 3, max: 7 })]),
        weather("blizzard", "Blizzard", 0.06, (1, 3),
            multipliers(0.4, 1.7, 0.8, 1.5, 0.2), seasons(0.1, 0.0, 0.2, 2.0),
            vec![weather_event("hypothermia", "Hypothermia", 0.15,
                Condition::ResourceBelow { resource: "fuel".into(), amount: 3 },
                Effect::Damage { min: 5, max: 12 })]),
        weather("sandstorm", "Sandstorm", 0.05, (1, 4),
            multipliers(0.3, 1.6, 1.5, 1.2, 0.3), seasons(0.5, 1.5, 0.5, 0.1),
            vec![weather_event("lost_resources", "Lost Resources", 0.2, Condition::Always,
                Effect::LoseRandomResource {
                    resources: ids(&["food", "water", "wood", "herb"]),
                    min: 3,
                    max: 7,
                })]),
        weather("auroral", "Aurora", 0.03, (3, 6),
            multipliers(1.0, 0.9, 1.0, 0.9, 1.2), seasons(0.2, 0.1, 0.3, 1.8),
            vec![weather_event("inspiration", "Inspiration", 0.3, Condition::Always,
                Effect::AddPlayerExp { min: 10, max: 24 })]),
        weather("rainbow", "Rainbow", 0.04, (1, 3),
            multipliers(1.2, 0.8, 0.9, 0.9, 1.3), seasons(1.5, 1.0, 1.0, 0.2),
            vec![weather_event("lucky_find", "Lucky Find", 0.25, Condition::Always,
                Effect::GainRandomResource {
                    resources: ids(&["food", "water", "wood", "stone", "herb", "metal"]),
                    min: 5,
                    max: 12,
                })]),
    ]
}

// ── Dice ───────────────────────────────────────────────────────────

fn buff(id: u32, name: &str, effect: BuffEffect) -> BuffDef {
    BuffDef { id, name: name.into(), effect }
}

pub fn buff_library() -> Vec<BuffDef> {
    use BuffEffect::*;
    vec![
        buff(1, "Scoring Fives", SingleDice { face: 5, bonus: 50 }),
        buff(2, "Scoring Twos", SingleDice { face: 2, bonus: 50 }),
        buff(3, "Two Becomes Six", Transform { from: 2, to: 6 }),
        buff(4, "Three Becomes Six", Transform { from: 3, to: 6 }),
        buff(5, "Even Trio", Combo { faces: vec![2, 4, 6], bonus: 800, mode: ComboMode::Exact }),
        buff(6, "One and Five", Combo { faces: vec![1, 5], bonus: 300, mode: ComboMode::Exact }),
        buff(7, "Lone Die Double", SelectionLimit { max_dice: 1, multiplier: 2 }),
        buff(8, "Handful Bonus", SelectionBonus { min_dice: 3, bonus: 500 }),
        buff(9, "Six Counter", Counter { face: 6, per_unit: 15, source: CounterSource::Drawn }),
        buff(10, "Leftover Reward", LeftoverPerDie { per_die: 50 }),
        buff(11, "Clean Sweep", LeftoverEmpty { bonus: 500 }),
        buff(12, "Leftover Six", LeftoverHasFace { face: 6, bonus: 300 }),
        buff(13, "Leftover One", LeftoverHasFace { face: 1, bonus: 300 }),
        buff(14, "Leftover Odds", LeftoverParity { parity: Parity::Odd, per_die: 100 }),
        buff(15, "Leftover Evens", LeftoverParity { parity: Parity::Even, per_die: 100 }),
        buff(16, "Third Show Triple", TurnMultiplier { turn: 3, multiplier: 3 }),
        buff(17, "Three in a Row", RepeatedFace { times: 3, multiplier: 2 }),
        buff(18, "Late Turns", LateTurn { min_turn: 3, bonus: 500 }),
        buff(19, "Next Round Opener", NextRoundFirst { multiplier: 2 }),
        buff(20, "Round Match", RoundMatch { per_die: 500 }),
        buff(21, "Low Round Double", LowRoundDouble { max_round_score: 300, multiplier: 2 }),
        buff(22, "Odd Reward", ShownParity { parity: Parity::Odd, per_die: 200 }),
        buff(23, "Even Reward", ShownParity { parity: Parity::Even, per_die: 200 }),
        buff(24, "Draw Reward", DrawBonus { per_die: 100 }),
        buff(25, "Six Chain", Chain { trigger_face: 6, per_even: 300 }),
        buff(26, "Finale Bonus", FinalBonus { threshold: 1500, bonus: 1000 }),
        buff(27, "Finale Double", FinalMultiplier { threshold: 3000, multiplier: 2 }),
        buff(28, "Even Opening Draw", EvenFirstDraw),
        buff(29, "One Counter", Counter { face: 1, per_unit: 15, source: CounterSource::Shown }),
        buff(30, "Single Streak", RepeatedSingle { times: 3, multiplier: 2 }),
    ]
}

pub fn dice_profiles() -> Vec<DiceProfile> {
    vec![
        DiceProfile { id: 1, name: "Standard".into(), faces: [1, 2, 3, 4, 5, 6] },
        DiceProfile { id: 2, name: "Triple Three".into(), faces: [3, 3, 3, 2, 4, 6] },
        DiceProfile { id: 3, name: "Double Four Double Three".into(), faces: [4, 4, 3, 3, 5, 6] },
        DiceProfile { id: 4, name: "Four Flat One Peak".into(), faces: [1, 1, 1, 1, 3, 6] },
    ]
}

pub fn dice_achievements() -> Vec<DiceAchievementDef> {
    use DiceAchievementCondition::*;
    let def = |id: u32, name: &str, condition, reward_profile| DiceAchievementDef {
        id,
        name: name.into(),
        condition,
        reward_profile,
    };
    vec![
        def(1, "Ones in three straight shows", ConsecutiveFace { face: 1, times: 3 }, 2),
        def(2, "Twos in two straight shows", ConsecutiveFace { face: 2, times: 2 }, 2),
        def(3, "Threes in two straight shows", ConsecutiveFace { face: 3, times: 2 }, 2),
        def(4, "Sixes in three straight shows", ConsecutiveFace { face: 6, times: 3 }, 3),
        def(5, "Best run reaches 5000", MaxScore { score: 5000 }, 3),
        def(6, "Best round reaches 5000", MaxRoundScore { score: 5000 }, 4),
    ]
}

// ── Survival achievements ──────────────────────────────────────────

pub fn achievements() -> Vec<AchievementDef> {
    let def = |id: &str, name: &str, condition, reward_exp| AchievementDef {
        id: id.into(),
        name: name.into(),
        condition,
        reward_exp,
    };
    let basics = || ids(&["food", "water", "wood", "stone"]);
    let skill = |skill: &str, level| Condition::SkillLevelAtLeast { skill: skill.into(), level };
    vec![
        def("first_day", "A New Beginning", Condition::DaysSurvivedAtLeast { days: 1 }, 10),
        def("week_survivor", "Week Survivor", Condition::DaysSurvivedAtLeast { days: 7 }, 30),
        def("month_survivor", "Month Survivor", Condition::DaysSurvivedAtLeast { days: 30 }, 100),
        def("season_cycle", "Full Cycle", Condition::DaysSurvivedAtLeast { days: 120 }, 200),
        def("resource_collector", "Resource Collector",
            Condition::ResourceSumAtLeast { resources: basics(), amount: 100 }, 50),
        def("resource_collector_2", "Resource Collector II",
            Condition::ResourceSumAtLeast { resources: basics(), amount: 200 }, 50),
        def("master_gatherer", "Master Gatherer", skill("gathering", 5), 80),
        def("master_crafter", "Master Crafter", skill("crafting", 5), 80),
        def("master_survivor", "Master Survivor", skill("survival", 5), 80),
        def("master_researcher", "Master Researcher", skill("research", 5), 80),
        def("tech_enthusiast", "Tech Enthusiast", Condition::ResearchedCountAtLeast { count: 10 }, 100),
        def("builder", "Builder", Condition::BuildingCountAtLeast { count: 3 }, 70),
        def("builder_2", "Builder II", Condition::BuildingCountAtLeast { count: 5 }, 70),
        def("explorer", "Explorer", Condition::ExplorationCountAtLeast { count: 100 }, 90),
        def("relic_hunter", "Relic Hunter",
            Condition::ResourceAtLeast { resource: "ancient_relic".into(), amount: 3 }, 120),
        def("healthy_survivor", "Healthy Survivor", Condition::HealthyDaysAtLeast { days: 7 }, 70),
        def("healthy_survivor_2", "Healthy Survivor II", Condition::HealthyDaysAtLeast { days: 30 }, 70),
    ]
}

// ── Random events ──────────────────────────────────────────────────

fn option(label: &str, condition: Condition, effect: Effect) -> EventOption {
    EventOption { label: label.into(), condition, effect }
}

fn add(resource: &str, min: u32, max: u32) -> Effect {
    Effect::AddResource { resource: resource.into(), min, max }
}

fn consume(resource: &str, amount: u32) -> Effect {
    Effect::ConsumeResource { resource: resource.into(), amount }
}

fn lose_fraction(resource: &str, fraction: f64) -> Effect {
    Effect::ConsumeFraction { resource: resource.into(), fraction }
}

fn at_least(resource: &str, amount: u32) -> Condition {
    Condition::ResourceAtLeast { resource: resource.into(), amount }
}

fn log(message: &str) -> Effect {
    Effect::Log { message: message.into() }
}

fn seq(effects: Vec<Effect>) -> Effect {
    Effect::Sequence { effects }
}

pub fn events() -> Vec<EventDef> {
    let event = |id: &str, title: &str, weight, min_day, condition, options| EventDef {
        id: id.into(),
        title: title.into(),
        weight,
        min_day,
        condition,
        options,
    };
    vec![
        event("wild_harvest", "Wild Harvest", 10.0, 1, Condition::Always, vec![
            option("Gather food", Condition::Always, add("food", 5, 14)),
            option("Collect water", Condition::Always, add("water", 5, 12)),
            option("Search for herbs", Condition::Always, add("herb", 2, 6)),
        ]),
        event("ancient_cache", "Ancient Cache", 5.0, 5, Condition::Always, vec![
            option("Study it carefully", Condition::Always, seq(vec![
                add("tech_fragment", 2, 2),
                Effect::AddSkillExp { skill: "research".into(), amount: 30 },
            ])),
            option("Search quickly", Condition::Always, Effect::Chance {
                probability: 0.7,
                then:        Box::new(seq(vec![add("tech_fragment", 1, 1), add("parts", 1, 1)])),
                otherwise:   Box::new(log("A guard mechanism triggered; you found nothing")),
            }),
        ]),
        event("passing_trader", "Passing Trader", 8.0, 3, Condition::Always, vec![
            option("Trade 5 food for 3 herbs", at_least("food", 5),
                seq(vec![consume("food", 5), add("herb", 3, 3)])),
            option("Trade 8 wood for 2 tools", at_least("wood", 8),
                seq(vec![consume("wood", 8), add("tools", 2, 2)])),
            option("Decline", Condition::Always, log("You politely declined the trade")),
        ]),
        event("lost_traveler", "Lost Traveler", 7.0, 4, Condition::Always, vec![
            option("Share food and water",
                Condition::All { conditions: vec![at_least("food", 3), at_least("water", 3)] },
                seq(vec![
                    consume("food", 3),
                    consume("water", 3),
                    Effect::OneOf { effects: vec![
                        add("medicine", 1, 1),
                        add("tech_fragment", 1, 1),
                        Effect::AddPlayerExpFraction { fraction: 0.1 },
                    ]},
                ])),
            option("Ignore them", Condition::Always, Effect::Damage { min: 5, max: 5 }),
        ]),
        event("food_spoilage", "Food Spoilage", 6.0, 5, at_least("food", 5), vec![
            option("Throw out the spoiled food", Condition::Always, lose_fraction("food", 0.3)),
            option("Try to save it", Condition::Always, Effect::IfElse {
                condition: Condition::SkillLevelAtLeast { skill: "survival".into(), level: 3 },
                then:      Box::new(lose_fraction("food", 0.15)),
                otherwise: Box::new(seq(vec![
                    lose_fraction("food", 0.4),
                    Effect::Damage { min: 5, max: 5 },
                ])),
            }),
        ]),
        event("tool_break", "Broken Tools", 5.0, 6, at_least("tools", 1), vec![
            option("Try to repair", Condition::Always, Effect::IfElse {
                condition: Condition::All { conditions: vec![
                    Condition::SkillLevelAtLeast { skill: "crafting".into(), level: 2 },
                    at_least("metal", 1),
                ]},
                then:      Box::new(consume("metal", 1)),
                otherwise: Box::new(consume("tools", 1)),
            }),
            option("Give up on it", Condition::Always, consume("tools", 1)),
        ]),
        event("severe_storm", "Severe Storm", 3.0, 10, Condition::Always, vec![
            option("Take shelter", Condition::Always, Effect::IfElse {
                condition: Condition::BuildingLevelAtLeast { building: "shelter".into(), level: 2 },
                then:      Box::new(log("Your shelter kept you safe through the storm")),
                otherwise: Box::new(seq(vec![
                    Effect::Damage { min: 10, max: 19 },
                    lose_fraction("food", 0.3),
                    lose_fraction("water", 0.3),
                    lose_fraction("wood", 0.3),
                    lose_fraction("herb", 0.3),
                ])),
            }),
            option("Reinforce the camp",
                Condition::All { conditions: vec![at_least("wood", 5), at_least("stone", 3)] },
                seq(vec![
                    consume("wood", 5),
                    consume("stone", 3),
                    Effect::Damage { min: 5, max: 9 },
                    lose_fraction("food", 0.15),
                    lose_fraction("water", 0.15),
                    Effect::AddSkillExp { skill: "survival".into(), amount: 20 },
                ])),
        ]),
        event("mysterious_visitor", "Mysterious Visitor", 2.0, 15, Condition::Always, vec![
            option("Ask for survival tips", Condition::Always,
                Effect::AddSkillExp { skill: "survival".into(), amount: 50 }),
            option("Ask about the world", Condition::Always,
                seq(vec![add("tech_fragment", 3, 3), Effect::Heal { amount: 10 }])),
            option("Stay on guard", Condition::Always,
                Effect::AddSkillExp { skill: "combat".into(), amount: 20 }),
        ]),
    ]
}

// ── Exploration ────────────────────────────────────────────────────

fn ranged(resource: &str, min: u32, max: u32) -> Yield {
    Yield { resource: resource.into(), min, max }
}

pub fn regions() -> Vec<RegionDef> {
    let region = |id: &str, name: &str, difficulty, energy, cost, resources, duration_minutes, skill_levels, exp| {
        RegionDef {
            id: id.into(),
            name: name.into(),
            difficulty,
            energy,
            cost,
            resources,
            duration_minutes,
            skill_levels,
            exp,
        }
    };
    vec![
        region("forest", "Forest", 1, 30, res(&[("food", 2), ("water", 2)]),
            vec![ranged("wood", 3, 12), ranged("herb", 1, 6), ranged("food", 2, 10)],
            300, levels(&[("survival", 1)]), 10),
        region("hills", "Hills", 2, 40, res(&[("food", 3), ("water", 3)]),
            vec![ranged("stone", 3, 12), ranged("metal", 1, 4)],
            600, levels(&[("survival", 2)]), 15),
        region("ruins", "Ruins", 3, 50, res(&[("food", 5), ("water", 5), ("medicine", 1)]),
            vec![ranged("metal", 1, 3), ranged("parts", 0, 2), ranged("tech_fragment", 0, 2),
                 ranged("ancient_relic", 0, 1)],
            1200, levels(&[("survival", 3), ("combat", 2)]), 25),
        region("cave", "Cave", 4, 60, res(&[("food", 6), ("water", 6), ("medicine", 2), ("tools", 1)]),
            vec![ranged("stone", 2, 8), ranged("metal", 1, 6), ranged("crystal", 0, 2)],
            1800, levels(&[("survival", 4), ("combat", 3)]), 35),
        region("wasteland", "Wasteland", 5, 70,
            res(&[("food", 8), ("water", 10), ("medicine", 3), ("tools", 2)]),
            vec![ranged("metal", 2, 8), ranged("parts", 1, 3), ranged("tech_fragment", 0, 2),
                 ranged("ancient_relic", 0, 1)],
            2400, levels(&[("survival", 5), ("combat", 4)]), 50),
    ]
}

// ── Recipes, technologies, buildings ───────────────────────────────

pub fn recipes() -> Vec<RecipeDef> {
    let recipe = |id: &str, name: &str, category, inputs, energy, outputs, duration_minutes, skill: (&str, u32), technology: Option<&str>, exp| {
        RecipeDef {
            id: id.into(),
            name: name.into(),
            category,
            inputs,
            energy,
            outputs,
            duration_minutes,
            skill_levels: levels(&[skill]),
            technology: technology.map(str::to_string),
            exp,
        }
    };
    use ActivityCategory::{Crafting, Gathering};
    let upkeep = || res(&[("food", 5), ("water", 5)]);
    vec![
        recipe("gather_food", "Gather Food", Gathering, res(&[]), 10,
            vec![ranged("food", 5, 20)], 60, ("gathering", 1), None, 10),
        recipe("gather_water", "Collect Water", Gathering, res(&[]), 10,
            vec![ranged("water", 5, 20)], 60, ("gathering", 1), None, 10),
        recipe("gather_wood", "Collect Wood", Gathering, upkeep(), 15,
            vec![ranged("wood", 5, 10)], 90, ("gathering", 1), None, 12),
        recipe("gather_stone", "Collect Stone", Gathering, upkeep(), 20,
            vec![ranged("stone", 5, 10)], 120, ("gathering", 1), None, 12),
        recipe("gather_herb", "Gather Herbs", Gathering, upkeep(), 15,
            vec![ranged("herb", 5, 10)], 90, ("gathering", 2), None, 15),
        recipe("gather_metal", "Search for Metal", Gathering, upkeep(), 25,
            vec![ranged("metal", 1, 10)], 150, ("gathering", 3), None, 20),
        recipe("gather_rare_herb", "Gather Rare Herbs", Gathering,
            res(&[("food", 10), ("water", 10)]), 30,
            vec![ranged("rare_herb", 1, 3)], 300, ("gathering", 4), None, 30),
        recipe("craft_simple_tool", "Simple Tool", Crafting,
            res(&[("wood", 5), ("stone", 3), ("metal", 2)]), 15,
            vec![Yield::fixed("tools", 1)], 120, ("crafting", 1), Some("basic_crafting"), 15),
        recipe("craft_medicine", "Medicine", Crafting,
            res(&[("herb", 5), ("water", 3), ("rare_herb", 2)]), 15,
            vec![Yield::fixed("medicine", 1)], 180, ("crafting", 2), Some("medicine_brewing"), 20),
        recipe("craft_fuel", "Fuel", Crafting, res(&[("wood", 8), ("water", 10)]), 10,
            vec![Yield::fixed("fuel", 2)], 150, ("crafting", 2), None, 15),
        recipe("craft_parts", "Parts", Crafting, res(&[("metal", 5), ("tools", 1)]), 20,
            vec![Yield::fixed("parts", 2)], 240, ("crafting", 3), Some("metallurgy"), 25),
        recipe("craft_advanced_parts", "Advanced Parts", Crafting,
            res(&[("parts", 5), ("metal", 5), ("tools", 1)]), 20,
            vec![Yield::fixed("advanced_parts", 1)], 500, ("crafting", 3), Some("advanced_tools"), 40),
        recipe("craft_electronic_components", "Electronic Components", Crafting,
            res(&[("advanced_parts", 2), ("parts", 5), ("metal", 5), ("tools", 1)]), 20,
            vec![Yield::fixed("electronic_components", 2)], 500, ("crafting", 5), Some("advanced_tools"), 60),
    ]
}

pub fn technologies() -> Vec<TechDef> {
    let tech = |id: &str, name: &str, cost, duration_minutes, requires: &[&str], exp, innate| TechDef {
        id: id.into(),
        name: name.into(),
        cost,
        duration_minutes,
        requires: ids(requires),
        exp,
        innate,
    };
    vec![
        tech("basic_survival", "Basic Survival", res(&[]), 60, &[], 0, true),
        tech("basic_crafting", "Basic Crafting", res(&[("tech_fragment", 1)]), 60,
            &["basic_survival"], 20, false),
        tech("water_collection", "Water Collection", res(&[("tech_fragment", 1)]), 60,
            &["basic_survival"], 20, false),
        tech("advanced_crafting", "Advanced Crafting", res(&[("tech_fragment", 2)]), 600,
            &["basic_crafting"], 40, false),
        tech("tool_making", "Tool Making", res(&[("tech_fragment", 2), ("wood", 15), ("stone", 10)]), 600,
            &["basic_crafting"], 40, false),
        tech("water_purification", "Water Purification", res(&[("tech_fragment", 2), ("herb", 5)]), 600,
            &["water_collection"], 40, false),
        tech("metallurgy", "Metallurgy", res(&[("tech_fragment", 3), ("metal", 10)]), 900,
            &["advanced_crafting"], 60, false),
        tech("medicine_brewing", "Medicine Brewing", res(&[("tech_fragment", 2), ("herb", 10)]), 900,
            &["water_purification"], 60, false),
        tech("advanced_tools", "Advanced Tools", res(&[("tech_fragment", 3), ("tools", 2)]), 900,
            &["tool_making"], 60, false),
    ]
}

fn level(cost: ResourceMap, duration_minutes: u64, skill_levels: &[(&str, u32)], effects: BuildingEffects) -> BuildingLevel {
    BuildingLevel { cost, duration_minutes, skill_levels: levels(skill_levels), effects }
}

fn shelter(energy_recovery: u32, max_health: u32) -> BuildingEffects {
    BuildingEffects { energy_recovery, max_health, ..BuildingEffects::default() }
}

fn storage(multiplier: f64) -> BuildingEffects {
    BuildingEffects { storage_multiplier: Some(multiplier), ..BuildingEffects::default() }
}

fn workshop(speed: f64) -> BuildingEffects {
    BuildingEffects { crafting_speed: Some(speed), ..BuildingEffects::default() }
}

fn produces(resource: &str, amount: u32) -> BuildingEffects {
    BuildingEffects { daily_output: res(&[(resource, amount)]), ..BuildingEffects::default() }
}

pub fn buildings() -> Vec<BuildingDef> {
    let building = |id: &str, name: &str, levels| BuildingDef { id: id.into(), name: name.into(), levels };
    vec![
        building("shelter", "Shelter", vec![
            level(res(&[("wood", 10), ("stone", 5)]), 600, &[("survival", 1)], shelter(1, 0)),
            level(res(&[("wood", 20), ("stone", 15), ("metal", 5)]), 1200,
                &[("survival", 2), ("crafting", 1)], shelter(2, 0)),
            level(res(&[("wood", 40), ("stone", 30), ("metal", 15), ("tools", 2)]), 1800,
                &[("survival", 5), ("crafting", 10)], shelter(3, 10)),
            level(res(&[("crystal", 5), ("tech_fragment", 5), ("wood", 100), ("stone", 100),
                        ("metal", 100), ("tools", 20)]), 2400,
                &[("survival", 10), ("crafting", 10)], shelter(5, 50)),
            level(res(&[("crystal", 10), ("tech_fragment", 10), ("wood", 150), ("stone", 150),
                        ("metal", 150), ("tools", 30)]), 3000,
                &[("survival", 20), ("crafting", 20)], shelter(10, 100)),
        ]),
        building("storage", "Storage Area", vec![
            level(res(&[("wood", 15), ("stone", 5)]), 600, &[("gathering", 1)], storage(1.2)),
            level(res(&[("wood", 30), ("stone", 15), ("metal", 5)]), 1200,
                &[("gathering", 2), ("crafting", 1)], storage(1.5)),
            level(res(&[("wood", 50), ("stone", 30), ("metal", 15), ("tools", 3)]), 1800,
                &[("gathering", 3), ("crafting", 2)], storage(2.0)),
            level(res(&[("crystal", 5), ("tech_fragment", 5), ("wood", 100), ("stone", 100),
                        ("metal", 100), ("tools", 20)]), 2400,
                &[("gathering", 10), ("crafting", 10)], storage(2.5)),
            level(res(&[("crystal", 10), ("tech_fragment", 10), ("wood", 125), ("stone", 125),
                        ("metal", 125), ("tools", 25)]), 3000,
                &[("gathering", 20), ("crafting", 20)], storage(3.0)),
        ]),
        building("workshop", "Workshop", vec![
            level(res(&[("wood", 20), ("stone", 10), ("metal", 5)]), 600, &[("crafting", 1)], workshop(1.1)),
            level(res(&[("wood", 35), ("stone", 20), ("metal", 15), ("tools", 2)]), 1200,
                &[("crafting", 2)], workshop(1.25)),
            level(res(&[("wood", 60), ("stone", 40), ("metal", 30), ("tools", 5), ("parts", 3)]), 1800,
                &[("crafting", 3), ("research", 1)], workshop(1.5)),
            level(res(&[("crystal", 5), ("tech_fragment", 5), ("wood", 150), ("stone", 100),
                        ("metal", 100), ("tools", 20), ("parts", 20)]), 2400,
                &[("crafting", 10), ("research", 10)], workshop(2.0)),
            level(res(&[("crystal", 10), ("tech_fragment", 10), ("metal", 150), ("tools", 30)]), 3000,
                &[("crafting", 20), ("research", 20)], workshop(3.0)),
        ]),
        building("garden", "Garden", vec![
            level(res(&[("crystal", 1), ("wood", 10), ("stone", 5), ("water", 10)]), 600,
                &[("gathering", 2)], produces("food", 1)),
            level(res(&[("crystal", 3), ("wood", 20), ("stone", 10), ("water", 20), ("tools", 1)]), 1200,
                &[("gathering", 3)], produces("food", 2)),
            level(res(&[("crystal", 5), ("wood", 40), ("stone", 20), ("water", 30), ("tools", 3)]), 1800,
                &[("gathering", 4)], produces("food", 3)),
        ]),
        building("well", "Well", vec![
            level(res(&[("crystal", 1), ("wood", 5), ("stone", 15)]), 600,
                &[("survival", 2)], produces("water", 1)),
            level(res(&[("crystal", 3), ("wood", 10), ("stone", 30), ("tools", 1)]), 1200,
                &[("survival", 3)], produces("water", 2)),
            level(res(&[("crystal", 5), ("wood", 20), ("stone", 50), ("metal", 10), ("tools", 2)]), 1800,
                &[("survival", 4)], produces("water", 3)),
        ]),
    ]
}

// ── Merchants ──────────────────────────────────────────────────────

fn item(id: &str, resource: &str, amount: u32, price: ResourceMap, stock: u32) -> MerchantItem {
    MerchantItem { id: id.into(), resource: resource.into(), amount, price, stock }
}

fn buys(id: &str, resource: &str, price: ResourceMap) -> SellOffer {
    SellOffer { id: id.into(), resource: resource.into(), price }
}

fn special(id: &str, name: &str, inputs: ResourceMap, reward: Effect) -> SpecialTrade {
    SpecialTrade { id: id.into(), name: name.into(), inputs, reward }
}

pub fn merchants() -> Vec<MerchantDef> {
    let merchant = |id: &str, name: &str, (min_day, frequency, duration), items, buys, special| MerchantDef {
        id: id.into(),
        name: name.into(),
        availability: Availability { min_day, frequency, duration },
        items,
        buys,
        special,
    };
    vec![
        merchant("wandering_trader", "Wandering Trader", (5, 7, 1),
            vec![
                item("rare_herb", "rare_herb", 3, res(&[("food", 10), ("water", 10), ("herb", 10)]), 5),
                item("advanced_parts", "advanced_parts", 1,
                    res(&[("parts", 10), ("tools", 5), ("metal", 8), ("wood", 15)]), 2),
                item("ancient_relic", "ancient_relic", 1, res(&[("crystal", 1)]), 1),
            ],
            vec![
                buys("sell_food", "food", res(&[("water", 1)])),
                buys("sell_water", "water", res(&[("food", 1)])),
            ],
            vec![special("knowledge_exchange", "Knowledge Exchange",
                res(&[("ancient_relic", 1), ("crystal", 1), ("tech_fragment", 2)]),
                Effect::AddPlayerExp { min: 50, max: 50 })]),
        merchant("settlement_trader", "Settlement Trader", (10, 5, 2),
            vec![
                item("bulk_food", "food", 20, res(&[("wood", 15), ("stone", 10)]), 30),
                item("bulk_water", "water", 20, res(&[("wood", 15), ("stone", 10)]), 30),
                item("medicine_pack", "medicine", 1, res(&[("food", 15), ("herb", 5)]), 5),
            ],
            vec![
                buys("sell_wood", "wood", res(&[("food", 1)])),
                buys("sell_stone", "stone", res(&[("food", 1)])),
                buys("sell_metal", "metal", res(&[("food", 3)])),
            ],
            vec![special("community_support", "Community Support",
                res(&[("crystal", 1), ("food", 20), ("water", 20), ("medicine", 2)]),
                seq(vec![Effect::RaiseMaxHealth { amount: 5 }, Effect::RaiseMaxEnergy { amount: 5 }]))]),
        merchant("mysterious_stranger", "Mysterious Stranger", (20, 15, 1),
            vec![
                item("advanced_tech", "tech_fragment", 2, res(&[("crystal", 1), ("ancient_relic", 2)]), 3),
                item("rare_material", "crystal", 1, res(&[("metal", 15), ("tools", 2)]), 3),
            ],
            vec![
                buys("sell_tech", "tech_fragment", res(&[("food", 25), ("water", 25)])),
                buys("sell_parts", "parts", res(&[("food", 15), ("metal", 5)])),
            ],
            vec![special("risky_experiment", "Risky Experiment",
                res(&[("fuel", 10), ("medicine", 20), ("ancient_relic", 10), ("crystal", 10)]),
                Effect::AddPlayerExp { min: 1000, max: 1000 })]),
        merchant("night_stranger", "Night Stranger", (30, 30, 1),
            vec![
                item("advanced_tech", "tech_fragment", 2, res(&[("ancient_relic", 4)]), 3),
                item("rare_material", "crystal", 2, res(&[("tech_fragment", 4)]), 3),
                item("rare_relic", "ancient_relic", 2, res(&[("crystal", 4)]), 3),
            ],
            vec![],
            vec![]),
    ]
}
