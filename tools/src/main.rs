//! outpost-runner: headless driver for the Outpost game core.
//!
//! Plays a simple survival policy for a number of days, then a number of
//! dice runs, against a SQLite save slot.
//!
//! Usage:
//!   outpost-runner --seed 12345 --days 30 --runs 3 --db save.db
//!   outpost-runner --seed 12345 --data-dir ./data --json

use anyhow::Result;
use outpost_core::{
    activity::ActivityCategory,
    config::GameConfig,
    engine::{GameEngine, DEFAULT_SAVE_KEY},
    rng::SubsystemRng,
    storage::SqliteStorage,
};
use std::env;
use std::path::Path;

const SHOWS_PER_ROUND: usize = 3;
const BUFFS_PER_RUN: usize = 3;

#[derive(serde::Serialize)]
struct RunSummary {
    session_id:    String,
    day:           u32,
    days_survived: u32,
    health:        u32,
    max_health:    u32,
    survivor_lvl:  u32,
    weather:       String,
    buildings:     usize,
    researched:    usize,
    achievements:  usize,
    explorations:  u32,
    dice_owned:    usize,
    dice_scores:   Vec<u64>,
    best_score:    u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 30u32);
    let runs = parse_arg(&args, "--runs", 3usize);
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !json {
        println!("Outpost: outpost-runner");
        println!("  seed:      {seed}");
        println!("  days:      {days}");
        println!("  runs:      {runs}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let config = if Path::new(data_dir).is_dir() {
        GameConfig::load(data_dir)?
    } else {
        GameConfig::builtin()
    };
    let storage = SqliteStorage::open(db)?;
    storage.migrate()?;

    let mut engine = GameEngine::open(config, Box::new(storage), DEFAULT_SAVE_KEY, seed);
    let start_day = engine.state().clock.day;

    while engine.state().clock.day < start_day + days {
        play_hour(&mut engine);
        engine.advance_minutes(60)?;
    }

    let mut picker = SubsystemRng::new(seed, 0xD1CE, 0).with_name("runner");
    let mut dice_scores = Vec::with_capacity(runs);
    for _ in 0..runs {
        dice_scores.push(play_dice_run(&mut engine, &mut picker)?);
    }
    engine.save();

    let summary = summarize(&engine, dice_scores);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// One decision point: keep every queue busy and answer pending events.
fn play_hour(engine: &mut GameEngine) {
    if engine.pending_event().is_some() {
        let resolved = (0..4).any(|option| engine.resolve_event(option).is_ok());
        if !resolved {
            log::debug!("no option of the pending event was available");
        }
    }

    let state = engine.state();
    let idle = |category| state.activities.queue(category).map_or(true, |q| q.is_empty());
    let gathering_idle = idle(ActivityCategory::Gathering);
    let crafting_idle = idle(ActivityCategory::Crafting);
    let exploring_idle = idle(ActivityCategory::Exploring);
    let building_idle = idle(ActivityCategory::Building);
    let research_idle = idle(ActivityCategory::Researching);

    let food = state.ledger.value("food").unwrap_or(0);
    let water = state.ledger.value("water").unwrap_or(0);
    let energy = state.player.energy;

    if gathering_idle {
        let first = if food <= water { "gather_food" } else { "gather_water" };
        let recipes = [first, "gather_wood", "gather_stone", "gather_herb"];
        if !recipes.iter().any(|r| engine.gather(r).is_ok()) {
            log::debug!("no gathering recipe could start");
        }
    }
    if crafting_idle && !["craft_simple_tool", "craft_fuel"].iter().any(|r| engine.craft(r).is_ok()) {
        log::debug!("no crafting recipe could start");
    }
    if exploring_idle && energy > 60 && food > 20 && water > 20 {
        if let Err(e) = engine.explore("forest") {
            log::debug!("exploration not started: {e}");
        }
    }
    if building_idle && !["shelter", "storage", "workshop"].iter().any(|b| engine.build_structure(b).is_ok()) {
        log::debug!("no building could be queued");
    }
    if research_idle {
        let techs = ["basic_crafting", "water_collection", "tool_making", "advanced_crafting"];
        if !techs.iter().any(|t| engine.research(t).is_ok()) {
            log::debug!("no technology could be researched");
        }
    }
}

/// Play one full run with random buffs. Shows every scoring die, or the
/// first die when nothing scores.
fn play_dice_run(engine: &mut GameEngine, picker: &mut SubsystemRng) -> Result<u64> {
    let library: Vec<u32> = engine.config.buff_library.iter().map(|b| b.id).collect();
    let mut buffs = Vec::with_capacity(BUFFS_PER_RUN);
    while buffs.len() < BUFFS_PER_RUN.min(library.len()) {
        let id = library[picker.next_u64_below(library.len() as u64) as usize];
        if !buffs.contains(&id) {
            buffs.push(id);
        }
    }
    engine.start_dice_run(&buffs)?;

    loop {
        for _ in 0..SHOWS_PER_ROUND {
            let (drawn, _) = engine.draw_dice()?;
            let mut pick: Vec<usize> = drawn
                .faces
                .iter()
                .enumerate()
                .filter(|(_, f)| **f == 1 || **f == 5)
                .map(|(i, _)| i)
                .collect();
            if pick.is_empty() {
                pick.push(0);
            }
            if engine.show_dice(&pick).is_err() {
                engine.show_dice(&pick[..1])?;
            }
        }
        let (round, _) = engine.end_dice_round()?;
        log::debug!("round {} scored {}", round.round, round.round_score);
        if round.finished {
            return Ok(round.total_score);
        }
    }
}

fn summarize(engine: &GameEngine, dice_scores: Vec<u64>) -> RunSummary {
    let state = engine.state();
    RunSummary {
        session_id:    state.session_id.clone(),
        day:           state.clock.day,
        days_survived: state.player.days_survived,
        health:        state.player.health,
        max_health:    state.player.max_health,
        survivor_lvl:  state.player.progress.level,
        weather:       state.weather.current.clone(),
        buildings:     state.buildings.len(),
        researched:    state.researched.len(),
        achievements:  state.achievements.len(),
        explorations:  state.player.exploration_count,
        dice_owned:    state.dice.dice.len(),
        dice_scores,
        best_score:    state.dice.max_score,
    }
}

fn print_summary(s: &RunSummary) {
    println!("=== RUN SUMMARY ===");
    println!("  session:        {}", s.session_id);
    println!("  day:            {}", s.day);
    println!("  days survived:  {}", s.days_survived);
    println!("  health:         {}/{}", s.health, s.max_health);
    println!("  survivor level: {}", s.survivor_lvl);
    println!("  weather:        {}", s.weather);
    println!("  buildings:      {}", s.buildings);
    println!("  researched:     {}", s.researched);
    println!("  achievements:   {}", s.achievements);
    println!("  explorations:   {}", s.explorations);
    println!();
    println!("=== DICE SUMMARY ===");
    println!("  dice owned:     {}", s.dice_owned);
    for (i, score) in s.dice_scores.iter().enumerate() {
        println!("  run {:>2}:         {score}", i + 1);
    }
    println!("  best score:     {}", s.best_score);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
