//! Outpost game core.
//!
//! `engine::GameEngine` owns the snapshot; everything else is either a
//! leaf component it calls into or an hourly subsystem it drives.

pub mod activity;
pub mod buffs;
pub mod clock;
pub mod codec;
pub mod config;
pub mod content;
pub mod dice;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod repair;
pub mod rng;
pub mod skills;
pub mod snapshot;
pub mod storage;
pub mod subsystem;
pub mod types;
pub mod weather;

pub mod achievement_subsystem;
pub mod activity_subsystem;
pub mod merchant_subsystem;
pub mod random_event_subsystem;
pub mod upkeep_subsystem;
pub mod weather_subsystem;
