// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # 10K Quest Tracker
//!
//! A personal fitness-tracking server for an 18-week 10K training program.
//! The tracker presents a fixed weekly plan, lets a runner mark activities
//! complete, log runs with distance/pace/feeling, accumulate experience
//! points, and unlock badges. State persists across sessions in SQLite.
//!
//! ## Features
//!
//! - **Adaptive pacing**: runs that felt great nudge upcoming target paces
//!   faster; tough runs nudge them easier (15 sec/km per step)
//! - **XP and badges**: every completed activity earns experience points,
//!   with achievement badges unlocked along the way
//! - **Extra workouts**: ad hoc sessions outside the plan earn bonus XP
//! - **Durable state**: every action is saved before the next view renders
//!
//! ## Quick Start
//!
//! 1. Start the server with `quest-tracker-server`
//! 2. Fetch the current week with `GET /week`
//! 3. Log runs and toggle activities through the `POST` endpoints
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: typed activities, run logs, badges, and the tracker state
//! - **Plan**: the immutable training-plan catalog
//! - **Materializer**: pure computation of a week's effective plan
//! - **Engine**: state transitions (toggle, log run, extra workout) and
//!   badge evaluation
//! - **Database**: SQLite-backed persistence of the full tracker state
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use quest_tracker::database::{Database, StateStore};
//! use quest_tracker::engine::ProgressionEngine;
//! use quest_tracker::models::{ActivityKey, Feeling, Weekday};
//! use quest_tracker::plan::PlanCatalog;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let database = Database::new("sqlite:quest.db").await?;
//!     let mut state = database.load().await?;
//!
//!     let engine = ProgressionEngine::new(PlanCatalog::standard());
//!     let key = ActivityKey::new(1, Weekday::Sat);
//!     let outcome = engine.log_run(
//!         &mut state,
//!         key,
//!         "5K".to_string(),
//!         "6:55/km".to_string(),
//!         Feeling::Great,
//!         None,
//!     )?;
//!     println!("+{} XP", outcome.xp_delta);
//!
//!     database.save(&state).await?;
//!     Ok(())
//! }
//! ```

/// Core data models: activities, run logs, badges, tracker state
pub mod models;

/// The immutable 18-week training-plan catalog
pub mod plan;

/// Pure materialization of a week's effective plan
pub mod materializer;

/// Progression engine: state transitions and badge evaluation
pub mod engine;

/// SQLite-backed persistence of the tracker state
pub mod database;

/// Error taxonomy shared across the crate
pub mod errors;

/// Configuration management and persistence
pub mod config;

/// Application constants and environment-based configuration values
pub mod constants;

/// HTTP command surface consumed by the presentation layer
pub mod routes;

/// Warp server wiring for the command surface
pub mod server;

/// Production logging and structured output
pub mod logging;

/// Health checks and monitoring
pub mod health;
