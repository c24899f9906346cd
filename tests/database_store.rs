// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for the SQLite state store
//!
//! These tests exercise the store against real database files, where
//! the in-module tests stick to in-memory databases.

use anyhow::Result;
use quest_tracker::database::{Database, StateStore};
use quest_tracker::models::{
    ActivityKey, Badge, ExtraWorkout, Feeling, RunLog, TrackerState, Weekday,
};
use tempfile::TempDir;

/// Helper to build a state with every collection populated
fn populated_state() -> TrackerState {
    let mut state = TrackerState::default();
    state.total_xp = 85;
    state.current_week = 2;
    state
        .completed
        .insert(ActivityKey::new(1, Weekday::Mon), true);
    state
        .completed
        .insert(ActivityKey::new(1, Weekday::Sat), true);
    state
        .completed
        .insert(ActivityKey::new(1, Weekday::Tue), false);
    state.run_logs.insert(
        ActivityKey::new(1, Weekday::Sat),
        RunLog {
            distance: "5K".to_string(),
            pace: "6:58/km".to_string(),
            feeling: Feeling::Great,
            notes: Some("negative splits".to_string()),
        },
    );
    state
        .extra_workouts
        .push(ExtraWorkout::new(1, 1, "Swimming", 15, None));
    state.extra_workouts.push(ExtraWorkout::new(
        2,
        2,
        "Cycling",
        20,
        Some("hill repeats".to_string()),
    ));
    state
        .pace_adjustments
        .insert(ActivityKey::new(2, Weekday::Tue), 1);
    state
        .pace_adjustments
        .insert(ActivityKey::new(2, Weekday::Sun), -1);
    state.badges.insert(Badge::FireStarter);
    state.badges.insert(Badge::SpeedDemon);
    state
}

#[tokio::test]
async fn test_file_backed_state_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let url = format!("sqlite:{}", temp_dir.path().join("tracker.db").display());

    // 1. Save through one connection
    let database = Database::new(&url).await?;
    let state = populated_state();
    database.save(&state).await?;
    drop(database);

    // 2. Load through a completely fresh one
    let reopened = Database::new(&url).await?;
    let loaded = reopened.load().await?;
    assert_eq!(loaded, state);
    Ok(())
}

#[tokio::test]
async fn test_save_replaces_snapshot_across_connections() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let url = format!("sqlite:{}", temp_dir.path().join("tracker.db").display());

    let database = Database::new(&url).await?;
    database.save(&populated_state()).await?;

    // A later, smaller snapshot wins wholesale
    let mut shrunk = TrackerState::default();
    shrunk.total_xp = 10;
    shrunk
        .completed
        .insert(ActivityKey::new(1, Weekday::Mon), true);
    database.save(&shrunk).await?;
    drop(database);

    let reopened = Database::new(&url).await?;
    let loaded = reopened.load().await?;
    assert_eq!(loaded, shrunk);
    assert!(loaded.run_logs.is_empty());
    assert!(loaded.extra_workouts.is_empty());
    assert!(loaded.badges.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_memory_databases_are_isolated() -> Result<()> {
    let first = Database::new("sqlite::memory:").await?;
    let second = Database::new("sqlite::memory:").await?;

    first.save(&populated_state()).await?;

    let other = second.load().await?;
    assert_eq!(other, TrackerState::default());
    Ok(())
}

#[tokio::test]
async fn test_missing_parent_directories_are_created() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("data").join("nested").join("quest.db");
    let url = format!("sqlite:{}", nested.display());

    let database = Database::new(&url).await?;
    database.save(&populated_state()).await?;
    assert!(nested.exists());

    let loaded = database.load().await?;
    assert_eq!(loaded.total_xp, 85);
    Ok(())
}
