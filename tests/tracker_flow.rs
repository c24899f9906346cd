// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end tracker workflow tests
//!
//! These tests drive complete training scenarios through the route
//! handlers and verify that progression, pace adjustment, badges and
//! persistence line up across transitions.

use anyhow::Result;
use quest_tracker::database::{Database, StateStore};
use quest_tracker::engine::ProgressionEngine;
use quest_tracker::materializer::EffectiveActivity;
use quest_tracker::models::{ActivityKey, Badge, Weekday};
use quest_tracker::plan::PlanCatalog;
use quest_tracker::routes::{
    ChangeWeekRequest, ExtraWorkoutRequest, LogRunRequest, ToggleRequest, TrackerRoutes,
    WeekViewResponse,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to build a routes facade over a fresh in-memory database
async fn create_test_tracker() -> Result<(TrackerRoutes, Database)> {
    let database = Database::new("sqlite::memory:").await?;
    let state = database.load().await?;
    let engine = ProgressionEngine::new(PlanCatalog::standard());
    let tracker = TrackerRoutes::new(engine, state, Arc::new(database.clone()));
    Ok((tracker, database))
}

/// Helper to build a run log submission for `key`
fn run_request(key: &str, feeling: &str) -> LogRunRequest {
    LogRunRequest {
        key: key.to_string(),
        distance: "5K".to_string(),
        pace: "7:05/km".to_string(),
        feeling: feeling.to_string(),
        notes: None,
    }
}

fn toggle(key: &str) -> ToggleRequest {
    ToggleRequest {
        key: key.to_string(),
    }
}

fn key(week: u32, day: Weekday) -> ActivityKey {
    ActivityKey::new(week, day)
}

/// Helper to pull one day's activity out of a rendered week
fn activity_on(view: &WeekViewResponse, day: Weekday) -> &EffectiveActivity {
    view.week
        .activities
        .iter()
        .find(|a| a.key.day == day)
        .expect("day missing from rendered week")
}

/// Walks an entire first training week and checks XP, badges and the
/// consistency bonus fall out of the transitions
#[tokio::test]
async fn test_first_week_training_journey() -> Result<()> {
    let (tracker, database) = create_test_tracker().await?;

    // 1. Rest days, easy runs and strength work through Friday
    let mon = tracker.toggle_activity(toggle("w1_Mon")).await?;
    assert_eq!(mon.xp_delta, 10);
    assert!(mon.new_badges.is_empty());
    assert_eq!(mon.view.summary.completed_activities, 1);

    tracker.log_run(run_request("w1_Tue", "okay")).await?;
    tracker.toggle_activity(toggle("w1_Wed")).await?;
    tracker.log_run(run_request("w1_Thu", "good")).await?;
    let fri = tracker.toggle_activity(toggle("w1_Fri")).await?;
    assert_eq!(fri.view.state.total_xp, 60);
    assert!(!fri.view.summary.week_complete);

    // 2. A great parkrun unlocks Speed Demon and speeds up coming runs
    let sat = tracker.log_run(run_request("w1_Sat", "great")).await?;
    assert_eq!(sat.xp_delta, 25);
    assert!(sat.new_badges.iter().any(|b| b.id == "speed_demon"));
    let note = sat.pace_note.as_deref().unwrap_or_default();
    assert!(note.contains("faster"));

    // Only Sunday is still open this week, so it picks up the adjustment
    let adjustments = &sat.view.state.pace_adjustments;
    assert_eq!(adjustments.get(&key(1, Weekday::Sun)), Some(&1));
    assert!(!adjustments.contains_key(&key(1, Weekday::Tue)));
    assert_eq!(adjustments.get(&key(2, Weekday::Sat)), Some(&1));

    let sunday = activity_on(&sat.view, Weekday::Sun);
    let pace = sunday.effective_pace.as_deref().unwrap_or_default();
    assert!(pace.contains("15 sec/km faster"));

    // 3. Closing out Sunday completes the week
    let sun = tracker.log_run(run_request("w1_Sun", "good")).await?;
    assert_eq!(sun.xp_delta, 15);
    assert!(sun.new_badges.iter().any(|b| b.id == "fire_starter"));
    assert!(sun.new_badges.iter().any(|b| b.id == "consistency_king"));
    let message = sun.view.completion_message.as_deref().unwrap_or_default();
    assert!(message.contains("WEEK COMPLETE"));

    // 4. The weekly total shows the bonus but lifetime XP does not
    let summary = &sun.view.summary;
    assert!(summary.week_complete);
    assert_eq!(summary.planned_xp, 100);
    assert_eq!(summary.consistency_bonus, 50);
    assert_eq!(summary.weekly_xp, 150);
    assert_eq!(sun.view.state.total_xp, 100);

    // 5. Three badges earned, and every transition is already on disk
    let badges = tracker.badges().await?;
    assert_eq!(badges.earned_count, 3);

    let stored = database.load().await?;
    assert_eq!(stored, tracker.state_snapshot().await?);
    Ok(())
}

/// A tough run eases upcoming paces and a later great run overrides
/// them where the windows overlap
#[tokio::test]
async fn test_adaptive_pacing_reaches_the_following_week() -> Result<()> {
    let (tracker, _database) = create_test_tracker().await?;

    // 1. Tuesday felt tough: recovery paces for this week and next
    let tue = tracker.log_run(run_request("w1_Tue", "tough")).await?;
    let note = tue.pace_note.as_deref().unwrap_or_default();
    assert!(note.contains("easier"));

    let adjustments = &tue.view.state.pace_adjustments;
    assert_eq!(adjustments.len(), 5);
    for target in [
        key(1, Weekday::Thu),
        key(1, Weekday::Sun),
        key(2, Weekday::Tue),
        key(2, Weekday::Thu),
        key(2, Weekday::Sun),
    ] {
        assert_eq!(adjustments.get(&target), Some(&-1));
    }
    // Saturday parkruns are never eased
    assert!(!adjustments.contains_key(&key(1, Weekday::Sat)));
    assert!(!adjustments.contains_key(&key(2, Weekday::Sat)));

    // 2. Week 2 renders with the eased paces baked in
    let moved = tracker.change_week(ChangeWeekRequest { delta: 1 }).await?;
    assert_eq!(moved.view.week.week, 2);
    assert_eq!(moved.view.week.title, "Building Confidence");

    let tuesday = activity_on(&moved.view, Weekday::Tue);
    let pace = tuesday.effective_pace.as_deref().unwrap_or_default();
    assert!(pace.contains("15 sec/km easier"));
    assert_eq!(tuesday.adjustment.as_ref().map(|a| a.level), Some(-1));

    let saturday = activity_on(&moved.view, Weekday::Sat);
    assert_eq!(saturday.effective_pace.as_deref(), Some("6:50-7:00/km"));
    assert!(saturday.adjustment.is_none());

    // 3. A great parkrun in week 2 overrides the easing where it overlaps
    let sat = tracker.log_run(run_request("w2_Sat", "great")).await?;
    let adjustments = &sat.view.state.pace_adjustments;
    assert_eq!(adjustments.get(&key(2, Weekday::Tue)), Some(&1));
    assert_eq!(adjustments.get(&key(3, Weekday::Sat)), Some(&1));
    // The logged parkrun itself is done and stays unadjusted
    assert!(!adjustments.contains_key(&key(2, Weekday::Sat)));
    // Week 1 lies behind the adjustment window and keeps its easing
    assert_eq!(adjustments.get(&key(1, Weekday::Thu)), Some(&-1));

    // 4. Week 3 has no authored plan yet but still shows its adjustments
    let week_three = tracker.week_view_for(3).await?;
    assert_eq!(week_three.week.week, 3);
    assert_eq!(week_three.week.title, "Getting Started!");
    let pace = activity_on(&week_three, Weekday::Sat)
        .effective_pace
        .as_deref()
        .unwrap_or_default();
    assert!(pace.contains("faster"));
    Ok(())
}

/// Rejected commands must not leave partial writes in memory or on disk
#[tokio::test]
async fn test_rejected_commands_leave_no_trace() -> Result<()> {
    let (tracker, database) = create_test_tracker().await?;
    tracker.toggle_activity(toggle("w1_Mon")).await?;
    let before = tracker.state_snapshot().await?;

    // Off-menu XP value
    let err = tracker
        .add_extra_workout(ExtraWorkoutRequest {
            category: "Swimming".to_string(),
            xp: 12,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("5, 10, 15, 20 or 25"));

    // Run log with a blank pace
    let mut incomplete = run_request("w1_Thu", "good");
    incomplete.pace = "  ".to_string();
    let err = tracker.log_run(incomplete).await.unwrap_err();
    assert!(err.to_string().contains("distance, pace, and feeling"));

    // Run days cannot be toggled like rest days
    let err = tracker.toggle_activity(toggle("w1_Sat")).await.unwrap_err();
    assert!(err.to_string().contains("run day"));

    // Malformed activity key
    let err = tracker
        .toggle_activity(toggle("week1-Mon"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("validation"));

    assert_eq!(tracker.state_snapshot().await?, before);
    assert_eq!(database.load().await?, before);
    Ok(())
}

/// A restart loads exactly what the previous session saved
#[tokio::test]
async fn test_tracker_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let url = format!("sqlite:{}", temp_dir.path().join("quest.db").display());

    // 1. First session: a parkrun, a rest day, a week change, cross-training
    let database = Database::new(&url).await?;
    let state = database.load().await?;
    let engine = ProgressionEngine::new(PlanCatalog::standard());
    let tracker = TrackerRoutes::new(engine, state, Arc::new(database.clone()));

    tracker.log_run(run_request("w1_Sat", "great")).await?;
    tracker.toggle_activity(toggle("w1_Mon")).await?;
    tracker.change_week(ChangeWeekRequest { delta: 1 }).await?;
    tracker
        .add_extra_workout(ExtraWorkoutRequest {
            category: "Swimming".to_string(),
            xp: 15,
            notes: Some("easy laps".to_string()),
        })
        .await?;

    let parting = tracker.state_snapshot().await?;
    assert_eq!(parting.total_xp, 50);
    drop(tracker);
    drop(database);

    // 2. Second session: same file, same state
    let database = Database::new(&url).await?;
    let loaded = database.load().await?;
    assert_eq!(loaded, parting);
    assert_eq!(loaded.current_week, 2);
    assert!(loaded.badges.contains(&Badge::SpeedDemon));
    assert_eq!(loaded.extra_workouts.len(), 1);
    assert_eq!(loaded.extra_workouts[0].week, 2);
    assert_eq!(loaded.extra_workouts[0].category, "Swimming");

    // 3. The journey continues where it stopped
    let engine = ProgressionEngine::new(PlanCatalog::standard());
    let tracker = TrackerRoutes::new(engine, loaded, Arc::new(database.clone()));
    let monday = tracker.toggle_activity(toggle("w2_Mon")).await?;
    assert_eq!(monday.xp_delta, 10);
    assert_eq!(monday.view.state.total_xp, 60);

    let stored = database.load().await?;
    assert_eq!(stored.total_xp, 60);
    Ok(())
}
