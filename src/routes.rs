// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP command surface consumed by the presentation layer
//!
//! Every handler takes a request DTO, runs the matching engine transition
//! under one session lock, persists the new snapshot, and returns the
//! re-rendered week view. The lock spans mutate and save, so commands are
//! applied strictly one at a time.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::constants::{limits, messages};
use crate::database::StateStore;
use crate::engine::{ProgressionEngine, TransitionOutcome, WeeklySummary};
use crate::errors::{TrackerError, TrackerResult};
use crate::logging::AppLogger;
use crate::materializer::{materialize, EffectiveWeek};
use crate::models::{ActivityKey, Badge, Feeling, TrackerState};

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    /// Activity key, e.g. `w1_Mon`
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogRunRequest {
    /// Activity key of the planned run, e.g. `w1_Sat`
    pub key: String,
    pub distance: String,
    pub pace: String,
    /// One of `great`, `good`, `okay`, `tough`, `bad`
    pub feeling: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtraWorkoutRequest {
    pub category: String,
    pub xp: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeWeekRequest {
    /// Signed week offset; the result clamps to the program range
    pub delta: i32,
}

/// One badge with its earned status
#[derive(Debug, Clone, Serialize)]
pub struct BadgeInfo {
    pub id: String,
    pub title: String,
    pub earned: bool,
}

#[derive(Debug, Serialize)]
pub struct BadgesResponse {
    pub badges: Vec<BadgeInfo>,
    pub earned_count: usize,
}

/// The render payload: one week's effective plan plus everything the
/// widget shows around it
#[derive(Debug, Serialize)]
pub struct WeekViewResponse {
    pub goal: String,
    pub week: EffectiveWeek,
    pub summary: WeeklySummary,
    /// Celebration line shown when the summary week is fully complete
    pub completion_message: Option<String>,
    pub state: TrackerState,
}

/// Response to every mutating command
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub xp_delta: i64,
    pub new_badges: Vec<BadgeInfo>,
    /// Explains a pace propagation triggered by the logged feeling
    pub pace_note: Option<String>,
    pub view: WeekViewResponse,
}

/// Command handlers over the shared session state
#[derive(Clone)]
pub struct TrackerRoutes {
    engine: Arc<ProgressionEngine>,
    state: Arc<Mutex<TrackerState>>,
    store: Arc<dyn StateStore>,
}

impl TrackerRoutes {
    pub fn new(engine: ProgressionEngine, state: TrackerState, store: Arc<dyn StateStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            state: Arc::new(Mutex::new(state)),
            store,
        }
    }

    /// Render the current week
    pub async fn week_view(&self) -> TrackerResult<WeekViewResponse> {
        let state = self.state.lock().await;
        Ok(self.view_of(&state, state.current_week))
    }

    /// Render an arbitrary program week without moving the week pointer
    pub async fn week_view_for(&self, week: u32) -> TrackerResult<WeekViewResponse> {
        if !(limits::FIRST_WEEK..=limits::PROGRAM_WEEKS).contains(&week) {
            return Err(TrackerError::validation(format!(
                "week {week} is outside the {}-week program",
                limits::PROGRAM_WEEKS
            )));
        }
        let state = self.state.lock().await;
        Ok(self.view_of(&state, week))
    }

    /// The raw state snapshot
    pub async fn state_snapshot(&self) -> TrackerResult<TrackerState> {
        Ok(self.state.lock().await.clone())
    }

    /// All badges with earned status
    pub async fn badges(&self) -> TrackerResult<BadgesResponse> {
        let state = self.state.lock().await;
        let badges = Badge::ALL
            .iter()
            .map(|badge| BadgeInfo {
                id: badge.id().to_string(),
                title: badge.title().to_string(),
                earned: state.badges.contains(badge),
            })
            .collect();
        Ok(BadgesResponse {
            badges,
            earned_count: state.badges.len(),
        })
    }

    /// Handle a completion toggle for a non-run activity
    pub async fn toggle_activity(&self, request: ToggleRequest) -> TrackerResult<TransitionResponse> {
        info!("Toggle request for {}", request.key);

        let key: ActivityKey = request.key.parse()?;
        let mut state = self.state.lock().await;
        let outcome = self.engine.toggle_activity(&mut state, key)?;

        AppLogger::log_transition("toggle_activity", Some(&request.key), outcome.xp_delta, true);
        self.persist_and_respond(&state, outcome, None).await
    }

    /// Handle a run log submission
    pub async fn log_run(&self, request: LogRunRequest) -> TrackerResult<TransitionResponse> {
        info!("Run log attempt for {}", request.key);

        // The widget submits a sentinel feeling until one is picked, so an
        // unparseable feeling gets the same nudge as a missing field
        let Ok(feeling) = request.feeling.trim().parse::<Feeling>() else {
            return Err(TrackerError::validation(messages::MISSING_RUN_FIELDS));
        };
        if request.distance.trim().is_empty() || request.pace.trim().is_empty() {
            return Err(TrackerError::validation(messages::MISSING_RUN_FIELDS));
        }

        let key: ActivityKey = request.key.parse()?;
        let mut state = self.state.lock().await;
        let outcome = self.engine.log_run(
            &mut state,
            key,
            request.distance,
            request.pace,
            feeling,
            request.notes,
        )?;

        let pace_note = match feeling {
            Feeling::Great => Some(messages::FASTER_PACE_HINT.to_string()),
            Feeling::Tough | Feeling::Bad => Some(messages::EASIER_PACE_HINT.to_string()),
            Feeling::Good | Feeling::Okay => None,
        };

        AppLogger::log_transition("log_run", Some(&request.key), outcome.xp_delta, true);
        self.persist_and_respond(&state, outcome, pace_note).await
    }

    /// Handle an extra workout submission for the current week
    pub async fn add_extra_workout(
        &self,
        request: ExtraWorkoutRequest,
    ) -> TrackerResult<TransitionResponse> {
        info!("Extra workout submission: {}", request.category);

        let mut state = self.state.lock().await;
        let week = state.current_week;
        let outcome = self.engine.add_extra_workout(
            &mut state,
            week,
            request.category,
            request.xp,
            request.notes,
        )?;

        AppLogger::log_transition("add_extra_workout", None, outcome.xp_delta, true);
        self.persist_and_respond(&state, outcome, None).await
    }

    /// Handle a week pointer move
    pub async fn change_week(&self, request: ChangeWeekRequest) -> TrackerResult<TransitionResponse> {
        info!("Week change request, delta {}", request.delta);

        let mut state = self.state.lock().await;
        let outcome = self.engine.change_week(&mut state, request.delta);

        AppLogger::log_transition("change_week", None, outcome.xp_delta, true);
        self.persist_and_respond(&state, outcome, None).await
    }

    /// Persist the mutated snapshot and build the transition response
    ///
    /// A failed save reports as a persistence error; the in-memory
    /// mutation stays applied either way.
    async fn persist_and_respond(
        &self,
        state: &TrackerState,
        outcome: TransitionOutcome,
        pace_note: Option<String>,
    ) -> TrackerResult<TransitionResponse> {
        for badge in &outcome.new_badges {
            AppLogger::log_badge_unlock(badge.id(), badge.title());
        }

        let started = Instant::now();
        let saved = self.store.save(state).await;
        AppLogger::log_persistence("save", saved.is_ok(), started.elapsed().as_millis() as u64);
        if let Err(e) = saved {
            error!("Failed to persist tracker state: {}", e);
            return Err(e);
        }

        let new_badges = outcome
            .new_badges
            .iter()
            .map(|badge| BadgeInfo {
                id: badge.id().to_string(),
                title: badge.title().to_string(),
                earned: true,
            })
            .collect();

        Ok(TransitionResponse {
            xp_delta: outcome.xp_delta,
            new_badges,
            pace_note,
            view: self.view_of(state, state.current_week),
        })
    }

    fn view_of(&self, state: &TrackerState, week: u32) -> WeekViewResponse {
        let effective = materialize(week, self.engine.catalog(), &state.pace_adjustments);
        let summary = self.engine.weekly_summary_for(state, week);
        let completion_message = summary
            .week_complete
            .then(|| messages::WEEK_COMPLETE.to_string());

        WeekViewResponse {
            goal: self.engine.catalog().goal().to_string(),
            week: effective,
            summary,
            completion_message,
            state: state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::plan::PlanCatalog;

    async fn test_setup() -> (TrackerRoutes, Database) {
        let database = Database::new("sqlite::memory:").await.unwrap();
        let state = database.load().await.unwrap();
        let routes = TrackerRoutes::new(
            ProgressionEngine::new(PlanCatalog::standard()),
            state,
            Arc::new(database.clone()),
        );
        (routes, database)
    }

    #[tokio::test]
    async fn test_week_view_renders_fresh_state() {
        let (routes, _database) = test_setup().await;

        let view = routes.week_view().await.unwrap();

        assert_eq!(view.week.week, 1);
        assert_eq!(view.goal, "Complete 10K on November 30th in under 60 minutes!");
        assert_eq!(view.state.total_xp, 0);
        assert_eq!(view.summary.planned_activities, 7);
        assert!(view.completion_message.is_none());
    }

    #[tokio::test]
    async fn test_toggle_round_trip_through_routes() {
        let (routes, _database) = test_setup().await;

        let response = routes
            .toggle_activity(ToggleRequest {
                key: "w1_Mon".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.xp_delta, 10);
        assert_eq!(response.view.state.total_xp, 10);

        let response = routes
            .toggle_activity(ToggleRequest {
                key: "w1_Mon".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.xp_delta, -10);
        assert_eq!(response.view.state.total_xp, 0);
    }

    #[tokio::test]
    async fn test_log_run_missing_fields_get_the_widget_message() {
        let (routes, _database) = test_setup().await;

        let err = routes
            .log_run(LogRunRequest {
                key: "w1_Sat".to_string(),
                distance: "".to_string(),
                pace: "6:55/km".to_string(),
                feeling: "great".to_string(),
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("Please fill in distance, pace, and feeling!"));
    }

    #[tokio::test]
    async fn test_log_run_sentinel_feeling_rejected() {
        let (routes, _database) = test_setup().await;

        let err = routes
            .log_run(LogRunRequest {
                key: "w1_Sat".to_string(),
                distance: "5K".to_string(),
                pace: "6:55/km".to_string(),
                feeling: "unselected".to_string(),
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_log_run_great_returns_faster_pace_note() {
        let (routes, _database) = test_setup().await;

        let response = routes
            .log_run(LogRunRequest {
                key: "w1_Sat".to_string(),
                distance: "5K".to_string(),
                pace: "6:55/km".to_string(),
                feeling: "great".to_string(),
                notes: Some("parkrun".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response.xp_delta, 25);
        let note = response.pace_note.unwrap();
        assert!(note.contains("faster target paces"));
        assert!(response
            .new_badges
            .iter()
            .any(|badge| badge.id == "speed_demon"));

        // The effective Tuesday pace now carries the boost suffix
        let tuesday = response
            .view
            .week
            .activities
            .iter()
            .find(|a| a.key.to_string() == "w1_Tue")
            .unwrap();
        assert!(tuesday.effective_pace.as_deref().unwrap().contains("faster"));
    }

    #[tokio::test]
    async fn test_log_run_tough_returns_recovery_note() {
        let (routes, _database) = test_setup().await;

        let response = routes
            .log_run(LogRunRequest {
                key: "w1_Tue".to_string(),
                distance: "2.5K".to_string(),
                pace: "8:00/km".to_string(),
                feeling: "tough".to_string(),
                notes: None,
            })
            .await
            .unwrap();

        assert!(response.pace_note.unwrap().contains("easier target paces"));
    }

    #[tokio::test]
    async fn test_malformed_key_is_a_validation_error() {
        let (routes, _database) = test_setup().await;

        let err = routes
            .toggle_activity(ToggleRequest {
                key: "week-one-monday".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn test_extra_workout_lands_in_the_current_week() {
        let (routes, _database) = test_setup().await;

        routes
            .change_week(ChangeWeekRequest { delta: 1 })
            .await
            .unwrap();
        let response = routes
            .add_extra_workout(ExtraWorkoutRequest {
                category: "Swimming".to_string(),
                xp: 10,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(response.view.state.extra_workouts[0].week, 2);
        assert_eq!(response.view.state.total_xp, 10);
    }

    #[tokio::test]
    async fn test_week_view_for_rejects_out_of_program_weeks() {
        let (routes, _database) = test_setup().await;

        assert!(routes.week_view_for(0).await.is_err());
        assert!(routes.week_view_for(19).await.is_err());
        assert!(routes.week_view_for(18).await.is_ok());
    }

    #[tokio::test]
    async fn test_badges_endpoint_lists_all_badges() {
        let (routes, _database) = test_setup().await;

        let response = routes.badges().await.unwrap();
        assert_eq!(response.badges.len(), 6);
        assert_eq!(response.earned_count, 0);
        assert!(response.badges.iter().all(|badge| !badge.earned));

        routes
            .log_run(LogRunRequest {
                key: "w1_Sat".to_string(),
                distance: "5K".to_string(),
                pace: "6:55/km".to_string(),
                feeling: "great".to_string(),
                notes: None,
            })
            .await
            .unwrap();

        let response = routes.badges().await.unwrap();
        assert_eq!(response.earned_count, 1);
        assert!(response
            .badges
            .iter()
            .any(|badge| badge.id == "speed_demon" && badge.earned));
    }

    #[tokio::test]
    async fn test_mutations_persist_to_the_store() {
        let (routes, database) = test_setup().await;

        routes
            .toggle_activity(ToggleRequest {
                key: "w1_Mon".to_string(),
            })
            .await
            .unwrap();

        let persisted = database.load().await.unwrap();
        assert_eq!(persisted.total_xp, 10);
        assert!(persisted.is_completed(&ActivityKey::new(1, crate::models::Weekday::Mon)));
    }
}
