// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Progression Engine
//!
//! The decision core of the tracker. It owns the plan catalog and applies
//! every state transition: completing or un-completing simple activities,
//! logging runs, recording extra workouts, and moving between weeks. Each
//! mutating transition ends with a badge pass, and run logs that felt great
//! or tough propagate pace adjustments onto upcoming run days.
//!
//! Transitions validate first and mutate second; a validation failure
//! leaves the state exactly as it was. Persistence is the caller's job:
//! the engine works purely on the in-memory [`TrackerState`].

use serde::Serialize;

use crate::constants::{limits, messages};
use crate::errors::{TrackerError, TrackerResult};
use crate::models::{
    Activity, ActivityKey, Badge, ExtraWorkout, Feeling, RunLog, TrackerState, Weekday,
};
use crate::plan::PlanCatalog;

/// Run days whose targets speed up after a great run
const FASTER_ROTATION: [Weekday; 4] = [Weekday::Tue, Weekday::Thu, Weekday::Sat, Weekday::Sun];

/// Run days whose targets ease off after a tough or bad run; the Saturday
/// race effort keeps its target either way
const EASIER_ROTATION: [Weekday; 3] = [Weekday::Tue, Weekday::Thu, Weekday::Sun];

/// What a transition did to the state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    /// Signed change to the lifetime XP total
    pub xp_delta: i64,
    /// Badges unlocked by this transition
    pub new_badges: Vec<Badge>,
    /// Future activities whose target pace was adjusted
    pub adjusted: Vec<ActivityKey>,
}

impl TransitionOutcome {
    fn xp_only(xp_delta: i64) -> Self {
        Self {
            xp_delta,
            new_badges: Vec::new(),
            adjusted: Vec::new(),
        }
    }
}

/// Read-only summary of the current week's progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    /// Week the summary covers
    pub week: u32,
    /// Planned activities marked complete
    pub completed_activities: usize,
    /// Planned activities in the week
    pub planned_activities: usize,
    /// XP earned from completed planned activities
    pub planned_xp: u32,
    /// XP earned from this week's extra workouts
    pub extra_xp: u32,
    /// Flat bonus when the whole week is done; display-only
    pub consistency_bonus: u32,
    /// Displayed weekly total: planned + extra + bonus
    pub weekly_xp: u32,
    /// Whether every planned activity is complete
    pub week_complete: bool,
}

/// Applies user actions to the tracker state
pub struct ProgressionEngine {
    catalog: PlanCatalog,
}

impl ProgressionEngine {
    pub fn new(catalog: PlanCatalog) -> Self {
        Self { catalog }
    }

    /// The plan catalog this engine materializes against
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Flip completion of a non-run activity
    ///
    /// Newly completed activities earn their XP; un-completing takes the
    /// same XP back (saturating at zero). Run-like days must go through
    /// [`Self::log_run`] instead.
    pub fn toggle_activity(
        &self,
        state: &mut TrackerState,
        key: ActivityKey,
    ) -> TrackerResult<TransitionOutcome> {
        self.check_week_in_program(key.week)?;

        let activity = self.planned_activity(key)?;
        if activity.is_run_like() {
            return Err(TrackerError::validation(format!(
                "{key} is a run day; log it with distance, pace and feeling"
            )));
        }
        let xp = activity.xp;

        let xp_delta = if state.is_completed(&key) {
            state.completed.insert(key, false);
            state.total_xp = state.total_xp.saturating_sub(xp);
            -i64::from(xp)
        } else {
            state.completed.insert(key, true);
            state.total_xp += xp;
            i64::from(xp)
        };

        let new_badges = self.evaluate_badges(state);
        Ok(TransitionOutcome {
            new_badges,
            ..TransitionOutcome::xp_only(xp_delta)
        })
    }

    /// Record a finished run and propagate pace adjustments
    ///
    /// Overwrites any earlier log for the same key and awards the planned
    /// XP again on re-log; completion is forced on and never toggled off
    /// here. A great run marks upcoming run days one step faster; a tough
    /// or bad run marks them one step easier. Both windows cover the
    /// logging week and the next, skip already-completed targets, stop at
    /// the program horizon, and overwrite any earlier adjustment.
    pub fn log_run(
        &self,
        state: &mut TrackerState,
        key: ActivityKey,
        distance: String,
        pace: String,
        feeling: Feeling,
        notes: Option<String>,
    ) -> TrackerResult<TransitionOutcome> {
        self.check_week_in_program(key.week)?;

        let activity = self.planned_activity(key)?;
        if !activity.is_run_like() {
            return Err(TrackerError::validation(format!(
                "{key} is not a run day; mark it complete instead"
            )));
        }
        if distance.trim().is_empty() {
            return Err(TrackerError::validation("distance is required"));
        }
        if pace.trim().is_empty() {
            return Err(TrackerError::validation("pace is required"));
        }
        let xp = activity.xp;

        state.run_logs.insert(
            key,
            RunLog {
                distance,
                pace,
                feeling,
                notes,
            },
        );
        state.completed.insert(key, true);
        state.total_xp += xp;

        let adjusted = match feeling {
            Feeling::Great => self.propagate_adjustment(state, key.week, &FASTER_ROTATION, 1),
            Feeling::Tough | Feeling::Bad => {
                self.propagate_adjustment(state, key.week, &EASIER_ROTATION, -1)
            }
            Feeling::Good | Feeling::Okay => Vec::new(),
        };

        let new_badges = self.evaluate_badges(state);
        Ok(TransitionOutcome {
            xp_delta: i64::from(xp),
            new_badges,
            adjusted,
        })
    }

    /// Append an ad hoc workout and award its XP
    pub fn add_extra_workout(
        &self,
        state: &mut TrackerState,
        week: u32,
        category: String,
        xp: u32,
        notes: Option<String>,
    ) -> TrackerResult<TransitionOutcome> {
        self.check_week_in_program(week)?;
        if category.trim().is_empty() {
            return Err(TrackerError::validation("workout category is required"));
        }
        if !limits::EXTRA_WORKOUT_XP_VALUES.contains(&xp) {
            return Err(TrackerError::validation(messages::INVALID_EXTRA_XP));
        }

        let id = state.next_extra_workout_id();
        state
            .extra_workouts
            .push(ExtraWorkout::new(id, week, &category, xp, notes));
        state.total_xp += xp;

        let new_badges = self.evaluate_badges(state);
        Ok(TransitionOutcome {
            new_badges,
            ..TransitionOutcome::xp_only(i64::from(xp))
        })
    }

    /// Move the week pointer by `delta`, clamped to the program range
    ///
    /// Badge predicates are re-evaluated against the newly current week,
    /// so arriving at a fully-completed week unlocks its badges.
    pub fn change_week(&self, state: &mut TrackerState, delta: i32) -> TransitionOutcome {
        let target = i64::from(state.current_week) + i64::from(delta);
        let clamped = target.clamp(
            i64::from(limits::FIRST_WEEK),
            i64::from(limits::PROGRAM_WEEKS),
        );
        state.current_week = clamped as u32;

        let new_badges = self.evaluate_badges(state);
        TransitionOutcome {
            new_badges,
            ..TransitionOutcome::xp_only(0)
        }
    }

    /// Run every badge predicate and unlock what newly holds
    ///
    /// Badges are append-only; nothing here ever removes one. Returns the
    /// badges added by this pass. The distance-explorer and
    /// adaptive-athlete badges have no awarding predicate yet.
    pub fn evaluate_badges(&self, state: &mut TrackerState) -> Vec<Badge> {
        let week = state.current_week;
        let plan = self.catalog.get(week);
        let planned = plan.activities.len();
        let completed = plan
            .activities
            .iter()
            .filter(|a| state.is_completed(&ActivityKey::new(week, a.day)))
            .count();
        let week_complete = planned > 0 && completed == planned;
        let any_great_run = state
            .run_logs
            .values()
            .any(|log| log.feeling == Feeling::Great);
        let enough_extras = state.extra_workouts.len() >= limits::EXTRA_MILE_THRESHOLD;

        let earned = [
            (Badge::FireStarter, week == 1 && week_complete),
            (Badge::ConsistencyKing, week_complete),
            (Badge::SpeedDemon, any_great_run),
            (Badge::ExtraMile, enough_extras),
        ];

        let mut unlocked = Vec::new();
        for (badge, holds) in earned {
            if holds && state.badges.insert(badge) {
                unlocked.push(badge);
            }
        }
        unlocked
    }

    /// Compute the current week's displayed XP tally
    ///
    /// The consistency bonus only ever appears here; the lifetime total
    /// accumulates per-activity XP alone.
    pub fn weekly_summary(&self, state: &TrackerState) -> WeeklySummary {
        self.weekly_summary_for(state, state.current_week)
    }

    /// Weekly tally for an arbitrary program week
    pub fn weekly_summary_for(&self, state: &TrackerState, week: u32) -> WeeklySummary {
        let plan = self.catalog.get(week);

        let planned_activities = plan.activities.len();
        let mut completed_activities = 0;
        let mut planned_xp = 0;
        for activity in &plan.activities {
            if state.is_completed(&ActivityKey::new(week, activity.day)) {
                completed_activities += 1;
                planned_xp += activity.xp;
            }
        }

        let extra_xp: u32 = state
            .extra_workouts
            .iter()
            .filter(|w| w.week == week)
            .map(|w| w.xp)
            .sum();

        let week_complete = planned_activities > 0 && completed_activities == planned_activities;
        let consistency_bonus = if week_complete {
            limits::CONSISTENCY_BONUS_XP
        } else {
            0
        };

        WeeklySummary {
            week,
            completed_activities,
            planned_activities,
            planned_xp,
            extra_xp,
            consistency_bonus,
            weekly_xp: planned_xp + extra_xp + consistency_bonus,
            week_complete,
        }
    }

    /// Write `level` onto upcoming run days, two calendar weeks deep
    fn propagate_adjustment(
        &self,
        state: &mut TrackerState,
        from_week: u32,
        rotation: &[Weekday],
        level: i32,
    ) -> Vec<ActivityKey> {
        let mut adjusted = Vec::new();
        for offset in 0..limits::ADJUSTMENT_LOOKAHEAD_WEEKS {
            let week = from_week + offset;
            if week > limits::PROGRAM_WEEKS {
                continue;
            }
            for &day in rotation {
                let target = ActivityKey::new(week, day);
                if state.is_completed(&target) {
                    continue;
                }
                state.pace_adjustments.insert(target, level);
                adjusted.push(target);
            }
        }
        adjusted
    }

    fn check_week_in_program(&self, week: u32) -> TrackerResult<()> {
        if week < limits::FIRST_WEEK || week > limits::PROGRAM_WEEKS {
            return Err(TrackerError::validation(format!(
                "week {week} is outside the {}-week program",
                limits::PROGRAM_WEEKS
            )));
        }
        Ok(())
    }

    fn planned_activity(&self, key: ActivityKey) -> TrackerResult<&Activity> {
        self.catalog
            .get(key.week)
            .activity_on(key.day)
            .ok_or_else(|| TrackerError::validation(format!("no planned activity on {key}")))
    }
}
