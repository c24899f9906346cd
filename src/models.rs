// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! This module contains the core data structures used throughout the quest
//! tracker. They describe planned activities, logged runs, ad hoc extra
//! workouts, unlockable badges, and the single mutable tracker state that
//! the progression engine operates on.
//!
//! ## Design Principles
//!
//! - **Tagged variants**: each activity category carries exactly the fields
//!   that category needs; there are no optional grab-bag fields
//! - **Stable keys**: an [`ActivityKey`] serializes as `w{week}_{day}` so the
//!   same identifier works for JSON maps and database rows
//! - **Opaque text**: distances and paces are free text by design; the
//!   tracker never interprets them physically
//! - **Serializable**: every model round-trips through serde for the HTTP
//!   surface and persistence
//!
//! ## Core Models
//!
//! - [`Activity`]: one planned entry of a training week
//! - [`RunLog`]: what the runner actually did, with a subjective feeling
//! - [`ExtraWorkout`]: an ad hoc session outside the plan
//! - [`Badge`]: a permanently-unlockable achievement
//! - [`TrackerState`]: the aggregate root persisted as one unit

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::TrackerError;

/// Day labels used by the training plan
///
/// The three-letter form is the wire and storage form; it is also the day
/// half of the `w{week}_{day}` activity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All seven days in plan order
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Three-letter label used on the wire and in activity keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon" => Ok(Weekday::Mon),
            "Tue" => Ok(Weekday::Tue),
            "Wed" => Ok(Weekday::Wed),
            "Thu" => Ok(Weekday::Thu),
            "Fri" => Ok(Weekday::Fri),
            "Sat" => Ok(Weekday::Sat),
            "Sun" => Ok(Weekday::Sun),
            other => Err(TrackerError::validation(format!(
                "unknown day label '{other}'"
            ))),
        }
    }
}

/// Identifier of one planned activity occurrence
///
/// Serializes as the canonical string `w{week}_{day}` (for example `w1_Sat`)
/// so it can key JSON maps and database rows alike. The week is always 1 or
/// greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityKey {
    /// Week number, starting at 1
    pub week: u32,
    /// Day within the week
    pub day: Weekday,
}

impl ActivityKey {
    pub fn new(week: u32, day: Weekday) -> Self {
        Self { week, day }
    }
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}_{}", self.week, self.day)
    }
}

impl FromStr for ActivityKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('w')
            .ok_or_else(|| TrackerError::validation(format!("malformed activity key '{s}'")))?;
        let (week_part, day_part) = rest
            .split_once('_')
            .ok_or_else(|| TrackerError::validation(format!("malformed activity key '{s}'")))?;
        let week: u32 = week_part
            .parse()
            .map_err(|_| TrackerError::validation(format!("malformed activity key '{s}'")))?;
        if week == 0 {
            return Err(TrackerError::validation(format!(
                "activity key '{s}' has week 0; weeks start at 1"
            )));
        }
        let day = day_part.parse()?;
        Ok(ActivityKey { week, day })
    }
}

impl Serialize for ActivityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActivityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How a logged run felt
///
/// Great runs nudge upcoming target paces faster; tough and bad runs nudge
/// them easier. Good and okay leave paces alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Great,
    Good,
    Okay,
    Tough,
    Bad,
}

impl Feeling {
    /// Lowercase wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Great => "great",
            Feeling::Good => "good",
            Feeling::Okay => "okay",
            Feeling::Tough => "tough",
            Feeling::Bad => "bad",
        }
    }

    /// Emoji shown next to a logged run
    pub fn emoji(&self) -> &'static str {
        match self {
            Feeling::Great => "🔥",
            Feeling::Good => "😊",
            Feeling::Okay => "😐",
            Feeling::Tough => "😤",
            Feeling::Bad => "😵",
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feeling {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "great" => Ok(Feeling::Great),
            "good" => Ok(Feeling::Good),
            "okay" => Ok(Feeling::Okay),
            "tough" => Ok(Feeling::Tough),
            "bad" => Ok(Feeling::Bad),
            other => Err(TrackerError::validation(format!(
                "unknown feeling '{other}', expected great/good/okay/tough/bad"
            ))),
        }
    }
}

/// One planned entry of a training week
///
/// # Examples
///
/// ```rust
/// use quest_tracker::models::{Activity, ActivityDetails, Weekday};
///
/// let parkrun = Activity {
///     day: Weekday::Sat,
///     name: "Parkrun 5K".to_string(),
///     xp: 25,
///     details: ActivityDetails::Run {
///         distance: "5K".to_string(),
///         pace: "7:00/km target".to_string(),
///         structure: "Race effort - aim for consistent pace".to_string(),
///     },
/// };
/// assert!(parkrun.is_run_like());
/// assert_eq!(parkrun.base_pace(), Some("7:00/km target"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Day of the week this entry is planned on
    pub day: Weekday,
    /// Human-readable name of the activity
    pub name: String,
    /// Experience points earned on completion
    pub xp: u32,
    /// Category-specific fields
    #[serde(flatten)]
    pub details: ActivityDetails,
}

/// Category-specific fields of a planned activity
///
/// The wire form carries a `category` tag in snake_case, with the variant's
/// fields flattened beside the common activity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ActivityDetails {
    /// A planned run with a target pace
    Run {
        /// Planned distance label, e.g. "5K"
        distance: String,
        /// Base target pace label, e.g. "7:00/km target"
        pace: String,
        /// Session structure notes
        structure: String,
    },
    /// An easy shake-out session, run-like for pace adjustments
    ActiveRecovery {
        distance: String,
        pace: String,
        structure: String,
    },
    /// A strength session
    Strength {
        /// Session focus, e.g. "Foundation"
        focus: String,
        /// Exercise list text
        exercises: String,
    },
    /// A rest day
    Rest,
    /// A yoga or mobility session
    Yoga,
}

impl Activity {
    /// Planned run entry
    pub fn run(
        day: Weekday,
        name: &str,
        xp: u32,
        distance: &str,
        pace: &str,
        structure: &str,
    ) -> Self {
        Self {
            day,
            name: name.to_string(),
            xp,
            details: ActivityDetails::Run {
                distance: distance.to_string(),
                pace: pace.to_string(),
                structure: structure.to_string(),
            },
        }
    }

    /// Planned strength entry
    pub fn strength(day: Weekday, name: &str, xp: u32, focus: &str, exercises: &str) -> Self {
        Self {
            day,
            name: name.to_string(),
            xp,
            details: ActivityDetails::Strength {
                focus: focus.to_string(),
                exercises: exercises.to_string(),
            },
        }
    }

    /// Planned rest entry
    pub fn rest(day: Weekday, name: &str, xp: u32) -> Self {
        Self {
            day,
            name: name.to_string(),
            xp,
            details: ActivityDetails::Rest,
        }
    }

    /// Planned yoga/mobility entry
    pub fn yoga(day: Weekday, name: &str, xp: u32) -> Self {
        Self {
            day,
            name: name.to_string(),
            xp,
            details: ActivityDetails::Yoga,
        }
    }

    /// Whether pace adjustments apply to this activity
    pub fn is_run_like(&self) -> bool {
        matches!(
            self.details,
            ActivityDetails::Run { .. } | ActivityDetails::ActiveRecovery { .. }
        )
    }

    /// Base target pace label, if this activity has one
    pub fn base_pace(&self) -> Option<&str> {
        match &self.details {
            ActivityDetails::Run { pace, .. } | ActivityDetails::ActiveRecovery { pace, .. } => {
                Some(pace)
            }
            _ => None,
        }
    }
}

/// What the runner actually did for one planned run
///
/// Distance and pace are free text; the tracker never validates them
/// physically. Re-logging the same key overwrites the previous entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    /// Distance actually covered, e.g. "5K"
    pub distance: String,
    /// Average pace actually run, e.g. "6:55/km"
    pub pace: String,
    /// Subjective feeling, drives pace adjustments
    pub feeling: Feeling,
    /// Optional free-text notes
    pub notes: Option<String>,
}

/// An ad hoc workout logged outside the plan
///
/// Append-only; entries are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraWorkout {
    /// Sequential id, 1-based
    pub id: u32,
    /// Week the workout belongs to
    pub week: u32,
    /// Free-text category label, e.g. "Swimming"
    pub category: String,
    /// Experience points, one of 5/10/15/20/25
    pub xp: u32,
    /// Optional free-text notes
    pub notes: Option<String>,
    /// When the workout was logged (UTC)
    pub logged_at: DateTime<Utc>,
}

impl ExtraWorkout {
    /// Create a new entry stamped with the current time
    pub fn new(id: u32, week: u32, category: &str, xp: u32, notes: Option<String>) -> Self {
        Self {
            id,
            week,
            category: category.to_string(),
            xp,
            notes,
            logged_at: Utc::now(),
        }
    }
}

/// Unlockable achievement badges
///
/// Badges are append-only: once unlocked they are never revoked. The
/// distance-explorer and adaptive-athlete badges are defined in the catalog
/// of badges but no predicate awards them yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FireStarter,
    ConsistencyKing,
    SpeedDemon,
    ExtraMile,
    DistanceExplorer,
    AdaptiveAthlete,
}

impl Badge {
    /// Every badge the tracker knows about, in display order
    pub const ALL: [Badge; 6] = [
        Badge::FireStarter,
        Badge::ConsistencyKing,
        Badge::SpeedDemon,
        Badge::ExtraMile,
        Badge::DistanceExplorer,
        Badge::AdaptiveAthlete,
    ];

    /// Stable id used on the wire and in storage
    pub fn id(&self) -> &'static str {
        match self {
            Badge::FireStarter => "fire_starter",
            Badge::ConsistencyKing => "consistency_king",
            Badge::SpeedDemon => "speed_demon",
            Badge::ExtraMile => "extra_mile",
            Badge::DistanceExplorer => "distance_explorer",
            Badge::AdaptiveAthlete => "adaptive_athlete",
        }
    }

    /// Display title with the badge's emoji
    pub fn title(&self) -> &'static str {
        match self {
            Badge::FireStarter => "Fire Starter 🔥",
            Badge::ConsistencyKing => "Consistency King 👑",
            Badge::SpeedDemon => "Speed Demon ⚡",
            Badge::ExtraMile => "Extra Mile 🎖️",
            Badge::DistanceExplorer => "Distance Explorer 🧭",
            Badge::AdaptiveAthlete => "Adaptive Athlete 🧠",
        }
    }

    /// Look a badge up by its stable id
    pub fn from_id(id: &str) -> Option<Badge> {
        Badge::ALL.iter().copied().find(|b| b.id() == id)
    }
}

/// The full mutable tracker state, persisted as one unit
///
/// Constructed once at session start (loaded from the store or defaulted),
/// mutated only by the progression engine, and saved after every mutation.
/// A key present in `run_logs` implies `completed` is true for that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Lifetime experience points
    pub total_xp: u32,
    /// Week currently shown, 1 through 18
    pub current_week: u32,
    /// Completion flags per activity key
    pub completed: HashMap<ActivityKey, bool>,
    /// Logged runs per activity key
    pub run_logs: HashMap<ActivityKey, RunLog>,
    /// Ad hoc workouts, append-only in id order
    pub extra_workouts: Vec<ExtraWorkout>,
    /// Outstanding pace adjustments per activity key, in 15 sec/km steps
    pub pace_adjustments: HashMap<ActivityKey, i32>,
    /// Unlocked badges
    pub badges: BTreeSet<Badge>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            total_xp: 0,
            current_week: 1,
            completed: HashMap::new(),
            run_logs: HashMap::new(),
            extra_workouts: Vec::new(),
            pace_adjustments: HashMap::new(),
            badges: BTreeSet::new(),
        }
    }
}

impl TrackerState {
    /// Whether the activity at `key` is marked complete
    pub fn is_completed(&self, key: &ActivityKey) -> bool {
        self.completed.get(key).copied().unwrap_or(false)
    }

    /// Id for the next extra workout (max existing id + 1)
    pub fn next_extra_workout_id(&self) -> u32 {
        self.extra_workouts
            .iter()
            .map(|w| w.id)
            .max()
            .map_or(1, |max| max + 1)
    }
}
