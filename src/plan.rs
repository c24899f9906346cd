// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Plan Catalog
//!
//! The immutable 18-week training program. Weeks are authored as static
//! data; any week without authored content falls back to week 1 rather
//! than failing, so the tracker always has something to show.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::models::{Activity, Weekday};

/// One authored week of the training program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedWeek {
    /// Week number within the program
    pub week: u32,
    /// Week headline, e.g. "Getting Started!"
    pub title: String,
    /// Suggested playlist for the week
    pub playlist: String,
    /// Total planned running distance label
    pub total_distance: String,
    /// The week's activities in Mon..Sun order
    pub activities: Vec<Activity>,
}

impl PlannedWeek {
    /// The planned activity on `day`, if the week has one
    pub fn activity_on(&self, day: Weekday) -> Option<&Activity> {
        self.activities.iter().find(|a| a.day == day)
    }

    /// Sum of the week's planned activity XP
    pub fn total_xp(&self) -> u32 {
        self.activities.iter().map(|a| a.xp).sum()
    }
}

/// Read-only mapping from week number to its plan
///
/// Static for the process lifetime. `get` never fails; unauthored weeks
/// resolve to the week 1 plan.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    weeks: BTreeMap<u32, PlannedWeek>,
    fallback: PlannedWeek,
}

impl PlanCatalog {
    /// The standard 10K training program
    pub fn standard() -> Self {
        let week_one = week_one();
        let week_two = week_two();

        let fallback = week_one.clone();
        let mut weeks = BTreeMap::new();
        weeks.insert(week_one.week, week_one);
        weeks.insert(week_two.week, week_two);

        Self { weeks, fallback }
    }

    /// Plan for `week`, falling back to week 1 when unauthored
    pub fn get(&self, week: u32) -> &PlannedWeek {
        self.weeks.get(&week).unwrap_or(&self.fallback)
    }

    /// Whether `week` has its own authored content
    pub fn is_authored(&self, week: u32) -> bool {
        self.weeks.contains_key(&week)
    }

    /// The program's headline goal
    pub fn goal(&self) -> &'static str {
        defaults::GOAL_TEXT
    }
}

fn week_one() -> PlannedWeek {
    PlannedWeek {
        week: 1,
        title: "Getting Started!".to_string(),
        playlist: "Monday Motivation - Epic movie soundtracks".to_string(),
        total_distance: "14K".to_string(),
        activities: vec![
            Activity::rest(Weekday::Mon, "REST or gentle yoga (15 mins)", 10),
            Activity::run(
                Weekday::Tue,
                "Easy run 2.5K",
                10,
                "2.5K",
                "7:30-8:00/km",
                "Easy conversational pace throughout",
            ),
            Activity::strength(
                Weekday::Wed,
                "Strength training (20 mins)",
                15,
                "Foundation",
                "Bodyweight squats (3x12), Push-ups (3x8-12), Plank (3x30sec), \
                 Glute bridges (3x15), Calf raises (3x15)",
            ),
            Activity::run(
                Weekday::Thu,
                "Easy run 3K with pickups",
                15,
                "3K",
                "7:30/km easy + 6:30/km pickups",
                "Warm up 1K easy, then 3 x 30sec at 6:30/km with 90sec recovery",
            ),
            Activity::rest(Weekday::Fri, "REST or yoga (15 mins)", 10),
            Activity::run(
                Weekday::Sat,
                "Parkrun 5K",
                25,
                "5K",
                "7:00/km target",
                "Race effort - aim for consistent pace",
            ),
            Activity::run(
                Weekday::Sun,
                "Easy run 3.5K",
                15,
                "3.5K",
                "7:30-8:00/km",
                "Relaxed long run pace",
            ),
        ],
    }
}

fn week_two() -> PlannedWeek {
    PlannedWeek {
        week: 2,
        title: "Building Confidence".to_string(),
        playlist: "Tuesday Time Travel - Pick your decade!".to_string(),
        total_distance: "15K".to_string(),
        activities: vec![
            Activity::yoga(Weekday::Mon, "Yoga/mobility (15 mins)", 10),
            Activity::run(
                Weekday::Tue,
                "Easy run 3K",
                10,
                "3K",
                "7:30-8:00/km",
                "Steady easy pace throughout",
            ),
            Activity::strength(
                Weekday::Wed,
                "Strength + core (25 mins)",
                15,
                "Building",
                "Squats (3x15), Push-ups (3x10-15), Side plank (3x20sec each), \
                 Single-leg glute bridges (3x10 each)",
            ),
            Activity::run(
                Weekday::Thu,
                "Fartlek 3K",
                15,
                "3K",
                "7:30/km easy + 6:15/km fast",
                "800m warm up, then 4 x (1min fast, 2min easy), cool down",
            ),
            Activity::rest(Weekday::Fri, "REST", 0),
            Activity::run(
                Weekday::Sat,
                "Parkrun 5K",
                25,
                "5K",
                "6:50-7:00/km",
                "Aim to be 10-15 seconds faster than last week",
            ),
            Activity::run(
                Weekday::Sun,
                "Long run 4K",
                20,
                "4K",
                "7:45-8:00/km",
                "Comfortable long run pace",
            ),
        ],
    }
}
