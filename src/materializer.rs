// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Plan Materializer
//!
//! Pure computation of a week's *effective* plan: the authored plan with
//! every outstanding pace adjustment folded into the displayed target pace.
//! The output is fully determined by (week, catalog, adjustments), so
//! re-rendering the same state always produces the same view. The numeric
//! adjustment level is the source of truth; the formatted pace string is
//! never parsed back.

use std::collections::HashMap;

use serde::Serialize;

use crate::constants::limits;
use crate::models::{Activity, ActivityKey};
use crate::plan::PlanCatalog;

/// Direction of an applied pace adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Faster,
    Easier,
}

/// A pace adjustment as applied to one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedAdjustment {
    /// Signed adjustment level; each step is 15 sec/km
    pub level: i32,
    /// Faster for positive levels, easier for negative
    pub direction: AdjustmentDirection,
    /// Magnitude in seconds per kilometer
    pub seconds_per_km: u32,
}

impl AppliedAdjustment {
    fn from_level(level: i32) -> Self {
        let direction = if level > 0 {
            AdjustmentDirection::Faster
        } else {
            AdjustmentDirection::Easier
        };
        Self {
            level,
            direction,
            seconds_per_km: level.unsigned_abs() * limits::SECONDS_PER_ADJUSTMENT_STEP,
        }
    }
}

/// One activity of the effective plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveActivity {
    /// Key the presentation layer uses for commands against this entry
    pub key: ActivityKey,
    /// The authored activity, unchanged
    #[serde(flatten)]
    pub activity: Activity,
    /// Target pace with any adjustment folded in; None for non-run entries
    pub effective_pace: Option<String>,
    /// The adjustment applied to this entry, if any
    pub adjustment: Option<AppliedAdjustment>,
}

/// A week's plan with adjustments applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveWeek {
    /// The requested week number (kept even when content fell back to week 1)
    pub week: u32,
    pub title: String,
    pub playlist: String,
    pub total_distance: String,
    pub activities: Vec<EffectiveActivity>,
}

/// Compute the effective plan for `week`
///
/// Pure function over (week, catalog, adjustments). Activity keys always
/// carry the requested week number, so commands issued against a
/// fallen-back week still address that week's own completion state.
pub fn materialize(
    week: u32,
    catalog: &PlanCatalog,
    adjustments: &HashMap<ActivityKey, i32>,
) -> EffectiveWeek {
    let plan = catalog.get(week);

    let activities = plan
        .activities
        .iter()
        .map(|activity| {
            let key = ActivityKey::new(week, activity.day);
            let level = adjustments.get(&key).copied().unwrap_or(0);

            let (effective_pace, adjustment) = match activity.base_pace() {
                Some(base) if level != 0 => (
                    Some(format_adjusted_pace(base, level)),
                    Some(AppliedAdjustment::from_level(level)),
                ),
                Some(base) => (Some(base.to_string()), None),
                None => (None, None),
            };

            EffectiveActivity {
                key,
                activity: activity.clone(),
                effective_pace,
                adjustment,
            }
        })
        .collect();

    EffectiveWeek {
        week,
        title: plan.title.clone(),
        playlist: plan.playlist.clone(),
        total_distance: plan.total_distance.clone(),
        activities,
    }
}

/// Render a base pace with an adjustment suffix
fn format_adjusted_pace(base: &str, level: i32) -> String {
    let seconds = level.unsigned_abs() * limits::SECONDS_PER_ADJUSTMENT_STEP;
    if level > 0 {
        format!("{base} ⚡ ({seconds} sec/km faster - you're crushing it!)")
    } else {
        format!("{base} 💙 ({seconds} sec/km easier - smart recovery)")
    }
}
