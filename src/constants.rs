// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

use std::env;

/// Protocol-related constants - these can be overridden via environment variables
pub mod protocol {
    use std::env;

    /// Get server name from environment or default
    pub fn server_name() -> String {
        env::var("SERVER_NAME").unwrap_or_else(|_| "quest-tracker-server".to_string())
    }

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

    // For backward compatibility and performance, provide a const version with the default
    pub const SERVER_NAME: &str = "quest-tracker-server";
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    /// Get database URL from environment or default
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/quest.db".to_string())
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

/// Training-program limits and progression thresholds
pub mod limits {
    /// First week of the program
    pub const FIRST_WEEK: u32 = 1;

    /// The program's fixed horizon in weeks
    pub const PROGRAM_WEEKS: u32 = 18;

    /// One pace-adjustment step in seconds per kilometer
    pub const SECONDS_PER_ADJUSTMENT_STEP: u32 = 15;

    /// How many calendar weeks a pace adjustment propagates forward
    pub const ADJUSTMENT_LOOKAHEAD_WEEKS: u32 = 2;

    /// Flat bonus shown when every planned activity of a week is done
    pub const CONSISTENCY_BONUS_XP: u32 = 50;

    /// Extra workouts needed to unlock the extra-mile badge
    pub const EXTRA_MILE_THRESHOLD: usize = 5;

    /// Accepted XP values for ad hoc extra workouts
    pub const EXTRA_WORKOUT_XP_VALUES: [u32; 5] = [5, 10, 15, 20, 25];
}

/// HTTP routes and paths
pub mod routes {
    /// Plan and state routes
    pub const WEEK: &str = "week";
    pub const STATE: &str = "state";
    pub const BADGES: &str = "badges";

    /// Mutating command routes
    pub const ACTIVITIES: &str = "activities";
    pub const TOGGLE: &str = "toggle";
    pub const RUNS: &str = "runs";
    pub const LOG: &str = "log";
    pub const WORKOUTS: &str = "workouts";
    pub const EXTRA: &str = "extra";
    pub const CHANGE: &str = "change";

    /// Health check
    pub const HEALTH: &str = "health";
}

/// User and application defaults
pub mod defaults {
    /// Default database location
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/quest.db";

    /// The headline goal shown under every week
    pub const GOAL_TEXT: &str = "Complete 10K on November 30th in under 60 minutes!";
}

/// User-facing messages
pub mod messages {
    /// Run logging messages
    pub const MISSING_RUN_FIELDS: &str = "Please fill in distance, pace, and feeling!";
    pub const FASTER_PACE_HINT: &str =
        "Since you felt great, your next few runs will have slightly faster target paces to challenge you more!";
    pub const EASIER_PACE_HINT: &str =
        "You pushed through a tough one! Your next few runs will have easier target paces to help you recover and build back up.";

    /// Extra workout messages
    pub const INVALID_EXTRA_XP: &str = "Extra workout XP must be one of 5, 10, 15, 20 or 25";

    /// Weekly summary messages
    pub const WEEK_COMPLETE: &str = "WEEK COMPLETE! +50 Consistency Bonus!";
}
