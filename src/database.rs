// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Module
//!
//! SQLite-backed persistence of the tracker state. The whole state loads
//! in one call and saves in one call; a save replaces every table inside
//! a single transaction so the store always holds one coherent snapshot.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::errors::{TrackerError, TrackerResult};
use crate::models::{ActivityKey, Badge, ExtraWorkout, Feeling, RunLog, TrackerState};

/// Durable storage for the tracker state
///
/// The engine works purely in memory; callers load once at startup and
/// save after every successful transition.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state, or a fresh default when none exists
    async fn load(&self) -> TrackerResult<TrackerState>;

    /// Replace the persisted state with `state`
    async fn save(&self, state: &TrackerState) -> TrackerResult<()>;
}

/// SQLite database for tracker state storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database at `database_url`, creating file and schema as needed
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create the database file if it doesn't exist
        let connect_url = if database_url.starts_with("sqlite:") {
            ensure_sqlite_dir(database_url)?;
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connect_url)
            .await
            .with_context(|| format!("failed to open database at {database_url}"))?;

        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// Cheap connectivity probe for health checks
    pub async fn ping(&self) -> TrackerResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracker_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                total_xp INTEGER NOT NULL DEFAULT 0,
                current_week INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS completions (
                activity_key TEXT PRIMARY KEY,
                completed BOOLEAN NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS run_logs (
                activity_key TEXT PRIMARY KEY,
                distance TEXT NOT NULL,
                pace TEXT NOT NULL,
                feeling TEXT NOT NULL,
                notes TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS extra_workouts (
                id INTEGER PRIMARY KEY,
                week INTEGER NOT NULL,
                category TEXT NOT NULL,
                xp INTEGER NOT NULL,
                notes TEXT,
                logged_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pace_adjustments (
                activity_key TEXT PRIMARY KEY,
                level INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS badges (
                badge_id TEXT PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for Database {
    async fn load(&self) -> TrackerResult<TrackerState> {
        let meta = sqlx::query("SELECT total_xp, current_week FROM tracker_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        let Some(meta) = meta else {
            return Ok(TrackerState::default());
        };

        let mut state = TrackerState::default();
        state.total_xp = read_u32(&meta, "total_xp")?;
        state.current_week = read_u32(&meta, "current_week")?;

        let rows = sqlx::query("SELECT activity_key, completed FROM completions")
            .fetch_all(&self.pool)
            .await?;
        for row in &rows {
            let key = read_activity_key(row)?;
            let completed: bool = row.try_get("completed")?;
            state.completed.insert(key, completed);
        }

        let rows = sqlx::query("SELECT activity_key, distance, pace, feeling, notes FROM run_logs")
            .fetch_all(&self.pool)
            .await?;
        for row in &rows {
            let key = read_activity_key(row)?;
            state.run_logs.insert(key, row_to_run_log(row)?);
        }

        let rows = sqlx::query(
            "SELECT id, week, category, xp, notes, logged_at FROM extra_workouts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            state.extra_workouts.push(row_to_extra_workout(row)?);
        }

        let rows = sqlx::query("SELECT activity_key, level FROM pace_adjustments")
            .fetch_all(&self.pool)
            .await?;
        for row in &rows {
            let key = read_activity_key(row)?;
            let level: i64 = row.try_get("level")?;
            let level = i32::try_from(level).map_err(|_| {
                TrackerError::state(format!("pace adjustment level {level} out of range"))
            })?;
            state.pace_adjustments.insert(key, level);
        }

        let rows = sqlx::query("SELECT badge_id FROM badges")
            .fetch_all(&self.pool)
            .await?;
        for row in &rows {
            let raw: String = row.try_get("badge_id")?;
            let badge = Badge::from_id(&raw)
                .ok_or_else(|| TrackerError::state(format!("unknown badge id {raw:?}")))?;
            state.badges.insert(badge);
        }

        Ok(state)
    }

    async fn save(&self, state: &TrackerState) -> TrackerResult<()> {
        let mut tx = self.pool.begin().await?;

        // Full replace: the snapshot is small and always complete
        sqlx::query("DELETE FROM tracker_meta").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM completions").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM run_logs").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM extra_workouts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM pace_adjustments").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM badges").execute(&mut *tx).await?;

        sqlx::query("INSERT INTO tracker_meta (id, total_xp, current_week) VALUES (1, ?1, ?2)")
            .bind(i64::from(state.total_xp))
            .bind(i64::from(state.current_week))
            .execute(&mut *tx)
            .await?;

        for (key, completed) in &state.completed {
            sqlx::query("INSERT INTO completions (activity_key, completed) VALUES (?1, ?2)")
                .bind(key.to_string())
                .bind(*completed)
                .execute(&mut *tx)
                .await?;
        }

        for (key, log) in &state.run_logs {
            sqlx::query(
                "INSERT INTO run_logs (activity_key, distance, pace, feeling, notes) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(key.to_string())
            .bind(&log.distance)
            .bind(&log.pace)
            .bind(log.feeling.as_str())
            .bind(&log.notes)
            .execute(&mut *tx)
            .await?;
        }

        for workout in &state.extra_workouts {
            sqlx::query(
                "INSERT INTO extra_workouts (id, week, category, xp, notes, logged_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(i64::from(workout.id))
            .bind(i64::from(workout.week))
            .bind(&workout.category)
            .bind(i64::from(workout.xp))
            .bind(&workout.notes)
            .bind(workout.logged_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for (key, level) in &state.pace_adjustments {
            sqlx::query("INSERT INTO pace_adjustments (activity_key, level) VALUES (?1, ?2)")
                .bind(key.to_string())
                .bind(i64::from(*level))
                .execute(&mut *tx)
                .await?;
        }

        for badge in &state.badges {
            sqlx::query("INSERT INTO badges (badge_id) VALUES (?1)")
                .bind(badge.id())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Make sure the directory holding a sqlite database file exists
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(raw_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let raw_path = raw_path.trim_start_matches("//");
    if raw_path.is_empty() || raw_path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(raw_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

fn read_u32(row: &SqliteRow, column: &str) -> TrackerResult<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| TrackerError::state(format!("column {column} holds out-of-range value {value}")))
}

fn read_activity_key(row: &SqliteRow) -> TrackerResult<ActivityKey> {
    let raw: String = row.try_get("activity_key")?;
    raw.parse::<ActivityKey>()
        .map_err(|_| TrackerError::state(format!("malformed activity key {raw:?} in store")))
}

fn row_to_run_log(row: &SqliteRow) -> TrackerResult<RunLog> {
    let feeling_raw: String = row.try_get("feeling")?;
    let feeling = feeling_raw
        .parse::<Feeling>()
        .map_err(|_| TrackerError::state(format!("unknown feeling {feeling_raw:?} in run log")))?;
    Ok(RunLog {
        distance: row.try_get("distance")?,
        pace: row.try_get("pace")?,
        feeling,
        notes: row.try_get("notes")?,
    })
}

fn row_to_extra_workout(row: &SqliteRow) -> TrackerResult<ExtraWorkout> {
    let logged_at_raw: String = row.try_get("logged_at")?;
    let logged_at = DateTime::parse_from_rfc3339(&logged_at_raw)
        .map_err(|_| {
            TrackerError::state(format!("bad timestamp {logged_at_raw:?} on extra workout"))
        })?
        .with_timezone(&Utc);
    Ok(ExtraWorkout {
        id: read_u32(row, "id")?,
        week: read_u32(row, "week")?,
        category: row.try_get("category")?,
        xp: read_u32(row, "xp")?,
        notes: row.try_get("notes")?,
        logged_at,
    })
}
