// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Warp server wiring for the tracker command surface

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use warp::Filter;

use crate::constants::routes;
use crate::database::{Database, StateStore};
use crate::engine::ProgressionEngine;
use crate::errors::{ErrorResponse, TrackerError};
use crate::health::{self, HealthChecker};
use crate::logging::AppLogger;
use crate::plan::PlanCatalog;
use crate::routes::{
    ChangeWeekRequest, ExtraWorkoutRequest, LogRunRequest, ToggleRequest, TrackerRoutes,
};

/// The single-user tracker server
pub struct TrackerServer {
    tracker_routes: TrackerRoutes,
    database: Database,
}

impl TrackerServer {
    /// Load the persisted state and assemble the command surface
    pub async fn new(database: Database) -> Result<Self> {
        let state = database.load().await?;
        info!(
            "Loaded tracker state: week {}, {} XP, {} badges",
            state.current_week,
            state.total_xp,
            state.badges.len()
        );

        let engine = ProgressionEngine::new(PlanCatalog::standard());
        let tracker_routes = TrackerRoutes::new(engine, state, Arc::new(database.clone()));

        Ok(Self {
            tracker_routes,
            database,
        })
    }

    /// Serve the HTTP surface until shutdown
    pub async fn run(self, port: u16) -> Result<()> {
        info!("Quest tracker server starting on port {}", port);

        let tracker_routes = self.tracker_routes;
        let health_checker = HealthChecker::new(self.database.clone());
        let health_routes = health::middleware::routes(health_checker);

        // CORS configuration
        let cors = warp::cors()
            .allow_any_origin()
            .allow_headers(vec!["content-type"])
            .allow_methods(vec!["GET", "POST", "OPTIONS"]);

        // Current week view
        let week = warp::path(routes::WEEK)
            .and(warp::path::end())
            .and(warp::get())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move || {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.week_view().await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Arbitrary week view, read-only
        let week_for = warp::path(routes::WEEK)
            .and(warp::path::param::<u32>())
            .and(warp::path::end())
            .and(warp::get())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move |week: u32| {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.week_view_for(week).await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Week pointer moves
        let week_change = warp::path(routes::WEEK)
            .and(warp::path(routes::CHANGE))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move |request: ChangeWeekRequest| {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.change_week(request).await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Raw state snapshot
        let state = warp::path(routes::STATE)
            .and(warp::path::end())
            .and(warp::get())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move || {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.state_snapshot().await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Badge collection
        let badges = warp::path(routes::BADGES)
            .and(warp::path::end())
            .and(warp::get())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move || {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.badges().await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Completion toggles
        let toggle = warp::path(routes::ACTIVITIES)
            .and(warp::path(routes::TOGGLE))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move |request: ToggleRequest| {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.toggle_activity(request).await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Run logging
        let run_log = warp::path(routes::RUNS)
            .and(warp::path(routes::LOG))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move |request: LogRunRequest| {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.log_run(request).await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        // Extra workouts
        let extra_workout = warp::path(routes::WORKOUTS)
            .and(warp::path(routes::EXTRA))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and_then({
                let tracker_routes = tracker_routes.clone();
                move |request: ExtraWorkoutRequest| {
                    let tracker_routes = tracker_routes.clone();
                    async move {
                        match tracker_routes.add_extra_workout(request).await {
                            Ok(response) => Ok(warp::reply::json(&response)),
                            Err(e) => Err(tracker_rejection(&e)),
                        }
                    }
                }
            });

        let request_log = warp::log::custom(|log_info| {
            AppLogger::log_api_request(
                log_info.method().as_str(),
                log_info.path(),
                log_info.status().as_u16(),
                log_info.elapsed().as_millis() as u64,
            );
        });

        let api = week
            .or(week_for)
            .or(week_change)
            .or(state)
            .or(badges)
            .or(toggle)
            .or(run_log)
            .or(extra_workout)
            .or(health_routes)
            .with(cors)
            .recover(handle_rejection)
            .with(request_log);

        info!("HTTP server ready on port {}", port);
        warp::serve(api).run(([127, 0, 0, 1], port)).await;

        Ok(())
    }
}

/// HTTP API error wrapper carrying the mapped status code
#[derive(Debug)]
struct ApiError {
    status: warp::http::StatusCode,
    body: ErrorResponse,
}

impl warp::reject::Reject for ApiError {}

fn tracker_rejection(error: &TrackerError) -> warp::Rejection {
    let status = match error.http_status() {
        400 => warp::http::StatusCode::BAD_REQUEST,
        _ => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
    };
    warp::reject::custom(ApiError {
        status,
        body: error.to_response(),
    })
}

/// Handle HTTP rejections and errors
async fn handle_rejection(
    err: warp::Rejection,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        let json = warp::reply::json(&api_error.body);
        Ok(warp::reply::with_status(json, api_error.status))
    } else if err.is_not_found() {
        let json = warp::reply::json(&serde_json::json!({
            "error": "not_found",
            "message": "The requested endpoint was not found"
        }));
        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::NOT_FOUND,
        ))
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        let json = warp::reply::json(&serde_json::json!({
            "error": "validation_error",
            "message": "Malformed request body"
        }));
        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::BAD_REQUEST,
        ))
    } else {
        let json = warp::reply::json(&serde_json::json!({
            "error": "internal_error",
            "message": "Something went wrong"
        }));
        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}
