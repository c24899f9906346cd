// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Health check endpoints and monitoring utilities

use crate::constants::protocol;
use crate::database::{Database, StateStore};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Overall health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Service information
    pub service: ServiceInfo,
    /// Individual component checks
    pub checks: Vec<ComponentHealth>,
    /// Response timestamp
    pub timestamp: u64,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Service information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Service uptime in seconds
    pub uptime_seconds: u64,
}

/// Individual component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Status description
    pub message: String,
    /// Check duration in milliseconds
    pub duration_ms: u64,
    /// Additional metadata
    pub metadata: Option<serde_json::Value>,
}

/// Health checker for the quest tracker server
pub struct HealthChecker {
    /// Service start time
    start_time: Instant,
    /// Database reference
    database: Database,
    /// Cached health status
    cached_status: RwLock<Option<(HealthResponse, Instant)>>,
    /// Cache TTL
    cache_ttl: Duration,
}

impl HealthChecker {
    /// Create a new health checker
    pub fn new(database: Database) -> Self {
        Self {
            start_time: Instant::now(),
            database,
            cached_status: RwLock::new(None),
            cache_ttl: Duration::from_secs(30),
        }
    }

    /// Perform a basic health check (fast, suitable for load balancer probes)
    pub async fn basic_health(&self) -> HealthResponse {
        let start = Instant::now();

        let checks = vec![ComponentHealth {
            name: "service".to_string(),
            status: HealthStatus::Healthy,
            message: "Service is running".to_string(),
            duration_ms: 0,
            metadata: None,
        }];

        HealthResponse {
            status: HealthStatus::Healthy,
            service: self.service_info(),
            checks,
            timestamp: unix_timestamp(),
            response_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Perform a comprehensive health check with all components
    pub async fn comprehensive_health(&self) -> HealthResponse {
        let start = Instant::now();

        // Check cache first
        {
            let cached = self.cached_status.read().await;
            if let Some((response, cached_at)) = cached.as_ref() {
                if cached_at.elapsed() < self.cache_ttl {
                    return response.clone();
                }
            }
        }

        info!("Performing comprehensive health check");

        let checks = vec![self.check_database().await, self.check_state_snapshot().await];

        // Determine overall status
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let response = HealthResponse {
            status: overall_status,
            service: self.service_info(),
            checks,
            timestamp: unix_timestamp(),
            response_time_ms: start.elapsed().as_millis() as u64,
        };

        // Cache the response
        {
            let mut cached = self.cached_status.write().await;
            *cached = Some((response.clone(), Instant::now()));
        }

        response
    }

    /// Get readiness status (for Kubernetes readiness probes)
    pub async fn readiness(&self) -> HealthResponse {
        // Ready means the store behind every command is reachable
        let mut response = self.basic_health().await;

        let db_check = self.check_database().await;
        response.status = if db_check.status == HealthStatus::Healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        response.checks.push(db_check);

        response
    }

    /// Get liveness status (for Kubernetes liveness probes)
    pub async fn liveness(&self) -> HealthResponse {
        self.basic_health().await
    }

    /// Check database connectivity and responsiveness
    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();

        match self.database.ping().await {
            Ok(()) => ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Healthy,
                message: "Database is accessible and responsive".to_string(),
                duration_ms: start.elapsed().as_millis() as u64,
                metadata: Some(serde_json::json!({
                    "type": "sqlite",
                    "query_duration_ms": start.elapsed().as_millis() as u64
                })),
            },
            Err(e) => {
                error!("Database health check failed: {}", e);
                ComponentHealth {
                    name: "database".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: format!("Database check failed: {e}"),
                    duration_ms: start.elapsed().as_millis() as u64,
                    metadata: None,
                }
            }
        }
    }

    /// Check that the persisted tracker snapshot still decodes
    async fn check_state_snapshot(&self) -> ComponentHealth {
        let start = Instant::now();

        match self.database.load().await {
            Ok(state) => ComponentHealth {
                name: "state".to_string(),
                status: HealthStatus::Healthy,
                message: "Tracker state snapshot decodes cleanly".to_string(),
                duration_ms: start.elapsed().as_millis() as u64,
                metadata: Some(serde_json::json!({
                    "current_week": state.current_week,
                    "total_xp": state.total_xp,
                    "badges": state.badges.len()
                })),
            },
            Err(e) => {
                error!("State snapshot check failed: {}", e);
                ComponentHealth {
                    name: "state".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: format!("State snapshot check failed: {e}"),
                    duration_ms: start.elapsed().as_millis() as u64,
                    metadata: None,
                }
            }
        }
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            name: protocol::server_name(),
            version: protocol::SERVER_VERSION.to_string(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Health check middleware for HTTP endpoints
pub mod middleware {
    use super::*;
    use crate::constants::routes;
    use warp::{Filter, Reply};

    /// Create health check routes
    pub fn routes(
        health_checker: HealthChecker,
    ) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        let health_checker = std::sync::Arc::new(health_checker);

        let health = warp::path(routes::HEALTH)
            .and(warp::get())
            .and(with_health_checker(health_checker.clone()))
            .and_then(health_handler);

        let ready = warp::path("ready")
            .and(warp::get())
            .and(with_health_checker(health_checker.clone()))
            .and_then(readiness_handler);

        let live = warp::path("live")
            .and(warp::get())
            .and(with_health_checker(health_checker))
            .and_then(liveness_handler);

        health.or(ready).or(live)
    }

    fn with_health_checker(
        health_checker: std::sync::Arc<HealthChecker>,
    ) -> impl Filter<Extract = (std::sync::Arc<HealthChecker>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || health_checker.clone())
    }

    async fn health_handler(
        health_checker: std::sync::Arc<HealthChecker>,
    ) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.comprehensive_health().await;
        let status_code = match response.status {
            // Degraded still serves traffic
            HealthStatus::Healthy | HealthStatus::Degraded => warp::http::StatusCode::OK,
            HealthStatus::Unhealthy => warp::http::StatusCode::SERVICE_UNAVAILABLE,
        };

        Ok(warp::reply::with_status(
            warp::reply::json(&response),
            status_code,
        ))
    }

    async fn readiness_handler(
        health_checker: std::sync::Arc<HealthChecker>,
    ) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.readiness().await;
        let status_code = match response.status {
            HealthStatus::Healthy => warp::http::StatusCode::OK,
            _ => warp::http::StatusCode::SERVICE_UNAVAILABLE,
        };

        Ok(warp::reply::with_status(
            warp::reply::json(&response),
            status_code,
        ))
    }

    async fn liveness_handler(
        health_checker: std::sync::Arc<HealthChecker>,
    ) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.liveness().await;
        Ok(warp::reply::json(&response))
    }
}
