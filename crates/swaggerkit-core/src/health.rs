//! Health endpoint served next to the Swagger routes
//!
//! Enabled by `features.healthCheckEndpoint`. The endpoint answers
//! `GET /health` with a [`HealthCheckResult`]: `200 OK` while every check is
//! healthy or degraded, `503 Service Unavailable` as soon as one is unhealthy.
//!
//! ```rust,no_run
//! use swaggerkit_core::health::{HealthCheckBuilder, HealthStatus};
//!
//! let health = HealthCheckBuilder::new(true)
//!     .add_check("database", || async { HealthStatus::healthy() })
//!     .version(env!("CARGO_PKG_VERSION"))
//!     .build();
//! ```

use crate::response::{IntoResponse, Json, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Health status of a component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy { reason: String },
    /// Still serving, with reduced quality
    Degraded { reason: String },
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self::Healthy
    }

    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy {
            reason: reason.into(),
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// HTTP status the endpoint answers with
    pub fn status_code(&self) -> StatusCode {
        if self.is_unhealthy() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::OK
        }
    }

    /// Fold a component status into the overall one
    fn combine(self, component: &HealthStatus) -> Self {
        match (&self, component) {
            (Self::Unhealthy { .. }, _) => self,
            (_, Self::Unhealthy { .. }) => Self::unhealthy("one or more checks failed"),
            (Self::Healthy, Self::Degraded { .. }) => Self::degraded("one or more checks degraded"),
            _ => self,
        }
    }
}

/// Body of the health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub checks: BTreeMap<String, HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Seconds since the Unix epoch, with nanosecond precision
    pub timestamp: String,
}

impl IntoResponse for HealthCheckResult {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

/// Async health check function
pub type HealthCheckFn =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = HealthStatus> + Send>> + Send + Sync>;

/// Registered health checks
#[derive(Clone)]
pub struct HealthCheck {
    checks: BTreeMap<String, HealthCheckFn>,
    version: Option<String>,
}

impl HealthCheck {
    /// Run every check, in name order
    pub async fn execute(&self) -> HealthCheckResult {
        let mut overall = HealthStatus::Healthy;
        let mut results = BTreeMap::new();

        for (name, check) in &self.checks {
            let status = check().await;
            overall = overall.combine(&status);
            results.insert(name.clone(), status);
        }

        HealthCheckResult {
            status: overall,
            checks: results,
            version: self.version.clone(),
            timestamp: timestamp(),
        }
    }

    pub fn check_names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        HealthCheckBuilder::default().build()
    }
}

impl fmt::Debug for HealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthCheck")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .field("version", &self.version)
            .finish()
    }
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| format!("{}.{:09}Z", d.as_secs(), d.subsec_nanos()))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Builder for [`HealthCheck`]
pub struct HealthCheckBuilder {
    checks: BTreeMap<String, HealthCheckFn>,
    version: Option<String>,
}

impl HealthCheckBuilder {
    /// `include_default` adds a `self` check that always reports healthy
    pub fn new(include_default: bool) -> Self {
        let mut builder = Self {
            checks: BTreeMap::new(),
            version: None,
        };
        if include_default {
            builder = builder.add_check("self", || async { HealthStatus::healthy() });
        }
        builder
    }

    /// Register a check; a later check with the same name replaces it
    pub fn add_check<F, Fut>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HealthStatus> + Send + 'static,
    {
        let check_fn: HealthCheckFn = Arc::new(move || {
            Box::pin(check()) as Pin<Box<dyn Future<Output = HealthStatus> + Send>>
        });
        self.checks.insert(name.into(), check_fn);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn build(self) -> HealthCheck {
        HealthCheck {
            checks: self.checks,
            version: self.version,
        }
    }
}

impl Default for HealthCheckBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_check_all_healthy() {
        let health = HealthCheckBuilder::new(false)
            .add_check("db", || async { HealthStatus::healthy() })
            .add_check("cache", || async { HealthStatus::healthy() })
            .version("1.0.0")
            .build();

        let result = health.execute().await;

        assert!(result.status.is_healthy());
        assert_eq!(result.checks.len(), 2);
        assert_eq!(result.version.as_deref(), Some("1.0.0"));
        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_check_unhealthy_wins_over_degraded() {
        let health = HealthCheckBuilder::new(false)
            .add_check("a", || async { HealthStatus::unhealthy("connection failed") })
            .add_check("b", || async { HealthStatus::degraded("high latency") })
            .build();

        let result = health.execute().await;

        assert!(result.status.is_unhealthy());
        assert_eq!(result.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_check_degraded_still_serves() {
        let health = HealthCheckBuilder::new(true)
            .add_check("cache", || async { HealthStatus::degraded("high latency") })
            .build();

        let result = health.execute().await;

        assert!(result.status.is_degraded());
        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_check_default_has_self() {
        let health = HealthCheck::default();
        assert_eq!(health.check_names().collect::<Vec<_>>(), vec!["self"]);

        let result = health.execute().await;
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["checks"]["self"], "healthy");
    }
}
