//! Liveness and readiness, mounted at the root rather than under `/api`.
//!
//! `/health` always answers 200 with a report; `/health/ready` answers 503
//! while the database is unreachable or the gateway refuses every webhook,
//! so a load balancer keeps traffic away from an instance that cannot take
//! payments.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use coursemart_payments::WebhookPolicy;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub payments: PaymentsHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct PaymentsHealth {
    pub provider: &'static str,
    pub webhooks: WebhookPolicy,
}

impl HealthReport {
    fn ready(&self) -> bool {
        self.database.reachable && self.payments.webhooks != WebhookPolicy::Closed
    }
}

async fn collect(state: &AppState) -> HealthReport {
    let started = Instant::now();
    let reachable = match coursemart_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };
    let database = DatabaseHealth {
        reachable,
        latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    let payments = PaymentsHealth {
        provider: state.gateway.provider(),
        webhooks: state.gateway.webhook_policy(),
    };

    let mut report = HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
        payments,
    };
    if !report.ready() {
        report.status = "degraded";
    }
    report
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(collect(&state).await)
}

/// GET /health/ready
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = collect(&state).await;
    let code = if report.ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}
