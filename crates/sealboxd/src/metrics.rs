//! Prometheus /metrics + health check HTTP endpoints
//!
//! Endpoints:
//!   GET /metrics  — Prometheus text format
//!   GET /healthz  — Liveness probe (always 200 if process is running)
//!   GET /readyz   — Readiness probe (200 if a master secret is configured)

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use std::sync::Arc;

use sealbox_crypto::{CryptoError, EncryptionService};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ActionLabels {
    action: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct FailureLabels {
    action: String,
    kind: String,
}

/// Request/failure counters, registered once at startup.
pub struct Metrics {
    registry: Registry,
    requests: Family<ActionLabels, Counter>,
    failures: Family<FailureLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let requests = Family::<ActionLabels, Counter>::default();
        let failures = Family::<FailureLabels, Counter>::default();

        registry.register(
            "sealbox_requests",
            "Requests handled, by action",
            requests.clone(),
        );
        registry.register(
            "sealbox_failures",
            "Failed requests, by action and failure kind",
            failures.clone(),
        );

        Self {
            registry,
            requests,
            failures,
        }
    }

    /// Count one handled request; `failure` carries the error when it failed.
    pub fn record(&self, action: &str, failure: Option<&CryptoError>) {
        self.requests
            .get_or_create(&ActionLabels {
                action: action.to_string(),
            })
            .inc();

        if let Some(err) = failure {
            self.failures
                .get_or_create(&FailureLabels {
                    action: action.to_string(),
                    kind: kind_of(err).to_string(),
                })
                .inc();
        }
    }

    pub fn encode_text(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

/// Stable label value per failure kind (error messages carry detail and
/// would explode cardinality).
fn kind_of(err: &CryptoError) -> &'static str {
    match err {
        CryptoError::NotConfigured => "not_configured",
        CryptoError::InvalidRequest(_) => "invalid_request",
        CryptoError::MalformedEnvelope(_) => "malformed_envelope",
        CryptoError::AuthenticationFailed => "authentication_failed",
        CryptoError::PayloadFormat(_) => "payload_format",
        CryptoError::KeyDerivation(_) => "key_derivation",
    }
}

/// Shared state for the metrics/health endpoints
#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub service: Arc<EncryptionService>,
}

/// Serve Prometheus metrics and health endpoints on `addr` (e.g. "127.0.0.1:9100")
pub async fn serve(addr: String, state: HealthState) -> Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("metrics bind {addr}: {e}"))?;

    tracing::info!(addr = %addr, "metrics: listening on /metrics, /healthz, /readyz");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("metrics server: {e}"))
}

async fn metrics_handler(State(state): State<HealthState>) -> impl IntoResponse {
    match state.metrics.encode_text() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!("metrics encode failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Liveness probe: returns 200 if the process is running.
async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe: returns 200 once a master secret is configured.
async fn readyz_handler(State(state): State<HealthState>) -> impl IntoResponse {
    if state.service.status().configured {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "master secret not configured")
    }
}
