//! HTTP surface of the exporter.
//!
//! - `GET /metrics`               process and exporter metrics
//! - `GET /probe?target=<host>`   one device, rendered on demand
//!
//! Each `/probe` request builds its own collector and registry. A failed
//! probe answers that request with a non-200 status and nothing else.
//!
//! Cancellation: when the caller disconnects, axum drops the handler
//! future, which drops the in-flight device request with it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::{
    collector::{ProbeCollector, fetch},
    config::Config,
    error::ProbeError,
    exposition::{self, ProbeRegistry},
    metrics::METRICS,
};

/// Content type of the text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let client = fetch::build_client(&config.device)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProbeParams {
    /// Missing parameter is treated as the empty target
    #[serde(default)]
    pub target: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/probe", get(probe_handler))
        .with_state(state)
}

fn exposition_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response()
}

async fn metrics_handler() -> Result<Response, ProbeError> {
    let body = exposition::render_default().inspect_err(|e| log::error!("{e}"))?;
    Ok(exposition_response(body))
}

async fn probe_handler(
    State(state): State<AppState>,
    Query(params): Query<ProbeParams>,
) -> Result<Response, ProbeError> {
    let target = params.target;
    let started = Instant::now();

    let result = probe(&state, &target).await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    METRICS.observe(outcome, started.elapsed().as_secs_f64());

    match result {
        Ok(body) => Ok(exposition_response(body)),
        Err(e) => {
            log::warn!("Probe of {target:?} failed: {e}");
            Err(e)
        }
    }
}

async fn probe(state: &AppState, target: &str) -> Result<String, ProbeError> {
    if !state.config.target_allowed(target) {
        return Err(ProbeError::Forbidden(target.to_string()));
    }

    let collector = ProbeCollector::new(target, state.client.clone());
    let registry = ProbeRegistry::new(collector.describe())?;
    let snapshot = collector.collect().await?;
    registry.render(&snapshot)
}

/// Bind `cfg.listen` and serve until Ctrl-C or SIGTERM.
///
/// A bind failure is returned to the caller, which exits the process.
pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg.listen.parse()?;
    let state = AppState::new(cfg)?;

    let listener = TcpListener::bind(addr).await?;
    log::info!("Beginning to listen on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}
