use anyhow::{Context, Result};
use axum::{Json, Router, routing::get};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::SERVICE_NAME;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            service: SERVICE_NAME,
        }
    }
}

pub async fn health() -> Json<HealthStatus> {
    tracing::debug!("service is healthy");
    Json(HealthStatus::now())
}

pub fn build_routes() -> Router {
    Router::new().route("/api/health", get(health))
}

pub async fn listen(bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!("Listening at {}", listener.local_addr()?);
    tokio::select! {
        r = axum::serve(listener, build_routes()) => {
            tracing::warn!("server ended unexpectedly: {:?}", &r)
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl+c interrupt, closing server");
        }
    }
    Ok(())
}
