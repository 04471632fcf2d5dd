// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy HTTP server built on axum.
//!
//! Binds to loopback by default and serves the OpenAI-compatible surface
//! plus health, stats, and reload endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use clawrouter_core::RouterError;

use crate::handlers;
use crate::state::GatewayState;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
        }
    }
}

/// Assemble the route table over the shared state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/stats", get(handlers::get_stats))
        .route("/v1/models", get(handlers::get_models))
        .route("/v1/chat/completions", post(handlers::post_chat))
        .route("/reload", post(handlers::post_reload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the cancellation token fires.
///
/// Bind failures surface as [`RouterError::Bind`] so the binary can exit
/// with the right code.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), RouterError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RouterError::Bind {
            addr: addr.clone(),
            message: e.to_string(),
        })?;

    let local = listener
        .local_addr()
        .map_err(|e| RouterError::Internal(format!("failed to read local address: {e}")))?;

    info!(addr = %local, "proxy listening");
    state.telemetry.on_ready(&local.to_string());

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RouterError::Internal(format!("server error: {e}")))?;

    info!("proxy shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::{ChatClassifierUpstream, UpstreamClient};
    use crate::state::RouterStats;
    use crate::testing::{RecordingTelemetry, StaticResolver, TelemetryEvent};
    use clawrouter_catalog::ModelCatalog;
    use clawrouter_classifier::{ScoringConfig, TtlCache};
    use clawrouter_router::ModelRouter;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Instant;

    fn test_state(telemetry: Arc<RecordingTelemetry>) -> GatewayState {
        let catalog = Arc::new(ModelCatalog::builtin());
        let resolver = Arc::new(StaticResolver::with_token("tok"));
        let upstream = UpstreamClient::new(HashMap::new()).unwrap();
        let classifier_upstream = Arc::new(ChatClassifierUpstream::new(
            upstream.clone(),
            resolver.clone(),
            catalog.clone(),
        ));
        GatewayState {
            router: Arc::new(ModelRouter::new(
                ScoringConfig::builtin(),
                catalog.clone(),
                classifier_upstream,
                Arc::new(TtlCache::default()),
            )),
            catalog,
            upstream,
            credentials: resolver,
            telemetry,
            stats: Arc::new(RouterStats::default()),
            started_at: Instant::now(),
            wallet: "0xc0ffee".to_string(),
        }
    }

    #[tokio::test]
    async fn bind_failure_is_reported_as_bind_error() {
        let telemetry = Arc::new(RecordingTelemetry::default());
        // Hold the port so the server cannot bind it.
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
        };

        let err = start_server(&config, test_state(telemetry), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Bind { .. }));
    }

    #[tokio::test]
    async fn cancellation_shuts_the_server_down_and_fires_ready_first() {
        let telemetry = Arc::new(RecordingTelemetry::default());
        let cancel = CancellationToken::new();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let handle = {
            let telemetry = telemetry.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                start_server(&config, test_state(telemetry), cancel).await
            })
        };

        // Wait for the ready event, then cancel.
        for _ in 0..50 {
            if !telemetry.events().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(matches!(
            telemetry.events().first(),
            Some(TelemetryEvent::Ready(_))
        ));

        cancel.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("server must stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }
}
