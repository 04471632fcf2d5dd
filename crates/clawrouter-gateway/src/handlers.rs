// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the proxy surface.
//!
//! `POST /v1/chat/completions` runs the full pipeline: parse, classify,
//! forward with fallback, stream back. The rest are small read-only
//! endpoints plus the `/reload` cache-invalidation signal.

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use clawrouter_catalog::cost_usd;
use clawrouter_core::{ChatRequest, RouterError, UsageRecord};

use crate::forward::forward_with_fallback;
use crate::state::GatewayState;
use crate::stream::passthrough_with_usage;

/// Response header carrying the JSON routing decision.
pub const DECISION_HEADER: &str = "X-ClawRouter-Decision";

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub wallet: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    id: String,
    object: &'static str,
    owned_by: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    object: &'static str,
    data: Vec<ModelInfo>,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        wallet: state.wallet.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// GET /stats
pub async fn get_stats(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(state.stats.snapshot())
}

/// GET /v1/models — the catalog plus the synthetic `auto`.
pub async fn get_models(State(state): State<GatewayState>) -> Json<ModelsResponse> {
    let mut data: Vec<ModelInfo> = state
        .catalog
        .entries()
        .iter()
        .map(|e| ModelInfo {
            id: e.id.clone(),
            object: "model",
            owned_by: e.provider.to_string(),
        })
        .collect();
    data.push(ModelInfo {
        id: "auto".to_string(),
        object: "model",
        owned_by: "clawrouter".to_string(),
    });
    Json(ModelsResponse {
        object: "list",
        data,
    })
}

/// POST /reload — drop credential and classification caches.
pub async fn post_reload(State(state): State<GatewayState>) -> StatusCode {
    state.credentials.invalidate().await;
    state.router.clear_classification_cache();
    debug!("credential and classification caches invalidated");
    StatusCode::NO_CONTENT
}

/// POST /v1/chat/completions
pub async fn post_chat(State(state): State<GatewayState>, body: Bytes) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    match handle_chat(&state, &request_id, &body).await {
        Ok(response) => response,
        Err(err) => {
            state.stats.record_failure();
            state.telemetry.on_error(&request_id, &err);
            error_response(&err)
        }
    }
}

async fn handle_chat(
    state: &GatewayState,
    request_id: &str,
    body: &Bytes,
) -> Result<Response, RouterError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| RouterError::InvalidRequest(format!("malformed request body: {e}")))?;
    if request.messages.is_empty() {
        return Err(RouterError::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }

    let decision = if request.model == "auto" {
        state.router.route(&request).await
    } else {
        state.router.route_explicit(&request).ok_or_else(|| {
            RouterError::InvalidRequest(format!(
                "unknown model `{}`; send `auto` or a catalog model id",
                request.model
            ))
        })?
    };

    let stream = request.wants_stream();
    let (upstream_response, served_model) = forward_with_fallback(
        &state.upstream,
        &state.catalog,
        state.credentials.as_ref(),
        &decision,
        &request,
        stream,
    )
    .await?;

    // Headers are about to go out: record the decision before the first
    // body byte reaches the client.
    state.stats.record(&decision);
    state.telemetry.on_routed(request_id, &decision);

    let status = upstream_response.status();
    let content_type = upstream_response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let decision_json = serde_json::to_string(&decision).unwrap_or_default();

    if stream {
        let telemetry = state.telemetry.clone();
        let stats = state.stats.clone();
        let catalog = state.catalog.clone();
        let tier = decision.tier;
        let rid = request_id.to_string();
        let model = served_model;

        let forwarded = passthrough_with_usage(upstream_response, move |outcome| {
            if outcome.completed {
                let usage = outcome.usage.unwrap_or_default();
                let cost = catalog
                    .get(&model)
                    .map(|e| cost_usd(e, usage.prompt_tokens, usage.completion_tokens))
                    .unwrap_or(0.0);
                telemetry.on_complete(
                    &rid,
                    &UsageRecord {
                        model,
                        tier,
                        input_tokens: usage.prompt_tokens,
                        output_tokens: usage.completion_tokens,
                        cost_usd: cost,
                    },
                );
            } else {
                stats.record_failure();
                telemetry.on_error(
                    &rid,
                    &RouterError::Internal(
                        "client disconnected before stream completion".to_string(),
                    ),
                );
            }
        });

        return Ok(proxied_response(
            status,
            &content_type,
            &decision_json,
            Body::from_stream(forwarded),
        ));
    }

    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| RouterError::Internal(format!("failed to read upstream body: {e}")))?;

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
        if let Some(usage) = value.get("usage") {
            let input = usage
                .get("prompt_tokens")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0);
            let output = usage
                .get("completion_tokens")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0);
            let cost = state
                .catalog
                .get(&served_model)
                .map(|e| cost_usd(e, input, output))
                .unwrap_or(0.0);
            state.telemetry.on_complete(
                request_id,
                &UsageRecord {
                    model: served_model,
                    tier: decision.tier,
                    input_tokens: input,
                    output_tokens: output,
                    cost_usd: cost,
                },
            );
        }
    }

    Ok(proxied_response(
        status,
        &content_type,
        &decision_json,
        Body::from(bytes),
    ))
}

/// Assemble a forwarded response: upstream status and content type, the
/// routing-decision header, and the given body.
fn proxied_response(
    status: reqwest::StatusCode,
    content_type: &str,
    decision_json: &str,
    body: Body,
) -> Response {
    let status =
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(DECISION_HEADER, decision_json);
    match builder.body(body) {
        Ok(response) => response,
        Err(e) => {
            // Decision JSON with non-ASCII bytes is the only realistic cause.
            tracing::error!(error = %e, "failed to assemble proxied response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Map pipeline errors onto the wire per the error taxonomy.
fn error_response(err: &RouterError) -> Response {
    match err {
        RouterError::InvalidRequest(message) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": {"type": "invalid_request", "message": message}
            })),
        )
            .into_response(),
        RouterError::Upstream { status, body, .. } => {
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, [(CONTENT_TYPE, "application/json")], body.clone()).into_response()
        }
        RouterError::Unreachable { message, tried } => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": {
                    "type": "upstream_unreachable",
                    "message": message,
                    "triedModels": tried
                }
            })),
        )
            .into_response(),
        RouterError::AuthMissing { provider } => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": {"type": "auth_missing", "provider": provider.to_string()}
            })),
        )
            .into_response(),
        RouterError::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(serde_json::json!({
                "error": {"type": "timeout", "message": err.to_string()}
            })),
        )
            .into_response(),
        RouterError::Config(_) | RouterError::Bind { .. } | RouterError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": {"type": "internal_error", "message": "internal error"}
            })),
        )
            .into_response(),
    }
}
