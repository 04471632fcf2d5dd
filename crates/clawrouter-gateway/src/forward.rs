// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upstream forwarding: provider HTTP client, auth headers, and
//! bounded fallback-chain traversal.
//!
//! Every attempt rewrites a fresh request body with the candidate model
//! id; traversal stops at the first 2xx or after three total attempts.
//! Network errors and non-2xx responses are both fallback-eligible; a
//! 401 gets one credential-refresh retry and is terminal if that fails.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use clawrouter_catalog::ModelCatalog;
use clawrouter_classifier::ClassifierUpstream;
use clawrouter_core::{
    ChatRequest, Credential, CredentialResolver, Provider, RouterError, RoutingDecision,
};

/// Total upstream attempts per request (primary plus two fallbacks),
/// bounding latency regardless of chain length.
pub const MAX_UPSTREAM_ATTEMPTS: usize = 3;

/// HTTP client for the provider upstreams.
///
/// All providers speak the OpenAI chat-completions wire format; they
/// differ only in base URL and auth header.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_urls: HashMap<Provider, String>,
}

fn default_base_urls() -> HashMap<Provider, String> {
    HashMap::from([
        (Provider::Blockrun, "https://api.blockrun.ai/v1".to_string()),
        (Provider::OpenAi, "https://api.openai.com/v1".to_string()),
        (Provider::Anthropic, "https://api.anthropic.com/v1".to_string()),
    ])
}

impl UpstreamClient {
    /// Build the client. `overrides` replaces provider base URLs (used
    /// for local endpoints and tests).
    pub fn new(overrides: HashMap<Provider, String>) -> Result<Self, RouterError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RouterError::Internal(format!("failed to build HTTP client: {e}")))?;

        let mut base_urls = default_base_urls();
        base_urls.extend(overrides);

        Ok(Self { client, base_urls })
    }

    fn endpoint(&self, provider: Provider) -> String {
        let base = self
            .base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_default();
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    fn headers(provider: Provider, credential: &Credential) -> Result<HeaderMap, RouterError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match provider {
            Provider::Anthropic => {
                headers.insert(
                    "x-api-key",
                    HeaderValue::from_str(&credential.token).map_err(|_| {
                        RouterError::Config("credential contains invalid header bytes".into())
                    })?,
                );
                headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
            }
            Provider::Blockrun | Provider::OpenAi => {
                let value = format!("Bearer {}", credential.token);
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&value).map_err(|_| {
                        RouterError::Config("credential contains invalid header bytes".into())
                    })?,
                );
            }
        }
        Ok(headers)
    }

    /// POST a chat-completion body to the provider. Network failures map
    /// to `Unreachable`; the caller inspects the status itself.
    pub async fn chat(
        &self,
        provider: Provider,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, RouterError> {
        let headers = Self::headers(provider, credential)?;
        self.client
            .post(self.endpoint(provider))
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| RouterError::Unreachable {
                message: format!("{provider}: {e}"),
                tried: vec![],
            })
    }
}

/// Serialize a fresh forwardable body with the model rewritten and the
/// stream flag pinned. All other fields, known and unknown, pass through.
fn rewritten_body(
    request: &ChatRequest,
    model: &str,
    stream: bool,
) -> Result<serde_json::Value, RouterError> {
    let mut body = serde_json::to_value(request)
        .map_err(|e| RouterError::Internal(format!("failed to serialize request: {e}")))?;
    body["model"] = serde_json::Value::String(model.to_string());
    body["stream"] = serde_json::Value::Bool(stream);
    Ok(body)
}

/// Walk the decision's model chain until one upstream answers 2xx.
///
/// Returns the winning response together with the model id that served
/// it. After exhaustion the last upstream HTTP error is surfaced
/// verbatim; pure connectivity failures collapse into `Unreachable`.
pub async fn forward_with_fallback(
    upstream: &UpstreamClient,
    catalog: &ModelCatalog,
    credentials: &dyn CredentialResolver,
    decision: &RoutingDecision,
    request: &ChatRequest,
    stream: bool,
) -> Result<(reqwest::Response, String), RouterError> {
    let candidates: Vec<&str> = std::iter::once(decision.model.as_str())
        .chain(decision.fallback_chain.iter().map(String::as_str))
        .take(MAX_UPSTREAM_ATTEMPTS)
        .collect();

    let mut tried: Vec<String> = Vec::new();
    let mut last_error: Option<RouterError> = None;

    for model_id in candidates {
        let Some(entry) = catalog.get(model_id) else {
            continue;
        };
        tried.push(model_id.to_string());

        let Some(credential) = credentials.resolve(entry.provider).await else {
            warn!(model = model_id, provider = %entry.provider, "no credentials, skipping model");
            last_error = Some(RouterError::AuthMissing {
                provider: entry.provider,
            });
            continue;
        };

        let body = rewritten_body(request, model_id, stream)?;
        match upstream.chat(entry.provider, &credential, &body).await {
            Ok(response) if response.status().is_success() => {
                debug!(model = model_id, status = %response.status(), "upstream accepted");
                return Ok((response, model_id.to_string()));
            }
            Ok(response) if response.status() == reqwest::StatusCode::UNAUTHORIZED => {
                warn!(model = model_id, "upstream refused auth, refreshing credentials once");
                credentials.invalidate().await;
                let Some(fresh) = credentials.resolve(entry.provider).await else {
                    return Err(RouterError::AuthMissing {
                        provider: entry.provider,
                    });
                };
                match upstream.chat(entry.provider, &fresh, &body).await {
                    Ok(retry) if retry.status().is_success() => {
                        return Ok((retry, model_id.to_string()));
                    }
                    Ok(retry) if retry.status() == reqwest::StatusCode::UNAUTHORIZED => {
                        return Err(RouterError::AuthMissing {
                            provider: entry.provider,
                        });
                    }
                    Ok(retry) => {
                        last_error = Some(upstream_error(retry, model_id).await);
                    }
                    Err(e) => last_error = Some(e),
                }
            }
            Ok(response) => {
                let err = upstream_error(response, model_id).await;
                warn!(model = model_id, error = %err, "upstream error, trying next model");
                last_error = Some(err);
            }
            Err(e) => {
                warn!(model = model_id, error = %e, "upstream unreachable, trying next model");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(err @ RouterError::Upstream { .. }) => err,
        Some(err @ RouterError::AuthMissing { .. }) => err,
        Some(other) => RouterError::Unreachable {
            message: other.to_string(),
            tried,
        },
        None => RouterError::Internal("fallback chain was empty".to_string()),
    })
}

async fn upstream_error(response: reqwest::Response, model: &str) -> RouterError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RouterError::Upstream {
        status,
        body,
        model: model.to_string(),
    }
}

/// The classifier's view of the upstream world: one cheap non-streaming
/// completion against the SIMPLE primary's provider.
pub struct ChatClassifierUpstream {
    upstream: UpstreamClient,
    credentials: std::sync::Arc<dyn CredentialResolver>,
    catalog: std::sync::Arc<ModelCatalog>,
}

impl ChatClassifierUpstream {
    pub fn new(
        upstream: UpstreamClient,
        credentials: std::sync::Arc<dyn CredentialResolver>,
        catalog: std::sync::Arc<ModelCatalog>,
    ) -> Self {
        Self {
            upstream,
            credentials,
            catalog,
        }
    }
}

#[async_trait]
impl ClassifierUpstream for ChatClassifierUpstream {
    async fn classify_completion(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, RouterError> {
        let entry = self
            .catalog
            .get(model)
            .ok_or_else(|| RouterError::Internal(format!("classifier model `{model}` not in catalog")))?;
        let credential = self
            .credentials
            .resolve(entry.provider)
            .await
            .ok_or(RouterError::AuthMissing {
                provider: entry.provider,
            })?;

        let body = serde_json::json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_tokens": 10,
            "temperature": 0,
            "stream": false
        });

        let response = self.upstream.chat(entry.provider, &credential, &body).await?;
        if !response.status().is_success() {
            return Err(upstream_error(response, model).await);
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RouterError::Internal(format!("bad classifier response: {e}")))?;
        let text = value
            .pointer("/choices/0/message/content")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        Ok(text.to_string())
    }
}
