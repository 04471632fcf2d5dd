// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming passthrough with after-the-fact usage accounting.
//!
//! The upstream SSE bytes are forwarded to the client exactly as they
//! arrive; a copy of each chunk is teed into a watcher task that parses
//! the events and pulls the final usage payload out of the stream. When
//! the client disconnects, dropping the forward stream drops the
//! upstream response (cancelling the connection) and closes the tee, so
//! the watcher observes an incomplete stream.

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use tracing::debug;

/// Token usage parsed from the terminal streaming chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// The watcher's verdict once the stream closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Usage from the last chunk that carried one, if any.
    pub usage: Option<StreamUsage>,
    /// True when the upstream signalled `[DONE]` before the stream closed.
    pub completed: bool,
}

/// Wrap an upstream streaming response for byte-for-byte forwarding.
///
/// `on_end` fires exactly once, after the forwarded stream has been
/// fully consumed or dropped, with whatever the watcher saw.
pub fn passthrough_with_usage<F>(
    response: reqwest::Response,
    on_end: F,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send
where
    F: FnOnce(StreamOutcome) + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded::<Bytes>();

    tokio::spawn(watch_usage(rx, on_end));

    response.bytes_stream().map(move |chunk| match chunk {
        Ok(bytes) => {
            let _ = tx.unbounded_send(bytes.clone());
            Ok(bytes)
        }
        Err(e) => Err(std::io::Error::other(e)),
    })
}

/// Parse teed SSE chunks, remembering the most recent usage payload and
/// whether the protocol-level `[DONE]` marker arrived.
async fn watch_usage<F>(rx: mpsc::UnboundedReceiver<Bytes>, on_end: F)
where
    F: FnOnce(StreamOutcome) + Send + 'static,
{
    let mut events = rx.map(Ok::<Bytes, std::convert::Infallible>).eventsource();

    let mut usage: Option<StreamUsage> = None;
    let mut completed = false;

    while let Some(event) = events.next().await {
        let Ok(event) = event else {
            // Malformed SSE framing: keep forwarding, stop accounting.
            break;
        };
        let data = event.data.trim();
        if data == "[DONE]" {
            completed = true;
            continue;
        }
        let Ok(value) = serde_json::from_str::<serde_json::Value>(data) else {
            continue;
        };
        if let Some(u) = value.get("usage").filter(|u| !u.is_null()) {
            usage = Some(StreamUsage {
                prompt_tokens: u
                    .get("prompt_tokens")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0),
                completion_tokens: u
                    .get("completion_tokens")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0),
            });
        }
    }

    debug!(?usage, completed, "stream watcher finished");
    on_end(StreamOutcome { usage, completed });
}
