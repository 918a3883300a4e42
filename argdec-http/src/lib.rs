//! Minimal JSON-over-HTTP client with safe logging and flexible timeouts.
//!
//! - Anchored to a base URL; callers pass relative paths
//! - Bearer tokens are sanitized before use and never logged
//! - Bounded per-request timeout; failures surface as [`HttpError`]
//! - No automatic retries: a failed request is the caller's to resubmit
//!
//! Observability: structured `tracing` events are emitted for request
//! start, response headers, truncated body snippets, and final errors.

use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request exceeded its timeout")]
    Timeout,
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        // A trailing slash matters for Url::join: without it the final path
        // segment of the base is replaced instead of extended.
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// POST a JSON body and decode a JSON reply, with optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self
            .inner
            .post(url.clone())
            .timeout(self.default_timeout)
            .json(body);

        if let Some(tok) = bearer {
            let tok = sanitize_api_key(tok)?;
            rb = rb.bearer_auth(tok);
        }

        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id = %req_id,
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms = self.default_timeout.as_millis() as u64,
            auth_kind = if bearer.is_some() { "bearer" } else { "none" },
            "http.request.start"
        );

        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            if err.is_timeout() {
                tracing::warn!(req_id = %req_id, timeout_ms = self.default_timeout.as_millis() as u64, "http.timeout");
                return HttpError::Timeout;
            }
            let message = err.to_string();
            tracing::warn!(req_id = %req_id, message = %message, "http.network_error.send");
            HttpError::Network(message)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            if err.is_timeout() {
                tracing::warn!(req_id = %req_id, "http.timeout.body");
                return HttpError::Timeout;
            }
            let message = err.to_string();
            tracing::warn!(req_id = %req_id, message = %message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms = dur_ms,
            body_len = bytes.len(),
            x_request_id = %request_id,
            "http.response"
        );

        let snippet = snip_body(&bytes);

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id = %req_id,
                    serde_err = %e.to_string(),
                    body_snippet = %snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id = %req_id,
            %status,
            message = %message,
            body_snippet = %snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

/// Pull a human-readable message out of common JSON error envelopes.
fn extract_error_message(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct ServiceEnv {
        error: ServiceDetail,
    }
    #[derive(Deserialize)]
    struct ServiceDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<ServiceEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
