//! Request primitives: the two structurally different ways a request
//! can be issued.
//!
//! The native primitive reports a numeric HTTP status and raw body. The
//! legacy primitive exposes no status at all — only coarse
//! loaded/error/timeout hooks, which the completion funnel later maps
//! to synthesized statuses. Send-step failures are caught here and
//! logged; they surface as the status-0 completion rather than an
//! early return, so classification always runs.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use cmi5_protocol::error::TransportError;
use cmi5_protocol::transport::{Method, TransportRequest};

/// Hook events the legacy primitive can raise. Browsers fire these
/// inconsistently, so a single request may yield more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyEvent {
    Loaded { body: String },
    Errored { body: String },
    TimedOut,
}

/// What a primitive produced for one request.
#[derive(Debug, Clone)]
pub enum PrimitiveOutcome {
    /// The native primitive: real status, body, and content type.
    Native {
        status: u16,
        body: String,
        content_type: Option<String>,
    },
    /// The legacy primitive: every hook that fired, in order.
    Legacy { events: Vec<LegacyEvent> },
}

/// One underlying request mechanism.
///
/// Pre-send validation failures (the legacy primitive's method and
/// content-type restrictions) are the only error path; everything that
/// happens after send is reported through the outcome.
#[async_trait]
pub trait RequestPrimitive: Send + Sync {
    async fn execute(&self, request: &TransportRequest) -> Result<PrimitiveOutcome, TransportError>;
}

fn apply_query(request: &TransportRequest) -> url::Url {
    let mut url = request.url.clone();
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.query {
            pairs.append_pair(name, value);
        }
    }
    url
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// The native primitive, backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct NativePrimitive {
    client: reqwest::Client,
}

impl NativePrimitive {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for NativePrimitive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestPrimitive for NativePrimitive {
    async fn execute(&self, request: &TransportRequest) -> Result<PrimitiveOutcome, TransportError> {
        let url = apply_query(request);
        debug!(method = %request.method, %url, "native request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        warn!(%url, error = %err, "failed reading response body");
                        String::new()
                    }
                };
                Ok(PrimitiveOutcome::Native {
                    status,
                    body,
                    content_type,
                })
            }
            Err(err) => {
                // Send exceptions are logged and folded into the
                // status-0 completion path.
                warn!(%url, error = %err, "native request send failed");
                Ok(PrimitiveOutcome::Native {
                    status: 0,
                    body: String::new(),
                    content_type: None,
                })
            }
        }
    }
}

/// The legacy primitive: POST only, JSON content only, no status.
///
/// Outcomes are reduced to the three hook events the legacy mechanism
/// knows about; the completion funnel assigns their synthesized
/// statuses.
#[derive(Debug, Clone)]
pub struct LegacyPrimitive {
    client: reqwest::Client,
    timeout: Duration,
}

impl LegacyPrimitive {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for LegacyPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestPrimitive for LegacyPrimitive {
    async fn execute(&self, request: &TransportRequest) -> Result<PrimitiveOutcome, TransportError> {
        if request.method != Method::Post {
            return Err(TransportError::UnsupportedMethod(request.method));
        }
        if let Some(content_type) = request.content_type()
            && content_type != "application/json"
        {
            return Err(TransportError::UnsupportedContentType);
        }

        let url = apply_query(request);
        debug!(%url, "legacy request");

        let mut builder = self.client.post(url.clone()).timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let event = match builder.send().await {
            Ok(response) => {
                let success = response.status().is_success();
                let body = response.text().await.unwrap_or_default();
                if success {
                    LegacyEvent::Loaded { body }
                } else {
                    LegacyEvent::Errored { body }
                }
            }
            Err(err) if err.is_timeout() => LegacyEvent::TimedOut,
            Err(err) => {
                warn!(%url, error = %err, "legacy request send failed");
                LegacyEvent::Errored { body: String::new() }
            }
        };

        Ok(PrimitiveOutcome::Legacy {
            events: vec![event],
        })
    }
}
