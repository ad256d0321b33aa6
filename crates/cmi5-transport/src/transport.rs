//! The dual-mode transport: one send contract over both primitives,
//! with a single completion classification.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use url::Url;

use cmi5_protocol::error::{Cmi5Result, TransportError};
use cmi5_protocol::transport::{TransportRequest, TransportResponse};

use crate::capabilities::TransportCapabilities;
use crate::origin::{DocumentOrigin, TransportSelection, classify as classify_origin};
use crate::primitive::{LegacyEvent, LegacyPrimitive, NativePrimitive, PrimitiveOutcome,
    RequestPrimitive};
use crate::sync::SyncBridge;

/// Synthesized statuses for the legacy primitive's hook events.
const LEGACY_STATUS_LOADED: u16 = 200;
const LEGACY_STATUS_ERRORED: u16 = 400;
const LEGACY_STATUS_TIMED_OUT: u16 = 0;

/// Issues requests through whichever primitive the origin classifier
/// selected, normalizing every outcome into one result contract.
#[derive(Clone)]
pub struct DualModeTransport {
    primitive: Arc<dyn RequestPrimitive>,
    selection: TransportSelection,
}

impl DualModeTransport {
    /// Classify `target` once and build the matching primitive.
    pub fn for_target(
        document: Option<&DocumentOrigin>,
        target: &Url,
        capabilities: TransportCapabilities,
        allow_fail: bool,
    ) -> Cmi5Result<Self> {
        let selection = classify_origin(document, target, capabilities, allow_fail)?;
        debug!(%target, ?selection, "transport selected");
        let primitive: Arc<dyn RequestPrimitive> = match selection {
            TransportSelection::Native => Arc::new(NativePrimitive::new()),
            TransportSelection::Legacy => Arc::new(LegacyPrimitive::new()),
        };
        Ok(Self {
            primitive,
            selection,
        })
    }

    /// Build over an explicit primitive. Used by embedders with their
    /// own request mechanism and by tests.
    pub fn with_primitive(
        primitive: Arc<dyn RequestPrimitive>,
        selection: TransportSelection,
    ) -> Self {
        Self {
            primitive,
            selection,
        }
    }

    pub fn selection(&self) -> TransportSelection {
        self.selection
    }

    /// Issue a request and classify its completion.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: TransportRequest) -> Cmi5Result<TransportResponse> {
        let outcome = self.primitive.execute(&request).await?;
        classify_completion(outcome, &request).map_err(Into::into)
    }

    /// Blocking variant of [`send`].
    ///
    /// Under the legacy selection this is a bounded wait on the same
    /// completion future the async path uses — the synchronous
    /// emulation; exceeding the bound is a failure. The native
    /// primitive has a true blocking mode, so no bound applies.
    ///
    /// [`send`]: Self::send
    pub fn send_blocking(
        &self,
        bridge: &SyncBridge,
        request: TransportRequest,
    ) -> Cmi5Result<TransportResponse> {
        match self.selection {
            TransportSelection::Native => bridge.block(self.send(request)),
            TransportSelection::Legacy => bridge.wait(self.send(request)),
        }
    }
}

/// Map one primitive outcome to the normalized result contract.
///
/// Exactly one completion per request: when the legacy primitive raised
/// several hooks, the first wins and the rest are suppressed.
fn classify_completion(
    outcome: PrimitiveOutcome,
    request: &TransportRequest,
) -> Result<TransportResponse, TransportError> {
    let (status, body, content_type) = match outcome {
        PrimitiveOutcome::Native {
            status,
            body,
            content_type,
        } => (status, body, content_type),
        PrimitiveOutcome::Legacy { mut events } => {
            if events.len() > 1 {
                debug!(
                    suppressed = events.len() - 1,
                    "suppressing duplicate legacy completion events"
                );
            }
            if events.is_empty() {
                (LEGACY_STATUS_TIMED_OUT, String::new(), None)
            } else {
                match events.swap_remove(0) {
                    LegacyEvent::Loaded { body } => (
                        LEGACY_STATUS_LOADED,
                        body,
                        Some("application/json".to_owned()),
                    ),
                    LegacyEvent::Errored { body } => (LEGACY_STATUS_ERRORED, body, None),
                    LegacyEvent::TimedOut => (LEGACY_STATUS_TIMED_OUT, String::new(), None),
                }
            }
        }
    };

    // Older hosts report 1223 where they mean 204.
    let status = if status == 1223 { 204 } else { status };

    let not_found_ok = request.ignore_not_found && status == 404;
    if (200..400).contains(&status) || not_found_ok {
        return Ok(TransportResponse {
            status,
            body,
            content_type,
        });
    }

    if status == 0 {
        warn!(url = %request.url, "aborted, offline, or invalid CORS endpoint");
        return Err(TransportError::NetworkUnavailable);
    }

    warn!(url = %request.url, status, "request failed");
    Err(TransportError::Http {
        status,
        body,
        content_type,
    })
}
