//! Origin classification: same-origin detection and transport variant
//! selection for a configured target URL.
//!
//! Decided once when the target endpoint is configured and cached for
//! the session; never re-evaluated per request.

use tracing::warn;
use url::Url;

use cmi5_protocol::error::{Cmi5Result, ConfigurationError, CrossOriginError};

use crate::capabilities::TransportCapabilities;

/// Which request primitive a target is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSelection {
    Native,
    Legacy,
}

/// The origin the session itself runs under.
///
/// There is no ambient `document` in this environment, so the embedder
/// supplies its origin explicitly when cross-origin rules apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOrigin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl DocumentOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Parse from an origin or document URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let url =
            Url::parse(raw).map_err(|err| ConfigurationError::InvalidTargetUrl(err.to_string()))?;
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Result<Self, ConfigurationError> {
        let host = url.host_str().ok_or_else(|| {
            ConfigurationError::InvalidTargetUrl(format!("no host in {url}"))
        })?;
        Ok(Self::new(url.scheme(), host, url.port()))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Explicit port, or the scheme's default (80/443) when omitted.
    fn normalized_port(&self) -> Option<u16> {
        self.port.or(default_port(&self.scheme))
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Decide which transport variant serves `target`.
///
/// Same-origin targets always use the native primitive. Cross-origin
/// targets fail closed unless `allow_fail` is set, in which case the
/// failure is logged and deferred to request time.
pub fn classify(
    document: Option<&DocumentOrigin>,
    target: &Url,
    capabilities: TransportCapabilities,
    allow_fail: bool,
) -> Cmi5Result<TransportSelection> {
    let Some(document) = document else {
        // Headless embedder: no document origin, no cross-origin rules.
        return Ok(TransportSelection::Native);
    };

    let target_host = target
        .host_str()
        .ok_or_else(|| ConfigurationError::InvalidTargetUrl(format!("no host in {target}")))?
        .to_ascii_lowercase();
    let target_scheme = target.scheme().to_ascii_lowercase();
    let target_port = target.port().or(default_port(&target_scheme));

    let scheme_matches = document.scheme == target_scheme;
    let cross_origin = !scheme_matches
        || document.host != target_host
        || document.normalized_port() != target_port;

    if !cross_origin {
        return Ok(TransportSelection::Native);
    }

    if !capabilities.has_cross_origin_support {
        if allow_fail {
            warn!(%target, "cross origin requests not supported (allowed to fail)");
            return Ok(TransportSelection::Native);
        }
        return Err(CrossOriginError::CrossOriginUnsupported.into());
    }

    if capabilities.requires_legacy_transport {
        if !scheme_matches {
            // The legacy primitive cannot authenticate a scheme change.
            if allow_fail {
                warn!(
                    %target,
                    "cross origin request for differing scheme under legacy transport (allowed to fail)"
                );
                return Ok(TransportSelection::Legacy);
            }
            return Err(CrossOriginError::SchemeMismatchUnderLegacyTransport.into());
        }
        return Ok(TransportSelection::Legacy);
    }

    Ok(TransportSelection::Native)
}
