//! Host transport capabilities.
//!
//! Computed once at startup and passed into the origin classifier and
//! the transport, rather than held as mutable module state. Absence of
//! both capabilities is not a failure; it simply means no cross-origin
//! support, and classification fails closed later.

/// What the host can do about cross-origin requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportCapabilities {
    /// The host can reach cross-origin targets at all.
    pub has_cross_origin_support: bool,
    /// Cross-origin targets are reachable only through the legacy
    /// primitive (no numeric status, coarse event hooks, POST only).
    pub requires_legacy_transport: bool,
}

impl TransportCapabilities {
    /// Native cross-origin support.
    pub fn native() -> Self {
        Self {
            has_cross_origin_support: true,
            requires_legacy_transport: false,
        }
    }

    /// Cross-origin support only via the legacy primitive.
    pub fn legacy_only() -> Self {
        Self {
            has_cross_origin_support: true,
            requires_legacy_transport: true,
        }
    }

    /// No cross-origin support at all.
    pub fn none() -> Self {
        Self {
            has_cross_origin_support: false,
            requires_legacy_transport: false,
        }
    }

    /// Probe the current host. A native HTTP client is always
    /// available here, so the probe reports native support; embedders
    /// running under a constrained host inject [`legacy_only`] or
    /// [`none`] instead.
    ///
    /// [`legacy_only`]: Self::legacy_only
    /// [`none`]: Self::none
    pub fn detect() -> Self {
        Self::native()
    }
}

impl Default for TransportCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_reports_native_support() {
        let caps = TransportCapabilities::detect();
        assert!(caps.has_cross_origin_support);
        assert!(!caps.requires_legacy_transport);
    }

    #[test]
    fn none_reports_no_support() {
        let caps = TransportCapabilities::none();
        assert!(!caps.has_cross_origin_support);
    }
}
