//! The bearer credential obtained from the fetch exchange.

use std::fmt;

/// Opaque bearer token, obtained exactly once per session.
///
/// Exists only in memory for the session's lifetime and is never
/// transmitted back out; `Debug` and `Display` redact the value so it
/// cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The `Authorization` header value derived from the token.
    pub fn authorization_value(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
