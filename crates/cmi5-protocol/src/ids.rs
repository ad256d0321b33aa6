//! Typed ID wrappers for the cmi5 protocol.
//!
//! IDs are opaque String wrappers (serde-transparent): activity IDs are
//! IRIs, registrations and session IDs are LMS-assigned UUID strings, so
//! the client never generates or inspects their structure.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from any string value.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// View as string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the underlying value is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(
    /// IRI identifying the Assignable Unit activity.
    ActivityId
);
typed_id!(
    /// LMS-assigned registration (course enrollment) identifier.
    Registration
);
typed_id!(
    /// LMS-assigned session identifier, carried in the context template
    /// extensions.
    SessionId
);
typed_id!(
    /// Identifier of a tracking statement.
    StatementId
);

impl StatementId {
    /// Generate a fresh statement ID (UUID v4).
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for StatementId {
    fn default() -> Self {
        Self::new()
    }
}
