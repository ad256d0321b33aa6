//! # cmi5-protocol — cmi5 launch protocol contract
//!
//! Shared types, the lifecycle state machine, port traits, and the
//! error taxonomy for the cmi5 Assignable Unit launch client.
//!
//! This crate is intentionally dependency-light (no runtime deps like
//! tokio or reqwest) so both the transport and the client layers can
//! treat it as a pure contract crate.
//!
//! ## Module Overview
//!
//! - [`ids`] — Typed ID wrappers (ActivityId, Registration, SessionId, StatementId)
//! - [`constants`] — Well-known cmi5/xAPI identifiers
//! - [`config`] — LaunchConfiguration parsed from the launch URL
//! - [`auth`] — AuthToken bearer credential
//! - [`launch_data`] — LMS.LaunchData document and vocabulary
//! - [`preferences`] — CMI5LearnerPreferences agent profile
//! - [`session`] — SessionState flags/counters and pure transition guards
//! - [`statement`] — Actor, context template, and statement drafts
//! - [`transport`] — TransportRequest/TransportResponse contract
//! - [`ports`] — XapiClient runtime boundary port
//! - [`error`] — Cmi5Error taxonomy, Cmi5Result

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod launch_data;
pub mod ports;
pub mod preferences;
pub mod session;
pub mod statement;
pub mod transport;

// Re-export the most commonly used types at the crate root.
pub use auth::AuthToken;
pub use config::LaunchConfiguration;
pub use error::{
    Cmi5Error, Cmi5Result, ConfigurationError, CrossOriginError, DependencyMissingError,
    PreconditionError, ResponseFormatError, StartStep, TransportError,
};
pub use ids::{ActivityId, Registration, SessionId, StatementId};
pub use launch_data::{EntitlementKey, LaunchMethod, LaunchMode, LmsLaunchData, MoveOn};
pub use ports::{ProfileDocument, StateDocument, XapiClient};
pub use preferences::LearnerPreferences;
pub use session::{LifecycleTransition, SessionState};
pub use statement::{Actor, ActivityRef, ContextActivities, StatementContext, StatementDraft, Verb};
pub use transport::{Method, TransportRequest, TransportResponse};
