//! Error taxonomy for the cmi5 launch protocol.
//!
//! Every fallible operation in the workspace returns [`Cmi5Result`]. The
//! nested enums keep the classification stable: callers can match on the
//! category without caring which component produced the failure.

use thiserror::Error;

use crate::transport::Method;

/// Top-level error for all cmi5 client operations.
#[derive(Debug, Error)]
pub enum Cmi5Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("cross-origin error: {0}")]
    CrossOrigin(#[from] CrossOriginError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("response format error: {0}")]
    ResponseFormat(#[from] ResponseFormatError),
    #[error("precondition not met: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("dependency missing: {0}")]
    DependencyMissing(#[from] DependencyMissingError),
    /// A startup step failed; names the step so the failure is
    /// diagnosable without inspecting internals.
    #[error("failed to start AU - {step}: {source}")]
    Startup {
        step: StartStep,
        #[source]
        source: Box<Cmi5Error>,
    },
    /// Error surfaced by the external xAPI client collaborator.
    #[error("xAPI client error: {0}")]
    Xapi(String),
}

impl Cmi5Error {
    /// Wrap an error as the failure of a named startup step.
    pub fn at_step(step: StartStep, source: Cmi5Error) -> Self {
        Self::Startup {
            step,
            source: Box::new(source),
        }
    }
}

/// Malformed launch invocation or invalid target URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid launch URL: {0}")]
    InvalidLaunchUrl(String),
    #[error("invalid launch string missing or empty parameter: {0}")]
    MissingLaunchParameter(&'static str),
    #[error("invalid target URL: {0}")]
    InvalidTargetUrl(String),
    #[error("invalid actor: {0}")]
    InvalidActor(String),
}

/// Failures decided at origin-classification time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrossOriginError {
    #[error("cross origin requests not supported in this environment")]
    CrossOriginUnsupported,
    #[error("cross origin request for differing scheme under legacy transport")]
    SchemeMismatchUnderLegacyTransport,
}

/// Normalized transport-level failures, classified from either request
/// primitive.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Status 0: aborted, offline, or disallowed cross-origin target.
    #[error("network unavailable: aborted, offline, or invalid CORS endpoint")]
    NetworkUnavailable,
    #[error("http status {status}: {body}")]
    Http {
        status: u16,
        body: String,
        content_type: Option<String>,
    },
    #[error("synchronous emulation timed out after {waited_ms} ms")]
    SynchronousEmulationTimeout { waited_ms: u64 },
    #[error("legacy transport supports POST only, got {0}")]
    UnsupportedMethod(Method),
    #[error("legacy transport supports application/json content only")]
    UnsupportedContentType,
}

/// Response bodies that parsed as transport successes but not as the
/// expected document.
#[derive(Debug, Error)]
pub enum ResponseFormatError {
    #[error("{context}: failed to parse JSON response ({detail})")]
    MalformedJson { context: String, detail: String },
    #[error("{context}: failed to access '{field}' in ({body})")]
    MissingField {
        context: String,
        field: &'static str,
        body: String,
    },
}

/// Per-transition guard violations and ordering errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("learner preferences have not been loaded")]
    PreferencesNotLoaded,
    #[error("AU already initialized")]
    AlreadyInitialized,
    #[error("AU not initialized")]
    NotInitialized,
    #[error("AU already terminated")]
    AlreadyTerminated,
    #[error("AU not active")]
    NotActive,
    #[error("AU not in Normal launch mode (launch mode: {0})")]
    WrongLaunchMode(crate::launch_data::LaunchMode),
    #[error("AU already completed")]
    AlreadyCompleted,
    #[error("AU already passed/failed and passIsFinal")]
    AlreadyFinal,
    #[error("LMS LaunchData has not been loaded")]
    LaunchDataNotLoaded,
    #[error("auth exchange has not been performed")]
    AuthExchangeNotPerformed,
}

/// Documents whose presence is mandatory for a conformant launch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DependencyMissingError {
    #[error("LMS.LaunchData State not found")]
    LaunchDataMissing,
}

/// Steps of the chained `start` sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStep {
    PostFetch,
    LaunchData,
    LearnerPreferences,
    Initialize,
}

impl std::fmt::Display for StartStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PostFetch => "POST to fetch",
            Self::LaunchData => "load LMS LaunchData",
            Self::LearnerPreferences => "load learner preferences",
            Self::Initialize => "send initialized statement",
        };
        write!(f, "{name}")
    }
}

/// Convenience result type for cmi5 operations.
pub type Cmi5Result<T> = Result<T, Cmi5Error>;
