//! Runtime boundary ports.
//!
//! The external xAPI client is the only collaborator the lifecycle
//! controller talks to for state, profile, and statement operations.
//! The trait uses `async-trait` for async dyn-dispatch; a `None` result
//! on the retrieval operations means the document was not found, which
//! each caller interprets per its own semantics.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Cmi5Result;
use crate::ids::{ActivityId, Registration, StatementId};
use crate::statement::{Actor, StatementDraft};

/// A retrieved state document's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDocument {
    pub contents: Value,
}

/// A retrieved agent profile document's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    pub contents: Value,
}

/// The consumed surface of the external xAPI client.
#[async_trait]
pub trait XapiClient: Send + Sync {
    /// Retrieve a state document scoped to (activity, agent,
    /// registration). `None` when the document does not exist.
    async fn retrieve_state(
        &self,
        state_id: &str,
        activity: &ActivityId,
        agent: &Actor,
        registration: &Registration,
    ) -> Cmi5Result<Option<StateDocument>>;

    /// Retrieve an agent profile document scoped to the agent alone.
    /// `None` when the document does not exist.
    async fn retrieve_agent_profile(
        &self,
        profile_id: &str,
        agent: &Actor,
    ) -> Cmi5Result<Option<ProfileDocument>>;

    /// Persist one prepared statement.
    async fn save_statement(&self, statement: &StatementDraft) -> Cmi5Result<StatementId>;

    /// Install the `Authorization` header value used for every
    /// subsequent request the client makes. Called once, after the
    /// auth exchange succeeds.
    fn set_authorization(&self, header_value: String);
}
