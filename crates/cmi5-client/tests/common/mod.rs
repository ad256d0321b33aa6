#![allow(dead_code)]

//! In-memory fakes: a scripted request primitive for the fetch
//! exchange and a recording xAPI client for the port operations.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use cmi5_client::protocol::constants::EXTENSION_SESSION_ID;
use cmi5_client::protocol::error::{Cmi5Error, Cmi5Result, TransportError};
use cmi5_client::protocol::ports::{ProfileDocument, StateDocument, XapiClient};
use cmi5_client::protocol::statement::{Actor, StatementDraft};
use cmi5_client::protocol::transport::TransportRequest;
use cmi5_client::protocol::{ActivityId, Registration, StatementId};
use cmi5_client::transport::{PrimitiveOutcome, RequestPrimitive};

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Route traces to the test writer; `RUST_LOG` filters them.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const LAUNCH_URL: &str = "https://content.example/au/index.html?\
endpoint=https%3A%2F%2Flrs.example%2F&\
fetch=https%3A%2F%2Flms.example%2Ffetch&\
actor=%7B%22mbox%22%3A%22mailto%3Alearner%40example.com%22%7D&\
activityId=https%3A%2F%2Fexample.com%2Fau%2F1&\
registration=reg-1";

pub fn launch_data_value() -> Value {
    json!({
        "launchMethod": "AnyWindow",
        "launchMode": "Normal",
        "moveOn": "CompletedOrPassed",
        "contextTemplate": {
            "contextActivities": {
                "grouping": [{"id": "https://lms.example/course"}]
            },
            "extensions": { EXTENSION_SESSION_ID: "session-1" }
        }
    })
}

pub fn fetch_token_outcome() -> PrimitiveOutcome {
    PrimitiveOutcome::Native {
        status: 200,
        body: r#"{"auth-token":"token-123"}"#.to_owned(),
        content_type: Some("application/json".to_owned()),
    }
}

/// Replays scripted outcomes for each request, recording what was sent.
pub struct ScriptedPrimitive {
    outcomes: Mutex<VecDeque<Result<PrimitiveOutcome, TransportError>>>,
    log: CallLog,
}

impl ScriptedPrimitive {
    pub fn new(log: CallLog) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            log,
        }
    }

    pub fn push(&self, outcome: Result<PrimitiveOutcome, TransportError>) {
        self.outcomes.lock().push_back(outcome);
    }
}

#[async_trait]
impl RequestPrimitive for ScriptedPrimitive {
    async fn execute(&self, request: &TransportRequest) -> Result<PrimitiveOutcome, TransportError> {
        self.log
            .lock()
            .push(format!("{} {}", request.method, request.url));
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(fetch_token_outcome()))
    }
}

/// A primitive whose underlying mechanism never fires any event.
pub struct NeverCompletesPrimitive;

#[async_trait]
impl RequestPrimitive for NeverCompletesPrimitive {
    async fn execute(
        &self,
        _request: &TransportRequest,
    ) -> Result<PrimitiveOutcome, TransportError> {
        std::future::pending().await
    }
}

/// Recording fake for the external xAPI client port.
pub struct FakeXapi {
    pub log: CallLog,
    pub launch_data: Mutex<Option<Value>>,
    pub preferences: Mutex<Option<Value>>,
    pub authorization: Mutex<Option<String>>,
    pub statements: Mutex<Vec<StatementDraft>>,
    pub fail_state: Mutex<Option<String>>,
    pub fail_profile: Mutex<Option<String>>,
    pub fail_statement: Mutex<Option<String>>,
}

impl FakeXapi {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            launch_data: Mutex::new(Some(launch_data_value())),
            preferences: Mutex::new(None),
            authorization: Mutex::new(None),
            statements: Mutex::new(Vec::new()),
            fail_state: Mutex::new(None),
            fail_profile: Mutex::new(None),
            fail_statement: Mutex::new(None),
        }
    }

    pub fn saved_verbs(&self) -> Vec<String> {
        self.statements
            .lock()
            .iter()
            .map(|statement| statement.verb.id.clone())
            .collect()
    }
}

#[async_trait]
impl XapiClient for FakeXapi {
    async fn retrieve_state(
        &self,
        state_id: &str,
        _activity: &ActivityId,
        _agent: &Actor,
        _registration: &Registration,
    ) -> Cmi5Result<Option<StateDocument>> {
        let authorized = self.authorization.lock().is_some();
        self.log
            .lock()
            .push(format!("retrieve-state {state_id} auth={authorized}"));
        if let Some(message) = self.fail_state.lock().clone() {
            return Err(Cmi5Error::Xapi(message));
        }
        Ok(self
            .launch_data
            .lock()
            .clone()
            .map(|contents| StateDocument { contents }))
    }

    async fn retrieve_agent_profile(
        &self,
        profile_id: &str,
        _agent: &Actor,
    ) -> Cmi5Result<Option<ProfileDocument>> {
        self.log.lock().push(format!("retrieve-profile {profile_id}"));
        if let Some(message) = self.fail_profile.lock().clone() {
            return Err(Cmi5Error::Xapi(message));
        }
        Ok(self
            .preferences
            .lock()
            .clone()
            .map(|contents| ProfileDocument { contents }))
    }

    async fn save_statement(&self, statement: &StatementDraft) -> Cmi5Result<StatementId> {
        self.log
            .lock()
            .push(format!("save-statement {}", statement.verb.id));
        if let Some(message) = self.fail_statement.lock().clone() {
            return Err(Cmi5Error::Xapi(message));
        }
        self.statements.lock().push(statement.clone());
        Ok(statement.id.clone())
    }

    fn set_authorization(&self, header_value: String) {
        *self.authorization.lock() = Some(header_value);
    }
}
