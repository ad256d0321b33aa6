//! Lifecycle transition ordering against a started session.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};

use cmi5_client::protocol::constants::{
    CATEGORY_ACTIVITY_CMI5, VERB_COMPLETED, VERB_FAILED, VERB_INITIALIZED, VERB_PASSED,
    VERB_TERMINATED,
};
use cmi5_client::protocol::error::{Cmi5Error, PreconditionError};
use cmi5_client::protocol::launch_data::LaunchMode;
use cmi5_client::transport::{DualModeTransport, TransportSelection};
use cmi5_client::{Cmi5Builder, Cmi5Session};
use common::{CallLog, FakeXapi, LAUNCH_URL, ScriptedPrimitive, launch_data_value};

async fn started_session_with(launch_data: Value) -> (Arc<FakeXapi>, Cmi5Session) {
    common::init_tracing();
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let primitive = Arc::new(ScriptedPrimitive::new(log.clone()));
    let xapi = Arc::new(FakeXapi::new(log));
    *xapi.launch_data.lock() = Some(launch_data);
    let mut session = Cmi5Builder::from_launch_url(LAUNCH_URL)
        .expect("launch url parses")
        .transport(DualModeTransport::with_primitive(
            primitive,
            TransportSelection::Native,
        ))
        .build(xapi.clone())
        .expect("session builds");
    session.start().await.expect("start succeeds");
    (xapi, session)
}

async fn started_session() -> (Arc<FakeXapi>, Cmi5Session) {
    started_session_with(launch_data_value()).await
}

fn launch_data_with(overrides: Value) -> Value {
    let mut data = launch_data_value();
    for (key, value) in overrides.as_object().unwrap() {
        data[key] = value.clone();
    }
    data
}

fn precondition(err: Cmi5Error) -> PreconditionError {
    match err {
        Cmi5Error::Precondition(inner) => inner,
        other => panic!("expected a precondition error, got {other:?}"),
    }
}

#[tokio::test]
async fn full_run_emits_the_expected_verbs() {
    let (xapi, mut session) = started_session().await;

    session.completed().await.unwrap();
    session.passed().await.unwrap();
    session.terminate().await.unwrap();

    assert_eq!(
        xapi.saved_verbs(),
        vec![
            VERB_INITIALIZED.to_owned(),
            VERB_COMPLETED.to_owned(),
            VERB_PASSED.to_owned(),
            VERB_TERMINATED.to_owned(),
        ]
    );
    assert!(!session.in_progress());
    assert!(session.state().terminated);
}

#[tokio::test]
async fn every_statement_carries_registration_and_category() {
    let (xapi, mut session) = started_session().await;
    session.completed().await.unwrap();

    for statement in xapi.statements.lock().iter() {
        let context = &statement.context;
        assert_eq!(context.registration.as_ref().unwrap().as_str(), "reg-1");
        let categories = &context.context_activities.as_ref().unwrap().category;
        assert_eq!(
            categories
                .iter()
                .filter(|activity| activity.id == CATEGORY_ACTIVITY_CMI5)
                .count(),
            1,
            "category attached exactly once per statement"
        );
        // Template fields survive the clone.
        assert_eq!(
            context.session_id().unwrap().as_str(),
            "session-1"
        );
        assert_eq!(statement.object.id, "https://example.com/au/1");
    }
}

#[tokio::test]
async fn initialize_twice_is_rejected() {
    let (_xapi, mut session) = started_session().await;
    let err = session.initialize().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyInitialized);
}

#[tokio::test]
async fn completed_twice_is_rejected() {
    let (xapi, mut session) = started_session().await;
    session.completed().await.unwrap();
    let err = session.completed().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyCompleted);
    assert_eq!(xapi.saved_verbs().len(), 2);
}

#[tokio::test]
async fn terminate_twice_is_rejected() {
    let (_xapi, mut session) = started_session().await;
    session.terminate().await.unwrap();
    let err = session.terminate().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyTerminated);
}

#[tokio::test]
async fn completed_after_terminate_is_rejected() {
    let (_xapi, mut session) = started_session().await;
    session.terminate().await.unwrap();
    let err = session.completed().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::NotActive);
}

#[tokio::test]
async fn second_result_is_rejected_when_pass_is_final() {
    // passIsFinal is absent in the launch data and defaults to true.
    let (_xapi, mut session) = started_session().await;
    session.passed().await.unwrap();

    let err = session.failed().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyFinal);
    let err = session.passed().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyFinal);
}

#[tokio::test]
async fn failed_first_also_locks_further_results() {
    let (_xapi, mut session) = started_session().await;
    session.failed().await.unwrap();

    let err = session.passed().await.unwrap_err();
    assert_eq!(precondition(err), PreconditionError::AlreadyFinal);
}

#[tokio::test]
async fn non_final_pass_allows_mixed_results() {
    let (xapi, mut session) =
        started_session_with(launch_data_with(json!({"passIsFinal": false}))).await;

    session.failed().await.unwrap();
    session.passed().await.unwrap();

    assert!(!session.pass_is_final().unwrap());
    assert_eq!(session.state().passed_count, 1);
    assert_eq!(session.state().failed_count, 1);
    assert_eq!(
        xapi.saved_verbs()[1..],
        [VERB_FAILED.to_owned(), VERB_PASSED.to_owned()]
    );
}

#[tokio::test]
async fn browse_mode_rejects_progress_statements() {
    let (xapi, mut session) =
        started_session_with(launch_data_with(json!({"launchMode": "Browse"}))).await;

    assert_eq!(
        precondition(session.completed().await.unwrap_err()),
        PreconditionError::WrongLaunchMode(LaunchMode::Browse)
    );
    assert_eq!(
        precondition(session.passed().await.unwrap_err()),
        PreconditionError::WrongLaunchMode(LaunchMode::Browse)
    );
    assert_eq!(
        precondition(session.failed().await.unwrap_err()),
        PreconditionError::WrongLaunchMode(LaunchMode::Browse)
    );

    // Termination is still allowed outside Normal mode.
    session.terminate().await.unwrap();
    assert_eq!(
        xapi.saved_verbs(),
        vec![VERB_INITIALIZED.to_owned(), VERB_TERMINATED.to_owned()]
    );
}

#[tokio::test]
async fn transitions_before_start_are_rejected() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let primitive = Arc::new(ScriptedPrimitive::new(log.clone()));
    let xapi = Arc::new(FakeXapi::new(log));
    let mut session = Cmi5Builder::from_launch_url(LAUNCH_URL)
        .unwrap()
        .transport(DualModeTransport::with_primitive(
            primitive,
            TransportSelection::Native,
        ))
        .build(xapi.clone())
        .unwrap();

    assert_eq!(
        precondition(session.initialize().await.unwrap_err()),
        PreconditionError::PreferencesNotLoaded
    );
    assert_eq!(
        precondition(session.terminate().await.unwrap_err()),
        PreconditionError::NotInitialized
    );
    assert_eq!(
        precondition(session.completed().await.unwrap_err()),
        PreconditionError::NotActive
    );
    assert!(xapi.statements.lock().is_empty());

    // Accessors over unloaded documents fail the same way.
    assert_eq!(
        precondition(session.launch_mode().unwrap_err()),
        PreconditionError::LaunchDataNotLoaded
    );
    assert_eq!(
        precondition(session.language_preference().unwrap_err()),
        PreconditionError::PreferencesNotLoaded
    );
}
