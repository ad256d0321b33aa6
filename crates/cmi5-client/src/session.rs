//! The cmi5 session: startup orchestration and the lifecycle
//! controller.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use cmi5_protocol::constants::{
    AGENT_PROFILE_LEARNER_PREFERENCES, CATEGORY_ACTIVITY_CMI5, STATE_LMS_LAUNCH_DATA,
    VERB_COMPLETED, VERB_FAILED, VERB_INITIALIZED, VERB_PASSED, VERB_TERMINATED,
};
use cmi5_protocol::error::{
    Cmi5Error, Cmi5Result, DependencyMissingError, PreconditionError, ResponseFormatError,
    StartStep, TransportError,
};
use cmi5_protocol::launch_data::{LaunchMethod, LaunchMode, LmsLaunchData, MoveOn};
use cmi5_protocol::ports::XapiClient;
use cmi5_protocol::preferences::LearnerPreferences;
use cmi5_protocol::session::{LifecycleTransition, SessionState};
use cmi5_protocol::statement::{ActivityRef, StatementContext, StatementDraft, Verb};
use cmi5_protocol::transport::{Method, TransportRequest};
use cmi5_protocol::{AuthToken, LaunchConfiguration, SessionId};
use cmi5_transport::{
    DocumentOrigin, DualModeTransport, SyncBridge, TransportCapabilities, TransportSelection,
};

use crate::auth;

/// Per-step observer invoked with the step's outcome. Observers are
/// diagnostic only; they cannot alter control flow.
pub type StepObserver = Box<dyn FnMut(&Cmi5Result<()>) + Send>;

/// Optional diagnostics hooks for the chained `start` sequence.
#[derive(Default)]
pub struct StartObservers {
    pub post_fetch: Option<StepObserver>,
    pub launch_data: Option<StepObserver>,
    pub learner_prefs: Option<StepObserver>,
    pub initialize: Option<StepObserver>,
}

fn notify(observer: Option<&mut StepObserver>, result: &Cmi5Result<()>) {
    if let Some(observer) = observer {
        observer(result);
    }
}

/// Builder for [`Cmi5Session`].
pub struct Cmi5Builder {
    config: LaunchConfiguration,
    document_origin: Option<DocumentOrigin>,
    capabilities: TransportCapabilities,
    transport: Option<DualModeTransport>,
}

impl Cmi5Builder {
    /// Start from a launch invocation URL, validating its parameters.
    pub fn from_launch_url(launch_url: &str) -> Cmi5Result<Self> {
        Ok(Self::new(LaunchConfiguration::from_launch_url(launch_url)?))
    }

    pub fn new(config: LaunchConfiguration) -> Self {
        Self {
            config,
            document_origin: None,
            capabilities: TransportCapabilities::detect(),
            transport: None,
        }
    }

    /// The origin the AU itself runs under. Without it, cross-origin
    /// classification is skipped and the native primitive is used.
    #[must_use]
    pub fn document_origin(mut self, origin: DocumentOrigin) -> Self {
        self.document_origin = Some(origin);
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: TransportCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Use a pre-built transport instead of classifying the fetch URL.
    #[must_use]
    pub fn transport(mut self, transport: DualModeTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Classify the fetch target (once, here) and assemble the session.
    pub fn build(self, xapi: Arc<dyn XapiClient>) -> Cmi5Result<Cmi5Session> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => DualModeTransport::for_target(
                self.document_origin.as_ref(),
                self.config.fetch_url(),
                self.capabilities,
                self.config.allow_fail(),
            )?,
        };
        Ok(Cmi5Session {
            config: self.config,
            transport,
            xapi,
            state: SessionState::default(),
            auth: None,
            launch_data: None,
            context_template: None,
            learner_prefs: None,
        })
    }
}

/// One single-use AU session.
///
/// Owns the auth token, the session progress flags, and the documents
/// loaded during startup. All operations are async and return
/// [`Cmi5Result`]; `*_blocking` variants adapt through the sync bridge.
pub struct Cmi5Session {
    config: LaunchConfiguration,
    transport: DualModeTransport,
    xapi: Arc<dyn XapiClient>,
    state: SessionState,
    auth: Option<AuthToken>,
    launch_data: Option<LmsLaunchData>,
    /// Clone source for per-statement contexts; never mutated in place.
    context_template: Option<StatementContext>,
    learner_prefs: Option<LearnerPreferences>,
}

impl Cmi5Session {
    // ------------------------------------------------------------------
    // Startup orchestration
    // ------------------------------------------------------------------

    /// Run the full startup chain: auth exchange, launch data, learner
    /// preferences, initialized statement. The first failure
    /// short-circuits the rest and names the failed step.
    pub async fn start(&mut self) -> Cmi5Result<()> {
        self.start_with(StartObservers::default()).await
    }

    #[instrument(skip(self, observers), fields(activity_id = %self.config.activity_id()))]
    pub async fn start_with(&mut self, mut observers: StartObservers) -> Cmi5Result<()> {
        let result = self.post_fetch().await.map(|_| ());
        notify(observers.post_fetch.as_mut(), &result);
        result.map_err(|err| Cmi5Error::at_step(StartStep::PostFetch, err))?;

        let result = self.load_lms_launch_data().await;
        notify(observers.launch_data.as_mut(), &result);
        result.map_err(|err| Cmi5Error::at_step(StartStep::LaunchData, err))?;

        let result = self.load_learner_prefs().await;
        notify(observers.learner_prefs.as_mut(), &result);
        result.map_err(|err| Cmi5Error::at_step(StartStep::LearnerPreferences, err))?;

        let result = self.initialize().await;
        notify(observers.initialize.as_mut(), &result);
        result.map_err(|err| Cmi5Error::at_step(StartStep::Initialize, err))?;

        info!("AU started");
        Ok(())
    }

    /// One-time POST exchange: trade the fetch URL for the bearer
    /// token and install it on the xAPI client.
    #[instrument(skip(self), fields(fetch_url = %self.config.fetch_url()))]
    pub async fn post_fetch(&mut self) -> Cmi5Result<AuthToken> {
        let request =
            TransportRequest::new(Method::Post, self.config.fetch_url().clone()).body("");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(Cmi5Error::Transport(TransportError::Http {
                status,
                body,
                content_type,
            })) => return Err(auth::decorate_http_failure(status, body, content_type)),
            Err(err) => return Err(err),
        };

        let token = auth::parse_fetch_response(&response.body)?;
        self.auth = Some(token.clone());
        self.xapi.set_authorization(token.authorization_value());
        debug!("auth token installed");
        Ok(token)
    }

    /// Retrieve the mandatory `LMS.LaunchData` state document.
    #[instrument(skip(self))]
    pub async fn load_lms_launch_data(&mut self) -> Cmi5Result<()> {
        if self.auth.is_none() {
            return Err(PreconditionError::AuthExchangeNotPerformed.into());
        }

        let document = self
            .xapi
            .retrieve_state(
                STATE_LMS_LAUNCH_DATA,
                self.config.activity_id(),
                self.config.actor(),
                self.config.registration(),
            )
            .await?;

        // A missing state is ordinarily not an error, but the launch
        // data's presence is mandatory for a conformant launch.
        let Some(document) = document else {
            return Err(DependencyMissingError::LaunchDataMissing.into());
        };

        let data: LmsLaunchData = serde_json::from_value(document.contents).map_err(|err| {
            ResponseFormatError::MalformedJson {
                context: format!("{STATE_LMS_LAUNCH_DATA} State document"),
                detail: err.to_string(),
            }
        })?;

        self.context_template = Some(data.context_template.clone());
        self.launch_data = Some(data);
        debug!("LMS LaunchData loaded");
        Ok(())
    }

    /// Retrieve the learner preferences profile. Not found is a valid
    /// empty state, not an error.
    #[instrument(skip(self))]
    pub async fn load_learner_prefs(&mut self) -> Cmi5Result<()> {
        if self.launch_data.is_none() {
            return Err(PreconditionError::LaunchDataNotLoaded.into());
        }

        let document = self
            .xapi
            .retrieve_agent_profile(AGENT_PROFILE_LEARNER_PREFERENCES, self.config.actor())
            .await?;

        self.learner_prefs = Some(match document {
            Some(document) => serde_json::from_value(document.contents).map_err(|err| {
                ResponseFormatError::MalformedJson {
                    context: format!("{AGENT_PROFILE_LEARNER_PREFERENCES} Agent Profile"),
                    detail: err.to_string(),
                }
            })?,
            // Distinguishes a never-set preference document from a
            // never-fetched one.
            None => LearnerPreferences::default(),
        });
        debug!("learner preferences loaded");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle transitions
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Cmi5Result<()> {
        self.state.guard_initialize(self.learner_prefs.is_some())?;
        self.state.apply(LifecycleTransition::Initialized);
        let statement = self.prepare_statement(VERB_INITIALIZED)?;
        self.send_statement(statement).await
    }

    #[instrument(skip(self))]
    pub async fn terminate(&mut self) -> Cmi5Result<()> {
        self.state.guard_terminate()?;
        self.state.apply(LifecycleTransition::Terminated);
        let statement = self.prepare_statement(VERB_TERMINATED)?;
        self.send_statement(statement).await
    }

    #[instrument(skip(self))]
    pub async fn completed(&mut self) -> Cmi5Result<()> {
        self.state.guard_completed(self.loaded_launch_mode())?;
        self.state.apply(LifecycleTransition::Completed);
        let statement = self.prepare_statement(VERB_COMPLETED)?;
        self.send_statement(statement).await
    }

    #[instrument(skip(self))]
    pub async fn passed(&mut self) -> Cmi5Result<()> {
        self.state
            .guard_result(self.loaded_launch_mode(), self.loaded_pass_is_final())?;
        self.state.apply(LifecycleTransition::Passed);
        let statement = self.prepare_statement(VERB_PASSED)?;
        self.send_statement(statement).await
    }

    #[instrument(skip(self))]
    pub async fn failed(&mut self) -> Cmi5Result<()> {
        self.state
            .guard_result(self.loaded_launch_mode(), self.loaded_pass_is_final())?;
        self.state.apply(LifecycleTransition::Failed);
        let statement = self.prepare_statement(VERB_FAILED)?;
        self.send_statement(statement).await
    }

    // ------------------------------------------------------------------
    // Blocking adapters
    // ------------------------------------------------------------------

    pub fn start_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.start())
    }

    pub fn initialize_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.initialize())
    }

    pub fn terminate_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.terminate())
    }

    pub fn completed_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.completed())
    }

    pub fn passed_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.passed())
    }

    pub fn failed_blocking(&mut self, bridge: &SyncBridge) -> Cmi5Result<()> {
        let legacy = self.is_legacy();
        Self::adapt(bridge, legacy, self.failed())
    }

    fn is_legacy(&self) -> bool {
        self.transport.selection() == TransportSelection::Legacy
    }

    /// The emulation bound applies only under the legacy selection;
    /// native blocking waits are true synchronous calls.
    fn adapt<T>(
        bridge: &SyncBridge,
        legacy: bool,
        fut: impl Future<Output = Cmi5Result<T>>,
    ) -> Cmi5Result<T> {
        if legacy {
            bridge.wait(fut)
        } else {
            bridge.block(fut)
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn configuration(&self) -> &LaunchConfiguration {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        self.config.endpoint()
    }

    pub fn fetch_url(&self) -> &Url {
        self.config.fetch_url()
    }

    /// Snapshot of the session progress flags.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn in_progress(&self) -> bool {
        self.state.in_progress
    }

    pub fn launch_mode(&self) -> Cmi5Result<LaunchMode> {
        Ok(self.launch_data()?.launch_mode)
    }

    pub fn launch_method(&self) -> Cmi5Result<LaunchMethod> {
        Ok(self.launch_data()?.launch_method)
    }

    pub fn launch_parameters(&self) -> Cmi5Result<Option<&str>> {
        Ok(self.launch_data()?.launch_parameters.as_deref())
    }

    /// The LMS-assigned session ID from the context template.
    pub fn session_id(&self) -> Cmi5Result<Option<SessionId>> {
        Ok(self.launch_data()?.session_id())
    }

    pub fn pass_is_final(&self) -> Cmi5Result<bool> {
        Ok(self.launch_data()?.pass_is_final())
    }

    pub fn move_on(&self) -> Cmi5Result<MoveOn> {
        Ok(self.launch_data()?.move_on)
    }

    pub fn mastery_score(&self) -> Cmi5Result<Option<f64>> {
        Ok(self.launch_data()?.mastery_score)
    }

    pub fn return_url(&self) -> Cmi5Result<Option<&str>> {
        Ok(self.launch_data()?.return_url.as_deref())
    }

    pub fn entitlement_key(&self) -> Cmi5Result<Option<&str>> {
        Ok(self.launch_data()?.entitlement_key_value())
    }

    pub fn learner_preferences(&self) -> Cmi5Result<&LearnerPreferences> {
        self.learner_prefs
            .as_ref()
            .ok_or_else(|| PreconditionError::PreferencesNotLoaded.into())
    }

    pub fn language_preference(&self) -> Cmi5Result<Option<&str>> {
        Ok(self.learner_preferences()?.language_preference.as_deref())
    }

    pub fn audio_preference(&self) -> Cmi5Result<Option<&str>> {
        Ok(self.learner_preferences()?.audio_preference.as_deref())
    }

    // ------------------------------------------------------------------
    // Statement preparation
    // ------------------------------------------------------------------

    fn launch_data(&self) -> Cmi5Result<&LmsLaunchData> {
        self.launch_data
            .as_ref()
            .ok_or_else(|| PreconditionError::LaunchDataNotLoaded.into())
    }

    fn loaded_launch_mode(&self) -> Option<LaunchMode> {
        self.launch_data.as_ref().map(|data| data.launch_mode)
    }

    fn loaded_pass_is_final(&self) -> bool {
        self.launch_data
            .as_ref()
            .map(|data| data.pass_is_final())
            .unwrap_or(true)
    }

    /// Build a lifecycle statement over a fresh clone of the context
    /// template, with the registration and the cmi5 category attached.
    fn prepare_statement(&self, verb_id: &str) -> Cmi5Result<StatementDraft> {
        let template = self
            .context_template
            .as_ref()
            .ok_or(PreconditionError::LaunchDataNotLoaded)?;

        let mut context = template.clone();
        context.registration = Some(self.config.registration().clone());
        context
            .context_activities
            .get_or_insert_with(Default::default)
            .category
            .push(ActivityRef::new(CATEGORY_ACTIVITY_CMI5));

        Ok(StatementDraft::new(
            self.config.actor().clone(),
            Verb::from_id(verb_id),
            self.config.activity_id(),
            context,
        ))
    }

    async fn send_statement(&self, statement: StatementDraft) -> Cmi5Result<()> {
        let verb = statement.verb.id.clone();
        let id = self.xapi.save_statement(&statement).await?;
        debug!(%verb, statement_id = %id, "statement saved");
        Ok(())
    }
}
