//! Launch configuration, parsed from the launch invocation URL.

use std::collections::HashMap;

use url::Url;

use crate::constants::LAUNCH_PARAMETERS;
use crate::error::{Cmi5Result, ConfigurationError};
use crate::ids::{ActivityId, Registration};
use crate::statement::Actor;

/// Immutable session configuration.
///
/// All five fields are present and non-empty before any network
/// operation begins; construction fails naming the missing parameter
/// otherwise.
#[derive(Debug, Clone)]
pub struct LaunchConfiguration {
    endpoint: Url,
    fetch_url: Url,
    actor: Actor,
    activity_id: ActivityId,
    registration: Registration,
    allow_fail: bool,
}

impl LaunchConfiguration {
    /// Parse a launch invocation URL, requiring the five launch
    /// parameters in its query string.
    pub fn from_launch_url(launch_url: &str) -> Cmi5Result<Self> {
        let url = Url::parse(launch_url)
            .map_err(|err| ConfigurationError::InvalidLaunchUrl(err.to_string()))?;

        let query: HashMap<String, String> = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        for name in LAUNCH_PARAMETERS {
            match query.get(name) {
                Some(value) if !value.is_empty() => {}
                _ => return Err(ConfigurationError::MissingLaunchParameter(name).into()),
            }
        }

        let endpoint = Url::parse(&query["endpoint"])
            .map_err(|err| ConfigurationError::InvalidTargetUrl(format!("endpoint: {err}")))?;
        let fetch_url = Url::parse(&query["fetch"])
            .map_err(|err| ConfigurationError::InvalidTargetUrl(format!("fetch: {err}")))?;
        let actor = Actor::from_json_str(&query["actor"])?;

        let allow_fail = query
            .get("allowFail")
            .is_some_and(|value| value == "true" || value == "1");

        Ok(Self {
            endpoint,
            fetch_url,
            actor,
            activity_id: ActivityId::from_string(query["activityId"].clone()),
            registration: Registration::from_string(query["registration"].clone()),
            allow_fail,
        })
    }

    /// Assemble directly from already-validated parts.
    pub fn new(
        endpoint: Url,
        fetch_url: Url,
        actor: Actor,
        activity_id: ActivityId,
        registration: Registration,
    ) -> Self {
        Self {
            endpoint,
            fetch_url,
            actor,
            activity_id,
            registration,
            allow_fail: false,
        }
    }

    /// Tolerate origin-classification failures, deferring them to
    /// request time.
    #[must_use]
    pub fn with_allow_fail(mut self, allow_fail: bool) -> Self {
        self.allow_fail = allow_fail;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn fetch_url(&self) -> &Url {
        &self.fetch_url
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn activity_id(&self) -> &ActivityId {
        &self.activity_id
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn allow_fail(&self) -> bool {
        self.allow_fail
    }
}
