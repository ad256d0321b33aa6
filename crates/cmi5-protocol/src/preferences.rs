//! The learner's `CMI5LearnerPreferences` agent profile.

use serde::{Deserialize, Serialize};

/// Learner preferences, retrieved once per session.
///
/// A profile that 404s is not an error; it is represented as the default
/// (empty) value, distinguishing "fetched and empty" from "never
/// fetched" (which the session models as `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_preference: Option<String>,
}
