//! The `LMS.LaunchData` state document and its vocabulary.
//!
//! Retrieved once per session, read-only afterward. Absence of this
//! document after a successful auth exchange is a hard failure, unlike
//! ordinary state-not-found semantics.

use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::statement::StatementContext;

/// How the AU is launched by the LMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMethod {
    OwnWindow,
    AnyWindow,
}

/// The mode the session was launched in. Only `Normal` permits
/// completed/passed/failed reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMode {
    #[default]
    Normal,
    Browse,
    Review,
}

impl std::fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Normal => "Normal",
            Self::Browse => "Browse",
            Self::Review => "Review",
        };
        write!(f, "{name}")
    }
}

/// The LMS's criteria for considering the AU satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOn {
    Passed,
    Completed,
    CompletedAndPassed,
    CompletedOrPassed,
    NotApplicable,
}

/// Entitlement key for protected content, in either of its two forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_structure: Option<String>,
}

/// Session-scoped launch metadata placed by the LMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmsLaunchData {
    pub launch_method: LaunchMethod,
    pub launch_mode: LaunchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_parameters: Option<String>,
    /// Whether a pass/fail result locks out further pass/fail reporting.
    /// Absent means true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_is_final: Option<bool>,
    pub move_on: MoveOn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entitlement_key: Option<EntitlementKey>,
    /// Cloned, never mutated in place, on every statement preparation.
    pub context_template: StatementContext,
}

impl LmsLaunchData {
    /// `passIsFinal` with its spec-mandated default of true.
    pub fn pass_is_final(&self) -> bool {
        self.pass_is_final.unwrap_or(true)
    }

    /// The LMS-assigned session ID from the context template extensions.
    pub fn session_id(&self) -> Option<SessionId> {
        self.context_template.session_id()
    }

    /// The entitlement key value, preferring `alternate` over
    /// `courseStructure`.
    pub fn entitlement_key_value(&self) -> Option<&str> {
        self.entitlement_key.as_ref().and_then(|key| {
            key.alternate
                .as_deref()
                .or(key.course_structure.as_deref())
        })
    }
}
