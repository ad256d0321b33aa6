//! Statement-fragment value types.
//!
//! Full statement construction and serialization belong to the external
//! xAPI client; these types are the boundary contract handed to it. The
//! context template is a real value type so preparing a statement clones
//! it instead of mutating the stored copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::ids::{ActivityId, Registration, SessionId, StatementId};

/// Opaque learner identity, carried verbatim from the launch invocation.
///
/// The launch `actor` parameter is an xAPI Agent JSON object; the client
/// never inspects its inverse functional identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(Value);

impl Actor {
    /// Parse from the launch query parameter value. Must be a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| ConfigurationError::InvalidActor(err.to_string()))?;
        if !value.is_object() {
            return Err(ConfigurationError::InvalidActor(
                "actor must be a JSON object".to_owned(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

/// Statement verb, identified by IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
}

impl Verb {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Reference to an activity by IRI, as used for statement objects and
/// context categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: String,
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

impl ActivityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: None,
        }
    }
}

/// Context activities grouping. Only the category list matters to the
/// launch protocol; other groupings pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextActivities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<ActivityRef>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A statement-context fragment: the shape of the launch data's context
/// template and of the context attached to every lifecycle statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<Registration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_activities: Option<ContextActivities>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl StatementContext {
    /// The LMS-assigned session ID carried in the extensions, if present.
    pub fn session_id(&self) -> Option<SessionId> {
        self.extensions
            .get(crate::constants::EXTENSION_SESSION_ID)
            .and_then(Value::as_str)
            .map(SessionId::from_string)
    }
}

/// A prepared lifecycle statement, ready for the external client's
/// save-statement operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementDraft {
    pub id: StatementId,
    pub actor: Actor,
    pub verb: Verb,
    /// The AU activity the statement is about.
    pub object: ActivityRef,
    pub context: StatementContext,
    pub timestamp: DateTime<Utc>,
}

impl StatementDraft {
    pub fn new(actor: Actor, verb: Verb, activity: &ActivityId, context: StatementContext) -> Self {
        Self {
            id: StatementId::new(),
            actor,
            verb,
            object: ActivityRef::new(activity.as_str()),
            context,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actor_requires_json_object() {
        assert!(Actor::from_json_str(r#"{"mbox":"mailto:a@example.com"}"#).is_ok());
        assert!(Actor::from_json_str("\"just a string\"").is_err());
        assert!(Actor::from_json_str("not json").is_err());
    }

    #[test]
    fn context_template_roundtrip_preserves_unknown_fields() {
        let raw = json!({
            "registration": "reg-1",
            "contextActivities": {
                "grouping": [{"id": "https://example.com/course"}]
            },
            "extensions": {
                crate::constants::EXTENSION_SESSION_ID: "session-9"
            },
            "language": "en-US"
        });
        let template: StatementContext = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(template.session_id().unwrap().as_str(), "session-9");
        assert!(template.other.contains_key("language"));
        let back = serde_json::to_value(&template).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn cloning_context_does_not_alias_the_template() {
        let template: StatementContext = serde_json::from_value(json!({
            "contextActivities": {"category": []}
        }))
        .unwrap();
        let mut prepared = template.clone();
        prepared
            .context_activities
            .get_or_insert_with(Default::default)
            .category
            .push(ActivityRef::new(crate::constants::CATEGORY_ACTIVITY_CMI5));
        assert!(
            template
                .context_activities
                .as_ref()
                .unwrap()
                .category
                .is_empty()
        );
        assert_eq!(
            prepared.context_activities.unwrap().category[0].id,
            crate::constants::CATEGORY_ACTIVITY_CMI5
        );
    }
}
