//! Fetch exchange wire format.
//!
//! The one-time POST to the fetch URL trades the launch-supplied URL
//! for a bearer token. Success bodies carry `auth-token`; JSON-typed
//! error bodies carry `error-text` and `error-code`.

use serde::Deserialize;
use serde_json::Value;

use cmi5_protocol::error::{Cmi5Error, ResponseFormatError, TransportError};
use cmi5_protocol::AuthToken;

const CONTEXT: &str = "post fetch response malformed";

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(rename = "auth-token")]
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FetchErrorBody {
    #[serde(rename = "error-text")]
    error_text: Option<String>,
    #[serde(rename = "error-code")]
    error_code: Option<Value>,
}

/// Parse a successful exchange response into the bearer token.
pub(crate) fn parse_fetch_response(body: &str) -> Result<AuthToken, ResponseFormatError> {
    let parsed: FetchResponse =
        serde_json::from_str(body).map_err(|err| ResponseFormatError::MalformedJson {
            context: CONTEXT.to_owned(),
            detail: err.to_string(),
        })?;
    match parsed.auth_token {
        Some(token) => Ok(AuthToken::new(token)),
        None => Err(ResponseFormatError::MissingField {
            context: CONTEXT.to_owned(),
            field: "auth-token",
            body: body.to_owned(),
        }),
    }
}

/// Rewrite an HTTP failure from the exchange with the structured error
/// body when the response is JSON-typed, else surface the raw body.
pub(crate) fn decorate_http_failure(
    status: u16,
    body: String,
    content_type: Option<String>,
) -> Cmi5Error {
    let is_json = content_type
        .as_deref()
        .is_some_and(|value| value.split(';').next().is_some_and(|base| {
            base.trim().eq_ignore_ascii_case("application/json")
        }));

    let message = if is_json {
        match serde_json::from_str::<FetchErrorBody>(&body) {
            Ok(FetchErrorBody {
                error_text: Some(text),
                error_code,
            }) => {
                let code = error_code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "null".to_owned());
                format!("{text} ({code})")
            }
            Ok(_) => "failed to detect 'error-text' property in JSON error response".to_owned(),
            Err(err) => format!("failed to parse JSON error response: {err}"),
        }
    } else {
        body
    };

    TransportError::Http {
        status,
        body: message,
        content_type,
    }
    .into()
}
