// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types with consistent, user-presentable messages.
//!
//! Every HTTP outcome that is not a success is normalized into [`ApiError`].
//! The UI only needs the coarse [`FailureKind`] to decide what to show.

use serde_json::Value;

/// Coarse failure category the UI branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server could not be reached at all.
    Unreachable,
    /// The server refused the request (credentials, permissions, input).
    Rejected,
    /// Anything else: server faults, malformed payloads, local storage.
    Unexpected,
}

/// Normalized API error.
///
/// `Clone` so that one refresh failure can be delivered to every queued caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach the server. Check your connection. ({0})")]
    Connectivity(String),

    #[error("Invalid data: {message}")]
    InvalidInput { message: String, details: Value },

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}). Please try again later.")]
    Server { status: u16, details: Value },

    #[error("HTTP {status}: {message}")]
    Other { status: u16, message: String },

    #[error("Unexpected response payload: {0}")]
    Decode(String),

    #[error("Local storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: &Value) -> Self {
        match status {
            400 => ApiError::InvalidInput {
                message: server_message(body, &["error", "message", "detail"])
                    .unwrap_or_else(|| "Invalid data".to_string()),
                details: body.clone(),
            },
            401 => ApiError::Unauthorized(
                server_message(body, &["detail", "message"])
                    .unwrap_or_else(|| "Please sign in again.".to_string()),
            ),
            403 => ApiError::Forbidden(
                server_message(body, &["detail", "message"])
                    .unwrap_or_else(|| "Insufficient permissions.".to_string()),
            ),
            404 => ApiError::NotFound(
                server_message(body, &["detail", "message"])
                    .unwrap_or_else(|| "Resource not found".to_string()),
            ),
            500..=599 => ApiError::Server {
                status,
                details: body.clone(),
            },
            _ => ApiError::Other {
                status,
                message: server_message(body, &["error", "message", "detail"])
                    .unwrap_or_else(|| "An error occurred".to_string()),
            },
        }
    }

    /// HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidInput { .. } => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } | ApiError::Other { status, .. } => Some(*status),
            ApiError::Connectivity(_) | ApiError::Decode(_) | ApiError::Storage(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// True for 4xx-class responses, which are never worth retrying.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Connectivity(_) => FailureKind::Unreachable,
            ApiError::InvalidInput { .. } | ApiError::Unauthorized(_) | ApiError::Forbidden(_) => {
                FailureKind::Rejected
            }
            ApiError::NotFound(_)
            | ApiError::Server { .. }
            | ApiError::Other { .. }
            | ApiError::Decode(_)
            | ApiError::Storage(_) => FailureKind::Unexpected,
        }
    }
}

impl From<crate::storage::StoreError> for ApiError {
    fn from(err: crate::storage::StoreError) -> Self {
        tracing::error!(error = %err, "Key-value store failure");
        ApiError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// First non-empty string among `fields` of a JSON error body.
fn server_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| body.get(field))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Why a delivery login did not produce a delivery session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoginError {
    #[error("Cannot reach the server. Check your connection.")]
    Unreachable,

    #[error("Username or password incorrect")]
    InvalidCredentials,

    #[error("Access denied: this space is reserved for delivery accounts")]
    RoleMismatch { role: String },

    #[error("Incomplete login data returned by the server")]
    IncompleteResponse,

    #[error("A delivery session is already active; log out first")]
    SessionActive,

    #[error("Unexpected server problem: {0}")]
    Unexpected(String),
}

impl LoginError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoginError::Unreachable => FailureKind::Unreachable,
            LoginError::InvalidCredentials
            | LoginError::RoleMismatch { .. }
            | LoginError::SessionActive => FailureKind::Rejected,
            LoginError::IncompleteResponse | LoginError::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Connectivity(_) => LoginError::Unreachable,
            ApiError::InvalidInput { .. } | ApiError::Unauthorized(_) => {
                LoginError::InvalidCredentials
            }
            ApiError::Forbidden(_) => LoginError::RoleMismatch {
                role: String::new(),
            },
            ApiError::Decode(_) => LoginError::IncompleteResponse,
            other => LoginError::Unexpected(other.to_string()),
        }
    }
}

/// Session-manager operation errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation is not valid in the current session state.
    #[error("Operation requires a {expected} session, current session is {actual}")]
    WrongState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("No device id has been resolved")]
    MissingDeviceId,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_classification() {
        let err = ApiError::from_status(400, &json!({"detail": "phone: invalid"}));
        assert!(matches!(err, ApiError::InvalidInput { ref message, .. } if message == "phone: invalid"));

        assert!(ApiError::from_status(401, &Value::Null).is_unauthorized());
        assert!(matches!(
            ApiError::from_status(403, &Value::Null),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(404, &json!({"detail": "No such order"})),
            ApiError::NotFound(ref m) if m == "No such order"
        ));
        assert!(matches!(
            ApiError::from_status(503, &Value::Null),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(409, &json!({"error": "Cart already checked out"})),
            ApiError::Other { status: 409, ref message } if message == "Cart already checked out"
        ));
        assert!(matches!(
            ApiError::from_status(418, &json!("teapot")),
            ApiError::Other { ref message, .. } if message == "An error occurred"
        ));
    }

    #[test]
    fn test_error_prefers_error_field_for_bad_request() {
        let body = json!({"message": "second", "error": "first"});
        match ApiError::from_status(400, &body) {
            ApiError::InvalidInput { message, details } => {
                assert_eq!(message, "first");
                assert_eq!(details, body);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            ApiError::Connectivity("timeout".into()).kind(),
            FailureKind::Unreachable
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).kind(),
            FailureKind::Rejected
        );
        assert_eq!(
            ApiError::Server {
                status: 500,
                details: Value::Null
            }
            .kind(),
            FailureKind::Unexpected
        );
        assert!(ApiError::NotFound("x".into()).is_client_error());
        assert!(!ApiError::Connectivity("x".into()).is_client_error());
    }

    #[test]
    fn test_login_error_messages_are_distinct() {
        let unreachable = LoginError::from(ApiError::Connectivity("refused".into()));
        let credentials = LoginError::from(ApiError::Unauthorized("bad".into()));
        let denied = LoginError::RoleMismatch {
            role: "client".into(),
        };

        assert!(unreachable.to_string().contains("reach the server"));
        assert!(credentials.to_string().contains("incorrect"));
        assert!(denied.to_string().contains("Access denied"));
        assert_eq!(credentials.kind(), FailureKind::Rejected);
        assert_eq!(unreachable.kind(), FailureKind::Unreachable);
    }
}
