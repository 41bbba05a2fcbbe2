//! Domain values and wire DTOs for the authentication handshake.
//!
//! # Design
//! Identifiers are newtypes so a session id can never be passed where a
//! request token is expected. Response DTOs use `Option` for every field: a
//! missing field is a stage failure, while a field of the wrong JSON type is a
//! malformed response. Serde tells the two apart for us.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Username and password supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Local pre-flight failures a caller may check before starting a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("Username Empty.")]
    EmptyUsername,
    #[error("Password Empty.")]
    EmptyPassword,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject empty fields. The bootstrap itself never calls this.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.username.is_empty() {
            return Err(CredentialsError::EmptyUsername);
        }
        if self.password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Short-lived token issued by `authentication/token/new`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl RequestToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a successful bootstrap run. The caller owns and persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Failure fields the API includes in error bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiStatus {
    pub status_code: Option<i64>,
    pub status_message: Option<String>,
}

/// `GET authentication/token/new`
#[derive(Debug, Deserialize)]
pub(crate) struct RequestTokenBody {
    pub request_token: Option<String>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// `GET authentication/token/validate_with_login`
#[derive(Debug, Deserialize)]
pub(crate) struct ValidateLoginBody {
    pub success: Option<bool>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// `GET authentication/session/new`
#[derive(Debug, Deserialize)]
pub(crate) struct SessionBody {
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// `GET account`
#[derive(Debug, Deserialize)]
pub(crate) struct AccountBody {
    pub id: Option<u64>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("jane", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("jane"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn validate_reports_first_empty_field() {
        assert_eq!(
            Credentials::new("", "").validate(),
            Err(CredentialsError::EmptyUsername)
        );
        assert_eq!(
            Credentials::new("jane", "").validate(),
            Err(CredentialsError::EmptyPassword)
        );
        assert!(Credentials::new("jane", "pw").validate().is_ok());
        assert_eq!(CredentialsError::EmptyPassword.to_string(), "Password Empty.");
    }

    #[test]
    fn auth_session_serializes_flat() {
        let session = AuthSession {
            session_id: SessionId("sid".to_string()),
            user_id: UserId(42),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json, serde_json::json!({"session_id": "sid", "user_id": 42}));
    }

    #[test]
    fn account_body_rejects_string_id() {
        let parsed: Result<AccountBody, _> = serde_json::from_str(r#"{"id":"42"}"#);
        assert!(parsed.is_err());
    }
}
