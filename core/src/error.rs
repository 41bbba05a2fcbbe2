//! Error types for the session bootstrap.
//!
//! # Design
//! Every failure is tagged with the stage it happened in, and its `Display`
//! output is meant to be shown to the user as-is. Credential rejection is the
//! only variant that carries server text; the rest use fixed messages so the
//! presentation layer can render them without further mapping.

use std::fmt;

use thiserror::Error;

use crate::http::TransportError;

/// One of the four ordered steps of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    AcquiringToken,
    ValidatingLogin,
    CreatingSession,
    ResolvingUser,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::AcquiringToken,
        Stage::ValidatingLogin,
        Stage::CreatingSession,
        Stage::ResolvingUser,
    ];

    /// Short label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::AcquiringToken => "Request Token",
            Stage::ValidatingLogin => "Login Step",
            Stage::CreatingSession => "Session ID",
            Stage::ResolvingUser => "User ID",
        }
    }

    /// Endpoint path relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Stage::AcquiringToken => "authentication/token/new",
            Stage::ValidatingLogin => "authentication/token/validate_with_login",
            Stage::CreatingSession => "authentication/session/new",
            Stage::ResolvingUser => "account",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a bootstrap run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// The request for `stage` never produced a response.
    #[error("Login Failed ({stage}): {cause}")]
    Network {
        stage: Stage,
        #[source]
        cause: TransportError,
    },

    /// The body was not JSON, not an object, or a field had the wrong type.
    #[error("Login Failed ({stage}): unexpected response")]
    MalformedResponse { stage: Stage, detail: String },

    #[error("Login Failed (Request Token).")]
    TokenAcquisitionFailed,

    /// The server refused the username/password; `message` is its own text.
    #[error("{message}")]
    CredentialsRejected { message: String },

    #[error("Login Failed (Login Step).")]
    LoginValidationFailed,

    #[error("Login Failed (Session ID).")]
    SessionCreationFailed,

    #[error("Login Failed (User ID).")]
    UserResolutionFailed,
}

impl BootstrapError {
    pub fn stage(&self) -> Stage {
        match self {
            BootstrapError::Network { stage, .. } | BootstrapError::MalformedResponse { stage, .. } => {
                *stage
            }
            BootstrapError::TokenAcquisitionFailed => Stage::AcquiringToken,
            BootstrapError::CredentialsRejected { .. } | BootstrapError::LoginValidationFailed => {
                Stage::ValidatingLogin
            }
            BootstrapError::SessionCreationFailed => Stage::CreatingSession,
            BootstrapError::UserResolutionFailed => Stage::ResolvingUser,
        }
    }

    /// The message the presentation layer should display.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
