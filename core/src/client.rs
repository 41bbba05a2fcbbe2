//! Stateless request builder and response parser for the authentication API.
//!
//! # Design
//! `AuthClient` holds only the `ApiConfig` and carries no mutable state
//! between calls. Each handshake stage is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Sequencing lives in `bootstrap`; I/O lives with whoever
//! executes the requests.
//!
//! The HTTP status is logged but does not decide success. The API reports
//! failures in the JSON body, which is what each `parse_*` inspects.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::encoding::escaped_parameters;
use crate::error::{BootstrapError, Stage};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{
    AccountBody, ApiStatus, Credentials, RequestToken, RequestTokenBody, SessionBody, SessionId,
    UserId, ValidateLoginBody,
};

#[derive(Debug, Clone)]
pub struct AuthClient {
    config: Arc<ApiConfig>,
}

impl AuthClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, stage: Stage, parameters: &[(&str, &str)]) -> String {
        format!(
            "{}/{}{}",
            self.config.secure_base_url(),
            stage.endpoint(),
            escaped_parameters(parameters.iter().copied())
        )
    }

    pub fn build_request_token(&self) -> HttpRequest {
        HttpRequest::get(self.url(Stage::AcquiringToken, &[("api_key", self.config.api_key())]))
    }

    pub fn build_validate_login(&self, token: &RequestToken, credentials: &Credentials) -> HttpRequest {
        HttpRequest::get(self.url(
            Stage::ValidatingLogin,
            &[
                ("api_key", self.config.api_key()),
                ("request_token", token.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ],
        ))
    }

    pub fn build_create_session(&self, token: &RequestToken) -> HttpRequest {
        HttpRequest::get(self.url(
            Stage::CreatingSession,
            &[("api_key", self.config.api_key()), ("request_token", token.as_str())],
        ))
    }

    pub fn build_account(&self, session_id: &SessionId) -> HttpRequest {
        HttpRequest::get(self.url(
            Stage::ResolvingUser,
            &[("api_key", self.config.api_key()), ("session_id", session_id.as_str())],
        ))
    }

    pub fn parse_request_token(&self, response: &HttpResponse) -> Result<RequestToken, BootstrapError> {
        let body: RequestTokenBody = decode(Stage::AcquiringToken, response)?;
        match body.request_token.filter(|t| !t.is_empty()) {
            Some(token) => Ok(RequestToken(token)),
            None => {
                log_rejection(Stage::AcquiringToken, response.status, &body.status);
                Err(BootstrapError::TokenAcquisitionFailed)
            }
        }
    }

    pub fn parse_validate_login(&self, response: &HttpResponse) -> Result<(), BootstrapError> {
        let body: ValidateLoginBody = decode(Stage::ValidatingLogin, response)?;
        if body.success == Some(true) {
            return Ok(());
        }
        log_rejection(Stage::ValidatingLogin, response.status, &body.status);
        match body.status {
            ApiStatus {
                status_message: Some(message),
                ..
            } => Err(BootstrapError::CredentialsRejected { message }),
            ApiStatus {
                status_code: Some(code),
                ..
            } => Err(BootstrapError::CredentialsRejected {
                message: format!("Login rejected (status {code})."),
            }),
            _ => Err(BootstrapError::LoginValidationFailed),
        }
    }

    pub fn parse_create_session(&self, response: &HttpResponse) -> Result<SessionId, BootstrapError> {
        let body: SessionBody = decode(Stage::CreatingSession, response)?;
        match body.session_id.filter(|s| !s.is_empty()) {
            Some(session_id) if session_id.contains('\0') => {
                warn!(stage = %Stage::CreatingSession, "session_id contains a NUL byte");
                Err(BootstrapError::MalformedResponse {
                    stage: Stage::CreatingSession,
                    detail: "session_id contains a NUL byte".to_string(),
                })
            }
            Some(session_id) => Ok(SessionId(session_id)),
            None => {
                log_rejection(Stage::CreatingSession, response.status, &body.status);
                Err(BootstrapError::SessionCreationFailed)
            }
        }
    }

    pub fn parse_account(&self, response: &HttpResponse) -> Result<UserId, BootstrapError> {
        let body: AccountBody = decode(Stage::ResolvingUser, response)?;
        match body.id {
            Some(id) => Ok(UserId(id)),
            None => {
                log_rejection(Stage::ResolvingUser, response.status, &body.status);
                Err(BootstrapError::UserResolutionFailed)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(stage: Stage, response: &HttpResponse) -> Result<T, BootstrapError> {
    debug!(stage = %stage, status = response.status, "response received");
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(stage = %stage, status = response.status, error = %e, "malformed response body");
        BootstrapError::MalformedResponse {
            stage,
            detail: e.to_string(),
        }
    })
}

fn log_rejection(stage: Stage, status: u16, api: &ApiStatus) {
    warn!(
        stage = %stage,
        status,
        status_code = ?api.status_code,
        status_message = api.status_message.as_deref().unwrap_or(""),
        "stage rejected by server"
    );
}
