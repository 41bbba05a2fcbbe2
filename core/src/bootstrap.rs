//! Sans-IO state machine for one bootstrap run.
//!
//! # Design
//! A run is `Idle` until `Bootstrap::start` hands out the first request. Each
//! call to `advance` consumes the run together with the outcome of the
//! request it handed out, so there is never more than one request in flight
//! and a stage cannot be skipped or replayed. The token and session id live
//! inside the run and leave it only as part of the final `AuthSession`.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::AuthClient;
use crate::error::{BootstrapError, Stage};
use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::types::{AuthSession, Credentials, RequestToken, SessionId};

pub type BootstrapResult = Result<AuthSession, BootstrapError>;

/// Observable position of a run in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    AcquiringToken,
    ValidatingLogin,
    CreatingSession,
    ResolvingUser,
    Succeeded,
    Failed(Stage),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed(_))
    }
}

impl From<Stage> for RunState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::AcquiringToken => RunState::AcquiringToken,
            Stage::ValidatingLogin => RunState::ValidatingLogin,
            Stage::CreatingSession => RunState::CreatingSession,
            Stage::ResolvingUser => RunState::ResolvingUser,
        }
    }
}

impl From<&BootstrapResult> for RunState {
    fn from(result: &BootstrapResult) -> Self {
        match result {
            Ok(_) => RunState::Succeeded,
            Err(err) => RunState::Failed(err.stage()),
        }
    }
}

/// Data carried into the stage that is currently waiting on a response.
#[derive(Debug)]
enum Pending {
    Token,
    Login(RequestToken),
    Session,
    User(SessionId),
}

impl Pending {
    fn stage(&self) -> Stage {
        match self {
            Pending::Token => Stage::AcquiringToken,
            Pending::Login(_) => Stage::ValidatingLogin,
            Pending::Session => Stage::CreatingSession,
            Pending::User(_) => Stage::ResolvingUser,
        }
    }
}

/// What the driver should do after feeding a response into the run.
#[derive(Debug)]
pub enum Step {
    /// Execute `HttpRequest`, then call `advance` on the returned run.
    Next(Bootstrap, HttpRequest),
    Done(BootstrapResult),
}

/// One in-flight bootstrap run.
#[derive(Debug)]
pub struct Bootstrap {
    client: AuthClient,
    credentials: Credentials,
    pending: Pending,
    run_id: Uuid,
}

impl Bootstrap {
    /// Leave `Idle`: returns the run and the request-token request.
    pub fn start(client: &AuthClient, credentials: Credentials) -> (Self, HttpRequest) {
        let run_id = Uuid::new_v4();
        info!(%run_id, username = %credentials.username, "bootstrap started");
        let request = client.build_request_token();
        let run = Self {
            client: client.clone(),
            credentials,
            pending: Pending::Token,
            run_id,
        };
        run.log_request(&request);
        (run, request)
    }

    pub fn stage(&self) -> Stage {
        self.pending.stage()
    }

    pub fn state(&self) -> RunState {
        self.stage().into()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Feed the outcome of the request handed out last.
    pub fn advance(self, outcome: Result<HttpResponse, TransportError>) -> Step {
        let stage = self.stage();
        let response = match outcome {
            Ok(response) => response,
            Err(cause) => {
                warn!(run_id = %self.run_id, stage = %stage, error = %cause, "transport failure");
                return self.finish(Err(BootstrapError::Network { stage, cause }));
            }
        };

        let Bootstrap {
            client,
            credentials,
            pending,
            run_id,
        } = self;

        let next = match pending {
            Pending::Token => client
                .parse_request_token(&response)
                .map(|token| (client.build_validate_login(&token, &credentials), Pending::Login(token))),
            Pending::Login(token) => client
                .parse_validate_login(&response)
                .map(|()| (client.build_create_session(&token), Pending::Session)),
            Pending::Session => client
                .parse_create_session(&response)
                .map(|session_id| (client.build_account(&session_id), Pending::User(session_id))),
            Pending::User(session_id) => {
                let result = client
                    .parse_account(&response)
                    .map(|user_id| AuthSession { session_id, user_id });
                return Self::report(run_id, result);
            }
        };

        match next {
            Ok((request, pending)) => {
                let run = Bootstrap {
                    client,
                    credentials,
                    pending,
                    run_id,
                };
                run.log_request(&request);
                Step::Next(run, request)
            }
            Err(err) => Self::report(run_id, Err(err)),
        }
    }

    /// Abandon the run. Nothing is sent and no result is produced.
    pub fn cancel(self) {
        info!(run_id = %self.run_id, stage = %self.stage(), "bootstrap cancelled");
    }

    fn finish(self, result: BootstrapResult) -> Step {
        Self::report(self.run_id, result)
    }

    fn report(run_id: Uuid, result: BootstrapResult) -> Step {
        match &result {
            Ok(session) => info!(%run_id, user_id = %session.user_id, "bootstrap succeeded"),
            Err(err) => warn!(%run_id, stage = %err.stage(), error = %err, "bootstrap failed"),
        }
        Step::Done(result)
    }

    fn log_request(&self, request: &HttpRequest) {
        debug!(
            run_id = %self.run_id,
            stage = %self.stage(),
            method = request.method.as_str(),
            url = %request.redacted_url(),
            "issuing request"
        );
    }
}
