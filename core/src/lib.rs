//! Session bootstrap client for the movie-database API.
//!
//! # Overview
//! Turns a username and password into an authenticated session in four
//! strictly ordered calls: request token, login validation, session creation,
//! user id lookup. The result is a single `AuthSession` or one stage-tagged
//! `BootstrapError`.
//!
//! # Design
//! - `AuthClient` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network (host-does-IO pattern).
//! - `Bootstrap` sequences the stages as a consuming state machine, so a run
//!   has at most one request in flight and cannot skip a stage.
//! - `run_bootstrap` / `spawn_bootstrap` drive a run over any `Transport`;
//!   `ReqwestTransport` is the stock one.
//! - Every value a run produces is returned to the caller. Nothing is kept in
//!   process-wide state.

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use bootstrap::{Bootstrap, BootstrapResult, RunState, Step};
pub use client::AuthClient;
pub use config::{ApiConfig, ConfigError};
pub use driver::{run_bootstrap, spawn_bootstrap, BootstrapTask, CompletionSink};
pub use encoding::escaped_parameters;
pub use error::{BootstrapError, Stage};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportError, TransportErrorKind};
pub use transport::{ReqwestTransport, Transport};
pub use types::{AuthSession, Credentials, CredentialsError, RequestToken, SessionId, UserId};
