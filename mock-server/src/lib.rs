//! In-process stand-in for the movie-database v3 authentication API.
//!
//! Serves the four endpoints the session bootstrap calls, under `/3/`, with
//! the same JSON shapes and failure bodies as the real service. Every request
//! that reaches a handler is appended to a log so tests can assert ordering.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "test-api-key";

const EXPIRES_AT: &str = "2099-01-01 00:00:00 UTC";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

#[derive(Debug, Default)]
struct TokenEntry {
    validated_for: Option<u64>,
}

#[derive(Debug, Default)]
struct Store {
    api_key: String,
    accounts: Vec<Account>,
    tokens: HashMap<String, TokenEntry>,
    sessions: HashMap<String, u64>,
    log: Vec<String>,
}

/// Shared server state. Clones refer to the same store.
#[derive(Clone, Debug)]
pub struct MockState {
    inner: Arc<RwLock<Store>>,
}

impl MockState {
    pub fn new(api_key: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Store {
                api_key: api_key.to_string(),
                ..Store::default()
            })),
        }
    }

    /// Seeded with two accounts: `jane` (id 42) and `john` (id 7).
    pub fn seeded() -> Self {
        let store = Store {
            api_key: DEFAULT_API_KEY.to_string(),
            accounts: vec![
                Account {
                    id: 42,
                    username: "jane".to_string(),
                    password: "correct-horse".to_string(),
                    name: "Jane Doe".to_string(),
                },
                Account {
                    id: 7,
                    username: "john".to_string(),
                    password: "battery staple".to_string(),
                    name: "John Roe".to_string(),
                },
            ],
            ..Store::default()
        };
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn set_api_key(&self, api_key: &str) {
        self.inner.write().await.api_key = api_key.to_string();
    }

    pub async fn add_account(&self, account: Account) {
        self.inner.write().await.accounts.push(account);
    }

    /// Endpoints hit so far, in arrival order.
    pub async fn requests(&self) -> Vec<String> {
        self.inner.read().await.log.clone()
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::seeded()
    }
}

type Params = Query<HashMap<String, String>>;
type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_state(MockState::default())
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/3/authentication/token/new", get(new_token))
        .route("/3/authentication/token/validate_with_login", get(validate_with_login))
        .route("/3/authentication/session/new", get(new_session))
        .route("/3/account", get(account))
        .with_state(state)
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn failure(status: StatusCode, code: u32, message: &str) -> Reply {
    (
        status,
        Json(json!({
            "success": false,
            "status_code": code,
            "status_message": message,
        })),
    )
}

fn invalid_api_key() -> Reply {
    failure(
        StatusCode::UNAUTHORIZED,
        7,
        "Invalid API key: You must be granted a valid key.",
    )
}

fn invalid_token() -> Reply {
    failure(
        StatusCode::UNAUTHORIZED,
        33,
        "Invalid request token: The request token is either expired or invalid.",
    )
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or("")
}

async fn new_token(State(state): State<MockState>, Query(params): Params) -> Reply {
    let mut store = state.inner.write().await;
    store.log.push("authentication/token/new".to_string());
    if param(&params, "api_key") != store.api_key {
        return invalid_api_key();
    }

    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), TokenEntry::default());
    debug!(%token, "issued request token");
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "expires_at": EXPIRES_AT,
            "request_token": token,
        })),
    )
}

async fn validate_with_login(State(state): State<MockState>, Query(params): Params) -> Reply {
    let mut store = state.inner.write().await;
    store.log.push("authentication/token/validate_with_login".to_string());
    if param(&params, "api_key") != store.api_key {
        return invalid_api_key();
    }

    let token = param(&params, "request_token").to_string();
    if !store.tokens.contains_key(&token) {
        return invalid_token();
    }

    let username = param(&params, "username");
    let password = param(&params, "password");
    let Some(account_id) = store
        .accounts
        .iter()
        .find(|a| a.username == username && a.password == password)
        .map(|a| a.id)
    else {
        return failure(
            StatusCode::UNAUTHORIZED,
            30,
            "Invalid username and/or password: You did not provide a valid login.",
        );
    };

    if let Some(entry) = store.tokens.get_mut(&token) {
        entry.validated_for = Some(account_id);
    }
    debug!(%token, account_id, "request token validated");
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "expires_at": EXPIRES_AT,
            "request_token": token,
        })),
    )
}

async fn new_session(State(state): State<MockState>, Query(params): Params) -> Reply {
    let mut store = state.inner.write().await;
    store.log.push("authentication/session/new".to_string());
    if param(&params, "api_key") != store.api_key {
        return invalid_api_key();
    }

    let token = param(&params, "request_token");
    let Some(entry) = store.tokens.get(token) else {
        return invalid_token();
    };
    let Some(account_id) = entry.validated_for else {
        return failure(StatusCode::UNAUTHORIZED, 17, "Session denied.");
    };

    // Request tokens are single use.
    store.tokens.remove(token);
    let session_id = Uuid::new_v4().simple().to_string();
    store.sessions.insert(session_id.clone(), account_id);
    debug!(%session_id, account_id, "session created");
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "session_id": session_id,
        })),
    )
}

async fn account(State(state): State<MockState>, Query(params): Params) -> Reply {
    let mut store = state.inner.write().await;
    store.log.push("account".to_string());
    if param(&params, "api_key") != store.api_key {
        return invalid_api_key();
    }

    let account = store
        .sessions
        .get(param(&params, "session_id"))
        .and_then(|id| store.accounts.iter().find(|a| a.id == *id));
    match account {
        Some(account) => (
            StatusCode::OK,
            Json(json!({
                "id": account.id,
                "username": account.username,
                "name": account.name,
                "include_adult": false,
            })),
        ),
        None => failure(
            StatusCode::UNAUTHORIZED,
            3,
            "Authentication failed: You do not have permissions to access the service.",
        ),
    }
}
