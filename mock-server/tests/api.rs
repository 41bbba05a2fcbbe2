use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, Account, MockState, DEFAULT_API_KEY};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn call(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(get(uri)).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn new_token(router: &axum::Router) -> String {
    let (status, body) = call(router, &format!("/3/authentication/token/new?api_key={DEFAULT_API_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    body["request_token"].as_str().unwrap().to_string()
}

async fn validate(router: &axum::Router, token: &str, username: &str, password: &str) -> (StatusCode, Value) {
    call(
        router,
        &format!(
            "/3/authentication/token/validate_with_login?api_key={DEFAULT_API_KEY}\
             &request_token={token}&username={username}&password={password}"
        ),
    )
    .await
}

// --- token ---

#[tokio::test]
async fn token_new_issues_token() {
    let router = app();
    let (status, body) = call(&router, &format!("/3/authentication/token/new?api_key={DEFAULT_API_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["request_token"].as_str().unwrap().is_empty());
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn token_new_rejects_bad_api_key() {
    let router = app();
    let (status, body) = call(&router, "/3/authentication/token/new?api_key=wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["status_code"], 7);
}

// --- validate_with_login ---

#[tokio::test]
async fn validate_accepts_seeded_account() {
    let router = app();
    let token = new_token(&router).await;
    let (status, body) = validate(&router, &token, "jane", "correct-horse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["request_token"], token.as_str());
}

#[tokio::test]
async fn validate_decodes_plus_as_space() {
    let router = app();
    let token = new_token(&router).await;
    let (status, _) = validate(&router, &token, "john", "battery+staple").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn validate_rejects_wrong_password() {
    let router = app();
    let token = new_token(&router).await;
    let (status, body) = validate(&router, &token, "jane", "nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 30);
    assert!(body.get("request_token").is_none());
}

#[tokio::test]
async fn validate_rejects_unknown_token() {
    let router = app();
    let (status, body) = validate(&router, "bogus", "jane", "correct-horse").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 33);
}

// --- session ---

#[tokio::test]
async fn session_requires_validated_token() {
    let router = app();
    let token = new_token(&router).await;
    let (status, body) = call(
        &router,
        &format!("/3/authentication/session/new?api_key={DEFAULT_API_KEY}&request_token={token}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 17);
}

#[tokio::test]
async fn session_token_is_single_use() {
    let router = app();
    let token = new_token(&router).await;
    validate(&router, &token, "jane", "correct-horse").await;
    let uri = format!("/3/authentication/session/new?api_key={DEFAULT_API_KEY}&request_token={token}");

    let (status, body) = call(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["session_id"].as_str().unwrap().is_empty());

    let (status, body) = call(&router, &uri).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 33);
}

// --- account ---

#[tokio::test]
async fn account_resolves_session_owner() {
    let state = MockState::seeded();
    state
        .add_account(Account {
            id: 99,
            username: "ann".to_string(),
            password: "pw".to_string(),
            name: "Ann".to_string(),
        })
        .await;
    let router = app_with_state(state.clone());

    let token = new_token(&router).await;
    validate(&router, &token, "ann", "pw").await;
    let (_, body) = call(
        &router,
        &format!("/3/authentication/session/new?api_key={DEFAULT_API_KEY}&request_token={token}"),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = call(&router, &format!("/3/account?api_key={DEFAULT_API_KEY}&session_id={session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 99);
    assert_eq!(body["username"], "ann");

    assert_eq!(
        state.requests().await,
        vec![
            "authentication/token/new",
            "authentication/token/validate_with_login",
            "authentication/session/new",
            "account",
        ]
    );
}

#[tokio::test]
async fn account_rejects_unknown_session() {
    let router = app();
    let (status, body) = call(&router, &format!("/3/account?api_key={DEFAULT_API_KEY}&session_id=nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 3);
}

#[tokio::test]
async fn custom_api_key_is_enforced() {
    let state = MockState::new("other-key");
    let router = app_with_state(state);
    let (status, _) = call(&router, &format!("/3/authentication/token/new?api_key={DEFAULT_API_KEY}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&router, "/3/authentication/token/new?api_key=other-key").await;
    assert_eq!(status, StatusCode::OK);
}
