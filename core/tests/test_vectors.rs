//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each stage lists the request the client must build and a set of simulated
//! responses with the result or error they must parse into. The same file is
//! meant to be replayed by native hosts against the C ABI.

use serde_json::Value;
use tmdb_auth_core::{
    ApiConfig, AuthClient, BootstrapError, Credentials, HttpMethod, HttpRequest, HttpResponse,
    RequestToken, SessionId,
};

const BASE_URL: &str = "http://localhost:3000/3";

fn vectors() -> Value {
    let raw = include_str!("../../test-vectors/stages.json");
    serde_json::from_str(raw).unwrap()
}

fn client(vectors: &Value) -> AuthClient {
    AuthClient::new(ApiConfig::new(vectors["api_key"].as_str().unwrap(), BASE_URL).unwrap())
}

fn check_request(stage: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(expected["method"], "GET", "{stage}: method");
    assert_eq!(req.method, HttpMethod::Get, "{stage}: method");
    assert_eq!(
        req.url,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{stage}: url"
    );

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{stage}: headers");
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::json(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn error_name(err: &BootstrapError) -> &'static str {
    match err {
        BootstrapError::Network { .. } => "Network",
        BootstrapError::MalformedResponse { .. } => "MalformedResponse",
        BootstrapError::TokenAcquisitionFailed => "TokenAcquisitionFailed",
        BootstrapError::CredentialsRejected { .. } => "CredentialsRejected",
        BootstrapError::LoginValidationFailed => "LoginValidationFailed",
        BootstrapError::SessionCreationFailed => "SessionCreationFailed",
        BootstrapError::UserResolutionFailed => "UserResolutionFailed",
    }
}

/// Compare a parse outcome against the case's `expected_result` or
/// `expected_error`; `to_json` maps the success value into the vector format.
fn check_case<T>(stage: &str, case: &Value, result: Result<T, BootstrapError>, to_json: impl Fn(T) -> Value) {
    let name = case["name"].as_str().unwrap();
    match (case.get("expected_error"), result) {
        (Some(expected), Err(err)) => {
            assert_eq!(error_name(&err), expected.as_str().unwrap(), "{stage}/{name}: error");
            if let Some(message) = case.get("expected_message") {
                assert_eq!(err.user_message(), message.as_str().unwrap(), "{stage}/{name}: message");
            }
        }
        (None, Ok(value)) => {
            assert_eq!(to_json(value), case["expected_result"], "{stage}/{name}: result");
        }
        (Some(expected), Ok(_)) => panic!("{stage}/{name}: expected {expected}, got success"),
        (None, Err(err)) => panic!("{stage}/{name}: unexpected error {err:?}"),
    }
}

// ---------------------------------------------------------------------------
// Request token
// ---------------------------------------------------------------------------

#[test]
fn request_token_vectors() {
    let v = vectors();
    let c = client(&v);
    let stage = &v["stages"]["request_token"];

    check_request("request_token", &c.build_request_token(), &stage["expected_request"]);
    for case in stage["cases"].as_array().unwrap() {
        let result = c.parse_request_token(&simulated(case));
        check_case("request_token", case, result, |t| Value::from(t.as_str()));
    }
}

// ---------------------------------------------------------------------------
// Validate login
// ---------------------------------------------------------------------------

#[test]
fn validate_login_vectors() {
    let v = vectors();
    let c = client(&v);
    let stage = &v["stages"]["validate_login"];
    let token = RequestToken(v["request_token"].as_str().unwrap().to_string());
    let creds = Credentials::new(
        v["credentials"]["username"].as_str().unwrap(),
        v["credentials"]["password"].as_str().unwrap(),
    );

    check_request(
        "validate_login",
        &c.build_validate_login(&token, &creds),
        &stage["expected_request"],
    );
    for case in stage["cases"].as_array().unwrap() {
        let result = c.parse_validate_login(&simulated(case));
        check_case("validate_login", case, result, |()| Value::Null);
    }
}

// ---------------------------------------------------------------------------
// Create session
// ---------------------------------------------------------------------------

#[test]
fn create_session_vectors() {
    let v = vectors();
    let c = client(&v);
    let stage = &v["stages"]["create_session"];
    let token = RequestToken(v["request_token"].as_str().unwrap().to_string());

    check_request("create_session", &c.build_create_session(&token), &stage["expected_request"]);
    for case in stage["cases"].as_array().unwrap() {
        let result = c.parse_create_session(&simulated(case));
        check_case("create_session", case, result, |s| Value::from(s.as_str()));
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[test]
fn account_vectors() {
    let v = vectors();
    let c = client(&v);
    let stage = &v["stages"]["account"];
    let session_id = SessionId(v["session_id"].as_str().unwrap().to_string());

    check_request("account", &c.build_account(&session_id), &stage["expected_request"]);
    for case in stage["cases"].as_array().unwrap() {
        let result = c.parse_account(&simulated(case));
        check_case("account", case, result, |id| Value::from(id.0));
    }
}
