use super::*;

fn timeouts() -> AuthTimeouts {
    AuthTimeouts { request_secs: 5, connect_secs: 1 }
}

// =============================================================================
// endpoint
// =============================================================================

#[test]
fn endpoint_joins_with_single_slash() {
    assert_eq!(endpoint("http://h/api", LOGIN_PATH), "http://h/api/auth/login");
    assert_eq!(endpoint("http://h/api/", "/auth/login"), "http://h/api/auth/login");
}

#[test]
fn new_trims_trailing_slash() {
    let svc = HttpAuthService::new("http://localhost:5000/api///", timeouts()).unwrap();
    assert_eq!(svc.base_url(), "http://localhost:5000/api");
}

// =============================================================================
// parse_success
// =============================================================================

#[test]
fn parse_success_with_credentials() {
    let body = serde_json::json!({
        "token": "t1",
        "user": { "id": "1", "role": "admin" },
        "message": "Welcome"
    })
    .to_string();
    let resp = parse_success(200, &body).unwrap();
    assert_eq!(resp.token.as_deref(), Some("t1"));
    assert_eq!(resp.user.unwrap().role.as_deref(), Some("admin"));
    assert_eq!(resp.message.as_deref(), Some("Welcome"));
}

#[test]
fn parse_success_empty_body_is_empty_response() {
    assert_eq!(parse_success(204, "").unwrap(), AuthResponse::default());
    assert_eq!(parse_success(200, "   ").unwrap(), AuthResponse::default());
}

#[test]
fn parse_success_non_json_is_unparseable() {
    let err = parse_success(200, "<html>").unwrap_err();
    assert!(matches!(err, AuthServiceError::Unparseable { status: 200, .. }));
}

// =============================================================================
// parse_failure
// =============================================================================

#[test]
fn parse_failure_with_error_field() {
    let err = parse_failure(404, r#"{"error":"unknown email"}"#);
    let failure = err.failure().unwrap();
    assert_eq!(failure.error.as_deref(), Some("unknown email"));
}

#[test]
fn parse_failure_with_details() {
    let err = parse_failure(422, r#"{"error":"Validation failed","details":["password too short"]}"#);
    assert_eq!(err.failure().unwrap().details, vec!["password too short"]);
}

#[test]
fn parse_failure_without_known_fields_is_unparseable() {
    let err = parse_failure(500, r#"{"status":"boom"}"#);
    assert!(matches!(err, AuthServiceError::Unparseable { status: 500, .. }));
    assert!(err.failure().is_none());
}

#[test]
fn parse_failure_html_is_unparseable() {
    let err = parse_failure(502, "Bad Gateway");
    match err {
        AuthServiceError::Unparseable { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "Bad Gateway");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

// =============================================================================
// AuthServiceError display
// =============================================================================

#[test]
fn transport_error_display() {
    let err = AuthServiceError::Transport("connection refused".into());
    let msg = err.to_string();
    assert!(msg.contains("transport"));
    assert!(msg.contains("connection refused"));
}

#[test]
fn unparseable_error_display_includes_status() {
    let err = AuthServiceError::Unparseable { status: 503, body: String::new() };
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let svc = HttpAuthService::new("http://127.0.0.1:9", timeouts()).unwrap();
    let err = svc.login("a@b.com", "pw").await.unwrap_err();
    assert!(matches!(err, AuthServiceError::Transport(_)));
}
