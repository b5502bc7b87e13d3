use crate::{ApiClient, ClientError, LoginResponse};

use googletest::prelude::*;
use mkt_config::ApiConfig;
use mkt_realtime::Credential;
use serde_json::json;

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let client = ApiClient::new("http://localhost:8080/", None);
    assert_eq!(client.base_url, "http://localhost:8080");
}

#[test]
fn test_credential_stored() {
    let client = ApiClient::new("http://localhost:8080", Some(Credential::from("abc123")));
    assert_eq!(
        client.credential.as_ref().map(Credential::expose),
        Some("abc123")
    );
}

#[test]
fn test_from_config_uses_configured_fallback_message() {
    let config = ApiConfig {
        base_url: "http://api.example.com/".to_string(),
        timeout_secs: 5,
        fallback_error_message: "Try again later".to_string(),
    };

    let client = ApiClient::from_config(&config, None).unwrap();

    assert_eq!(client.base_url, "http://api.example.com");
    assert_eq!(client.fallback_error_message, "Try again later");
}

#[test]
fn test_default_fallback_message_is_not_empty() {
    let client = ApiClient::new("http://localhost:8080", None);
    assert!(!client.fallback_error_message.trim().is_empty());
}

#[test]
fn test_user_message_prefers_api_message() {
    let err = ClientError::api_error("400", "Email already registered");
    assert_eq!(err.user_message("fallback"), "Email already registered");
}

#[test]
fn test_user_message_falls_back_for_non_api_errors() {
    let err = ClientError::unexpected("no body");
    assert_eq!(err.user_message("fallback"), "fallback");
}

#[test]
fn test_login_response_accepts_access_token_alias() {
    let login: LoginResponse = serde_json::from_value(json!({
        "accessToken": "abc123",
        "email": "user@example.com",
        "id": 17
    }))
    .unwrap();

    assert_that!(login.token, eq("abc123"));
    assert_that!(login.identity, some(eq("user@example.com")));
    assert_that!(login.user_id, some(eq("17")));
}
