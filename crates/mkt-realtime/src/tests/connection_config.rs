use crate::{ConnectionConfig, Credential};

use std::time::Duration;

use googletest::prelude::*;
use mkt_config::RealtimeConfig;

fn raw(endpoint: &str) -> ConnectionConfig {
    ConnectionConfig {
        sockjs: false,
        ..ConnectionConfig::new(endpoint)
    }
}

#[test]
fn given_http_endpoint_when_url_built_then_ws_with_token() {
    let url = raw("http://localhost:8080/ws")
        .websocket_url(&Credential::new("abc123"))
        .unwrap();

    assert_eq!(url.as_str(), "ws://localhost:8080/ws?token=abc123");
}

#[test]
fn given_https_endpoint_when_url_built_then_wss() {
    let url = raw("https://market.example.com/ws")
        .websocket_url(&Credential::new("abc123"))
        .unwrap();

    assert_eq!(url.scheme(), "wss");
    assert_eq!(url.host_str(), Some("market.example.com"));
}

#[test]
fn given_token_with_reserved_characters_when_url_built_then_encoded() {
    let url = raw("ws://localhost/ws")
        .websocket_url(&Credential::new("a b&c"))
        .unwrap();

    assert_eq!(url.query(), Some("token=a+b%26c"));
}

#[test]
fn given_query_param_disabled_when_url_built_then_no_token() {
    let config = ConnectionConfig {
        token_query_param: false,
        ..raw("ws://localhost/ws")
    };

    let url = config.websocket_url(&Credential::new("abc123")).unwrap();

    assert_eq!(url.query(), None);
}

#[test]
fn given_sockjs_when_url_built_then_session_segments_appended() {
    let config = ConnectionConfig::new("http://localhost:8080/ws");

    let url = config.websocket_url(&Credential::new("abc123")).unwrap();

    assert!(url.path().starts_with("/ws/"), "{url}");
    assert!(url.path().ends_with("/websocket"), "{url}");
    assert_eq!(url.query(), Some("token=abc123"));
}

#[test]
fn given_unsupported_scheme_when_url_built_then_error() {
    let result = raw("ftp://localhost/ws").websocket_url(&Credential::new("abc123"));

    assert_that!(result, err(anything()));
}

#[test]
fn given_endpoint_when_host_read_then_hostname() {
    assert_eq!(
        raw("http://localhost:8080/ws").host().unwrap(),
        "localhost"
    );
}

#[test]
fn given_realtime_config_when_converted_then_fields_mapped() {
    let realtime = RealtimeConfig {
        ws_base_url: "http://api.example.com/".to_string(),
        path: "/ws".to_string(),
        sockjs: false,
        token_query_param: true,
        connect_timeout_secs: 15,
        heartbeat_outgoing_ms: 0,
        heartbeat_incoming_ms: 20_000,
        buffer_size: 32,
    };

    let config = ConnectionConfig::from(&realtime);

    assert_eq!(config.endpoint, "http://api.example.com/ws");
    assert!(!config.sockjs);
    assert_eq!(config.connect_timeout, Duration::from_secs(15));
    assert_eq!(config.heartbeat_outgoing, Duration::ZERO);
    assert_eq!(config.heartbeat_incoming, Duration::from_secs(20));
    assert_that!(config.buffer_size, eq(32));
}
