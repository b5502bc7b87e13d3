use crate::client::error_message::extract_error_code;
use crate::{CliClientResult, ClientError, LoginResponse, extract_error_message};

use std::time::Duration;

use log::debug;
use mkt_config::ApiConfig;
use mkt_core::{ApiEnvelope, ChatMessage};
use mkt_realtime::Credential;
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// HTTP client for the marketplace REST collaborators
pub struct ApiClient {
    pub base_url: String,
    pub credential: Option<Credential>,
    pub fallback_error_message: String,
    client: ReqwestClient,
}

impl ApiClient {
    /// Create a client with default settings
    ///
    /// # Arguments
    /// * `base_url` - Server URL (e.g., "http://127.0.0.1:8080")
    /// * `credential` - Optional bearer token sent on every request
    pub fn new(base_url: &str, credential: Option<Credential>) -> Self {
        let defaults = ApiConfig::default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            fallback_error_message: defaults.fallback_error_message,
            client: ReqwestClient::new(),
        }
    }

    /// Create a client honouring the configured timeout and fallback message
    pub fn from_config(config: &ApiConfig, credential: Option<Credential>) -> CliClientResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
            fallback_error_message: config.fallback_error_message.clone(),
            client,
        })
    }

    /// Build a request with the bearer header when a credential is set
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);

        if let Some(ref credential) = self.credential
            && !credential.is_empty()
        {
            req = req.header("Authorization", credential.bearer());
        }

        req
    }

    /// Execute request, unwrap the `status`/`message`/`data` envelope and
    /// turn failures into [`ClientError::Api`]
    async fn execute(&self, req: reqwest::RequestBuilder) -> CliClientResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            return Err(self.api_error(status, &body));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_str(&text)?;

        match serde_json::from_value::<ApiEnvelope<Value>>(body.clone()) {
            Ok(envelope) if !envelope.is_success() => Err(self.api_error(status, &body)),
            Ok(envelope) => Ok(envelope.into_data().unwrap_or(body)),
            Err(_) => Ok(body),
        }
    }

    #[track_caller]
    fn api_error(&self, status: StatusCode, body: &Value) -> ClientError {
        let code = extract_error_code(body).unwrap_or_else(|| status.as_u16().to_string());
        let message =
            extract_error_message(body).unwrap_or_else(|| self.fallback_error_message.clone());
        debug!("REST call failed with {status}: {message}");
        ClientError::api_error(code, message)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> CliClientResult<LoginResponse> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let req = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let data = self.execute(req).await?;

        if data.is_null() {
            return Err(ClientError::unexpected("login response carried no token"));
        }

        Ok(serde_json::from_value(data)?)
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Conversations visible to the current user
    pub async fn list_conversations(&self) -> CliClientResult<Value> {
        let req = self.request(Method::GET, "/api/chat/conversations");
        self.execute(req).await
    }

    /// Message history of one conversation, oldest first as the server sends it
    pub async fn list_messages(&self, conversation_id: &str) -> CliClientResult<Vec<ChatMessage>> {
        let req = self.request(
            Method::GET,
            &format!("/api/chat/conversations/{}/messages", conversation_id),
        );
        let data = self.execute(req).await?;

        match data {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => Ok(serde_json::from_value(data)?),
            other => Err(ClientError::unexpected(format!(
                "expected a list of messages, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
