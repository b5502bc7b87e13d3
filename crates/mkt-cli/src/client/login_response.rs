use mkt_core::models::serde_helpers::optional_string_or_number;
use serde::{Deserialize, Serialize};

/// Payload of a successful `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,

    #[serde(default, alias = "email", alias = "username")]
    pub identity: Option<String>,

    #[serde(default, alias = "id", deserialize_with = "optional_string_or_number")]
    pub user_id: Option<String>,
}
