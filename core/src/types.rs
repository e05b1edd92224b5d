//! Request DTOs and shared aliases.
//!
//! # Design
//! Resource responses are not modelled here: entities keep the fields they
//! declare as raw JSON values. Only the bodies this crate sends are typed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query parameters for listing and lookup calls.
///
/// Ordered so that the resulting query string is deterministic.
pub type Params = BTreeMap<String, String>;

/// Decoded JSON object, as returned by the token endpoints.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Body of a client-credentials token request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub grant_type: String,
}

/// Body of a refresh-token request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshTokenRequest {
    pub client_id: String,
    pub refresh_token: String,
    pub grant_type: String,
}

impl RefreshTokenRequest {
    pub const GRANT_TYPE: &'static str = "refresh_token";

    pub fn new(client_id: &str, refresh_token: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            refresh_token: refresh_token.to_string(),
            grant_type: Self::GRANT_TYPE.to_string(),
        }
    }
}

/// Build `Params` from borrowed pairs.
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Params {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
