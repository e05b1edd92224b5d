//! Access-token acquisition against `/auth/token`.
//!
//! # Design
//! Token calls share nothing with an authenticated `Daxko` facade: each call
//! builds its own `Client` with no bearer header. The decoded JSON object is
//! returned on success; on failure the `ErrorPayload` is the `Err` side.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Client;
use crate::config::Config;
use crate::error::ErrorPayload;
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{JsonMap, Params, RefreshTokenRequest, TokenRequest};

pub const TOKEN_PATH: &str = "/auth/token";

/// Exchange client credentials for an access token.
pub fn get_token(
    transport: Arc<dyn Transport>,
    config: &Config,
    client_id: &str,
    client_secret: &str,
    scope: &str,
    grant_type: &str,
) -> Result<JsonMap, ErrorPayload> {
    let body = TokenRequest {
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        scope: scope.to_string(),
        grant_type: grant_type.to_string(),
    };
    post_token(transport, config, &body)
}

/// Exchange a refresh token for a new access token.
pub fn refresh_token(
    transport: Arc<dyn Transport>,
    config: &Config,
    client_id: &str,
    refresh_token: &str,
) -> Result<JsonMap, ErrorPayload> {
    post_token(transport, config, &RefreshTokenRequest::new(client_id, refresh_token))
}

fn post_token<T: Serialize>(
    transport: Arc<dyn Transport>,
    config: &Config,
    body: &T,
) -> Result<JsonMap, ErrorPayload> {
    let body = serde_json::to_string(body).map_err(|e| ErrorPayload::message(e.to_string()))?;
    let client = Client::new(&config.base_url, transport).with_header("Content-Type", "application/json");

    let response = client.request(HttpMethod::Post, TOKEN_PATH, &[], &Params::new(), Some(body))?;
    debug!(status = response.status, "token endpoint answered");

    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            warn!("token response is not a JSON object");
            Ok(JsonMap::new())
        }
        Err(err) => {
            warn!(error = %err, "token response is not valid JSON");
            Ok(JsonMap::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::testing::ScriptedTransport;

    fn config() -> Config {
        Config::new("http://localhost:3000")
    }

    #[test]
    fn get_token_posts_credentials() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, r#"{"access_token":"abc","refresh_token":"def"}"#),
        );
        let token = get_token(transport.clone(), &config(), "id", "secret", "client", "client_credentials").unwrap();
        assert_eq!(token["access_token"], json!("abc"));

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "http://localhost:3000/auth/token");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("authorization"), None);
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "client_id": "id",
                "client_secret": "secret",
                "scope": "client",
                "grant_type": "client_credentials",
            })
        );
    }

    #[test]
    fn refresh_token_uses_refresh_grant() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, r#"{"access_token":"new"}"#));
        refresh_token(transport.clone(), &config(), "id", "r-1").unwrap();

        let body: Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({ "client_id": "id", "refresh_token": "r-1", "grant_type": "refresh_token" })
        );
    }

    #[test]
    fn unauthorized_returns_serialized_response() {
        let transport = Arc::new(ScriptedTransport::new().respond(401, r#"{"error":"invalid_client"}"#));
        let err = get_token(transport, &config(), "id", "bad", "client", "client_credentials").unwrap_err();

        assert!(err.request.as_deref().unwrap().starts_with("POST /auth/token HTTP/1.1"));
        assert!(err.response.as_deref().unwrap().contains(r#"{"error":"invalid_client"}"#));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn transport_failure_returns_message() {
        let transport = Arc::new(ScriptedTransport::new().fail("dns error"));
        let err = refresh_token(transport, &config(), "id", "r-1").unwrap_err();
        assert_eq!(err, ErrorPayload::message("dns error"));
    }

    #[test]
    fn non_json_success_is_empty_map() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, "OK"));
        let token = get_token(transport, &config(), "id", "secret", "client", "client_credentials").unwrap();
        assert!(token.is_empty());
    }
}
