//! The `Daxko` facade: an authenticated client plus entity factories.

use std::sync::Arc;

use crate::auth;
use crate::class::DaxkoClass;
use crate::client::Client;
use crate::config::Config;
use crate::error::ErrorPayload;
use crate::transport::{Transport, UreqTransport};
use crate::types::JsonMap;
use crate::user::DaxkoUser;

/// Entry point for the Daxko partner API.
///
/// Holds a client configured with a bearer token. The token is never
/// refreshed automatically; obtain a new one with `Daxko::refresh_token`
/// and build a new facade.
#[derive(Debug, Clone)]
pub struct Daxko {
    client: Client,
}

impl Daxko {
    /// Authenticated facade against the host from `Config::from_env`.
    pub fn new(access_token: &str) -> Self {
        Self::with_config(access_token, &Config::from_env())
    }

    pub fn with_config(access_token: &str, config: &Config) -> Self {
        Self::with_transport(access_token, config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(
        access_token: &str,
        config: &Config,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let client = Client::new(&config.base_url, transport)
            .with_header("Content-Type", "application/json")
            .with_header("Authorization", &format!("Bearer {access_token}"));
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Request an access token with client credentials.
    pub fn get_token(
        config: &Config,
        client_id: &str,
        client_secret: &str,
        scope: &str,
        grant_type: &str,
    ) -> Result<JsonMap, ErrorPayload> {
        auth::get_token(
            Arc::new(UreqTransport::new()),
            config,
            client_id,
            client_secret,
            scope,
            grant_type,
        )
    }

    /// Request a fresh access token with a refresh token.
    pub fn refresh_token(
        config: &Config,
        client_id: &str,
        refresh_token: &str,
    ) -> Result<JsonMap, ErrorPayload> {
        auth::refresh_token(Arc::new(UreqTransport::new()), config, client_id, refresh_token)
    }

    /// A new class entity bound to this facade's client.
    pub fn classes(&self) -> DaxkoClass {
        DaxkoClass::new(self.client.clone())
    }

    /// A new user entity bound to this facade's client.
    pub fn users(&self) -> DaxkoUser {
        DaxkoUser::new(self.client.clone())
    }
}
