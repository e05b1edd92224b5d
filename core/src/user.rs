//! Users, looked up by email and name.

use serde_json::Value;

use crate::client::Client;
use crate::config::API_VERSION;
use crate::entity::{declare_record, ApiResource, Entity, EntityState};
use crate::error::DaxkoError;
use crate::http::HttpMethod;
use crate::types::Params;

declare_record! {
    /// Fields of a user (`/api/v1/users`).
    pub struct UserRecord {
        "id" => id,
    }
}

/// Query keys forwarded by `DaxkoUser::get`.
pub const LOOKUP_PARAMS: [&str; 3] = ["email", "firstName", "lastName"];

#[derive(Debug, Clone)]
pub struct DaxkoUser {
    state: EntityState<UserRecord>,
}

impl DaxkoUser {
    pub fn new(client: Client) -> Self {
        Self {
            state: EntityState::new(client),
        }
    }
}

impl Entity for DaxkoUser {
    type Record = UserRecord;

    fn state(&self) -> &EntityState<UserRecord> {
        &self.state
    }
}

impl ApiResource for DaxkoUser {
    /// Listing users is not offered by the API yet; always empty.
    fn all(&mut self, _params: &Params) -> Result<Value, DaxkoError> {
        Ok(Value::Array(Vec::new()))
    }

    /// Look a user up by `email`, `firstName` and `lastName` from `params`.
    ///
    /// `id` is ignored. Keys missing from `params` are left out of the query.
    fn get(&mut self, _id: Option<&str>, params: &Params) -> Result<&mut Self, DaxkoError> {
        let query: Params = params
            .iter()
            .filter(|(key, _)| LOOKUP_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if self
            .state
            .send(HttpMethod::Get, &format!("{API_VERSION}/users"), &[], &query, None)
        {
            self.state.set_properties(&[])?;
        }
        Ok(self)
    }
}
