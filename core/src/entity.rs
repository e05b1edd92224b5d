//! Shared state and hydration for API entities.
//!
//! # Design
//! Every entity embeds an `EntityState`, which owns the client handle, the
//! last successful response, its decoded body, the last error and a `Record`
//! of declared fields. A `Record` is a plain struct whose field set is fixed
//! by `declare_record!`; hydration only ever overwrites fields that are both
//! declared and present in the decoded body.
//!
//! Entity methods never return transport failures. They store an
//! `ErrorPayload` on the state and hand the entity back, so callers check
//! `has_errors()` after each call.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::{DaxkoError, ErrorPayload, JsonDecodeError, RequestError};
use crate::http::{HttpMethod, HttpResponse};
use crate::types::{JsonMap, Params};

/// A fixed set of named JSON fields.
pub trait Record: Default {
    /// Declared field names, in declaration order.
    const FIELDS: &'static [&'static str];

    fn field(&self, name: &str) -> Option<&Value>;

    fn field_mut(&mut self, name: &str) -> Option<&mut Value>;

    /// Copy every key in `keys` that is declared here and present in
    /// `source`. Returns how many fields were written.
    ///
    /// A key whose value is `null` counts as present and overwrites the
    /// field. This is deliberate: the record mirrors the body exactly.
    fn hydrate(&mut self, source: &JsonMap, keys: &[&str]) -> usize {
        let mut written = 0;
        for key in keys {
            let Some(value) = source.get(*key) else {
                continue;
            };
            match self.field_mut(key) {
                Some(slot) => {
                    *slot = value.clone();
                    written += 1;
                }
                None => debug!(field = *key, "ignoring undeclared field"),
            }
        }
        written
    }
}

/// Declare a record struct whose fields map to JSON keys.
///
/// Each field gets a read-only accessor of the same name.
macro_rules! declare_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $key:literal => $field:ident ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $( $field: serde_json::Value, )*
        }

        impl $name {
            $(
                pub fn $field(&self) -> &serde_json::Value {
                    &self.$field
                }
            )*
        }

        impl $crate::entity::Record for $name {
            const FIELDS: &'static [&'static str] = &[ $( $key ),* ];

            fn field(&self, name: &str) -> Option<&serde_json::Value> {
                match name {
                    $( $key => Some(&self.$field), )*
                    _ => None,
                }
            }

            fn field_mut(&mut self, name: &str) -> Option<&mut serde_json::Value> {
                match name {
                    $( $key => Some(&mut self.$field), )*
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use declare_record;

/// Response, error and field state embedded in every entity.
#[derive(Debug, Clone)]
pub struct EntityState<R> {
    client: Client,
    response: Option<HttpResponse>,
    decoded: Option<Value>,
    decode_failed: bool,
    errors: Option<ErrorPayload>,
    record: R,
}

impl<R: Record> EntityState<R> {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            response: None,
            decoded: None,
            decode_failed: false,
            errors: None,
            record: R::default(),
        }
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    /// The last successful response, if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    pub fn errors(&self) -> Option<&ErrorPayload> {
        self.errors.as_ref()
    }

    /// Value of a declared field. Undeclared names are an error.
    pub fn field(&self, name: &str) -> Result<&Value, DaxkoError> {
        self.record
            .field(name)
            .ok_or_else(|| DaxkoError::UndeclaredField(name.to_string()))
    }

    /// True when `name` is declared and currently holds a non-null value.
    pub fn has_field(&self, name: &str) -> bool {
        matches!(self.record.field(name), Some(value) if !value.is_null())
    }

    /// Every declared field with its current value.
    pub fn to_array(&self) -> JsonMap {
        R::FIELDS
            .iter()
            .map(|name| {
                let value = self.record.field(name).cloned().unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect()
    }

    /// Send a request and keep the response. On failure the error is
    /// recorded, the previous response stays in place and `false` is
    /// returned.
    pub(crate) fn send(
        &mut self,
        method: HttpMethod,
        path: &str,
        segments: &[&str],
        query: &Params,
        body: Option<String>,
    ) -> bool {
        match self.client.request(method, path, segments, query, body) {
            Ok(response) => {
                self.response = Some(response);
                self.decoded = None;
                self.decode_failed = false;
                true
            }
            Err(err) => {
                self.record_failure(err);
                false
            }
        }
    }

    pub(crate) fn record_failure(&mut self, err: RequestError) {
        self.errors = Some(err.into());
    }

    /// Decoded body of the last response, decoded at most once per response.
    ///
    /// A body that is not JSON records a `json_decode` error and reads as an
    /// empty object.
    pub(crate) fn response_to_value(&mut self) -> Result<&Value, DaxkoError> {
        let response = self
            .response
            .as_ref()
            .ok_or(DaxkoError::MissingResponse("decode the response body"))?;

        if self.decoded.is_none() {
            let decoded = match serde_json::from_str::<Value>(&response.body) {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, status = response.status, "response body is not valid JSON");
                    self.errors.get_or_insert_with(ErrorPayload::default).json_decode =
                        Some(JsonDecodeError::from_serde(&err));
                    self.decode_failed = true;
                    Value::Object(JsonMap::new())
                }
            };
            self.decoded = Some(decoded);
        }

        Ok(&*self.decoded.get_or_insert_with(|| Value::Object(JsonMap::new())))
    }

    /// Whether the body of the current response failed to decode.
    pub(crate) fn decode_failed(&self) -> bool {
        self.decode_failed
    }

    /// Hydrate every declared field, plus `extra_keys`, from the decoded
    /// body. Keys missing from the body keep their current value.
    pub(crate) fn set_properties(&mut self, extra_keys: &[&str]) -> Result<(), DaxkoError> {
        if self.response.is_none() {
            return Err(DaxkoError::MissingResponse("set entity properties"));
        }
        let keys: Vec<&str> = R::FIELDS
            .iter()
            .copied()
            .chain(extra_keys.iter().copied())
            .collect();
        self.apply(&keys)
    }

    /// Hydrate only `keys` from the decoded body.
    pub(crate) fn hydrate_only(&mut self, keys: &[&str]) -> Result<(), DaxkoError> {
        if self.response.is_none() {
            return Err(DaxkoError::MissingResponse("set entity properties"));
        }
        self.apply(keys)
    }

    fn apply(&mut self, keys: &[&str]) -> Result<(), DaxkoError> {
        self.response_to_value()?;
        let Some(Value::Object(body)) = &self.decoded else {
            return Ok(());
        };
        self.record.hydrate(body, keys);
        Ok(())
    }
}

/// Read access shared by every entity.
pub trait Entity {
    type Record: Record;

    fn state(&self) -> &EntityState<Self::Record>;

    fn record(&self) -> &Self::Record {
        self.state().record()
    }

    fn has_errors(&self) -> bool {
        self.state().has_errors()
    }

    fn errors(&self) -> Option<&ErrorPayload> {
        self.state().errors()
    }

    fn field(&self, name: &str) -> Result<&Value, DaxkoError> {
        self.state().field(name)
    }

    fn has_field(&self, name: &str) -> bool {
        self.state().has_field(name)
    }

    fn to_array(&self) -> JsonMap {
        self.state().to_array()
    }
}

/// Listing and lookup operations every API-backed entity offers.
pub trait ApiResource: Entity + Sized {
    /// List resources. The decoded body is returned without hydration.
    fn all(&mut self, params: &Params) -> Result<Value, DaxkoError>;

    /// Fetch one resource and hydrate this entity from it.
    fn get(&mut self, id: Option<&str>, params: &Params) -> Result<&mut Self, DaxkoError>;
}
