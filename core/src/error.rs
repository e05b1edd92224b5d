//! Error types for the Daxko client.
//!
//! # Design
//! Two kinds of failure exist and they travel differently:
//! - `DaxkoError` covers caller mistakes (missing listing parameters,
//!   hydrating before any request, reading an undeclared field). These are
//!   returned as `Err` immediately.
//! - `ErrorPayload` records what went wrong talking to the API. Entity
//!   actions store it on the entity instead of returning it; token
//!   operations return it as their `Err` side.

use std::fmt;

use serde::Serialize;

use crate::http::{HttpRequest, HttpResponse};

/// Caller errors returned as `Err` by entity operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DaxkoError {
    /// Required parameters were absent; every missing key is listed.
    #[error("Missing \"{}\" parameter(s).", .0.join(","))]
    MissingParameters(Vec<String>),

    /// A response-dependent operation ran before any request was made.
    #[error("cannot {0}: no response has been received")]
    MissingResponse(&'static str),

    /// The field is not declared on this entity type.
    #[error("Cannot access undefined property: \"{0}\".")]
    UndeclaredField(String),
}

/// Failure to complete an HTTP round-trip at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Ureq(#[from] ureq::Error),

    #[error("{0}")]
    Other(String),
}

/// A request that did not produce a 2xx response.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The path could not be joined onto the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {}", .response.status)]
    Status {
        request: HttpRequest,
        response: HttpResponse,
    },

    /// No response was received.
    #[error("{source}")]
    Transport {
        request: HttpRequest,
        #[source]
        source: TransportError,
    },
}

/// Details of a body that was not valid JSON.
///
/// `code` is the serde_json error category: 1 io, 2 syntax, 3 data, 4 eof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonDecodeError {
    pub code: i32,
    pub message: String,
}

impl JsonDecodeError {
    pub(crate) fn from_serde(err: &serde_json::Error) -> Self {
        let code = match err.classify() {
            serde_json::error::Category::Io => 1,
            serde_json::error::Category::Syntax => 2,
            serde_json::error::Category::Data => 3,
            serde_json::error::Category::Eof => 4,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// What went wrong during the last failed exchange with the API.
///
/// Serializes to a map holding only the keys that are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_decode: Option<JsonDecodeError>,
}

impl ErrorPayload {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// HTTP status parsed back out of the serialized response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response
            .as_deref()?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    }
}

impl From<RequestError> for ErrorPayload {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Status { request, response } => Self {
                request: Some(request.to_message()),
                response: Some(response.to_message()),
                ..Self::default()
            },
            RequestError::Transport { source, .. } => Self::message(source.to_string()),
            RequestError::InvalidUrl(err) => Self::message(format!("invalid request URL: {err}")),
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(message);
        }
        if let Some(status) = self.status() {
            return write!(f, "request failed with HTTP {status}");
        }
        if let Some(decode) = &self.json_decode {
            return write!(f, "response body is not valid JSON: {}", decode.message);
        }
        f.write_str("request failed")
    }
}

impl std::error::Error for ErrorPayload {}
