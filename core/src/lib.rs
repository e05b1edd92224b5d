//! Blocking client for the Daxko partner API.
//!
//! # Overview
//! `Daxko` holds a bearer-authenticated `Client` and hands out entities
//! (`DaxkoClass`, `DaxkoUser`). Each entity sends its own requests, keeps the
//! last response and hydrates a fixed record of declared fields from the
//! decoded JSON body. Token acquisition lives beside the facade and shares no
//! state with it.
//!
//! # Design
//! - Entities are composed around `EntityState`, not inherited from a base.
//! - Transport failures never surface as `Err` from entity actions; they are
//!   stored as an `ErrorPayload` and checked with `has_errors()`.
//! - Caller mistakes (missing listing parameters, undeclared fields,
//!   hydrating before a request) are `DaxkoError`s returned immediately.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   blocking default.

pub mod auth;
pub mod class;
pub mod client;
pub mod config;
pub mod daxko;
pub mod entity;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod user;

pub use class::{ClassRecord, DaxkoClass};
pub use client::Client;
pub use config::Config;
pub use daxko::Daxko;
pub use entity::{ApiResource, Entity, EntityState, Record};
pub use error::{DaxkoError, ErrorPayload, JsonDecodeError, RequestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{params, JsonMap, Params, RefreshTokenRequest, TokenRequest};
pub use user::{DaxkoUser, UserRecord};
