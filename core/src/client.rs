//! A configured HTTP client: base URL, default headers and a transport.
//!
//! # Design
//! `Client` is cheap to clone and carries no mutable state. Every call joins a
//! relative path onto the base URL, attaches the default headers, sends the
//! request through the shared `Transport` and sorts the outcome into success
//! or `RequestError`. The facade and every entity it creates share one
//! `Client`; token requests build their own.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::Params;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            transport,
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Resolve `path` against the base URL, append `segments` and attach
    /// query and headers.
    ///
    /// Each entry of `segments` becomes exactly one path segment: `/`, `?`,
    /// `#` and `%` are percent-encoded and the dot segments `.` and `..` are
    /// dropped, so caller-supplied ids cannot move the request elsewhere.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        segments: &[&str],
        query: &Params,
        body: Option<String>,
    ) -> Result<HttpRequest, url::ParseError> {
        let base = Url::parse(&format!("{}/", self.base_url))?;
        let mut url = base.join(path.trim_start_matches('/'))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .pop_if_empty()
                .extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: self.headers.clone(),
            body,
        })
    }

    /// Send one request. Non-2xx responses come back as `RequestError::Status`.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        segments: &[&str],
        query: &Params,
        body: Option<String>,
    ) -> Result<HttpResponse, RequestError> {
        let request = self.build_request(method, path, segments, query, body)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(source) => {
                warn!(method = %request.method, url = %request.url, error = %source, "request failed");
                return Err(RequestError::Transport { request, source });
            }
        };

        if !response.is_success() {
            warn!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                "request returned error status"
            );
            return Err(RequestError::Status { request, response });
        }

        debug!(status = response.status, "received response");
        Ok(response)
    }
}
