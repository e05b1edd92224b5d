//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data with owned fields. The `Client`
//! builds an `HttpRequest`, a `Transport` turns it into an `HttpResponse`, and
//! entities decode the body. Keeping the exchange as data lets unit tests
//! script responses without a network.
//!
//! Both types render as HTTP/1.1 message text. That text is what ends up in
//! the `request`/`response` keys of an `ErrorPayload`.

use std::fmt;

use ureq::http::StatusCode;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Render as an HTTP/1.1 request message.
    pub fn to_message(&self) -> String {
        let (target, host) = match Url::parse(&self.url) {
            Ok(url) => {
                let mut target = url.path().to_string();
                if let Some(query) = url.query() {
                    target.push('?');
                    target.push_str(query);
                }
                let host = url.host_str().map(|host| match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                });
                (target, host)
            }
            Err(_) => (self.url.clone(), None),
        };

        let mut message = format!("{} {target} HTTP/1.1", self.method);
        if let Some(host) = host.filter(|_| self.header("host").is_none()) {
            message.push_str(&format!("\r\nHost: {host}"));
        }
        push_headers(&mut message, &self.headers);
        message.push_str("\r\n\r\n");
        if let Some(body) = &self.body {
            message.push_str(body);
        }
        message
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Render as an HTTP/1.1 response message.
    pub fn to_message(&self) -> String {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("");
        let mut message = format!("HTTP/1.1 {} {reason}", self.status);
        push_headers(&mut message, &self.headers);
        message.push_str("\r\n\r\n");
        message.push_str(&self.body);
        message
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn push_headers(message: &mut String, headers: &[(String, String)]) {
    for (name, value) in headers {
        message.push_str("\r\n");
        message.push_str(name);
        message.push_str(": ");
        message.push_str(value);
    }
}
