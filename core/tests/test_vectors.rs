//! Verify request shapes and hydration against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector describes an input, the expected request, a simulated
//! response and the expected entity fields or token result. Comparing parsed
//! JSON (not raw strings) avoids false negatives from field ordering.

use std::sync::{Arc, Mutex};

use daxko_core::{
    auth, ApiResource, Config, Daxko, DaxkoClass, Entity, HttpMethod, HttpRequest, HttpResponse,
    JsonMap, Params, Transport, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Answers every request with one canned response and remembers the request.
#[derive(Debug)]
struct CannedTransport {
    response: HttpResponse,
    seen: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    fn from_vector(sim: &Value) -> Arc<Self> {
        Arc::new(Self {
            response: HttpResponse {
                status: sim["status"].as_u64().unwrap() as u16,
                headers: Vec::new(),
                body: sim["body"].as_str().unwrap().to_string(),
            },
            seen: Mutex::new(Vec::new()),
        })
    }

    fn only_request(&self) -> HttpRequest {
        let seen = self.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "expected exactly one request");
        seen[0].clone()
    }
}

impl Transport for CannedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

/// Every key in `expected` matches; every other declared field is null.
fn assert_fields(name: &str, fields: &JsonMap, expected: &Value) {
    let expected = expected.as_object().unwrap();
    for (key, value) in fields {
        match expected.get(key) {
            Some(want) => assert_eq!(value, want, "{name}: field {key}"),
            None => assert!(value.is_null(), "{name}: field {key} should be null"),
        }
    }
}

fn facade(transport: Arc<CannedTransport>) -> Daxko {
    Daxko::with_transport("T", &Config::new(BASE_URL), transport)
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

fn run_class_operation(class: &mut DaxkoClass, operation: &str, input: &Value) {
    let id = || input["id"].as_u64().unwrap();
    let attendee = || input["attendee"].as_u64().unwrap();
    match operation {
        "get" => {
            class.get(input["id"].as_str(), &Params::new()).unwrap();
        }
        "add_attendee" => {
            class.add_attendee(id(), attendee()).unwrap();
        }
        "remove_attendee" => {
            class.remove_attendee(id(), attendee()).unwrap();
        }
        "add_to_waitlist" => {
            class.add_to_waitlist(id(), attendee()).unwrap();
        }
        "remove_from_waitlist" => {
            class.remove_from_waitlist(id(), attendee()).unwrap();
        }
        other => panic!("unknown operation: {other}"),
    }
}

#[test]
fn class_test_vectors() {
    let raw = include_str!("../../test-vectors/classes.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = CannedTransport::from_vector(&case["simulated_response"]);
        let mut class = facade(transport.clone()).classes();

        run_class_operation(&mut class, case["operation"].as_str().unwrap(), &case["input"]);

        let req = transport.only_request();
        assert_request(name, &req, &case["expected_request"]);
        assert_eq!(req.header("authorization"), Some("Bearer T"), "{name}: auth header");
        assert_fields(name, &class.to_array(), &case["expected_fields"]);
        assert_eq!(
            class.has_errors(),
            case["expected_has_errors"].as_bool().unwrap(),
            "{name}: has_errors"
        );
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn user_test_vectors() {
    let raw = include_str!("../../test-vectors/users.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = CannedTransport::from_vector(&case["simulated_response"]);
        let params: Params = serde_json::from_value(case["params"].clone()).unwrap();

        let mut user = facade(transport.clone()).users();
        user.get(None, &params).unwrap();

        assert_request(name, &transport.only_request(), &case["expected_request"]);
        assert_fields(name, &user.to_array(), &case["expected_fields"]);
        assert_eq!(
            user.has_errors(),
            case["expected_has_errors"].as_bool().unwrap(),
            "{name}: has_errors"
        );
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[test]
fn token_test_vectors() {
    let raw = include_str!("../../test-vectors/tokens.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let config = Config::new(BASE_URL);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let transport = CannedTransport::from_vector(&case["simulated_response"]);
        let field = |key: &str| input[key].as_str().unwrap();

        let result = match case["operation"].as_str().unwrap() {
            "get_token" => auth::get_token(
                transport.clone(),
                &config,
                field("client_id"),
                field("client_secret"),
                field("scope"),
                field("grant_type"),
            ),
            "refresh_token" => auth::refresh_token(
                transport.clone(),
                &config,
                field("client_id"),
                field("refresh_token"),
            ),
            other => panic!("unknown operation: {other}"),
        };

        let req = transport.only_request();
        assert_request(name, &req, &case["expected_request"]);
        assert_eq!(req.header("authorization"), None, "{name}: no auth header");

        if let Some(status) = case.get("expected_error_status") {
            let err = result.unwrap_err();
            assert_eq!(err.status().map(u64::from), status.as_u64(), "{name}: status");
            assert!(
                err.response.as_deref().unwrap().contains(case["simulated_response"]["body"].as_str().unwrap()),
                "{name}: response body"
            );
        } else {
            let token = result.unwrap();
            assert_eq!(Value::Object(token), case["expected_result"], "{name}: result");
        }
    }
}
