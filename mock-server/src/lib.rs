//! In-memory stand-in for the Daxko partner API.
//!
//! Serves the token endpoint and the class/user resources the client uses,
//! seeded with a small fixed data set. Resource routes require a bearer token
//! that is either `SEED_TOKEN` or one issued by `/auth/token`.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const CLIENT_ID: &str = "mock-client";
pub const CLIENT_SECRET: &str = "mock-secret";
/// Bearer token accepted without going through `/auth/token`.
pub const SEED_TOKEN: &str = "mock-token";
/// Refresh token accepted without going through `/auth/token`.
pub const SEED_REFRESH_TOKEN: &str = "mock-refresh";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub location_id: String,
    pub category: String,
    pub instructor: String,
    pub free: bool,
    pub reservable: bool,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub booking_details: BookingDetails,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub capacity: u32,
    pub booked: u32,
    pub waitlisted: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /auth/token`; covers both grant flows.
#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub grant_type: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub classes: HashMap<String, Class>,
    pub users: Vec<User>,
    pub attendees: HashSet<(String, String)>,
    pub waitlist: HashSet<(String, String)>,
    pub access_tokens: HashSet<String>,
    pub refresh_tokens: HashSet<String>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<Value>);

/// The store every fresh `app()` starts from.
pub fn seed() -> Store {
    let class = |id: &str, name: &str, start: &str, end: &str, capacity: u32| Class {
        id: id.to_string(),
        name: name.to_string(),
        start_date_time: start.to_string(),
        end_date_time: end.to_string(),
        location_id: "5506".to_string(),
        category: "Fitness".to_string(),
        instructor: "Sam".to_string(),
        free: false,
        reservable: true,
        is_virtual: false,
        booking_details: BookingDetails {
            capacity,
            booked: 0,
            waitlisted: 0,
        },
    };

    let mut store = Store::default();
    for c in [
        class("123", "Yoga", "2020-03-01T09:00:00", "2020-03-01T10:00:00", 10),
        class("456", "Spin", "2020-03-02T18:00:00", "2020-03-02T19:00:00", 1),
    ] {
        store.classes.insert(c.id.clone(), c);
    }
    store.users.push(User {
        id: "42".to_string(),
        email: "a@b.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Byron".to_string(),
    });
    store.access_tokens.insert(SEED_TOKEN.to_string());
    store.refresh_tokens.insert(SEED_REFRESH_TOKEN.to_string());
    store
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/auth/token", post(issue_token))
        .route("/api/v1/classes", get(list_classes))
        .route("/api/v1/classes/", get(list_classes))
        .route("/api/v1/classes/{id}", get(get_class))
        .route(
            "/api/v1/classes/{id}/attendees/{attendee}",
            post(add_attendee).delete(remove_attendee),
        )
        .route(
            "/api/v1/classes/{id}/waitlist/attendees/{attendee}",
            post(add_to_waitlist).delete(remove_from_waitlist),
        )
        .route("/api/v1/users", get(find_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "message": message })))
}

fn authorize(headers: &HeaderMap, store: &Store) -> Result<(), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        Some(token) if store.access_tokens.contains(token) => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "unauthorized")),
    }
}

fn grant(store: &mut Store) -> Value {
    let access_token = Uuid::new_v4().to_string();
    let refresh_token = Uuid::new_v4().to_string();
    store.access_tokens.insert(access_token.clone());
    store.refresh_tokens.insert(refresh_token.clone());
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "Bearer",
        "expires_in": 3600,
    })
}

async fn issue_token(
    State(db): State<Db>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    if body.client_id != CLIENT_ID {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        ));
    }

    if body.grant_type == "refresh_token" {
        let presented = body.refresh_token.unwrap_or_default();
        if !store.refresh_tokens.remove(&presented) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant" })),
            ));
        }
        info!("refreshed access token");
        return Ok(Json(grant(&mut store)));
    }

    if body.client_secret.as_deref() != Some(CLIENT_SECRET) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        ));
    }
    debug!(scope = ?body.scope, grant_type = %body.grant_type, "issuing access token");
    Ok(Json(grant(&mut store)))
}

async fn list_classes(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Class>>, ApiError> {
    let store = db.read().await;
    authorize(&headers, &store)?;

    for key in ["startDate", "endDate", "locationId"] {
        if !query.contains_key(key) {
            return Err(error(StatusCode::BAD_REQUEST, &format!("{key} is required")));
        }
    }
    let start = &query["startDate"];
    let end = &query["endDate"];
    let location = &query["locationId"];

    let mut classes: Vec<Class> = store
        .classes
        .values()
        .filter(|c| &c.location_id == location)
        .filter(|c| c.start_date_time.as_str() >= start.as_str())
        .filter(|c| c.start_date_time.get(..10).unwrap_or_default() <= end.as_str())
        .cloned()
        .collect();
    classes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(classes))
}

async fn get_class(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Class>, ApiError> {
    let store = db.read().await;
    authorize(&headers, &store)?;
    store
        .classes
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "class not found"))
}

fn booking(class: &Class, attendee: &str, status: &str) -> Json<Value> {
    Json(json!({
        "attendeeBookingDetails": {
            "classId": class.id,
            "attendeeId": attendee,
            "status": status,
        },
        "bookingDetails": class.booking_details,
    }))
}

async fn add_attendee(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, attendee)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    authorize(&headers, &store)?;
    let key = (id.clone(), attendee.clone());
    if store.attendees.contains(&key) {
        return Err(error(StatusCode::CONFLICT, "already booked"));
    }
    let class = store
        .classes
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "class not found"))?;
    if class.booking_details.booked >= class.booking_details.capacity {
        return Err(error(StatusCode::CONFLICT, "class full"));
    }
    class.booking_details.booked += 1;
    let response = booking(class, &attendee, "booked");
    store.attendees.insert(key);
    Ok(response)
}

async fn remove_attendee(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, attendee)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    authorize(&headers, &store)?;
    if !store.attendees.remove(&(id.clone(), attendee.clone())) {
        return Err(error(StatusCode::NOT_FOUND, "booking not found"));
    }
    let class = store
        .classes
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "class not found"))?;
    class.booking_details.booked = class.booking_details.booked.saturating_sub(1);
    Ok(booking(class, &attendee, "cancelled"))
}

async fn add_to_waitlist(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, attendee)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    authorize(&headers, &store)?;
    let key = (id.clone(), attendee.clone());
    if store.waitlist.contains(&key) {
        return Err(error(StatusCode::CONFLICT, "already waitlisted"));
    }
    let class = store
        .classes
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "class not found"))?;
    class.booking_details.waitlisted += 1;
    let response = booking(class, &attendee, "waitlisted");
    store.waitlist.insert(key);
    Ok(response)
}

async fn remove_from_waitlist(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, attendee)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    authorize(&headers, &store)?;
    if !store.waitlist.remove(&(id.clone(), attendee.clone())) {
        return Err(error(StatusCode::NOT_FOUND, "waitlist entry not found"));
    }
    let class = store
        .classes
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "class not found"))?;
    class.booking_details.waitlisted = class.booking_details.waitlisted.saturating_sub(1);
    Ok(booking(class, &attendee, "removed"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

async fn find_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Result<Json<User>, ApiError> {
    let store = db.read().await;
    authorize(&headers, &store)?;
    if query.email.is_none() && query.first_name.is_none() && query.last_name.is_none() {
        return Err(error(StatusCode::BAD_REQUEST, "email or name is required"));
    }
    store
        .users
        .iter()
        .find(|user| {
            query.email.as_deref().map_or(true, |email| user.email == email)
                && query.first_name.as_deref().map_or(true, |name| user.first_name == name)
                && query.last_name.as_deref().map_or(true, |name| user.last_name == name)
        })
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "user not found"))
}
