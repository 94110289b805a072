//! In-memory stand-in for the slice of the Trello REST API exercised by the
//! client tests.
//!
//! Credentials are checked the way Trello checks them: from the query string
//! on GET/DELETE and from the JSON body on POST/PUT. Rejections are plain
//! text bodies with status 401, matching what the real API sends.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub closed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub id_list: Option<String>,
    pub closed: bool,
}

/// The key/token pair the server accepts.
#[derive(Clone, Debug)]
pub struct Auth {
    pub key: String,
    pub token: String,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            key: "mykey".to_string(),
            token: "mytoken".to_string(),
        }
    }
}

#[derive(Default)]
struct Store {
    boards: HashMap<String, Board>,
    cards: HashMap<String, Card>,
}

struct AppState {
    auth: Auth,
    store: RwLock<Store>,
}

type Shared = Arc<AppState>;
type Rejection = (StatusCode, &'static str);
type Params = HashMap<String, String>;
type Body = Map<String, Value>;

/// Router with the default credentials and a seeded board `abc`.
pub fn app() -> Router {
    app_with(Auth::default())
}

pub fn app_with(auth: Auth) -> Router {
    let mut store = Store::default();
    store.boards.insert(
        "abc".to_string(),
        Board {
            id: "abc".to_string(),
            name: "Roadmap".to_string(),
            closed: false,
        },
    );
    let state = Arc::new(AppState {
        auth,
        store: RwLock::new(store),
    });

    Router::new()
        .route("/1/boards/{id}", get(get_board))
        .route("/1/cards", post(create_card))
        .route("/1/cards/{id}", get(get_card).put(update_card).delete(delete_card))
        .route("/1/search", get(search))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, auth: Auth) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(auth)).await
}

fn check_auth(auth: &Auth, key: Option<&str>, token: Option<&str>) -> Result<(), Rejection> {
    if key != Some(auth.key.as_str()) {
        debug!(?key, "rejecting request with bad key");
        return Err((StatusCode::UNAUTHORIZED, "invalid key"));
    }
    if token != Some(auth.token.as_str()) {
        debug!("rejecting request with bad token");
        return Err((StatusCode::UNAUTHORIZED, "invalid token"));
    }
    Ok(())
}

fn check_query_auth(auth: &Auth, params: &Params) -> Result<(), Rejection> {
    check_auth(
        auth,
        params.get("key").map(String::as_str),
        params.get("token").map(String::as_str),
    )
}

fn check_body_auth(auth: &Auth, body: &Body) -> Result<(), Rejection> {
    check_auth(
        auth,
        body.get("key").and_then(Value::as_str),
        body.get("token").and_then(Value::as_str),
    )
}

fn body_str(body: &Body, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Accepts JSON booleans and the strings an embedded query string produces.
fn body_bool(body: &Body, field: &str) -> Option<bool> {
    match body.get(field)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

async fn get_board(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Board>, Rejection> {
    check_query_auth(&state.auth, &params)?;
    let store = state.store.read().await;
    store
        .boards
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "board not found"))
}

async fn create_card(
    State(state): State<Shared>,
    Json(body): Json<Body>,
) -> Result<Json<Card>, Rejection> {
    check_body_auth(&state.auth, &body)?;
    let name = body_str(&body, "name").unwrap_or_default();
    let card = Card {
        id: Uuid::new_v4().simple().to_string(),
        name,
        desc: body_str(&body, "desc").unwrap_or_default(),
        id_list: body_str(&body, "idList"),
        closed: body_bool(&body, "closed").unwrap_or(false),
    };
    state
        .store
        .write()
        .await
        .cards
        .insert(card.id.clone(), card.clone());
    Ok(Json(card))
}

async fn get_card(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Card>, Rejection> {
    check_query_auth(&state.auth, &params)?;
    let store = state.store.read().await;
    store
        .cards
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "card not found"))
}

async fn update_card(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Body>,
) -> Result<Json<Card>, Rejection> {
    check_body_auth(&state.auth, &body)?;
    let mut store = state.store.write().await;
    let card = store
        .cards
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, "card not found"))?;
    if let Some(name) = body_str(&body, "name") {
        card.name = name;
    }
    if let Some(desc) = body_str(&body, "desc") {
        card.desc = desc;
    }
    if let Some(id_list) = body_str(&body, "idList") {
        card.id_list = Some(id_list);
    }
    if let Some(closed) = body_bool(&body, "closed") {
        card.closed = closed;
    }
    Ok(Json(card.clone()))
}

async fn delete_card(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    check_query_auth(&state.auth, &params)?;
    let mut store = state.store.write().await;
    store
        .cards
        .remove(&id)
        .map(|_| Json(serde_json::json!({ "_value": null })))
        .ok_or((StatusCode::NOT_FOUND, "card not found"))
}

async fn search(
    State(state): State<Shared>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    check_query_auth(&state.auth, &params)?;
    let query = params
        .get("query")
        .map(|q| q.to_lowercase())
        .ok_or((StatusCode::BAD_REQUEST, "invalid value for query"))?;
    let store = state.store.read().await;
    let mut cards: Vec<Card> = store
        .cards
        .values()
        .filter(|c| c.name.to_lowercase().contains(&query))
        .cloned()
        .collect();
    cards.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(serde_json::json!({ "cards": cards })))
}
