use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeRecord {
    pub id: String,
    pub name: String,
    pub service: String,
    pub published: bool,
}

#[derive(Deserialize)]
pub struct CodeSubmission {
    pub name: String,
    pub service: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub published: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, CodeRecord>>>;

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/code", get(list_code))
        .route("/code/{id}", get(get_record))
        .route("/code/validate", post(validate_code))
        .route("/code/publish/{id}", get(publish_code))
        .route("/code/unpublish/{name}", get(unpublish_code))
        .route("/cealloga/_test/{id}", post(exec_test))
        .route("/cealloga/{name}", post(exec_published))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Wrap `value` as a buffer payload: one code point per character of its
/// JSON text.
pub fn encode_buffer(value: &Value) -> Value {
    let code_points: Vec<u32> = value.to_string().chars().map(u32::from).collect();
    json!({"type": "Buffer", "data": code_points})
}

fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({"error": format!("{what} not found")})))
}

/// Accepts `1`/`0` and `true`/`false`.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

async fn list_code(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CodeRecord>>, ApiError> {
    let published = match query.published.as_deref() {
        None => None,
        Some(raw) => Some(parse_flag(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("invalid published flag: {raw}")})),
            )
        })?),
    };
    let records = db.read().await;
    let mut matching: Vec<CodeRecord> = records
        .values()
        .filter(|r| query.name.as_ref().map_or(true, |name| &r.name == name))
        .filter(|r| published.map_or(true, |p| r.published == p))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(matching))
}

async fn get_record(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<CodeRecord>, ApiError> {
    let records = db.read().await;
    records.get(&id).cloned().map(Json).ok_or_else(|| not_found("record"))
}

async fn validate_code(
    State(db): State<Db>,
    Json(input): Json<CodeSubmission>,
) -> Result<Json<CodeRecord>, ApiError> {
    if input.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "name must not be empty"})),
        ));
    }
    let record = CodeRecord {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        service: input.service,
        published: false,
    };
    db.write().await.insert(record.id.clone(), record.clone());
    Ok(Json(record))
}

/// Publishing a record unpublishes any other record with the same name.
async fn publish_code(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<CodeRecord>, ApiError> {
    let mut records = db.write().await;
    let name = records
        .get(&id)
        .map(|r| r.name.clone())
        .ok_or_else(|| not_found("record"))?;
    for record in records.values_mut().filter(|r| r.name == name) {
        record.published = record.id == id;
    }
    records.get(&id).cloned().map(Json).ok_or_else(|| not_found("record"))
}

async fn unpublish_code(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut records = db.write().await;
    let mut count = 0;
    for record in records.values_mut().filter(|r| r.name == name && r.published) {
        record.published = false;
        count += 1;
    }
    if count == 0 {
        return Err(not_found("published service"));
    }
    Ok(Json(json!({"name": name, "unpublished": count})))
}

/// Executes a record. The mock executor echoes the payload back, wrapped as
/// an encoded buffer.
async fn exec_test(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let records = db.read().await;
    if !records.contains_key(&id) {
        return Err(not_found("record"));
    }
    Ok(Json(encode_buffer(&payload)))
}

async fn exec_published(
    State(db): State<Db>,
    Path(name): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let records = db.read().await;
    if !records.values().any(|r| r.name == name && r.published) {
        return Err(not_found("published service"));
    }
    Ok(Json(encode_buffer(&payload)))
}
