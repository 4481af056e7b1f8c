#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use outline_admin::config::AppConfig;
use outline_admin::session::{MemoryTokenStore, Navigator};

pub const API_PREFIX: &str = "/admin_app/api";
pub const TOKEN: &str = "test-token";

/// One multipart part as the backend saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    File { file_name: Option<String>, content_type: Option<String>, len: usize },
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path with the API prefix removed, e.g. `/tags/`
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub json: Option<Value>,
    pub parts: Vec<(String, Part)>,
}

impl RecordedRequest {
    pub fn is_multipart(&self) -> bool {
        self.content_type.as_deref().is_some_and(|c| c.starts_with("multipart/form-data"))
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn text_parts(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|(n, part)| match part {
                Part::Text(value) if n == name => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Default)]
pub struct BackendState {
    requests: Mutex<Vec<RecordedRequest>>,
    collections: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicI64,
    valid_token: Mutex<Option<String>>,
    overrides: Mutex<HashMap<(Method, String), (StatusCode, String)>>,
    delay: Mutex<Option<Duration>>,
}

/// In-process stand-in for the admin REST API
pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(BackendState {
            next_id: AtomicI64::new(100),
            valid_token: Mutex::new(Some(TOKEN.to_string())),
            ..Default::default()
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind fake backend")?;
        let addr = listener.local_addr()?;

        let app = Router::new().fallback(handle).with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, handle })
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn base_url(&self) -> String {
        format!("{}{}", self.origin(), API_PREFIX)
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::for_backend(&self.base_url(), &self.origin())
    }

    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        self.state.collections.lock().unwrap().insert(collection.to_string(), records);
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state.collections.lock().unwrap().get(collection).cloned().unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn reject_all_tokens(&self) {
        *self.state.valid_token.lock().unwrap() = Some(String::from("\u{0}never"));
    }

    /// Answer one method+path with a canned response instead of the in-memory store
    pub fn respond_with(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.state
            .overrides
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.state
            .overrides
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    /// Hold every response for `delay`
    pub fn delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(State(state): State<Arc<BackendState>>, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().strip_prefix(API_PREFIX).unwrap_or(req.uri().path()).to_string();
    let authorization = header_value(&req, header::AUTHORIZATION);
    let content_type = header_value(&req, header::CONTENT_TYPE);

    let mut json_body = None;
    let mut parts = Vec::new();
    if content_type.as_deref().is_some_and(|c| c.starts_with("multipart/form-data")) {
        let Ok(mut multipart) = Multipart::from_request(req, &state).await else {
            return (StatusCode::BAD_REQUEST, "bad multipart").into_response();
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(String::from);
            let part_type = field.content_type().map(String::from);
            let bytes = field.bytes().await.unwrap_or_default();
            let part = match file_name {
                Some(_) => Part::File {
                    file_name,
                    content_type: part_type,
                    len: bytes.len(),
                },
                None => Part::Text(String::from_utf8_lossy(&bytes).into_owned()),
            };
            parts.push((name, part));
        }
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap_or_default();
        if !bytes.is_empty() {
            json_body = serde_json::from_slice(&bytes).ok();
        }
    }

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        content_type,
        json: json_body.clone(),
        parts: parts.clone(),
    });

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let expected = state.valid_token.lock().unwrap().clone();
    if let Some(token) = expected {
        if authorization.as_deref() != Some(format!("Bearer {}", token).as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Given token not valid for any token type"})),
            )
                .into_response();
        }
    }

    let canned = state.overrides.lock().unwrap().get(&(method.clone(), path.clone())).cloned();
    if let Some((status, body)) = canned {
        return (status, [(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let body = match json_body {
        Some(Value::Object(map)) => map,
        _ => form_object(&path, parts),
    };
    route(&state, &method, &path, body)
}

fn route(state: &BackendState, method: &Method, path: &str, body: Map<String, Value>) -> Response {
    let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["news", "create"]) => list(state, "news"),
        ("POST", ["news", "create"]) => create(state, "news", body),
        ("PUT" | "PATCH", ["news", id, "update"]) => update(state, "news", id, body),
        ("DELETE", ["news", id, "delete"]) => delete(state, "news", id),
        ("GET", [name]) => list(state, name),
        ("POST", [name]) => create(state, name, body),
        ("GET", [name, id]) => get(state, name, id),
        ("PUT" | "PATCH", [name, id]) if *name != "news" => update(state, name, id, body),
        ("DELETE", [name, id]) if *name != "news" => delete(state, name, id),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

fn list(state: &BackendState, name: &str) -> Response {
    let records = state.collections.lock().unwrap().get(name).cloned().unwrap_or_default();
    Json(Value::Array(records)).into_response()
}

fn get(state: &BackendState, name: &str, id: &str) -> Response {
    let collections = state.collections.lock().unwrap();
    match find(collections.get(name), id) {
        Some(index) => Json(collections[name][index].clone()).into_response(),
        None => not_found(),
    }
}

fn create(state: &BackendState, name: &str, mut body: Map<String, Value>) -> Response {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    body.insert("id".to_string(), json!(id));
    let record = Value::Object(body);
    state
        .collections
        .lock()
        .unwrap()
        .entry(name.to_string())
        .or_default()
        .push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

fn update(state: &BackendState, name: &str, id: &str, body: Map<String, Value>) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let Some(index) = find(collections.get(name), id) else {
        return not_found();
    };
    let Some(records) = collections.get_mut(name) else {
        return not_found();
    };
    if let Value::Object(existing) = &mut records[index] {
        for (key, value) in body {
            existing.insert(key, value);
        }
    }
    Json(records[index].clone()).into_response()
}

fn delete(state: &BackendState, name: &str, id: &str) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let Some(index) = find(collections.get(name), id) else {
        return not_found();
    };
    if let Some(records) = collections.get_mut(name) {
        records.remove(index);
    }
    StatusCode::NO_CONTENT.into_response()
}

fn find(records: Option<&Vec<Value>>, id: &str) -> Option<usize> {
    let id: i64 = id.parse().ok()?;
    records?.iter().position(|r| r["id"].as_i64() == Some(id))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

const RELATION_FIELDS: &[&str] = &["tags", "category", "news"];

/// Fold multipart parts into a record: repeated names become arrays,
/// files become media paths
fn form_object(path: &str, parts: Vec<(String, Part)>) -> Map<String, Value> {
    let collection = path.trim_matches('/').split('/').next().unwrap_or("media").to_string();
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for (name, part) in parts {
        let value = match part {
            // Relation ids are stored as numbers
            Part::Text(text) if RELATION_FIELDS.contains(&name.as_str()) => match text.parse::<i64>() {
                Ok(id) => json!(id),
                Err(_) => Value::String(text),
            },
            Part::Text(text) => Value::String(text),
            Part::File { file_name, .. } => {
                Value::String(format!("/media/{}/{}", collection, file_name.unwrap_or_default()))
            }
        };
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name, vec![value])),
        }
    }

    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 && name != "tags" {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            (name, value)
        })
        .collect()
}

fn header_value(req: &Request, name: header::HeaderName) -> Option<String> {
    req.headers().get(name).and_then(|v| v.to_str().ok()).map(String::from)
}

/// Navigator that remembers where it was sent
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub fn logged_in() -> (Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
    (
        Arc::new(MemoryTokenStore::with_token(TOKEN)),
        Arc::new(RecordingNavigator::default()),
    )
}

pub fn logged_out() -> (Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
    (Arc::new(MemoryTokenStore::new()), Arc::new(RecordingNavigator::default()))
}
