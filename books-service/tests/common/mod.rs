#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use books_service::build_router;
use books_service::config::{Config, Environment};
use books_service::models::requests::SearchRequest;
use books_service::services::google_books::{BooksApi, UpstreamError};
use books_service::state::AppState;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Upstream stand-in that counts calls and records the last search.
#[derive(Default)]
pub struct MockBooks {
    search_calls: AtomicUsize,
    volume_calls: AtomicUsize,
    failing: AtomicBool,
    last_search: Mutex<Option<SearchRequest>>,
}

impl MockBooks {
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn volume_calls(&self) -> usize {
        self.volume_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_search(&self) -> Option<SearchRequest> {
        self.last_search.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BooksApi for MockBooks {
    async fn search_volumes(&self, request: &SearchRequest) -> Result<Value, UpstreamError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some(request.clone());
        self.check_failure()?;

        match request.intent.value() {
            "nothing" => return Ok(json!({"kind": "books#volumes", "totalItems": 0})),
            "malformed" => return Ok(json!({"totalItems": "many", "items": 5})),
            _ => {}
        }
        Ok(json!({
            "kind": "books#volumes",
            "totalItems": 2,
            "items": [
                {"id": "vol-1", "volumeInfo": {"title": "The Hobbit"}},
                {"id": "vol-2", "volumeInfo": {"title": "The Silmarillion"}}
            ]
        }))
    }

    async fn get_volume(&self, id: &str) -> Result<Value, UpstreamError> {
        self.volume_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(json!({"id": id, "volumeInfo": {"title": "The Hobbit"}}))
    }
}

pub fn test_config(environment: Environment) -> Config {
    Config {
        environment,
        ..Config::default()
    }
}

pub fn test_app(config: Config) -> (Router, Arc<MockBooks>) {
    let mock = Arc::new(MockBooks::default());
    let state = AppState::new(config, mock.clone());
    (build_router(state), mock)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, method: Method, uri: &str, client: [u8; 4]) -> TestResponse {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((client, 40000))));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, [127, 0, 0, 1]).await
}

pub async fn get_from(app: &Router, uri: &str, client: [u8; 4]) -> TestResponse {
    send(app, Method::GET, uri, client).await
}
