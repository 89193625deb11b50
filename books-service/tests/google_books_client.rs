use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use books_service::models::requests::{SearchIntent, SearchRequest};
use books_service::services::google_books::{BooksApi, GoogleBooksClient, UpstreamError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn volumes(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push(params);
    Json(json!({"kind": "books#volumes", "totalItems": 1, "items": [{"id": "abc"}]}))
}

async fn volume(
    State(seen): State<Seen>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push(params);
    Json(json!({"id": id}))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "quota exceeded")
}

/// Starts a stub books API on a random port and returns its base URL.
async fn start_stub() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/books/v1/volumes", get(volumes))
        .route("/books/v1/volumes/:id", get(volume))
        .route("/down/volumes", get(unavailable))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn search_sends_query_paging_and_key() {
    let (base, seen) = start_stub().await;
    let client = GoogleBooksClient::new(&format!("{}/books/v1", base), Some("k-123".to_string()));

    let request = SearchRequest::new(SearchIntent::ByAuthor("Ursula K. Le Guin".to_string()))
        .with_page(Some(5), Some(10));
    let body = client.search_volumes(&request).await.unwrap();

    assert_eq!(body["totalItems"], 1);
    let params = seen.lock().unwrap()[0].clone();
    assert_eq!(params["q"], "inauthor:\"Ursula K. Le Guin\"");
    assert_eq!(params["maxResults"], "5");
    assert_eq!(params["startIndex"], "10");
    assert_eq!(params["key"], "k-123");
}

#[tokio::test]
async fn key_is_omitted_when_not_configured() {
    let (base, seen) = start_stub().await;
    let client = GoogleBooksClient::new(&format!("{}/books/v1/", base), None);

    client
        .search_volumes(&SearchRequest::new(SearchIntent::FreeText("dune".to_string())))
        .await
        .unwrap();

    assert!(!seen.lock().unwrap()[0].contains_key("key"));
}

#[tokio::test]
async fn volume_id_is_used_as_path_segment() {
    let (base, _seen) = start_stub().await;
    let client = GoogleBooksClient::new(&format!("{}/books/v1", base), None);

    let body = client.get_volume("zyTCAlFPjgYC").await.unwrap();

    assert_eq!(body["id"], "zyTCAlFPjgYC");
}

#[tokio::test]
async fn non_success_status_is_surfaced() {
    let (base, _seen) = start_stub().await;
    let client = GoogleBooksClient::new(&format!("{}/down", base), None);

    let err = client
        .search_volumes(&SearchRequest::new(SearchIntent::FreeText("dune".to_string())))
        .await
        .unwrap_err();

    match err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {}", other),
    }
}
