use crate::error::ApiError;
use crate::models::responses::{HealthResponse, WelcomeResponse};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, State},
    response::Json,
};
use chrono::Utc;
use std::collections::BTreeMap;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok".to_string(),
        service: "books-service".to_string(),
        environment: state.config.environment.as_str().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn welcome() -> Json<WelcomeResponse> {
    let endpoints = [
        ("search", "/api/books/search"),
        ("getBookById", "/api/books/:id"),
        ("searchByAuthor", "/api/books/author"),
        ("searchByCategory", "/api/books/category"),
        ("searchByISBN", "/api/books/isbn/:isbn"),
        ("health", "/health"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(WelcomeResponse {
        message: "Welcome to the books API".to_string(),
        endpoints,
    })
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound {
        path: uri.path().to_string(),
    }
}
