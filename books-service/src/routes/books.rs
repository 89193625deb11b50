use crate::error::ApiError;
use crate::models::requests::{
    AuthorParams, CategoryParams, PageParams, SearchIntent, SearchParams, SearchRequest,
};
use crate::models::responses::{BookResponse, EchoedParam, SearchResponse, VolumesPage};
use crate::services::cache::ResponseCache;
use crate::services::google_books::UpstreamError;
use crate::state::AppState;
use crate::utils::validation::{
    validate_author, validate_book_id, validate_category, validate_isbn, validate_search,
    FieldError,
};
use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Path, Query, State},
    http::Uri,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Serves `uri` from the cache, or awaits `fetch` and stores its result.
///
/// `decode` runs on every body, cached or fresh; a body is stored only once
/// it has decoded, so a malformed upstream reply is never served from cache.
async fn through_cache<F, T, D>(
    state: &AppState,
    uri: &Uri,
    ttl: Duration,
    fetch: F,
    decode: D,
) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<Value, UpstreamError>>,
    D: Fn(&Value) -> Result<T, UpstreamError>,
{
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let key = ResponseCache::request_key("GET", path_and_query);

    if let Some(body) = state.cache.get(&key) {
        return decode(&body);
    }

    let body = fetch.await?;
    let decoded = decode(&body)?;
    state.cache.set(&key, body, ttl);
    Ok(decoded)
}

fn decode_page(body: &Value) -> Result<VolumesPage, UpstreamError> {
    Ok(VolumesPage::deserialize(body)?)
}

/// Query string extraction with failures reported like any other invalid field.
fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    uri: &Uri,
) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        ApiError::Validation(vec![FieldError {
            field: "query".to_string(),
            message: rejection.body_text(),
            value: uri.query().map(|q| q.to_string()),
        }])
    })
}

async fn run_search(
    state: &AppState,
    uri: &Uri,
    request: SearchRequest,
    ttl: Duration,
    context: &'static str,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = through_cache(state, uri, ttl, state.books.search_volumes(&request), decode_page)
        .await
        .map_err(|e| ApiError::upstream(context, e, state.expose_error_detail()))?;

    info!(
        "{} -> {} total items",
        request.intent.upstream_query(),
        page.total_items
    );

    let echo = echoed(&request.intent);
    Ok(Json(SearchResponse::from_page(page, echo)))
}

fn echoed(intent: &SearchIntent) -> EchoedParam {
    let value = intent.value().to_string();
    match intent {
        SearchIntent::FreeText(_) => EchoedParam::Query(value),
        SearchIntent::ByAuthor(_) => EchoedParam::Author(value),
        SearchIntent::ByCategory(_) => EchoedParam::Category(value),
        SearchIntent::ByIsbn(_) => EchoedParam::Isbn(value),
    }
}

pub async fn search_books(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = query_params(query, &uri)?;
    let request = validate_search(&params).map_err(ApiError::Validation)?;
    let ttl = state.config.cache_ttls.search;
    run_search(&state, &uri, request, ttl, "Error searching books").await
}

pub async fn search_by_author(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<AuthorParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = query_params(query, &uri)?;
    let request = validate_author(&params).map_err(ApiError::Validation)?;
    let ttl = state.config.cache_ttls.author;
    run_search(&state, &uri, request, ttl, "Error searching books by author").await
}

pub async fn search_by_category(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<CategoryParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = query_params(query, &uri)?;
    let request = validate_category(&params).map_err(ApiError::Validation)?;
    let ttl = state.config.cache_ttls.category;
    run_search(&state, &uri, request, ttl, "Error searching books by category").await
}

pub async fn search_by_isbn(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(isbn): Path<String>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let params = query_params(query, &uri)?;
    let request = validate_isbn(&isbn, &params).map_err(ApiError::Validation)?;
    let ttl = state.config.cache_ttls.isbn;
    run_search(&state, &uri, request, ttl, "Error searching books by ISBN").await
}

pub async fn get_book_by_id(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let id = validate_book_id(&id).map_err(ApiError::Validation)?;
    let ttl = state.config.cache_ttls.book;

    let book = through_cache(&state, &uri, ttl, state.books.get_volume(&id), |body| {
        Ok(body.clone())
    })
    .await
    .map_err(|e| ApiError::upstream("Error fetching book by ID", e, state.expose_error_detail()))?;

    Ok(Json(BookResponse {
        success: true,
        book,
    }))
}
