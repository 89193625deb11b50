//! Caching proxy over the Google Books volumes API.
//!
//! Each `/api/books` request runs rate limit, then validation, then a cache
//! lookup, and only on a miss a single upstream call.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    handler::Handler,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, MethodRouter},
    Router,
};
use crate::config::Config;
use crate::routes::{books, cache, health};
use crate::services::rate_limit::rate_limit;
use crate::state::AppState;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn build_router(state: AppState) -> Router {
    let search_limit = middleware::from_fn_with_state(state.search_limiter.clone(), rate_limit);
    let general_limit = middleware::from_fn_with_state(state.general_limiter.clone(), rate_limit);

    let search_routes = Router::new()
        .route("/search", get_or_404(books::search_books))
        .route("/author", get_or_404(books::search_by_author))
        .route("/category", get_or_404(books::search_by_category))
        .route("/isbn/:isbn", get_or_404(books::search_by_isbn))
        .route_layer(search_limit);

    let book_routes = Router::new()
        .route("/:id", get_or_404(books::get_book_by_id))
        .merge(search_routes)
        .route_layer(general_limit.clone());

    let mut cache_routes = Router::new().route("/api/cache/stats", get_or_404(cache::cache_stats));
    if state.config.environment.is_development() {
        let flush = delete(cache::flush_cache).fallback(health::not_found);
        cache_routes = cache_routes.route("/api/cache", flush);
    }
    let cache_routes = cache_routes.route_layer(general_limit);

    Router::new()
        .route("/", get_or_404(health::welcome))
        .route("/health", get_or_404(health::health_check))
        .nest("/api/books", book_routes)
        .merge(cache_routes)
        .fallback(health::not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET route whose other methods get the JSON 404 instead of a bare 405.
fn get_or_404<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(health::not_found)
}

/// Development accepts any origin; other environments only the allow-list.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.environment.is_development() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}
