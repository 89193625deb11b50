use crate::models::responses::{CacheStatsResponse, FlushResponse};
use crate::state::AppState;
use axum::{extract::State, response::Json};
use tracing::info;

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        success: true,
        stats: state.cache.stats(),
    })
}

pub async fn flush_cache(State(state): State<AppState>) -> Json<FlushResponse> {
    let flushed = state.cache.flush();
    info!("Cache flushed, {} entries removed", flushed);
    Json(FlushResponse {
        success: true,
        flushed,
    })
}
