use crate::config::Config;
use crate::services::cache::ResponseCache;
use crate::services::google_books::BooksApi;
use crate::services::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::debug;

pub type Backend = Arc<dyn BooksApi + Send + Sync>;

/// Shared dependencies, built once at start-up and handed to the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub books: Backend,
    pub cache: Arc<ResponseCache>,
    pub general_limiter: Arc<RateLimiter>,
    pub search_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, books: Backend) -> Self {
        let general_limiter = RateLimiter::new(config.general_limit.clone(), config.trust_proxy);
        let search_limiter = RateLimiter::new(config.search_limit.clone(), config.trust_proxy);

        Self {
            config: Arc::new(config),
            books,
            cache: Arc::new(ResponseCache::new()),
            general_limiter: Arc::new(general_limiter),
            search_limiter: Arc::new(search_limiter),
        }
    }

    pub fn expose_error_detail(&self) -> bool {
        self.config.environment.is_development()
    }

    /// Spawns the periodic sweep of expired cache entries and limiter windows.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = state.cache.evict_expired();
                state.general_limiter.purge_expired();
                state.search_limiter.purge_expired();
                debug!("Sweep finished, {} cache entries evicted", evicted);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requests::SearchRequest;
    use crate::services::google_books::UpstreamError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NoBooks;

    #[async_trait]
    impl BooksApi for NoBooks {
        async fn search_volumes(&self, _request: &SearchRequest) -> Result<Value, UpstreamError> {
            Ok(json!({"totalItems": 0}))
        }

        async fn get_volume(&self, id: &str) -> Result<Value, UpstreamError> {
            Ok(json!({"id": id}))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_expired_entries() {
        let state = AppState::new(Config::default(), Arc::new(NoBooks));
        state.cache.set("short", json!(1), Duration::from_secs(30));
        state.cache.set("long", json!(2), Duration::from_secs(600));

        let handle = state.spawn_sweeper(Duration::from_secs(120));
        time::sleep(Duration::from_secs(121)).await;

        assert_eq!(state.cache.stats().keys, 1);
        handle.abort();
    }

    #[test]
    fn error_detail_follows_environment() {
        let mut config = Config::default();
        assert!(AppState::new(config.clone(), Arc::new(NoBooks)).expose_error_detail());

        config.environment = crate::config::Environment::Production;
        assert!(!AppState::new(config, Arc::new(NoBooks)).expose_error_detail());
    }
}
