use books_service::build_router;
use books_service::config::Config;
use books_service::services::google_books::GoogleBooksClient;
use books_service::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("books_service=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let books = GoogleBooksClient::new(&config.books_api_url, config.books_api_key.clone());
    let port = config.port;
    let check_period = config.cache_check_period;
    let environment = config.environment;
    let limits = format!(
        "{} req/{}s general, {} req/{}s searches",
        config.general_limit.max_requests,
        config.general_limit.window.as_secs(),
        config.search_limit.max_requests,
        config.search_limit.window.as_secs(),
    );

    let state = AppState::new(config, Arc::new(books));
    let sweeper = state.spawn_sweeper(check_period);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Books service starting on {}", addr);
    info!("Environment: {}", environment.as_str());
    info!("Rate limits: {}", limits);
    info!("Middleware: CORS, compression, security headers, in-memory cache, request tracing");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    info!("Server closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
