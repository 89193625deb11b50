use crate::models::requests::SearchRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Books API responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Invalid JSON from books API: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid books API URL: {0}")]
    InvalidUrl(String),
}

/// The upstream volumes API. Responses are passed through as opaque JSON.
#[async_trait]
pub trait BooksApi {
    /// `GET /volumes?q=..&maxResults=..&startIndex=..`
    async fn search_volumes(&self, request: &SearchRequest) -> Result<Value, UpstreamError>;
    /// `GET /volumes/{id}`
    async fn get_volume(&self, id: &str) -> Result<Value, UpstreamError>;
}

pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("GOOGLE_BOOKS_API_KEY is not set, the books API will apply reduced quotas");
        }
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn key_param(&self) -> Vec<(&'static str, String)> {
        self.api_key
            .iter()
            .map(|key| ("key", key.clone()))
            .collect()
    }

    async fn fetch(&self, url: &str, params: Vec<(&'static str, String)>) -> Result<Value, UpstreamError> {
        let response = self.client.get(url).query(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Books API request to {} failed with {}", url, status);
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BooksApi for GoogleBooksClient {
    async fn search_volumes(&self, request: &SearchRequest) -> Result<Value, UpstreamError> {
        let query = request.intent.upstream_query();
        info!("Searching books API: q={}", query);

        let mut params = vec![
            ("q", query),
            ("maxResults", request.max_results.to_string()),
            ("startIndex", request.start_index.to_string()),
        ];
        params.extend(self.key_param());

        let url = format!("{}/volumes", self.base_url);
        self.fetch(&url, params).await
    }

    async fn get_volume(&self, id: &str) -> Result<Value, UpstreamError> {
        info!("Fetching volume {}", id);

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("volumes")
            .push(id);

        self.fetch(url.as_str(), self.key_param()).await
    }
}
