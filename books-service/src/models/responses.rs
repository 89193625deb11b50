use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub service: String,
    pub environment: String,
    pub timestamp: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct WelcomeResponse {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}

/// The only fields of an upstream volumes page this service looks at.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesPage {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Request parameter echoed back next to the results.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EchoedParam {
    Query(String),
    Author(String),
    Category(String),
    Isbn(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub total_items: u64,
    pub items: Vec<Value>,
    #[serde(flatten)]
    pub echo: EchoedParam,
}

impl SearchResponse {
    pub fn from_page(page: VolumesPage, echo: EchoedParam) -> Self {
        Self {
            success: true,
            total_items: page.total_items,
            items: page.items,
            echo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub book: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub success: bool,
    pub stats: CacheStats,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub keys: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlushResponse {
    pub success: bool,
    pub flushed: usize,
}
