//! Web fallback search.
//!
//! One adapter per search API shape, chosen by configuration. Failures are
//! never fatal to answering: [`search_or_empty`] turns them into no hits.

pub mod duckduckgo;
pub mod google;

pub use duckduckgo::DuckDuckGoSearch;
pub use google::GoogleSearch;

use crate::types::WebHit;
use localrag_core::config::SearchSettings;
use localrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// A web search backend.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Search and return at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebHit>>;
}

/// Search, logging and discarding any failure.
pub async fn search_or_empty(search: &dyn WebSearch, query: &str, max_results: usize) -> Vec<WebHit> {
    match search.search(query, max_results).await {
        Ok(mut hits) => {
            hits.truncate(max_results);
            tracing::info!(
                "Web search ({}) returned {} hits",
                search.provider_name(),
                hits.len()
            );
            hits
        }
        Err(e) => {
            tracing::warn!("Web search ({}) failed: {}", search.provider_name(), e);
            Vec::new()
        }
    }
}

/// Search adapter that never returns hits.
#[derive(Debug, Default)]
pub struct DisabledSearch;

#[async_trait::async_trait]
impl WebSearch for DisabledSearch {
    fn provider_name(&self) -> &str {
        "none"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<WebHit>> {
        Ok(Vec::new())
    }
}

/// Create the configured search adapter.
pub fn create_search(settings: &SearchSettings) -> AppResult<Arc<dyn WebSearch>> {
    match settings.provider.as_str() {
        "duckduckgo" => Ok(Arc::new(DuckDuckGoSearch::new(http_client(settings)?))),

        "google" => {
            let api_key = settings.google_api_key().ok_or_else(|| {
                AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    settings.google_api_key_env
                ))
            })?;
            let engine_id = settings.google_engine_id.clone().ok_or_else(|| {
                AppError::Config("Google search requires search.googleEngineId".to_string())
            })?;
            Ok(Arc::new(GoogleSearch::new(
                http_client(settings)?,
                api_key,
                engine_id,
            )))
        }

        "none" => Ok(Arc::new(DisabledSearch)),

        other => Err(AppError::Config(format!(
            "Unknown search provider: '{}'. Supported: duckduckgo, google, none",
            other
        ))),
    }
}

fn http_client(settings: &SearchSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout))
        .user_agent(concat!("localrag/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Search(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSearch(Vec<WebHit>);

    #[async_trait::async_trait]
    impl WebSearch for FixedSearch {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<WebHit>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSearch;

    #[async_trait::async_trait]
    impl WebSearch for BrokenSearch {
        fn provider_name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<WebHit>> {
            Err(AppError::Search("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_search_or_empty_swallows_errors() {
        assert!(search_or_empty(&BrokenSearch, "q", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_or_empty_truncates() {
        let hits = (0..8)
            .map(|i| WebHit::new(format!("T{}", i), format!("http://u/{}", i), "body"))
            .collect();
        let result = search_or_empty(&FixedSearch(hits), "q", 3).await;
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].url, "http://u/0");
    }

    #[tokio::test]
    async fn test_disabled_search() {
        let search = create_search(&SearchSettings {
            provider: "none".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(search.provider_name(), "none");
        assert!(search.search("q", 5).await.unwrap().is_empty());
    }

    #[test]
    fn test_create_search_providers() {
        let ddg = create_search(&SearchSettings::default()).unwrap();
        assert_eq!(ddg.provider_name(), "duckduckgo");

        let unknown = SearchSettings {
            provider: "bing".to_string(),
            ..Default::default()
        };
        assert!(create_search(&unknown).is_err());
    }

    #[test]
    fn test_google_requires_key() {
        let settings = SearchSettings {
            provider: "google".to_string(),
            google_api_key_env: "LOCALRAG_TEST_UNSET_GOOGLE_KEY".to_string(),
            google_engine_id: Some("engine".to_string()),
            ..Default::default()
        };
        assert!(create_search(&settings).is_err());
    }
}
