//! Google Programmable Search (Custom Search JSON API) adapter.

use super::WebSearch;
use crate::types::WebHit;
use localrag_core::{AppError, AppResult};
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API returns at most 10 items per request.
const MAX_PAGE_SIZE: usize = 10;

pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearch {
    pub fn new(client: reqwest::Client, api_key: String, engine_id: String) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            engine_id,
        }
    }
}

#[async_trait::async_trait]
impl WebSearch for GoogleSearch {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebHit>> {
        let num = max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Google request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Google search failed: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read Google response: {}", e)))?;

        let mut hits = parse_response(&body)?;
        hits.truncate(max_results);
        Ok(hits)
    }
}

/// Parse a Custom Search response body, dropping items without title or link.
pub fn parse_response(body: &str) -> AppResult<Vec<WebHit>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Search(format!("Invalid Google response: {}", e)))?;

    Ok(response
        .items
        .into_iter()
        .filter(|item| !item.title.is_empty() && !item.link.is_empty())
        .map(|item| WebHit::new(item.title, item.link, item.snippet))
        .collect())
}
