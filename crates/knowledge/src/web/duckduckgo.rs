//! DuckDuckGo Instant Answer adapter.

use super::WebSearch;
use crate::types::WebHit;
use localrag_core::{AppError, AppResult};
use serde_json::Value;

const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl WebSearch for DuckDuckGoSearch {
    fn provider_name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("DuckDuckGo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "DuckDuckGo search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid DuckDuckGo response: {}", e)))?;

        let mut hits = parse_response(&payload);
        hits.truncate(max_results);
        Ok(hits)
    }
}

/// Extract hits from an Instant Answer payload: the abstract first, then
/// direct results, then (possibly nested) related topics.
pub fn parse_response(payload: &Value) -> Vec<WebHit> {
    let mut hits = Vec::new();

    let abstract_text = str_field(payload, "AbstractText");
    let abstract_url = str_field(payload, "AbstractURL");
    if !abstract_text.is_empty() && !abstract_url.is_empty() {
        let heading = str_field(payload, "Heading");
        let title = if heading.is_empty() {
            title_from_text(abstract_text)
        } else {
            heading
        };
        hits.push(WebHit::new(title, abstract_url, abstract_text));
    }

    for key in ["Results", "RelatedTopics"] {
        if let Some(items) = payload.get(key).and_then(Value::as_array) {
            collect_topics(items, &mut hits);
        }
    }

    hits
}

fn collect_topics(items: &[Value], hits: &mut Vec<WebHit>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(Value::as_array) {
            collect_topics(topics, hits);
            continue;
        }

        let text = str_field(item, "Text");
        let url = str_field(item, "FirstURL");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        hits.push(WebHit::new(title_from_text(text), url, text));
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn title_from_text(text: &str) -> &str {
    text.split(" - ").next().unwrap_or(text)
}
