//! LLM provider factory.
//!
//! Creates LLM clients from the configured provider name.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use localrag_core::config::LlmSettings;
use localrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for the configured provider.
///
/// # Errors
/// Returns a configuration error if the provider is unknown or the HTTP
/// client cannot be built.
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::with_timeout(
                settings.endpoint.as_str(),
                Duration::from_secs(settings.timeout),
            )?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown LLM provider: {}",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&LlmSettings::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let settings = LlmSettings {
            endpoint: "http://localhost:8080".to_string(),
            ..LlmSettings::default()
        };
        assert!(create_client(&settings).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let settings = LlmSettings {
            provider: "openai".to_string(),
            ..LlmSettings::default()
        };
        match create_client(&settings) {
            Err(err) => assert!(err.to_string().contains("Unknown LLM provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
