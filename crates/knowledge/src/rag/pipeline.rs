//! Answer orchestration: local retrieval, web fallback, model call.

use crate::embeddings::EmbeddingProvider;
use crate::rag::context::ContextSource;
use crate::rag::types::Answer;
use crate::retrieval::retrieve;
use crate::types::RetrievalConfig;
use crate::web::{search_or_empty, WebSearch};
use localrag_core::config::LlmSettings;
use localrag_core::AppResult;
use localrag_llm::{LlmClient, LlmRequest};
use localrag_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Answers questions from local documents, falling back to the web.
pub struct RagPipeline {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn EmbeddingProvider>,
    web: Arc<dyn WebSearch>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    context_size: u32,
    collection: String,
}

impl RagPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        web: Arc<dyn WebSearch>,
        prompt: PromptDefinition,
    ) -> Self {
        let defaults = LlmSettings::default();
        Self {
            llm,
            embedder,
            web,
            prompt,
            model: defaults.model,
            temperature: defaults.temperature,
            context_size: defaults.context_size,
            collection: "local_docs".to_string(),
        }
    }

    /// Use the model, temperature and context size from settings.
    pub fn with_llm_settings(mut self, settings: &LlmSettings) -> Self {
        self.model = settings.model.clone();
        self.temperature = settings.temperature;
        self.context_size = settings.context_size;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Pick the context for a question.
    ///
    /// Local chunks win whenever any survive retrieval; the web is only
    /// consulted when none do. Web failures count as no hits.
    pub async fn select_context(
        &self,
        question: &str,
        persist_dir: &Path,
        config: &RetrievalConfig,
    ) -> AppResult<ContextSource> {
        let local = retrieve(
            persist_dir,
            &self.collection,
            self.embedder.as_ref(),
            question,
            config.k,
            config.threshold(),
        )
        .await?;

        if !local.is_empty() {
            return Ok(ContextSource::Local(local));
        }

        tracing::info!("No local context; falling back to web search");
        let hits = search_or_empty(self.web.as_ref(), question, config.web_k).await;
        if hits.is_empty() {
            Ok(ContextSource::Empty)
        } else {
            Ok(ContextSource::Web(hits))
        }
    }

    /// Answer a question.
    ///
    /// Retrieval and model errors propagate; web search errors never do.
    pub async fn answer(
        &self,
        question: &str,
        persist_dir: &Path,
        config: &RetrievalConfig,
    ) -> AppResult<Answer> {
        let source = self.select_context(question, persist_dir, config).await?;
        let source_kind = source.kind();

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), source.context_text());
        let built = build_prompt(&self.prompt, variables)?;
        tracing::debug!(
            prompt_id = %built.metadata.source_prompt_id,
            variables = built.metadata.resolved_variables.len(),
            "Rendered prompt"
        );

        let mut request = LlmRequest::new(built.user, &self.model)
            .with_temperature(self.temperature)
            .with_context_size(self.context_size);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::info!(source_kind = %source_kind, "Generating answer");
        let response = self.llm.complete(&request).await?;

        Ok(Answer {
            text: response.content,
            source_kind,
            citations: source.citations(),
        })
    }
}
