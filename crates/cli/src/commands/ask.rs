//! Ask command implementation.
//!
//! Answers one question and exits.

use super::{build_pipeline, print_answer};
use clap::Args;
use localrag_core::{config::AppConfig, AppError, AppResult};
use localrag_knowledge::RetrievalConfig;

/// Answer a single question from local documents or the web
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Number of chunks to retrieve (1-12)
    #[arg(short = 'k', long)]
    pub k: Option<usize>,

    /// Minimum similarity for local chunks (0.0-1.0); enables filtering
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Number of web results on fallback (1-10)
    #[arg(long)]
    pub web_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub fn question(&self) -> String {
        self.words.join(" ")
    }

    /// Retrieval settings with flag overrides applied.
    pub fn retrieval_config(&self, config: &AppConfig) -> AppResult<RetrievalConfig> {
        let mut retrieval = RetrievalConfig::from(&config.retrieval);
        if let Some(k) = self.k {
            retrieval.set_k(k)?;
        }
        if let Some(threshold) = self.threshold {
            retrieval.set_threshold(threshold)?;
        }
        if let Some(web_k) = self.web_k {
            retrieval.set_web_k(web_k)?;
        }
        Ok(retrieval)
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let question = self.question();
        if question.trim().is_empty() {
            return Err(AppError::Other("Question must not be empty".to_string()));
        }

        let retrieval = self.retrieval_config(config)?;
        tracing::info!(k = retrieval.k, threshold = ?retrieval.threshold(), "Executing ask command");

        let pipeline = build_pipeline(config)?;
        let answer = pipeline
            .answer(&question, &config.persist_dir, &retrieval)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print_answer(&answer.text, Some(answer.source_kind), &answer.citations);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(k: Option<usize>, threshold: Option<f32>, web_k: Option<usize>) -> AskCommand {
        AskCommand {
            words: vec!["What".to_string(), "are".to_string(), "cats?".to_string()],
            k,
            threshold,
            web_k,
            json: false,
        }
    }

    #[test]
    fn test_defaults_from_config() {
        let config = AppConfig::for_workspace("/tmp");
        let retrieval = command(None, None, None).retrieval_config(&config).unwrap();
        assert_eq!(retrieval.k, config.retrieval.k);
        assert_eq!(retrieval.threshold(), None);
    }

    #[test]
    fn test_overrides_apply() {
        let config = AppConfig::for_workspace("/tmp");
        let retrieval = command(Some(8), Some(0.5), Some(3))
            .retrieval_config(&config)
            .unwrap();
        assert_eq!(retrieval.k, 8);
        assert_eq!(retrieval.threshold(), Some(0.5));
        assert_eq!(retrieval.web_k, 3);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = AppConfig::for_workspace("/tmp");
        assert!(command(Some(0), None, None).retrieval_config(&config).is_err());
        assert!(command(Some(13), None, None).retrieval_config(&config).is_err());
        assert!(command(None, Some(1.5), None).retrieval_config(&config).is_err());
        assert!(command(None, None, Some(11)).retrieval_config(&config).is_err());
    }
}
