//! Ingest command implementation.

use clap::Args;
use localrag_core::{config::AppConfig, AppResult};
use localrag_knowledge::{
    create_provider, ingest, IngestOptions, IngestStats, ProgressEvent, ProgressReporter,
};
use std::sync::Arc;

/// Load data/pdf and data/txt, chunk, embed and store
#[derive(Args, Debug, Default)]
pub struct IngestCommand {
    /// Clear the collection before writing
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(reset = self.reset, "Executing ingest command");

        let stats = run_ingest(config, self.reset, !self.json).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats, config);
        }

        Ok(())
    }
}

/// Ingest the configured data directory, printing progress to stderr when asked.
pub async fn run_ingest(
    config: &AppConfig,
    reset: bool,
    show_progress: bool,
) -> AppResult<IngestStats> {
    let embedder = create_provider(&config.embedding)?;
    let options = IngestOptions::from_config(config).with_reset(reset);

    let reporter = if show_progress {
        ProgressReporter::new(Arc::new(|event: ProgressEvent| {
            eprintln!("{}", event.format_simple());
        }))
    } else {
        ProgressReporter::noop()
    };

    ingest(&options, embedder.as_ref(), &reporter).await
}

pub fn print_stats(stats: &IngestStats, config: &AppConfig) {
    println!("✓ Ingestion complete");
    println!("  Files:      {} PDF, {} text", stats.pdf_files, stats.text_files);
    println!("  Documents:  {}", stats.documents);
    println!("  Chunks:     {}", stats.chunks);
    println!("  Collection: {}", config.collection);
    println!("  Duration:   {:.2}s", stats.duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use localrag_knowledge::status;
    use tempfile::TempDir;

    fn offline_config(temp: &TempDir) -> AppConfig {
        let mut config = AppConfig::for_workspace(temp.path());
        config.embedding.provider = "trigram".to_string();
        config.embedding.dimensions = 256;
        config
    }

    #[tokio::test]
    async fn test_run_ingest_offline() {
        let temp = TempDir::new().unwrap();
        let config = offline_config(&temp);
        std::fs::create_dir_all(config.txt_dir()).unwrap();
        std::fs::write(config.txt_dir().join("cats.txt"), "Cats are mammals.").unwrap();

        let stats = run_ingest(&config, false, false).await.unwrap();
        assert_eq!(stats.text_files, 1);
        assert_eq!(stats.chunks, 1);

        let stats = run_ingest(&config, true, false).await.unwrap();
        assert_eq!(stats.chunks, 1);
        let index = status(&config.persist_dir, &config.collection).unwrap();
        assert_eq!(index.chunks, 1);
    }

    #[tokio::test]
    async fn test_run_ingest_without_documents_fails() {
        let temp = TempDir::new().unwrap();
        let config = offline_config(&temp);

        assert!(run_ingest(&config, false, false).await.is_err());
        assert!(!config.persist_dir.exists());
    }
}
