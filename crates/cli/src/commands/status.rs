//! Status command implementation.

use clap::Args;
use localrag_core::{config::AppConfig, AppResult};
use localrag_knowledge::{loader::discover, status, IndexStatus};
use serde::Serialize;
use std::path::PathBuf;

/// Show data files, index contents and model settings
#[derive(Args, Debug, Default)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything `status` reports.
#[derive(Debug, Serialize)]
pub struct WorkspaceStatus {
    pub workspace: PathBuf,
    pub data_dir: PathBuf,
    pub data_dir_exists: bool,
    pub pdf_files: usize,
    pub text_files: usize,
    pub model: String,
    pub embedding_model: String,
    pub search_provider: String,
    pub index: IndexStatus,
}

impl WorkspaceStatus {
    pub fn collect(config: &AppConfig) -> AppResult<Self> {
        let files = discover(&config.data_dir);
        Ok(Self {
            workspace: config.workspace.clone(),
            data_dir: config.data_dir.clone(),
            data_dir_exists: config.data_dir.is_dir(),
            pdf_files: files.pdf.len(),
            text_files: files.text.len(),
            model: config.llm.model.clone(),
            embedding_model: format!("{}/{}", config.embedding.provider, config.embedding.model),
            search_provider: config.search.provider.clone(),
            index: status(&config.persist_dir, &config.collection)?,
        })
    }
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let report = WorkspaceStatus::collect(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Workspace:  {}", report.workspace.display());
        if report.data_dir_exists {
            println!(
                "Data:       {} ({} PDF, {} text)",
                report.data_dir.display(),
                report.pdf_files,
                report.text_files
            );
        } else {
            println!("Data:       {} (missing)", report.data_dir.display());
        }
        println!("Model:      {}", report.model);
        println!("Embeddings: {}", report.embedding_model);
        println!("Web search: {}", report.search_provider);
        println!();

        let index = &report.index;
        if !index.exists {
            println!("Index:      not built (run `localrag ingest`)");
            return Ok(());
        }
        println!("Index:      {}", index.index_path.display());
        println!("Collection: {}", index.collection);
        println!("Chunks:     {}", index.chunks);
        println!("Sources:    {}", index.sources);
        if let Some(model) = &index.embedding_model {
            println!("Built with: {}", model);
        }
        println!("Size:       {:.2} MB", index.size_bytes as f64 / 1_048_576.0);

        Ok(())
    }
}
