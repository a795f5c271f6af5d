//! Add command implementation.

use super::ingest::{print_stats, run_ingest};
use clap::Args;
use localrag_core::{config::AppConfig, AppResult};
use localrag_knowledge::import_files;
use std::path::PathBuf;

/// Copy PDF, text or markdown files into the data directory
#[derive(Args, Debug)]
pub struct AddCommand {
    /// Files to add (.pdf, .txt, .md)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Re-ingest after copying
    #[arg(long)]
    pub ingest: bool,
}

impl AddCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(files = self.files.len(), "Executing add command");

        let written = import_files(&config.data_dir, &self.files)?;
        for path in &written {
            println!("Added {}", path.display());
        }

        if self.ingest {
            let stats = run_ingest(config, false, true).await?;
            print_stats(&stats, config);
        } else {
            println!("Run `localrag ingest` to index the new files.");
        }

        Ok(())
    }
}
