//! Interactive chat command.
//!
//! Reads questions from stdin, one per line. Lines starting with `/` are
//! shell commands that adjust retrieval, manage documents or inspect the
//! conversation. Errors are printed and the loop continues.

use super::build_pipeline;
use super::ingest::{print_stats, run_ingest};
use super::print_answer;
use clap::Args;
use localrag_core::{config::AppConfig, AppResult};
use localrag_knowledge::index::index_path;
use localrag_knowledge::{import_files, ChatSession, RagPipeline, RetrievalConfig, Role, Turn};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /help                 Show this help
  /k <1-12>             Number of chunks to retrieve
  /threshold on|off|<v> Toggle or set the relevance threshold (0.0-1.0)
  /web <1-10>           Number of web results on fallback
  /settings             Show current settings
  /add <files...>       Copy .pdf/.txt/.md files into data/ (quote paths with spaces)
  /reindex [--reset]    Re-ingest data/ (optionally clearing the collection)
  /history              Show the conversation
  /clear                Clear the conversation
  /quit                 Exit
Anything else is asked as a question.";

/// Start an interactive question answering session
#[derive(Args, Debug, Default)]
pub struct ChatCommand {}

/// Threshold argument of `/threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdArg {
    On,
    Off,
    Value(f32),
}

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Empty,
    Ask(String),
    Help,
    K(usize),
    Threshold(ThresholdArg),
    Web(usize),
    Settings,
    Add(Vec<PathBuf>),
    Reindex { reset: bool },
    History,
    Clear,
    Quit,
}

impl ReplCommand {
    /// Parse a line. Errors are usage messages.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if !line.starts_with('/') {
            return Ok(Self::Ask(line.to_string()));
        }

        let words = split_words(line)?;
        let name = words.first().map(String::as_str).unwrap_or_default();
        let args: Vec<&str> = words.iter().skip(1).map(String::as_str).collect();

        match name {
            "/help" | "/?" => Ok(Self::Help),
            "/k" => parse_number(&args, "/k <1-12>").map(Self::K),
            "/web" => parse_number(&args, "/web <1-10>").map(Self::Web),
            "/threshold" => match args.as_slice() {
                ["on"] => Ok(Self::Threshold(ThresholdArg::On)),
                ["off"] => Ok(Self::Threshold(ThresholdArg::Off)),
                [value] => value
                    .parse::<f32>()
                    .map(|v| Self::Threshold(ThresholdArg::Value(v)))
                    .map_err(|_| "Usage: /threshold on|off|<0.0-1.0>".to_string()),
                _ => Err("Usage: /threshold on|off|<0.0-1.0>".to_string()),
            },
            "/settings" => Ok(Self::Settings),
            "/add" if args.is_empty() => Err("Usage: /add <files...>".to_string()),
            "/add" => Ok(Self::Add(args.iter().map(PathBuf::from).collect())),
            "/reindex" => match args.as_slice() {
                [] => Ok(Self::Reindex { reset: false }),
                ["--reset"] => Ok(Self::Reindex { reset: true }),
                _ => Err("Usage: /reindex [--reset]".to_string()),
            },
            "/history" => Ok(Self::History),
            "/clear" => Ok(Self::Clear),
            "/quit" | "/exit" | "/q" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {} (try /help)", other)),
        }
    }
}

/// Split on whitespace, keeping single- or double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn parse_number(args: &[&str], usage: &str) -> Result<usize, String> {
    match args {
        [value] => value.parse().map_err(|_| format!("Usage: {}", usage)),
        _ => Err(format!("Usage: {}", usage)),
    }
}

/// Apply a `/threshold` argument.
pub fn apply_threshold(retrieval: &mut RetrievalConfig, arg: ThresholdArg) -> AppResult<()> {
    match arg {
        ThresholdArg::On => retrieval.use_threshold = true,
        ThresholdArg::Off => retrieval.use_threshold = false,
        ThresholdArg::Value(value) => retrieval.set_threshold(value)?,
    }
    Ok(())
}

/// Mutable state of one interactive session.
struct Shell<'a> {
    config: &'a AppConfig,
    pipeline: RagPipeline,
    retrieval: RetrievalConfig,
    session: ChatSession,
}

impl<'a> Shell<'a> {
    /// Run one command. Returns false when the session should end.
    async fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Quit => return false,
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Ask(question) => self.ask(&question).await,
            ReplCommand::K(k) => match self.retrieval.set_k(k) {
                Ok(()) => println!("k = {}", k),
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Web(web_k) => match self.retrieval.set_web_k(web_k) {
                Ok(()) => println!("web results = {}", web_k),
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Threshold(arg) => match apply_threshold(&mut self.retrieval, arg) {
                Ok(()) => println!("threshold: {}", describe_threshold(&self.retrieval)),
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Settings => self.print_settings(),
            ReplCommand::Add(paths) => match import_files(&self.config.data_dir, &paths) {
                Ok(written) => {
                    for path in written {
                        println!("Added {}", path.display());
                    }
                    println!("Run /reindex to index the new files.");
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Reindex { reset } => {
                match run_ingest(self.config, reset, true).await {
                    Ok(stats) => print_stats(&stats, self.config),
                    Err(e) => eprintln!("Error: {}", e),
                }
                for warning in startup_warnings(self.config) {
                    eprintln!("Warning: {}", warning);
                }
            }
            ReplCommand::History => self.print_history(),
            ReplCommand::Clear => {
                self.session.clear();
                println!("Conversation cleared.");
            }
        }
        true
    }

    async fn ask(&mut self, question: &str) {
        let turn = self
            .session
            .ask(
                &self.pipeline,
                question,
                &self.config.persist_dir,
                &self.retrieval,
            )
            .await;
        print_turn(turn);
    }

    fn print_settings(&self) {
        println!("Model:      {}", self.pipeline.model());
        println!(
            "Embeddings: {}/{}",
            self.pipeline.embedder().provider_name(),
            self.pipeline.embedder().model_name()
        );
        println!("Collection: {}", self.config.collection);
        println!("k:          {}", self.retrieval.k);
        println!("Threshold:  {}", describe_threshold(&self.retrieval));
        println!("Web k:      {}", self.retrieval.web_k);
        println!("Web search: {}", self.config.search.provider);
        println!("Data:       {}", self.config.data_dir.display());
        println!("Index:      {}", self.config.persist_dir.display());
    }

    fn print_history(&self) {
        if self.session.is_empty() {
            println!("No conversation yet.");
            return;
        }
        for turn in self.session.history() {
            let who = match turn.role {
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            println!("[{}] {}", who, turn.content.trim_end());
        }
    }
}

fn describe_threshold(retrieval: &RetrievalConfig) -> String {
    match retrieval.threshold() {
        Some(value) => format!("on ({:.2})", value),
        None => format!("off ({:.2})", retrieval.threshold),
    }
}

fn print_turn(turn: &Turn) {
    println!();
    print_answer(&turn.content, turn.source_kind, &turn.sources);
    println!();
}

/// Startup warnings about missing data or index.
pub fn startup_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if !config.data_dir.is_dir() {
        warnings.push(format!(
            "Data directory {} not found. Create {} and {} or use /add.",
            config.data_dir.display(),
            config.pdf_dir().display(),
            config.txt_dir().display()
        ));
    }
    if !index_path(&config.persist_dir).exists() {
        warnings.push(
            "No index found. Run /reindex to build it; until then answers come from the web."
                .to_string(),
        );
    }
    warnings
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = build_pipeline(config)?;
        let mut shell = Shell {
            config,
            pipeline,
            retrieval: RetrievalConfig::from(&config.retrieval),
            session: ChatSession::new(),
        };

        println!("localrag chat ({}). Type /help for commands.", shell.pipeline.model());
        for warning in startup_warnings(config) {
            eprintln!("Warning: {}", warning);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let keep_going = match ReplCommand::parse(&line) {
                Ok(command) => shell.handle(command).await,
                Err(usage) => {
                    eprintln!("{}", usage);
                    true
                }
            };
            if !keep_going {
                break;
            }
        }

        println!("Bye.");
        Ok(())
    }
}
