//! Writing assistant binary
//!
//! Entry point for one-shot file commands and the stdio session.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use proofing_engine::RuleFormatter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use writer_cli::commands;
use writer_cli::transport::stdio::run_stdio_session;
use writer_session::{analyzer_from_config, dictionary_store_from_config, EditingSession};

#[derive(Parser, Debug)]
#[command(name = "writer")]
#[command(version, about = "Proofread, fix and format text")]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Personal dictionary (JSON word list)
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    /// Check with LanguageTool, falling back to local rules
    #[arg(long, global = true)]
    languagetool: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a file and print the result as JSON
    Check { file: PathBuf },

    /// Apply every suggestion to a file
    Fix {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fix capitalisation, contractions and punctuation
    Format {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive JSON-lines session on stdin/stdout
    Stdio {
        /// Initial document text
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries command output and protocol events; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting writer v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(
        args.config.as_deref(),
        args.dictionary.clone(),
        args.languagetool,
    )?;

    match args.command {
        Command::Check { file } => {
            let text = read_text(&file)?;
            let analyzer = analyzer_from_config(&config)?;
            let dictionary = dictionary_store_from_config(&config)?.get()?;
            let result = commands::check(&text, analyzer.as_ref(), &dictionary).await?;
            commands::emit(None, &serde_json::to_string_pretty(&result)?)?;
        }
        Command::Fix { file, output } => {
            let text = read_text(&file)?;
            let analyzer = analyzer_from_config(&config)?;
            let dictionary = dictionary_store_from_config(&config)?.get()?;
            let report = commands::fix(&text, analyzer.as_ref(), &dictionary).await?;
            tracing::info!(fixed = report.fixed, score = report.score_before, "Fixed file");
            commands::emit(output.as_deref(), &report.text)?;
        }
        Command::Format { file, output } => {
            let text = read_text(&file)?;
            let formatted = commands::format(&text, &RuleFormatter).await?;
            commands::emit(output.as_deref(), &formatted)?;
        }
        Command::Stdio { file } => {
            let text = match file {
                Some(path) => read_text(&path)?,
                None => String::new(),
            };
            let session = EditingSession::from_config(&config, text)?;
            run_stdio_session(session).await?;
        }
    }

    Ok(())
}
