//! Sentiment Batch
//!
//! Command-line front end for LLM-backed sentiment classification.

use clap::{Parser, Subcommand, ValueEnum};
use sentiment_batch::{
    analysis::SentimentClient,
    batch::{cancel_pair, BatchMode, BatchOrchestrator, BatchOutcome},
    config::Config,
    llm::{LlmBackend, LlmClient, ScriptedBackend},
    session::{average_confidence, top_keywords, SentimentDistribution},
    types::{AnalysisResult, DIRECT_ENTRY},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sentiment-batch")]
#[command(about = "Classify text sentiment with a hosted LLM, one text or many")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Answer from a local keyword lexicon instead of calling the model
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single text
    Analyze {
        /// Text to classify
        text: String,
        /// Provenance tag stored on the result
        #[arg(long, default_value = DIRECT_ENTRY)]
        source: String,
    },
    /// Classify many texts, one per line
    Batch {
        /// Input file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Provenance tag stored on the results
        #[arg(long)]
        source: Option<String>,
        /// Texts per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Pause between chunks in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Dispatch mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Grouped,
    PerItem,
}

impl From<ModeArg> for BatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Grouped => BatchMode::Grouped,
            ModeArg::PerItem => BatchMode::PerItem,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) if cli.dry_run => {
            tracing::warn!("Using default configuration for dry run: {}", e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    let backend: Box<dyn LlmBackend> = if cli.dry_run {
        tracing::warn!("Running in DRY RUN mode - texts are scored by keyword lexicon, no model calls");
        Box::new(ScriptedBackend::lexicon())
    } else {
        Box::new(LlmClient::from_config(&config.llm)?)
    };
    let client = SentimentClient::new(backend)
        .with_confidence_policy(config.validation.confidence_policy);

    match cli.command {
        Commands::Analyze { text, source } => analyze(client, &text, &source).await,
        Commands::Batch {
            file,
            source,
            chunk_size,
            delay_ms,
            mode,
        } => {
            let mut options = config.batch.options();
            if let Some(size) = chunk_size {
                options = options.with_chunk_size(size);
            }
            if let Some(ms) = delay_ms {
                options = options.with_delay(Duration::from_millis(ms));
            }
            if let Some(mode) = mode {
                options = options.with_mode(mode.into());
            }
            let source = source.unwrap_or(config.batch.default_source);
            let orchestrator = BatchOrchestrator::new(client, options);
            run_batch(orchestrator, file, &source).await
        }
    }
}

async fn analyze(client: SentimentClient<Box<dyn LlmBackend>>, text: &str, source: &str) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to analyze");
    }

    let result = client.classify_one(text.trim(), source).await?;

    println!("\n🧭 Sentiment Analysis\n");
    println!("Text: {}", result.text);
    println!("Sentiment: {}", result.sentiment);
    println!("Confidence: {:.1}%", result.confidence * 100.0);
    if !result.keywords.is_empty() {
        println!("Keywords: {}", result.keywords.join(", "));
    }
    println!("Explanation: {}", result.explanation);
    println!("\n{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

async fn run_batch(
    orchestrator: BatchOrchestrator<Box<dyn LlmBackend>>,
    file: Option<PathBuf>,
    source: &str,
) -> anyhow::Result<()> {
    let raw = match &file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??,
    };
    let texts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if texts.is_empty() {
        anyhow::bail!("No texts to analyze");
    }

    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current chunk");
            handle.cancel();
        }
    });

    let report = orchestrator.run(&texts, source, &token).await?;

    for result in &report.results {
        println!("{}", serde_json::to_string(result)?);
    }
    print_summary(&report.results, texts.len());

    match report.outcome {
        BatchOutcome::Completed => Ok(()),
        BatchOutcome::Cancelled => {
            eprintln!(
                "Cancelled after {}/{} chunks",
                report.chunks_completed, report.chunks_total
            );
            Ok(())
        }
        BatchOutcome::Failed { chunk, error } => {
            Err(anyhow::anyhow!("Batch failed at chunk {}: {}", chunk + 1, error))
        }
    }
}

fn print_summary(results: &[AnalysisResult], requested: usize) {
    let distribution = SentimentDistribution::from_results(results);

    eprintln!("\n📊 {} of {} texts analyzed\n", results.len(), requested);
    eprintln!("{:<10} {:>6} {:>8}", "Sentiment", "Count", "Share");
    eprintln!("{}", "-".repeat(26));
    for entry in &distribution.entries {
        eprintln!(
            "{:<10} {:>6} {:>7.1}%",
            entry.sentiment.as_str(),
            entry.count,
            entry.percent
        );
    }

    if let Some(avg) = average_confidence(results) {
        eprintln!("\nAverage confidence: {:.1}%", avg * 100.0);
    }

    let keywords = top_keywords(results, 5);
    if !keywords.is_empty() {
        let list: Vec<String> = keywords
            .iter()
            .map(|k| format!("{} ({})", k.keyword, k.count))
            .collect();
        eprintln!("Top keywords: {}", list.join(", "));
    }
}
