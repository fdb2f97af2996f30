use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use grounded_core::config::Config;
use grounded_core::provider::OllamaGenerator;
use grounded_core::rag::{DocumentStore, RagPipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "grounded")]
#[command(about = "Answer questions from a document corpus with a local model", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "List available models from Ollama")]
    Models {
        #[arg(short, long, help = "Ollama base URL (defaults to llm.base_url)")]
        url: Option<String>,
    },

    #[command(about = "Answer a question from a corpus file")]
    Ask {
        #[arg(long, help = "JSON or YAML file holding an array of {id, text, metadata}")]
        corpus: PathBuf,

        #[arg(short = 'k', long, help = "Number of passages to retrieve (defaults to retrieval.top_k)")]
        top_k: Option<usize>,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,

        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grounded_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show => show_config(&cli.config),
        Commands::Models { url } => list_models(&cli.config, url).await,
        Commands::Ask { corpus, top_k, json, question } => {
            ask(&cli.config, &corpus, top_k, json, &question).await
        }
    }
}

/// Loads the config file if present, falling back to defaults otherwise.
fn load_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        Config::load(config_path).context("Failed to load config")
    } else {
        Ok(Config::default())
    }
}

fn show_config(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Model:           {}", config.llm.model.cyan());
    println!("  Base URL:        {}", config.llm.base_url);
    println!("  Temperature:     {}", config.llm.temperature);
    println!();
    println!("{}", "Retrieval:".bold());
    println!("  Strategy:        {:?}", config.retrieval.strategy);
    println!("  Top K:           {}", config.retrieval.top_k);
    match config.retrieval.max_context_chars {
        Some(limit) => println!("  Max Context:     {} chars", limit),
        None => println!("  Max Context:     unlimited"),
    }
    println!("  Embedding Model: {}", config.embedding.model.cyan());

    Ok(())
}

async fn list_models(config_path: &Path, url: Option<String>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(url) = url {
        config.llm.base_url = url;
    }

    println!("{} Fetching models from {}...", "→".blue(), config.llm.base_url);
    println!();

    let models = OllamaGenerator::new(&config)
        .list_models()
        .await
        .context("Failed to connect to Ollama. Is it running?")?;

    if models.is_empty() {
        println!("{}", "No models found. Pull a model with 'ollama pull <model>'".yellow());
        return Ok(());
    }

    println!("{}", "Available models:".bold().green());
    println!();

    for model in models {
        let size_gb = model.size as f64 / (1024.0 * 1024.0 * 1024.0);
        println!("  {} {} ({:.2} GB)", "•".cyan(), model.name.bold(), size_gb);
    }

    Ok(())
}

async fn ask(
    config_path: &Path,
    corpus_path: &Path,
    top_k: Option<usize>,
    json: bool,
    question: &str,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = DocumentStore::load(corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;

    let mut pipeline = RagPipeline::from_config(&config, Arc::new(store))
        .await
        .context("Failed to build pipeline")?;
    if let Some(top_k) = top_k {
        pipeline = pipeline.with_top_k(top_k);
    }

    let result = pipeline
        .answer(question)
        .await
        .context("Failed to generate an answer")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", "Reasoning:".bold());
    println!("{}", result.reasoning.dimmed());
    println!();
    println!("{}", "Answer:".bold().green());
    println!("{}", result.answer);
    println!();
    println!("{} ({})", "Sources:".bold(), result.relevant_documents.len());
    for (i, passage) in result.relevant_documents.iter().enumerate() {
        println!("  [{}] {}", i + 1, passage);
    }

    Ok(())
}
