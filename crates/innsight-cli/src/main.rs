mod input;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use innsight_core::{EngineConfig, FieldName};
use innsight_engine::{reconcile, Pipeline};
use innsight_export::{render, Format};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "innsight")]
#[command(about = "Extract structured hotel facility records from scraped website text")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine config file (JSON); missing keys take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deadline for each model adapter call, in milliseconds
    #[arg(long, env = "INNSIGHT_ADAPTER_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Documents processed concurrently in a batch
    #[arg(long, env = "INNSIGHT_MAX_CONCURRENCY")]
    max_concurrency: Option<usize>,

    /// Sentence-embedding model directory (model.onnx + tokenizer.json)
    #[cfg(feature = "onnx")]
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one record from a text file or a JSON RawDocument
    Extract {
        file: PathBuf,

        /// Source URL recorded in the output (plain-text input only)
        #[arg(long)]
        url: Option<String>,

        /// json, jsonl, csv, markdown, rag or summary
        #[arg(short, long, default_value = "json")]
        format: Format,

        /// Write here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Extract every file in a directory
    Batch {
        dir: PathBuf,

        #[arg(short, long, default_value = "jsonl")]
        format: Format,

        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Reconcile a JSON array of candidates and print the slots
    Reconcile { candidates: PathBuf },
    /// List the canonical field schema
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            file,
            url,
            format,
            out,
            engine,
        } => {
            let pipeline = build_pipeline(&engine)?;
            let doc = input::read_document(&file, url.as_deref())?;
            let record = pipeline
                .run(&doc)
                .await
                .with_context(|| format!("extracting {}", file.display()))?;
            emit(&render(&[record], format)?, out.as_deref())?;
        }
        Commands::Batch {
            dir,
            format,
            out,
            engine,
        } => {
            let pipeline = build_pipeline(&engine)?;
            let files = input::list_documents(&dir)?;
            let docs = files
                .iter()
                .map(|f| input::read_document(f, None))
                .collect::<anyhow::Result<Vec<_>>>()?;
            info!(dir = %dir.display(), documents = docs.len(), "starting batch");

            let mut records = Vec::with_capacity(docs.len());
            for (file, result) in files.iter().zip(pipeline.run_batch(&docs).await) {
                records.push(result.with_context(|| format!("extracting {}", file.display()))?);
            }
            emit(&render(&records, format)?, out.as_deref())?;
        }
        Commands::Reconcile { candidates } => {
            let candidates = input::read_candidates(&candidates)?;
            let reconciled = reconcile(&candidates).context("reconciling candidates")?;
            println!("{}", serde_json::to_string_pretty(&reconciled)?);
        }
        Commands::Schema => print_schema(),
    }

    Ok(())
}

fn engine_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(ms) = args.timeout_ms {
        config.adapter_timeout_ms = ms;
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = n;
    }
    config.validate()?;
    Ok(config)
}

fn build_pipeline(args: &EngineArgs) -> anyhow::Result<Pipeline> {
    let config = engine_config(args)?;

    #[cfg(feature = "onnx")]
    if let Some(dir) = &args.model_dir {
        let scorer = innsight_ai::EmbeddingScorer::load(dir)
            .with_context(|| format!("loading embedding model from {}", dir.display()))?;
        return Ok(Pipeline::new(
            Arc::new(innsight_ai::RuleRecognizer::new()),
            Arc::new(scorer),
            config,
        )?);
    }

    Ok(Pipeline::new(
        Arc::new(innsight_ai::RuleRecognizer::new()),
        Arc::new(innsight_ai::LexiconScorer::new()),
        config,
    )?)
}

fn emit(rendered: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = rendered.len(), "wrote output");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn print_schema() {
    println!("{:<22} {:<6} counted", "field", "kind");
    for field in FieldName::ALL {
        println!(
            "{:<22} {:<6} {}",
            field.as_str(),
            field.value_kind(),
            if field.is_canonical() { "yes" } else { "no" }
        );
    }
}
