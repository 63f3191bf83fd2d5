use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use repoqa_cli::{load_directory, LoadedCorpus, LoaderConfig};
use repoqa_core::config::{resolve_path, Config};
use repoqa_core::Chunker;
use repoqa_hybrid::{clean_question, render_hits, IndexHandle};

#[derive(Parser)]
#[command(name = "repoqa")]
#[command(about = "Ask questions about a source repository with hybrid BM25 + TF-IDF retrieval")]
#[command(version)]
struct Cli {
    /// Hide the loading progress bar
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show file-type and chunk counts for a directory
    Stats {
        /// Repository directory (`~` and `$VAR` are expanded)
        dir: String,
    },

    /// Retrieve the chunks most relevant to a question
    Query {
        /// Repository directory (`~` and `$VAR` are expanded)
        dir: String,

        /// Question text
        question: String,

        /// Number of chunks to return (defaults to retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repoqa=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let retrieval = config.retrieval()?;
    let loader: LoaderConfig = config.get_or_default("loader")?;
    let cwd = std::env::current_dir().context("resolving working directory")?;

    match cli.command {
        Commands::Stats { dir } => {
            let dir = resolve_path(&cwd, &dir);
            let corpus = load(&dir, &loader, cli.quiet)?;
            let chunks = Chunker::new(retrieval.chunking)?.chunk_documents(&corpus.documents);
            println!("Directory: {}", dir.display());
            println!("Files: {}", corpus.documents.len());
            for (kind, count) in &corpus.file_types {
                println!("  {kind}: {count}");
            }
            println!("Chunks: {}", chunks.len());
        }
        Commands::Query { dir, question, k } => {
            let dir = resolve_path(&cwd, &dir);
            let corpus = load(&dir, &loader, cli.quiet)?;
            let handle: IndexHandle = IndexHandle::new();
            if !handle.rebuild(&corpus.documents, &retrieval)? {
                println!("No indexable content under {}.", dir.display());
                return Ok(());
            }
            let question = clean_question(&question);
            let hits = handle.query(&question, k.unwrap_or(retrieval.top_k))?;
            println!("{}", render_hits(&hits));
        }
    }
    Ok(())
}

fn load(dir: &Path, config: &LoaderConfig, quiet: bool) -> anyhow::Result<LoadedCorpus> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };
    let corpus = load_directory(dir, config, &progress)?;
    progress.finish_and_clear();
    Ok(corpus)
}
