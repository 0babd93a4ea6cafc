//! # PDF Harness CLI (`pdfh`)
//!
//! ## Usage
//!
//! ```bash
//! pdfh --config ./config/pdfh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfh init` | Create the SQLite database and chunk table |
//! | `pdfh parse <pdf>` | Convert a PDF into markdown plus extracted images |
//! | `pdfh ingest <markdown>` | Chunk, embed, and store a markdown file |
//! | `pdfh search "<query>"` | Vector search over stored chunks |
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=info` (or
//! `debug`) to see pipeline progress.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdf_harness::config::{self, Config};
use pdf_harness::store::VectorStore;
use pdf_harness::{ingest, pdf, search};

/// PDF Harness CLI: parse PDFs into markdown and search them by meaning.
#[derive(Parser)]
#[command(
    name = "pdfh",
    about = "PDF Harness: PDF to markdown parsing and vector search over the result",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used. See
    /// `config/pdfh.example.toml` for every setting.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and chunk table.
    ///
    /// Idempotent: running it again leaves existing chunks untouched.
    Init,

    /// Convert a PDF into a markdown file.
    ///
    /// Writes `<stem>_parsed.md` and a `<stem>_images/` directory into the
    /// output directory.
    Parse {
        /// PDF file to parse.
        pdf: PathBuf,

        /// Markdown output file (default: `<output_dir>/<stem>_parsed.md`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the markdown and extracted images (default: `.`).
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },

    /// Chunk, embed, and store a markdown file.
    ///
    /// Rows previously loaded from the same path are replaced.
    Ingest {
        /// Markdown file to load.
        markdown: PathBuf,

        /// Show the chunk plan without calling the embedding API.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search stored chunks by vector similarity.
    Search {
        /// Natural-language query.
        query: String,

        /// Maximum number of results, at least 1 (default: `retrieval.top_k`).
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Init => {
            let store = VectorStore::open(&cfg).await?;
            let created = store.create_table().await;
            store.close().await;
            created?;
            println!("Database initialized successfully.");
        }
        Commands::Parse {
            pdf,
            output,
            output_dir,
        } => {
            pdf::run_parse(&pdf, output.as_deref(), output_dir.as_deref())?;
        }
        Commands::Ingest { markdown, dry_run } => {
            ingest::run_ingest(&cfg, &markdown, dry_run).await?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
    }

    Ok(())
}
