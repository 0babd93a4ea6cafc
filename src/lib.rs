//! # PDF Harness
//!
//! Turns product PDFs into a searchable vector store.
//!
//! A PDF is first parsed into a single markdown document (page text, tables,
//! and links to the embedded images). The markdown is then split into
//! overlapping paragraph chunks, each chunk is embedded through a remote
//! embedding API, and the vectors are stored in SQLite for cosine-similarity
//! search.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────────┐   ┌──────────┐
//! │   PDF    │──▶│ Markdown │──▶│ Chunk+Embed  │──▶│  SQLite  │
//! │  parser  │   │   file   │   │  (ingest)    │   │ vectors  │
//! └──────────┘   └──────────┘   └──────────────┘   └────┬─────┘
//!                                                       │
//!                                                       ▼
//!                                                 ┌──────────┐
//!                                                 │  search  │
//!                                                 └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfh init                             # create the chunk table
//! pdfh parse catalog.pdf -d ./out       # PDF → out/catalog_parsed.md
//! pdfh ingest ./out/catalog_parsed.md   # chunk, embed, store
//! pdfh search "red lamp" --limit 3
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chunk`] | Paragraph chunking with overlap |
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`error`] | Pipeline error conditions |
//! | [`ingest`] | Markdown → vector store loading |
//! | [`models`] | Core data types |
//! | [`pdf`] | PDF → markdown conversion |
//! | [`search`] | Vector similarity search |
//! | [`store`] | Chunk table storage |

pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pdf;
pub mod search;
pub mod store;
