//! PDF → markdown conversion.
//!
//! Produces one markdown document per PDF with three parts: the page text
//! (`## Main Text`), column-aligned tables found in that text (`## Tables`),
//! and links to the embedded images dumped next to the output file
//! (`## Images`).
//!
//! | Module | Produces |
//! |--------|----------|
//! | [`text`] | page paragraphs separated by `---` |
//! | [`tables`] | `### Table N (Page P)` markdown tables |
//! | [`images`] | `<stem>_images/image_NNN.<ext>` files and their links |

pub mod images;
pub mod tables;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::error::PipelineError;

/// Failure while reading PDF content.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
    #[error("PDF image extraction failed: {0}")]
    Images(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Markdown for one PDF plus what went into it.
#[derive(Debug, Clone)]
pub struct ParsedPdf {
    pub markdown: String,
    pub pages: usize,
    pub tables: usize,
    pub images: usize,
}

pub struct PdfParser {
    pdf_path: PathBuf,
    output_dir: PathBuf,
    images_dir: PathBuf,
    stem: String,
    bytes: Vec<u8>,
}

impl PdfParser {
    /// Read the PDF and prepare the output and images directories.
    ///
    /// `output_dir` defaults to the current directory.
    pub fn open(pdf_path: &Path, output_dir: Option<&Path>) -> Result<Self> {
        if !pdf_path.exists() {
            return Err(PipelineError::NotFound(pdf_path.to_path_buf()).into());
        }
        let bytes = std::fs::read(pdf_path)
            .with_context(|| format!("Failed to read PDF: {}", pdf_path.display()))?;

        let output_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let images_dir = output_dir.join(format!("{}_images", stem));
        std::fs::create_dir_all(&images_dir).with_context(|| {
            format!("Failed to create images directory: {}", images_dir.display())
        })?;

        Ok(Self {
            pdf_path: pdf_path.to_path_buf(),
            output_dir,
            images_dir,
            stem,
            bytes,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Plain text of each page, in page order.
    pub fn extract_pages(&self) -> Result<Vec<String>, ExtractError> {
        pdf_extract::extract_text_from_mem_by_pages(&self.bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))
    }

    /// Build the full markdown document, writing images as a side effect.
    pub fn parse(&self) -> Result<ParsedPdf> {
        tracing::info!(path = %self.pdf_path.display(), "parsing PDF");

        let pages = self.extract_pages()?;
        let tables = tables::detect_tables(&pages);
        let images = images::extract_images(&self.bytes, &self.images_dir)?;
        tracing::info!(
            pages = pages.len(),
            tables = tables.len(),
            images = images.len(),
            "extracted PDF content"
        );

        let file_name = self
            .pdf_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut markdown = format!("# PDF Content: {}\n\n## Main Text\n\n", file_name);
        markdown.push_str(&text::pages_to_markdown(&pages));
        if !tables.is_empty() {
            markdown.push_str("\n## Tables\n");
            markdown.push_str(&tables::tables_to_markdown(&tables));
        }
        markdown.push_str(&images::images_to_markdown(
            &images,
            &format!("{}_images", self.stem),
        ));

        Ok(ParsedPdf {
            markdown,
            pages: pages.len(),
            tables: tables.len(),
            images: images.len(),
        })
    }

    /// Write `markdown`, by default to `<output_dir>/<stem>_parsed.md`.
    pub fn save_output(&self, markdown: &str, output_file: Option<&Path>) -> Result<PathBuf> {
        let path = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_dir.join(format!("{}_parsed.md", self.stem)));
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, markdown)
            .with_context(|| format!("Failed to write markdown: {}", path.display()))?;
        Ok(path)
    }
}

/// Entry point for `pdfh parse`.
pub fn run_parse(pdf_path: &Path, output: Option<&Path>, output_dir: Option<&Path>) -> Result<()> {
    let parser = PdfParser::open(pdf_path, output_dir)?;
    let parsed = parser.parse()?;
    let saved = parser.save_output(&parsed.markdown, output)?;

    println!("parse {}", pdf_path.display());
    println!("  pages: {}", parsed.pages);
    println!("  tables: {}", parsed.tables);
    println!(
        "  images: {} ({})",
        parsed.images,
        parser.images_dir().display()
    );
    println!("Output saved to: {}", saved.display());

    Ok(())
}
