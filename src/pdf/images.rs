//! Embedded image extraction.
//!
//! Image XObjects are written out exactly as stored in the PDF. Only
//! stream filters that are complete image file formats on their own can be
//! dumped this way; raw or Flate-compressed pixel data is skipped.

use std::path::{Path, PathBuf};

use super::ExtractError;

/// An image written to the images directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    /// 1-based page number.
    pub page: u32,
    pub filename: String,
    pub path: PathBuf,
    pub width: i64,
    pub height: i64,
}

/// File extension for an image stream's filter chain, if it can be dumped as-is.
fn extension_for(filters: &[String]) -> Option<&'static str> {
    match filters.last().map(String::as_str) {
        Some("DCTDecode") => Some("jpg"),
        Some("JPXDecode") => Some("jp2"),
        Some("JBIG2Decode") => Some("jb2"),
        _ => None,
    }
}

/// Write every dumpable image in `pdf_bytes` to `images_dir`.
///
/// Files are numbered across the whole document (`image_001.jpg`, ...).
pub fn extract_images(pdf_bytes: &[u8], images_dir: &Path) -> Result<Vec<ExtractedImage>, ExtractError> {
    let doc = lopdf::Document::load_mem(pdf_bytes).map_err(|e| ExtractError::Images(e.to_string()))?;

    let mut images = Vec::new();
    let mut skipped = 0usize;

    for (page_num, page_id) in doc.get_pages() {
        let page_images = match doc.get_page_images(page_id) {
            Ok(imgs) => imgs,
            Err(e) => {
                tracing::warn!(page = page_num, error = %e, "could not read page images");
                continue;
            }
        };

        for img in page_images {
            let filters = img.filters.unwrap_or_default();
            let Some(ext) = extension_for(&filters) else {
                skipped += 1;
                tracing::warn!(
                    page = page_num,
                    filters = ?filters,
                    "skipping image with unsupported encoding"
                );
                continue;
            };

            let filename = format!("image_{:03}.{}", images.len() + 1, ext);
            let path = images_dir.join(&filename);
            std::fs::write(&path, img.content)?;
            tracing::debug!(page = page_num, file = %filename, "extracted image");

            images.push(ExtractedImage {
                page: page_num,
                filename,
                path,
                width: img.width,
                height: img.height,
            });
        }
    }

    if skipped > 0 {
        tracing::info!(skipped, "some images were not extracted");
    }

    Ok(images)
}

/// Render the `## Images` section. Empty when there are no images.
///
/// Links are relative to the markdown file, which sits next to `images_dir_name`.
pub fn images_to_markdown(images: &[ExtractedImage], images_dir_name: &str) -> String {
    if images.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n## Images\n\n");
    for img in images {
        out.push_str(&format!(
            "![Image {file}]({dir}/{file})  \n*Page {page}, {w}x{h} pixels*\n\n",
            file = img.filename,
            dir = images_dir_name,
            page = img.page,
            w = img.width,
            h = img.height,
        ));
    }
    out
}
