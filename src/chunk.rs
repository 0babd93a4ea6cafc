//! Paragraph-boundary text chunker.
//!
//! Splits markdown text into chunks that respect a configurable
//! `max_chars` target. Splitting occurs on paragraph boundaries (`\n\n`)
//! and paragraphs are never cut, so every chunk is a run of whole
//! paragraphs from the source.
//!
//! Consecutive chunks can share trailing paragraphs (the *overlap*) so that
//! context carries across a chunk boundary.
//!
//! # Algorithm
//!
//! 1. Split text on `\n\n`, trim each piece, and drop empty pieces.
//! 2. Accumulate paragraphs into a buffer. The running length counts every
//!    buffered paragraph plus 2 characters of separator.
//! 3. When the next paragraph would push the buffer past `max_chars`, flush
//!    the buffer as a chunk.
//! 4. Seed the new buffer with trailing paragraphs of the flushed one until
//!    their combined length reaches `overlap_chars`.
//! 5. A paragraph longer than `max_chars` is still accepted into an empty
//!    buffer and is emitted whole.
//!
//! # Example
//!
//! ```rust
//! use pdf_harness::chunk::chunk_markdown;
//!
//! let chunks = chunk_markdown("Hello world.\n\nSecond paragraph.", 1200, 200);
//! assert_eq!(chunks, vec!["Hello world.\n\nSecond paragraph."]);
//! ```

/// Separator placed between paragraphs, both in the source and in chunks.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SEPARATOR_LEN: usize = 2;

/// Split markdown into overlapping, size-bounded chunks of whole paragraphs.
///
/// Lengths are measured in characters (Unicode scalar values), not bytes.
///
/// # Guarantees
///
/// - Empty or whitespace-only input yields no chunks.
/// - Every paragraph appears in at least one chunk, in source order.
/// - `max_chars` is a target: a single paragraph longer than it becomes
///   its own oversized chunk.
/// - With `overlap_chars > 0` the carried paragraphs may exceed the
///   requested overlap by up to one paragraph.
pub fn chunk_markdown(text: &str, max_chars: usize, overlap_chars: usize) -> Vec<String> {
    let paragraphs: Vec<&str> = text
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0usize;

    for para in paragraphs {
        let para_len = char_len(para);
        let candidate_len = buffer_len
            + para_len
            + if buffer.is_empty() { 0 } else { SEPARATOR_LEN };

        if candidate_len > max_chars && !buffer.is_empty() {
            chunks.push(buffer.join(PARAGRAPH_SEPARATOR));

            buffer = if overlap_chars > 0 {
                overlap_tail(&buffer, overlap_chars).to_vec()
            } else {
                Vec::new()
            };
            buffer_len = buffer.iter().map(|p| char_len(p) + SEPARATOR_LEN).sum();
        }

        buffer.push(para);
        buffer_len += para_len + SEPARATOR_LEN;
    }

    if !buffer.is_empty() {
        chunks.push(buffer.join(PARAGRAPH_SEPARATOR));
    }

    chunks
}

/// Trailing paragraphs of `buffer` whose body length first reaches `overlap`.
///
/// Separators do not count toward the threshold. Returns the whole buffer
/// when it is shorter than `overlap`.
fn overlap_tail<'a, 'b>(buffer: &'b [&'a str], overlap: usize) -> &'b [&'a str] {
    let mut carried = 0usize;
    let mut start = buffer.len();
    while start > 0 {
        start -= 1;
        carried += char_len(buffer[start]);
        if carried >= overlap {
            break;
        }
    }
    &buffer[start..]
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Return the first markdown heading found in a chunk, if any.
///
/// Leading `#` markers and surrounding whitespace are stripped. A bare
/// `#` line carries no title and is skipped.
pub fn infer_section_title(chunk: &str) -> Option<String> {
    chunk
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
}
