//! Page text → markdown body.

/// Separator emitted before every non-blank page except page 0.
const PAGE_BREAK: &str = "\n---\n";

/// Render per-page text as the "Main Text" markdown body.
///
/// Blank pages are skipped, but the break is keyed on page position, so a
/// document whose first page is blank still opens with a break. Each paragraph (`\n\n`-separated) is trimmed
/// and its hard line breaks are joined with spaces, so wrapped PDF lines
/// become one markdown paragraph.
pub fn pages_to_markdown(pages: &[String]) -> String {
    let mut out = String::new();

    for (index, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            continue;
        }
        if index > 0 {
            out.push_str(PAGE_BREAK);
        }
        for para in page.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            out.push_str(&para.replace('\n', " "));
            out.push_str("\n\n");
        }
    }

    out
}
