//! Column-aligned table detection and markdown table rendering.
//!
//! Text extraction flattens tables into lines whose cells are separated by
//! tabs or wide runs of spaces. A run of at least [`MIN_ROWS`] consecutive
//! lines that each split into two or more cells is taken as a table; the
//! first line becomes the header.

const MIN_ROWS: usize = 2;
const MIN_CELLS: usize = 2;

/// A table found on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// 1-based page number.
    pub page: usize,
    /// 1-based index of the table within its page.
    pub table_num: usize,
    pub rows: Vec<Vec<String>>,
}

/// Find tables in per-page text.
pub fn detect_tables(pages: &[String]) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();

    for (page_index, page) in pages.iter().enumerate() {
        let mut table_num = 0;
        let mut run: Vec<Vec<String>> = Vec::new();

        // A trailing empty line closes a run that reaches the end of the page.
        for line in page.lines().chain(std::iter::once("")) {
            let cells = split_cells(line);
            if cells.len() >= MIN_CELLS {
                run.push(cells);
                continue;
            }
            if run.len() >= MIN_ROWS {
                table_num += 1;
                tables.push(ExtractedTable {
                    page: page_index + 1,
                    table_num,
                    rows: std::mem::take(&mut run),
                });
            }
            run.clear();
        }
    }

    tables
}

/// Split a line into cells on tabs or runs of two or more spaces.
///
/// Single spaces stay inside a cell.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut gap = String::new();

    for c in line.trim().chars() {
        if c == ' ' || c == '\t' {
            gap.push(c);
            continue;
        }
        if !gap.is_empty() {
            if gap.contains('\t') || gap.len() >= 2 {
                cells.push(std::mem::take(&mut current));
            } else {
                current.push(' ');
            }
            gap.clear();
        }
        current.push(c);
    }
    if !current.is_empty() {
        cells.push(current);
    }

    cells
}

/// Render tables as markdown, one `### Table N (Page P)` block each.
///
/// Rows shorter than the header are padded with empty cells; longer rows
/// are truncated to the header width.
pub fn tables_to_markdown(tables: &[ExtractedTable]) -> String {
    let mut out = String::new();

    for table in tables {
        let Some(header) = table.rows.first() else {
            continue;
        };

        out.push_str(&format!(
            "\n### Table {} (Page {})\n\n",
            table.table_num, table.page
        ));
        out.push_str(&format!("| {} |\n", header.join(" | ")));
        out.push_str(&format!("| {} |\n", vec!["---"; header.len()].join(" | ")));

        for row in &table.rows[1..] {
            let mut cells: Vec<&str> = row.iter().map(String::as_str).take(header.len()).collect();
            cells.resize(header.len(), "");
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        out.push('\n');
    }

    out
}
