//! Table markup extraction.
//!
//! The OCR collaborator renders tables as HTML-like blocks inside the
//! Markdown stream. This stage finds every `<table>` block, splits it into
//! `<tr>`/`<td>` elements, reads `rowspan`/`colspan` attributes (quoted or
//! bare), and cleans each cell's text. Per-table extraction is independent,
//! so tables fan out over rayon when parallelism is enabled.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::model::{PhysicalTable, RawCell};

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<table[^>]*>(.*?)</table>").unwrap());
static TR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap());
static TD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<t[dh]([^>]*)>(.*?)</t[dh]>").unwrap());
static ROWSPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"rowspan=["']?(\d+)["']?"#).unwrap());
static COLSPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"colspan=["']?(\d+)["']?"#).unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean one cell's inner markup: strip residual tags, collapse whitespace.
pub fn clean_cell_text(raw: &str) -> String {
    let no_tags = TAG_RE.replace_all(raw, "");
    WS_RE.replace_all(&no_tags, " ").trim().to_string()
}

/// Span attribute values below 1 are clamped rather than rejected; a corrupt
/// cell must not break its siblings.
fn parse_span(attrs: &str, re: &Regex) -> u32 {
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(|v| v.max(1))
        .unwrap_or(1)
}

fn extract_one(index: usize, body: &str) -> PhysicalTable {
    let mut rows = Vec::new();
    for (row_idx, tr) in TR_RE.captures_iter(body).enumerate() {
        let mut cells = Vec::new();
        for (col_idx, td) in TD_RE.captures_iter(&tr[1]).enumerate() {
            let row_span = parse_span(&td[1], &ROWSPAN_RE);
            let col_span = parse_span(&td[1], &COLSPAN_RE);
            cells.push(RawCell {
                row_span,
                col_span,
                text: clean_cell_text(&td[2]),
                origin_row: row_idx,
                origin_col: col_idx,
            });
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    PhysicalTable { index, rows }
}

/// Extract every table block from the Markdown content.
///
/// Tables with no rows are dropped. Output order always matches document
/// order, with or without parallelism.
pub fn extract_tables(markdown: &str, parallel: bool) -> Vec<PhysicalTable> {
    let bodies: Vec<&str> = TABLE_RE
        .captures_iter(markdown)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    log::debug!("markup: found {} table blocks", bodies.len());

    let tables: Vec<PhysicalTable> = if parallel {
        bodies
            .par_iter()
            .enumerate()
            .map(|(i, body)| extract_one(i, body))
            .collect()
    } else {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| extract_one(i, body))
            .collect()
    };

    tables.into_iter().filter(|t| !t.is_empty()).collect()
}
