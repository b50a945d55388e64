//! Markdown formatter (component K, spec.md §4.6): a pure function over the
//! reading-order block list. Treated by spec.md §1 as an external
//! collaborator of the core engine rather than part of the text/structure
//! path proper, so it lives at the crate root rather than under `layout`,
//! consuming [`ReadingBlock`] rather than reaching back into the
//! interpreter's spans.
//!
//! Grounded in the teacher's `converter::text`/`converter::html` line/block
//! rendering passes, generalized from plain-text/HTML emission to
//! Markdown's heading, list, and table heuristics.

use crate::layout::{ReadingBlock, Separator};
use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;
use regex::Regex;

const BULLET_CHARS: &[char] = &['•', '-', '*', '·', '◦'];

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").unwrap());

/// Converts a page's reading-order blocks into Markdown text, per spec.md
/// §4.6's heuristics. `blocks` must already be in reading order (the output
/// of [`crate::layout::reading_order`]).
pub fn to_markdown(blocks: &[ReadingBlock]) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let body_size = median_font_size(blocks);
    let heading_buckets = heading_buckets(blocks, body_size);

    let mut out = String::new();
    let mut i = 0;
    let mut first = true;
    while i < blocks.len() {
        if let Some(end) = table_extent(blocks, i) {
            if !first {
                out.push_str(separator_text(blocks[i].before));
            }
            render_table(&blocks[i..=end], &mut out);
            i = end + 1;
        } else {
            if !first {
                out.push_str(separator_text(blocks[i].before));
            }
            render_line(&blocks[i], &heading_buckets, &mut out);
            i += 1;
        }
        first = false;
    }
    out
}

fn separator_text(before: Option<Separator>) -> &'static str {
    match before {
        Some(Separator::BlankLine) => "\n\n",
        Some(Separator::Newline) | None => "\n",
        Some(Separator::Space) => " ",
    }
}

fn render_line(block: &ReadingBlock, heading_buckets: &[f64], out: &mut String) {
    if let Some(level) = heading_level(block.font_size, heading_buckets) {
        out.push_str(&"#".repeat(level));
        out.push(' ');
        out.push_str(block.text.trim());
        return;
    }
    if let Some(rest) = strip_bullet(&block.text) {
        out.push_str("- ");
        out.push_str(rest.trim());
        return;
    }
    if let Some(caps) = NUMBERED_ITEM.captures(block.text.trim_start()) {
        out.push_str(&caps[1]);
        out.push_str(". ");
        out.push_str(caps[2].trim());
        return;
    }
    out.push_str(&block.text);
}

fn strip_bullet(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let mut chars = trimmed.char_indices();
    let (_, c) = chars.next()?;
    if !BULLET_CHARS.contains(&c) {
        return None;
    }
    let rest = &trimmed[c.len_utf8()..];
    Some(rest.trim_start())
}

/// Heading-level boundaries: distinct font sizes at least 1.2x the document
/// median body size, largest first, capped at 6 (spec.md §4.6). Sizes
/// within half a point of each other merge into the same bucket.
fn heading_buckets(blocks: &[ReadingBlock], body_size: f64) -> Vec<f64> {
    let threshold = body_size * 1.2;
    let mut sizes: Vec<f64> = blocks
        .iter()
        .map(|b| b.font_size)
        .filter(|&s| s >= threshold && s > 0.0)
        .collect();
    sizes.sort_by_key(|&s| std::cmp::Reverse(OrderedFloat(s)));
    let mut buckets: Vec<f64> = Vec::new();
    for size in sizes {
        if buckets.last().map(|&last| (last - size).abs() < 0.5).unwrap_or(false) {
            continue;
        }
        buckets.push(size);
        if buckets.len() == 6 {
            break;
        }
    }
    buckets
}

fn heading_level(font_size: f64, buckets: &[f64]) -> Option<usize> {
    buckets
        .iter()
        .position(|&b| (b - font_size).abs() < 0.5)
        .map(|idx| idx + 1)
}

fn median_font_size(blocks: &[ReadingBlock]) -> f64 {
    let mut sizes: Vec<f64> = blocks.iter().map(|b| b.font_size).filter(|&s| s > 0.0).collect();
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.sort_by_key(|&s| OrderedFloat(s));
    sizes[sizes.len() / 2]
}

/// If `blocks[start..]` begins a run of >=2 consecutive lines sharing >=3
/// column x-anchors (within half a space width), returns the index of the
/// run's last line (spec.md §4.6 "Tables").
fn table_extent(blocks: &[ReadingBlock], start: usize) -> Option<usize> {
    let mut end = start;
    let mut anchors = blocks[start].x_anchors.clone();
    let tol = space_width(blocks[start].font_size);
    let mut i = start + 1;
    while i < blocks.len() {
        let shared = shared_anchor_count(&anchors, &blocks[i].x_anchors, tol);
        if shared < 3 {
            break;
        }
        anchors = intersect_anchors(&anchors, &blocks[i].x_anchors, tol);
        end = i;
        i += 1;
    }
    if end > start {
        Some(end)
    } else {
        None
    }
}

fn space_width(font_size: f64) -> f64 {
    (font_size * 0.3).max(1.0) * 0.5
}

fn shared_anchor_count(a: &[f64], b: &[f64], tol: f64) -> usize {
    a.iter().filter(|&&x| b.iter().any(|&y| (x - y).abs() <= tol)).count()
}

fn intersect_anchors(a: &[f64], b: &[f64], tol: f64) -> Vec<f64> {
    a.iter().copied().filter(|&x| b.iter().any(|&y| (x - y).abs() <= tol)).collect()
}

fn render_table(rows: &[ReadingBlock], out: &mut String) {
    let tol = space_width(rows.iter().map(|r| r.font_size).fold(0.0, f64::max));
    let mut anchors = rows[0].x_anchors.clone();
    for row in &rows[1..] {
        anchors = intersect_anchors(&anchors, &row.x_anchors, tol);
    }
    anchors.sort_by_key(|&a| OrderedFloat(a));
    if anchors.is_empty() {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&row.text);
        }
        return;
    }

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&row_to_cells(row, &anchors));
        if i == 0 {
            out.push('\n');
            out.push_str(&"| --- ".repeat(anchors.len()));
            out.push('|');
        }
    }
}

/// Splits `row`'s text at the shared column boundaries, approximating each
/// cell by proportional text position since individual glyph x-positions
/// aren't retained on a [`ReadingBlock`].
fn row_to_cells(row: &ReadingBlock, anchors: &[f64]) -> String {
    let cols = anchors.len();
    let chars: Vec<char> = row.text.chars().collect();
    if chars.is_empty() || cols == 0 {
        return format!("| {} |", row.text.trim());
    }
    let per_col = (chars.len() + cols - 1) / cols;
    let mut cells = Vec::with_capacity(cols);
    for c in 0..cols {
        let lo = (c * per_col).min(chars.len());
        let hi = ((c + 1) * per_col).min(chars.len());
        cells.push(chars[lo..hi].iter().collect::<String>().trim().to_string());
    }
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, font_size: f64, before: Option<Separator>) -> ReadingBlock {
        ReadingBlock { text: text.to_string(), before, font_size, x_anchors: Vec::new() }
    }

    #[test]
    fn heading_gets_hash_prefix() {
        let blocks = vec![
            block("Document Title", 24.0, None),
            block("Body paragraph one.", 10.0, Some(Separator::BlankLine)),
            block("Body paragraph two.", 10.0, Some(Separator::BlankLine)),
        ];
        let md = to_markdown(&blocks);
        assert!(md.starts_with("# Document Title"));
        assert!(md.contains("Body paragraph one."));
    }

    #[test]
    fn bullet_line_becomes_dash() {
        let blocks = vec![block("• first item", 10.0, None)];
        assert_eq!(to_markdown(&blocks), "- first item");
    }

    #[test]
    fn numbered_line_keeps_its_number() {
        let blocks = vec![block("3) third step", 10.0, None)];
        assert_eq!(to_markdown(&blocks), "3. third step");
    }

    #[test]
    fn plain_paragraph_passes_through() {
        let blocks = vec![block("Just a regular line.", 10.0, None)];
        assert_eq!(to_markdown(&blocks), "Just a regular line.");
    }

    #[test]
    fn aligned_columns_render_as_table() {
        let mut a = block("Name   Age   City", 10.0, None);
        a.x_anchors = vec![0.0, 40.0, 80.0];
        let mut b = block("Alice  30    Berlin", 10.0, Some(Separator::Newline));
        b.x_anchors = vec![0.0, 40.0, 80.0];
        let blocks = vec![a, b];
        let md = to_markdown(&blocks);
        assert!(md.contains("| --- | --- | --- |"));
        assert!(md.starts_with('|'));
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(to_markdown(&[]), "");
    }
}
