//! Span collection and reading-order reconstruction (components G, H, I).

pub mod reorder;
pub mod span;
pub mod structure;

use crate::document::catalog;
use crate::document::Document;
use rustc_hash::FxHashSet;
use span::TextSpan;

/// The separator to insert before a [`ReadingBlock`] when serialising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Space,
    Newline,
    BlankLine,
}

/// An ordered chunk of reading-order text and the separator-hint that
/// precedes it (spec.md §4.4: "an ordered sequence of (text,
/// separator-hint)").
///
/// `font_size` and `x_anchors` carry just enough of the underlying spans'
/// geometry forward for the Markdown formatter's heading and table
/// heuristics (§4.6), which operate on font size and column x-position
/// rather than on text alone.
#[derive(Debug, Clone)]
pub struct ReadingBlock {
    pub text: String,
    pub before: Option<Separator>,
    pub font_size: f64,
    pub x_anchors: Vec<f64>,
}

/// Reconstructs reading order for `spans` (already in stream order),
/// preferring the structure-tree path (H) and falling back to the
/// geometric path (I) for spans the tree doesn't cover, per spec.md §4.4.
pub fn reading_order(doc: &Document, spans: &[TextSpan]) -> Vec<ReadingBlock> {
    let Some(struct_root) = catalog::struct_tree_root(doc) else {
        return reorder::reorder(spans);
    };
    let role_map = catalog::role_map(doc);
    let (tagged, untagged): (Vec<TextSpan>, Vec<TextSpan>) =
        spans.iter().cloned().partition(|s| s.mcid.is_some());

    let mut blocks = structure::reorder(doc, &struct_root, &role_map, &tagged);
    if !untagged.is_empty() {
        let mut fallback = reorder::reorder(&untagged);
        if let Some(first) = fallback.first_mut() {
            if first.before.is_none() {
                first.before = Some(Separator::BlankLine);
            }
        }
        blocks.append(&mut fallback);
    }
    blocks
}

/// MCIDs tagged `/Artifact` in the structure tree, if one exists (spec.md
/// §3: artifact-tagged content is excluded). Used by `extract_bounds`,
/// which otherwise bypasses the structure tree entirely.
pub fn artifact_mcids(doc: &Document) -> FxHashSet<u32> {
    let Some(struct_root) = catalog::struct_tree_root(doc) else {
        return FxHashSet::default();
    };
    structure::artifact_mcids(doc, &struct_root)
}

/// Serialises [`ReadingBlock`]s into plain text: at most one blank line
/// between blocks, a single space for `Separator::Space` (spec.md §4.4:
/// "The separator-hint collapses during serialisation so that at most one
/// blank line appears between blocks").
pub fn blocks_to_text(blocks: &[ReadingBlock]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            match block.before {
                Some(Separator::BlankLine) => out.push_str("\n\n"),
                Some(Separator::Newline) | None => out.push('\n'),
                Some(Separator::Space) => out.push(' '),
            }
        }
        out.push_str(&block.text);
    }
    out
}
