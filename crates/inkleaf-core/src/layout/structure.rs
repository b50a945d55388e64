//! Structure-tree reading order (component H, spec.md §4.4 "Structure-tree
//! path"): walks `/StructTreeRoot` depth-first, attaching page spans to
//! their tagged MCID leaf.

use super::span::TextSpan;
use super::{ReadingBlock, Separator};
use crate::document::Document;
use crate::model::objects::{Dict, Object};
use rustc_hash::{FxHashMap, FxHashSet};

/// Roles that force a blank-line separator around their content, per
/// spec.md §4.4: `"P", "H1"-"H6", "LI", "Caption", "Table", "TD"`.
const BLOCK_ROLES: &[&str] = &[
    "P", "H1", "H2", "H3", "H4", "H5", "H6", "LI", "Caption", "Table", "TD",
];

fn resolve_role<'a>(role: &'a str, role_map: &'a Dict) -> &'a str {
    role_map
        .get(role)
        .and_then(|o| o.as_name().ok())
        .unwrap_or(role)
}

struct Walker<'a> {
    doc: &'a Document,
    role_map: &'a Dict,
    by_mcid: FxHashMap<u32, Vec<&'a TextSpan>>,
}

/// Builds the reading-order block sequence by walking the structure tree,
/// per spec.md §4.4.
pub fn reorder(doc: &Document, struct_root: &Dict, role_map: &Dict, spans: &[TextSpan]) -> Vec<ReadingBlock> {
    let mut by_mcid: FxHashMap<u32, Vec<&TextSpan>> = FxHashMap::default();
    for span in spans {
        if let Some(mcid) = span.mcid {
            by_mcid.entry(mcid).or_default().push(span);
        }
    }
    let walker = Walker { doc, role_map, by_mcid };

    let mut out = Vec::new();
    let mut pending = None;
    if let Some(kids) = struct_root.get("K") {
        walker.walk_node_ref(kids, &mut out, &mut pending);
    }
    out
}

/// Collects every MCID tagged (directly or through an ancestor) as
/// `/Artifact`, per spec.md §3's exclusion of artifact-tagged content. Used
/// to filter `extract_bounds`, which otherwise has no structure-tree
/// involvement at all.
pub fn artifact_mcids(doc: &Document, struct_root: &Dict) -> FxHashSet<u32> {
    let mut mcids = FxHashSet::default();
    if let Some(kids) = struct_root.get("K") {
        collect_artifact_mcids(doc, kids, false, &mut mcids);
    }
    mcids
}

fn collect_artifact_mcids(doc: &Document, node: &Object, in_artifact: bool, out: &mut FxHashSet<u32>) {
    match node {
        Object::Int(mcid) => {
            if in_artifact {
                out.insert(*mcid as u32);
            }
        }
        Object::Array(items) => {
            for item in items {
                collect_artifact_mcids(doc, item, in_artifact, out);
            }
        }
        other => {
            let resolved = doc.resolve_object(other);
            let Ok(dict) = resolved.as_dict() else { return };
            let role = dict.get("S").and_then(|o| o.as_name().ok()).unwrap_or("");
            let in_artifact = in_artifact || role == "Artifact";
            if let Some(kids) = dict.get("K") {
                collect_artifact_mcids(doc, kids, in_artifact, out);
            }
        }
    }
}

/// Raises `pending` to at least `hint`, never downgrading a stronger one
/// (`BlankLine` beats `Newline` beats `Space`).
fn raise(pending: &mut Option<Separator>, hint: Separator) {
    let rank = |s: &Separator| match s {
        Separator::Space => 0,
        Separator::Newline => 1,
        Separator::BlankLine => 2,
    };
    match pending {
        Some(existing) if rank(existing) >= rank(&hint) => {}
        _ => *pending = Some(hint),
    }
}

impl<'a> Walker<'a> {
    fn walk_node_ref(&self, node: &Object, out: &mut Vec<ReadingBlock>, pending: &mut Option<Separator>) {
        match node {
            Object::Int(mcid) => self.emit_leaf(*mcid as u32, out, pending),
            Object::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        raise(pending, Separator::Newline);
                    }
                    self.walk_node_ref(item, out, pending);
                }
            }
            other => {
                let resolved = self.doc.resolve_object(other);
                self.walk_element(&resolved, out, pending);
            }
        }
    }

    fn walk_element(&self, node: &Object, out: &mut Vec<ReadingBlock>, pending: &mut Option<Separator>) {
        let Ok(dict) = node.as_dict() else { return };
        let role = dict.get("S").and_then(|o| o.as_name().ok()).unwrap_or("");
        if role == "Artifact" {
            return;
        }
        let resolved_role = resolve_role(role, self.role_map);
        let is_block = BLOCK_ROLES.contains(&resolved_role);

        if is_block {
            raise(pending, Separator::BlankLine);
        }
        if let Some(kids) = dict.get("K") {
            self.walk_node_ref(kids, out, pending);
        }
        if is_block {
            raise(pending, Separator::BlankLine);
        }
    }

    fn emit_leaf(&self, mcid: u32, out: &mut Vec<ReadingBlock>, pending: &mut Option<Separator>) {
        let Some(spans) = self.by_mcid.get(&mcid) else { return };
        let mut text = String::new();
        let mut x_anchors = Vec::new();
        let mut font_size: f64 = 0.0;
        let mut prev: Option<&TextSpan> = None;
        for span in spans {
            font_size = font_size.max(span.font_size);
            let mut word_break = prev.is_none();
            if let Some(p) = prev {
                let gap = span.x0 - p.x1;
                if gap > span.font_size.max(p.font_size) * 0.25 {
                    text.push(' ');
                    word_break = true;
                }
            }
            if word_break {
                x_anchors.push(span.x0);
            }
            text.push_str(&span.text);
            prev = Some(span);
        }
        if !text.is_empty() {
            out.push(ReadingBlock { text, before: pending.take(), font_size, x_anchors });
        }
    }
}
