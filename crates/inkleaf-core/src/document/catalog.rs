//! Catalog access: page-tree walking and the structure-tree root lookup.

use super::page::Page;
use super::Document;
use crate::error::{PdfError, Result};
use crate::model::objects::{Dict, Object};
use rustc_hash::FxHashSet;

const DEFAULT_MEDIA_BOX: (f64, f64, f64, f64) = (0.0, 0.0, 612.0, 792.0);

/// Walks `/Root -> /Pages` depth-first, inheriting `/Resources`,
/// `/MediaBox`, and `/Rotate` from ancestors, and returns pages in
/// document order. Cycles through `/Kids` are bounded by a visited set on
/// object identifiers (mirrors the same invariant as indirect-reference
/// resolution, spec.md §3).
pub fn collect_pages(doc: &Document) -> Result<Vec<Page>> {
    let root_ref = doc
        .trailer()
        .get("Root")
        .cloned()
        .ok_or_else(|| PdfError::InvalidPdf("trailer has no /Root".into()))?;
    let catalog = doc.resolve_object(&root_ref);
    let catalog_dict = catalog
        .as_dict()
        .map_err(|_| PdfError::InvalidPdf("/Root does not resolve to a dictionary".into()))?;

    let Some(pages_ref) = catalog_dict.get("Pages") else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    let mut visited = FxHashSet::default();
    walk_page_tree(
        doc,
        pages_ref,
        &Dict::new(),
        DEFAULT_MEDIA_BOX,
        0,
        &mut visited,
        &mut out,
    )?;
    Ok(out)
}

fn walk_page_tree(
    doc: &Document,
    node_ref: &Object,
    inherited_resources: &Dict,
    inherited_media_box: (f64, f64, f64, f64),
    inherited_rotation: i64,
    visited: &mut FxHashSet<u32>,
    out: &mut Vec<Page>,
) -> Result<()> {
    if let Object::Reference(id) = node_ref {
        if !visited.insert(id.num) {
            return Ok(());
        }
    }
    let node = doc.resolve_object(node_ref);
    let Ok(dict) = node.as_dict() else {
        return Ok(());
    };

    let resources = dict
        .get("Resources")
        .and_then(|o| doc.resolve_object(o).as_dict().ok().cloned())
        .unwrap_or_else(|| inherited_resources.clone());
    let media_box = dict
        .get("MediaBox")
        .and_then(|o| doc.resolve_object(o).as_rect().ok())
        .unwrap_or(inherited_media_box);
    let rotation = dict
        .get("Rotate")
        .and_then(|o| doc.resolve_object(o).as_int().ok())
        .unwrap_or(inherited_rotation);

    let node_type = dict.get("Type").and_then(|o| o.as_name().ok());
    let has_kids = dict.get("Kids").is_some();

    if node_type == Some("Page") || (!has_kids && node_type != Some("Pages")) {
        out.push(Page {
            dict: dict.clone(),
            resources,
            media_box: crate::model::geometry::normalize_rect(media_box),
            rotation,
        });
        return Ok(());
    }

    if let Some(kids) = dict.get("Kids").and_then(|o| o.as_array().ok()) {
        for kid in kids {
            walk_page_tree(
                doc,
                kid,
                &resources,
                media_box,
                rotation,
                visited,
                out,
            )?;
        }
    }
    Ok(())
}

/// Returns the document's `/StructTreeRoot`, if the catalog declares one
/// and marks the document as tagged (`/MarkInfo /Marked true`), per
/// spec.md §4.4.
pub fn struct_tree_root(doc: &Document) -> Option<Dict> {
    let root_ref = doc.trailer().get("Root")?;
    let catalog = doc.resolve_object(root_ref);
    let catalog_dict = catalog.as_dict().ok()?;

    let marked = catalog_dict
        .get("MarkInfo")
        .and_then(|o| doc.resolve_object(o).as_dict().ok().cloned())
        .and_then(|m| m.get("Marked").cloned())
        .map(|v| matches!(v, Object::Bool(true)))
        .unwrap_or(false);
    if !marked {
        return None;
    }

    let struct_root_ref = catalog_dict.get("StructTreeRoot")?;
    doc.resolve_object(struct_root_ref).as_dict().ok().cloned()
}

/// Resolves the catalog's `/RoleMap`, used to map custom tag names onto
/// the standard PDF structure roles (spec.md §4.4).
pub fn role_map(doc: &Document) -> Dict {
    doc.trailer()
        .get("Root")
        .map(|r| doc.resolve_object(r))
        .and_then(|c| c.as_dict().ok().cloned())
        .and_then(|catalog| catalog.get("StructTreeRoot").cloned())
        .map(|s| doc.resolve_object(&s))
        .and_then(|st| st.as_dict().ok().cloned())
        .and_then(|st| st.get("RoleMap").cloned())
        .map(|rm| doc.resolve_object(&rm))
        .and_then(|rm| rm.as_dict().ok().cloned())
        .unwrap_or_default()
}
