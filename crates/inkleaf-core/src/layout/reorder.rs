//! Geometric reading-order fallback (component I, spec.md §4.4.2): column
//! detection, line grouping, and line/column ordering when no structure
//! tree is available (or a span carries no MCID).

use super::span::TextSpan;
use super::{ReadingBlock, Separator};
use ordered_float::OrderedFloat;
use rstar::{RTree, RTreeObject, AABB};

struct Indexed<'a> {
    span: &'a TextSpan,
}

impl RTreeObject for Indexed<'_> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.span.x0, self.span.y0], [self.span.x1, self.span.y1])
    }
}

/// Produces the reading-order block sequence for spans without structure
/// information, per spec.md §4.4.2 steps 1-5.
pub fn reorder(spans: &[TextSpan]) -> Vec<ReadingBlock> {
    if spans.is_empty() {
        return Vec::new();
    }
    let glyph_width = median_glyph_width(spans);
    let columns = detect_columns(spans, glyph_width);
    let median_line_height = median(spans.iter().map(TextSpan::height).collect());

    let mut out = Vec::new();
    for (ci, column) in columns.iter().enumerate() {
        let lines = group_lines(column);
        let mut prev_bottom: Option<f64> = None;
        for (li, line) in lines.iter().enumerate() {
            let (text, x_anchors) = join_line(line);
            if text.is_empty() {
                continue;
            }
            let font_size = line.iter().map(|s| s.font_size).fold(0.0, f64::max);
            let before = if ci == 0 && li == 0 {
                None
            } else if li == 0 {
                Some(Separator::BlankLine)
            } else {
                let top = line.iter().map(|s| s.y1).fold(f64::MIN, f64::max);
                let gap = prev_bottom.map(|b| b - top).unwrap_or(0.0);
                Some(if gap > median_line_height.max(1.0) * 1.5 {
                    Separator::BlankLine
                } else {
                    Separator::Newline
                })
            };
            out.push(ReadingBlock { text, before, font_size, x_anchors });
            prev_bottom = Some(line.iter().map(|s| s.y0).fold(f64::MAX, f64::min));
        }
    }
    out
}

fn join_line(line: &[&TextSpan]) -> (String, Vec<f64>) {
    let mut text = String::new();
    let mut x_anchors = Vec::new();
    let mut prev: Option<&&TextSpan> = None;
    for span in line {
        let mut word_break = prev.is_none();
        if let Some(p) = prev {
            if span.x0 - p.x1 > span.font_size.max(p.font_size) * 0.25 {
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
    (text, x_anchors)
}

/// Groups spans within one column into visual lines (spec.md §4.4.2 step
/// 3): sort top-to-bottom, merge spans whose y-intervals overlap by more
/// than half the smaller span's height, then sort each line left-to-right.
fn group_lines<'a>(column: &[&'a TextSpan]) -> Vec<Vec<&'a TextSpan>> {
    let mut sorted: Vec<&TextSpan> = column.to_vec();
    sorted.sort_by_key(|s| std::cmp::Reverse(OrderedFloat(s.y1)));

    let mut lines: Vec<Vec<&TextSpan>> = Vec::new();
    for span in sorted {
        let mut placed = false;
        if let Some(line) = lines.last_mut() {
            let overlaps = line.iter().any(|other| y_overlap_fraction(span, other) > 0.5);
            if overlaps {
                line.push(span);
                placed = true;
            }
        }
        if !placed {
            lines.push(vec![span]);
        }
    }
    for line in &mut lines {
        line.sort_by_key(|s| OrderedFloat(s.x0));
    }
    lines
}

fn y_overlap_fraction(a: &TextSpan, b: &TextSpan) -> f64 {
    let overlap = (a.y1.min(b.y1) - a.y0.max(b.y0)).max(0.0);
    let smaller = a.height().min(b.height()).max(1e-6);
    overlap / smaller
}

/// Partitions spans into left-to-right columns by locating a low-density
/// gap (>1.5x the median gap between x-centres) in the sorted x-centre
/// sequence, then querying an [`RTree`] for the spans whose centre falls in
/// each resulting x-range (spec.md §4.4.2 step 2).
fn detect_columns<'a>(spans: &'a [TextSpan], glyph_width: f64) -> Vec<Vec<&'a TextSpan>> {
    let mut centers: Vec<f64> = spans.iter().map(TextSpan::x_center).collect();
    centers.sort_by_key(|&c| OrderedFloat(c));

    let gaps: Vec<f64> = centers.windows(2).map(|w| w[1] - w[0]).collect();
    let median_gap = median(gaps.clone()).max(glyph_width);

    let mut boundaries: Vec<f64> = gaps
        .iter()
        .zip(centers.windows(2))
        .filter(|(&gap, _)| gap > median_gap * 1.5)
        .map(|(_, w)| (w[0] + w[1]) / 2.0)
        .collect();
    boundaries.sort_by_key(|&b| OrderedFloat(b));

    let y_min = spans.iter().map(|s| s.y0).fold(f64::INFINITY, f64::min);
    let y_max = spans.iter().map(|s| s.y1).fold(f64::NEG_INFINITY, f64::max);
    let x_min = centers.first().copied().unwrap_or(0.0) - 1.0;
    let x_max = centers.last().copied().unwrap_or(0.0) + 1.0;

    let tree: RTree<Indexed<'a>> = RTree::bulk_load(spans.iter().map(|span| Indexed { span }).collect());

    let mut edges = vec![x_min];
    edges.extend(boundaries);
    edges.push(x_max);

    let mut columns = Vec::with_capacity(edges.len().saturating_sub(1));
    for w in edges.windows(2) {
        let (left, right) = (w[0], w[1]);
        let envelope = AABB::from_corners([left, y_min], [right, y_max]);
        let members: Vec<&TextSpan> = tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|i| i.span)
            .filter(|s| {
                let c = s.x_center();
                c >= left && (c < right || right == x_max)
            })
            .collect();
        if !members.is_empty() {
            columns.push(members);
        }
    }
    columns
}

fn median_glyph_width(spans: &[TextSpan]) -> f64 {
    let widths: Vec<f64> = spans
        .iter()
        .filter(|s| !s.text.is_empty())
        .map(|s| s.width() / s.text.chars().count() as f64)
        .collect();
    median(widths).max(1.0)
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by_key(|&v| OrderedFloat(v));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
