//! Affine transforms over PDF default user space.

/// A 2D point `(x, y)`.
pub type Point = (f64, f64);

/// A rectangle `(x0, y0, x1, y1)`.
pub type Rect = (f64, f64, f64, f64);

/// A 6-value affine transform `(a, b, c, d, e, f)` mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)` (PDF §8.3.4).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

pub const IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Concatenates `m0` onto `m1`: applies `m0` first, then `m1`. This is the
/// operation behind PDF's `cm` operator and `Tm`/CTM composition.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + b0 * c1,
        a0 * b1 + b0 * d1,
        c0 * a1 + d0 * c1,
        c0 * b1 + d0 * d1,
        e0 * a1 + f0 * c1 + e1,
        e0 * b1 + f0 * d1 + f1,
    )
}

pub fn apply_matrix_pt(m: Matrix, p: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = p;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Transforms a rectangle by `m`, returning the axis-aligned bounding box of
/// the transformed corners (the result is not rotated even if `m` rotates).
pub fn apply_matrix_rect(m: Matrix, rect: Rect) -> Rect {
    let (x0, y0, x1, y1) = rect;
    let corners = [
        apply_matrix_pt(m, (x0, y0)),
        apply_matrix_pt(m, (x1, y0)),
        apply_matrix_pt(m, (x0, y1)),
        apply_matrix_pt(m, (x1, y1)),
    ];
    let xs = corners.iter().map(|p| p.0);
    let ys = corners.iter().map(|p| p.1);
    (
        xs.clone().fold(f64::INFINITY, f64::min),
        ys.clone().fold(f64::INFINITY, f64::min),
        xs.fold(f64::NEG_INFINITY, f64::max),
        ys.fold(f64::NEG_INFINITY, f64::max),
    )
}

/// Normalises a rectangle so that x0 <= x1 and y0 <= y1 (spec.md §3 invariant).
pub fn normalize_rect(rect: Rect) -> Rect {
    let (x0, y0, x1, y1) = rect;
    (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Rotates `rect` (already in the page's MediaBox-relative space) by a
/// multiple of 90 degrees around the page whose unrotated size is
/// `(width, height)`, producing the box in the rotated page's coordinate
/// space.
pub fn rotate_rect(rect: Rect, width: f64, height: f64, rotation: i64) -> Rect {
    let (x0, y0, x1, y1) = rect;
    match rotation.rem_euclid(360) {
        90 => (y0, width - x1, y1, width - x0),
        180 => (width - x1, height - y1, width - x0, height - y0),
        270 => (height - y1, x0, height - y0, x1),
        _ => rect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_noop() {
        assert_eq!(apply_matrix_pt(IDENTITY, (3.0, 4.0)), (3.0, 4.0));
    }

    #[test]
    fn concatenation_composes_translation_then_scale() {
        let translate = (1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        // cm applies `scale` on top of the existing CTM `translate`.
        let ctm = mult_matrix(translate, scale);
        assert_eq!(apply_matrix_pt(ctm, (1.0, 1.0)), (12.0, 2.0));
    }

    #[test]
    fn normalize_swaps_reversed_corners() {
        assert_eq!(normalize_rect((5.0, 5.0, 1.0, 1.0)), (1.0, 1.0, 5.0, 5.0));
    }

    #[test]
    fn rotate_90_swaps_axes() {
        let r = rotate_rect((0.0, 0.0, 10.0, 20.0), 100.0, 200.0, 90);
        assert_eq!(r, (0.0, 90.0, 20.0, 100.0));
    }
}
