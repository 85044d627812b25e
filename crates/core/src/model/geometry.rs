//! 2D geometry for page space: points, rectangles and affine matrices.

use super::objects::PDFObject;

/// A point in user space.
pub type Point = (f64, f64);

/// A rectangle (x0, y0, x1, y1). Normalized rectangles have x0 <= x1 and y0 <= y1.
pub type Rect = (f64, f64, f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
/// Transforms point (x, y) to (ax + cy + e, bx + dy + f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Multiplies two matrices: result = m1 * m0.
/// This applies m1 first, then m0.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Moves the origin of `m` by (x, y) measured in `m`'s own space.
pub fn translate_matrix(m: Matrix, v: Point) -> Matrix {
    mult_matrix((1.0, 0.0, 0.0, 1.0, v.0, v.1), m)
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Reads a six-number array such as `/Matrix` or `/FontMatrix`.
pub fn matrix_from_object(obj: &PDFObject) -> Option<Matrix> {
    let nums = numbers(obj)?;
    match nums.as_slice() {
        [a, b, c, d, e, f] => Some((*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

/// Reads a four-number rectangle array and normalizes its corners.
pub fn rect_from_object(obj: &PDFObject) -> Option<Rect> {
    let nums = numbers(obj)?;
    match nums.as_slice() {
        [x0, y0, x1, y1] => Some(normalize_rect((*x0, *y0, *x1, *y1))),
        _ => None,
    }
}

fn numbers(obj: &PDFObject) -> Option<Vec<f64>> {
    obj.as_array()
        .ok()?
        .iter()
        .map(|v| v.as_num().ok())
        .collect()
}

pub fn normalize_rect(r: Rect) -> Rect {
    (r.0.min(r.2), r.1.min(r.3), r.0.max(r.2), r.1.max(r.3))
}

pub fn rect_width(r: Rect) -> f64 {
    r.2 - r.0
}

pub fn rect_height(r: Rect) -> f64 {
    r.3 - r.1
}

pub fn rect_area(r: Rect) -> f64 {
    rect_width(r) * rect_height(r)
}

/// Inclusive point containment.
pub fn rect_contains(r: Rect, p: Point) -> bool {
    p.0 >= r.0 && p.0 <= r.2 && p.1 >= r.1 && p.1 <= r.3
}

/// Overlap of two normalized rectangles, if any.
pub fn rect_intersection(a: Rect, b: Rect) -> Option<Rect> {
    let r = (a.0.max(b.0), a.1.max(b.1), a.2.min(b.2), a.3.min(b.3));
    (r.0 <= r.2 && r.1 <= r.3).then_some(r)
}

/// Normalizes a `/Rotate` value to 0, 90, 180 or 270 degrees clockwise.
/// Values that are not a multiple of 90 count as 0.
pub const fn normalize_rotation(degrees: i64) -> i64 {
    let r = degrees.rem_euclid(360);
    if r % 90 == 0 { r } else { 0 }
}

/// Maps a point so text on a page displayed with `rotation` (clockwise)
/// reads left to right, top to bottom.
pub fn rotate_point(rotation: i64, p: Point) -> Point {
    let (x, y) = p;
    match normalize_rotation(rotation) {
        90 => (y, -x),
        180 => (-x, -y),
        270 => (-y, x),
        _ => (x, y),
    }
}

/// [`rotate_point`] on both corners, normalized.
pub fn rotate_rect(rotation: i64, r: Rect) -> Rect {
    let (x0, y0) = rotate_point(rotation, (r.0, r.1));
    let (x1, y1) = rotate_point(rotation, (r.2, r.3));
    normalize_rect((x0, y0, x1, y1))
}
