//! Positioned text fragments.

use crate::document::tolerance::{MERGE_BACKTRACK, MERGE_TIGHT_GAP, MIN_FONT_SIZE};
use crate::model::geometry::{Point, Rect, rect_area, rect_intersection};
use std::cmp::Ordering;

/// A piece of text with the position it was drawn at.
///
/// `x`/`y` is the origin of the first glyph in page space, `width` the
/// advance of the whole run and `font_size` the rendered size, which also
/// serves as the run's height.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub font_size: f64,
    pub text: String,
}

impl TextRun {
    pub fn new(x: f64, y: f64, width: f64, font_size: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            font_size,
            text: text.into(),
        }
    }

    pub const fn origin(&self) -> Point {
        (self.x, self.y)
    }

    pub fn endx(&self) -> f64 {
        self.x + self.width
    }

    pub fn endy(&self) -> f64 {
        self.y + self.font_size
    }

    pub fn bbox(&self) -> Rect {
        (self.x, self.y, self.endx(), self.endy())
    }

    pub fn mean_character_width(&self) -> f64 {
        match self.text.chars().count() {
            0 => 0.0,
            n => self.width / n as f64,
        }
    }

    /// Font size used for merge tolerances; never zero.
    fn tolerance_size(&self) -> f64 {
        if self.font_size.is_finite() && self.font_size > 0.0 {
            self.font_size
        } else {
            MIN_FONT_SIZE
        }
    }

    /// True when `other` sits on the same baseline at the same size and
    /// starts close enough to this run's end to continue it.
    pub fn mergeable(&self, other: &Self) -> bool {
        let end = self.endx();
        self.y as i64 == other.y as i64
            && self.font_size == other.font_size
            && other.x >= end - MERGE_BACKTRACK
            && other.x <= end + self.tolerance_size()
    }

    /// Joins `other` onto the end of this run. A small gap concatenates the
    /// text; a larger one puts a space between.
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.mergeable(other) {
            return None;
        }
        let gap = other.x - self.endx();
        let text = if gap < self.tolerance_size() * MERGE_TIGHT_GAP {
            format!("{}{}", self.text, other.text)
        } else {
            format!("{} {}", self.text, other.text)
        };
        Some(Self::new(self.x, self.y, other.endx() - self.x, self.font_size, text))
    }

    pub fn area(&self) -> f64 {
        self.width * self.font_size
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.endx() && other.x <= self.endx() && self.y <= other.endy() && other.y <= self.endy()
    }

    /// Share of this run's box covered by `other`, from 0 to 1.
    pub fn intersection_area_percent(&self, other: &Self) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        rect_intersection(self.bbox(), other.bbox()).map_or(0.0, |r| rect_area(r) / area)
    }

    /// Reading order: top of the page first, then left to right.
    pub fn reading_order(&self, other: &Self) -> Ordering {
        other
            .y
            .total_cmp(&self.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

impl std::fmt::Display for TextRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_runs_merge_without_a_space() {
        let a = TextRun::new(30.0, 700.0, 20.0, 12.0, "Hel");
        let b = TextRun::new(50.5, 700.4, 15.0, 12.0, "lo");
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.text, "Hello");
        assert_eq!(merged.width, 35.5);
    }

    #[test]
    fn wider_gap_merges_with_a_space() {
        let a = TextRun::new(30.0, 700.0, 20.0, 12.0, "Hello");
        let b = TextRun::new(54.0, 700.0, 20.0, 12.0, "World");
        assert_eq!(a.merge(&b).unwrap().text, "Hello World");
    }

    #[test]
    fn runs_too_far_apart_or_on_other_lines_stay_separate() {
        let a = TextRun::new(30.0, 700.0, 20.0, 12.0, "a");
        assert!(!a.mergeable(&TextRun::new(63.0, 700.0, 5.0, 12.0, "b")));
        assert!(!a.mergeable(&TextRun::new(50.0, 688.0, 5.0, 12.0, "b")));
        assert!(!a.mergeable(&TextRun::new(50.0, 700.0, 5.0, 10.0, "b")));
        assert!(a.mergeable(&TextRun::new(47.0, 700.0, 5.0, 12.0, "b")));
    }

    #[test]
    fn zero_font_size_still_merges() {
        let a = TextRun::new(0.0, 0.0, 5.0, 0.0, "a");
        let b = TextRun::new(5.1, 0.0, 5.0, 0.0, "b");
        assert_eq!(a.merge(&b).unwrap().text, "ab");
        assert_eq!(a.intersection_area_percent(&b), 0.0);
    }

    #[test]
    fn overlap_share() {
        let a = TextRun::new(0.0, 0.0, 10.0, 10.0, "x");
        let b = TextRun::new(5.0, 0.0, 10.0, 10.0, "x");
        assert!(a.intersects(&b));
        assert_eq!(a.intersection_area_percent(&b), 0.5);
        assert!(!a.intersects(&TextRun::new(11.0, 0.0, 1.0, 10.0, "x")));
    }

    #[test]
    fn reading_order_is_top_down_then_left_right() {
        let mut runs = vec![
            TextRun::new(50.0, 100.0, 1.0, 1.0, "c"),
            TextRun::new(10.0, 100.0, 1.0, 1.0, "b"),
            TextRun::new(90.0, 200.0, 1.0, 1.0, "a"),
        ];
        runs.sort_by(TextRun::reading_order);
        let text: Vec<_> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, ["a", "b", "c"]);
    }
}
