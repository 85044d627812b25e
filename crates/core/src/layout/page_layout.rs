//! Plain-text reconstruction of a page.
//!
//! Runs are dropped onto a character grid sized from the page and the
//! typical glyph: one row per mean font size of height, one column per
//! median glyph width. Horizontal gaps become spaces and vertical gaps
//! become empty rows, which is enough to keep columns and paragraphs
//! readable without any real layout analysis.

use super::text_run::TextRun;
use crate::document::tolerance::DEFAULT_FONT_SIZE;
use crate::model::geometry::{Rect, rect_height, rect_width};
use std::fmt;

/// Columns are a little narrower than the median glyph so that runs set
/// with tight tracking do not overwrite each other.
const COLUMN_SLACK: f64 = 1.05;

/// The text of a page laid out on a character grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    rows: Vec<String>,
}

impl PageLayout {
    /// Lays out `runs` inside `mediabox`, which must be in the same
    /// (rotated) space as the runs.
    pub fn new(runs: &[TextRun], mediabox: Rect) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let width = rect_width(mediabox);
        let height = rect_height(mediabox);
        let font_size = mean_font_size(runs);
        let glyph = median_glyph_width(runs);

        let row_count = (height / font_size).floor();
        let col_count = if glyph > 0.0 {
            (width / glyph * COLUMN_SLACK).floor()
        } else {
            0.0
        };
        if !(row_count >= 1.0 && col_count >= 1.0) {
            return Self::default();
        }
        let row_height = height / row_count;
        let col_width = width / col_count;

        let x_offset = runs.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
        let y_offset = runs.iter().map(|r| r.y).fold(f64::INFINITY, f64::min).min(0.0);

        let rows = row_count as usize;
        let cols = col_count as usize;
        let mut grid: Vec<Vec<char>> = vec![vec![' '; cols]; rows];
        for run in runs {
            let x_pos = ((run.x - x_offset) / col_width).round();
            let y_pos = row_count - ((run.y - y_offset) / row_height).round();
            if !(0.0..=col_count).contains(&x_pos) || !(0.0..=row_count).contains(&y_pos) {
                continue;
            }
            // Row numbers count from 1 at the top; a run on the very top
            // edge shares the first row.
            let row = (y_pos as usize).saturating_sub(1);
            place(&mut grid[row], x_pos as usize, &run.text);
        }

        let mut rows: Vec<String> = grid
            .into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
            .collect();
        let first = rows.iter().position(|r| !r.trim().is_empty());
        let last = rows.iter().rposition(|r| !r.trim().is_empty());
        rows = match (first, last) {
            (Some(first), Some(last)) => rows.drain(first..=last).collect(),
            _ => Vec::new(),
        };
        Self { rows }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for PageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rows.join("\n"))
    }
}

fn mean_font_size(runs: &[TextRun]) -> f64 {
    let mean = runs.iter().map(|r| r.font_size).sum::<f64>() / runs.len() as f64;
    if mean.is_finite() && mean > 0.0 {
        mean
    } else {
        DEFAULT_FONT_SIZE
    }
}

fn median_glyph_width(runs: &[TextRun]) -> f64 {
    let mut widths: Vec<f64> = runs.iter().map(TextRun::mean_character_width).collect();
    widths.sort_by(f64::total_cmp);
    widths.get(widths.len() / 2).copied().unwrap_or(0.0)
}

/// Writes `text` over `row` starting at column `at`, growing the row when
/// the text runs past the page edge.
fn place(row: &mut Vec<char>, at: usize, text: &str) {
    if row.len() < at {
        row.resize(at, ' ');
    }
    for (i, ch) in text.chars().enumerate() {
        match row.get_mut(at + i) {
            Some(cell) => *cell = ch,
            None => row.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Rect = (0.0, 0.0, 200.0, 100.0);

    fn run(x: f64, y: f64, text: &str) -> TextRun {
        TextRun::new(x, y, 5.0 * text.chars().count() as f64, 10.0, text)
    }

    #[test]
    fn modest_gap_is_one_space() {
        let layout = PageLayout::new(&[run(10.0, 50.0, "Hello"), run(40.0, 50.0, "World")], PAGE);
        assert_eq!(layout.to_string(), "Hello World");
    }

    #[test]
    fn wide_gap_is_two_spaces() {
        let layout = PageLayout::new(&[run(10.0, 50.0, "Hello"), run(45.0, 50.0, "World")], PAGE);
        assert_eq!(layout.to_string(), "Hello  World");
    }

    #[test]
    fn line_spacing_becomes_newlines() {
        let next = PageLayout::new(&[run(10.0, 50.0, "line one"), run(10.0, 40.0, "line two")], PAGE);
        insta::assert_snapshot!(next.to_string(), @r"
        line one
        line two
        ");

        let gap = PageLayout::new(&[run(10.0, 50.0, "line one"), run(10.0, 30.0, "line two")], PAGE);
        insta::assert_snapshot!(gap.to_string(), @r"
        line one

        line two
        ");
    }

    #[test]
    fn double_struck_glyph_prints_once() {
        let layout = PageLayout::new(&[run(10.0, 50.0, "B"), run(10.4, 50.0, "B"), run(15.0, 50.0, "old")], PAGE);
        assert_eq!(layout.to_string(), "Bold");
    }

    #[test]
    fn columns_keep_their_indent() {
        let layout = PageLayout::new(
            &[run(10.0, 60.0, "left"), run(110.0, 60.0, "right"), run(110.0, 50.0, "below")],
            PAGE,
        );
        assert_eq!(layout.rows().len(), 2);
        assert!(layout.rows()[1].starts_with("                     below"));
        assert!(layout.rows()[0].starts_with("left "));
    }

    #[test]
    fn text_past_the_edge_extends_the_row() {
        let layout = PageLayout::new(&[run(0.0, 50.0, "x"), run(195.0, 50.0, "overflowing")], PAGE);
        assert!(layout.to_string().ends_with("overflowing"));
    }

    #[test]
    fn degenerate_input_gives_empty_text() {
        assert!(PageLayout::new(&[], PAGE).is_empty());
        let zero = TextRun::new(10.0, 50.0, 0.0, 0.0, "x");
        assert_eq!(PageLayout::new(&[zero], PAGE).to_string(), "");
        let r#unsized = TextRun::new(10.0, 50.0, 5.0, 0.0, "x");
        assert_eq!(PageLayout::new(&[r#unsized], PAGE).to_string(), "x");
    }
}
