//! Clean-up passes over the runs of a page.

use super::text_run::TextRun;
use crate::document::tolerance::OVERLAP_THRESHOLD;
use crate::model::geometry::{Rect, rect_contains};
use itertools::Itertools;

/// Runs whose origin lies inside `rect`, edges included.
pub fn within_rect(runs: Vec<TextRun>, rect: Rect) -> Vec<TextRun> {
    runs.into_iter()
        .filter(|run| rect_contains(rect, run.origin()))
        .collect()
}

pub fn exclude_empty_strings(runs: Vec<TextRun>) -> Vec<TextRun> {
    runs.into_iter().filter(|run| !run.text.is_empty()).collect()
}

pub fn exclude_zero_width_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    runs.into_iter().filter(|run| run.width != 0.0).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// Drops runs drawn on top of an identical run, the way producers fake bold
/// text by painting every glyph twice with a slight offset.
///
/// A sweep from left to right keeps the runs whose horizontal span is open.
/// A run starting inside an open run with the same text that covers at
/// least [`OVERLAP_THRESHOLD`] of it is redundant.
pub fn exclude_redundant_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut events: Vec<(f64, Edge, usize)> = runs
        .iter()
        .enumerate()
        .flat_map(|(i, run)| [(run.x, Edge::Start, i), (run.endx(), Edge::End, i)])
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut open: Vec<usize> = Vec::new();
    let mut redundant = vec![false; runs.len()];
    for (x, edge, i) in events {
        match edge {
            Edge::Start => {
                let run = &runs[i];
                redundant[i] = open.iter().any(|&j| {
                    let other = &runs[j];
                    other.text == run.text
                        && x >= other.x
                        && x <= other.endx()
                        && other.intersection_area_percent(run) >= OVERLAP_THRESHOLD
                });
                open.push(i);
            }
            Edge::End => open.retain(|&j| j != i),
        }
    }

    runs.into_iter()
        .zip(redundant)
        .filter_map(|(run, skip)| (!skip).then_some(run))
        .collect()
}

/// Joins neighbouring runs on each baseline into longer runs, then sorts
/// everything into reading order.
pub fn merge_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut merged: Vec<TextRun> = runs
        .into_iter()
        .into_group_map_by(|run| run.y as i64)
        .into_values()
        .flat_map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            line.into_iter().fold(Vec::<TextRun>::new(), |mut acc, run| {
                match acc.last().and_then(|last| last.merge(&run)) {
                    Some(joined) => {
                        if let Some(last) = acc.last_mut() {
                            *last = joined;
                        }
                    }
                    None => acc.push(run),
                }
                acc
            })
        })
        .collect();
    merged.sort_by(TextRun::reading_order);
    merged
}
