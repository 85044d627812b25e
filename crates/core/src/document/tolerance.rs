//! Recovery tolerances for damaged files.
//!
//! These numbers come from files seen in the wild, not from the format
//! itself. They are tuning knobs and may change between releases.

/// Bytes at the start of the file searched for the `%PDF-` marker.
pub const HEADER_WINDOW: usize = 1024;

/// Bytes at the end of the file searched for `startxref`.
pub const STARTXREF_WINDOW: usize = 1024;

/// Longest payload recovered by scanning for `endstream` when `/Length`
/// runs past the end of the buffer.
pub const ENDSTREAM_SCAN: usize = 64 * 1024 * 1024;

/// Extra tokens skipped when an object offset lands a few bytes early.
pub const OBJECT_ID_RECHECKS: usize = 1;

/// Nesting limit for form XObjects drawn from other forms.
pub const MAX_FORM_DEPTH: usize = 16;

/// Fraction of a run's box that must be covered by an identical run for
/// the pair to count as a faux-bold double strike.
pub const OVERLAP_THRESHOLD: f64 = 0.5;

/// How far (in text space units) a run may start before the end of the
/// previous one and still be merged with it.
pub const MERGE_BACKTRACK: f64 = 3.0;

/// Gaps below this fraction of the font size join runs without a space.
pub const MERGE_TIGHT_GAP: f64 = 0.2;

/// Mean font size assumed for pages with no usable runs.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Font size floor used when a run reports zero or a non-finite size.
pub const MIN_FONT_SIZE: f64 = 1.0;
