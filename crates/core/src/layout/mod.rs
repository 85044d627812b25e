//! Turning positioned glyphs into readable text.
//!
//! - [`TextRun`]: one shown string at its page position
//! - [`filters`]: clean-up passes (crop, faux bold, merging)
//! - [`PageLayout`]: character-grid rendering of a page's runs

pub mod filters;
pub mod page_layout;
pub mod params;
pub mod text_run;

pub use page_layout::PageLayout;
pub use params::RunOptions;
pub use text_run::TextRun;
