//! Options for run extraction.

use crate::model::geometry::Rect;

/// Controls which runs a page hands back and whether they are joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Keep only runs whose origin lies in this rectangle. `None` means the
    /// page's crop box.
    pub rect: Option<Rect>,

    /// Join neighbouring runs on a baseline into longer runs.
    pub merge: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            rect: None,
            merge: true,
        }
    }
}

impl RunOptions {
    pub fn within(rect: Rect) -> Self {
        Self {
            rect: Some(rect),
            ..Self::default()
        }
    }

    pub fn unmerged() -> Self {
        Self {
            merge: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_merge_within_the_crop_box() {
        let opts = RunOptions::default();
        assert!(opts.merge);
        assert!(opts.rect.is_none());
        assert_eq!(RunOptions::within((0.0, 0.0, 1.0, 1.0)).rect, Some((0.0, 0.0, 1.0, 1.0)));
        assert!(!RunOptions::unmerged().merge);
    }
}
