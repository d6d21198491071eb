use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed values for [`Settings::max_depth`].
pub const MAX_DEPTH_RANGE: RangeInclusive<u8> = 2..=6;

/// User-configurable extraction and display parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub include_h1: bool,
    pub max_depth: u8,
    pub smooth_scroll: bool,
    pub compact_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_h1: false,
            max_depth: 6,
            smooth_scroll: true,
            compact_mode: false,
        }
    }
}

impl Settings {
    /// Clamps `max_depth` into [`MAX_DEPTH_RANGE`].
    pub fn normalized(mut self) -> Self {
        self.max_depth = self
            .max_depth
            .clamp(*MAX_DEPTH_RANGE.start(), *MAX_DEPTH_RANGE.end());
        self
    }

    /// Shallowest heading level that is extracted.
    pub fn min_level(&self) -> u8 {
        if self.include_h1 { 1 } else { 2 }
    }

    /// Heading levels that are extracted, inclusive.
    pub fn level_range(&self) -> RangeInclusive<u8> {
        self.min_level()..=self.normalized().max_depth
    }

    /// True when the two settings would extract different headings.
    pub fn extraction_differs(&self, other: &Settings) -> bool {
        self.include_h1 != other.include_h1 || self.max_depth != other.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_depth() {
        let low = Settings {
            max_depth: 0,
            ..Settings::default()
        };
        assert_eq!(low.normalized().max_depth, 2);

        let high = Settings {
            max_depth: 9,
            ..Settings::default()
        };
        assert_eq!(high.normalized().max_depth, 6);
    }

    #[test]
    fn test_level_range() {
        let settings = Settings::default();
        assert_eq!(settings.level_range(), 2..=6);

        let with_h1 = Settings {
            include_h1: true,
            max_depth: 3,
            ..Settings::default()
        };
        assert_eq!(with_h1.level_range(), 1..=3);
    }

    #[test]
    fn test_display_only_changes_do_not_affect_extraction() {
        let a = Settings::default();
        let b = Settings {
            compact_mode: true,
            smooth_scroll: false,
            ..a
        };
        assert!(!a.extraction_differs(&b));
        assert!(a.extraction_differs(&Settings { max_depth: 4, ..a }));
    }
}
