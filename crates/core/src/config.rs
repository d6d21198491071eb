use std::time::Duration;

/// Default debounce window for resynchronization triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Default interval of the URL polling fallback.
pub const URL_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default distance of the reading line below the viewport top, in pixels.
pub const DEFAULT_READING_LINE: f32 = 120.0;

/// Text shown for headings with no text content.
pub const UNTITLED_SECTION: &str = "Untitled section";

/// Timing and heuristic parameters shared by the page-side components.
///
/// These are not user settings; they tune how often work happens.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Triggers arriving within this window collapse into one pass.
    pub debounce: Duration,
    /// How often the page polls its URL for unobserved navigations.
    pub url_poll_interval: Duration,
    /// Offset from the viewport top used when no heading is on screen.
    pub reading_line: f32,
    pub untitled_heading: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            url_poll_interval: URL_POLL_INTERVAL,
            reading_line: DEFAULT_READING_LINE,
            untitled_heading: UNTITLED_SECTION.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_url_poll_interval(mut self, interval: Duration) -> Self {
        self.url_poll_interval = interval;
        self
    }

    pub fn with_reading_line(mut self, offset: f32) -> Self {
        self.reading_line = offset;
        self
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce.as_millis() as u64
    }

    pub fn url_poll_ms(&self) -> u64 {
        self.url_poll_interval.as_millis() as u64
    }
}
