//! Change detection for extraction passes.
//!
//! A pass is only propagated when its signature differs from the last one
//! sent, unless the caller forces it. The active heading is gated
//! separately by [`ActiveHeadingState`], so scroll-driven highlight changes
//! go out even when the tree itself is unchanged.

use serde_json::{Value, json};
use sidetoc_types::{FlatHeading, Settings};
use std::fmt;

/// Deterministic fingerprint of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn compute(title: &str, settings: &Settings, headings: &[FlatHeading]) -> Self {
        let settings = settings.normalized();
        let entries: Vec<Value> = headings
            .iter()
            .map(|h| json!([h.id.as_str(), h.level, h.text]))
            .collect();
        let input = json!({
            "title": title,
            "includeH1": settings.include_h1,
            "maxDepth": settings.max_depth,
            "headings": entries,
        });
        Signature(input.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remembers the last propagated signature.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: Option<Signature>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the pass must be propagated, recording `signature`
    /// as the last propagated one if so.
    pub fn should_propagate(&mut self, signature: &Signature, force: bool) -> bool {
        if !force && self.last.as_ref() == Some(signature) {
            return false;
        }
        self.last = Some(signature.clone());
        true
    }

    pub fn last(&self) -> Option<&Signature> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Remembers the last active heading id sent to the panel.
#[derive(Debug, Clone, Default)]
pub struct ActiveHeadingState {
    last_sent: Option<String>,
}

impl ActiveHeadingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(id)` when `id` differs from the last one sent and
    /// records it.
    pub fn update(&mut self, id: &str) -> Option<String> {
        if self.last_sent.as_deref() == Some(id) {
            return None;
        }
        self.last_sent = Some(id.to_string());
        Some(id.to_string())
    }

    pub fn current(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }

    /// Forgets the last id so the next update is always sent.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
