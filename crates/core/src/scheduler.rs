//! Resynchronization scheduling.
//!
//! Full extraction passes go through a debounce window: every trigger moves
//! the deadline to `now + debounce`, so a burst of triggers yields a single
//! pass once the document settles. Active-heading recomputation instead uses
//! a single-flight [`FrameGate`] that follows the host's frame cadence.
//!
//! Time is plain milliseconds supplied by the host, which keeps the
//! scheduler deterministic and usable where no monotonic clock exists.

use log::trace;

/// What a document mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Nodes added or removed.
    ChildList,
    /// Text node content changed.
    CharacterData,
    /// An attribute changed, including the id writes made by the extractor.
    Attributes,
}

impl MutationKind {
    pub fn affects_headings(self) -> bool {
        !matches!(self, MutationKind::Attributes)
    }
}

/// Why a resynchronization was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Mutation,
    Navigation,
    Resize,
    /// An `updateSidePanel` request or a panel reopening.
    ExplicitRequest,
    SettingsChanged,
}

impl SyncTrigger {
    /// Triggers that must reach the panel even if nothing changed.
    pub fn forces_propagation(self) -> bool {
        matches!(self, SyncTrigger::ExplicitRequest | SyncTrigger::SettingsChanged)
    }
}

/// A pass that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuePass {
    pub force: bool,
    /// Number of triggers coalesced into this pass.
    pub coalesced: usize,
}

#[derive(Debug, Clone)]
pub struct SyncScheduler {
    debounce_ms: u64,
    deadline: Option<u64>,
    force: bool,
    coalesced: usize,
}

impl SyncScheduler {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            deadline: None,
            force: false,
            coalesced: 0,
        }
    }

    /// Arms or re-arms the debounce window and returns the new deadline.
    ///
    /// Force is sticky: once any trigger in the window forces propagation,
    /// the resulting pass forces.
    pub fn schedule(&mut self, trigger: SyncTrigger, now_ms: u64) -> u64 {
        let deadline = now_ms.saturating_add(self.debounce_ms);
        self.deadline = Some(deadline);
        self.force |= trigger.forces_propagation();
        self.coalesced += 1;
        trace!("{:?} scheduled a pass at {}ms ({} pending)", trigger, deadline, self.coalesced);
        deadline
    }

    /// Takes the pending pass if its deadline has passed.
    pub fn take_due(&mut self, now_ms: u64) -> Option<DuePass> {
        match self.deadline {
            Some(deadline) if deadline <= now_ms => {
                let due = DuePass {
                    force: self.force,
                    coalesced: self.coalesced,
                };
                self.cancel();
                Some(due)
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.force = false;
        self.coalesced = 0;
    }
}

/// Single-flight gate for frame-aligned work.
///
/// `request` reports whether the caller has to ask the host for a frame
/// callback; while one is outstanding, further requests are absorbed.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    scheduled: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Called from the frame callback; returns whether a frame was pending.
    pub fn begin(&mut self) -> bool {
        std::mem::replace(&mut self.scheduled, false)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

/// Detects URL changes, both reported and polled.
#[derive(Debug, Clone)]
pub struct UrlWatcher {
    last_url: String,
    interval_ms: u64,
    next_poll: u64,
}

impl UrlWatcher {
    pub fn new(url: impl Into<String>, interval_ms: u64, now_ms: u64) -> Self {
        Self {
            last_url: url.into(),
            interval_ms,
            next_poll: now_ms.saturating_add(interval_ms),
        }
    }

    /// Records `url`; returns whether it differs from the last one seen.
    pub fn observe(&mut self, url: &str) -> bool {
        if self.last_url == url {
            return false;
        }
        self.last_url = url.to_string();
        true
    }

    /// Whether a poll is due; advances the next poll time if so.
    pub fn poll_due(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_poll {
            return false;
        }
        self.next_poll = now_ms.saturating_add(self.interval_ms);
        true
    }

    pub fn next_poll(&self) -> u64 {
        self.next_poll
    }

    pub fn last_url(&self) -> &str {
        &self.last_url
    }
}
