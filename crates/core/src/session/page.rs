use crate::config::SyncConfig;
use crate::extract::{HeadingExtractor, TrackedHeading};
use crate::messenger::{Delivery, Messenger, PageRequest, PanelMessage, decode};
use crate::scheduler::{FrameGate, MutationKind, SyncScheduler, SyncTrigger, UrlWatcher};
use crate::signature::{ActiveHeadingState, ChangeDetector, Signature};
use crate::tracker::find_active_heading;
use log::{debug, info};
use serde_json::Value;
use sidetoc_traits::{Destination, DocumentHost, NavigationSource, Transport};
use sidetoc_types::{HeadingId, Settings};

/// State of the page context attached to one tab.
///
/// The host forwards document events (`on_mutation`, `on_scroll`, ...) and
/// drives time through [`PageSession::tick`], sleeping until
/// [`PageSession::next_deadline`] in between. Frame callbacks requested by
/// `on_scroll`/`on_resize` are delivered through [`PageSession::run_frame`].
pub struct PageSession<D: DocumentHost, T> {
    document: D,
    messenger: Messenger<T>,
    config: SyncConfig,
    settings: Settings,
    scheduler: SyncScheduler,
    frame: FrameGate,
    url: UrlWatcher,
    detector: ChangeDetector,
    active: ActiveHeadingState,
    headings: Vec<TrackedHeading<D::Element>>,
    passes: u64,
}

impl<D, T> PageSession<D, T>
where
    D: DocumentHost + NavigationSource,
    T: Transport,
{
    pub fn new(document: D, transport: T, settings: Settings, config: SyncConfig, now_ms: u64) -> Self {
        let url = UrlWatcher::new(document.current_url(), config.url_poll_ms(), now_ms);
        Self {
            scheduler: SyncScheduler::new(config.debounce_ms()),
            frame: FrameGate::new(),
            url,
            detector: ChangeDetector::new(),
            active: ActiveHeadingState::new(),
            headings: Vec::new(),
            passes: 0,
            messenger: Messenger::new(transport, "page"),
            settings: settings.normalized(),
            document,
            config,
        }
    }

    /// Schedules the initial extraction pass.
    pub fn start(&mut self, now_ms: u64) -> u64 {
        self.scheduler.schedule(SyncTrigger::Navigation, now_ms)
    }

    /// Handles a raw payload from the channel. Malformed payloads are dropped.
    pub fn handle_message(&mut self, payload: &Value, now_ms: u64) {
        if let Some(request) = decode::<PageRequest>(payload) {
            self.handle_request(request, now_ms);
        }
    }

    pub fn handle_request(&mut self, request: PageRequest, now_ms: u64) {
        match request {
            PageRequest::UpdateSidePanel => {
                self.scheduler.schedule(SyncTrigger::ExplicitRequest, now_ms);
            }
            PageRequest::ScrollToHeading { heading_id } => {
                self.scroll_to_heading(&heading_id);
            }
        }
    }

    /// Scrolls the heading into view and re-derives the active heading.
    /// Returns false (and does nothing) when no attached element carries
    /// the id.
    pub fn scroll_to_heading(&mut self, id: &HeadingId) -> bool {
        let tracked = self
            .headings
            .iter()
            .find(|h| h.id == *id && self.document.is_connected(&h.element))
            .map(|h| h.element.clone());
        let element = tracked.or_else(|| {
            self.document
                .element_by_id(id.as_str())
                .filter(|e| self.document.is_connected(e))
        });

        let Some(element) = element else {
            debug!("No element for heading '{}', ignoring scroll request", id);
            return false;
        };
        self.document.scroll_into_view(&element, self.settings.smooth_scroll);
        self.refresh_active();
        true
    }

    /// Reports document mutations; attribute-only batches are ignored.
    pub fn on_mutation(&mut self, kinds: &[MutationKind], now_ms: u64) -> Option<u64> {
        if !kinds.iter().any(|k| k.affects_headings()) {
            return None;
        }
        Some(self.scheduler.schedule(SyncTrigger::Mutation, now_ms))
    }

    /// Reports a URL observed by the host (history push/replace/pop, hash
    /// change). Schedules a pass when it differs from the last one seen.
    pub fn on_url_change(&mut self, url: &str, now_ms: u64) -> Option<u64> {
        if !self.url.observe(url) {
            return None;
        }
        debug!("Navigated to {}", url);
        Some(self.scheduler.schedule(SyncTrigger::Navigation, now_ms))
    }

    /// Polling fallback for navigations the host did not report.
    pub fn poll_url(&mut self, now_ms: u64) -> Option<u64> {
        if !self.url.poll_due(now_ms) {
            return None;
        }
        let current = self.document.current_url();
        self.on_url_change(&current, now_ms)
    }

    /// Schedules a pass and reports whether a frame callback is needed.
    pub fn on_resize(&mut self, now_ms: u64) -> bool {
        self.scheduler.schedule(SyncTrigger::Resize, now_ms);
        self.frame.request()
    }

    /// Reports whether a frame callback is needed.
    pub fn on_scroll(&mut self) -> bool {
        self.frame.request()
    }

    /// Frame callback: recomputes the active heading once per frame.
    pub fn run_frame(&mut self) {
        if self.frame.begin() {
            self.refresh_active();
        }
    }

    /// Adopts new settings. Changes to the extraction range schedule a
    /// forced pass; display-only changes take effect immediately.
    pub fn apply_settings(&mut self, settings: Settings, now_ms: u64) -> Option<u64> {
        let settings = settings.normalized();
        let differs = settings.extraction_differs(&self.settings);
        self.settings = settings;
        differs.then(|| self.scheduler.schedule(SyncTrigger::SettingsChanged, now_ms))
    }

    /// Runs whatever has come due. Returns true when an extraction pass ran.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.poll_url(now_ms);
        match self.scheduler.take_due(now_ms) {
            Some(due) => {
                debug!("Running pass ({} triggers, force={})", due.coalesced, due.force);
                self.sync_now(due.force);
                true
            }
            None => false,
        }
    }

    /// The earliest time the host must call [`PageSession::tick`].
    pub fn next_deadline(&self) -> u64 {
        let poll = self.url.next_poll();
        self.scheduler
            .next_deadline()
            .map_or(poll, |deadline| deadline.min(poll))
    }

    /// Extracts immediately and propagates if the signature changed or
    /// `force` is set. Returns whether page info was propagated.
    pub fn sync_now(&mut self, force: bool) -> bool {
        let extraction = HeadingExtractor::new(self.settings, &self.config).extract(&self.document);
        let signature = Signature::compute(&extraction.title, &self.settings, &extraction.headings);
        let info = extraction.page_info();
        self.headings = extraction.tracked;
        self.passes += 1;

        let propagated = self.detector.should_propagate(&signature, force);
        if propagated {
            if force {
                self.active.reset();
            }
            info!(
                "Propagating '{}' with {} headings",
                info.title,
                self.headings.len()
            );
            let delivery = self
                .messenger
                .send(Destination::Panel, &PanelMessage::from(info));
            if !delivery.is_ok() {
                // Nobody got it; let the next pass try again.
                self.detector.reset();
                self.active.reset();
            }
        }
        self.refresh_active();
        propagated
    }

    fn refresh_active(&mut self) -> Option<Delivery> {
        let id = find_active_heading(&self.document, &self.headings, self.config.reading_line);
        let changed = self.active.update(&id)?;
        let delivery = self.messenger.send(
            Destination::Panel,
            &PanelMessage::ActiveHeadingChanged { heading_id: changed },
        );
        if !delivery.is_ok() {
            self.active.reset();
        }
        Some(delivery)
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn headings(&self) -> &[TrackedHeading<D::Element>] {
        &self.headings
    }

    /// The last active heading id sent to the panel.
    pub fn active_heading(&self) -> Option<&str> {
        self.active.current()
    }

    /// Number of extraction passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn is_sync_pending(&self) -> bool {
        self.scheduler.is_pending()
    }
}
