//! The page context exported to JavaScript.

use crate::dom::DomDocument;
use crate::error::SidetocError;
use crate::transport::WasmTransport;
use crate::types::{millis, parse_mutation_kind, settings_from_js, to_js};
use serde_json::Value;
use sidetoc_core::{PageSession, SyncConfig};
use wasm_bindgen::prelude::*;

/// Runs extraction and active-section tracking for the current document.
///
/// The content script owns the event wiring: it forwards runtime messages,
/// mutation records, navigation, scroll and resize events, and calls
/// `tick` once `nextDeadline()` has passed.
///
/// # Example
///
/// ```javascript
/// const page = new PageContext((dest, msg) => send(dest, msg), settings, performance.now());
/// page.start(performance.now());
/// new MutationObserver(records =>
///   page.onMutation(records.map(r => r.type), performance.now())
/// ).observe(document.body, { childList: true, subtree: true, characterData: true });
/// addEventListener('scroll', () => {
///   if (page.onScroll()) requestAnimationFrame(() => page.runFrame());
/// });
/// ```
#[wasm_bindgen]
pub struct PageContext {
    session: PageSession<DomDocument, WasmTransport>,
}

#[wasm_bindgen]
impl PageContext {
    #[wasm_bindgen(constructor)]
    pub fn new(send: js_sys::Function, settings: JsValue, now: f64) -> Result<PageContext, JsValue> {
        let document = DomDocument::from_global()?;
        let settings = settings_from_js(settings);
        Ok(Self {
            session: PageSession::new(
                document,
                WasmTransport::new(send),
                settings,
                SyncConfig::default(),
                millis(now),
            ),
        })
    }

    /// Schedules the initial pass; returns its deadline.
    pub fn start(&mut self, now: f64) -> f64 {
        self.session.start(millis(now)) as f64
    }

    /// Handles a runtime message addressed to this page.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, payload: JsValue, now: f64) -> Result<(), JsValue> {
        let payload: Value = serde_wasm_bindgen::from_value(payload)
            .map_err(|e| SidetocError::message_error(format!("Unreadable message: {}", e)))?;
        self.session.handle_message(&payload, millis(now));
        Ok(())
    }

    /// `kinds` are `MutationRecord.type` values.
    #[wasm_bindgen(js_name = onMutation)]
    pub fn on_mutation(&mut self, kinds: Vec<String>, now: f64) -> Option<f64> {
        let kinds: Vec<_> = kinds.iter().map(|k| parse_mutation_kind(k)).collect();
        self.session
            .on_mutation(&kinds, millis(now))
            .map(|deadline| deadline as f64)
    }

    #[wasm_bindgen(js_name = onUrlChange)]
    pub fn on_url_change(&mut self, url: &str, now: f64) -> Option<f64> {
        self.session
            .on_url_change(url, millis(now))
            .map(|deadline| deadline as f64)
    }

    /// Returns true when the caller must request an animation frame.
    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&mut self, now: f64) -> bool {
        self.session.on_resize(millis(now))
    }

    /// Returns true when the caller must request an animation frame.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self) -> bool {
        self.session.on_scroll()
    }

    #[wasm_bindgen(js_name = runFrame)]
    pub fn run_frame(&mut self) {
        self.session.run_frame();
    }

    #[wasm_bindgen(js_name = applySettings)]
    pub fn apply_settings(&mut self, settings: JsValue, now: f64) -> Option<f64> {
        self.session
            .apply_settings(settings_from_js(settings), millis(now))
            .map(|deadline| deadline as f64)
    }

    /// Runs due work; returns whether an extraction pass ran.
    pub fn tick(&mut self, now: f64) -> bool {
        self.session.tick(millis(now))
    }

    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> f64 {
        self.session.next_deadline() as f64
    }

    #[wasm_bindgen(js_name = syncNow)]
    pub fn sync_now(&mut self, force: bool) -> bool {
        self.session.sync_now(force)
    }

    #[wasm_bindgen(js_name = activeHeading)]
    pub fn active_heading(&self) -> Option<String> {
        self.session.active_heading().map(str::to_string)
    }

    /// Ids of the headings found by the last pass, in document order.
    #[wasm_bindgen(js_name = headingIds)]
    pub fn heading_ids(&self) -> Result<JsValue, JsValue> {
        let ids: Vec<&str> = self
            .session
            .headings()
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        Ok(to_js(&ids)?)
    }
}
