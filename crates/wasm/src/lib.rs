//! WebAssembly bindings for the sidetoc page context.
//!
//! This crate runs the platform-agnostic [`sidetoc_core::PageSession`]
//! inside a content script, against the live DOM.
//!
//! # Architecture
//!
//! - **No timers inside WASM**: the script owns `setTimeout` and
//!   `requestAnimationFrame`; the session only reports deadlines
//! - **No async**: every call returns synchronously
//! - **Channel as a callback**: messages leave through a JS function that
//!   throws on failure
//!
//! ## Module Structure
//!
//! - [`page`] - `PageContext`, the exported session wrapper
//! - [`dom`] - `DocumentHost` over `web_sys`
//! - [`transport`] - `Transport` over a JS send callback
//! - [`error`] - Error types with JavaScript interop
//! - [`types`] - Conversions of JS values
//!
//! # Example
//!
//! ```javascript
//! import init, { PageContext } from '@sidetoc/wasm';
//!
//! await init();
//!
//! const page = new PageContext((dest, msg) => {
//!   if (dest === 'panel' || dest === 'coordinator') chrome.runtime.sendMessage(msg);
//! }, await chrome.storage.sync.get(null), performance.now());
//! chrome.runtime.onMessage.addListener(msg => page.handleMessage(msg, performance.now()));
//! ```

pub mod dom;
pub mod error;
pub mod page;
pub mod transport;
pub mod types;

pub use dom::DomDocument;
pub use error::{ErrorCode, SidetocError};
pub use page::PageContext;
pub use transport::WasmTransport;

use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Sets up the panic hook for readable panics in the browser console.
/// Called automatically by wasm-pack's generated JavaScript.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the version of the sidetoc-wasm library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
