//! `Transport` over a JavaScript send callback.

use crate::error::describe;
use log::trace;
use serde::Serialize;
use serde_json::Value;
use sidetoc_traits::{ChannelError, Destination, Transport};
use wasm_bindgen::prelude::*;

/// Posts messages by calling `send(destination, payload)`.
///
/// `destination` is a tab id (number), `"coordinator"` or `"panel"`. The
/// callback reports a failed send by throwing; the thrown message is
/// classified like a browser runtime error.
#[derive(Debug, Clone)]
pub struct WasmTransport {
    send: js_sys::Function,
}

impl WasmTransport {
    pub fn new(send: js_sys::Function) -> Self {
        Self { send }
    }
}

fn destination_value(destination: Destination) -> JsValue {
    match destination {
        Destination::Tab(tab) => JsValue::from(tab.0),
        Destination::Coordinator => JsValue::from_str("coordinator"),
        Destination::Panel => JsValue::from_str("panel"),
    }
}

impl Transport for WasmTransport {
    fn post(&self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
        // Plain objects rather than ES maps.
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let payload = payload
            .serialize(&serializer)
            .map_err(|e| ChannelError::Host(e.to_string()))?;

        trace!("Posting to {}", destination);
        self.send
            .call2(&JsValue::NULL, &destination_value(destination), &payload)
            .map(|_| ())
            .map_err(|thrown| ChannelError::from_host_message(describe(&thrown)))
    }
}
