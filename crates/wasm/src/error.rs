//! Error handling for WASM bindings.
//!
//! Converts sidetoc's error types into JavaScript `Error` objects carrying a
//! `code` property.

use sidetoc_traits::ChannelError;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Error codes for TypeScript consumption.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No window or document in this global scope
    Environment,
    /// A message payload could not be converted
    Message,
    /// The host refused a send
    Channel,
    Unknown,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Environment => "ENVIRONMENT_ERROR",
            ErrorCode::Message => "MESSAGE_ERROR",
            ErrorCode::Channel => "CHANNEL_ERROR",
            ErrorCode::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// A JavaScript-friendly error type.
///
/// Not a `wasm_bindgen` struct: it converts into a plain JS `Error`.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SidetocError {
    code: ErrorCode,
    message: String,
}

impl SidetocError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Environment, message)
    }

    pub fn message_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Message, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ChannelError> for SidetocError {
    fn from(err: ChannelError) -> Self {
        Self::new(ErrorCode::Channel, err.to_string())
    }
}

impl From<SidetocError> for JsValue {
    fn from(err: SidetocError) -> Self {
        let js_error = js_sys::Error::new(&err.message);
        js_sys::Reflect::set(
            &js_error,
            &"code".into(),
            &JsValue::from_str(err.code.as_str()),
        )
        .ok();
        js_error.into()
    }
}

/// Best-effort message of a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
