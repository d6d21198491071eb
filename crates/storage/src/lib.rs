//! Settings persistence backends.
//!
//! This crate provides platform-specific implementations of the
//! `SettingsBackend` trait from sidetoc-traits.
//!
//! ## Available Backends
//!
//! - [`JsonFileSettingsBackend`]: a JSON object stored in a file
//!
//! ## Re-exports
//!
//! For convenience, we also re-export the in-memory backend from sidetoc-traits:
//! - [`InMemorySettingsBackend`]: process-local storage

mod json_file;

pub use json_file::JsonFileSettingsBackend;

pub use sidetoc_traits::InMemorySettingsBackend;
