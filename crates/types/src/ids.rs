//! Newtype wrappers for semantic IDs
//!
//! These types keep heading identifiers, tab identifiers and window
//! identifiers from being mixed up at context boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// The identifier of a heading element, unique within one extraction pass.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadingId(Arc<str>);

impl HeadingId {
    /// Creates a new HeadingId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this heading ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for HeadingId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for HeadingId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for HeadingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for HeadingId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for HeadingId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for HeadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A browser tab, as numbered by the host.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// A browser window. The host reports `WindowId::NONE` when focus leaves
/// every window.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i32);

impl WindowId {
    pub const NONE: WindowId = WindowId(-1);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_id_creation() {
        let id1 = HeadingId::new("setup");
        let id2 = HeadingId::from("setup");
        let id3 = HeadingId::from(String::from("setup"));

        assert_eq!(id1, id2);
        assert_eq!(id2, id3);
        assert_eq!(id1.as_str(), "setup");
        assert!(id1 == "setup");
    }

    #[test]
    fn test_ids_serialize_as_plain_values() {
        assert_eq!(
            serde_json::to_string(&HeadingId::new("usage")).unwrap(),
            "\"usage\""
        );
        assert_eq!(serde_json::to_string(&TabId(7)).unwrap(), "7");
        let tab: TabId = serde_json::from_str("42").unwrap();
        assert_eq!(tab, TabId(42));
    }

    #[test]
    fn test_window_none() {
        assert!(WindowId::NONE.is_none());
        assert!(!WindowId(3).is_none());
    }
}
