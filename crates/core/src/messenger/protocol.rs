//! Wire messages exchanged between contexts.
//!
//! Each direction has its own closed set of messages, tagged by the `action`
//! field with camelCase fields. Receivers decode with [`decode`]; payloads
//! that do not match any message of that direction are dropped.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sidetoc_types::{HeadingId, NestedHeading, PageInfo, TabId};

/// Requests handled by a page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    /// Re-extract and push the page info.
    UpdateSidePanel,
    /// Scroll to a heading and re-derive the active id.
    #[serde(rename_all = "camelCase")]
    ScrollToHeading { heading_id: HeadingId },
}

/// Requests handled by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CoordinatorRequest {
    /// Ask the active tab to re-extract; answered with a [`RefreshAck`].
    RefreshActiveTabToc,
}

/// Answer to [`CoordinatorRequest::RefreshActiveTabToc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshAck {
    pub ok: bool,
}

/// Pushes handled by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PanelMessage {
    #[serde(rename_all = "camelCase")]
    SendPageInfo {
        title: String,
        nested_headings: Vec<NestedHeading>,
    },
    #[serde(rename_all = "camelCase")]
    ActiveHeadingChanged { heading_id: String },
    #[serde(rename_all = "camelCase")]
    SidePanelSyncError {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
}

impl From<PageInfo> for PanelMessage {
    fn from(info: PageInfo) -> Self {
        PanelMessage::SendPageInfo {
            title: info.title,
            nested_headings: info.nested_headings,
        }
    }
}

/// A received payload together with the tab it came from, as stamped by
/// the host. `sender` is `None` for messages from extension contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub sender: Option<TabId>,
    pub payload: Value,
}

impl Envelope {
    pub fn new(sender: Option<TabId>, payload: Value) -> Self {
        Self { sender, payload }
    }
}

/// Decodes a payload, dropping it (with a debug log) if it is malformed.
pub fn decode<T: DeserializeOwned>(payload: &Value) -> Option<T> {
    match T::deserialize(payload) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Dropping malformed message {}: {}", payload, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_request_wire_shapes() {
        assert_eq!(
            serde_json::to_value(PageRequest::UpdateSidePanel).unwrap(),
            json!({ "action": "updateSidePanel" })
        );
        assert_eq!(
            serde_json::to_value(PageRequest::ScrollToHeading {
                heading_id: "usage".into()
            })
            .unwrap(),
            json!({ "action": "scrollToHeading", "headingId": "usage" })
        );
        assert_eq!(
            decode::<CoordinatorRequest>(&json!({ "action": "refreshActiveTabToc" })),
            Some(CoordinatorRequest::RefreshActiveTabToc)
        );
    }

    #[test]
    fn test_panel_message_wire_shapes() {
        let value = json!({
            "action": "sendPageInfo",
            "title": "Guide",
            "nestedHeadings": [{ "id": "setup", "text": "Setup", "level": 2, "Children": [] }]
        });
        match decode::<PanelMessage>(&value) {
            Some(PanelMessage::SendPageInfo {
                title,
                nested_headings,
            }) => {
                assert_eq!(title, "Guide");
                assert_eq!(nested_headings.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            decode::<PanelMessage>(&json!({ "action": "sidePanelSyncError", "tabId": 4 })),
            Some(PanelMessage::SidePanelSyncError {
                tab_id: Some(TabId(4))
            })
        );
        assert_eq!(
            decode::<PanelMessage>(&json!({ "action": "sidePanelSyncError" })),
            Some(PanelMessage::SidePanelSyncError { tab_id: None })
        );
    }

    #[test]
    fn test_malformed_payloads_are_dropped() {
        assert_eq!(decode::<PageRequest>(&json!({ "action": "scrollToHeading" })), None);
        assert_eq!(decode::<PageRequest>(&json!({ "action": "sendDOM" })), None);
        assert_eq!(decode::<PageRequest>(&json!(null)), None);
        assert_eq!(
            decode::<PanelMessage>(&json!({ "action": "activeHeadingChanged", "headingId": 3 })),
            None
        );
        assert_eq!(
            decode::<PanelMessage>(&json!({ "action": "sendPageInfo", "title": "x" })),
            None
        );
    }
}
