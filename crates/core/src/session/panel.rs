use crate::messenger::{
    CoordinatorRequest, Delivery, Envelope, FailureClass, Messenger, PageRequest, PanelMessage,
    RefreshAck, decode,
};
use itertools::Itertools;
use log::debug;
use sidetoc_traits::{ChannelError, Destination, Transport};
use sidetoc_types::{HeadingId, NestedHeading, Settings, TabId, WindowId};

/// Shown when the active tab cannot host a page context.
pub const PAGE_SCAN_ERROR: &str = "This page cannot be scanned (for example Chrome internal pages).";
/// Shown when a heading click could not reach the page.
pub const CONNECTION_ERROR: &str = "Could not connect to the page. Reload the tab and try again.";
/// Title shown when the page has none.
pub const UNTITLED_PAGE: &str = "Untitled page";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// The page has no headings in range.
    Empty,
    Error,
}

/// Everything the panel renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelView {
    pub status: LoadState,
    pub title: String,
    pub headings: Vec<NestedHeading>,
    pub active_heading_id: String,
    pub error_message: Option<&'static str>,
    pub compact_mode: bool,
}

impl PanelView {
    /// Renders the tree as an indented outline, marking the active heading.
    pub fn outline(&self) -> String {
        fn walk(nodes: &[NestedHeading], depth: usize, active: &str, out: &mut Vec<String>) {
            for node in nodes {
                let marker = if node.id == active { '>' } else { ' ' };
                out.push(format!("{}{}{}", marker, "  ".repeat(depth), node.text));
                walk(&node.children, depth + 1, active, out);
            }
        }

        let mut lines = Vec::new();
        walk(&self.headings, 0, &self.active_heading_id, &mut lines);
        lines.into_iter().join("\n")
    }
}

/// State of the detached panel.
///
/// Messages are scoped to the active tab: pushes stamped with another tab
/// are ignored, so a background tab can never overwrite the view.
pub struct PanelSession<T> {
    messenger: Messenger<T>,
    view: PanelView,
    active_tab: Option<TabId>,
}

impl<T: Transport> PanelSession<T> {
    pub fn new(transport: T, settings: &Settings) -> Self {
        Self {
            messenger: Messenger::new(transport, "panel"),
            view: PanelView {
                compact_mode: settings.compact_mode,
                ..PanelView::default()
            },
            active_tab: None,
        }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active_tab
    }

    /// Starts a refresh of `active_tab`: resets the view to loading and
    /// returns the request the host must send to the coordinator.
    pub fn begin_refresh(&mut self, active_tab: Option<TabId>) -> CoordinatorRequest {
        if active_tab.is_some() {
            self.active_tab = active_tab;
        }
        self.reset_to_loading();
        CoordinatorRequest::RefreshActiveTabToc
    }

    /// Applies the outcome of a refresh request. A missing answer is
    /// treated as success; the page info arrives separately.
    pub fn complete_refresh(&mut self, outcome: Result<Option<RefreshAck>, ChannelError>) {
        match outcome {
            Ok(Some(RefreshAck { ok: false })) => self.show_error(PAGE_SCAN_ERROR),
            Ok(_) => {}
            Err(e) => match FailureClass::of(&e) {
                FailureClass::Transient => {}
                _ => {
                    debug!("Refresh failed: {}", e);
                    self.show_error(PAGE_SCAN_ERROR);
                }
            },
        }
    }

    /// Handles a push from a page context or the coordinator.
    pub fn handle_message(&mut self, envelope: &Envelope) {
        if let (Some(sender), Some(active)) = (envelope.sender, self.active_tab)
            && sender != active
        {
            debug!("Ignoring message from background {}", sender);
            return;
        }
        let Some(message) = decode::<PanelMessage>(&envelope.payload) else {
            return;
        };

        match message {
            PanelMessage::SendPageInfo {
                title,
                nested_headings,
            } => {
                if envelope.sender.is_some() {
                    self.active_tab = envelope.sender;
                }
                let title = title.trim();
                self.view.title = if title.is_empty() {
                    UNTITLED_PAGE.to_string()
                } else {
                    title.to_string()
                };
                self.view.status = if nested_headings.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Ready
                };
                self.view.headings = nested_headings;
                self.view.error_message = None;
            }
            PanelMessage::ActiveHeadingChanged { heading_id } => {
                self.view.active_heading_id = heading_id;
            }
            PanelMessage::SidePanelSyncError { tab_id } => {
                if let (Some(tab), Some(active)) = (tab_id, self.active_tab)
                    && tab != active
                {
                    return;
                }
                if tab_id.is_some() {
                    self.active_tab = tab_id;
                }
                self.show_error(PAGE_SCAN_ERROR);
            }
        }
    }

    /// A heading was clicked. Highlights it right away and asks the page
    /// to scroll there.
    pub fn select_heading(&mut self, id: HeadingId) -> Delivery {
        self.view.active_heading_id = id.to_string();
        let Some(tab) = self.active_tab else {
            self.show_error(CONNECTION_ERROR);
            return Delivery::Unreachable(ChannelError::NoReceiver);
        };

        let delivery = self.messenger.send(
            Destination::Tab(tab),
            &PageRequest::ScrollToHeading { heading_id: id },
        );
        if !delivery.is_ok() {
            self.show_error(CONNECTION_ERROR);
        }
        delivery
    }

    /// Another tab became active; the view waits for its page info.
    pub fn on_tab_activated(&mut self, tab: TabId) {
        self.active_tab = Some(tab);
        self.reset_to_loading();
    }

    /// Focus moved to another window. The view starts over for whichever
    /// tab is active there; when the host does not know it, the next page
    /// push decides.
    pub fn on_window_focus_changed(&mut self, window: WindowId, active_tab: Option<TabId>) {
        if window.is_none() {
            return;
        }
        self.active_tab = active_tab;
        self.reset_to_loading();
    }

    /// Settings changed. Display settings apply directly; the page context
    /// re-extracts on its own when the heading range changed.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.view.compact_mode = settings.compact_mode;
    }

    fn reset_to_loading(&mut self) {
        self.view = PanelView {
            compact_mode: self.view.compact_mode,
            ..PanelView::default()
        };
    }

    fn show_error(&mut self, message: &'static str) {
        self.view.status = LoadState::Error;
        self.view.error_message = Some(message);
        self.view.headings.clear();
        self.view.active_heading_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::RecordingTransport;
    use serde_json::{Value, json};

    fn panel() -> (PanelSession<RecordingTransport>, RecordingTransport) {
        let _ = env_logger::builder().is_test(true).try_init();
        let transport = RecordingTransport::new();
        (PanelSession::new(transport.clone(), &Settings::default()), transport)
    }

    fn page_info(title: &str) -> Value {
        json!({
            "action": "sendPageInfo",
            "title": title,
            "nestedHeadings": [
                { "id": "setup", "text": "Setup", "level": 2,
                  "Children": [{ "id": "install", "text": "Install", "level": 3, "Children": [] }] },
                { "id": "usage", "text": "Usage", "level": 2, "Children": [] }
            ]
        })
    }

    fn from_tab(tab: u32, payload: Value) -> Envelope {
        Envelope::new(Some(TabId(tab)), payload)
    }

    #[test]
    fn test_page_info_populates_view() {
        let (mut panel, _transport) = panel();
        assert_eq!(panel.begin_refresh(Some(TabId(1))), CoordinatorRequest::RefreshActiveTabToc);
        assert_eq!(panel.view().status, LoadState::Loading);

        panel.handle_message(&from_tab(1, page_info("Guide")));
        panel.handle_message(&from_tab(
            1,
            json!({ "action": "activeHeadingChanged", "headingId": "install" }),
        ));

        let view = panel.view();
        assert_eq!(view.status, LoadState::Ready);
        assert_eq!(view.title, "Guide");
        assert_eq!(view.active_heading_id, "install");
        assert_eq!(view.outline(), " Setup\n>  Install\n Usage");
    }

    #[test]
    fn test_empty_and_untitled_pages() {
        let (mut panel, _transport) = panel();
        panel.handle_message(&from_tab(
            2,
            json!({ "action": "sendPageInfo", "title": "  ", "nestedHeadings": [] }),
        ));
        assert_eq!(panel.view().status, LoadState::Empty);
        assert_eq!(panel.view().title, UNTITLED_PAGE);
        assert_eq!(panel.active_tab(), Some(TabId(2)));
    }

    #[test]
    fn test_background_tabs_are_ignored() {
        let (mut panel, _transport) = panel();
        panel.on_tab_activated(TabId(1));
        panel.handle_message(&from_tab(1, page_info("Active")));
        panel.handle_message(&from_tab(7, page_info("Background")));
        panel.handle_message(&from_tab(
            7,
            json!({ "action": "activeHeadingChanged", "headingId": "usage" }),
        ));
        assert_eq!(panel.view().title, "Active");
        assert_eq!(panel.view().active_heading_id, "");

        panel.handle_message(&Envelope::new(
            None,
            json!({ "action": "sidePanelSyncError", "tabId": 7 }),
        ));
        assert_eq!(panel.view().status, LoadState::Ready);
    }

    #[test]
    fn test_sync_error_for_active_tab() {
        let (mut panel, _transport) = panel();
        panel.on_tab_activated(TabId(3));
        panel.handle_message(&Envelope::new(
            None,
            json!({ "action": "sidePanelSyncError", "tabId": 3 }),
        ));
        assert_eq!(panel.view().status, LoadState::Error);
        assert_eq!(panel.view().error_message, Some(PAGE_SCAN_ERROR));

        // A later page info clears the error.
        panel.handle_message(&from_tab(3, page_info("Recovered")));
        assert_eq!(panel.view().status, LoadState::Ready);
        assert_eq!(panel.view().error_message, None);
    }

    #[test]
    fn test_malformed_messages_leave_view_unchanged() {
        let (mut panel, _transport) = panel();
        panel.handle_message(&from_tab(1, page_info("Guide")));
        let before = panel.view().clone();
        panel.handle_message(&from_tab(1, json!({ "action": "sendPageInfo" })));
        panel.handle_message(&from_tab(1, json!("garbage")));
        assert_eq!(panel.view(), &before);
    }

    #[test]
    fn test_select_heading() {
        let (mut panel, transport) = panel();
        panel.handle_message(&from_tab(4, page_info("Guide")));

        assert_eq!(panel.select_heading("usage".into()), Delivery::Sent);
        assert_eq!(panel.view().active_heading_id, "usage");
        assert_eq!(
            transport.take_for::<PageRequest>(Destination::Tab(TabId(4))),
            vec![PageRequest::ScrollToHeading {
                heading_id: "usage".into()
            }]
        );

        transport.fail(Destination::Tab(TabId(4)), ChannelError::NoReceiver);
        assert!(!panel.select_heading("setup".into()).is_ok());
        assert_eq!(panel.view().status, LoadState::Error);
        assert_eq!(panel.view().error_message, Some(CONNECTION_ERROR));
    }

    #[test]
    fn test_select_heading_without_tab() {
        let (mut panel, transport) = panel();
        assert!(panel.select_heading("usage".into()).is_unreachable());
        assert_eq!(panel.view().error_message, Some(CONNECTION_ERROR));
        assert!(transport.take().is_empty());
    }

    #[test]
    fn test_refresh_outcomes() {
        let (mut panel, _transport) = panel();
        panel.begin_refresh(Some(TabId(1)));

        panel.complete_refresh(Ok(None));
        assert_eq!(panel.view().status, LoadState::Loading);
        panel.complete_refresh(Ok(Some(RefreshAck { ok: true })));
        assert_eq!(panel.view().status, LoadState::Loading);
        panel.complete_refresh(Err(ChannelError::PortClosed));
        assert_eq!(panel.view().status, LoadState::Loading);

        panel.complete_refresh(Ok(Some(RefreshAck { ok: false })));
        assert_eq!(panel.view().error_message, Some(PAGE_SCAN_ERROR));

        panel.begin_refresh(None);
        assert_eq!(panel.view().status, LoadState::Loading);
        assert_eq!(panel.active_tab(), Some(TabId(1)));
        panel.complete_refresh(Err(ChannelError::Host("boom".into())));
        assert_eq!(panel.view().status, LoadState::Error);
    }

    #[test]
    fn test_tab_switch_resets_view() {
        let (mut panel, _transport) = panel();
        panel.apply_settings(&Settings {
            compact_mode: true,
            ..Settings::default()
        });
        panel.handle_message(&from_tab(1, page_info("Guide")));

        panel.on_window_focus_changed(WindowId::NONE, Some(TabId(2)));
        assert_eq!(panel.view().status, LoadState::Ready);

        panel.on_window_focus_changed(WindowId(2), Some(TabId(2)));
        assert_eq!(panel.active_tab(), Some(TabId(2)));
        assert_eq!(panel.view().status, LoadState::Loading);
        assert!(panel.view().headings.is_empty());
        assert!(panel.view().compact_mode);
    }

    #[test]
    fn test_focus_change_always_resets() {
        let (mut panel, _transport) = panel();
        panel.handle_message(&from_tab(1, page_info("Guide")));
        panel.handle_message(&from_tab(
            1,
            json!({ "action": "activeHeadingChanged", "headingId": "usage" }),
        ));

        // Same tab, new window focus: the view still starts over.
        panel.on_window_focus_changed(WindowId(1), Some(TabId(1)));
        assert_eq!(panel.view().status, LoadState::Loading);
        assert!(panel.view().active_heading_id.is_empty());
        assert_eq!(panel.active_tab(), Some(TabId(1)));

        // Unknown active tab: the next push adopts its sender.
        panel.handle_message(&from_tab(1, page_info("Guide")));
        panel.on_window_focus_changed(WindowId(2), None);
        assert_eq!(panel.view().status, LoadState::Loading);
        assert_eq!(panel.active_tab(), None);
        panel.handle_message(&from_tab(3, page_info("Notes")));
        assert_eq!(panel.active_tab(), Some(TabId(3)));
        assert_eq!(panel.view().title, "Notes");
    }
}
