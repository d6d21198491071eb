use crate::messenger::{
    CoordinatorRequest, Delivery, Messenger, PageRequest, PanelMessage, RefreshAck, decode,
};
use log::{debug, warn};
use serde_json::Value;
use sidetoc_traits::{Destination, Transport};
use sidetoc_types::{TabId, WindowId};
use std::collections::HashMap;

/// Tab and window lifecycle events observed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created { tab: TabId, window: WindowId },
    Activated { tab: TabId, window: WindowId },
    /// A tab's load status changed; `complete` once loading finished.
    Updated { tab: TabId, complete: bool },
    Removed { tab: TabId },
    /// Focus moved to `window` ([`WindowId::NONE`] when no browser window
    /// has focus), whose active tab is `active_tab` if known.
    WindowFocusChanged {
        window: WindowId,
        active_tab: Option<TabId>,
    },
}

/// Tracks the active tab and keeps its page context in step with the panel.
pub struct CoordinatorSession<T> {
    messenger: Messenger<T>,
    active_by_window: HashMap<WindowId, TabId>,
    window_of: HashMap<TabId, WindowId>,
    focused: Option<WindowId>,
}

impl<T: Transport> CoordinatorSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            messenger: Messenger::new(transport, "coordinator"),
            active_by_window: HashMap::new(),
            window_of: HashMap::new(),
            focused: None,
        }
    }

    /// The active tab of the focused window.
    pub fn active_tab(&self) -> Option<TabId> {
        self.focused
            .and_then(|window| self.active_by_window.get(&window))
            .copied()
    }

    /// Number of tabs currently known.
    pub fn tab_count(&self) -> usize {
        self.window_of.len()
    }

    /// Applies a lifecycle event. Returns the delivery of the
    /// `updateSidePanel` request it triggered, if any.
    pub fn handle_event(&mut self, event: TabEvent) -> Option<Delivery> {
        match event {
            TabEvent::Created { tab, window } => {
                self.window_of.insert(tab, window);
                None
            }
            TabEvent::Activated { tab, window } => {
                self.window_of.insert(tab, window);
                self.active_by_window.insert(window, tab);
                let focused = *self.focused.get_or_insert(window);
                (focused == window).then(|| self.request_update(tab))
            }
            TabEvent::Updated { tab, complete } => {
                (complete && self.active_tab() == Some(tab)).then(|| self.request_update(tab))
            }
            TabEvent::Removed { tab } => {
                if let Some(window) = self.window_of.remove(&tab)
                    && self.active_by_window.get(&window) == Some(&tab)
                {
                    self.active_by_window.remove(&window);
                }
                None
            }
            TabEvent::WindowFocusChanged { window, active_tab } => {
                if window.is_none() {
                    return None;
                }
                self.focused = Some(window);
                if let Some(tab) = active_tab {
                    self.window_of.insert(tab, window);
                    self.active_by_window.insert(window, tab);
                }
                self.active_tab().map(|tab| self.request_update(tab))
            }
        }
    }

    /// Handles a raw payload addressed to the coordinator. Returns the
    /// acknowledgment for requests that expect one.
    pub fn handle_message(&mut self, payload: &Value) -> Option<RefreshAck> {
        match decode::<CoordinatorRequest>(payload)? {
            CoordinatorRequest::RefreshActiveTabToc => Some(self.refresh_active_tab()),
        }
    }

    /// Asks the active tab to re-extract. The acknowledgment is only `ok`
    /// when the request was handed to the page context.
    pub fn refresh_active_tab(&mut self) -> RefreshAck {
        let Some(tab) = self.active_tab() else {
            debug!("Refresh requested with no active tab");
            return RefreshAck { ok: false };
        };
        RefreshAck {
            ok: self.request_update(tab).is_ok(),
        }
    }

    /// Sends `updateSidePanel` to `tab`. When the tab cannot host a page
    /// context, the panel is told so it can show the scan error.
    pub fn request_update(&mut self, tab: TabId) -> Delivery {
        let delivery = self
            .messenger
            .send(Destination::Tab(tab), &PageRequest::UpdateSidePanel);
        if delivery.is_unreachable() {
            let notice = self.messenger.send(
                Destination::Panel,
                &PanelMessage::SidePanelSyncError { tab_id: Some(tab) },
            );
            if let Delivery::Failed(e) = notice {
                warn!("Could not report sync error for {}: {}", tab, e);
            }
        }
        delivery
    }
}
