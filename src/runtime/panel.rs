//! The panel task: renders the view for the active tab.

use super::bus::{Bus, BusTransport, Inbox};
use log::{debug, info};
use sidetoc_core::messenger::decode;
use sidetoc_core::{PanelSession, PanelView, RefreshAck};
use sidetoc_types::{HeadingId, Settings, TabId, WindowId};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};

/// User and browser events forwarded to the panel task.
pub enum PanelCommand {
    /// Reopening or the refresh button: reset and ask for fresh page info.
    Refresh(Option<TabId>),
    TabActivated(TabId),
    WindowFocusChanged(WindowId, Option<TabId>),
    Select(HeadingId),
    Snapshot(oneshot::Sender<PanelView>),
}

pub(crate) struct PanelTask {
    pub bus: Arc<Bus>,
    pub session: PanelSession<BusTransport>,
    pub inbox: Inbox,
    pub commands: async_channel::Receiver<PanelCommand>,
    pub settings: broadcast::Receiver<Settings>,
}

impl PanelTask {
    pub async fn run(mut self) {
        info!("[PANEL] Opened.");
        loop {
            // Browser events first, so a tab switch is applied before any
            // message that was sent in reaction to it.
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Ok(command) => self.apply(command).await,
                    Err(_) => break,
                },
                envelope = self.inbox.recv() => match envelope {
                    Ok(envelope) => self.session.handle_message(&envelope),
                    Err(_) => break,
                },
                settings = self.settings.recv() => match settings {
                    Ok(settings) => self.session.apply_settings(&settings),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        info!("[PANEL] Closed.");
    }

    async fn apply(&mut self, command: PanelCommand) {
        match command {
            PanelCommand::Refresh(tab) => {
                let request = self.session.begin_refresh(tab);
                let outcome = match serde_json::to_value(request) {
                    Ok(payload) => self
                        .bus
                        .request(payload)
                        .await
                        .map(|answer| answer.and_then(|value| decode::<RefreshAck>(&value))),
                    Err(e) => Err(sidetoc_traits::ChannelError::Host(e.to_string())),
                };
                debug!("[PANEL] Refresh outcome: {:?}", outcome);
                self.session.complete_refresh(outcome);
            }
            PanelCommand::TabActivated(tab) => self.session.on_tab_activated(tab),
            PanelCommand::WindowFocusChanged(window, tab) => {
                self.session.on_window_focus_changed(window, tab)
            }
            PanelCommand::Select(id) => {
                self.session.select_heading(id);
            }
            PanelCommand::Snapshot(reply) => {
                let _ = reply.send(self.session.view().clone());
            }
        }
    }
}
