//! The coordinator task: tab lifecycle and refresh requests.

use super::bus::{BusTransport, Inbox, Request};
use log::{debug, info, warn};
use sidetoc_core::{CoordinatorSession, TabEvent};

pub(crate) struct CoordinatorTask {
    pub session: CoordinatorSession<BusTransport>,
    pub inbox: Inbox,
    pub requests: async_channel::Receiver<Request>,
    pub events: async_channel::Receiver<TabEvent>,
}

impl CoordinatorTask {
    pub async fn run(mut self) {
        info!("[COORDINATOR] Started.");
        loop {
            // Lifecycle events first: a refresh must see the latest active tab.
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Ok(event) => {
                        debug!("[COORDINATOR] {:?}", event);
                        self.session.handle_event(event);
                    }
                    Err(_) => break,
                },
                request = self.requests.recv() => match request {
                    Ok(Request { payload, reply }) => {
                        // Requests without an answer just drop the reply port.
                        if let Some(ack) = self.session.handle_message(&payload) {
                            match serde_json::to_value(ack) {
                                Ok(answer) => {
                                    let _ = reply.send(answer);
                                }
                                Err(e) => warn!("[COORDINATOR] Could not encode ack: {}", e),
                            }
                        }
                    }
                    Err(_) => break,
                },
                envelope = self.inbox.recv() => match envelope {
                    Ok(envelope) => {
                        self.session.handle_message(&envelope.payload);
                    }
                    Err(_) => break,
                },
            }
        }
        info!("[COORDINATOR] Stopped.");
    }
}
