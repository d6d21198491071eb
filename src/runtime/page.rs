//! The page task: one per scriptable tab.

use super::Clock;
use super::bus::{BusTransport, Inbox};
use log::{debug, info};
use sidetoc_core::{InMemoryDocument, MutationKind, PageSession};
use sidetoc_types::{Settings, TabId};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Delay standing in for the next animation frame.
pub const FRAME_INTERVAL_MS: u64 = 16;

/// A change applied to the page's document from outside.
pub type DocumentEdit = Box<dyn FnOnce(&InMemoryDocument) + Send>;

/// Host events forwarded to a page task.
pub enum PageCommand {
    /// Edits the document, then reports the mutations it caused.
    Edit {
        edit: DocumentEdit,
        kinds: Vec<MutationKind>,
    },
    ScrollTo(f32),
    Resize(f32),
    /// A history navigation reported by the host.
    Navigate(String),
}

pub(crate) struct PageTask {
    pub tab: TabId,
    pub session: PageSession<InMemoryDocument, BusTransport>,
    pub inbox: Inbox,
    pub commands: async_channel::Receiver<PageCommand>,
    pub settings: broadcast::Receiver<Settings>,
    pub clock: Clock,
}

impl PageTask {
    pub async fn run(mut self) {
        info!("[PAGE {}] Started.", self.tab);
        self.session.start(self.clock.now_ms());
        let mut frame_due: Option<u64> = None;

        loop {
            let now = self.clock.now_ms();
            let deadline = frame_due.map_or(self.session.next_deadline(), |frame| {
                frame.min(self.session.next_deadline())
            });
            let sleep = tokio::time::sleep(Duration::from_millis(deadline.saturating_sub(now)));

            tokio::select! {
                envelope = self.inbox.recv() => match envelope {
                    Ok(envelope) => self.session.handle_message(&envelope.payload, self.clock.now_ms()),
                    Err(_) => break,
                },
                command = self.commands.recv() => match command {
                    Ok(command) => {
                        if self.apply(command) && frame_due.is_none() {
                            frame_due = Some(self.clock.now_ms() + FRAME_INTERVAL_MS);
                        }
                    }
                    Err(_) => break,
                },
                settings = self.settings.recv() => match settings {
                    Ok(settings) => {
                        self.session.apply_settings(settings, self.clock.now_ms());
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("[PAGE {}] Skipped {} settings updates.", self.tab, skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = sleep => {
                    let now = self.clock.now_ms();
                    if frame_due.is_some_and(|frame| frame <= now) {
                        frame_due = None;
                        self.session.run_frame();
                    }
                    self.session.tick(now);
                }
            }
        }
        info!("[PAGE {}] Stopped after {} passes.", self.tab, self.session.passes());
    }

    /// Returns whether a frame callback was requested.
    fn apply(&mut self, command: PageCommand) -> bool {
        let now = self.clock.now_ms();
        match command {
            PageCommand::Edit { edit, kinds } => {
                edit(self.session.document());
                self.session.on_mutation(&kinds, now);
                false
            }
            PageCommand::ScrollTo(y) => {
                self.session.document().scroll_to(y);
                self.session.on_scroll()
            }
            PageCommand::Resize(height) => {
                self.session
                    .document()
                    .set_viewport(sidetoc_types::Viewport::new(height));
                self.session.on_resize(now)
            }
            PageCommand::Navigate(url) => {
                self.session.document().set_url(&url);
                self.session.on_url_change(&url, now);
                false
            }
        }
    }
}
