//! Native runtime hosting every context as a tokio task.
//!
//! ```text
//!  page task (per tab) --push--> bus --> panel task
//!        ^                                  |
//!        +---- updateSidePanel ---- coordinator task <-- refresh request
//! ```
//!
//! The runtime plays the browser: it owns tab lifecycle, forwards document
//! edits and scrolls to page tasks, and fans settings changes out to every
//! context through a broadcast channel.

pub mod bus;
mod coordinator;
mod page;
mod panel;

pub use bus::{Bus, BusTransport};
pub use page::{DocumentEdit, FRAME_INTERVAL_MS, PageCommand};
pub use panel::PanelCommand;

use crate::error::RuntimeError;
use coordinator::CoordinatorTask;
use itertools::Itertools;
use log::{debug, info};
use page::PageTask;
use panel::PanelTask;
use sidetoc_core::{
    CoordinatorSession, InMemoryDocument, MutationKind, PageSession, PanelSession, PanelView,
    SettingsChange, SettingsStore, SyncConfig, TabEvent,
};
use sidetoc_traits::Destination;
use sidetoc_types::{HeadingId, Settings, TabId, WindowId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinSet;

/// Milliseconds since the runtime started, on tokio's clock (so paused
/// test time applies).
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: tokio::time::Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

struct PageHandle {
    commands: async_channel::Sender<PageCommand>,
}

/// The set of running contexts. Must be created inside a tokio runtime.
pub struct SyncRuntime {
    bus: Arc<Bus>,
    config: SyncConfig,
    store: SettingsStore,
    settings: Settings,
    settings_tx: broadcast::Sender<Settings>,
    events: async_channel::Sender<TabEvent>,
    pages: HashMap<TabId, PageHandle>,
    restricted: Vec<TabId>,
    panel: Option<async_channel::Sender<PanelCommand>>,
    clock: Clock,
    tasks: JoinSet<()>,
}

impl SyncRuntime {
    /// Starts the coordinator with settings loaded from `store`.
    pub fn new(store: SettingsStore, config: SyncConfig) -> Self {
        let bus = Bus::new();
        let settings = store.load_or_default();
        let (settings_tx, _) = broadcast::channel(16);
        let (events, event_rx) = async_channel::unbounded();

        let mut tasks = JoinSet::new();
        let coordinator = CoordinatorTask {
            session: CoordinatorSession::new(bus.transport(None)),
            inbox: bus.attach(Destination::Coordinator),
            requests: bus.attach_requests(),
            events: event_rx,
        };
        tasks.spawn(coordinator.run());
        info!("Runtime started with {} settings backend.", store.backend_name());

        Self {
            bus,
            config,
            store,
            settings,
            settings_tx,
            events,
            pages: HashMap::new(),
            restricted: Vec::new(),
            panel: None,
            clock: Clock::start(),
            tasks,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    /// Open tabs, in id order.
    pub fn tabs(&self) -> Vec<TabId> {
        self.pages
            .keys()
            .chain(self.restricted.iter())
            .copied()
            .sorted()
            .collect()
    }

    /// Opens a tab showing `document` and attaches its page context.
    pub async fn open_tab(
        &mut self,
        tab: TabId,
        window: WindowId,
        document: InMemoryDocument,
    ) -> Result<(), RuntimeError> {
        if self.pages.contains_key(&tab) || self.restricted.contains(&tab) {
            return Err(RuntimeError::TabExists(tab));
        }
        let (commands, command_rx) = async_channel::unbounded();
        let task = PageTask {
            tab,
            session: PageSession::new(
                document,
                self.bus.transport(Some(tab)),
                self.settings,
                self.config.clone(),
                self.clock.now_ms(),
            ),
            inbox: self.bus.attach(Destination::Tab(tab)),
            commands: command_rx,
            settings: self.settings_tx.subscribe(),
            clock: self.clock,
        };
        self.tasks.spawn(task.run());
        self.pages.insert(tab, PageHandle { commands });
        self.emit(TabEvent::Created { tab, window }).await
    }

    /// Opens a tab whose page cannot be scripted (`chrome://` and friends).
    pub async fn open_restricted_tab(
        &mut self,
        tab: TabId,
        window: WindowId,
        url: &str,
    ) -> Result<(), RuntimeError> {
        if self.pages.contains_key(&tab) || self.restricted.contains(&tab) {
            return Err(RuntimeError::TabExists(tab));
        }
        self.bus.restrict(tab, url);
        self.restricted.push(tab);
        self.emit(TabEvent::Created { tab, window }).await
    }

    pub async fn activate_tab(&mut self, tab: TabId, window: WindowId) -> Result<(), RuntimeError> {
        self.emit(TabEvent::Activated { tab, window }).await?;
        self.send_panel(PanelCommand::TabActivated(tab)).await
    }

    pub async fn focus_window(
        &mut self,
        window: WindowId,
        active_tab: Option<TabId>,
    ) -> Result<(), RuntimeError> {
        self.emit(TabEvent::WindowFocusChanged { window, active_tab })
            .await?;
        self.send_panel(PanelCommand::WindowFocusChanged(window, active_tab))
            .await
    }

    /// Reports that a tab finished loading.
    pub async fn complete_load(&mut self, tab: TabId) -> Result<(), RuntimeError> {
        self.emit(TabEvent::Updated {
            tab,
            complete: true,
        })
        .await
    }

    pub async fn close_tab(&mut self, tab: TabId) -> Result<(), RuntimeError> {
        let known = self.pages.remove(&tab).is_some();
        self.restricted.retain(|t| *t != tab);
        if !known {
            debug!("Closing {} which had no page context", tab);
        }
        self.bus.detach(Destination::Tab(tab));
        self.emit(TabEvent::Removed { tab }).await
    }

    /// Applies `edit` to the tab's document and reports `kinds` mutations.
    pub async fn edit_page<F>(
        &self,
        tab: TabId,
        kinds: &[MutationKind],
        edit: F,
    ) -> Result<(), RuntimeError>
    where
        F: FnOnce(&InMemoryDocument) + Send + 'static,
    {
        self.send_page(
            tab,
            PageCommand::Edit {
                edit: Box::new(edit),
                kinds: kinds.to_vec(),
            },
        )
        .await
    }

    pub async fn scroll_page(&self, tab: TabId, y: f32) -> Result<(), RuntimeError> {
        self.send_page(tab, PageCommand::ScrollTo(y)).await
    }

    pub async fn resize_page(&self, tab: TabId, height: f32) -> Result<(), RuntimeError> {
        self.send_page(tab, PageCommand::Resize(height)).await
    }

    pub async fn navigate(&self, tab: TabId, url: &str) -> Result<(), RuntimeError> {
        self.send_page(tab, PageCommand::Navigate(url.to_string()))
            .await
    }

    /// Opens the panel (or reopens it) and requests a refresh of
    /// `active_tab`.
    pub async fn open_panel(&mut self, active_tab: Option<TabId>) -> Result<(), RuntimeError> {
        if self.panel.is_none() {
            let (commands, command_rx) = async_channel::unbounded();
            let task = PanelTask {
                bus: Arc::clone(&self.bus),
                session: PanelSession::new(self.bus.transport(None), &self.settings),
                inbox: self.bus.attach(Destination::Panel),
                commands: command_rx,
                settings: self.settings_tx.subscribe(),
            };
            self.tasks.spawn(task.run());
            self.panel = Some(commands);
        }
        self.send_panel(PanelCommand::Refresh(active_tab)).await
    }

    pub fn close_panel(&mut self) {
        self.bus.detach(Destination::Panel);
        self.panel = None;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel.is_some()
    }

    /// Clicks a heading in the panel.
    pub async fn select_heading(&self, id: impl Into<HeadingId>) -> Result<(), RuntimeError> {
        self.require_panel(PanelCommand::Select(id.into())).await
    }

    /// The panel's current view.
    pub async fn panel_view(&self) -> Result<PanelView, RuntimeError> {
        let (reply, view) = oneshot::channel();
        self.require_panel(PanelCommand::Snapshot(reply)).await?;
        view.await.map_err(|_| RuntimeError::TaskStopped("panel"))
    }

    /// Persists new settings and notifies every context.
    pub fn update_settings(&mut self, settings: Settings) -> Result<SettingsChange, RuntimeError> {
        let change = self.store.save(settings)?;
        self.settings = change.current;
        if change.is_empty() {
            return Ok(change);
        }
        info!("Settings changed: {}", change.changed_keys.iter().join(", "));
        // No receivers just means no context is open.
        let _ = self.settings_tx.send(change.current);
        Ok(change)
    }

    /// Stops every task and waits for them to finish.
    pub async fn shutdown(mut self) {
        for destination in self.tabs().into_iter().map(Destination::Tab) {
            self.bus.detach(destination);
        }
        self.pages.clear();
        self.panel = None;
        self.events.close();
        self.bus.detach(Destination::Panel);
        self.bus.detach(Destination::Coordinator);
        drop(self.settings_tx);
        while self.tasks.join_next().await.is_some() {}
        info!("Runtime stopped.");
    }

    async fn emit(&self, event: TabEvent) -> Result<(), RuntimeError> {
        self.events
            .send(event)
            .await
            .map_err(|_| RuntimeError::TaskStopped("coordinator"))
    }

    async fn send_page(&self, tab: TabId, command: PageCommand) -> Result<(), RuntimeError> {
        let page = self.pages.get(&tab).ok_or(RuntimeError::UnknownTab(tab))?;
        page.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::TaskStopped("page"))
    }

    /// Forwards to the panel if it is open.
    async fn send_panel(&self, command: PanelCommand) -> Result<(), RuntimeError> {
        match &self.panel {
            Some(panel) => panel
                .send(command)
                .await
                .map_err(|_| RuntimeError::TaskStopped("panel")),
            None => Ok(()),
        }
    }

    async fn require_panel(&self, command: PanelCommand) -> Result<(), RuntimeError> {
        if self.panel.is_none() {
            return Err(RuntimeError::PanelClosed);
        }
        self.send_panel(command).await
    }
}
