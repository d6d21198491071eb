pub mod fixtures;

use sidetoc::runtime::SyncRuntime;
use sidetoc::{PanelView, SettingsStore, SyncConfig};
use sidetoc_storage::InMemorySettingsBackend;
use std::sync::Arc;
use std::time::Duration;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A runtime over in-memory settings with the default timings.
pub fn runtime() -> SyncRuntime {
    init_logger();
    let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));
    SyncRuntime::new(store, SyncConfig::default())
}

/// Lets every task run and the debounce window elapse.
///
/// Meant for `start_paused` tests, where the sleep completes instantly once
/// all tasks are idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(500)).await;
}

/// Settles, then returns the panel view.
pub async fn settled_view(runtime: &SyncRuntime) -> PanelView {
    settle().await;
    runtime.panel_view().await.expect("panel is open")
}

/// Top-level heading ids of the view, in order.
pub fn top_level_ids(view: &PanelView) -> Vec<String> {
    view.headings.iter().map(|h| h.id.to_string()).collect()
}
