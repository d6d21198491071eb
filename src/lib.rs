//! # sidetoc
//!
//! A live table of contents for the document in the active tab, kept in
//! sync across three contexts: the page (extraction and active-section
//! tracking), the coordinator (tab lifecycle) and the side panel (the view).
//!
//! The synchronization logic lives in `sidetoc-core` and is platform
//! agnostic. This crate hosts it natively: [`runtime::SyncRuntime`] runs
//! every context as a tokio task connected by an in-process message bus,
//! which is what the `sidetoc` command-line tool and the integration tests
//! drive.
//!
//! ```no_run
//! use sidetoc::runtime::SyncRuntime;
//! use sidetoc::{InMemoryDocument, SettingsStore, SyncConfig, TabId, WindowId};
//! use sidetoc_storage::InMemorySettingsBackend;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), sidetoc::RuntimeError> {
//! let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));
//! let mut runtime = SyncRuntime::new(store, SyncConfig::default());
//!
//! let document = InMemoryDocument::new("Guide", "https://docs.test/guide");
//! document.append_heading(2, "Setup");
//! runtime.open_tab(TabId(1), WindowId(1), document).await?;
//! runtime.activate_tab(TabId(1), WindowId(1)).await?;
//! runtime.open_panel(Some(TabId(1))).await?;
//!
//! tokio::time::sleep(std::time::Duration::from_millis(300)).await;
//! println!("{}", runtime.panel_view().await?.outline());
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod runtime;

pub use error::RuntimeError;
pub use sidetoc_core::{
    InMemoryDocument, LoadState, PanelView, SettingsStore, SyncConfig, build_tree,
};
pub use sidetoc_types::{FlatHeading, HeadingId, NestedHeading, PageInfo, Settings, TabId, WindowId};
