//! # sidetoc-core
//!
//! Platform-agnostic table-of-contents extraction and synchronization.
//!
//! This crate provides:
//! - **extract / tree**: heading extraction with stable unique ids, and the
//!   level-based nesting of the flat heading list
//! - **signature**: change detection that gates propagation
//! - **tracker**: the active-section heuristic driven by viewport geometry
//! - **scheduler**: debounced resynchronization and frame coalescing
//! - **messenger**: the wire protocol and send-failure classification
//! - **session**: one state machine per context (page, coordinator, panel)
//! - **settings**: the normalizing settings store
//! - **dom**: an in-memory document host, loadable from XHTML
//!
//! ## Design Principle
//!
//! This crate has **no platform dependencies**:
//! - No async runtime (`tokio`)
//! - No clock: time is passed in as milliseconds
//! - No browser APIs: the document and the channel are traits
//!
//! Every session is an explicit value, so independent sessions can coexist
//! in one process without shared globals.

pub use sidetoc_traits as traits;
pub use sidetoc_types as types;

pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod messenger;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod signature;
pub mod slug;
pub mod tracker;
pub mod tree;

pub use config::SyncConfig;
pub use dom::{InMemoryDocument, NodeRef};
pub use error::{DocumentError, SettingsError};
pub use extract::{Extraction, HeadingExtractor, TrackedHeading};
pub use messenger::{
    CoordinatorRequest, Delivery, Envelope, FailureClass, Messenger, PageRequest, PanelMessage,
    RefreshAck,
};
pub use scheduler::{DuePass, FrameGate, MutationKind, SyncScheduler, SyncTrigger, UrlWatcher};
pub use session::{
    CoordinatorSession, LoadState, PageSession, PanelSession, PanelView, TabEvent,
};
pub use settings::{SettingsChange, SettingsStore};
pub use signature::{ActiveHeadingState, ChangeDetector, Signature};
pub use tracker::find_active_heading;
pub use tree::{build_tree, flatten};

pub use types::{FlatHeading, HeadingId, NestedHeading, PageInfo, Settings, TabId, WindowId};
