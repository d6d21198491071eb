//! One state machine per execution context.
//!
//! - [`PageSession`]: extraction, change detection and active tracking for
//!   the document in one tab
//! - [`CoordinatorSession`]: tab lifecycle and refresh requests
//! - [`PanelSession`]: the rendered view, scoped to the active tab
//!
//! Sessions never block and never read a clock. They talk to each other
//! only through a [`sidetoc_traits::Transport`].

mod coordinator;
mod page;
mod panel;

pub use coordinator::{CoordinatorSession, TabEvent};
pub use page::PageSession;
pub use panel::{
    CONNECTION_ERROR, LoadState, PAGE_SCAN_ERROR, PanelSession, PanelView, UNTITLED_PAGE,
};
