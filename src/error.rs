use sidetoc_core::{DocumentError, SettingsError};
use sidetoc_types::TabId;
use thiserror::Error;

/// Errors surfaced by the native runtime and the command-line tool.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not load document: {0}")]
    Document(#[from] DocumentError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("No open tab {0}")]
    UnknownTab(TabId),

    #[error("{0} is already open")]
    TabExists(TabId),

    #[error("The side panel is not open")]
    PanelClosed,

    #[error("The {0} task has stopped")]
    TaskStopped(&'static str),
}
