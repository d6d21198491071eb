//! Transport trait for the fire-and-forget channel between contexts.
//!
//! A successful `post` only means the host accepted the message; there is no
//! delivery guarantee, no ordering between messages and no reply.

use serde_json::Value;
use sidetoc_types::TabId;
use std::fmt;
use thiserror::Error;

/// Where a message is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The page context attached to a tab.
    Tab(TabId),
    /// The long-lived coordinator.
    Coordinator,
    /// The detached panel.
    Panel,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Tab(tab) => write!(f, "{}", tab),
            Destination::Coordinator => f.write_str("coordinator"),
            Destination::Panel => f.write_str("panel"),
        }
    }
}

/// Error reported by the host when a send fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Nothing is listening at the destination, and nothing ever will
    /// (privileged page, context torn down, panel closed).
    #[error("Could not establish connection. Receiving end does not exist.")]
    NoReceiver,

    /// The host refuses to run page scripts on this URL.
    #[error("Cannot access contents of the page: {0}")]
    Restricted(String),

    /// A listener accepted the message asynchronously but its response port
    /// closed before it answered.
    #[error("The message port closed before a response was received.")]
    PortClosed,

    #[error("Channel error: {0}")]
    Host(String),
}

impl ChannelError {
    /// Maps an error string reported by a browser host onto a variant.
    pub fn from_host_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("A listener indicated an asynchronous response")
            || message.contains("The message port closed before a response was received")
        {
            ChannelError::PortClosed
        } else if message.contains("Receiving end does not exist")
            || message.contains("Could not establish connection")
        {
            ChannelError::NoReceiver
        } else if message.contains("Cannot access") {
            ChannelError::Restricted(message)
        } else {
            ChannelError::Host(message)
        }
    }
}

/// Sends JSON payloads to other contexts.
pub trait Transport {
    fn post(&self, destination: Destination, payload: Value) -> Result<(), ChannelError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post(&self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
        (**self).post(destination, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_messages_are_mapped() {
        assert_eq!(
            ChannelError::from_host_message(
                "A listener indicated an asynchronous response by returning true, but the message channel closed before a response was received"
            ),
            ChannelError::PortClosed
        );
        assert_eq!(
            ChannelError::from_host_message(
                "The message port closed before a response was received."
            ),
            ChannelError::PortClosed
        );
        assert_eq!(
            ChannelError::from_host_message(
                "Could not establish connection. Receiving end does not exist."
            ),
            ChannelError::NoReceiver
        );
        assert!(matches!(
            ChannelError::from_host_message("Cannot access a chrome:// URL"),
            ChannelError::Restricted(_)
        ));
        assert!(matches!(
            ChannelError::from_host_message("Extension context invalidated."),
            ChannelError::Host(_)
        ));
    }
}
