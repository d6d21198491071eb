//! Typed sending over a [`Transport`], with failure classification.
//!
//! Sends are fire-and-forget. Failures are sorted into three classes:
//! transient (a response port closed early; treated as success), unsupported
//! page (nothing can ever listen at the destination) and everything else.
//! Only the last class is logged at warn level.

mod protocol;

pub use protocol::{
    CoordinatorRequest, Envelope, PageRequest, PanelMessage, RefreshAck, decode,
};

use log::{debug, trace, warn};
use serde::Serialize;
use sidetoc_traits::{ChannelError, Destination, Transport};

/// How a send failure should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expected race in the host; ignored.
    Transient,
    /// The destination can never receive (privileged page, missing page
    /// context). Surfaced to the user as "page cannot be scanned".
    UnsupportedPage,
    /// Anything else; logged for diagnostics.
    Other,
}

impl FailureClass {
    pub fn of(error: &ChannelError) -> Self {
        match error {
            ChannelError::PortClosed => FailureClass::Transient,
            ChannelError::NoReceiver | ChannelError::Restricted(_) => FailureClass::UnsupportedPage,
            ChannelError::Host(_) => FailureClass::Other,
        }
    }
}

/// Outcome of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Failed transiently; counts as sent.
    Suppressed,
    /// The destination cannot receive.
    Unreachable(ChannelError),
    Failed(ChannelError),
}

impl Delivery {
    /// True for [`Delivery::Sent`] and [`Delivery::Suppressed`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Delivery::Sent | Delivery::Suppressed)
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Delivery::Unreachable(_))
    }

    pub fn from_result(result: Result<(), ChannelError>) -> Self {
        match result {
            Ok(()) => Delivery::Sent,
            Err(error) => match FailureClass::of(&error) {
                FailureClass::Transient => Delivery::Suppressed,
                FailureClass::UnsupportedPage => Delivery::Unreachable(error),
                FailureClass::Other => Delivery::Failed(error),
            },
        }
    }
}

/// Serializes messages and posts them through a transport.
#[derive(Debug, Clone)]
pub struct Messenger<T> {
    transport: T,
    origin: &'static str,
}

impl<T: Transport> Messenger<T> {
    /// `origin` names the sending context in log lines.
    pub fn new(transport: T, origin: &'static str) -> Self {
        Self { transport, origin }
    }

    pub fn send<M: Serialize>(&self, destination: Destination, message: &M) -> Delivery {
        let payload = match serde_json::to_value(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{}: failed to encode message for {}: {}", self.origin, destination, e);
                return Delivery::Failed(ChannelError::Host(e.to_string()));
            }
        };

        let delivery = Delivery::from_result(self.transport.post(destination, payload));
        match &delivery {
            Delivery::Sent => trace!("{}: sent to {}", self.origin, destination),
            Delivery::Suppressed => trace!("{}: port to {} closed early", self.origin, destination),
            Delivery::Unreachable(e) => debug!("{}: {} unreachable: {}", self.origin, destination, e),
            Delivery::Failed(e) => warn!("{}: send to {} failed: {}", self.origin, destination, e),
        }
        delivery
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording transport shared by the session tests.

    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    pub struct RecordingTransport {
        inner: Arc<Mutex<Recording>>,
    }

    #[derive(Debug, Default)]
    struct Recording {
        sent: Vec<(Destination, Value)>,
        failures: HashMap<Destination, ChannelError>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every later post to `destination` fail with `error`.
        pub fn fail(&self, destination: Destination, error: ChannelError) {
            self.inner.lock().unwrap().failures.insert(destination, error);
        }

        pub fn heal(&self, destination: Destination) {
            self.inner.lock().unwrap().failures.remove(&destination);
        }

        pub fn take(&self) -> Vec<(Destination, Value)> {
            std::mem::take(&mut self.inner.lock().unwrap().sent)
        }

        /// Takes the sent payloads addressed to `destination`, decoded.
        pub fn take_for<M: serde::de::DeserializeOwned>(&self, destination: Destination) -> Vec<M> {
            self.take()
                .into_iter()
                .filter(|(d, _)| *d == destination)
                .filter_map(|(_, payload)| decode(&payload))
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn post(&self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
            let mut inner = self.inner.lock().unwrap();
            if let Some(error) = inner.failures.get(&destination) {
                return Err(error.clone());
            }
            inner.sent.push((destination, payload));
            Ok(())
        }
    }
}
