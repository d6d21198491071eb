//! In-process message routing between contexts.
//!
//! Every context attaches an unbounded inbox for its [`Destination`]. Posting
//! never blocks: a send either lands in the inbox or fails the way a browser
//! runtime would (nobody listening, privileged page).

use log::{debug, trace};
use serde_json::Value;
use sidetoc_core::messenger::Envelope;
use sidetoc_traits::{ChannelError, Destination, Transport};
use sidetoc_types::TabId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::oneshot;

/// Receiver side of a context inbox.
pub type Inbox = async_channel::Receiver<Envelope>;

/// A payload that expects an answer from the coordinator.
#[derive(Debug)]
pub struct Request {
    pub payload: Value,
    pub reply: oneshot::Sender<Value>,
}

#[derive(Debug)]
enum Route {
    Open(async_channel::Sender<Envelope>),
    /// A tab whose page the host refuses to script.
    Restricted(String),
}

#[derive(Debug, Default)]
pub struct Bus {
    routes: RwLock<HashMap<Destination, Route>>,
    requests: RwLock<Option<async_channel::Sender<Request>>>,
}

impl Bus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Attaches a fresh inbox for `destination`, replacing any previous one.
    pub fn attach(&self, destination: Destination) -> Inbox {
        let (tx, rx) = async_channel::unbounded();
        self.write_routes().insert(destination, Route::Open(tx));
        debug!("[BUS] {} attached", destination);
        rx
    }

    /// Marks a tab as unscriptable; sends to it fail as restricted.
    pub fn restrict(&self, tab: TabId, url: impl Into<String>) {
        self.write_routes()
            .insert(Destination::Tab(tab), Route::Restricted(url.into()));
    }

    pub fn detach(&self, destination: Destination) {
        if self.write_routes().remove(&destination).is_some() {
            debug!("[BUS] {} detached", destination);
        }
    }

    /// Attaches the coordinator's request inbox.
    pub fn attach_requests(&self) -> async_channel::Receiver<Request> {
        let (tx, rx) = async_channel::unbounded();
        *self
            .requests
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Routes a payload stamped with its origin tab.
    pub fn deliver(
        &self,
        origin: Option<TabId>,
        destination: Destination,
        payload: Value,
    ) -> Result<(), ChannelError> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        match routes.get(&destination) {
            Some(Route::Open(tx)) => {
                trace!("[BUS] {:?} -> {}", origin, destination);
                tx.try_send(Envelope::new(origin, payload))
                    .map_err(|_| ChannelError::NoReceiver)
            }
            Some(Route::Restricted(url)) => Err(ChannelError::Restricted(url.clone())),
            None => Err(ChannelError::NoReceiver),
        }
    }

    /// Sends a request to the coordinator and waits for its answer.
    ///
    /// `Ok(None)` when the coordinator dropped the request without
    /// answering.
    pub async fn request(&self, payload: Value) -> Result<Option<Value>, ChannelError> {
        let sender = self
            .requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ChannelError::NoReceiver)?;

        let (reply, answer) = oneshot::channel();
        sender
            .send(Request { payload, reply })
            .await
            .map_err(|_| ChannelError::NoReceiver)?;
        Ok(answer.await.ok())
    }

    /// A transport that stamps messages with `origin`.
    pub fn transport(self: &Arc<Self>, origin: Option<TabId>) -> BusTransport {
        BusTransport {
            bus: Arc::clone(self),
            origin,
        }
    }

    fn write_routes(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Destination, Route>> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`Transport`] for one context attached to a [`Bus`].
#[derive(Debug, Clone)]
pub struct BusTransport {
    bus: Arc<Bus>,
    origin: Option<TabId>,
}

impl Transport for BusTransport {
    fn post(&self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
        self.bus.deliver(self.origin, destination, payload)
    }
}
