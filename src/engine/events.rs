//! Event fan-out
//!
//! Each subscriber owns an unbounded channel receiver. Dropping the
//! [`Subscription`] unsubscribes; the hub prunes closed senders on the next
//! emit. Once the hub is closed, new subscriptions are born ended.

use super::types::EngineEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Registered subscribers of one engine
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    subscribers: Vec<UnboundedSender<EngineEvent>>,
    closed: bool,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.closed {
            self.subscribers.push(tx);
        }
        Subscription { rx }
    }

    /// Deliver events, in order, to every live subscriber
    pub(crate) fn emit_all(&mut self, events: &[EngineEvent]) {
        self.subscribers.retain(|tx| {
            events.iter().all(|event| tx.send(event.clone()).is_ok())
        });
    }

    /// Drop every sender so subscriptions end
    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.subscribers.clear();
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }
}

/// Stream of engine events for one listener
///
/// Ends (yields `None`) once the engine is closed or dropped.
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<EngineEvent>,
}

impl Subscription {
    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take every event that is already queued
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }
}

impl Stream for Subscription {
    type Item = EngineEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
