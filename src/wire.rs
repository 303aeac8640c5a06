//! Publishing channel events.
//!
//! The adjudicator reports every committed state change to an [EventBus].
//! It never consumes events itself, they exist for watchers, wallets and
//! off-chain bookkeeping.

mod encoding;

use crate::messages::ChannelEvent;
use core::fmt::Debug;
use parking_lot::Mutex;
use std::sync::Arc;

pub use encoding::{
    decode_event, decode_frame, decode_update, encode_frame, encode_update, EncodingError,
    ProtoBufEncodingLayer,
};

/// Low-level transport for encoded events.
pub trait BytesBus: Debug {
    fn publish(&self, msg: &[u8]);
}

pub trait EventBus: Debug {
    /// Called once the state change is certain to be committed, while the
    /// channel is still locked. Events of one channel therefore arrive in
    /// commit order. Blocking here stalls that channel only; calling back
    /// into the adjudicator for the same channel deadlocks.
    fn emit(&self, event: ChannelEvent);
}

impl<T: EventBus + ?Sized> EventBus for &T {
    fn emit(&self, event: ChannelEvent) {
        (**self).emit(event)
    }
}

impl<T: EventBus + ?Sized> EventBus for Arc<T> {
    fn emit(&self, event: ChannelEvent) {
        (**self).emit(event)
    }
}

impl<T: BytesBus + ?Sized> BytesBus for Arc<T> {
    fn publish(&self, msg: &[u8]) {
        (**self).publish(msg)
    }
}

/// Writes every event to the `tracing` log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, event: ChannelEvent) {
        tracing::info!(channel = ?event.channel_id(), ?event, "channel event");
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ChannelEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<ChannelEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventBus for EventLog {
    fn emit(&self, event: ChannelEvent) {
        self.events.lock().push(event);
    }
}
