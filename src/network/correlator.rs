//! Request Correlator
//!
//! Matches the one in-flight command to whatever the transport delivers
//! next: a response chunk, a transport error, or the close of the
//! connection.
//!
//! The wire protocol is strictly request-then-response with a single
//! exchange outstanding, so the correlator holds exactly one
//! pending-request slot. Serializing senders so the slot is never
//! overwritten happens one level up, in
//! [`BloomClient`](crate::client::BloomClient).

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::error::{BloomError, Result};
use crate::protocol::Verb;

/// What the transport delivered for one exchange
#[derive(Debug)]
pub(crate) enum WireEvent {
    /// A raw response chunk
    Data(Bytes),

    /// A transport-level error
    Error(std::io::Error),

    /// The connection closed before a response arrived
    Closed,
}

/// One in-flight command awaiting its response
struct PendingRequest {
    /// Selects the parsing grammar once the response arrives
    verb: Verb,

    /// Resolves the caller blocked in [`ResponseHandle::wait`]
    tx: Sender<WireEvent>,

    /// When the command was written
    issued_at: Instant,
}

#[derive(Default)]
struct Slot {
    /// Once set, no further requests are accepted
    closed: bool,

    pending: Option<PendingRequest>,
}

/// Single-slot request/response correlator
#[derive(Default)]
pub(crate) struct Correlator {
    slot: Mutex<Slot>,
}

impl Correlator {
    /// Register a pending request and hand back its wait handle
    ///
    /// Fails once the connection has closed. The caller must hold the
    /// send turn: registering over an existing pending request would
    /// orphan it.
    pub(crate) fn register(this: &Arc<Self>, verb: Verb) -> Result<ResponseHandle> {
        let mut slot = this.slot.lock();
        if slot.closed {
            return Err(BloomError::NotConnected);
        }
        debug_assert!(
            slot.pending.is_none(),
            "request registered while another is pending"
        );

        let (tx, rx) = bounded(1);
        slot.pending = Some(PendingRequest {
            verb,
            tx,
            issued_at: Instant::now(),
        });

        Ok(ResponseHandle {
            rx,
            correlator: Arc::clone(this),
        })
    }

    /// Deliver a response chunk to the pending request
    ///
    /// Bytes arriving with nothing pending are dropped: the protocol has
    /// no channel state on which to report a desynchronization.
    pub(crate) fn deliver_data(&self, bytes: Bytes) {
        match self.slot.lock().pending.take() {
            Some(pending) => {
                tracing::trace!(
                    verb = %pending.verb,
                    len = bytes.len(),
                    elapsed = ?pending.issued_at.elapsed(),
                    "response delivered"
                );
                let _ = pending.tx.send(WireEvent::Data(bytes));
            }
            None => {
                tracing::warn!(len = bytes.len(), "discarding bytes with no request pending");
            }
        }
    }

    /// Deliver a transport error to the pending request
    pub(crate) fn deliver_error(&self, error: std::io::Error) {
        match self.slot.lock().pending.take() {
            Some(pending) => {
                let _ = pending.tx.send(WireEvent::Error(error));
            }
            None => {
                tracing::warn!(error = %error, "transport error with no request pending");
            }
        }
    }

    /// Mark the connection closed and fail anything still pending
    pub(crate) fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        if let Some(pending) = slot.pending.take() {
            let _ = pending.tx.send(WireEvent::Closed);
        }
    }

    /// Drop the pending request without resolving it
    ///
    /// Used when a write fails after registration, or a wait times out.
    /// A response arriving afterwards is discarded as orphaned.
    pub(crate) fn abandon(&self) {
        self.slot.lock().pending.take();
    }
}

/// Wait handle for one registered request
pub(crate) struct ResponseHandle {
    rx: Receiver<WireEvent>,
    correlator: Arc<Correlator>,
}

impl ResponseHandle {
    /// Block until the response, a transport error, or close
    ///
    /// With a deadline set, expiry clears the pending slot and fails
    /// with [`BloomError::Timeout`].
    pub(crate) fn wait(self, timeout: Option<Duration>) -> Result<Bytes> {
        let event = match timeout {
            Some(limit) => match self.rx.recv_timeout(limit) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    self.correlator.abandon();
                    return Err(BloomError::Timeout);
                }
                Err(RecvTimeoutError::Disconnected) => WireEvent::Closed,
            },
            None => self.rx.recv().unwrap_or(WireEvent::Closed),
        };

        match event {
            WireEvent::Data(bytes) => Ok(bytes),
            WireEvent::Error(error) => Err(BloomError::Io(error)),
            WireEvent::Closed => Err(BloomError::ConnectionClosed),
        }
    }
}
