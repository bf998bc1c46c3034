//! The single live network operation

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::channel::{ErrorInfo, TerminalPayload};
use crate::network::FetchEvent;

/// Lifecycle of one network operation
///
/// `Started -> Streaming -> {Completed | Failed | Superseded}`; no
/// transition leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    /// Request sent, no response data yet
    Started,
    /// At least one body chunk received
    Streaming,
    /// Body fully received and delivered
    Completed,
    /// Transport failure delivered
    Failed,
    /// Cancelled by a newer submission; emits nothing
    Superseded,
}

impl FlightState {
    /// Check whether the state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Superseded)
    }
}

/// The one in-flight request owned by the relay
///
/// Created at submit time, mutated only through its own event handling, and
/// dropped the moment it is superseded or reaches a terminal payload. At
/// most one instance exists at any time.
pub struct InFlight {
    id: u64,
    cancel: CancellationToken,
    pub(super) events: UnboundedReceiver<FetchEvent>,
    chunks: Vec<Bytes>,
    state: FlightState,
}

impl InFlight {
    pub(super) fn new(
        id: u64,
        cancel: CancellationToken,
        events: UnboundedReceiver<FetchEvent>,
    ) -> Self {
        Self {
            id,
            cancel,
            events,
            chunks: Vec::new(),
            state: FlightState::Started,
        }
    }

    /// Get the request id assigned at submit time
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> FlightState {
        self.state
    }

    /// Append a body chunk in delivery order; ignored once terminal
    pub(super) fn push_chunk(&mut self, chunk: Bytes) {
        if self.state.is_terminal() {
            return;
        }
        self.state = FlightState::Streaming;
        self.chunks.push(chunk);
    }

    /// Abort the network operation and mark the request superseded
    ///
    /// Idempotent: a no-op on an already-terminal request, so a late cancel
    /// can never produce a duplicate payload or a fault.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        log::debug!(
            "request {} superseded after {} chunks",
            self.id,
            self.chunks.len()
        );
        self.state = FlightState::Superseded;
        self.cancel.cancel();
    }

    /// Assemble the accumulated body into a success payload
    ///
    /// Returns `None` once terminal: a completed, failed or superseded
    /// request never yields a second payload.
    pub(super) fn complete(&mut self) -> Option<TerminalPayload> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = FlightState::Completed;
        Some(TerminalPayload::success(self.id, self.assemble()))
    }

    /// Convert a transport failure into a failure payload
    ///
    /// Returns `None` once terminal, like `complete`.
    pub(super) fn fail(&mut self, error: ErrorInfo) -> Option<TerminalPayload> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = FlightState::Failed;
        Some(TerminalPayload::failure(self.id, error))
    }

    /// Concatenate chunks in receipt order and decode as text
    fn assemble(&self) -> String {
        let mut buf = Vec::with_capacity(self.chunks.iter().map(Bytes::len).sum());
        for chunk in &self.chunks {
            buf.extend_from_slice(chunk);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
