//! Single-flight request relay
//!
//! `RequestRelay` enforces the relay's core contract: at most one request is
//! in flight, a new submission cancels the previous one before its own
//! network operation starts, and every request that is not superseded
//! produces exactly one terminal payload. Superseded requests are observably
//! indistinguishable from requests that never happened.
//!
//! All relay state changes happen on one event-loop task, so the in-flight
//! slot has exactly one writer and needs no locking.

mod inflight;

pub use inflight::{FlightState, InFlight};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channel::{ErrorInfo, RelayChannel, RequestDescriptor, TerminalPayload};
use crate::network::{Fetch, FetchEvent};

/// The privileged controller relaying caller requests to the network
pub struct RequestRelay {
    fetcher: Arc<dyn Fetch>,
    channel: RelayChannel,
    /// The single in-flight slot; replaced, never merged, on each submission
    current: Option<InFlight>,
    next_id: u64,
}

impl RequestRelay {
    /// Create a relay over the given network primitive and channel endpoint
    pub fn new(fetcher: Arc<dyn Fetch>, channel: RelayChannel) -> Self {
        Self {
            fetcher,
            channel,
            current: None,
            next_id: 1,
        }
    }

    /// Run the relay event loop until the caller channel closes
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                submit = self.channel.submits.recv() => match submit {
                    Some(descriptor) => self.submit(descriptor),
                    None => break,
                },
                event = Self::next_event(&mut self.current) => self.handle_event(event),
            }
        }
        log::debug!("relay: caller channel closed, shutting down");
    }

    /// Await the next event of the current flight; pends forever while idle
    async fn next_event(current: &mut Option<InFlight>) -> FetchEvent {
        match current.as_mut() {
            Some(flight) => match flight.events.recv().await {
                Some(event) => event,
                // The fetch task died without sending a terminal event.
                None => FetchEvent::Failed(ErrorInfo::new(
                    "network operation terminated unexpectedly",
                )),
            },
            None => std::future::pending().await,
        }
    }

    /// Accept a descriptor: cancel the previous flight, start a new one
    fn submit(&mut self, descriptor: RequestDescriptor) {
        if let Some(mut previous) = self.current.take() {
            previous.cancel();
        }

        let id = self.next_id;
        self.next_id += 1;

        log::debug!(
            "relay: request {} {} {}",
            id,
            descriptor.options.method(),
            descriptor.options.url()
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        self.fetcher.start(descriptor, events_tx, cancel.clone());
        self.current = Some(InFlight::new(id, cancel, events_rx));
    }

    /// Apply one fetch event to the current flight
    fn handle_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Chunk(chunk) => {
                if let Some(flight) = self.current.as_mut() {
                    flight.push_chunk(chunk);
                }
            }
            FetchEvent::Completed => {
                if let Some(mut flight) = self.current.take() {
                    if let Some(payload) = flight.complete() {
                        self.emit(payload);
                    }
                }
            }
            FetchEvent::Failed(error) => {
                if let Some(mut flight) = self.current.take() {
                    if let Some(payload) = flight.fail(error) {
                        self.emit(payload);
                    }
                }
            }
        }
    }

    /// Forward a terminal payload to the caller
    fn emit(&self, payload: TerminalPayload) {
        log::debug!("relay: request {} done", payload.request_id());
        if self.channel.terminals.send(payload).is_err() {
            log::warn!("relay: caller gone, terminal payload dropped");
        }
    }
}
