//! Message channel between the sandboxed caller and the privileged relay
//!
//! The caller never touches the network: it submits `RequestDescriptor`s on
//! its endpoint and receives `TerminalPayload`s back. The relay consumes the
//! opposite endpoint. Transport isolation itself is the surrounding
//! component's responsibility; this module only fixes the message contract.

mod message;

pub use message::{
    ErrorInfo, RequestBody, RequestConfig, RequestDescriptor, RequestOptions, TerminalPayload,
};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::utils::{RelayError, Result};

/// Caller-side endpoint: submit requests, receive terminal payloads
pub struct CallerChannel {
    submits: UnboundedSender<RequestDescriptor>,
    terminals: UnboundedReceiver<TerminalPayload>,
}

impl CallerChannel {
    /// Submit a request descriptor (fire-and-forget)
    pub fn submit(&self, descriptor: RequestDescriptor) -> Result<()> {
        self.submits
            .send(descriptor)
            .map_err(|_| RelayError::ChannelClosed)
    }

    /// Receive the next terminal payload; `None` once the relay is gone
    pub async fn recv(&mut self) -> Option<TerminalPayload> {
        self.terminals.recv().await
    }

    /// Receive a terminal payload without waiting
    pub fn try_recv(&mut self) -> Option<TerminalPayload> {
        self.terminals.try_recv().ok()
    }
}

/// Relay-side endpoint: receive submissions, send terminal payloads
pub struct RelayChannel {
    pub(crate) submits: UnboundedReceiver<RequestDescriptor>,
    pub(crate) terminals: UnboundedSender<TerminalPayload>,
}

/// Create a connected caller/relay endpoint pair
pub fn pair() -> (CallerChannel, RelayChannel) {
    let (submit_tx, submit_rx) = mpsc::unbounded_channel();
    let (terminal_tx, terminal_rx) = mpsc::unbounded_channel();

    let caller = CallerChannel {
        submits: submit_tx,
        terminals: terminal_rx,
    };
    let relay = RelayChannel {
        submits: submit_rx,
        terminals: terminal_tx,
    };

    (caller, relay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_submit_recv() {
        let (caller, mut relay) = pair();
        caller
            .submit(RequestDescriptor::get("https://example.com"))
            .unwrap();

        let received = relay.submits.recv().await.unwrap();
        assert_eq!(received.options.url(), "https://example.com");
    }

    #[tokio::test]
    async fn test_terminal_roundtrip() {
        let (mut caller, relay) = pair();
        relay
            .terminals
            .send(TerminalPayload::success(1, "body"))
            .unwrap();

        let payload = caller.recv().await.unwrap();
        assert_eq!(payload, TerminalPayload::success(1, "body"));
    }

    #[test]
    fn test_try_recv_empty() {
        let (mut caller, _relay) = pair();
        assert!(caller.try_recv().is_none());
    }

    #[test]
    fn test_submit_after_relay_dropped() {
        let (caller, relay) = pair();
        drop(relay);

        let err = caller
            .submit(RequestDescriptor::get("https://example.com"))
            .unwrap_err();
        assert!(matches!(err, RelayError::ChannelClosed));
    }
}
