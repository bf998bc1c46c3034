//! # NetRelay - Privileged HTTP Request Relay
//!
//! A privileged controller that performs network requests on behalf of an
//! isolated, lower-trust UI surface. The caller submits request descriptors
//! over a message channel; the relay issues the actual network call with
//! single-flight semantics — a new submission preemptively cancels the
//! in-flight one — accumulates the streamed response, and answers with
//! exactly one terminal payload per request that was not superseded.
//!
//! ## Architecture
//!
//! - **channel**: message channel and wire types between caller and relay
//! - **relay**: the single-flight state machine with preemptive cancellation
//! - **network**: network primitive streaming response chunks and errors
//! - **utils**: shared error types

pub mod channel;
pub mod network;
pub mod relay;
pub mod utils;

// Re-export main types for convenience
pub use relay::RequestRelay;
pub use utils::error::{RelayError, Result};

/// Relay version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "NetRelay";
