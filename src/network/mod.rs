//! Network stack for the relay
//!
//! The relay talks to the network exclusively through the `Fetch` trait;
//! `HttpFetcher` is the reqwest-backed production implementation.

mod fetch;

pub use fetch::{Fetch, FetchEvent, HttpFetcher};
