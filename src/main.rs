//! NetRelay - Privileged HTTP Request Relay
//!
//! Entry point for the relay controller binary. Wires a caller channel to a
//! relay backed by the real network, submits one request from CLI arguments
//! and prints the terminal payload.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use netrelay::channel::{
    self, RequestBody, RequestConfig, RequestDescriptor, RequestOptions, TerminalPayload,
};
use netrelay::network::HttpFetcher;
use netrelay::{NAME, RequestRelay, VERSION};

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: netrelay <url> [method] [body]");
        std::process::exit(2);
    };
    let method = args.next();
    let body = args.next().map(RequestBody::Text).unwrap_or_default();

    log::info!("{} v{}", NAME, VERSION);

    let (mut caller, relay_side) = channel::pair();
    let relay = RequestRelay::new(Arc::new(HttpFetcher::new()), relay_side);
    tokio::spawn(relay.run());

    let options = match method {
        Some(method) => RequestOptions::Config(RequestConfig {
            method: Some(method),
            url,
        }),
        None => RequestOptions::Url(url),
    };
    let descriptor = RequestDescriptor {
        options,
        headers: HashMap::new(),
        body,
    };

    if let Err(e) = caller.submit(descriptor) {
        eprintln!("❌ Failed to submit request: {}", e);
        std::process::exit(1);
    }

    match caller.recv().await {
        Some(TerminalPayload::Success { body, .. }) => println!("{}", body),
        Some(TerminalPayload::Failure { error, .. }) => {
            eprintln!("❌ Request failed: {}", error);
            std::process::exit(1);
        }
        None => {
            eprintln!("❌ Relay shut down before replying");
            std::process::exit(1);
        }
    }
}
