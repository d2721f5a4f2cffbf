//! # PullSub
//!
//! `pullsub` is an in-memory publish/subscribe broker where subscribers pull.
//! Publishers append string payloads to named topics; each subscriber keeps a
//! cursor into its topic's log and asks for everything past it. Reading and
//! committing the cursor are separate steps, so a caller that fails to hand
//! messages on can simply read them again.
//!
//! ## Core Modules
//!
//! - `broker`: topics, subscribers, the message log and the delivery algorithm.
//! - `client`: `RemoteBroker`, the RPC client for a running server.
//! - `config`: loading server, broker and logging settings.
//! - `transport`: the JSON-over-WebSocket RPC protocol and server.
//! - `utils`: the error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use broker::Broker;
pub use client::RemoteBroker;
pub use utils::{BrokerError, ErrorKind, Result};
