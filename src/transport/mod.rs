//! The `transport` module exposes the broker to remote callers.
//!
//! It defines the JSON request/response protocol and implements the
//! WebSocket server that decodes requests and routes them to the broker.

pub mod dispatch;
pub mod message;
pub mod websocket;

pub use dispatch::dispatch;
pub use message::{Call, Reply, Request, Response, WireError};
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
