//! The `client` module provides the remote side of the RPC protocol.
//!
//! `RemoteBroker` connects to a running server and exposes the same
//! operations as the in-process `Broker`, mapping transport failures to
//! `BrokerError::ConnectionFailure`.

pub mod pubsub_client;
pub use pubsub_client::RemoteBroker;
