//! The `error` module defines the error type returned by every broker
//! operation, on both sides of the transport.
//!
//! Each variant names the offending input and the rule it broke. Callers that
//! only care about the category match on [`BrokerError::kind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Coarse classification of a [`BrokerError`], shared with the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    ConnectionFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::NotFound => "not found",
            ErrorKind::ConnectionFailure => "connection failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("invalid topic name '{name}': {reason}")]
    InvalidTopicName { name: String, reason: String },

    #[error("invalid subscriber address '{address}': {reason}")]
    InvalidSubscriberAddress { address: String, reason: String },

    #[error("topic '{name}' already exists")]
    TopicAlreadyExists { name: String },

    #[error("topic '{name}' does not exist")]
    TopicNotFound { name: String },

    #[error("no subscriber {subscriber} on topic '{topic}'")]
    SubscriberNotFound { topic: String, subscriber: String },

    /// Raised by a bare registry, which does not know its topic.
    #[error("no subscriber with address '{address}'")]
    UnknownSubscriberAddress { address: String },

    #[error("malformed request: {reason}")]
    MalformedRequest { reason: String },

    /// Raised by the remote client only; the broker itself never fails this way.
    #[error("no connection to {endpoint}: {reason}")]
    ConnectionFailure { endpoint: String, reason: String },

    /// An error reported by a remote broker, rebuilt on the client side.
    #[error("{kind}: {message}")]
    Rejected { kind: ErrorKind, message: String },
}

impl BrokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTopicName { .. }
            | Self::InvalidSubscriberAddress { .. }
            | Self::MalformedRequest { .. } => ErrorKind::InvalidArgument,
            Self::TopicAlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::TopicNotFound { .. }
            | Self::SubscriberNotFound { .. }
            | Self::UnknownSubscriberAddress { .. } => ErrorKind::NotFound,
            Self::ConnectionFailure { .. } => ErrorKind::ConnectionFailure,
            Self::Rejected { kind, .. } => *kind,
        }
    }

    pub(crate) fn topic_not_found(name: &str) -> Self {
        Self::TopicNotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn connection(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Self::ConnectionFailure {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
