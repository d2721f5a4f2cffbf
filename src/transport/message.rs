//! Wire protocol
//!
//! Every WebSocket text frame carries one JSON document. Clients send a
//! [`Request`] and get back exactly one [`Response`] with the same `id`.
//!
//! ```json
//! {"id":"7f0c…","call":{"method":"publish","topic":"news","payload":"hi"}}
//! {"id":"7f0c…","result":{"Ok":{"kind":"message","value":{"id":1,…}}}}
//! {"id":"7f0c…","result":{"Err":{"kind":"not_found","message":"topic 'news' does not exist"}}}
//! ```

use serde::{Deserialize, Serialize};

use crate::broker::{Message, Subscriber, SubscriberId, TopicDescriptor};
use crate::utils::{BrokerError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub call: Call,
}

/// One broker operation and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Call {
    CreateTopic {
        name: String,
    },
    GetTopicNames,
    TopicExists {
        name: String,
    },
    Subscribe {
        topic: String,
        address: String,
    },
    Unsubscribe {
        topic: String,
        subscriber_id: SubscriberId,
    },
    Publish {
        topic: String,
        payload: String,
    },
    GetMessages {
        topic: String,
        subscriber_id: SubscriberId,
        commit: bool,
    },
    HasMessages {
        topic: String,
        subscriber_id: SubscriberId,
    },
    HasAnyMessages {
        subscriber_id: SubscriberId,
    },
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::CreateTopic { .. } => "create_topic",
            Call::GetTopicNames => "get_topic_names",
            Call::TopicExists { .. } => "topic_exists",
            Call::Subscribe { .. } => "subscribe",
            Call::Unsubscribe { .. } => "unsubscribe",
            Call::Publish { .. } => "publish",
            Call::GetMessages { .. } => "get_messages",
            Call::HasMessages { .. } => "has_messages",
            Call::HasAnyMessages { .. } => "has_any_messages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Topic(TopicDescriptor),
    TopicNames(Vec<String>),
    Bool(bool),
    Subscriber(Subscriber),
    Message(Message),
    Messages(Vec<Message>),
    Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&BrokerError> for WireError {
    fn from(err: &BrokerError) -> Self {
        match err {
            // keep the remote text instead of nesting "kind: kind: …"
            BrokerError::Rejected { kind, message } => Self {
                kind: *kind,
                message: message.clone(),
            },
            other => Self {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

impl From<WireError> for BrokerError {
    fn from(err: WireError) -> Self {
        BrokerError::Rejected {
            kind: err.kind,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub result: Result<Reply, WireError>,
}

impl Response {
    pub fn new(id: String, result: Result<Reply, BrokerError>) -> Self {
        Self {
            id,
            result: result.map_err(|err| WireError::from(&err)),
        }
    }
}
