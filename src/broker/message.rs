use serde::{Deserialize, Serialize};

pub type MessageId = u64;

/// Represents a published message in the Pub/Sub system.
///
/// Messages are created by [`Topic::append`](super::topic::Topic::append) and
/// never mutated afterwards.
///
/// # Fields
///
/// - `id` - Position of the message in its topic's log. The first message of
///   a topic has id 1 and ids have no gaps.
/// - `topic` - The name of the topic this message belongs to.
/// - `data` - The payload, passed through untouched.
/// - `timestamp` - Milliseconds since the UNIX epoch when the message was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub topic: String,
    pub data: String,
    pub timestamp: i64,
}
