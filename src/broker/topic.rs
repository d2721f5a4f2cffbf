//! Topic management
//!
//! A `Topic` is an append-only message log plus the subscribers reading it.
//! Each subscriber carries a cursor (`last_seen_id`) that is used as an offset
//! into the log: ids start at 1 and have no gaps, so "the number of messages
//! delivered" and "the id of the last delivered message" are the same value.
//! `reset_log` is the only operation that shrinks the log and it rewinds every
//! cursor along with it, which keeps that equality intact.
//!
//! Concurrency note: `Topic` is not synchronized itself. The broker keeps each
//! topic behind its own mutex and holds it for the whole of every operation.

use serde::{Deserialize, Serialize};

use crate::broker::message::{Message, MessageId};
use crate::broker::subscriber::{Subscriber, SubscriberId, SubscriberRef, SubscriberRegistry};
use crate::utils::{BrokerError, Result};

/// Summary of a topic, as handed across the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDescriptor {
    pub name: String,
    pub message_count: usize,
    pub subscriber_count: usize,
}

#[derive(Debug)]
pub struct Topic {
    name: String,
    messages: Vec<Message>,
    next_id: MessageId,
    subscribers: SubscriberRegistry,
}

impl Topic {
    /// Create an empty topic. Name validation is the broker's job.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: Vec::new(),
            next_id: 0,
            subscribers: SubscriberRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a payload to the log under the next message id.
    pub fn append(&mut self, payload: &str) -> Message {
        let id = self.next_id + 1;
        self.next_id = id;
        let message = Message {
            id,
            topic: self.name.clone(),
            data: payload.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.messages.push(message.clone());
        message
    }

    /// Register a subscriber that only sees messages appended from now on.
    pub fn add_subscriber(&mut self, address: &str) -> Subscriber {
        let next_id = self.next_id;
        let subscriber = self.subscribers.create(address);
        subscriber.last_seen_id = next_id;
        subscriber.clone()
    }

    pub fn remove_subscriber(&mut self, subscriber: impl Into<SubscriberRef>) -> Option<Subscriber> {
        self.subscribers.remove(subscriber)
    }

    pub fn subscriber(&self, id: SubscriberId) -> Option<&Subscriber> {
        self.subscribers.get(id)
    }

    pub fn subscriber_by_address(&self, address: &str) -> Result<&Subscriber> {
        self.subscribers
            .find_by_address(address)
            .map_err(|_| BrokerError::SubscriberNotFound {
                topic: self.name.clone(),
                subscriber: format!("with address '{address}'"),
            })
    }

    pub fn subscribers(&self) -> impl Iterator<Item = &Subscriber> {
        self.subscribers.iter()
    }

    /// Messages after the subscriber's cursor. Does not move the cursor.
    pub fn read(&self, subscriber: &Subscriber) -> &[Message] {
        let offset = usize::try_from(subscriber.last_seen_id).unwrap_or(usize::MAX);
        self.messages.get(offset..).unwrap_or(&[])
    }

    /// Move a subscriber's cursor forward to `last_id`.
    ///
    /// Cursors never move backwards and never pass the newest message id; a
    /// request outside that range is clamped. Returns the resulting cursor,
    /// or `None` if the subscriber is not registered here.
    pub fn advance_cursor(&mut self, subscriber: SubscriberId, last_id: MessageId) -> Option<MessageId> {
        let ceiling = self.next_id;
        let entry = self.subscribers.get_mut(subscriber)?;
        let target = last_id.min(ceiling);
        if target > entry.last_seen_id {
            entry.last_seen_id = target;
        }
        Some(entry.last_seen_id)
    }

    pub fn has_unread(&self, subscriber: &Subscriber) -> bool {
        subscriber.last_seen_id < self.next_id
    }

    /// Drop every message and rewind all cursors to 0.
    ///
    /// The broker never resets a log by itself; this is the hook a retention
    /// policy would call.
    pub fn reset_log(&mut self) {
        self.messages.clear();
        self.next_id = 0;
        for subscriber in self.subscribers.iter_mut() {
            subscriber.last_seen_id = 0;
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.count()
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn latest_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Id of the newest message, 0 when the log is empty.
    pub fn last_id(&self) -> MessageId {
        self.next_id
    }

    pub fn descriptor(&self) -> TopicDescriptor {
        TopicDescriptor {
            name: self.name.clone(),
            message_count: self.message_count(),
            subscriber_count: self.subscriber_count(),
        }
    }
}
