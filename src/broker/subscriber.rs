//! Subscriber bookkeeping
//!
//! A `SubscriberRegistry` owns the subscribers of exactly one topic. Ids are
//! allocated sequentially from 1 and never handed out twice, even after the
//! subscriber holding them is removed.
//!
//! The registry does not validate addresses; the broker does that before a
//! subscriber gets this far.

use serde::{Deserialize, Serialize};

use crate::broker::message::MessageId;
use crate::utils::{BrokerError, Result};

pub type SubscriberId = u64;

/// A registered reader of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub address: String,
    /// Highest message id already delivered. Doubles as the read offset into
    /// the topic log.
    pub last_seen_id: MessageId,
}

/// Either a bare subscriber id or a subscriber value, resolved by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberRef {
    Id(SubscriberId),
    Subscriber(Subscriber),
}

impl SubscriberRef {
    /// Resolve anything convertible into a reference down to its id.
    pub fn resolve_id(subscriber: impl Into<SubscriberRef>) -> SubscriberId {
        let subscriber: SubscriberRef = subscriber.into();
        subscriber.id()
    }

    pub fn id(&self) -> SubscriberId {
        match self {
            SubscriberRef::Id(id) => *id,
            SubscriberRef::Subscriber(s) => s.id,
        }
    }
}

impl From<SubscriberId> for SubscriberRef {
    fn from(id: SubscriberId) -> Self {
        SubscriberRef::Id(id)
    }
}

impl From<Subscriber> for SubscriberRef {
    fn from(subscriber: Subscriber) -> Self {
        SubscriberRef::Subscriber(subscriber)
    }
}

impl From<&Subscriber> for SubscriberRef {
    fn from(subscriber: &Subscriber) -> Self {
        SubscriberRef::Subscriber(subscriber.clone())
    }
}

#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: Vec<Subscriber>,
    next_id: SubscriberId,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber under the next free id with its cursor at 0.
    pub fn create(&mut self, address: &str) -> &mut Subscriber {
        self.next_id += 1;
        let idx = self.subscribers.len();
        self.subscribers.push(Subscriber {
            id: self.next_id,
            address: address.to_string(),
            last_seen_id: 0,
        });
        &mut self.subscribers[idx]
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn remove(&mut self, subscriber: impl Into<SubscriberRef>) -> Option<Subscriber> {
        let id = SubscriberRef::resolve_id(subscriber);
        let idx = self.subscribers.iter().position(|s| s.id == id)?;
        Some(self.subscribers.remove(idx))
    }

    pub fn get(&self, id: SubscriberId) -> Option<&Subscriber> {
        self.subscribers.iter().find(|s| s.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SubscriberId) -> Option<&mut Subscriber> {
        self.subscribers.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, subscriber: impl Into<SubscriberRef>) -> bool {
        self.get(SubscriberRef::resolve_id(subscriber)).is_some()
    }

    /// First subscriber registered under `address`.
    pub fn find_by_address(&self, address: &str) -> Result<&Subscriber> {
        self.subscribers
            .iter()
            .find(|s| s.address == address)
            .ok_or_else(|| BrokerError::UnknownSubscriberAddress {
                address: address.to_string(),
            })
    }

    pub fn count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscribers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.subscribers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Subscriber> {
        self.subscribers.iter_mut()
    }
}
