//! Broker engine
//!
//! This module contains the in-memory broker responsible for:
//! - keeping the directory of topics by name
//! - validating topic names and subscriber addresses
//! - routing publish/subscribe/read requests to the right topic
//!
//! Concurrency and usage notes:
//! - The broker is shared as `Arc<Broker>`; every method takes `&self`.
//! - The topic directory sits behind one reader/writer lock and each topic
//!   behind its own mutex. The directory lock is released before a topic
//!   lock is taken, so the two never nest.
//! - A read with `commit` holds the topic mutex across both the read and the
//!   cursor update, so concurrent publishes cannot slip in between.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::broker::message::Message;
use crate::broker::subscriber::{Subscriber, SubscriberId, SubscriberRef};
use crate::broker::topic::Topic;
use crate::config::{BrokerSettings, SubscribePolicy};
use crate::utils::{BrokerError, Result};

pub type SharedTopic = Arc<Mutex<Topic>>;

#[derive(Debug, Default)]
struct TopicDirectory {
    topics: HashMap<String, SharedTopic>,
    // insertion order, for listing
    order: Vec<String>,
}

#[derive(Debug)]
pub struct Broker {
    directory: RwLock<TopicDirectory>,
    policy: SubscribePolicy,
    address_schemes: Vec<String>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::with_settings(&BrokerSettings::default())
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        Self {
            directory: RwLock::new(TopicDirectory::default()),
            policy: settings.subscribe_policy,
            address_schemes: settings.address_schemes.clone(),
        }
    }

    pub fn subscribe_policy(&self) -> SubscribePolicy {
        self.policy
    }

    /// Create an empty topic. Names must be non-empty ASCII alphanumerics.
    pub fn create_topic(&self, name: &str) -> Result<SharedTopic> {
        validate_topic_name(name)?;

        let mut directory = self.directory.write();
        if directory.topics.contains_key(name) {
            return Err(BrokerError::TopicAlreadyExists {
                name: name.to_string(),
            });
        }
        let topic = Arc::new(Mutex::new(Topic::new(name)));
        directory.topics.insert(name.to_string(), Arc::clone(&topic));
        directory.order.push(name.to_string());

        info!(topic = name, "topic created");
        Ok(topic)
    }

    pub fn get_topic(&self, name: &str) -> Result<SharedTopic> {
        self.directory
            .read()
            .topics
            .get(name)
            .cloned()
            .ok_or_else(|| BrokerError::topic_not_found(name))
    }

    pub fn topic_exists(&self, name: &str) -> bool {
        self.directory.read().topics.contains_key(name)
    }

    /// Topic names in creation order.
    pub fn list_topic_names(&self) -> Vec<String> {
        self.directory.read().order.clone()
    }

    /// Register `address` on a topic. The subscriber starts at the end of the
    /// log and only receives messages published after this call.
    ///
    /// Unknown topics are created or rejected according to the configured
    /// [`SubscribePolicy`].
    pub fn subscribe(&self, topic_name: &str, address: &str) -> Result<Subscriber> {
        self.validate_subscriber_address(address)?;

        let topic = match self.get_topic(topic_name) {
            Ok(topic) => topic,
            Err(err) if self.policy == SubscribePolicy::Strict => return Err(err),
            Err(_) => self.create_or_get_topic(topic_name)?,
        };

        let subscriber = topic.lock().add_subscriber(address);
        info!(
            topic = topic_name,
            subscriber = subscriber.id,
            address,
            cursor = subscriber.last_seen_id,
            "subscribed"
        );
        Ok(subscriber)
    }

    // Two callers may race to auto-create the same name; the loser uses the
    // winner's topic.
    fn create_or_get_topic(&self, name: &str) -> Result<SharedTopic> {
        match self.create_topic(name) {
            Ok(topic) => Ok(topic),
            Err(BrokerError::TopicAlreadyExists { .. }) => self.get_topic(name),
            Err(err) => Err(err),
        }
    }

    /// Remove a subscriber from a topic. Removing one that is already gone is
    /// not an error.
    pub fn unsubscribe(&self, topic_name: &str, subscriber: impl Into<SubscriberRef>) -> Result<()> {
        let topic = self.get_topic(topic_name)?;
        let subscriber: SubscriberRef = subscriber.into();
        let id = subscriber.id();
        match topic.lock().remove_subscriber(subscriber) {
            Some(_) => info!(topic = topic_name, subscriber = id, "unsubscribed"),
            None => debug!(topic = topic_name, subscriber = id, "unsubscribe of absent subscriber"),
        }
        Ok(())
    }

    /// Append a payload to an existing topic. Publishing never creates topics.
    pub fn publish(&self, topic_name: &str, payload: &str) -> Result<Message> {
        let topic = self.get_topic(topic_name)?;
        let message = topic.lock().append(payload);
        debug!(topic = topic_name, id = message.id, "published");
        Ok(message)
    }

    /// Everything the subscriber has not seen yet, oldest first.
    ///
    /// With `commit` the subscriber's cursor moves past the returned messages;
    /// without it the same messages are returned again on the next call. This
    /// lets a caller only commit once delivery to the subscriber succeeded.
    pub fn get_messages(
        &self,
        topic_name: &str,
        subscriber: impl Into<SubscriberRef>,
        commit: bool,
    ) -> Result<Vec<Message>> {
        let topic = self.get_topic(topic_name)?;
        let id = SubscriberRef::resolve_id(subscriber);

        let mut topic = topic.lock();
        let current = topic
            .subscriber(id)
            .cloned()
            .ok_or_else(|| subscriber_not_found(topic_name, id))?;
        let messages = topic.read(&current).to_vec();

        if commit {
            if let Some(last) = messages.last() {
                topic.advance_cursor(id, last.id);
            }
        }

        debug!(
            topic = topic_name,
            subscriber = id,
            count = messages.len(),
            commit,
            "messages read"
        );
        Ok(messages)
    }

    pub fn has_messages(&self, topic_name: &str, subscriber: impl Into<SubscriberRef>) -> Result<bool> {
        let topic = self.get_topic(topic_name)?;
        let id = SubscriberRef::resolve_id(subscriber);

        let topic = topic.lock();
        let current = topic
            .subscriber(id)
            .ok_or_else(|| subscriber_not_found(topic_name, id))?;
        Ok(topic.has_unread(current))
    }

    /// Whether any topic holds unread messages for a subscriber with this id.
    ///
    /// Subscriber ids are allocated per topic, so the same id on two topics
    /// usually belongs to two different subscribers. Prefer
    /// [`Broker::has_any_messages_for_address`] when the address is known.
    pub fn has_any_messages(&self, subscriber: SubscriberId) -> bool {
        self.snapshot_topics().iter().any(|topic| {
            let topic = topic.lock();
            topic
                .subscriber(subscriber)
                .is_some_and(|s| topic.has_unread(s))
        })
    }

    /// Whether any subscription registered under `address` has unread messages.
    pub fn has_any_messages_for_address(&self, address: &str) -> bool {
        self.snapshot_topics().iter().any(|topic| {
            let topic = topic.lock();
            topic
                .subscribers()
                .filter(|s| s.address == address)
                .any(|s| topic.has_unread(s))
        })
    }

    /// Clear a topic's log and rewind all of its cursors.
    pub fn reset_topic(&self, topic_name: &str) -> Result<()> {
        let topic = self.get_topic(topic_name)?;
        topic.lock().reset_log();
        info!(topic = topic_name, "topic log reset");
        Ok(())
    }

    fn snapshot_topics(&self) -> Vec<SharedTopic> {
        self.directory.read().topics.values().cloned().collect()
    }

    fn validate_subscriber_address(&self, address: &str) -> Result<()> {
        if address.is_empty() {
            return Err(BrokerError::InvalidSubscriberAddress {
                address: address.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !self
            .address_schemes
            .iter()
            .any(|scheme| address.starts_with(scheme.as_str()))
        {
            return Err(BrokerError::InvalidSubscriberAddress {
                address: address.to_string(),
                reason: format!("must start with one of {}", self.address_schemes.join(", ")),
            });
        }
        Ok(())
    }
}

fn validate_topic_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BrokerError::InvalidTopicName {
            name: name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BrokerError::InvalidTopicName {
            name: name.to_string(),
            reason: "must contain only ASCII letters and digits".to_string(),
        });
    }
    Ok(())
}

fn subscriber_not_found(topic: &str, id: SubscriberId) -> BrokerError {
    BrokerError::SubscriberNotFound {
        topic: topic.to_string(),
        subscriber: id.to_string(),
    }
}
