pub mod engine;
pub mod message;
pub mod subscriber;
pub mod topic;

pub use engine::{Broker, SharedTopic};
pub use message::{Message, MessageId};
pub use subscriber::{Subscriber, SubscriberId, SubscriberRef, SubscriberRegistry};
pub use topic::{Topic, TopicDescriptor};
