use crate::broker::Broker;
use crate::transport::message::{Call, Reply};
use crate::utils::Result;

/// Run one call against the broker.
pub fn dispatch(broker: &Broker, call: Call) -> Result<Reply> {
    let reply = match call {
        Call::CreateTopic { name } => {
            let topic = broker.create_topic(&name)?;
            let descriptor = topic.lock().descriptor();
            Reply::Topic(descriptor)
        }
        Call::GetTopicNames => Reply::TopicNames(broker.list_topic_names()),
        Call::TopicExists { name } => Reply::Bool(broker.topic_exists(&name)),
        Call::Subscribe { topic, address } => Reply::Subscriber(broker.subscribe(&topic, &address)?),
        Call::Unsubscribe {
            topic,
            subscriber_id,
        } => {
            broker.unsubscribe(&topic, subscriber_id)?;
            Reply::Unit
        }
        Call::Publish { topic, payload } => Reply::Message(broker.publish(&topic, &payload)?),
        Call::GetMessages {
            topic,
            subscriber_id,
            commit,
        } => Reply::Messages(broker.get_messages(&topic, subscriber_id, commit)?),
        Call::HasMessages {
            topic,
            subscriber_id,
        } => Reply::Bool(broker.has_messages(&topic, subscriber_id)?),
        Call::HasAnyMessages { subscriber_id } => Reply::Bool(broker.has_any_messages(subscriber_id)),
    };
    Ok(reply)
}
