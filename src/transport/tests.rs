use crate::broker::Broker;
use crate::transport::dispatch;
use crate::transport::message::{Call, Reply, Request, Response};
use crate::transport::websocket::handle_text;
use crate::utils::ErrorKind;
use serde_json::json;

const ADDR: &str = "http://localhost:8000/hook";

fn call(broker: &Broker, msg: serde_json::Value) -> Response {
    handle_text(broker, &msg.to_string())
}

#[test]
fn test_request_wire_shape() {
    let request = Request {
        id: "1".to_string(),
        call: Call::GetMessages {
            topic: "news".to_string(),
            subscriber_id: 3,
            commit: true,
        },
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "1",
            "call": {"method": "get_messages", "topic": "news", "subscriber_id": 3, "commit": true}
        })
    );

    let parsed: Request =
        serde_json::from_value(json!({"id": "2", "call": {"method": "get_topic_names"}})).unwrap();
    assert_eq!(parsed.call, Call::GetTopicNames);
    assert_eq!(parsed.call.method(), "get_topic_names");
}

#[test]
fn test_handle_create_topic() {
    let broker = Broker::default();
    let response = call(
        &broker,
        json!({"id": "a", "call": {"method": "create_topic", "name": "news"}}),
    );
    assert_eq!(response.id, "a");
    match response.result {
        Ok(Reply::Topic(descriptor)) => {
            assert_eq!(descriptor.name, "news");
            assert_eq!(descriptor.message_count, 0);
            assert_eq!(descriptor.subscriber_count, 0);
        }
        other => panic!("Expected a topic descriptor, got {other:?}"),
    }
    assert!(broker.topic_exists("news"));

    let again = call(
        &broker,
        json!({"id": "b", "call": {"method": "create_topic", "name": "news"}}),
    );
    let err = again.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
    assert!(err.message.contains("news"));
}

#[test]
fn test_handle_subscribe_publish_and_read() {
    let broker = Broker::default();

    let subscribed = call(
        &broker,
        json!({"id": "1", "call": {"method": "subscribe", "topic": "news", "address": ADDR}}),
    );
    let subscriber = match subscribed.result {
        Ok(Reply::Subscriber(s)) => s,
        other => panic!("Expected a subscriber, got {other:?}"),
    };

    let published = call(
        &broker,
        json!({"id": "2", "call": {"method": "publish", "topic": "news", "payload": "hello"}}),
    );
    assert!(matches!(published.result, Ok(Reply::Message(ref m)) if m.id == 1 && m.data == "hello"));

    let read = call(
        &broker,
        json!({"id": "3", "call": {
            "method": "get_messages", "topic": "news", "subscriber_id": subscriber.id, "commit": true
        }}),
    );
    match read.result {
        Ok(Reply::Messages(messages)) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].data, "hello");
        }
        other => panic!("Expected messages, got {other:?}"),
    }

    let pending = call(
        &broker,
        json!({"id": "4", "call": {"method": "has_any_messages", "subscriber_id": subscriber.id}}),
    );
    assert_eq!(pending.result, Ok(Reply::Bool(false)));
}

#[test]
fn test_handle_unsubscribe_unknown_topic() {
    let broker = Broker::default();
    let response = call(
        &broker,
        json!({"id": "x", "call": {"method": "unsubscribe", "topic": "nope", "subscriber_id": 1}}),
    );
    assert_eq!(response.result.unwrap_err().kind, ErrorKind::NotFound);
}

#[test]
fn test_handle_malformed_frames() {
    let broker = Broker::default();

    let garbage = handle_text(&broker, "not json at all");
    assert_eq!(garbage.id, "");
    assert_eq!(garbage.result.unwrap_err().kind, ErrorKind::InvalidArgument);

    let unknown = call(&broker, json!({"id": "k", "call": {"method": "drop_table"}}));
    assert_eq!(unknown.id, "k");
    assert_eq!(unknown.result.unwrap_err().kind, ErrorKind::InvalidArgument);
}

#[test]
fn test_dispatch_matches_broker_calls() {
    let broker = Broker::default();
    broker.create_topic("a").unwrap();

    assert_eq!(
        dispatch(&broker, Call::GetTopicNames).unwrap(),
        Reply::TopicNames(vec!["a".to_string()])
    );
    assert_eq!(
        dispatch(&broker, Call::TopicExists { name: "b".into() }).unwrap(),
        Reply::Bool(false)
    );
    let err = dispatch(
        &broker,
        Call::HasMessages {
            topic: "a".into(),
            subscriber_id: 1,
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_response_round_trips_through_json() {
    let broker = Broker::default();
    let response = call(
        &broker,
        json!({"id": "u", "call": {"method": "unsubscribe", "topic": "none", "subscriber_id": 4}}),
    );
    let text = serde_json::to_string(&response).unwrap();
    let decoded: Response = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, response);

    let unit = Response::new("v".into(), Ok(Reply::Unit));
    let text = serde_json::to_string(&unit).unwrap();
    assert_eq!(serde_json::from_str::<Response>(&text).unwrap(), unit);
}
