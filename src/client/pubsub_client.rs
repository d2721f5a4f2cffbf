//! Remote client
//!
//! `RemoteBroker` talks to a running server over the WebSocket RPC protocol
//! and mirrors the broker's operations one-to-one. Calls are strictly
//! request/response: each method sends one `Request` and waits for the
//! `Response` carrying the same id. Responses left behind by a cancelled call
//! are discarded.
//!
//! Transport trouble of any sort (refused connection, reset socket, server
//! hanging up) surfaces as `BrokerError::ConnectionFailure`. Errors raised by
//! the remote broker come back as `BrokerError::Rejected` with their kind
//! intact, so callers can branch on `kind()` without caring which side failed.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::{Message, Subscriber, SubscriberId, TopicDescriptor};
use crate::transport::message::{Call, Reply, Request, Response};
use crate::utils::{BrokerError, Result};

pub struct RemoteBroker {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl std::fmt::Debug for RemoteBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBroker")
            .field("url", &self.url)
            .finish()
    }
}

impl RemoteBroker {
    /// Connect to a server, e.g. `ws://127.0.0.1:8000`.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| BrokerError::connection(url, e))?;
        debug!(url, "connected");
        Ok(Self {
            url: url.to_string(),
            stream,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn create_topic(&mut self, name: &str) -> Result<TopicDescriptor> {
        let call = Call::CreateTopic {
            name: name.to_string(),
        };
        match self.call(call).await? {
            Reply::Topic(descriptor) => Ok(descriptor),
            other => Err(self.unexpected("create_topic", &other)),
        }
    }

    pub async fn get_topic_names(&mut self) -> Result<Vec<String>> {
        match self.call(Call::GetTopicNames).await? {
            Reply::TopicNames(names) => Ok(names),
            other => Err(self.unexpected("get_topic_names", &other)),
        }
    }

    pub async fn topic_exists(&mut self, name: &str) -> Result<bool> {
        let call = Call::TopicExists {
            name: name.to_string(),
        };
        self.call_bool("topic_exists", call).await
    }

    pub async fn subscribe(&mut self, topic: &str, address: &str) -> Result<Subscriber> {
        let call = Call::Subscribe {
            topic: topic.to_string(),
            address: address.to_string(),
        };
        match self.call(call).await? {
            Reply::Subscriber(subscriber) => Ok(subscriber),
            other => Err(self.unexpected("subscribe", &other)),
        }
    }

    pub async fn unsubscribe(&mut self, topic: &str, subscriber_id: SubscriberId) -> Result<()> {
        let call = Call::Unsubscribe {
            topic: topic.to_string(),
            subscriber_id,
        };
        match self.call(call).await? {
            Reply::Unit => Ok(()),
            other => Err(self.unexpected("unsubscribe", &other)),
        }
    }

    pub async fn publish(&mut self, topic: &str, payload: &str) -> Result<Message> {
        let call = Call::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
        };
        match self.call(call).await? {
            Reply::Message(message) => Ok(message),
            other => Err(self.unexpected("publish", &other)),
        }
    }

    pub async fn get_messages(
        &mut self,
        topic: &str,
        subscriber_id: SubscriberId,
        commit: bool,
    ) -> Result<Vec<Message>> {
        let call = Call::GetMessages {
            topic: topic.to_string(),
            subscriber_id,
            commit,
        };
        match self.call(call).await? {
            Reply::Messages(messages) => Ok(messages),
            other => Err(self.unexpected("get_messages", &other)),
        }
    }

    pub async fn has_messages(&mut self, topic: &str, subscriber_id: SubscriberId) -> Result<bool> {
        let call = Call::HasMessages {
            topic: topic.to_string(),
            subscriber_id,
        };
        self.call_bool("has_messages", call).await
    }

    pub async fn has_any_messages(&mut self, subscriber_id: SubscriberId) -> Result<bool> {
        self.call_bool("has_any_messages", Call::HasAnyMessages { subscriber_id })
            .await
    }

    /// Close the connection politely.
    pub async fn close(mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| BrokerError::connection(&self.url, e))
    }

    async fn call_bool(&mut self, method: &str, call: Call) -> Result<bool> {
        match self.call(call).await? {
            Reply::Bool(value) => Ok(value),
            other => Err(self.unexpected(method, &other)),
        }
    }

    async fn call(&mut self, call: Call) -> Result<Reply> {
        let request = Request {
            id: Uuid::new_v4().to_string(),
            call,
        };
        let text = serde_json::to_string(&request).map_err(|e| BrokerError::MalformedRequest {
            reason: e.to_string(),
        })?;

        self.stream
            .send(WsMessage::text(text))
            .await
            .map_err(|e| BrokerError::connection(&self.url, e))?;

        // A call dropped after sending leaves its response queued; skip it.
        loop {
            let response = self.next_response().await?;
            if response.id == request.id {
                return response.result.map_err(BrokerError::from);
            }
            debug!(
                url = %self.url,
                stale = %response.id,
                expected = %request.id,
                "skipping response to an abandoned request"
            );
        }
    }

    async fn next_response(&mut self) -> Result<Response> {
        loop {
            let frame = match self.stream.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => return Err(BrokerError::connection(&self.url, e)),
                None => return Err(BrokerError::connection(&self.url, "connection closed")),
            };
            match frame {
                WsMessage::Text(text) => {
                    return serde_json::from_str(text.as_str()).map_err(|e| {
                        BrokerError::connection(&self.url, format!("undecodable response: {e}"))
                    });
                }
                WsMessage::Close(_) => {
                    return Err(BrokerError::connection(&self.url, "server closed the connection"));
                }
                _ => continue,
            }
        }
    }

    fn unexpected(&self, method: &str, reply: &Reply) -> BrokerError {
        BrokerError::connection(
            &self.url,
            format!("unexpected reply to {method}: {reply:?}"),
        )
    }
}
