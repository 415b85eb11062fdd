use serde::{Deserialize, Serialize};

/// Identifies a widget's data subscription on the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub id: String,
    pub code: String,
}

impl SubscriptionKey {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self { id: id.into(), code: code.into() }
    }
}

/// Frame delivered by the data transport: either the literal `OK`
/// acknowledgment or a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMessage {
    pub body: String,
}

impl DataMessage {
    pub const ACK: &'static str = "OK";

    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn ack() -> Self {
        Self::new(Self::ACK)
    }

    pub fn is_ack(&self) -> bool {
        self.body == Self::ACK
    }
}

/// The data-subscription side of the transport. Replies are pushed back by the
/// host through `Screen::deliver_data`.
pub trait DataTransport {
    fn subscribe(&mut self, key: &SubscriptionKey);
    fn unsubscribe(&mut self, key: &SubscriptionKey);
    fn unsubscribe_by_client(&mut self, key: &SubscriptionKey);
}
