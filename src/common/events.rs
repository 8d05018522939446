use serde_json::Value;

use super::types::{Id, Message};

/// What the transport task reports back to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Server acknowledged the Socket.IO connect.
    Connected,
    Disconnected(String),
    /// Any `42["name", data]` packet.
    Event { name: String, data: Value },
}

/// Events the messaging channel surfaces to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    ConnectionStatus(String),
    /// Inbound message for the open conversation, already appended.
    MessageAppended(Message),
    /// Inbound message for another conversation; only its counters changed.
    UnreadChanged { chat_id: Id, unread_count: u32 },
    UserJoined(Id),
    ServerError(String),
}
