use super::types::Id;

/// Outbound intents handed to the realtime transport task.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    /// `join_chat` with `{chat_id, user_id}`.
    JoinChat { chat_id: Id, user_id: Id },
    /// `send_message` with `{chat_id, sender_id, content, message_type}`.
    SendMessage {
        chat_id: Id,
        sender_id: Id,
        content: String,
    },
    /// Polite Socket.IO disconnect followed by closing the socket.
    Close,
}
