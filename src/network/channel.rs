use std::collections::VecDeque;

use serde_json::Value;
use tokio::sync::mpsc::error::TryRecvError;

use crate::common::{
    ChannelEvent, Conversation, Id, Message, Session, TransportCommand, TransportEvent,
};
use crate::error::{Error, FieldError, Result};

use super::transport::{Connector, TransportHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Bounded FIFO that drops the oldest event once full.
#[derive(Debug)]
pub struct EventQueue {
    capacity: usize,
    events: VecDeque<ChannelEvent>,
    dropped: u64,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: ChannelEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<ChannelEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// The single realtime connection of a session, plus the open conversation
/// and the conversation list whose unread counters it keeps current.
pub struct MessagingChannel<C: Connector> {
    connector: C,
    state: ChannelState,
    transport: Option<TransportHandle>,
    user_id: Option<Id>,
    open_chat: Option<Id>,
    messages: Vec<Message>,
    conversations: Vec<Conversation>,
    events: EventQueue,
    transports_opened: usize,
}

impl<C: Connector> MessagingChannel<C> {
    pub fn new(connector: C, event_capacity: usize) -> Self {
        Self {
            connector,
            state: ChannelState::Disconnected,
            transport: None,
            user_id: None,
            open_chat: None,
            messages: Vec::new(),
            conversations: Vec::new(),
            events: EventQueue::new(event_capacity),
            transports_opened: 0,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ChannelState::Connected
    }

    /// Starts connecting. Does nothing unless currently disconnected.
    pub fn open(&mut self, session: &Session) -> Result<()> {
        if self.state != ChannelState::Disconnected {
            log::debug!("Channel already {:?}; open() ignored", self.state);
            return Ok(());
        }
        if session.token.is_empty() {
            return Err(Error::Auth("sessão sem token".to_string()));
        }

        self.transport = Some(self.connector.connect(&session.token));
        self.transports_opened += 1;
        self.user_id = Some(session.user.id.clone());
        self.state = ChannelState::Connecting;
        log::info!("Opening realtime channel for user {}", session.user.id);
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            let _ = transport.outbound.try_send(TransportCommand::Close);
        }
        if self.state != ChannelState::Disconnected {
            log::info!("Realtime channel closed");
            self.state = ChannelState::Disconnected;
            self.events.push(ChannelEvent::Disconnected);
        }
        self.user_id = None;
    }

    /// Makes `chat_id` the open conversation. The join intent is only sent
    /// while connected; otherwise it goes out on the next connect ack.
    pub fn join_conversation(&mut self, chat_id: Id) {
        if let Some(conversation) = self.conversation_mut(&chat_id) {
            conversation.unread_count = 0;
        }
        self.messages.clear();
        self.open_chat = Some(chat_id);
        if self.is_connected() {
            self.send_join();
        }
    }

    pub fn leave_conversation(&mut self) {
        self.open_chat = None;
        self.messages.clear();
    }

    pub fn open_conversation(&self) -> Option<&Id> {
        self.open_chat.as_ref()
    }

    /// Replaces the open conversation's history with the server's copy.
    pub fn load_history(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn send_message(&mut self, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "message",
                "Digite uma mensagem.",
            )]));
        }
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let (Some(chat_id), Some(sender_id), Some(transport)) =
            (&self.open_chat, &self.user_id, &self.transport)
        else {
            return Err(Error::NotConnected);
        };

        transport
            .outbound
            .try_send(TransportCommand::SendMessage {
                chat_id: chat_id.clone(),
                sender_id: sender_id.clone(),
                content: content.to_string(),
            })
            .map_err(|err| {
                log::warn!("Outbound message not queued: {err}");
                Error::NotConnected
            })
    }

    /// Applies every transport event already waiting, without blocking.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(transport) = self.transport.as_mut() else {
                break;
            };
            match transport.inbound.try_recv() {
                Ok(event) => {
                    self.handle_transport_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.handle_transport_event(TransportEvent::Disconnected(
                        "transport task ended".to_string(),
                    ));
                    handled += 1;
                    break;
                }
            }
        }
        handled
    }

    /// Waits for the next transport event and applies it. Returns `false`
    /// when there is no transport to wait on.
    pub async fn wait_for_activity(&mut self) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };
        let event = transport
            .inbound
            .recv()
            .await
            .unwrap_or_else(|| TransportEvent::Disconnected("transport task ended".to_string()));
        self.handle_transport_event(event);
        true
    }

    pub fn drain_events(&mut self) -> Vec<ChannelEvent> {
        self.events.drain()
    }

    pub fn dropped_events(&self) -> u64 {
        self.events.dropped()
    }

    pub fn transports_opened(&self) -> usize {
        self.transports_opened
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                if self.state == ChannelState::Connecting {
                    log::info!("Realtime channel connected");
                    self.state = ChannelState::Connected;
                    self.events.push(ChannelEvent::Connected);
                    if self.open_chat.is_some() {
                        self.send_join();
                    }
                }
            }
            TransportEvent::Disconnected(reason) => {
                log::info!("Realtime channel dropped: {reason}");
                self.transport = None;
                if self.state != ChannelState::Disconnected {
                    self.state = ChannelState::Disconnected;
                    self.events.push(ChannelEvent::Disconnected);
                }
            }
            TransportEvent::Event { name, data } => self.handle_server_event(&name, data),
        }
    }

    fn handle_server_event(&mut self, name: &str, data: Value) {
        match name {
            "connection_status" => {
                let status = text_field(&data, &["status", "message"]).unwrap_or_default();
                self.events.push(ChannelEvent::ConnectionStatus(status));
            }
            "new_message" => match serde_json::from_value::<Message>(data) {
                Ok(message) => self.handle_new_message(message),
                Err(err) => log::warn!("Malformed new_message event: {err}"),
            },
            "user_joined" => {
                let user = data
                    .get("user_id")
                    .cloned()
                    .and_then(|id| serde_json::from_value::<Id>(id).ok());
                if let Some(user) = user {
                    self.events.push(ChannelEvent::UserJoined(user));
                }
            }
            "error" => {
                let message = text_field(&data, &["message", "error"])
                    .unwrap_or_else(|| "Erro desconhecido".to_string());
                log::warn!("Realtime server error: {message}");
                self.events.push(ChannelEvent::ServerError(message));
            }
            other => log::debug!("Unhandled realtime event {other}"),
        }
    }

    fn handle_new_message(&mut self, message: Message) {
        if let Some(conversation) = self.conversation_mut(&message.chat_id) {
            conversation.last_message = Some(message.content.clone());
            conversation.last_message_at = message.created_at.clone();
        }

        if self.open_chat.as_ref() == Some(&message.chat_id) {
            self.messages.push(message.clone());
            self.events.push(ChannelEvent::MessageAppended(message));
            return;
        }

        let unread_count = match self.conversation_mut(&message.chat_id) {
            Some(conversation) => {
                conversation.unread_count += 1;
                conversation.unread_count
            }
            None => 1,
        };
        self.events.push(ChannelEvent::UnreadChanged {
            chat_id: message.chat_id,
            unread_count,
        });
    }

    fn send_join(&self) {
        let (Some(chat_id), Some(user_id), Some(transport)) =
            (&self.open_chat, &self.user_id, &self.transport)
        else {
            return;
        };
        let command = TransportCommand::JoinChat {
            chat_id: chat_id.clone(),
            user_id: user_id.clone(),
        };
        if let Err(err) = transport.outbound.try_send(command) {
            log::warn!("Join intent not queued: {err}");
        }
    }

    fn conversation_mut(&mut self, chat_id: &Id) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| &conversation.id == chat_id)
    }
}

fn text_field(data: &Value, keys: &[&str]) -> Option<String> {
    if let Some(text) = data.as_str() {
        return Some(text.to_string());
    }
    keys.iter()
        .find_map(|key| data.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
