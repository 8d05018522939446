use chrono::{DateTime, Utc};

use crate::common::{Conversation, Id, Message, Role};

use super::format::{chat_time, escape_html, message_time};

pub fn render_conversations(chats: &[Conversation], viewer: Role, now: DateTime<Utc>) -> String {
    if chats.is_empty() {
        return concat!(
            r#"<div class="chat-list-empty"><i class="fas fa-comments"></i>"#,
            "<p>Nenhuma conversa</p>",
            r#"<button class="btn btn-sm btn-outline" data-action="new-chat">Iniciar conversa</button></div>"#
        )
        .to_string();
    }

    chats
        .iter()
        .map(|chat| {
            let unread = if chat.unread_count > 0 {
                format!(r#"<span class="unread-badge">{}</span>"#, chat.unread_count)
            } else {
                String::new()
            };
            format!(
                concat!(
                    r#"<div class="chat-list-item" data-chat-id="{id}">"#,
                    r#"<div class="chat-avatar"><i class="fas fa-user-circle"></i></div>"#,
                    r#"<div class="chat-info"><div class="chat-name">{name}</div>"#,
                    r#"<div class="chat-last-message">{last}</div></div>"#,
                    r#"<div class="chat-meta"><div class="chat-time">{time}</div>{unread}</div>"#,
                    "</div>"
                ),
                id = escape_html(&chat.id.0),
                name = escape_html(chat.participant_name(viewer)),
                last = escape_html(
                    chat.last_message
                        .as_deref()
                        .unwrap_or("Nenhuma mensagem ainda")
                ),
                time = chat_time(chat.last_message_at.as_deref(), now),
                unread = unread,
            )
        })
        .collect()
}

pub fn render_messages(messages: &[Message], viewer_id: &Id, now: DateTime<Utc>) -> String {
    if messages.is_empty() {
        return concat!(
            r#"<div class="chat-welcome"><i class="fas fa-comments"></i>"#,
            "<h3>Nenhuma mensagem ainda</h3>",
            "<p>Seja o primeiro a enviar uma mensagem!</p></div>"
        )
        .to_string();
    }
    messages
        .iter()
        .map(|message| render_message(message, viewer_id, now))
        .collect()
}

/// One bubble, `own` when sent by the viewer.
pub fn render_message(message: &Message, viewer_id: &Id, now: DateTime<Utc>) -> String {
    let class = if &message.sender_id == viewer_id {
        "message own"
    } else {
        "message other"
    };
    format!(
        r#"<div class="{class}"><div class="message-content"><div class="message-text">{text}</div><div class="message-time">{time}</div></div></div>"#,
        text = escape_html(&message.content),
        time = message_time(message.created_at.as_deref(), now),
    )
}
