//! Minimal Socket.IO v5 / Engine.IO v4 text framing, default namespace only.

use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownType(String),
    #[error("bad packet payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event packet without a name")]
    MissingEventName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO handshake (`0{sid, pingInterval, ...}`).
    Open(Value),
    Close,
    Ping,
    Pong,
    /// `40`, optionally with the auth payload (client) or `{sid}` (server).
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(Value),
    Noop,
}

impl Packet {
    pub fn event(name: &str, data: Value) -> Self {
        Packet::Event {
            name: name.to_string(),
            data,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Packet::Open(data) => format!("0{data}"),
            Packet::Close => "1".to_string(),
            Packet::Ping => "2".to_string(),
            Packet::Pong => "3".to_string(),
            Packet::Connect(None) => "40".to_string(),
            Packet::Connect(Some(auth)) => format!("40{auth}"),
            Packet::Disconnect => "41".to_string(),
            Packet::Event { name, data } => format!("42{}", json!([name, data])),
            Packet::ConnectError(data) => format!("44{data}"),
            Packet::Noop => "6".to_string(),
        }
    }

    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let engine_type = chars.next().ok_or(PacketError::Empty)?;
        let rest = chars.as_str();

        match engine_type {
            '0' => Ok(Packet::Open(parse_or_null(rest)?)),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '4' => decode_socket(rest),
            '6' => Ok(Packet::Noop),
            _ => Err(PacketError::UnknownType(frame.chars().take(2).collect())),
        }
    }
}

fn decode_socket(body: &str) -> Result<Packet, PacketError> {
    let mut chars = body.chars();
    let socket_type = chars.next().ok_or(PacketError::Empty)?;
    // Ack ids are digits between the type and the payload; they are not used.
    let payload = chars.as_str().trim_start_matches(|c: char| c.is_ascii_digit());

    match socket_type {
        '0' => {
            let payload = parse_or_null(payload)?;
            Ok(Packet::Connect((!payload.is_null()).then_some(payload)))
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let mut items = match serde_json::from_str::<Value>(payload)? {
                Value::Array(items) => items.into_iter(),
                _ => return Err(PacketError::MissingEventName),
            };
            let name = match items.next() {
                Some(Value::String(name)) => name,
                _ => return Err(PacketError::MissingEventName),
            };
            let data = items.next().unwrap_or(Value::Null);
            Ok(Packet::Event { name, data })
        }
        '4' => Ok(Packet::ConnectError(parse_or_null(payload)?)),
        other => Err(PacketError::UnknownType(format!("4{other}"))),
    }
}

fn parse_or_null(payload: &str) -> Result<Value, serde_json::Error> {
    if payload.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_frames() {
        assert!(matches!(
            Packet::decode(r#"0{"sid":"abc","pingInterval":25000}"#).unwrap(),
            Packet::Open(_)
        ));
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
        assert_eq!(
            Packet::decode(r#"40{"sid":"x"}"#).unwrap(),
            Packet::Connect(Some(json!({"sid": "x"})))
        );
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert_eq!(
            Packet::decode(r#"44{"message":"unauthorized"}"#).unwrap(),
            Packet::ConnectError(json!({"message": "unauthorized"}))
        );
    }

    #[test]
    fn decodes_events_with_and_without_ack_id() {
        let expected = Packet::event("new_message", json!({"chat_id": 3}));
        assert_eq!(
            Packet::decode(r#"42["new_message",{"chat_id":3}]"#).unwrap(),
            expected
        );
        assert_eq!(
            Packet::decode(r#"4212["new_message",{"chat_id":3}]"#).unwrap(),
            expected
        );
        assert_eq!(
            Packet::decode(r#"42["disconnect"]"#).unwrap(),
            Packet::event("disconnect", Value::Null)
        );
    }

    #[test]
    fn encodes_client_frames() {
        assert_eq!(Packet::Pong.encode(), "3");
        assert_eq!(
            Packet::Connect(Some(json!({"token": "t"}))).encode(),
            r#"40{"token":"t"}"#
        );
        assert_eq!(
            Packet::event("join_chat", json!({"chat_id": "1"})).encode(),
            r#"42["join_chat",{"chat_id":"1"}]"#
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Packet::decode(""), Err(PacketError::Empty)));
        assert!(Packet::decode("9").is_err());
        assert!(Packet::decode("42{}").is_err());
        assert!(Packet::decode("42[1,2]").is_err());
    }
}
