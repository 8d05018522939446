use futures::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::common::{TransportCommand, TransportEvent};

use super::socketio::Packet;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CHANNEL_CAPACITY: usize = 64;

/// Both ends of one realtime connection as seen by the messaging channel.
pub struct TransportHandle {
    pub outbound: mpsc::Sender<TransportCommand>,
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// Opens realtime transports. Each call is one new connection.
pub trait Connector {
    fn connect(&self, token: &str) -> TransportHandle;
}

/// Socket.IO over WebSocket. `connect` must be called inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct SocketIoConnector {
    origin: String,
}

impl SocketIoConnector {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

impl Connector for SocketIoConnector {
    fn connect(&self, token: &str) -> TransportHandle {
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let endpoint = endpoint_url(&self.origin);
        let token = token.to_string();
        tokio::spawn(async move {
            let Some(endpoint) = endpoint else {
                let _ = event_tx
                    .send(TransportEvent::Disconnected("invalid realtime URL".into()))
                    .await;
                return;
            };
            match connect_async(endpoint.as_str()).await {
                Ok((ws, _)) => {
                    log::info!("Realtime socket opened at {endpoint}");
                    run_socket(ws, token, command_rx, event_tx).await;
                }
                Err(err) => {
                    log::warn!("Realtime connect to {endpoint} failed: {err}");
                    let _ = event_tx
                        .send(TransportEvent::Disconnected(err.to_string()))
                        .await;
                }
            }
        });

        TransportHandle {
            outbound: command_tx,
            inbound: event_rx,
        }
    }
}

/// `http://host:5000` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn endpoint_url(origin: &str) -> Option<Url> {
    let mut url = Url::parse(origin).ok()?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Some(url)
}

fn command_packet(command: TransportCommand) -> Option<Packet> {
    match command {
        TransportCommand::JoinChat { chat_id, user_id } => Some(Packet::event(
            "join_chat",
            json!({ "chat_id": chat_id, "user_id": user_id }),
        )),
        TransportCommand::SendMessage {
            chat_id,
            sender_id,
            content,
        } => Some(Packet::event(
            "send_message",
            json!({
                "chat_id": chat_id,
                "sender_id": sender_id,
                "content": content,
                "message_type": "text",
            }),
        )),
        TransportCommand::Close => None,
    }
}

async fn run_socket(
    ws: WsStream,
    token: String,
    mut commands: mpsc::Receiver<TransportCommand>,
    events: mpsc::Sender<TransportEvent>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let reason = loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break "channel dropped".to_string() };
                let Some(packet) = command_packet(command) else {
                    let _ = ws_tx.send(WsMessage::Text(Packet::Disconnect.encode().into())).await;
                    let _ = ws_tx.close().await;
                    break "closed by client".to_string();
                };
                if let Err(err) = ws_tx.send(WsMessage::Text(packet.encode().into())).await {
                    break err.to_string();
                }
            }
            frame = ws_rx.next() => {
                let text = match frame {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(_))) | None => break "server closed".to_string(),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => break err.to_string(),
                };
                let packet = match Packet::decode(text.as_str()) {
                    Ok(packet) => packet,
                    Err(err) => {
                        log::debug!("Ignoring realtime frame: {err}");
                        continue;
                    }
                };

                let reply = match packet {
                    Packet::Open(_) => Some(Packet::Connect(Some(json!({ "token": token })))),
                    Packet::Ping => Some(Packet::Pong),
                    Packet::Connect(_) => {
                        let _ = events.send(TransportEvent::Connected).await;
                        None
                    }
                    Packet::Event { name, data } => {
                        let _ = events.send(TransportEvent::Event { name, data }).await;
                        None
                    }
                    Packet::ConnectError(data) => {
                        let message = data
                            .get("message")
                            .and_then(|message| message.as_str())
                            .unwrap_or("connect error")
                            .to_string();
                        break message;
                    }
                    Packet::Disconnect | Packet::Close => break "server disconnect".to_string(),
                    Packet::Pong | Packet::Noop => None,
                };

                if let Some(reply) = reply {
                    if let Err(err) = ws_tx.send(WsMessage::Text(reply.encode().into())).await {
                        break err.to_string();
                    }
                }
            }
        }
    };

    log::info!("Realtime socket closed: {reason}");
    let _ = events.send(TransportEvent::Disconnected(reason)).await;
}
