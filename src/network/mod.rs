pub mod channel;
pub mod socketio;
pub mod transport;

pub use channel::{ChannelState, MessagingChannel};
pub use transport::{Connector, SocketIoConnector, TransportHandle};
