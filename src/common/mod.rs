pub mod commands;
pub mod events;
pub mod records;
pub mod types;

pub use commands::TransportCommand;
pub use events::{ChannelEvent, TransportEvent};
pub use types::{
    Conversation, Id, Message, ProfessionalListing, RegisterForm, Role, Session, User,
};
