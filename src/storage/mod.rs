pub mod database;
pub mod session_store;

pub use database::Database;
pub use session_store::{SessionLoad, SessionStore};
