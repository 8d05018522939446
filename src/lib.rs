//! Client SDK for the TxunaJob services marketplace: session handling,
//! REST access, realtime chat over Socket.IO, dashboards and the markup
//! rendered from them.

pub mod api;
pub mod app;
pub mod auth;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod network;
pub mod notify;
pub mod storage;
pub mod view;

pub use app::App;
pub use error::{Error, Result};
