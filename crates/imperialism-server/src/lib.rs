//! Imperialism session host
//!
//! Drives the turn engine without a graphical front end: a [`GameSession`]
//! consumes scripted [`imperialism_protocol::ClientIntent`]s and reports what
//! they did.

pub mod config;
pub mod session;

pub use config::ServerConfig;
pub use session::{GameSession, SessionAck, SessionError};
