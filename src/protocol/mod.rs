//! Handshake engine and session state machine.
//!
//! `message` holds the handshake plaintext codec, `session` the
//! [`Protocol`] object that drives a handshake and then the secure channel.

mod message;
mod session;

pub use message::{HandshakeMessage, Role};
pub use session::Protocol;
