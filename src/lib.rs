//! psk-channel: a two-party secure channel bootstrapped from a pre-shared passphrase.
//!
//! A client and a server that share a passphrase run a two-message
//! Diffie-Hellman handshake over the RFC 3526 2048-bit MODP group. Handshake
//! messages are sealed with AES-256-CCM under a key hashed from the
//! passphrase. Two independent exchanges yield an encryption key and an
//! integrity key, which then protect application messages with AES-256-CTR
//! and HMAC.
//!
//! ## Modules
//!
//! - `crypto` - group arithmetic, key derivation, ciphers
//! - `protocol` - handshake messages and the [`Protocol`] state machine
//! - `config` - tunables
//! - `clock` - time source for handshake timestamps
//! - `error` - [`ProtocolError`]
//!
//! ```no_run
//! use psk_channel::Protocol;
//!
//! # fn main() -> Result<(), psk_channel::ProtocolError> {
//! let mut client = Protocol::new();
//! let mut server = Protocol::new();
//! client.set_shared_secret("shared passphrase")?;
//! server.set_shared_secret("shared passphrase")?;
//!
//! let initiation = client.create_initiation_message()?;
//! let response = server.process_message(&initiation, false)?.expect("server replies");
//! client.process_message(&response, true)?;
//!
//! let wire = client.encrypt("hello")?;
//! assert_eq!(server.decrypt(&wire)?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;

pub use clock::{Clock, SystemClock};
pub use config::ProtocolConfig;
pub use error::{ProtocolError, ProtocolResult};
pub use protocol::{HandshakeMessage, Protocol, Role};
