//! Cryptographic building blocks for the handshake and the secure channel.
//!
//! - `secret` - passphrase to handshake key
//! - `group` - MODP group 14 Diffie-Hellman
//! - `kdf` - session keys from DH shared values
//! - `cipher` - AES-CCM sealing of handshake messages
//! - `channel` - AES-CTR + HMAC protection of application messages

mod secret;
mod group;
mod kdf;
mod cipher;
mod channel;

pub use secret::SharedSecret;
pub use group::{parse_public_value, validate_public_value, Ephemeral, GENERATOR, PRIME};
pub use kdf::SessionKeys;
pub use cipher::{HandshakeCipher, HANDSHAKE_NONCE_LEN, HANDSHAKE_TAG_LEN};
pub use channel::{SecureChannel, APP_NONCE_LEN, APP_TAG_LEN};
