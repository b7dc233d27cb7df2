//! Handshake message plaintext.
//!
//! Layout (ASCII): `TAG || timestamp || "|" || partial_enc || "|" || partial_int`
//! where `TAG` is `CLNT` or `SRVR` and every number is decimal.

use num_bigint::BigUint;

use crate::crypto::parse_public_value;
use crate::error::{ProtocolError, ProtocolResult};

const TAG_LEN: usize = 4;

/// Which side of the handshake an instance plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    /// Four-byte tag prefixed to handshake plaintext.
    pub fn tag(self) -> &'static str {
        match self {
            Role::Client => "CLNT",
            Role::Server => "SRVR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// A decoded handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Role tag as received; checked separately so a mismatch can be reported.
    pub tag: String,
    pub timestamp: i64,
    pub partial_enc: BigUint,
    pub partial_int: BigUint,
}

impl HandshakeMessage {
    pub fn new(role: Role, timestamp: i64, partial_enc: BigUint, partial_int: BigUint) -> Self {
        Self {
            tag: role.tag().to_string(),
            timestamp,
            partial_enc,
            partial_int,
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{}|{}|{}",
            self.tag, self.timestamp, self.partial_enc, self.partial_int
        )
    }

    /// Decode plaintext produced by [`HandshakeMessage::encode`].
    ///
    /// Partial values are range-checked against the group.
    pub fn parse(plaintext: &[u8]) -> ProtocolResult<Self> {
        let text = std::str::from_utf8(plaintext)
            .map_err(|_| ProtocolError::Malformed("handshake plaintext is not UTF-8"))?;

        let mut fields = text.split('|');
        let head = fields.next().unwrap_or_default();
        let (enc, int) = match (fields.next(), fields.next(), fields.next()) {
            (Some(enc), Some(int), None) => (enc, int),
            _ => return Err(ProtocolError::Malformed("handshake plaintext needs three fields")),
        };

        let (tag, timestamp) = match (head.get(..TAG_LEN), head.get(TAG_LEN..)) {
            (Some(tag), Some(timestamp)) => (tag, timestamp),
            _ => return Err(ProtocolError::Malformed("handshake plaintext missing role tag")),
        };
        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| ProtocolError::Malformed("handshake timestamp is not an integer"))?;

        Ok(Self {
            tag: tag.to_string(),
            timestamp,
            partial_enc: parse_public_value(enc)?,
            partial_int: parse_public_value(int)?,
        })
    }

    /// Fail unless the tag names `role`.
    pub fn expect_role(&self, role: Role) -> ProtocolResult<()> {
        if self.tag != role.tag() {
            return Err(ProtocolError::ProtocolTagMismatch {
                expected: role.tag(),
                actual: self.tag.clone(),
            });
        }
        Ok(())
    }
}
