//! The per-peer protocol state machine.
//!
//! ```text
//! Uninitialized --set_shared_secret--> SecretBound
//! SecretBound --create_initiation_message--> AwaitingResponse   (client)
//! AwaitingResponse --process_message(SRVR)--> Established      (client)
//! SecretBound --process_message(CLNT)--> Established           (server)
//! ```
//!
//! A call that does not fit the current state is rejected without touching
//! it. So is any message that fails authentication or validation.

use log::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ProtocolConfig;
use crate::crypto::{Ephemeral, HandshakeCipher, SecureChannel, SessionKeys, SharedSecret};
use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::message::{HandshakeMessage, Role};

enum State {
    Uninitialized,
    SecretBound(SharedSecret),
    AwaitingResponse {
        secret: SharedSecret,
        timestamp: i64,
        enc: Ephemeral,
        int: Ephemeral,
    },
    Established(SecureChannel),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Uninitialized => "uninitialized",
            State::SecretBound(_) => "secret-bound",
            State::AwaitingResponse { .. } => "awaiting-response",
            State::Established(_) => "established",
        }
    }
}

/// One side of a pre-shared-secret session with a single peer.
///
/// Not internally synchronized; every mutating call takes `&mut self`.
pub struct Protocol<C: Clock = SystemClock> {
    config: ProtocolConfig,
    clock: C,
    role: Option<Role>,
    state: State,
}

impl Protocol<SystemClock> {
    /// A session with default configuration and the system clock.
    pub fn new() -> Self {
        Self {
            config: ProtocolConfig::default(),
            clock: SystemClock,
            role: None,
            state: State::Uninitialized,
        }
    }

    pub fn with_config(config: ProtocolConfig) -> ProtocolResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for Protocol<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Protocol<C> {
    pub fn with_clock(config: ProtocolConfig, clock: C) -> ProtocolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            role: None,
            state: State::Uninitialized,
        })
    }

    /// Bind the pre-shared passphrase. Allowed exactly once.
    pub fn set_shared_secret(&mut self, passphrase: &str) -> ProtocolResult<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(ProtocolError::PreconditionViolation("shared secret already set"));
        }
        self.state = State::SecretBound(SharedSecret::from_passphrase(passphrase));
        debug!("shared secret bound");
        Ok(())
    }

    /// Build the client's opening handshake message.
    pub fn create_initiation_message(&mut self) -> ProtocolResult<Vec<u8>> {
        let secret = match &self.state {
            State::SecretBound(secret) => secret,
            State::Uninitialized => {
                return Err(ProtocolError::PreconditionViolation("shared secret not set"))
            }
            _ => return Err(ProtocolError::PreconditionViolation("handshake already started")),
        };

        let enc = Ephemeral::generate(self.config.exponent_bytes);
        let int = Ephemeral::generate(self.config.exponent_bytes);
        let timestamp = self.clock.now();
        let message =
            HandshakeMessage::new(Role::Client, timestamp, enc.public_value(), int.public_value());
        let wire = HandshakeCipher::new(secret)?.seal(message.encode().as_bytes())?;

        let secret = secret.clone();
        self.role = Some(Role::Client);
        self.state = State::AwaitingResponse {
            secret,
            timestamp,
            enc,
            int,
        };
        debug!("sent handshake initiation ({} bytes, timestamp {timestamp})", wire.len());
        Ok(wire)
    }

    /// Handle an incoming handshake message.
    ///
    /// As server (`is_client == false`) this accepts an initiation and returns
    /// the response to send back. As client it completes the handshake and
    /// returns `None`.
    pub fn process_message(
        &mut self,
        message: &[u8],
        is_client: bool,
    ) -> ProtocolResult<Option<Vec<u8>>> {
        let result = if is_client {
            self.complete_as_client(message).map(|()| None)
        } else {
            self.respond_as_server(message).map(Some)
        };
        if let Err(err) = &result {
            let role = if is_client { Role::Client } else { Role::Server };
            warn!(
                "{role} rejected handshake message in state {}: {err}",
                self.state.name()
            );
        }
        result
    }

    fn complete_as_client(&mut self, message: &[u8]) -> ProtocolResult<()> {
        let (secret, timestamp, enc, int) = match &self.state {
            State::AwaitingResponse {
                secret,
                timestamp,
                enc,
                int,
            } => (secret, *timestamp, enc, int),
            State::Uninitialized => {
                return Err(ProtocolError::PreconditionViolation("shared secret not set"))
            }
            State::SecretBound(_) => {
                return Err(ProtocolError::PreconditionViolation("no initiation outstanding"))
            }
            State::Established(_) => {
                return Err(ProtocolError::PreconditionViolation("handshake already complete"))
            }
        };

        let reply = HandshakeMessage::parse(&HandshakeCipher::new(secret)?.open(message)?)?;
        reply.expect_role(Role::Server)?;
        let expected = timestamp + 1;
        if reply.timestamp != expected {
            return Err(ProtocolError::ReplayOrOrdering {
                expected,
                actual: reply.timestamp,
            });
        }

        let keys = SessionKeys::derive(
            &enc.agree(&reply.partial_enc),
            &int.agree(&reply.partial_int),
        );
        self.install(keys);
        Ok(())
    }

    fn respond_as_server(&mut self, message: &[u8]) -> ProtocolResult<Vec<u8>> {
        let secret = match &self.state {
            State::SecretBound(secret) => secret,
            State::Uninitialized => {
                return Err(ProtocolError::PreconditionViolation("shared secret not set"))
            }
            State::AwaitingResponse { .. } => {
                return Err(ProtocolError::PreconditionViolation(
                    "client session cannot accept an initiation",
                ))
            }
            State::Established(_) => {
                return Err(ProtocolError::PreconditionViolation("handshake already complete"))
            }
        };

        let cipher = HandshakeCipher::new(secret)?;
        let initiation = HandshakeMessage::parse(&cipher.open(message)?)?;
        initiation.expect_role(Role::Client)?;

        // Stale initiations are refused; there is no upper bound.
        let oldest_accepted = self.clock.now() - self.config.freshness_window_secs;
        if initiation.timestamp < oldest_accepted {
            return Err(ProtocolError::Freshness {
                timestamp: initiation.timestamp,
                oldest_accepted,
            });
        }
        let reply_timestamp = initiation
            .timestamp
            .checked_add(1)
            .ok_or(ProtocolError::Malformed("handshake timestamp out of range"))?;

        let enc = Ephemeral::generate(self.config.exponent_bytes);
        let int = Ephemeral::generate(self.config.exponent_bytes);
        let reply = HandshakeMessage::new(
            Role::Server,
            reply_timestamp,
            enc.public_value(),
            int.public_value(),
        );
        let wire = cipher.seal(reply.encode().as_bytes())?;
        let keys = SessionKeys::derive(
            &enc.agree(&initiation.partial_enc),
            &int.agree(&initiation.partial_int),
        );

        self.role = Some(Role::Server);
        self.install(keys);
        Ok(wire)
    }

    /// Replace the handshake state with an established channel.
    ///
    /// Dropping the previous state zeroizes its exponents and secret.
    fn install(&mut self, keys: SessionKeys) {
        self.state = State::Established(SecureChannel::new(keys));
        debug!("session keys installed");
    }

    /// Protect an application message.
    pub fn encrypt(&self, plaintext: &str) -> ProtocolResult<Vec<u8>> {
        self.channel()?.encrypt(plaintext)
    }

    /// Verify and decrypt an application message.
    pub fn decrypt(&self, wire: &[u8]) -> ProtocolResult<String> {
        let result = self.channel()?.decrypt(wire);
        if let Err(err) = &result {
            warn!("dropped application message ({} bytes): {err}", wire.len());
        }
        result
    }

    /// Whether the handshake still has to run before application traffic.
    pub fn session_keys_needed(&self) -> bool {
        !matches!(self.state, State::Established(_))
    }

    /// The role this session took, once a handshake call has succeeded.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    fn channel(&self) -> ProtocolResult<&SecureChannel> {
        match &self.state {
            State::Established(channel) => Ok(channel),
            _ => Err(ProtocolError::PreconditionViolation("session keys not established")),
        }
    }
}

impl<C: Clock> std::fmt::Debug for Protocol<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("role", &self.role)
            .field("state", &self.state.name())
            .finish()
    }
}
