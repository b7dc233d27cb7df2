//! Error type shared by every layer of the protocol.
//!
//! Variants carry only public facts (roles, timestamps, lengths). Key
//! material and exponents never appear in an error.

use thiserror::Error;

/// Failures surfaced by [`crate::Protocol`] and the layers beneath it.
///
/// None of these are retryable: a failed handshake must be restarted on a
/// fresh instance, and a rejected application message is treated as lost.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),
    #[error("handshake message failed authentication")]
    AuthenticationFailure,
    #[error("unexpected role tag: expected {expected}, got {actual:?}")]
    ProtocolTagMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("handshake response out of order: expected timestamp {expected}, got {actual}")]
    ReplayOrOrdering { expected: i64, actual: i64 },
    #[error("handshake initiation is stale: timestamp {timestamp} older than {oldest_accepted}")]
    Freshness {
        timestamp: i64,
        oldest_accepted: i64,
    },
    #[error("application message failed integrity check")]
    Integrity,
    #[error("malformed message: {0}")]
    Malformed(&'static str),
    #[error("peer public value is outside the group range")]
    InvalidPublicValue,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
