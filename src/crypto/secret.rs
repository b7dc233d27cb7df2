//! Passphrase binding.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key derived from the pre-shared passphrase.
///
/// Only ever used to seal handshake messages.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// SHA-256 of the UTF-8 passphrase.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = SharedSecret::from_passphrase("correct horse battery staple");
        let b = SharedSecret::from_passphrase("correct horse battery staple");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_passphrases() {
        let a = SharedSecret::from_passphrase("alpha");
        let b = SharedSecret::from_passphrase("beta");
        assert_ne!(a, b);
    }

    #[test]
    fn test_known_digest() {
        let secret = SharedSecret::from_passphrase("abc");
        assert_eq!(
            hex::encode(secret.as_bytes()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SharedSecret::from_passphrase("abc");
        assert_eq!(format!("{secret:?}"), "SharedSecret([REDACTED])");
    }
}
