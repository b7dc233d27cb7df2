//! Session key derivation from the two raw DH shared values.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Encryption and integrity keys for application traffic.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    encryption: [u8; 32],
    integrity: [u8; 32],
}

impl SessionKeys {
    /// Hash each shared value independently.
    ///
    /// Input is the big-endian minimal encoding of the integer.
    pub fn derive(enc_shared: &BigUint, int_shared: &BigUint) -> Self {
        Self {
            encryption: hash_shared_value(enc_shared),
            integrity: hash_shared_value(int_shared),
        }
    }

    pub fn encryption_key(&self) -> &[u8; 32] {
        &self.encryption
    }

    pub fn integrity_key(&self) -> &[u8; 32] {
        &self.integrity
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("encryption", &"[REDACTED]")
            .field("integrity", &"[REDACTED]")
            .finish()
    }
}

fn hash_shared_value(value: &BigUint) -> [u8; 32] {
    let mut bytes = value.to_bytes_be();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    bytes.zeroize();
    hasher.finalize().into()
}
