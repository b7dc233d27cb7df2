//! AES-256-CCM sealing for handshake messages.
//!
//! Wire format: `nonce (11) || ciphertext || tag (16)`.

use aes::Aes256;
use ccm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    consts::{U11, U16},
    Ccm,
};
use rand::{rngs::OsRng, RngCore};

use crate::crypto::SharedSecret;
use crate::error::{ProtocolError, ProtocolResult};

/// Handshake nonce length in bytes.
pub const HANDSHAKE_NONCE_LEN: usize = 11;
/// Handshake authentication tag length in bytes.
pub const HANDSHAKE_TAG_LEN: usize = 16;

type Aes256Ccm = Ccm<Aes256, U16, U11>;

/// Seals and opens handshake messages under the shared secret.
pub struct HandshakeCipher {
    cipher: Aes256Ccm,
}

impl HandshakeCipher {
    pub fn new(secret: &SharedSecret) -> ProtocolResult<Self> {
        let cipher = Aes256Ccm::new_from_slice(secret.as_bytes())
            .map_err(|_| ProtocolError::PreconditionViolation("shared secret has wrong length"))?;
        Ok(Self { cipher })
    }

    /// Encrypt under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> ProtocolResult<Vec<u8>> {
        let mut nonce = [0u8; HANDSHAKE_NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        self.seal_with_nonce(plaintext, &nonce)
    }

    /// Encrypt with a specific nonce.
    pub fn seal_with_nonce(
        &self,
        plaintext: &[u8],
        nonce: &[u8; HANDSHAKE_NONCE_LEN],
    ) -> ProtocolResult<Vec<u8>> {
        let sealed = self
            .cipher
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|_| ProtocolError::Malformed("handshake plaintext too long to seal"))?;

        let mut wire = Vec::with_capacity(HANDSHAKE_NONCE_LEN + sealed.len());
        wire.extend_from_slice(nonce);
        wire.extend_from_slice(&sealed);
        Ok(wire)
    }

    /// Split and verify a wire message, returning the plaintext.
    pub fn open(&self, wire: &[u8]) -> ProtocolResult<Vec<u8>> {
        if wire.len() < HANDSHAKE_NONCE_LEN + HANDSHAKE_TAG_LEN {
            return Err(ProtocolError::Malformed("handshake message shorter than nonce and tag"));
        }
        let (nonce, sealed) = wire.split_at(HANDSHAKE_NONCE_LEN);
        self.cipher
            .decrypt(GenericArray::from_slice(nonce), sealed)
            .map_err(|_| ProtocolError::AuthenticationFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(passphrase: &str) -> HandshakeCipher {
        HandshakeCipher::new(&SharedSecret::from_passphrase(passphrase)).unwrap()
    }

    #[test]
    fn test_seal_open() {
        let c = cipher("hunter2");
        let wire = c.seal(b"CLNT1700000000|5|7").unwrap();
        assert_eq!(wire.len(), HANDSHAKE_NONCE_LEN + 18 + HANDSHAKE_TAG_LEN);
        assert_eq!(c.open(&wire).unwrap(), b"CLNT1700000000|5|7");
    }

    #[test]
    fn test_wrong_secret_fails() {
        let wire = cipher("hunter2").seal(b"payload").unwrap();
        assert_eq!(
            cipher("hunter3").open(&wire),
            Err(ProtocolError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_every_flipped_byte_fails() {
        let c = cipher("hunter2");
        let wire = c.seal(b"SRVR1700000001|11|13").unwrap();
        for i in 0..wire.len() {
            let mut tampered = wire.clone();
            tampered[i] ^= 0x01;
            assert_eq!(c.open(&tampered), Err(ProtocolError::AuthenticationFailure));
        }
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let c = cipher("hunter2");
        let a = c.seal(b"same").unwrap();
        let b = c.seal(b"same").unwrap();
        assert_ne!(&a[..HANDSHAKE_NONCE_LEN], &b[..HANDSHAKE_NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_message_rejected() {
        let c = cipher("hunter2");
        assert!(matches!(
            c.open(&[0u8; HANDSHAKE_NONCE_LEN + HANDSHAKE_TAG_LEN - 1]),
            Err(ProtocolError::Malformed(_))
        ));
    }
}
