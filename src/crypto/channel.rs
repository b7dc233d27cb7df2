//! Application message protection once session keys exist.
//!
//! AES-256-CTR for confidentiality, HMAC-MD5 over `nonce || ciphertext`
//! for integrity. Wire format: `nonce (8) || ciphertext || tag (16)`.
//! The counter block is the nonce followed by a 64-bit big-endian counter
//! starting at zero.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use md5::Md5;
use rand::{rngs::OsRng, RngCore};

use crate::crypto::SessionKeys;
use crate::error::{ProtocolError, ProtocolResult};

/// Application nonce length in bytes.
pub const APP_NONCE_LEN: usize = 8;
/// Application authentication tag length in bytes.
pub const APP_TAG_LEN: usize = 16;

type Aes256Ctr = ctr::Ctr64BE<Aes256>;
type HmacMd5 = Hmac<Md5>;

/// Encrypts and decrypts application payloads under established keys.
#[derive(Debug)]
pub struct SecureChannel {
    keys: SessionKeys,
}

impl SecureChannel {
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Encrypt under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> ProtocolResult<Vec<u8>> {
        let mut nonce = [0u8; APP_NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut wire = Vec::with_capacity(APP_NONCE_LEN + plaintext.len() + APP_TAG_LEN);
        wire.extend_from_slice(&nonce);
        wire.extend_from_slice(plaintext.as_bytes());
        self.apply_keystream(&nonce, &mut wire[APP_NONCE_LEN..])?;

        let tag = self.mac(&wire)?.finalize().into_bytes();
        wire.extend_from_slice(&tag);
        Ok(wire)
    }

    /// Verify the tag, then decrypt.
    pub fn decrypt(&self, wire: &[u8]) -> ProtocolResult<String> {
        if wire.len() < APP_NONCE_LEN + APP_TAG_LEN {
            return Err(ProtocolError::Malformed("application message shorter than nonce and tag"));
        }
        let (authenticated, tag) = wire.split_at(wire.len() - APP_TAG_LEN);
        self.mac(authenticated)?
            .verify_slice(tag)
            .map_err(|_| ProtocolError::Integrity)?;

        let (nonce, body) = authenticated.split_at(APP_NONCE_LEN);
        let mut plaintext = body.to_vec();
        self.apply_keystream(nonce, &mut plaintext)?;
        String::from_utf8(plaintext)
            .map_err(|_| ProtocolError::Malformed("application plaintext is not UTF-8"))
    }

    fn apply_keystream(&self, nonce: &[u8], buf: &mut [u8]) -> ProtocolResult<()> {
        let mut iv = [0u8; 16];
        iv[..APP_NONCE_LEN].copy_from_slice(nonce);
        let mut cipher = Aes256Ctr::new_from_slices(self.keys.encryption_key(), &iv)
            .map_err(|_| ProtocolError::PreconditionViolation("encryption key has wrong length"))?;
        cipher.apply_keystream(buf);
        Ok(())
    }

    fn mac(&self, data: &[u8]) -> ProtocolResult<HmacMd5> {
        let mut mac = <HmacMd5 as Mac>::new_from_slice(self.keys.integrity_key())
            .map_err(|_| ProtocolError::PreconditionViolation("integrity key has wrong length"))?;
        mac.update(data);
        Ok(mac)
    }
}
