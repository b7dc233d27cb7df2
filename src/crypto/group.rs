//! Finite-field Diffie-Hellman over the RFC 3526 2048-bit MODP group (group 14).
//!
//! Each party draws a fresh [`Ephemeral`] per exchange, sends `g^x mod p`
//! and raises the peer's value to `x` to reach the shared value.

use lazy_static::lazy_static;
use num_bigint::BigUint;
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ProtocolError, ProtocolResult};

/// RFC 3526 section 3 prime, big-endian hex.
const MODP_2048_PRIME_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

lazy_static! {
    /// Group modulus `p`.
    pub static ref PRIME: BigUint = BigUint::parse_bytes(MODP_2048_PRIME_HEX.as_bytes(), 16)
        .expect("RFC 3526 prime is valid hex");
    /// Group generator `g`.
    pub static ref GENERATOR: BigUint = BigUint::from(2u32);
}

/// A single-use private exponent.
///
/// Stored as raw big-endian bytes so it can be wiped; the bytes are zeroized
/// on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Ephemeral {
    exponent: Vec<u8>,
}

impl Ephemeral {
    /// Draw `len` bytes of exponent from the OS CSPRNG.
    pub fn generate(len: usize) -> Self {
        let mut exponent = vec![0u8; len];
        OsRng.fill_bytes(&mut exponent);
        Self { exponent }
    }

    /// The partial public value `g^x mod p`.
    pub fn public_value(&self) -> BigUint {
        GENERATOR.modpow(&self.to_biguint(), &PRIME)
    }

    /// Raise the peer's partial value to this exponent.
    ///
    /// The peer value must already have passed [`validate_public_value`].
    pub fn agree(&self, peer_public: &BigUint) -> BigUint {
        peer_public.modpow(&self.to_biguint(), &PRIME)
    }

    fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.exponent)
    }
}

impl std::fmt::Debug for Ephemeral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ephemeral")
            .field("exponent", &"[REDACTED]")
            .finish()
    }
}

/// Reject peer values outside `[2, p - 2]`.
///
/// `0`, `1` and `p - 1` confine the shared value to a trivial subgroup.
pub fn validate_public_value(value: &BigUint) -> ProtocolResult<()> {
    let two = BigUint::from(2u32);
    let upper = &*PRIME - &two;
    if *value < two || *value > upper {
        return Err(ProtocolError::InvalidPublicValue);
    }
    Ok(())
}

/// Parse a decimal partial value as carried in handshake plaintext.
pub fn parse_public_value(decimal: &str) -> ProtocolResult<BigUint> {
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::Malformed("partial value is not a decimal integer"));
    }
    let value = BigUint::parse_bytes(decimal.as_bytes(), 10)
        .ok_or(ProtocolError::Malformed("partial value is not a decimal integer"))?;
    validate_public_value(&value)?;
    Ok(value)
}
