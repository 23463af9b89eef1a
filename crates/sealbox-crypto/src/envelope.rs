//! Envelope framing and transport encoding
//!
//! Binary layout:
//! ```text
//! [16 bytes: salt][12 bytes: nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! Transport form is the standard base64 encoding of that layout, nothing
//! else — no version byte. A format change must go through
//! [`crate::KEY_CONTEXT`] instead of the layout.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{CryptoError, CryptoResult};
use crate::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// One encrypted unit: the salt and nonce needed to re-derive the key and
/// decrypt, plus the ciphertext with its trailing authentication tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the 16-byte tag appended (as the AEAD emits it).
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Minimum decoded size: salt + nonce + tag, i.e. an empty plaintext.
    /// Anything shorter cannot be a valid envelope.
    pub const MIN_LEN: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

    pub fn seal(salt: [u8; SALT_SIZE], nonce: [u8; NONCE_SIZE], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            nonce,
            ciphertext,
        }
    }

    /// Encode to the binary wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Encode to the base64 transport form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode from the binary wire layout.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < Self::MIN_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "envelope too short: {} bytes (minimum {})",
                bytes.len(),
                Self::MIN_LEN
            )));
        }

        let (salt_bytes, rest) = bytes.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            salt,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Decode from the base64 transport form.
    ///
    /// Fails closed: bad base64 or a too-short body is rejected before any
    /// key derivation runs.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
