//! Per-envelope key derivation: master secret + salt → HKDF-SHA256 → 256-bit key

use hkdf::Hkdf;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_CONTEXT, KEY_SIZE, SALT_SIZE};

/// A single-use 256-bit envelope key.
///
/// Derived fresh for every encrypt/decrypt call and zeroized on drop, so key
/// material never outlives the call that needed it.
pub struct EnvelopeKey {
    bytes: [u8; KEY_SIZE],
}

impl EnvelopeKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for EnvelopeKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the envelope key for one encrypt or decrypt call.
///
/// HKDF-SHA256 with the envelope salt as extractor salt, the master secret as
/// input keying material, and [`KEY_CONTEXT`] as the domain-separation info
/// string. Deterministic: decryption re-derives the identical key from the
/// salt recovered out of the envelope.
pub fn derive_envelope_key(
    master: &SecretString,
    salt: &[u8; SALT_SIZE],
) -> CryptoResult<EnvelopeKey> {
    if master.expose_secret().is_empty() {
        return Err(CryptoError::NotConfigured);
    }

    let hkdf = Hkdf::<Sha256>::new(Some(salt), master.expose_secret().as_bytes());
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(KEY_CONTEXT, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(format!("HKDF expand failed: {e}")))?;

    Ok(EnvelopeKey { bytes: okm })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_deterministic() {
        let master = SecretString::from("test-secret");
        let salt = [7u8; SALT_SIZE];

        let key1 = derive_envelope_key(&master, &salt).unwrap();
        let key2 = derive_envelope_key(&master, &salt).unwrap();

        assert_eq!(
            key1.as_bytes(),
            key2.as_bytes(),
            "derivation must be deterministic"
        );
    }

    #[test]
    fn test_derive_different_salts() {
        let master = SecretString::from("test-secret");

        let key1 = derive_envelope_key(&master, &[1u8; SALT_SIZE]).unwrap();
        let key2 = derive_envelope_key(&master, &[2u8; SALT_SIZE]).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different salts must produce independent keys"
        );
    }

    #[test]
    fn test_derive_different_secrets() {
        let salt = [9u8; SALT_SIZE];

        let key1 = derive_envelope_key(&SecretString::from("secret-a"), &salt).unwrap();
        let key2 = derive_envelope_key(&SecretString::from("secret-b"), &salt).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = derive_envelope_key(&SecretString::from(""), &[0u8; SALT_SIZE]);
        assert!(matches!(result, Err(CryptoError::NotConfigured)));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let key = derive_envelope_key(&SecretString::from("s"), &[0u8; SALT_SIZE]).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
    }
}
