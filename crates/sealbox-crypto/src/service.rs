//! The encryption service: stateless operations over an immutable master secret
//!
//! Each operation is an independent, terminating transaction with three
//! outcomes: success, rejected input, or cryptographic/configuration failure.
//! Nothing persists between calls, so any number may run concurrently.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};

use crate::envelope::Envelope;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::derive_envelope_key;
use crate::payload::FilePayload;
use crate::{NONCE_SIZE, SALT_SIZE};

/// Availability report for one status query. Derived per query, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceStatus {
    /// True whenever the process answered at all.
    pub available: bool,
    /// True when a master secret was supplied at startup.
    pub configured: bool,
}

/// Stateless encryption service.
///
/// Holds only the master secret, read once at process start and immutable
/// thereafter. `None` means the deployment has no secret configured: status
/// queries still answer, crypto operations are rejected with
/// [`CryptoError::NotConfigured`].
pub struct EncryptionService {
    master: Option<SecretString>,
}

impl EncryptionService {
    pub fn new(master: Option<SecretString>) -> Self {
        // An empty secret is the same as an absent one.
        let master = master.filter(|m| !m.expose_secret().is_empty());
        Self { master }
    }

    /// Availability and configuration report. Never fails.
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            available: true,
            configured: self.master.is_some(),
        }
    }

    /// Encrypt a UTF-8 string into a base64 envelope.
    ///
    /// A fresh salt and nonce are drawn per call, so encrypting the same
    /// plaintext twice yields two unrelated envelopes.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidRequest(
                "plaintext must not be empty".into(),
            ));
        }
        let master = self.master.as_ref().ok_or(CryptoError::NotConfigured)?;

        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let key = derive_envelope_key(master, &salt)?;
        let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CryptoError::InvalidRequest("plaintext too large to encrypt".into()))?;

        Ok(Envelope::seal(salt, nonce_bytes, ciphertext).to_base64())
    }

    /// Decrypt a base64 envelope back into its string plaintext.
    ///
    /// Either returns verified-correct plaintext or fails; there is no third
    /// outcome. Tag mismatch, wrong key, and corrupted ciphertext all surface
    /// as [`CryptoError::AuthenticationFailed`].
    pub fn decrypt(&self, envelope_text: &str) -> CryptoResult<String> {
        if envelope_text.is_empty() {
            return Err(CryptoError::InvalidRequest(
                "envelope must not be empty".into(),
            ));
        }
        let master = self.master.as_ref().ok_or(CryptoError::NotConfigured)?;

        let envelope = Envelope::from_base64(envelope_text)?;
        let key = derive_envelope_key(master, &envelope.salt)?;
        let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&envelope.nonce),
                envelope.ciphertext.as_ref(),
            )
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        // The tag verified, so this is a payload-shape problem, not tampering.
        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::PayloadFormat("plaintext is not valid UTF-8".into()))
    }

    /// Encrypt a file payload. The payload is serialized to its textual
    /// representation and then handled exactly like [`Self::encrypt`].
    pub fn encrypt_file(&self, payload: &FilePayload) -> CryptoResult<String> {
        let plaintext = payload.encode()?;
        self.encrypt(&plaintext)
    }

    /// Decrypt an envelope produced by [`Self::encrypt_file`], recovering
    /// content, filename, and MIME type.
    pub fn decrypt_file(&self, envelope_text: &str) -> CryptoResult<FilePayload> {
        let plaintext = self.decrypt(envelope_text)?;
        FilePayload::decode(&plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TAG_SIZE;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn configured() -> EncryptionService {
        EncryptionService::new(Some(SecretString::from("test-secret")))
    }

    fn unconfigured() -> EncryptionService {
        EncryptionService::new(None)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let service = configured();

        let envelope = service.encrypt("hello world").unwrap();
        let plaintext = service.decrypt(&envelope).unwrap();

        assert_eq!(plaintext, "hello world");
    }

    #[test]
    fn test_envelope_size_hello_world() {
        let service = configured();
        let envelope = service.encrypt("hello world").unwrap();

        // salt (16) + nonce (12) + plaintext (11) + tag (16) = 55 bytes,
        // which base64-encodes to ceil(55/3)*4 = 76 characters
        assert_eq!(envelope.len(), 76);
        let decoded = STANDARD.decode(&envelope).unwrap();
        assert_eq!(decoded.len(), SALT_SIZE + NONCE_SIZE + 11 + TAG_SIZE);
    }

    #[test]
    fn test_encrypt_nondeterministic() {
        let service = configured();

        let a = service.encrypt("same plaintext").unwrap();
        let b = service.encrypt("same plaintext").unwrap();

        assert_ne!(a, b, "independent salt/nonce must yield distinct envelopes");
        assert_eq!(service.decrypt(&a).unwrap(), "same plaintext");
        assert_eq!(service.decrypt(&b).unwrap(), "same plaintext");
    }

    #[test]
    fn test_empty_plaintext_rejected() {
        let result = configured().encrypt("");
        assert!(matches!(result, Err(CryptoError::InvalidRequest(_))));
    }

    #[test]
    fn test_empty_envelope_rejected() {
        let result = configured().decrypt("");
        assert!(matches!(result, Err(CryptoError::InvalidRequest(_))));
    }

    #[test]
    fn test_non_base64_envelope_rejected() {
        let result = configured().decrypt("not-base64!!");
        assert!(matches!(result, Err(CryptoError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_short_envelope_rejected() {
        let short = STANDARD.encode([0u8; 27]);
        let result = configured().decrypt(&short);
        assert!(matches!(result, Err(CryptoError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let service = configured();
        let envelope = service.encrypt("secret data").unwrap();

        let mut bytes = STANDARD.decode(&envelope).unwrap();
        // Flip a byte past salt and nonce, inside ciphertext+tag
        let idx = SALT_SIZE + NONCE_SIZE + 3;
        bytes[idx] ^= 0xFF;

        let result = service.decrypt(&STANDARD.encode(&bytes));
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_salt_fails_authentication() {
        // A flipped salt byte derives a different key; the tag cannot verify
        let service = configured();
        let envelope = service.encrypt("secret data").unwrap();

        let mut bytes = STANDARD.decode(&envelope).unwrap();
        bytes[0] ^= 0x01;

        let result = service.decrypt(&STANDARD.encode(&bytes));
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_secret_fails_authentication() {
        let envelope = configured().encrypt("secret data").unwrap();

        let other = EncryptionService::new(Some(SecretString::from("other-secret")));
        let result = other.decrypt(&envelope);

        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_unconfigured_status() {
        let status = unconfigured().status();
        assert!(status.available);
        assert!(!status.configured);

        let status = configured().status();
        assert!(status.available);
        assert!(status.configured);
    }

    #[test]
    fn test_unconfigured_operations_rejected() {
        let service = unconfigured();

        assert!(matches!(
            service.encrypt("data"),
            Err(CryptoError::NotConfigured)
        ));
        assert!(matches!(
            service.decrypt("AAAA"),
            Err(CryptoError::NotConfigured)
        ));
    }

    #[test]
    fn test_empty_secret_counts_as_unconfigured() {
        let service = EncryptionService::new(Some(SecretString::from("")));
        assert!(!service.status().configured);
        assert!(matches!(
            service.encrypt("data"),
            Err(CryptoError::NotConfigured)
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let service = configured();
        let payload = FilePayload {
            content: (0u8..=255).cycle().take(4096).collect(),
            filename: "report 🎉.xlsx".into(),
            mime_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                .into(),
        };

        let envelope = service.encrypt_file(&payload).unwrap();
        let recovered = service.decrypt_file(&envelope).unwrap();

        assert_eq!(recovered, payload);
    }

    #[test]
    fn test_empty_file_content_allowed() {
        let service = configured();
        let payload = FilePayload {
            content: vec![],
            filename: "empty".into(),
            mime_type: "application/octet-stream".into(),
        };

        let recovered = service
            .decrypt_file(&service.encrypt_file(&payload).unwrap())
            .unwrap();
        assert_eq!(recovered, payload);
    }

    #[test]
    fn test_decrypt_file_of_text_envelope_rejected() {
        let service = configured();
        let envelope = service.encrypt("just a string, not a file").unwrap();

        let result = service.decrypt_file(&envelope);
        assert!(matches!(result, Err(CryptoError::PayloadFormat(_))));
    }
}
