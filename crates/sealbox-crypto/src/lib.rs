//! sealbox-crypto: stateless authenticated encryption core
//!
//! Pipeline per call: master secret + fresh 16-byte salt → HKDF-SHA256 →
//! single-use 256-bit key → ChaCha20-Poly1305 → `salt || nonce || ciphertext+tag`
//! → base64 for transport.
//!
//! Every encrypt and decrypt call derives its own key; keys are never cached,
//! never reused across calls, and are zeroized as soon as the call completes.
//! The master secret itself never leaves this crate's boundary.

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod payload;
pub mod service;

pub use envelope::Envelope;
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_envelope_key, EnvelopeKey};
pub use payload::FilePayload;
pub use service::{EncryptionService, ServiceStatus};

/// Size of a derived envelope key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the random per-envelope salt
pub const SALT_SIZE: usize = 16;

/// Size of a ChaCha20-Poly1305 nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Domain-separation context for envelope key derivation.
///
/// The envelope layout carries no version byte; if the format ever changes,
/// bump the version suffix here instead. Old and new envelopes then derive
/// different keys and fail authentication cleanly.
pub const KEY_CONTEXT: &[u8] = b"sealbox/envelope-key/v1";
