//! File payload codec: {content, filename, mimeType} ⇄ JSON text
//!
//! Files flow through the same string-oriented encrypt/decrypt primitives as
//! plain text. This codec is the lossless bridge: content is base64 inside a
//! JSON object, so arbitrary filenames, MIME strings, and binary content
//! survive round-trip with no delimiter collisions.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// A file to encrypt, or a file recovered by decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePayload {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Wire representation of a file payload inside the plaintext.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    content: String,
    filename: String,
    mime_type: String,
}

impl FilePayload {
    /// Serialize to the plaintext representation handed to encrypt.
    pub fn encode(&self) -> CryptoResult<String> {
        let wire = WirePayload {
            content: STANDARD.encode(&self.content),
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
        };
        serde_json::to_string(&wire)
            .map_err(|e| CryptoError::PayloadFormat(format!("encoding failed: {e}")))
    }

    /// Parse decrypted plaintext back into a file payload.
    ///
    /// A parse failure here means the envelope never held a file payload in
    /// the first place: the plaintext was already authenticated.
    pub fn decode(plaintext: &str) -> CryptoResult<Self> {
        let wire: WirePayload = serde_json::from_str(plaintext)
            .map_err(|e| CryptoError::PayloadFormat(format!("not a file payload: {e}")))?;
        let content = STANDARD
            .decode(&wire.content)
            .map_err(|e| CryptoError::PayloadFormat(format!("invalid content encoding: {e}")))?;

        Ok(Self {
            content,
            filename: wire.filename,
            mime_type: wire.mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let payload = FilePayload {
            content: vec![0, 1, 2, 255, 254, 253],
            filename: "report 🎉.xlsx".into(),
            mime_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                .into(),
        };

        let encoded = payload.encode().unwrap();
        let decoded = FilePayload::decode(&encoded).unwrap();

        assert_eq!(payload, decoded);
    }

    #[test]
    fn test_empty_content_roundtrip() {
        let payload = FilePayload {
            content: vec![],
            filename: "empty.bin".into(),
            mime_type: "application/octet-stream".into(),
        };

        let encoded = payload.encode().unwrap();
        assert!(!encoded.is_empty(), "encoded form is never empty");
        assert_eq!(FilePayload::decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_filename_with_json_metacharacters() {
        let payload = FilePayload {
            content: b"x".to_vec(),
            filename: "we\"ird\\name}{.txt".into(),
            mime_type: "text/plain".into(),
        };

        let decoded = FilePayload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded.filename, payload.filename);
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        let result = FilePayload::decode("just some decrypted prose");
        assert!(matches!(result, Err(CryptoError::PayloadFormat(_))));
    }

    #[test]
    fn test_decode_rejects_bad_inner_base64() {
        let result =
            FilePayload::decode(r#"{"content":"!!","filename":"a","mimeType":"text/plain"}"#);
        assert!(matches!(result, Err(CryptoError::PayloadFormat(_))));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let result = FilePayload::decode(r#"{"content":"aGk="}"#);
        assert!(matches!(result, Err(CryptoError::PayloadFormat(_))));
    }
}
