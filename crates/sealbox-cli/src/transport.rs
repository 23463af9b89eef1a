//! File ⇄ transportable base64
//!
//! The encrypt path reads a file fully and encodes it; the decrypt path
//! rebuilds the binary in fixed-size chunks so peak allocation stays bounded
//! while very large buffers are reassembled.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

/// Decode chunk width in base64 characters. A multiple of 4, so every chunk
/// is a self-contained base64 unit. Tuning this trades decode calls for peak
/// allocation, not correctness.
pub const DECODE_CHUNK: usize = 1024;

/// Read a file fully into memory and encode it for transport.
pub fn file_to_transportable(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Rebuild binary content from its transport encoding, chunk by chunk.
///
/// Padding can only occur in the final chunk, so every prefix chunk decodes
/// standalone.
pub fn blob_from_transportable(encoded: &str) -> Result<Vec<u8>> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 4 * 3);

    let mut offset = 0;
    while offset < bytes.len() {
        let end = usize::min(offset + DECODE_CHUNK, bytes.len());
        let decoded = STANDARD
            .decode(&bytes[offset..end])
            .context("invalid base64 content")?;
        out.extend_from_slice(&decoded);
        offset = end;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn roundtrip(len: usize) {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let encoded = STANDARD.encode(&data);
        let decoded = blob_from_transportable(&encoded).unwrap();
        assert_eq!(decoded, data, "length {len}");
    }

    #[test]
    fn test_roundtrip_sizes() {
        // Empty, sub-chunk, exact multiples, and tails spanning chunk edges
        for len in [0, 1, 2, 3, 700, 768, 769, 3000, 10_000] {
            roundtrip(len);
        }
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(blob_from_transportable("@@@@").is_err());
    }

    #[test]
    fn test_file_to_transportable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1u8, 2, 3, 255]).unwrap();

        let encoded = file_to_transportable(file.path()).unwrap();
        assert_eq!(STANDARD.decode(&encoded).unwrap(), [1u8, 2, 3, 255]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(file_to_transportable(Path::new("/nonexistent/file.bin")).is_err());
    }
}
