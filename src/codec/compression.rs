//! Deterministic gzip transform with a byte-length threshold policy.
//!
//! Compression must be reproducible: identical input always yields
//! byte-identical output, so content refs computed over stored bytes stay
//! stable. flate2's gzip header carries no timestamp (mtime 0), which
//! keeps the frame deterministic.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

/// Minimum UTF-8 byte length at which the auto policy compresses.
///
/// Measured on encoded bytes, not characters, so multi-byte content is
/// accounted for correctly.
pub const COMPRESSION_THRESHOLD: usize = 1024;

/// Gzip frame marker. Present at the start of every compressed payload
/// and only there; raw payloads are stored without any framing.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum CodecError {
    /// Caller bug: missing or non-textual argument. Fails fast with no
    /// partial side effects.
    #[error("Invalid codec input: {0}")]
    InvalidInput(&'static str),
    /// Payload cannot be reverse-transformed: bad framing, truncated
    /// stream, or checksum mismatch. Structural, never retried.
    #[error("Corrupt compressed data: {0}")]
    CorruptData(String),
}

/// Result of an unconditional [`compress`] call.
#[derive(Debug, Clone)]
pub struct CompressedContent {
    pub data: Vec<u8>,
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed_size / original_size`; 1.0 for empty input.
    pub compression_ratio: f64,
}

/// Output of the auto policy: raw or compressed bytes plus the explicit
/// flag a store must record alongside them.
#[derive(Debug, Clone)]
pub struct EncodedContent {
    pub bytes: Vec<u8>,
    pub compressed: bool,
    pub original_size: usize,
    pub stored_size: usize,
}

impl EncodedContent {
    pub fn compression_ratio(&self) -> f64 {
        ratio(self.original_size, self.stored_size)
    }
}

fn ratio(original: usize, stored: usize) -> f64 {
    if original == 0 {
        1.0
    } else {
        stored as f64 / original as f64
    }
}

/// True iff the auto policy would compress `text`.
pub fn should_compress(text: &str) -> bool {
    !text.is_empty() && text.len() >= COMPRESSION_THRESHOLD
}

/// Gzip `text` unconditionally.
pub fn compress(text: &str) -> Result<CompressedContent, CodecError> {
    if text.is_empty() {
        return Err(CodecError::InvalidInput("cannot compress empty content"));
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| CodecError::CorruptData(format!("gzip write failed: {e}")))?;
    let data = encoder
        .finish()
        .map_err(|e| CodecError::CorruptData(format!("gzip finish failed: {e}")))?;

    let original_size = text.len();
    let compressed_size = data.len();

    Ok(CompressedContent {
        data,
        original_size,
        compressed_size,
        compression_ratio: ratio(original_size, compressed_size),
    })
}

/// Reverse [`compress`]. Fails with `CorruptData` on bad framing, a
/// truncated stream, a CRC mismatch, or non-UTF-8 plaintext.
pub fn decompress(data: &[u8]) -> Result<String, CodecError> {
    if data.is_empty() {
        return Err(CodecError::InvalidInput("cannot decompress empty payload"));
    }
    if data.len() < GZIP_MAGIC.len() || data[..2] != GZIP_MAGIC {
        return Err(CodecError::CorruptData("missing gzip frame marker".into()));
    }

    let mut decoder = GzDecoder::new(data);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| CodecError::CorruptData(format!("gzip stream failed: {e}")))?;

    Ok(text)
}

/// Apply the auto threshold policy. Below the threshold this is a no-op
/// encoding (bytes pass through, `compressed: false`).
pub fn compress_if_needed(text: &str) -> Result<EncodedContent, CodecError> {
    if !should_compress(text) {
        let bytes = text.as_bytes().to_vec();
        let size = bytes.len();
        return Ok(EncodedContent {
            bytes,
            compressed: false,
            original_size: size,
            stored_size: size,
        });
    }

    let out = compress(text)?;
    Ok(EncodedContent {
        bytes: out.data,
        compressed: true,
        original_size: out.original_size,
        stored_size: out.compressed_size,
    })
}

/// Decode bytes written by [`compress_if_needed`].
///
/// `compressed` is the flag recorded at write time; discrimination never
/// relies on sniffing the payload, so raw content that happens to start
/// with marker-like bytes is decoded correctly.
pub fn decompress_if_needed(bytes: &[u8], compressed: bool) -> Result<String, CodecError> {
    if !compressed {
        return String::from_utf8(bytes.to_vec())
            .map_err(|e| CodecError::CorruptData(format!("stored content is not UTF-8: {e}")));
    }

    decompress(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_is_deterministic() {
        let text = "x".repeat(4096);
        let a = compress(&text).unwrap();
        let b = compress(&text).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn threshold_measures_utf8_bytes() {
        // 512 two-byte characters: 512 chars but 1024 bytes.
        let wide = "é".repeat(512);
        assert_eq!(wide.len(), 1024);
        assert!(should_compress(&wide));
    }

    #[test]
    fn raw_payload_resembling_marker_is_not_sniffed() {
        // Raw text beginning with the first marker byte must decode
        // verbatim when the recorded flag says uncompressed.
        let text = "\u{1f}looks like a gzip frame";
        let decoded = decompress_if_needed(text.as_bytes(), false).unwrap();
        assert_eq!(decoded, text);
    }
}
