//! Error types for OxiFlate operations.
//!
//! This module provides the error type shared by the Deflate and Inflate
//! engines. Two broad families exist: *usage* errors (an operation was
//! invoked on a stream in the wrong state) and *data* errors (the compressed
//! input does not conform to RFC 1950/1951/1952 or a checksum failed).
//!
//! Running out of input or output space is **not** an error; the engines
//! report it through their status values so the caller can retry with fresh
//! buffers.

use thiserror::Error;

/// The main error type for OxiFlate operations.
#[derive(Debug, Error)]
pub enum OxiflateError {
    /// Invalid magic bytes in a container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid header field (zlib CMF/FLG, gzip flags, block type, ...).
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Checksum mismatch (Adler-32, CRC-32 or gzip header CRC16).
    #[error("Checksum mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected value from the stream.
        expected: u32,
        /// Value computed from the data.
        computed: u32,
    },

    /// A bit pattern that does not resolve to any symbol of the current
    /// Huffman code, or a code-length array that over-subscribes the code
    /// space.
    #[error("Invalid Huffman code near input offset {offset}")]
    InvalidHuffmanCode {
        /// Byte offset into the compressed stream where decoding failed.
        offset: u64,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Back-reference distance pointing before the start of the produced
    /// stream or beyond the configured window.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes of history available.
        history_size: usize,
    },

    /// Stream used in an inconsistent state (e.g. `compress` after the
    /// stream already ended, or a dictionary set mid-stream).
    #[error("Inconsistent stream state: {message}")]
    StreamState {
        /// Description of the misuse.
        message: String,
    },

    /// Reserved for allocator exhaustion. The engines never raise it
    /// themselves; it exists so callers embedding OxiFlate behind a
    /// fallible-allocation boundary have a stable code to map to.
    #[error("Out of memory")]
    Memory,
}

/// Result type alias for OxiFlate operations.
pub type Result<T> = std::result::Result<T, OxiflateError>;

impl OxiflateError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a checksum mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(offset: u64) -> Self {
        Self::InvalidHuffmanCode { offset }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a stream state error.
    pub fn stream_state(message: impl Into<String>) -> Self {
        Self::StreamState {
            message: message.into(),
        }
    }

    /// Whether this error describes corrupted input data (as opposed to a
    /// misuse of the API). Data errors are terminal for the stream except
    /// through the Inflater's sync-scan recovery.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::StreamState { .. } | Self::Memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiflateError::invalid_magic(vec![0x1F, 0x8B], vec![0x50, 0x4B]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = OxiflateError::crc_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("Checksum mismatch"));

        let err = OxiflateError::stream_state("deflate called after end of stream");
        assert!(err.to_string().contains("after end of stream"));
    }

    #[test]
    fn test_data_error_partition() {
        assert!(OxiflateError::crc_mismatch(1, 2).is_data_error());
        assert!(OxiflateError::invalid_huffman(0).is_data_error());
        assert!(!OxiflateError::stream_state("x").is_data_error());
        assert!(!OxiflateError::Memory.is_data_error());
    }
}
