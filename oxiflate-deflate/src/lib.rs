//! # OxiFlate Deflate
//!
//! Pure Rust streaming implementation of DEFLATE (RFC 1951) with zlib
//! (RFC 1950) and gzip (RFC 1952) framing.
//!
//! The two engines are pure state machines driven by repeated calls:
//!
//! - [`Deflater`]: LZ77 match finding, Huffman encoding, block framing,
//!   flush semantics, dictionary priming and container headers/trailers
//! - [`Inflater`]: bit-level Huffman decoding, window replay, incremental
//!   header/trailer parsing, dictionary injection and sync-scan recovery
//!
//! Each call consumes as much input and produces as much output as the
//! caller's slices allow and returns a status; calls resume exactly where
//! the previous one stopped, so payloads never need to be in memory whole.
//! Output is byte-compatible with the reference zlib/gzip wire formats.
//!
//! ## Streaming example
//!
//! ```rust
//! use oxiflate_deflate::{Deflater, Inflater};
//! use oxiflate_core::traits::{FlushMode, Status};
//!
//! let mut deflater = Deflater::new(6);
//! let mut compressed = vec![0u8; 128];
//! let (_, n, status) = deflater
//!     .compress(b"Hello, World! Hello, World!", &mut compressed, FlushMode::Finish)
//!     .unwrap();
//! assert_eq!(status, Status::StreamEnd);
//!
//! let mut inflater = Inflater::new();
//! let mut output = vec![0u8; 128];
//! let (_, produced, status) = inflater
//!     .decompress(&compressed[..n], &mut output, FlushMode::Finish)
//!     .unwrap();
//! assert_eq!(status, Status::StreamEnd);
//! assert_eq!(&output[..produced], b"Hello, World! Hello, World!");
//! ```
//!
//! ## One-shot example
//!
//! ```rust
//! use oxiflate_deflate::{zlib_compress, zlib_decompress};
//!
//! let data = b"Hello, World! Hello, World!";
//! let compressed = zlib_compress(data, 6).unwrap();
//! let decompressed = zlib_decompress(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
//!
//! ## Compression levels
//!
//! - Level 0: no compression (stored blocks)
//! - Levels 1-3: greedy matching, shallow chains
//! - Levels 4-9: lazy matching, progressively deeper chains (default 6)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod gzip;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;

use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{Compressor, FlushMode, Status};

// Re-exports
pub use deflate::{Deflater, Wrap};
pub use gzip::GzipHeader;
pub use huffman::{HuffmanCodes, HuffmanTree};
pub use inflate::Inflater;
pub use lz77::{Lz77Token, MatchFinder};

/// Compress data to raw DEFLATE (no framing).
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    Deflater::raw(level).compress_all(data)
}

/// Decompress raw DEFLATE data.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    decompress_fully(&mut Inflater::raw(), data, None)
}

/// Compress data to the zlib format.
pub fn zlib_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    Deflater::new(level).compress_all(input)
}

/// Decompress zlib data. Streams requesting a preset dictionary are
/// rejected; use [`zlib_decompress_with_dict`] for those.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_fully(&mut Inflater::new(), input, None)
}

/// Compress data to the zlib format with a preset dictionary.
pub fn zlib_compress_with_dict(input: &[u8], level: u8, dictionary: &[u8]) -> Result<Vec<u8>> {
    Deflater::with_dictionary(level, dictionary).compress_all(input)
}

/// Decompress zlib data, supplying `dictionary` if the stream asks for one.
pub fn zlib_decompress_with_dict(input: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    decompress_fully(&mut Inflater::new(), input, Some(dictionary))
}

/// Compress data to a gzip member with a default header.
pub fn gzip_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    Deflater::gzip(level).compress_all(input)
}

/// Decompress a gzip member, verifying its CRC-32 and length trailer.
pub fn gzip_decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_fully(&mut Inflater::gzip(), input, None)
}

/// Drive an inflater over a complete in-memory stream.
fn decompress_fully(
    inflater: &mut Inflater,
    input: &[u8],
    dictionary: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = 0;

    loop {
        let (consumed, produced, status) =
            inflater.decompress(&input[pos..], &mut buffer, FlushMode::Finish)?;
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);

        match status {
            Status::StreamEnd => return Ok(output),
            Status::Ok => {}
            Status::NeedDict => match dictionary {
                Some(dict) => inflater.set_dictionary(dict)?,
                None => {
                    return Err(OxiflateError::stream_state(
                        "stream requires a preset dictionary",
                    ));
                }
            },
            Status::BufError => {
                return Err(OxiflateError::corrupted(
                    inflater.total_in(),
                    "unexpected end of deflate stream",
                ));
            }
        }
    }
}
