//! # OxiFlate Core
//!
//! Core components for the OxiFlate DEFLATE/zlib/gzip codec.
//!
//! This crate provides the building blocks the streaming engines are made
//! of:
//!
//! - [`bitstream`]: resumable LSB-first bit I/O over borrowed byte slices
//! - [`ringbuffer`]: the decode-side sliding window for back-references
//! - [`crc`]: CRC-32 (gzip trailer and header CRC16)
//! - [`adler`]: Adler-32 (zlib trailer and dictionary identification)
//! - [`traits`]: streaming statuses, flush modes, levels, strategies and the
//!   `Compressor`/`Decompressor` capability traits
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container                                           │
//! │     zlib / gzip header and trailer framing              │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (oxiflate-deflate)                            │
//! │     Deflate and Inflate engines, Huffman, LZ77          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitReader/BitWriter, RingBuffer, Adler-32, CRC-32   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything operates on caller-supplied slices; nothing in this crate
//! performs I/O or blocks. "Not enough input" and "output full" are ordinary
//! return values, which is what lets the engines suspend and resume at any
//! byte boundary.
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::adler::Adler32;
//! use oxiflate_core::crc::Crc32;
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adler;
pub mod bitstream;
pub mod crc;
pub mod error;
pub mod ringbuffer;
pub mod traits;

// Re-exports
pub use adler::Adler32;
pub use bitstream::{BitReader, BitWriter, InputCursor, OutputCursor};
pub use crc::Crc32;
pub use error::{OxiflateError, Result};
pub use ringbuffer::RingBuffer;
pub use traits::{CompressionLevel, Compressor, Decompressor, FlushMode, Status, Strategy};
