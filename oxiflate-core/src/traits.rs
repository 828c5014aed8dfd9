//! Streaming vocabulary and capability traits for the codec engines.
//!
//! Both engines speak the same buffer protocol: the caller hands in an input
//! slice and an output slice, the engine consumes and produces as much as the
//! slices allow, and the call returns `(consumed, produced, status)`. Engines
//! never retain the slices; all resumable state lives inside the engine.

use crate::error::Result;

/// Status of a streaming compression or decompression call.
///
/// Exhaustion is reported here rather than through errors: a [`Status::BufError`]
/// leaves the engine untouched and the caller simply retries with more input
/// or more output space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Progress was made: input was consumed and/or output was produced.
    Ok,
    /// The stream has ended; all output is produced and, for wrapped
    /// streams, the trailer checksum has been emitted or verified.
    StreamEnd,
    /// A preset dictionary is required before decompression can continue.
    /// The caller must supply it and call again.
    NeedDict,
    /// No progress was possible: no input available and not finishing, or
    /// the output buffer was already full. Not fatal; retry with buffers.
    BufError,
}

/// Flush mode for a streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - let the engine accumulate data for best compression.
    #[default]
    None,
    /// Close the current block and emit an empty fixed-code block (10 bits).
    /// All input so far becomes decodable, without byte alignment.
    Partial,
    /// Close the current block and emit an empty stored block, aligning the
    /// output to a byte boundary (the `00 00 FF FF` marker).
    Sync,
    /// Like [`FlushMode::Sync`], but additionally reset the compression
    /// history so decompression can restart from this point.
    Full,
    /// Process all pending input, flush all output and finish the stream,
    /// writing the container trailer.
    Finish,
}

/// Compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Normal LZ77 + Huffman compression.
    #[default]
    Default,
    /// Favor literals over short matches; tuned for data produced by a
    /// predictive filter (e.g. filtered image rows). Matches shorter than
    /// six bytes are rejected.
    Filtered,
    /// Huffman coding only, no match finding at all.
    HuffmanOnly,
}

/// Compression level (0-9, with a default sentinel of 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (stored blocks only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a compression level, clamped to 0-9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Compress data from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`. The call consumes
    /// as much input and produces as much output as the slices allow;
    /// repeated calls resume exactly where the previous call stopped. After
    /// [`FlushMode::Finish`] the call must be repeated with more output
    /// space until [`Status::StreamEnd`] is returned.
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)>;

    /// Reset the compressor to its initial state, keeping allocations.
    fn reset(&mut self);

    /// Whether the stream has ended.
    fn is_finished(&self) -> bool;

    /// Compress an entire buffer in one call sequence (convenience).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut pos = 0;

        loop {
            let (consumed, produced, status) =
                self.compress(&input[pos..], &mut buffer, FlushMode::Finish)?;
            pos += consumed;
            output.extend_from_slice(&buffer[..produced]);
            match status {
                Status::StreamEnd => break,
                Status::Ok => continue,
                Status::BufError | Status::NeedDict => break,
            }
        }

        Ok(output)
    }
}

/// A streaming decompressor (decoder).
pub trait Decompressor {
    /// Decompress data from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`. If input runs out
    /// mid-field the engine preserves its partial state and the next call
    /// continues from the same sub-state.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)>;

    /// Reset the decompressor to its initial state, keeping allocations.
    fn reset(&mut self);

    /// Whether the stream has ended with a verified trailer.
    fn is_finished(&self) -> bool;

    /// Decompress an entire buffer in one call sequence (convenience).
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut pos = 0;

        loop {
            let (consumed, produced, status) =
                self.decompress(&input[pos..], &mut buffer, FlushMode::None)?;
            pos += consumed;
            output.extend_from_slice(&buffer[..produced]);
            match status {
                Status::StreamEnd => break,
                Status::Ok => continue,
                Status::NeedDict => break,
                Status::BufError => break,
            }
        }

        Ok(output)
    }
}
