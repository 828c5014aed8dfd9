//! Streaming DEFLATE decompression engine.
//!
//! [`Inflater`] parses its input through an explicit stage machine: header
//! fields, block headers, tree descriptors, the token loop and the trailer
//! are all separate stages carrying their own partial data, so input may
//! arrive byte-by-byte (or bit-by-bit, across block headers) and every call
//! resumes exactly where the previous one stopped. Nothing blocks: "need
//! more input" and "output full" simply end the call.
//!
//! Produced bytes feed the sliding window so later back-references can
//! replay them; preset dictionary bytes enter the window without appearing
//! in the output. At stream end the running checksum is always compared
//! against the trailer, and a mismatch is a hard data error.

use crate::deflate::{Wrap, WrapChecksum};
use crate::gzip::{GzipHeader, GzipHeaderParser};
use crate::huffman::HuffmanTree;
use crate::tables::{
    self, CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, END_OF_BLOCK, LENGTH_EXTRA_BITS,
};
use oxiflate_core::adler::Adler32;
use oxiflate_core::bitstream::{BitReader, InputCursor, OutputCursor};
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::ringbuffer::RingBuffer;
use oxiflate_core::traits::{Decompressor, FlushMode, Status};

/// Sub-position inside the literal/length/distance token loop.
#[derive(Debug, Clone)]
enum TokenStep {
    /// Before the next literal/length symbol.
    Symbol,
    /// Length decoded; before the distance symbol.
    DistSymbol {
        /// Match length already decoded.
        length: u16,
    },
    /// Back-reference in progress (may span output buffers).
    Copy {
        /// Bytes still to copy.
        length: u16,
        /// Distance back into the produced stream.
        distance: u16,
    },
}

/// Parse stage, with the partial data each stage needs to resume.
#[derive(Debug, Clone)]
enum Stage {
    /// Reading the 2-byte zlib header.
    ZlibHeader,
    /// Reading the gzip header, field by field.
    GzipHeader(GzipHeaderParser),
    /// Reading the 4-byte dictionary id after FDICT.
    DictId,
    /// Waiting for the caller to supply the dictionary with this Adler-32.
    NeedDict {
        /// Required dictionary checksum.
        id: u32,
    },
    /// Reading the 3 block-header bits.
    BlockHeader,
    /// Reading LEN/NLEN of a stored block.
    StoredLen,
    /// Copying stored-block bytes.
    Stored { remaining: u16 },
    /// Reading HLIT/HDIST/HCLEN of a dynamic block.
    TableHeader,
    /// Reading the 3-bit code-length code lengths.
    CodeLengthCodes {
        hlit: u16,
        hdist: u8,
        hclen: u8,
        read: u8,
        lengths: [u8; tables::CODELEN_SYMBOLS],
    },
    /// Decoding the literal/length + distance code lengths.
    TreeLengths {
        hlit: u16,
        hdist: u8,
        tree: HuffmanTree,
        lengths: Vec<u8>,
    },
    /// Decoding tokens with the current block's trees.
    Tokens {
        litlen: HuffmanTree,
        dist: HuffmanTree,
        step: TokenStep,
    },
    /// Reading the big-endian Adler-32 trailer.
    ZlibTrailer,
    /// Reading the little-endian CRC-32 trailer.
    GzipCrc,
    /// Reading the little-endian ISIZE trailer.
    GzipLen,
    /// Stream ended, trailer verified.
    Done,
    /// A data error was reported; only sync-scan recovery can continue.
    Bad,
}

/// Outcome of one token-loop run.
enum TokenOutcome {
    /// Out of input bits or output space.
    Pause,
    /// End-of-block symbol consumed.
    EndOfBlock,
}

/// Streaming DEFLATE decompressor.
///
/// # Example
///
/// ```
/// use oxiflate_deflate::{Deflater, Inflater};
/// use oxiflate_core::traits::{FlushMode, Status};
///
/// let mut deflater = Deflater::new(6);
/// let mut compressed = vec![0u8; 256];
/// let (_, n, _) = deflater
///     .compress(b"hello world", &mut compressed, FlushMode::Finish)
///     .unwrap();
///
/// let mut inflater = Inflater::new();
/// let mut output = vec![0u8; 256];
/// let (_, produced, status) = inflater
///     .decompress(&compressed[..n], &mut output, FlushMode::Finish)
///     .unwrap();
/// assert_eq!(&output[..produced], b"hello world");
/// assert_eq!(status, Status::StreamEnd);
/// ```
#[derive(Debug, Clone)]
pub struct Inflater {
    bits: BitReader,
    window: RingBuffer,
    stage: Stage,
    wrap: Wrap,
    window_bits: u8,
    checksum: WrapChecksum,
    total_in: u64,
    total_out: u64,
    final_block: bool,
    gzip_header: Option<GzipHeader>,
    /// Progress of the 00 00 FF FF scan across `sync` calls.
    sync_got: u8,
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Inflater {
    /// Create a zlib decompressor with the maximum window.
    pub fn new() -> Self {
        Self::with_options(15, Wrap::Zlib).expect("default options are valid")
    }

    /// Create a raw-deflate decompressor.
    pub fn raw() -> Self {
        Self::with_options(15, Wrap::Raw).expect("default options are valid")
    }

    /// Create a gzip decompressor.
    pub fn gzip() -> Self {
        Self::with_options(15, Wrap::Gzip).expect("default options are valid")
    }

    /// Create a decompressor with an explicit window size and wrap.
    ///
    /// `window_bits` must be in `8..=15` and at least as large as the value
    /// used when compressing.
    pub fn with_options(window_bits: u8, wrap: Wrap) -> Result<Self> {
        if !(8..=15).contains(&window_bits) {
            return Err(OxiflateError::stream_state(format!(
                "window bits {} outside 8..=15",
                window_bits
            )));
        }

        Ok(Self {
            bits: BitReader::new(),
            window: RingBuffer::with_window_bits(window_bits),
            stage: Self::initial_stage(wrap),
            wrap,
            window_bits,
            checksum: WrapChecksum::for_wrap(wrap),
            total_in: 0,
            total_out: 0,
            final_block: false,
            gzip_header: None,
            sync_got: 0,
        })
    }

    fn initial_stage(wrap: Wrap) -> Stage {
        match wrap {
            Wrap::Zlib => Stage::ZlibHeader,
            Wrap::Gzip => Stage::GzipHeader(GzipHeaderParser::new()),
            Wrap::Raw => Stage::BlockHeader,
        }
    }

    /// Total compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total uncompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Current checksum over the produced output (Adler-32 for zlib,
    /// CRC-32 for gzip, 0 for raw).
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// The dictionary id the stream asks for, when stopped at
    /// [`Status::NeedDict`].
    pub fn dictionary_id(&self) -> Option<u32> {
        match self.stage {
            Stage::NeedDict { id } => Some(id),
            _ => None,
        }
    }

    /// The gzip header, once it has been fully parsed.
    pub fn header(&self) -> Option<&GzipHeader> {
        self.gzip_header.as_ref()
    }

    /// Whether the stream ended with a verified trailer.
    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    /// Whether the engine sits at a byte-aligned block boundary (a flush
    /// point made by a sync or full flush on the compressor).
    pub fn sync_point(&self) -> bool {
        matches!(self.stage, Stage::BlockHeader) && self.bits.bits_available() == 0
    }

    /// Reset to a freshly-initialized stream, keeping allocations and
    /// configuration.
    pub fn reset(&mut self) {
        self.bits.clear();
        self.window.clear();
        self.stage = Self::initial_stage(self.wrap);
        self.checksum = WrapChecksum::for_wrap(self.wrap);
        self.total_in = 0;
        self.total_out = 0;
        self.final_block = false;
        self.gzip_header = None;
        self.sync_got = 0;
    }

    /// Supply the preset dictionary.
    ///
    /// Required after [`Status::NeedDict`], where the Adler-32 of the
    /// supplied bytes must match the id from the stream. For raw streams,
    /// which carry no in-band dictionary signal, this may instead be called
    /// proactively before the first `decompress` call.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        match self.stage {
            Stage::NeedDict { id } => {
                let computed = Adler32::checksum(dictionary);
                if computed != id {
                    return Err(OxiflateError::crc_mismatch(id, computed));
                }
                self.window.preload_dictionary(dictionary);
                self.stage = Stage::BlockHeader;
                Ok(())
            }
            Stage::BlockHeader
                if self.wrap == Wrap::Raw && self.total_in == 0 && self.total_out == 0 =>
            {
                self.window.preload_dictionary(dictionary);
                Ok(())
            }
            _ => Err(OxiflateError::stream_state(
                "dictionary supplied at the wrong time",
            )),
        }
    }

    /// Decompress as much as the buffers allow. See
    /// [`Decompressor::decompress`].
    ///
    /// The flush mode does not change behavior here: this implementation
    /// always produces as much output as possible. It only shapes the
    /// status a caller sees when no progress was made.
    pub fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        _flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        match self.stage {
            Stage::Done => return Ok((0, 0, Status::StreamEnd)),
            Stage::NeedDict { .. } => return Ok((0, 0, Status::NeedDict)),
            Stage::Bad => {
                return Err(OxiflateError::corrupted(
                    self.total_in,
                    "inflate stream in failed state",
                ));
            }
            _ => {}
        }

        let mut src = InputCursor::new(input);
        let mut out = OutputCursor::new(output);
        let mut checked = 0usize;

        let result = self.run(&mut src, &mut out, &mut checked);

        let consumed = src.consumed();
        let produced = out.produced();
        self.checksum.update(&out.written()[checked..]);
        self.window.extend(out.written());
        self.total_in += consumed as u64;
        self.total_out += produced as u64;

        match result {
            Err(err) => {
                self.stage = Stage::Bad;
                Err(err)
            }
            Ok(()) => {
                let status = match self.stage {
                    Stage::Done => Status::StreamEnd,
                    Stage::NeedDict { .. } => Status::NeedDict,
                    _ if consumed > 0 || produced > 0 => Status::Ok,
                    _ => Status::BufError,
                };
                Ok((consumed, produced, status))
            }
        }
    }

    /// The stage loop. Returns when input or output is exhausted, a
    /// dictionary is required, or the stream ends.
    fn run(
        &mut self,
        src: &mut InputCursor<'_>,
        out: &mut OutputCursor<'_>,
        checked: &mut usize,
    ) -> Result<()> {
        loop {
            match &mut self.stage {
                Stage::ZlibHeader => {
                    let Some(v) = self.bits.try_read_bits(src, 16) else {
                        return Ok(());
                    };
                    let cmf = (v & 0xFF) as u8;
                    let flg = (v >> 8) as u8;
                    if cmf & 0x0F != 8 {
                        return Err(OxiflateError::invalid_header(format!(
                            "unknown compression method {}",
                            cmf & 0x0F
                        )));
                    }
                    let cinfo = cmf >> 4;
                    if cinfo > 7 {
                        return Err(OxiflateError::invalid_header("invalid window size"));
                    }
                    if cinfo + 8 > self.window_bits {
                        return Err(OxiflateError::invalid_header(
                            "stream window exceeds the configured window size",
                        ));
                    }
                    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
                        return Err(OxiflateError::invalid_header("incorrect header check"));
                    }
                    self.stage = if flg & 0x20 != 0 {
                        Stage::DictId
                    } else {
                        Stage::BlockHeader
                    };
                }
                Stage::GzipHeader(parser) => {
                    if !parser.advance(&mut self.bits, src)? {
                        return Ok(());
                    }
                    self.gzip_header = Some(parser.header().clone());
                    self.stage = Stage::BlockHeader;
                }
                Stage::DictId => {
                    let Some(v) = self.bits.try_read_bits(src, 32) else {
                        return Ok(());
                    };
                    self.stage = Stage::NeedDict {
                        id: v.swap_bytes(),
                    };
                }
                Stage::NeedDict { .. } => return Ok(()),
                Stage::BlockHeader => {
                    let Some(v) = self.bits.try_read_bits(src, 3) else {
                        return Ok(());
                    };
                    self.final_block = v & 1 == 1;
                    self.stage = match v >> 1 {
                        0 => Stage::StoredLen,
                        1 => Stage::Tokens {
                            litlen: tables::fixed_litlen_tree().clone(),
                            dist: tables::fixed_distance_tree().clone(),
                            step: TokenStep::Symbol,
                        },
                        2 => Stage::TableHeader,
                        _ => {
                            return Err(OxiflateError::invalid_header(
                                "reserved block type 3",
                            ));
                        }
                    };
                }
                Stage::StoredLen => {
                    self.bits.align_to_byte();
                    let Some(v) = self.bits.try_read_bits(src, 32) else {
                        return Ok(());
                    };
                    let len = (v & 0xFFFF) as u16;
                    let nlen = (v >> 16) as u16;
                    if len != !nlen {
                        return Err(OxiflateError::corrupted(
                            self.total_in + src.consumed() as u64,
                            "stored block length check failed",
                        ));
                    }
                    self.stage = Stage::Stored { remaining: len };
                }
                Stage::Stored { remaining } => {
                    while *remaining > 0 {
                        if !out.has_space() {
                            return Ok(());
                        }
                        // Whole bytes may still sit in the accumulator.
                        if self.bits.bits_available() >= 8 {
                            out.write_byte(self.bits.take_bits(8) as u8);
                            *remaining -= 1;
                            continue;
                        }
                        let n = (*remaining as usize)
                            .min(src.remaining())
                            .min(out.space());
                        if n == 0 {
                            return Ok(());
                        }
                        out.write_slice(src.take(n));
                        *remaining -= n as u16;
                    }
                    self.stage = self.block_done();
                }
                Stage::TableHeader => {
                    let Some(v) = self.bits.try_read_bits(src, 14) else {
                        return Ok(());
                    };
                    let hlit = (v & 0x1F) as u16 + 257;
                    let hdist = ((v >> 5) & 0x1F) as u8 + 1;
                    let hclen = ((v >> 10) & 0x0F) as u8 + 4;
                    if hlit > 286 || hdist > 30 {
                        return Err(OxiflateError::invalid_header(
                            "too many literal/length or distance symbols",
                        ));
                    }
                    self.stage = Stage::CodeLengthCodes {
                        hlit,
                        hdist,
                        hclen,
                        read: 0,
                        lengths: [0; tables::CODELEN_SYMBOLS],
                    };
                }
                Stage::CodeLengthCodes {
                    hlit,
                    hdist,
                    hclen,
                    read,
                    lengths,
                } => {
                    while *read < *hclen {
                        let Some(v) = self.bits.try_read_bits(src, 3) else {
                            return Ok(());
                        };
                        lengths[CODE_LENGTH_ORDER[*read as usize]] = v as u8;
                        *read += 1;
                    }
                    let tree = HuffmanTree::from_code_lengths(&lengths[..])?;
                    if tree.is_empty() {
                        return Err(OxiflateError::invalid_header("no code length codes"));
                    }
                    let (hlit, hdist) = (*hlit, *hdist);
                    let total = hlit as usize + hdist as usize;
                    self.stage = Stage::TreeLengths {
                        hlit,
                        hdist,
                        tree,
                        lengths: Vec::with_capacity(total),
                    };
                }
                Stage::TreeLengths {
                    hlit,
                    hdist,
                    tree,
                    lengths,
                } => {
                    let total = *hlit as usize + *hdist as usize;
                    while lengths.len() < total {
                        self.bits.fill(src, 14);
                        let Some((sym, code_len)) = tree
                            .peek_decode(&self.bits)
                            .map_err(|_| OxiflateError::invalid_huffman(self.total_in))?
                        else {
                            return Ok(());
                        };
                        match sym {
                            0..=15 => {
                                self.bits.drop_bits(code_len);
                                lengths.push(sym as u8);
                            }
                            16 => {
                                if self.bits.bits_available() < code_len + 2 {
                                    return Ok(());
                                }
                                self.bits.drop_bits(code_len);
                                let repeat = 3 + self.bits.take_bits(2) as usize;
                                let Some(&prev) = lengths.last() else {
                                    return Err(OxiflateError::corrupted(
                                        self.total_in,
                                        "length repeat with no previous length",
                                    ));
                                };
                                if lengths.len() + repeat > total {
                                    return Err(OxiflateError::corrupted(
                                        self.total_in,
                                        "code length repeat overflows the alphabets",
                                    ));
                                }
                                for _ in 0..repeat {
                                    lengths.push(prev);
                                }
                            }
                            17 | 18 => {
                                let (extra, base) = if sym == 17 { (3, 3) } else { (7, 11) };
                                if self.bits.bits_available() < code_len + extra {
                                    return Ok(());
                                }
                                self.bits.drop_bits(code_len);
                                let repeat = base + self.bits.take_bits(extra) as usize;
                                if lengths.len() + repeat > total {
                                    return Err(OxiflateError::corrupted(
                                        self.total_in,
                                        "code length repeat overflows the alphabets",
                                    ));
                                }
                                for _ in 0..repeat {
                                    lengths.push(0);
                                }
                            }
                            _ => unreachable!("code length alphabet has 19 symbols"),
                        }
                    }

                    let litlen = HuffmanTree::from_code_lengths(&lengths[..*hlit as usize])?;
                    if litlen.is_empty() {
                        return Err(OxiflateError::invalid_header(
                            "no literal/length codes in dynamic block",
                        ));
                    }
                    let dist = HuffmanTree::from_code_lengths(&lengths[*hlit as usize..])?;
                    self.stage = Stage::Tokens {
                        litlen,
                        dist,
                        step: TokenStep::Symbol,
                    };
                }
                Stage::Tokens { litlen, dist, step } => {
                    let outcome = Self::decode_tokens(
                        &mut self.bits,
                        &self.window,
                        litlen,
                        dist,
                        step,
                        src,
                        out,
                        self.total_in,
                    )?;
                    match outcome {
                        TokenOutcome::Pause => return Ok(()),
                        TokenOutcome::EndOfBlock => {
                            self.stage = self.block_done();
                        }
                    }
                }
                Stage::ZlibTrailer => {
                    let Some(v) = self.bits.try_read_bits(src, 32) else {
                        return Ok(());
                    };
                    let expected = v.swap_bytes();
                    self.checksum.update(&out.written()[*checked..]);
                    *checked = out.produced();
                    let computed = self.checksum.value();
                    if expected != computed {
                        return Err(OxiflateError::crc_mismatch(expected, computed));
                    }
                    self.stage = Stage::Done;
                }
                Stage::GzipCrc => {
                    let Some(expected) = self.bits.try_read_bits(src, 32) else {
                        return Ok(());
                    };
                    self.checksum.update(&out.written()[*checked..]);
                    *checked = out.produced();
                    let computed = self.checksum.value();
                    if expected != computed {
                        return Err(OxiflateError::crc_mismatch(expected, computed));
                    }
                    self.stage = Stage::GzipLen;
                }
                Stage::GzipLen => {
                    let Some(v) = self.bits.try_read_bits(src, 32) else {
                        return Ok(());
                    };
                    let total = self.total_out + out.produced() as u64;
                    if u64::from(v) != (total & 0xFFFF_FFFF) {
                        return Err(OxiflateError::corrupted(
                            self.total_in + src.consumed() as u64,
                            "incorrect gzip length check",
                        ));
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => return Ok(()),
                Stage::Bad => {
                    return Err(OxiflateError::corrupted(
                        self.total_in,
                        "inflate stream in failed state",
                    ));
                }
            }
        }
    }

    /// The stage following a completed block.
    fn block_done(&mut self) -> Stage {
        if !self.final_block {
            return Stage::BlockHeader;
        }
        self.bits.align_to_byte();
        match self.wrap {
            Wrap::Zlib => Stage::ZlibTrailer,
            Wrap::Gzip => Stage::GzipCrc,
            Wrap::Raw => Stage::Done,
        }
    }

    /// Decode literal/length/distance tokens until input bits run dry, the
    /// output fills, or end-of-block.
    #[allow(clippy::too_many_arguments)]
    fn decode_tokens(
        bits: &mut BitReader,
        window: &RingBuffer,
        litlen: &HuffmanTree,
        dist_tree: &HuffmanTree,
        step: &mut TokenStep,
        src: &mut InputCursor<'_>,
        out: &mut OutputCursor<'_>,
        offset: u64,
    ) -> Result<TokenOutcome> {
        loop {
            match step {
                TokenStep::Symbol => {
                    if !out.has_space() {
                        return Ok(TokenOutcome::Pause);
                    }
                    // Symbol plus worst-case length extra bits.
                    bits.fill(src, 20);
                    let Some((sym, code_len)) = litlen
                        .peek_decode(bits)
                        .map_err(|_| OxiflateError::invalid_huffman(offset))?
                    else {
                        return Ok(TokenOutcome::Pause);
                    };
                    if sym < 256 {
                        bits.drop_bits(code_len);
                        out.write_byte(sym as u8);
                    } else if sym == END_OF_BLOCK {
                        bits.drop_bits(code_len);
                        return Ok(TokenOutcome::EndOfBlock);
                    } else if sym <= 285 {
                        let extra = u32::from(LENGTH_EXTRA_BITS[(sym - 257) as usize]);
                        if bits.bits_available() < code_len + extra {
                            return Ok(TokenOutcome::Pause);
                        }
                        bits.drop_bits(code_len);
                        let extra_val = bits.take_bits(extra) as u16;
                        *step = TokenStep::DistSymbol {
                            length: tables::decode_length(sym, extra_val),
                        };
                    } else {
                        return Err(OxiflateError::corrupted(
                            offset,
                            format!("invalid literal/length code {}", sym),
                        ));
                    }
                }
                TokenStep::DistSymbol { length } => {
                    let length = *length;
                    // Symbol plus worst-case distance extra bits.
                    bits.fill(src, 28);
                    let Some((sym, code_len)) = dist_tree
                        .peek_decode(bits)
                        .map_err(|_| OxiflateError::invalid_huffman(offset))?
                    else {
                        return Ok(TokenOutcome::Pause);
                    };
                    if sym >= 30 {
                        return Err(OxiflateError::corrupted(
                            offset,
                            format!("invalid distance code {}", sym),
                        ));
                    }
                    let extra = u32::from(DISTANCE_EXTRA_BITS[sym as usize]);
                    if bits.bits_available() < code_len + extra {
                        return Ok(TokenOutcome::Pause);
                    }
                    bits.drop_bits(code_len);
                    let extra_val = bits.take_bits(extra) as u16;
                    let distance = tables::decode_distance(sym, extra_val) as usize;

                    let history = window.len() + out.produced();
                    if distance > window.capacity() || distance > history {
                        return Err(OxiflateError::invalid_distance(distance, history));
                    }
                    *step = TokenStep::Copy {
                        length,
                        distance: distance as u16,
                    };
                }
                TokenStep::Copy { length, distance } => {
                    let dist = *distance as usize;
                    while *length > 0 {
                        if !out.has_space() {
                            return Ok(TokenOutcome::Pause);
                        }
                        let produced = out.produced();
                        let byte = if dist <= produced {
                            out.byte_at_back(dist)
                        } else {
                            window.byte_at(dist - produced)?
                        };
                        out.write_byte(byte);
                        *length -= 1;
                    }
                    *step = TokenStep::Symbol;
                }
            }
        }
    }

    /// Scan remaining input for a full-flush point (the byte-aligned
    /// `00 00 FF FF` empty stored block) to resynchronize after corruption.
    ///
    /// Returns the number of input bytes consumed and [`Status::Ok`] once
    /// the marker is found, with the engine repositioned to continue
    /// decoding right after it (window history preserved). With empty input
    /// the status is [`Status::BufError`]; input exhausted without a marker
    /// is a data error, and the call may be repeated with more input to
    /// keep scanning.
    pub fn sync(&mut self, input: &[u8]) -> Result<(usize, Status)> {
        if input.is_empty() && self.bits.bits_available() < 8 {
            return Ok((0, Status::BufError));
        }

        // Whole bytes still in the accumulator are scanned first.
        let mut got = self.sync_got as usize;
        self.bits.align_to_byte();
        while self.bits.bits_available() >= 8 {
            got = sync_step(got, self.bits.take_bits(8) as u8);
            if got == 4 {
                break;
            }
        }

        let mut pos = 0;
        while got < 4 && pos < input.len() {
            got = sync_step(got, input[pos]);
            pos += 1;
        }
        self.total_in += pos as u64;

        if got == 4 {
            self.bits.clear();
            self.sync_got = 0;
            self.final_block = false;
            self.stage = Stage::BlockHeader;
            Ok((pos, Status::Ok))
        } else {
            self.sync_got = got as u8;
            Err(OxiflateError::corrupted(
                self.total_in,
                "no flush point found",
            ))
        }
    }
}

/// One byte of the resumable 00 00 FF FF scan.
fn sync_step(got: usize, byte: u8) -> usize {
    let expect = if got < 2 { 0x00 } else { 0xFF };
    if byte == expect {
        got + 1
    } else if byte != 0 {
        0
    } else {
        4 - got
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        Inflater::decompress(self, input, output, flush)
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Inflater::is_finished(self)
    }
}
