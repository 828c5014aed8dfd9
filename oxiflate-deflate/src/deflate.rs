//! Streaming DEFLATE compression engine.
//!
//! [`Deflater`] is a pure state machine driven by repeated
//! [`Deflater::compress`] calls: each call consumes what input it can,
//! produces what output fits, and returns a status; nothing blocks and no
//! call retains the caller's buffers. Rendered output beyond the caller's
//! buffer waits in an internal pending buffer and drains first on the next
//! call, so blocks are always rendered whole.
//!
//! Per block the engine picks whichever of the three DEFLATE block kinds
//! costs the fewest bits: stored (raw bytes), static Huffman (the RFC 1951
//! fixed tables) or dynamic Huffman (block-local trees, preceded by their
//! compressed descriptor).

use crate::gzip::GzipHeader;
use crate::huffman::{self, HuffmanCodes};
use crate::lz77::{Lz77Token, MatchFinder, ProcessStatus, TokenBuffer};
use crate::tables::{
    self, DISTANCE_EXTRA_BITS, DISTANCE_SYMBOLS, END_OF_BLOCK, LENGTH_EXTRA_BITS, LITLEN_SYMBOLS,
};
use oxiflate_core::adler::Adler32;
use oxiflate_core::bitstream::{BitWriter, InputCursor, OutputCursor};
use oxiflate_core::crc::Crc32;
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{CompressionLevel, Compressor, FlushMode, Status, Strategy};

/// Container framing applied around the raw DEFLATE body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    /// No framing at all (RFC 1951).
    Raw,
    /// 2-byte header + Adler-32 trailer (RFC 1950).
    #[default]
    Zlib,
    /// 10-byte header (+ optional fields) + CRC-32/length trailer (RFC 1952).
    Gzip,
}

/// Tokens buffered before a block is forced closed.
const TOKEN_LIMIT: usize = 16384;

/// Largest payload of one stored block.
const MAX_STORED_BLOCK: usize = 65535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Created; header not yet rendered, dictionary still settable.
    Init,
    /// Compressing.
    Busy,
    /// Trailer rendered; draining pending output.
    Finishing,
    /// Stream ended.
    Done,
}

/// The running checksum matching the wrap mode.
#[derive(Debug, Clone)]
pub(crate) enum WrapChecksum {
    Raw,
    Zlib(Adler32),
    Gzip(Crc32),
}

impl WrapChecksum {
    pub(crate) fn for_wrap(wrap: Wrap) -> Self {
        match wrap {
            Wrap::Raw => Self::Raw,
            Wrap::Zlib => Self::Zlib(Adler32::new()),
            Wrap::Gzip => Self::Gzip(Crc32::new()),
        }
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Raw => {}
            Self::Zlib(adler) => adler.update(data),
            Self::Gzip(crc) => crc.update(data),
        }
    }

    pub(crate) fn value(&self) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Zlib(adler) => adler.finish(),
            Self::Gzip(crc) => crc.value(),
        }
    }
}

/// Streaming DEFLATE compressor.
///
/// # Example
///
/// ```
/// use oxiflate_deflate::Deflater;
/// use oxiflate_core::traits::{FlushMode, Status};
///
/// let mut deflater = Deflater::new(6);
/// let mut output = vec![0u8; 256];
/// let (consumed, produced, status) = deflater
///     .compress(b"hello world", &mut output, FlushMode::Finish)
///     .unwrap();
/// assert_eq!(consumed, 11);
/// assert_eq!(status, Status::StreamEnd);
/// assert!(produced > 0);
/// ```
#[derive(Debug, Clone)]
pub struct Deflater {
    finder: MatchFinder,
    tokens: TokenBuffer,
    writer: BitWriter,
    state: State,
    wrap: Wrap,
    level: CompressionLevel,
    strategy: Strategy,
    checksum: WrapChecksum,
    total_in: u64,
    total_out: u64,
    gzip_header: GzipHeader,
    dict_id: Option<u32>,
    /// Input seen since the last flush marker; suppresses duplicate markers.
    dirty: bool,
}

impl Deflater {
    /// Create a zlib-wrapped compressor with the maximum window.
    pub fn new(level: impl Into<CompressionLevel>) -> Self {
        Self::with_options(level.into(), 15, Wrap::Zlib, Strategy::Default)
            .expect("default options are valid")
    }

    /// Create a raw-deflate compressor (no header, no trailer).
    pub fn raw(level: impl Into<CompressionLevel>) -> Self {
        Self::with_options(level.into(), 15, Wrap::Raw, Strategy::Default)
            .expect("default options are valid")
    }

    /// Create a gzip-wrapped compressor with a default header.
    pub fn gzip(level: impl Into<CompressionLevel>) -> Self {
        Self::with_options(level.into(), 15, Wrap::Gzip, Strategy::Default)
            .expect("default options are valid")
    }

    /// Create a zlib-wrapped compressor primed with a dictionary.
    pub fn with_dictionary(level: impl Into<CompressionLevel>, dictionary: &[u8]) -> Self {
        let mut deflater = Self::new(level);
        deflater
            .set_dictionary(dictionary)
            .expect("dictionary is settable on a fresh stream");
        deflater
    }

    /// Create a compressor with explicit window size, wrap and strategy.
    ///
    /// `window_bits` must be in `8..=15`; 8 is promoted to 9 on the encode
    /// side (the match-finder lookahead does not fit a 256-byte window).
    pub fn with_options(
        level: impl Into<CompressionLevel>,
        window_bits: u8,
        wrap: Wrap,
        strategy: Strategy,
    ) -> Result<Self> {
        if !(8..=15).contains(&window_bits) {
            return Err(OxiflateError::stream_state(format!(
                "window bits {} outside 8..=15",
                window_bits
            )));
        }
        let level = level.into();

        Ok(Self {
            finder: MatchFinder::new(level, strategy, window_bits),
            tokens: TokenBuffer::new(TOKEN_LIMIT),
            writer: BitWriter::new(),
            state: State::Init,
            wrap,
            level,
            strategy,
            checksum: WrapChecksum::for_wrap(wrap),
            total_in: 0,
            total_out: 0,
            gzip_header: GzipHeader::default(),
            dict_id: None,
            dirty: true,
        })
    }

    /// Total uncompressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total compressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Current checksum over the consumed input (Adler-32 for zlib,
    /// CRC-32 for gzip, 0 for raw).
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// The Adler-32 of the dictionary set on this stream, if any.
    pub fn dictionary_id(&self) -> Option<u32> {
        self.dict_id
    }

    /// Replace the gzip header emitted in front of the stream. Only allowed
    /// before compression starts, and only for gzip wrap.
    pub fn set_gzip_header(&mut self, header: GzipHeader) -> Result<()> {
        if self.state != State::Init {
            return Err(OxiflateError::stream_state(
                "gzip header must be set before compression starts",
            ));
        }
        if self.wrap != Wrap::Gzip {
            return Err(OxiflateError::stream_state(
                "gzip header on a non-gzip stream",
            ));
        }
        self.gzip_header = header;
        Ok(())
    }

    /// Prime the window with dictionary bytes before any data is
    /// compressed. No output is produced; the returned Adler-32 of the full
    /// dictionary is what a zlib decoder will be asked to match.
    ///
    /// Rejected once compression has started and for gzip wrap, which has
    /// no in-band dictionary signal.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        if self.state != State::Init {
            return Err(OxiflateError::stream_state(
                "dictionary must be set before compression starts",
            ));
        }
        if self.wrap == Wrap::Gzip {
            return Err(OxiflateError::stream_state(
                "gzip streams cannot carry a preset dictionary",
            ));
        }

        self.finder.set_dictionary(dictionary);
        let id = Adler32::checksum(dictionary);
        if self.wrap == Wrap::Zlib {
            self.dict_id = Some(id);
        }
        Ok(id)
    }

    /// Change level and strategy for subsequent blocks.
    ///
    /// Input buffered so far is tokenized and closed into a block with the
    /// old parameters first (the rendered bytes drain on the next
    /// `compress` call); the new parameters apply from the next block.
    pub fn set_params(
        &mut self,
        level: impl Into<CompressionLevel>,
        strategy: Strategy,
    ) -> Result<()> {
        if matches!(self.state, State::Finishing | State::Done) {
            return Err(OxiflateError::stream_state(
                "parameters changed after stream end",
            ));
        }

        if self.state == State::Busy {
            // Compress what is buffered under the old parameters.
            if self.level.level() == 0 {
                if self.finder.block_len() > 0 {
                    self.emit_block(false)?;
                }
            } else {
                while self.finder.process(&mut self.tokens, true) == ProcessStatus::Filled {
                    self.emit_block(false)?;
                }
                if !self.tokens.is_empty() || self.finder.block_len() > 0 {
                    self.emit_block(false)?;
                }
            }
        }

        self.level = level.into();
        self.strategy = strategy;
        self.finder.set_params(self.level, strategy);
        Ok(())
    }

    /// Reset to a freshly-initialized stream, keeping allocations and
    /// configuration.
    pub fn reset(&mut self) {
        self.finder.reset();
        self.tokens.clear();
        self.writer.clear();
        self.state = State::Init;
        self.checksum = WrapChecksum::for_wrap(self.wrap);
        self.total_in = 0;
        self.total_out = 0;
        self.dict_id = None;
        self.dirty = true;
    }

    /// Whether the stream has ended.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Compress as much as the buffers allow. See [`Compressor::compress`].
    pub fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        if self.state == State::Done {
            return Err(OxiflateError::stream_state(
                "compress called after stream end",
            ));
        }

        let mut src = InputCursor::new(input);
        let mut out = OutputCursor::new(output);

        if self.state == State::Init {
            self.emit_header();
            self.state = State::Busy;
        }
        self.writer.drain_into(&mut out);

        if self.state == State::Busy {
            if self.level.level() == 0 {
                self.run_stored(&mut src, &mut out)?;
            } else {
                self.run(&mut src, &mut out, flush)?;
            }

            // Flush actions apply once every supplied byte is tokenized.
            let fully_drained = src.is_empty() && self.finder.lookahead() == 0;
            if fully_drained && (out.has_space() || !self.writer.has_pending()) {
                match flush {
                    FlushMode::None => {}
                    FlushMode::Partial | FlushMode::Sync | FlushMode::Full => {
                        if self.dirty || !self.tokens.is_empty() {
                            if !self.tokens.is_empty() || self.finder.block_len() > 0 {
                                self.emit_block(false)?;
                            }
                            self.emit_flush_marker(flush);
                            self.dirty = false;
                        }
                    }
                    FlushMode::Finish => {
                        self.emit_block(true)?;
                        self.writer.align_to_byte();
                        self.emit_trailer();
                        self.state = State::Finishing;
                    }
                }
            }
        }

        self.writer.drain_into(&mut out);

        let consumed = src.consumed();
        let produced = out.produced();
        self.total_out += produced as u64;

        if self.state == State::Finishing && !self.writer.has_pending() {
            self.state = State::Done;
            return Ok((consumed, produced, Status::StreamEnd));
        }
        if consumed > 0 || produced > 0 {
            Ok((consumed, produced, Status::Ok))
        } else {
            Ok((0, 0, Status::BufError))
        }
    }

    /// Feed the match finder from the input cursor, sliding the window (and
    /// closing the in-flight block first) whenever it fills up.
    fn fill_finder(&mut self, src: &mut InputCursor<'_>) -> Result<()> {
        loop {
            if src.is_empty() {
                return Ok(());
            }
            if self.finder.free_space() == 0 {
                if !self.finder.can_slide() {
                    return Ok(());
                }
                if !self.tokens.is_empty() || self.finder.block_len() > 0 {
                    self.emit_block(false)?;
                }
                self.finder.slide();
            }
            let n = self.finder.free_space().min(src.remaining());
            if n == 0 {
                return Ok(());
            }
            let chunk = src.take(n);
            self.checksum.update(chunk);
            self.total_in += chunk.len() as u64;
            self.finder.feed(chunk);
            self.dirty = true;
        }
    }

    /// The main compression loop for levels 1-9.
    fn run(
        &mut self,
        src: &mut InputCursor<'_>,
        out: &mut OutputCursor<'_>,
        flush: FlushMode,
    ) -> Result<()> {
        loop {
            if self.writer.has_pending() && !out.has_space() {
                return Ok(());
            }
            self.fill_finder(src)?;
            let drain = src.is_empty() && flush != FlushMode::None;
            match self.finder.process(&mut self.tokens, drain) {
                ProcessStatus::Filled => {
                    self.emit_block(false)?;
                    self.writer.drain_into(out);
                }
                ProcessStatus::NeedInput => {
                    if src.is_empty() {
                        return Ok(());
                    }
                }
                ProcessStatus::Drained => return Ok(()),
            }
        }
    }

    /// The stored-only loop for level 0.
    fn run_stored(
        &mut self,
        src: &mut InputCursor<'_>,
        out: &mut OutputCursor<'_>,
    ) -> Result<()> {
        loop {
            if self.writer.has_pending() && !out.has_space() {
                return Ok(());
            }
            self.fill_finder(src)?;
            self.finder.advance_all();
            if self.finder.block_len() >= MAX_STORED_BLOCK {
                self.emit_block(false)?;
                self.writer.drain_into(out);
            }
            if src.is_empty() {
                return Ok(());
            }
        }
    }

    /// Render the container header into the pending buffer.
    fn emit_header(&mut self) {
        match self.wrap {
            Wrap::Raw => {}
            Wrap::Zlib => {
                let cinfo = (self.finder.window_size().trailing_zeros() - 8) as u8;
                let cmf = (cinfo << 4) | 8;

                let level_hint: u8 = if self.strategy == Strategy::HuffmanOnly
                    || self.level.level() < 2
                {
                    0
                } else if self.level.level() < 6 {
                    1
                } else if self.level.level() == 6 {
                    2
                } else {
                    3
                };
                let fdict = u8::from(self.dict_id.is_some());
                let mut flg = (level_hint << 6) | (fdict << 5);
                let check = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
                if check != 0 {
                    flg += (31 - check) as u8;
                }

                self.writer.write_bytes(&[cmf, flg]);
                if let Some(id) = self.dict_id {
                    self.writer.write_bytes(&id.to_be_bytes());
                }
            }
            Wrap::Gzip => {
                let bytes = self.gzip_header.encode(self.level.level());
                self.writer.write_bytes(&bytes);
            }
        }
    }

    /// Render the container trailer into the pending buffer.
    fn emit_trailer(&mut self) {
        match &self.checksum {
            WrapChecksum::Raw => {}
            WrapChecksum::Zlib(adler) => {
                let value = adler.finish();
                self.writer.write_bytes(&value.to_be_bytes());
            }
            WrapChecksum::Gzip(crc) => {
                let value = crc.value();
                self.writer.write_bytes(&value.to_le_bytes());
                self.writer
                    .write_bytes(&(self.total_in as u32).to_le_bytes());
            }
        }
    }

    /// Append the empty block that makes a flush point.
    fn emit_flush_marker(&mut self, flush: FlushMode) {
        match flush {
            FlushMode::Partial => {
                // Empty static block: 10 bits, no byte alignment.
                self.writer.write_bits(0, 1);
                self.writer.write_bits(1, 2);
                tables::fixed_litlen_codes().emit(&mut self.writer, END_OF_BLOCK);
            }
            FlushMode::Sync | FlushMode::Full => {
                // Empty stored block: aligns the stream and leaves the
                // 00 00 FF FF marker inflateSync scans for.
                Self::write_stored(&mut self.writer, &[], false);
                if flush == FlushMode::Full {
                    self.finder.reset_history();
                }
            }
            _ => {}
        }
    }

    /// Close the current block, choosing the cheapest representation.
    fn emit_block(&mut self, last: bool) -> Result<()> {
        if self.level.level() == 0 {
            Self::write_stored(&mut self.writer, self.finder.block_bytes(), last);
            self.tokens.clear();
            self.finder.start_new_block();
            return Ok(());
        }

        let stored_len = self.finder.block_len();

        // Block-local frequencies, with the end-of-block symbol and the
        // two-code floor the wire format requires per alphabet.
        let mut lfreq = *self.tokens.litlen_freq();
        lfreq[END_OF_BLOCK as usize] += 1;
        ensure_two_codes(&mut lfreq);
        let mut dfreq = *self.tokens.dist_freq();
        ensure_two_codes(&mut dfreq);

        let lit_lengths = huffman::build_lengths(&lfreq, 15);
        let dist_lengths = huffman::build_lengths(&dfreq, 15);

        let mut hlit = LITLEN_SYMBOLS - 2;
        while hlit > 257 && lit_lengths[hlit - 1] == 0 {
            hlit -= 1;
        }
        let mut hdist = DISTANCE_SYMBOLS;
        while hdist > 1 && dist_lengths[hdist - 1] == 0 {
            hdist -= 1;
        }

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&lit_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let (rle, mut clfreq) = rle_encode(&combined);
        ensure_two_codes(&mut clfreq);
        let cl_lengths = huffman::build_lengths(&clfreq, 7);

        let mut hclen = tables::CODELEN_SYMBOLS;
        while hclen > 4 && cl_lengths[tables::CODE_LENGTH_ORDER[hclen - 1]] == 0 {
            hclen -= 1;
        }

        // Exact bit costs of the three renderings.
        let static_cost = 3 + tally_cost(
            &lfreq,
            &dfreq,
            &tables::fixed_litlen_lengths(),
            &tables::fixed_distance_lengths(),
        );
        let descriptor_cost: usize = 14
            + hclen * 3
            + rle
                .iter()
                .map(|&(sym, _, extra_bits)| {
                    cl_lengths[sym as usize] as usize + extra_bits as usize
                })
                .sum::<usize>();
        let dynamic_cost = 3 + descriptor_cost + tally_cost(&lfreq, &dfreq, &lit_lengths, &dist_lengths);
        let stored_chunks = stored_len / MAX_STORED_BLOCK + 1;
        let stored_cost = stored_len * 8 + stored_chunks * 42;

        if stored_cost < static_cost.min(dynamic_cost) {
            Self::write_stored(&mut self.writer, self.finder.block_bytes(), last);
        } else if dynamic_cost < static_cost {
            self.writer.write_bits(u32::from(last), 1);
            self.writer.write_bits(2, 2);
            self.writer.write_bits((hlit - 257) as u32, 5);
            self.writer.write_bits((hdist - 1) as u32, 5);
            self.writer.write_bits((hclen - 4) as u32, 4);
            for &order in tables::CODE_LENGTH_ORDER.iter().take(hclen) {
                self.writer.write_bits(u32::from(cl_lengths[order]), 3);
            }
            let cl_codes = HuffmanCodes::from_lengths(&cl_lengths);
            for &(sym, extra, extra_bits) in &rle {
                cl_codes.emit(&mut self.writer, u16::from(sym));
                if extra_bits > 0 {
                    self.writer.write_bits(u32::from(extra), u32::from(extra_bits));
                }
            }
            let lit_codes = HuffmanCodes::from_lengths(&lit_lengths);
            let dist_codes = HuffmanCodes::from_lengths(&dist_lengths);
            Self::write_tokens(&mut self.writer, self.tokens.tokens(), &lit_codes, &dist_codes);
        } else {
            self.writer.write_bits(u32::from(last), 1);
            self.writer.write_bits(1, 2);
            Self::write_tokens(
                &mut self.writer,
                self.tokens.tokens(),
                tables::fixed_litlen_codes(),
                tables::fixed_distance_codes(),
            );
        }

        self.tokens.clear();
        self.finder.start_new_block();
        Ok(())
    }

    /// Emit `bytes` as stored blocks, splitting at the 65535-byte format
    /// limit. An empty slice still emits one (empty) block.
    fn write_stored(writer: &mut BitWriter, bytes: &[u8], last: bool) {
        let mut offset = 0;
        loop {
            let chunk = (bytes.len() - offset).min(MAX_STORED_BLOCK);
            let final_chunk = offset + chunk == bytes.len();
            writer.write_bits(u32::from(last && final_chunk), 1);
            writer.write_bits(0, 2);
            writer.align_to_byte();
            let len = chunk as u16;
            writer.write_bytes(&len.to_le_bytes());
            writer.write_bytes(&(!len).to_le_bytes());
            writer.write_bytes(&bytes[offset..offset + chunk]);
            offset += chunk;
            if final_chunk {
                break;
            }
        }
    }

    /// Emit the token sequence plus end-of-block with the given codes.
    fn write_tokens(
        writer: &mut BitWriter,
        tokens: &[Lz77Token],
        lit_codes: &HuffmanCodes,
        dist_codes: &HuffmanCodes,
    ) {
        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => {
                    lit_codes.emit(writer, u16::from(byte));
                }
                Lz77Token::Match { length, distance } => {
                    let (len_code, len_extra_bits, len_extra) = tables::length_to_code(length);
                    lit_codes.emit(writer, len_code);
                    if len_extra_bits > 0 {
                        writer.write_bits(u32::from(len_extra), u32::from(len_extra_bits));
                    }
                    let (dist_code, dist_extra_bits, dist_extra) =
                        tables::distance_to_code(distance);
                    dist_codes.emit(writer, dist_code);
                    if dist_extra_bits > 0 {
                        writer.write_bits(u32::from(dist_extra), u32::from(dist_extra_bits));
                    }
                }
            }
        }
        lit_codes.emit(writer, END_OF_BLOCK);
    }
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status)> {
        Deflater::compress(self, input, output, flush)
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Deflater::is_finished(self)
    }
}

/// Exact bit cost of the token stream under the given code lengths,
/// including extra bits.
fn tally_cost(
    lfreq: &[u32; LITLEN_SYMBOLS],
    dfreq: &[u32; DISTANCE_SYMBOLS],
    lit_lengths: &[u8],
    dist_lengths: &[u8],
) -> usize {
    let mut bits = 0usize;
    for (sym, &freq) in lfreq.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        bits += freq as usize * lit_lengths[sym] as usize;
        if (257..=285).contains(&sym) {
            bits += freq as usize * LENGTH_EXTRA_BITS[sym - 257] as usize;
        }
    }
    for (sym, &freq) in dfreq.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        bits += freq as usize * (dist_lengths[sym] as usize + DISTANCE_EXTRA_BITS[sym] as usize);
    }
    bits
}

/// Force at least two symbols to carry codes; the format requires complete
/// trees, and a complete tree needs at least two leaves.
fn ensure_two_codes(freq: &mut [u32]) {
    let mut used = freq.iter().filter(|&&f| f > 0).count();
    let mut next = 0;
    while used < 2 {
        if freq[next] == 0 {
            freq[next] = 1;
            used += 1;
        }
        next += 1;
    }
}

/// Run-length encode tree lengths into code-length symbols
/// `(symbol, extra_value, extra_bits)` plus their frequencies
/// (RFC 1951 3.2.7: 16 repeats the previous length, 17/18 encode zero runs).
fn rle_encode(lengths: &[u8]) -> (Vec<(u8, u8, u8)>, [u32; tables::CODELEN_SYMBOLS]) {
    let mut out = Vec::new();
    let mut freqs = [0u32; tables::CODELEN_SYMBOLS];
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut count = run;
            while count >= 11 {
                let r = count.min(138);
                out.push((18, (r - 11) as u8, 7));
                freqs[18] += 1;
                count -= r;
            }
            if count >= 3 {
                out.push((17, (count - 3) as u8, 3));
                freqs[17] += 1;
                count = 0;
            }
            while count > 0 {
                out.push((0, 0, 0));
                freqs[0] += 1;
                count -= 1;
            }
        } else {
            out.push((value, 0, 0));
            freqs[value as usize] += 1;
            let mut count = run - 1;
            while count >= 3 {
                let r = count.min(6);
                out.push((16, (r - 3) as u8, 2));
                freqs[16] += 1;
                count -= r;
            }
            while count > 0 {
                out.push((value, 0, 0));
                freqs[value as usize] += 1;
                count -= 1;
            }
        }

        i += run;
    }

    (out, freqs)
}
