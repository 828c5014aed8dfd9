//! LZ77 match finding for DEFLATE compression.
//!
//! The match finder owns the encode-side window: a linear buffer of twice
//! the window size whose upper half is periodically slid down, plus hash
//! chains keyed on a 3-byte prefix that link window positions sharing that
//! prefix, most recent first.
//!
//! Levels 1-3 run a greedy scan; levels 4-9 add lazy evaluation, deferring a
//! match by one byte when the position after it starts a strictly longer
//! one. Search effort per level follows the classic `(good, lazy, nice,
//! chain)` tuning table.

use crate::tables::{MAX_MATCH, MIN_MATCH};
use oxiflate_core::traits::{CompressionLevel, Strategy};

/// Hash table size (power of 2).
const HASH_SIZE: usize = 1 << 15;

/// Hash mask.
const HASH_MASK: usize = HASH_SIZE - 1;

/// Chain terminator. Position 0 cannot appear in a chain; the first window
/// byte only ever starts matches as a head candidate.
const NIL: u16 = 0;

/// Lookahead the finder wants before searching at full strength: one
/// maximal match plus one minimal match plus one byte.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// A token produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

/// Outcome of one processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The token buffer filled; emit a block and continue.
    Filled,
    /// Lookahead dropped below the safety margin; feed more input.
    NeedInput,
    /// All buffered input was tokenized (drain mode only).
    Drained,
}

/// Per-level search tuning, in the classic zlib arrangement.
#[derive(Debug, Clone, Copy)]
struct LevelConfig {
    /// Reduce chain effort once a match of this length is already in hand.
    good_length: u16,
    /// Matches up to this length may be deferred for a better one.
    max_lazy: u16,
    /// Stop searching once a match of this length is found.
    nice_length: u16,
    /// Maximum hash-chain positions to examine.
    max_chain: u16,
    /// Whether lazy evaluation is enabled at all.
    lazy: bool,
}

const LEVEL_CONFIGS: [LevelConfig; 10] = [
    // level 0 is stored-only; the finder is bypassed
    LevelConfig { good_length: 0, max_lazy: 0, nice_length: 0, max_chain: 0, lazy: false },
    LevelConfig { good_length: 4, max_lazy: 4, nice_length: 8, max_chain: 4, lazy: false },
    LevelConfig { good_length: 4, max_lazy: 5, nice_length: 16, max_chain: 8, lazy: false },
    LevelConfig { good_length: 4, max_lazy: 6, nice_length: 32, max_chain: 32, lazy: false },
    LevelConfig { good_length: 4, max_lazy: 4, nice_length: 16, max_chain: 16, lazy: true },
    LevelConfig { good_length: 8, max_lazy: 16, nice_length: 32, max_chain: 32, lazy: true },
    LevelConfig { good_length: 8, max_lazy: 16, nice_length: 128, max_chain: 128, lazy: true },
    LevelConfig { good_length: 8, max_lazy: 32, nice_length: 128, max_chain: 256, lazy: true },
    LevelConfig { good_length: 32, max_lazy: 128, nice_length: 258, max_chain: 1024, lazy: true },
    LevelConfig { good_length: 32, max_lazy: 258, nice_length: 258, max_chain: 4096, lazy: true },
];

/// Buffered tokens for the block under construction, with running symbol
/// frequencies for the Huffman builder.
#[derive(Debug, Clone)]
pub struct TokenBuffer {
    tokens: Vec<Lz77Token>,
    litlen_freq: [u32; crate::tables::LITLEN_SYMBOLS],
    dist_freq: [u32; crate::tables::DISTANCE_SYMBOLS],
    limit: usize,
}

impl TokenBuffer {
    /// Create a buffer that reports full after `limit` tokens.
    pub fn new(limit: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(limit),
            litlen_freq: [0; crate::tables::LITLEN_SYMBOLS],
            dist_freq: [0; crate::tables::DISTANCE_SYMBOLS],
            limit,
        }
    }

    /// Discard all tokens and frequencies.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.litlen_freq.fill(0);
        self.dist_freq.fill(0);
    }

    /// Whether the block should be closed.
    pub fn is_full(&self) -> bool {
        self.tokens.len() >= self.limit
    }

    /// Whether no tokens are buffered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of buffered tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Append a literal.
    pub fn push_literal(&mut self, byte: u8) {
        self.tokens.push(Lz77Token::Literal(byte));
        self.litlen_freq[byte as usize] += 1;
    }

    /// Append a back-reference.
    pub fn push_match(&mut self, length: u16, distance: u16) {
        self.tokens.push(Lz77Token::Match { length, distance });
        let (len_code, _, _) = crate::tables::length_to_code(length);
        self.litlen_freq[len_code as usize] += 1;
        let (dist_code, _, _) = crate::tables::distance_to_code(distance);
        self.dist_freq[dist_code as usize] += 1;
    }

    /// The buffered tokens.
    pub fn tokens(&self) -> &[Lz77Token] {
        &self.tokens
    }

    /// Literal/length symbol frequencies.
    pub fn litlen_freq(&self) -> &[u32; crate::tables::LITLEN_SYMBOLS] {
        &self.litlen_freq
    }

    /// Distance symbol frequencies.
    pub fn dist_freq(&self) -> &[u32; crate::tables::DISTANCE_SYMBOLS] {
        &self.dist_freq
    }
}

/// Hash-chain match finder over the encode window.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    /// Linear window, twice the nominal window size.
    window: Vec<u8>,
    w_size: usize,
    w_mask: usize,
    /// hash -> most recent position with that 3-byte prefix.
    head: Vec<u16>,
    /// position -> previous position with the same prefix.
    prev: Vec<u16>,
    /// Next byte to tokenize.
    strstart: usize,
    /// Valid bytes beyond `strstart`.
    lookahead: usize,
    /// Start of the current block's raw bytes.
    block_start: usize,
    config: LevelConfig,
    strategy: Strategy,
    // Lazy-evaluation carry-over between positions.
    match_available: bool,
    match_length: usize,
    match_start: usize,
}

impl MatchFinder {
    /// Create a finder for the given level, strategy and window bits.
    ///
    /// Window bits below 9 are promoted to 9: the search lookahead does not
    /// fit a 256-byte window (decoding 256-byte windows is unaffected).
    pub fn new(level: CompressionLevel, strategy: Strategy, window_bits: u8) -> Self {
        let bits = window_bits.clamp(9, 15);
        let w_size = 1usize << bits;

        Self {
            window: vec![0; 2 * w_size],
            w_size,
            w_mask: w_size - 1,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; w_size],
            strstart: 0,
            lookahead: 0,
            block_start: 0,
            config: LEVEL_CONFIGS[level.level() as usize],
            strategy,
            match_available: false,
            match_length: MIN_MATCH - 1,
            match_start: 0,
        }
    }

    /// Nominal window size in bytes.
    pub fn window_size(&self) -> usize {
        self.w_size
    }

    /// Largest distance a match may span.
    pub fn max_dist(&self) -> usize {
        self.w_size - MIN_LOOKAHEAD
    }

    /// Bytes buffered but not yet tokenized.
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Length of the current block's raw bytes.
    pub fn block_len(&self) -> usize {
        self.strstart - self.block_start
    }

    /// The current block's raw bytes (for stored-block emission).
    pub fn block_bytes(&self) -> &[u8] {
        &self.window[self.block_start..self.strstart]
    }

    /// Mark the current position as the start of the next block.
    pub fn start_new_block(&mut self) {
        self.block_start = self.strstart;
    }

    /// Free space left for feeding input.
    pub fn free_space(&self) -> usize {
        self.window.len() - (self.strstart + self.lookahead)
    }

    /// Whether the lower window half may be discarded.
    pub fn can_slide(&self) -> bool {
        self.strstart >= self.w_size + self.max_dist()
    }

    /// Append input bytes to the lookahead. `chunk` must fit in
    /// [`Self::free_space`].
    pub fn feed(&mut self, chunk: &[u8]) {
        let end = self.strstart + self.lookahead;
        self.window[end..end + chunk.len()].copy_from_slice(chunk);
        self.lookahead += chunk.len();
    }

    /// Drop the lower window half and rebase all positions.
    ///
    /// The caller must have flushed the current block first so that
    /// `block_start` stays inside the window.
    pub fn slide(&mut self) {
        debug_assert!(self.block_start >= self.w_size, "slide with unflushed block");
        let w_size = self.w_size;

        self.window.copy_within(w_size.., 0);
        self.strstart -= w_size;
        self.block_start -= w_size;
        self.match_start = self.match_start.saturating_sub(w_size);

        for slot in self.head.iter_mut().chain(self.prev.iter_mut()) {
            *slot = if *slot >= w_size as u16 {
                *slot - w_size as u16
            } else {
                NIL
            };
        }
    }

    /// Update the search tuning for a new level/strategy. Takes effect for
    /// subsequent searches; buffered state is untouched.
    pub fn set_params(&mut self, level: CompressionLevel, strategy: Strategy) {
        self.config = LEVEL_CONFIGS[level.level() as usize];
        self.strategy = strategy;
    }

    /// Forget all match history (the full-flush reset). Buffered lookahead
    /// survives; with empty chains nothing before this point can be
    /// referenced again.
    pub fn reset_history(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.match_available = false;
        self.match_length = MIN_MATCH - 1;
        if self.lookahead == 0 {
            // Move the window back when between inputs.
            self.strstart = 0;
            self.block_start = 0;
        }
    }

    /// Reset to the freshly-constructed state, keeping allocations.
    pub fn reset(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.strstart = 0;
        self.lookahead = 0;
        self.block_start = 0;
        self.match_available = false;
        self.match_length = MIN_MATCH - 1;
        self.match_start = 0;
    }

    /// Prime the window with dictionary bytes, seeding the hash chains so
    /// the first real input can match into the dictionary. Must be called
    /// before any input is fed.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) {
        debug_assert!(self.strstart == 0 && self.lookahead == 0);

        // Only the most useful tail fits; the window also reserves the
        // lookahead margin, as deflate always has.
        let usable = dictionary.len().min(self.w_size - MIN_LOOKAHEAD);
        let tail = &dictionary[dictionary.len() - usable..];

        self.window[..usable].copy_from_slice(tail);
        self.strstart = usable;
        self.block_start = usable;

        for pos in 0..usable.saturating_sub(MIN_MATCH - 1) {
            self.insert_hash(pos);
        }
    }

    /// Hash three bytes into the chain table index.
    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = (b0 as usize).wrapping_mul(506832829)
            ^ (b1 as usize).wrapping_mul(2654435761) << 8
            ^ (b2 as usize).wrapping_mul(374761393) << 16;
        (h ^ (h >> 15)) & HASH_MASK
    }

    /// Register `pos` in the hash chains, returning the previous head.
    #[inline]
    fn insert_hash(&mut self, pos: usize) -> u16 {
        let h = Self::hash(
            self.window[pos],
            self.window[pos + 1],
            self.window[pos + 2],
        );
        let prior = self.head[h];
        self.prev[pos & self.w_mask] = prior;
        self.head[h] = pos as u16;
        prior
    }

    /// Walk the hash chain from `cur_match` looking for the longest match
    /// at `strstart`, accepting only matches strictly longer than
    /// `best_len_floor`. Ties prefer the most recent candidate, which the
    /// chain order gives for free.
    fn longest_match(&self, mut cur_match: usize, best_len_floor: usize) -> (usize, usize) {
        let scan = self.strstart;
        let max_len = MAX_MATCH.min(self.lookahead);
        let limit = scan.saturating_sub(self.max_dist());
        let nice = (self.config.nice_length as usize).min(max_len);

        let mut chain = self.config.max_chain as usize;
        if best_len_floor >= self.config.good_length as usize {
            chain >>= 2;
        }

        let mut best_len = best_len_floor;
        let mut best_dist = 0usize;

        loop {
            // Cheap rejects: last byte of the would-be improvement, then
            // the first byte.
            if self.window[cur_match + best_len.min(max_len.saturating_sub(1))]
                == self.window[scan + best_len.min(max_len.saturating_sub(1))]
                && self.window[cur_match] == self.window[scan]
            {
                let mut len = 0;
                while len < max_len && self.window[cur_match + len] == self.window[scan + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = scan - cur_match;
                    if len >= nice {
                        break;
                    }
                }
            }

            if chain <= 1 {
                break;
            }
            chain -= 1;

            let next = self.prev[cur_match & self.w_mask] as usize;
            if next <= limit || next == NIL as usize {
                break;
            }
            cur_match = next;
        }

        if best_dist > 0 { (best_len, best_dist) } else { (0, 0) }
    }

    /// Tokenize buffered lookahead.
    ///
    /// In drain mode the run continues down to zero lookahead; otherwise it
    /// pauses once the safety margin is gone so full-strength matches stay
    /// possible. Lazy-evaluation state is preserved across pauses.
    pub fn process(&mut self, tokens: &mut TokenBuffer, drain: bool) -> ProcessStatus {
        match self.strategy {
            Strategy::HuffmanOnly => self.process_literals(tokens, drain),
            _ if self.config.lazy => self.process_lazy(tokens, drain),
            _ => self.process_greedy(tokens, drain),
        }
    }

    /// Advance over all lookahead without producing tokens (stored-only
    /// compression keeps the bytes in the window for block emission).
    pub fn advance_all(&mut self) {
        self.strstart += self.lookahead;
        self.lookahead = 0;
    }

    fn process_literals(&mut self, tokens: &mut TokenBuffer, drain: bool) -> ProcessStatus {
        loop {
            if tokens.is_full() {
                return ProcessStatus::Filled;
            }
            if self.lookahead == 0 {
                return if drain {
                    ProcessStatus::Drained
                } else {
                    ProcessStatus::NeedInput
                };
            }
            tokens.push_literal(self.window[self.strstart]);
            self.strstart += 1;
            self.lookahead -= 1;
        }
    }

    fn process_greedy(&mut self, tokens: &mut TokenBuffer, drain: bool) -> ProcessStatus {
        loop {
            if tokens.is_full() {
                return ProcessStatus::Filled;
            }
            if self.lookahead < MIN_LOOKAHEAD && !drain {
                return ProcessStatus::NeedInput;
            }
            if self.lookahead == 0 {
                return ProcessStatus::Drained;
            }

            let mut match_len = 0usize;
            let mut match_dist = 0usize;
            if self.lookahead >= MIN_MATCH {
                let head = self.insert_hash(self.strstart);
                if head != NIL && self.strstart - (head as usize) <= self.max_dist() {
                    (match_len, match_dist) =
                        self.longest_match(head as usize, MIN_MATCH - 1);
                }
            }
            if self.strategy == Strategy::Filtered && match_len <= 5 {
                match_len = 0;
            }

            if match_len >= MIN_MATCH {
                tokens.push_match(match_len as u16, match_dist as u16);

                let data_end = self.strstart + self.lookahead;
                self.lookahead -= match_len;
                if match_len <= self.config.max_lazy as usize {
                    // Register every covered position for future matches.
                    for _ in 1..match_len {
                        self.strstart += 1;
                        if self.strstart + MIN_MATCH <= data_end {
                            self.insert_hash(self.strstart);
                        }
                    }
                    self.strstart += 1;
                } else {
                    self.strstart += match_len;
                }
            } else {
                tokens.push_literal(self.window[self.strstart]);
                self.strstart += 1;
                self.lookahead -= 1;
            }
        }
    }

    fn process_lazy(&mut self, tokens: &mut TokenBuffer, drain: bool) -> ProcessStatus {
        loop {
            if tokens.is_full() {
                return ProcessStatus::Filled;
            }
            if self.lookahead < MIN_LOOKAHEAD && !drain {
                return ProcessStatus::NeedInput;
            }
            if self.lookahead == 0 {
                if self.match_available {
                    tokens.push_literal(self.window[self.strstart - 1]);
                    self.match_available = false;
                }
                return ProcessStatus::Drained;
            }

            let mut hash_head = NIL;
            if self.lookahead >= MIN_MATCH {
                hash_head = self.insert_hash(self.strstart);
            }

            let prev_length = self.match_length;
            let prev_match = self.match_start;
            self.match_length = MIN_MATCH - 1;

            if hash_head != NIL
                && prev_length < self.config.max_lazy as usize
                && self.strstart - (hash_head as usize) <= self.max_dist()
            {
                let (len, dist) = self.longest_match(hash_head as usize, prev_length);
                if len >= MIN_MATCH {
                    self.match_length = len;
                    self.match_start = self.strstart - dist;
                }
                if self.strategy == Strategy::Filtered && self.match_length <= 5 {
                    self.match_length = MIN_MATCH - 1;
                }
            }

            if prev_length >= MIN_MATCH && self.match_length <= prev_length {
                // The previous position's match stands; emit it.
                let distance = (self.strstart - 1) - prev_match;
                tokens.push_match(prev_length as u16, distance as u16);

                // The match covers strstart-1 .. strstart+prev_length-2;
                // register its interior positions. The position after the
                // match is registered by its own iteration.
                let data_end = self.strstart + self.lookahead;
                self.lookahead -= prev_length - 1;
                let mut remaining = prev_length - 2;
                while remaining > 0 {
                    self.strstart += 1;
                    if self.strstart + MIN_MATCH <= data_end {
                        self.insert_hash(self.strstart);
                    }
                    remaining -= 1;
                }
                self.strstart += 1;
                self.match_available = false;
                self.match_length = MIN_MATCH - 1;
            } else if self.match_available {
                // Current match is better; the previous byte goes out as a
                // literal and the decision moves one position forward.
                tokens.push_literal(self.window[self.strstart - 1]);
                self.strstart += 1;
                self.lookahead -= 1;
            } else {
                self.match_available = true;
                self.strstart += 1;
                self.lookahead -= 1;
            }
        }
    }
}
