//! Sliding-window history buffer for back-reference replay.
//!
//! During decompression every produced byte enters a circular window so that
//! later `(length, distance)` pairs can copy from it. The window also
//! receives preset dictionary bytes, which count as history without ever
//! appearing in the output.
//!
//! DEFLATE windows are `2^n` bytes for `n` in `8..=15` (256 bytes up to
//! 32 KB); distances never exceed the window size.

use crate::error::{OxiflateError, Result};

/// Smallest legal window size (window bits 8).
pub const MIN_WINDOW_SIZE: usize = 256;

/// Largest legal window size (window bits 15).
pub const MAX_WINDOW_SIZE: usize = 32768;

/// A circular history buffer of power-of-two capacity.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<u8>,
    /// Next write position.
    position: usize,
    /// Bytes of valid history (up to capacity).
    size: usize,
    mask: usize,
}

impl RingBuffer {
    /// Create a ring buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two in
    /// `MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE`.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two()
                && (MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&capacity),
            "Window capacity must be a power of 2 in 256..=32768, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            position: 0,
            size: 0,
            mask: capacity - 1,
        }
    }

    /// Create a ring buffer from a window-bits value (8..=15).
    pub fn with_window_bits(bits: u8) -> Self {
        Self::new(1usize << bits)
    }

    /// Total capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes of history currently held.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether no history is held.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.position = 0;
        self.size = 0;
    }

    /// Read the byte `distance` positions back from the write position.
    ///
    /// Distance 1 is the most recently written byte.
    pub fn byte_at(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.size {
            return Err(OxiflateError::invalid_distance(distance, self.size));
        }
        let index = self.position.wrapping_sub(distance) & self.mask;
        Ok(self.buffer[index])
    }

    /// Append produced bytes, keeping only the newest `capacity` bytes.
    ///
    /// Called with each chunk of decompressed output; chunks larger than the
    /// window simply replace its whole contents with their tail.
    pub fn extend(&mut self, bytes: &[u8]) {
        let cap = self.capacity();
        let src = if bytes.len() >= cap {
            // Only the tail survives; restart the ring for a single copy.
            self.position = 0;
            &bytes[bytes.len() - cap..]
        } else {
            bytes
        };

        let first = (cap - self.position).min(src.len());
        self.buffer[self.position..self.position + first].copy_from_slice(&src[..first]);
        if first < src.len() {
            let rest = src.len() - first;
            self.buffer[..rest].copy_from_slice(&src[first..]);
        }
        self.position = (self.position + src.len()) & self.mask;
        self.size = (self.size + src.len()).min(cap);
    }

    /// Load dictionary bytes as history without producing output.
    ///
    /// When the dictionary exceeds the capacity only its tail is kept, as
    /// the zlib format prescribes.
    pub fn preload_dictionary(&mut self, dictionary: &[u8]) {
        self.extend(dictionary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut ring = RingBuffer::new(256);
        ring.extend(b"Hello");

        assert_eq!(ring.len(), 5);
        assert_eq!(ring.byte_at(1).unwrap(), b'o');
        assert_eq!(ring.byte_at(2).unwrap(), b'l');
        assert_eq!(ring.byte_at(5).unwrap(), b'H');
    }

    #[test]
    fn test_wrap() {
        let mut ring = RingBuffer::new(256);
        for _ in 0..60 {
            ring.extend(b"0123456789");
        }

        assert_eq!(ring.len(), 256);
        assert_eq!(ring.byte_at(1).unwrap(), b'9');
        assert_eq!(ring.byte_at(10).unwrap(), b'0');
        assert_eq!(ring.byte_at(256).unwrap(), b'4');
    }

    #[test]
    fn test_oversized_chunk() {
        let mut ring = RingBuffer::new(256);
        let chunk: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
        ring.extend(&chunk);

        assert_eq!(ring.len(), 256);
        assert_eq!(ring.byte_at(1).unwrap(), chunk[999]);
        assert_eq!(ring.byte_at(256).unwrap(), chunk[744]);
    }

    #[test]
    fn test_invalid_distance() {
        let mut ring = RingBuffer::new(256);
        assert!(ring.byte_at(0).is_err());
        assert!(ring.byte_at(1).is_err());

        ring.extend(b"abc");
        assert!(ring.byte_at(3).is_ok());
        assert!(ring.byte_at(4).is_err());
    }

    #[test]
    fn test_dictionary_preload() {
        let mut ring = RingBuffer::new(256);
        let dict: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
        ring.preload_dictionary(&dict);

        // Only the last 256 bytes are kept
        assert_eq!(ring.len(), 256);
        assert_eq!(ring.byte_at(1).unwrap(), dict[299]);
        assert_eq!(ring.byte_at(256).unwrap(), dict[44]);
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_bad_capacity_panics() {
        let _ = RingBuffer::new(1000);
    }
}
