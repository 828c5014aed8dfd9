//! Adler-32 checksum (RFC 1950).
//!
//! The checksum carried in the zlib trailer and used to identify preset
//! dictionaries. Two 16-bit sums modulo 65521 (the largest prime below
//! 2^16); deferred reduction every `NMAX` bytes keeps the sums inside `u32`.

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Largest number of bytes that can be summed before `b` must be reduced.
const NMAX: usize = 5552;

/// Adler-32 checksum calculator.
///
/// # Example
///
/// ```
/// use oxiflate_core::adler::Adler32;
///
/// let mut adler = Adler32::new();
/// adler.update(b"Hello");
/// assert_eq!(adler.finish(), 0x058C01F5);
/// ```
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new calculator with the initial value 1.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        self.a = 1;
        self.b = 0;
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        let mut remaining = data;
        while remaining.len() >= NMAX {
            let (chunk, rest) = remaining.split_at(NMAX);
            remaining = rest;

            for &byte in chunk {
                a += byte as u32;
                b += a;
            }

            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        for &byte in remaining {
            a += byte as u32;
            b += a;
        }

        self.a = a % ADLER_MOD;
        self.b = b % ADLER_MOD;
    }

    /// Current checksum value.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute the checksum of a slice in one call.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(Adler32::checksum(&[]), 1);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
        // "Wikipedia" from the algorithm's reference article
        assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E60398);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"Hello, World! Hello, World!";

        let one_shot = Adler32::checksum(data);

        let mut adler = Adler32::new();
        adler.update(&data[..6]);
        adler.update(&data[6..]);
        assert_eq!(adler.finish(), one_shot);
    }

    #[test]
    fn test_deferred_reduction() {
        // Exercise the NMAX chunking path
        let data = vec![0xFFu8; 3 * NMAX + 17];

        let mut adler = Adler32::new();
        adler.update(&data);
        let chunked = adler.finish();

        let mut byte_wise = Adler32::new();
        for byte in &data {
            byte_wise.update(std::slice::from_ref(byte));
        }
        assert_eq!(byte_wise.finish(), chunked);
    }
}
