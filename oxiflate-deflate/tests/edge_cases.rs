//! Edge case tests for DEFLATE compression.

use oxiflate_deflate::{deflate, gzip_compress, gzip_decompress, inflate, zlib_compress, zlib_decompress};

/// Deterministic pseudo-random bytes (no external entropy needed).
fn lcg_bytes(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((seed >> 24) as u8);
    }
    out
}

#[test]
fn test_empty_input() {
    for level in [0u8, 1, 6, 9] {
        let compressed = deflate(b"", level).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert!(decompressed.is_empty(), "level {}", level);
    }
}

#[test]
fn test_single_byte() {
    let input = b"A";
    let compressed = deflate(input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    // Repeating 258-byte pattern exercises the maximum match length.
    let pattern = vec![42u8; 258];
    let mut input = Vec::new();
    for _ in 0..10 {
        input.extend_from_slice(&pattern);
    }

    let compressed = deflate(&input, 9).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_alternating_pattern() {
    let mut input = Vec::with_capacity(2000);
    for i in 0..1000 {
        input.push(if i % 2 == 0 { b'A' } else { b'B' });
    }

    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_large_repetitive_input() {
    // 1 MB of repeating text.
    let mut input = Vec::with_capacity(1024 * 1024);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while input.len() < 1024 * 1024 {
        input.extend_from_slice(pattern);
    }
    input.truncate(1024 * 1024);

    let compressed = deflate(&input, 5).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_large_random_input() {
    // 1 MB of incompressible data must still round-trip; stored blocks
    // keep the expansion tiny.
    let input = lcg_bytes(1024 * 1024, 0xDEADBEEF);

    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert!(compressed.len() < input.len() + input.len() / 64 + 128);
}

#[test]
fn test_binary_data() {
    let input: Vec<u8> = (0..=255u8).cycle().take(5000).collect();

    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_compression_levels() {
    let input = b"Hello, world! This is a test of DEFLATE compression with various levels.";

    for level in 0..=9u8 {
        let compressed = deflate(input, level).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input, "level {} failed", level);

        if level == 0 {
            // Stored blocks carry framing overhead.
            assert!(compressed.len() > input.len());
        }
    }
}

#[test]
fn test_long_distance_match() {
    // A pattern repeated 32 KB apart, at the far edge of the window.
    let mut input = vec![0u8; 32768];
    let pattern = b"PATTERN_TO_MATCH";
    input[0..pattern.len()].copy_from_slice(pattern);
    input[32768 - pattern.len()..].copy_from_slice(pattern);

    let compressed = deflate(&input, 9).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_input_larger_than_window() {
    // Forces window slides on both sides.
    let mut input = Vec::with_capacity(300_000);
    let phrase = b"sliding windows must keep their chains honest ";
    while input.len() < 300_000 {
        input.extend_from_slice(phrase);
    }

    for level in [1u8, 6, 9] {
        let compressed = deflate(&input, level).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input, "level {}", level);
    }
}

#[test]
fn test_zlib_levels_roundtrip() {
    let data = b"Hello, World! Hello, World! Hello, World!";

    for level in 0..=9u8 {
        let compressed = zlib_compress(data, level).unwrap();
        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(&decompressed[..], &data[..], "level {}", level);
    }
}

#[test]
fn test_gzip_roundtrip() {
    let data = b"gzip framing round trip with a little bit of text";
    let compressed = gzip_compress(data, 6).unwrap();
    assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
    let decompressed = gzip_decompress(&compressed).unwrap();
    assert_eq!(&decompressed[..], &data[..]);
}

#[test]
fn test_truncated_stream_is_an_error() {
    let compressed = zlib_compress(b"some reasonably sized payload here", 6).unwrap();
    let truncated = &compressed[..compressed.len() - 5];
    assert!(zlib_decompress(truncated).is_err());
}

#[test]
fn test_garbage_header_is_an_error() {
    assert!(zlib_decompress(&[0x08, 0x1D, 0x00, 0x00, 0x00, 0x01]).is_err());
    assert!(gzip_decompress(&[0x50, 0x4B, 0x03, 0x04, 0, 0, 0, 0, 0, 0]).is_err());
}
