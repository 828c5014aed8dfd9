//! Streaming behavior: chunked calls, flush points, dictionaries,
//! parameter switches and window boundary conditions.

use oxiflate_core::bitstream::{BitWriter, OutputCursor};
use oxiflate_core::error::OxiflateError;
use oxiflate_core::traits::{FlushMode, Status, Strategy};
use oxiflate_deflate::{
    tables, zlib_compress_with_dict, zlib_decompress, zlib_decompress_with_dict, Deflater,
    Inflater, Wrap,
};

fn finish_stream(deflater: &mut Deflater, input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 4096];
    let mut pos = 0;
    loop {
        let (consumed, produced, status) = deflater
            .compress(&input[pos..], &mut buffer, FlushMode::Finish)
            .unwrap();
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }
    output
}

fn inflate_stream(inflater: &mut Inflater, input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 4096];
    let mut pos = 0;
    loop {
        let (consumed, produced, status) = inflater
            .decompress(&input[pos..], &mut buffer, FlushMode::None)
            .unwrap();
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
        match status {
            Status::StreamEnd => break,
            Status::Ok => {}
            other => panic!("unexpected status {:?}", other),
        }
    }
    output
}

fn sample_text(len: usize) -> Vec<u8> {
    b"Round and round the rugged rock the ragged rascal ran. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

#[test]
fn test_chunked_compression_matches_one_shot() {
    let input = sample_text(50_000);

    let mut reference = Deflater::new(6);
    let expected = finish_stream(&mut reference, &input);

    for chunk_size in [1usize, 7, 1024] {
        let mut deflater = Deflater::new(6);
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 311];
        let mut pos = 0;
        loop {
            let end = (pos + chunk_size).min(input.len());
            // Finish is only legal once the chunk in hand is the last one.
            let flush = if end == input.len() {
                FlushMode::Finish
            } else {
                FlushMode::None
            };
            let (consumed, produced, status) = deflater
                .compress(&input[pos..end], &mut buffer, flush)
                .unwrap();
            pos += consumed;
            output.extend_from_slice(&buffer[..produced]);
            if status == Status::StreamEnd {
                break;
            }
        }
        assert_eq!(output, expected, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_sync_flush_alignment_and_recovery() {
    let part_a = b"first segment, decodable on its own after the flush";

    let mut deflater = Deflater::raw(6);
    let mut buffer = vec![0u8; 4096];
    let (consumed, produced, status) = deflater
        .compress(part_a, &mut buffer, FlushMode::Sync)
        .unwrap();
    assert_eq!(consumed, part_a.len());
    assert_eq!(status, Status::Ok);

    let emitted = &buffer[..produced];
    // Byte-aligned empty stored block at the end.
    assert_eq!(&emitted[produced - 4..], &[0x00, 0x00, 0xFF, 0xFF]);

    // Everything emitted so far decodes completely.
    let mut inflater = Inflater::raw();
    let mut out = vec![0u8; 4096];
    let (_, decoded, status) = inflater
        .decompress(emitted, &mut out, FlushMode::None)
        .unwrap();
    assert_eq!(&out[..decoded], &part_a[..]);
    assert_eq!(status, Status::Ok);
    assert!(inflater.sync_point());

    // A fresh decoder can locate the flush point by scanning.
    let mut scanner = Inflater::raw();
    let (scanned, status) = scanner.sync(emitted).unwrap();
    assert_eq!(status, Status::Ok);
    assert_eq!(scanned, produced);
}

#[test]
fn test_full_flush_allows_independent_restart() {
    // The second segment repeats the first's content; only a history reset
    // keeps its back-references self-contained.
    let part_a = b"shared phrasing that would normally be matched across segments";
    let part_b = b"shared phrasing that would normally be matched across segments, again";

    let mut deflater = Deflater::raw(9);
    let mut buffer = vec![0u8; 4096];
    let (_, _, status) = deflater
        .compress(part_a, &mut buffer, FlushMode::Full)
        .unwrap();
    assert_eq!(status, Status::Ok);

    let mut tail = vec![0u8; 4096];
    let (consumed, produced, status) = deflater
        .compress(part_b, &mut tail, FlushMode::Finish)
        .unwrap();
    assert_eq!(consumed, part_b.len());
    assert_eq!(status, Status::StreamEnd);

    // Decompressing only the bytes after the flush point succeeds without
    // any earlier window context.
    let mut inflater = Inflater::raw();
    let restarted = inflate_stream(&mut inflater, &tail[..produced]);
    assert_eq!(restarted, part_b);
}

#[test]
fn test_partial_flush_makes_input_decodable() {
    let part_a = b"partial flush segment";

    let mut deflater = Deflater::raw(6);
    let mut buffer = vec![0u8; 4096];
    let (_, produced, _) = deflater
        .compress(part_a, &mut buffer, FlushMode::Partial)
        .unwrap();

    let mut inflater = Inflater::raw();
    let mut out = vec![0u8; 4096];
    let (_, decoded, _) = inflater
        .decompress(&buffer[..produced], &mut out, FlushMode::None)
        .unwrap();
    assert_eq!(&out[..decoded], &part_a[..]);
}

#[test]
fn test_dictionary_roundtrip_and_mismatch() {
    let dictionary = b"Hello World common patterns repeating text";
    let data = b"Hello World Hello World repeating text patterns";

    let compressed = zlib_compress_with_dict(data, 6, dictionary).unwrap();

    // FDICT is set, so plain decompression must refuse.
    assert!(zlib_decompress(&compressed).is_err());

    let decompressed = zlib_decompress_with_dict(&compressed, dictionary).unwrap();
    assert_eq!(decompressed, data);

    // A different dictionary fails the Adler-32 cross-check.
    let err = zlib_decompress_with_dict(&compressed, b"wrong dictionary data");
    assert!(matches!(err, Err(OxiflateError::CrcMismatch { .. })));
}

#[test]
fn test_dictionary_improves_ratio() {
    let dictionary = sample_text(2000);
    let data = sample_text(300);

    let with_dict = zlib_compress_with_dict(&data, 9, &dictionary).unwrap();
    let without = oxiflate_deflate::zlib_compress(&data, 9).unwrap();
    assert!(
        with_dict.len() <= without.len(),
        "dictionary should not hurt: {} vs {}",
        with_dict.len(),
        without.len()
    );
}

#[test]
fn test_params_switch_mid_stream() {
    let input = sample_text(60_000);
    let (first, second) = input.split_at(30_000);

    let mut deflater = Deflater::new(1);
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 8192];

    let mut pos = 0;
    while pos < first.len() {
        let (consumed, produced, _) = deflater
            .compress(&first[pos..], &mut buffer, FlushMode::None)
            .unwrap();
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
    }

    deflater.set_params(9, Strategy::Default).unwrap();

    let mut pos = 0;
    loop {
        let (consumed, produced, status) = deflater
            .compress(&second[pos..], &mut buffer, FlushMode::Finish)
            .unwrap();
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
        if status == Status::StreamEnd {
            break;
        }
    }

    let mut inflater = Inflater::new();
    let decompressed = inflate_stream(&mut inflater, &output);
    assert_eq!(decompressed, input);
}

#[test]
fn test_strategy_variants_roundtrip() {
    let input = sample_text(10_000);

    for strategy in [Strategy::Default, Strategy::Filtered, Strategy::HuffmanOnly] {
        let mut deflater = Deflater::with_options(6, 15, Wrap::Zlib, strategy).unwrap();
        let compressed = finish_stream(&mut deflater, &input);
        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed, input, "{:?}", strategy);
    }
}

#[test]
fn test_deflater_clone_forks_stream() {
    let input = sample_text(40_000);
    let (head, tail) = input.split_at(20_000);

    let mut deflater = Deflater::new(6);
    let mut prefix = Vec::new();
    let mut buffer = vec![0u8; 8192];
    let mut pos = 0;
    while pos < head.len() {
        let (consumed, produced, _) = deflater
            .compress(&head[pos..], &mut buffer, FlushMode::None)
            .unwrap();
        pos += consumed;
        prefix.extend_from_slice(&buffer[..produced]);
    }

    let mut fork = deflater.clone();

    let rest_a = finish_stream(&mut deflater, tail);
    let rest_b = finish_stream(&mut fork, tail);
    assert_eq!(rest_a, rest_b);

    let mut full = prefix;
    full.extend_from_slice(&rest_a);
    let mut inflater = Inflater::new();
    assert_eq!(inflate_stream(&mut inflater, &full), input);
}

/// Hand-assemble a raw deflate stream: one stored block of `history` bytes,
/// then a fixed-Huffman block holding a single `(length 3, distance)` match.
fn stream_with_match_at(history: usize, distance: u16) -> Vec<u8> {
    let mut writer = BitWriter::new();

    let body: Vec<u8> = (0..history).map(|i| (i % 251) as u8).collect();
    writer.write_bits(0, 1); // BFINAL=0
    writer.write_bits(0, 2); // BTYPE=00
    writer.align_to_byte();
    let len = history as u16;
    writer.write_bytes(&len.to_le_bytes());
    writer.write_bytes(&(!len).to_le_bytes());
    writer.write_bytes(&body);

    writer.write_bits(1, 1); // BFINAL=1
    writer.write_bits(1, 2); // BTYPE=01 (fixed)
    let lit_codes = tables::fixed_litlen_codes();
    let dist_codes = tables::fixed_distance_codes();

    let (len_code, len_extra_bits, len_extra) = tables::length_to_code(3);
    lit_codes.emit(&mut writer, len_code);
    if len_extra_bits > 0 {
        writer.write_bits(u32::from(len_extra), u32::from(len_extra_bits));
    }
    let (dist_code, dist_extra_bits, dist_extra) = tables::distance_to_code(distance);
    dist_codes.emit(&mut writer, dist_code);
    if dist_extra_bits > 0 {
        writer.write_bits(u32::from(dist_extra), u32::from(dist_extra_bits));
    }
    lit_codes.emit(&mut writer, 256); // end of block
    writer.align_to_byte();

    let mut bytes = vec![0u8; history + 64];
    let mut out = OutputCursor::new(&mut bytes);
    let n = writer.drain_into(&mut out);
    bytes.truncate(n);
    bytes
}

#[test]
fn test_distance_equal_to_window_size_is_valid() {
    // 32 KB of history, then a match reaching exactly the full window back.
    let stream = stream_with_match_at(32768, 32768);

    let mut inflater = Inflater::raw();
    let output = inflate_stream(&mut inflater, &stream);
    assert_eq!(output.len(), 32768 + 3);
    assert_eq!(&output[32768..], &output[..3]);
}

#[test]
fn test_distance_beyond_produced_bytes_is_data_error() {
    // Only 100 bytes of history; distance 101 points before the stream.
    let stream = stream_with_match_at(100, 101);

    let mut inflater = Inflater::raw();
    let mut out = vec![0u8; 4096];
    let err = inflater.decompress(&stream, &mut out, FlushMode::None);
    assert!(matches!(err, Err(OxiflateError::InvalidDistance { .. })));
}

#[test]
fn test_distance_beyond_window_capacity_is_data_error() {
    // 300 bytes produced, but a 256-byte window: distance 280 is beyond
    // what the window can hold even though that much was produced.
    let stream = stream_with_match_at(300, 280);

    let mut inflater = Inflater::with_options(8, Wrap::Raw).unwrap();
    let mut out = vec![0u8; 4096];
    let err = inflater.decompress(&stream, &mut out, FlushMode::None);
    assert!(matches!(err, Err(OxiflateError::InvalidDistance { .. })));
}

#[test]
fn test_bit_flip_in_trailer_never_passes() {
    let compressed = oxiflate_deflate::zlib_compress(&sample_text(500), 6).unwrap();

    for bit in 0..32 {
        let mut bad = compressed.clone();
        let len = bad.len();
        bad[len - 4 + bit / 8] ^= 1 << (bit % 8);
        assert!(
            zlib_decompress(&bad).is_err(),
            "flipped trailer bit {} went undetected",
            bit
        );
    }
}
