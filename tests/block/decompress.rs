// Integration tests for src/block/decompress.rs: safe and known-size decoders.

use lz4bridge::block::{compress_to_vec, decompress_known_size, decompress_safe, BlockError};

/// One literal 'a', an 8-byte match at offset 1, then five literal 'a's:
/// fourteen 'a's in all.
const HAND_BLOCK: [u8; 10] = [0x14, b'a', 0x01, 0x00, 0x50, b'a', b'a', b'a', b'a', b'a'];

#[test]
fn decodes_hand_built_block() {
    let mut out = [0u8; 32];
    let n = decompress_safe(&HAND_BLOCK, &mut out).unwrap();
    assert_eq!(&out[..n], &[b'a'; 14]);
}

#[test]
fn known_size_reports_bytes_consumed() {
    let mut block = HAND_BLOCK.to_vec();
    block.extend_from_slice(b"trailing garbage");
    let mut out = [0u8; 14];
    assert_eq!(decompress_known_size(&block, &mut out).unwrap(), HAND_BLOCK.len());
    assert_eq!(out, [b'a'; 14]);
}

#[test]
fn known_size_with_wrong_length_is_rejected() {
    let mut short = [0u8; 10];
    assert!(decompress_known_size(&HAND_BLOCK, &mut short).is_err());
}

#[test]
fn safe_decoder_reports_small_destination() {
    let mut out = [0u8; 13];
    assert!(decompress_safe(&HAND_BLOCK, &mut out).is_err());
}

#[test]
fn offset_before_start_is_malformed() {
    // Literal 'a' then a match at offset 2: reaches before the output start.
    let block = [0x10, b'a', 0x02, 0x00, 0x50, b'a', b'a', b'a', b'a', b'a'];
    let mut out = [0u8; 64];
    assert!(matches!(decompress_safe(&block, &mut out), Err(BlockError::Malformed { .. })));
}

#[test]
fn zero_offset_is_malformed() {
    let block = [0x14, b'a', 0x00, 0x00, 0x50, b'a', b'a', b'a', b'a', b'a'];
    let mut out = [0u8; 64];
    assert!(decompress_safe(&block, &mut out).is_err());
}

#[test]
fn truncated_block_is_malformed() {
    let src: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let compressed = compress_to_vec(&src, 1).unwrap();
    let mut out = vec![0u8; src.len()];
    assert!(decompress_safe(&compressed[..compressed.len() - 1], &mut out).is_err());
    for cut in [1, compressed.len() / 2] {
        let result = decompress_safe(&compressed[..cut], &mut out);
        assert_ne!(result.ok(), Some(src.len()), "cut at {cut}");
    }
}

#[test]
fn empty_source_is_malformed() {
    let mut out = [0u8; 8];
    assert!(decompress_safe(&[], &mut out).is_err());
}
