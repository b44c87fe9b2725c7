// Integration tests for src/block/compress.rs: fast encoder.

use lz4bridge::block::{
    compress_bound, compress_default, compress_fast, compress_to_vec, compress_with_prefix,
    decompress_safe, decompress_with_prefix, BlockError,
};

fn text(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn round_trip(src: &[u8], compressed: &[u8]) {
    let mut out = vec![0u8; src.len()];
    let n = decompress_safe(compressed, &mut out).unwrap();
    assert_eq!(n, src.len());
    assert_eq!(out, src);
}

#[test]
fn empty_input_is_single_token() {
    let mut dst = [0xAAu8; 16];
    let n = compress_default(&[], &mut dst).unwrap();
    assert_eq!(&dst[..n], &[0x00]);
}

#[test]
fn short_input_is_all_literals() {
    let src = b"hello";
    let mut dst = vec![0u8; compress_bound(src.len()).unwrap()];
    let n = compress_default(src, &mut dst).unwrap();
    assert_eq!(&dst[..n], b"\x50hello");
}

#[test]
fn repetitive_input_shrinks() {
    let src = text(64 * 1024);
    let compressed = compress_to_vec(&src, 1).unwrap();
    assert!(compressed.len() < src.len() / 10, "got {} bytes", compressed.len());
    round_trip(&src, &compressed);
}

#[test]
fn incompressible_input_stays_within_bound() {
    let src = noise(100_000);
    let compressed = compress_to_vec(&src, 1).unwrap();
    assert!(compressed.len() <= compress_bound(src.len()).unwrap());
    round_trip(&src, &compressed);
}

#[test]
fn acceleration_levels_all_round_trip() {
    let mut src = text(20_000);
    src.extend(noise(5_000));
    src.extend(text(20_000));
    for accel in [i32::MIN, -3, 0, 1, 2, 8, 100, 65_537, i32::MAX] {
        let compressed = compress_to_vec(&src, accel).unwrap();
        round_trip(&src, &compressed);
    }
}

#[test]
fn too_small_destination_fails_cleanly() {
    let src = noise(1000);
    let mut dst = vec![0u8; 100];
    assert_eq!(compress_fast(&src, &mut dst, 1), Err(BlockError::OutputTooSmall));
}

#[test]
fn prefix_references_survive_round_trip() {
    let history = text(40_000);
    let mut window = history.clone();
    window.extend(text(10_000));
    let mut dst = vec![0u8; compress_bound(10_000).unwrap()];
    let n = compress_with_prefix(&window, history.len(), &mut dst, 1).unwrap();

    // A block that leans on its prefix is far smaller than one that does not.
    let standalone = compress_to_vec(&window[history.len()..], 1).unwrap();
    assert!(n <= standalone.len());

    let mut out = history.clone();
    out.resize(window.len(), 0);
    let written = decompress_with_prefix(&dst[..n], &mut out, history.len()).unwrap();
    assert_eq!(written, 10_000);
    assert_eq!(out, window);
}
