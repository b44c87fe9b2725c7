// Integration tests for src/hc/compress_hc.rs: HC encoder output is a
// standard LZ4 block.

use lz4bridge::block::{compress_bound, compress_to_vec, decompress_safe};
use lz4bridge::hc::{compress_hc, compress_hc_with_prefix};
use lz4bridge::block::decompress_with_prefix;

fn corpus(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [b"lorem ", b"ipsum ", b"dolor ", b"sit ", b"amet, ", b"consectetur ", b"adipiscing ", b"elit. "];
    let mut state = 7u32;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        out.extend_from_slice(words[(state >> 16) as usize % words.len()]);
    }
    out.truncate(len);
    out
}

fn hc_to_vec(src: &[u8], level: i32) -> Vec<u8> {
    let mut dst = vec![0u8; compress_bound(src.len()).unwrap()];
    let n = compress_hc(src, &mut dst, level).unwrap();
    dst.truncate(n);
    dst
}

#[test]
fn every_level_round_trips() {
    let src = corpus(50_000);
    for level in -1..=13 {
        let compressed = hc_to_vec(&src, level);
        let mut out = vec![0u8; src.len()];
        assert_eq!(decompress_safe(&compressed, &mut out).unwrap(), src.len(), "level {level}");
        assert_eq!(out, src, "level {level}");
    }
}

#[test]
fn hc_beats_fast_encoder_on_text() {
    let src = corpus(100_000);
    let fast = compress_to_vec(&src, 1).unwrap();
    let hc = hc_to_vec(&src, 9);
    assert!(hc.len() <= fast.len(), "hc {} vs fast {}", hc.len(), fast.len());
}

#[test]
fn tiny_inputs_are_literal_only() {
    for len in 0..13 {
        let src = corpus(len);
        let compressed = hc_to_vec(&src, 9);
        let mut out = vec![0u8; len];
        assert_eq!(decompress_safe(&compressed, &mut out).unwrap(), len);
        assert_eq!(out, src);
    }
}

#[test]
fn long_runs_round_trip() {
    let mut src = vec![0u8; 300_000];
    src[150_000..].fill(0xFF);
    let compressed = hc_to_vec(&src, 12);
    assert!(compressed.len() < 3_000);
    let mut out = vec![0u8; src.len()];
    decompress_safe(&compressed, &mut out).unwrap();
    assert_eq!(out, src);
}

#[test]
fn prefix_round_trip() {
    let window = corpus(90_000);
    let start = 70_000;
    let mut dst = vec![0u8; compress_bound(window.len() - start).unwrap()];
    let n = compress_hc_with_prefix(&window, start, &mut dst, 9).unwrap();

    let mut out = window[..start].to_vec();
    out.resize(window.len(), 0);
    assert_eq!(decompress_with_prefix(&dst[..n], &mut out, start).unwrap(), window.len() - start);
    assert_eq!(out, window);
}
