// Integration tests for src/block/types.rs: constants and compress_bound.

use lz4bridge::block::types::{
    compress_bound, count_match, LASTLITERALS, LZ4_DISTANCE_MAX, LZ4_MAX_INPUT_SIZE,
    LZ4_MIN_LENGTH, MFLIMIT, MINMATCH,
};

#[test]
fn format_constants() {
    assert_eq!(MINMATCH, 4);
    assert_eq!(LASTLITERALS, 5);
    assert_eq!(MFLIMIT, 12);
    assert_eq!(LZ4_MIN_LENGTH, 13);
    assert_eq!(LZ4_DISTANCE_MAX, 65_535);
    assert_eq!(LZ4_MAX_INPUT_SIZE, 0x7E00_0000);
}

#[test]
fn bound_matches_reference_formula() {
    for n in [0usize, 1, 15, 255, 256, 4096, 65_536, 1 << 20] {
        assert_eq!(compress_bound(n), Some(n + n / 255 + 16), "n = {n}");
    }
}

#[test]
fn bound_rejects_oversized_input() {
    assert!(compress_bound(LZ4_MAX_INPUT_SIZE).is_some());
    assert_eq!(compress_bound(LZ4_MAX_INPUT_SIZE + 1), None);
}

#[test]
fn count_match_stops_at_limit_and_mismatch() {
    let buf = b"abcdefgh_abcdefgX_";
    // "abcdefg" repeats at 9; the 8th byte differs.
    assert_eq!(count_match(buf, 9, 0, buf.len()), 7);
    assert_eq!(count_match(buf, 9, 0, 12), 3);
}
