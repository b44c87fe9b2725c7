// Integration tests for src/bridge/block.rs: one-shot block calls over
// logical buffers.

use lz4bridge::bridge::{
    block_compress, block_compress_fast, block_compress_hc, block_compress_with_length,
    block_decompress_known_size, block_decompress_safe, block_decompress_with_length,
    compress_bound,
};
use lz4bridge::{BridgeError, ByteArray, ErrorKind, ErrorResult, LogicalBuffer};

fn sample(len: usize) -> Vec<u8> {
    b"buffer access adapter; "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

#[test]
fn compress_bound_edges() {
    assert_eq!(compress_bound(0), 16);
    assert_eq!(compress_bound(255), 256 + 16);
    assert_eq!(compress_bound(-1), 0);
    assert_eq!(compress_bound(0x7E00_0001), 0);
}

#[test]
fn owned_to_owned_round_trip_at_offsets() {
    let data = sample(10_000);
    let mut staged = vec![0xEEu8; 100];
    staged.extend_from_slice(&data);
    let src = ByteArray::from(staged);
    let bound = compress_bound(data.len() as i32) as usize;
    let packed = ByteArray::zeroed(bound + 50);

    let n = block_compress(&LogicalBuffer::from(&src), 100, data.len(), &LogicalBuffer::from(&packed), 50, bound).unwrap();
    assert!(n > 0 && n < data.len());

    let out = ByteArray::zeroed(data.len() + 10);
    let written = block_decompress_safe(&LogicalBuffer::from(&packed), 50, n, &LogicalBuffer::from(&out), 10, data.len()).unwrap();
    assert_eq!(written, data.len());
    assert_eq!(&out.to_vec().unwrap()[10..], &data[..]);
    assert_eq!((src.pin_count(), packed.pin_count(), out.pin_count()), (0, 0, 0));
}

#[test]
fn mapped_and_owned_mix() {
    let data = sample(4096);
    let mut packed = vec![0u8; compress_bound(4096) as usize];
    let cap = packed.len();
    let n = block_compress_hc(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut packed[..]), 0, cap, 12).unwrap();

    let out = ByteArray::zeroed(4096);
    block_decompress_safe(&LogicalBuffer::from(&packed[..]), 0, n, &LogicalBuffer::from(&out), 0, 4096).unwrap();
    assert_eq!(out.into_vec(), data);
}

#[test]
fn empty_input_compresses_to_one_byte() {
    let mut dst = [0xFFu8; 16];
    let n = block_compress(&LogicalBuffer::from(&[0u8; 0][..]), 0, 0, &LogicalBuffer::from(&mut dst[..]), 0, 16).unwrap();
    assert_eq!(n, 1);
    assert_eq!(dst[0], 0);
}

#[test]
fn small_destination_is_capacity_exceeded_with_bound() {
    let data: Vec<u8> = (0..2000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
    let mut dst = [0u8; 64];
    let err = block_compress(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap_err();
    assert_eq!(err, BridgeError::CapacityExceeded { needed: compress_bound(2000) as usize, available: 64 });
}

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 11) as u8
        })
        .collect()
}

// The encoder fails only when its real output does not fit: a destination
// one byte short of the bound still succeeds on noise, one byte short of
// the actual output does not.
#[test]
fn capacity_boundary_on_incompressible_input() {
    for len in [1000usize, 4096, 100_000] {
        let data = noise(len);
        let bound = compress_bound(len as i32) as usize;
        let mut dst = vec![0u8; bound];
        let src = LogicalBuffer::from(&data[..]);

        let actual = block_compress(&src, 0, len, &LogicalBuffer::from(&mut dst[..]), 0, bound).unwrap();
        assert!(actual > len && actual <= bound, "{len}: {actual}");
        assert_eq!(block_compress(&src, 0, len, &LogicalBuffer::from(&mut dst[..]), 0, bound - 1).unwrap(), actual);
        assert_eq!(block_compress(&src, 0, len, &LogicalBuffer::from(&mut dst[..]), 0, actual).unwrap(), actual);
        let mut out = vec![0u8; len];
        block_decompress_safe(&LogicalBuffer::from(&dst[..]), 0, actual, &LogicalBuffer::from(&mut out[..]), 0, len).unwrap();
        assert!(out == data);

        let err = block_compress(&src, 0, len, &LogicalBuffer::from(&mut dst[..]), 0, actual - 1).unwrap_err();
        assert_eq!(err, BridgeError::CapacityExceeded { needed: bound, available: actual - 1 });
    }
}

#[test]
fn acceleration_is_clamped() {
    let data = sample(8192);
    let mut dst = vec![0u8; compress_bound(8192) as usize];
    let cap = dst.len();
    for accel in [-10, 0, 1_000_000] {
        let n = block_compress_fast(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut dst[..]), 0, cap, accel).unwrap();
        let mut out = vec![0u8; data.len()];
        block_decompress_safe(&LogicalBuffer::from(&dst[..]), 0, n, &LogicalBuffer::from(&mut out[..]), 0, data.len()).unwrap();
        assert_eq!(out, data);
    }
}

#[test]
fn known_size_returns_bytes_consumed() {
    let data = sample(3000);
    let mut packed = vec![0u8; compress_bound(3000) as usize + 20];
    let cap = packed.len() - 20;
    let n = block_compress(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut packed[..]), 0, cap).unwrap();

    let mut out = vec![0u8; 3000];
    let consumed = block_decompress_known_size(&LogicalBuffer::from(&packed[..]), 0, &LogicalBuffer::from(&mut out[..]), 0, 3000).unwrap();
    assert_eq!(consumed, n);
    assert_eq!(out, data);
}

#[test]
fn known_size_with_wrong_length_stays_in_bounds() {
    let data = sample(3000);
    let mut packed = vec![0u8; compress_bound(3000) as usize];
    let cap = packed.len();
    let n = block_compress(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut packed[..]), 0, cap).unwrap();

    let mut out = vec![0u8; 5000];
    let err = block_decompress_known_size(&LogicalBuffer::from(&packed[..n]), 0, &LogicalBuffer::from(&mut out[..]), 0, 5000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn malformed_block_is_reported_through_carrier() {
    let garbage = [0xF0u8, 0xFF, 0xFF, 0xFF];
    let mut out = [0u8; 64];
    let mut carrier = ErrorResult::new();
    let r = carrier.capture(block_decompress_safe(&LogicalBuffer::from(&garbage[..]), 0, 4, &LogicalBuffer::from(&mut out[..]), 0, 64));
    assert!(r.is_none());
    assert_eq!(carrier.kind(), Some(ErrorKind::MalformedInput));
    assert!(carrier.message().unwrap().contains("malformed"));
}

#[test]
fn length_prefixed_round_trip() {
    let data = sample(70_000);
    let mut packed = vec![0u8; compress_bound(70_000) as usize + 4];
    let cap = packed.len();
    let n = block_compress_with_length(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut packed[..]), 0, cap).unwrap();
    assert_eq!(&packed[..4], &70_000u32.to_le_bytes());

    let mut out = vec![0u8; 80_000];
    let written = block_decompress_with_length(&LogicalBuffer::from(&packed[..]), 0, n, &LogicalBuffer::from(&mut out[..]), 0, 80_000).unwrap();
    assert_eq!(written, 70_000);
    assert_eq!(&out[..written], &data[..]);
}

#[test]
fn length_prefix_larger_than_destination() {
    let data = sample(1000);
    let mut packed = vec![0u8; 2000];
    let n = block_compress_with_length(&LogicalBuffer::from(&data[..]), 0, 1000, &LogicalBuffer::from(&mut packed[..]), 0, 2000).unwrap();
    let mut out = vec![0u8; 999];
    let err = block_decompress_with_length(&LogicalBuffer::from(&packed[..]), 0, n, &LogicalBuffer::from(&mut out[..]), 0, 999).unwrap_err();
    assert_eq!(err, BridgeError::CapacityExceeded { needed: 1000, available: 999 });
}

#[test]
fn offsets_beyond_buffers_are_invalid_arguments() {
    let data = sample(100);
    let mut dst = vec![0u8; 200];
    let err = block_compress(&LogicalBuffer::from(&data[..]), 50, 100, &LogicalBuffer::from(&mut dst[..]), 0, 200).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = block_compress(&LogicalBuffer::from(&data[..]), 0, 100, &LogicalBuffer::from(&mut dst[..]), 150, 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
