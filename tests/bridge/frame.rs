// Integration tests for src/bridge/frame.rs: handle-based frame streaming.

use lz4bridge::bridge::{
    frame_compress_begin, frame_compress_begin_with, frame_compress_bound, frame_compress_end,
    frame_compress_flush, frame_compress_update, frame_create_compression_context,
    frame_create_decompression_context, frame_decompress, frame_decompress_is_idle,
    frame_free_compression_context, frame_free_decompression_context, CompressionHandle,
    DecompressionHandle,
};
use lz4bridge::frame::{compress_bound, compress_frame_to_vec};
use lz4bridge::{BridgeError, ByteArray, ErrorKind, LogicalBuffer, Preferences, Progress};

fn prose(len: usize) -> Vec<u8> {
    b"Handles name contexts; buffers carry bytes. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn compress_all(h: CompressionHandle, data: &[u8], chunk: usize) -> Vec<u8> {
    let cap = compress_bound(chunk, None);
    let mut buf = vec![0u8; cap];
    let n = frame_compress_begin(h, 1, &LogicalBuffer::from(&mut buf[..]), 0, cap).unwrap();
    let mut frame = buf[..n].to_vec();
    for piece in data.chunks(chunk) {
        let n = frame_compress_update(h, &LogicalBuffer::from(piece), 0, piece.len(), &LogicalBuffer::from(&mut buf[..]), 0, cap).unwrap();
        frame.extend_from_slice(&buf[..n]);
    }
    let n = frame_compress_end(h, &LogicalBuffer::from(&mut buf[..]), 0, cap).unwrap();
    frame.extend_from_slice(&buf[..n]);
    frame
}

fn decompress_all(h: DecompressionHandle, frame: &[u8], out_step: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut dst = vec![0u8; out_step];
    let mut pos = 0;
    loop {
        let src = &frame[pos..];
        match frame_decompress(h, &LogicalBuffer::from(src), 0, src.len(), &LogicalBuffer::from(&mut dst[..]), 0, out_step).unwrap() {
            Progress::Written(n) => {
                out.extend_from_slice(&dst[..n]);
                return out;
            }
            Progress::NeedMoreOutput { consumed, written } => {
                assert_eq!(written, out_step);
                out.extend_from_slice(&dst[..written]);
                pos += consumed;
            }
        }
    }
}

#[test]
fn stream_round_trip_through_handles() {
    let data = prose(200_000);
    let c = frame_create_compression_context().unwrap();
    let frame = compress_all(c, &data, 7_000);
    frame_free_compression_context(c).unwrap();

    let d = frame_create_decompression_context().unwrap();
    assert_eq!(decompress_all(d, &frame, 65_536), data);
    assert!(frame_decompress_is_idle(d).unwrap());
    frame_free_decompression_context(d).unwrap();
}

#[test]
fn small_destination_reports_backpressure() {
    let data = prose(10_000);
    let frame = compress_frame_to_vec(&data, &Preferences::default()).unwrap();
    let d = frame_create_decompression_context().unwrap();
    let mut dst = [0u8; 100];
    let first = frame_decompress(d, &LogicalBuffer::from(&frame[..]), 0, frame.len(), &LogicalBuffer::from(&mut dst[..]), 0, 100).unwrap();
    assert!(matches!(first, Progress::NeedMoreOutput { written: 100, .. }));
    assert_eq!(&dst[..], &data[..100]);
    assert_eq!(decompress_all(d, &frame[first_consumed(first)..], 100), data[100..]);
    frame_free_decompression_context(d).unwrap();
}

fn first_consumed(p: Progress) -> usize {
    match p {
        Progress::NeedMoreOutput { consumed, .. } => consumed,
        Progress::Written(_) => panic!("expected backpressure"),
    }
}

#[test]
fn whole_frame_bound_fits_one_shot_output() {
    let data = prose(100_000);
    let c = frame_create_compression_context().unwrap();
    let cap = frame_compress_bound(data.len(), None);
    let mut dst = vec![0u8; cap];
    let mut pos = frame_compress_begin(c, 1, &LogicalBuffer::from(&mut dst[..]), 0, cap).unwrap();
    pos += frame_compress_update(c, &LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut dst[..]), pos, cap - pos).unwrap();
    pos += frame_compress_end(c, &LogicalBuffer::from(&mut dst[..]), pos, cap - pos).unwrap();
    assert!(pos <= cap);
    frame_free_compression_context(c).unwrap();
}

#[test]
fn update_before_begin_is_invalid_state() {
    let c = frame_create_compression_context().unwrap();
    let mut dst = [0u8; 128];
    let err = frame_compress_update(c, &LogicalBuffer::from(&b"abc"[..]), 0, 3, &LogicalBuffer::from(&mut dst[..]), 0, 128).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    let err = frame_compress_flush(c, &LogicalBuffer::from(&mut dst[..]), 0, 128).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    frame_free_compression_context(c).unwrap();
}

#[test]
fn begin_while_open_is_invalid_state() {
    let c = frame_create_compression_context().unwrap();
    let mut dst = [0u8; 64];
    frame_compress_begin(c, 1, &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap();
    let err = frame_compress_begin(c, 1, &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    frame_free_compression_context(c).unwrap();
}

#[test]
fn header_needs_room() {
    let c = frame_create_compression_context().unwrap();
    let mut dst = [0u8; 4];
    let err = frame_compress_begin(c, 1, &LogicalBuffer::from(&mut dst[..]), 0, 4).unwrap_err();
    assert_eq!(err, BridgeError::CapacityExceeded { needed: 7, available: 4 });
    frame_free_compression_context(c).unwrap();
}

#[test]
fn preferences_reach_the_header() {
    let c = frame_create_compression_context().unwrap();
    let mut prefs = Preferences::with_level(9);
    prefs.frame_info.content_checksum = true;
    prefs.frame_info.block_mode = lz4bridge::BlockMode::Independent;
    let mut dst = [0u8; 64];
    let n = frame_compress_begin_with(c, &prefs, &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap();
    assert_eq!(&dst[..n], &[0x04, 0x22, 0x4D, 0x18, 0x64, 0x40, 0xA7]);
    frame_free_compression_context(c).unwrap();
}

#[test]
fn corrupt_frame_is_malformed() {
    let d = frame_create_decompression_context().unwrap();
    let mut dst = [0u8; 64];
    let err = frame_decompress(d, &LogicalBuffer::from(&b"garbage!"[..]), 0, 8, &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    frame_free_decompression_context(d).unwrap();
}

#[test]
fn zero_capacity_destination_cannot_progress() {
    let frame = compress_frame_to_vec(b"something", &Preferences::default()).unwrap();
    let d = frame_create_decompression_context().unwrap();
    let out = ByteArray::zeroed(0);
    let progress = frame_decompress(d, &LogicalBuffer::from(&frame[..]), 0, frame.len(), &LogicalBuffer::from(&out), 0, 0).unwrap();
    assert!(matches!(progress, Progress::NeedMoreOutput { written: 0, .. }));
    frame_free_decompression_context(d).unwrap();
}

#[test]
fn freed_contexts_are_stale() {
    let c = frame_create_compression_context().unwrap();
    frame_free_compression_context(c).unwrap();
    let mut dst = [0u8; 64];
    let err = frame_compress_begin(c, 1, &LogicalBuffer::from(&mut dst[..]), 0, 64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let d = frame_create_decompression_context().unwrap();
    frame_free_decompression_context(d).unwrap();
    assert_eq!(frame_decompress_is_idle(d).unwrap_err().kind(), ErrorKind::InvalidState);
}

#[test]
fn one_byte_destination_drains_linked_checksummed_frame() {
    let data = prose(150_000);
    let mut prefs = Preferences::default();
    prefs.frame_info.block_size_id = lz4bridge::BlockSizeId::Max64Kb;
    prefs.frame_info.block_mode = lz4bridge::BlockMode::Linked;
    prefs.frame_info.block_checksum = true;
    prefs.frame_info.content_checksum = true;
    prefs.frame_info.content_size = data.len() as u64;
    let frame = compress_frame_to_vec(&data, &prefs).unwrap();
    assert_eq!(frame[4], 0x5C);

    let d = frame_create_decompression_context().unwrap();
    let mut dst = [0u8; 1];
    let mut out = Vec::with_capacity(data.len());
    let mut pos = 0;
    let mut advancing_calls = 0;
    loop {
        let src = &frame[pos..];
        match frame_decompress(d, &LogicalBuffer::from(src), 0, src.len(), &LogicalBuffer::from(&mut dst[..]), 0, 1).unwrap() {
            Progress::Written(n) => {
                assert!(n <= 1);
                out.extend_from_slice(&dst[..n]);
                pos = frame.len();
                break;
            }
            Progress::NeedMoreOutput { consumed, written } => {
                assert_eq!(written, 1);
                assert!(consumed <= src.len());
                if consumed > 0 {
                    advancing_calls += 1;
                }
                out.push(dst[0]);
                pos += consumed;
            }
        }
    }
    assert_eq!(pos, frame.len());
    // Header plus at least one call per block.
    assert!(advancing_calls >= 3);
    assert_eq!(out, data);
    assert!(frame_decompress_is_idle(d).unwrap());
    frame_free_decompression_context(d).unwrap();
}
