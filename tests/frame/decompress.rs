// Integration tests for src/frame/decompress.rs: streaming frame decoder.

use lz4bridge::frame::{
    compress_frame_to_vec, decompress_frame_to_vec, BlockMode, FrameDecompressor, FrameError,
    FrameInfo, Preferences,
};

fn text(len: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times; "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn checked_prefs() -> Preferences {
    Preferences {
        frame_info: FrameInfo { content_checksum: true, block_checksum: true, ..FrameInfo::default() },
        compression_level: 1,
        auto_flush: false,
    }
}

/// Feeds `src` in `in_step` pieces and drains through `out_step`-sized
/// destinations.
fn drip(src: &[u8], in_step: usize, out_step: usize) -> Result<Vec<u8>, FrameError> {
    let mut dctx = FrameDecompressor::new();
    let mut out = Vec::new();
    let mut dst = vec![0u8; out_step];
    for piece in src.chunks(in_step) {
        let mut consumed = 0;
        loop {
            let (c, w) = dctx.decompress(&piece[consumed..], &mut dst)?;
            consumed += c;
            out.extend_from_slice(&dst[..w]);
            if consumed == piece.len() && !dctx.has_pending_output() {
                break;
            }
        }
    }
    assert!(dctx.is_idle());
    Ok(out)
}

#[test]
fn tiny_input_and_output_steps() {
    let src = text(150_000);
    let frame = compress_frame_to_vec(&src, &checked_prefs()).unwrap();
    for (in_step, out_step) in [(1, 7), (3, 1), (4096, 100), (frame.len(), 65_536)] {
        assert_eq!(drip(&frame, in_step, out_step).unwrap(), src, "in {in_step} out {out_step}");
    }
}

#[test]
fn linked_blocks_use_history() {
    let src = text(400_000);
    let mut p = checked_prefs();
    p.frame_info.block_mode = BlockMode::Linked;
    let linked = compress_frame_to_vec(&src, &p).unwrap();
    p.frame_info.block_mode = BlockMode::Independent;
    let independent = compress_frame_to_vec(&src, &p).unwrap();
    assert!(linked.len() <= independent.len());
    assert_eq!(drip(&linked, 10_000, 5_000).unwrap(), src);
    assert_eq!(drip(&independent, 10_000, 5_000).unwrap(), src);
}

#[test]
fn frame_info_is_available_after_header() {
    let frame = compress_frame_to_vec(b"abc", &checked_prefs()).unwrap();
    let mut dctx = FrameDecompressor::new();
    let mut dst = [0u8; 16];
    assert!(dctx.frame_info().is_none());
    dctx.decompress(&frame[..7], &mut dst).unwrap();
    let info = dctx.frame_info().unwrap();
    assert!(info.content_checksum);
    assert!(info.block_checksum);
}

#[test]
fn concatenated_frames_decode_in_sequence() {
    let mut stream = compress_frame_to_vec(b"first;", &Preferences::default()).unwrap();
    stream.extend(compress_frame_to_vec(b"second", &checked_prefs()).unwrap());
    assert_eq!(decompress_frame_to_vec(&stream).unwrap(), b"first;second");
}

#[test]
fn skippable_frames_between_frames() {
    let mut stream = vec![0x5F, 0x2A, 0x4D, 0x18, 4, 0, 0, 0, 0xDE, 0xAD, 0xBE, 0xEF];
    stream.extend(compress_frame_to_vec(b"payload", &Preferences::default()).unwrap());
    stream.extend([0x51, 0x2A, 0x4D, 0x18, 0, 0, 0, 0]);
    assert_eq!(drip(&stream, 3, 2).unwrap(), b"payload");
}

#[test]
fn corrupted_block_checksum() {
    let mut frame = compress_frame_to_vec(&text(1000), &checked_prefs()).unwrap();
    // Last byte of the first block's data, just before its checksum.
    let size = u32::from_le_bytes([frame[7], frame[8], frame[9], frame[10]]) & 0x7FFF_FFFF;
    frame[11 + size as usize - 1] ^= 0xFF;
    assert_eq!(decompress_frame_to_vec(&frame), Err(FrameError::BlockChecksumInvalid));
}

#[test]
fn corrupted_content_checksum() {
    let mut frame = compress_frame_to_vec(&text(1000), &checked_prefs()).unwrap();
    let last = frame.len() - 1;
    frame[last] ^= 0x01;
    assert_eq!(decompress_frame_to_vec(&frame), Err(FrameError::ContentChecksumInvalid));
}

#[test]
fn declared_size_mismatch() {
    let mut p = Preferences::default();
    p.frame_info.content_size = 3;
    let good = compress_frame_to_vec(b"xyz", &p).unwrap();
    assert_eq!(decompress_frame_to_vec(&good).unwrap(), b"xyz");

    // Patch a frame declaring 3 bytes onto a 4-byte body.
    let body = compress_frame_to_vec(b"wxyz", &Preferences::default()).unwrap();
    let mut frame = good[..15].to_vec();
    frame.extend_from_slice(&body[7..]);
    assert_eq!(
        decompress_frame_to_vec(&frame),
        Err(FrameError::FrameSizeWrong { declared: 3, actual: 4 })
    );
}

#[test]
fn oversized_block_is_rejected() {
    let mut frame = compress_frame_to_vec(b"", &Preferences::default()).unwrap();
    frame.truncate(7);
    frame.extend_from_slice(&(64 * 1024 + 1u32).to_le_bytes());
    assert_eq!(decompress_frame_to_vec(&frame), Err(FrameError::BlockSizeTooLarge(64 * 1024 + 1)));
}

#[test]
fn truncated_frame_is_not_idle() {
    let frame = compress_frame_to_vec(&text(5000), &checked_prefs()).unwrap();
    let mut dctx = FrameDecompressor::new();
    let mut dst = vec![0u8; 10_000];
    dctx.decompress(&frame[..frame.len() - 3], &mut dst).unwrap();
    assert!(!dctx.is_idle());
    assert_eq!(decompress_frame_to_vec(&frame[..frame.len() - 3]), Err(FrameError::DecompressionFailed));
}

#[test]
fn error_resets_the_context() {
    let mut dctx = FrameDecompressor::new();
    let mut dst = [0u8; 64];
    assert!(dctx.decompress(b"not an lz4 frame", &mut dst).is_err());
    let frame = compress_frame_to_vec(b"fresh start", &Preferences::default()).unwrap();
    let (consumed, written) = dctx.decompress(&frame, &mut dst).unwrap();
    assert_eq!(consumed, frame.len());
    assert_eq!(&dst[..written], b"fresh start");
}
