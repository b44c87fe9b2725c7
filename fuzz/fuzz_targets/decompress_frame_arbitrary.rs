#![no_main]
use libfuzzer_sys::fuzz_target;
use lz4bridge::bridge::{self, Progress};
use lz4bridge::frame::decompress_frame_to_vec;
use lz4bridge::LogicalBuffer;

fuzz_target!(|data: &[u8]| {
    let whole = decompress_frame_to_vec(data);

    // Same bytes through a handle, with a small destination so backpressure
    // paths run too. A success must agree with the one-shot decode.
    let Ok(dctx) = bridge::frame_create_decompression_context() else {
        return;
    };
    let mut out = [0u8; 97];
    let mut decoded = Vec::new();
    let mut pos = 0;
    let streamed = loop {
        let cap = out.len();
        match bridge::frame_decompress(
            dctx,
            &LogicalBuffer::from(data),
            pos,
            data.len() - pos,
            &LogicalBuffer::from(&mut out[..]),
            0,
            cap,
        ) {
            Ok(Progress::NeedMoreOutput { consumed, written }) => {
                decoded.extend_from_slice(&out[..written]);
                pos += consumed;
            }
            Ok(Progress::Written(written)) => {
                decoded.extend_from_slice(&out[..written]);
                break bridge::frame_decompress_is_idle(dctx).unwrap_or(false);
            }
            Err(_) => break false,
        }
    };
    let _ = bridge::frame_free_decompression_context(dctx);

    if let (true, Ok(whole)) = (streamed, whole) {
        assert_eq!(decoded, whole);
    }
});
