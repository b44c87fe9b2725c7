#![no_main]
use libfuzzer_sys::fuzz_target;
use lz4bridge::block::{compress_to_vec, decompress_known_size, decompress_safe};
use lz4bridge::hc::compress_hc;

fuzz_target!(|data: &[u8]| {
    let Some((&knob, input)) = data.split_first() else {
        return;
    };

    let packed = if knob & 0x80 == 0 {
        compress_to_vec(input, i32::from(knob & 0x1F) + 1).unwrap()
    } else {
        let mut dst = vec![0u8; lz4bridge::block::compress_bound(input.len()).unwrap()];
        let n = compress_hc(input, &mut dst, i32::from(knob & 0x0F)).unwrap();
        dst.truncate(n);
        dst
    };

    let mut out = vec![0u8; input.len()];
    assert_eq!(decompress_safe(&packed, &mut out).unwrap(), input.len());
    assert_eq!(out, input);

    out.fill(0);
    assert_eq!(decompress_known_size(&packed, &mut out).unwrap(), packed.len());
    assert_eq!(out, input);
});
