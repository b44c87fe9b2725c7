#![no_main]
use libfuzzer_sys::fuzz_target;
use lz4bridge::frame::{compress_frame_to_vec, decompress_frame_to_vec};
use lz4bridge::{BlockMode, BlockSizeId, Preferences};

fuzz_target!(|data: &[u8]| {
    let Some((&knob, input)) = data.split_first() else {
        return;
    };
    let mut prefs = Preferences::with_level(i32::from(knob & 0x0F) - 2);
    prefs.frame_info.block_size_id = BlockSizeId::from_code(4 + (knob >> 4 & 0x03)).unwrap();
    prefs.frame_info.block_mode = if knob & 0x40 == 0 { BlockMode::Linked } else { BlockMode::Independent };
    prefs.frame_info.content_checksum = knob & 0x80 != 0;
    prefs.frame_info.block_checksum = knob & 0x01 != 0;

    let framed = compress_frame_to_vec(input, &prefs).unwrap();
    assert_eq!(decompress_frame_to_vec(&framed).unwrap(), input);
});
