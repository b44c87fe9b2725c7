// Integration tests for src/frame/header.rs: header codec.

use lz4bridge::frame::header::{header_size, header_size_for, is_skippable_magic, read_header, write_header};
use lz4bridge::frame::types::{MAX_FH_SIZE, MIN_FH_SIZE};
use lz4bridge::frame::{BlockMode, BlockSizeId, FrameError, FrameInfo};

fn encode(info: &FrameInfo) -> Vec<u8> {
    let mut buf = [0u8; MAX_FH_SIZE];
    let n = write_header(info, &mut buf).unwrap();
    buf[..n].to_vec()
}

#[test]
fn default_header_bytes() {
    assert_eq!(encode(&FrameInfo::default()), [0x04, 0x22, 0x4D, 0x18, 0x40, 0x40, 0xC0]);
}

#[test]
fn independent_blocks_with_content_checksum() {
    let info = FrameInfo {
        block_mode: BlockMode::Independent,
        content_checksum: true,
        ..FrameInfo::default()
    };
    assert_eq!(encode(&info), [0x04, 0x22, 0x4D, 0x18, 0x64, 0x40, 0xA7]);
}

#[test]
fn content_checksum_only() {
    let info = FrameInfo { content_checksum: true, ..FrameInfo::default() };
    assert_eq!(encode(&info), [0x04, 0x22, 0x4D, 0x18, 0x44, 0x40, 0x5E]);
}

#[test]
fn optional_fields_grow_the_header() {
    let info = FrameInfo { content_size: 1, dict_id: 7, ..FrameInfo::default() };
    assert_eq!(header_size_for(&info), MAX_FH_SIZE);
    let bytes = encode(&info);
    assert_eq!(bytes.len(), MAX_FH_SIZE);
    assert_eq!(header_size(&bytes[..5]).unwrap(), MAX_FH_SIZE);
    assert_eq!(header_size_for(&FrameInfo::default()), MIN_FH_SIZE);
}

#[test]
fn every_field_survives_a_round_trip() {
    let info = FrameInfo {
        block_size_id: BlockSizeId::Max1Mb,
        block_mode: BlockMode::Independent,
        content_checksum: true,
        block_checksum: true,
        content_size: 0x0123_4567_89AB,
        dict_id: 0xDEAD_BEEF,
    };
    assert_eq!(read_header(&encode(&info)).unwrap(), info);
}

#[test]
fn corrupted_checksum_is_detected() {
    let mut bytes = encode(&FrameInfo::default());
    bytes[6] ^= 1;
    assert_eq!(read_header(&bytes), Err(FrameError::HeaderChecksumInvalid));
}

#[test]
fn wrong_version_is_rejected() {
    let mut bytes = encode(&FrameInfo::default());
    bytes[4] = 0x80;
    assert_eq!(read_header(&bytes), Err(FrameError::HeaderVersionWrong(2)));
}

#[test]
fn reserved_bits_are_rejected() {
    let mut bytes = encode(&FrameInfo::default());
    bytes[4] |= 0x02;
    assert_eq!(read_header(&bytes), Err(FrameError::ReservedFlagSet));
    let mut bytes = encode(&FrameInfo::default());
    bytes[5] |= 0x01;
    assert_eq!(read_header(&bytes), Err(FrameError::ReservedFlagSet));
}

#[test]
fn small_block_size_codes_are_invalid() {
    let mut bytes = encode(&FrameInfo::default());
    bytes[5] = 0x30;
    assert_eq!(read_header(&bytes), Err(FrameError::MaxBlockSizeInvalid(3)));
}

#[test]
fn unknown_magic() {
    assert_eq!(header_size(&[0, 0, 0, 0, 0x40]), Err(FrameError::FrameTypeUnknown(0)));
}

#[test]
fn skippable_magic_range() {
    assert!(is_skippable_magic(0x184D_2A50));
    assert!(is_skippable_magic(0x184D_2A5F));
    assert!(!is_skippable_magic(0x184D_2A60));
    assert!(!is_skippable_magic(0x184D_2204));
}

#[test]
fn short_destination_is_reported() {
    let mut buf = [0u8; 6];
    assert_eq!(
        write_header(&FrameInfo::default(), &mut buf),
        Err(FrameError::DstMaxSizeTooSmall { needed: 7, available: 6 })
    );
}
