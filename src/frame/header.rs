//! Frame header encoding and decoding.
//!
//! ```text
//! magic (4) | FLG (1) | BD (1) | [content size (8)] | [dict id (4)] | HC (1)
//! ```
//!
//! HC is the second byte of XXH32 over FLG..dict id.

use super::types::{
    BlockMode, BlockSizeId, FrameError, FrameInfo, FH_SIZE_PROBE, LZ4F_MAGICNUMBER,
    LZ4F_MAGIC_SKIPPABLE_MASK, LZ4F_MAGIC_SKIPPABLE_START, MIN_FH_SIZE,
};
use crate::block::types::read_u32_le;
use crate::xxhash::xxh32_oneshot;

const FLG_VERSION: u8 = 0b01;
const FLG_BLOCK_INDEPENDENCE: u8 = 1 << 5;
const FLG_BLOCK_CHECKSUM: u8 = 1 << 4;
const FLG_CONTENT_SIZE: u8 = 1 << 3;
const FLG_CONTENT_CHECKSUM: u8 = 1 << 2;
const FLG_DICT_ID: u8 = 1;
const FLG_RESERVED: u8 = 1 << 1;

#[inline]
fn header_checksum(descriptor: &[u8]) -> u8 {
    (xxh32_oneshot(descriptor, 0) >> 8) as u8
}

#[inline]
pub fn is_skippable_magic(magic: u32) -> bool {
    magic & LZ4F_MAGIC_SKIPPABLE_MASK == LZ4F_MAGIC_SKIPPABLE_START
}

/// Header size implied by `info`.
pub fn header_size_for(info: &FrameInfo) -> usize {
    MIN_FH_SIZE
        + if info.content_size != 0 { 8 } else { 0 }
        + if info.dict_id != 0 { 4 } else { 0 }
}

/// Writes the header for `info` and returns its length.
pub fn write_header(info: &FrameInfo, dst: &mut [u8]) -> Result<usize, FrameError> {
    let size = header_size_for(info);
    if dst.len() < size {
        return Err(FrameError::DstMaxSizeTooSmall { needed: size, available: dst.len() });
    }
    let mut flg = FLG_VERSION << 6;
    if info.block_mode == BlockMode::Independent {
        flg |= FLG_BLOCK_INDEPENDENCE;
    }
    if info.block_checksum {
        flg |= FLG_BLOCK_CHECKSUM;
    }
    if info.content_size != 0 {
        flg |= FLG_CONTENT_SIZE;
    }
    if info.content_checksum {
        flg |= FLG_CONTENT_CHECKSUM;
    }
    if info.dict_id != 0 {
        flg |= FLG_DICT_ID;
    }

    dst[..4].copy_from_slice(&LZ4F_MAGICNUMBER.to_le_bytes());
    dst[4] = flg;
    dst[5] = (info.block_size_id as u8) << 4;
    let mut pos = 6;
    if info.content_size != 0 {
        dst[pos..pos + 8].copy_from_slice(&info.content_size.to_le_bytes());
        pos += 8;
    }
    if info.dict_id != 0 {
        dst[pos..pos + 4].copy_from_slice(&info.dict_id.to_le_bytes());
        pos += 4;
    }
    dst[pos] = header_checksum(&dst[4..pos]);
    Ok(pos + 1)
}

/// Full header length, given at least the first [`FH_SIZE_PROBE`] bytes of
/// an LZ4 frame.
pub fn header_size(probe: &[u8]) -> Result<usize, FrameError> {
    debug_assert!(probe.len() >= FH_SIZE_PROBE);
    let magic = read_u32_le(probe, 0);
    if magic != LZ4F_MAGICNUMBER {
        return Err(FrameError::FrameTypeUnknown(magic));
    }
    let flg = probe[4];
    Ok(MIN_FH_SIZE
        + if flg & FLG_CONTENT_SIZE != 0 { 8 } else { 0 }
        + if flg & FLG_DICT_ID != 0 { 4 } else { 0 })
}

/// Parses and validates a complete header.
pub fn read_header(header: &[u8]) -> Result<FrameInfo, FrameError> {
    let size = header_size(header)?;
    debug_assert_eq!(header.len(), size);
    let flg = header[4];
    let bd = header[5];

    let version = flg >> 6;
    if version != FLG_VERSION {
        return Err(FrameError::HeaderVersionWrong(version));
    }
    if flg & FLG_RESERVED != 0 || bd & 0x8F != 0 {
        return Err(FrameError::ReservedFlagSet);
    }
    let code = (bd >> 4) & 0x07;
    let block_size_id = BlockSizeId::from_code(code).ok_or(FrameError::MaxBlockSizeInvalid(code))?;

    let hc_pos = size - 1;
    if header_checksum(&header[4..hc_pos]) != header[hc_pos] {
        return Err(FrameError::HeaderChecksumInvalid);
    }

    let mut pos = 6;
    let mut content_size = 0;
    if flg & FLG_CONTENT_SIZE != 0 {
        let b = &header[pos..pos + 8];
        content_size = u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
        pos += 8;
    }
    let dict_id = if flg & FLG_DICT_ID != 0 { read_u32_le(header, pos) } else { 0 };

    Ok(FrameInfo {
        block_size_id,
        block_mode: if flg & FLG_BLOCK_INDEPENDENCE != 0 {
            BlockMode::Independent
        } else {
            BlockMode::Linked
        },
        content_checksum: flg & FLG_CONTENT_CHECKSUM != 0,
        block_checksum: flg & FLG_BLOCK_CHECKSUM != 0,
        content_size,
        dict_id,
    })
}
