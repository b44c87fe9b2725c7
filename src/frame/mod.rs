//! LZ4 frame format: self-describing container of LZ4 blocks with optional
//! checksums, decodable without knowing the original size.

pub mod compress;
pub mod decompress;
pub mod header;
pub mod types;

pub use compress::{compress_bound, compress_frame_bound, FrameCompressor};
pub use decompress::FrameDecompressor;
pub use types::{BlockMode, BlockSizeId, FrameError, FrameInfo, Preferences};

/// Compresses `src` as one complete frame into a new vector.
pub fn compress_frame_to_vec(src: &[u8], prefs: &Preferences) -> Result<Vec<u8>, FrameError> {
    let mut dst = vec![0u8; compress_frame_bound(src.len(), Some(prefs))];
    let mut cctx = FrameCompressor::new();
    let mut pos = cctx.begin(&mut dst, prefs)?;
    pos += cctx.update(src, &mut dst[pos..])?;
    pos += cctx.end(&mut dst[pos..])?;
    dst.truncate(pos);
    Ok(dst)
}

/// Decodes every frame in `src` into a new vector.
///
/// Input that stops mid-frame is reported as
/// [`FrameError::DecompressionFailed`].
pub fn decompress_frame_to_vec(src: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut dctx = FrameDecompressor::new();
    let mut out = Vec::new();
    let mut chunk = vec![0u8; 64 * 1024];
    let mut consumed = 0;
    loop {
        let (c, w) = dctx.decompress(&src[consumed..], &mut chunk)?;
        consumed += c;
        out.extend_from_slice(&chunk[..w]);
        if consumed == src.len() && !dctx.has_pending_output() {
            break;
        }
    }
    if !dctx.is_idle() {
        return Err(FrameError::DecompressionFailed);
    }
    Ok(out)
}
