//! Frame adapters: [`FrameWriter`] compresses everything written to it into
//! one LZ4 frame; [`FrameReader`] decodes LZ4 frames (concatenated and
//! skippable frames included) from any reader. Both drive the engine
//! through the same handle-based calls an external caller would use.

use std::io::{self, Read, Write};

use crate::bridge::{self, CompressionHandle, DecompressionHandle, Progress};
use crate::buffer::LogicalBuffer;
use crate::config::STREAM_CHUNK_SIZE;
use crate::frame::{self, Preferences};

// ─────────────────────────────────────────────────────────────────────────────
// FrameWriter
// ─────────────────────────────────────────────────────────────────────────────

/// Compressing writer. Call [`finish`](FrameWriter::finish) to write the
/// end of the frame; dropping without it releases the context and leaves
/// the frame incomplete.
pub struct FrameWriter<W: Write> {
    inner: Option<W>,
    handle: Option<CompressionHandle>,
    out: Vec<u8>,
}

impl<W: Write> FrameWriter<W> {
    /// Writes the frame header to `inner` right away.
    pub fn new(inner: W, prefs: Preferences) -> io::Result<Self> {
        let handle = bridge::frame_create_compression_context()?;
        let mut writer = FrameWriter {
            inner: Some(inner),
            handle: Some(handle),
            out: vec![0u8; frame::compress_bound(STREAM_CHUNK_SIZE, Some(&prefs))],
        };
        let cap = writer.out.len();
        let n = bridge::frame_compress_begin_with(handle, &prefs, &LogicalBuffer::from(&mut writer.out[..]), 0, cap)?;
        writer.emit(n)?;
        Ok(writer)
    }

    fn handle(&self) -> io::Result<CompressionHandle> {
        self.handle
            .ok_or_else(|| io::Error::other("frame writer already finished"))
    }

    fn emit(&mut self, n: usize) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) if n > 0 => inner.write_all(&self.out[..n]),
            _ => Ok(()),
        }
    }

    /// Ends the frame and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        let handle = self.handle()?;
        let cap = self.out.len();
        let n = bridge::frame_compress_end(handle, &LogicalBuffer::from(&mut self.out[..]), 0, cap)?;
        self.emit(n)?;
        self.handle = None;
        bridge::frame_free_compression_context(handle)?;
        let mut inner = self
            .inner
            .take()
            .ok_or_else(|| io::Error::other("frame writer lost its sink"))?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for FrameWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let handle = self.handle()?;
        let chunk = &buf[..buf.len().min(STREAM_CHUNK_SIZE)];
        let cap = self.out.len();
        let n = bridge::frame_compress_update(
            handle,
            &LogicalBuffer::from(chunk),
            0,
            chunk.len(),
            &LogicalBuffer::from(&mut self.out[..]),
            0,
            cap,
        )?;
        self.emit(n)?;
        Ok(chunk.len())
    }

    /// Pushes buffered input out as a block, then flushes the sink.
    fn flush(&mut self) -> io::Result<()> {
        let handle = self.handle()?;
        let cap = self.out.len();
        let n = bridge::frame_compress_flush(handle, &LogicalBuffer::from(&mut self.out[..]), 0, cap)?;
        self.emit(n)?;
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for FrameWriter<W> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = bridge::frame_free_compression_context(handle);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameReader
// ─────────────────────────────────────────────────────────────────────────────

/// Decompressing reader. Input that ends mid-frame is an
/// [`io::ErrorKind::UnexpectedEof`] error.
pub struct FrameReader<R: Read> {
    inner: R,
    handle: DecompressionHandle,
    input: Vec<u8>,
    in_pos: usize,
    in_len: usize,
    eof: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> io::Result<Self> {
        Ok(FrameReader {
            inner,
            handle: bridge::frame_create_decompression_context()?,
            input: vec![0u8; STREAM_CHUNK_SIZE],
            in_pos: 0,
            in_len: 0,
            eof: false,
        })
    }

    fn refill(&mut self) -> io::Result<()> {
        loop {
            match self.inner.read(&mut self.input) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.in_pos = 0;
                    self.in_len = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for FrameReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.in_pos == self.in_len && !self.eof {
                self.refill()?;
            }
            let src = &self.input[self.in_pos..self.in_len];
            let cap = out.len();
            let progress = bridge::frame_decompress(
                self.handle,
                &LogicalBuffer::from(src),
                0,
                src.len(),
                &LogicalBuffer::from(&mut *out),
                0,
                cap,
            )?;
            match progress {
                Progress::NeedMoreOutput { consumed, written } => {
                    self.in_pos += consumed;
                    return Ok(written);
                }
                Progress::Written(written) => {
                    self.in_pos = self.in_len;
                    if written > 0 {
                        return Ok(written);
                    }
                    if self.eof {
                        return if bridge::frame_decompress_is_idle(self.handle)? {
                            Ok(0)
                        } else {
                            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated LZ4 frame"))
                        };
                    }
                }
            }
        }
    }
}

impl<R: Read> Drop for FrameReader<R> {
    fn drop(&mut self) {
        let _ = bridge::frame_free_decompression_context(self.handle);
    }
}
