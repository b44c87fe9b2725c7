// e2e/error_handling.rs: failure categories as an external caller sees
// them: the error taxonomy, the out-only carrier, stale handles, io
// mapping and the warning log emitted on every failed call.

use std::cell::Cell;
use std::io::{self, Read, Write};
use std::ptr::NonNull;
use std::sync::{Mutex, OnceLock};

use lz4bridge::bridge::{self, Progress};
use lz4bridge::handle::Handle;
use lz4bridge::{BridgeError, ByteArray, ErrorKind, ErrorResult, FrameReader, LogicalBuffer, PinnableArray, Preferences};

struct Refusing {
    bytes: ByteArray,
    refuse: Cell<bool>,
}

unsafe impl PinnableArray for Refusing {
    fn pin(&self) -> Option<(NonNull<u8>, usize)> {
        if self.refuse.get() {
            None
        } else {
            self.bytes.pin()
        }
    }

    fn unpin(&self, base: NonNull<u8>) {
        self.bytes.unpin(base)
    }
}

fn sample() -> Vec<u8> {
    b"error handling sample, error handling sample, error handling sample".to_vec()
}

// ── Taxonomy ─────────────────────────────────────────────────────────────────

#[test]
fn every_category_is_reachable_from_the_boundary() {
    let data = sample();
    let src = LogicalBuffer::from(&data[..]);

    let host = Refusing { bytes: ByteArray::zeroed(256), refuse: Cell::new(true) };
    let err = bridge::block_compress(&src, 0, data.len(), &LogicalBuffer::Owned(&host), 0, 256).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);

    let mut small = [0u8; 4];
    let err = bridge::block_compress(&src, 0, data.len(), &LogicalBuffer::from(&mut small[..]), 0, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

    let garbage = [0xF0u8, 0xFF, 0xFF, 0x01];
    let mut out = [0u8; 64];
    let err = bridge::block_decompress_safe(&LogicalBuffer::from(&garbage[..]), 0, 4, &LogicalBuffer::from(&mut out[..]), 0, 64)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);

    let h = bridge::hash32_init(0).unwrap();
    bridge::hash32_free(h).unwrap();
    assert_eq!(bridge::hash32_digest(h).unwrap_err().kind(), ErrorKind::InvalidState);

    let err = bridge::block_compress(&src, 10, data.len(), &LogicalBuffer::from(&mut out[..]), 0, 64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn numeric_codes_are_stable() {
    assert_eq!(ErrorKind::OutOfMemory as i32, 1);
    assert_eq!(ErrorKind::CapacityExceeded as i32, 2);
    assert_eq!(ErrorKind::MalformedInput as i32, 3);
    assert_eq!(ErrorKind::InvalidState as i32, 4);
    assert_eq!(ErrorKind::InvalidArgument as i32, 5);
    assert_eq!(ErrorKind::CapacityExceeded.to_string(), "CapacityExceeded");
}

#[test]
fn capacity_error_names_the_size_to_retry_with() {
    let data = sample();
    let mut dst = vec![0u8; 8];
    let err = bridge::block_compress(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut dst[..]), 0, 8)
        .unwrap_err();
    let BridgeError::CapacityExceeded { needed, available } = err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(available, 8);
    let mut dst = vec![0u8; needed];
    let n = bridge::block_compress(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut dst[..]), 0, needed)
        .unwrap();
    assert!(n <= needed);
}

// ── Carrier ──────────────────────────────────────────────────────────────────

#[test]
fn carrier_is_written_on_failure_only() {
    let data = sample();
    let mut out = vec![0u8; 256];
    let mut carrier = ErrorResult::new();

    let ok = carrier.capture(bridge::block_compress(
        &LogicalBuffer::from(&data[..]),
        0,
        data.len(),
        &LogicalBuffer::from(&mut out[..]),
        0,
        256,
    ));
    assert!(ok.is_some());
    assert!(!carrier.is_set());

    let failed = carrier.capture(bridge::hash64(&LogicalBuffer::from(&data[..]), 0, data.len() + 1, 0));
    assert!(failed.is_none());
    assert_eq!(carrier.kind(), Some(ErrorKind::InvalidArgument));
    assert!(carrier.message().unwrap().starts_with("invalid argument:"));

    // A later success leaves the recorded failure in place.
    assert!(carrier.capture(bridge::hash64(&LogicalBuffer::from(&data[..]), 0, 1, 0)).is_some());
    assert_eq!(carrier.kind(), Some(ErrorKind::InvalidArgument));
    assert!(carrier.take().is_some());
    assert!(!carrier.is_set());
}

// ── Handles ──────────────────────────────────────────────────────────────────

#[test]
fn stale_and_forged_handles_are_invalid_state() {
    let cctx = bridge::frame_create_compression_context().unwrap();
    let raw = cctx.into_raw();
    bridge::frame_free_compression_context(cctx).unwrap();

    let mut out = vec![0u8; 64];
    let stale = Handle::from_raw(raw).unwrap();
    let err = bridge::frame_compress_begin(stale, 1, &LogicalBuffer::from(&mut out[..]), 0, 64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(bridge::frame_free_compression_context(stale).unwrap_err().kind(), ErrorKind::InvalidState);

    assert!(Handle::<lz4bridge::frame::FrameCompressor>::from_raw(0).is_err());

    // A hash handle's integer is not a compression handle.
    let h = bridge::hash64_init(7).unwrap();
    let foreign = Handle::<lz4bridge::frame::FrameCompressor>::from_raw(h.into_raw());
    assert_eq!(foreign.unwrap_err().kind(), ErrorKind::InvalidState);
    bridge::hash64_free(h).unwrap();
}

#[test]
fn decoder_recovers_after_malformed_input() {
    let dctx = bridge::frame_create_decompression_context().unwrap();
    let mut out = vec![0u8; 1024];
    let bad = [0x04u8, 0x22, 0x4D, 0x18, 0x64, 0x40, 0x00];
    let err = bridge::frame_decompress(dctx, &LogicalBuffer::from(&bad[..]), 0, bad.len(), &LogicalBuffer::from(&mut out[..]), 0, 1024)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);

    let frame = lz4bridge::frame::compress_frame_to_vec(b"after the failure", &Preferences::default()).unwrap();
    let progress = bridge::frame_decompress(dctx, &LogicalBuffer::from(&frame[..]), 0, frame.len(), &LogicalBuffer::from(&mut out[..]), 0, 1024)
        .unwrap();
    assert_eq!(progress, Progress::Written(17));
    assert_eq!(&out[..17], b"after the failure");
    bridge::frame_free_decompression_context(dctx).unwrap();
}

#[test]
fn compressor_stage_errors_leave_the_context_usable() {
    let cctx = bridge::frame_create_compression_context().unwrap();
    let mut out = vec![0u8; 1024];
    let err = bridge::frame_compress_end(cctx, &LogicalBuffer::from(&mut out[..]), 0, 1024).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let n = bridge::frame_compress_begin(cctx, 1, &LogicalBuffer::from(&mut out[..]), 0, 1024).unwrap();
    assert_eq!(n, 7);
    let m = bridge::frame_compress_end(cctx, &LogicalBuffer::from(&mut out[..]), n, 1024 - n).unwrap();
    assert_eq!(lz4bridge::frame::decompress_frame_to_vec(&out[..n + m]).unwrap(), b"");
    bridge::frame_free_compression_context(cctx).unwrap();
}

// ── io mapping ───────────────────────────────────────────────────────────────

#[test]
fn io_errors_carry_the_category() {
    let err = FrameReader::new(&b"definitely not an lz4 frame"[..])
        .unwrap()
        .read_to_end(&mut Vec::new())
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<BridgeError>()).unwrap();
    assert_eq!(inner.kind(), ErrorKind::MalformedInput);

    let io_err: io::Error = BridgeError::InvalidArgument("x".into()).into();
    assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    let io_err: io::Error = BridgeError::CapacityExceeded { needed: 2, available: 1 }.into();
    assert_eq!(io_err.kind(), io::ErrorKind::WriteZero);
}

// ── Logging ──────────────────────────────────────────────────────────────────

static LOG: Mutex<Vec<u8>> = Mutex::new(Vec::new());

struct Capture;

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        LOG.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn install_capture() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(|| Capture)
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .try_init();
    });
}

#[test]
fn failed_calls_are_logged_with_operation_and_kind() {
    install_capture();
    let data = sample();
    let mut out = [0u8; 2];
    let _ = bridge::block_compress_hc(&LogicalBuffer::from(&data[..]), 0, data.len(), &LogicalBuffer::from(&mut out[..]), 0, 2, 9);

    let log = String::from_utf8(LOG.lock().unwrap().clone()).unwrap();
    let line = log
        .lines()
        .find(|l| l.contains("block_compress_hc"))
        .unwrap_or_else(|| panic!("no warning logged; captured:\n{log}"));
    assert!(line.contains("WARN"));
    assert!(line.contains("kind=CapacityExceeded"));
}
