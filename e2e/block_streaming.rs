// e2e/block_streaming.rs: lz4-java `LZ4Block` streams through BlockWriter
// and BlockReader, including hand-assembled streams and damaged input.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use lz4bridge::stream::block::{DEFAULT_SEED, HEADER_LENGTH, MAGIC, METHOD_LZ4, METHOD_RAW};
use lz4bridge::xxhash::xxh32_oneshot;
use lz4bridge::{BlockReader, BlockWriter};
use tempfile::TempDir;

fn check(data: &[u8]) -> u32 {
    xxh32_oneshot(data, DEFAULT_SEED) & 0x0FFF_FFFF
}

fn header(token: u8, compressed: u32, original: u32, check: u32) -> Vec<u8> {
    let mut h = MAGIC.to_vec();
    h.push(token);
    h.extend_from_slice(&compressed.to_le_bytes());
    h.extend_from_slice(&original.to_le_bytes());
    h.extend_from_slice(&check.to_le_bytes());
    h
}

fn end_marker(token: u8) -> Vec<u8> {
    header(token, 0, 0, 0)
}

fn text(len: usize) -> Vec<u8> {
    b"independent blocks, each with its own checksum; "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x1234_5678u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn pack(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut w = BlockWriter::with_block_size(Vec::new(), block_size).unwrap();
    w.write_all(data).unwrap();
    w.finish().unwrap()
}

fn unpack(stream: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    BlockReader::new(stream).read_to_end(&mut out)?;
    Ok(out)
}

struct Trickle<'a>(&'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.0.len()).min(2);
        buf[..n].copy_from_slice(&self.0[..n]);
        self.0 = &self.0[n..];
        Ok(n)
    }
}

#[test]
fn round_trip_across_block_sizes() {
    for &block_size in &[64usize, 1000, 65_536, 1 << 20] {
        for &len in &[0usize, 1, 63, 64, 65, 4 * block_size, 150_000] {
            let data = text(len);
            assert_eq!(unpack(&pack(&data, block_size)).unwrap(), data, "block {block_size}, len {len}");
        }
    }
}

#[test]
fn file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.lz4b");
    let data = text(700_000);
    let mut w = BlockWriter::new(BufWriter::new(File::create(&path).unwrap())).unwrap();
    for piece in data.chunks(9_999) {
        w.write_all(piece).unwrap();
    }
    w.finish().unwrap().flush().unwrap();

    let mut back = Vec::new();
    BlockReader::new(BufReader::new(File::open(&path).unwrap())).read_to_end(&mut back).unwrap();
    assert!(back == data);
}

#[test]
fn writer_header_layout() {
    let data = text(65_536);
    let stream = pack(&data, 65_536);
    assert_eq!(&stream[..8], MAGIC);
    assert_eq!(stream[8], METHOD_LZ4 | 6);
    let compressed = u32::from_le_bytes(stream[9..13].try_into().unwrap()) as usize;
    assert_eq!(u32::from_le_bytes(stream[13..17].try_into().unwrap()), 65_536);
    assert_eq!(u32::from_le_bytes(stream[17..21].try_into().unwrap()), check(&data));
    assert_eq!(&stream[HEADER_LENGTH + compressed..], &end_marker(METHOD_RAW | 6)[..]);
}

#[test]
fn incompressible_blocks_are_stored_raw() {
    let data = noise(5_000);
    let stream = pack(&data, 4096);
    assert_eq!(stream[8], METHOD_RAW | 2);
    assert_eq!(&stream[9..13], &4096u32.to_le_bytes());
    assert_eq!(&stream[13..17], &4096u32.to_le_bytes());
    assert_eq!(&stream[HEADER_LENGTH..HEADER_LENGTH + 4096], &data[..4096]);
    assert_eq!(stream.len(), 3 * HEADER_LENGTH + 5_000);
    assert_eq!(unpack(&stream).unwrap(), data);
}

#[test]
fn hand_assembled_stream_decodes() {
    // "abc", then a 9-byte match at offset 3, then 5 trailing literals.
    let block = [0x35, b'a', b'b', b'c', 0x03, 0x00, 0x50, b'a', b'b', b'c', b'a', b'b'];
    let decoded = b"abcabcabcabcabcab";
    let mut stream = header(METHOD_LZ4 | 6, block.len() as u32, decoded.len() as u32, check(decoded));
    stream.extend_from_slice(&block);
    stream.extend(header(METHOD_RAW | 6, 5, 5, check(b"hello")));
    stream.extend_from_slice(b"hello");
    stream.extend(end_marker(METHOD_RAW | 6));
    assert_eq!(unpack(&stream).unwrap(), b"abcabcabcabcabcabhello");
}

#[test]
fn small_reads_over_trickling_input() {
    let data = text(100_000);
    let stream = pack(&data, 8192);
    let mut reader = BlockReader::new(Trickle(&stream));
    let mut back = Vec::new();
    let mut buf = [0u8; 13];
    loop {
        match reader.read(&mut buf).unwrap() {
            0 => break,
            n => back.extend_from_slice(&buf[..n]),
        }
    }
    assert!(back == data);
}

#[test]
fn concatenated_streams_need_opt_in() {
    let mut joined = pack(b"first stream, ", 1024);
    joined.extend(pack(b"second stream", 4096));

    assert_eq!(unpack(&joined).unwrap(), b"first stream, ");

    let mut all = String::new();
    BlockReader::new(&joined[..]).stop_on_empty_block(false).read_to_string(&mut all).unwrap();
    assert_eq!(all, "first stream, second stream");
}

#[test]
fn sync_flush_emits_the_partial_block() {
    let mut lazy = BlockWriter::new(Vec::new()).unwrap();
    lazy.write_all(b"pending").unwrap();
    lazy.flush().unwrap();
    assert!(lazy.get_ref().is_empty());

    let mut eager = BlockWriter::new(Vec::new()).unwrap().sync_flush(true);
    eager.write_all(b"pending").unwrap();
    eager.flush().unwrap();
    assert_eq!(eager.get_ref().len(), HEADER_LENGTH + 7);
    let stream = eager.finish().unwrap();
    assert_eq!(unpack(&stream).unwrap(), b"pending");
}

#[test]
fn invalid_block_sizes_are_rejected() {
    for size in [0usize, 63, (1 << 25) + 1] {
        let err = BlockWriter::with_block_size(Vec::new(), size).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{size}");
    }
}

#[test]
fn damaged_streams_are_invalid_data() {
    let data = text(3_000);
    let good = pack(&data, 1024);

    let mut bad_magic = good.clone();
    bad_magic[0] = b'X';
    let mut bad_method = good.clone();
    bad_method[8] = 0x30 | (bad_method[8] & 0x0F);
    let mut bad_check = good.clone();
    bad_check[17] ^= 0x01;
    let mut bad_payload = good.clone();
    bad_payload[HEADER_LENGTH + 2] ^= 0xFF;
    let mut dirty_end = good.clone();
    let last = dirty_end.len() - 1;
    dirty_end[last] = 1;
    let mut too_long = header(METHOD_RAW, 2000, 2000, 0);
    too_long.extend_from_slice(&[0u8; 2000]);

    for (name, stream) in [
        ("magic", bad_magic),
        ("method", bad_method),
        ("checksum", bad_check),
        ("payload", bad_payload),
        ("end marker", dirty_end),
        ("length", too_long),
    ] {
        let err = unpack(&stream).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData, "{name}: {err}");
    }
}

#[test]
fn truncated_streams_are_unexpected_eof() {
    let good = pack(&text(3_000), 1024);
    for cut in [good.len() - HEADER_LENGTH, good.len() - 5, HEADER_LENGTH + 3, 4] {
        let err = unpack(&good[..cut]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "cut at {cut}");
    }
}
