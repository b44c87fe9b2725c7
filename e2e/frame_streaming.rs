// e2e/frame_streaming.rs: streaming frames through files, readers, writers
// and concurrent contexts.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::thread;

use lz4bridge::frame::decompress_frame_to_vec;
use lz4bridge::{BlockMode, BlockSizeId, FrameReader, FrameWriter, Preferences};
use tempfile::TempDir;

fn corpus(len: usize, salt: u8) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32 ^ u32::from(salt);
    let words = ["alpha ", "beta ", "gamma ", "delta ", "epsilon ", "zeta ", "eta ", "theta "];
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.extend_from_slice(words[(state >> 24) as usize % words.len()].as_bytes());
    }
    out.truncate(len);
    out
}

/// Reader that hands out at most `step` bytes per call.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn file_round_trip_through_adapters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stream.lz4");
    let data = corpus(1_500_000, 1);

    let mut prefs = Preferences::with_level(3);
    prefs.frame_info.block_size_id = BlockSizeId::Max256Kb;
    prefs.frame_info.content_checksum = true;
    let mut writer = FrameWriter::new(BufWriter::new(File::create(&path).unwrap()), prefs).unwrap();
    for piece in data.chunks(12_345) {
        writer.write_all(piece).unwrap();
    }
    writer.finish().unwrap().flush().unwrap();

    let mut back = Vec::new();
    FrameReader::new(BufReader::new(File::open(&path).unwrap()))
        .unwrap()
        .read_to_end(&mut back)
        .unwrap();
    assert_eq!(back.len(), data.len());
    assert!(back == data);
}

#[test]
fn reader_survives_trickling_input_and_tiny_reads() {
    let data = corpus(200_000, 2);
    let mut w = FrameWriter::new(Vec::new(), Preferences::default()).unwrap();
    w.write_all(&data).unwrap();
    let frame = w.finish().unwrap();

    let mut reader = FrameReader::new(Trickle { data: &frame, step: 3 }).unwrap();
    let mut back = Vec::new();
    let mut buf = [0u8; 17];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        back.extend_from_slice(&buf[..n]);
    }
    assert!(back == data);
}

#[test]
fn writer_flush_produces_decodable_prefix() {
    let mut w = FrameWriter::new(Vec::new(), Preferences::default()).unwrap();
    w.write_all(b"first part, ").unwrap();
    w.flush().unwrap();
    w.write_all(b"second part").unwrap();
    let frame = w.finish().unwrap();
    assert_eq!(decompress_frame_to_vec(&frame).unwrap(), b"first part, second part");
}

#[test]
fn concatenated_writer_outputs_read_as_one_stream() {
    let mut joined = Vec::new();
    for (i, mode) in [BlockMode::Linked, BlockMode::Independent, BlockMode::Linked].into_iter().enumerate() {
        let mut prefs = Preferences::default();
        prefs.frame_info.block_mode = mode;
        let mut w = FrameWriter::new(Vec::new(), prefs).unwrap();
        w.write_all(format!("frame {i};").as_bytes()).unwrap();
        joined.extend(w.finish().unwrap());
    }
    let mut text = String::new();
    FrameReader::new(&joined[..]).unwrap().read_to_string(&mut text).unwrap();
    assert_eq!(text, "frame 0;frame 1;frame 2;");
}

#[test]
fn dropping_an_unfinished_writer_leaves_an_incomplete_frame() {
    let mut sink = Vec::new();
    {
        let mut w = FrameWriter::new(&mut sink, Preferences::default()).unwrap();
        w.write_all(&corpus(70_000, 3)).unwrap();
    }
    assert!(sink.len() > 7);
    let err = FrameReader::new(&sink[..]).unwrap().read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn independent_contexts_run_in_parallel() {
    let workers: Vec<_> = (0..6u8)
        .map(|i| {
            thread::spawn(move || {
                let data = corpus(300_000, i);
                let mut prefs = Preferences::with_level(if i % 2 == 0 { 1 } else { 6 });
                prefs.frame_info.content_checksum = true;
                let mut w = FrameWriter::new(Vec::new(), prefs).unwrap();
                w.write_all(&data).unwrap();
                let frame = w.finish().unwrap();
                let mut back = Vec::new();
                FrameReader::new(&frame[..]).unwrap().read_to_end(&mut back).unwrap();
                back == data
            })
        })
        .collect();
    for w in workers {
        assert!(w.join().unwrap());
    }
}
