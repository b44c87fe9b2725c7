//! Command execution.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use super::args::{is_stdio, Command, CompressArgs, HashArgs, HashBits, TransferArgs};
use crate::bridge;
use crate::buffer::LogicalBuffer;
use crate::config::STREAM_CHUNK_SIZE;
use crate::stream::{FrameReader, FrameWriter};

/// Runs one parsed command.
pub fn execute(command: &Command) -> Result<()> {
    match command {
        Command::Compress(args) => compress(args),
        Command::Decompress(args) => decompress(args),
        Command::Hash(args) => hash(args, &mut io::stdout().lock()),
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(args: &TransferArgs) -> Result<Box<dyn Write>> {
    if args.output_is_stdout() {
        return Ok(Box::new(io::stdout().lock()));
    }
    if !args.force && args.output.exists() {
        bail!("{} already exists; use --force to overwrite", args.output.display());
    }
    let file = File::create(&args.output).with_context(|| format!("cannot create {}", args.output.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn compress(args: &CompressArgs) -> Result<()> {
    let known_size = if args.io.input_is_stdin() {
        None
    } else {
        Some(fs::metadata(&args.io.input).with_context(|| format!("cannot stat {}", args.io.input.display()))?.len())
    };
    let prefs = args.preferences(known_size);
    debug!(?prefs, "compressing");

    let mut input = open_input(&args.io.input)?;
    let mut writer = FrameWriter::new(open_output(&args.io)?, prefs).context("cannot start frame")?;
    let read = io::copy(&mut input, &mut writer).context("compression failed")?;
    let mut sink = writer.finish().context("cannot end frame")?;
    sink.flush()?;
    info!(read, "compressed {}", args.io.input.display());
    Ok(())
}

fn decompress(args: &TransferArgs) -> Result<()> {
    let mut reader = FrameReader::new(open_input(&args.input)?).context("cannot create decoder")?;
    let mut output = open_output(args)?;
    let written = io::copy(&mut reader, &mut output)
        .with_context(|| format!("cannot decode {}", args.input.display()))?;
    output.flush()?;
    info!(written, "decompressed {}", args.input.display());
    Ok(())
}

/// Streams each input through a hash handle and prints `digest  name`.
pub fn hash(args: &HashArgs, out: &mut dyn Write) -> Result<()> {
    let mut chunk = vec![0u8; STREAM_CHUNK_SIZE];
    for path in &args.inputs {
        let mut input = open_input(path)?;
        let digest = match args.bits {
            HashBits::Xxh32 => {
                let seed = u32::try_from(args.seed).context("seed does not fit in 32 bits")?;
                let handle = bridge::hash32_init(seed)?;
                let fed = feed(&mut *input, &mut chunk, |buf| {
                    bridge::hash32_update(handle, &LogicalBuffer::from(buf), 0, buf.len())
                });
                let digest = fed.and_then(|()| Ok(bridge::hash32_digest(handle)?));
                bridge::hash32_free(handle)?;
                format!("{:08x}", digest?)
            }
            HashBits::Xxh64 => {
                let handle = bridge::hash64_init(args.seed)?;
                let fed = feed(&mut *input, &mut chunk, |buf| {
                    bridge::hash64_update(handle, &LogicalBuffer::from(buf), 0, buf.len())
                });
                let digest = fed.and_then(|()| Ok(bridge::hash64_digest(handle)?));
                bridge::hash64_free(handle)?;
                format!("{:016x}", digest?)
            }
        };
        writeln!(out, "{digest}  {}", path.display())?;
    }
    Ok(())
}

fn feed(
    input: &mut dyn Read,
    chunk: &mut [u8],
    mut update: impl FnMut(&[u8]) -> crate::error::Result<()>,
) -> Result<()> {
    loop {
        let n = match input.read(chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("read failed"),
        };
        update(&chunk[..n])?;
    }
}
