//! Argument definitions.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{BLOCKSIZEID_DEFAULT, CLEVEL_DEFAULT, DISPLAY_LEVEL_DEFAULT};
use crate::frame::{BlockMode, BlockSizeId, FrameInfo, Preferences};

/// Path value meaning stdin (as input) or stdout (as output).
pub const STDIO_MARK: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "lz4bridge", version, about = "LZ4 frame compression and xxHash checksums")]
pub struct Cli {
    /// More diagnostics on stderr (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fewer diagnostics on stderr (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn display_level(&self) -> i32 {
        i32::from(DISPLAY_LEVEL_DEFAULT) + i32::from(self.verbose) - i32::from(self.quiet)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress INPUT into one LZ4 frame.
    Compress(CompressArgs),
    /// Decompress every LZ4 frame in INPUT.
    Decompress(TransferArgs),
    /// Print the xxHash digest of each input.
    Hash(HashArgs),
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Input file, `-` for stdin.
    #[arg(default_value = STDIO_MARK)]
    pub input: PathBuf,

    /// Output file, `-` for stdout.
    #[arg(default_value = STDIO_MARK)]
    pub output: PathBuf,

    /// Overwrite an existing output file.
    #[arg(short, long)]
    pub force: bool,
}

impl TransferArgs {
    pub fn input_is_stdin(&self) -> bool {
        is_stdio(&self.input)
    }

    pub fn output_is_stdout(&self) -> bool {
        is_stdio(&self.output)
    }
}

pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_MARK
}

#[derive(Debug, Args)]
pub struct CompressArgs {
    #[command(flatten)]
    pub io: TransferArgs,

    /// Compression level: below 2 uses the fast encoder (negative values
    /// trade ratio for speed), 2..=12 uses LZ4-HC.
    #[arg(short, long, default_value_t = CLEVEL_DEFAULT, allow_negative_numbers = true)]
    pub level: i32,

    /// Block size id: 4 = 64 KiB, 5 = 256 KiB, 6 = 1 MiB, 7 = 4 MiB.
    #[arg(short = 'B', long = "block-size", default_value_t = BLOCKSIZEID_DEFAULT,
          value_parser = clap::value_parser!(u8).range(4..=7))]
    pub block_size_id: u8,

    /// Compress blocks independently instead of linking them.
    #[arg(long)]
    pub independent: bool,

    /// Omit the content checksum.
    #[arg(long)]
    pub no_content_checksum: bool,

    /// Append a checksum to every block.
    #[arg(long)]
    pub block_checksum: bool,

    /// Record the input size in the frame header (file inputs only).
    #[arg(long)]
    pub content_size: bool,
}

impl CompressArgs {
    /// Frame preferences for an input of `known_size` bytes, if known.
    pub fn preferences(&self, known_size: Option<u64>) -> Preferences {
        Preferences {
            frame_info: FrameInfo {
                block_size_id: BlockSizeId::from_code(self.block_size_id).unwrap_or_default(),
                block_mode: if self.independent { BlockMode::Independent } else { BlockMode::Linked },
                content_checksum: !self.no_content_checksum,
                block_checksum: self.block_checksum,
                content_size: if self.content_size { known_size.unwrap_or(0) } else { 0 },
                dict_id: 0,
            },
            compression_level: self.level,
            auto_flush: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashBits {
    #[value(name = "32")]
    Xxh32,
    #[value(name = "64")]
    Xxh64,
}

#[derive(Debug, Args)]
pub struct HashArgs {
    /// Files to hash, `-` for stdin.
    #[arg(default_value = STDIO_MARK)]
    pub inputs: Vec<PathBuf>,

    /// Digest width.
    #[arg(short, long, value_enum, default_value = "32")]
    pub bits: HashBits,

    /// Hash seed; must fit in 32 bits with `--bits 32`.
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
}
