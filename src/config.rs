// config.rs: Compile-time configuration constants.
//
// Runtime settings are always explicit (`frame::Preferences`, CLI flags);
// the library reads no environment variables and no config files.

// Default compression level for the command-line tool (fast encoder).
// Overridden by `-l/--level`.
pub const CLEVEL_DEFAULT: i32 = 1;

// Default block size ID for the command-line tool (7 = 4 MB blocks).
// Overridden by `-B`.
pub const BLOCKSIZEID_DEFAULT: u8 = 7;

// Bytes fed to the frame engine per call by `FrameWriter`, and read from the
// underlying reader per refill by `FrameReader`.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

// Capacity of the message field in the C-ABI error carrier, terminator included.
pub const ERROR_MESSAGE_CAPACITY: usize = 256;

// Default verbosity of the command-line tool:
// 0 = silent, 1 = errors, 2 = warnings, 3 = info, 4 = debug, 5+ = trace.
pub const DISPLAY_LEVEL_DEFAULT: u8 = 2;
