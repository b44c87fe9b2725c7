//! Boundary error taxonomy and the out-only error carrier.
//!
//! Every boundary operation returns `Result<_, BridgeError>`. Callers that
//! cannot receive a `Result` (the C ABI) capture the error into an
//! [`ErrorResult`], which is written on failure only.

use std::fmt;

use thiserror::Error;

use crate::block::BlockError;
use crate::frame::FrameError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A buffer could not be pinned or mapped, or an allocation failed.
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    /// The destination is too small; retry with at least `needed` bytes.
    #[error("destination capacity exceeded: need {needed} bytes, have {available}")]
    CapacityExceeded { needed: usize, available: usize },
    /// Corrupt compressed data; the stream should be abandoned.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Call issued out of order, or with a stale, foreign or busy handle.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Offsets, lengths or buffer kinds that can never work.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Stable numeric category of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    OutOfMemory = 1,
    CapacityExceeded = 2,
    MalformedInput = 3,
    InvalidState = 4,
    InvalidArgument = 5,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::OutOfMemory => "OutOfMemory",
            ErrorKind::CapacityExceeded => "CapacityExceeded",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::InvalidState => "InvalidState",
            ErrorKind::InvalidArgument => "InvalidArgument",
        };
        f.write_str(name)
    }
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            BridgeError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            BridgeError::MalformedInput(_) => ErrorKind::MalformedInput,
            BridgeError::InvalidState(_) => ErrorKind::InvalidState,
            BridgeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        BridgeError::InvalidState(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        BridgeError::InvalidArgument(msg.into())
    }
}

impl From<FrameError> for BridgeError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::DstMaxSizeTooSmall { needed, available } => {
                BridgeError::CapacityExceeded { needed, available }
            }
            FrameError::StageMismatch(_) => BridgeError::InvalidState(e.to_string()),
            FrameError::ContentSizeMismatch { .. } => BridgeError::InvalidArgument(e.to_string()),
            _ => BridgeError::MalformedInput(e.to_string()),
        }
    }
}

impl From<BlockError> for BridgeError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::OutputTooSmall => BridgeError::CapacityExceeded { needed: 0, available: 0 },
            BlockError::InputTooLarge => BridgeError::InvalidArgument(e.to_string()),
            BlockError::Malformed { .. } => BridgeError::MalformedInput(e.to_string()),
        }
    }
}

impl From<BridgeError> for std::io::Error {
    fn from(e: BridgeError) -> Self {
        let kind = match e.kind() {
            ErrorKind::OutOfMemory => std::io::ErrorKind::OutOfMemory,
            ErrorKind::CapacityExceeded => std::io::ErrorKind::WriteZero,
            ErrorKind::MalformedInput => std::io::ErrorKind::InvalidData,
            ErrorKind::InvalidState => std::io::ErrorKind::Other,
            ErrorKind::InvalidArgument => std::io::ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, e)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

// ─────────────────────────────────────────────────────────────────────────────
// ErrorResult
// ─────────────────────────────────────────────────────────────────────────────

/// Out-only error carrier: populated when an operation fails, left
/// untouched when it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorResult {
    error: Option<BridgeError>,
}

impl ErrorResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes `result` through, recording the error (if any) first.
    pub fn capture<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    pub fn is_set(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&BridgeError> {
        self.error.as_ref()
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(BridgeError::kind)
    }

    /// Human-readable message of the recorded failure.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn take(&mut self) -> Option<BridgeError> {
        self.error.take()
    }
}
