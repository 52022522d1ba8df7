//! Error taxonomy for the compression pipeline.

use std::io;
use thiserror::Error;

/// Errors that can occur while compressing a SAM file into an archive.
///
/// `MalformedInput` is recovered locally by the ingestion layer (the
/// offending line is logged and skipped); every other variant is fatal
/// and aborts the current `compress` call.
#[derive(Error, Debug)]
pub enum ScramError {
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("RLE update out of bounds: start={start} length={length} total={total}")]
    RangeOutOfBounds {
        start: u64,
        length: u64,
        total: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("codec error: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, ScramError>;
