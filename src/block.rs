//! Block writer/indexer: compresses fixed-size chunks of serialized
//! records and tracks their placement in the body stream.
//!
//! A chunk the caller marks as uniformly zero is never written — its
//! index entry is the offset-zero sentinel `{offset: 0, length: 0}`,
//! which a reader interprets as "all zero, nothing to fetch" rather
//! than as a legitimate zero-length block at the start of the stream
//! (the body's first real block, if nonzero, always starts past byte 0
//! because the archive header precedes it). Zero-ness is a property of
//! the segment's *values*, not of its serialized bytes: a serialized
//! record's length/count prefixes are rarely zero even when the
//! coverage it carries is, so callers must determine zero-ness from
//! the underlying data themselves and pass it in explicitly.

use crate::codec;
use crate::config::CompressMethod;
use crate::error::Result;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndexEntry {
    pub offset: u64,
    pub length: u64,
}

impl BlockIndexEntry {
    pub fn is_sentinel(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

/// Appends compressed chunks to a sink, recording each one's offset and
/// compressed length.
pub struct BlockWriter<W: Write> {
    sink: W,
    cursor: u64,
    method: CompressMethod,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(sink: W, method: CompressMethod) -> Self {
        Self {
            sink,
            cursor: 0,
            method,
        }
    }

    /// Compress and append one chunk, or skip the write entirely and
    /// return the sentinel entry if the caller asserts `is_zero`. The
    /// caller is responsible for determining zero-ness from the
    /// segment's actual values, since the serialized bytes themselves
    /// commonly carry nonzero length/count prefixes even for an
    /// all-zero segment.
    pub fn write_block(&mut self, raw: &[u8], is_zero: bool) -> Result<BlockIndexEntry> {
        if is_zero {
            return Ok(BlockIndexEntry { offset: 0, length: 0 });
        }
        let compressed = codec::compress(self.method, raw)?;
        let entry = BlockIndexEntry {
            offset: self.cursor,
            length: compressed.len() as u64,
        };
        self.sink.write_all(&compressed)?;
        self.cursor += compressed.len() as u64;
        Ok(entry)
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Split `items` into chunks of `chunk_size` for independent block
/// compression. Mirrors `exon_chunk_size`/`junction_chunk_size` from
/// the compressor configuration.
pub fn chunked<T>(items: &[T], chunk_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(chunk_size.max(1))
}
