#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! scram: exon-partitioned coverage compression for aligned SAM reads.
//!
//! Coverage is stored per maximal covered exon as a run-length-encoded
//! vector rather than per-base, with splice junctions and unspliced
//! single-exon reads tracked separately. The result is a compact,
//! randomly-queryable archive; decompression and SAM/CIGAR ingestion
//! beyond the thin reader in [`sam`] are a separate concern.

pub mod aggregator;
pub mod archive;
pub mod block;
pub mod chrom;
pub mod cigar;
pub mod codec;
pub mod compressor;
pub mod config;
pub mod error;
pub mod exon;
pub mod huffman;
pub mod junction;
pub mod mates;
pub mod read;
pub mod rle;
pub mod sam;
pub mod text;
pub mod unspliced;

pub use compressor::compress;
pub use config::{CompressMethod, CompressOptions};
pub use error::{Result, ScramError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience re-exports for the common compression entry points.
pub mod prelude {
    pub use crate::chrom::ChromTable;
    pub use crate::compressor::compress;
    pub use crate::config::{CompressMethod, CompressOptions};
    pub use crate::error::{Result, ScramError};
    pub use crate::exon::ExonTable;
}
