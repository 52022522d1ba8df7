//! Block codec dispatch: compress/decompress a single chunk buffer
//! under whichever method `CompressOptions::compress_method` selects.

use crate::config::CompressMethod;
use crate::error::{Result, ScramError};
use bzip2::read::{BzDecoder, BzEncoder};
use bzip2::Compression as BzCompression;
use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression as DeflateCompression;
use std::io::Read;
use xz2::read::{XzDecoder, XzEncoder};

pub fn compress(method: CompressMethod, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match method {
        CompressMethod::Deflate => {
            DeflateEncoder::new(data, DeflateCompression::best())
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
        CompressMethod::Lzma => {
            XzEncoder::new(data, 6)
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
        CompressMethod::Bzip2 => {
            BzEncoder::new(data, BzCompression::best())
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
    }
    Ok(out)
}

pub fn decompress(method: CompressMethod, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match method {
        CompressMethod::Deflate => {
            DeflateDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
        CompressMethod::Lzma => {
            XzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
        CompressMethod::Bzip2 => {
            BzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| ScramError::Codec(e.to_string()))?;
        }
    }
    Ok(out)
}
