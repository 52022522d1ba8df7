//! End-to-end integration tests: SAM text in, archive out, exercised
//! through the public `scram_core::compress` entry point.

use scram_core::config::{CompressMethod, CompressOptions};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_sam(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn test_unpaired_unspliced_read_compresses() {
    // Scenario S1: a single unpaired, unspliced read.
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
r1\t0\tchr1\t101\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    scram_core::compress(input.path(), output.path(), &CompressOptions::default()).unwrap();

    let metadata = std::fs::metadata(output.path()).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn test_paired_reads_with_gap() {
    // Scenario S2: two mates on the same chromosome pointing at each
    // other, 15bp apart, combined into one logical read.
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
r1\t99\tchr1\t201\t255\t20M\t=\t236\t0\t*\t*\tNH:i:1\n\
r1\t147\tchr1\t236\t255\t25M\t=\t201\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    scram_core::compress(input.path(), output.path(), &CompressOptions::default()).unwrap();
    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}

#[test]
fn test_spliced_reads_with_strand_tags() {
    // Scenario S3/S4: two reads sharing a junction, one with an
    // explicit XS tag and one without, exercising first-come strand
    // resolution end to end.
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:2000\n\
r1\t0\tchr1\t101\t255\t50M200N50M\t*\t0\t0\t*\t*\tNH:i:1\tXS:A:+\n\
r2\t0\tchr1\t101\t255\t50M200N50M\t*\t0\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    scram_core::compress(input.path(), output.path(), &CompressOptions::default()).unwrap();
    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}

#[test]
fn test_text_archive_mode() {
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
r1\t0\tchr1\t101\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    let options = CompressOptions::new().with_binary(false);
    scram_core::compress(input.path(), output.path(), &options).unwrap();

    let text = std::fs::read_to_string(output.path()).unwrap();
    assert!(text.starts_with("#scram-text-v1"));
}

#[test]
fn test_huffman_binary_mode() {
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
r1\t0\tchr1\t101\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n\
r2\t0\tchr1\t121\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    let options = CompressOptions::new().with_huffman(true);
    scram_core::compress(input.path(), output.path(), &options).unwrap();
    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}

#[test]
fn test_bzip2_and_lzma_methods() {
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
r1\t0\tchr1\t101\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n";

    for method in [CompressMethod::Bzip2, CompressMethod::Lzma] {
        let input = write_sam(sam);
        let output = NamedTempFile::new().unwrap();
        let options = CompressOptions::new().with_compress_method(method);
        scram_core::compress(input.path(), output.path(), &options).unwrap();
        assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
    }
}

#[test]
fn test_malformed_line_is_skipped_not_fatal() {
    let sam = "\
@HD\tVN:1.0\n\
@SQ\tSN:chr1\tLN:1000\n\
bad_line_too_few_fields\n\
r1\t0\tchr1\t101\t255\t50M\t*\t0\t0\t*\t*\tNH:i:1\n";
    let input = write_sam(sam);
    let output = NamedTempFile::new().unwrap();

    scram_core::compress(input.path(), output.path(), &CompressOptions::default()).unwrap();
    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}
