//! Two-pass binary archive assembler.
//!
//! Pass one streams every junction chunk, unspliced coverage breakpoint
//! segment, and exon-histogram chunk into a scratch file, each
//! independently block-compressed, recording their offsets as it goes.
//! Only once the body exists do the index offsets make sense, so pass
//! two composes the final file as header, then compressed index, then
//! the scratch body copied verbatim.
//!
//! Unspliced coverage is not one block per `NH` group: each group's
//! genome-wide coverage is sliced at fixed `section_len` breakpoints
//! (`0, section_len, 2*section_len, ...`), and each segment is written
//! as its own block, so a reader can fetch one section of the genome
//! without decompressing the rest. A segment that is uniformly zero
//! never gets a byte written for it — its index entry is the
//! offset-zero sentinel.

use crate::block::{chunked, BlockIndexEntry, BlockWriter};
use crate::chrom::ChromTable;
use crate::codec;
use crate::config::CompressOptions;
use crate::error::Result;
use crate::exon::ExonTable;
use crate::huffman::{self, HuffmanTable};
use crate::junction::Junction;
use crate::rle::Run;
use crate::unspliced::{Coverage, ExonHistogram, UnsplicedGroup, UnsplicedResult};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub const MAGIC: &[u8; 4] = b"SCRM";
pub const FORMAT_VERSION: u8 = 1;

fn write_u8<W: Write>(w: &mut W, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}
fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_i32<W: Write>(w: &mut W, v: i32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_bytes<W: Write>(w: &mut W, v: &[u8]) -> io::Result<()> {
    write_u32(w, v.len() as u32)?;
    w.write_all(v)
}

fn write_chrom_table<W: Write>(w: &mut W, chroms: &ChromTable) -> io::Result<()> {
    write_u32(w, chroms.len() as u32)?;
    for name in chroms.names() {
        write_bytes(w, name.as_bytes())?;
        write_u64(w, chroms.len_of(name).unwrap_or(0))?;
    }
    Ok(())
}

fn write_exon_table<W: Write>(w: &mut W, exons: &ExonTable) -> io::Result<()> {
    write_u32(w, exons.boundaries().len() as u32)?;
    for b in exons.boundaries() {
        write_u64(w, *b)?;
    }
    Ok(())
}

fn write_index_entries<W: Write>(w: &mut W, entries: &[BlockIndexEntry]) -> io::Result<()> {
    write_u32(w, entries.len() as u32)?;
    for e in entries {
        write_u64(w, e.offset)?;
        write_u64(w, e.length)?;
    }
    Ok(())
}

/// Raw-encode a run stream, optionally Huffman-coding the difference
/// stream of run values first.
fn serialize_runs(runs: &[Run], huffman: Option<&HuffmanTable>) -> Vec<u8> {
    let values: Vec<i32> = runs.iter().map(|r| r.value).collect();
    let diffs = huffman::difference_encode(&values);
    let mut buf = Vec::new();
    write_u32(&mut buf, runs.len() as u32).unwrap();
    if let Some(table) = huffman {
        let mut bitpos = 0u8;
        let mut byte = 0u8;
        for &d in &diffs {
            if let Some((code, len)) = table.code_of(d) {
                for bit in (0..len).rev() {
                    let b = (code >> bit) & 1;
                    byte |= (b as u8) << (7 - bitpos);
                    bitpos += 1;
                    if bitpos == 8 {
                        buf.push(byte);
                        byte = 0;
                        bitpos = 0;
                    }
                }
            }
        }
        if bitpos > 0 {
            buf.push(byte);
        }
    } else {
        for &d in &diffs {
            write_i32(&mut buf, d).unwrap();
        }
    }
    for r in runs {
        write_u64(&mut buf, r.length).unwrap();
    }
    buf
}

fn serialize_lens(map: &HashMap<u64, u64>) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, map.len() as u32).unwrap();
    let mut entries: Vec<(&u64, &u64)> = map.iter().collect();
    entries.sort_by_key(|(k, _)| **k);
    for (len, count) in entries {
        write_u64(&mut buf, *len).unwrap();
        write_u64(&mut buf, *count).unwrap();
    }
    buf
}

fn serialize_junction(junction: &Junction, huffman: Option<&HuffmanTable>) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, junction.exon_ids.len() as u32).unwrap();
    for &id in &junction.exon_ids {
        write_u64(&mut buf, id as u64).unwrap();
    }
    write_u8(&mut buf, junction.strand.as_char() as u8).unwrap();
    write_u32(&mut buf, junction.nh).unwrap();
    write_u64(&mut buf, junction.max_read_len).unwrap();
    buf.extend(serialize_runs(junction.coverage.runs(), huffman));
    buf.extend(serialize_lens(&junction.unpaired_lens));
    buf.extend(serialize_lens(&junction.paired_lens));
    buf.extend(serialize_lens(&junction.lens_left));
    buf.extend(serialize_lens(&junction.lens_right));
    buf
}

/// Serialize one coverage segment's raw values — nothing else. Kept
/// free of any `nh`/offset metadata so an all-zero segment serializes
/// to a recognizably trivial payload and, more importantly, so the
/// zero-ness check the caller performs against the segment's own
/// values (see `block::BlockWriter::write_block`) is the only source
/// of truth for the sentinel.
fn serialize_coverage_segment(segment: &Coverage, huffman: Option<&HuffmanTable>) -> Vec<u8> {
    let mut buf = Vec::new();
    match segment {
        Coverage::Dense(values) => {
            write_u8(&mut buf, 0).unwrap();
            write_u32(&mut buf, values.len() as u32).unwrap();
            for &v in values {
                write_i32(&mut buf, v).unwrap();
            }
        }
        Coverage::Rle(rle) => {
            write_u8(&mut buf, 1).unwrap();
            buf.extend(serialize_runs(rle.runs(), huffman));
        }
    }
    buf
}

/// Breakpoint boundaries over `[0, total_len)` at `section_len`
/// intervals: `(0, section_len), (section_len, 2*section_len), ...`,
/// the last segment truncated to `total_len`.
fn section_breakpoints(total_len: u64, section_len: u64) -> Vec<(u64, u64)> {
    if total_len == 0 {
        return Vec::new();
    }
    let step = section_len.max(1);
    let mut segments = Vec::new();
    let mut start = 0u64;
    while start < total_len {
        let end = (start + step).min(total_len);
        segments.push((start, end));
        start = end;
    }
    segments
}

fn serialize_exon_histogram<W: Write>(w: &mut W, hist: &ExonHistogram) -> io::Result<()> {
    write_u64(w, hist.exon_id as u64)?;
    write_u64(w, hist.max_read_len)?;
    w.write_all(&serialize_lens(&hist.unpaired_lens))?;
    w.write_all(&serialize_lens(&hist.paired_lens))?;
    w.write_all(&serialize_lens(&hist.lens_left))?;
    w.write_all(&serialize_lens(&hist.lens_right))?;
    Ok(())
}

fn exon_histogram_is_empty(hist: &ExonHistogram) -> bool {
    hist.max_read_len == 0
        && hist.unpaired_lens.is_empty()
        && hist.paired_lens.is_empty()
        && hist.lens_left.is_empty()
        && hist.lens_right.is_empty()
}

/// Writes junction chunks, unspliced coverage, and the chromosome/exon
/// tables into a two-pass binary archive at `out_path`.
pub struct ArchiveWriter<'a> {
    options: &'a CompressOptions,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(options: &'a CompressOptions) -> Self {
        Self { options }
    }

    pub fn write(
        &self,
        chroms: &ChromTable,
        exons: &ExonTable,
        junctions: &[Junction],
        unspliced: &UnsplicedResult,
        huffman: Option<&HuffmanTable>,
        out_path: &Path,
    ) -> Result<()> {
        let mut body = tempfile::tempfile()?;
        let junction_index;
        let mut unspliced_group_index: Vec<(&UnsplicedGroup, Vec<BlockIndexEntry>)> = Vec::new();
        let exon_hist_index;
        {
            let mut writer = BlockWriter::new(&mut body, self.options.compress_method);
            junction_index = chunked(junctions, self.options.junction_chunk_size)
                .map(|chunk| {
                    let mut raw = Vec::new();
                    for j in chunk {
                        raw.extend(serialize_junction(j, huffman));
                    }
                    writer.write_block(&raw, false)
                })
                .collect::<Result<Vec<_>>>()?;

            for group in &unspliced.groups {
                let segments = section_breakpoints(exons.total_len(), self.options.section_len);
                let mut entries = Vec::with_capacity(segments.len());
                for (start, end) in segments {
                    let segment = group.coverage.slice(start, end);
                    let is_zero = segment.is_uniform_zero();
                    let raw = serialize_coverage_segment(&segment, huffman);
                    entries.push(writer.write_block(&raw, is_zero)?);
                }
                unspliced_group_index.push((group, entries));
            }

            exon_hist_index = chunked(&unspliced.exon_histograms, self.options.exon_chunk_size)
                .map(|chunk| {
                    let mut raw = Vec::new();
                    for h in chunk {
                        serialize_exon_histogram(&mut raw, h).unwrap();
                    }
                    let is_zero = chunk.iter().all(exon_histogram_is_empty);
                    writer.write_block(&raw, is_zero)
                })
                .collect::<Result<Vec<_>>>()?;
        }

        let mut index_bytes = Vec::new();
        write_index_entries(&mut index_bytes, &junction_index)?;

        write_u32(&mut index_bytes, unspliced_group_index.len() as u32)?;
        for (group, entries) in &unspliced_group_index {
            write_u32(&mut index_bytes, group.nh)?;
            write_u64(&mut index_bytes, group.max_read_len)?;
            index_bytes.extend(serialize_lens(&group.unpaired_lens));
            index_bytes.extend(serialize_lens(&group.paired_lens));
            index_bytes.extend(serialize_lens(&group.lens_left));
            index_bytes.extend(serialize_lens(&group.lens_right));
            write_index_entries(&mut index_bytes, entries)?;
        }

        write_index_entries(&mut index_bytes, &exon_hist_index)?;

        let compressed_index = codec::compress(self.options.compress_method, &index_bytes)?;

        let mut out = std::fs::File::create(out_path)?;
        out.write_all(MAGIC)?;
        write_u8(&mut out, FORMAT_VERSION)?;
        let flags = (self.options.binary as u8) | ((self.options.huffman as u8) << 1);
        write_u8(&mut out, flags)?;
        write_u8(&mut out, self.options.compress_method as u8)?;
        write_chrom_table(&mut out, chroms)?;
        write_exon_table(&mut out, exons)?;
        write_u64(&mut out, compressed_index.len() as u64)?;
        out.write_all(&compressed_index)?;

        body.seek(SeekFrom::Start(0))?;
        io::copy(&mut body, &mut out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction::JunctionBuilder;
    use crate::read::{SplicedRead, Strand, UnsplicedRead};
    use crate::unspliced::UnsplicedBuilder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_produces_nonempty_file_with_magic() {
        let mut chroms = ChromTable::new();
        chroms.insert("chr1", 1000);
        let exons = ExonTable::from_boundaries(vec![0, 100, 200, 1000]);

        let mut jb = JunctionBuilder::new(&exons);
        jb.add_read(&SplicedRead {
            exon_ids: vec![0, 1],
            xs: Some(Strand::Plus),
            nh: 1,
            read_len: 200,
            start_offset: 0,
            end_offset: 0,
            len_left: 0,
            len_right: 0,
        })
        .unwrap();
        let junctions = jb.finalize();

        let ub = UnsplicedBuilder::new(&exons);
        let unspliced = ub.build(&[]).unwrap();

        let options = CompressOptions::default();
        let writer = ArchiveWriter::new(&options);
        let tmp = NamedTempFile::new().unwrap();
        writer
            .write(&chroms, &exons, &junctions, &unspliced, None, tmp.path())
            .unwrap();

        let mut contents = Vec::new();
        std::fs::File::open(tmp.path())
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert!(contents.len() > 4);
        assert_eq!(&contents[0..4], MAGIC);
    }

    #[test]
    fn test_scenario_s5_sparse_section_produces_sentinels() {
        // Genome length 300000, section_len small enough to carve it
        // into 3 sections, one read confined to the first section.
        let mut chroms = ChromTable::new();
        chroms.insert("chr1", 300_000);
        let exons = ExonTable::from_boundaries(vec![0, 300_000]);

        let ub = UnsplicedBuilder::new(&exons);
        let reads = vec![UnsplicedRead {
            start: 10,
            end: 20,
            nh: 1,
            read_len: 10,
            len_left: 0,
            len_right: 0,
        }];
        let unspliced = ub.build(&reads).unwrap();

        let options = CompressOptions::new().with_section_len(100_000);
        let exon_table_total = exons.total_len();
        let segments = section_breakpoints(exon_table_total, options.section_len);
        assert_eq!(segments.len(), 3);

        let group = &unspliced.groups[0];
        let seg0 = group.coverage.slice(segments[0].0, segments[0].1);
        let seg1 = group.coverage.slice(segments[1].0, segments[1].1);
        let seg2 = group.coverage.slice(segments[2].0, segments[2].1);
        assert!(!seg0.is_uniform_zero());
        assert!(seg1.is_uniform_zero());
        assert!(seg2.is_uniform_zero());

        let writer = ArchiveWriter::new(&options);
        let tmp = NamedTempFile::new().unwrap();
        writer
            .write(&chroms, &exons, &[], &unspliced, None, tmp.path())
            .unwrap();
        assert!(std::fs::metadata(tmp.path()).unwrap().len() > 0);
    }
}
