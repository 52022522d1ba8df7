//! Aggregator: turns resolved per-chromosome reads into the exon
//! boundary vector plus spliced/unspliced read lists the junction and
//! unspliced builders consume.
//!
//! Exon inference follows the GLOSSARY definition directly: an exon is a
//! maximal genomic interval contiguously covered by at least one aligned
//! read. Boundaries are therefore the union-merge of every read's
//! exonic spans (global, concatenated-genome coordinates), plus each
//! chromosome's own start so no exon straddles a chromosome boundary.

use crate::chrom::ChromTable;
use crate::exon::ExonTable;
use crate::read::{SplicedRead, Strand, UnsplicedRead};
use std::collections::HashMap;

/// A read with chromosome-relative spans and resolved mate lengths, not
/// yet placed on the concatenated-genome exon axis.
#[derive(Debug, Clone)]
pub struct RawRead {
    pub chrom: String,
    pub spans: Vec<(u64, u64)>,
    pub xs: Option<Strand>,
    pub nh: u32,
    pub read_len: u64,
    pub len_left: u64,
    pub len_right: u64,
}

/// Immutable result of `Aggregator::finalize`.
pub struct Aggregated {
    pub chroms: ChromTable,
    pub exons: ExonTable,
    pub spliced: Vec<SplicedRead>,
    pub unspliced: Vec<UnsplicedRead>,
}

/// Collects reads and builds the exon axis once all input has been seen.
#[derive(Default)]
pub struct Aggregator {
    chroms: ChromTable,
    reads: Vec<RawRead>,
}

impl Aggregator {
    pub fn new(chroms: ChromTable) -> Self {
        Self {
            chroms,
            reads: Vec::new(),
        }
    }

    pub fn add_read(&mut self, read: RawRead) {
        self.reads.push(read);
    }

    fn chrom_offsets(&self) -> HashMap<String, u64> {
        let mut offsets = HashMap::new();
        let mut cursor = 0u64;
        for name in self.chroms.names() {
            offsets.insert(name.to_string(), cursor);
            cursor += self.chroms.len_of(name).unwrap_or(0);
        }
        offsets
    }

    fn total_len(&self) -> u64 {
        self.chroms.names().map(|n| self.chroms.len_of(n).unwrap_or(0)).sum()
    }

    pub fn finalize(self) -> Aggregated {
        let offsets = self.chrom_offsets();
        let total_len = self.total_len();

        let global_spans: Vec<Vec<(u64, u64)>> = self
            .reads
            .iter()
            .map(|r| {
                let offset = offsets.get(&r.chrom).copied().unwrap_or(0);
                r.spans.iter().map(|(s, e)| (s + offset, e + offset)).collect()
            })
            .collect();

        let mut all_spans: Vec<(u64, u64)> = global_spans.iter().flatten().copied().collect();
        all_spans.sort_unstable();
        let merged = merge_intervals(&all_spans);

        let mut boundaries = Vec::with_capacity(merged.len() * 2 + offsets.len() + 2);
        boundaries.push(0);
        boundaries.push(total_len);
        for off in offsets.values() {
            boundaries.push(*off);
        }
        for (s, e) in &merged {
            boundaries.push(*s);
            boundaries.push(*e);
        }
        let exons = ExonTable::from_boundaries(boundaries);

        let mut spliced = Vec::new();
        let mut unspliced = Vec::new();

        for (raw, spans) in self.reads.iter().zip(global_spans.into_iter()) {
            if spans.len() == 1 {
                let (start, end) = spans[0];
                unspliced.push(UnsplicedRead {
                    start,
                    end,
                    nh: raw.nh,
                    read_len: raw.read_len,
                    len_left: raw.len_left,
                    len_right: raw.len_right,
                });
            } else {
                let exon_ids: Vec<usize> = spans
                    .iter()
                    .map(|(s, _)| exons.exon_containing(*s))
                    .collect();
                let first = exon_ids[0];
                let last = *exon_ids.last().unwrap();
                let start_offset = spans[0].0 - exons.start_of(first);
                let end_offset = exons.end_of(last) - spans.last().unwrap().1;
                spliced.push(SplicedRead {
                    exon_ids,
                    xs: raw.xs,
                    nh: raw.nh,
                    read_len: raw.read_len,
                    start_offset,
                    end_offset,
                    len_left: raw.len_left,
                    len_right: raw.len_right,
                });
            }
        }

        Aggregated {
            chroms: self.chroms,
            exons,
            spliced,
            unspliced,
        }
    }
}

/// Merge overlapping or touching sorted intervals.
fn merge_intervals(sorted: &[(u64, u64)]) -> Vec<(u64, u64)> {
    let mut out: Vec<(u64, u64)> = Vec::new();
    for &(s, e) in sorted {
        if let Some(last) = out.last_mut() {
            if s <= last.1 {
                last.1 = last.1.max(e);
                continue;
            }
        }
        out.push((s, e));
    }
    out
}
