//! Unspliced coverage: reads confined to a single exon, binned by
//! multiplicity (`NH`) alone. Each `NH` group carries one genome-wide
//! coverage vector (over `[0, exons[-1])`, dense when `NH == 1`, RLE
//! otherwise) plus an `exon_reads[exon_id]` list of the original read
//! indices landing in that exon, built by walking reads in reverse so
//! each list comes out in descending original-index order.
//!
//! Per-exon read-length histograms are accumulated independently of
//! `NH`, keyed only by exon, for the archive's exon-chunked histogram
//! table.

use crate::error::Result;
use crate::exon::ExonTable;
use crate::read::UnsplicedRead;
use crate::rle::Rle;
use std::collections::HashMap;

/// Coverage storage for one `NH` group. `NH == 1` collapses to a dense
/// vector once all updates are in, since it dominates total read volume
/// and a dense array avoids RLE's per-update bookkeeping cost there.
/// Every other `NH` keeps the RLE representation.
#[derive(Debug, Clone)]
pub enum Coverage {
    Dense(Vec<i32>),
    Rle(Rle),
}

impl Coverage {
    pub fn total_len(&self) -> u64 {
        match self {
            Coverage::Dense(v) => v.len() as u64,
            Coverage::Rle(r) => r.total_len(),
        }
    }

    /// Extract `[start, end)` as an independent, zero-based `Coverage`
    /// segment of the same representation.
    pub fn slice(&self, start: u64, end: u64) -> Coverage {
        match self {
            Coverage::Dense(v) => Coverage::Dense(v[start as usize..end as usize].to_vec()),
            Coverage::Rle(r) => Coverage::Rle(r.slice(start, end)),
        }
    }

    /// True if every value in this segment is 0.
    pub fn is_uniform_zero(&self) -> bool {
        match self {
            Coverage::Dense(v) => v.iter().all(|&x| x == 0),
            Coverage::Rle(r) => r.is_uniform_zero(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnsplicedGroup {
    pub nh: u32,
    /// Genome-wide coverage, `[0, exons[-1])`.
    pub coverage: Coverage,
    /// `exon_reads[exon_id]`: original read indices (descending order)
    /// landing in that exon for this `NH`.
    pub exon_reads: Vec<Vec<usize>>,
    pub unpaired_lens: HashMap<u64, u64>,
    pub paired_lens: HashMap<u64, u64>,
    pub lens_left: HashMap<u64, u64>,
    pub lens_right: HashMap<u64, u64>,
    pub max_read_len: u64,
}

/// Per-exon read-length histogram, independent of `NH`.
#[derive(Debug, Clone)]
pub struct ExonHistogram {
    pub exon_id: usize,
    pub unpaired_lens: HashMap<u64, u64>,
    pub paired_lens: HashMap<u64, u64>,
    pub lens_left: HashMap<u64, u64>,
    pub lens_right: HashMap<u64, u64>,
    pub max_read_len: u64,
}

pub struct UnsplicedResult {
    pub groups: Vec<UnsplicedGroup>,
    /// One entry per exon, in exon-id order.
    pub exon_histograms: Vec<ExonHistogram>,
}

struct Accum {
    coverage: Rle,
    exon_reads: Vec<Vec<usize>>,
    unpaired_lens: HashMap<u64, u64>,
    paired_lens: HashMap<u64, u64>,
    lens_left: HashMap<u64, u64>,
    lens_right: HashMap<u64, u64>,
    max_read_len: u64,
}

pub struct UnsplicedBuilder<'a> {
    exons: &'a ExonTable,
}

impl<'a> UnsplicedBuilder<'a> {
    pub fn new(exons: &'a ExonTable) -> Self {
        Self { exons }
    }

    pub fn build(&self, reads: &[UnsplicedRead]) -> Result<UnsplicedResult> {
        let total_len = self.exons.total_len();
        let num_exons = self.exons.num_exons();

        let mut groups: HashMap<u32, Accum> = HashMap::new();
        let mut order: Vec<u32> = Vec::new();
        let mut exon_hist: HashMap<usize, ExonHistogram> = HashMap::new();

        for (idx, read) in reads.iter().enumerate().rev() {
            let exon_id = self.exons.exon_containing(read.start);
            let read_len = read.end - read.start;

            let accum = groups.entry(read.nh).or_insert_with(|| {
                order.push(read.nh);
                Accum {
                    coverage: Rle::uniform(0, total_len),
                    exon_reads: vec![Vec::new(); num_exons],
                    unpaired_lens: HashMap::new(),
                    paired_lens: HashMap::new(),
                    lens_left: HashMap::new(),
                    lens_right: HashMap::new(),
                    max_read_len: 0,
                }
            });
            accum.exon_reads[exon_id].push(idx);

            let hist = exon_hist.entry(exon_id).or_insert_with(|| ExonHistogram {
                exon_id,
                unpaired_lens: HashMap::new(),
                paired_lens: HashMap::new(),
                lens_left: HashMap::new(),
                lens_right: HashMap::new(),
                max_read_len: 0,
            });

            if read.is_paired() {
                accum.coverage.update(read.start, read.len_left, 1)?;
                let right_start = read.end - read.len_right;
                accum.coverage.update(right_start, read.len_right, 1)?;
                *accum.paired_lens.entry(read_len).or_insert(0) += 1;
                *accum.lens_left.entry(read.len_left).or_insert(0) += 1;
                *accum.lens_right.entry(read.len_right).or_insert(0) += 1;
                *hist.paired_lens.entry(read_len).or_insert(0) += 1;
                *hist.lens_left.entry(read.len_left).or_insert(0) += 1;
                *hist.lens_right.entry(read.len_right).or_insert(0) += 1;
            } else {
                accum.coverage.update(read.start, read_len, 1)?;
                *accum.unpaired_lens.entry(read_len).or_insert(0) += 1;
                *hist.unpaired_lens.entry(read_len).or_insert(0) += 1;
            }
            accum.max_read_len = accum.max_read_len.max(read_len);
            hist.max_read_len = hist.max_read_len.max(read_len);
        }

        order.sort_unstable();
        let mut groups_out = Vec::with_capacity(order.len());
        for nh in order {
            let accum = groups.remove(&nh).unwrap();
            let coverage = if nh == 1 {
                Coverage::Dense(accum.coverage.expand())
            } else {
                Coverage::Rle(accum.coverage)
            };
            groups_out.push(UnsplicedGroup {
                nh,
                coverage,
                exon_reads: accum.exon_reads,
                unpaired_lens: accum.unpaired_lens,
                paired_lens: accum.paired_lens,
                lens_left: accum.lens_left,
                lens_right: accum.lens_right,
                max_read_len: accum.max_read_len,
            });
        }

        let mut exon_histograms = Vec::with_capacity(num_exons);
        for exon_id in 0..num_exons {
            exon_histograms.push(exon_hist.remove(&exon_id).unwrap_or(ExonHistogram {
                exon_id,
                unpaired_lens: HashMap::new(),
                paired_lens: HashMap::new(),
                lens_left: HashMap::new(),
                lens_right: HashMap::new(),
                max_read_len: 0,
            }));
        }

        Ok(UnsplicedResult {
            groups: groups_out,
            exon_histograms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exons() -> ExonTable {
        ExonTable::from_boundaries(vec![0, 100, 200])
    }

    fn read(start: u64, end: u64, nh: u32) -> UnsplicedRead {
        UnsplicedRead {
            start,
            end,
            nh,
            read_len: end - start,
            len_left: 0,
            len_right: 0,
        }
    }

    #[test]
    fn test_groups_by_nh_only() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1), read(120, 130, 1), read(15, 25, 2)];
        let result = builder.build(&reads).unwrap();
        assert_eq!(result.groups.len(), 2);
    }

    #[test]
    fn test_coverage_spans_full_genome() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1)];
        let result = builder.build(&reads).unwrap();
        assert_eq!(result.groups[0].coverage.total_len(), 200);
    }

    #[test]
    fn test_nh1_collapses_to_dense() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1)];
        let result = builder.build(&reads).unwrap();
        assert!(matches!(result.groups[0].coverage, Coverage::Dense(_)));
    }

    #[test]
    fn test_nh_other_keeps_rle() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 3)];
        let result = builder.build(&reads).unwrap();
        assert!(matches!(result.groups[0].coverage, Coverage::Rle(_)));
    }

    #[test]
    fn test_exon_reads_descending_within_exon() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1), read(12, 22, 1), read(14, 24, 1)];
        let result = builder.build(&reads).unwrap();
        assert_eq!(result.groups[0].exon_reads[0], vec![2, 1, 0]);
    }

    #[test]
    fn test_paired_leaves_gap() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let mut r = read(10, 70, 1);
        r.len_left = 20;
        r.len_right = 20;
        let result = builder.build(&[r]).unwrap();
        let dense = match &result.groups[0].coverage {
            Coverage::Dense(v) => v.clone(),
            _ => unreachable!(),
        };
        assert_eq!(dense[10..30].iter().sum::<i32>(), 20);
        assert_eq!(dense[30..40].iter().sum::<i32>(), 0);
        assert_eq!(dense[40..60].iter().sum::<i32>(), 20);
    }

    #[test]
    fn test_exon_histograms_cover_every_exon() {
        let exons = exons();
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1)];
        let result = builder.build(&reads).unwrap();
        assert_eq!(result.exon_histograms.len(), exons.num_exons());
        assert_eq!(result.exon_histograms[0].unpaired_lens.get(&10), Some(&1));
        assert!(result.exon_histograms[1].unpaired_lens.is_empty());
    }

    #[test]
    fn test_scenario_s5_sparse_genome_index() {
        // Genome length 300000, one read in [10, 20). A 3-section index
        // (sectionLen on the order of 100000) should see only the first
        // segment carry coverage; the rest are zero.
        let exons = ExonTable::from_boundaries(vec![0, 300_000]);
        let builder = UnsplicedBuilder::new(&exons);
        let reads = vec![read(10, 20, 1)];
        let result = builder.build(&reads).unwrap();
        let dense = match &result.groups[0].coverage {
            Coverage::Dense(v) => v.clone(),
            _ => unreachable!(),
        };
        assert_eq!(dense.len(), 300_000);
        assert_eq!(dense[100_000..200_000].iter().sum::<i32>(), 0);
        assert_eq!(dense[200_000..300_000].iter().sum::<i32>(), 0);
    }
}
