//! Junction records: one per distinct `(exon_ids, strand, NH)` triple,
//! carrying a coverage run-length vector local to the concatenated span
//! of its exons plus read-length histograms.

use crate::error::Result;
use crate::exon::ExonTable;
use crate::read::{SplicedRead, Strand};
use crate::rle::Rle;
use std::collections::HashMap;

/// Key identifying a junction: the ordered exon ids it spans, its
/// resolved strand, and its multiplicity.
pub type JunctionKey = (Vec<usize>, Strand, u32);

#[derive(Debug, Clone)]
pub struct Junction {
    pub exon_ids: Vec<usize>,
    pub strand: Strand,
    pub nh: u32,
    pub coverage: Rle,
    pub unpaired_lens: HashMap<u64, u64>,
    pub paired_lens: HashMap<u64, u64>,
    pub lens_left: HashMap<u64, u64>,
    pub lens_right: HashMap<u64, u64>,
    pub max_read_len: u64,
}

impl Junction {
    fn new(exon_ids: Vec<usize>, strand: Strand, nh: u32, local_len: u64) -> Self {
        Self {
            exon_ids,
            strand,
            nh,
            coverage: Rle::uniform(0, local_len),
            unpaired_lens: HashMap::new(),
            paired_lens: HashMap::new(),
            lens_left: HashMap::new(),
            lens_right: HashMap::new(),
            max_read_len: 0,
        }
    }
}

/// Builds the junction set from a stream of spliced reads, resolving
/// strand and accumulating coverage and length histograms as it goes.
pub struct JunctionBuilder<'a> {
    exons: &'a ExonTable,
    junctions: Vec<Junction>,
    index: HashMap<JunctionKey, usize>,
}

impl<'a> JunctionBuilder<'a> {
    pub fn new(exons: &'a ExonTable) -> Self {
        Self {
            exons,
            junctions: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn local_len(&self, exon_ids: &[usize]) -> u64 {
        exon_ids.iter().map(|&e| self.exons.span_of(e)).sum()
    }

    /// Resolve the strand for a read with no `XS` tag: prefer whatever
    /// strand this exact exon_ids/NH combination has already committed
    /// to, trying '+' before '-', and defaulting to '+' if neither
    /// exists yet.
    fn resolve_strand(&self, exon_ids: &[usize], nh: u32) -> Strand {
        let plus_key = (exon_ids.to_vec(), Strand::Plus, nh);
        if self.index.contains_key(&plus_key) {
            return Strand::Plus;
        }
        let minus_key = (exon_ids.to_vec(), Strand::Minus, nh);
        if self.index.contains_key(&minus_key) {
            return Strand::Minus;
        }
        Strand::Plus
    }

    fn junction_for(&mut self, exon_ids: &[usize], strand: Strand, nh: u32) -> usize {
        let key = (exon_ids.to_vec(), strand, nh);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let local_len = self.local_len(exon_ids);
        let junction = Junction::new(exon_ids.to_vec(), strand, nh, local_len);
        let idx = self.junctions.len();
        self.junctions.push(junction);
        self.index.insert(key, idx);
        idx
    }

    pub fn add_read(&mut self, read: &SplicedRead) -> Result<()> {
        let strand = match read.xs {
            Some(s) => s,
            None => self.resolve_strand(&read.exon_ids, read.nh),
        };
        let idx = self.junction_for(&read.exon_ids, strand, read.nh);
        let local_len = self.local_len(&read.exon_ids);
        let junction = &mut self.junctions[idx];

        let local_start = read.start_offset;
        let local_end = local_len - read.end_offset;

        if read.is_paired() {
            let right_start = local_end - read.len_right;
            junction.coverage.update(local_start, read.len_left, 1)?;
            junction.coverage.update(right_start, read.len_right, 1)?;
            *junction.paired_lens.entry(read.read_len).or_insert(0) += 1;
            *junction.lens_left.entry(read.len_left).or_insert(0) += 1;
            *junction.lens_right.entry(read.len_right).or_insert(0) += 1;
        } else {
            junction.coverage.update(local_start, local_end - local_start, 1)?;
            *junction.unpaired_lens.entry(read.read_len).or_insert(0) += 1;
        }
        junction.max_read_len = junction.max_read_len.max(read.read_len);

        Ok(())
    }

    /// Finish the build, returning junctions ordered by exon-id tuple
    /// (lexicographic), ties broken by first-seen order.
    pub fn finalize(mut self) -> Vec<Junction> {
        self.junctions.sort_by(|a, b| a.exon_ids.cmp(&b.exon_ids));
        self.junctions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exon::ExonTable;

    fn exons() -> ExonTable {
        ExonTable::from_boundaries(vec![0, 100, 200, 300])
    }

    fn spliced(exon_ids: Vec<usize>, xs: Option<Strand>, nh: u32, read_len: u64) -> SplicedRead {
        SplicedRead {
            exon_ids,
            xs,
            nh,
            read_len,
            start_offset: 0,
            end_offset: 0,
            len_left: 0,
            len_right: 0,
        }
    }

    #[test]
    fn test_unpaired_coverage_sum() {
        let exons = exons();
        let mut builder = JunctionBuilder::new(&exons);
        let r = spliced(vec![0, 1], Some(Strand::Plus), 1, 200);
        builder.add_read(&r).unwrap();
        let junctions = builder.finalize();
        assert_eq!(junctions.len(), 1);
        let cov = junctions[0].coverage.expand();
        assert_eq!(cov.iter().sum::<i32>(), 200);
    }

    #[test]
    fn test_strand_first_come_wins() {
        let exons = exons();
        let mut builder = JunctionBuilder::new(&exons);
        // First read with no xs defaults to '+'.
        builder.add_read(&spliced(vec![0, 1], None, 1, 200)).unwrap();
        // Second read, same exon_ids/NH, no xs: must resolve to '+' too
        // since that key already exists.
        builder.add_read(&spliced(vec![0, 1], None, 1, 200)).unwrap();
        let junctions = builder.finalize();
        assert_eq!(junctions.len(), 1);
        assert_eq!(junctions[0].strand, Strand::Plus);
    }

    #[test]
    fn test_explicit_strand_creates_distinct_junction() {
        let exons = exons();
        let mut builder = JunctionBuilder::new(&exons);
        builder.add_read(&spliced(vec![0, 1], Some(Strand::Minus), 1, 200)).unwrap();
        builder.add_read(&spliced(vec![0, 1], None, 1, 200)).unwrap();
        let junctions = builder.finalize();
        // No existing '+' junction, but a '-' one exists, so the
        // unlabeled read resolves to '-' and joins it.
        assert_eq!(junctions.len(), 1);
        assert_eq!(junctions[0].strand, Strand::Minus);
    }

    #[test]
    fn test_paired_leaves_gap_uncovered() {
        let exons = exons();
        let mut builder = JunctionBuilder::new(&exons);
        let mut r = spliced(vec![0, 1], Some(Strand::Plus), 1, 200);
        r.len_left = 30;
        r.len_right = 30;
        builder.add_read(&r).unwrap();
        let junctions = builder.finalize();
        let cov = junctions[0].coverage.expand();
        assert_eq!(cov[..30].iter().sum::<i32>(), 30);
        assert_eq!(cov[30..170].iter().sum::<i32>(), 0);
        assert_eq!(cov[170..].iter().sum::<i32>(), 30);
    }

    #[test]
    fn test_ordering_by_exon_ids() {
        let exons = exons();
        let mut builder = JunctionBuilder::new(&exons);
        builder.add_read(&spliced(vec![1, 2], Some(Strand::Plus), 1, 100)).unwrap();
        builder.add_read(&spliced(vec![0, 1], Some(Strand::Plus), 1, 200)).unwrap();
        let junctions = builder.finalize();
        assert_eq!(junctions[0].exon_ids, vec![0, 1]);
        assert_eq!(junctions[1].exon_ids, vec![1, 2]);
    }
}
