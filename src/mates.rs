//! Paired-end mate matching.
//!
//! Combines two individual SAM alignment records for the same template
//! into a single logical read with `len_left`/`len_right` sub-alignment
//! lengths, per §1's "external collaborator" contract. Reads are matched
//! by the position the other record's `RNEXT`/`PNEXT` fields point back
//! to; a record whose mate is never seen by end of input degrades to an
//! unpaired read rather than being dropped.

use crate::aggregator::RawRead;
use crate::sam::SamRecord;
use std::collections::HashMap;

struct Waiting {
    chrom: String,
    spans: Vec<(u64, u64)>,
    xs: Option<crate::read::Strand>,
    nh: u32,
    pos: u64,
    read_len: u64,
}

/// Accumulates individual SAM records and resolves them into combined
/// reads as mates are found.
#[derive(Default)]
pub struct MateTable {
    waiting: HashMap<(String, u64), Waiting>,
}

impl MateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one parsed SAM record, returning a finished `RawRead`
    /// immediately if it is unpaired or completes a pending pair.
    pub fn process(&mut self, rec: SamRecord) -> Option<RawRead> {
        match (rec.mate_chrom, rec.mate_pos) {
            (None, _) | (_, None) => Some(RawRead {
                chrom: rec.chrom,
                spans: rec.spans,
                xs: rec.xs,
                nh: rec.nh,
                read_len: rec.read_len,
                len_left: 0,
                len_right: 0,
            }),
            (Some(mate_chrom), Some(mate_pos)) => {
                if let Some(mate) = self.waiting.remove(&(mate_chrom.clone(), mate_pos)) {
                    Some(combine(rec.chrom, rec.pos, rec.spans, rec.xs, rec.nh, rec.read_len, mate))
                } else {
                    self.waiting.insert(
                        (rec.chrom.clone(), rec.pos),
                        Waiting {
                            chrom: rec.chrom,
                            spans: rec.spans,
                            xs: rec.xs,
                            nh: rec.nh,
                            pos: rec.pos,
                            read_len: rec.read_len,
                        },
                    );
                    None
                }
            }
        }
    }

    /// Drain any records whose mate never arrived, degrading them to
    /// unpaired reads.
    pub fn finish(mut self) -> Vec<RawRead> {
        let mut out = Vec::with_capacity(self.waiting.len());
        for (_, w) in self.waiting.drain() {
            log::debug!(
                "mate never found for read at {}:{}, treating as unpaired",
                w.chrom,
                w.pos
            );
            out.push(RawRead {
                chrom: w.chrom,
                spans: w.spans,
                xs: w.xs,
                nh: w.nh,
                read_len: w.read_len,
                len_left: 0,
                len_right: 0,
            });
        }
        out
    }
}

#[allow(clippy::too_many_arguments)]
fn combine(
    chrom: String,
    pos: u64,
    spans: Vec<(u64, u64)>,
    xs: Option<crate::read::Strand>,
    nh: u32,
    read_len: u64,
    mate: Waiting,
) -> RawRead {
    let (left_spans, left_len, right_spans, right_len, left_xs, left_nh, left_chrom) =
        if pos <= mate.pos {
            (spans, read_len, mate.spans, mate.read_len, xs.or(mate.xs), nh, chrom)
        } else {
            (mate.spans, mate.read_len, spans, read_len, mate.xs.or(xs), mate.nh, mate.chrom)
        };

    let mut combined = left_spans;
    combined.extend(right_spans);

    let template_start = combined.first().map(|s| s.0).unwrap_or(0);
    let template_end = combined.last().map(|s| s.1).unwrap_or(0);
    let template_len = template_end.saturating_sub(template_start);

    RawRead {
        chrom: left_chrom,
        spans: combined,
        xs: left_xs,
        nh: left_nh,
        read_len: template_len,
        len_left: left_len,
        len_right: right_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::Strand;

    fn rec(chrom: &str, pos: u64, spans: Vec<(u64, u64)>, mate_chrom: Option<&str>, mate_pos: Option<u64>) -> SamRecord {
        let read_len = spans.iter().map(|(s, e)| e - s).sum();
        SamRecord {
            chrom: chrom.to_string(),
            spans,
            xs: None,
            nh: 1,
            read_len,
            mate_chrom: mate_chrom.map(|s| s.to_string()),
            mate_pos,
            pos,
        }
    }

    #[test]
    fn test_unpaired_passthrough() {
        let mut table = MateTable::new();
        let r = rec("chr1", 101, vec![(100, 150)], None, None);
        let combined = table.process(r).unwrap();
        assert_eq!(combined.len_left, 0);
        assert_eq!(combined.len_right, 0);
        assert_eq!(combined.spans, vec![(100, 150)]);
    }

    #[test]
    fn test_paired_combines_into_one_read() {
        let mut table = MateTable::new();
        // Left mate at 201 (0-based 200), 20bp. Right mate at 236 (0-based 235), 25bp.
        let left = rec("chr1", 201, vec![(200, 220)], Some("chr1"), Some(236));
        let right = rec("chr1", 236, vec![(235, 260)], Some("chr1"), Some(201));

        assert!(table.process(left).is_none());
        let combined = table.process(right).unwrap();

        assert_eq!(combined.spans, vec![(200, 220), (235, 260)]);
        assert_eq!(combined.len_left, 20);
        assert_eq!(combined.len_right, 25);
        assert_eq!(combined.read_len, 60);
    }

    #[test]
    fn test_unmatched_mate_degrades_to_unpaired() {
        let mut table = MateTable::new();
        let r = rec("chr1", 101, vec![(100, 150)], Some("chr1"), Some(500));
        assert!(table.process(r).is_none());

        let leftover = table.finish();
        assert_eq!(leftover.len(), 1);
        assert_eq!(leftover[0].len_left, 0);
        assert_eq!(leftover[0].len_right, 0);
    }

    #[test]
    fn test_strand_preferred_from_whichever_mate_has_it() {
        let mut table = MateTable::new();
        let mut left = rec("chr1", 101, vec![(100, 120)], Some("chr1"), Some(200));
        left.xs = Some(Strand::Minus);
        let right = rec("chr1", 200, vec![(199, 220)], Some("chr1"), Some(101));

        assert!(table.process(left).is_none());
        let combined = table.process(right).unwrap();
        assert_eq!(combined.xs, Some(Strand::Minus));
    }
}
