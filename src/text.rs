//! Legacy text archive format (`CompressOptions { binary: false, .. }`).
//!
//! A human-readable, line-oriented rendering of the same junction and
//! unspliced coverage data the binary archive carries, kept for
//! compatibility with tooling that expects a greppable dump rather than
//! a random-access binary. Huffman coding and block chunking do not
//! apply to this path.

use crate::chrom::ChromTable;
use crate::exon::ExonTable;
use crate::junction::Junction;
use crate::unspliced::{Coverage, UnsplicedResult};
use std::io::{self, Write};

fn write_lens<W: Write>(w: &mut W, label: &str, lens: &std::collections::HashMap<u64, u64>) -> io::Result<()> {
    if lens.is_empty() {
        return Ok(());
    }
    let mut entries: Vec<(&u64, &u64)> = lens.iter().collect();
    entries.sort_by_key(|(k, _)| **k);
    let mut buf = itoa::Buffer::new();
    write!(w, "{}", label)?;
    for (len, count) in entries {
        w.write_all(b"\t")?;
        w.write_all(buf.format(*len).as_bytes())?;
        w.write_all(b":")?;
        w.write_all(buf.format(*count).as_bytes())?;
    }
    writeln!(w)
}

pub fn write_archive<W: Write>(
    w: &mut W,
    chroms: &ChromTable,
    exons: &ExonTable,
    junctions: &[Junction],
    unspliced: &UnsplicedResult,
) -> io::Result<()> {
    writeln!(w, "#scram-text-v1")?;
    writeln!(w, "#chroms")?;
    for name in chroms.names() {
        writeln!(w, "{}\t{}", name, chroms.len_of(name).unwrap_or(0))?;
    }
    writeln!(w, "#exons\t{}", exons.num_exons())?;
    for b in exons.boundaries() {
        write!(w, "{} ", b)?;
    }
    writeln!(w)?;

    writeln!(w, "#junctions\t{}", junctions.len())?;
    for j in junctions {
        let ids: Vec<String> = j.exon_ids.iter().map(|i| i.to_string()).collect();
        write!(w, "J\t{}\t{}\t{}\t{}", ids.join(","), j.strand.as_char(), j.nh, j.max_read_len)?;
        let runs: Vec<String> = j.coverage.runs().iter().map(|r| format!("{}x{}", r.value, r.length)).collect();
        writeln!(w, "\t{}", runs.join(","))?;
        write_lens(w, "UL", &j.unpaired_lens)?;
        write_lens(w, "PL", &j.paired_lens)?;
        write_lens(w, "LL", &j.lens_left)?;
        write_lens(w, "LR", &j.lens_right)?;
    }

    writeln!(w, "#unspliced\t{}", unspliced.groups.len())?;
    for g in &unspliced.groups {
        write!(w, "U\t{}\t{}", g.nh, g.max_read_len)?;
        match &g.coverage {
            Coverage::Dense(values) => {
                let s: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                writeln!(w, "\tdense:{}", s.join(","))?;
            }
            Coverage::Rle(rle) => {
                let runs: Vec<String> = rle.runs().iter().map(|r| format!("{}x{}", r.value, r.length)).collect();
                writeln!(w, "\trle:{}", runs.join(","))?;
            }
        }
        let counts: Vec<String> = g
            .exon_reads
            .iter()
            .enumerate()
            .filter(|(_, reads)| !reads.is_empty())
            .map(|(exon_id, reads)| format!("{}:{}", exon_id, reads.len()))
            .collect();
        writeln!(w, "ER\t{}", counts.join(","))?;
        write_lens(w, "UL", &g.unpaired_lens)?;
        write_lens(w, "PL", &g.paired_lens)?;
        write_lens(w, "LL", &g.lens_left)?;
        write_lens(w, "LR", &g.lens_right)?;
    }

    writeln!(w, "#exon_hist\t{}", unspliced.exon_histograms.len())?;
    for h in &unspliced.exon_histograms {
        write!(w, "H\t{}\t{}", h.exon_id, h.max_read_len)?;
        writeln!(w)?;
        write_lens(w, "UL", &h.unpaired_lens)?;
        write_lens(w, "PL", &h.paired_lens)?;
        write_lens(w, "LL", &h.lens_left)?;
        write_lens(w, "LR", &h.lens_right)?;
    }
    Ok(())
}
