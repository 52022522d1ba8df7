//! Top-level compressor: SAM in, archive out. Single-threaded and
//! blocking end to end — the only I/O boundaries are the input file and
//! the scratch/output files `archive::ArchiveWriter` manages.

use crate::aggregator::Aggregator;
use crate::config::CompressOptions;
use crate::error::{Result, ScramError};
use crate::huffman::{self, HuffmanTable};
use crate::mates::MateTable;
use crate::rle::Run;
use crate::sam::SamReader;
use crate::unspliced::{Coverage, UnsplicedBuilder};
use crate::{archive, junction::JunctionBuilder, text};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Compress a SAM file into a scram archive at `out_path` using `options`.
pub fn compress(sam_path: &Path, out_path: &Path, options: &CompressOptions) -> Result<()> {
    log::info!("reading {}", sam_path.display());
    let file = File::open(sam_path)?;
    let mut reader = SamReader::new(file);
    let header = reader.read_header()?;
    let chroms = crate::sam::parse_header(&header);
    log::debug!("{} chromosomes in header", chroms.len());

    let mut mates = MateTable::new();
    let mut aggregator = Aggregator::new(chroms.clone());
    let mut line_no = 0usize;
    let mut skipped = 0usize;

    for line in reader.lines() {
        line_no += 1;
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match crate::sam::parse_line(&line, &chroms) {
            Ok(rec) => {
                if let Some(raw) = mates.process(rec) {
                    aggregator.add_read(raw);
                }
            }
            Err(message) => {
                log::warn!("skipping malformed line {}: {}", line_no, message);
                skipped += 1;
            }
        }
    }
    for raw in mates.finish() {
        aggregator.add_read(raw);
    }
    if skipped > 0 {
        log::warn!("skipped {} malformed line(s) of {}", skipped, line_no);
    }

    let aggregated = aggregator.finalize();
    log::info!(
        "{} exons, {} spliced reads, {} unspliced reads",
        aggregated.exons.num_exons(),
        aggregated.spliced.len(),
        aggregated.unspliced.len()
    );

    let mut junction_builder = JunctionBuilder::new(&aggregated.exons);
    for read in &aggregated.spliced {
        junction_builder.add_read(read)?;
    }
    let junctions = junction_builder.finalize();

    let unspliced_builder = UnsplicedBuilder::new(&aggregated.exons);
    let unspliced = unspliced_builder.build(&aggregated.unspliced)?;

    let huffman_table = if options.huffman {
        Some(build_huffman_table(&junctions, &unspliced))
    } else {
        None
    };

    if options.binary {
        let writer = archive::ArchiveWriter::new(options);
        writer.write(
            &aggregated.chroms,
            &aggregated.exons,
            &junctions,
            &unspliced,
            huffman_table.as_ref(),
            out_path,
        )?;
    } else {
        let out = File::create(out_path)?;
        let mut buffered = BufWriter::new(out);
        text::write_archive(&mut buffered, &aggregated.chroms, &aggregated.exons, &junctions, &unspliced)
            .map_err(ScramError::Io)?;
    }

    log::info!("wrote {}", out_path.display());
    Ok(())
}

fn build_huffman_table(
    junctions: &[crate::junction::Junction],
    unspliced: &crate::unspliced::UnsplicedResult,
) -> HuffmanTable {
    let mut freqs: HashMap<i32, u64> = HashMap::new();
    let mut count = |runs: &[Run]| {
        let values: Vec<i32> = runs.iter().map(|r| r.value).collect();
        for d in huffman::difference_encode(&values) {
            *freqs.entry(d).or_insert(0) += 1;
        }
    };
    for j in junctions {
        count(j.coverage.runs());
    }
    for g in &unspliced.groups {
        if let Coverage::Rle(rle) = &g.coverage {
            count(rle.runs());
        }
    }
    HuffmanTable::build(&freqs)
}
