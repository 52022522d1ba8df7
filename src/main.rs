#![allow(clippy::too_many_arguments)]

//! scram: exon-partitioned RLE coverage compressor for aligned SAM reads.
//!
//! Usage: scram <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

use scram_core::config::{CompressMethod, CompressOptions};
use scram_core::error::ScramError;

#[derive(Parser)]
#[command(name = "scram")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "Exon-partitioned RLE coverage compressor for aligned SAM reads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CompressMethodArg {
    Deflate,
    Lzma,
    Bzip2,
}

impl std::fmt::Display for CompressMethodArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.to_possible_value().unwrap();
        write!(f, "{}", s.get_name())
    }
}

impl From<CompressMethodArg> for CompressMethod {
    fn from(value: CompressMethodArg) -> Self {
        match value {
            CompressMethodArg::Deflate => CompressMethod::Deflate,
            CompressMethodArg::Lzma => CompressMethod::Lzma,
            CompressMethodArg::Bzip2 => CompressMethod::Bzip2,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a SAM file into a scram archive
    Compress {
        /// Input SAM file
        #[arg(short, long)]
        input: PathBuf,

        /// Output archive path
        #[arg(short, long)]
        output: PathBuf,

        /// Emit the legacy line-oriented text format instead of the
        /// binary archive
        #[arg(long)]
        text: bool,

        /// Huffman-code the coverage difference streams (binary only)
        #[arg(long)]
        huffman: bool,

        /// Block codec for compressed chunks
        #[arg(long, value_enum, default_value_t = CompressMethodArg::Deflate)]
        compress_method: CompressMethodArg,

        /// Breakpoint interval for unspliced coverage chunking
        #[arg(long, default_value_t = 100_000)]
        section_len: u64,

        /// Exons per compressed per-exon-histogram chunk
        #[arg(long, default_value_t = 100)]
        exon_chunk_size: usize,

        /// Junctions per compressed junction chunk
        #[arg(long, default_value_t = 50)]
        junction_chunk_size: usize,
    },

    /// Print summary statistics about a SAM file without writing an archive
    Stat {
        /// Input SAM file
        #[arg(short, long)]
        input: PathBuf,

        /// Report per-chromosome breakdowns (computed in parallel via rayon)
        #[arg(long)]
        per_chrom: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            text,
            huffman,
            compress_method,
            section_len,
            exon_chunk_size,
            junction_chunk_size,
        } => run_compress(
            input,
            output,
            text,
            huffman,
            compress_method,
            section_len,
            exon_chunk_size,
            junction_chunk_size,
        ),
        Commands::Stat { input, per_chrom } => run_stat(input, per_chrom),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_compress(
    input: PathBuf,
    output: PathBuf,
    text: bool,
    huffman: bool,
    compress_method: CompressMethodArg,
    section_len: u64,
    exon_chunk_size: usize,
    junction_chunk_size: usize,
) -> Result<(), ScramError> {
    let options = CompressOptions::new()
        .with_binary(!text)
        .with_huffman(huffman)
        .with_compress_method(compress_method.into())
        .with_section_len(section_len)
        .with_exon_chunk_size(exon_chunk_size)
        .with_junction_chunk_size(junction_chunk_size);

    scram_core::compress(&input, &output, &options)
}

fn run_stat(input: PathBuf, per_chrom: bool) -> Result<(), ScramError> {
    use rayon::prelude::*;
    use scram_core::sam::{parse_header, parse_line, SamReader};
    use std::collections::HashMap;
    use std::fs::File;

    let file = File::open(&input)?;
    let mut reader = SamReader::new(file);
    let header = reader.read_header()?;
    let chroms = parse_header(&header);

    let mut per_chrom_lines: HashMap<String, Vec<String>> = HashMap::new();
    let mut total = 0u64;
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        total += 1;
        if per_chrom {
            if let Some(chrom) = line.split('\t').nth(2) {
                per_chrom_lines.entry(chrom.to_string()).or_default().push(line);
            }
        }
    }

    println!("alignment lines: {}", total);
    println!("chromosomes: {}", chroms.len());

    if per_chrom {
        let mut names: Vec<&String> = per_chrom_lines.keys().collect();
        names.sort();
        let counts: Vec<(String, usize)> = names
            .par_iter()
            .map(|name| {
                let lines = &per_chrom_lines[*name];
                let valid = lines
                    .iter()
                    .filter(|line| parse_line(line, &chroms).is_ok())
                    .count();
                ((*name).clone(), valid)
            })
            .collect();
        for (name, valid) in counts {
            println!("  {}\t{} valid alignments", name, valid);
        }
    }

    Ok(())
}
