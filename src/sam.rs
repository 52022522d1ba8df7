//! Streaming SAM parser.
//!
//! Only the fields the compressor needs are extracted: reference name,
//! leftmost position, CIGAR, mate reference/position, and the `XS`/`NH`
//! optional tags. Per §7, a malformed line is logged and skipped rather
//! than aborting the whole run.

use crate::chrom::ChromTable;
use crate::cigar;
use crate::read::Strand;
use memchr::memchr;
use std::io::{BufRead, BufReader, Read};

/// Split a line on tabs without allocating a copy of each field, using
/// `memchr` for the scan the way the rest of this codebase's
/// tab-delimited parsers do.
fn split_tabs(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0usize;
    while let Some(rel) = memchr(b'\t', &bytes[start..]) {
        fields.push(&line[start..start + rel]);
        start += rel + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// One parsed alignment line, fields resolved but mate not yet matched.
#[derive(Debug, Clone)]
pub struct SamRecord {
    pub chrom: String,
    pub spans: Vec<(u64, u64)>,
    pub xs: Option<Strand>,
    pub nh: u32,
    pub read_len: u64,
    /// Mate reference name ("=" resolved to `chrom`), or `None` if unpaired.
    pub mate_chrom: Option<String>,
    /// 1-based mate leftmost position.
    pub mate_pos: Option<u64>,
    /// This alignment's own 1-based leftmost position (used as the mate
    /// matching key).
    pub pos: u64,
}

/// Parse `@SQ` header lines into a chromosome table.
///
/// Lines are expected in the form `@SQ\tSN:<name>\tLN:<length>`; any other
/// header line is ignored.
pub fn parse_header(header: &str) -> ChromTable {
    let mut chroms = ChromTable::new();
    for line in header.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.first() != Some(&"@SQ") {
            continue;
        }
        let mut name = None;
        let mut length = None;
        for field in &fields[1..] {
            if let Some(rest) = field.strip_prefix("SN:") {
                name = Some(rest.to_string());
            } else if let Some(rest) = field.strip_prefix("LN:") {
                length = rest.parse::<u64>().ok();
            }
        }
        if let (Some(name), Some(length)) = (name, length) {
            chroms.insert(name, length);
        }
    }
    chroms
}

/// Parse one non-header SAM line.
///
/// Returns `Err(message)` for any `MalformedInput` condition: too few
/// fields, an unrecognized chromosome, an unparseable `NH`, or a CIGAR
/// the parser rejects.
pub fn parse_line(line: &str, chroms: &ChromTable) -> Result<SamRecord, String> {
    let fields = split_tabs(line);
    if fields.len() < 11 {
        return Err(format!("expected at least 11 fields, got {}", fields.len()));
    }

    let chrom = fields[2].to_string();
    if !chroms.contains(&chrom) {
        return Err(format!("unknown chromosome '{}'", chrom));
    }

    let pos: u64 = fields[3]
        .parse()
        .map_err(|_| format!("invalid POS field '{}'", fields[3]))?;

    let spans = cigar::parse(fields[5].as_bytes(), pos - 1)?;

    let mut xs = None;
    let mut nh = 1u32;
    for tag in &fields[11..] {
        if let Some(rest) = tag.strip_prefix("XS:A:").or_else(|| tag.strip_prefix("XS:a:")) {
            xs = rest
                .chars()
                .next()
                .and_then(Strand::from_char);
        } else if let Some(rest) = tag.strip_prefix("NH:i:") {
            nh = rest
                .parse()
                .map_err(|_| format!("invalid NH value '{}'", rest))?;
        }
    }

    let mate_chrom = match fields[6] {
        "*" => None,
        "=" => Some(chrom.clone()),
        other => Some(other.to_string()),
    };
    let mate_pos = if mate_chrom.is_some() {
        Some(
            fields[7]
                .parse()
                .map_err(|_| format!("invalid mate POS field '{}'", fields[7]))?,
        )
    } else {
        None
    };

    let read_len: u64 = spans.iter().map(|(s, e)| e - s).sum();

    Ok(SamRecord {
        chrom,
        spans,
        xs,
        nh,
        read_len,
        mate_chrom,
        mate_pos,
        pos,
    })
}

/// Streaming reader that splits a SAM stream into its header block and
/// an iterator of non-header lines.
pub struct SamReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> SamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Consume leading `@`-prefixed lines, returning the joined header
    /// text. After this call the reader is positioned at the first
    /// alignment line.
    pub fn read_header(&mut self) -> std::io::Result<String> {
        let mut header = String::new();
        loop {
            let mut line = String::new();
            let pos_before = self.reader.fill_buf()?.first().copied();
            if pos_before.is_none() {
                break;
            }
            if pos_before != Some(b'@') {
                break;
            }
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            header.push_str(&line);
        }
        Ok(header)
    }

    /// Iterate remaining (non-header) lines, each with its 1-based line
    /// number within the alignment section.
    pub fn lines(self) -> impl Iterator<Item = std::io::Result<String>> {
        self.reader.lines()
    }
}
