//! Minimal CIGAR parser: only `M`, `N`, `D` are interpreted, per the
//! GLOSSARY. Any other operator is a parse failure for the caller to
//! turn into a `MalformedInput` error.

/// Parse a CIGAR string into a list of exonic `(start, end)` spans,
/// given the 0-based leftmost genomic position the alignment begins at.
///
/// `N` starts a new exonic block (it represents a splice gap). `M`
/// extends the current block (or starts one if none is open). `D`
/// extends the current block's end without adding covered bases of its
/// own, matching how deletions are folded into exon span width.
pub fn parse(cigar: &[u8], offset: u64) -> Result<Vec<(u64, u64)>, String> {
    let mut spans: Vec<(u64, u64)> = Vec::new();
    let mut pos = offset;
    let mut new_block = true;
    let mut i = 0usize;

    while i < cigar.len() {
        let start = i;
        while i < cigar.len() && cigar[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return Err(format!(
                "expected a length before operator at byte {} in CIGAR",
                i
            ));
        }
        let length: u64 = std::str::from_utf8(&cigar[start..i])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "invalid CIGAR length field".to_string())?;

        if i >= cigar.len() {
            return Err("CIGAR ended without an operator".to_string());
        }
        let op = cigar[i];
        i += 1;

        match op {
            b'N' => {
                new_block = true;
                pos += length;
            }
            b'M' => {
                if new_block {
                    spans.push((pos, pos + length));
                    new_block = false;
                } else {
                    spans.last_mut().unwrap().1 += length;
                }
                pos += length;
            }
            b'D' => {
                if !new_block {
                    spans.last_mut().unwrap().1 += length;
                }
                pos += length;
            }
            other => {
                return Err(format!(
                    "unrecognized CIGAR operator '{}'",
                    other as char
                ));
            }
        }
    }

    if spans.is_empty() {
        return Err("CIGAR produced no exonic spans".to_string());
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_match() {
        assert_eq!(parse(b"50M", 100).unwrap(), vec![(100, 150)]);
    }

    #[test]
    fn test_spliced() {
        assert_eq!(
            parse(b"20M100N30M", 100).unwrap(),
            vec![(100, 120), (220, 250)]
        );
    }

    #[test]
    fn test_deletion_extends_current_block() {
        assert_eq!(parse(b"20M5D30M", 100).unwrap(), vec![(100, 155)]);
    }

    #[test]
    fn test_three_block_spliced() {
        assert_eq!(
            parse(b"10M50N10M50N10M", 0).unwrap(),
            vec![(0, 10), (60, 70), (120, 130)]
        );
    }

    #[test]
    fn test_unrecognized_operator() {
        assert!(parse(b"50S", 0).is_err());
        assert!(parse(b"10M5I10M", 0).is_err());
    }

    #[test]
    fn test_malformed_missing_length() {
        assert!(parse(b"M", 0).is_err());
    }
}
