//! Canonical Huffman coding over difference-encoded coverage values.
//!
//! Run *values* (not run lengths) are difference-encoded before
//! building the codebook: the first value in a stream is kept raw,
//! every following value is replaced by its delta from the previous
//! one. Lengths are never differenced. The resulting symbol stream is
//! what frequency counting and code assignment operate on.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Replace `values` with `[v0, v1-v0, v2-v1, ...]`.
pub fn difference_encode(values: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev = 0i32;
    for (i, &v) in values.iter().enumerate() {
        out.push(if i == 0 { v } else { v - prev });
        prev = v;
    }
    out
}

/// Invert `difference_encode`.
pub fn difference_decode(diffs: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(diffs.len());
    let mut acc = 0i32;
    for (i, &d) in diffs.iter().enumerate() {
        acc = if i == 0 { d } else { acc + d };
        out.push(acc);
    }
    out
}

/// A canonical Huffman codebook: each symbol's bit length and its
/// assigned code.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTable {
    codes: HashMap<i32, (u32, u8)>,
}

impl HuffmanTable {
    pub fn code_of(&self, symbol: i32) -> Option<(u32, u8)> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (i32, u8)> + '_ {
        self.codes.iter().map(|(&s, &(_, len))| (s, len))
    }

    /// Build a canonical codebook from a symbol frequency table. Ties
    /// during tree construction are broken by symbol value ascending,
    /// which combined with iterating the input in sorted-symbol order
    /// makes the resulting codebook depend only on the frequency
    /// multiset, not on insertion order.
    pub fn build(freqs: &HashMap<i32, u64>) -> Self {
        if freqs.is_empty() {
            return Self::default();
        }
        if freqs.len() == 1 {
            let symbol = *freqs.keys().next().unwrap();
            let mut codes = HashMap::new();
            codes.insert(symbol, (0u32, 1u8));
            return Self { codes };
        }

        let depths = build_depths(freqs);
        let codes = assign_canonical_codes(&depths);
        Self { codes }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(i32),
    Internal(Box<Node>, Box<Node>),
}

struct HeapEntry {
    freq: u64,
    seq: u64,
    node: Node,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest
        // (freq, seq) pair to pop first.
        other.freq.cmp(&self.freq).then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn build_depths(freqs: &HashMap<i32, u64>) -> HashMap<i32, u8> {
    let mut symbols: Vec<i32> = freqs.keys().copied().collect();
    symbols.sort_unstable();

    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    for symbol in symbols {
        heap.push(HeapEntry {
            freq: freqs[&symbol],
            seq,
            node: Node::Leaf(symbol),
        });
        seq += 1;
    }

    while heap.len() > 1 {
        let a = heap.pop().unwrap();
        let b = heap.pop().unwrap();
        heap.push(HeapEntry {
            freq: a.freq + b.freq,
            seq,
            node: Node::Internal(Box::new(a.node), Box::new(b.node)),
        });
        seq += 1;
    }

    let root = heap.pop().unwrap().node;
    let mut depths = HashMap::new();
    walk_depths(&root, 0, &mut depths);
    depths
}

fn walk_depths(node: &Node, depth: u8, out: &mut HashMap<i32, u8>) {
    match node {
        Node::Leaf(symbol) => {
            out.insert(*symbol, depth.max(1));
        }
        Node::Internal(l, r) => {
            walk_depths(l, depth + 1, out);
            walk_depths(r, depth + 1, out);
        }
    }
}

/// Standard canonical assignment: sort symbols by `(code_length,
/// symbol)`, then assign sequential codes, left-shifting whenever the
/// length increases.
fn assign_canonical_codes(depths: &HashMap<i32, u8>) -> HashMap<i32, (u32, u8)> {
    let mut symbols: Vec<(u8, i32)> = depths.iter().map(|(&s, &d)| (d, s)).collect();
    symbols.sort_unstable();

    let mut codes = HashMap::new();
    let mut code = 0u32;
    let mut prev_len = symbols[0].0;
    for (len, symbol) in symbols {
        code <<= len - prev_len;
        codes.insert(symbol, (code, len));
        code += 1;
        prev_len = len;
    }
    codes
}
