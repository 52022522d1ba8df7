//! Chromosome table: name -> genome length, iteration order significant.

use std::collections::HashMap;

/// Mapping from chromosome name to genome length, preserving the order
/// chromosomes were first inserted in (typically `@SQ` order from the SAM
/// header). This order defines the exon axis's global concatenation order.
#[derive(Debug, Clone, Default)]
pub struct ChromTable {
    lengths: HashMap<String, u64>,
    order: Vec<String>,
}

impl ChromTable {
    pub fn new() -> Self {
        Self {
            lengths: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Insert a chromosome, appending it to iteration order if new.
    pub fn insert(&mut self, name: impl Into<String>, length: u64) {
        let name = name.into();
        if !self.lengths.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.lengths.insert(name, length);
    }

    pub fn len_of(&self, name: &str) -> Option<u64> {
        self.lengths.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lengths.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let mut t = ChromTable::new();
        t.insert("chr2", 500);
        t.insert("chr1", 1000);
        let names: Vec<&str> = t.names().collect();
        assert_eq!(names, vec!["chr2", "chr1"]);
    }

    #[test]
    fn test_reinsert_updates_length_not_order() {
        let mut t = ChromTable::new();
        t.insert("chr1", 1000);
        t.insert("chr1", 2000);
        assert_eq!(t.len_of("chr1"), Some(2000));
        assert_eq!(t.len(), 1);
    }
}
