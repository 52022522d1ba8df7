//! Compression configuration.

/// Block codec used to compress each chunk of the archive body and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressMethod {
    Deflate,
    Lzma,
    Bzip2,
}

impl Default for CompressMethod {
    fn default() -> Self {
        CompressMethod::Deflate
    }
}

/// Knobs controlling the compressor's output format and chunking.
///
/// Built with the same `with_*` builder-method style used throughout the
/// command layer.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Emit the binary archive (true) or the legacy text format (false).
    pub binary: bool,
    /// Huffman-code the coverage difference streams. Only meaningful
    /// when `binary` is true.
    pub huffman: bool,
    /// Block codec for compressed chunks.
    pub compress_method: CompressMethod,
    /// Breakpoint interval for unspliced coverage chunking.
    pub section_len: u64,
    /// Exons per compressed per-exon-histogram chunk.
    pub exon_chunk_size: usize,
    /// Junctions per compressed junction chunk.
    pub junction_chunk_size: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            binary: true,
            huffman: false,
            compress_method: CompressMethod::Deflate,
            section_len: 100_000,
            exon_chunk_size: 100,
            junction_chunk_size: 50,
        }
    }
}

impl CompressOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_huffman(mut self, huffman: bool) -> Self {
        self.huffman = huffman;
        self
    }

    pub fn with_compress_method(mut self, method: CompressMethod) -> Self {
        self.compress_method = method;
        self
    }

    pub fn with_section_len(mut self, section_len: u64) -> Self {
        self.section_len = section_len;
        self
    }

    pub fn with_exon_chunk_size(mut self, exon_chunk_size: usize) -> Self {
        self.exon_chunk_size = exon_chunk_size;
        self
    }

    pub fn with_junction_chunk_size(mut self, junction_chunk_size: usize) -> Self {
        self.junction_chunk_size = junction_chunk_size;
        self
    }
}
