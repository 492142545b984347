//! Encoded chunks and the ordered accumulator that holds them

/// One unit of encoder output. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedChunk(Vec<u8>);

impl EncodedChunk {
    /// Wrap encoder output bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for EncodedChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EncodedChunk {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered, growable buffer of encoded chunks for one recording.
///
/// The concatenation of `snapshot()` always equals the in-order
/// concatenation of every chunk appended since the last `clear()`.
#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    chunks: Vec<EncodedChunk>,
    total_bytes: usize,
}

impl SampleAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk to the end
    pub fn append(&mut self, chunk: EncodedChunk) {
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
    }

    /// Drop every held chunk
    pub fn clear(&mut self) {
        self.chunks = Vec::new();
        self.total_bytes = 0;
    }

    /// Current ordered chunk sequence
    pub fn snapshot(&self) -> &[EncodedChunk] {
        &self.chunks
    }

    /// Number of chunks held
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total payload size across all chunks
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate every chunk into a single payload
    pub fn concat(&self) -> Vec<u8> {
        concat_chunks(&self.chunks)
    }
}

/// Concatenate chunks in order
pub fn concat_chunks(chunks: &[EncodedChunk]) -> Vec<u8> {
    let total = chunks.iter().map(EncodedChunk::len).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend_from_slice(chunk.as_bytes());
    }
    out
}
