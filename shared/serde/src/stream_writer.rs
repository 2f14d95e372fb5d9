/// Sink for encoded bytes.
///
/// Both the growable [`StreamWriter`] and the pooled buffers implement this,
/// so packet bodies are written once against the trait.
pub trait ByteWrite {
    fn write_byte(&mut self, byte: u8);
    fn write_bytes(&mut self, bytes: &[u8]);
    fn bytes_written(&self) -> usize;
}

/// A ByteWrite implementation backed by a `Vec<u8>` that grows as needed.
pub struct StreamWriter {
    buffer: Vec<u8>,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    /// Reuse an existing allocation. The buffer is cleared first.
    pub fn with_buffer(mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        Self { buffer }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for StreamWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteWrite for StreamWriter {
    fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn bytes_written(&self) -> usize {
        self.buffer.len()
    }
}
