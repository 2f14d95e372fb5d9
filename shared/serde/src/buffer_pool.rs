use std::sync::Mutex;

use crate::stream_writer::ByteWrite;

/// A small free-list of encode buffers.
///
/// Acquiring moves a buffer out of the pool, so at most one encode can be in
/// flight per buffer; it goes back (cleared) when the [`PooledBuffer`] drops.
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    initial_capacity: usize,
    max_pooled: usize,
}

impl BufferPool {
    pub fn new(initial_capacity: usize, max_pooled: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            initial_capacity,
            max_pooled,
        }
    }

    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buffer = match self.buffers.lock() {
            Ok(mut buffers) => buffers.pop(),
            Err(_) => None,
        }
        .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity));

        PooledBuffer {
            pool: self,
            buffer,
        }
    }

    pub fn pooled_count(&self) -> usize {
        self.buffers.lock().map(|buffers| buffers.len()).unwrap_or(0)
    }

    fn release(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        if let Ok(mut buffers) = self.buffers.lock() {
            if buffers.len() < self.max_pooled {
                buffers.push(buffer);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(512, 8)
    }
}

pub struct PooledBuffer<'p> {
    pool: &'p BufferPool,
    buffer: Vec<u8>,
}

impl PooledBuffer<'_> {
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Copy the encoded bytes into an exactly-sized owned payload.
    pub fn to_payload(&self) -> Box<[u8]> {
        self.buffer.as_slice().into()
    }
}

impl ByteWrite for PooledBuffer<'_> {
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

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
