//! Explicitly bounded output buffer for sign and decrypt results.

use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};


#[derive(Debug, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("Output of {required} bytes exceeds buffer capacity of {capacity} bytes")]
    TooSmall { required: usize, capacity: usize },
}

/// Output buffer with a fixed capacity chosen by the caller.
///
/// Writes larger than the capacity are rejected before any byte is copied. Memory is
/// only allocated for what is written, so the capacity may be any bound. Contents
/// are zeroized when cleared or dropped, since decrypt results are key material.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Zeroizing<Vec<u8>>,
    capacity: usize,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Zeroizing::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Replaces the contents with `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.len() > self.capacity {
            return Err(BufferError::TooSmall {
                required: bytes.len(),
                capacity: self.capacity,
            });
        }

        self.clear();
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn clear(&mut self) {
        // also wipes spare capacity left by a longer previous write
        self.data.zeroize();
    }

    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        self.data
    }
}
