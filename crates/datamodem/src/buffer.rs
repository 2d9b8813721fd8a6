//! The accumulator used to stitch a token's bytes back together when they
//! arrive split across `read` calls.
//!
//! Capacity grows by doubling (or to exactly fit one oversized write) and
//! is never released by [`clear`]; a decoder keeps one buffer alive for
//! its whole life and reuses the allocation between tokens.
//!
//! [`clear`]: ByteBuffer::clear

use alloc::vec::Vec;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
pub(crate) struct ByteBuffer {
    storage: Vec<u8>,
    len: usize,
}

impl ByteBuffer {
    pub(crate) fn new() -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `bytes`, growing capacity without losing written bytes.
    pub(crate) fn put(&mut self, bytes: &[u8]) {
        let required = self.len + bytes.len();
        if required > self.storage.len() {
            let doubled = core::cmp::max(self.storage.len() * 2, DEFAULT_CAPACITY);
            self.storage.resize(core::cmp::max(doubled, required), 0);
        }
        self.storage[self.len..required].copy_from_slice(bytes);
        self.len = required;
    }

    pub(crate) fn put_u8(&mut self, byte: u8) {
        self.put(&[byte]);
    }

    /// Resets the write cursor without deallocating.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    /// Everything written since the last [`clear`].
    ///
    /// [`clear`]: ByteBuffer::clear
    pub(crate) fn view(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Removes and returns the last `n` written bytes (or fewer, if fewer
    /// were written). Used to lift a just-pushed hex escape back out of
    /// the accumulating string.
    pub(crate) fn pop(&mut self, n: usize) -> &[u8] {
        let start = self.len.saturating_sub(n);
        let end = self.len;
        self.len = start;
        &self.storage[start..end]
    }

    /// Takes the written bytes as an owned vector and resets the cursor,
    /// keeping the allocation for the next token.
    pub(crate) fn take(&mut self) -> Vec<u8> {
        let out = self.view().to_vec();
        self.len = 0;
        out
    }
}
