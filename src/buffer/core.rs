use std::io::{self, Read};
use std::ops::Range;
use std::sync::Arc;

use crate::error::{Result, UwcError};

/// Fixed-capacity read buffer: a window over a sequential byte source.
///
/// The buffer tracks a valid prefix of its storage. Each round the
/// orchestrator fills the free region after the valid bytes, hands out
/// read-only [`Shard`]s over the valid prefix, and finally compacts the
/// unprocessed tail to the front for the next refill.
///
/// Storage lives in an `Arc<[u8]>`. Shards clone the `Arc`, so while any
/// shard is alive the storage cannot be written: every mutating method goes
/// through [`Arc::get_mut`], which only succeeds for a unique reference.
/// Workers therefore must drop their shards before signaling completion,
/// and a refill racing a live shard is caught at runtime instead of
/// corrupting data another thread is reading.
pub struct ReadBuffer {
    storage: Arc<[u8]>,
    valid: usize,
}

impl ReadBuffer {
    /// Allocate a buffer of exactly `capacity` bytes, all free.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(UwcError::Config(
                "buffer capacity must be greater than 0".into(),
            ));
        }
        Ok(Self {
            storage: vec![0u8; capacity].into(),
            valid: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of valid bytes at the front of the storage.
    pub fn valid(&self) -> usize {
        self.valid
    }

    pub fn is_full(&self) -> bool {
        self.valid == self.storage.len()
    }

    /// Read-only view over the valid prefix. O(1).
    pub fn view(&self) -> &[u8] {
        &self.storage[..self.valid]
    }

    fn storage_mut(&mut self) -> &mut [u8] {
        // Unique ownership is re-established once every shard from the
        // previous round has been dropped; a worker touching its shard past
        // the completion barrier is a protocol violation.
        Arc::get_mut(&mut self.storage).expect("buffer mutated while shards are alive")
    }

    /// The writable free region after the valid bytes. Callers that fill it
    /// externally report the number of bytes written via [`add_valid`].
    ///
    /// [`add_valid`]: ReadBuffer::add_valid
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let valid = self.valid;
        &mut self.storage_mut()[valid..]
    }

    /// Extend the valid prefix by `len` bytes just written into the free
    /// region.
    pub fn add_valid(&mut self, len: usize) {
        debug_assert!(self.valid + len <= self.storage.len());
        self.valid += len;
    }

    /// Copy as much of `data` as fits into the free region and return the
    /// number of bytes that did not fit (0 if all fit).
    pub fn append(&mut self, data: &[u8]) -> usize {
        let copied = data.len().min(self.capacity() - self.valid);
        self.spare_mut()[..copied].copy_from_slice(&data[..copied]);
        self.valid += copied;
        data.len() - copied
    }

    /// Fill the free region from `reader` until the buffer is full or the
    /// source is exhausted. Returns `Ok(true)` once end-of-data was observed
    /// (a zero-length read). Partial reads and `Interrupted` are retried.
    pub fn refill(&mut self, reader: &mut impl Read) -> io::Result<bool> {
        loop {
            if self.is_full() {
                return Ok(false);
            }
            let n = match reader.read(self.spare_mut()) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                return Ok(true);
            }
            self.add_valid(n);
        }
    }

    /// Move the trailing `keep` valid bytes to the front and shrink the
    /// valid prefix to exactly those bytes, discarding everything before
    /// them. `keep` must be strictly less than the current valid length;
    /// keeping everything (or more) would discard nothing and signals a
    /// splitter bug upstream, so it is reported instead of ignored.
    pub fn compact(&mut self, keep: usize) -> Result<()> {
        let valid = self.valid;
        if keep >= valid {
            return Err(UwcError::CompactOverflow { keep, valid });
        }
        if keep > 0 {
            // Source and destination may overlap; copy_within handles that.
            self.storage_mut().copy_within(valid - keep..valid, 0);
        }
        self.valid = keep;
        Ok(())
    }

    /// A cheap read-only view of `range` within the valid prefix, safe to
    /// send to another thread. Valid data only until the next mutation of
    /// this buffer, which is blocked for as long as the shard is alive.
    pub fn shard(&self, range: Range<usize>) -> Shard {
        debug_assert!(range.start <= range.end && range.end <= self.valid);
        Shard {
            storage: Arc::clone(&self.storage),
            start: range.start,
            end: range.end,
        }
    }
}

/// Non-owning (but lifetime-free) immutable slice of a [`ReadBuffer`]'s
/// valid region. Cloning is an `Arc` bump, no data is copied.
#[derive(Clone)]
pub struct Shard {
    storage: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl Shard {
    pub fn bytes(&self) -> &[u8] {
        &self.storage[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
