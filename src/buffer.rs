//! Growable byte buffer and bounded slice views.

use crate::error::Error;
use bytes::Bytes;

/// Smallest capacity [`Buf`] will allocate when it grows.
const MIN_CAPACITY: usize = 64;

/// Doubling growth policy: the smallest capacity reachable from `current` by
/// repeated doubling that holds `needed` bytes.
///
/// Kept as a standalone function so the policy is testable independently of
/// [`Buf`].
pub fn next_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(MIN_CAPACITY);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}

/// An owned byte buffer whose logical content length is tracked separately
/// from its allocated capacity.
///
/// Codecs never grow a buffer implicitly during serialize; callers size a
/// `Buf` (via [`Buf::resize`]) to the length reported by the measuring pass
/// and hand out `as_mut_slice`.
pub struct Buf {
    data: Vec<u8>,
    len: usize,
}

impl Buf {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
        }
    }

    /// Logical content length (bytes in use).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Resets the content length without releasing capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Sets the content length, growing if necessary. Newly exposed bytes are
    /// zeroed.
    pub fn resize(&mut self, len: usize) {
        self.ensure(len);
        if len > self.len {
            self.data[self.len..len].fill(0);
        }
        self.len = len;
    }

    /// Appends bytes, growing via [`next_capacity`] when the allocation is
    /// exhausted.
    pub fn append(&mut self, bytes: &[u8]) {
        let needed = self.len + bytes.len();
        self.ensure(needed);
        self.data[self.len..needed].copy_from_slice(bytes);
        self.len = needed;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    /// Consumes the buffer, handing off the content bytes.
    pub fn into_bytes(mut self) -> Bytes {
        self.data.truncate(self.len);
        Bytes::from(self.data)
    }

    fn ensure(&mut self, needed: usize) {
        if needed > self.data.len() {
            let capacity = next_capacity(self.data.len(), needed);
            self.data.resize(capacity, 0);
        }
    }
}

impl Default for Buf {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-owning `(data, offset, limit)` view into a byte array.
///
/// Invariant (validated at construction): `offset <= limit <= data.len()`.
#[derive(Clone, Copy, Debug)]
pub struct Slice<'a> {
    data: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> Slice<'a> {
    pub fn new(data: &'a [u8], offset: usize, limit: usize) -> Result<Self, Error> {
        if offset > limit || limit > data.len() {
            return Err(Error::InvalidSlice {
                offset,
                limit,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            offset,
            limit,
        })
    }

    /// A view spanning the whole array.
    pub fn full(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            limit: data.len(),
        }
    }

    /// The empty view, with an empty backing array.
    pub const fn empty() -> Slice<'static> {
        Slice {
            data: &[],
            offset: 0,
            limit: 0,
        }
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.limit - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The viewed bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[self.offset..self.limit]
    }
}
