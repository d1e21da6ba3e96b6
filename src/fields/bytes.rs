//! Fixed-length byte-array codec.

use crate::{
    error::Error,
    field::{at_least, push_hex},
    ElementCodec,
};
use std::fmt::Write;

/// Moves exactly `len` bytes verbatim in both directions.
///
/// The host array is not audited against the configured length: a longer
/// host array is truncated, a shorter one is under-read with the remainder
/// zero-filled. Exactly `len` bytes cross the wire either way.
pub struct FixedBytes {
    len: usize,
}

impl FixedBytes {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl ElementCodec<Vec<u8>> for FixedBytes {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.len)
    }

    fn len_of(&self, _: &Vec<u8>) -> Result<usize, Error> {
        Ok(self.len)
    }

    fn serialize(&self, value: &Vec<u8>, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        at_least(buf.len(), offset, self.len)?;
        let copied = value.len().min(self.len);
        buf[offset..offset + copied].copy_from_slice(&value[..copied]);
        buf[offset + copied..offset + self.len].fill(0);
        Ok(offset + self.len)
    }

    fn deserialize(
        &self,
        buf: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<u8>, usize), Error> {
        at_least(limit.min(buf.len()), offset, self.len)?;
        Ok((buf[offset..offset + self.len].to_vec(), offset + self.len))
    }

    fn data_string(&self, value: &Vec<u8>, out: &mut String) {
        push_hex(out, value);
    }

    fn data_small_string(&self, value: &Vec<u8>, out: &mut String) {
        let _ = write!(out, "[{} bytes]", value.len());
    }
}
