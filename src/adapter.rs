//! Instance-bound serializer adapters.
//!
//! A [`Serializer`] captures the record instance internally, so callers hand
//! over nothing but a buffer and an offset. Two shapes implement it:
//! [`Bound`] pairs a shared [`Composite`] with one instance, and [`Manual`]
//! wraps a hand-written [`ManualCodec`] for leaf types that are cheaper to
//! encode without per-field dispatch.

use crate::{
    buffer::{Buf, Slice},
    composite::Composite,
    error::Error,
    field::{at_least, push_hex},
};
use bytes::Bytes;
use std::fmt::Write;
use std::sync::Arc;

/// A self-contained serializer: codec plus captured instance.
pub trait Serializer {
    fn fixed_len(&self) -> Option<usize>;

    /// Bytes [`Serializer::serialize`] will write for the captured instance.
    fn len_encoded(&self) -> Result<usize, Error>;

    fn serialize(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error>;

    /// Decodes into the captured instance, returning the new offset.
    fn deserialize(&mut self, buf: &[u8], offset: usize, limit: usize) -> Result<usize, Error>;

    fn data_string(&self) -> String;

    fn data_small_string(&self) -> String;

    /// Encodes the captured instance into an exactly-sized buffer.
    ///
    /// Panics if `serialize` writes a different number of bytes than
    /// `len_encoded` measured.
    ///
    /// (Provided method).
    fn encode(&self) -> Result<Bytes, Error> {
        let len = self.len_encoded()?;
        let mut buf = Buf::with_capacity(len);
        buf.resize(len);
        let written = self.serialize(buf.as_mut_slice(), 0)?;
        assert_eq!(written, len, "serialize did not write the measured length");
        Ok(buf.into_bytes())
    }

    /// Decodes the captured instance from a bounded view.
    ///
    /// (Provided method).
    fn decode(&mut self, slice: Slice<'_>) -> Result<usize, Error> {
        self.deserialize(slice.data(), slice.offset(), slice.limit())
    }
}

/// Binds a composite codec to one concrete record instance.
pub struct Bound<V> {
    codec: Arc<Composite<V>>,
    value: V,
}

impl<V> Bound<V> {
    pub fn new(codec: Arc<Composite<V>>, value: V) -> Self {
        Self { codec, value }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> Serializer for Bound<V> {
    fn fixed_len(&self) -> Option<usize> {
        self.codec.fixed_len()
    }

    fn len_encoded(&self) -> Result<usize, Error> {
        self.codec.len_of(&self.value)
    }

    fn serialize(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        self.codec.serialize(&self.value, buf, offset)
    }

    fn deserialize(&mut self, buf: &[u8], offset: usize, limit: usize) -> Result<usize, Error> {
        self.codec.deserialize(&mut self.value, buf, offset, limit)
    }

    fn data_string(&self) -> String {
        self.codec.data_string(&self.value)
    }

    fn data_small_string(&self) -> String {
        self.codec.data_small_string(&self.value)
    }
}

/// A hand-written codec: implements the four operations directly, bypassing
/// per-field reflection.
pub trait ManualCodec: Send + Sync {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len_of(&self) -> Result<usize, Error>;

    fn serialize(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error>;

    fn deserialize(&mut self, buf: &[u8], offset: usize, limit: usize) -> Result<usize, Error>;

    fn data_string(&self, out: &mut String);

    fn data_small_string(&self, out: &mut String);
}

/// Adapts a [`ManualCodec`] to the uniform [`Serializer`] contract.
pub struct Manual<T>(pub T);

impl Manual<RawBytes> {
    /// The zero-length payload.
    pub const EMPTY: Self = Manual(RawBytes::EMPTY);
}

impl<T: ManualCodec> Serializer for Manual<T> {
    fn fixed_len(&self) -> Option<usize> {
        self.0.fixed_len()
    }

    fn len_encoded(&self) -> Result<usize, Error> {
        self.0.len_of()
    }

    fn serialize(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        self.0.serialize(buf, offset)
    }

    fn deserialize(&mut self, buf: &[u8], offset: usize, limit: usize) -> Result<usize, Error> {
        self.0.deserialize(buf, offset, limit)
    }

    fn data_string(&self) -> String {
        let mut out = String::new();
        self.0.data_string(&mut out);
        out
    }

    fn data_small_string(&self) -> String {
        let mut out = String::new();
        self.0.data_small_string(&mut out);
        out
    }
}

/// Verbatim byte-range passthrough: serialize writes the held bytes with no
/// transformation; deserialize takes everything up to the limit.
pub struct RawBytes {
    data: Vec<u8>,
}

impl RawBytes {
    /// The empty payload singleton.
    pub const EMPTY: Self = Self { data: Vec::new() };

    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ManualCodec for RawBytes {
    fn len_of(&self) -> Result<usize, Error> {
        Ok(self.data.len())
    }

    fn serialize(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        at_least(buf.len(), offset, self.data.len())?;
        buf[offset..offset + self.data.len()].copy_from_slice(&self.data);
        Ok(offset + self.data.len())
    }

    fn deserialize(&mut self, buf: &[u8], offset: usize, limit: usize) -> Result<usize, Error> {
        let end = limit.min(buf.len());
        if offset > end {
            return Err(Error::EndOfBuffer {
                offset,
                needed: 0,
                available: 0,
            });
        }
        self.data = buf[offset..end].to_vec();
        Ok(end)
    }

    fn data_string(&self, out: &mut String) {
        push_hex(out, &self.data);
    }

    fn data_small_string(&self, out: &mut String) {
        let _ = write!(out, "[{} bytes]", self.data.len());
    }
}
