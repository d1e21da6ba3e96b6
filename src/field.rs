//! Core codec traits: element codecs, field codecs, and the lens that binds
//! an element codec to one field of a host record.
//!
//! An [`ElementCodec`] knows how to measure, write, read, and render a value
//! of one type, independent of where that value lives. A [`FieldCodec`] is
//! the same capability set aimed at one field of a host record, reached
//! through a [`Lens`] resolved once at schema construction. [`Field`] is the
//! binder that turns the former into the latter.

use crate::error::Error;

/// Returns an error if fewer than `needed` bytes remain between `offset` and
/// `end` (a limit or a buffer length, whichever is smaller at the call site).
#[inline]
pub(crate) fn at_least(end: usize, offset: usize, needed: usize) -> Result<(), Error> {
    let available = end.saturating_sub(offset);
    if available < needed {
        return Err(Error::EndOfBuffer {
            offset,
            needed,
            available,
        });
    }
    Ok(())
}

/// Renders bytes as `0x`-prefixed hex.
pub(crate) fn push_hex(out: &mut String, bytes: &[u8]) {
    use std::fmt::Write;
    out.push_str("0x");
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
}

/// A codec for values of type `V`: measure, serialize, deserialize, and
/// stringify, with explicit offset threading.
///
/// Implementations are immutable after construction and hold no per-call
/// state, so a single codec is safe to share across threads.
pub trait ElementCodec<V>: Send + Sync {
    /// `Some(n)` if every instance occupies exactly `n` bytes, else `None`.
    fn fixed_len(&self) -> Option<usize>;

    /// The number of bytes [`ElementCodec::serialize`] will write for `value`.
    fn len_of(&self, value: &V) -> Result<usize, Error>;

    /// Writes `value` at `offset`, returning the offset one past the last
    /// byte written. The buffer must already be sized to at least
    /// `offset + len_of(value)`; codecs never grow it.
    fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error>;

    /// Reads a value at `offset`, never touching bytes at or past `limit`,
    /// returning the value and the offset one past the last byte consumed.
    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(V, usize), Error>;

    /// Appends a full human-readable rendering of `value`.
    fn data_string(&self, value: &V, out: &mut String);

    /// Appends a compact rendering: arrays and byte blocks are summarized
    /// instead of expanded.
    fn data_small_string(&self, value: &V, out: &mut String);
}

// Allows shared codecs (e.g. an `Arc<Composite<V>>`) to serve as element
// codecs directly.
impl<V, C: ElementCodec<V> + ?Sized> ElementCodec<V> for std::sync::Arc<C> {
    fn fixed_len(&self) -> Option<usize> {
        (**self).fixed_len()
    }

    fn len_of(&self, value: &V) -> Result<usize, Error> {
        (**self).len_of(value)
    }

    fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        (**self).serialize(value, buf, offset)
    }

    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(V, usize), Error> {
        (**self).deserialize(buf, offset, limit)
    }

    fn data_string(&self, value: &V, out: &mut String) {
        (**self).data_string(value, out)
    }

    fn data_small_string(&self, value: &V, out: &mut String) {
        (**self).data_small_string(value, out)
    }
}

/// One field of a host record `H`: the same operations as [`ElementCodec`],
/// but reading and writing the value through the host.
pub trait FieldCodec<H>: Send + Sync {
    fn fixed_len(&self) -> Option<usize>;

    fn len_of(&self, host: &H) -> Result<usize, Error>;

    fn serialize(&self, host: &H, buf: &mut [u8], offset: usize) -> Result<usize, Error>;

    /// Decodes the field and assigns it into `host`, returning the new
    /// offset. On success the field has been assigned exactly once.
    fn deserialize(&self, host: &mut H, buf: &[u8], offset: usize, limit: usize)
        -> Result<usize, Error>;

    fn data_string(&self, host: &H, out: &mut String);

    fn data_small_string(&self, host: &H, out: &mut String);
}

/// Reads one field out of a host record.
pub type Get<H, V> = Box<dyn Fn(&H) -> V + Send + Sync>;

/// Writes one field back into a host record.
pub type Set<H, V> = Box<dyn Fn(&mut H, V) + Send + Sync>;

/// A typed accessor pair into a host record, resolved once at schema
/// construction (no per-call field lookup).
pub struct Lens<H, V> {
    get: Get<H, V>,
    set: Set<H, V>,
}

impl<H, V> Lens<H, V> {
    pub fn new(
        get: impl Fn(&H) -> V + Send + Sync + 'static,
        set: impl Fn(&mut H, V) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    #[inline]
    pub(crate) fn get(&self, host: &H) -> V {
        (self.get)(host)
    }

    #[inline]
    pub(crate) fn set(&self, host: &mut H, value: V) {
        (self.set)(host, value)
    }
}

/// Binds an element codec to one named field of a host record.
pub struct Field<H, V, C> {
    name: &'static str,
    codec: C,
    lens: Lens<H, V>,
}

impl<H, V, C: ElementCodec<V>> Field<H, V, C> {
    pub fn new(name: &'static str, codec: C, lens: Lens<H, V>) -> Self {
        Self { name, codec, lens }
    }

    /// Convenience for composing field lists.
    pub fn boxed(name: &'static str, codec: C, lens: Lens<H, V>) -> Box<dyn FieldCodec<H>>
    where
        H: 'static,
        V: 'static,
        C: 'static,
    {
        Box::new(Self::new(name, codec, lens))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<H, V, C: ElementCodec<V>> FieldCodec<H> for Field<H, V, C> {
    fn fixed_len(&self) -> Option<usize> {
        self.codec.fixed_len()
    }

    fn len_of(&self, host: &H) -> Result<usize, Error> {
        self.codec.len_of(&self.lens.get(host))
    }

    fn serialize(&self, host: &H, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        self.codec.serialize(&self.lens.get(host), buf, offset)
    }

    fn deserialize(
        &self,
        host: &mut H,
        buf: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<usize, Error> {
        let (value, offset) = self.codec.deserialize(buf, offset, limit)?;
        self.lens.set(host, value);
        Ok(offset)
    }

    fn data_string(&self, host: &H, out: &mut String) {
        out.push_str(self.name);
        out.push('=');
        self.codec.data_string(&self.lens.get(host), out);
    }

    fn data_small_string(&self, host: &H, out: &mut String) {
        out.push_str(self.name);
        out.push('=');
        self.codec.data_small_string(&self.lens.get(host), out);
    }
}
