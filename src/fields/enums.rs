//! Enum codecs: an enum stored as a fixed-width integer discriminant.

use crate::{
    error::Error,
    field::at_least,
    primitives::{sign_extend, Layout},
    ElementCodec,
};
use std::fmt::{Debug, Write};

/// Codec for an enum carried as its underlying integer value.
///
/// `from_raw` is total: an unknown or out-of-range discriminant decodes into
/// whatever representation the caller chooses for that raw integer (no
/// error), so schemas stay decodable when peers send values this build does
/// not know about.
pub struct EnumCodec<E> {
    layout: Layout,
    to_raw: Box<dyn Fn(&E) -> u64 + Send + Sync>,
    from_raw: Box<dyn Fn(u64) -> E + Send + Sync>,
}

impl<E> EnumCodec<E> {
    pub fn new(
        layout: Layout,
        to_raw: impl Fn(&E) -> u64 + Send + Sync + 'static,
        from_raw: impl Fn(u64) -> E + Send + Sync + 'static,
    ) -> Self {
        Self {
            layout,
            to_raw: Box::new(to_raw),
            from_raw: Box::new(from_raw),
        }
    }
}

impl<E: Debug> ElementCodec<E> for EnumCodec<E> {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.layout.bytes())
    }

    fn len_of(&self, _: &E) -> Result<usize, Error> {
        Ok(self.layout.bytes())
    }

    fn serialize(&self, value: &E, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let width = self.layout.bytes();
        at_least(buf.len(), offset, width)?;
        self.layout.write(buf, offset, (self.to_raw)(value));
        Ok(offset + width)
    }

    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(E, usize), Error> {
        let width = self.layout.bytes();
        at_least(limit.min(buf.len()), offset, width)?;
        let raw = self.layout.read(buf, offset);
        Ok(((self.from_raw)(raw), offset + width))
    }

    fn data_string(&self, value: &E, out: &mut String) {
        let _ = write!(out, "{value:?}");
    }

    fn data_small_string(&self, value: &E, out: &mut String) {
        let _ = write!(out, "{value:?}");
    }
}

/// Sign-extending counterpart of [`EnumCodec::new`] for enums whose
/// discriminant is a signed sub-word integer.
impl<E> EnumCodec<E> {
    pub fn new_signed(
        layout: Layout,
        to_raw: impl Fn(&E) -> i64 + Send + Sync + 'static,
        from_raw: impl Fn(i64) -> E + Send + Sync + 'static,
    ) -> Self {
        let width = layout.bytes();
        Self::new(
            layout,
            move |value| to_raw(value) as u64,
            move |raw| from_raw(sign_extend(raw, width) as i64),
        )
    }
}
