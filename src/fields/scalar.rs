//! Scalar integer codecs: 1/2/3/4/8-byte fields in either byte order.
//!
//! The carried Rust type supplies signedness; the [`Layout`] supplies width
//! and endianness. The encoded width may be narrower than the carried type
//! (e.g. an `i32` carried in a 3-byte field): serialize truncates to the
//! encoded width (wrapping, not rejected), deserialize sign-extends from the
//! top captured bit for signed types and zero-extends otherwise.

use crate::{
    error::Error,
    field::{at_least, Field, FieldCodec, Lens},
    primitives::{sign_extend, Layout, Width},
    ElementCodec,
};
use std::fmt::{Display, Write};
use std::marker::PhantomData;

/// Integer types a scalar codec can carry.
pub trait ScalarInt: Copy + Display + Send + Sync + 'static {
    const SIGNED: bool;

    /// Numeric cast to the raw `u64` carrier (sign-extending for signed
    /// types).
    fn into_raw(self) -> u64;

    /// Truncating cast back from the raw carrier.
    fn from_raw(raw: u64) -> Self;
}

macro_rules! impl_scalar_int {
    ($type:ty, $signed:expr) => {
        impl ScalarInt for $type {
            const SIGNED: bool = $signed;

            #[inline]
            fn into_raw(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_raw(raw: u64) -> Self {
                raw as $type
            }
        }
    };
}

impl_scalar_int!(u8, false);
impl_scalar_int!(u16, false);
impl_scalar_int!(u32, false);
impl_scalar_int!(u64, false);
impl_scalar_int!(i8, true);
impl_scalar_int!(i16, true);
impl_scalar_int!(i32, true);
impl_scalar_int!(i64, true);

/// A fixed-width integer codec.
pub struct Scalar<V: ScalarInt> {
    layout: Layout,
    _marker: PhantomData<V>,
}

impl<V: ScalarInt> Scalar<V> {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            _marker: PhantomData,
        }
    }

    /// Big-endian codec of the given width.
    pub fn be(width: Width) -> Self {
        Self::new(Layout::be(width))
    }

    /// Little-endian codec of the given width (widths 1, 2, 4, 8).
    pub fn le(width: Width) -> Result<Self, Error> {
        Ok(Self::new(Layout::le(width)?))
    }

    /// Builds a ready-to-compose big-endian field.
    pub fn be_field<H: 'static>(
        name: &'static str,
        width: Width,
        get: impl Fn(&H) -> V + Send + Sync + 'static,
        set: impl Fn(&mut H, V) + Send + Sync + 'static,
    ) -> Box<dyn FieldCodec<H>> {
        Field::boxed(name, Self::be(width), Lens::new(get, set))
    }

    /// Builds a ready-to-compose little-endian field.
    pub fn le_field<H: 'static>(
        name: &'static str,
        width: Width,
        get: impl Fn(&H) -> V + Send + Sync + 'static,
        set: impl Fn(&mut H, V) + Send + Sync + 'static,
    ) -> Result<Box<dyn FieldCodec<H>>, Error> {
        Ok(Field::boxed(name, Self::le(width)?, Lens::new(get, set)))
    }
}

impl<V: ScalarInt> ElementCodec<V> for Scalar<V> {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.layout.bytes())
    }

    fn len_of(&self, _: &V) -> Result<usize, Error> {
        Ok(self.layout.bytes())
    }

    fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let width = self.layout.bytes();
        at_least(buf.len(), offset, width)?;
        self.layout.write(buf, offset, value.into_raw());
        Ok(offset + width)
    }

    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(V, usize), Error> {
        let width = self.layout.bytes();
        at_least(limit.min(buf.len()), offset, width)?;
        let mut raw = self.layout.read(buf, offset);
        if V::SIGNED {
            raw = sign_extend(raw, width);
        }
        Ok((V::from_raw(raw), offset + width))
    }

    fn data_string(&self, value: &V, out: &mut String) {
        let _ = write!(out, "{value}");
    }

    fn data_small_string(&self, value: &V, out: &mut String) {
        let _ = write!(out, "{value}");
    }
}
