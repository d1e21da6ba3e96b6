//! Count-prefixed array codecs.
//!
//! Both variants store the element count in a 1-4 byte big-endian prefix and
//! the elements consecutively after it. [`FixedArray`] requires every element
//! to occupy the same number of bytes, which lets decode validate the count
//! against the remaining buffer before allocating; [`DynArray`] lets each
//! element report its own length.
//!
//! Neither variant has a fixed total length (the count varies per instance),
//! so arrays always make their enclosing composite unfixed.

use crate::{
    error::Error,
    field::at_least,
    primitives::{Layout, Width},
    ElementCodec,
};
use std::fmt::Write;
use std::marker::PhantomData;

fn count_layout(width: usize) -> Result<Layout, Error> {
    match width {
        1 => Ok(Layout::be(Width::One)),
        2 => Ok(Layout::be(Width::Two)),
        3 => Ok(Layout::be(Width::Three)),
        4 => Ok(Layout::be(Width::Four)),
        _ => Err(Error::InvalidCountWidth(width)),
    }
}

fn write_count(
    prefix: Layout,
    count: usize,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize, Error> {
    let max = (1u64 << (prefix.bytes() * 8)) - 1;
    if count as u64 > max {
        return Err(Error::LengthExceeded(count, max as usize));
    }
    at_least(buf.len(), offset, prefix.bytes())?;
    prefix.write(buf, offset, count as u64);
    Ok(offset + prefix.bytes())
}

fn read_count(
    prefix: Layout,
    buf: &[u8],
    offset: usize,
    limit: usize,
) -> Result<(usize, usize), Error> {
    at_least(limit.min(buf.len()), offset, prefix.bytes())?;
    let count = prefix.read(buf, offset) as usize;
    Ok((count, offset + prefix.bytes()))
}

fn render_elements<E, C: ElementCodec<E>>(elem: &C, value: &[E], out: &mut String) {
    out.push('[');
    for (i, item) in value.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        elem.data_string(item, out);
    }
    out.push(']');
}

/// Array of equally-sized elements behind a count prefix.
///
/// Construction fails unless the element codec reports a fixed length.
pub struct FixedArray<E, C> {
    prefix: Layout,
    elem: C,
    elem_len: usize,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C: ElementCodec<E>> FixedArray<E, C> {
    pub fn new(count_width: usize, elem: C) -> Result<Self, Error> {
        let prefix = count_layout(count_width)?;
        let elem_len = elem.fixed_len().ok_or(Error::UnfixedElement)?;
        Ok(Self {
            prefix,
            elem,
            elem_len,
            _marker: PhantomData,
        })
    }
}

impl<E, C: ElementCodec<E>> ElementCodec<Vec<E>> for FixedArray<E, C> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len_of(&self, value: &Vec<E>) -> Result<usize, Error> {
        Ok(self.prefix.bytes() + value.len() * self.elem_len)
    }

    fn serialize(&self, value: &Vec<E>, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let mut offset = write_count(self.prefix, value.len(), buf, offset)?;
        for item in value {
            offset = self.elem.serialize(item, buf, offset)?;
        }
        Ok(offset)
    }

    fn deserialize(
        &self,
        buf: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<E>, usize), Error> {
        let (count, mut offset) = read_count(self.prefix, buf, offset, limit)?;

        // Validate the count against the remaining bytes before allocating
        // or decoding anything: length prefixes are untrusted input.
        let remaining = limit.min(buf.len()).saturating_sub(offset);
        let needed = count
            .checked_mul(self.elem_len)
            .ok_or(Error::InvalidCount { count, remaining })?;
        if needed > remaining {
            return Err(Error::InvalidCount { count, remaining });
        }

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let (item, next) = self.elem.deserialize(buf, offset, limit)?;
            out.push(item);
            offset = next;
        }
        Ok((out, offset))
    }

    fn data_string(&self, value: &Vec<E>, out: &mut String) {
        render_elements(&self.elem, value, out);
    }

    fn data_small_string(&self, value: &Vec<E>, out: &mut String) {
        let _ = write!(out, "[{} elements]", value.len());
    }
}

/// Array of individually-sized elements behind a count prefix.
pub struct DynArray<E, C> {
    prefix: Layout,
    elem: C,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C: ElementCodec<E>> DynArray<E, C> {
    pub fn new(count_width: usize, elem: C) -> Result<Self, Error> {
        Ok(Self {
            prefix: count_layout(count_width)?,
            elem,
            _marker: PhantomData,
        })
    }
}

impl<E, C: ElementCodec<E>> ElementCodec<Vec<E>> for DynArray<E, C> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len_of(&self, value: &Vec<E>) -> Result<usize, Error> {
        let mut total = self.prefix.bytes();
        for item in value {
            total += self.elem.len_of(item)?;
        }
        Ok(total)
    }

    fn serialize(&self, value: &Vec<E>, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let mut offset = write_count(self.prefix, value.len(), buf, offset)?;
        for item in value {
            offset = self.elem.serialize(item, buf, offset)?;
        }
        Ok(offset)
    }

    fn deserialize(
        &self,
        buf: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<E>, usize), Error> {
        let (count, mut offset) = read_count(self.prefix, buf, offset, limit)?;

        // Element lengths are unknown up front; cap the allocation hint by
        // the remaining bytes so a corrupt count cannot balloon memory.
        let remaining = limit.min(buf.len()).saturating_sub(offset);
        let mut out = Vec::with_capacity(count.min(remaining));
        for _ in 0..count {
            let (item, next) = self.elem.deserialize(buf, offset, limit)?;
            out.push(item);
            offset = next;
        }
        Ok((out, offset))
    }

    fn data_string(&self, value: &Vec<E>, out: &mut String) {
        render_elements(&self.elem, value, out);
    }

    fn data_small_string(&self, value: &Vec<E>, out: &mut String) {
        let _ = write!(out, "[{} elements]", value.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Scalar;

    #[test]
    fn test_fixed_array_concrete_bytes() {
        let codec = FixedArray::new(1, Scalar::<u16>::be(Width::Two)).unwrap();
        let value = vec![0x0102u16, 0x0304, 0x0506];

        assert_eq!(codec.len_of(&value).unwrap(), 7);
        let mut buf = [0u8; 7];
        let offset = codec.serialize(&value, &mut buf, 0).unwrap();
        assert_eq!(offset, 7);
        assert_eq!(buf, [0x03, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

        let (decoded, offset) = codec.deserialize(&buf, 0, 7).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_empty_array() {
        let codec = FixedArray::new(1, Scalar::<u16>::be(Width::Two)).unwrap();
        let value: Vec<u16> = Vec::new();

        let mut buf = [0xAAu8; 1];
        let offset = codec.serialize(&value, &mut buf, 0).unwrap();
        assert_eq!(offset, 1);
        assert_eq!(buf, [0x00]);

        let (decoded, offset) = codec.deserialize(&buf, 0, 1).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(offset, 1);
    }

    #[test]
    fn test_count_widths() {
        for width in 1..=4usize {
            let codec = FixedArray::new(width, Scalar::<u8>::be(Width::One)).unwrap();
            let value = vec![7u8, 8, 9];
            let len = codec.len_of(&value).unwrap();
            assert_eq!(len, width + 3);

            let mut buf = vec![0u8; len];
            codec.serialize(&value, &mut buf, 0).unwrap();
            // Big-endian count: the low byte of the prefix holds the count.
            assert_eq!(buf[width - 1], 3);
            let (decoded, offset) = codec.deserialize(&buf, 0, len).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(offset, len);
        }
        assert!(matches!(
            FixedArray::new(5, Scalar::<u8>::be(Width::One)),
            Err(Error::InvalidCountWidth(5))
        ));
        assert!(matches!(
            FixedArray::new(0, Scalar::<u8>::be(Width::One)),
            Err(Error::InvalidCountWidth(0))
        ));
    }

    #[test]
    fn test_unfixed_element_rejected() {
        let inner = DynArray::new(1, Scalar::<u8>::be(Width::One)).unwrap();
        assert!(matches!(
            FixedArray::<Vec<u8>, _>::new(1, inner),
            Err(Error::UnfixedElement)
        ));
    }

    #[test]
    fn test_count_overflow() {
        let codec = FixedArray::new(1, Scalar::<u8>::be(Width::One)).unwrap();
        let value = vec![0u8; 256];
        let mut buf = vec![0u8; 257];
        assert!(matches!(
            codec.serialize(&value, &mut buf, 0),
            Err(Error::LengthExceeded(256, 255))
        ));
    }

    #[test]
    fn test_malformed_count() {
        let codec = FixedArray::new(1, Scalar::<u16>::be(Width::Two)).unwrap();
        // Claims 200 elements, provides 2 bytes.
        let buf = [200u8, 0x01, 0x02];
        assert!(matches!(
            codec.deserialize(&buf, 0, 3),
            Err(Error::InvalidCount {
                count: 200,
                remaining: 2,
            })
        ));
    }

    #[test]
    fn test_dyn_array_round_trip() {
        // Elements are themselves count-prefixed arrays, so their lengths
        // vary per element.
        let codec = DynArray::new(2, DynArray::new(1, Scalar::<u8>::be(Width::One)).unwrap())
            .unwrap();
        let value = vec![vec![1u8], vec![2, 3, 4], vec![]];

        let len = codec.len_of(&value).unwrap();
        assert_eq!(len, 2 + (1 + 1) + (1 + 3) + 1);
        let mut buf = vec![0u8; len];
        let offset = codec.serialize(&value, &mut buf, 0).unwrap();
        assert_eq!(offset, len);
        assert_eq!(buf, [0, 3, 1, 1, 3, 2, 3, 4, 0]);

        let (decoded, offset) = codec.deserialize(&buf, 0, len).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(offset, len);
    }

    #[test]
    fn test_dyn_array_truncated_element() {
        let codec = DynArray::new(1, Scalar::<u32>::be(Width::Four)).unwrap();
        let buf = [2u8, 0, 0, 0, 1, 0, 0]; // second element is short
        assert!(matches!(
            codec.deserialize(&buf, 0, 7),
            Err(Error::EndOfBuffer { .. })
        ));
    }

    #[test]
    fn test_data_strings() {
        let codec = FixedArray::new(1, Scalar::<u8>::be(Width::One)).unwrap();
        let value = vec![1u8, 2, 3];

        let mut out = String::new();
        codec.data_string(&value, &mut out);
        assert_eq!(out, "[1, 2, 3]");

        out.clear();
        codec.data_small_string(&value, &mut out);
        assert_eq!(out, "[3 elements]");
    }
}
