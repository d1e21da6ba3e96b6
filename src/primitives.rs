//! Fixed-width integer read/write primitives.
//!
//! These are the leaf operations every codec above bottoms out in: packing and
//! unpacking big- and little-endian integers at an explicit offset in a byte
//! buffer. They assume `offset + width <= buf.len()` and rely on checked slice
//! indexing for that precondition (panic, never UB). Layers above never
//! trigger it: the codec layer bounds-checks against its limit before calling
//! down here.

use crate::error::Error;

/// Byte order of a multi-byte scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Encoded width of a scalar, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Eight = 8,
}

impl Width {
    /// Number of bytes this width occupies on the wire.
    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Parses a byte count into a width.
    pub fn new(bytes: usize) -> Result<Self, Error> {
        match bytes {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => Err(Error::InvalidWidth(bytes)),
        }
    }
}

/// A validated (width, endianness) pair.
///
/// 24-bit little-endian layouts do not exist on any wire format this crate
/// targets and are rejected at construction, which keeps the dispatch in
/// [`Layout::write`] and [`Layout::read`] total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    width: Width,
    endian: Endian,
}

impl Layout {
    /// Big-endian layout of the given width.
    pub const fn be(width: Width) -> Self {
        Self {
            width,
            endian: Endian::Big,
        }
    }

    /// Little-endian layout of the given width.
    pub fn le(width: Width) -> Result<Self, Error> {
        if width == Width::Three {
            return Err(Error::InvalidWidth(3));
        }
        Ok(Self {
            width,
            endian: Endian::Little,
        })
    }

    /// Number of bytes this layout occupies on the wire.
    #[inline]
    pub const fn bytes(self) -> usize {
        self.width.bytes()
    }

    /// Packs the low `width` bytes of `value` at `offset`. Wider values are
    /// truncated, not rejected.
    pub(crate) fn write(self, buf: &mut [u8], offset: usize, value: u64) {
        match (self.width, self.endian) {
            (Width::One, _) => write_u8(buf, offset, value as u8),
            (Width::Two, Endian::Big) => write_u16_be(buf, offset, value as u16),
            (Width::Two, Endian::Little) => write_u16_le(buf, offset, value as u16),
            (Width::Three, Endian::Big) => write_u24_be(buf, offset, value as u32),
            (Width::Three, Endian::Little) => unreachable!("rejected by Layout::le"),
            (Width::Four, Endian::Big) => write_u32_be(buf, offset, value as u32),
            (Width::Four, Endian::Little) => write_u32_le(buf, offset, value as u32),
            (Width::Eight, Endian::Big) => write_u64_be(buf, offset, value),
            (Width::Eight, Endian::Little) => write_u64_le(buf, offset, value),
        }
    }

    /// Unpacks `width` bytes at `offset`, zero-extended to a `u64`.
    pub(crate) fn read(self, buf: &[u8], offset: usize) -> u64 {
        match (self.width, self.endian) {
            (Width::One, _) => read_u8(buf, offset) as u64,
            (Width::Two, Endian::Big) => read_u16_be(buf, offset) as u64,
            (Width::Two, Endian::Little) => read_u16_le(buf, offset) as u64,
            (Width::Three, Endian::Big) => read_u24_be(buf, offset) as u64,
            (Width::Three, Endian::Little) => unreachable!("rejected by Layout::le"),
            (Width::Four, Endian::Big) => read_u32_be(buf, offset) as u64,
            (Width::Four, Endian::Little) => read_u32_le(buf, offset) as u64,
            (Width::Eight, Endian::Big) => read_u64_be(buf, offset),
            (Width::Eight, Endian::Little) => read_u64_le(buf, offset),
        }
    }
}

#[inline]
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) {
    buf[offset] = value;
}

#[inline]
pub fn read_u8(buf: &[u8], offset: usize) -> u8 {
    buf[offset]
}

macro_rules! impl_fixed {
    ($write:ident, $read:ident, $type:ty, $to:ident, $from:ident) => {
        #[inline]
        pub fn $write(buf: &mut [u8], offset: usize, value: $type) {
            const WIDTH: usize = std::mem::size_of::<$type>();
            buf[offset..offset + WIDTH].copy_from_slice(&value.$to());
        }

        #[inline]
        pub fn $read(buf: &[u8], offset: usize) -> $type {
            const WIDTH: usize = std::mem::size_of::<$type>();
            let mut bytes = [0u8; WIDTH];
            bytes.copy_from_slice(&buf[offset..offset + WIDTH]);
            <$type>::$from(bytes)
        }
    };
}

impl_fixed!(write_u16_be, read_u16_be, u16, to_be_bytes, from_be_bytes);
impl_fixed!(write_u32_be, read_u32_be, u32, to_be_bytes, from_be_bytes);
impl_fixed!(write_u64_be, read_u64_be, u64, to_be_bytes, from_be_bytes);
impl_fixed!(write_u16_le, read_u16_le, u16, to_le_bytes, from_le_bytes);
impl_fixed!(write_u32_le, read_u32_le, u32, to_le_bytes, from_le_bytes);
impl_fixed!(write_u64_le, read_u64_le, u64, to_le_bytes, from_le_bytes);

/// Packs the low 24 bits of `value` big-endian at `offset`.
#[inline]
pub fn write_u24_be(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset] = (value >> 16) as u8;
    buf[offset + 1] = (value >> 8) as u8;
    buf[offset + 2] = value as u8;
}

/// Unpacks a 24-bit big-endian unsigned integer at `offset`.
#[inline]
pub fn read_u24_be(buf: &[u8], offset: usize) -> u32 {
    ((buf[offset] as u32) << 16) | ((buf[offset + 1] as u32) << 8) | (buf[offset + 2] as u32)
}

/// Unpacks a 24-bit big-endian signed integer at `offset`, extending bit 23
/// through the high byte.
#[inline]
pub fn read_i24_be(buf: &[u8], offset: usize) -> i32 {
    sign_extend(read_u24_be(buf, offset) as u64, 3) as i32
}

/// Extends the sign bit of a `width`-byte value through the rest of a `u64`.
#[inline]
pub fn sign_extend(raw: u64, width: usize) -> u64 {
    if width >= 8 {
        return raw;
    }
    let bits = width * 8;
    if raw & (1u64 << (bits - 1)) != 0 {
        raw | (!0u64 << bits)
    } else {
        raw
    }
}
