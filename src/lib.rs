//! Binary serialization built from composable, reflection-style field codecs.
//!
//! # Overview
//!
//! A toolkit for describing, in a data-driven fashion, how structured records
//! map to and from flat byte buffers: big/little-endian fixed-width integers,
//! length-prefixed arrays, predicate-terminated arrays, and nested records.
//! There is no wire format of its own; the byte layout is whatever the
//! configured codecs produce.
//!
//! A schema is built once, at process start, as a [`Composite`]: an ordered
//! list of field codecs, each pairing an element codec (how the bytes look)
//! with a [`Lens`] (where the value lives on the host record). Composites are
//! immutable, hold no per-call state, and are shared freely across threads.
//! Per use, a caller measures with `len_of`, serializes into a pre-sized
//! buffer at an offset, or deserializes from a buffer/offset/limit; every
//! operation threads the offset cursor forward and returns the new offset.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wirelens::{Bound, Composite, Field, FixedArray, Lens, Scalar, Serializer, Slice, Width};
//!
//! #[derive(Default, Debug, Clone, PartialEq)]
//! struct Frame {
//!     kind: u8,
//!     session: u32,
//!     payload: Vec<u16>,
//! }
//!
//! // Describe the record once.
//! let codec = Arc::new(Composite::new(vec![
//!     Scalar::<u8>::be_field("kind", Width::One, |f: &Frame| f.kind, |f, v| f.kind = v),
//!     Scalar::<u32>::be_field("session", Width::Four, |f: &Frame| f.session, |f, v| {
//!         f.session = v
//!     }),
//!     Field::boxed(
//!         "payload",
//!         FixedArray::new(2, Scalar::<u16>::be(Width::Two)).unwrap(),
//!         Lens::new(|f: &Frame| f.payload.clone(), |f: &mut Frame, v| f.payload = v),
//!     ),
//! ]));
//!
//! // Bind it to an instance and round-trip.
//! let frame = Frame { kind: 7, session: 0xDEADBEEF, payload: vec![1, 2, 3] };
//! let bound = Bound::new(codec.clone(), frame.clone());
//! let encoded = bound.encode().unwrap();
//! assert_eq!(encoded.len(), 1 + 4 + 2 + 3 * 2);
//!
//! let mut decoded = Bound::new(codec, Frame::default());
//! decoded.decode(Slice::full(&encoded)).unwrap();
//! assert_eq!(decoded.into_value(), frame);
//! ```
//!
//! # Bounds policy
//!
//! Every read is validated against the caller's `limit` (clamped to the
//! buffer length) before any byte is touched, and every write against the
//! buffer length; shortfalls surface as [`Error::EndOfBuffer`]. Length
//! prefixes are never trusted: array decoders validate the claimed count
//! against the remaining bytes before allocating. Only the free functions in
//! [`primitives`] assume a trusted caller, and the codec layer never hands
//! them an unchecked offset.

pub mod adapter;
pub mod buffer;
pub mod composite;
pub mod error;
pub mod field;
pub mod fields;
pub mod primitives;

// Re-export main types and traits
pub use adapter::{Bound, Manual, ManualCodec, RawBytes, Serializer};
pub use buffer::{next_capacity, Buf, Slice};
pub use composite::{Composite, Placeholder, Recursive};
pub use error::Error;
pub use field::{ElementCodec, Field, FieldCodec, Get, Lens, Set};
pub use fields::{Delimited, DynArray, EnumCodec, FixedArray, FixedBytes, Scalar, ScalarInt};
pub use primitives::{Endian, Layout, Width};
