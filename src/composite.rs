//! Whole-record codecs assembled from an ordered list of field codecs.
//!
//! A [`Composite`] applies its fields left-to-right for both serialize and
//! deserialize, threading the offset cursor forward; the two passes are exact
//! mirrors. Composites are built once, carry only derived metadata, and are
//! shared freely across threads.

use crate::{
    error::Error,
    field::{ElementCodec, FieldCodec},
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Weak};

/// An ordered aggregation of field codecs describing one record type.
pub struct Composite<V> {
    fields: Vec<Box<dyn FieldCodec<V>>>,
    fixed_len: Option<usize>,
}

impl<V> Composite<V> {
    /// Builds a composite from field codecs in declaration order.
    ///
    /// The derived fixed length is the sum of all member fixed lengths, or
    /// unfixed if any member is unfixed. Every member is inspected; the fold
    /// does not short-circuit.
    pub fn new(fields: Vec<Box<dyn FieldCodec<V>>>) -> Self {
        let mut fixed_len = Some(0usize);
        for field in &fields {
            fixed_len = match (fixed_len, field.fixed_len()) {
                (Some(total), Some(len)) => Some(total + len),
                _ => None,
            };
        }
        Self { fields, fixed_len }
    }

    /// Two-phase construction for a record type that contains itself.
    ///
    /// The builder receives a [`Placeholder`] for the composite under
    /// construction and must take exactly one [`Recursive`] codec from it
    /// (via [`Placeholder::codec`]); any other count is a construction
    /// error.
    pub fn recursive(
        build: impl FnOnce(&Placeholder<V>) -> Vec<Box<dyn FieldCodec<V>>>,
    ) -> Result<Arc<Self>, Error> {
        let uses = Rc::new(Cell::new(0usize));
        let inner_uses = uses.clone();
        let composite = Arc::new_cyclic(|weak| {
            let placeholder = Placeholder {
                inner: weak.clone(),
                uses: inner_uses,
            };
            Self::new(build(&placeholder))
        });
        match uses.get() {
            1 => Ok(composite),
            n => Err(Error::PlaceholderCount(n)),
        }
    }

    /// `Some(n)` if every instance serializes to exactly `n` bytes.
    pub fn fixed_len(&self) -> Option<usize> {
        self.fixed_len
    }

    /// Number of fields, in declaration order.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Bytes required to serialize `value`. O(1) when the composite is
    /// fixed-length.
    pub fn len_of(&self, value: &V) -> Result<usize, Error> {
        if let Some(len) = self.fixed_len {
            return Ok(len);
        }
        let mut total = 0;
        for field in &self.fields {
            total += field.len_of(value)?;
        }
        Ok(total)
    }

    /// Serializes every field in declaration order, returning the final
    /// offset. No rollback: a failure partway leaves earlier fields written.
    pub fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let mut offset = offset;
        for field in &self.fields {
            offset = field.serialize(value, buf, offset)?;
        }
        Ok(offset)
    }

    /// Mirrors [`Composite::serialize`]: decodes every field in declaration
    /// order into `value`. On success each field has been assigned exactly
    /// once; on error the instance may be partially populated and should be
    /// discarded.
    pub fn deserialize(
        &self,
        value: &mut V,
        buf: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<usize, Error> {
        let mut offset = offset;
        for field in &self.fields {
            offset = field.deserialize(value, buf, offset, limit)?;
        }
        Ok(offset)
    }

    /// Full rendering of `value`, fields in declaration order.
    pub fn data_string(&self, value: &V) -> String {
        let mut out = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            field.data_string(value, &mut out);
        }
        out
    }

    /// Compact rendering: arrays and byte blocks are summarized.
    pub fn data_small_string(&self, value: &V) -> String {
        let mut out = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            field.data_small_string(value, &mut out);
        }
        out
    }
}

// A composite is itself an element codec, so records nest as sub-records and
// array elements. Decoding starts from a default instance.
impl<V: Default> ElementCodec<V> for Composite<V> {
    fn fixed_len(&self) -> Option<usize> {
        self.fixed_len
    }

    fn len_of(&self, value: &V) -> Result<usize, Error> {
        Composite::len_of(self, value)
    }

    fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        Composite::serialize(self, value, buf, offset)
    }

    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(V, usize), Error> {
        let mut value = V::default();
        let offset = Composite::deserialize(self, &mut value, buf, offset, limit)?;
        Ok((value, offset))
    }

    fn data_string(&self, value: &V, out: &mut String) {
        out.push_str("{ ");
        out.push_str(&Composite::data_string(self, value));
        out.push_str(" }");
    }

    fn data_small_string(&self, value: &V, out: &mut String) {
        out.push_str("{ ");
        out.push_str(&Composite::data_small_string(self, value));
        out.push_str(" }");
    }
}

/// Handle to a composite under construction, passed to the builder closure
/// of [`Composite::recursive`].
pub struct Placeholder<V> {
    inner: Weak<Composite<V>>,
    uses: Rc<Cell<usize>>,
}

impl<V> Placeholder<V> {
    /// Takes the recursive element codec for the composite being built.
    pub fn codec(&self) -> Recursive<V> {
        self.uses.set(self.uses.get() + 1);
        Recursive {
            inner: self.inner.clone(),
        }
    }
}

/// Element codec that defers to a composite patched in after construction.
///
/// Always unfixed: a self-containing record cannot have a fixed total
/// length, and reporting `None` keeps the enclosing fixed-length derivation
/// from recursing.
pub struct Recursive<V> {
    inner: Weak<Composite<V>>,
}

impl<V> Recursive<V> {
    fn upgrade(&self) -> Result<Arc<Composite<V>>, Error> {
        self.inner.upgrade().ok_or(Error::UnboundPlaceholder)
    }
}

impl<V: Default> ElementCodec<V> for Recursive<V> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len_of(&self, value: &V) -> Result<usize, Error> {
        self.upgrade()?.len_of(value)
    }

    fn serialize(&self, value: &V, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        self.upgrade()?.serialize(value, buf, offset)
    }

    fn deserialize(&self, buf: &[u8], offset: usize, limit: usize) -> Result<(V, usize), Error> {
        let composite = self.upgrade()?;
        let mut value = V::default();
        let offset = Composite::deserialize(&*composite, &mut value, buf, offset, limit)?;
        Ok((value, offset))
    }

    fn data_string(&self, value: &V, out: &mut String) {
        match self.upgrade() {
            Ok(composite) => ElementCodec::data_string(&*composite, value, out),
            Err(_) => out.push_str("<unbound>"),
        }
    }

    fn data_small_string(&self, value: &V, out: &mut String) {
        match self.upgrade() {
            Ok(composite) => ElementCodec::data_small_string(&*composite, value, out),
            Err(_) => out.push_str("<unbound>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        field::Lens,
        fields::{DynArray, FixedArray, Scalar},
        primitives::Width,
        Field,
    };

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Header {
        version: u8,
        session: u32,
    }

    fn header_codec() -> Composite<Header> {
        Composite::new(vec![
            Scalar::<u8>::be_field("version", Width::One, |h: &Header| h.version, |h, v| {
                h.version = v
            }),
            Scalar::<u32>::be_field("session", Width::Four, |h: &Header| h.session, |h, v| {
                h.session = v
            }),
        ])
    }

    #[test]
    fn test_fixed_len_sums() {
        assert_eq!(header_codec().fixed_len(), Some(5));
    }

    #[test]
    fn test_any_unfixed_member_makes_unfixed() {
        let array_field = || {
            Field::boxed(
                "items",
                FixedArray::new(1, Scalar::<u8>::be(Width::One)).unwrap(),
                Lens::new(
                    |h: &Vec<u8>| h.clone(),
                    |h: &mut Vec<u8>, v: Vec<u8>| *h = v,
                ),
            )
        };
        let scalar_field = |name| {
            Scalar::<u8>::be_field(name, Width::One, |h: &Vec<u8>| h.len() as u8, |_, _| {})
        };

        // Unfixed member first, middle, and last.
        let first = Composite::new(vec![array_field(), scalar_field("a"), scalar_field("b")]);
        let middle = Composite::new(vec![scalar_field("a"), array_field(), scalar_field("b")]);
        let last = Composite::new(vec![scalar_field("a"), scalar_field("b"), array_field()]);
        assert_eq!(first.fixed_len(), None);
        assert_eq!(middle.fixed_len(), None);
        assert_eq!(last.fixed_len(), None);
    }

    #[test]
    fn test_round_trip() {
        let codec = header_codec();
        let header = Header {
            version: 2,
            session: 0xCAFEBABE,
        };

        let len = codec.len_of(&header).unwrap();
        assert_eq!(len, 5);
        let mut buf = vec![0u8; len];
        let offset = codec.serialize(&header, &mut buf, 0).unwrap();
        assert_eq!(offset, len);
        assert_eq!(buf, [0x02, 0xCA, 0xFE, 0xBA, 0xBE]);

        let mut decoded = Header::default();
        let offset = codec.deserialize(&mut decoded, &buf, 0, len).unwrap();
        assert_eq!(offset, len);
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_offset_threading() {
        let codec = header_codec();
        let header = Header {
            version: 1,
            session: 7,
        };
        let mut buf = [0xEEu8; 12];
        let offset = codec.serialize(&header, &mut buf, 3).unwrap();
        assert_eq!(offset, 8);
        // Bytes outside [3, 8) untouched.
        assert_eq!(buf[2], 0xEE);
        assert_eq!(buf[8], 0xEE);

        let mut decoded = Header::default();
        let offset = codec.deserialize(&mut decoded, &buf, 3, 8).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_truncated_buffer() {
        let codec = header_codec();
        let buf = [0x02, 0xCA, 0xFE];
        let mut decoded = Header::default();
        assert!(matches!(
            codec.deserialize(&mut decoded, &buf, 0, 3),
            Err(Error::EndOfBuffer { .. })
        ));
    }

    #[test]
    fn test_data_strings() {
        let codec = header_codec();
        let header = Header {
            version: 2,
            session: 9,
        };
        assert_eq!(codec.data_string(&header), "version=2 session=9");
        assert_eq!(codec.data_small_string(&header), "version=2 session=9");
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Node {
        value: u8,
        children: Vec<Node>,
    }

    fn node_codec() -> Arc<Composite<Node>> {
        Composite::recursive(|placeholder| {
            vec![
                Scalar::<u8>::be_field("value", Width::One, |n: &Node| n.value, |n, v| {
                    n.value = v
                }),
                Field::boxed(
                    "children",
                    DynArray::new(1, placeholder.codec()).unwrap(),
                    Lens::new(
                        |n: &Node| n.children.clone(),
                        |n: &mut Node, v| n.children = v,
                    ),
                ),
            ]
        })
        .unwrap()
    }

    #[test]
    fn test_recursive_round_trip() {
        let codec = node_codec();
        assert_eq!(codec.fixed_len(), None);

        let tree = Node {
            value: 1,
            children: vec![
                Node {
                    value: 2,
                    children: vec![Node {
                        value: 4,
                        children: vec![],
                    }],
                },
                Node {
                    value: 3,
                    children: vec![],
                },
            ],
        };

        let len = Composite::len_of(&*codec, &tree).unwrap();
        // Each node is 1 value byte + 1 count byte.
        assert_eq!(len, 8);
        let mut buf = vec![0u8; len];
        let offset = Composite::serialize(&*codec, &tree, &mut buf, 0).unwrap();
        assert_eq!(offset, len);
        assert_eq!(buf, [1, 2, 2, 1, 4, 0, 3, 0]);

        let mut decoded = Node::default();
        let offset = Composite::deserialize(&*codec, &mut decoded, &buf, 0, len).unwrap();
        assert_eq!(offset, len);
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_placeholder_must_be_taken_once() {
        let zero = Composite::<Node>::recursive(|_| {
            vec![Scalar::<u8>::be_field(
                "value",
                Width::One,
                |n: &Node| n.value,
                |n, v| n.value = v,
            )]
        });
        assert!(matches!(zero, Err(Error::PlaceholderCount(0))));

        let two = Composite::<Node>::recursive(|placeholder| {
            let first = placeholder.codec();
            let second = placeholder.codec();
            vec![
                Field::boxed(
                    "a",
                    DynArray::new(1, first).unwrap(),
                    Lens::new(
                        |n: &Node| n.children.clone(),
                        |n: &mut Node, v| n.children = v,
                    ),
                ),
                Field::boxed(
                    "b",
                    DynArray::new(1, second).unwrap(),
                    Lens::new(
                        |n: &Node| n.children.clone(),
                        |n: &mut Node, v| n.children = v,
                    ),
                ),
            ]
        });
        assert!(matches!(two, Err(Error::PlaceholderCount(2))));
    }

    #[test]
    fn test_unbound_placeholder() {
        // Leak a recursive codec out of a failed construction: its weak
        // reference is dead.
        let mut escaped = None;
        let _ = Composite::<Node>::recursive(|placeholder| {
            escaped = Some(placeholder.codec());
            vec![]
        });
        let recursive = escaped.unwrap();
        let node = Node::default();
        assert!(matches!(
            recursive.len_of(&node),
            Err(Error::UnboundPlaceholder)
        ));
    }
}
