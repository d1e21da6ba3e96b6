//! Predicate-terminated array codec.
//!
//! No count prefix and no terminator marker: elements are written
//! consecutively, and the read side stops after the first element the
//! predicate accepts (that element included). The predicate must therefore be
//! inferable from decoded content alone.
//!
//! This format cannot represent an empty sequence: serializing one is a
//! precondition violation, not an encoding of zero elements.

use crate::{error::Error, ElementCodec};
use std::fmt::Write;
use std::marker::PhantomData;

/// Array terminated by a per-element predicate.
pub struct Delimited<E, C> {
    elem: C,
    is_last: Box<dyn Fn(&E) -> bool + Send + Sync>,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C: ElementCodec<E>> Delimited<E, C> {
    pub fn new(elem: C, is_last: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Self {
            elem,
            is_last: Box::new(is_last),
            _marker: PhantomData,
        }
    }
}

impl<E, C: ElementCodec<E>> ElementCodec<Vec<E>> for Delimited<E, C> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len_of(&self, value: &Vec<E>) -> Result<usize, Error> {
        if value.is_empty() {
            return Err(Error::EmptyDelimited);
        }
        let mut total = 0;
        for item in value {
            total += self.elem.len_of(item)?;
        }
        Ok(total)
    }

    fn serialize(&self, value: &Vec<E>, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        if value.is_empty() {
            return Err(Error::EmptyDelimited);
        }
        let mut offset = offset;
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
        let mut out = Vec::new();
        let mut offset = offset;
        loop {
            let (item, next) = self.elem.deserialize(buf, offset, limit)?;
            // A zero-length element can never terminate the sequence.
            if next == offset {
                return Err(Error::EndOfBuffer {
                    offset,
                    needed: 1,
                    available: 0,
                });
            }
            offset = next;
            let last = (self.is_last)(&item);
            out.push(item);
            if last {
                return Ok((out, offset));
            }
        }
    }

    fn data_string(&self, value: &Vec<E>, out: &mut String) {
        out.push('[');
        for (i, item) in value.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.elem.data_string(item, out);
        }
        out.push(']');
    }

    fn data_small_string(&self, value: &Vec<E>, out: &mut String) {
        let _ = write!(out, "[{} elements]", value.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{composite::Composite, field::Lens, fields::Scalar, primitives::Width, Field};
    use std::sync::Arc;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Entry {
        tag: u8,
        value: u16,
    }

    fn entry_codec() -> Arc<Composite<Entry>> {
        Arc::new(Composite::new(vec![
            Scalar::<u8>::be_field("tag", Width::One, |e: &Entry| e.tag, |e, v| e.tag = v),
            Scalar::<u16>::be_field("value", Width::Two, |e: &Entry| e.value, |e, v| {
                e.value = v
            }),
        ]))
    }

    fn codec() -> Delimited<Entry, Arc<Composite<Entry>>> {
        Delimited::new(entry_codec(), |entry| entry.tag == 0)
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let value = vec![
            Entry { tag: 1, value: 10 },
            Entry { tag: 2, value: 20 },
            Entry { tag: 0, value: 30 },
        ];

        let len = codec.len_of(&value).unwrap();
        assert_eq!(len, 9);
        let mut buf = vec![0u8; len];
        let offset = codec.serialize(&value, &mut buf, 0).unwrap();
        assert_eq!(offset, len);

        let (decoded, offset) = codec.deserialize(&buf, 0, len).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(offset, len);
    }

    #[test]
    fn test_stops_at_terminator() {
        let codec = codec();
        // A(tag=1), B(tag=0) terminator, then unrelated trailing bytes that
        // must not be read.
        let buf = [1, 0, 10, 0, 0, 20, 0xDE, 0xAD, 0xBE, 0xEF];
        let (decoded, offset) = codec.deserialize(&buf, 0, buf.len()).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(
            decoded,
            vec![Entry { tag: 1, value: 10 }, Entry { tag: 0, value: 20 }]
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        let codec = codec();
        let empty: Vec<Entry> = Vec::new();
        let mut buf = [0u8; 8];
        assert!(matches!(
            codec.serialize(&empty, &mut buf, 0),
            Err(Error::EmptyDelimited)
        ));
        assert!(matches!(codec.len_of(&empty), Err(Error::EmptyDelimited)));
    }

    #[test]
    fn test_missing_terminator_hits_limit() {
        let codec = codec();
        // Two entries, neither with tag 0.
        let buf = [1, 0, 10, 2, 0, 20];
        assert!(matches!(
            codec.deserialize(&buf, 0, buf.len()),
            Err(Error::EndOfBuffer { .. })
        ));
    }

    #[test]
    fn test_as_field() {
        #[derive(Default, Debug, PartialEq)]
        struct Record {
            entries: Vec<Entry>,
        }

        let record_codec = Composite::new(vec![Field::boxed(
            "entries",
            codec(),
            Lens::new(
                |r: &Record| r.entries.clone(),
                |r: &mut Record, v| r.entries = v,
            ),
        )]);
        assert_eq!(record_codec.fixed_len(), None);

        let record = Record {
            entries: vec![Entry { tag: 1, value: 1 }, Entry { tag: 0, value: 2 }],
        };
        let len = record_codec.len_of(&record).unwrap();
        let mut buf = vec![0u8; len];
        record_codec.serialize(&record, &mut buf, 0).unwrap();

        let mut decoded = Record::default();
        let offset = record_codec.deserialize(&mut decoded, &buf, 0, len).unwrap();
        assert_eq!(offset, len);
        assert_eq!(decoded, record);
    }
}
