//! Field codec variants: scalars, enums, byte blocks, and arrays.

mod array;
mod bytes;
mod delimited;
mod enums;
mod scalar;

pub use array::{DynArray, FixedArray};
pub use bytes::FixedBytes;
pub use delimited::Delimited;
pub use enums::EnumCodec;
pub use scalar::{Scalar, ScalarInt};
