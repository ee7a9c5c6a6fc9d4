use super::{ArrayError, ByteOrder, ElementType};
use crate::traits::Numeric;

use derive_more::From;
use num_traits::AsPrimitive;

/// Storage for the values of a `DataArray`, kept in the element type of the source file
#[derive(Debug, Clone, PartialEq, From)]
pub enum ArrayBuffer {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// run `$body` with `$values` bound to the inner vector, whatever the element type
macro_rules! with_values {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            ArrayBuffer::Int8($values) => $body,
            ArrayBuffer::UInt8($values) => $body,
            ArrayBuffer::Int16($values) => $body,
            ArrayBuffer::UInt16($values) => $body,
            ArrayBuffer::Int32($values) => $body,
            ArrayBuffer::UInt32($values) => $body,
            ArrayBuffer::Int64($values) => $body,
            ArrayBuffer::UInt64($values) => $body,
            ArrayBuffer::Float32($values) => $body,
            ArrayBuffer::Float64($values) => $body,
        }
    };
}

/// run `$body` with `$ty` aliased to the rust type of an `ElementType`
macro_rules! with_element {
    ($element:expr, $ty:ident => $body:expr) => {
        match $element {
            ElementType::Int8 => {
                type $ty = i8;
                $body
            }
            ElementType::UInt8 => {
                type $ty = u8;
                $body
            }
            ElementType::Int16 => {
                type $ty = i16;
                $body
            }
            ElementType::UInt16 => {
                type $ty = u16;
                $body
            }
            ElementType::Int32 => {
                type $ty = i32;
                $body
            }
            ElementType::UInt32 => {
                type $ty = u32;
                $body
            }
            ElementType::Int64 => {
                type $ty = i64;
                $body
            }
            ElementType::UInt64 => {
                type $ty = u64;
                $body
            }
            ElementType::Float32 => {
                type $ty = f32;
                $body
            }
            ElementType::Float64 => {
                type $ty = f64;
                $body
            }
        }
    };
}

impl ArrayBuffer {
    /// decode packed binary values. Trailing bytes that do not fill a whole element are ignored.
    pub fn decode(element: ElementType, bytes: &[u8], order: ByteOrder) -> Self {
        with_element!(element, T => ArrayBuffer::from(decode_values::<T>(bytes, order)))
    }

    /// parse whitespace separated ascii tokens
    pub fn parse_ascii<'a, I>(element: ElementType, tokens: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        with_element!(element, T => parse_values::<T, _>(tokens).map(ArrayBuffer::from))
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int8(_) => ElementType::Int8,
            Self::UInt8(_) => ElementType::UInt8,
            Self::Int16(_) => ElementType::Int16,
            Self::UInt16(_) => ElementType::UInt16,
            Self::Int32(_) => ElementType::Int32,
            Self::UInt32(_) => ElementType::UInt32,
            Self::Int64(_) => ElementType::Int64,
            Self::UInt64(_) => ElementType::UInt64,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
        }
    }

    /// total number of values (tuples * components)
    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// value at a flat index, widened to `f64`
    ///
    /// panics if `index` is out of bounds
    pub fn value(&self, index: usize) -> f64 {
        with_values!(self, values => AsPrimitive::<f64>::as_(values[index]))
    }

    /// value at a flat index, widened to `f64`
    pub fn get(&self, index: usize) -> Option<f64> {
        with_values!(self, values => values.get(index).map(|value| AsPrimitive::<f64>::as_(*value)))
    }

    /// append the values of another buffer of the same element type
    pub(crate) fn append(&mut self, other: ArrayBuffer) -> Result<(), ArrayBuffer> {
        match (self, other) {
            (Self::Int8(a), Self::Int8(b)) => a.extend(b),
            (Self::UInt8(a), Self::UInt8(b)) => a.extend(b),
            (Self::Int16(a), Self::Int16(b)) => a.extend(b),
            (Self::UInt16(a), Self::UInt16(b)) => a.extend(b),
            (Self::Int32(a), Self::Int32(b)) => a.extend(b),
            (Self::UInt32(a), Self::UInt32(b)) => a.extend(b),
            (Self::Int64(a), Self::Int64(b)) => a.extend(b),
            (Self::UInt64(a), Self::UInt64(b)) => a.extend(b),
            (Self::Float32(a), Self::Float32(b)) => a.extend(b),
            (Self::Float64(a), Self::Float64(b)) => a.extend(b),
            (_, other) => return Err(other),
        }

        Ok(())
    }
}

fn decode_values<T: Numeric>(bytes: &[u8], order: ByteOrder) -> Vec<T> {
    bytes
        .chunks_exact(T::SIZE)
        .map(|chunk| T::from_ordered_bytes(chunk, order))
        .collect()
}

fn parse_values<'a, T, I>(tokens: I) -> Result<Vec<T>, ArrayError>
where
    T: Numeric,
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|token| {
            T::parse_token(token).ok_or_else(|| ArrayError::InvalidNumber {
                token: token.to_string(),
                element: T::ELEMENT,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_big_endian_floats() {
        let mut bytes = Vec::new();
        bytes.extend(1.5f32.to_be_bytes());
        bytes.extend((-2.0f32).to_be_bytes());
        // trailing partial element
        bytes.push(0);

        let buffer = ArrayBuffer::decode(ElementType::Float32, &bytes, ByteOrder::BigEndian);

        assert_eq!(buffer, ArrayBuffer::Float32(vec![1.5, -2.0]));
        assert_eq!(buffer.value(1), -2.0);
    }

    #[test]
    fn parse_integers() {
        let buffer = ArrayBuffer::parse_ascii(ElementType::Int16, "1 -2 3".split(' ')).unwrap();

        assert_eq!(buffer, ArrayBuffer::Int16(vec![1, -2, 3]));
        assert_eq!(buffer.element_type(), ElementType::Int16);
        assert_eq!(buffer.get(1), Some(-2.0));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn parse_bad_token() {
        let err = ArrayBuffer::parse_ascii(ElementType::UInt8, ["1", "two"]).unwrap_err();

        assert_eq!(
            err,
            ArrayError::InvalidNumber {
                token: "two".into(),
                element: ElementType::UInt8
            }
        );
    }

    #[test]
    fn append_requires_same_element_type() {
        let mut buffer = ArrayBuffer::from(vec![1.0f64, 2.0]);
        buffer.append(ArrayBuffer::from(vec![3.0f64])).unwrap();
        assert_eq!(buffer.len(), 3);

        let rejected = buffer.append(ArrayBuffer::from(vec![4i32])).unwrap_err();
        assert_eq!(rejected.element_type(), ElementType::Int32);
        assert_eq!(buffer.len(), 3);
    }
}
