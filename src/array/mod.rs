//! container types for the point data arrays read from a dataset

mod buffer;
mod element;

pub use buffer::ArrayBuffer;
pub use element::{ByteOrder, ElementType};

use crate::traits::NamedArray;

/// Errors from constructing or combining a [`DataArray`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    #[error("array `{name}` must have at least one component")]
    ZeroComponents { name: String },
    #[error("array `{name}` holds {len} values, which is not a multiple of its {components} components")]
    Length {
        name: String,
        len: usize,
        components: usize,
    },
    #[error("could not parse `{token}` as {element}")]
    InvalidNumber { token: String, element: ElementType },
    #[error("cannot join array `{name}`: expected {expected} components of {expected_element}, found {found} components of {found_element}")]
    Mismatch {
        name: String,
        expected: usize,
        expected_element: ElementType,
        found: usize,
        found_element: ElementType,
    },
}

/// A named array of point data owned by the crate
///
/// Values are stored flat in tuple-major order: all components of tuple 0, then all
/// components of tuple 1, and so on. This is the order vtk files store them in.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    components: usize,
    buffer: ArrayBuffer,
}

impl DataArray {
    /// Construct an array from a flat buffer of `tuples * components` values
    ///
    /// ```
    /// use vtk_raw::DataArray;
    ///
    /// let rho = DataArray::new("rho", 1, vec![1.0f32, 2.0, 3.0]).unwrap();
    /// assert!(DataArray::new("uv", 2, vec![1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn new<B: Into<ArrayBuffer>>(
        name: impl Into<String>,
        components: usize,
        buffer: B,
    ) -> Result<Self, ArrayError> {
        let name = name.into();
        let buffer = buffer.into();

        if components == 0 {
            return Err(ArrayError::ZeroComponents { name });
        }

        if buffer.len() % components != 0 {
            return Err(ArrayError::Length {
                name,
                len: buffer.len(),
                components,
            });
        }

        Ok(Self {
            name,
            components,
            buffer,
        })
    }

    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    pub fn element_type(&self) -> ElementType {
        self.buffer.element_type()
    }

    /// Append the tuples of another array with the same shape and element type.
    ///
    /// Used to join the pieces of a multi-piece xml dataset.
    pub fn extend(&mut self, other: DataArray) -> Result<(), ArrayError> {
        let mismatch = |found: usize, found_element: ElementType| ArrayError::Mismatch {
            name: self.name.clone(),
            expected: self.components,
            expected_element: self.buffer.element_type(),
            found,
            found_element,
        };

        if other.components != self.components {
            return Err(mismatch(other.components, other.element_type()));
        }

        let err = mismatch(other.components, other.element_type());
        self.buffer.append(other.buffer).map_err(|_| err)
    }
}

impl NamedArray for DataArray {
    fn name(&self) -> &str {
        &self.name
    }

    fn component_count(&self) -> usize {
        self.components
    }

    fn tuple_count(&self) -> usize {
        self.buffer.len() / self.components
    }

    fn component_value(&self, tuple_index: usize, component_index: usize) -> f64 {
        self.buffer.value(tuple_index * self.components + component_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_and_components() {
        let array = DataArray::new("velocity", 3, vec![1i32, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(array.name(), "velocity");
        assert_eq!(array.component_count(), 3);
        assert_eq!(array.tuple_count(), 2);
        assert_eq!(array.component_value(0, 2), 3.0);
        assert_eq!(array.component_value(1, 0), 4.0);
        assert_eq!(array.element_type(), ElementType::Int32);
    }

    #[test]
    fn float32_widens_exactly() {
        let array = DataArray::new("p", 1, vec![0.1f32]).unwrap();
        assert_eq!(array.component_value(0, 0), 0.1f32 as f64);
    }

    #[test]
    fn empty_array_has_no_tuples() {
        let array = DataArray::new("empty", 4, Vec::<f64>::new()).unwrap();
        assert_eq!(array.tuple_count(), 0);
    }

    #[test]
    fn invalid_shapes() {
        assert_eq!(
            DataArray::new("a", 0, vec![1.0]),
            Err(ArrayError::ZeroComponents { name: "a".into() })
        );
        assert_eq!(
            DataArray::new("b", 2, vec![1.0, 2.0, 3.0]),
            Err(ArrayError::Length {
                name: "b".into(),
                len: 3,
                components: 2
            })
        );
    }

    #[test]
    fn extend_pieces() {
        let mut first = DataArray::new("u", 2, vec![1.0, 2.0]).unwrap();
        let second = DataArray::new("u", 2, vec![3.0, 4.0]).unwrap();

        first.extend(second).unwrap();

        assert_eq!(first.tuple_count(), 2);
        assert_eq!(first.component_value(1, 1), 4.0);

        let wrong_width = DataArray::new("u", 1, vec![5.0]).unwrap();
        assert!(matches!(
            first.extend(wrong_width),
            Err(ArrayError::Mismatch { found: 1, .. })
        ));

        let wrong_type = DataArray::new("u", 2, vec![5u8, 6]).unwrap();
        assert!(matches!(
            first.extend(wrong_type),
            Err(ArrayError::Mismatch {
                found_element: ElementType::UInt8,
                ..
            })
        ));
    }
}
