//! # Traits
//!
//! These are the seams of the crate. [`NamedArray`] is the only thing the validator and the
//! transcoder know about an array, so anything that can report a name, a shape and hand out
//! component values can be written to a raw file. [`PointDataSource`] is implemented by each
//! of the dataset readers, and [`Numeric`] describes the element types a vtk `DataArray` can
//! be stored as.

use crate::array::{ByteOrder, ElementType};
use crate::collection::ArrayCollection;
use crate::Error;

use std::path::Path;

/// Read access to a single named array of a point set.
///
/// An array is a table of `tuple_count` rows (one per point) and `component_count` columns
/// (1 for scalars, 3 for vectors and normals, 9 for tensors, ...). Values are always
/// handed out as `f64`, regardless of how they are stored.
///
/// ```
/// use vtk_raw::{DataArray, NamedArray};
///
/// let velocity = DataArray::new("velocity", 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
///
/// assert_eq!(velocity.tuple_count(), 2);
/// assert_eq!(velocity.component_value(1, 2), 6.0);
/// ```
pub trait NamedArray {
    /// the name of the array as it appears in the source dataset
    fn name(&self) -> &str;

    /// number of components in every tuple
    fn component_count(&self) -> usize;

    /// number of tuples (rows) stored in the array
    fn tuple_count(&self) -> usize;

    /// fetch a single component of a single tuple
    ///
    /// Callers must stay within `tuple_count()` and `component_count()`. Implementations
    /// are free to panic on out of bounds access.
    fn component_value(&self, tuple_index: usize, component_index: usize) -> f64;
}

impl<T: NamedArray + ?Sized> NamedArray for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn component_count(&self) -> usize {
        (**self).component_count()
    }

    fn tuple_count(&self) -> usize {
        (**self).tuple_count()
    }

    fn component_value(&self, tuple_index: usize, component_index: usize) -> f64 {
        (**self).component_value(tuple_index, component_index)
    }
}

impl<T: NamedArray + ?Sized> NamedArray for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn component_count(&self) -> usize {
        (**self).component_count()
    }

    fn tuple_count(&self) -> usize {
        (**self).tuple_count()
    }

    fn component_value(&self, tuple_index: usize, component_index: usize) -> f64 {
        (**self).component_value(tuple_index, component_index)
    }
}

/// A reader backend that extracts every point-associated array of a dataset file.
///
/// Each supported input format has its own implementation. The returned collection keeps the
/// order in which the arrays were declared in the file.
pub trait PointDataSource {
    fn read_point_data(&self, path: &Path) -> Result<ArrayCollection<crate::DataArray>, Error>;
}

/// Element types that can back a `DataArray`
pub trait Numeric:
    Copy + num_traits::AsPrimitive<f64> + num_traits::NumCast + std::str::FromStr
{
    /// the vtk element type this rust type is read from
    const ELEMENT: ElementType;

    /// number of bytes for a single element
    const SIZE: usize;

    /// decode a single value from the first `SIZE` bytes of `bytes`
    fn from_ordered_bytes(bytes: &[u8], order: ByteOrder) -> Self;

    /// parse a single ascii token
    ///
    /// integer arrays written by some tools contain values such as `3.0`, so a token that
    /// does not parse as `Self` directly is parsed as a float and cast.
    fn parse_token(token: &str) -> Option<Self> {
        token.parse::<Self>().ok().or_else(|| {
            token
                .parse::<f64>()
                .ok()
                .and_then(<Self as num_traits::NumCast>::from)
        })
    }
}
