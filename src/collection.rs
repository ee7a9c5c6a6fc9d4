//! The ordered set of point data arrays read from one dataset, and its validation
//!
//! Every array of a collection becomes a group of adjacent columns in the output matrix, in
//! the order the arrays were declared in the source file. For the matrix to exist at all,
//! every array has to have the same number of tuples.

use crate::traits::NamedArray;

use std::fmt;

/// A single slot of an [`ArrayCollection`]
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayEntry<A> {
    /// an array the reader could expose numerically
    Readable(A),
    /// an array the reader found but could not expose (non-numeric or corrupt)
    Unreadable { name: String },
}

impl<A> ArrayEntry<A> {
    pub fn as_readable(&self) -> Option<&A> {
        match self {
            Self::Readable(array) => Some(array),
            Self::Unreadable { .. } => None,
        }
    }
}

/// Ordered arrays of a dataset. The order determines the column grouping of the output.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayCollection<A> {
    entries: Vec<ArrayEntry<A>>,
}

impl<A> Default for ArrayCollection<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A> ArrayCollection<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, array: A) {
        self.entries.push(ArrayEntry::Readable(array));
    }

    /// record an array that exists in the source but cannot be read
    pub fn push_unreadable(&mut self, name: impl Into<String>) {
        self.entries.push(ArrayEntry::Unreadable { name: name.into() });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArrayEntry<A>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArrayEntry<A>> {
        self.entries.iter()
    }
}

impl<A> FromIterator<A> for ArrayCollection<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(ArrayEntry::Readable).collect(),
        }
    }
}

impl<A> From<Vec<A>> for ArrayCollection<A> {
    fn from(arrays: Vec<A>) -> Self {
        arrays.into_iter().collect()
    }
}

impl<A: NamedArray> ArrayCollection<A> {
    /// shape of every readable array, without validating anything
    pub fn shapes(&self) -> Vec<ArrayShape> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_readable().map(|a| ArrayShape::new(index, a)))
            .collect()
    }

    /// every array of the collection, or the position of the first unreadable one
    pub fn readable(&self) -> Result<Vec<&A>, ValidationError> {
        self.entries
            .iter()
            .enumerate()
            .map(|(array_index, entry)| {
                entry
                    .as_readable()
                    .ok_or(ValidationError::UnreadableArray { array_index })
            })
            .collect()
    }
}

/// Dimensions of the output matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputLayout {
    /// sum of the component counts of every array
    pub total_columns: usize,
    /// tuple count shared by every array
    pub total_rows: usize,
}

impl OutputLayout {
    /// number of values in the matrix
    pub fn value_count(&self) -> usize {
        self.total_rows * self.total_columns
    }

    /// size of the binary encoding in bytes
    pub fn binary_len(&self) -> usize {
        self.value_count() * std::mem::size_of::<f64>()
    }
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rows: {}, Columns: {}", self.total_rows, self.total_columns)
    }
}

/// Diagnostic description of a single array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayShape {
    pub index: usize,
    pub name: String,
    pub component_count: usize,
    pub tuple_count: usize,
}

impl ArrayShape {
    pub fn new<A: NamedArray + ?Sized>(index: usize, array: &A) -> Self {
        Self {
            index,
            name: array.name().to_string(),
            component_count: array.component_count(),
            tuple_count: array.tuple_count(),
        }
    }
}

impl fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Array: {}, NumberOfComponents: {}, NumberOfTuples: {}, ArrayName: {}",
            self.index, self.component_count, self.tuple_count, self.name
        )
    }
}

/// Reasons a collection cannot be written as a single matrix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("dataset has no point data arrays")]
    EmptyDataset,
    #[error("inconsistent dataset: array {array_index} has {found} tuples, expected {expected}")]
    InconsistentTupleCount {
        array_index: usize,
        expected: usize,
        found: usize,
    },
    #[error("array {array_index} could not be read from the dataset")]
    UnreadableArray { array_index: usize },
    #[error("array {array_index} has no components")]
    ZeroComponents { array_index: usize },
    #[error("output layout ({found}) does not match the arrays ({expected})")]
    LayoutMismatch {
        expected: OutputLayout,
        found: OutputLayout,
    },
}

/// Check that a collection forms a matrix and compute its dimensions.
///
/// Emits one `info` record per array. Unreadable entries are logged and the scan goes on so
/// every array is reported, but the call still fails. A tuple count mismatch or an array
/// without components stops the scan. When several problems exist, the one at the lowest
/// position is returned.
///
/// ```
/// use vtk_raw::{validate, ArrayCollection, DataArray, ValidationError};
///
/// let a = DataArray::new("a", 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let b = DataArray::new("b", 1, vec![7.0, 8.0, 9.0]).unwrap();
/// let layout = validate(&ArrayCollection::from(vec![a, b])).unwrap();
/// assert_eq!((layout.total_rows, layout.total_columns), (3, 3));
///
/// let empty = ArrayCollection::<DataArray>::new();
/// assert_eq!(validate(&empty), Err(ValidationError::EmptyDataset));
/// ```
pub fn validate<A: NamedArray>(
    collection: &ArrayCollection<A>,
) -> Result<OutputLayout, ValidationError> {
    if collection.is_empty() {
        return Err(ValidationError::EmptyDataset);
    }

    let mut first_unreadable: Option<usize> = None;
    let mut total_rows: Option<usize> = None;
    let mut total_columns = 0;

    for (index, entry) in collection.iter().enumerate() {
        let array = match entry {
            ArrayEntry::Readable(array) => array,
            ArrayEntry::Unreadable { name } => {
                tracing::error!(array = index, name = %name, "array is unreadable");
                first_unreadable.get_or_insert(index);
                continue;
            }
        };

        let shape = ArrayShape::new(index, array);
        tracing::info!("{shape}");

        // an earlier unreadable entry takes precedence over anything found here
        let fail = |err: ValidationError| match first_unreadable {
            Some(array_index) => ValidationError::UnreadableArray { array_index },
            None => err,
        };

        if shape.component_count == 0 {
            return Err(fail(ValidationError::ZeroComponents { array_index: index }));
        }

        match total_rows {
            None => total_rows = Some(shape.tuple_count),
            Some(expected) if expected != shape.tuple_count => {
                return Err(fail(ValidationError::InconsistentTupleCount {
                    array_index: index,
                    expected,
                    found: shape.tuple_count,
                }));
            }
            Some(_) => (),
        }

        total_columns += shape.component_count;
    }

    match (first_unreadable, total_rows) {
        (Some(array_index), _) => Err(ValidationError::UnreadableArray { array_index }),
        (None, Some(total_rows)) => Ok(OutputLayout {
            total_columns,
            total_rows,
        }),
        (None, None) => Err(ValidationError::EmptyDataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataArray;

    fn array(name: &str, components: usize, tuples: usize) -> DataArray {
        let values: Vec<f64> = (0..components * tuples).map(|i| i as f64).collect();
        DataArray::new(name, components, values).unwrap()
    }

    #[test]
    fn shared_tuple_count() {
        let collection = ArrayCollection::from(vec![
            array("scalar", 1, 5),
            array("vector", 3, 5),
            array("tensor", 9, 5),
        ]);

        let layout = validate(&collection).unwrap();

        assert_eq!(
            layout,
            OutputLayout {
                total_columns: 13,
                total_rows: 5
            }
        );
        assert_eq!(layout.binary_len(), 13 * 5 * 8);
    }

    #[test]
    fn zero_tuples_is_valid() {
        let collection = ArrayCollection::from(vec![array("a", 2, 0), array("b", 1, 0)]);
        let layout = validate(&collection).unwrap();

        assert_eq!(layout.total_rows, 0);
        assert_eq!(layout.total_columns, 3);
    }

    #[test]
    fn empty_dataset() {
        let collection = ArrayCollection::<DataArray>::new();
        assert_eq!(validate(&collection), Err(ValidationError::EmptyDataset));
    }

    #[test]
    fn first_mismatch_is_reported() {
        let collection = ArrayCollection::from(vec![
            array("a", 1, 3),
            array("b", 2, 3),
            array("c", 1, 4),
            array("d", 1, 5),
        ]);

        assert_eq!(
            validate(&collection),
            Err(ValidationError::InconsistentTupleCount {
                array_index: 2,
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn unreadable_does_not_stop_the_scan() {
        let mut collection = ArrayCollection::new();
        collection.push(array("a", 1, 3));
        collection.push_unreadable("labels");
        collection.push(array("b", 1, 3));
        collection.push_unreadable("names");

        assert_eq!(
            validate(&collection),
            Err(ValidationError::UnreadableArray { array_index: 1 })
        );
        // the readable arrays are still reported
        assert_eq!(collection.shapes().len(), 2);
        assert_eq!(collection.shapes()[1].index, 2);
    }

    #[test]
    fn lowest_position_wins() {
        let mut unreadable_first = ArrayCollection::new();
        unreadable_first.push(array("a", 1, 3));
        unreadable_first.push_unreadable("labels");
        unreadable_first.push(array("b", 1, 4));

        assert_eq!(
            validate(&unreadable_first),
            Err(ValidationError::UnreadableArray { array_index: 1 })
        );

        let mut mismatch_first = ArrayCollection::new();
        mismatch_first.push(array("a", 1, 3));
        mismatch_first.push(array("b", 1, 4));
        mismatch_first.push_unreadable("labels");

        assert_eq!(
            validate(&mismatch_first),
            Err(ValidationError::InconsistentTupleCount {
                array_index: 1,
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn unreadable_first_entry() {
        let mut collection = ArrayCollection::new();
        collection.push_unreadable("labels");
        collection.push(array("a", 1, 3));

        assert_eq!(
            validate(&collection),
            Err(ValidationError::UnreadableArray { array_index: 0 })
        );
        assert!(collection.readable().is_err());
    }

    #[test]
    fn shape_report() {
        let collection = ArrayCollection::from(vec![array("velocity", 3, 2)]);
        let shapes = collection.shapes();

        assert_eq!(
            shapes[0].to_string(),
            "Array: 0, NumberOfComponents: 3, NumberOfTuples: 2, ArrayName: velocity"
        );
    }

    struct Widthless;

    impl NamedArray for Widthless {
        fn name(&self) -> &str {
            "widthless"
        }
        fn component_count(&self) -> usize {
            0
        }
        fn tuple_count(&self) -> usize {
            1
        }
        fn component_value(&self, _: usize, _: usize) -> f64 {
            0.0
        }
    }

    #[test]
    fn zero_components() {
        let collection = ArrayCollection::from(vec![Widthless]);
        assert_eq!(
            validate(&collection),
            Err(ValidationError::ZeroComponents { array_index: 0 })
        );
    }
}
