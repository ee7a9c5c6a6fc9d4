//! Writing a validated array collection as a flat row-major matrix
//!
//! For arrays `A` (a components), `B` (b components) and `C` (c components) with `m` tuples
//! each, the output is an `m x (a + b + c)` matrix:
//!
//! ```text
//! row 1:   A11 .. A1a   B11 .. B1b   C11 .. C1c
//! row 2:   A21 .. A2a   B21 .. B2b   C21 .. C2c
//! ...
//! row m:   Am1 .. Ama   Bm1 .. Bmb   Cm1 .. Cmc
//! ```

use crate::collection::{ArrayCollection, OutputLayout, ValidationError};
use crate::traits::NamedArray;
use crate::utils;
use crate::Error;

use derive_more::Display;
use std::io::Write;

/// separates the columns of a row in ascii output
const DELIMITER: u8 = b'\t';

/// separates the rows in ascii output
const ROW_SEPARATOR: u8 = b'\n';

/// significant digits written for every ascii value
pub const DECIMAL_PRECISION: usize = 16;

/// the encoding to use when writing the output matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Encoding {
    /// tab separated columns, newline separated rows, 16 significant digits
    #[default]
    #[display(fmt = "ascii")]
    Ascii,
    /// native-endian `f64` values back to back, no header
    #[display(fmt = "binary")]
    Binary,
}

impl Encoding {
    /// parse the command line flag: `0` for ascii, `1` for binary
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag.trim() {
            "0" => Some(Self::Ascii),
            "1" => Some(Self::Binary),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }
}

/// Write every value of `collection` to `sink` in row-major order.
///
/// `layout` must be the result of [`validate`](crate::validate) on the same collection; a
/// collection that still holds unreadable arrays or does not match the layout is rejected
/// before anything is written. Write failures abort immediately and whatever was already
/// written stays in the sink.
///
/// ```
/// use vtk_raw::{transcode, validate, ArrayCollection, DataArray, Encoding};
///
/// let a = DataArray::new("a", 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let b = DataArray::new("b", 1, vec![7.0, 8.0, 9.0]).unwrap();
/// let collection = ArrayCollection::from(vec![a, b]);
/// let layout = validate(&collection).unwrap();
///
/// let mut out = Vec::new();
/// transcode(&collection, &layout, Encoding::Ascii, &mut out).unwrap();
/// assert_eq!(out, b"1\t2\t7\n3\t4\t8\n5\t6\t9");
/// ```
pub fn transcode<A, W>(
    collection: &ArrayCollection<A>,
    layout: &OutputLayout,
    encoding: Encoding,
    sink: &mut W,
) -> Result<(), Error>
where
    A: NamedArray,
    W: Write,
{
    let arrays = collection.readable()?;
    check_layout(&arrays, layout)?;

    tracing::debug!(
        %encoding,
        rows = layout.total_rows,
        columns = layout.total_columns,
        "writing point data matrix"
    );

    match encoding {
        Encoding::Ascii => write_ascii(&arrays, layout, sink)?,
        Encoding::Binary => write_binary(&arrays, layout, sink)?,
    }

    Ok(())
}

fn check_layout<A: NamedArray>(arrays: &[&A], layout: &OutputLayout) -> Result<(), ValidationError> {
    let first = arrays.first().ok_or(ValidationError::EmptyDataset)?;

    let expected = OutputLayout {
        total_columns: arrays.iter().map(|array| array.component_count()).sum(),
        total_rows: first.tuple_count(),
    };

    let rows_agree = arrays
        .iter()
        .all(|array| array.tuple_count() == layout.total_rows);

    if expected != *layout || !rows_agree {
        return Err(ValidationError::LayoutMismatch {
            expected,
            found: *layout,
        });
    }

    Ok(())
}

/// In ascii mode the columns are separated by a tab and the rows by a new line. There is no
/// newline after the final row.
fn write_ascii<A: NamedArray, W: Write>(
    arrays: &[&A],
    layout: &OutputLayout,
    sink: &mut W,
) -> std::io::Result<()> {
    let mut row = String::with_capacity(layout.total_columns * 24);

    for tuple in 0..layout.total_rows {
        row.clear();

        for array in arrays {
            for component in 0..array.component_count() {
                if !row.is_empty() {
                    row.push(DELIMITER as char);
                }

                let value = array.component_value(tuple, component);
                utils::format_significant(value, DECIMAL_PRECISION, &mut row);
            }
        }

        if tuple > 0 {
            sink.write_all(&[ROW_SEPARATOR])?;
        }
        sink.write_all(row.as_bytes())?;
    }

    Ok(())
}

/// In binary mode there are no delimiters at all: every value is stored as a native-endian
/// double, one row after the other. Readers have to know the column count to make sense of
/// the file.
fn write_binary<A: NamedArray, W: Write>(
    arrays: &[&A],
    layout: &OutputLayout,
    sink: &mut W,
) -> std::io::Result<()> {
    let mut row = Vec::with_capacity(layout.total_columns * std::mem::size_of::<f64>());

    for tuple in 0..layout.total_rows {
        row.clear();

        for array in arrays {
            for component in 0..array.component_count() {
                let value = array.component_value(tuple, component);
                row.extend_from_slice(&value.to_ne_bytes());
            }
        }

        sink.write_all(&row)?;
    }

    Ok(())
}
