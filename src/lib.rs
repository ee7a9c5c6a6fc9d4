#![doc = include_str!("../README.md")]

pub mod array;
mod collection;
mod convert;
mod format;
mod matrix;
pub mod parse;
pub mod prelude;
mod traits;
mod transcode;
mod utils;

pub use array::{ArrayBuffer, ArrayError, ByteOrder, DataArray, ElementType};
pub use collection::validate;
pub use collection::{ArrayCollection, ArrayEntry, ArrayShape, OutputLayout, ValidationError};
pub use convert::{convert, ConversionSummary, ConvertOptions};
pub use format::InputFormat;
pub use matrix::{read_ascii_matrix, read_binary_matrix, MatrixError};
pub use parse::ParseError;
pub use traits::{NamedArray, Numeric, PointDataSource};
pub use transcode::{transcode, Encoding, DECIMAL_PRECISION};

pub use ndarray;

use std::path::PathBuf;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Error while parsing the input dataset: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Unsupported input format for `{}`, expected a .vtk, .vti, .vtp or .vtu file", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Invalid data array: {0}")]
    Array(#[from] ArrayError),
    #[error("Invalid raw matrix: {0}")]
    Matrix(#[from] MatrixError),
    #[error("Could not shape the raw matrix: `{0}`")]
    Shape(#[from] ndarray::ShapeError),
}
