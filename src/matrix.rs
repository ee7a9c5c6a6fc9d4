//! Reading raw output files back into a matrix
//!
//! Neither output encoding stores its dimensions. The ascii file implies them through its
//! delimiters, while the binary file needs the column count that was reported when it was
//! written.

use crate::utils;
use crate::Error;

use ndarray::Array2;
use std::io::Read;

/// Problems with the contents of a raw matrix file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("a matrix needs at least one column")]
    ZeroColumns,
    #[error("{len} bytes do not form whole rows of {columns} float64 values")]
    Length { len: usize, columns: usize },
    #[error("line {line} has {found} columns, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: could not parse `{token}` as a number")]
    InvalidNumber { line: usize, token: String },
}

/// Decode a binary output file with `total_columns` columns
pub fn read_binary_matrix<R: Read>(mut reader: R, total_columns: usize) -> Result<Array2<f64>, Error> {
    if total_columns == 0 {
        return Err(MatrixError::ZeroColumns.into());
    }

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let row_len = total_columns * std::mem::size_of::<f64>();
    if bytes.len() % row_len != 0 {
        return Err(MatrixError::Length {
            len: bytes.len(),
            columns: total_columns,
        }
        .into());
    }

    let values: Vec<f64> = bytes
        .chunks_exact(std::mem::size_of::<f64>())
        .map(utils::bytes_to_float)
        .collect();
    let rows = bytes.len() / row_len;

    Ok(Array2::from_shape_vec((rows, total_columns), values)?)
}

/// Decode an ascii output file. An empty file is a matrix without rows.
pub fn read_ascii_matrix<R: Read>(mut reader: R) -> Result<Array2<f64>, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    if text.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }

    let mut columns = None;
    let mut values = Vec::new();
    let mut rows = 0;

    for (index, line) in text.split('\n').enumerate() {
        let line_number = index + 1;
        let mut found = 0;

        for token in line.split('\t') {
            let value: f64 = token.trim().parse().map_err(|_| MatrixError::InvalidNumber {
                line: line_number,
                token: token.to_string(),
            })?;
            values.push(value);
            found += 1;
        }

        match columns {
            None => columns = Some(found),
            Some(expected) if expected != found => {
                return Err(MatrixError::Ragged {
                    line: line_number,
                    expected,
                    found,
                }
                .into());
            }
            Some(_) => (),
        }

        rows += 1;
    }

    let columns = columns.unwrap_or(0);
    Ok(Array2::from_shape_vec((rows, columns), values)?)
}
