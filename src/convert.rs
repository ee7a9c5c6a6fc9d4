//! The full conversion of one dataset file into one raw matrix file

use crate::collection::{self, ArrayShape, OutputLayout};
use crate::format::InputFormat;
use crate::transcode::{self, Encoding};
use crate::Error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// What to convert and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: Encoding,
}

impl ConvertOptions {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O, encoding: Encoding) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            encoding,
        }
    }
}

/// What was written by a successful [`convert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub arrays: Vec<ArrayShape>,
    pub layout: OutputLayout,
    pub output: PathBuf,
}

/// Read the point data of `options.input` and write it to `options.output` as a single
/// row-major matrix.
///
/// The output file is only created once the dataset has been read and validated, so a
/// dataset with mismatched arrays leaves no file behind. An io error while writing can leave
/// a partially written file.
pub fn convert(options: &ConvertOptions) -> Result<ConversionSummary, Error> {
    let format = InputFormat::from_path(&options.input)?;

    tracing::debug!(input = %options.input.display(), %format, "reading dataset");
    let collection = format.read(&options.input)?;

    let layout = collection::validate(&collection)?;

    let file = File::create(&options.output)?;
    let mut writer = BufWriter::new(file);
    transcode::transcode(&collection, &layout, options.encoding, &mut writer)?;
    writer.flush()?;

    let summary = ConversionSummary {
        arrays: collection.shapes(),
        layout,
        output: options.output.clone(),
    };

    tracing::info!(
        "{} arrays in column-wise order as above were written to: {}",
        summary.arrays.len(),
        summary.output.display()
    );
    tracing::info!("{}", summary.layout);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options() {
        let options = ConvertOptions::new("in.vti", "out.raw", Encoding::Binary);
        assert_eq!(options.input, PathBuf::from("in.vti"));
        assert!(options.encoding.is_binary());
    }
}
