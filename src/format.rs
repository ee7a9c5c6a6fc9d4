use crate::array::DataArray;
use crate::collection::ArrayCollection;
use crate::parse::{LegacyReader, XmlDataset, XmlReader};
use crate::traits::PointDataSource;
use crate::Error;

use derive_more::Display;
use std::path::Path;

/// The dataset formats that can be read, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InputFormat {
    /// legacy structured points, `.vtk`
    #[display(fmt = "vtk")]
    Legacy,
    /// xml image data, `.vti`
    #[display(fmt = "vti")]
    ImageData,
    /// xml poly data, `.vtp`
    #[display(fmt = "vtp")]
    PolyData,
    /// xml unstructured grid, `.vtu`
    #[display(fmt = "vtu")]
    UnstructuredGrid,
}

impl InputFormat {
    /// match an extension (without the dot) exactly, ignoring case
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "vtk" => Some(Self::Legacy),
            "vti" => Some(Self::ImageData),
            "vtp" => Some(Self::PolyData),
            "vtu" => Some(Self::UnstructuredGrid),
            _ => None,
        }
    }

    /// pick the format from the text after the last `.` of the file name
    ///
    /// ```
    /// use vtk_raw::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_path("flow/out_0010.VTI").unwrap(), InputFormat::ImageData);
    /// assert!(InputFormat::from_path("flow/out.vtk.bak").is_err());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| Error::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    /// the reader backend for this format
    pub fn source(&self) -> Box<dyn PointDataSource> {
        match self {
            Self::Legacy => Box::new(LegacyReader),
            Self::ImageData => Box::new(XmlReader::new(XmlDataset::ImageData)),
            Self::PolyData => Box::new(XmlReader::new(XmlDataset::PolyData)),
            Self::UnstructuredGrid => Box::new(XmlReader::new(XmlDataset::UnstructuredGrid)),
        }
    }

    /// read every point data array of the file at `path`
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<ArrayCollection<DataArray>, Error> {
        self.source().read_point_data(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        assert_eq!(InputFormat::from_path("a.vtk").unwrap(), InputFormat::Legacy);
        assert_eq!(InputFormat::from_path("dir.vtu/a.VTP").unwrap(), InputFormat::PolyData);
        assert_eq!(
            InputFormat::from_path("/tmp/run.1.vtu").unwrap(),
            InputFormat::UnstructuredGrid
        );
    }

    #[test]
    fn substrings_do_not_match() {
        for path in ["a.vtkx", "vtk", "a.xvti", "a.vtp.gz", "a.", "a.vt"] {
            let err = InputFormat::from_path(path).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat { .. }), "{path}");
        }
    }

    #[test]
    fn display_is_extension() {
        assert_eq!(InputFormat::ImageData.to_string(), "vti");
        assert_eq!(InputFormat::from_extension("vti"), Some(InputFormat::ImageData));
    }
}
