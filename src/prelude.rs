//! Common traits and types that are useful for working with `vtk_raw`

pub use crate::array::{ArrayBuffer, DataArray, ElementType};
pub use crate::collection::{ArrayCollection, ArrayEntry, OutputLayout};
pub use crate::traits::{NamedArray, PointDataSource};
pub use crate::collection::validate;
pub use crate::convert::{convert, ConvertOptions};
pub use crate::format::InputFormat;
pub use crate::transcode::{transcode, Encoding};
pub use crate::Error;
