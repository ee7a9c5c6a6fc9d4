//! reading the point data of VTK dataset files
//!
//! most of the time you will not need to interact with this module directly,
//! [`InputFormat`](crate::InputFormat) picks the right reader for a path.

mod error;
mod event_summary;
mod legacy;
mod xml;

pub use error::ParseError;
pub use error::{
    Base64Block, LegacyFormat, MalformedAttribute, MalformedXml, MissingAppendedMarker,
    MissingAttribute, ParsedNameOrBytes, PieceMismatch, Truncated, UnexpectedAttributeValue,
    UnexpectedElement, UnsupportedCompression,
};

pub use legacy::{parse_legacy_point_data, LegacyReader};
pub use xml::{parse_xml_point_data, XmlDataset, XmlReader};
