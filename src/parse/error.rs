use super::event_summary::EventSummary;
use crate::array::ArrayError;

use derive_more::{Constructor, Display, From};
use quick_xml::name::QName;

/// Everything that can go wrong while extracting point data from a dataset file
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    UnsupportedCompression(UnsupportedCompression),
    #[error("{0}")]
    MissingAppendedMarker(MissingAppendedMarker),
    #[error("{0}")]
    Base64(Base64Block),
    #[error("{0}")]
    Truncated(Truncated),
    #[error("{0}")]
    PieceMismatch(PieceMismatch),
    #[error("{0}")]
    Legacy(LegacyFormat),
    #[error("{0}")]
    Array(ArrayError),
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml element: {xml_err}")]
pub struct MalformedXml {
    xml_err: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml attribute: {att_err}")]
pub struct MalformedAttribute {
    att_err: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug)]
#[display(fmt = "unexpected element. Expected `{expected_name}`, got {actual_element}")]
pub struct UnexpectedElement {
    expected_name: String,
    actual_element: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new<T: Into<String>>(expected_name: T, actual_element: EventSummary) -> Self {
        Self {
            expected_name: expected_name.into(),
            actual_element,
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "unexpected attribute value for {attribute_name} in {element_name} element: expected {expected_value}, got {actual_value}"
)]
pub struct UnexpectedAttributeValue {
    pub(crate) element_name: String,
    pub(crate) attribute_name: String,
    pub(crate) expected_value: String,
    pub(crate) actual_value: ParsedNameOrBytes,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing attribute `{attribute_name}` in {element_name} element")]
pub struct MissingAttribute {
    element_name: String,
    attribute_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "compressed data (`{compressor}`) is not supported")]
pub struct UnsupportedCompression {
    compressor: ParsedNameOrBytes,
}

#[derive(Display, Debug)]
#[display(fmt = "the AppendedData section does not start with an `_` marker")]
pub struct MissingAppendedMarker;

#[derive(Display, Debug, Constructor)]
#[display(fmt = "could not decode the base64 data of array `{array_name}`: {decode_err}")]
pub struct Base64Block {
    array_name: String,
    decode_err: base64::DecodeError,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "data of array `{array_name}` is truncated: needed {needed} bytes, {available} available")]
pub struct Truncated {
    array_name: String,
    needed: usize,
    available: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "piece {piece} does not match the first piece: expected {expected}, found {found}")]
pub struct PieceMismatch {
    piece: usize,
    expected: String,
    found: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "legacy vtk file, line {line}: {message}")]
pub struct LegacyFormat {
    line: usize,
    message: String,
}

#[derive(From, Display, Debug)]
pub enum ParsedNameOrBytes {
    #[display(fmt = "{_0}")]
    Utf8(String),
    #[display(fmt = "{_0:?} (cannot convert to UTF8 string)")]
    Bytes(Vec<u8>),
}

impl ParsedNameOrBytes {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        let vec = Vec::from(bytes);
        match String::from_utf8(vec) {
            Ok(string) => Self::Utf8(string),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }
}

impl<'a> From<QName<'a>> for ParsedNameOrBytes {
    fn from(x: QName) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<std::borrow::Cow<'a, [u8]>> for ParsedNameOrBytes {
    fn from(x: std::borrow::Cow<'a, [u8]>) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<&'a str> for ParsedNameOrBytes {
    fn from(x: &str) -> Self {
        Self::Utf8(x.into())
    }
}
