//! reading the point data of xml vtk files (`.vti`, `.vtp`, `.vtu`)
//!
//! The three formats only differ in the geometry they describe, which is of no interest
//! here. The document is scanned for `DataArray` elements that are direct children of a
//! `PointData` element; arrays in `Points`, `Cells`, `CellData` etc. are skipped. Inline data
//! (`ascii` or base64 `binary`) is collected while scanning, data stored in the
//! `AppendedData` section is located by its offset once the scan reaches that section.

use super::error::{self, ParsedNameOrBytes};
use super::event_summary::EventSummary;
use super::ParseError;
use crate::array::{ArrayBuffer, ArrayError, ByteOrder, DataArray, ElementType};
use crate::collection::ArrayCollection;
use crate::traits::{Numeric, PointDataSource};
use crate::Error;

use derive_more::Display;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

/// The dataset element an xml file has to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum XmlDataset {
    /// `.vti` files
    ImageData,
    /// `.vtp` files
    PolyData,
    /// `.vtu` files
    UnstructuredGrid,
}

impl XmlDataset {
    /// value of the `type` attribute of the `VTKFile` element
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::ImageData => "ImageData",
            Self::PolyData => "PolyData",
            Self::UnstructuredGrid => "UnstructuredGrid",
        }
    }
}

/// Reader backend for the xml formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlReader {
    pub dataset: XmlDataset,
}

impl XmlReader {
    pub fn new(dataset: XmlDataset) -> Self {
        Self { dataset }
    }
}

impl PointDataSource for XmlReader {
    fn read_point_data(&self, path: &Path) -> Result<ArrayCollection<DataArray>, Error> {
        let bytes = std::fs::read(path)?;
        let collection = parse_xml_point_data(&bytes, self.dataset)?;
        Ok(collection)
    }
}

/// width of the integer in front of every binary block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HeaderType {
    #[default]
    UInt32,
    UInt64,
}

impl HeaderType {
    fn size(&self) -> usize {
        match self {
            Self::UInt32 => <u32 as Numeric>::SIZE,
            Self::UInt64 => <u64 as Numeric>::SIZE,
        }
    }

    fn read(&self, bytes: &[u8], order: ByteOrder) -> usize {
        match self {
            Self::UInt32 => u32::from_ordered_bytes(bytes, order) as usize,
            Self::UInt64 => u64::from_ordered_bytes(bytes, order) as usize,
        }
    }
}

/// attributes of the `VTKFile` element that affect decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FileHeader {
    byte_order: ByteOrder,
    header_type: HeaderType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayFormat {
    /// whitespace separated numbers inside the element
    Ascii,
    /// base64 encoded `[header][data]` inside the element
    Base64,
    /// `[header][data]` stored at an offset in the `AppendedData` section
    Appended { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ArrayHeader {
    name: String,
    /// `None` if the array does not hold numbers
    element: Option<ElementType>,
    components: usize,
    format: ArrayFormat,
}

/// a point data array whose data has not been decoded yet
#[derive(Debug)]
struct PendingArray {
    header: ArrayHeader,
    body: Vec<u8>,
}

impl PendingArray {
    /// text split around child elements stays separated
    fn push_text(&mut self, text: &[u8]) {
        if !self.body.is_empty() {
            self.body.push(b' ');
        }
        self.body.extend_from_slice(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppendedEncoding {
    Raw,
    Base64,
}

/// contents of the `AppendedData` element following the `_` marker
struct AppendedData<'a> {
    encoding: AppendedEncoding,
    data: &'a [u8],
}

/// Extract every point data array from the bytes of an xml vtk file
pub fn parse_xml_point_data(
    bytes: &[u8],
    dataset: XmlDataset,
) -> Result<ArrayCollection<DataArray>, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buffer = Vec::new();
    let mut file: Option<FileHeader> = None;
    let mut pieces: Vec<Vec<PendingArray>> = Vec::new();
    let mut current: Option<PendingArray> = None;
    let mut in_point_data = false;
    let mut appended = None;
    // open elements below the `DataArray` being collected, e.g. `InformationKey`
    let mut nested = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buffer)
            .map_err(error::MalformedXml::from)?;

        // the first element of the document has to be `VTKFile`
        if file.is_none() {
            if let Event::Start(start) | Event::Empty(start) = &event {
                if start.name().as_ref() != b"VTKFile" {
                    let actual = EventSummary::new(&event);
                    return Err(error::UnexpectedElement::new("VTKFile", actual).into());
                }
            }
        }

        // only text directly inside the `DataArray` is array data, children such as
        // `InformationKey` are skipped
        let skip = current.is_some()
            && match &event {
                Event::Start(_) => {
                    nested += 1;
                    true
                }
                Event::End(_) if nested > 0 => {
                    nested -= 1;
                    true
                }
                Event::Empty(_) => true,
                Event::Text(_) | Event::CData(_) => nested > 0,
                _ => false,
            };

        if skip {
            drop(event);
            buffer.clear();
            continue;
        }

        match event {
            Event::Start(start) => match start.name().as_ref() {
                b"VTKFile" => file = Some(read_file_header(&start, dataset)?),
                b"Piece" => pieces.push(Vec::new()),
                b"PointData" => in_point_data = true,
                b"DataArray" if in_point_data => {
                    let header = read_array_header(&start)?;
                    current = Some(PendingArray {
                        header,
                        body: Vec::new(),
                    });
                }
                b"AppendedData" => {
                    let encoding = read_appended_encoding(&start)?;
                    let position = reader.buffer_position();
                    let remaining = bytes.get(position..).unwrap_or_default();
                    appended = Some(read_appended_data(remaining, encoding)?);
                    // the rest of the file is (possibly binary) array data
                    break;
                }
                _ => (),
            },
            Event::Empty(start) => match start.name().as_ref() {
                b"VTKFile" => file = Some(read_file_header(&start, dataset)?),
                b"Piece" => pieces.push(Vec::new()),
                b"DataArray" if in_point_data => {
                    let header = read_array_header(&start)?;
                    push_array(&mut pieces, PendingArray {
                        header,
                        body: Vec::new(),
                    });
                }
                _ => (),
            },
            Event::Text(text) => {
                if let Some(pending) = current.as_mut() {
                    pending.push_text(&text.into_inner());
                }
            }
            Event::CData(data) => {
                if let Some(pending) = current.as_mut() {
                    pending.push_text(&data.into_inner());
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"PointData" => in_point_data = false,
                b"DataArray" => {
                    if let Some(pending) = current.take() {
                        push_array(&mut pieces, pending);
                    }
                }
                _ => (),
            },
            Event::Eof => break,
            _ => (),
        }

        buffer.clear();
    }

    let file = file.ok_or_else(|| error::UnexpectedElement::new("VTKFile", EventSummary::eof()))?;

    let mut offsets: Vec<usize> = pieces
        .iter()
        .flatten()
        .filter_map(|pending| match pending.header.format {
            ArrayFormat::Appended { offset } => Some(offset),
            _ => None,
        })
        .collect();
    offsets.sort_unstable();
    offsets.dedup();

    let resolver = Resolver {
        file,
        appended,
        offsets,
    };

    let resolved = pieces
        .into_iter()
        .map(|piece| {
            piece
                .into_iter()
                .map(|pending| resolver.resolve(pending))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    merge_pieces(resolved)
}

fn push_array(pieces: &mut Vec<Vec<PendingArray>>, pending: PendingArray) {
    tracing::debug!(
        name = %pending.header.name,
        components = pending.header.components,
        format = ?pending.header.format,
        "found point data array"
    );

    if pieces.is_empty() {
        pieces.push(Vec::new());
    }

    if let Some(piece) = pieces.last_mut() {
        piece.push(pending);
    }
}

/// find an attribute by name, erroring on attributes that cannot be parsed
fn find_attribute<'a>(
    bytes_start: &'a BytesStart<'_>,
    attribute_key: &str,
) -> Result<Option<Attribute<'a>>, ParseError> {
    for attribute in bytes_start.attributes() {
        let attribute = attribute.map_err(error::MalformedAttribute::from)?;

        if attribute.key.as_ref() == attribute_key.as_bytes() {
            return Ok(Some(attribute));
        }
    }

    Ok(None)
}

fn get_attribute_value<'a>(
    bytes_start: &'a BytesStart<'_>,
    attribute_key: &str,
    element_name: &str,
) -> Result<Attribute<'a>, ParseError> {
    find_attribute(bytes_start, attribute_key)?.ok_or_else(|| {
        error::MissingAttribute::new(element_name.into(), attribute_key.into()).into()
    })
}

/// ensure that an attribute's value is what we expect it to be, otherwise return an error with
/// some location information
fn check_attribute_value(
    att: Attribute<'_>,
    element_name: &str,
    attribute_name: &str,
    expected_attribute_value: &str,
) -> Result<(), error::UnexpectedAttributeValue> {
    if att.value.as_ref() != expected_attribute_value.as_bytes() {
        Err(error::UnexpectedAttributeValue::new(
            element_name.into(),
            attribute_name.into(),
            expected_attribute_value.into(),
            ParsedNameOrBytes::from(att.value),
        ))
    } else {
        Ok(())
    }
}

fn parse_attribute_value<T: FromStr>(
    att: &Attribute<'_>,
    element_name: &str,
    attribute_name: &str,
    expected: &str,
) -> Result<T, ParseError> {
    std::str::from_utf8(&att.value)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| {
            error::UnexpectedAttributeValue::new(
                element_name.into(),
                attribute_name.into(),
                expected.into(),
                ParsedNameOrBytes::new(&att.value),
            )
            .into()
        })
}

fn read_file_header(start: &BytesStart<'_>, dataset: XmlDataset) -> Result<FileHeader, ParseError> {
    let file_type = get_attribute_value(start, "type", "VTKFile")?;
    check_attribute_value(file_type, "VTKFile", "type", dataset.element_name())?;

    if let Some(compressor) = find_attribute(start, "compressor")? {
        if !compressor.value.is_empty() {
            let compressor = ParsedNameOrBytes::from(compressor.value);
            return Err(error::UnsupportedCompression::new(compressor).into());
        }
    }

    let byte_order = match find_attribute(start, "byte_order")? {
        None => ByteOrder::default(),
        Some(att) => match att.value.as_ref() {
            b"LittleEndian" => ByteOrder::LittleEndian,
            b"BigEndian" => ByteOrder::BigEndian,
            _ => {
                return Err(error::UnexpectedAttributeValue::new(
                    "VTKFile".into(),
                    "byte_order".into(),
                    "LittleEndian or BigEndian".into(),
                    ParsedNameOrBytes::from(att.value),
                )
                .into())
            }
        },
    };

    let header_type = match find_attribute(start, "header_type")? {
        None => HeaderType::default(),
        Some(att) => match att.value.as_ref() {
            b"UInt32" => HeaderType::UInt32,
            b"UInt64" => HeaderType::UInt64,
            _ => {
                return Err(error::UnexpectedAttributeValue::new(
                    "VTKFile".into(),
                    "header_type".into(),
                    "UInt32 or UInt64".into(),
                    ParsedNameOrBytes::from(att.value),
                )
                .into())
            }
        },
    };

    Ok(FileHeader {
        byte_order,
        header_type,
    })
}

fn read_array_header(start: &BytesStart<'_>) -> Result<ArrayHeader, ParseError> {
    let name = get_attribute_value(start, "Name", "DataArray")?
        .unescape_value()
        .map_err(error::MalformedXml::from)?
        .into_owned();

    let element_type = get_attribute_value(start, "type", "DataArray")?;
    let element = ElementType::from_xml_name(&element_type.value);

    let components = match find_attribute(start, "NumberOfComponents")? {
        Some(att) => parse_attribute_value(&att, "DataArray", "NumberOfComponents", "an integer")?,
        None => 1,
    };

    let format = match find_attribute(start, "format")? {
        None => ArrayFormat::Ascii,
        Some(att) => match att.value.as_ref() {
            b"ascii" => ArrayFormat::Ascii,
            b"binary" => ArrayFormat::Base64,
            b"appended" => {
                let offset = get_attribute_value(start, "offset", "DataArray")?;
                let offset = parse_attribute_value(&offset, "DataArray", "offset", "an integer")?;
                ArrayFormat::Appended { offset }
            }
            _ => {
                return Err(error::UnexpectedAttributeValue::new(
                    "DataArray".into(),
                    "format".into(),
                    "ascii, binary or appended".into(),
                    ParsedNameOrBytes::from(att.value),
                )
                .into())
            }
        },
    };

    Ok(ArrayHeader {
        name,
        element,
        components,
        format,
    })
}

fn read_appended_encoding(start: &BytesStart<'_>) -> Result<AppendedEncoding, ParseError> {
    let encoding = get_attribute_value(start, "encoding", "AppendedData")?;

    match encoding.value.as_ref() {
        b"raw" => Ok(AppendedEncoding::Raw),
        b"base64" => Ok(AppendedEncoding::Base64),
        _ => Err(error::UnexpectedAttributeValue::new(
            "AppendedData".into(),
            "encoding".into(),
            "raw or base64".into(),
            ParsedNameOrBytes::from(encoding.value),
        )
        .into()),
    }
}

/// skip to the `_` marker that precedes the appended data
fn read_appended_data(bytes: &[u8], encoding: AppendedEncoding) -> Result<AppendedData<'_>, ParseError> {
    let marker = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .filter(|&position| bytes[position] == b'_')
        .ok_or(error::MissingAppendedMarker)?;

    let mut data = &bytes[marker + 1..];

    // base64 text ends at the closing tag. Raw data may contain anything, the array headers
    // say how much of it to read
    if encoding == AppendedEncoding::Base64 {
        let closing = b"</AppendedData";
        if let Some(end) = data.windows(closing.len()).position(|window| window == closing) {
            data = &data[..end];
        }
    }

    Ok(AppendedData { encoding, data })
}

/// turns pending arrays into `DataArray`s once the whole document has been scanned
struct Resolver<'a> {
    file: FileHeader,
    appended: Option<AppendedData<'a>>,
    /// sorted offsets of every appended array, to find where a base64 block ends
    offsets: Vec<usize>,
}

impl Resolver<'_> {
    fn resolve(&self, pending: PendingArray) -> Result<(String, Option<DataArray>), ParseError> {
        let PendingArray { header, body } = pending;

        let element = match header.element {
            Some(element) => element,
            None => {
                tracing::debug!(name = %header.name, "array does not hold numeric data");
                return Ok((header.name, None));
            }
        };

        let buffer = match header.format {
            ArrayFormat::Ascii => {
                let text = std::str::from_utf8(&body).map_err(|_| ArrayError::InvalidNumber {
                    token: String::from_utf8_lossy(&body).chars().take(32).collect(),
                    element,
                })?;
                ArrayBuffer::parse_ascii(element, text.split_ascii_whitespace())?
            }
            ArrayFormat::Base64 => {
                let bytes = decode_base64_block(&body, &self.file, &header.name)?;
                self.decode(element, &bytes, &header.name)?
            }
            ArrayFormat::Appended { offset } => {
                let bytes = self.appended_bytes(offset, &header.name)?;
                self.decode(element, &bytes, &header.name)?
            }
        };

        let array = DataArray::new(header.name.clone(), header.components, buffer)?;
        Ok((header.name, Some(array)))
    }

    fn decode(&self, element: ElementType, bytes: &[u8], name: &str) -> Result<ArrayBuffer, ParseError> {
        let remainder = bytes.len() % element.size();
        if remainder != 0 {
            let needed = bytes.len() - remainder + element.size();
            return Err(error::Truncated::new(name.into(), needed, bytes.len()).into());
        }

        Ok(ArrayBuffer::decode(element, bytes, self.file.byte_order))
    }

    /// the data bytes (without the header) of an appended array
    fn appended_bytes(&self, offset: usize, name: &str) -> Result<Cow<'_, [u8]>, ParseError> {
        let appended = self.appended.as_ref().ok_or_else(|| {
            error::UnexpectedElement::new("AppendedData", EventSummary::eof())
        })?;

        match appended.encoding {
            AppendedEncoding::Raw => {
                let header_size = self.file.header_type.size();
                let block = appended
                    .data
                    .get(offset..)
                    .filter(|block| block.len() >= header_size)
                    .ok_or_else(|| {
                        error::Truncated::new(name.into(), offset + header_size, appended.data.len())
                    })?;

                let length = self.file.header_type.read(block, self.file.byte_order);
                let data = block[header_size..].get(..length).ok_or_else(|| {
                    error::Truncated::new(name.into(), length, block.len() - header_size)
                })?;

                Ok(Cow::Borrowed(data))
            }
            AppendedEncoding::Base64 => {
                let end = self
                    .offsets
                    .iter()
                    .copied()
                    .find(|&next| next > offset)
                    .unwrap_or(appended.data.len())
                    .min(appended.data.len());

                let chunk = appended.data.get(offset..end).ok_or_else(|| {
                    error::Truncated::new(name.into(), offset, appended.data.len())
                })?;

                Ok(Cow::Owned(decode_base64_block(chunk, &self.file, name)?))
            }
        }
    }
}

/// Decode a base64 `[header][data]` block and return the data bytes.
///
/// Writers either encode header and data as one base64 stream or encode the header on its
/// own (which leaves padding in the middle of the text). Both are accepted.
fn decode_base64_block(text: &[u8], file: &FileHeader, name: &str) -> Result<Vec<u8>, ParseError> {
    let cleaned: Vec<u8> = text
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();

    let header_size = file.header_type.size();

    if let Ok(decoded) = base64::decode(&cleaned) {
        if decoded.len() >= header_size {
            let length = file.header_type.read(&decoded, file.byte_order);
            if let Some(data) = decoded[header_size..].get(..length) {
                return Ok(data.to_vec());
            }
        }
    }

    // header encoded on its own
    let header_chars = (header_size + 2) / 3 * 4;
    if cleaned.len() < header_chars {
        return Err(error::Truncated::new(name.into(), header_size, cleaned.len() * 3 / 4).into());
    }

    let header = base64::decode(&cleaned[..header_chars])
        .map_err(|e| error::Base64Block::new(name.into(), e))?;
    if header.len() < header_size {
        return Err(error::Truncated::new(name.into(), header_size, header.len()).into());
    }
    let length = file.header_type.read(&header, file.byte_order);

    let mut data = base64::decode(&cleaned[header_chars..])
        .map_err(|e| error::Base64Block::new(name.into(), e))?;
    if data.len() < length {
        return Err(error::Truncated::new(name.into(), length, data.len()).into());
    }
    data.truncate(length);

    Ok(data)
}

/// join the arrays of every piece, the first piece decides names and order
fn merge_pieces(
    pieces: Vec<Vec<(String, Option<DataArray>)>>,
) -> Result<ArrayCollection<DataArray>, ParseError> {
    let names = |arrays: &[(String, Option<DataArray>)]| {
        arrays
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut pieces = pieces.into_iter().enumerate();
    let mut merged = match pieces.next() {
        Some((_, first)) => first,
        None => return Ok(ArrayCollection::new()),
    };

    for (piece, arrays) in pieces {
        let same_names = arrays.len() == merged.len()
            && arrays
                .iter()
                .zip(merged.iter())
                .all(|((name, _), (expected, _))| name == expected);

        if !same_names {
            return Err(error::PieceMismatch::new(piece, names(&merged), names(&arrays)).into());
        }

        for ((name, target), (_, array)) in merged.iter_mut().zip(arrays) {
            match (target, array) {
                (Some(target), Some(array)) => target.extend(array)?,
                (None, None) => (),
                (target, _) => {
                    let state = |readable: bool| {
                        if readable {
                            format!("numeric array `{name}`")
                        } else {
                            format!("non-numeric array `{name}`")
                        }
                    };
                    let expected = state(target.is_some());
                    let found = state(target.is_none());
                    return Err(error::PieceMismatch::new(piece, expected, found).into());
                }
            }
        }
    }

    let mut collection = ArrayCollection::new();
    for (name, array) in merged {
        match array {
            Some(array) => collection.push(array),
            None => collection.push_unreadable(name),
        }
    }

    Ok(collection)
}
