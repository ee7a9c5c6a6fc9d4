//! reading the point data of legacy `.vtk` structured points files
//!
//! ```text
//! # vtk DataFile Version 3.0
//! any title
//! ASCII | BINARY
//! DATASET STRUCTURED_POINTS
//! DIMENSIONS 3 1 1
//! ORIGIN 0 0 0
//! SPACING 1 1 1
//! POINT_DATA 3
//! SCALARS rho double 1
//! LOOKUP_TABLE default
//! 1.5 2.5 3.5
//! ```
//!
//! Keywords are case insensitive. Binary files store their values big endian, directly after
//! the line that declares them.

use super::error;
use super::ParseError;
use crate::array::{ArrayBuffer, ByteOrder, DataArray, ElementType};
use crate::collection::ArrayCollection;
use crate::traits::{NamedArray, PointDataSource};
use crate::Error;

use std::path::Path;
use std::str::FromStr;

/// Reader backend for legacy structured points files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyReader;

impl PointDataSource for LegacyReader {
    fn read_point_data(&self, path: &Path) -> Result<ArrayCollection<DataArray>, Error> {
        let bytes = std::fs::read(path)?;
        let collection = parse_legacy_point_data(&bytes)?;
        Ok(collection)
    }
}

/// Extract every point data attribute from the bytes of a legacy vtk file
pub fn parse_legacy_point_data(bytes: &[u8]) -> Result<ArrayCollection<DataArray>, ParseError> {
    let mut cursor = Cursor::new(bytes);

    let version = cursor.read_line().unwrap_or_default();
    if !version.starts_with(b"# vtk DataFile") {
        return Err(cursor.error("missing `# vtk DataFile Version` header"));
    }

    // title
    cursor.read_line();

    let binary = match cursor.expect_token("ASCII or BINARY")?.to_ascii_uppercase().as_str() {
        "ASCII" => false,
        "BINARY" => true,
        other => return Err(cursor.error(format!("expected ASCII or BINARY, found `{other}`"))),
    };
    cursor.rest_of_line()?;

    let mut parser = LegacyParser {
        cursor,
        binary,
        collection: ArrayCollection::new(),
    };
    parser.read_dataset()?;

    Ok(parser.collection)
}

/// which kind of data the keywords currently being read belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Geometry,
    Points(usize),
    Cells(usize),
}

struct LegacyParser<'a> {
    cursor: Cursor<'a>,
    binary: bool,
    collection: ArrayCollection<DataArray>,
}

impl<'a> LegacyParser<'a> {
    fn read_dataset(&mut self) -> Result<(), ParseError> {
        let keyword = self.cursor.expect_token("DATASET")?;
        if !keyword.eq_ignore_ascii_case("DATASET") {
            return Err(self.cursor.error(format!("expected DATASET, found `{keyword}`")));
        }

        let dataset = self.cursor.expect_token("a dataset type")?;
        if !dataset.eq_ignore_ascii_case("STRUCTURED_POINTS") {
            return Err(self
                .cursor
                .error(format!("only STRUCTURED_POINTS datasets are supported, found `{dataset}`")));
        }
        self.cursor.rest_of_line()?;

        let mut section = Section::Geometry;

        while let Some(keyword) = self.cursor.next_token()? {
            let keyword = keyword.to_ascii_uppercase();

            match keyword.as_str() {
                "DIMENSIONS" | "SPACING" | "ASPECT_RATIO" | "ORIGIN" => {
                    self.cursor.rest_of_line()?;
                }
                "POINT_DATA" => {
                    section = Section::Points(self.cursor.parse_token("a point count")?);
                    self.cursor.rest_of_line()?;
                }
                "CELL_DATA" => {
                    section = Section::Cells(self.cursor.parse_token("a cell count")?);
                    self.cursor.rest_of_line()?;
                }
                "METADATA" => self.skip_metadata()?,
                "LOOKUP_TABLE" => self.skip_lookup_table()?,
                "FIELD" => {
                    let arrays = self.read_field()?;
                    if let Section::Points(_) = section {
                        arrays.into_iter().for_each(|array| self.keep(array));
                    }
                }
                "SCALARS" | "COLOR_SCALARS" | "VECTORS" | "NORMALS" | "TENSORS" | "TENSORS6"
                | "TEXTURE_COORDINATES" => {
                    let tuples = match section {
                        Section::Points(tuples) | Section::Cells(tuples) => tuples,
                        Section::Geometry => {
                            return Err(self.cursor.error(format!(
                                "{keyword} before POINT_DATA or CELL_DATA"
                            )))
                        }
                    };

                    let array = self.read_attribute(&keyword, tuples)?;
                    if let Section::Points(_) = section {
                        self.keep(array);
                    } else {
                        tracing::debug!(name = array.name(), "skipping cell data array");
                    }
                }
                _ => {
                    return Err(self.cursor.error(format!("unexpected keyword `{keyword}`")));
                }
            }
        }

        Ok(())
    }

    fn keep(&mut self, array: DataArray) {
        tracing::debug!(
            name = array.name(),
            components = array.component_count(),
            "found point data array"
        );
        self.collection.push(array);
    }

    /// one of the attribute keywords with its arguments and values
    fn read_attribute(&mut self, keyword: &str, tuples: usize) -> Result<DataArray, ParseError> {
        let args = self.cursor.rest_of_line()?;
        let name = decode_name(self.arg(&args, 0, "an array name")?);

        let (components, buffer) = match keyword {
            "SCALARS" => {
                let element = self.element(self.arg(&args, 1, "a data type")?)?;
                let components = match args.get(2) {
                    Some(components) => self.parse_arg(components, "a component count")?,
                    None => 1,
                };

                if self.cursor.peek_keyword().as_deref() == Some("LOOKUP_TABLE") {
                    self.cursor.next_token()?;
                    self.cursor.rest_of_line()?;
                }

                (components, self.read_values(element, self.value_count(tuples, components)?)?)
            }
            "COLOR_SCALARS" => {
                let components = self.parse_arg(self.arg(&args, 1, "a component count")?, "a component count")?;
                (components, self.read_colors(self.value_count(tuples, components)?)?)
            }
            "VECTORS" | "NORMALS" => {
                let element = self.element(self.arg(&args, 1, "a data type")?)?;
                (3, self.read_values(element, self.value_count(tuples, 3)?)?)
            }
            "TENSORS" => {
                let element = self.element(self.arg(&args, 1, "a data type")?)?;
                (9, self.read_values(element, self.value_count(tuples, 9)?)?)
            }
            "TENSORS6" => {
                let element = self.element(self.arg(&args, 1, "a data type")?)?;
                (6, self.read_values(element, self.value_count(tuples, 6)?)?)
            }
            // TEXTURE_COORDINATES
            _ => {
                let components = self.parse_arg(self.arg(&args, 1, "a dimension")?, "a dimension")?;
                let element = self.element(self.arg(&args, 2, "a data type")?)?;
                (components, self.read_values(element, self.value_count(tuples, components)?)?)
            }
        };

        Ok(DataArray::new(name, components, buffer)?)
    }

    /// `FIELD name count` followed by `count` arrays of `name components tuples type`
    fn read_field(&mut self) -> Result<Vec<DataArray>, ParseError> {
        let args = self.cursor.rest_of_line()?;
        let count: usize = self.parse_arg(self.arg(&args, 1, "an array count")?, "an array count")?;

        let mut arrays = Vec::new();
        let mut remaining = count;

        while remaining > 0 {
            let name = self.cursor.expect_token("a field array name")?;

            if name.eq_ignore_ascii_case("METADATA") {
                self.skip_metadata()?;
                continue;
            }

            remaining -= 1;

            if name == "NULL_ARRAY" {
                tracing::debug!("skipping null field array");
                self.cursor.rest_of_line()?;
                continue;
            }

            let name = decode_name(name);
            let components: usize = self.cursor.parse_token("a component count")?;
            let tuples: usize = self.cursor.parse_token("a tuple count")?;
            let element = self.cursor.expect_token("a data type")?;
            let element = self.element(element)?;
            self.cursor.rest_of_line()?;

            let buffer = self.read_values(element, self.value_count(tuples, components)?)?;
            arrays.push(DataArray::new(name, components, buffer)?);
        }

        Ok(arrays)
    }

    /// `LOOKUP_TABLE name size` followed by `size` rgba colors
    fn skip_lookup_table(&mut self) -> Result<(), ParseError> {
        let args = self.cursor.rest_of_line()?;
        let size: usize = self.parse_arg(self.arg(&args, 1, "a table size")?, "a table size")?;
        self.read_colors(self.value_count(size, 4)?)?;
        Ok(())
    }

    /// everything up to the next empty line
    fn skip_metadata(&mut self) -> Result<(), ParseError> {
        self.cursor.rest_of_line()?;

        while let Some(line) = self.cursor.read_line() {
            if line.iter().all(|byte| byte.is_ascii_whitespace()) {
                break;
            }
        }

        Ok(())
    }

    fn read_values(&mut self, element: ElementType, count: usize) -> Result<ArrayBuffer, ParseError> {
        if self.binary {
            let len = count
                .checked_mul(element.size())
                .ok_or_else(|| self.cursor.error(format!("{count} values do not fit in memory")))?;
            let bytes = self.cursor.read_bytes(len)?;
            return Ok(ArrayBuffer::decode(element, bytes, ByteOrder::BigEndian));
        }

        let mut tokens = Vec::with_capacity(self.cursor.token_capacity(count));
        for _ in 0..count {
            tokens.push(self.cursor.expect_token("a value")?);
        }

        Ok(ArrayBuffer::parse_ascii(element, tokens)?)
    }

    /// colors are bytes in binary files and floats in `[0, 1]` in ascii files
    fn read_colors(&mut self, count: usize) -> Result<ArrayBuffer, ParseError> {
        if self.binary {
            return self.read_values(ElementType::UInt8, count);
        }

        let mut colors: Vec<u8> = Vec::with_capacity(self.cursor.token_capacity(count));
        for _ in 0..count {
            let value: f32 = self.cursor.parse_token("a color value")?;
            colors.push((value * 255.0).round().clamp(0.0, 255.0) as u8);
        }

        Ok(colors.into())
    }

    /// `count` entries of `width` values each, as read from a header
    fn value_count(&self, count: usize, width: usize) -> Result<usize, ParseError> {
        count
            .checked_mul(width)
            .ok_or_else(|| self.cursor.error(format!("{count} x {width} values is too large")))
    }

    fn element(&self, name: &str) -> Result<ElementType, ParseError> {
        ElementType::from_legacy_name(name)
            .ok_or_else(|| self.cursor.error(format!("unsupported data type `{name}`")))
    }

    fn arg<'b>(&self, args: &[&'b str], index: usize, what: &str) -> Result<&'b str, ParseError> {
        args.get(index)
            .copied()
            .ok_or_else(|| self.cursor.error(format!("expected {what}")))
    }

    fn parse_arg<T: FromStr>(&self, arg: &str, what: &str) -> Result<T, ParseError> {
        arg.parse()
            .map_err(|_| self.cursor.error(format!("expected {what}, found `{arg}`")))
    }
}

/// array names have spaces and other special characters written as `%XX`
fn decode_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        let escaped = (bytes[index] == b'%')
            .then(|| bytes.get(index + 1..index + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match escaped {
            Some(byte) => {
                decoded.push(byte);
                index += 3;
            }
            None => {
                decoded.push(bytes[index]);
                index += 1;
            }
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// position in a legacy file that mixes text lines with raw binary blocks
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// 1-based line of the current position
    fn line(&self) -> usize {
        self.bytes[..self.position]
            .iter()
            .filter(|byte| **byte == b'\n')
            .count()
            + 1
    }

    fn error<T: Into<String>>(&self, message: T) -> ParseError {
        error::LegacyFormat::new(self.line(), message.into()).into()
    }

    /// the rest of the current line without its line ending
    fn read_line(&mut self) -> Option<&'a [u8]> {
        let bytes = self.bytes;
        let rest = bytes.get(self.position..).filter(|rest| !rest.is_empty())?;

        let end = rest.iter().position(|byte| *byte == b'\n').unwrap_or(rest.len());
        self.position += (end + 1).min(rest.len());

        let line = &rest[..end];
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// the whitespace separated words on the rest of the current line
    fn rest_of_line(&mut self) -> Result<Vec<&'a str>, ParseError> {
        let line = self.read_line().unwrap_or_default();

        std::str::from_utf8(line)
            .map(|line| line.split_ascii_whitespace().collect())
            .map_err(|_| self.error("expected text, found binary data"))
    }

    fn next_token(&mut self) -> Result<Option<&'a str>, ParseError> {
        let bytes = self.bytes;

        while bytes
            .get(self.position)
            .map_or(false, |byte| byte.is_ascii_whitespace())
        {
            self.position += 1;
        }

        let start = self.position;
        let len = bytes[start..]
            .iter()
            .position(|byte| byte.is_ascii_whitespace())
            .unwrap_or(bytes.len() - start);

        if len == 0 {
            return Ok(None);
        }

        self.position += len;

        std::str::from_utf8(&bytes[start..start + len])
            .map(Some)
            .map_err(|_| self.error("expected text, found binary data"))
    }

    fn expect_token(&mut self, what: &str) -> Result<&'a str, ParseError> {
        self.next_token()?
            .ok_or_else(|| self.error(format!("expected {what}, found the end of the file")))
    }

    fn parse_token<T: FromStr>(&mut self, what: &str) -> Result<T, ParseError> {
        let token = self.expect_token(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected {what}, found `{token}`")))
    }

    /// the next word, upper cased, without moving past it
    fn peek_keyword(&self) -> Option<String> {
        let mut probe = *self;
        probe
            .next_token()
            .ok()
            .flatten()
            .map(|token| token.to_ascii_uppercase())
    }

    /// how many tokens could at most follow, every token takes a separator
    fn token_capacity(&self, count: usize) -> usize {
        count.min((self.bytes.len() - self.position) / 2 + 1)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let bytes = self.bytes;
        let available = bytes.len() - self.position;

        if len > available {
            return Err(self.error(format!(
                "expected {len} bytes of binary data, found {available}"
            )));
        }

        let data = &bytes[self.position..self.position + len];
        self.position += len;
        Ok(data)
    }
}
