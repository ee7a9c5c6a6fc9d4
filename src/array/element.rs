use crate::traits::Numeric;

use derive_more::Display;

/// The numeric element types a vtk `DataArray` can be stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ElementType {
    /// parse the `type` attribute of an xml `DataArray` element
    ///
    /// returns `None` for element types that do not hold numbers (`String`, `Bit`, ...)
    pub fn from_xml_name(name: &[u8]) -> Option<Self> {
        let element = match name {
            b"Int8" | b"Char" | b"SignedChar" => Self::Int8,
            b"UInt8" | b"UChar" | b"UnsignedChar" => Self::UInt8,
            b"Int16" | b"Short" => Self::Int16,
            b"UInt16" | b"UShort" | b"UnsignedShort" => Self::UInt16,
            b"Int32" | b"Int" => Self::Int32,
            b"UInt32" | b"UInt" | b"UnsignedInt" => Self::UInt32,
            b"Int64" | b"IdType" => Self::Int64,
            b"UInt64" => Self::UInt64,
            b"Float32" | b"Float" => Self::Float32,
            b"Float64" | b"Double" => Self::Float64,
            _ => return None,
        };

        Some(element)
    }

    /// parse the data type keyword of a legacy vtk file (`float`, `unsigned_char`, ...)
    pub fn from_legacy_name(name: &str) -> Option<Self> {
        let element = match name.to_ascii_lowercase().as_str() {
            "char" | "signed_char" => Self::Int8,
            "unsigned_char" => Self::UInt8,
            "short" => Self::Int16,
            "unsigned_short" => Self::UInt16,
            // legacy binary files store ids as 32 bit integers
            "int" | "vtkidtype" => Self::Int32,
            "unsigned_int" => Self::UInt32,
            "long" | "vtktypeint64" => Self::Int64,
            "unsigned_long" | "vtktypeuint64" => Self::UInt64,
            "float" => Self::Float32,
            "double" => Self::Float64,
            _ => return None,
        };

        Some(element)
    }

    /// number of bytes a single element occupies in binary form
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }
}

/// byte order of binary data in a source dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

macro_rules! impl_numeric {
    ($($ty:ty => $element:ident),* $(,)?) => {
        $(
            impl Numeric for $ty {
                const ELEMENT: ElementType = ElementType::$element;
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_ordered_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut arr = [0; std::mem::size_of::<$ty>()];
                    arr.copy_from_slice(&bytes[..Self::SIZE]);

                    match order {
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(arr),
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(arr),
                    }
                }
            }
        )*
    };
}

impl_numeric!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_names() {
        assert_eq!(ElementType::from_xml_name(b"Float32"), Some(ElementType::Float32));
        assert_eq!(ElementType::from_xml_name(b"UInt8"), Some(ElementType::UInt8));
        assert_eq!(ElementType::from_xml_name(b"String"), None);
        assert_eq!(ElementType::from_xml_name(b"Bit"), None);
    }

    #[test]
    fn legacy_names() {
        assert_eq!(ElementType::from_legacy_name("FLOAT"), Some(ElementType::Float32));
        assert_eq!(ElementType::from_legacy_name("unsigned_short"), Some(ElementType::UInt16));
        assert_eq!(ElementType::from_legacy_name("vtkIdType"), Some(ElementType::Int32));
        assert_eq!(ElementType::from_legacy_name("bit"), None);
    }

    #[test]
    fn ordered_bytes() {
        let le = 1.5f64.to_le_bytes();
        let be = 1.5f64.to_be_bytes();

        assert_eq!(f64::from_ordered_bytes(&le, ByteOrder::LittleEndian), 1.5);
        assert_eq!(f64::from_ordered_bytes(&be, ByteOrder::BigEndian), 1.5);
        assert_eq!(i16::from_ordered_bytes(&[0x01, 0x02], ByteOrder::BigEndian), 0x0102);
        assert_eq!(ElementType::UInt16.size(), <u16 as Numeric>::SIZE);
    }

    #[test]
    fn token_parsing_falls_back_to_float() {
        assert_eq!(i32::parse_token("3"), Some(3));
        assert_eq!(i32::parse_token("3.0"), Some(3));
        assert_eq!(u8::parse_token("-1"), None);
        assert_eq!(f32::parse_token("1e-3"), Some(1e-3));
        assert_eq!(f64::parse_token("abc"), None);
    }
}
