/*
 *
 *    Copyright (c) 2020-2022 Project CHIP Authors
 *
 *    Licensed under the Apache License, Version 2.0 (the "License");
 *    you may not use this file except in compliance with the License.
 *    You may obtain a copy of the License at
 *
 *        http://www.apache.org/licenses/LICENSE-2.0
 *
 *    Unless required by applicable law or agreed to in writing, software
 *    distributed under the License is distributed on an "AS IS" BASIS,
 *    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *    See the License for the specific language governing permissions and
 *    limitations under the License.
 */

use core::fmt;

use num_traits::FromPrimitive;

use crate::error::{Error, ErrorCode};

pub use dump::*;
pub use read::*;
pub use traits::*;
pub use write::*;

mod dump;
mod read;
mod traits;
mod write;

/// Represents the TLV tag type encoded in the control byte of each TLV element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, num_derive::FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TLVTagType {
    Anonymous = 0,
    Context = 1,
    CommonPrf16 = 2,
    CommonPrf32 = 3,
    ImplPrf16 = 4,
    ImplPrf32 = 5,
    FullQual48 = 6,
    FullQual64 = 7,
}

impl TLVTagType {
    /// Return the size of the tag data following the control byte
    /// in the TLV element representation.
    pub const fn size(&self) -> usize {
        match self {
            Self::Anonymous => 0,
            Self::Context => 1,
            Self::CommonPrf16 => 2,
            Self::CommonPrf32 => 4,
            Self::ImplPrf16 => 2,
            Self::ImplPrf32 => 4,
            Self::FullQual48 => 6,
            Self::FullQual64 => 8,
        }
    }
}

impl fmt::Display for TLVTagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Represents the TLV value type encoded in the control byte of each TLV element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, num_derive::FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TLVValueType {
    S8 = 0,
    S16 = 1,
    S32 = 2,
    S64 = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    False = 8,
    True = 9,
    F32 = 10,
    F64 = 11,
    Utf8l = 12,
    Utf16l = 13,
    Utf32l = 14,
    Utf64l = 15,
    Str8l = 16,
    Str16l = 17,
    Str32l = 18,
    Str64l = 19,
    Null = 20,
    Struct = 21,
    Array = 22,
    List = 23,
    EndCnt = 24,
}

impl TLVValueType {
    /// Return the size of the value corresponding to this value type.
    ///
    /// If the value type has a variable size (i.e. octet and Utf8 strings), this function returns `None`.
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::S8 | Self::U8 => Some(1),
            Self::S16 | Self::U16 => Some(2),
            Self::S32 | Self::U32 | Self::F32 => Some(4),
            Self::S64 | Self::U64 | Self::F64 => Some(8),
            Self::Utf8l
            | Self::Utf16l
            | Self::Utf32l
            | Self::Utf64l
            | Self::Str8l
            | Self::Str16l
            | Self::Str32l
            | Self::Str64l => None,
            _ => Some(0),
        }
    }

    /// Return the size of the length field for variable size value types.
    ///
    /// if the value type has a fixed size, this function returns 0.
    pub const fn variable_size_len(&self) -> usize {
        match self {
            Self::Utf8l | Self::Str8l => 1,
            Self::Utf16l | Self::Str16l => 2,
            Self::Utf32l | Self::Str32l => 4,
            Self::Utf64l | Self::Str64l => 8,
            _ => 0,
        }
    }

    /// Convenience method to check if the value type is a container start type.
    pub const fn is_container_start(&self) -> bool {
        matches!(self, Self::Struct | Self::Array | Self::List)
    }

    /// Convenience method to check if the value type is a container end type.
    pub const fn is_container_end(&self) -> bool {
        matches!(self, Self::EndCnt)
    }

    /// Convenience method to check if the value type is an Octet String type.
    pub const fn is_str(&self) -> bool {
        matches!(
            self,
            Self::Str8l | Self::Str16l | Self::Str32l | Self::Str64l
        )
    }

    /// Convenience method to check if the value type is a UTF-8 String type.
    pub const fn is_utf8(&self) -> bool {
        matches!(
            self,
            Self::Utf8l | Self::Utf16l | Self::Utf32l | Self::Utf64l
        )
    }
}

impl fmt::Display for TLVValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The kind of a TLV container.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TLVContainerType {
    Struct,
    Array,
    List,
}

impl TLVContainerType {
    pub const fn value_type(&self) -> TLVValueType {
        match self {
            Self::Struct => TLVValueType::Struct,
            Self::Array => TLVValueType::Array,
            Self::List => TLVValueType::List,
        }
    }

    pub const fn from_value_type(value_type: TLVValueType) -> Option<Self> {
        match value_type {
            TLVValueType::Struct => Some(Self::Struct),
            TLVValueType::Array => Some(Self::Array),
            TLVValueType::List => Some(Self::List),
            _ => None,
        }
    }
}

impl fmt::Display for TLVContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Represents the control byte of a TLV element (i.e. the tag type and the value type).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TLVControl {
    pub tag_type: TLVTagType,
    pub value_type: TLVValueType,
}

impl TLVControl {
    const TAG_SHIFT_BITS: u8 = 5;
    const TAG_MASK: u8 = 0xe0;
    const TYPE_MASK: u8 = 0x1f;

    /// The raw control byte of a container end marker.
    pub const END_OF_CONTAINER: u8 = 0x18;

    #[inline(always)]
    pub const fn new(tag_type: TLVTagType, value_type: TLVValueType) -> Self {
        Self {
            tag_type,
            value_type,
        }
    }

    /// Create a new TLV control byte by parsing the provided control byte
    /// into a tag type and a value type.
    ///
    /// The function will return an error if the value type bits are outside of the
    /// range defined by the TLV encoding.
    #[inline(always)]
    pub fn parse(control: u8) -> Result<Self, Error> {
        let tag_type = FromPrimitive::from_u8((control & Self::TAG_MASK) >> Self::TAG_SHIFT_BITS)
            .ok_or(ErrorCode::InvalidData)?;
        let value_type =
            FromPrimitive::from_u8(control & Self::TYPE_MASK).ok_or(ErrorCode::InvalidData)?;

        Ok(Self::new(tag_type, value_type))
    }

    /// Return the raw control byte.
    #[inline(always)]
    pub const fn as_raw(&self) -> u8 {
        ((self.tag_type as u8) << Self::TAG_SHIFT_BITS) | (self.value_type as u8)
    }

    /// Return `true` if the control byte represents a container end.
    ///
    /// Container end markers are never tagged.
    #[inline(always)]
    pub fn is_container_end(&self) -> bool {
        matches!(self.tag_type, TLVTagType::Anonymous) && self.value_type.is_container_end()
    }
}

impl fmt::Display for TLVControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control({} {})", self.tag_type, self.value_type)
    }
}

/// A high-level representation of a TLV tag (tag type and tag value).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TLVTag {
    Anonymous,
    Context(u8),
    CommonPrf16(u16),
    CommonPrf32(u32),
    ImplPrf16(u16),
    ImplPrf32(u32),
    FullQual48 {
        vendor_id: u16,
        profile: u16,
        tag: u16,
    },
    FullQual64 {
        vendor_id: u16,
        profile: u16,
        tag: u32,
    },
}

impl TLVTag {
    /// Return the tag type of the TLV tag.
    pub const fn tag_type(&self) -> TLVTagType {
        match self {
            Self::Anonymous => TLVTagType::Anonymous,
            Self::Context(_) => TLVTagType::Context,
            Self::CommonPrf16(_) => TLVTagType::CommonPrf16,
            Self::CommonPrf32(_) => TLVTagType::CommonPrf32,
            Self::ImplPrf16(_) => TLVTagType::ImplPrf16,
            Self::ImplPrf32(_) => TLVTagType::ImplPrf32,
            Self::FullQual48 { .. } => TLVTagType::FullQual48,
            Self::FullQual64 { .. } => TLVTagType::FullQual64,
        }
    }

    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Decode a tag of the given type from its raw little-endian payload.
    ///
    /// The payload must be exactly `tag_type.size()` bytes long.
    pub(crate) fn from_raw(tag_type: TLVTagType, raw: &[u8]) -> Self {
        let u16_at = |offset: usize| u16::from_le_bytes([raw[offset], raw[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
        };

        match tag_type {
            TLVTagType::Anonymous => Self::Anonymous,
            TLVTagType::Context => Self::Context(raw[0]),
            TLVTagType::CommonPrf16 => Self::CommonPrf16(u16_at(0)),
            TLVTagType::CommonPrf32 => Self::CommonPrf32(u32_at(0)),
            TLVTagType::ImplPrf16 => Self::ImplPrf16(u16_at(0)),
            TLVTagType::ImplPrf32 => Self::ImplPrf32(u32_at(0)),
            TLVTagType::FullQual48 => Self::FullQual48 {
                vendor_id: u16_at(0),
                profile: u16_at(2),
                tag: u16_at(4),
            },
            TLVTagType::FullQual64 => Self::FullQual64 {
                vendor_id: u16_at(0),
                profile: u16_at(2),
                tag: u32_at(4),
            },
        }
    }
}

impl fmt::Display for TLVTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Context(tag) => write!(f, "{tag}"),
            Self::CommonPrf16(tag) => write!(f, "CommonPrf16({tag})"),
            Self::CommonPrf32(tag) => write!(f, "CommonPrf32({tag})"),
            Self::ImplPrf16(tag) => write!(f, "ImplPrf16({tag})"),
            Self::ImplPrf32(tag) => write!(f, "ImplPrf32({tag})"),
            Self::FullQual48 {
                vendor_id,
                profile,
                tag,
            } => write!(f, "FullQual48(VID:{vendor_id} PRF:{profile} {tag})"),
            Self::FullQual64 {
                vendor_id,
                profile,
                tag,
            } => write!(f, "FullQual64(VID:{vendor_id} PRF:{profile} {tag})"),
        }
    }
}

/// A high-level representation of a TLV value.
///
/// Unlike a complete decoded tree, a `TLVValue` of a container type does not carry
/// the container members, but rather, represents its beginning or end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TLVValue<'a> {
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    False,
    True,
    F32(f32),
    F64(f64),
    Utf8l(&'a str),
    Utf16l(&'a str),
    Utf32l(&'a str),
    Utf64l(&'a str),
    Str8l(&'a [u8]),
    Str16l(&'a [u8]),
    Str32l(&'a [u8]),
    Str64l(&'a [u8]),
    Null,
    Struct,
    Array,
    List,
    EndCnt,
}

impl<'a> TLVValue<'a> {
    /// Return the value type of the TLV value.
    pub const fn value_type(&self) -> TLVValueType {
        match self {
            Self::S8(_) => TLVValueType::S8,
            Self::S16(_) => TLVValueType::S16,
            Self::S32(_) => TLVValueType::S32,
            Self::S64(_) => TLVValueType::S64,
            Self::U8(_) => TLVValueType::U8,
            Self::U16(_) => TLVValueType::U16,
            Self::U32(_) => TLVValueType::U32,
            Self::U64(_) => TLVValueType::U64,
            Self::False => TLVValueType::False,
            Self::True => TLVValueType::True,
            Self::F32(_) => TLVValueType::F32,
            Self::F64(_) => TLVValueType::F64,
            Self::Utf8l(_) => TLVValueType::Utf8l,
            Self::Utf16l(_) => TLVValueType::Utf16l,
            Self::Utf32l(_) => TLVValueType::Utf32l,
            Self::Utf64l(_) => TLVValueType::Utf64l,
            Self::Str8l(_) => TLVValueType::Str8l,
            Self::Str16l(_) => TLVValueType::Str16l,
            Self::Str32l(_) => TLVValueType::Str32l,
            Self::Str64l(_) => TLVValueType::Str64l,
            Self::Null => TLVValueType::Null,
            Self::Struct => TLVValueType::Struct,
            Self::Array => TLVValueType::Array,
            Self::List => TLVValueType::List,
            Self::EndCnt => TLVValueType::EndCnt,
        }
    }

    /// Create a TLV value as an S8, S16, S32, or S64 TLV value,
    /// depending on the smallest width that can hold the value.
    pub const fn int(value: i64) -> Self {
        if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
            Self::S8(value as i8)
        } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
            Self::S16(value as i16)
        } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            Self::S32(value as i32)
        } else {
            Self::S64(value)
        }
    }

    /// Create a TLV value as a U8, U16, U32, or U64 TLV value,
    /// depending on the smallest width that can hold the value.
    pub const fn uint(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            Self::U8(value as u8)
        } else if value <= u16::MAX as u64 {
            Self::U16(value as u16)
        } else if value <= u32::MAX as u64 {
            Self::U32(value as u32)
        } else {
            Self::U64(value)
        }
    }

    /// Create a TLV value as a UTF-8 TLV value.
    /// The length of the string is encoded as 1, 2, 4 or 8 octets,
    /// depending on the length of the string.
    pub const fn utf8(value: &'a str) -> Self {
        let len = value.len();

        if len <= u8::MAX as usize {
            Self::Utf8l(value)
        } else if len <= u16::MAX as usize {
            Self::Utf16l(value)
        } else if len as u64 <= u32::MAX as u64 {
            Self::Utf32l(value)
        } else {
            Self::Utf64l(value)
        }
    }

    /// Create a TLV value as an octet string TLV value.
    /// The length of the string is encoded as 1, 2, 4 or 8 octets,
    /// depending on the length of the string.
    pub const fn str(value: &'a [u8]) -> Self {
        let len = value.len();

        if len <= u8::MAX as usize {
            Self::Str8l(value)
        } else if len <= u16::MAX as usize {
            Self::Str16l(value)
        } else if len as u64 <= u32::MAX as u64 {
            Self::Str32l(value)
        } else {
            Self::Str64l(value)
        }
    }

    /// Create a TLV value of type boolean (True or False).
    pub const fn bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    /// Widen any unsigned integer value to `u64`.
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::U8(a) => Some(*a as u64),
            Self::U16(a) => Some(*a as u64),
            Self::U32(a) => Some(*a as u64),
            Self::U64(a) => Some(*a),
            _ => None,
        }
    }

    /// Widen any signed integer value to `i64`.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::S8(a) => Some(*a as i64),
            Self::S16(a) => Some(*a as i64),
            Self::S32(a) => Some(*a as i64),
            Self::S64(a) => Some(*a),
            _ => None,
        }
    }
}

impl fmt::Display for TLVValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S8(a) => write!(f, "S8({a})"),
            Self::S16(a) => write!(f, "S16({a})"),
            Self::S32(a) => write!(f, "S32({a})"),
            Self::S64(a) => write!(f, "S64({a})"),
            Self::U8(a) => write!(f, "U8(0x{a:02x})"),
            Self::U16(a) => write!(f, "U16(0x{a:04x})"),
            Self::U32(a) => write!(f, "U32(0x{a:08x})"),
            Self::U64(a) => write!(f, "U64(0x{a:016x})"),
            Self::F32(a) => write!(f, "F32({a})"),
            Self::F64(a) => write!(f, "F64({a})"),
            Self::Null => write!(f, "Null"),
            Self::Struct => write!(f, "{{"),
            Self::Array => write!(f, "["),
            Self::List => write!(f, "("),
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Utf8l(a) | Self::Utf16l(a) | Self::Utf32l(a) | Self::Utf64l(a) => {
                write!(f, "\"{a}\"")
            }
            Self::Str8l(a) | Self::Str16l(a) | Self::Str32l(a) | Self::Str64l(a) => {
                write!(f, "({}){a:02X?}", a.len())
            }
            Self::EndCnt => write!(f, ">"),
        }
    }
}

/// The tag and the value type of a TLV element, as returned by `TLVReader::peek`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TLVHeader {
    pub tag: TLVTag,
    pub value_type: TLVValueType,
}

impl fmt::Display for TLVHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag, self.value_type)
    }
}

/// Hardening limits applied by `TLVReader` and `TLVWriter`.
///
/// Neither the container depth nor the size of a TLV message is bounded by the encoding
/// itself, so both sides enforce explicit limits against adversarial or runaway input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TLVLimits {
    /// Maximum number of simultaneously open containers.
    pub max_depth: usize,
    /// Maximum size of an encoded TLV message in bytes.
    pub max_len: usize,
}

impl TLVLimits {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_LEN: usize = 1024 * 1024;

    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }

    pub const fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub const fn with_max_len(self, max_len: usize) -> Self {
        Self { max_len, ..self }
    }
}

impl Default for TLVLimits {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn pad(ident: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for _ in 0..ident {
        write!(f, "  ")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{TLVControl, TLVHeader, TLVLimits, TLVTag, TLVTagType, TLVValue, TLVValueType};
    use crate::error::ErrorCode;

    #[test]
    fn test_control_roundtrip() {
        let control = TLVControl::new(TLVTagType::Context, TLVValueType::Array);
        assert_eq!(control.as_raw(), 0x36);
        assert_eq!(TLVControl::parse(0x36).unwrap(), control);

        let end = TLVControl::parse(TLVControl::END_OF_CONTAINER).unwrap();
        assert!(end.is_container_end());

        // A tagged end marker is not a container end
        assert!(!TLVControl::parse(0x38).unwrap().is_container_end());
    }

    #[test]
    fn test_control_invalid_value_type() {
        for raw in [0x19, 0x1f, 0x3f, 0xff] {
            assert_eq!(
                TLVControl::parse(raw).unwrap_err().code(),
                ErrorCode::InvalidData
            );
        }
    }

    #[test]
    fn test_tag_from_raw() {
        assert_eq!(
            TLVTag::from_raw(TLVTagType::CommonPrf32, &[0xa0, 0x86, 0x01, 0x00]),
            TLVTag::CommonPrf32(100000)
        );
        assert_eq!(
            TLVTag::from_raw(
                TLVTagType::FullQual64,
                &[0xf1, 0xff, 0xed, 0xde, 0xed, 0xfe, 0x55, 0xaa]
            ),
            TLVTag::FullQual64 {
                vendor_id: 0xfff1,
                profile: 0xdeed,
                tag: 0xaa55feed,
            }
        );
    }

    #[test]
    fn test_value_minimal_width() {
        assert_eq!(TLVValue::uint(0xff), TLVValue::U8(0xff));
        assert_eq!(TLVValue::uint(0x100), TLVValue::U16(0x100));
        assert_eq!(TLVValue::uint(0x1_0000), TLVValue::U32(0x1_0000));
        assert_eq!(TLVValue::uint(u64::MAX), TLVValue::U64(u64::MAX));
        assert_eq!(TLVValue::int(-17), TLVValue::S8(-17));
        assert_eq!(TLVValue::int(422), TLVValue::S16(422));
        assert_eq!(TLVValue::int(-170000), TLVValue::S32(-170000));
        assert_eq!(TLVValue::int(40000000000), TLVValue::S64(40000000000));
    }

    #[test]
    fn test_value_type_classes() {
        assert!(TLVValueType::Utf16l.is_utf8());
        assert!(!TLVValueType::Utf16l.is_str());
        assert!(TLVValueType::Str64l.is_str());
        assert_eq!(TLVValueType::Str64l.variable_size_len(), 8);
        assert_eq!(TLVValueType::Str64l.fixed_size(), None);
        assert_eq!(TLVValueType::Null.fixed_size(), Some(0));
        assert!(TLVValueType::List.is_container_start());
    }

    #[test]
    fn test_display() {
        let header = TLVHeader {
            tag: TLVTag::FullQual48 {
                vendor_id: 1,
                profile: 2,
                tag: 3,
            },
            value_type: TLVValueType::U16,
        };

        assert_eq!(header.to_string(), "FullQual48(VID:1 PRF:2 3) U16");
        assert_eq!(TLVValue::utf8("hi").to_string(), "\"hi\"");
        assert_eq!(TLVValue::str(&[1, 0xab]).to_string(), "(2)[01, AB]");
        assert_eq!(
            TLVControl::parse(0x36).unwrap().to_string(),
            "Control(Context Array)"
        );
    }

    #[test]
    fn test_limits_builder() {
        let limits = TLVLimits::new().with_max_depth(2);
        assert_eq!(limits.max_depth, 2);
        assert_eq!(limits.max_len, TLVLimits::DEFAULT_MAX_LEN);
        assert_eq!(TLVLimits::default(), TLVLimits::new());
    }
}
