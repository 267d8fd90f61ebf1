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

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;

use super::{TLVReader, TLVTag, TLVWriter};

/// A type that can be decoded from the element with the given tag at the
/// current position of a `TLVReader`.
pub trait FromTLV<'a> {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error>
    where
        Self: Sized;
}

/// A type that can be encoded as a single TLV element (possibly a container)
/// with the given tag.
pub trait ToTLV {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error>;
}

impl<T> ToTLV for &T
where
    T: ToTLV + ?Sized,
{
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        (**self).to_tlv(tag, tw)
    }
}

macro_rules! totlv_for {
    ($($t:ident)*) => {
        $(
            impl ToTLV for $t {
                fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
                    tw.$t(tag, *self)
                }
            }
        )*
    };
}

macro_rules! fromtlv_for {
    ($($t:ident => $get:ident)*) => {
        $(
            impl<'a> FromTLV<'a> for $t {
                fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
                    tr.$get(tag)
                }
            }
        )*
    };
}

// Generate ToTLV and FromTLV for the primitive data types
totlv_for!(i8 u8 i16 u16 i32 u32 i64 u64 bool f32 f64);

fromtlv_for!(
    i8 => get_i8
    u8 => get_u8
    i16 => get_i16
    u16 => get_u16
    i32 => get_i32
    u32 => get_u32
    i64 => get_i64
    u64 => get_u64
    bool => get_bool
    f32 => get_f32
    f64 => get_f64
);

impl ToTLV for str {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.put_string(tag, self)
    }
}

impl<'a> FromTLV<'a> for &'a str {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
        tr.get_string(tag)
    }
}

impl ToTLV for String {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.put_string(tag, self)
    }
}

impl FromTLV<'_> for String {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'_>) -> Result<Self, Error> {
        tr.get_string(tag).map(ToOwned::to_owned)
    }
}

/// An Octet String borrowed from the TLV buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OctetStr<'a>(pub &'a [u8]);

impl<'a> OctetStr<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self(data)
    }
}

impl<'a> FromTLV<'a> for OctetStr<'a> {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
        tr.get_bytes(tag).map(OctetStr)
    }
}

impl ToTLV for OctetStr<'_> {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.put_bytes(tag, self.0)
    }
}

/// An owned Octet String.
///
/// Unlike `Vec<u8>`, which is encoded as an array of unsigned integers,
/// `Octets` is encoded as a single Octet String element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Octets(pub Vec<u8>);

impl Octets {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Octets {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

impl FromTLV<'_> for Octets {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'_>) -> Result<Self, Error> {
        tr.get_bytes(tag).map(Octets::from)
    }
}

impl ToTLV for Octets {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.put_bytes(tag, &self.0)
    }
}

impl<T: ToTLV> ToTLV for [T] {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.start_array(tag)?;

        for element in self {
            element.to_tlv(&TLVTag::Anonymous, tw)?;
        }

        tw.end_array()
    }
}

impl<T: ToTLV> ToTLV for Vec<T> {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        self.as_slice().to_tlv(tag, tw)
    }
}

/// Vectors are decoded from arrays of anonymous elements
impl<'a, T: FromTLV<'a>> FromTLV<'a> for Vec<T> {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
        tr.enter_array(tag)?;

        let mut vec = Vec::new();

        while !tr.is_end_of_container() {
            vec.push(T::from_tlv(&TLVTag::Anonymous, tr)?);
        }

        tr.exit_container()?;

        Ok(vec)
    }
}

/// Optional struct fields.
///
/// A missing field is decoded as `None`, by peeking at the tag of the next element in the container.
/// A `None` value is not encoded at all.
impl<'a, T: FromTLV<'a>> FromTLV<'a> for Option<T> {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
        match tr.peek()? {
            Some(header) if header.tag == *tag => Ok(Some(T::from_tlv(tag, tr)?)),
            _ => Ok(None),
        }
    }
}

impl<T: ToTLV> ToTLV for Option<T> {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        match self {
            Some(s) => s.to_tlv(tag, tw),
            None => Ok(()),
        }
    }
}

/// Represent a nullable value
///
/// The value may be null or a valid value
/// Note: Null is different from Option. If the value is optional, include Option<> too. For
/// example, Option<Nullable<T>>
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Nullable<T> {
    Null,
    NotNull(T),
}

impl<T> Nullable<T> {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Null => None,
            Nullable::NotNull(t) => Some(t),
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(t) => Self::NotNull(t),
            None => Self::Null,
        }
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for Nullable<T> {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
        if tr.is_null() {
            tr.get_null(tag)?;

            Ok(Nullable::Null)
        } else {
            Ok(Nullable::NotNull(T::from_tlv(tag, tr)?))
        }
    }
}

impl<T: ToTLV> ToTLV for Nullable<T> {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        match self {
            Nullable::Null => tw.null(tag),
            Nullable::NotNull(s) => s.to_tlv(tag, tw),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::{FromTLV, Nullable, OctetStr, Octets, ToTLV};
    use crate::error::{Error, ErrorCode};
    use crate::tlv::{TLVReader, TLVTag, TLVWriter};

    #[derive(Debug, PartialEq)]
    struct TestStruct<'a> {
        a: u16,
        b: OctetStr<'a>,
        c: Option<u8>,
        d: Nullable<String>,
        e: Vec<i32>,
    }

    impl ToTLV for TestStruct<'_> {
        fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
            tw.start_struct(tag)?;
            self.a.to_tlv(&TLVTag::Context(0), tw)?;
            self.b.to_tlv(&TLVTag::Context(1), tw)?;
            self.c.to_tlv(&TLVTag::Context(2), tw)?;
            self.d.to_tlv(&TLVTag::Context(3), tw)?;
            self.e.to_tlv(&TLVTag::Context(4), tw)?;
            tw.end_struct()
        }
    }

    impl<'a> FromTLV<'a> for TestStruct<'a> {
        fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
            tr.enter_struct(tag)?;

            let value = Self {
                a: FromTLV::from_tlv(&TLVTag::Context(0), tr)?,
                b: FromTLV::from_tlv(&TLVTag::Context(1), tr)?,
                c: FromTLV::from_tlv(&TLVTag::Context(2), tr)?,
                d: FromTLV::from_tlv(&TLVTag::Context(3), tr)?,
                e: FromTLV::from_tlv(&TLVTag::Context(4), tr)?,
            };

            tr.exit_container()?;

            Ok(value)
        }
    }

    #[test]
    fn test_struct_roundtrip() {
        let test = TestStruct {
            a: 0x1234,
            b: OctetStr(&[10, 11, 12]),
            c: None,
            d: Nullable::Null,
            e: vec![1, -2, 300],
        };

        let mut tw = TLVWriter::new();
        tw.put(&TLVTag::Anonymous, &test).unwrap();
        let encoded = tw.into_encoded().unwrap();

        assert_eq!(
            encoded,
            &[
                0x15, 0x25, 0x00, 0x34, 0x12, 0x30, 0x01, 0x03, 0x0a, 0x0b, 0x0c, 0x34, 0x03, 0x36,
                0x04, 0x00, 0x01, 0x00, 0xfe, 0x01, 0x2c, 0x01, 0x18, 0x18,
            ]
        );

        let mut tr = TLVReader::new(&encoded);
        assert_eq!(TestStruct::from_tlv(&TLVTag::Anonymous, &mut tr).unwrap(), test);
        assert!(tr.is_exhausted());
    }

    #[test]
    fn test_optional_present() {
        let test = TestStruct {
            a: 1,
            b: OctetStr(&[]),
            c: Some(7),
            d: Nullable::NotNull("Hello!".into()),
            e: vec![],
        };

        let mut tw = TLVWriter::new();
        test.to_tlv(&TLVTag::Context(9), &mut tw).unwrap();
        let encoded = tw.into_encoded().unwrap();

        let mut tr = TLVReader::new(&encoded);
        assert_eq!(TestStruct::from_tlv(&TLVTag::Context(9), &mut tr).unwrap(), test);
    }

    #[test]
    fn test_octets_vs_vec() {
        let mut tw = TLVWriter::new();
        Octets::from(&[1_u8, 2][..])
            .to_tlv(&TLVTag::Anonymous, &mut tw)
            .unwrap();
        vec![1_u8, 2].to_tlv(&TLVTag::Anonymous, &mut tw).unwrap();
        let encoded = tw.into_encoded().unwrap();

        assert_eq!(
            encoded,
            &[0x10, 0x02, 0x01, 0x02, 0x16, 0x04, 0x01, 0x04, 0x02, 0x18]
        );

        let mut tr = TLVReader::new(&encoded);
        assert_eq!(
            Octets::from_tlv(&TLVTag::Anonymous, &mut tr).unwrap().as_slice(),
            &[1, 2]
        );
        assert_eq!(
            Vec::<u8>::from_tlv(&TLVTag::Anonymous, &mut tr).unwrap(),
            &[1, 2]
        );
    }

    #[test]
    fn test_vec_of_wrong_type() {
        let b = [0x16, 0x04, 0x01, 0x0c, 0x01, 0x41, 0x18];
        let mut tr = TLVReader::new(&b);

        assert_eq!(
            Vec::<u8>::from_tlv(&TLVTag::Anonymous, &mut tr)
                .unwrap_err()
                .code(),
            ErrorCode::TLVTypeMismatch
        );
    }

    #[test]
    fn test_borrowed_str() {
        let b = [0x2c, 0x01, 0x02, 0x68, 0x69];
        let mut tr = TLVReader::new(&b);

        let s: &str = FromTLV::from_tlv(&TLVTag::Context(1), &mut tr).unwrap();
        assert_eq!(s, "hi");
    }
}
