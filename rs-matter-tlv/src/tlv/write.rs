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

use alloc::vec::Vec;

use log::{error, trace};

use crate::error::{Error, ErrorCode};

use super::{TLVContainerType, TLVControl, TLVLimits, TLVTag, TLVValue, TLVValueType, ToTLV};

/// A trait representing a sink where data can be serialized as a TLV stream
/// by synchronously emitting bytes to it.
///
/// The one method that needs to be implemented is `write`.
///
/// The trait performs no validation of the container nesting; it only knows how to lay out
/// a single element on the wire. `TLVWriter` builds on top of it and keeps track of the open
/// containers.
pub trait TLVWrite {
    /// Write a TLV tag and value to the TLV stream.
    fn tlv(&mut self, tag: &TLVTag, value: &TLVValue) -> Result<(), Error> {
        self.raw_value(tag, value.value_type(), &[])?;

        match value {
            TLVValue::Str8l(a) => self.write_raw_data((a.len() as u8).to_le_bytes()),
            TLVValue::Str16l(a) => self.write_raw_data((a.len() as u16).to_le_bytes()),
            TLVValue::Str32l(a) => self.write_raw_data((a.len() as u32).to_le_bytes()),
            TLVValue::Str64l(a) => self.write_raw_data((a.len() as u64).to_le_bytes()),
            TLVValue::Utf8l(a) => self.write_raw_data((a.len() as u8).to_le_bytes()),
            TLVValue::Utf16l(a) => self.write_raw_data((a.len() as u16).to_le_bytes()),
            TLVValue::Utf32l(a) => self.write_raw_data((a.len() as u32).to_le_bytes()),
            TLVValue::Utf64l(a) => self.write_raw_data((a.len() as u64).to_le_bytes()),
            _ => Ok(()),
        }?;

        match value {
            TLVValue::S8(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::S16(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::S32(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::S64(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::U8(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::U16(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::U32(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::U64(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::F32(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::F64(a) => self.write_raw_data(a.to_le_bytes()),
            TLVValue::Utf8l(a)
            | TLVValue::Utf16l(a)
            | TLVValue::Utf32l(a)
            | TLVValue::Utf64l(a) => self.write_raw_data(a.as_bytes().iter().copied()),
            TLVValue::Str8l(a)
            | TLVValue::Str16l(a)
            | TLVValue::Str32l(a)
            | TLVValue::Str64l(a) => self.write_raw_data(a.iter().copied()),
            TLVValue::False
            | TLVValue::True
            | TLVValue::Null
            | TLVValue::Struct
            | TLVValue::Array
            | TLVValue::List
            | TLVValue::EndCnt => Ok(()),
        }
    }

    /// Write a value indicating the end of a Struct, Array, or List TLV container.
    fn end_container(&mut self) -> Result<(), Error> {
        self.write(TLVControl::END_OF_CONTAINER)
    }

    /// Write a tag and a raw, already-encoded TLV value represented as a byte slice.
    fn raw_value(
        &mut self,
        tag: &TLVTag,
        value_type: TLVValueType,
        value_payload: &[u8],
    ) -> Result<(), Error> {
        self.write(TLVControl::new(tag.tag_type(), value_type).as_raw())?;

        match tag {
            TLVTag::Anonymous => Ok(()),
            TLVTag::Context(v) => self.write(*v),
            TLVTag::CommonPrf16(v) | TLVTag::ImplPrf16(v) => self.write_raw_data(v.to_le_bytes()),
            TLVTag::CommonPrf32(v) | TLVTag::ImplPrf32(v) => self.write_raw_data(v.to_le_bytes()),
            TLVTag::FullQual48 {
                vendor_id,
                profile,
                tag,
            } => {
                self.write_raw_data(vendor_id.to_le_bytes())?;
                self.write_raw_data(profile.to_le_bytes())?;
                self.write_raw_data(tag.to_le_bytes())
            }
            TLVTag::FullQual64 {
                vendor_id,
                profile,
                tag,
            } => {
                self.write_raw_data(vendor_id.to_le_bytes())?;
                self.write_raw_data(profile.to_le_bytes())?;
                self.write_raw_data(tag.to_le_bytes())
            }
        }?;

        self.write_raw_data(value_payload.iter().copied())
    }

    /// Append multiple raw bytes to the TLV stream.
    fn write_raw_data<I>(&mut self, bytes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        for byte in bytes {
            self.write(byte)?;
        }

        Ok(())
    }

    fn write(&mut self, byte: u8) -> Result<(), Error>;
}

impl TLVWrite for Vec<u8> {
    fn write(&mut self, byte: u8) -> Result<(), Error> {
        self.push(byte);

        Ok(())
    }

    fn write_raw_data<I>(&mut self, bytes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        self.extend(bytes);

        Ok(())
    }
}

/// A TLVWrite implementation that counts the number of bytes written.
impl TLVWrite for usize {
    fn write(&mut self, _byte: u8) -> Result<(), Error> {
        *self += 1;

        Ok(())
    }
}

/// Return the number of bytes the provided element would occupy on the wire.
pub fn encoded_len(tag: &TLVTag, value: &TLVValue) -> usize {
    let mut len = 0_usize;

    // Counting never fails
    let _ = len.tlv(tag, value);

    len
}

/// An encoder that serializes one TLV message into a growable buffer.
///
/// The writer keeps an explicit stack of the containers it has opened, so that
/// mismatched or missing container ends are reported as usage errors rather than
/// silently producing an invalid encoding. Integers are always written using the
/// smallest width of their signedness that can hold the value.
#[derive(Debug, Clone)]
pub struct TLVWriter {
    buf: Vec<u8>,
    stack: Vec<TLVContainerType>,
    limits: TLVLimits,
    strict_close: bool,
}

impl TLVWriter {
    /// Create a new writer with the default limits.
    pub const fn new() -> Self {
        Self::with_limits(TLVLimits::new())
    }

    pub const fn with_limits(limits: TLVLimits) -> Self {
        Self {
            buf: Vec::new(),
            stack: Vec::new(),
            limits,
            strict_close: true,
        }
    }

    /// Set whether `end_struct`, `end_array` and `end_list` must match the kind
    /// of the innermost open container. Enabled by default.
    pub fn with_strict_close(mut self, strict_close: bool) -> Self {
        self.strict_close = strict_close;
        self
    }

    pub const fn limits(&self) -> &TLVLimits {
        &self.limits
    }

    /// Return the number of currently open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Return the number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard everything encoded so far, including any open containers.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.stack.clear();
    }

    /// Write a tag and a value indicating the start of a Struct TLV container.
    pub fn start_struct(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.start_container(tag, TLVContainerType::Struct)
    }

    /// Write a tag and a value indicating the start of an Array TLV container.
    ///
    /// All elements written into the array must be anonymous.
    pub fn start_array(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.start_container(tag, TLVContainerType::Array)
    }

    /// Write a tag and a value indicating the start of a List TLV container.
    pub fn start_list(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.start_container(tag, TLVContainerType::List)
    }

    /// Write a tag and a value indicating the start of a container of the provided kind.
    pub fn start_container(
        &mut self,
        tag: &TLVTag,
        container_type: TLVContainerType,
    ) -> Result<(), Error> {
        if self.stack.len() >= self.limits.max_depth {
            return Err(self.usage(ErrorCode::NoSpace));
        }

        let value = match container_type {
            TLVContainerType::Struct => TLVValue::Struct,
            TLVContainerType::Array => TLVValue::Array,
            TLVContainerType::List => TLVValue::List,
        };

        self.element(tag, &value)?;
        self.stack.push(container_type);

        trace!("Start {} {} at depth {}", container_type, tag, self.stack.len());

        Ok(())
    }

    /// Close the innermost open container, which must be a Struct.
    pub fn end_struct(&mut self) -> Result<(), Error> {
        self.end(Some(TLVContainerType::Struct))
    }

    /// Close the innermost open container, which must be an Array.
    pub fn end_array(&mut self) -> Result<(), Error> {
        self.end(Some(TLVContainerType::Array))
    }

    /// Close the innermost open container, which must be a List.
    pub fn end_list(&mut self) -> Result<(), Error> {
        self.end(Some(TLVContainerType::List))
    }

    /// Close the innermost open container, whatever its kind.
    pub fn end_container(&mut self) -> Result<(), Error> {
        self.end(None)
    }

    /// Write a tag and a value implementing `ToTLV`.
    pub fn put<T>(&mut self, tag: &TLVTag, value: &T) -> Result<(), Error>
    where
        T: ToTLV + ?Sized,
    {
        value.to_tlv(tag, self)
    }

    /// Write a tag and an arbitrary TLV value, verbatim.
    ///
    /// Container values are pushed onto (or, for `EndCnt`, popped from) the container stack,
    /// exactly as if the corresponding `start_*`/`end_container` method was called.
    pub fn put_value(&mut self, tag: &TLVTag, value: &TLVValue) -> Result<(), Error> {
        match value {
            TLVValue::Struct => self.start_struct(tag),
            TLVValue::Array => self.start_array(tag),
            TLVValue::List => self.start_list(tag),
            TLVValue::EndCnt => {
                if !tag.is_anonymous() {
                    return Err(self.usage(ErrorCode::InvalidArgument));
                }

                self.end_container()
            }
            _ => self.element(tag, value),
        }
    }

    /// Write a tag and a TLV UTF-8 String.
    ///
    /// The exact UTF-8 string type (Utf8l, Utf16l, Utf32l, or Utf64l) is chosen based on the length of the data,
    /// whereas the smallest type filling the provided data length is chosen.
    pub fn put_string(&mut self, tag: &TLVTag, data: &str) -> Result<(), Error> {
        self.element(tag, &TLVValue::utf8(data))
    }

    /// Write a tag and a TLV Octet String.
    ///
    /// The exact octet string type (Str8l, Str16l, Str32l, or Str64l) is chosen based on the length of the data,
    /// whereas the smallest type filling the provided data length is chosen.
    pub fn put_bytes(&mut self, tag: &TLVTag, data: &[u8]) -> Result<(), Error> {
        self.element(tag, &TLVValue::str(data))
    }

    pub fn i8(&mut self, tag: &TLVTag, data: i8) -> Result<(), Error> {
        self.i64(tag, data as i64)
    }

    pub fn u8(&mut self, tag: &TLVTag, data: u8) -> Result<(), Error> {
        self.u64(tag, data as u64)
    }

    pub fn i16(&mut self, tag: &TLVTag, data: i16) -> Result<(), Error> {
        self.i64(tag, data as i64)
    }

    pub fn u16(&mut self, tag: &TLVTag, data: u16) -> Result<(), Error> {
        self.u64(tag, data as u64)
    }

    pub fn i32(&mut self, tag: &TLVTag, data: i32) -> Result<(), Error> {
        self.i64(tag, data as i64)
    }

    pub fn u32(&mut self, tag: &TLVTag, data: u32) -> Result<(), Error> {
        self.u64(tag, data as u64)
    }

    /// Write a tag and a signed integer, using the smallest of the S8, S16, S32 or S64 types
    /// that can hold the value.
    pub fn i64(&mut self, tag: &TLVTag, data: i64) -> Result<(), Error> {
        self.element(tag, &TLVValue::int(data))
    }

    /// Write a tag and an unsigned integer, using the smallest of the U8, U16, U32 or U64 types
    /// that can hold the value.
    pub fn u64(&mut self, tag: &TLVTag, data: u64) -> Result<(), Error> {
        self.element(tag, &TLVValue::uint(data))
    }

    pub fn f32(&mut self, tag: &TLVTag, data: f32) -> Result<(), Error> {
        self.element(tag, &TLVValue::F32(data))
    }

    pub fn f64(&mut self, tag: &TLVTag, data: f64) -> Result<(), Error> {
        self.element(tag, &TLVValue::F64(data))
    }

    pub fn bool(&mut self, tag: &TLVTag, data: bool) -> Result<(), Error> {
        self.element(tag, &TLVValue::bool(data))
    }

    pub fn null(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.element(tag, &TLVValue::Null)
    }

    /// Return the encoded message.
    ///
    /// Fails if any container is still open.
    pub fn get_encoded(&self) -> Result<&[u8], Error> {
        self.check_closed()?;

        Ok(&self.buf)
    }

    /// Consume the writer and return the encoded message.
    ///
    /// Fails if any container is still open.
    pub fn into_encoded(self) -> Result<Vec<u8>, Error> {
        self.check_closed()?;

        Ok(self.buf)
    }

    fn check_closed(&self) -> Result<(), Error> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(self.usage(ErrorCode::ContainerOpen))
        }
    }

    fn end(&mut self, expected: Option<TLVContainerType>) -> Result<(), Error> {
        let Some(open) = self.stack.last().copied() else {
            return Err(self.usage(ErrorCode::NoContainer));
        };

        if let Some(expected) = expected {
            if self.strict_close && expected != open {
                return Err(self.usage(ErrorCode::ContainerMismatch));
            }
        }

        self.reserve(1)?;
        self.buf.end_container()?;
        self.stack.pop();

        trace!("End {} at depth {}", open, self.stack.len());

        Ok(())
    }

    fn element(&mut self, tag: &TLVTag, value: &TLVValue) -> Result<(), Error> {
        if matches!(self.stack.last(), Some(TLVContainerType::Array)) && !tag.is_anonymous() {
            return Err(self.usage(ErrorCode::InvalidArgument));
        }

        if !fits_length_prefix(value) {
            return Err(self.usage(ErrorCode::InvalidArgument));
        }

        self.reserve(encoded_len(tag, value))?;
        self.buf.tlv(tag, value)
    }

    fn reserve(&self, len: usize) -> Result<(), Error> {
        if self.limits.max_len.saturating_sub(self.buf.len()) < len {
            Err(self.usage(ErrorCode::NoSpace))
        } else {
            Ok(())
        }
    }

    fn usage(&self, code: ErrorCode) -> Error {
        error!(
            "TLV writer error {:?} at offset {}, depth {}",
            code,
            self.buf.len(),
            self.stack.len()
        );

        code.into()
    }
}

/// Check that the payload of a string value fits the width of its length prefix.
fn fits_length_prefix(value: &TLVValue) -> bool {
    let len = match value {
        TLVValue::Utf8l(a) | TLVValue::Utf16l(a) | TLVValue::Utf32l(a) | TLVValue::Utf64l(a) => {
            a.len()
        }
        TLVValue::Str8l(a) | TLVValue::Str16l(a) | TLVValue::Str32l(a) | TLVValue::Str64l(a) => {
            a.len()
        }
        _ => return true,
    };

    match value.value_type().variable_size_len() {
        1 => len <= u8::MAX as usize,
        2 => len <= u16::MAX as usize,
        4 => len as u64 <= u32::MAX as u64,
        _ => true,
    }
}

impl Default for TLVWriter {
    fn default() -> Self {
        Self::new()
    }
}
