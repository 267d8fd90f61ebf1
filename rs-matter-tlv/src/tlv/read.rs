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

use alloc::{vec, vec::Vec};

use log::{debug, trace};

use crate::error::{Error, ErrorCode};

use super::{
    TLVContainerType, TLVControl, TLVHeader, TLVLimits, TLVTag, TLVValue, TLVValueType,
};

/// A single TLV element as laid out in the encoded stream.
///
/// For container start elements, `payload` is empty and `len` covers only the
/// control byte and the tag, not the members of the container.
#[derive(Debug, Clone)]
struct RawElement<'a> {
    control: TLVControl,
    tag: TLVTag,
    payload: &'a [u8],
    len: usize,
}

impl<'a> RawElement<'a> {
    /// Parse the element starting at `offset`.
    ///
    /// Every length field is checked against the bytes that are actually available,
    /// so a declared length can never cause a read past the end of `data`.
    fn parse(data: &'a [u8], offset: usize) -> Result<Self, Error> {
        let rest = data.get(offset..).ok_or(ErrorCode::TruncatedPacket)?;

        let control = TLVControl::parse(*rest.first().ok_or(ErrorCode::TruncatedPacket)?)?;

        let tag_size = control.tag_type.size();
        let tag_raw = rest
            .get(1..1 + tag_size)
            .ok_or(ErrorCode::TruncatedPacket)?;
        let tag = TLVTag::from_raw(control.tag_type, tag_raw);

        if control.value_type.is_container_end() && !tag.is_anonymous() {
            Err(ErrorCode::InvalidData)?;
        }

        let mut header_len = 1 + tag_size;

        let value_len = if let Some(fixed_size) = control.value_type.fixed_size() {
            fixed_size
        } else {
            let size_len = control.value_type.variable_size_len();
            let len_raw = rest
                .get(header_len..header_len + size_len)
                .ok_or(ErrorCode::TruncatedPacket)?;

            header_len += size_len;

            let mut len = [0; 8];
            len[..size_len].copy_from_slice(len_raw);

            usize::try_from(u64::from_le_bytes(len)).map_err(|_| ErrorCode::TruncatedPacket)?
        };

        let payload = rest
            .get(header_len..)
            .and_then(|value| value.get(..value_len))
            .ok_or(ErrorCode::TruncatedPacket)?;

        Ok(Self {
            control,
            tag,
            payload,
            len: header_len + value_len,
        })
    }

    fn header(&self) -> TLVHeader {
        TLVHeader {
            tag: self.tag.clone(),
            value_type: self.control.value_type,
        }
    }

    /// Decode the value of the element.
    ///
    /// UTF-8 strings are validated; container values carry no members.
    fn value(&self) -> Result<TLVValue<'a>, Error> {
        let payload = self.payload;

        let value = match self.control.value_type {
            TLVValueType::S8 => TLVValue::S8(i8::from_le_bytes(fixed(payload)?)),
            TLVValueType::S16 => TLVValue::S16(i16::from_le_bytes(fixed(payload)?)),
            TLVValueType::S32 => TLVValue::S32(i32::from_le_bytes(fixed(payload)?)),
            TLVValueType::S64 => TLVValue::S64(i64::from_le_bytes(fixed(payload)?)),
            TLVValueType::U8 => TLVValue::U8(u8::from_le_bytes(fixed(payload)?)),
            TLVValueType::U16 => TLVValue::U16(u16::from_le_bytes(fixed(payload)?)),
            TLVValueType::U32 => TLVValue::U32(u32::from_le_bytes(fixed(payload)?)),
            TLVValueType::U64 => TLVValue::U64(u64::from_le_bytes(fixed(payload)?)),
            TLVValueType::False => TLVValue::False,
            TLVValueType::True => TLVValue::True,
            TLVValueType::F32 => TLVValue::F32(f32::from_le_bytes(fixed(payload)?)),
            TLVValueType::F64 => TLVValue::F64(f64::from_le_bytes(fixed(payload)?)),
            TLVValueType::Utf8l => TLVValue::Utf8l(core::str::from_utf8(payload)?),
            TLVValueType::Utf16l => TLVValue::Utf16l(core::str::from_utf8(payload)?),
            TLVValueType::Utf32l => TLVValue::Utf32l(core::str::from_utf8(payload)?),
            TLVValueType::Utf64l => TLVValue::Utf64l(core::str::from_utf8(payload)?),
            TLVValueType::Str8l => TLVValue::Str8l(payload),
            TLVValueType::Str16l => TLVValue::Str16l(payload),
            TLVValueType::Str32l => TLVValue::Str32l(payload),
            TLVValueType::Str64l => TLVValue::Str64l(payload),
            TLVValueType::Null => TLVValue::Null,
            TLVValueType::Struct => TLVValue::Struct,
            TLVValueType::Array => TLVValue::Array,
            TLVValueType::List => TLVValue::List,
            TLVValueType::EndCnt => TLVValue::EndCnt,
        };

        Ok(value)
    }
}

fn fixed<const N: usize>(payload: &[u8]) -> Result<[u8; N], Error> {
    payload
        .try_into()
        .map_err(|_| ErrorCode::TruncatedPacket.into())
}

/// An open container on the reader's frame stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    kind: TLVContainerType,
    start: usize,
}

/// A decoder that walks a complete, already received TLV buffer front-to-back.
///
/// The caller drives the reader with the schema it expects: each `get_*` and `enter_*`
/// operation names the tag of the element it wants at the current position, and fails
/// if the element there carries a different tag or value type. Values are borrowed
/// from the input buffer.
///
/// Once a decode error has been reported, the reader is poisoned and every further
/// operation fails with `ErrorCode::InvalidState`.
#[derive(Debug, Clone)]
pub struct TLVReader<'a> {
    data: &'a [u8],
    offset: usize,
    frames: Vec<Frame>,
    limits: TLVLimits,
    failed: bool,
}

impl<'a> TLVReader<'a> {
    /// Create a new reader over `data` with the default limits.
    pub const fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, TLVLimits::new())
    }

    pub const fn with_limits(data: &'a [u8], limits: TLVLimits) -> Self {
        Self {
            data,
            offset: 0,
            frames: Vec::new(),
            limits,
            failed: false,
        }
    }

    pub const fn limits(&self) -> &TLVLimits {
        &self.limits
    }

    /// Return the position of the reader in the buffer.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Return the number of containers the reader is currently inside of.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` if the whole buffer has been consumed and no container is left open.
    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty() && self.offset >= self.data.len()
    }

    /// Return the tag and the value type of the element at the current position
    /// without consuming it.
    ///
    /// Returns `None` at the end of the current container, or when the buffer
    /// is exhausted at the top level.
    pub fn peek(&mut self) -> Result<Option<TLVHeader>, Error> {
        self.guard(|tr| Ok(tr.current()?.map(|element| element.header())))
    }

    /// Return `true` if the reader is positioned at the end of the current container,
    /// or at the end of the buffer when no container is open.
    ///
    /// Nothing is consumed. Malformed input yields `false`, so that the following read
    /// reports the actual error.
    pub fn is_end_of_container(&self) -> bool {
        !self.failed && matches!(self.current(), Ok(None))
    }

    /// Return `true` if the element at the current position is a TLV Null.
    pub fn is_null(&self) -> bool {
        !self.failed
            && matches!(
                self.current(),
                Ok(Some(element)) if element.control.value_type == TLVValueType::Null
            )
    }

    pub fn enter_struct(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.enter(tag, TLVContainerType::Struct)
    }

    pub fn enter_array(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.enter(tag, TLVContainerType::Array)
    }

    pub fn enter_list(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.enter(tag, TLVContainerType::List)
    }

    /// Enter the container with the given tag and kind at the current position.
    pub fn enter(&mut self, tag: &TLVTag, kind: TLVContainerType) -> Result<(), Error> {
        self.guard(|tr| {
            let element = tr.expect(tag)?;

            if element.control.value_type != kind.value_type() {
                Err(ErrorCode::TLVTypeMismatch)?;
            }

            if tr.frames.len() >= tr.limits.max_depth {
                Err(ErrorCode::TooDeep)?;
            }

            tr.frames.push(Frame {
                kind,
                start: tr.offset,
            });
            tr.offset += element.len;

            trace!("Enter {} {} at depth {}", kind, tag, tr.frames.len());

            Ok(())
        })
    }

    /// Leave the innermost open container.
    ///
    /// Any elements of the container that were not read yet (including nested containers)
    /// are skipped, up to and including the container end marker.
    pub fn exit_container(&mut self) -> Result<(), Error> {
        self.guard(|tr| {
            let Some(frame) = tr.frames.last().copied() else {
                return Err(ErrorCode::NoContainer.into());
            };

            tr.skip_contents(frame.kind, tr.frames.len())?;
            tr.frames.pop();

            trace!(
                "Exit {} started at offset {}, depth {}",
                frame.kind,
                frame.start,
                tr.frames.len()
            );

            Ok(())
        })
    }

    /// Advance past the element at the current position without interpreting its value.
    ///
    /// For containers, the whole container including its members is skipped.
    pub fn skip(&mut self) -> Result<(), Error> {
        self.guard(|tr| {
            let Some(element) = tr.current()? else {
                return Err(if tr.frames.is_empty() {
                    ErrorCode::TruncatedPacket
                } else {
                    ErrorCode::InvalidData
                }
                .into());
            };

            tr.offset += element.len;

            if let Some(kind) = TLVContainerType::from_value_type(element.control.value_type) {
                let depth = tr.frames.len() + 1;

                if depth > tr.limits.max_depth {
                    Err(ErrorCode::TooDeep)?;
                }

                tr.skip_contents(kind, depth)?;
            }

            Ok(())
        })
    }

    /// Read the value of the element with the given tag at the current position.
    ///
    /// Any scalar value is accepted; containers are not.
    pub fn get_value(&mut self, tag: &TLVTag) -> Result<TLVValue<'a>, Error> {
        self.read(tag, |value| {
            (!value.value_type().is_container_start()).then_some(value)
        })
    }

    /// Read an unsigned integer of any width.
    pub fn get_uint(&mut self, tag: &TLVTag) -> Result<u64, Error> {
        self.read(tag, |value| value.as_uint())
    }

    /// Read a signed integer of any width.
    pub fn get_int(&mut self, tag: &TLVTag) -> Result<i64, Error> {
        self.read(tag, |value| value.as_int())
    }

    pub fn get_u8(&mut self, tag: &TLVTag) -> Result<u8, Error> {
        self.read(tag, |value| value.as_uint()?.try_into().ok())
    }

    pub fn get_u16(&mut self, tag: &TLVTag) -> Result<u16, Error> {
        self.read(tag, |value| value.as_uint()?.try_into().ok())
    }

    pub fn get_u32(&mut self, tag: &TLVTag) -> Result<u32, Error> {
        self.read(tag, |value| value.as_uint()?.try_into().ok())
    }

    pub fn get_u64(&mut self, tag: &TLVTag) -> Result<u64, Error> {
        self.get_uint(tag)
    }

    pub fn get_i8(&mut self, tag: &TLVTag) -> Result<i8, Error> {
        self.read(tag, |value| value.as_int()?.try_into().ok())
    }

    pub fn get_i16(&mut self, tag: &TLVTag) -> Result<i16, Error> {
        self.read(tag, |value| value.as_int()?.try_into().ok())
    }

    pub fn get_i32(&mut self, tag: &TLVTag) -> Result<i32, Error> {
        self.read(tag, |value| value.as_int()?.try_into().ok())
    }

    pub fn get_i64(&mut self, tag: &TLVTag) -> Result<i64, Error> {
        self.get_int(tag)
    }

    pub fn get_bool(&mut self, tag: &TLVTag) -> Result<bool, Error> {
        self.read(tag, |value| match value {
            TLVValue::True => Some(true),
            TLVValue::False => Some(false),
            _ => None,
        })
    }

    pub fn get_f32(&mut self, tag: &TLVTag) -> Result<f32, Error> {
        self.read(tag, |value| match value {
            TLVValue::F32(a) => Some(a),
            _ => None,
        })
    }

    /// Read a floating point number. Single precision values are widened.
    pub fn get_f64(&mut self, tag: &TLVTag) -> Result<f64, Error> {
        self.read(tag, |value| match value {
            TLVValue::F32(a) => Some(a as f64),
            TLVValue::F64(a) => Some(a),
            _ => None,
        })
    }

    /// Read a UTF-8 string of any length encoding.
    pub fn get_string(&mut self, tag: &TLVTag) -> Result<&'a str, Error> {
        self.read(tag, |value| match value {
            TLVValue::Utf8l(a) | TLVValue::Utf16l(a) | TLVValue::Utf32l(a) | TLVValue::Utf64l(a) => {
                Some(a)
            }
            _ => None,
        })
    }

    /// Read an octet string of any length encoding.
    pub fn get_bytes(&mut self, tag: &TLVTag) -> Result<&'a [u8], Error> {
        self.read(tag, |value| match value {
            TLVValue::Str8l(a) | TLVValue::Str16l(a) | TLVValue::Str32l(a) | TLVValue::Str64l(a) => {
                Some(a)
            }
            _ => None,
        })
    }

    pub fn get_null(&mut self, tag: &TLVTag) -> Result<(), Error> {
        self.read(tag, |value| matches!(value, TLVValue::Null).then_some(()))
    }

    /// Read the element with the given tag and convert its value with `f`.
    ///
    /// The element is consumed only if `f` accepts the value.
    fn read<T, F>(&mut self, tag: &TLVTag, f: F) -> Result<T, Error>
    where
        F: FnOnce(TLVValue<'a>) -> Option<T>,
    {
        self.guard(|tr| {
            let element = tr.expect(tag)?;
            let value = f(element.value()?).ok_or(ErrorCode::TLVTypeMismatch)?;

            tr.offset += element.len;

            Ok(value)
        })
    }

    /// Return the element at the current position, which must carry `tag`.
    fn expect(&self, tag: &TLVTag) -> Result<RawElement<'a>, Error> {
        let Some(element) = self.current()? else {
            return Err(if self.frames.is_empty() {
                ErrorCode::TruncatedPacket
            } else {
                ErrorCode::TLVTagMismatch
            }
            .into());
        };

        if element.tag != *tag {
            Err(ErrorCode::TLVTagMismatch)?;
        }

        Ok(element)
    }

    /// Parse the element at the current position.
    ///
    /// Returns `None` at the end marker of the current container, and at the end of
    /// the buffer when no container is open.
    fn current(&self) -> Result<Option<RawElement<'a>>, Error> {
        if self.data.len() > self.limits.max_len {
            Err(ErrorCode::TooLarge)?;
        }

        if self.offset >= self.data.len() {
            return if self.frames.is_empty() {
                Ok(None)
            } else {
                Err(ErrorCode::TruncatedPacket.into())
            };
        }

        let element = RawElement::parse(self.data, self.offset)?;

        let Some(frame) = self.frames.last() else {
            if element.control.is_container_end() {
                // An end marker with no container to close
                Err(ErrorCode::InvalidData)?;
            }

            return Ok(Some(element));
        };

        if element.control.is_container_end() {
            Ok(None)
        } else if frame.kind == TLVContainerType::Array && !element.tag.is_anonymous() {
            Err(ErrorCode::InvalidData.into())
        } else {
            Ok(Some(element))
        }
    }

    /// Consume elements up to and including the end marker closing the container
    /// of kind `kind` the reader is positioned in, which is at nesting `depth`.
    ///
    /// Skipped members are held to the same rules as members that are read.
    fn skip_contents(&mut self, kind: TLVContainerType, depth: usize) -> Result<(), Error> {
        let mut open = vec![kind];

        while let Some(innermost) = open.last().copied() {
            let element = RawElement::parse(self.data, self.offset)?;

            self.offset += element.len;

            if element.control.is_container_end() {
                open.pop();
                continue;
            }

            if innermost == TLVContainerType::Array && !element.tag.is_anonymous() {
                Err(ErrorCode::InvalidData)?;
            }

            if let Some(nested) = TLVContainerType::from_value_type(element.control.value_type) {
                open.push(nested);

                if depth + open.len() - 1 > self.limits.max_depth {
                    Err(ErrorCode::TooDeep)?;
                }
            }
        }

        Ok(())
    }

    fn guard<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        if self.failed {
            Err(ErrorCode::InvalidState)?;
        }

        let offset = self.offset;
        let result = f(self);

        if let Err(e) = &result {
            if e.is_decode() {
                debug!(
                    "TLV decode error {:?} at offset {}, depth {}",
                    e.code(),
                    offset,
                    self.frames.len()
                );

                self.failed = true;
            }
        }

        result
    }
}
