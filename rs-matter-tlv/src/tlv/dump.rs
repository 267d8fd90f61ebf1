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

use alloc::vec::Vec;

use crate::error::Error;

use super::{pad, TLVContainerType, TLVLimits, TLVReader};

/// A pretty printer for an encoded TLV stream.
///
/// Every top-level element is printed on its own line, with container members
/// indented by two spaces per nesting level. If the stream is malformed, the dump
/// ends with a line describing the decode error.
#[derive(Debug, Clone, Copy)]
pub struct TLVDump<'a> {
    data: &'a [u8],
    limits: TLVLimits,
}

impl<'a> TLVDump<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, TLVLimits::new())
    }

    pub const fn with_limits(data: &'a [u8], limits: TLVLimits) -> Self {
        Self { data, limits }
    }

    /// Walk the whole stream and report the first decode error, if any.
    pub fn validate(&self) -> Result<(), Error> {
        let mut tr = TLVReader::with_limits(self.data, self.limits);

        while !tr.is_exhausted() {
            tr.skip()?;
        }

        Ok(())
    }
}

const fn opening(kind: TLVContainerType) -> char {
    match kind {
        TLVContainerType::Struct => '{',
        TLVContainerType::Array => '[',
        TLVContainerType::List => '(',
    }
}

const fn closing(kind: TLVContainerType) -> char {
    match kind {
        TLVContainerType::Struct => '}',
        TLVContainerType::Array => ']',
        TLVContainerType::List => ')',
    }
}

impl fmt::Display for TLVDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tr = TLVReader::with_limits(self.data, self.limits);
        let mut open = Vec::new();

        let result = loop {
            let header = match tr.peek() {
                Ok(Some(header)) => header,
                Ok(None) => {
                    let Some(kind) = open.pop() else {
                        break Ok(());
                    };

                    if let Err(e) = tr.exit_container() {
                        break Err((e, tr.offset()));
                    }

                    pad(tr.depth(), f)?;
                    writeln!(f, "{}", closing(kind))?;

                    continue;
                }
                Err(e) => break Err((e, tr.offset())),
            };

            let offset = tr.offset();

            pad(tr.depth(), f)?;

            if !header.tag.is_anonymous() {
                write!(f, "{}: ", header.tag)?;
            }

            if let Some(kind) = TLVContainerType::from_value_type(header.value_type) {
                if let Err(e) = tr.enter(&header.tag, kind) {
                    writeln!(f)?;
                    break Err((e, offset));
                }

                open.push(kind);
                writeln!(f, "{}", opening(kind))?;
            } else {
                match tr.get_value(&header.tag) {
                    Ok(value) => writeln!(f, "{value}")?,
                    Err(e) => {
                        writeln!(f)?;
                        break Err((e, offset));
                    }
                }
            }
        };

        if let Err((e, offset)) = result {
            pad(tr.depth(), f)?;
            writeln!(f, "Error: {e} at offset {offset}")?;
        }

        Ok(())
    }
}
