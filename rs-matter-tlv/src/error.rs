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

use core::{fmt, str::Utf8Error};

/// The two classes of failures the codec reports.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// The input is malformed or is not what the caller asked for.
    Decode,
    /// The caller drove the reader or the writer into an inconsistent state.
    Usage,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    // Decode errors
    TLVTypeMismatch,
    TLVTagMismatch,
    TruncatedPacket,
    InvalidData,
    Utf8Fail,
    TooDeep,
    TooLarge,
    // Usage errors
    InvalidState,
    NoContainer,
    ContainerMismatch,
    ContainerOpen,
    InvalidArgument,
    NoSpace,
}

impl ErrorCode {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TLVTypeMismatch
            | Self::TLVTagMismatch
            | Self::TruncatedPacket
            | Self::InvalidData
            | Self::Utf8Fail
            | Self::TooDeep
            | Self::TooLarge => ErrorKind::Decode,
            Self::InvalidState
            | Self::NoContainer
            | Self::ContainerMismatch
            | Self::ContainerOpen
            | Self::InvalidArgument
            | Self::NoSpace => ErrorKind::Usage,
        }
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

pub struct Error {
    code: ErrorCode,
    #[cfg(feature = "backtrace")]
    backtrace: std::backtrace::Backtrace,
}

impl Error {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            #[cfg(feature = "backtrace")]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }

    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Return `true` if the error was caused by malformed or unexpected input.
    pub const fn is_decode(&self) -> bool {
        matches!(self.kind(), ErrorKind::Decode)
    }

    /// Return `true` if the error was caused by a programming defect in the caller.
    pub const fn is_usage(&self) -> bool {
        matches!(self.kind(), ErrorKind::Usage)
    }

    #[cfg(feature = "backtrace")]
    pub const fn backtrace(&self) -> &std::backtrace::Backtrace {
        &self.backtrace
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Error {}

impl From<Utf8Error> for Error {
    fn from(_e: Utf8Error) -> Self {
        Self::new(ErrorCode::Utf8Fail)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(not(feature = "backtrace"))]
        {
            write!(f, "Error::{}", self)?;
        }

        #[cfg(feature = "backtrace")]
        {
            writeln!(f, "Error::{} {{", self)?;
            write!(f, "{}", self.backtrace())?;
            writeln!(f, "}}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.code())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "Error::{}", self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorCode, ErrorKind};

    #[test]
    fn test_error_kinds() {
        assert_eq!(ErrorCode::TruncatedPacket.kind(), ErrorKind::Decode);
        assert_eq!(ErrorCode::TLVTagMismatch.kind(), ErrorKind::Decode);
        assert_eq!(ErrorCode::ContainerOpen.kind(), ErrorKind::Usage);

        let err: Error = ErrorCode::NoContainer.into();
        assert!(err.is_usage());
        assert!(!err.is_decode());
    }
}
