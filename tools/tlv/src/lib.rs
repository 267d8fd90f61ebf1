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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputBase {
    Hex,
    Dec,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub input: String,
    pub error: std::num::ParseIntError,
}

impl InputBase {
    /// Parses a single input
    ///
    /// # Examples
    ///
    /// ```
    /// use parser::InputBase;
    ///
    /// assert_eq!(InputBase::Hex.try_parse("12"), Ok(0x12));
    /// assert_eq!(InputBase::Dec.try_parse("12"), Ok(12));
    /// assert_eq!(InputBase::Hex.try_parse("0x12"), Ok(0x12));
    /// assert_eq!(InputBase::Dec.try_parse("0x12"), Ok(0x12)); // always hex if prefix
    /// ```
    pub fn try_parse(self, s: impl AsRef<str>) -> Result<u8, ParseError> {
        let s = s.as_ref();

        let error_map = |error: std::num::ParseIntError| ParseError {
            input: s.into(),
            error,
        };

        if let Some(hex) = s.strip_prefix("0x") {
            // this is always hex
            return u8::from_str_radix(hex, 16).map_err(error_map);
        }

        match self {
            InputBase::Hex => u8::from_str_radix(s, 16),
            InputBase::Dec => s.parse::<u8>(),
        }
        .map_err(error_map)
    }

    /// Parses a separated list of values.
    ///
    /// # Examples
    ///
    /// ```
    /// use parser::InputBase;
    ///
    /// assert_eq!(InputBase::Hex.parse_list("1, 2, 10, 20", ','), vec![1, 2, 0x10, 0x20]);
    /// assert_eq!(InputBase::Dec.parse_list("1, 2, 10, 20", ','), vec![1, 2, 10, 20]);
    /// assert_eq!(InputBase::Dec.parse_list("1:2:3:123", ':'), vec![1, 2, 3, 123]);
    ///
    /// // Parsing is lenient (ignores/skips errors)
    /// assert_eq!(InputBase::Dec.parse_list("1, 2, foo, 10, bar, 20", ','), vec![1, 2, 10, 20]);
    /// ```
    pub fn parse_list(self, list: &str, separator: char) -> Vec<u8> {
        list.split(separator)
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .filter_map(|b| match self.try_parse(b) {
                Ok(byte) => Some(byte),
                Err(err) => {
                    eprintln!("NOTE: error parsing '{}': {:?}", err.input, err.error);
                    None
                }
            })
            .collect()
    }
}

/// Parses a contiguous hex string, as printed by most packet capture tools.
///
/// Whitespace and an optional `0x` prefix are ignored.
///
/// # Examples
///
/// ```
/// use parser::parse_hex_string;
///
/// assert_eq!(parse_hex_string("0x1518").unwrap(), vec![0x15, 0x18]);
/// assert_eq!(parse_hex_string("15 36 00 18\n18").unwrap(), vec![0x15, 0x36, 0x00, 0x18, 0x18]);
/// assert!(parse_hex_string("151").is_err());
/// ```
pub fn parse_hex_string(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);

    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    hex::decode(digits)
}
