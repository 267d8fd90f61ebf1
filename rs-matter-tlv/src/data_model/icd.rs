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

use log::warn;

use crate::error::{Error, ErrorCode};
use crate::tlv::{FromTLV, TLVReader, TLVTag, TLVWriter, ToTLV};

pub const UNDEFINED_NODE_ID: u64 = 0;

pub const ICD_KEY_LEN: usize = 16;

/// A persisted entry of the ICD (Intermittently Connected Device) monitoring table,
/// registering a client that expects Check-In messages.
///
/// Entries are stored as anonymous structures. Fields that are missing from the encoding
/// keep their cleared values, and unknown fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ICDMonitoringEntry {
    pub check_in_node_id: u64,
    pub monitored_subject: u64,
    pub key: Option<[u8; ICD_KEY_LEN]>,
}

impl ICDMonitoringEntry {
    const TAG_CHECK_IN_NODE_ID: u8 = 1;
    const TAG_MONITORED_SUBJECT: u8 = 2;
    const TAG_KEY: u8 = 3;

    pub const fn new(check_in_node_id: u64, monitored_subject: u64) -> Self {
        Self {
            check_in_node_id,
            monitored_subject,
            key: None,
        }
    }

    /// Set the symmetric key of the entry, which must be exactly 16 bytes long.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        if self.key.is_some() {
            Err(ErrorCode::InvalidState)?;
        }

        self.key = Some(key.try_into().map_err(|_| ErrorCode::InvalidArgument)?);

        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Return `true` if the entry can be stored in the monitoring table.
    pub fn is_valid(&self) -> bool {
        self.check_in_node_id != UNDEFINED_NODE_ID
            && self.monitored_subject != UNDEFINED_NODE_ID
            && self.key.is_some()
    }
}

impl ToTLV for ICDMonitoringEntry {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.start_struct(tag)?;
        tw.u64(
            &TLVTag::Context(Self::TAG_CHECK_IN_NODE_ID),
            self.check_in_node_id,
        )?;
        tw.u64(
            &TLVTag::Context(Self::TAG_MONITORED_SUBJECT),
            self.monitored_subject,
        )?;

        if let Some(key) = &self.key {
            tw.put_bytes(&TLVTag::Context(Self::TAG_KEY), key)?;
        }

        tw.end_struct()
    }
}

impl FromTLV<'_> for ICDMonitoringEntry {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'_>) -> Result<Self, Error> {
        tr.enter_struct(tag)?;

        let mut entry = Self::default();

        while let Some(header) = tr.peek()? {
            match header.tag {
                TLVTag::Context(Self::TAG_CHECK_IN_NODE_ID) => {
                    entry.check_in_node_id = tr.get_u64(&header.tag)?;
                }
                TLVTag::Context(Self::TAG_MONITORED_SUBJECT) => {
                    entry.monitored_subject = tr.get_u64(&header.tag)?;
                }
                TLVTag::Context(Self::TAG_KEY) => {
                    let key = tr.get_bytes(&header.tag)?;

                    entry.key = Some(key.try_into().map_err(|_| ErrorCode::InvalidData)?);
                }
                _ => {
                    warn!("Skipping unknown ICD monitoring entry field {}", header.tag);
                    tr.skip()?;
                }
            }
        }

        tr.exit_container()?;

        Ok(entry)
    }
}
