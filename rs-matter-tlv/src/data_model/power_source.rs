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
use crate::tlv::{FromTLV, TLVReader, TLVTag, TLVWriter, ToTLV};

/// The `BatChargeFaultChangeType` structure of the Power Source cluster.
///
/// Reports the battery charge faults that are currently active and those that
/// were active before the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BatChargeFaultChangeType {
    pub current: Vec<u32>,
    pub previous: Vec<u32>,
}

impl BatChargeFaultChangeType {
    const TAG_CURRENT: u8 = 0;
    const TAG_PREVIOUS: u8 = 1;

    pub const fn new(current: Vec<u32>, previous: Vec<u32>) -> Self {
        Self { current, previous }
    }
}

impl ToTLV for BatChargeFaultChangeType {
    fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
        tw.start_struct(tag)?;
        tw.put(&TLVTag::Context(Self::TAG_CURRENT), &self.current)?;
        tw.put(&TLVTag::Context(Self::TAG_PREVIOUS), &self.previous)?;
        tw.end_struct()
    }
}

impl FromTLV<'_> for BatChargeFaultChangeType {
    fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'_>) -> Result<Self, Error> {
        tr.enter_struct(tag)?;

        let current = Vec::from_tlv(&TLVTag::Context(Self::TAG_CURRENT), tr)?;
        let previous = Vec::from_tlv(&TLVTag::Context(Self::TAG_PREVIOUS), tr)?;

        tr.exit_container()?;

        Ok(Self { current, previous })
    }
}

impl fmt::Display for BatChargeFaultChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BatChargeFaultChangeType {{")?;
        writeln!(f, "\tcurrent : {:?}", self.current)?;
        writeln!(f, "\tprevious : {:?}", self.previous)?;
        writeln!(f, "}}")
    }
}
