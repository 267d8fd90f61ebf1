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

//! Native Rust implementation of the Matter TLV encoding
//!
//! This crate implements the Tag-Length-Value encoding used by Matter for all of its
//! interaction model payloads, certificates and persisted data. It can be run on embedded
//! devices (`no_std` + `alloc`) as well as on hosts.
//!
//! The codec is cursor based: a [`tlv::TLVWriter`] accumulates the encoding of one message
//! while tracking the stack of open containers, and a [`tlv::TLVReader`] walks an already
//! received buffer front-to-back, extracting values by the tag the caller expects.
//!
//! # Examples
//! ```
//! use rs_matter_tlv::tlv::{TLVReader, TLVTag, TLVWriter};
//!
//! let mut tw = TLVWriter::new();
//! tw.start_struct(&TLVTag::Anonymous).unwrap();
//! tw.u8(&TLVTag::Context(0), 42).unwrap();
//! tw.put_string(&TLVTag::Context(1), "Hello!").unwrap();
//! tw.end_struct().unwrap();
//!
//! let encoded = tw.into_encoded().unwrap();
//!
//! let mut tr = TLVReader::new(&encoded);
//! tr.enter_struct(&TLVTag::Anonymous).unwrap();
//! assert_eq!(tr.get_u8(&TLVTag::Context(0)).unwrap(), 42);
//! assert_eq!(tr.get_string(&TLVTag::Context(1)).unwrap(), "Hello!");
//! tr.exit_container().unwrap();
//! assert!(tr.is_exhausted());
//! ```
//! Start off exploring by going to the [tlv] module.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod data_model;
pub mod error;
pub mod tlv;
