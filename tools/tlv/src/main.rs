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

use std::process;

use clap::Parser;
use log::{debug, error};
use rs_matter_tlv::tlv::{TLVDump, TLVLimits};

use parser::{parse_hex_string, InputBase};

/// Decode and pretty-print a Matter TLV stream
#[derive(Parser, Debug)]
#[command(name = "tlv", version, about)]
struct Args {
    /// The input is a comma-separated list of hexadecimal bytes (Default)
    #[arg(short = 'x', long, group = "base")]
    hex: bool,

    /// The input is a comma-separated list of decimal bytes
    #[arg(short, long, group = "base")]
    dec: bool,

    /// The input is one contiguous hexadecimal string
    #[arg(short = 's', long, group = "base")]
    hexstring: bool,

    /// Maximum container nesting accepted by the decoder
    #[arg(long, value_name = "DEPTH", default_value_t = TLVLimits::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// The encoded TLVs
    tlvs: String,
}

fn main() {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let tlv_list = if args.hexstring {
        match parse_hex_string(&args.tlvs) {
            Ok(list) => list,
            Err(e) => {
                error!("Invalid hex string: {e}");
                process::exit(1);
            }
        }
    } else {
        let base = if args.dec {
            InputBase::Dec
        } else {
            InputBase::Hex
        };

        base.parse_list(&args.tlvs, ',')
    };

    debug!("Decoding: {:02x?}", tlv_list.as_slice());

    let limits = TLVLimits::new().with_max_depth(args.max_depth);
    let dump = TLVDump::with_limits(&tlv_list, limits);

    print!("{dump}");

    if let Err(e) = dump.validate() {
        error!("Decoding failed: {e}");
        process::exit(1);
    }
}
