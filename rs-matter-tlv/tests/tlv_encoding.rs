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

mod common;

#[cfg(test)]
mod tlv_encoding_tests {
    use rstest::rstest;

    use rs_matter_tlv::data_model::icd::ICDMonitoringEntry;
    use rs_matter_tlv::data_model::power_source::BatChargeFaultChangeType;
    use rs_matter_tlv::error::{Error, ErrorCode};
    use rs_matter_tlv::tlv::{
        FromTLV, Nullable, OctetStr, TLVDump, TLVReader, TLVTag, TLVWriter, ToTLV,
    };

    use crate::common::init_env_logger;

    #[derive(PartialEq, Debug)]
    struct SimpleStruct {
        number1: u8,
        number2: u32,
    }

    impl ToTLV for SimpleStruct {
        fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
            tw.start_struct(tag)?;
            tw.put(&TLVTag::Context(0), &self.number1)?;
            tw.put(&TLVTag::Context(1), &self.number2)?;
            tw.end_struct()
        }
    }

    impl FromTLV<'_> for SimpleStruct {
        fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'_>) -> Result<Self, Error> {
            tr.enter_struct(tag)?;

            let value = Self {
                number1: FromTLV::from_tlv(&TLVTag::Context(0), tr)?,
                number2: FromTLV::from_tlv(&TLVTag::Context(1), tr)?,
            };

            tr.exit_container()?;

            Ok(value)
        }
    }

    #[derive(PartialEq, Debug)]
    struct StructWithNesting<'a> {
        name: &'a str,
        blob: OctetStr<'a>,
        inner: Vec<SimpleStruct>,
        fallback: Nullable<SimpleStruct>,
        note: Option<String>,
    }

    impl ToTLV for StructWithNesting<'_> {
        fn to_tlv(&self, tag: &TLVTag, tw: &mut TLVWriter) -> Result<(), Error> {
            tw.start_struct(tag)?;
            tw.put(&TLVTag::Context(0), self.name)?;
            tw.put(&TLVTag::Context(1), &self.blob)?;
            tw.put(&TLVTag::Context(2), &self.inner)?;
            tw.put(&TLVTag::Context(3), &self.fallback)?;
            tw.put(&TLVTag::Context(4), &self.note)?;
            tw.end_struct()
        }
    }

    impl<'a> FromTLV<'a> for StructWithNesting<'a> {
        fn from_tlv(tag: &TLVTag, tr: &mut TLVReader<'a>) -> Result<Self, Error> {
            tr.enter_struct(tag)?;

            let value = Self {
                name: FromTLV::from_tlv(&TLVTag::Context(0), tr)?,
                blob: FromTLV::from_tlv(&TLVTag::Context(1), tr)?,
                inner: FromTLV::from_tlv(&TLVTag::Context(2), tr)?,
                fallback: FromTLV::from_tlv(&TLVTag::Context(3), tr)?,
                note: FromTLV::from_tlv(&TLVTag::Context(4), tr)?,
            };

            tr.exit_container()?;

            Ok(value)
        }
    }

    fn encode_to_tlv(what: &impl ToTLV) -> Result<Vec<u8>, Error> {
        let mut tw = TLVWriter::new();
        what.to_tlv(&TLVTag::Anonymous, &mut tw)?;

        tw.into_encoded()
    }

    fn decode_from_tlv<'a, T: FromTLV<'a>>(data: &'a [u8]) -> Result<T, Error> {
        let mut tr = TLVReader::new(data);
        let value = T::from_tlv(&TLVTag::Anonymous, &mut tr)?;

        if !tr.is_exhausted() {
            Err(ErrorCode::InvalidData)?;
        }

        Ok(value)
    }

    fn nested() -> StructWithNesting<'static> {
        StructWithNesting {
            name: "Tschüs",
            blob: OctetStr(&[0xde, 0xad]),
            inner: vec![
                SimpleStruct {
                    number1: 123,
                    number2: 0x23456,
                },
                SimpleStruct {
                    number1: 0,
                    number2: 0,
                },
            ],
            fallback: Nullable::Null,
            note: Some("note".into()),
        }
    }

    #[test]
    fn encode_simple_struct() {
        init_env_logger();

        let a = SimpleStruct {
            number1: 123,
            number2: 0x23456,
        };

        let encoded = encode_to_tlv(&a).unwrap();
        assert_eq!(
            encoded,
            &[0x15, 0x24, 0x00, 0x7b, 0x26, 0x01, 0x56, 0x34, 0x02, 0x00, 0x18]
        );

        assert_eq!(decode_from_tlv::<SimpleStruct>(&encoded).unwrap(), a);
    }

    #[test]
    fn roundtrip_nested_struct() {
        init_env_logger();

        let encoded = encode_to_tlv(&nested()).unwrap();
        let decoded: StructWithNesting = decode_from_tlv(&encoded).unwrap();

        assert_eq!(decoded, nested());
    }

    #[test]
    fn roundtrip_power_source_faults() {
        init_env_logger();

        let faults = BatChargeFaultChangeType::new(vec![1, 2], vec![]);

        let encoded = encode_to_tlv(&faults).unwrap();
        assert_eq!(
            encoded,
            &[0x15, 0x36, 0x00, 0x04, 0x01, 0x04, 0x02, 0x18, 0x36, 0x01, 0x18, 0x18]
        );

        let decoded: BatChargeFaultChangeType = decode_from_tlv(&encoded).unwrap();
        assert_eq!(decoded, faults);
    }

    #[test]
    fn roundtrip_icd_entry() {
        init_env_logger();

        let mut entry = ICDMonitoringEntry::new(0x0102_0304_0506_0708, 42);
        entry.set_key(&[0x5a; 16]).unwrap();

        let encoded = encode_to_tlv(&entry).unwrap();
        let decoded: ICDMonitoringEntry = decode_from_tlv(&encoded).unwrap();

        assert_eq!(decoded, entry);
    }

    #[test]
    fn unknown_trailing_fields_are_skipped() {
        init_env_logger();

        let mut tw = TLVWriter::new();
        tw.start_struct(&TLVTag::Anonymous).unwrap();
        tw.u8(&TLVTag::Context(0), 7).unwrap();
        tw.u32(&TLVTag::Context(1), 9).unwrap();
        tw.start_array(&TLVTag::Context(2)).unwrap();
        tw.start_list(&TLVTag::Anonymous).unwrap();
        tw.put_string(&TLVTag::ImplPrf32(77), "newer schema").unwrap();
        tw.end_list().unwrap();
        tw.end_array().unwrap();
        tw.f64(&TLVTag::Context(3), 1.5).unwrap();
        tw.end_struct().unwrap();
        tw.bool(&TLVTag::Anonymous, true).unwrap();

        let encoded = tw.into_encoded().unwrap();

        let mut tr = TLVReader::new(&encoded);
        let decoded = SimpleStruct::from_tlv(&TLVTag::Anonymous, &mut tr).unwrap();
        assert_eq!(
            decoded,
            SimpleStruct {
                number1: 7,
                number2: 9
            }
        );

        // The reader is positioned right after the struct
        assert!(tr.get_bool(&TLVTag::Anonymous).unwrap());
        assert!(tr.is_exhausted());
    }

    #[test]
    fn unbalanced_nesting_is_rejected() {
        init_env_logger();

        let mut tw = TLVWriter::new();
        tw.start_struct(&TLVTag::Anonymous).unwrap();
        tw.start_array(&TLVTag::Context(0)).unwrap();
        tw.end_container().unwrap();

        let err = tw.get_encoded().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ContainerOpen);
        assert!(err.is_usage());

        assert_eq!(
            tw.into_encoded().unwrap_err().code(),
            ErrorCode::ContainerOpen
        );
    }

    #[test]
    fn array_members_must_be_anonymous() {
        init_env_logger();

        let mut tw = TLVWriter::new();
        tw.start_array(&TLVTag::Anonymous).unwrap();
        assert!(tw.u8(&TLVTag::Context(0), 1).unwrap_err().is_usage());

        let b = [0x16, 0x04, 0x01, 0x24, 0x00, 0x02, 0x18];
        let err = decode_from_tlv::<Vec<u8>>(&b).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
        assert!(err.is_decode());
    }

    #[rstest]
    #[case::structure(&[0x15, 0x18])]
    #[case::array(&[0x16, 0x18])]
    #[case::list(&[0x17, 0x18])]
    fn empty_containers(#[case] expected: &[u8]) {
        init_env_logger();

        let mut tw = TLVWriter::new();
        match expected[0] {
            0x15 => tw.start_struct(&TLVTag::Anonymous).unwrap(),
            0x16 => tw.start_array(&TLVTag::Anonymous).unwrap(),
            _ => tw.start_list(&TLVTag::Anonymous).unwrap(),
        }
        tw.end_container().unwrap();
        assert_eq!(tw.get_encoded().unwrap(), expected);

        let mut tr = TLVReader::new(expected);
        let header = tr.peek().unwrap().unwrap();
        assert!(header.value_type.is_container_start());
        tr.skip().unwrap();
        assert!(tr.is_exhausted());
    }

    fn decode_faults(data: &[u8]) -> Result<(), Error> {
        decode_from_tlv::<BatChargeFaultChangeType>(data).map(drop)
    }

    fn decode_nested(data: &[u8]) -> Result<(), Error> {
        decode_from_tlv::<StructWithNesting>(data).map(drop)
    }

    #[rstest]
    #[case::power_source_faults(
        encode_to_tlv(&BatChargeFaultChangeType::new(vec![1, 0x10000], vec![3])).unwrap(),
        decode_faults
    )]
    #[case::nested_struct(encode_to_tlv(&nested()).unwrap(), decode_nested)]
    fn every_strict_prefix_fails(
        #[case] encoded: Vec<u8>,
        #[case] decode: fn(&[u8]) -> Result<(), Error>,
    ) {
        init_env_logger();

        decode(&encoded).unwrap();

        for len in 0..encoded.len() {
            let prefix = &encoded[..len];

            let err = decode(prefix).unwrap_err();
            assert!(err.is_decode(), "prefix of {len} bytes failed with {err:?}");

            assert!(TLVDump::new(prefix).validate().is_err() || len == 0);
        }
    }

    #[rstest]
    #[case::wrong_context(&[0x24, 0x01, 0x2a], TLVTag::Context(2), ErrorCode::TLVTagMismatch)]
    #[case::anonymous_expected(&[0x24, 0x01, 0x2a], TLVTag::Anonymous, ErrorCode::TLVTagMismatch)]
    #[case::profile_vs_context(&[0x44, 0x01, 0x00, 0x2a], TLVTag::Context(1), ErrorCode::TLVTagMismatch)]
    #[case::common_vs_implicit(&[0x44, 0x01, 0x00, 0x2a], TLVTag::ImplPrf16(1), ErrorCode::TLVTagMismatch)]
    #[case::wrong_type(&[0x2c, 0x01, 0x01, 0x41], TLVTag::Context(1), ErrorCode::TLVTypeMismatch)]
    #[case::signed_as_unsigned(&[0x20, 0x01, 0x2a], TLVTag::Context(1), ErrorCode::TLVTypeMismatch)]
    #[case::too_wide(&[0x25, 0x01, 0x00, 0x01], TLVTag::Context(1), ErrorCode::TLVTypeMismatch)]
    fn get_u8_mismatch(#[case] data: &[u8], #[case] tag: TLVTag, #[case] code: ErrorCode) {
        init_env_logger();

        let mut tr = TLVReader::new(data);
        let err = tr.get_u8(&tag).unwrap_err();

        assert_eq!(err.code(), code);
        assert!(err.is_decode());
    }

    #[test]
    fn dump_matches_structure() {
        init_env_logger();

        let encoded = encode_to_tlv(&BatChargeFaultChangeType::new(vec![1, 2], vec![])).unwrap();

        assert_eq!(
            TLVDump::new(&encoded).to_string(),
            "{\n  0: [\n    U8(0x01)\n    U8(0x02)\n  ]\n  1: [\n  ]\n}\n"
        );
    }
}
