//! Enum matching integration tests.

#[cfg(test)]
mod tests {
    use wireplan_codec::{DecodeError, EncodeError};
    use wireplan_core::WireFormat;
    use wireplan_model::{EnumValue, ObjectValue, Value};

    use crate::fixture;

    #[test]
    fn test_should_reject_unknown_value_for_closed_enum() {
        let fx = fixture();
        let err = fx
            .codec(WireFormat::Json)
            .deserialize(br#"{"id":"a","status":"green"}"#, fx.ids.profile)
            .expect_err("closed enum");
        assert_eq!(
            err,
            DecodeError::UnknownEnumValue {
                enum_name: "Color".to_owned(),
                value: "green".to_owned(),
            }
        );
    }

    #[test]
    fn test_should_match_closed_enum_case_sensitively() {
        let fx = fixture();
        let err = fx
            .codec(WireFormat::Xml)
            .deserialize(
                b"<Profile id=\"a\"><status>RED</status></Profile>",
                fx.ids.profile,
            )
            .expect_err("case-sensitive enum");
        assert!(matches!(err, DecodeError::UnknownEnumValue { value, .. } if value == "RED"));
    }

    #[test]
    fn test_should_preserve_unknown_value_for_open_enum() {
        let fx = fixture();
        for format in [WireFormat::Json, WireFormat::Xml] {
            let codec = fx.codec(format);
            let payload = match format {
                WireFormat::Json => br#"{"id":"a","favorite":"green"}"#.to_vec(),
                WireFormat::Xml => {
                    b"<Profile id=\"a\"><favorite>green</favorite></Profile>".to_vec()
                }
            };
            let decoded = codec
                .deserialize(&payload, fx.ids.profile)
                .expect("deserialize");
            assert_eq!(
                decoded.get("favorite"),
                Some(&Value::Enum(EnumValue::unknown("green"))),
                "{format}"
            );

            let rewritten = codec.serialize(&decoded).expect("serialize");
            assert!(
                String::from_utf8_lossy(&rewritten).contains("green"),
                "{format}"
            );
        }
    }

    #[test]
    fn test_should_match_open_enum_case_insensitively() {
        let fx = fixture();
        let decoded = fx
            .codec(WireFormat::Json)
            .deserialize(br#"{"id":"a","favorite":"BLUE"}"#, fx.ids.profile)
            .expect("deserialize");
        assert_eq!(
            decoded.get("favorite"),
            Some(&Value::Enum(EnumValue::known("Blue")))
        );
    }

    #[test]
    fn test_should_reject_undeclared_member_on_write() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "a")
            .with("status", EnumValue::known("Green"));
        let err = fx
            .codec(WireFormat::Json)
            .serialize(&value)
            .expect_err("no such member");
        assert_eq!(
            err,
            EncodeError::UnknownEnumMember {
                enum_name: "Color".to_owned(),
                member: "Green".to_owned(),
            }
        );

        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "a")
            .with("status", EnumValue::unknown("green"));
        let err = fx
            .codec(WireFormat::Json)
            .serialize(&value)
            .expect_err("closed enum");
        assert_eq!(
            err,
            EncodeError::UnknownEnumValue {
                enum_name: "Color".to_owned(),
                value: "green".to_owned(),
            }
        );
    }
}
