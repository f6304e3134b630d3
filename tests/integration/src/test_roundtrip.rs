//! Round-trip integration tests over both wire formats.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use wireplan_core::WireFormat;
    use wireplan_model::{ObjectValue, Value};

    use crate::fixture;

    #[test]
    fn test_should_round_trip_full_profile_as_json() {
        let fx = fixture();
        let profile = fx.profile();
        assert_eq!(fx.round_trip(WireFormat::Json, &profile), profile);
    }

    #[test]
    fn test_should_round_trip_full_profile_as_xml() {
        let fx = fixture();
        let profile = fx.profile();
        assert_eq!(fx.round_trip(WireFormat::Xml, &profile), profile);
    }

    #[test]
    fn test_should_round_trip_sub_millisecond_timestamps() {
        let fx = fixture();
        let created = Utc
            .timestamp_opt(1_000_000_000, 123_456_789)
            .single()
            .expect("valid instant");
        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "p-1")
            .with("created", created);

        for format in [WireFormat::Json, WireFormat::Xml] {
            assert_eq!(fx.round_trip(format, &value), value);
        }
        let bytes = fx
            .codec(WireFormat::Json)
            .serialize(&value)
            .expect("serialize");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(json["created"], "2001-09-09T01:46:40.123456789Z");
    }

    #[test]
    fn test_should_write_json_scalar_conventions() {
        let fx = fixture();
        let bytes = fx
            .codec(WireFormat::Json)
            .serialize(&fx.profile())
            .expect("serialize");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

        assert_eq!(json["id"], "p-1");
        assert_eq!(json["created"], "2006-02-03T16:45:09.000Z");
        assert_eq!(json["avatar"], "AAFiaW5hcnk=");
        assert_eq!(json["score"], 2.5);
        assert_eq!(json["active"], true);
        assert_eq!(json["count"], 1_i64 << 40);
        assert_eq!(json["status"], "red");
        assert_eq!(json["pet"]["discriminator"], "dog");
        assert_eq!(json["pets"][0]["discriminator"], "cat");
        // Carrier entries sit beside the declared fields.
        assert_eq!(json["nickname"], "zed");
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn test_should_write_xml_layout() {
        let fx = fixture();
        let bytes = fx
            .codec(WireFormat::Xml)
            .serialize(&fx.profile())
            .expect("serialize");
        let xml = String::from_utf8(bytes).expect("valid UTF-8");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Profile xmlns=\"urn:wireplan:test\" id=\"p-1\">"));
        assert!(xml.contains("<title>Owner &amp; &lt;friends&gt;</title>"));
        assert!(xml.contains("<tags><tag>x</tag><tag>y</tag></tags>"));
        assert!(xml.contains("<alias>first</alias><alias>second</alias>"));
        assert!(!xml.contains("<aliases>"));
        assert!(xml.contains("<labels><entry><key>env</key><value>prod</value></entry></labels>"));
        assert!(xml.contains("<nickname>zed</nickname>"));
        assert!(xml.ends_with("</Profile>"));
    }

    #[test]
    fn test_should_resolve_concrete_type_from_declared_base() {
        let fx = fixture();
        let dog = fx.dog("Rex");
        for format in [WireFormat::Json, WireFormat::Xml] {
            let codec = fx.codec(format);
            let bytes = codec.serialize(&dog).expect("serialize");
            let decoded = codec
                .deserialize(&bytes, fx.ids.animal)
                .expect("deserialize");
            assert_eq!(decoded.type_id, fx.ids.dog, "{format}");
            assert_eq!(decoded, dog, "{format}");
        }
    }

    #[test]
    fn test_should_write_discriminator_from_concrete_type() {
        let fx = fixture();
        // The instance claims "cat" but is a Dog; the type wins.
        let dog = ObjectValue::new(fx.ids.dog)
            .with("discriminator", "cat")
            .with("name", "Rex");
        let bytes = fx
            .codec(WireFormat::Json)
            .serialize(&dog)
            .expect("serialize");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(json["discriminator"], "dog");

        let unset = ObjectValue::new(fx.ids.cat).with("name", "Tom");
        let decoded = fx.round_trip(WireFormat::Xml, &unset);
        assert_eq!(decoded.get("discriminator"), Some(&Value::from("cat")));
    }

    #[test]
    fn test_should_reject_plans_for_other_format() {
        let fx = fixture();
        let codec = wireplan_json::JsonCodec::new(&fx.xml);
        let err = wireplan_codec::WireCodec::serialize(&codec, &fx.profile())
            .expect_err("format mismatch");
        assert_eq!(
            err,
            wireplan_codec::EncodeError::FormatMismatch {
                expected: WireFormat::Json,
                found: WireFormat::Xml,
            }
        );
    }
}
