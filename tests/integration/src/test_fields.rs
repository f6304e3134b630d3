//! Absence, null, required-field and unknown-key integration tests.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wireplan_codec::{DecodeError, EncodeError, MAX_NESTING_DEPTH, WireCodec};
    use wireplan_core::{CancellationToken, WireFormat};
    use wireplan_json::JsonCodec;
    use wireplan_model::{ObjectType, ObjectValue, Property, TypeId, TypeKind, TypeRegistry, Value};
    use wireplan_planner::{PlanSet, Planner};
    use wireplan_xml::XmlCodec;

    use crate::fixture;

    /// Plans for `Node { next: Node }` in both formats.
    fn linked_list_plans() -> (TypeId, PlanSet, PlanSet) {
        let mut registry = TypeRegistry::new();
        let node = registry.declare("Node").expect("declare Node");
        registry
            .define(
                node,
                TypeKind::Object(ObjectType::new().property(Property::new("next", node))),
            )
            .expect("define Node");
        registry.seal().expect("seal");

        let cancel = CancellationToken::new();
        let planner = Planner::new(&registry).expect("planner");
        let json = planner
            .plan_all(WireFormat::Json, &cancel, false)
            .expect("json plans");
        let xml = planner
            .plan_all(WireFormat::Xml, &cancel, false)
            .expect("xml plans");
        (node, json, xml)
    }

    fn nested_json(levels: usize) -> Vec<u8> {
        format!("{}{{}}{}", r#"{"next":"#.repeat(levels), "}".repeat(levels)).into_bytes()
    }

    fn nested_xml(levels: usize) -> Vec<u8> {
        format!(
            "<Node>{}{}</Node>",
            "<next>".repeat(levels),
            "</next>".repeat(levels)
        )
        .into_bytes()
    }

    #[test]
    fn test_should_distinguish_null_from_absent_in_json() {
        let fx = fixture();
        let codec = fx.codec(WireFormat::Json);

        let with_null = ObjectValue::new(fx.ids.profile)
            .with("id", "p-2")
            .with("title", Value::Null);
        let bytes = codec.serialize(&with_null).expect("serialize");
        assert_eq!(bytes, br#"{"id":"p-2","title":null}"#);
        let decoded = codec
            .deserialize(&bytes, fx.ids.profile)
            .expect("deserialize");
        assert_eq!(decoded.get("title"), Some(&Value::Null));
        assert_eq!(decoded.get("score"), None);

        let absent = ObjectValue::new(fx.ids.profile).with("id", "p-2");
        let bytes = codec.serialize(&absent).expect("serialize");
        assert_eq!(bytes, br#"{"id":"p-2"}"#);
        let decoded = codec
            .deserialize(&bytes, fx.ids.profile)
            .expect("deserialize");
        assert_eq!(decoded.get("title"), None);
        assert_eq!(decoded, absent);
    }

    #[test]
    fn test_should_omit_null_fields_in_xml() {
        let fx = fixture();
        let with_null = ObjectValue::new(fx.ids.profile)
            .with("id", "p-2")
            .with("title", Value::Null);
        let codec = fx.codec(WireFormat::Xml);
        let bytes = codec.serialize(&with_null).expect("serialize");
        let xml = String::from_utf8_lossy(&bytes);
        assert!(!xml.contains("title"));

        let decoded = codec
            .deserialize(&bytes, fx.ids.profile)
            .expect("deserialize");
        assert_eq!(decoded.get("title"), None);
        assert_eq!(decoded.get("id"), Some(&Value::from("p-2")));
    }

    #[test]
    fn test_should_report_missing_required_field_on_read() {
        let fx = fixture();
        let json = fx
            .codec(WireFormat::Json)
            .deserialize(br#"{"title":"x"}"#, fx.ids.profile);
        let xml = fx
            .codec(WireFormat::Xml)
            .deserialize(b"<Profile><title>x</title></Profile>", fx.ids.profile);

        let expected = DecodeError::MissingRequiredField {
            type_name: "Profile".to_owned(),
            field: "id".to_owned(),
        };
        assert_eq!(json, Err(expected.clone()));
        assert_eq!(xml, Err(expected));
    }

    #[test]
    fn test_should_report_missing_required_field_on_write() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile).with("title", "x");
        for format in [WireFormat::Json, WireFormat::Xml] {
            let err = fx.codec(format).serialize(&value).expect_err("missing id");
            assert_eq!(
                err,
                EncodeError::MissingRequiredField {
                    type_name: "Profile".to_owned(),
                    field: "id".to_owned(),
                }
            );
        }
    }

    #[test]
    fn test_should_reject_null_for_non_nullable_field() {
        let fx = fixture();
        let err = fx
            .codec(WireFormat::Json)
            .deserialize(br#"{"id":"a","score":null}"#, fx.ids.profile)
            .expect_err("score is not nullable");
        assert_eq!(
            err,
            DecodeError::UnexpectedNull {
                field: "score".to_owned()
            }
        );

        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "a")
            .with("score", Value::Null);
        let err = fx
            .codec(WireFormat::Json)
            .serialize(&value)
            .expect_err("score is not nullable");
        assert_eq!(
            err,
            EncodeError::UnexpectedNull {
                field: "score".to_owned()
            }
        );
    }

    #[test]
    fn test_should_reject_invalid_scalars() {
        let fx = fixture();
        let nan = ObjectValue::new(fx.ids.profile)
            .with("id", "a")
            .with("score", f64::NAN);
        assert!(matches!(
            fx.codec(WireFormat::Json).serialize(&nan),
            Err(EncodeError::NonFiniteFloat { field }) if field == "score"
        ));

        let mismatch = ObjectValue::new(fx.ids.profile)
            .with("id", "a")
            .with("active", "yes");
        assert!(matches!(
            fx.codec(WireFormat::Xml).serialize(&mismatch),
            Err(EncodeError::TypeMismatch { field, .. }) if field == "active"
        ));

        let stamp = fx
            .codec(WireFormat::Json)
            .deserialize(br#"{"id":"a","created":"yesterday"}"#, fx.ids.profile);
        assert!(matches!(
            stamp,
            Err(DecodeError::InvalidScalar { field, .. }) if field == "created"
        ));

        let count = fx.codec(WireFormat::Xml).deserialize(
            b"<Profile id=\"a\"><count>many</count></Profile>",
            fx.ids.profile,
        );
        assert!(matches!(count, Err(DecodeError::InvalidScalar { field, .. }) if field == "count"));
    }

    #[test]
    fn test_should_reject_malformed_payloads() {
        let fx = fixture();
        assert!(matches!(
            fx.codec(WireFormat::Json)
                .deserialize(br#"{"id":"#, fx.ids.profile),
            Err(DecodeError::Syntax(_))
        ));
        assert!(matches!(
            fx.codec(WireFormat::Xml)
                .deserialize(b"<Profile id=\"a\"><title>x</Profile>", fx.ids.profile),
            Err(DecodeError::Syntax(_))
        ));
    }

    #[test]
    fn test_should_discard_unknown_keys_without_carrier() {
        let fx = fixture();
        let expected = ObjectValue::new(fx.ids.strict)
            .with("id", "a")
            .with("note", "n");

        let json = fx
            .codec(WireFormat::Json)
            .deserialize(
                br#"{"id":"a","bogus":{"deep":[1,2,{"x":null}]},"note":"n"}"#,
                fx.ids.strict,
            )
            .expect("deserialize");
        assert_eq!(json, expected);

        let xml = fx
            .codec(WireFormat::Xml)
            .deserialize(
                b"<Strict><bogus a=\"1\"><deep>1</deep><deep/></bogus>\
                  <id>a</id><note>n</note></Strict>",
                fx.ids.strict,
            )
            .expect("deserialize");
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_should_capture_unknown_keys_in_carrier() {
        let fx = fixture();
        let expected = BTreeMap::from([
            ("hobby".to_owned(), Value::from("chess")),
            ("nickname".to_owned(), Value::from("zed")),
        ]);

        let json = fx
            .codec(WireFormat::Json)
            .deserialize(
                br#"{"nickname":"zed","id":"a","hobby":"chess"}"#,
                fx.ids.profile,
            )
            .expect("deserialize");
        assert_eq!(json.get("extra"), Some(&Value::Map(expected.clone())));

        let xml = fx
            .codec(WireFormat::Xml)
            .deserialize(
                b"<Profile id=\"a\"><nickname>zed</nickname><hobby>chess</hobby></Profile>",
                fx.ids.profile,
            )
            .expect("deserialize");
        assert_eq!(xml.get("extra"), Some(&Value::Map(expected)));
    }

    #[test]
    fn test_should_not_let_carrier_shadow_declared_fields() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile).with("id", "p-1").with(
            "extra",
            BTreeMap::from([
                ("id".to_owned(), Value::from("spoofed")),
                ("k".to_owned(), Value::from("v")),
            ]),
        );
        let bytes = fx
            .codec(WireFormat::Json)
            .serialize(&value)
            .expect("serialize");
        assert_eq!(bytes, br#"{"id":"p-1","k":"v"}"#);
    }

    #[test]
    fn test_should_decode_moderately_nested_documents() {
        let (node, json, xml) = linked_list_plans();

        let decoded = JsonCodec::new(&json)
            .deserialize(&nested_json(50), node)
            .expect("json");
        let mut depth = 0;
        let mut cursor = &decoded;
        while let Some(Value::Object(next)) = cursor.get("next") {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, 50);

        let decoded = XmlCodec::new(&xml)
            .deserialize(&nested_xml(50), node)
            .expect("xml");
        assert!(decoded.get("next").is_some());
    }

    #[test]
    fn test_should_reject_documents_nested_past_the_limit() {
        let (node, json, xml) = linked_list_plans();

        let err = XmlCodec::new(&xml)
            .deserialize(&nested_xml(20_000), node)
            .expect_err("too deep");
        assert_eq!(
            err,
            DecodeError::NestingTooDeep {
                field: "next".to_owned(),
                limit: MAX_NESTING_DEPTH,
            }
        );

        let err = XmlCodec::new(&xml)
            .deserialize(&nested_xml(MAX_NESTING_DEPTH), node)
            .expect_err("one level past the limit");
        assert!(matches!(err, DecodeError::NestingTooDeep { .. }));
        XmlCodec::new(&xml)
            .deserialize(&nested_xml(MAX_NESTING_DEPTH - 1), node)
            .expect("exactly at the limit");

        // The JSON parser enforces its own recursion limit first.
        assert!(matches!(
            JsonCodec::new(&json).deserialize(&nested_json(20_000), node),
            Err(DecodeError::Syntax(_))
        ));
    }

    #[test]
    fn test_should_only_bind_fields_in_their_planned_placement() {
        let fx = fixture();
        let codec = fx.codec(WireFormat::Xml);

        // `pet` is an element-placed object; as an attribute it is an unknown key.
        let profile = codec
            .deserialize(b"<Profile id=\"p\" pet=\"x\"/>", fx.ids.profile)
            .expect("deserialize");
        assert_eq!(profile.get("pet"), None);
        assert_eq!(
            profile.get("extra"),
            Some(&Value::Map(BTreeMap::from([(
                "pet".to_owned(),
                Value::from("x")
            )])))
        );

        let strict = codec
            .deserialize(
                b"<Strict note=\"ignored\"><id>a</id></Strict>",
                fx.ids.strict,
            )
            .expect("deserialize");
        assert_eq!(strict, ObjectValue::new(fx.ids.strict).with("id", "a"));
    }

    #[test]
    fn test_should_reject_carrier_keys_that_are_not_xml_names() {
        let fx = fixture();
        for key in ["my key", "1st"] {
            let value = ObjectValue::new(fx.ids.profile).with("id", "p-1").with(
                "extra",
                BTreeMap::from([(key.to_owned(), Value::from("v"))]),
            );

            let err = fx
                .codec(WireFormat::Xml)
                .serialize(&value)
                .expect_err("not an XML name");
            assert_eq!(
                err,
                EncodeError::InvalidName {
                    name: key.to_owned(),
                    format: WireFormat::Xml,
                }
            );
            assert_eq!(fx.round_trip(WireFormat::Json, &value), value);
        }
    }
}
