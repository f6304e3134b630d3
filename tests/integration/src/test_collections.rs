//! Sequence and mapping integration tests.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wireplan_core::WireFormat;
    use wireplan_model::{ObjectValue, Value};

    use crate::fixture;

    #[test]
    fn test_should_preserve_sequence_order_and_map_entries() {
        let fx = fixture();
        let bytes = fx
            .codec(WireFormat::Json)
            .serialize(&fx.dog("Rex"))
            .expect("serialize");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(json["tricks"], serde_json::json!(["sit", "roll", "beg"]));
        assert_eq!(json["treats"], serde_json::json!({"a": 1, "b": 2}));

        let xml = fx
            .codec(WireFormat::Xml)
            .serialize(&fx.dog("Rex"))
            .expect("serialize");
        let xml = String::from_utf8(xml).expect("valid UTF-8");
        assert!(xml.contains(
            "<tricks><member>sit</member><member>roll</member><member>beg</member></tricks>"
        ));
        assert!(xml.contains(
            "<treats><entry><key>a</key><value>1</value></entry>\
             <entry><key>b</key><value>2</value></entry></treats>"
        ));
    }

    #[test]
    fn test_should_keep_empty_wrapped_collections() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "p")
            .with("tags", Vec::<Value>::new())
            .with("labels", BTreeMap::<String, Value>::new());
        for format in [WireFormat::Json, WireFormat::Xml] {
            assert_eq!(fx.round_trip(format, &value), value, "{format}");
        }
    }

    #[test]
    fn test_should_read_back_empty_flattened_sequence_as_absent() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "p")
            .with("aliases", Vec::<Value>::new());

        let decoded = fx.round_trip(WireFormat::Xml, &value);
        assert_eq!(decoded.get("aliases"), None);

        let decoded = fx.round_trip(WireFormat::Json, &value);
        assert_eq!(decoded.get("aliases"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_should_merge_interleaved_flattened_items() {
        let fx = fixture();
        let xml = b"<Profile id=\"p\"><alias>a</alias><title>t</title><alias>b</alias></Profile>";
        let decoded = fx
            .codec(WireFormat::Xml)
            .deserialize(xml, fx.ids.profile)
            .expect("deserialize");
        assert_eq!(
            decoded.get("aliases"),
            Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(decoded.get("title"), Some(&Value::from("t")));
    }

    #[test]
    fn test_should_round_trip_nested_objects_in_collections() {
        let fx = fixture();
        let value = ObjectValue::new(fx.ids.profile)
            .with("id", "p")
            .with(
                "pets",
                vec![
                    Value::from(fx.dog("A")),
                    Value::from(fx.cat("B")),
                    Value::from(fx.dog("C")),
                ],
            );
        for format in [WireFormat::Json, WireFormat::Xml] {
            let decoded = fx.round_trip(format, &value);
            let Some(Value::List(pets)) = decoded.get("pets") else {
                panic!("pets should be a list");
            };
            let names: Vec<_> = pets
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|p| p.get("name").and_then(Value::as_str))
                .collect();
            assert_eq!(names, vec!["A", "B", "C"], "{format}");
            assert_eq!(decoded, value, "{format}");
        }
    }
}
