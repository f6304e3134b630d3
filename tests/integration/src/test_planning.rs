//! Planning integration tests.

#[cfg(test)]
mod tests {
    use wireplan_core::{CancellationToken, WireFormat};
    use wireplan_model::{
        EntityType, ObjectType, PrimitiveKind, Property, TypeRef, TypeRegistry, XmlPlacement,
    };
    use wireplan_planner::{Emission, PlanError, Planner};

    use crate::{build_model, fixture};

    #[test]
    fn test_should_refuse_unsealed_registry() {
        let (registry, _) = build_model();
        assert!(matches!(
            Planner::new(&registry),
            Err(PlanError::RegistryNotSealed)
        ));
    }

    #[test]
    fn test_should_abort_cancelled_run() {
        let fx = fixture();
        let planner = Planner::new(&fx.registry).expect("sealed");
        let cancel = CancellationToken::new();
        cancel.cancel();

        for parallel in [true, false] {
            let result = planner.plan_formats(&WireFormat::ALL, &cancel, parallel);
            assert!(matches!(result, Err(PlanError::Cancelled)));
        }
    }

    #[test]
    fn test_should_plan_identically_in_parallel_and_serial() {
        let fx = fixture();
        let planner = Planner::new(&fx.registry).expect("sealed");
        let cancel = CancellationToken::new();

        let serial = planner
            .plan_formats(&WireFormat::ALL, &cancel, false)
            .expect("serial");
        let parallel = planner
            .plan_formats(&WireFormat::ALL, &cancel, true)
            .expect("parallel");
        assert_eq!(serial, parallel);
        assert_eq!(serial[0], fx.json);
        assert_eq!(serial[1], fx.xml);
    }

    #[test]
    fn test_should_restrict_discriminator_maps_to_subtree() {
        let fx = fixture();
        let animal = fx.json.type_plan(fx.ids.animal).expect("Animal plan");
        let dispatch = animal.read.discriminator.as_ref().expect("polymorphic");
        assert_eq!(dispatch.wire_name, "discriminator");
        assert_eq!(dispatch.variants.get("cat"), Some(&fx.ids.cat));
        assert_eq!(dispatch.variants.get("dog"), Some(&fx.ids.dog));

        let dog = fx.json.type_plan(fx.ids.dog).expect("Dog plan");
        let variants: Vec<_> = dog
            .read
            .discriminator
            .as_ref()
            .expect("polymorphic")
            .variants
            .keys()
            .collect();
        assert_eq!(variants, vec!["dog"]);

        let profile = fx.json.type_plan(fx.ids.profile).expect("Profile plan");
        assert!(profile.read.discriminator.is_none());
    }

    #[test]
    fn test_should_emit_discriminator_from_type() {
        let fx = fixture();
        let cat = fx.xml.type_plan(fx.ids.cat).expect("Cat plan");
        let step = cat
            .write
            .steps
            .iter()
            .find(|s| s.property == "discriminator")
            .expect("discriminator step");
        assert_eq!(
            step.emission,
            Emission::Discriminator {
                value: Some("cat".to_owned())
            }
        );
        assert_eq!(
            cat.lineage,
            vec![fx.ids.cat, fx.ids.animal],
            "lineage runs from the type to its root"
        );
    }

    #[test]
    fn test_should_route_unknown_keys_to_carrier() {
        let fx = fixture();
        let profile = fx.xml.type_plan(fx.ids.profile).expect("Profile plan");
        let carrier = profile
            .read
            .additional_properties
            .as_ref()
            .expect("carrier");
        assert_eq!(carrier.property, "extra");
        assert!(!profile.read.dispatch.contains_key("extra"));
        // Flattened sequences dispatch on the item name.
        assert!(profile.read.dispatch.contains_key("alias"));
        assert!(
            fx.json
                .type_plan(fx.ids.profile)
                .is_some_and(|p| p.read.dispatch.contains_key("aliases"))
        );

        let strict = fx.xml.type_plan(fx.ids.strict).expect("Strict plan");
        assert!(strict.read.additional_properties.is_none());
    }

    #[test]
    fn test_should_plan_enum_policies() {
        let fx = fixture();
        let color = fx.json.enum_plan(fx.ids.color).expect("Color plan");
        assert!(color.case_sensitive);
        assert!(!color.open);
        assert_eq!(color.match_wire_value("RED"), None);

        let open = fx.json.enum_plan(fx.ids.open_color).expect("OpenColor plan");
        assert!(!open.case_sensitive);
        assert!(open.open);
        assert_eq!(
            open.match_wire_value("RED").map(|m| m.name.as_str()),
            Some("Red")
        );
    }

    /// `Tagged { body, @lang }`; `lang` is a list of strings when `structured`.
    fn tagged_registry(structured: bool) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let attribute_target = if structured {
            TypeRef::sequence(string)
        } else {
            TypeRef::Named(string)
        };
        registry
            .register(EntityType::object(
                "Tagged",
                ObjectType::new()
                    .property(Property::new("body", string))
                    .property(Property::new("lang", attribute_target).xml_attribute()),
            ))
            .expect("Tagged");
        registry.seal().expect("valid model");
        registry
    }

    #[test]
    fn test_should_order_xml_attributes_before_elements() {
        let registry = tagged_registry(false);
        let id = registry.id_of("Tagged").expect("Tagged");
        let planner = Planner::new(&registry).expect("sealed");

        let xml = planner.plan_type(id, WireFormat::Xml).expect("xml plan");
        let order: Vec<_> = xml
            .write
            .steps
            .iter()
            .map(|s| (s.wire_name.as_str(), s.placement))
            .collect();
        assert_eq!(
            order,
            vec![
                ("lang", XmlPlacement::Attribute),
                ("body", XmlPlacement::Element)
            ]
        );

        let json = planner.plan_type(id, WireFormat::Json).expect("json plan");
        let order: Vec<_> = json
            .write
            .steps
            .iter()
            .map(|s| (s.wire_name.as_str(), s.placement))
            .collect();
        assert_eq!(
            order,
            vec![
                ("body", XmlPlacement::Element),
                ("lang", XmlPlacement::Element)
            ]
        );
    }

    #[test]
    fn test_should_reject_attribute_on_structured_value() {
        let registry = tagged_registry(true);
        let planner = Planner::new(&registry).expect("sealed");
        let cancel = CancellationToken::new();

        assert!(planner.plan_all(WireFormat::Json, &cancel, false).is_ok());
        assert!(matches!(
            planner.plan_all(WireFormat::Xml, &cancel, false),
            Err(PlanError::InvalidFormatConfig { field, .. }) if field == "lang"
        ));
    }

    #[test]
    fn test_should_serialize_plan_sets() {
        let fx = fixture();
        let json = serde_json::to_value(&fx.xml).expect("serializable");
        assert_eq!(json["format"], "xml");
        assert!(json["types"].as_object().is_some_and(|t| !t.is_empty()));
    }
}
