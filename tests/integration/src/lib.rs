//! End-to-end tests for wireplan.
//!
//! Every test builds the same pet-store model, plans it for both wire
//! formats and drives the real JSON and XML codecs:
//!
//! ```text
//! cargo test -p wireplan-integration
//! ```

use std::collections::BTreeMap;
use std::sync::Once;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use wireplan_codec::WireCodec;
use wireplan_core::{CancellationToken, WireFormat};
use wireplan_json::JsonCodec;
use wireplan_model::{
    CaseSensitivity, EntityType, EnumConfig, EnumMember, EnumValue, Extensibility, ObjectType,
    ObjectValue, PrimitiveKind, Property, TypeId, TypeKind, TypeRef, TypeRegistry, Value,
};
use wireplan_planner::{PlanSet, Planner};
use wireplan_xml::XmlCodec;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Handles of the pet-store model.
#[derive(Debug, Clone, Copy)]
pub struct Ids {
    /// Closed, case-sensitive `Color { Red: "red", Blue: "blue" }`.
    pub color: TypeId,
    /// Open, case-insensitive variant of the same members.
    pub open_color: TypeId,
    /// Abstract base discriminated by `discriminator`.
    pub animal: TypeId,
    /// `discriminator = "cat"`.
    pub cat: TypeId,
    /// `discriminator = "dog"`.
    pub dog: TypeId,
    /// Non-polymorphic record with an additional-properties carrier.
    pub profile: TypeId,
    /// Record without a carrier.
    pub strict: TypeId,
}

/// A sealed model plus its plans for both formats.
#[derive(Debug)]
pub struct Fixture {
    /// The sealed registry.
    pub registry: TypeRegistry,
    /// Type handles.
    pub ids: Ids,
    /// JSON plans.
    pub json: PlanSet,
    /// XML plans.
    pub xml: PlanSet,
}

/// Build the unsealed pet-store model.
pub fn build_model() -> (TypeRegistry, Ids) {
    let mut registry = TypeRegistry::new();
    let string = registry.primitive(PrimitiveKind::String);
    let integer = registry.primitive(PrimitiveKind::Integer);
    let long = registry.primitive(PrimitiveKind::Long);
    let double = registry.primitive(PrimitiveKind::Double);
    let boolean = registry.primitive(PrimitiveKind::Boolean);
    let timestamp = registry.primitive(PrimitiveKind::Timestamp);
    let blob = registry.primitive(PrimitiveKind::Blob);

    let members = || vec![EnumMember::new("Red", "red"), EnumMember::new("Blue", "blue")];
    let color = registry
        .register(EntityType::enumeration(
            "Color",
            members(),
            EnumConfig::new(CaseSensitivity::Sensitive, Extensibility::Closed),
        ))
        .expect("Color");
    let open_color = registry
        .register(EntityType::enumeration(
            "OpenColor",
            members(),
            EnumConfig::new(CaseSensitivity::Insensitive, Extensibility::Open),
        ))
        .expect("OpenColor");

    // Declared first so Profile can reference the hierarchy before it is defined.
    let animal = registry.declare("Animal").expect("declare Animal");
    let profile = registry
        .register(EntityType::object(
            "Profile",
            ObjectType::new()
                .xml_namespace("urn:wireplan:test")
                .property(Property::new("id", string).required().xml_attribute())
                .property(Property::new("title", string).nullable())
                .property(Property::new("created", timestamp))
                .property(Property::new("avatar", blob))
                .property(Property::new("score", double))
                .property(Property::new("active", boolean))
                .property(Property::new("count", long))
                .property(Property::new("status", color))
                .property(Property::new("favorite", open_color))
                .property(Property::new("tags", TypeRef::sequence(string)).xml_item_name("tag"))
                .property(
                    Property::new("aliases", TypeRef::sequence(string))
                        .xml_name("alias")
                        .xml_flattened(),
                )
                .property(Property::new("labels", TypeRef::mapping(string)))
                .property(Property::new("pet", animal))
                .property(Property::new("pets", TypeRef::sequence(animal)))
                .property(Property::new("extra", TypeRef::mapping(string)).additional_properties()),
        ))
        .expect("Profile");

    registry
        .define(
            animal,
            TypeKind::Object(
                ObjectType::new()
                    .abstract_type()
                    .discriminator("discriminator")
                    .property(Property::new("discriminator", string).required())
                    .property(Property::new("name", string)),
            ),
        )
        .expect("define Animal");
    let cat = registry
        .register(EntityType::object(
            "Cat",
            ObjectType::new()
                .extends(animal)
                .discriminator_value("cat")
                .property(Property::new("lives", integer))
                .property(Property::new("color", color)),
        ))
        .expect("Cat");
    let dog = registry
        .register(EntityType::object(
            "Dog",
            ObjectType::new()
                .extends(animal)
                .discriminator_value("dog")
                .property(Property::new("nick", string).nullable())
                .property(Property::new("tricks", TypeRef::sequence(string)))
                .property(Property::new("treats", TypeRef::mapping(long))),
        ))
        .expect("Dog");
    let strict = registry
        .register(EntityType::object(
            "Strict",
            ObjectType::new()
                .property(Property::new("id", string).required())
                .property(Property::new("note", string)),
        ))
        .expect("Strict");

    let ids = Ids {
        color,
        open_color,
        animal,
        cat,
        dog,
        profile,
        strict,
    };
    (registry, ids)
}

/// Build, seal and plan the pet-store model.
#[must_use]
pub fn fixture() -> Fixture {
    init_tracing();
    let (mut registry, ids) = build_model();
    registry.seal().expect("valid model");

    let cancel = CancellationToken::new();
    let planner = Planner::new(&registry).expect("sealed registry");
    let json = planner
        .plan_all(WireFormat::Json, &cancel, true)
        .expect("json plans");
    let xml = planner
        .plan_all(WireFormat::Xml, &cancel, true)
        .expect("xml plans");

    Fixture {
        registry,
        ids,
        json,
        xml,
    }
}

impl Fixture {
    /// The codec for `format`.
    #[must_use]
    pub fn codec(&self, format: WireFormat) -> Box<dyn WireCodec + '_> {
        match format {
            WireFormat::Json => Box::new(JsonCodec::new(&self.json)),
            WireFormat::Xml => Box::new(XmlCodec::new(&self.xml)),
        }
    }

    /// Serialize then deserialize `value` as its own type.
    #[must_use]
    pub fn round_trip(&self, format: WireFormat, value: &ObjectValue) -> ObjectValue {
        let codec = self.codec(format);
        let bytes = codec.serialize(value).expect("serialize");
        tracing::debug!(%format, payload = %String::from_utf8_lossy(&bytes), "serialized");
        codec
            .deserialize(&bytes, value.type_id)
            .unwrap_or_else(|e| {
                let payload = String::from_utf8_lossy(&bytes);
                panic!("deserialize {format}: {e}\n{payload}")
            })
    }

    /// A dog with every property populated.
    #[must_use]
    pub fn dog(&self, name: &str) -> ObjectValue {
        ObjectValue::new(self.ids.dog)
            .with("discriminator", "dog")
            .with("name", name)
            .with("nick", "buddy")
            .with(
                "tricks",
                vec![Value::from("sit"), Value::from("roll"), Value::from("beg")],
            )
            .with(
                "treats",
                BTreeMap::from([
                    ("a".to_owned(), Value::Integer(1)),
                    ("b".to_owned(), Value::Integer(2)),
                ]),
            )
    }

    /// A cat with every property populated.
    #[must_use]
    pub fn cat(&self, name: &str) -> ObjectValue {
        ObjectValue::new(self.ids.cat)
            .with("discriminator", "cat")
            .with("name", name)
            .with("lives", 9)
            .with("color", EnumValue::known("Blue"))
    }

    /// A profile with every property populated with non-null data.
    #[must_use]
    pub fn profile(&self) -> ObjectValue {
        let created = Utc
            .with_ymd_and_hms(2006, 2, 3, 16, 45, 9)
            .single()
            .expect("valid timestamp");
        ObjectValue::new(self.ids.profile)
            .with("id", "p-1")
            .with("title", "Owner & <friends>")
            .with("created", created)
            .with("avatar", Bytes::from_static(b"\x00\x01binary"))
            .with("score", 2.5)
            .with("active", true)
            .with("count", Value::Integer(1 << 40))
            .with("status", EnumValue::known("Red"))
            .with("favorite", EnumValue::known("Blue"))
            .with("tags", vec![Value::from("x"), Value::from("y")])
            .with("aliases", vec![Value::from("first"), Value::from("second")])
            .with(
                "labels",
                BTreeMap::from([("env".to_owned(), Value::from("prod"))]),
            )
            .with("pet", self.dog("Rex"))
            .with("pets", vec![Value::from(self.cat("Tom")), Value::from(self.dog("Fido"))])
            .with(
                "extra",
                BTreeMap::from([("nickname".to_owned(), Value::from("zed"))]),
            )
    }
}

mod test_collections;
mod test_enums;
mod test_fields;
mod test_planning;
mod test_roundtrip;
