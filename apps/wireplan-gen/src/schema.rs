//! Schema document types for deserialization.
//!
//! A schema is a JSON document with a `shapes` map keyed by type name. Each
//! shape is tagged by `type`; structure members are listed in declaration
//! order and reference their value type by name or through an inline
//! `list` / `map` descriptor.
//!
//! ```json
//! {
//!   "shapes": {
//!     "Pet": {
//!       "type": "structure",
//!       "members": [
//!         { "name": "kind", "target": "string", "traits": { "required": true } },
//!         { "name": "tags", "list": { "target": "string" } }
//!       ],
//!       "traits": { "abstract": true, "discriminator": "kind" }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level schema document.
#[derive(Debug, Deserialize)]
pub struct Schema {
    /// All shapes, keyed by type name.
    pub shapes: BTreeMap<String, Shape>,
}

/// A single shape.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    /// A structured object.
    Structure(StructureShape),
    /// A string enumeration.
    Enum(EnumShape),
    /// A named alias of `string`.
    String(SimpleShape),
    /// A named alias of `boolean`.
    Boolean(SimpleShape),
    /// A named alias of `integer`.
    Integer(SimpleShape),
    /// A named alias of `long`.
    Long(SimpleShape),
    /// A named alias of `float`.
    Float(SimpleShape),
    /// A named alias of `double`.
    Double(SimpleShape),
    /// A named alias of `timestamp`.
    Timestamp(SimpleShape),
    /// A named alias of `blob`.
    Blob(SimpleShape),
}

/// A primitive alias shape.
#[derive(Debug, Default, Deserialize)]
pub struct SimpleShape {}

/// A structure shape.
#[derive(Debug, Deserialize)]
pub struct StructureShape {
    /// Own members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberShape>,
    /// Traits applied to this shape.
    #[serde(default)]
    pub traits: StructureTraits,
}

/// Structure-level traits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureTraits {
    /// Base type name.
    pub base: Option<String>,
    /// Never instantiated directly.
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    /// Discriminator member name.
    pub discriminator: Option<String>,
    /// This type's discriminator value.
    pub discriminator_value: Option<String>,
    /// XML root element name.
    pub xml_name: Option<String>,
    /// XML root namespace.
    pub xml_namespace: Option<String>,
}

/// A member within a structure.
#[derive(Debug, Deserialize)]
pub struct MemberShape {
    /// In-model member name.
    pub name: String,
    /// Value type.
    #[serde(flatten)]
    pub target: TargetRef,
    /// Traits applied to this member.
    #[serde(default)]
    pub traits: MemberTraits,
}

/// A reference to a member's value type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetRef {
    /// A named shape or built-in primitive.
    Target(String),
    /// An inline ordered sequence.
    List(Box<CollectionRef>),
    /// An inline string-keyed mapping.
    Map(Box<CollectionRef>),
}

/// An inline collection descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRef {
    /// Element (or map value) type.
    #[serde(flatten)]
    pub element: TargetRef,
    /// Whether elements may be null.
    #[serde(default)]
    pub nullable_elements: bool,
}

/// Member-level traits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTraits {
    /// Must be present.
    #[serde(default)]
    pub required: bool,
    /// Explicit null is allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Assigned only at construction.
    #[serde(default)]
    pub readonly: bool,
    /// Wire name override.
    pub json_name: Option<String>,
    /// XML element or attribute name override.
    pub xml_name: Option<String>,
    /// Placed as an XML attribute.
    #[serde(default)]
    pub xml_attribute: bool,
    /// Sequence written as repeated siblings.
    #[serde(default)]
    pub xml_flattened: bool,
    /// Item element name of a wrapped sequence.
    pub xml_item_name: Option<String>,
    /// Absorbs unknown wire keys.
    #[serde(default)]
    pub additional_properties: bool,
}

/// An enum shape.
#[derive(Debug, Deserialize)]
pub struct EnumShape {
    /// Members in declaration order.
    pub members: Vec<EnumMemberShape>,
    /// Traits applied to this shape.
    #[serde(default)]
    pub traits: EnumTraits,
}

/// One enum member.
#[derive(Debug, Deserialize)]
pub struct EnumMemberShape {
    /// In-model member name.
    pub name: String,
    /// Wire value; defaults to the member name.
    pub value: Option<String>,
}

/// Enum-level traits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTraits {
    /// Match wire values ignoring ASCII case.
    #[serde(default)]
    pub case_insensitive: bool,
    /// Preserve unknown wire values.
    #[serde(default)]
    pub open: bool,
}
