//! Entity, property and collection descriptors.
//!
//! These types are plain data: they are assembled by the schema-ingestion
//! layer, handed to the [`TypeRegistry`](crate::TypeRegistry), and are
//! read-only once the registry is sealed.

use std::fmt;

use serde::Serialize;

/// Default element name for items of a wrapped XML sequence.
pub const DEFAULT_XML_ITEM_NAME: &str = "member";

/// Stable handle to an [`EntityType`] inside a registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // Registries never approach u32::MAX entries.
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Get the arena index of this handle.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw handle value.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// `true` / `false`.
    Boolean,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// UTC instant, ISO 8601 on the wire.
    Timestamp,
    /// Binary data, base64 on the wire.
    Blob,
}

impl PrimitiveKind {
    /// All primitive kinds, in registry pre-registration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Boolean,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Timestamp,
        Self::Blob,
    ];

    /// Canonical lowercase name, also used as the registered type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Timestamp => "timestamp",
            Self::Blob => "blob",
        }
    }

    /// Parse a canonical primitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named schema-derived type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityType {
    /// Unique type name.
    pub name: String,
    /// What kind of type this is.
    pub kind: TypeKind,
}

impl EntityType {
    /// Create an object entity.
    #[must_use]
    pub fn object(name: impl Into<String>, object: ObjectType) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Object(object),
        }
    }

    /// Create an enum entity.
    #[must_use]
    pub fn enumeration(
        name: impl Into<String>,
        members: Vec<EnumMember>,
        config: EnumConfig,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Enum(EnumType { members, config }),
        }
    }

    /// Create a primitive entity named after its kind.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            name: kind.as_str().to_owned(),
            kind: TypeKind::Primitive(kind),
        }
    }

    /// Returns the object descriptor if this is an object type.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the enum descriptor if this is an enum type.
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the primitive kind if this is a primitive type.
    #[must_use]
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match &self.kind {
            TypeKind::Primitive(k) => Some(*k),
            _ => None,
        }
    }
}

/// The closed set of entity kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A built-in scalar.
    Primitive(PrimitiveKind),
    /// A string enumeration.
    Enum(EnumType),
    /// A structured object.
    Object(ObjectType),
}

/// Whether enum wire values match case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// Exact match.
    Sensitive,
    /// ASCII case-insensitive match.
    Insensitive,
}

/// What happens to wire values that match no member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extensibility {
    /// Unknown values are rejected.
    Closed,
    /// Unknown values are preserved as opaque raw values.
    Open,
}

/// Per-enum matching policy. There is deliberately no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumConfig {
    /// Case matching policy.
    pub case: CaseSensitivity,
    /// Unknown-value policy.
    pub extensibility: Extensibility,
}

impl EnumConfig {
    /// Create an enum configuration.
    #[must_use]
    pub const fn new(case: CaseSensitivity, extensibility: Extensibility) -> Self {
        Self {
            case,
            extensibility,
        }
    }

    /// Whether unknown wire values are preserved.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.extensibility, Extensibility::Open)
    }

    /// Whether wire values must match exactly.
    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        matches!(self.case, CaseSensitivity::Sensitive)
    }
}

/// One `(memberName, wireValue)` pair of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumMember {
    /// In-model member identifier.
    pub name: String,
    /// Serialized value.
    pub wire_value: String,
}

impl EnumMember {
    /// Create an enum member.
    #[must_use]
    pub fn new(name: impl Into<String>, wire_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wire_value: wire_value.into(),
        }
    }
}

/// An enumeration with its ordered members and matching policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    /// Ordered members.
    pub members: Vec<EnumMember>,
    /// Matching policy.
    pub config: EnumConfig,
}

impl EnumType {
    /// Find the member whose wire value matches `raw` under this enum's case policy.
    #[must_use]
    pub fn match_wire_value(&self, raw: &str) -> Option<&EnumMember> {
        if self.config.is_case_sensitive() {
            self.members.iter().find(|m| m.wire_value == raw)
        } else {
            self.members
                .iter()
                .find(|m| m.wire_value.eq_ignore_ascii_case(raw))
        }
    }

    /// Find a member by its in-model name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// XML naming for an object used as a document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlTypeConfig {
    /// Root element name; defaults to the type name.
    pub root_name: Option<String>,
    /// Namespace written as `xmlns` on the root element.
    pub namespace: Option<String>,
}

/// A structured object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectType {
    /// Non-owning back-reference to the base type.
    pub base: Option<TypeId>,
    /// Own properties in declaration order.
    pub properties: Vec<Property>,
    /// Name of the discriminator property, when this type roots or restates one.
    pub discriminator_property: Option<String>,
    /// Discriminator wire value identifying this concrete type.
    pub discriminator_value: Option<String>,
    /// Abstract types are never instantiated directly.
    pub is_abstract: bool,
    /// XML root naming.
    pub xml: XmlTypeConfig,
}

impl ObjectType {
    /// Create an object type with no properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base type.
    #[must_use]
    pub fn extends(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Append an own property.
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare the discriminator property by property name.
    #[must_use]
    pub fn discriminator(mut self, property: impl Into<String>) -> Self {
        self.discriminator_property = Some(property.into());
        self
    }

    /// Set the discriminator value of this concrete type.
    #[must_use]
    pub fn discriminator_value(mut self, value: impl Into<String>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }

    /// Mark the type abstract.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Override the XML root element name.
    #[must_use]
    pub fn xml_root(mut self, name: impl Into<String>) -> Self {
        self.xml.root_name = Some(name.into());
        self
    }

    /// Set the XML namespace of the root element.
    #[must_use]
    pub fn xml_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.xml.namespace = Some(namespace.into());
        self
    }

    /// The own additional-properties carrier, if one is declared.
    #[must_use]
    pub fn additional_properties_carrier(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.additional_properties)
    }
}

/// Where a property is placed in the XML representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XmlPlacement {
    /// A child element.
    #[default]
    Element,
    /// An attribute of the owning element.
    Attribute,
}

/// How an XML sequence is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStyle {
    /// One wrapping element holding one item element per entry.
    Wrapped {
        /// Item element name.
        item_name: String,
    },
    /// Items appear as repeated siblings named after the property.
    Flattened,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self::Wrapped {
            item_name: DEFAULT_XML_ITEM_NAME.to_owned(),
        }
    }
}

/// Per-property XML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlPropertyConfig {
    /// Element or attribute name overriding the wire name for XML.
    pub name: Option<String>,
    /// Attribute vs element placement.
    pub placement: XmlPlacement,
    /// Wrapped vs flattened layout for sequences.
    pub container: ContainerStyle,
}

/// Keyed vs ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionShape {
    /// Ordered sequence.
    Sequence,
    /// String-keyed mapping.
    Mapping,
}

/// A collection value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionDescriptor {
    /// Sequence or mapping.
    pub shape: CollectionShape,
    /// Element type for sequences, value type for mappings.
    pub element_type: TypeRef,
    /// Whether elements (or mapping values) may be null.
    pub elements_nullable: bool,
}

/// A reference to a property's value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    /// A registered entity.
    Named(TypeId),
    /// An inline collection.
    Collection(Box<CollectionDescriptor>),
}

impl TypeRef {
    /// A sequence of `element`.
    #[must_use]
    pub fn sequence(element: impl Into<Self>) -> Self {
        Self::collection(CollectionShape::Sequence, element.into(), false)
    }

    /// A string-keyed mapping to `value`.
    #[must_use]
    pub fn mapping(value: impl Into<Self>) -> Self {
        Self::collection(CollectionShape::Mapping, value.into(), false)
    }

    /// Build a collection reference.
    #[must_use]
    pub fn collection(shape: CollectionShape, element_type: Self, elements_nullable: bool) -> Self {
        Self::Collection(Box::new(CollectionDescriptor {
            shape,
            element_type,
            elements_nullable,
        }))
    }

    /// Allow null elements when this is a collection; no-op otherwise.
    #[must_use]
    pub fn with_nullable_elements(mut self) -> Self {
        if let Self::Collection(desc) = &mut self {
            desc.elements_nullable = true;
        }
        self
    }

    /// Returns the named handle if this is not a collection.
    #[must_use]
    pub fn as_named(&self) -> Option<TypeId> {
        match self {
            Self::Named(id) => Some(*id),
            Self::Collection(_) => None,
        }
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        Self::Named(id)
    }
}

/// A field descriptor attached to an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// In-model identifier.
    pub name: String,
    /// Serialized key or tag.
    pub wire_name: String,
    /// Value type.
    pub value_type: TypeRef,
    /// Must be present on read and always written.
    pub required: bool,
    /// Explicit null is a valid value distinct from absence.
    pub nullable: bool,
    /// Whether deserialization may assign after construction.
    pub settable_after_construction: bool,
    /// Whether this property absorbs unmatched wire keys.
    pub additional_properties: bool,
    /// XML placement and layout.
    pub xml: XmlPropertyConfig,
}

impl Property {
    /// Create an optional, non-nullable, settable property whose wire name equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: impl Into<TypeRef>) -> Self {
        let name = name.into();
        Self {
            wire_name: name.clone(),
            name,
            value_type: value_type.into(),
            required: false,
            nullable: false,
            settable_after_construction: true,
            additional_properties: false,
            xml: XmlPropertyConfig::default(),
        }
    }

    /// Set the wire name.
    #[must_use]
    pub fn wire(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// Mark the property required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the property nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Require the value to be supplied at construction time.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.settable_after_construction = false;
        self
    }

    /// Make this property the additional-properties carrier.
    #[must_use]
    pub fn additional_properties(mut self) -> Self {
        self.additional_properties = true;
        self
    }

    /// Override the XML element or attribute name.
    #[must_use]
    pub fn xml_name(mut self, name: impl Into<String>) -> Self {
        self.xml.name = Some(name.into());
        self
    }

    /// Place the property as an XML attribute.
    #[must_use]
    pub fn xml_attribute(mut self) -> Self {
        self.xml.placement = XmlPlacement::Attribute;
        self
    }

    /// Lay a sequence out as repeated sibling elements.
    #[must_use]
    pub fn xml_flattened(mut self) -> Self {
        self.xml.container = ContainerStyle::Flattened;
        self
    }

    /// Set the item element name of a wrapped sequence.
    #[must_use]
    pub fn xml_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.xml.container = ContainerStyle::Wrapped {
            item_name: item_name.into(),
        };
        self
    }

    /// The name this property uses in XML.
    #[must_use]
    pub fn xml_wire_name(&self) -> &str {
        self.xml.name.as_deref().unwrap_or(&self.wire_name)
    }
}
