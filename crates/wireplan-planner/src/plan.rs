//! Plan types.
//!
//! Everything here is plain serializable data. The host binary dumps plan
//! sets as JSON; the runtime codecs interpret them directly.

use std::collections::BTreeMap;

use serde::Serialize;
use wireplan_core::WireFormat;
use wireplan_model::{ContainerStyle, EnumMember, PrimitiveKind, TypeId, XmlPlacement};

/// The wire shape of a value, resolved from its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum ValueShape {
    /// A built-in scalar.
    Primitive {
        /// The scalar kind.
        kind: PrimitiveKind,
    },
    /// An enum, matched through its [`EnumPlan`].
    Enum {
        /// The enum type.
        type_id: TypeId,
    },
    /// A nested object, written through its own [`TypePlan`].
    Object {
        /// The declared object type.
        type_id: TypeId,
    },
    /// An ordered sequence.
    Sequence {
        /// Element shape.
        element: Box<ValueShape>,
        /// Whether elements may be null.
        elements_nullable: bool,
        /// XML layout; ignored by tree formats.
        container: ContainerStyle,
    },
    /// A string-keyed mapping.
    Mapping {
        /// Value shape.
        value: Box<ValueShape>,
        /// Whether values may be null.
        values_nullable: bool,
    },
}

impl ValueShape {
    /// Whether this shape is written as a single scalar token.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Primitive { .. } | Self::Enum { .. })
    }
}

/// What a write step emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "emit", rename_all = "camelCase")]
pub enum Emission {
    /// The property's current value.
    Value {
        /// Resolved value shape.
        shape: ValueShape,
    },
    /// The concrete type's discriminator value, independent of instance state.
    Discriminator {
        /// `None` for abstract types that cannot be written directly.
        value: Option<String>,
    },
    /// One entry per captured unknown key, in place of the carrier property.
    AdditionalProperties {
        /// Shape of each captured value.
        value: ValueShape,
        /// Whether captured values may be null.
        values_nullable: bool,
    },
}

/// One entry of a write plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteStep {
    /// In-model property name used to read the value.
    pub property: String,
    /// Key or tag written to the wire.
    pub wire_name: String,
    /// What to emit.
    pub emission: Emission,
    /// Attribute or element; always element for tree formats.
    pub placement: XmlPlacement,
    /// The value must be present.
    pub required: bool,
    /// An explicit null is allowed.
    pub nullable: bool,
}

/// Ordered write plan of one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WritePlan {
    /// Root element name when written as a document root.
    pub root_name: String,
    /// Root namespace.
    pub namespace: Option<String>,
    /// Steps in emission order.
    pub steps: Vec<WriteStep>,
}

/// How a decoded value reaches the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentTarget {
    /// Supplied when the instance is constructed.
    Constructor,
    /// Assigned after construction.
    Setter,
}

/// Assignment action for one wire key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAction {
    /// In-model property name.
    pub property: String,
    /// Expected value shape.
    pub shape: ValueShape,
    /// Constructor or setter.
    pub target: AssignmentTarget,
    /// Whether an explicit null is accepted.
    pub nullable: bool,
    /// Where the value is expected.
    pub placement: XmlPlacement,
}

/// Concrete-type override driven by the discriminator value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatorDispatch {
    /// Discriminator property name.
    pub property: String,
    /// Discriminator key or tag on the wire.
    pub wire_name: String,
    /// Where the discriminator is expected.
    pub placement: XmlPlacement,
    /// Wire value to concrete type, restricted to this type's subtree.
    pub variants: BTreeMap<String, TypeId>,
}

/// Destination of unmatched wire keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierTarget {
    /// Carrier property name.
    pub property: String,
    /// Shape of each captured value.
    pub value: ValueShape,
    /// Whether captured values may be null.
    pub values_nullable: bool,
}

/// A property that must receive an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredField {
    /// In-model property name.
    pub property: String,
    /// Key or tag reported when it is missing.
    pub wire_name: String,
}

/// Read dispatch table of one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadPlan {
    /// Wire key or tag to assignment action.
    pub dispatch: BTreeMap<String, ReadAction>,
    /// Present when reading this type may resolve to a subtype.
    pub discriminator: Option<DiscriminatorDispatch>,
    /// Unknown-key destination, if the type has a carrier.
    pub additional_properties: Option<CarrierTarget>,
    /// Properties checked after the full scan.
    pub required: Vec<RequiredField>,
    /// Property names, constructor-assigned first.
    pub construction_order: Vec<String>,
}

/// Both plans of one object type for one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePlan {
    /// The planned type.
    pub type_id: TypeId,
    /// Its name.
    pub type_name: String,
    /// The type followed by its ancestors.
    pub lineage: Vec<TypeId>,
    /// Abstract types are never written as themselves.
    pub is_abstract: bool,
    /// Write plan.
    pub write: WritePlan,
    /// Read plan.
    pub read: ReadPlan,
}

/// Matching policy of one enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumPlan {
    /// The enum type.
    pub type_id: TypeId,
    /// Its name.
    pub type_name: String,
    /// Ordered members.
    pub members: Vec<EnumMember>,
    /// Exact matching.
    pub case_sensitive: bool,
    /// Unknown values are preserved instead of rejected.
    pub open: bool,
}

impl EnumPlan {
    /// Match a wire value under this enum's case policy.
    #[must_use]
    pub fn match_wire_value(&self, raw: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| {
            if self.case_sensitive {
                m.wire_value == raw
            } else {
                m.wire_value.eq_ignore_ascii_case(raw)
            }
        })
    }

    /// Find a member by in-model name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Every plan for one wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSet {
    /// Target format.
    pub format: WireFormat,
    /// Object plans by type.
    pub types: BTreeMap<TypeId, TypePlan>,
    /// Enum plans by type.
    pub enums: BTreeMap<TypeId, EnumPlan>,
}

impl PlanSet {
    /// Plan of an object type.
    #[must_use]
    pub fn type_plan(&self, id: TypeId) -> Option<&TypePlan> {
        self.types.get(&id)
    }

    /// Plan of an enum type.
    #[must_use]
    pub fn enum_plan(&self, id: TypeId) -> Option<&EnumPlan> {
        self.enums.get(&id)
    }

    /// Find an object plan by type name.
    #[must_use]
    pub fn type_plan_by_name(&self, name: &str) -> Option<&TypePlan> {
        self.types.values().find(|p| p.type_name == name)
    }

    /// Whether `sub` is `sup` or one of its descendants.
    #[must_use]
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        self.type_plan(sub)
            .is_some_and(|p| p.lineage.contains(&sup))
    }
}
