//! Build-time errors raised while constructing and sealing the object model.
//!
//! Every variant names the offending type (and field where one applies). None
//! of these are recoverable: they abort the generation run.

/// Errors that can occur while building or sealing a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The same type name was defined twice with conflicting structure.
    #[error("type `{name}` is already defined with a different structure")]
    DuplicateType {
        /// The conflicting type name.
        name: String,
    },

    /// A declared type was never given a definition before sealing.
    #[error("type `{name}` was declared but never defined")]
    UndefinedType {
        /// The declared type name.
        name: String,
    },

    /// A type handle does not belong to this registry.
    #[error("unknown type id {id} referenced from `{context}`")]
    UnknownTypeId {
        /// The raw handle index.
        id: u32,
        /// Where the handle was referenced from.
        context: String,
    },

    /// A base type is not an object type.
    #[error("type `{type_name}` extends `{base}`, which is not an object type")]
    InvalidBaseType {
        /// The subtype.
        type_name: String,
        /// The offending base.
        base: String,
    },

    /// The `base` links of an object hierarchy form a cycle.
    #[error("inheritance cycle detected at type `{type_name}`")]
    InheritanceCycle {
        /// A type on the cycle.
        type_name: String,
    },

    /// Two properties of the same object share a name or wire name.
    #[error("type `{type_name}` declares `{name}` more than once")]
    DuplicateProperty {
        /// The object type.
        type_name: String,
        /// The duplicated name or wire name.
        name: String,
    },

    /// More than one own property is flagged as the additional-properties carrier.
    #[error("type `{type_name}` declares more than one additional-properties carrier")]
    MultipleAdditionalPropertiesCarriers {
        /// The object type.
        type_name: String,
    },

    /// The additional-properties carrier is not a keyed mapping.
    #[error("additional-properties carrier `{type_name}.{field}` must be a mapping")]
    InvalidAdditionalPropertiesCarrier {
        /// The object type.
        type_name: String,
        /// The carrier property.
        field: String,
    },

    /// Two members of an enum share a wire value.
    #[error("enum `{enum_name}` declares wire value `{value}` more than once")]
    DuplicateEnumWireValue {
        /// The enum type.
        enum_name: String,
        /// The duplicated wire value.
        value: String,
    },

    /// Subtypes of a hierarchy disagree on the discriminator property name.
    #[error(
        "type `{type_name}` declares discriminator `{found}` but its hierarchy uses `{expected}`"
    )]
    DiscriminatorConflict {
        /// The disagreeing subtype.
        type_name: String,
        /// The name inherited from the hierarchy.
        expected: String,
        /// The name the subtype declares.
        found: String,
    },

    /// Two concrete types of one hierarchy declare the same discriminator value.
    #[error("discriminator value `{value}` is declared by both `{first}` and `{second}`")]
    DuplicateDiscriminatorValue {
        /// The ambiguous wire value.
        value: String,
        /// The type that registered the value first.
        first: String,
        /// The type that registered it again.
        second: String,
    },

    /// The discriminator property is missing, optional, nullable or not string-like.
    #[error("invalid discriminator property `{type_name}.{field}`: {reason}")]
    InvalidDiscriminatorProperty {
        /// The type declaring the discriminator.
        type_name: String,
        /// The discriminator property name.
        field: String,
        /// Why the property is unusable.
        reason: String,
    },

    /// A concrete leaf of a discriminated hierarchy has no discriminator value.
    #[error("concrete type `{type_name}` in hierarchy `{root}` has no discriminator value")]
    UncoveredConcreteType {
        /// The uncovered leaf.
        type_name: String,
        /// The hierarchy root.
        root: String,
    },

    /// The registry was mutated after it had been sealed.
    #[error("registry is sealed; cannot modify type `{name}`")]
    RegistrySealed {
        /// The type the caller tried to declare or define.
        name: String,
    },
}
