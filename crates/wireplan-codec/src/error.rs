//! Runtime encode and decode errors.
//!
//! These are returned to callers of `serialize` / `deserialize`; they never
//! abort the process and a failed decode never yields a partial value.

use wireplan_core::WireFormat;

/// Errors raised while writing a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// A required property is absent from the instance.
    #[error("`{type_name}` is missing required field `{field}`")]
    MissingRequiredField {
        /// The object type.
        type_name: String,
        /// The missing property.
        field: String,
    },

    /// A non-nullable property or element holds an explicit null.
    #[error("`{field}` is not nullable")]
    UnexpectedNull {
        /// The property, element or entry.
        field: String,
    },

    /// The value variant does not match the planned shape.
    #[error("`{field}` expected {expected}, found {found}")]
    TypeMismatch {
        /// The property, element or entry.
        field: String,
        /// Planned shape.
        expected: String,
        /// Actual value kind.
        found: String,
    },

    /// A closed enum was given an unrecognized raw value.
    #[error("enum `{enum_name}` is closed and does not accept `{value}`")]
    UnknownEnumValue {
        /// The enum type.
        enum_name: String,
        /// The raw value.
        value: String,
    },

    /// An enum value names a member the enum does not declare.
    #[error("enum `{enum_name}` has no member `{member}`")]
    UnknownEnumMember {
        /// The enum type.
        enum_name: String,
        /// The member name.
        member: String,
    },

    /// An abstract type, or one without a discriminator value, was written as itself.
    #[error("`{type_name}` is abstract and cannot be written directly")]
    AbstractInstance {
        /// The abstract type.
        type_name: String,
    },

    /// NaN and infinities have no wire representation.
    #[error("`{field}` holds a non-finite float")]
    NonFiniteFloat {
        /// The property, element or entry.
        field: String,
    },

    /// An attribute was written after the owning element's content started.
    #[error("attribute `{name}` written after element content")]
    AttributeAfterContent {
        /// The attribute name.
        name: String,
    },

    /// A wire name cannot be represented by the target format.
    #[error("`{name}` is not a valid {format} name")]
    InvalidName {
        /// The offending key or tag.
        name: String,
        /// The target format.
        format: WireFormat,
    },

    /// The backend failed to produce output.
    #[error("backend I/O error: {0}")]
    Io(String),

    /// The backend received an event sequence it cannot represent.
    #[error("invalid writer state: {0}")]
    WriterState(String),

    /// No plan exists for the instance's type.
    #[error("no plan for type {type_id}")]
    MissingPlan {
        /// The raw type handle.
        type_id: u32,
    },

    /// The plan set targets another format.
    #[error("plan set targets {found}, codec writes {expected}")]
    FormatMismatch {
        /// The codec's format.
        expected: WireFormat,
        /// The plan set's format.
        found: WireFormat,
    },
}

/// Errors raised while reading a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// A required property received no assignment after the full scan.
    #[error("`{type_name}` is missing required field `{field}`")]
    MissingRequiredField {
        /// The object type.
        type_name: String,
        /// The missing wire name.
        field: String,
    },

    /// The discriminator value has no entry in the variant map.
    #[error("unknown discriminator value `{value}` for `{type_name}`")]
    UnknownDiscriminator {
        /// The declared type.
        type_name: String,
        /// The wire value.
        value: String,
    },

    /// A closed enum received an unrecognized wire value.
    #[error("enum `{enum_name}` does not accept `{value}`")]
    UnknownEnumValue {
        /// The enum type.
        enum_name: String,
        /// The wire value.
        value: String,
    },

    /// An explicit null arrived where the model forbids it.
    #[error("`{field}` is not nullable")]
    UnexpectedNull {
        /// The wire name, element or entry.
        field: String,
    },

    /// The wire token does not match the planned shape.
    #[error("`{field}` expected {expected}, found {found}")]
    TypeMismatch {
        /// The wire name, element or entry.
        field: String,
        /// Planned shape.
        expected: String,
        /// Actual token kind.
        found: String,
    },

    /// A scalar's text could not be converted.
    #[error("`{field}` holds invalid {kind} `{value}`")]
    InvalidScalar {
        /// The wire name, element or entry.
        field: String,
        /// The primitive kind.
        kind: String,
        /// The offending text.
        value: String,
    },

    /// The payload is not well-formed for the format.
    #[error("malformed payload: {0}")]
    Syntax(String),

    /// Objects and containers nest deeper than the decoder allows.
    #[error("`{field}` nests deeper than {limit} levels")]
    NestingTooDeep {
        /// The wire name, element or entry where the limit was hit.
        field: String,
        /// The nesting limit.
        limit: usize,
    },

    /// No plan exists for the requested type.
    #[error("no plan for type {type_id}")]
    MissingPlan {
        /// The raw type handle.
        type_id: u32,
    },

    /// The plan set targets another format.
    #[error("plan set targets {found}, codec reads {expected}")]
    FormatMismatch {
        /// The codec's format.
        expected: WireFormat,
        /// The plan set's format.
        found: WireFormat,
    },
}
