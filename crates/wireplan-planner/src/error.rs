//! Planning errors.

use wireplan_model::ModelError;

/// Errors that abort plan generation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Planning was attempted before the registry was sealed.
    #[error("type registry must be sealed before planning")]
    RegistryNotSealed,

    /// The object model is inconsistent.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Per-property format configuration cannot be honoured.
    #[error("invalid format configuration on `{type_name}.{field}`: {reason}")]
    InvalidFormatConfig {
        /// The owning object type.
        type_name: String,
        /// The offending property.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The run was cancelled between per-type plan computations.
    #[error("generation run cancelled")]
    Cancelled,

    /// The type is a primitive and has no plan of its own.
    #[error("type `{name}` cannot be planned")]
    UnknownType {
        /// The type name.
        name: String,
    },
}
