//! Object model for the wireplan serialization generator.
//!
//! This crate holds the finalized, schema-derived object model the planner
//! consumes:
//!
//! - [`TypeRegistry`]: an arena of [`EntityType`]s addressed by [`TypeId`]
//!   handles, built in two phases (declare, then define) so hierarchies and
//!   self-referential graphs can be expressed before every type is known.
//! - [`Property`] and [`TypeRef`]: the per-field descriptors attached to
//!   object types, including collection descriptors and XML placement.
//! - [`Polymorphism`]: discriminator maps computed once at seal time.
//! - [`classify`]: the collection classifier used to decide whether a value
//!   is written atomically or iterated.
//! - [`Value`]: the runtime instance model walked by generated logic.

pub mod collection;
pub mod error;
pub mod polymorphism;
pub mod registry;
pub mod types;
pub mod value;

pub use collection::{Classification, classify};
pub use error::ModelError;
pub use polymorphism::{Hierarchy, Polymorphism};
pub use registry::TypeRegistry;
pub use types::{
    CaseSensitivity, CollectionDescriptor, CollectionShape, ContainerStyle, EntityType, EnumConfig,
    EnumMember, EnumType, Extensibility, ObjectType, PrimitiveKind, Property, TypeId, TypeKind,
    TypeRef, XmlPlacement, XmlPropertyConfig, XmlTypeConfig,
};
pub use value::{EnumValue, ObjectValue, Value};
