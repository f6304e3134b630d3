//! Schema ingestion: turns a [`Schema`] into a sealed [`TypeRegistry`].
//!
//! Every structure and enum is declared before any is defined, so members may
//! reference types that appear later in the document, including the type
//! that owns them.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use wireplan_model::{
    CaseSensitivity, CollectionShape, EnumConfig, EnumMember, EnumType, Extensibility, ObjectType,
    PrimitiveKind, Property, TypeId, TypeKind, TypeRef, TypeRegistry,
};

use crate::schema::{
    CollectionRef, EnumShape, MemberShape, Schema, Shape, StructureShape, TargetRef,
};

/// Declare, define and seal every shape of `schema`.
pub fn build_registry(schema: &Schema) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    for (name, shape) in &schema.shapes {
        if matches!(shape, Shape::Structure(_) | Shape::Enum(_)) {
            registry
                .declare(name)
                .with_context(|| format!("failed to declare `{name}`"))?;
        }
    }

    for (name, shape) in &schema.shapes {
        let kind = match shape {
            Shape::Structure(structure) => {
                TypeKind::Object(build_object(schema, &registry, name, structure)?)
            }
            Shape::Enum(shape) => TypeKind::Enum(build_enum(shape)),
            _ => continue,
        };
        let id = registry
            .id_of(name)
            .with_context(|| format!("shape `{name}` was not declared"))?;
        registry
            .define(id, kind)
            .with_context(|| format!("failed to define `{name}`"))?;
        debug!(name, %id, "defined shape");
    }

    registry.seal().context("schema failed validation")?;
    info!(types = registry.len(), "ingested schema");
    Ok(registry)
}

fn build_object(
    schema: &Schema,
    registry: &TypeRegistry,
    name: &str,
    shape: &StructureShape,
) -> Result<ObjectType> {
    let traits = &shape.traits;
    let mut object = ObjectType::new();

    if let Some(base) = &traits.base {
        object = object.extends(resolve_target(schema, registry, base, name)?);
    }
    if let Some(discriminator) = &traits.discriminator {
        object = object.discriminator(discriminator.as_str());
    }
    if let Some(value) = &traits.discriminator_value {
        object = object.discriminator_value(value.as_str());
    }
    if traits.is_abstract {
        object = object.abstract_type();
    }
    if let Some(root) = &traits.xml_name {
        object = object.xml_root(root.as_str());
    }
    if let Some(namespace) = &traits.xml_namespace {
        object = object.xml_namespace(namespace.as_str());
    }

    for member in &shape.members {
        object = object.property(build_property(schema, registry, name, member)?);
    }
    Ok(object)
}

fn build_property(
    schema: &Schema,
    registry: &TypeRegistry,
    owner: &str,
    member: &MemberShape,
) -> Result<Property> {
    let context = format!("{owner}.{}", member.name);
    let value_type = resolve_type_ref(schema, registry, &member.target, &context)?;
    let traits = &member.traits;

    let mut property = Property::new(member.name.as_str(), value_type);
    if let Some(wire) = &traits.json_name {
        property = property.wire(wire.as_str());
    }
    if traits.required {
        property = property.required();
    }
    if traits.nullable {
        property = property.nullable();
    }
    if traits.readonly {
        property = property.read_only();
    }
    if traits.additional_properties {
        property = property.additional_properties();
    }
    if let Some(xml_name) = &traits.xml_name {
        property = property.xml_name(xml_name.as_str());
    }
    if traits.xml_attribute {
        property = property.xml_attribute();
    }
    if traits.xml_flattened {
        property = property.xml_flattened();
    }
    if let Some(item) = &traits.xml_item_name {
        property = property.xml_item_name(item.as_str());
    }
    Ok(property)
}

fn build_enum(shape: &EnumShape) -> EnumType {
    let members = shape
        .members
        .iter()
        .map(|m| EnumMember::new(m.name.as_str(), m.value.as_deref().unwrap_or(&m.name)))
        .collect();
    let case = if shape.traits.case_insensitive {
        CaseSensitivity::Insensitive
    } else {
        CaseSensitivity::Sensitive
    };
    let extensibility = if shape.traits.open {
        Extensibility::Open
    } else {
        Extensibility::Closed
    };
    EnumType {
        members,
        config: EnumConfig::new(case, extensibility),
    }
}

fn resolve_type_ref(
    schema: &Schema,
    registry: &TypeRegistry,
    target: &TargetRef,
    context: &str,
) -> Result<TypeRef> {
    Ok(match target {
        TargetRef::Target(name) => TypeRef::Named(resolve_target(schema, registry, name, context)?),
        TargetRef::List(collection) => {
            collection_ref(schema, registry, collection, context, CollectionShape::Sequence)?
        }
        TargetRef::Map(collection) => {
            collection_ref(schema, registry, collection, context, CollectionShape::Mapping)?
        }
    })
}

fn collection_ref(
    schema: &Schema,
    registry: &TypeRegistry,
    collection: &CollectionRef,
    context: &str,
    shape: CollectionShape,
) -> Result<TypeRef> {
    let element = resolve_type_ref(schema, registry, &collection.element, context)?;
    Ok(TypeRef::collection(shape, element, collection.nullable_elements))
}

/// Resolve a target name: declared shapes first, then primitive aliases, then
/// the built-in primitive names.
fn resolve_target(
    schema: &Schema,
    registry: &TypeRegistry,
    name: &str,
    context: &str,
) -> Result<TypeId> {
    let alias = match schema.shapes.get(name) {
        Some(Shape::Structure(_) | Shape::Enum(_)) => {
            return registry
                .id_of(name)
                .with_context(|| format!("`{name}` referenced from `{context}` is not declared"));
        }
        Some(shape) => Some(alias_kind(shape)),
        None => None,
    };
    let Some(kind) = alias.flatten().or_else(|| PrimitiveKind::from_name(name)) else {
        bail!("unknown target `{name}` referenced from `{context}`");
    };
    Ok(registry.primitive(kind))
}

fn alias_kind(shape: &Shape) -> Option<PrimitiveKind> {
    Some(match shape {
        Shape::String(_) => PrimitiveKind::String,
        Shape::Boolean(_) => PrimitiveKind::Boolean,
        Shape::Integer(_) => PrimitiveKind::Integer,
        Shape::Long(_) => PrimitiveKind::Long,
        Shape::Float(_) => PrimitiveKind::Float,
        Shape::Double(_) => PrimitiveKind::Double,
        Shape::Timestamp(_) => PrimitiveKind::Timestamp,
        Shape::Blob(_) => PrimitiveKind::Blob,
        Shape::Structure(_) | Shape::Enum(_) => return None,
    })
}
