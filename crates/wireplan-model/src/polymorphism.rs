//! Discriminator maps for object hierarchies.
//!
//! Computed once when the registry is sealed. Each hierarchy is rooted at the
//! first type (walking down from a base-less object) that names a
//! discriminator property; every descendant inherits that property name and
//! contributes its discriminator value to the hierarchy's variant map.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::error::ModelError;
use crate::registry::TypeRegistry;
use crate::types::{PrimitiveKind, TypeId, TypeKind, TypeRef};

/// One discriminated hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hierarchy {
    /// The type that declared the discriminator.
    pub root: TypeId,
    /// The discriminator property name.
    pub discriminator_property: String,
    /// Discriminator wire value to concrete type.
    pub variants: BTreeMap<String, TypeId>,
}

/// All discriminated hierarchies of a sealed registry.
#[derive(Debug, Clone, Default)]
pub struct Polymorphism {
    hierarchies: Vec<Hierarchy>,
    membership: HashMap<TypeId, usize>,
}

impl Polymorphism {
    /// Walk every base-less object top-down and build the discriminator maps.
    ///
    /// Expects an acyclic hierarchy; the registry checks that first.
    pub fn resolve(registry: &TypeRegistry) -> Result<Self, ModelError> {
        let mut result = Self::default();
        let roots: Vec<TypeId> = registry
            .object_ids()
            .into_iter()
            .filter(|id| registry.object(*id).is_some_and(|o| o.base.is_none()))
            .collect();

        for root in roots {
            let mut queue: VecDeque<(TypeId, Option<usize>)> = VecDeque::from([(root, None)]);
            while let Some((id, inherited)) = queue.pop_front() {
                let Some(object) = registry.object(id) else {
                    continue;
                };
                let type_name = registry.name_of(id);

                let current = match (&object.discriminator_property, inherited) {
                    (Some(own), Some(idx)) => {
                        let expected = &result.hierarchies[idx].discriminator_property;
                        if own != expected {
                            return Err(ModelError::DiscriminatorConflict {
                                type_name: type_name.to_owned(),
                                expected: expected.clone(),
                                found: own.clone(),
                            });
                        }
                        Some(idx)
                    }
                    (Some(own), None) => {
                        validate_discriminator_property(registry, id, own)?;
                        result.hierarchies.push(Hierarchy {
                            root: id,
                            discriminator_property: own.clone(),
                            variants: BTreeMap::new(),
                        });
                        Some(result.hierarchies.len() - 1)
                    }
                    (None, inherited) => inherited,
                };

                match (&object.discriminator_value, current) {
                    (Some(value), Some(idx)) => {
                        let hierarchy = &mut result.hierarchies[idx];
                        if let Some(first) = hierarchy.variants.get(value) {
                            return Err(ModelError::DuplicateDiscriminatorValue {
                                value: value.clone(),
                                first: registry.name_of(*first).to_owned(),
                                second: type_name.to_owned(),
                            });
                        }
                        hierarchy.variants.insert(value.clone(), id);
                    }
                    (Some(_), None) => {
                        return Err(ModelError::InvalidDiscriminatorProperty {
                            type_name: type_name.to_owned(),
                            field: String::new(),
                            reason: "discriminator value declared outside a discriminated hierarchy"
                                .to_owned(),
                        });
                    }
                    (None, Some(idx)) => {
                        let children = registry.children(id);
                        if !object.is_abstract && children.is_empty() {
                            return Err(ModelError::UncoveredConcreteType {
                                type_name: type_name.to_owned(),
                                root: registry
                                    .name_of(result.hierarchies[idx].root)
                                    .to_owned(),
                            });
                        }
                    }
                    (None, None) => {}
                }

                if let Some(idx) = current {
                    result.membership.insert(id, idx);
                }
                for child in registry.children(id) {
                    queue.push_back((child, current));
                }
            }
        }

        for hierarchy in &result.hierarchies {
            debug!(
                root = registry.name_of(hierarchy.root),
                discriminator = %hierarchy.discriminator_property,
                variants = hierarchy.variants.len(),
                "resolved discriminated hierarchy"
            );
        }
        Ok(result)
    }

    /// Every discriminated hierarchy, in discovery order.
    #[must_use]
    pub fn hierarchies(&self) -> &[Hierarchy] {
        &self.hierarchies
    }

    /// The hierarchy a type belongs to, if any.
    #[must_use]
    pub fn hierarchy_of(&self, id: TypeId) -> Option<&Hierarchy> {
        self.membership.get(&id).map(|idx| &self.hierarchies[*idx])
    }

    /// The discriminator property name in effect for a type.
    #[must_use]
    pub fn discriminator_property(&self, id: TypeId) -> Option<&str> {
        self.hierarchy_of(id)
            .map(|h| h.discriminator_property.as_str())
    }

    /// Variants reachable when reading a value declared as `id`.
    ///
    /// Restricted to `id` and its descendants. An empty map means the type is
    /// read as itself without dispatch.
    #[must_use]
    pub fn variants_for(&self, registry: &TypeRegistry, id: TypeId) -> BTreeMap<String, TypeId> {
        self.hierarchy_of(id)
            .map(|h| {
                h.variants
                    .iter()
                    .filter(|(_, t)| registry.is_subtype_of(**t, id))
                    .map(|(v, t)| (v.clone(), *t))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn validate_discriminator_property(
    registry: &TypeRegistry,
    id: TypeId,
    field: &str,
) -> Result<(), ModelError> {
    let invalid = |reason: &str| ModelError::InvalidDiscriminatorProperty {
        type_name: registry.name_of(id).to_owned(),
        field: field.to_owned(),
        reason: reason.to_owned(),
    };

    let property = registry
        .effective_properties(id)
        .into_iter()
        .find(|p| p.name == field)
        .ok_or_else(|| invalid("no such property"))?;
    if !property.required {
        return Err(invalid("must be required"));
    }
    if property.nullable {
        return Err(invalid("must not be nullable"));
    }

    let string_like = match &property.value_type {
        TypeRef::Named(t) => matches!(
            registry.get(*t).map(|e| &e.kind),
            Some(TypeKind::Primitive(PrimitiveKind::String) | TypeKind::Enum(_))
        ),
        TypeRef::Collection(_) => false,
    };
    if !string_like {
        return Err(invalid("must be a string or enum"));
    }
    Ok(())
}
