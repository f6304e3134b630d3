//! Two-phase type registry.
//!
//! Types live in an arena and are addressed by [`TypeId`] handles. A handle is
//! handed out as soon as a name is declared, so a property can reference a
//! type (or its own type) before that type has been defined. Once every name
//! is defined the registry is [sealed](TypeRegistry::seal): all structural
//! invariants are validated, the polymorphism maps are computed, and the
//! registry becomes read-only for the rest of the run.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::ModelError;
use crate::polymorphism::Polymorphism;
use crate::types::{
    CollectionShape, EntityType, ObjectType, PrimitiveKind, Property, TypeId, TypeKind, TypeRef,
};

#[derive(Debug)]
struct Slot {
    name: String,
    entity: Option<EntityType>,
}

/// Canonical catalog of named entity types.
#[derive(Debug)]
pub struct TypeRegistry {
    slots: Vec<Slot>,
    by_name: HashMap<String, TypeId>,
    polymorphism: Polymorphism,
    sealed: bool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with every [`PrimitiveKind`] pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            slots: Vec::with_capacity(64),
            by_name: HashMap::new(),
            polymorphism: Polymorphism::default(),
            sealed: false,
        };
        for kind in PrimitiveKind::ALL {
            let entity = EntityType::primitive(kind);
            let id = TypeId::from_index(registry.slots.len());
            registry.by_name.insert(entity.name.clone(), id);
            registry.slots.push(Slot {
                name: entity.name.clone(),
                entity: Some(entity),
            });
        }
        registry
    }

    /// Handle of a pre-registered primitive.
    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        TypeId::from_index(kind as usize)
    }

    /// Reserve a handle for `name` without defining it yet.
    ///
    /// Declaring an already known name returns its existing handle.
    pub fn declare(&mut self, name: &str) -> Result<TypeId, ModelError> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        self.ensure_open(name)?;

        let id = TypeId::from_index(self.slots.len());
        self.slots.push(Slot {
            name: name.to_owned(),
            entity: None,
        });
        self.by_name.insert(name.to_owned(), id);
        debug!(name, %id, "declared type");
        Ok(id)
    }

    /// Give a declared handle its definition.
    ///
    /// Re-defining with an identical structure is a no-op; a conflicting
    /// structure fails with [`ModelError::DuplicateType`].
    pub fn define(&mut self, id: TypeId, kind: TypeKind) -> Result<(), ModelError> {
        let name = self.slot(id, "define")?.name.clone();
        self.ensure_open(&name)?;

        let slot = &mut self.slots[id.index()];
        match &slot.entity {
            Some(existing) if existing.kind == kind => Ok(()),
            Some(_) => Err(ModelError::DuplicateType { name }),
            None => {
                slot.entity = Some(EntityType { name, kind });
                Ok(())
            }
        }
    }

    /// Declare and define in one step.
    pub fn register(&mut self, entity: EntityType) -> Result<TypeId, ModelError> {
        let id = self.declare(&entity.name)?;
        self.define(id, entity.kind)?;
        Ok(id)
    }

    /// Resolve a handle to its definition.
    pub fn resolve(&self, id: TypeId) -> Result<&EntityType, ModelError> {
        let slot = self.slot(id, "resolve")?;
        slot.entity.as_ref().ok_or_else(|| ModelError::UndefinedType {
            name: slot.name.clone(),
        })
    }

    /// Resolve a handle, returning `None` for unknown or undefined handles.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&EntityType> {
        self.slots.get(id.index()).and_then(|s| s.entity.as_ref())
    }

    /// Look a handle up by type name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Name of a handle, or `"<unknown>"` for foreign handles.
    #[must_use]
    pub fn name_of(&self, id: TypeId) -> &str {
        self.slots.get(id.index()).map_or("<unknown>", |s| s.name.as_str())
    }

    /// Number of declared types, primitives included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no user types have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == PrimitiveKind::ALL.len()
    }

    /// Whether [`seal`](Self::seal) has completed successfully.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Iterate every defined type in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &EntityType)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.entity.as_ref().map(|e| (TypeId::from_index(i), e)))
    }

    /// Handles of every object type.
    #[must_use]
    pub fn object_ids(&self) -> Vec<TypeId> {
        self.iter()
            .filter(|(_, e)| e.as_object().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Handles of every enum type.
    #[must_use]
    pub fn enum_ids(&self) -> Vec<TypeId> {
        self.iter()
            .filter(|(_, e)| e.as_enum().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Object descriptor of a handle, if it names an object type.
    #[must_use]
    pub fn object(&self, id: TypeId) -> Option<&ObjectType> {
        self.get(id).and_then(EntityType::as_object)
    }

    /// Direct subtypes of an object type, in handle order.
    #[must_use]
    pub fn children(&self, id: TypeId) -> Vec<TypeId> {
        self.iter()
            .filter(|(_, e)| e.as_object().and_then(|o| o.base) == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// The type itself followed by its ancestors, nearest first.
    ///
    /// Bounded by the arena size so an unsealed, cyclic graph still terminates.
    #[must_use]
    pub fn lineage(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut current = self.object(id).and_then(|o| o.base);
        while let Some(base) = current {
            if chain.len() > self.slots.len() || chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = self.object(base).and_then(|o| o.base);
        }
        chain
    }

    /// Whether `sub` is `sup` or inherits from it.
    #[must_use]
    pub fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> bool {
        self.lineage(sub).contains(&sup)
    }

    /// Inherited properties first (root-most ancestor first), then own.
    #[must_use]
    pub fn effective_properties(&self, id: TypeId) -> Vec<&Property> {
        self.lineage(id)
            .into_iter()
            .rev()
            .filter_map(|t| self.object(t))
            .flat_map(|o| o.properties.iter())
            .collect()
    }

    /// The additional-properties carrier in effect, most-derived first.
    #[must_use]
    pub fn additional_properties_carrier(&self, id: TypeId) -> Option<&Property> {
        self.lineage(id)
            .into_iter()
            .filter_map(|t| self.object(t))
            .find_map(ObjectType::additional_properties_carrier)
    }

    /// Discriminator maps computed at seal time.
    #[must_use]
    pub fn polymorphism(&self) -> &Polymorphism {
        &self.polymorphism
    }

    /// Validate every structural invariant and freeze the registry.
    ///
    /// Sealing twice is a no-op.
    pub fn seal(&mut self) -> Result<(), ModelError> {
        if self.sealed {
            return Ok(());
        }

        for slot in &self.slots {
            if slot.entity.is_none() {
                return Err(ModelError::UndefinedType {
                    name: slot.name.clone(),
                });
            }
        }

        for (_, entity) in self.iter() {
            match &entity.kind {
                TypeKind::Primitive(_) => {}
                TypeKind::Enum(e) => {
                    let mut seen = HashSet::new();
                    for member in &e.members {
                        let key = if e.config.is_case_sensitive() {
                            member.wire_value.clone()
                        } else {
                            member.wire_value.to_ascii_lowercase()
                        };
                        if !seen.insert(key) {
                            return Err(ModelError::DuplicateEnumWireValue {
                                enum_name: entity.name.clone(),
                                value: member.wire_value.clone(),
                            });
                        }
                    }
                }
                TypeKind::Object(o) => self.validate_object(&entity.name, o)?,
            }
        }

        for id in self.object_ids() {
            if self.lineage_has_cycle(id) {
                return Err(ModelError::InheritanceCycle {
                    type_name: self.name_of(id).to_owned(),
                });
            }
        }
        for id in self.object_ids() {
            self.validate_effective_properties(id)?;
        }

        self.polymorphism = Polymorphism::resolve(self)?;
        self.sealed = true;

        info!(
            types = self.slots.len(),
            objects = self.object_ids().len(),
            hierarchies = self.polymorphism.hierarchies().len(),
            "type registry sealed"
        );
        Ok(())
    }

    fn slot(&self, id: TypeId, context: &str) -> Result<&Slot, ModelError> {
        self.slots
            .get(id.index())
            .ok_or_else(|| ModelError::UnknownTypeId {
                id: id.raw(),
                context: context.to_owned(),
            })
    }

    fn ensure_open(&self, name: &str) -> Result<(), ModelError> {
        if self.sealed {
            return Err(ModelError::RegistrySealed {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn validate_object(&self, name: &str, object: &ObjectType) -> Result<(), ModelError> {
        if let Some(base) = object.base {
            let base_entity = self.slot(base, name)?;
            if !matches!(
                base_entity.entity.as_ref().map(|e| &e.kind),
                Some(TypeKind::Object(_))
            ) {
                return Err(ModelError::InvalidBaseType {
                    type_name: name.to_owned(),
                    base: base_entity.name.clone(),
                });
            }
        }

        let mut carriers = object.properties.iter().filter(|p| p.additional_properties);
        if let Some(carrier) = carriers.next() {
            if carriers.next().is_some() {
                return Err(ModelError::MultipleAdditionalPropertiesCarriers {
                    type_name: name.to_owned(),
                });
            }
            let is_mapping = matches!(
                &carrier.value_type,
                TypeRef::Collection(d) if d.shape == CollectionShape::Mapping
            );
            if !is_mapping {
                return Err(ModelError::InvalidAdditionalPropertiesCarrier {
                    type_name: name.to_owned(),
                    field: carrier.name.clone(),
                });
            }
        }

        for property in &object.properties {
            self.validate_type_ref(&property.value_type, &format!("{name}.{}", property.name))?;
        }
        Ok(())
    }

    fn validate_type_ref(&self, type_ref: &TypeRef, context: &str) -> Result<(), ModelError> {
        match type_ref {
            TypeRef::Named(id) => self.slot(*id, context).map(|_| ()),
            TypeRef::Collection(desc) => self.validate_type_ref(&desc.element_type, context),
        }
    }

    fn lineage_has_cycle(&self, id: TypeId) -> bool {
        let mut seen = HashSet::from([id]);
        let mut current = self.object(id).and_then(|o| o.base);
        while let Some(base) = current {
            if !seen.insert(base) {
                return true;
            }
            current = self.object(base).and_then(|o| o.base);
        }
        false
    }

    fn validate_effective_properties(&self, id: TypeId) -> Result<(), ModelError> {
        let mut names = HashSet::new();
        let mut wire_names = HashSet::new();
        let mut xml_names = HashSet::new();
        let duplicate = |name: &str| ModelError::DuplicateProperty {
            type_name: self.name_of(id).to_owned(),
            name: name.to_owned(),
        };

        for property in self.effective_properties(id) {
            if !names.insert(property.name.as_str()) {
                return Err(duplicate(&property.name));
            }
            if property.additional_properties {
                continue;
            }
            if !wire_names.insert(property.wire_name.as_str()) {
                return Err(duplicate(&property.wire_name));
            }
            if !xml_names.insert(property.xml_wire_name()) {
                return Err(duplicate(property.xml_wire_name()));
            }
        }
        Ok(())
    }
}
